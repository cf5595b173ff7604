//! Error types for schema construction, conversion, pools and traversal.

use core::fmt;

use emblem_types::{ErasedKey, Mismatch};

/// Boxed cause carried by conversion and custom-handler failures.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Failures building or using an [`Emblem`](crate::Emblem).
#[derive(Debug, thiserror::Error)]
pub enum EmblemError {
    /// `build()` was called before every declared property received a value.
    #[error("missing value for property `{property}` of `{record}`")]
    MissingProperty {
        record: ErasedKey,
        property: &'static str,
    },

    #[error("`{record}` has no property `{property}`")]
    UnknownProperty {
        record: ErasedKey,
        property: &'static str,
    },

    #[error("property `{property}` is declared twice on `{record}`")]
    DuplicateProperty {
        record: ErasedKey,
        property: &'static str,
    },

    #[error("wrong value type for property `{property}` of `{record}`")]
    PropertyMismatch {
        record: ErasedKey,
        property: &'static str,
        #[source]
        source: Mismatch,
    },

    /// The constructor and the declared property list disagree on arity.
    #[error("`{record}` declares {declared} properties but construction used {used}")]
    Arity {
        record: ErasedKey,
        declared: usize,
        used: usize,
    },
}

/// An extractor's inverse rejected a value.
#[derive(Debug, thiserror::Error)]
#[error("cannot recover `{target}` from {value}")]
pub struct ExtractorInverseError {
    /// Debug rendering of the abbreviated value that was rejected.
    pub value: String,
    /// The domain type the inverse was converting into.
    pub target: ErasedKey,
    #[source]
    pub cause: BoxError,
}

/// Two or more registrations in one pool claimed the same type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DuplicateRegistration {
    pub pool: &'static str,
    pub keys: Vec<ErasedKey>,
}

impl fmt::Display for DuplicateRegistration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Duplicate {} registration for ", self.pool)?;
        for (i, key) in self.keys.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "`{}`", key)?;
        }
        Ok(())
    }
}

impl std::error::Error for DuplicateRegistration {}

/// Failures raised while the engine walks a value.
#[derive(Debug, thiserror::Error)]
pub enum TraverseError {
    /// No dispatch rule applies to the type.
    #[error("no traversal rule for `{key}`")]
    Unresolved { key: ErasedKey },

    #[error(transparent)]
    Emblem(#[from] EmblemError),

    #[error(transparent)]
    ExtractorInverse(#[from] ExtractorInverseError),

    #[error(transparent)]
    Mismatch(#[from] Mismatch),

    /// A custom handler failed.
    #[error("custom traversal of `{key}` failed")]
    Custom {
        key: ErasedKey,
        #[source]
        source: BoxError,
    },
}

impl TraverseError {
    pub fn custom(key: ErasedKey, source: impl Into<BoxError>) -> Self {
        TraverseError::Custom {
            key,
            source: source.into(),
        }
    }
}

/// A [`Visitor`](crate::Visitor) entry point failed.
#[derive(Debug, thiserror::Error)]
#[error("failed to visit `{key}`")]
pub struct VisitError {
    pub key: ErasedKey,
    #[source]
    pub source: TraverseError,
}

/// A [`Generator`](crate::Generator) entry point failed.
#[derive(Debug, thiserror::Error)]
#[error("failed to generate `{key}`")]
pub struct GenerateError {
    pub key: ErasedKey,
    #[source]
    pub source: TraverseError,
}
