//! Compile-fail tests for the emblem derives.
//!
//! These tests verify that the derives reject unsupported items and
//! malformed attributes with `[emblem]` errors pointing at the cause.

#[test]
fn compile_fail() {
    let t = trybuild::TestCases::new();
    t.compile_fail("tests/compile_fail/*.rs");
}
