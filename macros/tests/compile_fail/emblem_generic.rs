//! Test: A generic struct has no single key, so it cannot have a schema.

#![allow(dead_code)]

use emblem_core::Emblem;

#[derive(Emblem)]
struct Wrapper<T> {
    inner: T,
}

fn main() {}
