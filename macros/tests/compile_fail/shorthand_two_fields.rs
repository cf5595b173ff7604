//! Test: A shorthand abbreviates exactly one field.

#![allow(dead_code)]

use emblem_core::Shorthand;

#[derive(Shorthand)]
struct Span {
    start: i32,
    end: i32,
}

fn main() {}
