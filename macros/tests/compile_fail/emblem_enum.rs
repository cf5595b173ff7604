//! Test: Only structs can be described by a schema.

#![allow(dead_code)]

use emblem_core::Emblem;

#[derive(Emblem)]
enum Shape {
    Circle,
    Square,
}

fn main() {}
