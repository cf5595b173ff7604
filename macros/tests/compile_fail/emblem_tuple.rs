//! Test: Tuple fields have no names to publish.

#![allow(dead_code)]

use emblem_core::Emblem;

#[derive(Emblem)]
struct Pair(i32, i32);

fn main() {}
