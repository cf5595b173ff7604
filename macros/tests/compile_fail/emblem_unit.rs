//! Test: A unit struct has no properties.

#![allow(dead_code)]

use emblem_core::Emblem;

#[derive(Emblem)]
struct Origin;

fn main() {}
