//! Test: A renamed property must be given as an identifier.

#![allow(dead_code)]

use emblem_core::Emblem;

#[derive(Emblem)]
struct Address {
    #[emblem(name = "street")]
    line1: String,
}

fn main() {}
