//! Test: `keyed` only understands `extends`.

#![allow(dead_code)]

use emblem_core::Keyed;

#[derive(Keyed)]
#[keyed(implements(Shape))]
struct Circle;

fn main() {}
