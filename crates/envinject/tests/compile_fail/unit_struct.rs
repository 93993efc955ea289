#![allow(dead_code)]

use envinject::EnvInject;

#[derive(EnvInject)]
struct Marker;

fn main() {}
