#![allow(dead_code)]

use envinject::EnvInject;

#[derive(EnvInject)]
union Bits {
    int: u32,
    float: f32,
}

fn main() {}
