#![allow(dead_code)]

use envinject::EnvInject;

#[derive(EnvInject)]
enum Mode {
    Fast,
}

fn main() {}
