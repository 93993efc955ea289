#![allow(dead_code)]

use envinject::EnvInject;

#[derive(EnvInject)]
struct Port(u16);

fn main() {}
