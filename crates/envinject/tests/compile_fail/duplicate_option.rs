#![allow(dead_code)]

use envinject::EnvInject;

#[derive(EnvInject)]
struct Config {
    #[env(var = "PORT", var = "HTTP_PORT")]
    port: u16,
}

fn main() {}
