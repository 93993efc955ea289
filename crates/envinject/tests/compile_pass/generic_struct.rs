use envinject::{EnvInject, FromEnvValue};

#[derive(Default, EnvInject)]
struct Limits<T: FromEnvValue> {
    #[env(scalar)]
    max: T,
    #[env(scalar)]
    min: T,
}

#[derive(Default, EnvInject)]
struct Config {
    limits: Limits<u32>,
}

fn main() {
    let config = Config::default();
    let _ = (config.limits.max, config.limits.min);

    assert_eq!(Config::variable_names(), ["LIMITS_MAX", "LIMITS_MIN"]);
}
