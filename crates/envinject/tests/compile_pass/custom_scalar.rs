use envinject::{CoerceError, EnvInject, FieldKind, FromEnvValue};

#[derive(Default)]
struct Millis(u64);

impl FromEnvValue for Millis {
    const KIND: FieldKind = FieldKind::Custom("Millis");

    fn from_env_value(raw: &str) -> Result<Self, CoerceError> {
        let digits = raw.strip_suffix("ms").unwrap_or(raw);
        u64::from_env_value(digits).map(Millis)
    }
}

#[derive(Default, EnvInject)]
struct Config {
    #[env(scalar)]
    timeout: Millis,

    #[env(scalar, var = "RETRY_DELAY")]
    delay: Millis,
}

fn main() {
    let config = Config::default();
    let _ = (config.timeout.0, config.delay.0);

    assert_eq!(Config::FIELDS[1].var, Some("RETRY_DELAY"));
}
