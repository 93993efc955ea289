use std::collections::HashMap;

use envinject::{EnvInject, Injector, VariableMap};

#[derive(Default, EnvInject)]
struct Config {
    #[env(var = "APP_NAME")]
    name: String,
    debug: bool,
    port: u16,
    workers: usize,
    offset: i64,
    ratio: f64,
    r#type: String,
}

fn main() {
    let variables: VariableMap = [("PORT", "8080"), ("TYPE", "worker")].into_iter().collect();
    let injector = Injector::with_env(HashMap::<String, String>::new());
    let mut config = Config::default();

    let errors = injector.inject_variables(&mut config, &variables);
    assert!(!errors.has_errors());
    assert_eq!(config.port, 8080);
    assert_eq!(config.r#type, "worker");

    let _ = (config.name, config.debug, config.workers, config.offset, config.ratio);
    assert_eq!(Config::FIELDS.len(), 7);
    assert_eq!(Config::FIELDS[6].name, "type");
}
