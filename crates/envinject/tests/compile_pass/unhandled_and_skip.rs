use std::collections::HashMap;
use std::sync::Arc;

use envinject::EnvInject;

#[derive(Default, EnvInject)]
struct Config {
    tags: Vec<String>,
    labels: HashMap<String, String>,
    limit: Option<u32>,
    shared: Arc<str>,
    pair: (u8, u8),
    bytes: [u8; 4],

    #[env(skip)]
    callback: Option<fn()>,
}

fn main() {
    let config = Config::default();
    let _ = (
        config.tags,
        config.labels,
        config.limit,
        config.shared,
        config.pair,
        config.bytes,
        config.callback,
    );

    assert_eq!(Config::FIELDS.len(), 6);
    assert!(Config::variable_names().is_empty());
}
