//! Struct injection through `#[derive(EnvInject)]`.

#![allow(clippy::pedantic)]

use std::collections::HashMap;

use envinject::error::metadata;
use envinject::miette::Diagnostic;
use envinject::{
    CoerceError, EnvInject, Error, ErrorFlag, FieldKind, FromEnvValue, Injector, VariableMap,
};
use serial_test::serial;

fn with_env<F, R>(vars: &[(&str, &str)], f: F) -> R
where
    F: FnOnce() -> R,
{
    unsafe {
        for (k, v) in vars {
            std::env::set_var(*k, *v);
        }
    }

    let result = f();

    unsafe {
        for (k, _) in vars {
            std::env::remove_var(*k);
        }
    }

    result
}

fn cleanup_env(vars: &[&str]) {
    unsafe {
        for k in vars {
            std::env::remove_var(*k);
        }
    }
}

fn variables(pairs: &[(&str, &str)]) -> VariableMap {
    pairs.iter().copied().collect()
}

/// Injects with an empty override source, keeping tests off the process
/// environment.
fn inject_isolated<T: EnvInject>(target: &mut T, vars: &VariableMap) -> envinject::ErrorCollection {
    Injector::with_env(HashMap::<String, String>::new()).inject_variables(target, vars)
}

// ============================================================================
// Fixtures
// ============================================================================

#[derive(Debug, Default, PartialEq)]
enum Level {
    #[default]
    Info,
    Debug,
}

impl FromEnvValue for Level {
    const KIND: FieldKind = FieldKind::Custom("Level");

    fn from_env_value(raw: &str) -> Result<Self, CoerceError> {
        match raw {
            "info" => Ok(Level::Info),
            "debug" => Ok(Level::Debug),
            other => Err(CoerceError::custom(format!("unknown level `{other}`"))),
        }
    }
}

#[derive(Debug, Default, EnvInject)]
struct Database {
    host: String,
    port: u16,
}

#[derive(Debug, Default, EnvInject)]
struct AppConfig {
    #[env(var = "APP_NAME")]
    name: String,

    debug: bool,
    ratio: f64,
    retries: i8,

    #[env(scalar)]
    level: Level,

    database: Database,

    #[env(nested, prefix = "REPLICA_")]
    replica: Database,

    tags: Vec<String>,

    #[env(skip)]
    handle: Option<u32>,
}

// ============================================================================
// Resolution
// ============================================================================

#[test]
fn test_inject_all_kinds() {
    let vars = variables(&[
        ("APP_NAME", "inventory"),
        ("DEBUG", "true"),
        ("RATIO", "0.75"),
        ("RETRIES", "-3"),
        ("LEVEL", "debug"),
        ("DATABASE_HOST", "db.internal"),
        ("DATABASE_PORT", "5432"),
        ("REPLICA_HOST", "replica.internal"),
        ("REPLICA_PORT", "5433"),
    ]);
    let mut config = AppConfig::default();

    let errors = inject_isolated(&mut config, &vars);

    assert!(!errors.has_errors(), "{errors:?}");
    assert_eq!(config.name, "inventory");
    assert!(config.debug);
    assert!((config.ratio - 0.75).abs() < f64::EPSILON);
    assert_eq!(config.retries, -3);
    assert_eq!(config.level, Level::Debug);
    assert_eq!(config.database.host, "db.internal");
    assert_eq!(config.database.port, 5432);
    assert_eq!(config.replica.host, "replica.internal");
    assert_eq!(config.replica.port, 5433);
}

#[test]
fn test_override_name_replaces_field_name() {
    let vars = variables(&[("NAME", "ignored"), ("APP_NAME", "used")]);
    let mut config = AppConfig::default();

    let _ = inject_isolated(&mut config, &vars);

    assert_eq!(config.name, "used");
}

#[test]
fn test_missing_values_leave_fields_untouched() {
    let vars = variables(&[("DATABASE_PORT", "")]);
    let mut config = AppConfig {
        name: "preset".to_string(),
        database: Database {
            host: "localhost".to_string(),
            port: 1234,
        },
        handle: Some(7),
        ..AppConfig::default()
    };

    let errors = inject_isolated(&mut config, &vars);

    assert!(!errors.has_errors());
    assert_eq!(config.name, "preset");
    assert_eq!(config.database.host, "localhost");
    assert_eq!(config.database.port, 1234);
    assert_eq!(config.handle, Some(7));
}

#[test]
fn test_override_source_takes_precedence() {
    let overrides: HashMap<String, String> = [
        ("DATABASE_PORT".to_string(), "6543".to_string()),
        ("DEBUG".to_string(), String::new()),
    ]
    .into();
    let vars = variables(&[("DATABASE_PORT", "5432"), ("DEBUG", "true")]);
    let mut config = AppConfig::default();

    let errors = Injector::with_env(overrides).inject_variables(&mut config, &vars);

    assert!(!errors.has_errors());
    assert_eq!(config.database.port, 6543);
    assert!(config.debug, "empty override falls back to the map");
}

// ============================================================================
// Soft errors
// ============================================================================

#[test]
fn test_failed_parsing_is_recorded_and_walk_continues() {
    let vars = variables(&[
        ("DEBUG", "NotABool"),
        ("DATABASE_PORT", "99999"),
        ("DATABASE_HOST", "still-set"),
        ("APP_NAME", "still-set"),
    ]);
    let mut config = AppConfig {
        debug: true,
        ..AppConfig::default()
    };

    let errors = inject_isolated(&mut config, &vars);

    assert_eq!(errors.count(), 2);
    assert!(
        errors
            .iter()
            .all(|e| e.flag() == ErrorFlag::FailedTypeParsing)
    );
    assert!(config.debug, "failed field keeps its value");
    assert_eq!(config.database.port, 0);
    assert_eq!(config.database.host, "still-set");
    assert_eq!(config.name, "still-set");

    let meta = errors.first_error().unwrap().metadata();
    assert_eq!(meta[metadata::STRUCT_NAME], "AppConfig");
    assert_eq!(meta[metadata::FIELD_NAME], "debug");
    assert_eq!(meta[metadata::VARIABLE], "DEBUG");
    assert_eq!(meta[metadata::KIND], "bool");
    assert_eq!(meta[metadata::ENV_VALUE], "NotABool");

    let nested = errors.iter().nth(1).unwrap().metadata();
    assert_eq!(nested[metadata::STRUCT_NAME], "Database");
    assert_eq!(nested[metadata::VARIABLE], "DATABASE_PORT");
    assert_eq!(nested[metadata::KIND], "u16");
}

#[test]
fn test_custom_scalar_failure() {
    let vars = variables(&[("LEVEL", "loud")]);
    let mut config = AppConfig::default();

    let errors = inject_isolated(&mut config, &vars);

    assert_eq!(config.level, Level::Info);
    let flagged = errors.first_error().unwrap();
    assert_eq!(flagged.metadata()[metadata::KIND], "Level");
    assert!(flagged.to_string().contains("LEVEL"));
}

#[test]
fn test_unhandled_field_with_value() {
    let vars = variables(&[("TAGS", "a,b,c")]);
    let mut config = AppConfig::default();

    let errors = inject_isolated(&mut config, &vars);

    assert!(config.tags.is_empty());
    assert_eq!(errors.count(), 1);

    let flagged = errors.first_error().unwrap();
    assert_eq!(flagged.flag(), ErrorFlag::UnhandledType);
    assert_eq!(flagged.metadata()[metadata::KIND], "sequence");
    assert_eq!(flagged.metadata()[metadata::ENV_VALUE], "a,b,c");
}

#[test]
fn test_unhandled_field_without_value_is_silent() {
    let mut config = AppConfig::default();

    let errors = inject_isolated(&mut config, &VariableMap::new());

    assert!(!errors.has_errors());
}

#[test]
fn test_skipped_field_never_reported() {
    let vars = variables(&[("HANDLE", "12")]);
    let mut config = AppConfig::default();

    let errors = inject_isolated(&mut config, &vars);

    assert!(!errors.has_errors());
    assert_eq!(config.handle, None);
}

#[test]
fn test_errors_fold_into_diagnostic() {
    let vars = variables(&[("DEBUG", "maybe"), ("RETRIES", "1000")]);
    let mut config = AppConfig::default();

    let error = inject_isolated(&mut config, &vars).into_error().unwrap();

    assert!(matches!(&error, Error::Multiple { errors } if errors.len() == 2));
    assert_eq!(
        error.code().map(|c| c.to_string()).as_deref(),
        Some("envinject::multiple_errors")
    );
}

// ============================================================================
// Generated helpers
// ============================================================================

#[test]
fn test_field_descriptors() {
    let names: Vec<&str> = AppConfig::FIELDS.iter().map(|f| f.name).collect();

    assert_eq!(AppConfig::STRUCT_NAME, "AppConfig");
    assert_eq!(
        names,
        [
            "name", "debug", "ratio", "retries", "level", "database", "replica", "tags"
        ]
    );
    assert_eq!(AppConfig::FIELDS[0].var, Some("APP_NAME"));
    assert_eq!(AppConfig::FIELDS[5].kind, FieldKind::Struct);
}

#[test]
fn test_variable_names() {
    assert_eq!(
        AppConfig::variable_names(),
        [
            "APP_NAME",
            "DEBUG",
            "RATIO",
            "RETRIES",
            "LEVEL",
            "DATABASE_HOST",
            "DATABASE_PORT",
            "REPLICA_HOST",
            "REPLICA_PORT",
        ]
    );
}

#[test]
fn test_env_example() {
    let example = Database::env_example();

    assert_eq!(example, "# Database configuration\nHOST=\nPORT=\n");
}

// ============================================================================
// Process environment
// ============================================================================

#[derive(Debug, Default, EnvInject)]
struct Overridable {
    #[env(var = "ENVINJECT_IT_PORT")]
    port: u16,

    #[env(var = "ENVINJECT_IT_HOST")]
    host: String,
}

#[test]
#[serial]
fn test_os_environment_wins_over_file() {
    cleanup_env(&["ENVINJECT_IT_PORT", "ENVINJECT_IT_HOST"]);
    let vars = variables(&[
        ("ENVINJECT_IT_PORT", "8080"),
        ("ENVINJECT_IT_HOST", "from-file"),
    ]);

    let config = with_env(&[("ENVINJECT_IT_PORT", "9090")], || {
        let mut config = Overridable::default();
        let errors = envinject::inject_variables(&mut config, &vars);
        assert!(!errors.has_errors());
        config
    });

    assert_eq!(config.port, 9090);
    assert_eq!(config.host, "from-file");
}

#[test]
#[serial]
fn test_empty_os_value_falls_back_to_file() {
    cleanup_env(&["ENVINJECT_IT_PORT", "ENVINJECT_IT_HOST"]);
    let vars = variables(&[("ENVINJECT_IT_HOST", "from-file")]);

    let config = with_env(&[("ENVINJECT_IT_HOST", "")], || {
        let (config, _) = Overridable::injected(&vars);
        config
    });

    assert_eq!(config.host, "from-file");
}

#[test]
#[serial]
fn test_os_environment_alone() {
    cleanup_env(&["ENVINJECT_IT_PORT", "ENVINJECT_IT_HOST"]);

    let config = with_env(&[("ENVINJECT_IT_HOST", "from-os")], || {
        let (config, errors) = Overridable::injected(&VariableMap::new());
        assert!(!errors.has_errors());
        config
    });

    assert_eq!(config.host, "from-os");
    assert_eq!(config.port, 0);
}

#[test]
#[serial]
fn test_invalid_os_value_is_reported() {
    cleanup_env(&["ENVINJECT_IT_PORT", "ENVINJECT_IT_HOST"]);
    let vars = variables(&[("ENVINJECT_IT_PORT", "8080")]);

    let (config, errors) = with_env(&[("ENVINJECT_IT_PORT", "not-a-port")], || {
        Overridable::injected(&vars)
    });

    assert_eq!(config.port, 0, "no fallback to the file after a parse failure");
    assert_eq!(
        errors.first_error().unwrap().metadata()[metadata::ENV_VALUE],
        "not-a-port"
    );
}
