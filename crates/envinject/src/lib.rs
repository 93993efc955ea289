//! # envinject
//!
//! Load `.env` files into typed configuration structs.
//!
//! `envinject` has two halves that can be used together or on their own:
//!
//! - a **dotenv parser** that turns `NAME=value` lines into a
//!   [`VariableMap`], collecting malformed lines instead of failing, and
//! - a **struct injector** that walks a `#[derive(EnvInject)]` struct and
//!   fills every field from the process environment or the map, the
//!   process environment taking precedence.
//!
//! Problems never abort a load. They are accumulated in an
//! [`ErrorCollection`] that the caller inspects afterwards; only a dotenv
//! file explicitly marked as required turns into a hard [`Error`].
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use envinject::{DotenvLoader, EnvInject};
//!
//! #[derive(Default, EnvInject)]
//! struct Database {
//!     host: String,   // DATABASE_HOST
//!     port: u16,      // DATABASE_PORT
//! }
//!
//! #[derive(Default, EnvInject)]
//! struct Config {
//!     #[env(var = "APP_NAME")]
//!     name: String,
//!     debug: bool,    // DEBUG
//!     database: Database,
//! }
//!
//! fn main() -> Result<(), envinject::Error> {
//!     let mut config = Config::default();
//!     let warnings = DotenvLoader::new(".env").load_into(&mut config)?;
//!
//!     if let Some(error) = warnings.into_error() {
//!         eprintln!("{:?}", envinject::miette::Report::new(error));
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Dotenv Grammar
//!
//! ```text
//! [whitespace][export][whitespace]NAME=["]value["]
//! ```
//!
//! `NAME` is one or more ASCII letters, digits or underscores. There are no
//! comments and no multi-line values; blank lines are reported as invalid.
//!
//! ## Name Resolution
//!
//! | Field | Variable |
//! |-------|----------|
//! | `port: u16` | `PORT` |
//! | `port: u16` inside `database: Database` | `DATABASE_PORT` |
//! | `#[env(var = "HTTP_PORT")] port: u16` | `HTTP_PORT` (never prefixed) |
//! | `#[env(nested, prefix = "DB_")] database: Database` | `DB_PORT` |
//!
//! ## Field Attributes
//!
//! | Attribute | Description |
//! |-----------|-------------|
//! | `var = "NAME"` | Read this exact variable |
//! | `nested` | Force recursion into the field's type |
//! | `prefix = "SEG_"` | Prefix segment for a `nested` field |
//! | `scalar` | Force coercion through [`FromEnvValue`] |
//! | `skip` | Never touch the field |
//!
//! ## Error Flags
//!
//! | Flag | Raised when |
//! |------|-------------|
//! | `envFileNotFound` | The dotenv file cannot be read |
//! | `invalidLine` | A line does not match the grammar |
//! | `failed_type_parsing` | A value cannot be coerced into its field |
//! | `unhandled_type` | A value exists for a field with no coercion rule |

#![deny(missing_docs)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]

extern crate self as envinject;

/// Derive macro generating an [`EnvInject`] implementation.
///
/// Only structs with named fields are accepted; enums, unions, tuple
/// structs and unit structs are rejected at compile time.
pub use envinject_macro::EnvInject;

/// Re-export of [`miette`] for rendering diagnostics.
pub use miette;

mod coerce;
pub use coerce::{CoerceError, FieldKind, FromEnvValue, UnhandledKind};

pub mod error;
pub use error::{Error, ErrorCollection, ErrorFlag, FlaggedError, Severity};

mod variables;
pub use variables::VariableMap;

mod lookup;
pub use lookup::{EnvLookup, OsEnv};

pub mod dotenv;
pub use dotenv::{FileParser, ParseOutcome, ParserOptions};

pub mod inject;
pub use inject::{EnvInject, FieldDescriptor, InjectContext, Injector, inject_variables};

pub mod loader;
pub use loader::DotenvLoader;
