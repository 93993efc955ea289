//! # envinject_macro
//!
//! Procedural macro implementation for the `envinject` crate.
//!
//! **Note:** Users should depend on the `envinject` crate, not this one
//! directly. It re-exports the derive alongside the runtime types the
//! generated code refers to.
//!
//! # Module Structure
//!
//! - `parse` - `#[env(...)]` attribute parsing
//! - `field` - Field classification (scalar, nested, unhandled, skipped)
//! - `expand` - Code generation for the `EnvInject` impl

use proc_macro::TokenStream;
use syn::{DeriveInput, parse_macro_input};

mod expand;
mod field;
mod parse;

/// Derives `envinject::EnvInject` for a struct with named fields.
///
/// Every field is classified from its type, unless an attribute says
/// otherwise:
///
/// | Field type | Treatment | Variable |
/// |------------|-----------|----------|
/// | `bool`, integers, `f32`, `f64`, `String` | coerced | `PREFIX` + `UPPER(name)` |
/// | any other named type | nested struct | prefix grows by `UPPER(name)_` |
/// | `Option`, `Vec`, maps, pointers, references, tuples, ... | unhandled | reported if set |
///
/// # Field Attributes
///
/// | Attribute | Description |
/// |-----------|-------------|
/// | `var = "NAME"` | Read this exact variable, ignoring prefixes |
/// | `nested` | Treat the field as a nested struct |
/// | `nested, prefix = "DB_"` | Nested with an explicit prefix segment |
/// | `scalar` | Coerce through `FromEnvValue` (custom types) |
/// | `skip` | Leave the field alone |
///
/// # Example
///
/// ```ignore
/// use envinject::EnvInject;
///
/// #[derive(Default, EnvInject)]
/// struct Config {
///     port: u16,                       // PORT
///
///     #[env(var = "APP_DEBUG")]
///     debug: bool,                     // APP_DEBUG
///
///     database: Database,              // DATABASE_HOST, DATABASE_PORT
///
///     #[env(nested, prefix = "CACHE_")]
///     redis: Database,                 // CACHE_HOST, CACHE_PORT
///
///     #[env(skip)]
///     handle: Option<Handle>,
/// }
/// ```
///
/// Enums, unions, tuple structs and unit structs are rejected.
#[proc_macro_derive(EnvInject, attributes(env))]
pub fn derive_env_inject(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);

    expand::Expander::expand(input).unwrap_or_else(|err| err.to_compile_error().into())
}
