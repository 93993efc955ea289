//! Read-only access to override variables.
//!
//! The injector consults an [`EnvLookup`] before falling back to the parsed
//! [`VariableMap`]. [`OsEnv`] reads the process environment; maps implement
//! the trait too, which keeps tests and embedders off the global
//! environment.
//!
//! ```rust,ignore
//! use envinject::{Injector, VariableMap};
//!
//! let overrides: VariableMap = [("PORT", "9090")].into_iter().collect();
//! let injector = Injector::with_env(overrides);
//! ```

use std::collections::HashMap;

use crate::VariableMap;

/// A read-only source of variables that override file values.
pub trait EnvLookup {
    /// Name used in trace output.
    fn name(&self) -> &str;

    /// Returns the value of `name`, or `None` when it is not set.
    fn lookup(&self, name: &str) -> Option<String>;
}

/// The process environment.
///
/// Variables holding invalid UTF-8 are treated as unset.
#[derive(Clone, Copy, Debug, Default)]
pub struct OsEnv;

impl EnvLookup for OsEnv {
    fn name(&self) -> &str {
        "environment"
    }

    fn lookup(&self, name: &str) -> Option<String> {
        std::env::var(name).ok()
    }
}

impl EnvLookup for VariableMap {
    fn name(&self) -> &str {
        "variables"
    }

    fn lookup(&self, name: &str) -> Option<String> {
        self.get(name).map(str::to_string)
    }
}

impl EnvLookup for HashMap<String, String> {
    fn name(&self) -> &str {
        "map"
    }

    fn lookup(&self, name: &str) -> Option<String> {
        self.get(name).cloned()
    }
}

impl<T: EnvLookup + ?Sized> EnvLookup for &T {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn lookup(&self, name: &str) -> Option<String> {
        (**self).lookup(name)
    }
}
