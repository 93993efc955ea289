//! One-call loading: parse a dotenv file, then inject it.
//!
//! [`DotenvLoader`] chains [`FileParser`] and [`Injector`] and merges their
//! soft errors into a single [`ErrorCollection`]. Only a missing file marked
//! fatal surfaces as `Err`.
//!
//! ```rust,ignore
//! use envinject::{DotenvLoader, EnvInject};
//!
//! #[derive(Default, EnvInject)]
//! struct Config {
//!     port: u16,
//! }
//!
//! let mut config = Config::default();
//! let warnings = DotenvLoader::new(".env").load_into(&mut config)?;
//! ```

use std::path::{Path, PathBuf};

use crate::dotenv::{FileParser, ParserOptions};
use crate::error::{Error, ErrorCollection, metadata};
use crate::inject::{EnvInject, Injector};
use crate::lookup::{EnvLookup, OsEnv};
use crate::variables::VariableMap;

/// Loads a dotenv file into configuration structs.
#[derive(Clone, Debug)]
pub struct DotenvLoader {
    path: PathBuf,
    options: ParserOptions,
}

impl DotenvLoader {
    /// Creates a loader for the file at `path`.
    ///
    /// A missing file is recoverable by default.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            options: ParserOptions::default(),
        }
    }

    /// Sets whether a missing or unreadable file aborts loading.
    #[must_use]
    pub const fn missing_file_fatal(mut self, fatal: bool) -> Self {
        self.options.missing_file_is_fatal = fatal;
        self
    }

    /// The dotenv file this loader reads.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Loads into `target`, with the process environment taking precedence.
    ///
    /// # Errors
    ///
    /// Returns [`Error::EnvFileNotFound`] when the file cannot be read and
    /// the loader was built with `missing_file_fatal(true)`. Every other
    /// problem is returned in the collection.
    pub fn load_into<T: EnvInject>(&self, target: &mut T) -> Result<ErrorCollection, Error> {
        self.load_into_with(target, &OsEnv)
    }

    /// Loads into `target`, with `env` taking precedence over the file.
    ///
    /// # Errors
    ///
    /// See [`DotenvLoader::load_into`].
    pub fn load_into_with<T, E>(&self, target: &mut T, env: &E) -> Result<ErrorCollection, Error>
    where
        T: EnvInject,
        E: EnvLookup + ?Sized,
    {
        let outcome = FileParser::with_options(self.options).parse(&self.path);
        let (variables, mut errors) = outcome.into_parts();

        if let Some(fatal) = errors.take_fatal() {
            return Err(fatal.into_error());
        }

        let variables = variables.unwrap_or_else(VariableMap::new);
        errors.extend(Injector::with_env(env).inject_variables(target, &variables));

        for flagged in &errors {
            let meta = flagged.metadata();
            tracing::warn!(
                flag = %flagged.flag(),
                variable = meta.get(metadata::VARIABLE).map(String::as_str),
                path = meta.get(metadata::FILE_PATH).map(String::as_str),
                "configuration problem"
            );
        }

        tracing::debug!(
            path = %self.path.display(),
            config = T::STRUCT_NAME,
            errors = errors.count(),
            "loaded dotenv file"
        );

        Ok(errors)
    }
}
