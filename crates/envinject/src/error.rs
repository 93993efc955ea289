//! Error types and the soft-error accumulator.
//!
//! Loading configuration produces two tiers of problems:
//!
//! | Tier | Examples | Surfaced as |
//! |------|----------|-------------|
//! | Hard | required dotenv file missing | `Err(Error)` from the loader |
//! | Soft | invalid line, unparsable field value | entries in an [`ErrorCollection`] |
//!
//! Soft errors never interrupt a parse or an injection walk. They are
//! collected and handed back to the caller, who decides whether any of them
//! should block startup.
//!
//! ```rust,ignore
//! let mut outcome = FileParser::new().missing_file_fatal(true).parse(".env");
//!
//! if let Some(fatal) = outcome.errors.take_fatal() {
//!     return Err(fatal.into_error());
//! }
//!
//! for flagged in outcome.errors.with_flag(ErrorFlag::InvalidLine) {
//!     eprintln!("skipped: {}", flagged.metadata()["line"]);
//! }
//! ```

use std::collections::BTreeMap;
use std::fmt::{self, Display, Formatter};

use miette::{Diagnostic, NamedSource, SourceSpan};

use crate::coerce::{CoerceError, FieldKind};

/// Metadata keys attached to recorded errors.
pub mod metadata {
    /// Path of the dotenv file that could not be read.
    pub const FILE_PATH: &str = "file_path";

    /// Raw text of a rejected line.
    pub const LINE: &str = "line";

    /// Name of the struct that owns the failing field.
    pub const STRUCT_NAME: &str = "struct_name";

    /// Name of the failing field.
    pub const FIELD_NAME: &str = "field_name";

    /// Variable name the field was resolved against.
    pub const VARIABLE: &str = "variable";

    /// Coercion kind of the failing field.
    pub const KIND: &str = "kind";

    /// Raw value that was resolved for the field.
    pub const ENV_VALUE: &str = "envValue";
}

/// Errors produced while parsing dotenv files or injecting values.
///
/// # Diagnostic Codes
///
/// | Code | Meaning |
/// |------|---------|
/// | `envinject::env_file_not_found` | Dotenv file missing or unreadable |
/// | `envinject::invalid_line` | Line does not match `NAME=value` |
/// | `envinject::failed_type_parsing` | Value could not be coerced |
/// | `envinject::unhandled_type` | Field kind has no coercion rule |
/// | `envinject::multiple_errors` | Several errors reported together |
#[derive(Debug, Diagnostic, thiserror::Error)]
pub enum Error {
    /// The dotenv file could not be read.
    #[error("failed to read dotenv file: {path}")]
    #[diagnostic(
        code(envinject::env_file_not_found),
        help("ensure the file exists and is readable")
    )]
    EnvFileNotFound {
        /// Path that was passed to the parser.
        path: String,

        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// A line did not match the dotenv assignment grammar.
    #[error("line {line_number} is not a valid dotenv assignment: {line:?}")]
    #[diagnostic(
        code(envinject::invalid_line),
        help("lines must look like `NAME=value` or `export NAME=\"value\"`")
    )]
    InvalidLine {
        /// Raw text of the rejected line.
        line: String,

        /// 1-based line number.
        line_number: usize,

        /// The rejected line, named after its file.
        #[source_code]
        src: NamedSource<String>,

        /// Span covering the whole line.
        #[label("expected NAME=value")]
        span: SourceSpan,
    },

    /// A resolved value could not be coerced into the field's type.
    #[error("failed to parse {variable} into {struct_name}.{field_name}: expected {kind}, got {value:?}")]
    #[diagnostic(code(envinject::failed_type_parsing))]
    FailedTypeParsing {
        /// Struct that owns the field.
        struct_name: &'static str,

        /// Field name as declared.
        field_name: &'static str,

        /// Variable the value was resolved from.
        variable: String,

        /// Kind the value was coerced into.
        kind: FieldKind,

        /// Raw resolved value.
        value: String,

        /// Why the coercion failed.
        #[source]
        source: CoerceError,
    },

    /// The field's kind has no coercion rule.
    #[error("the type of kind '{kind}' is not handled ({struct_name}.{field_name})")]
    #[diagnostic(
        code(envinject::unhandled_type),
        help("use a scalar type, mark the field `#[env(skip)]`, or implement FromEnvValue and mark it `#[env(scalar)]`")
    )]
    UnhandledType {
        /// Struct that owns the field.
        struct_name: &'static str,

        /// Field name as declared.
        field_name: &'static str,

        /// Variable the value was resolved from.
        variable: String,

        /// The unsupported kind.
        kind: FieldKind,

        /// Raw resolved value.
        value: String,
    },

    /// Several errors reported together.
    #[error("{} configuration error(s) occurred", .errors.len())]
    #[diagnostic(
        code(envinject::multiple_errors),
        help("fix all listed configuration errors")
    )]
    Multiple {
        /// All accumulated errors.
        #[related]
        errors: Vec<Error>,
    },
}

impl Error {
    /// Creates an `InvalidLine` error pointing at the whole line.
    pub fn invalid_line(source_name: &str, line: &str, line_number: usize) -> Self {
        Error::InvalidLine {
            line: line.to_string(),
            line_number,
            src: NamedSource::new(format!("{source_name}:{line_number}"), line.to_string()),
            span: (0, line.len()).into(),
        }
    }

    /// Collects errors into a single error.
    ///
    /// Returns `None` for an empty list and unwraps a single error.
    pub fn multiple(errors: Vec<Error>) -> Option<Self> {
        if errors.len() > 1 {
            return Some(Error::Multiple { errors });
        }

        errors.into_iter().next()
    }
}

/// Category of a recorded error.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum ErrorFlag {
    /// Dotenv file missing or unreadable.
    EnvFileNotFound,

    /// Line rejected by the grammar.
    InvalidLine,

    /// Value could not be coerced into the field's type.
    FailedTypeParsing,

    /// Field kind has no coercion rule.
    UnhandledType,
}

impl ErrorFlag {
    /// Stable string form of the flag.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            ErrorFlag::EnvFileNotFound => "envFileNotFound",
            ErrorFlag::InvalidLine => "invalidLine",
            ErrorFlag::FailedTypeParsing => "failed_type_parsing",
            ErrorFlag::UnhandledType => "unhandled_type",
        }
    }
}

impl Display for ErrorFlag {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Whether a recorded error should block startup.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
pub enum Severity {
    /// Informational; loading may continue.
    #[default]
    Recoverable,

    /// The caller is expected to stop.
    Fatal,
}

/// An error together with its flag and severity.
#[derive(Debug)]
pub struct FlaggedError {
    flag: ErrorFlag,
    severity: Severity,
    error: Error,
}

impl FlaggedError {
    /// Wraps an error with a flag and severity.
    #[must_use]
    pub const fn new(flag: ErrorFlag, severity: Severity, error: Error) -> Self {
        Self {
            flag,
            severity,
            error,
        }
    }

    /// The error category.
    #[must_use]
    pub const fn flag(&self) -> ErrorFlag {
        self.flag
    }

    /// The recorded severity.
    #[must_use]
    pub const fn severity(&self) -> Severity {
        self.severity
    }

    /// Whether this error was recorded as fatal.
    #[must_use]
    pub fn is_fatal(&self) -> bool {
        self.severity == Severity::Fatal
    }

    /// The underlying error.
    #[must_use]
    pub const fn error(&self) -> &Error {
        &self.error
    }

    /// Consumes the wrapper, returning the underlying error.
    #[must_use]
    pub fn into_error(self) -> Error {
        self.error
    }

    /// Key/value metadata describing the error.
    ///
    /// Keys are the constants in [`metadata`].
    #[must_use]
    pub fn metadata(&self) -> BTreeMap<&'static str, String> {
        let mut meta = BTreeMap::new();

        match &self.error {
            Error::EnvFileNotFound { path, .. } => {
                meta.insert(metadata::FILE_PATH, path.clone());
            }

            Error::InvalidLine { line, .. } => {
                meta.insert(metadata::LINE, line.clone());
            }

            Error::FailedTypeParsing {
                struct_name,
                field_name,
                variable,
                kind,
                value,
                ..
            }
            | Error::UnhandledType {
                struct_name,
                field_name,
                variable,
                kind,
                value,
            } => {
                meta.insert(metadata::STRUCT_NAME, (*struct_name).to_string());
                meta.insert(metadata::FIELD_NAME, (*field_name).to_string());
                meta.insert(metadata::VARIABLE, variable.clone());
                meta.insert(metadata::KIND, kind.to_string());
                meta.insert(metadata::ENV_VALUE, value.clone());
            }

            Error::Multiple { .. } => {}
        }

        meta
    }
}

impl Display for FlaggedError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.flag, self.error)
    }
}

/// Soft errors accumulated by one parse or injection call.
///
/// Each call returns its own collection, so nothing is shared between
/// concurrent loads.
#[derive(Debug, Default)]
#[must_use]
pub struct ErrorCollection {
    errors: Vec<FlaggedError>,
}

impl ErrorCollection {
    /// Creates an empty collection.
    pub const fn new() -> Self {
        Self { errors: Vec::new() }
    }

    /// Records a recoverable error.
    pub fn add(&mut self, flag: ErrorFlag, error: Error) {
        self.push(FlaggedError::new(flag, Severity::Recoverable, error));
    }

    /// Records a fatal error.
    pub fn add_fatal(&mut self, flag: ErrorFlag, error: Error) {
        self.push(FlaggedError::new(flag, Severity::Fatal, error));
    }

    /// Records an already wrapped error.
    pub fn push(&mut self, error: FlaggedError) {
        self.errors.push(error);
    }

    /// Moves every error of `other` into this collection.
    pub fn extend(&mut self, other: ErrorCollection) {
        self.errors.extend(other.errors);
    }

    /// Whether any error was recorded.
    #[must_use]
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    /// Whether any recorded error is fatal.
    #[must_use]
    pub fn has_fatal_error(&self) -> bool {
        self.errors.iter().any(FlaggedError::is_fatal)
    }

    /// Removes and returns the first fatal error.
    pub fn take_fatal(&mut self) -> Option<FlaggedError> {
        let index = self.errors.iter().position(FlaggedError::is_fatal)?;
        Some(self.errors.remove(index))
    }

    /// The first recorded error.
    #[must_use]
    pub fn first_error(&self) -> Option<&FlaggedError> {
        self.errors.first()
    }

    /// Number of recorded errors.
    #[must_use]
    pub fn count(&self) -> usize {
        self.errors.len()
    }

    /// Whether the collection is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    /// Iterates over the recorded errors in insertion order.
    pub fn iter(&self) -> std::slice::Iter<'_, FlaggedError> {
        self.errors.iter()
    }

    /// Iterates over the errors carrying `flag`.
    pub fn with_flag(&self, flag: ErrorFlag) -> impl Iterator<Item = &FlaggedError> {
        self.errors.iter().filter(move |e| e.flag == flag)
    }

    /// Folds the collection into a single [`Error`].
    ///
    /// Returns `None` when nothing was recorded.
    #[must_use]
    pub fn into_error(self) -> Option<Error> {
        Error::multiple(
            self.errors
                .into_iter()
                .map(FlaggedError::into_error)
                .collect(),
        )
    }
}

impl IntoIterator for ErrorCollection {
    type Item = FlaggedError;
    type IntoIter = std::vec::IntoIter<FlaggedError>;

    fn into_iter(self) -> Self::IntoIter {
        self.errors.into_iter()
    }
}

impl<'a> IntoIterator for &'a ErrorCollection {
    type Item = &'a FlaggedError;
    type IntoIter = std::slice::Iter<'a, FlaggedError>;

    fn into_iter(self) -> Self::IntoIter {
        self.errors.iter()
    }
}
