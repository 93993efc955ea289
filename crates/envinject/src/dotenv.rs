//! Dotenv line parser.
//!
//! Decodes `.env`-style content into a [`VariableMap`]. Each line is checked
//! against a fixed grammar:
//!
//! ```text
//! ^(\s)*(export)?(\s)*([a-zA-Z_0-9])+=(")?(.)*(")?$
//! ```
//!
//! Lines that match are sanitized (leading `export` and surrounding
//! whitespace removed), split on the first `=`, and stored with one pair of
//! surrounding double quotes stripped from the value. Lines that do not
//! match, including blank lines, are recorded as
//! [`ErrorFlag::InvalidLine`] and skipped. There are no comments and no
//! multi-line values.
//!
//! The `export` keyword is only stripped when whitespace follows it, so
//! `exportKEY=1` stores `exportKEY` and `export=2` stores `export`. A stored
//! name is never empty.
//!
//! ```rust,ignore
//! use envinject::FileParser;
//!
//! let outcome = FileParser::new().parse(".env");
//! if let Some(variables) = &outcome.variables {
//!     println!("{} variables", variables.count());
//! }
//! println!("{} problems", outcome.errors.count());
//! ```

use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;

use crate::error::{Error, ErrorCollection, ErrorFlag};
use crate::variables::VariableMap;

static LINE_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"^(\s)*(export)?(\s)*([a-zA-Z_0-9])+=(")?(.)*(")?$"#)
        .expect("dotenv line grammar is a valid regex")
});

static EXPORT_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*(?:export\s+)?").expect("export prefix pattern is a valid regex")
});

/// Source name used for content parsed from memory.
const IN_MEMORY_SOURCE: &str = "dotenv";

/// Options controlling a [`FileParser`].
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct ParserOptions {
    /// Record an unreadable file as [`Severity::Fatal`](crate::Severity::Fatal)
    /// instead of recoverable.
    pub missing_file_is_fatal: bool,
}

/// Result of one parse call.
///
/// `variables` is `None` only when the file could not be read; invalid
/// lines never prevent a map from being returned.
#[derive(Debug)]
#[must_use]
pub struct ParseOutcome {
    /// Decoded variables, `None` if the file was unreadable.
    pub variables: Option<VariableMap>,

    /// Everything that went wrong along the way.
    pub errors: ErrorCollection,
}

impl ParseOutcome {
    /// Whether the source was readable.
    #[must_use]
    pub const fn is_ok(&self) -> bool {
        self.variables.is_some()
    }

    /// Splits the outcome into its parts.
    #[must_use]
    pub fn into_parts(self) -> (Option<VariableMap>, ErrorCollection) {
        (self.variables, self.errors)
    }
}

/// Parser for dotenv files.
///
/// Holds only immutable options, so one instance can be shared freely;
/// every call returns its own [`ParseOutcome`].
#[derive(Clone, Copy, Debug, Default)]
pub struct FileParser {
    options: ParserOptions,
}

impl FileParser {
    /// Creates a parser with default options.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            options: ParserOptions {
                missing_file_is_fatal: false,
            },
        }
    }

    /// Creates a parser with the given options.
    #[must_use]
    pub const fn with_options(options: ParserOptions) -> Self {
        Self { options }
    }

    /// Sets whether an unreadable file is recorded as fatal.
    #[must_use]
    pub const fn missing_file_fatal(mut self, fatal: bool) -> Self {
        self.options.missing_file_is_fatal = fatal;
        self
    }

    /// The parser's options.
    #[must_use]
    pub const fn options(&self) -> ParserOptions {
        self.options
    }

    /// Reads and parses the file at `path`.
    pub fn parse(&self, path: impl AsRef<Path>) -> ParseOutcome {
        let path = path.as_ref();
        let mut errors = ErrorCollection::new();

        let Some(content) = self.read_bytes(path, &mut errors) else {
            return ParseOutcome {
                variables: None,
                errors,
            };
        };

        let source_name = path.display().to_string();
        let variables = Self::parse_into(&source_name, &content, &mut errors);

        tracing::debug!(
            path = %source_name,
            variables = variables.count(),
            invalid_lines = errors.count(),
            "parsed dotenv file"
        );

        ParseOutcome {
            variables: Some(variables),
            errors,
        }
    }

    /// Parses in-memory bytes; invalid UTF-8 is replaced lossily.
    pub fn parse_bytes(&self, content: &[u8]) -> ParseOutcome {
        let mut errors = ErrorCollection::new();
        let variables = Self::parse_into(IN_MEMORY_SOURCE, content, &mut errors);

        ParseOutcome {
            variables: Some(variables),
            errors,
        }
    }

    /// Parses in-memory text.
    pub fn parse_str(&self, content: &str) -> ParseOutcome {
        self.parse_bytes(content.as_bytes())
    }

    /// Whether `line` matches the assignment grammar.
    #[must_use]
    pub fn is_line_valid(line: &str) -> bool {
        LINE_REGEX.is_match(line)
    }

    /// Removes leading whitespace, an `export` keyword, and surrounding
    /// whitespace.
    ///
    /// `export` is only stripped when whitespace follows it, so a variable
    /// named `exporter` keeps its name.
    #[must_use]
    pub fn sanitize_line(line: &str) -> &str {
        let rest = EXPORT_REGEX
            .find(line)
            .map_or(line, |prefix| &line[prefix.end()..]);

        rest.trim()
    }

    /// Splits a sanitized line on its first `=` into name and value.
    ///
    /// One leading and one trailing `"` are removed from the value.
    #[must_use]
    pub fn split_assignment(sanitized: &str) -> (&str, &str) {
        match sanitized.split_once('=') {
            Some((name, value)) => {
                let value = value.strip_prefix('"').unwrap_or(value);
                let value = value.strip_suffix('"').unwrap_or(value);
                (name, value)
            }
            None => (sanitized, ""),
        }
    }

    fn read_bytes(&self, path: &Path, errors: &mut ErrorCollection) -> Option<Vec<u8>> {
        match std::fs::read(path) {
            Ok(content) => Some(content),

            Err(source) => {
                let error = Error::EnvFileNotFound {
                    path: path.display().to_string(),
                    source,
                };

                if self.options.missing_file_is_fatal {
                    errors.add_fatal(ErrorFlag::EnvFileNotFound, error);
                } else {
                    errors.add(ErrorFlag::EnvFileNotFound, error);
                }

                tracing::debug!(path = %path.display(), "dotenv file could not be read");
                None
            }
        }
    }

    fn parse_into(source_name: &str, content: &[u8], errors: &mut ErrorCollection) -> VariableMap {
        let content = String::from_utf8_lossy(content);
        let mut variables = VariableMap::new();

        for (index, line) in content.lines().enumerate() {
            if !Self::is_line_valid(line) {
                tracing::trace!(source = source_name, line = index + 1, "rejected dotenv line");
                errors.add(
                    ErrorFlag::InvalidLine,
                    Error::invalid_line(source_name, line, index + 1),
                );
                continue;
            }

            let (name, value) = Self::split_assignment(Self::sanitize_line(line));
            variables.insert(name, value);
        }

        variables
    }
}
