//! Attribute parsing for `#[env(var = "NAME", nested, prefix = "DB_", scalar, skip)]`.
//!
//! Options are accumulated one at a time by [`Parser::parse_meta`] and then
//! checked as a whole by [`Parser::build`], so that conflicting combinations
//! are reported together:
//!
//! ```ignore
//! #[env(var = "HTTP_PORT")]          // Explicit variable name
//! #[env(nested)]                     // Force recursion
//! #[env(nested, prefix = "DB_")]     // Recursion with an explicit prefix
//! #[env(scalar)]                     // Custom FromEnvValue type
//! #[env(skip)]                       // Never touched
//! ```

use std::collections::HashSet;

use syn::meta::ParseNestedMeta;
use syn::{Attribute, Error as SynError, Field, LitStr, Result as SynResult};

/// How an attribute overrides the type-driven field classification.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub enum FieldMode {
    /// No override; classify from the type.
    #[default]
    Auto,

    /// Recurse into the field, optionally with an explicit prefix segment.
    Nested { prefix: Option<String> },

    /// Coerce through `FromEnvValue`.
    Scalar,

    /// Leave the field alone.
    Skip,
}

/// Parsed `#[env(...)]` attribute of one field.
#[derive(Clone, Debug, Default)]
pub struct EnvAttr {
    /// Explicit variable name.
    pub var: Option<String>,

    /// Classification override.
    pub mode: FieldMode,
}

/// Builder accumulating the options of one `#[env(...)]` attribute.
#[derive(Default)]
pub struct Parser {
    var: Option<LitStr>,
    prefix: Option<LitStr>,
    nested: bool,
    scalar: bool,
    skip: bool,

    /// Options already seen, for duplicate detection.
    seen: HashSet<&'static str>,
}

impl Parser {
    /// Parses every `#[env(...)]` attribute on `field`.
    ///
    /// Fields without the attribute get the default [`EnvAttr`]. Options
    /// may be split over several attributes; duplicates across them are
    /// still rejected.
    pub fn parse_field(field: &Field) -> SynResult<EnvAttr> {
        let mut builder = Self::default();
        let mut last_attr = None;

        for attr in &field.attrs {
            if !attr.path().is_ident("env") {
                continue;
            }

            attr.parse_nested_meta(|meta: ParseNestedMeta<'_>| builder.parse_meta(meta))?;
            last_attr = Some(attr);
        }

        match last_attr {
            Some(attr) => builder.build(attr),
            None => Ok(EnvAttr::default()),
        }
    }

    #[expect(
        clippy::needless_pass_by_value,
        reason = "ParseNestedMeta is passed by value per syn's parse_nested_meta callback signature"
    )]
    fn parse_meta(&mut self, meta: ParseNestedMeta) -> SynResult<()> {
        let ident = meta
            .path
            .get_ident()
            .ok_or_else(|| meta.error("expected identifier"))?;
        let name = ident.to_string();

        let key: &'static str = match name.as_str() {
            "var" => "var",
            "prefix" => "prefix",
            "nested" => "nested",
            "scalar" => "scalar",
            "skip" => "skip",
            _ => return Err(meta.error(format!("unknown option `{name}`"))),
        };

        if !self.seen.insert(key) {
            return Err(meta.error(format!("duplicate option `{key}`")));
        }

        match key {
            "var" => {
                let lit: LitStr = meta.value()?.parse()?;
                if lit.value().is_empty() {
                    return Err(SynError::new_spanned(&lit, "`var` must not be empty"));
                }
                self.var = Some(lit);
            }

            "prefix" => {
                let lit: LitStr = meta.value()?.parse()?;
                if lit.value().is_empty() {
                    return Err(SynError::new_spanned(&lit, "`prefix` must not be empty"));
                }
                self.prefix = Some(lit);
            }

            "nested" => self.nested = true,
            "scalar" => self.scalar = true,
            "skip" => self.skip = true,

            _ => unreachable!("option names are validated above"),
        }

        Ok(())
    }

    /// Validates option combinations.
    fn build(self, attr: &Attribute) -> SynResult<EnvAttr> {
        if self.skip {
            let incompatible: Vec<&str> = [
                self.var.is_some().then_some("var"),
                self.prefix.is_some().then_some("prefix"),
                self.nested.then_some("nested"),
                self.scalar.then_some("scalar"),
            ]
            .into_iter()
            .flatten()
            .collect();

            if !incompatible.is_empty() {
                return Err(SynError::new_spanned(
                    attr,
                    format!("cannot use `{}` with `skip`", incompatible.join("`, `")),
                ));
            }

            return Ok(EnvAttr {
                var: None,
                mode: FieldMode::Skip,
            });
        }

        if self.nested {
            let incompatible: Vec<&str> = [
                self.var.is_some().then_some("var"),
                self.scalar.then_some("scalar"),
            ]
            .into_iter()
            .flatten()
            .collect();

            if !incompatible.is_empty() {
                return Err(SynError::new_spanned(
                    attr,
                    format!("cannot use `{}` with `nested`", incompatible.join("`, `")),
                ));
            }

            return Ok(EnvAttr {
                var: None,
                mode: FieldMode::Nested {
                    prefix: self.prefix.map(|lit| lit.value()),
                },
            });
        }

        if let Some(prefix) = &self.prefix {
            return Err(SynError::new_spanned(
                prefix,
                "`prefix` can only be used with `nested`",
            ));
        }

        Ok(EnvAttr {
            var: self.var.map(|lit| lit.value()),
            mode: if self.scalar {
                FieldMode::Scalar
            } else {
                FieldMode::Auto
            },
        })
    }
}
