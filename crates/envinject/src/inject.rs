//! Struct injection engine.
//!
//! Target structs derive [`EnvInject`](crate::EnvInject), which generates a
//! static list of [`FieldDescriptor`]s and a visitor that walks the fields
//! in declaration order. For every field the visitor calls back into an
//! [`InjectContext`]:
//!
//! ```text
//! field kind        context call              lookup name
//! ──────────        ────────────              ───────────
//! scalar            set_field()               var override, else PREFIX + UPPER(name)
//! nested struct     nested()                  prefix grows by UPPER(name) + "_"
//! unhandled         reject_unhandled()        as for scalars
//! ```
//!
//! Values are looked up in the override source first (the OS environment
//! by default) and then in the parsed [`VariableMap`]. Empty values count as
//! unset. A field without a value keeps whatever it held before; a field
//! whose value cannot be coerced keeps it too, and the problem is recorded
//! in the returned [`ErrorCollection`].
//!
//! ```rust,ignore
//! #[derive(Default, EnvInject)]
//! struct Config {
//!     #[env(var = "APP_NAME")]
//!     name: String,
//!     database: Database,      // DATABASE_HOST, DATABASE_PORT
//! }
//!
//! let mut config = Config::default();
//! let errors = envinject::inject_variables(&mut config, &variables);
//! ```

use crate::coerce::{FieldKind, FromEnvValue, UnhandledKind};
use crate::error::{Error, ErrorCollection, ErrorFlag};
use crate::lookup::{EnvLookup, OsEnv};
use crate::variables::VariableMap;

/// Static description of one struct field.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct FieldDescriptor {
    /// Field name as declared.
    pub name: &'static str,

    /// Explicit variable name, used verbatim without any prefix.
    pub var: Option<&'static str>,

    /// How values are coerced into the field.
    pub kind: FieldKind,

    /// Explicit prefix segment for nested fields.
    pub prefix: Option<&'static str>,
}

impl FieldDescriptor {
    /// Describes a scalar field.
    #[must_use]
    pub const fn scalar(name: &'static str, var: Option<&'static str>, kind: FieldKind) -> Self {
        Self {
            name,
            var,
            kind,
            prefix: None,
        }
    }

    /// Describes a nested struct field.
    #[must_use]
    pub const fn nested(name: &'static str, prefix: Option<&'static str>) -> Self {
        Self {
            name,
            var: None,
            kind: FieldKind::Struct,
            prefix,
        }
    }

    /// Describes a field no coercion rule exists for.
    #[must_use]
    pub const fn unhandled(
        name: &'static str,
        var: Option<&'static str>,
        kind: UnhandledKind,
    ) -> Self {
        Self {
            name,
            var,
            kind: FieldKind::Unhandled(kind),
            prefix: None,
        }
    }

    /// The variable this field resolves against under `prefix`.
    #[must_use]
    pub fn variable_name(&self, prefix: &str) -> String {
        match self.var {
            Some(var) => var.to_string(),
            None => format!("{prefix}{}", self.name.to_uppercase()),
        }
    }

    /// The prefix handed to the fields of a nested struct.
    #[must_use]
    pub fn nested_prefix(&self, prefix: &str) -> String {
        match self.prefix {
            Some(segment) => format!("{prefix}{segment}"),
            None => format!("{prefix}{}_", self.name.to_uppercase()),
        }
    }
}

/// Types whose fields can be populated from variables.
///
/// Implemented by `#[derive(EnvInject)]`; hand-written implementations are
/// possible but rarely needed.
pub trait EnvInject {
    /// Struct name reported in error metadata.
    const STRUCT_NAME: &'static str;

    /// Descriptors of every non-skipped field, in declaration order.
    const FIELDS: &'static [FieldDescriptor];

    /// Visits every field, resolving and assigning values through `cx`.
    fn inject_fields(&mut self, cx: &mut InjectContext<'_>);

    /// Appends every resolvable variable name under `prefix` to `names`.
    fn collect_variable_names(prefix: &str, names: &mut Vec<String>);

    /// Every variable name this type reads, prefixes applied.
    #[must_use]
    fn variable_names() -> Vec<String>
    where
        Self: Sized,
    {
        let mut names = Vec::new();
        Self::collect_variable_names("", &mut names);
        names
    }

    /// A `.env.example` template listing every variable with an empty value.
    #[must_use]
    fn env_example() -> String
    where
        Self: Sized,
    {
        let mut example = format!("# {} configuration\n", Self::STRUCT_NAME);

        for name in Self::variable_names() {
            example.push_str(&name);
            example.push_str("=\n");
        }

        example
    }

    /// Builds a default value and injects `variables` into it, with the
    /// process environment taking precedence.
    fn injected(variables: &VariableMap) -> (Self, ErrorCollection)
    where
        Self: Default + Sized,
    {
        let mut target = Self::default();
        let errors = inject_variables(&mut target, variables);
        (target, errors)
    }
}

/// Where a resolved value came from.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
enum Origin {
    Override,
    Variables,
}

/// State threaded through one injection walk.
///
/// Holds the accumulated prefix and the soft errors of this walk only.
pub struct InjectContext<'a> {
    variables: &'a VariableMap,
    env: &'a dyn EnvLookup,
    prefix: String,
    errors: ErrorCollection,
}

impl<'a> InjectContext<'a> {
    /// Creates a context resolving against `env` first, then `variables`.
    pub fn new(variables: &'a VariableMap, env: &'a dyn EnvLookup) -> Self {
        Self {
            variables,
            env,
            prefix: String::new(),
            errors: ErrorCollection::new(),
        }
    }

    /// The prefix accumulated from enclosing nested fields.
    #[must_use]
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Resolves the variable name and non-empty value for `field`.
    #[must_use]
    pub fn resolve(&self, field: &FieldDescriptor) -> (String, Option<String>) {
        let variable = field.variable_name(&self.prefix);

        match self.lookup(&variable) {
            Some((value, origin)) => {
                let source = match origin {
                    Origin::Override => self.env.name(),
                    Origin::Variables => "dotenv",
                };
                tracing::trace!(variable = %variable, source, "resolved variable");
                (variable, Some(value))
            }
            None => (variable, None),
        }
    }

    fn lookup(&self, variable: &str) -> Option<(String, Origin)> {
        if let Some(value) = self.env.lookup(variable).filter(|v| !v.is_empty()) {
            return Some((value, Origin::Override));
        }

        self.variables
            .get(variable)
            .filter(|v| !v.is_empty())
            .map(|v| (v.to_string(), Origin::Variables))
    }

    /// Resolves and coerces a value into `slot`.
    ///
    /// Returns `false` when a value was found but could not be coerced; the
    /// slot is left untouched and the failure recorded. A missing value
    /// leaves the slot untouched and returns `true`.
    pub fn set_field<T: FromEnvValue>(
        &mut self,
        struct_name: &'static str,
        field: &FieldDescriptor,
        slot: &mut T,
    ) -> bool {
        let (variable, Some(value)) = self.resolve(field) else {
            return true;
        };

        match T::from_env_value(&value) {
            Ok(parsed) => {
                *slot = parsed;
                true
            }

            Err(source) => {
                self.errors.add(
                    ErrorFlag::FailedTypeParsing,
                    Error::FailedTypeParsing {
                        struct_name,
                        field_name: field.name,
                        variable,
                        kind: T::KIND,
                        value,
                        source,
                    },
                );
                false
            }
        }
    }

    /// Records an `UnhandledType` error if a value exists for `field`.
    ///
    /// Returns `false` when an error was recorded.
    pub fn reject_unhandled(&mut self, struct_name: &'static str, field: &FieldDescriptor) -> bool {
        let (variable, Some(value)) = self.resolve(field) else {
            return true;
        };

        self.errors.add(
            ErrorFlag::UnhandledType,
            Error::UnhandledType {
                struct_name,
                field_name: field.name,
                variable,
                kind: field.kind,
                value,
            },
        );
        false
    }

    /// Runs `visit` with the prefix extended for the nested `field`.
    pub fn nested(&mut self, field: &FieldDescriptor, visit: impl FnOnce(&mut Self)) {
        let nested_prefix = field.nested_prefix(&self.prefix);
        let outer_prefix = std::mem::replace(&mut self.prefix, nested_prefix);

        visit(self);

        self.prefix = outer_prefix;
    }

    /// Consumes the context, returning the recorded errors.
    pub fn into_errors(self) -> ErrorCollection {
        self.errors
    }
}

/// Injects variables into configuration structs.
///
/// The override source defaults to the process environment.
#[derive(Clone, Debug, Default)]
pub struct Injector<E = OsEnv> {
    env: E,
}

impl Injector<OsEnv> {
    /// Creates an injector that reads overrides from the process environment.
    #[must_use]
    pub const fn new() -> Self {
        Self { env: OsEnv }
    }
}

impl<E: EnvLookup> Injector<E> {
    /// Creates an injector that reads overrides from `env`.
    #[must_use]
    pub const fn with_env(env: E) -> Self {
        Self { env }
    }

    /// Populates `target` from the override source and `variables`.
    ///
    /// Per-field failures never stop the walk; they are returned.
    pub fn inject_variables<T: EnvInject>(
        &self,
        target: &mut T,
        variables: &VariableMap,
    ) -> ErrorCollection {
        let mut cx = InjectContext::new(variables, &self.env);
        target.inject_fields(&mut cx);

        let errors = cx.into_errors();
        tracing::debug!(
            config = T::STRUCT_NAME,
            errors = errors.count(),
            "injected variables"
        );

        errors
    }
}

/// Populates `target` from `variables`, with the process environment taking
/// precedence.
pub fn inject_variables<T: EnvInject>(target: &mut T, variables: &VariableMap) -> ErrorCollection {
    Injector::new().inject_variables(target, variables)
}
