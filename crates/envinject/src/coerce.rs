//! String-to-scalar coercion for injected fields.
//!
//! Every leaf field is filled through [`FromEnvValue`]. The trait is
//! implemented for `bool`, all integer widths, `f32`/`f64` and `String`;
//! other types can opt in by implementing it and marking the field
//! `#[env(scalar)]`.
//!
//! | Kind | Accepted input |
//! |------|----------------|
//! | `bool` | `1 t T TRUE true True`, `0 f F FALSE false False` |
//! | signed integers | base 10 with optional sign, range-checked |
//! | unsigned integers | base 10 digits only, range-checked |
//! | floats | decimal or exponential, overflow to infinity rejected |
//! | `String` | anything, verbatim |

use std::error::Error as StdError;
use std::fmt::{self, Display, Formatter};
use std::num::{ParseFloatError, ParseIntError};

/// The coercion kind of a field, used for dispatch and error metadata.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum FieldKind {
    /// `bool`.
    Bool,

    /// Signed integer of the given width.
    Int {
        /// Width in bits.
        bits: u32,
    },

    /// Unsigned integer of the given width.
    Uint {
        /// Width in bits.
        bits: u32,
    },

    /// Floating point number of the given width.
    Float {
        /// Width in bits.
        bits: u32,
    },

    /// `String`, assigned verbatim.
    String,

    /// A user type implementing [`FromEnvValue`].
    Custom(&'static str),

    /// A nested struct walked recursively.
    Struct,

    /// A field type no coercion rule exists for.
    Unhandled(UnhandledKind),
}

impl FieldKind {
    /// Whether values can be assigned to fields of this kind.
    #[must_use]
    pub const fn is_scalar(self) -> bool {
        !matches!(self, FieldKind::Struct | FieldKind::Unhandled(_))
    }
}

impl Display for FieldKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            FieldKind::Bool => f.write_str("bool"),
            FieldKind::Int { bits } => write!(f, "i{bits}"),
            FieldKind::Uint { bits } => write!(f, "u{bits}"),
            FieldKind::Float { bits } => write!(f, "f{bits}"),
            FieldKind::String => f.write_str("String"),
            FieldKind::Custom(name) => f.write_str(name),
            FieldKind::Struct => f.write_str("struct"),
            FieldKind::Unhandled(kind) => write!(f, "{kind}"),
        }
    }
}

/// Shapes of field types that cannot be populated from a string.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum UnhandledKind {
    /// Raw pointers and smart pointers (`*const T`, `Box<T>`, `Arc<T>`, ...).
    Pointer,

    /// Borrowed references.
    Reference,

    /// Slices.
    Slice,

    /// Fixed-size arrays.
    Array,

    /// Tuples, including `()`.
    Tuple,

    /// Growable sequences and sets (`Vec<T>`, `HashSet<T>`, ...).
    Sequence,

    /// Maps (`HashMap<K, V>`, `BTreeMap<K, V>`).
    Map,

    /// `Option<T>`.
    Option,

    /// Function pointers.
    Function,

    /// Trait objects and `impl Trait`.
    Interface,

    /// Anything else.
    Other,
}

impl Display for UnhandledKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let name = match self {
            UnhandledKind::Pointer => "ptr",
            UnhandledKind::Reference => "reference",
            UnhandledKind::Slice => "slice",
            UnhandledKind::Array => "array",
            UnhandledKind::Tuple => "tuple",
            UnhandledKind::Sequence => "sequence",
            UnhandledKind::Map => "map",
            UnhandledKind::Option => "option",
            UnhandledKind::Function => "func",
            UnhandledKind::Interface => "interface",
            UnhandledKind::Other => "unknown",
        };

        f.write_str(name)
    }
}

/// Why a raw value could not be coerced.
#[derive(Debug, thiserror::Error)]
pub enum CoerceError {
    /// Not one of the accepted boolean spellings.
    #[error("invalid boolean syntax")]
    InvalidBool,

    /// Integer syntax or range error.
    #[error(transparent)]
    Int(#[from] ParseIntError),

    /// Explicit sign on an unsigned integer.
    #[error("sign not allowed for unsigned integer")]
    UnsignedSign,

    /// Float syntax error.
    #[error(transparent)]
    Float(#[from] ParseFloatError),

    /// Finite input that does not fit the float width.
    #[error("value out of range for f{bits}")]
    FloatOutOfRange {
        /// Width of the target float.
        bits: u32,
    },

    /// Error raised by a custom [`FromEnvValue`] implementation.
    #[error("{0}")]
    Custom(Box<dyn StdError + Send + Sync>),
}

impl CoerceError {
    /// Wraps an arbitrary error from a custom coercion.
    pub fn custom(error: impl Into<Box<dyn StdError + Send + Sync>>) -> Self {
        CoerceError::Custom(error.into())
    }
}

/// Conversion from a raw variable value into a field value.
///
/// ```rust,ignore
/// use envinject::{CoerceError, FieldKind, FromEnvValue};
///
/// struct Level(u8);
///
/// impl FromEnvValue for Level {
///     const KIND: FieldKind = FieldKind::Custom("Level");
///
///     fn from_env_value(raw: &str) -> Result<Self, CoerceError> {
///         u8::from_env_value(raw).map(Level)
///     }
/// }
/// ```
pub trait FromEnvValue: Sized {
    /// Kind reported in descriptors and error metadata.
    const KIND: FieldKind;

    /// Coerces `raw` into `Self`.
    fn from_env_value(raw: &str) -> Result<Self, CoerceError>;
}

impl FromEnvValue for bool {
    const KIND: FieldKind = FieldKind::Bool;

    fn from_env_value(raw: &str) -> Result<Self, CoerceError> {
        match raw {
            "1" | "t" | "T" | "TRUE" | "true" | "True" => Ok(true),
            "0" | "f" | "F" | "FALSE" | "false" | "False" => Ok(false),
            _ => Err(CoerceError::InvalidBool),
        }
    }
}

impl FromEnvValue for String {
    const KIND: FieldKind = FieldKind::String;

    fn from_env_value(raw: &str) -> Result<Self, CoerceError> {
        Ok(raw.to_string())
    }
}

macro_rules! impl_integer {
    (Int: $($ty:ty),+) => {
        $(
            impl FromEnvValue for $ty {
                const KIND: FieldKind = FieldKind::Int { bits: <$ty>::BITS };

                fn from_env_value(raw: &str) -> Result<Self, CoerceError> {
                    Ok(raw.parse::<$ty>()?)
                }
            }
        )+
    };
    (Uint: $($ty:ty),+) => {
        $(
            impl FromEnvValue for $ty {
                const KIND: FieldKind = FieldKind::Uint { bits: <$ty>::BITS };

                fn from_env_value(raw: &str) -> Result<Self, CoerceError> {
                    if raw.starts_with('+') {
                        return Err(CoerceError::UnsignedSign);
                    }
                    Ok(raw.parse::<$ty>()?)
                }
            }
        )+
    };
}

impl_integer!(Int: i8, i16, i32, i64, i128, isize);
impl_integer!(Uint: u8, u16, u32, u64, u128, usize);

/// Whether `raw` spells infinity explicitly (`inf`, `-Infinity`, ...).
fn is_explicit_infinity(raw: &str) -> bool {
    let unsigned = raw.trim_start_matches(['+', '-']);
    unsigned.eq_ignore_ascii_case("inf") || unsigned.eq_ignore_ascii_case("infinity")
}

macro_rules! impl_float {
    ($($ty:ty => $bits:expr),+) => {
        $(
            impl FromEnvValue for $ty {
                const KIND: FieldKind = FieldKind::Float { bits: $bits };

                fn from_env_value(raw: &str) -> Result<Self, CoerceError> {
                    let value = raw.parse::<$ty>()?;

                    if value.is_infinite() && !is_explicit_infinity(raw) {
                        return Err(CoerceError::FloatOutOfRange { bits: $bits });
                    }

                    Ok(value)
                }
            }
        )+
    };
}

impl_float!(f32 => 32, f64 => 64);
