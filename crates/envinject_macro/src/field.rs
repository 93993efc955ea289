//! Field classification.
//!
//! Decides, for each struct field, how the generated visitor treats it.
//! Attributes win; otherwise the decision is made from the syntactic type:
//!
//! ```text
//! bool, i8..i128, isize, u8..u128, usize, f32, f64, String  → Scalar
//! Option, Vec, sets, maps, smart pointers                   → Unhandled
//! *T, &T, [T], [T; N], (A, B), fn(), dyn Trait, impl Trait  → Unhandled
//! any other path type                                       → Nested
//! ```
//!
//! Classification is syntactic: a type alias to `u16` is seen as a nested
//! struct and needs `#[env(scalar)]`.

use proc_macro2::TokenStream as QuoteStream;
use quote::quote;
use syn::ext::IdentExt;
use syn::{Field, Ident, PathArguments, Result as SynResult, Type};

use crate::parse::{FieldMode, Parser};

/// Shapes without a coercion rule, mirrored from `envinject::UnhandledKind`.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Unhandled {
    Pointer,
    Reference,
    Slice,
    Array,
    Tuple,
    Sequence,
    Map,
    Option,
    Function,
    Interface,
    Other,
}

impl Unhandled {
    fn to_tokens(self) -> QuoteStream {
        let variant = match self {
            Self::Pointer => quote!(Pointer),
            Self::Reference => quote!(Reference),
            Self::Slice => quote!(Slice),
            Self::Array => quote!(Array),
            Self::Tuple => quote!(Tuple),
            Self::Sequence => quote!(Sequence),
            Self::Map => quote!(Map),
            Self::Option => quote!(Option),
            Self::Function => quote!(Function),
            Self::Interface => quote!(Interface),
            Self::Other => quote!(Other),
        };

        quote!(::envinject::UnhandledKind::#variant)
    }
}

/// How the visitor treats a field.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Treatment {
    Scalar { var: Option<String> },
    Nested { prefix: Option<String> },
    Unhandled { var: Option<String>, kind: Unhandled },
    Skip,
}

/// A classified named field.
pub struct EnvField {
    /// Field identifier, used for access (`self.#ident`).
    pub ident: Ident,

    /// Declared name without the raw prefix (`r#type` becomes `type`).
    pub name: String,

    pub ty: Type,
    pub treatment: Treatment,
}

impl EnvField {
    /// Classifies `field`. Callers guarantee the field is named.
    pub fn from_field(field: &Field) -> SynResult<Self> {
        let ident = field
            .ident
            .clone()
            .ok_or_else(|| syn::Error::new_spanned(field, "expected a named field"))?;
        let name = ident.unraw().to_string();
        let attr = Parser::parse_field(field)?;

        let treatment = match attr.mode {
            FieldMode::Skip => Treatment::Skip,
            FieldMode::Nested { prefix } => Treatment::Nested { prefix },
            FieldMode::Scalar => Treatment::Scalar { var: attr.var },
            FieldMode::Auto => match classify(&field.ty) {
                Shape::Scalar => Treatment::Scalar { var: attr.var },
                Shape::Unhandled(kind) => Treatment::Unhandled {
                    var: attr.var,
                    kind,
                },
                Shape::Nested if attr.var.is_some() => {
                    return Err(syn::Error::new_spanned(
                        &field.ty,
                        "`var` needs a scalar field; mark custom types `#[env(scalar)]`",
                    ));
                }
                Shape::Nested => Treatment::Nested { prefix: None },
            },
        };

        Ok(Self {
            ident,
            name,
            ty: field.ty.clone(),
            treatment,
        })
    }

    /// Expression building this field's `FieldDescriptor`, or `None` for
    /// skipped fields.
    pub fn descriptor(&self) -> Option<QuoteStream> {
        let name = &self.name;
        let ty = &self.ty;

        let tokens = match &self.treatment {
            Treatment::Scalar { var } => {
                let var = optional_str(var.as_deref());
                quote! {
                    ::envinject::FieldDescriptor::scalar(
                        #name,
                        #var,
                        <#ty as ::envinject::FromEnvValue>::KIND,
                    )
                }
            }

            Treatment::Nested { prefix } => {
                let prefix = optional_str(prefix.as_deref());
                quote!(::envinject::FieldDescriptor::nested(#name, #prefix))
            }

            Treatment::Unhandled { var, kind } => {
                let var = optional_str(var.as_deref());
                let kind = kind.to_tokens();
                quote!(::envinject::FieldDescriptor::unhandled(#name, #var, #kind))
            }

            Treatment::Skip => return None,
        };

        Some(tokens)
    }
}

fn optional_str(value: Option<&str>) -> QuoteStream {
    match value {
        Some(value) => quote!(::core::option::Option::Some(#value)),
        None => quote!(::core::option::Option::None),
    }
}

/// Result of syntactic type classification.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
enum Shape {
    Scalar,
    Nested,
    Unhandled(Unhandled),
}

const SCALARS: &[&str] = &[
    "bool", "i8", "i16", "i32", "i64", "i128", "isize", "u8", "u16", "u32", "u64", "u128",
    "usize", "f32", "f64", "String",
];

const SEQUENCES: &[&str] = &[
    "Vec",
    "VecDeque",
    "LinkedList",
    "BinaryHeap",
    "HashSet",
    "BTreeSet",
];

const MAPS: &[&str] = &["HashMap", "BTreeMap"];

const POINTERS: &[&str] = &["Box", "Rc", "Arc", "Cell", "RefCell", "NonNull", "Weak"];

fn classify(ty: &Type) -> Shape {
    match ty {
        Type::Path(path) if path.qself.is_none() => {
            let Some(last) = path.path.segments.last() else {
                return Shape::Unhandled(Unhandled::Other);
            };
            let ident = last.ident.to_string();
            let bare = matches!(last.arguments, PathArguments::None);

            if bare && SCALARS.contains(&ident.as_str()) {
                Shape::Scalar
            } else if ident == "Option" {
                Shape::Unhandled(Unhandled::Option)
            } else if SEQUENCES.contains(&ident.as_str()) {
                Shape::Unhandled(Unhandled::Sequence)
            } else if MAPS.contains(&ident.as_str()) {
                Shape::Unhandled(Unhandled::Map)
            } else if POINTERS.contains(&ident.as_str()) {
                Shape::Unhandled(Unhandled::Pointer)
            } else if bare && matches!(ident.as_str(), "char" | "str") {
                Shape::Unhandled(Unhandled::Other)
            } else {
                Shape::Nested
            }
        }

        Type::Ptr(_) => Shape::Unhandled(Unhandled::Pointer),
        Type::Reference(_) => Shape::Unhandled(Unhandled::Reference),
        Type::Slice(_) => Shape::Unhandled(Unhandled::Slice),
        Type::Array(_) => Shape::Unhandled(Unhandled::Array),
        Type::Tuple(_) => Shape::Unhandled(Unhandled::Tuple),
        Type::BareFn(_) => Shape::Unhandled(Unhandled::Function),
        Type::TraitObject(_) | Type::ImplTrait(_) => Shape::Unhandled(Unhandled::Interface),
        Type::Paren(inner) => classify(&inner.elem),
        Type::Group(inner) => classify(&inner.elem),
        _ => Shape::Unhandled(Unhandled::Other),
    }
}

#[cfg(test)]
mod tests {
    use syn::parse_quote;

    use super::*;

    fn treatment(field: Field) -> Treatment {
        EnvField::from_field(&field).unwrap().treatment
    }

    #[test]
    fn test_scalar_types() {
        for ty in [
            quote!(bool),
            quote!(u16),
            quote!(i128),
            quote!(f32),
            quote!(String),
            quote!(std::string::String),
        ] {
            let field: Field = parse_quote! { value: #ty };
            assert_eq!(treatment(field), Treatment::Scalar { var: None }, "{ty}");
        }
    }

    #[test]
    fn test_nested_by_default() {
        let field: Field = parse_quote! { database: Database };

        assert_eq!(treatment(field), Treatment::Nested { prefix: None });
    }

    #[test]
    fn test_unhandled_shapes() {
        let cases: Vec<(Field, Unhandled)> = vec![
            (parse_quote! { a: Option<u16> }, Unhandled::Option),
            (parse_quote! { a: Vec<String> }, Unhandled::Sequence),
            (parse_quote! { a: HashMap<String, u8> }, Unhandled::Map),
            (parse_quote! { a: Box<u8> }, Unhandled::Pointer),
            (parse_quote! { a: *const u8 }, Unhandled::Pointer),
            (parse_quote! { a: &'static str }, Unhandled::Reference),
            (parse_quote! { a: [u8; 4] }, Unhandled::Array),
            (parse_quote! { a: (u8, u8) }, Unhandled::Tuple),
            (parse_quote! { a: fn() }, Unhandled::Function),
            (parse_quote! { a: Box<dyn Fn()> }, Unhandled::Pointer),
            (parse_quote! { a: char }, Unhandled::Other),
        ];

        for (field, kind) in cases {
            assert_eq!(treatment(field), Treatment::Unhandled { var: None, kind });
        }
    }

    #[test]
    fn test_scalar_attribute_forces_coercion() {
        let field: Field = parse_quote! { #[env(scalar)] level: Level };

        assert_eq!(treatment(field), Treatment::Scalar { var: None });
    }

    #[test]
    fn test_var_on_nested_type_rejected() {
        let field: Field = parse_quote! { #[env(var = "LEVEL")] level: Level };

        assert!(EnvField::from_field(&field).is_err());
    }

    #[test]
    fn test_raw_identifier_name() {
        let field: Field = parse_quote! { r#type: String };
        let field = EnvField::from_field(&field).unwrap();

        assert_eq!(field.name, "type");
        assert_eq!(field.ident.to_string(), "r#type");
    }

    #[test]
    fn test_skipped_field_has_no_descriptor() {
        let field: Field = parse_quote! { #[env(skip)] handle: Handle };

        assert!(EnvField::from_field(&field).unwrap().descriptor().is_none());
    }
}
