//! Code generation for `#[derive(EnvInject)]`.
//!
//! For
//!
//! ```ignore
//! #[derive(EnvInject)]
//! struct Config {
//!     port: u16,
//!     database: Database,
//!     tags: Vec<String>,
//! }
//! ```
//!
//! the expander emits, in outline:
//!
//! ```ignore
//! impl ::envinject::EnvInject for Config {
//!     const STRUCT_NAME: &'static str = "Config";
//!     const FIELDS: &'static [FieldDescriptor] = &[
//!         FieldDescriptor::scalar("port", None, <u16 as FromEnvValue>::KIND),
//!         FieldDescriptor::nested("database", None),
//!         FieldDescriptor::unhandled("tags", None, UnhandledKind::Sequence),
//!     ];
//!
//!     fn inject_fields(&mut self, cx: &mut InjectContext<'_>) {
//!         cx.set_field(Self::STRUCT_NAME, &Self::FIELDS[0], &mut self.port);
//!         cx.nested(&Self::FIELDS[1], |cx| EnvInject::inject_fields(&mut self.database, cx));
//!         cx.reject_unhandled(Self::STRUCT_NAME, &Self::FIELDS[2]);
//!     }
//!
//!     fn collect_variable_names(prefix: &str, names: &mut Vec<String>) { ... }
//! }
//! ```

use proc_macro::TokenStream;
use proc_macro2::TokenStream as QuoteStream;
use quote::quote;
use syn::{Data, DataStruct, DeriveInput, Error as SynError, Fields, Result as SynResult};

use crate::field::{EnvField, Treatment};

const NAMED_STRUCTS_ONLY: &str = "`EnvInject` can only be derived for structs with named fields";

/// Orchestrates expansion of one derive input.
pub struct Expander;

impl Expander {
    /// Validates the input and generates the `EnvInject` impl.
    pub fn expand(input: DeriveInput) -> SynResult<TokenStream> {
        let fields = match &input.data {
            Data::Struct(DataStruct {
                fields: Fields::Named(named),
                ..
            }) => &named.named,

            Data::Struct(_) | Data::Enum(_) | Data::Union(_) => {
                return Err(SynError::new_spanned(&input.ident, NAMED_STRUCTS_ONLY));
            }
        };

        let fields = fields
            .iter()
            .map(EnvField::from_field)
            .collect::<SynResult<Vec<_>>>()?;

        Ok(Self::generate(&input, &fields).into())
    }

    fn generate(input: &DeriveInput, fields: &[EnvField]) -> QuoteStream {
        let ident = &input.ident;
        let struct_name = ident.to_string();
        let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

        let active: Vec<&EnvField> = fields
            .iter()
            .filter(|field| field.treatment != Treatment::Skip)
            .collect();

        let descriptors = active.iter().filter_map(|field| field.descriptor());

        let visits = active.iter().enumerate().map(|(index, field)| {
            let member = &field.ident;
            let ty = &field.ty;

            match field.treatment {
                Treatment::Scalar { .. } => quote! {
                    cx.set_field(Self::STRUCT_NAME, &Self::FIELDS[#index], &mut self.#member);
                },
                Treatment::Nested { .. } => quote! {
                    cx.nested(&Self::FIELDS[#index], |cx| {
                        <#ty as ::envinject::EnvInject>::inject_fields(&mut self.#member, cx);
                    });
                },
                Treatment::Unhandled { .. } => quote! {
                    cx.reject_unhandled(Self::STRUCT_NAME, &Self::FIELDS[#index]);
                },
                Treatment::Skip => QuoteStream::new(),
            }
        });

        let names = active.iter().enumerate().map(|(index, field)| {
            let ty = &field.ty;

            match field.treatment {
                Treatment::Scalar { .. } => quote! {
                    names.push(Self::FIELDS[#index].variable_name(prefix));
                },
                Treatment::Nested { .. } => quote! {
                    <#ty as ::envinject::EnvInject>::collect_variable_names(
                        &Self::FIELDS[#index].nested_prefix(prefix),
                        names,
                    );
                },
                Treatment::Unhandled { .. } | Treatment::Skip => QuoteStream::new(),
            }
        });

        quote! {
            #[automatically_derived]
            impl #impl_generics ::envinject::EnvInject for #ident #ty_generics #where_clause {
                const STRUCT_NAME: &'static str = #struct_name;

                const FIELDS: &'static [::envinject::FieldDescriptor] = &[
                    #(#descriptors),*
                ];

                #[allow(unused_variables)]
                fn inject_fields(&mut self, cx: &mut ::envinject::InjectContext<'_>) {
                    #(#visits)*
                }

                #[allow(unused_variables)]
                fn collect_variable_names(
                    prefix: &str,
                    names: &mut ::std::vec::Vec<::std::string::String>,
                ) {
                    #(#names)*
                }
            }
        }
    }
}
