//! HostProperties derive macro implementation

use proc_macro2::TokenStream;
use quote::{format_ident, quote};
use syn::DeriveInput;

use crate::parse::{parse_host_properties, HostFieldArgs, HostPropertiesArgs};

/// Generate the HostProperties implementation
pub fn derive_host_properties(input: DeriveInput) -> TokenStream {
    match parse_host_properties(&input) {
        Ok(args) => generate_impl(args),
        Err(e) => e.write_errors(),
    }
}

fn generate_impl(args: HostPropertiesArgs) -> TokenStream {
    let struct_name = &args.ident;
    let enum_name = &args.enum_name;
    let vis = &args.vis;

    let fields = match args.data {
        darling::ast::Data::Struct(fields) => fields.fields,
        _ => {
            return syn::Error::new_spanned(
                &args.ident,
                "HostProperties can only be derived for structs",
            )
            .to_compile_error()
        }
    };

    let properties: Vec<&HostFieldArgs> = fields.iter().filter(|f| f.property).collect();

    // Duplicate script names would make name resolution ambiguous
    let mut seen = std::collections::HashSet::new();
    for field in &properties {
        let name = field.script_name();
        if !seen.insert(name.clone()) {
            return syn::Error::new_spanned(
                &field.ident,
                format!("duplicate host property name `{}`", name),
            )
            .to_compile_error();
        }
    }

    let variants: Vec<_> = properties
        .iter()
        .map(|f| format_ident!("{}", f.variant_name()))
        .collect();
    let script_names: Vec<_> = properties.iter().map(|f| f.script_name()).collect();
    let readonly: Vec<_> = properties.iter().map(|f| f.readonly).collect();
    let field_idents: Vec<_> = properties.iter().map(|f| f.ident.as_ref()).collect();
    let field_types: Vec<_> = properties.iter().map(|f| &f.ty).collect();

    let variant_docs: Vec<_> = script_names
        .iter()
        .map(|name| format!("The `{}` property", name))
        .collect();
    let enum_doc = format!("Script-visible properties of [`{}`]", struct_name);

    quote! {
        #[doc = #enum_doc]
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        #vis enum #enum_name {
            #(
                #[doc = #variant_docs]
                #variants,
            )*
        }

        impl #enum_name {
            /// Every property, in declaration order
            pub const ALL: &'static [Self] = &[#(Self::#variants),*];

            /// Script-visible name of the property
            pub const fn name(self) -> &'static str {
                match self {
                    #(Self::#variants => #script_names,)*
                }
            }

            /// Whether script writes to the property are ignored
            pub const fn is_readonly(self) -> bool {
                match self {
                    #(Self::#variants => #readonly,)*
                }
            }
        }

        impl ::jsbridge_core::events::HostProperties for #struct_name {
            type Property = #enum_name;

            fn property_table() -> &'static ::jsbridge_core::events::PropertyTable<#enum_name> {
                static TABLE: ::std::sync::OnceLock<::jsbridge_core::events::PropertyTable<#enum_name>> =
                    ::std::sync::OnceLock::new();
                TABLE.get_or_init(|| {
                    ::jsbridge_core::events::PropertyTable::new(
                        #enum_name::ALL.iter().map(|property| (property.name(), *property)),
                    )
                })
            }

            fn is_readonly(property: #enum_name) -> bool {
                property.is_readonly()
            }

            fn get_property(&self, property: #enum_name) -> ::jsbridge_core::engine::ScriptValue {
                match property {
                    #(
                        #enum_name::#variants => {
                            <#field_types as ::jsbridge_core::engine::ToScriptValue>::to_script_value(
                                &self.#field_idents,
                            )
                        }
                    )*
                }
            }

            fn init_property(
                &mut self,
                property: #enum_name,
                value: &::jsbridge_core::engine::ScriptValue,
            ) {
                match property {
                    #(
                        #enum_name::#variants => {
                            self.#field_idents =
                                <#field_types as ::jsbridge_core::engine::FromScriptValue>::from_script_value(value);
                        }
                    )*
                }
            }
        }
    }
}
