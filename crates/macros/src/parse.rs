//! Attribute parsing for HostProperties derive macro

use darling::{FromDeriveInput, FromField};
use syn::{DeriveInput, Ident, Type, Visibility};

/// Parsed #[host(...)] attributes on the struct
#[derive(Debug, FromDeriveInput)]
#[darling(attributes(host), supports(struct_named))]
pub struct HostPropertiesArgs {
    /// Struct identifier
    pub ident: Ident,

    /// Struct visibility (reused for the generated enum)
    pub vis: Visibility,

    /// Struct fields
    pub data: darling::ast::Data<(), HostFieldArgs>,

    /// Name of the generated property identifier enum
    /// (e.g., "IntersectionChangeEventProperty")
    pub enum_name: Ident,
}

/// Parsed #[host(...)] attributes on a field
#[derive(Debug, FromField)]
#[darling(attributes(host))]
pub struct HostFieldArgs {
    /// Field identifier
    pub ident: Option<Ident>,

    /// Field type
    pub ty: Type,

    /// Whether this field is exposed to script
    #[darling(default)]
    pub property: bool,

    /// Script-visible name; defaults to the camelCase field name
    #[darling(default)]
    pub name: Option<String>,

    /// Whether script writes are ignored (init dictionaries still apply)
    #[darling(default)]
    pub readonly: bool,
}

impl HostFieldArgs {
    /// Script-visible property name
    pub fn script_name(&self) -> String {
        match (&self.name, &self.ident) {
            (Some(name), _) => name.clone(),
            (None, Some(ident)) => lower_camel(&ident.to_string()),
            (None, None) => String::new(),
        }
    }

    /// Identifier of the enum variant for this field
    pub fn variant_name(&self) -> String {
        self.ident
            .as_ref()
            .map(|ident| upper_camel(&ident.to_string()))
            .unwrap_or_default()
    }
}

/// `intersection_ratio` -> `IntersectionRatio`
pub fn upper_camel(snake: &str) -> String {
    snake
        .trim_start_matches('_')
        .split('_')
        .filter(|part| !part.is_empty())
        .map(|part| {
            let mut chars = part.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect()
}

/// `intersection_ratio` -> `intersectionRatio`
pub fn lower_camel(snake: &str) -> String {
    let upper = upper_camel(snake);
    let mut chars = upper.chars();
    match chars.next() {
        Some(first) => first.to_lowercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Parse a DeriveInput into HostPropertiesArgs
pub fn parse_host_properties(input: &DeriveInput) -> darling::Result<HostPropertiesArgs> {
    HostPropertiesArgs::from_derive_input(input)
}
