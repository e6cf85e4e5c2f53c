//! Intermediate model consumed by the generators.
//!
//! A [`ParsedSources`] value is a read-only snapshot of the declarations found in
//! one input directory. Every entity carries the raw doc-comment lines it was
//! declared with ([`DocLines`]); the annotation engine never looks at anything else.
//! Generators derive facts from the model but never mutate it.

use serde::{Deserialize, Serialize};

/// Ordered raw comment lines attached to one declaration.
pub type DocLines = Vec<String>;

/// All declarations extracted from one generation unit.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ParsedSources {
    pub structs: Vec<Struct>,
    pub enums: Vec<Enum>,
    pub interfaces: Vec<Interface>,
}

impl ParsedSources {
    pub fn is_empty(&self) -> bool {
        self.structs.is_empty() && self.enums.is_empty() && self.interfaces.is_empty()
    }

    /// Every doc block in the model, paired with a short description of its owner.
    pub fn doc_blocks(&self) -> Vec<(String, &DocLines)> {
        let mut blocks = Vec::new();
        for s in &self.structs {
            blocks.push((format!("struct {}", s.name), &s.doc_lines));
            for f in &s.fields {
                blocks.push((format!("field {}.{}", s.name, f.name), &f.doc_lines));
            }
            for o in &s.operations {
                blocks.push((format!("method {}::{}", s.name, o.name), &o.doc_lines));
            }
        }
        for e in &self.enums {
            blocks.push((format!("enum {}", e.name), &e.doc_lines));
            for l in &e.literals {
                blocks.push((format!("variant {}::{}", e.name, l.name), &l.doc_lines));
            }
        }
        for i in &self.interfaces {
            blocks.push((format!("trait {}", i.name), &i.doc_lines));
            for m in &i.methods {
                blocks.push((format!("method {}::{}", i.name, m.name), &m.doc_lines));
            }
        }
        blocks
    }
}

/// A struct declaration together with its inherent methods.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Struct {
    pub doc_lines: DocLines,
    pub package_name: String,
    pub filename: String,
    pub name: String,
    pub fields: Vec<Field>,
    pub operations: Vec<Operation>,
}

/// A named field, function argument or return slot.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Field {
    pub doc_lines: DocLines,
    pub name: String,
    pub type_name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Enum {
    pub doc_lines: DocLines,
    pub package_name: String,
    pub filename: String,
    pub name: String,
    pub literals: Vec<EnumLiteral>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EnumLiteral {
    pub doc_lines: DocLines,
    pub name: String,
    /// Explicit discriminant, if one was written
    pub value: Option<String>,
}

/// A trait declaration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Interface {
    pub doc_lines: DocLines,
    pub package_name: String,
    pub filename: String,
    pub name: String,
    pub methods: Vec<Operation>,
}

/// A method of a struct (inherent impl) or of an interface (trait).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Operation {
    pub doc_lines: DocLines,
    pub package_name: String,
    pub filename: String,
    pub name: String,
    /// Owning struct or trait
    pub related_struct: Option<String>,
    pub is_async: bool,
    /// Arguments after the receiver
    pub input_args: Vec<Field>,
    /// Success value (`T` of `Result<T, E>`, or the plain return type)
    pub output: Option<Field>,
    /// Error value (`E` of `Result<T, E>`)
    pub error: Option<Field>,
}

const INT_TYPES: &[&str] = &[
    "i8", "i16", "i32", "i64", "i128", "isize", "u8", "u16", "u32", "u64", "u128", "usize",
];
const FLOAT_TYPES: &[&str] = &["f32", "f64"];

impl Field {
    pub fn new(name: impl Into<String>, type_name: impl Into<String>) -> Self {
        Self {
            doc_lines: Vec::new(),
            name: name.into(),
            type_name: type_name.into(),
        }
    }

    pub fn is_reference(&self) -> bool {
        self.type_name.starts_with('&')
    }

    /// `&mut Foo` -> `Foo`, `&'a str` -> `str`
    pub fn dereferenced_type_name(&self) -> &str {
        dereference(&self.type_name)
    }

    pub fn is_option(&self) -> bool {
        generic_inner(self.dereferenced_type_name(), "Option").is_some()
    }

    pub fn is_vec(&self) -> bool {
        self.element_type_name().is_some()
    }

    /// Element type of `Vec<T>` or `[T]`.
    pub fn element_type_name(&self) -> Option<&str> {
        let ty = self.dereferenced_type_name();
        generic_inner(ty, "Vec").or_else(|| ty.strip_prefix('[').and_then(|t| t.strip_suffix(']')))
    }

    /// Inner type of `Option<T>`, or the type itself.
    pub fn value_type_name(&self) -> &str {
        let ty = self.dereferenced_type_name();
        generic_inner(ty, "Option").unwrap_or(ty)
    }

    pub fn is_bool(&self) -> bool {
        self.value_type_name() == "bool"
    }

    pub fn is_int(&self) -> bool {
        INT_TYPES.contains(&self.value_type_name())
    }

    pub fn is_float(&self) -> bool {
        FLOAT_TYPES.contains(&self.value_type_name())
    }

    pub fn is_string(&self) -> bool {
        is_string_type(self.value_type_name())
    }

    pub fn is_primitive(&self) -> bool {
        self.is_bool() || self.is_int() || self.is_float() || self.is_string()
    }

    pub fn is_string_vec(&self) -> bool {
        self.element_type_name().is_some_and(is_string_type)
    }

    pub fn is_primitive_vec(&self) -> bool {
        self.element_type_name().is_some_and(|e| {
            e == "bool" || INT_TYPES.contains(&e) || FLOAT_TYPES.contains(&e) || is_string_type(e)
        })
    }

    pub fn is_custom(&self) -> bool {
        !self.is_primitive() && !self.is_primitive_vec()
    }

    /// `events::OrderCreated` -> (`events`, `OrderCreated`)
    pub fn split_type_name(&self) -> (&str, &str) {
        let ty = self.dereferenced_type_name();
        match ty.rfind("::") {
            Some(idx) => (&ty[..idx], &ty[idx + 2..]),
            None => ("", ty),
        }
    }
}

fn is_string_type(ty: &str) -> bool {
    ty == "String" || ty == "str"
}

fn dereference(ty: &str) -> &str {
    let mut ty = ty.trim();
    while let Some(rest) = ty.strip_prefix('&') {
        ty = rest.trim_start();
        if ty.starts_with('\'') {
            ty = ty.split_once(' ').map(|(_, t)| t).unwrap_or("").trim_start();
        }
        if let Some(rest) = ty.strip_prefix("mut ") {
            ty = rest.trim_start();
        }
    }
    ty
}

fn generic_inner<'a>(ty: &'a str, wrapper: &str) -> Option<&'a str> {
    ty.strip_prefix(wrapper)
        .and_then(|t| t.strip_prefix('<'))
        .and_then(|t| t.strip_suffix('>'))
        .map(str::trim)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dereferenced_type_name() {
        assert_eq!(Field::new("a", "&str").dereferenced_type_name(), "str");
        assert_eq!(Field::new("a", "&mut Order").dereferenced_type_name(), "Order");
        assert_eq!(Field::new("a", "&'a str").dereferenced_type_name(), "str");
        assert_eq!(Field::new("a", "Order").dereferenced_type_name(), "Order");
        assert!(Field::new("a", "&Order").is_reference());
    }

    #[test]
    fn test_primitive_classification() {
        assert!(Field::new("a", "bool").is_bool());
        assert!(Field::new("a", "u32").is_int());
        assert!(Field::new("a", "Option<i64>").is_int());
        assert!(Field::new("a", "f64").is_float());
        assert!(Field::new("a", "String").is_string());
        assert!(Field::new("a", "&str").is_string());
        assert!(Field::new("a", "String").is_primitive());
        assert!(!Field::new("a", "Person").is_primitive());
    }

    #[test]
    fn test_vec_classification() {
        let tags = Field::new("tags", "Vec<String>");
        assert!(tags.is_vec());
        assert!(tags.is_string_vec());
        assert!(tags.is_primitive_vec());
        assert!(!tags.is_custom());
        assert_eq!(tags.element_type_name(), Some("String"));

        let slice = Field::new("ids", "&[u32]");
        assert!(slice.is_vec());
        assert_eq!(slice.element_type_name(), Some("u32"));

        let colors = Field::new("colors", "Vec<Color>");
        assert!(colors.is_vec());
        assert!(!colors.is_primitive_vec());
        assert!(colors.is_custom());
    }

    #[test]
    fn test_option_classification() {
        let f = Field::new("email", "Option<String>");
        assert!(f.is_option());
        assert_eq!(f.value_type_name(), "String");
        assert!(!Field::new("email", "String").is_option());
    }

    #[test]
    fn test_split_type_name() {
        assert_eq!(
            Field::new("e", "events::OrderCreated").split_type_name(),
            ("events", "OrderCreated")
        );
        assert_eq!(
            Field::new("e", "&crate::events::OrderCreated").split_type_name(),
            ("crate::events", "OrderCreated")
        );
        assert_eq!(Field::new("e", "Person").split_type_name(), ("", "Person"));
    }

    #[test]
    fn test_doc_blocks_cover_nested_entities() {
        let sources = ParsedSources {
            structs: vec![Struct {
                name: "Order".to_string(),
                fields: vec![Field::new("id", "String")],
                operations: vec![Operation {
                    name: "place".to_string(),
                    ..Default::default()
                }],
                ..Default::default()
            }],
            enums: vec![Enum {
                name: "Color".to_string(),
                literals: vec![EnumLiteral {
                    name: "Red".to_string(),
                    ..Default::default()
                }],
                ..Default::default()
            }],
            interfaces: vec![],
        };
        let owners: Vec<String> = sources.doc_blocks().into_iter().map(|(o, _)| o).collect();
        assert_eq!(
            owners,
            vec![
                "struct Order",
                "field Order.id",
                "method Order::place",
                "enum Color",
                "variant Color::Red",
            ]
        );
        assert!(!sources.is_empty());
        assert!(ParsedSources::default().is_empty());
    }
}
