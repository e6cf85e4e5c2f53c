//! JSON name mapping for enums (`@JsonEnum`) and helpers for structs (`@JsonStruct`).
//!
//! One artifact per source file that declares a qualifying entity:
//! `events.rs` -> `gen_events_json.rs`.

use super::render::Emission;
use super::unit::{package_name_for_enums_or_structs, GenerationRun};
use super::{prefixed, GenerationOutcome, Generator};
use crate::annotation::{accept_any, facts, resolve_kind, Annotation, AnnotationDescriptor, AnnotationKind};
use crate::error::Result;
use crate::model::{Enum, EnumLiteral, ParsedSources, Struct};
use log::debug;
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::Path;

pub const TYPE_JSON_ENUM: &str = "JsonEnum";
pub const TYPE_JSON_STRUCT: &str = "JsonStruct";

pub const PARAM_BASE: &str = "base";
pub const PARAM_DEFAULT: &str = "default";
pub const PARAM_STRIPPED: &str = "stripped";
pub const PARAM_LITERAL: &str = "literal";
pub const PARAM_TOLERANT: &str = "tolerant";

/// Stand-in for `-` in variant names that must serialize with a dash.
const DASH_STAND_IN: char = 'ɂ';

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct JsonEnumAttributes {
    /// Common prefix of the variant names
    pub base: String,
    /// Variant (without `base`) used for unknown names
    pub default: String,
    /// Serialize without the `base` prefix
    pub stripped: bool,
    /// Keep the variant's own casing
    pub literal: bool,
    /// Also accept the alternative spelling when deserializing
    pub tolerant: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JsonAnnotation {
    JsonEnum(JsonEnumAttributes),
    JsonStruct,
}

impl AnnotationKind for JsonAnnotation {
    fn descriptors() -> Vec<AnnotationDescriptor> {
        vec![
            AnnotationDescriptor {
                name: TYPE_JSON_ENUM,
                param_names: &[PARAM_BASE, PARAM_DEFAULT, PARAM_STRIPPED, PARAM_LITERAL, PARAM_TOLERANT],
                validator: accept_any,
            },
            AnnotationDescriptor {
                name: TYPE_JSON_STRUCT,
                param_names: &[],
                validator: accept_any,
            },
        ]
    }

    fn from_annotation(annotation: &Annotation) -> Option<Self> {
        match annotation.name.as_str() {
            TYPE_JSON_ENUM => Some(JsonAnnotation::JsonEnum(JsonEnumAttributes {
                base: facts::text(annotation, PARAM_BASE),
                default: facts::text(annotation, PARAM_DEFAULT),
                stripped: facts::flag(annotation, PARAM_STRIPPED),
                literal: facts::flag(annotation, PARAM_LITERAL),
                tolerant: facts::flag(annotation, PARAM_TOLERANT),
            })),
            TYPE_JSON_STRUCT => Some(JsonAnnotation::JsonStruct),
            _ => None,
        }
    }
}

pub fn json_enum_attributes(e: &Enum) -> Option<JsonEnumAttributes> {
    match resolve_kind::<JsonAnnotation>(&e.doc_lines, TYPE_JSON_ENUM)? {
        JsonAnnotation::JsonEnum(attributes) => Some(attributes),
        JsonAnnotation::JsonStruct => None,
    }
}

pub fn is_json_enum(e: &Enum) -> bool {
    json_enum_attributes(e).is_some()
}

pub fn is_json_struct(s: &Struct) -> bool {
    resolve_kind::<JsonAnnotation>(&s.doc_lines, TYPE_JSON_STRUCT).is_some()
}

pub fn json_enum_base(e: &Enum) -> String {
    json_enum_attributes(e).map(|a| a.base).unwrap_or_default()
}

pub fn json_enum_default(e: &Enum) -> String {
    json_enum_attributes(e).map(|a| a.default).unwrap_or_default()
}

pub fn is_json_enum_stripped(e: &Enum) -> bool {
    json_enum_attributes(e).is_some_and(|a| a.stripped)
}

pub fn is_json_enum_literal(e: &Enum) -> bool {
    json_enum_attributes(e).is_some_and(|a| a.literal)
}

pub fn is_json_enum_tolerant(e: &Enum) -> bool {
    json_enum_attributes(e).is_some_and(|a| a.tolerant)
}

/// Name a variant serializes to.
pub fn preferred_name(attributes: &JsonEnumAttributes, literal: &EnumLiteral) -> String {
    let name = literal_name(literal);
    if attributes.stripped {
        adjust_case(attributes, name.strip_prefix(attributes.base.as_str()).unwrap_or(&name))
    } else {
        adjust_case(attributes, &name)
    }
}

/// The other spelling, accepted when deserializing a tolerant enum with a base.
pub fn alternative_name(attributes: &JsonEnumAttributes, literal: &EnumLiteral) -> String {
    let name = literal_name(literal);
    if attributes.stripped {
        adjust_case(attributes, &name)
    } else {
        adjust_case(attributes, name.strip_prefix(attributes.base.as_str()).unwrap_or(&name))
    }
}

fn has_alternative_name(attributes: &JsonEnumAttributes) -> bool {
    !attributes.base.is_empty() && attributes.tolerant
}

fn literal_name(literal: &EnumLiteral) -> String {
    literal.name.replace(DASH_STAND_IN, "-")
}

fn adjust_case(attributes: &JsonEnumAttributes, name: &str) -> String {
    if attributes.literal {
        name.to_string()
    } else {
        facts::to_first_lower(name)
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct JsonGenerator;

impl Generator for JsonGenerator {
    fn name(&self) -> &'static str {
        "json"
    }

    fn annotations(&self) -> Vec<AnnotationDescriptor> {
        JsonAnnotation::descriptors()
    }

    fn generate(&self, input_dir: &Path, sources: &ParsedSources) -> Result<GenerationOutcome> {
        let mut run = GenerationRun::new(self.name());
        if sources.enums.is_empty() && sources.structs.is_empty() {
            debug!("[json] no enums or structs");
            return run.skip();
        }

        let package_name = run.resolve_package(package_name_for_enums_or_structs(&sources.enums, &sources.structs))?;
        let target_dir = run.resolve_target(input_dir)?;

        let mut per_file: BTreeMap<&str, JsonContext> = BTreeMap::new();
        for e in &sources.enums {
            if let Some(attributes) = json_enum_attributes(e) {
                per_file
                    .entry(e.filename.as_str())
                    .or_insert_with(|| JsonContext::new(&package_name))
                    .enums
                    .push(EnumEntry::new(e, &attributes));
            }
        }
        for s in sources.structs.iter().filter(|s| is_json_struct(s)) {
            per_file
                .entry(s.filename.as_str())
                .or_insert_with(|| JsonContext::new(&package_name))
                .structs
                .push(StructEntry { name: s.name.clone() });
        }

        for (filename, context) in &per_file {
            let target = target_dir.join(json_filename(filename));
            let emission = Emission::new(package_name.clone(), prefixed(&target), "json-enums", JSON_HELPERS_TEMPLATE)
                .with_data(context)?;
            run.emit(emission)?;
        }

        run.finish()
    }
}

/// `events.rs` -> `events_json.rs`
fn json_filename(source_filename: &str) -> String {
    let path = Path::new(source_filename);
    let stem = path.file_stem().map(|s| s.to_string_lossy()).unwrap_or_default();
    match path.extension() {
        Some(ext) => format!("{}_json.{}", stem, ext.to_string_lossy()),
        None => format!("{stem}_json"),
    }
}

#[derive(Debug, Serialize)]
struct JsonContext {
    package_name: String,
    enums: Vec<EnumEntry>,
    structs: Vec<StructEntry>,
}

impl JsonContext {
    fn new(package_name: &str) -> Self {
        Self {
            package_name: package_name.to_string(),
            enums: Vec::new(),
            structs: Vec::new(),
        }
    }
}

#[derive(Debug, Serialize)]
struct EnumEntry {
    name: String,
    /// Variant used for unknown names
    default_value: Option<String>,
    literals: Vec<LiteralEntry>,
}

#[derive(Debug, Serialize)]
struct LiteralEntry {
    name: String,
    preferred_name: String,
    alternative_name: Option<String>,
}

#[derive(Debug, Serialize)]
struct StructEntry {
    name: String,
}

impl EnumEntry {
    fn new(e: &Enum, attributes: &JsonEnumAttributes) -> Self {
        let literals = e
            .literals
            .iter()
            .map(|literal| {
                let preferred = preferred_name(attributes, literal);
                let alternative = alternative_name(attributes, literal);
                LiteralEntry {
                    name: literal.name.clone(),
                    alternative_name: (has_alternative_name(attributes) && alternative != preferred)
                        .then_some(alternative),
                    preferred_name: preferred,
                }
            })
            .collect();
        Self {
            name: e.name.clone(),
            default_value: (!attributes.default.is_empty())
                .then(|| format!("{}{}", attributes.base, attributes.default)),
            literals,
        }
    }
}

const JSON_HELPERS_TEMPLATE: &str = r#"// Generated by annotation-codegen from package {{package_name}}. DO NOT EDIT.

use serde::de::{self, Deserialize, Deserializer};
use serde::ser::{Serialize, Serializer};

{{#each enums}}
impl {{name}} {
    pub fn json_name(&self) -> &'static str {
        match self {
{{#each literals}}
            {{../name}}::{{name}} => "{{preferred_name}}",
{{/each}}
        }
    }

    pub fn from_json_name(name: &str) -> Option<Self> {
        match name {
{{#each literals}}
            "{{preferred_name}}" => Some({{../name}}::{{name}}),
{{#if alternative_name}}
            "{{alternative_name}}" => Some({{../name}}::{{name}}),
{{/if}}
{{/each}}
{{#if default_value}}
            _ => Some({{name}}::{{default_value}}),
{{else}}
            _ => None,
{{/if}}
        }
    }
}

impl Serialize for {{name}} {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.json_name())
    }
}

impl<'de> Deserialize<'de> for {{name}} {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let name = String::deserialize(deserializer)?;
        Self::from_json_name(&name).ok_or_else(|| de::Error::custom(format!("invalid {{name}} value '{}'", name)))
    }
}

{{/each}}
{{#each structs}}
impl {{name}} {
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }

    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }
}

{{/each}}
"#;

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn color_enum(doc: &str) -> Enum {
        Enum {
            doc_lines: vec![doc.to_string()],
            package_name: "paint".to_string(),
            filename: "colors.rs".to_string(),
            name: "Color".to_string(),
            literals: ["ColorRed", "ColorGreen", "ColorDarkɂBlue"]
                .iter()
                .map(|n| EnumLiteral {
                    name: n.to_string(),
                    ..Default::default()
                })
                .collect(),
        }
    }

    fn literal(name: &str) -> EnumLiteral {
        EnumLiteral {
            name: name.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_json_enum_facts() {
        let e = color_enum(r#"// @JsonEnum( base = "Color", default = "Red", stripped = "true", tolerant = "true" )"#);
        assert!(is_json_enum(&e));
        assert_eq!(json_enum_base(&e), "Color");
        assert_eq!(json_enum_default(&e), "Red");
        assert!(is_json_enum_stripped(&e));
        assert!(is_json_enum_tolerant(&e));
        assert!(!is_json_enum_literal(&e));
        assert!(!is_json_enum(&color_enum("// plain enum")));
    }

    #[test]
    fn test_preferred_and_alternative_names() {
        let stripped = JsonEnumAttributes {
            base: "Color".to_string(),
            stripped: true,
            tolerant: true,
            ..Default::default()
        };
        assert_eq!(preferred_name(&stripped, &literal("ColorRed")), "red");
        assert_eq!(alternative_name(&stripped, &literal("ColorRed")), "colorRed");

        let full = JsonEnumAttributes {
            base: "Color".to_string(),
            ..Default::default()
        };
        assert_eq!(preferred_name(&full, &literal("ColorRed")), "colorRed");
        assert_eq!(alternative_name(&full, &literal("ColorRed")), "red");

        let literal_case = JsonEnumAttributes {
            literal: true,
            ..Default::default()
        };
        assert_eq!(preferred_name(&literal_case, &literal("ColorRed")), "ColorRed");
        assert_eq!(preferred_name(&literal_case, &literal("DarkɂBlue")), "Dark-Blue");
    }

    #[test]
    fn test_json_filename() {
        assert_eq!(json_filename("colors.rs"), "colors_json.rs");
        assert_eq!(json_filename("Makefile"), "Makefile_json");
    }

    #[test]
    fn test_generates_one_file_per_source_file() {
        let temp_dir = TempDir::new().unwrap();
        let sources = ParsedSources {
            enums: vec![color_enum(
                r#"// @JsonEnum( base = "Color", default = "Red", stripped = "true", tolerant = "true" )"#,
            )],
            structs: vec![
                Struct {
                    doc_lines: vec!["// @JsonStruct()".to_string()],
                    package_name: "paint".to_string(),
                    filename: "palette.rs".to_string(),
                    name: "Palette".to_string(),
                    ..Default::default()
                },
                Struct {
                    package_name: "paint".to_string(),
                    filename: "palette.rs".to_string(),
                    name: "Brush".to_string(),
                    ..Default::default()
                },
            ],
            interfaces: vec![],
        };

        let outcome = JsonGenerator.generate(temp_dir.path(), &sources).unwrap();
        assert_eq!(
            outcome.artifacts(),
            &[
                temp_dir.path().join("gen_colors_json.rs"),
                temp_dir.path().join("gen_palette_json.rs"),
            ]
        );

        let colors = fs::read_to_string(temp_dir.path().join("gen_colors_json.rs")).unwrap();
        assert!(colors.contains(r#"Color::ColorRed => "red","#));
        assert!(colors.contains(r#""colorRed" => Some(Color::ColorRed),"#));
        assert!(colors.contains(r#"Color::ColorDarkɂBlue => "dark-Blue","#));
        assert!(colors.contains("_ => Some(Color::ColorRed),"));
        assert!(colors.contains("invalid Color value '{}'"));

        let palette = fs::read_to_string(temp_dir.path().join("gen_palette_json.rs")).unwrap();
        assert!(palette.contains("impl Palette {"));
        assert!(!palette.contains("Brush"));
    }

    #[test]
    fn test_nothing_annotated_is_skipped() {
        let temp_dir = TempDir::new().unwrap();
        let sources = ParsedSources {
            enums: vec![color_enum("/// Just a color")],
            ..Default::default()
        };
        assert_eq!(
            JsonGenerator.generate(temp_dir.path(), &sources).unwrap(),
            GenerationOutcome::Skipped
        );
        assert_eq!(fs::read_dir(temp_dir.path()).unwrap().count(), 0);
    }
}
