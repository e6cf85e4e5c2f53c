//! Dumps the intermediate model, mostly to debug annotations and the parser.

use super::render::Emission;
use super::unit::{resolve_package_name, GenerationRun};
use super::{prefixed, GenerationOutcome, Generator};
use crate::annotation::AnnotationDescriptor;
use crate::error::Result;
use crate::model::ParsedSources;
use crate::serializer::{serialize_json, serialize_yaml};
use clap::ValueEnum;
use log::debug;
use serde_json::json;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum AstFormat {
    #[default]
    Json,
    Yaml,
}

/// Writes [`ParsedSources`] as JSON or YAML.
///
/// With a `target_filename` the dump lands in `<input_dir>/gen_<target_filename>`,
/// otherwise it goes to stdout.
#[derive(Debug, Clone, Default)]
pub struct JsonAstGenerator {
    pub target_filename: Option<PathBuf>,
    pub format: AstFormat,
}

impl JsonAstGenerator {
    pub fn new(target_filename: Option<PathBuf>, format: AstFormat) -> Self {
        Self {
            target_filename,
            format,
        }
    }

    fn serialize(&self, sources: &ParsedSources) -> Result<String> {
        match self.format {
            AstFormat::Json => serialize_json(sources),
            AstFormat::Yaml => serialize_yaml(sources),
        }
    }
}

impl Generator for JsonAstGenerator {
    fn name(&self) -> &'static str {
        "json-ast"
    }

    fn annotations(&self) -> Vec<AnnotationDescriptor> {
        Vec::new()
    }

    fn generate(&self, input_dir: &Path, sources: &ParsedSources) -> Result<GenerationOutcome> {
        let mut run = GenerationRun::new(self.name());
        if sources.is_empty() {
            debug!("[json-ast] nothing parsed");
            return run.skip();
        }

        let package_names = sources
            .structs
            .iter()
            .map(|s| s.package_name.as_str())
            .chain(sources.enums.iter().map(|e| e.package_name.as_str()))
            .chain(sources.interfaces.iter().map(|i| i.package_name.as_str()));
        let package_name = run.resolve_package(resolve_package_name("entities", package_names))?;
        let target_dir = run.resolve_target(input_dir)?;

        let content = self.serialize(sources)?;
        match &self.target_filename {
            Some(filename) => {
                run.emit(
                    Emission::new(package_name, prefixed(&target_dir.join(filename)), "ast", "{{content}}")
                        .with_data(&json!({ "content": content }))?,
                )?;
            }
            None => println!("{content}"),
        }

        run.finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Enum, Struct};
    use std::fs;
    use tempfile::TempDir;

    fn sources() -> ParsedSources {
        ParsedSources {
            structs: vec![Struct {
                doc_lines: vec![r#"/// @JsonStruct()"#.to_string()],
                package_name: "orders".to_string(),
                filename: "order.rs".to_string(),
                name: "Order".to_string(),
                ..Default::default()
            }],
            enums: vec![Enum {
                package_name: "orders".to_string(),
                filename: "status.rs".to_string(),
                name: "Status".to_string(),
                ..Default::default()
            }],
            ..Default::default()
        }
    }

    #[test]
    fn test_json_dump_to_file() {
        let temp_dir = TempDir::new().unwrap();
        let generator = JsonAstGenerator::new(Some(PathBuf::from("ast.json")), AstFormat::Json);

        let outcome = generator.generate(temp_dir.path(), &sources()).unwrap();
        let target = temp_dir.path().join("gen_ast.json");
        assert_eq!(outcome.artifacts(), &[target.clone()]);

        let parsed: ParsedSources = serde_json::from_str(&fs::read_to_string(target).unwrap()).unwrap();
        assert_eq!(parsed, sources());
    }

    #[test]
    fn test_yaml_dump_keeps_quotes() {
        let temp_dir = TempDir::new().unwrap();
        let generator = JsonAstGenerator::new(Some(PathBuf::from("ast.yaml")), AstFormat::Yaml);

        generator.generate(temp_dir.path(), &sources()).unwrap();
        let content = fs::read_to_string(temp_dir.path().join("gen_ast.yaml")).unwrap();
        assert!(content.contains("@JsonStruct()"));
        let parsed: ParsedSources = serde_yaml::from_str(&content).unwrap();
        assert_eq!(parsed, sources());
    }

    #[test]
    fn test_stdout_dump_writes_no_file() {
        let temp_dir = TempDir::new().unwrap();
        let outcome = JsonAstGenerator::default()
            .generate(temp_dir.path(), &sources())
            .unwrap();
        assert_eq!(outcome, GenerationOutcome::Skipped);
        assert_eq!(fs::read_dir(temp_dir.path()).unwrap().count(), 0);
    }

    #[test]
    fn test_empty_sources_are_skipped() {
        let temp_dir = TempDir::new().unwrap();
        let generator = JsonAstGenerator::new(Some(PathBuf::from("ast.json")), AstFormat::Json);
        assert_eq!(
            generator.generate(temp_dir.path(), &ParsedSources::default()).unwrap(),
            GenerationOutcome::Skipped
        );
    }
}
