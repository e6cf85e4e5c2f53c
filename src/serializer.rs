//! Serialization of the intermediate model and writing of artifacts to disk.

use crate::error::Result;
use crate::model::ParsedSources;
use log::debug;
use std::fs;
use std::io;
use std::path::Path;

/// Serializes the intermediate model to pretty-printed JSON.
pub fn serialize_json(sources: &ParsedSources) -> Result<String> {
    debug!("Serializing parsed sources to JSON");
    Ok(serde_json::to_string_pretty(sources)?)
}

/// Serializes the intermediate model to YAML.
pub fn serialize_yaml(sources: &ParsedSources) -> Result<String> {
    debug!("Serializing parsed sources to YAML");
    Ok(serde_yaml::to_string(sources)?)
}

/// Writes string content to a file, creating parent directories as needed.
///
/// The file is left untouched when it already holds exactly `content`, so an
/// unchanged rerun does not even bump modification times.
///
/// # Returns
///
/// Returns `true` when the file was written, `false` when it was already up to date.
pub fn write_to_file(content: &str, path: &Path) -> io::Result<bool> {
    if let Ok(existing) = fs::read(path) {
        if existing == content.as_bytes() {
            debug!("Unchanged: {}", path.display());
            return Ok(false);
        }
    }

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }

    fs::write(path, content)?;
    debug!("Successfully wrote {} bytes to {}", content.len(), path.display());
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Field, Struct};
    use tempfile::TempDir;

    fn create_test_sources() -> ParsedSources {
        ParsedSources {
            structs: vec![Struct {
                doc_lines: vec![r#"/// @Event( aggregate = "Order" )"#.to_string()],
                package_name: "orders".to_string(),
                filename: "events.rs".to_string(),
                name: "OrderCreated".to_string(),
                fields: vec![Field::new("order_uid", "String")],
                operations: vec![],
            }],
            ..Default::default()
        }
    }

    #[test]
    fn test_serialize_json() {
        let json = serialize_json(&create_test_sources()).unwrap();

        let parsed: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed["structs"][0]["name"], "OrderCreated");
        assert_eq!(parsed["structs"][0]["package_name"], "orders");
        assert_eq!(parsed["structs"][0]["fields"][0]["type_name"], "String");
        assert!(json.contains('\n'));
    }

    #[test]
    fn test_serialize_yaml() {
        let yaml = serialize_yaml(&create_test_sources()).unwrap();
        assert!(yaml.contains("structs:"));
        assert!(yaml.contains("OrderCreated"));

        let back: ParsedSources = serde_yaml::from_str(&yaml).unwrap();
        assert_eq!(back, create_test_sources());
    }

    #[test]
    fn test_write_to_file_creates_directories() {
        let temp_dir = TempDir::new().unwrap();
        let file_path = temp_dir.path().join("subdir").join("nested").join("gen_a.rs");

        assert!(write_to_file("content", &file_path).unwrap());
        assert_eq!(fs::read_to_string(&file_path).unwrap(), "content");
    }

    #[test]
    fn test_write_to_file_skips_identical_content() {
        let temp_dir = TempDir::new().unwrap();
        let file_path = temp_dir.path().join("gen_a.rs");

        assert!(write_to_file("one", &file_path).unwrap());
        assert!(!write_to_file("one", &file_path).unwrap());
        assert!(write_to_file("two", &file_path).unwrap());
        assert_eq!(fs::read_to_string(&file_path).unwrap(), "two");
    }
}
