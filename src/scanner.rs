use crate::generator::genfile_exclude_pattern;
use anyhow::{Context, Result};
use log::{debug, warn};
use regex::Regex;
use std::path::PathBuf;
use walkdir::WalkDir;

/// Lists the Rust sources of one generation unit.
///
/// Only files directly inside the input directory are considered: every directory
/// is its own unit. Hidden files, `target` and previously generated files (see
/// [`genfile_exclude_pattern`]) are skipped, so that a rerun never feeds its own
/// output back into the parser.
///
/// # Example
///
/// ```no_run
/// use annotation_codegen::scanner::FileScanner;
/// use std::path::PathBuf;
///
/// let scanner = FileScanner::new(PathBuf::from("./src/orders")).unwrap();
/// let result = scanner.scan().unwrap();
/// println!("Found {} Rust files", result.rust_files.len());
/// ```
pub struct FileScanner {
    root_path: PathBuf,
    include: Option<Regex>,
    exclude: Regex,
}

/// Result of directory scanning operation.
pub struct ScanResult {
    /// Discovered `.rs` files, sorted by path
    pub rust_files: Vec<PathBuf>,
    /// Warning messages for any issues encountered (e.g., inaccessible entries)
    pub warnings: Vec<String>,
}

impl FileScanner {
    pub fn new(root_path: PathBuf) -> Result<Self> {
        let pattern = genfile_exclude_pattern("rs");
        let exclude = Regex::new(&pattern).with_context(|| format!("Invalid exclude pattern: {}", pattern))?;
        Ok(Self {
            root_path,
            include: None,
            exclude,
        })
    }

    /// Restricts the scan to file names matching `pattern`.
    pub fn with_include(mut self, pattern: &str) -> Result<Self> {
        let include = Regex::new(pattern).with_context(|| format!("Invalid include pattern: {}", pattern))?;
        self.include = Some(include);
        Ok(self)
    }

    /// Collects the `.rs` files of the unit.
    ///
    /// Inaccessible entries are logged and returned as warnings; scanning continues.
    ///
    /// # Errors
    ///
    /// Returns an error if the root directory does not exist or is not a directory.
    pub fn scan(&self) -> Result<ScanResult> {
        if !self.root_path.is_dir() {
            anyhow::bail!("Input path is not a directory: {}", self.root_path.display());
        }

        let mut rust_files = Vec::new();
        let mut warnings = Vec::new();

        for entry in WalkDir::new(&self.root_path).min_depth(1).max_depth(1).sort_by_file_name() {
            match entry {
                Ok(entry) => {
                    let file_name = entry.file_name().to_string_lossy();
                    if !entry.file_type().is_file() || !file_name.ends_with(".rs") {
                        continue;
                    }
                    if file_name.starts_with('.') {
                        continue;
                    }
                    if self.exclude.is_match(&file_name) {
                        debug!("Skipping generated file: {}", entry.path().display());
                        continue;
                    }
                    if let Some(include) = &self.include {
                        if !include.is_match(&file_name) {
                            debug!("Skipping file not matching include pattern: {}", entry.path().display());
                            continue;
                        }
                    }
                    rust_files.push(entry.path().to_path_buf());
                }
                Err(e) => {
                    let warning = format!("Failed to access path: {}", e);
                    warn!("{}", warning);
                    warnings.push(warning);
                }
            }
        }

        Ok(ScanResult { rust_files, warnings })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn file_names(result: &ScanResult) -> Vec<String> {
        result
            .rust_files
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().to_string())
            .collect()
    }

    #[test]
    fn test_scan_normal_directory() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();

        fs::write(root.join("order.rs"), "pub struct Order;").unwrap();
        fs::write(root.join("events.rs"), "pub struct OrderCreated;").unwrap();
        fs::write(root.join("readme.md"), "# README").unwrap();

        let result = FileScanner::new(root.to_path_buf()).unwrap().scan().unwrap();

        assert_eq!(file_names(&result), vec!["events.rs", "order.rs"]);
        assert!(result.warnings.is_empty());
    }

    #[test]
    fn test_scan_skips_generated_files() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();

        fs::write(root.join("order.rs"), "pub struct Order;").unwrap();
        fs::write(root.join("gen_wrappers.rs"), "// generated").unwrap();
        fs::write(root.join("my_gen_notes.rs"), "// hand-written").unwrap();

        let result = FileScanner::new(root.to_path_buf()).unwrap().scan().unwrap();

        assert_eq!(file_names(&result), vec!["my_gen_notes.rs", "order.rs"]);
    }

    #[test]
    fn test_scan_is_not_recursive() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();

        fs::write(root.join("order.rs"), "pub struct Order;").unwrap();
        fs::create_dir(root.join("nested")).unwrap();
        fs::write(root.join("nested").join("inner.rs"), "pub struct Inner;").unwrap();
        fs::create_dir(root.join("target")).unwrap();
        fs::write(root.join(".hidden.rs"), "pub struct Hidden;").unwrap();

        let result = FileScanner::new(root.to_path_buf()).unwrap().scan().unwrap();

        assert_eq!(file_names(&result), vec!["order.rs"]);
    }

    #[test]
    fn test_scan_with_include_pattern() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();

        fs::write(root.join("order.rs"), "").unwrap();
        fs::write(root.join("order_service.rs"), "").unwrap();

        let result = FileScanner::new(root.to_path_buf())
            .unwrap()
            .with_include("_service\\.rs$")
            .unwrap()
            .scan()
            .unwrap();

        assert_eq!(file_names(&result), vec!["order_service.rs"]);
    }

    #[test]
    fn test_invalid_include_pattern() {
        let temp_dir = TempDir::new().unwrap();
        let result = FileScanner::new(temp_dir.path().to_path_buf())
            .unwrap()
            .with_include("(");
        assert!(result.is_err());
    }

    #[test]
    fn test_scan_missing_directory() {
        let temp_dir = TempDir::new().unwrap();
        let scanner = FileScanner::new(temp_dir.path().join("missing")).unwrap();
        assert!(scanner.scan().is_err());
    }
}
