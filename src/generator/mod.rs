//! Generator plugins and the pipeline that runs them.
//!
//! Every plugin implements [`Generator`]: it declares the annotation vocabulary it
//! owns and turns a whole [`ParsedSources`] snapshot into zero or more artifacts.
//! Plugins are independent of each other; the [`pipeline::Pipeline`] runs a fixed,
//! explicitly ordered list of them over one shared snapshot.
//!
//! Shared concerns live next to the trait:
//!
//! - [`unit`] - package-name resolution, target directories and the per-run state machine
//! - [`render`] - the boundary to the template renderer and the artifact writer
//!
//! Every artifact name carries [`GENFILE_PREFIX`] so that the next scan of the
//! input directory can exclude it (see [`genfile_exclude_pattern`]).

pub mod event;
pub mod event_service;
pub mod json;
pub mod json_ast;
pub mod outbound;
pub mod pipeline;
pub mod render;
pub mod repository;
pub mod rest;
pub mod unit;

pub use pipeline::{FailurePolicy, Pipeline, PluginReport, RunReport};
pub use render::{Emission, HandlebarsRenderer, Renderer};
pub use unit::{GenerationRun, RunState};

use crate::annotation::AnnotationDescriptor;
use crate::error::Result;
use crate::model::ParsedSources;
use std::path::{Path, PathBuf};

/// Prefix carried by every generated file name.
pub const GENFILE_PREFIX: &str = "gen_";

/// Regex matching generated files with the given extension, e.g. `^gen_.*\.rs$`.
pub fn genfile_exclude_pattern(extension: &str) -> String {
    format!("^{}.*\\.{}$", regex::escape(GENFILE_PREFIX), regex::escape(extension))
}

/// Inserts [`GENFILE_PREFIX`] in front of the file name, leaving directories untouched.
///
/// `out/orders/aggregates.rs` -> `out/orders/gen_aggregates.rs`
pub fn prefixed(path: &Path) -> PathBuf {
    match path.file_name() {
        Some(name) => {
            let mut prefixed_name = std::ffi::OsString::from(GENFILE_PREFIX);
            prefixed_name.push(name);
            path.with_file_name(prefixed_name)
        }
        None => path.to_path_buf(),
    }
}

/// What a successful plugin run produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GenerationOutcome {
    /// No entity qualified; nothing was written.
    Skipped,
    /// Artifacts written (or confirmed up to date), in emission order.
    Emitted(Vec<PathBuf>),
}

impl GenerationOutcome {
    pub fn artifacts(&self) -> &[PathBuf] {
        match self {
            GenerationOutcome::Skipped => &[],
            GenerationOutcome::Emitted(paths) => paths,
        }
    }
}

/// Contract every generator plugin implements.
///
/// Implementations hold no entity data and may be reused across runs. Running a
/// plugin twice over the same input must produce byte-identical artifacts.
pub trait Generator {
    /// Short identifier used in logs and reports.
    fn name(&self) -> &'static str;

    /// Annotation vocabulary owned by this plugin. Used for introspection and
    /// diagnostics only; it is not enforced against other plugins.
    fn annotations(&self) -> Vec<AnnotationDescriptor>;

    /// Inspects `sources` and emits artifacts for the qualifying entities.
    fn generate(&self, input_dir: &Path, sources: &ParsedSources) -> Result<GenerationOutcome>;
}
