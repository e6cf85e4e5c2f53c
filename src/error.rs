use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for generation steps
pub type Result<T> = std::result::Result<T, GenerationError>;

/// Errors raised while turning annotated entities into generated artifacts.
///
/// Annotation non-matches and validation rejections are not errors: they resolve
/// to "not found". Only precondition violations and render/write failures end up here.
#[derive(Debug, Error)]
pub enum GenerationError {
    /// The generation unit holds no entities at all.
    #[error("generation unit for {kind} is empty: cannot determine a package name")]
    EmptyGenerationUnit { kind: &'static str },

    /// The generation unit spans more than one package name.
    #[error("list of {kind} has multiple package names: {names:?}")]
    MultiplePackageNames {
        kind: &'static str,
        names: Vec<String>,
    },

    /// The target directory could not be derived.
    #[error("cannot determine target path (input dir: '{input_dir}', package: '{package_name}')")]
    UnresolvedTargetPath {
        input_dir: PathBuf,
        package_name: String,
    },

    /// A plugin tried to move its run into a state the lifecycle does not allow.
    #[error("generator '{generator}' cannot move from {from:?} to {to:?}")]
    InvalidTransition {
        generator: String,
        from: crate::generator::RunState,
        to: crate::generator::RunState,
    },

    /// The renderer failed to register or execute a template.
    #[error("error rendering '{template}' for {source_description} into {}: {message}", .target.display())]
    Render {
        template: String,
        source_description: String,
        target: PathBuf,
        message: String,
    },

    /// The rendered artifact could not be written.
    #[error("error writing {} for {source_description}: {source}", .target.display())]
    Write {
        target: PathBuf,
        source_description: String,
        #[source]
        source: std::io::Error,
    },

    /// Serializing an intermediate value (data context or AST dump) failed.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// One or more generators failed while the pipeline kept going.
    #[error("{} generator(s) failed: {}", .failures.len(), .failures.join("; "))]
    PipelineFailed { failures: Vec<String> },
}

impl From<serde_json::Error> for GenerationError {
    fn from(err: serde_json::Error) -> Self {
        GenerationError::Serialization(format!("JSON: {}", err))
    }
}

impl From<serde_yaml::Error> for GenerationError {
    fn from(err: serde_yaml::Error) -> Self {
        GenerationError::Serialization(format!("YAML: {}", err))
    }
}
