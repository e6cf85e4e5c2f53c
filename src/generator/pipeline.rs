//! Ordered execution of generator plugins over one parsed snapshot.

use super::event::EventGenerator;
use super::event_service::EventServiceGenerator;
use super::json::JsonGenerator;
use super::outbound::OutboundGenerator;
use super::repository::RepositoryGenerator;
use super::rest::RestGenerator;
use super::{GenerationOutcome, Generator};
use crate::annotation::AnnotationRegistry;
use crate::error::{GenerationError, Result};
use crate::model::ParsedSources;
use log::{error, info, warn};
use std::path::Path;

/// What the pipeline does when a plugin fails.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FailurePolicy {
    /// Stop at the first failing plugin. Artifacts already written stay on disk.
    #[default]
    AbortOnFirstError,
    /// Run every plugin, then report all failures together.
    ContinueOnError,
}

/// Result of one plugin within a pipeline run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PluginReport {
    pub generator: &'static str,
    pub result: std::result::Result<GenerationOutcome, String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunReport {
    pub plugins: Vec<PluginReport>,
}

impl RunReport {
    /// Number of artifacts written or confirmed up to date.
    pub fn artifact_count(&self) -> usize {
        self.plugins
            .iter()
            .filter_map(|p| p.result.as_ref().ok())
            .map(|outcome| outcome.artifacts().len())
            .sum()
    }

    pub fn failures(&self) -> Vec<String> {
        self.plugins
            .iter()
            .filter_map(|p| p.result.as_ref().err().map(|e| format!("{}: {}", p.generator, e)))
            .collect()
    }
}

pub struct Pipeline {
    generators: Vec<Box<dyn Generator>>,
    policy: FailurePolicy,
}

impl Pipeline {
    /// An empty pipeline.
    pub fn new() -> Self {
        Self {
            generators: Vec::new(),
            policy: FailurePolicy::default(),
        }
    }

    /// json, event, event-service, rest, repository, outbound.
    pub fn standard() -> Self {
        Self::new()
            .with_generator(JsonGenerator)
            .with_generator(EventGenerator)
            .with_generator(EventServiceGenerator)
            .with_generator(RestGenerator)
            .with_generator(RepositoryGenerator)
            .with_generator(OutboundGenerator)
    }

    pub fn with_policy(mut self, policy: FailurePolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Appends a plugin; plugins run in the order they were added.
    pub fn with_generator<G: Generator + 'static>(mut self, generator: G) -> Self {
        self.generators.push(Box::new(generator));
        self
    }

    pub fn generator_names(&self) -> Vec<&'static str> {
        self.generators.iter().map(|g| g.name()).collect()
    }

    /// Runs every plugin in order over `sources`.
    pub fn run(&self, input_dir: &Path, sources: &ParsedSources) -> Result<RunReport> {
        let mut report = RunReport::default();

        for generator in &self.generators {
            report_rejected_annotations(generator.as_ref(), sources);

            info!("Running generator '{}'", generator.name());
            match generator.generate(input_dir, sources) {
                Ok(outcome) => {
                    info!(
                        "Generator '{}' finished: {} artifact(s)",
                        generator.name(),
                        outcome.artifacts().len()
                    );
                    report.plugins.push(PluginReport {
                        generator: generator.name(),
                        result: Ok(outcome),
                    });
                }
                Err(err) => match self.policy {
                    FailurePolicy::AbortOnFirstError => {
                        error!("Generator '{}' failed: {}", generator.name(), err);
                        return Err(err);
                    }
                    FailurePolicy::ContinueOnError => {
                        error!("Generator '{}' failed, continuing: {}", generator.name(), err);
                        report.plugins.push(PluginReport {
                            generator: generator.name(),
                            result: Err(err.to_string()),
                        });
                    }
                },
            }
        }

        let failures = report.failures();
        if !failures.is_empty() {
            return Err(GenerationError::PipelineFailed { failures });
        }
        Ok(report)
    }
}

impl Default for Pipeline {
    fn default() -> Self {
        Self::standard()
    }
}

/// Warns about directive lines the plugin owns but will ignore.
fn report_rejected_annotations(generator: &dyn Generator, sources: &ParsedSources) {
    let descriptors = generator.annotations();
    if descriptors.is_empty() {
        return;
    }
    let registry = AnnotationRegistry::new(descriptors);
    for (owner, lines) in sources.doc_blocks() {
        for rejected in registry.rejected_annotations(lines) {
            warn!(
                "[{}] ignoring @{} on {} ({:?}): {}",
                generator.name(),
                rejected.name,
                owner,
                rejected.reason,
                rejected.line.trim()
            );
        }
    }
}
