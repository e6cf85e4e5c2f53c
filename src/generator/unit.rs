//! Generation-unit resolution and the per-plugin run lifecycle.
//!
//! A generation unit is the set of entities one plugin processes in one run. It must
//! resolve to exactly one package name, from which (together with the input
//! directory) the target directory is derived.
//!
//! ```text
//! NotStarted -> PackageResolved -> TargetPathResolved -> Skipped
//!                                                     -> Emitting -> Emitted
//! NotStarted -> Skipped                 (nothing to look at)
//! any non-terminal state -> Failed
//! ```

use super::render::{write_artifact, Emission, HandlebarsRenderer, Renderer};
use super::GenerationOutcome;
use crate::error::{GenerationError, Result};
use crate::model::{Enum, Interface, Struct};
use log::{debug, info};
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

/// Resolves the single package name shared by `names`.
///
/// Fails when there are no names at all or more than one distinct name.
pub fn resolve_package_name<'a, I>(kind: &'static str, names: I) -> Result<String>
where
    I: IntoIterator<Item = &'a str>,
{
    let distinct: BTreeSet<&str> = names.into_iter().collect();
    let mut iter = distinct.iter();
    match (iter.next(), iter.next()) {
        (None, _) => Err(GenerationError::EmptyGenerationUnit { kind }),
        (Some(name), None) => Ok((*name).to_string()),
        (Some(_), Some(_)) => Err(GenerationError::MultiplePackageNames {
            kind,
            names: distinct.iter().map(|n| n.to_string()).collect(),
        }),
    }
}

pub fn package_name_for_structs(structs: &[Struct]) -> Result<String> {
    resolve_package_name("structs", structs.iter().map(|s| s.package_name.as_str()))
}

pub fn package_name_for_interfaces(interfaces: &[Interface]) -> Result<String> {
    resolve_package_name("interfaces", interfaces.iter().map(|i| i.package_name.as_str()))
}

pub fn package_name_for_enums_or_structs(enums: &[Enum], structs: &[Struct]) -> Result<String> {
    resolve_package_name(
        "enums and structs",
        enums
            .iter()
            .map(|e| e.package_name.as_str())
            .chain(structs.iter().map(|s| s.package_name.as_str())),
    )
}

/// Target directory for a generation unit.
///
/// Artifacts are written next to the hand-written sources of the unit, so the
/// target is the input directory itself.
pub fn determine_target_path(input_dir: &Path, package_name: &str) -> Result<PathBuf> {
    if input_dir.as_os_str().is_empty() || package_name.is_empty() {
        return Err(GenerationError::UnresolvedTargetPath {
            input_dir: input_dir.to_path_buf(),
            package_name: package_name.to_string(),
        });
    }
    Ok(input_dir.to_path_buf())
}

/// Directory next to the target, e.g. `<target>/../ordersStore`.
pub fn sibling_dir(target_dir: &Path, name: &str) -> PathBuf {
    target_dir.join("..").join(name)
}

/// Lifecycle state of one plugin run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    NotStarted,
    PackageResolved,
    TargetPathResolved,
    Skipped,
    Emitting,
    Emitted,
    Failed,
}

impl RunState {
    pub fn is_terminal(self) -> bool {
        matches!(self, RunState::Skipped | RunState::Emitted | RunState::Failed)
    }

    pub fn can_transition_to(self, next: RunState) -> bool {
        use RunState::*;
        match (self, next) {
            (from, Failed) => !from.is_terminal(),
            (NotStarted, PackageResolved) | (NotStarted, Skipped) => true,
            (PackageResolved, TargetPathResolved) => true,
            (TargetPathResolved, Skipped) | (TargetPathResolved, Emitting) => true,
            (Emitting, Emitting) | (Emitting, Emitted) => true,
            _ => false,
        }
    }
}

/// Tracks one plugin run through its lifecycle and performs its emissions.
///
/// Any error returned by a method moves the run to [`RunState::Failed`].
pub struct GenerationRun {
    generator: &'static str,
    state: RunState,
    renderer: Box<dyn Renderer>,
    package_name: Option<String>,
    target_dir: Option<PathBuf>,
    emitted: Vec<PathBuf>,
}

impl GenerationRun {
    pub fn new(generator: &'static str) -> Self {
        Self::with_renderer(generator, Box::new(HandlebarsRenderer))
    }

    pub fn with_renderer(generator: &'static str, renderer: Box<dyn Renderer>) -> Self {
        Self {
            generator,
            state: RunState::NotStarted,
            renderer,
            package_name: None,
            target_dir: None,
            emitted: Vec::new(),
        }
    }

    pub fn state(&self) -> RunState {
        self.state
    }

    pub fn package_name(&self) -> Option<&str> {
        self.package_name.as_deref()
    }

    pub fn target_dir(&self) -> Option<&Path> {
        self.target_dir.as_deref()
    }

    fn transition(&mut self, next: RunState) -> Result<()> {
        if !self.state.can_transition_to(next) {
            let err = GenerationError::InvalidTransition {
                generator: self.generator.to_string(),
                from: self.state,
                to: next,
            };
            if !self.state.is_terminal() {
                self.state = RunState::Failed;
            }
            return Err(err);
        }
        debug!("[{}] {:?} -> {:?}", self.generator, self.state, next);
        self.state = next;
        Ok(())
    }

    fn fail<T>(&mut self, err: GenerationError) -> Result<T> {
        if !self.state.is_terminal() {
            debug!("[{}] {:?} -> Failed: {}", self.generator, self.state, err);
            self.state = RunState::Failed;
        }
        Err(err)
    }

    /// Records the unit's package name (result of one of the `package_name_for_*` helpers).
    pub fn resolve_package(&mut self, resolved: Result<String>) -> Result<String> {
        match resolved {
            Ok(name) => {
                self.transition(RunState::PackageResolved)?;
                self.package_name = Some(name.clone());
                Ok(name)
            }
            Err(err) => self.fail(err),
        }
    }

    pub fn resolve_target(&mut self, input_dir: &Path) -> Result<PathBuf> {
        let package_name = self.package_name.clone().unwrap_or_default();
        match determine_target_path(input_dir, &package_name) {
            Ok(dir) => {
                self.transition(RunState::TargetPathResolved)?;
                self.target_dir = Some(dir.clone());
                Ok(dir)
            }
            Err(err) => self.fail(err),
        }
    }

    /// Renders and writes one artifact.
    pub fn emit(&mut self, emission: Emission) -> Result<PathBuf> {
        self.transition(RunState::Emitting)?;
        let rendered = match self.renderer.render(&emission) {
            Ok(content) => content,
            Err(err) => return self.fail(err),
        };
        match write_artifact(&emission, &rendered) {
            Ok(written) => {
                info!(
                    "[{}] {} {}",
                    self.generator,
                    if written { "wrote" } else { "unchanged" },
                    emission.target_filename.display()
                );
                self.emitted.push(emission.target_filename.clone());
                Ok(emission.target_filename)
            }
            Err(err) => self.fail(err),
        }
    }

    /// Ends a run that found nothing to generate.
    pub fn skip(mut self) -> Result<GenerationOutcome> {
        self.transition(RunState::Skipped)?;
        Ok(GenerationOutcome::Skipped)
    }

    /// Ends the run: `Emitted` when anything was emitted, otherwise `Skipped`.
    pub fn finish(mut self) -> Result<GenerationOutcome> {
        if self.state == RunState::Emitting {
            self.transition(RunState::Emitted)?;
            Ok(GenerationOutcome::Emitted(std::mem::take(&mut self.emitted)))
        } else {
            self.skip()
        }
    }
}
