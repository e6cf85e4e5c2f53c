use super::grammar::{self, LineMatch, RawAnnotation};
use super::{Annotation, AnnotationDescriptor};
use log::trace;

/// Immutable set of descriptors owned by one generator.
///
/// The registry resolves raw grammar matches into [`Annotation`] values:
/// attributes not named by the descriptor are dropped, then the descriptor's
/// validator decides whether the occurrence counts. An occurrence that fails
/// validation is indistinguishable from no occurrence at all.
#[derive(Debug, Clone)]
pub struct AnnotationRegistry {
    descriptors: Vec<AnnotationDescriptor>,
}

/// A directive-like comment line that did not resolve.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RejectedAnnotation {
    /// Index of the line within the doc block
    pub line_index: usize,
    /// The raw line
    pub line: String,
    /// The annotation name the line refers to
    pub name: String,
    pub reason: Rejection,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    /// `@Name(` was found but the argument list does not fit the grammar
    MalformedArguments,
    /// The occurrence parsed but the descriptor's validator refused it
    ValidationFailed,
}

impl std::fmt::Display for Rejection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Rejection::MalformedArguments => write!(f, "malformed argument list"),
            Rejection::ValidationFailed => write!(f, "rejected by validator"),
        }
    }
}

impl AnnotationRegistry {
    pub fn new(descriptors: Vec<AnnotationDescriptor>) -> Self {
        Self { descriptors }
    }

    pub fn descriptors(&self) -> &[AnnotationDescriptor] {
        &self.descriptors
    }

    fn descriptor(&self, name: &str) -> Option<&AnnotationDescriptor> {
        self.descriptors.iter().find(|d| d.name == name)
    }

    /// Resolves a single line against every descriptor in the registry.
    pub fn resolve_annotation(&self, line: &str) -> Option<Annotation> {
        let raw = grammar::parse_line(line)?;
        self.validate(raw)
    }

    /// First line in `doc_lines` holding a valid occurrence of `name`.
    pub fn resolve_annotation_by_name(&self, doc_lines: &[String], name: &str) -> Option<Annotation> {
        doc_lines
            .iter()
            .filter_map(|line| grammar::parse_line_named(line, name))
            .find_map(|raw| self.validate(raw))
    }

    /// Every valid occurrence in `doc_lines`, in line order.
    pub fn resolve_annotations(&self, doc_lines: &[String]) -> Vec<Annotation> {
        doc_lines
            .iter()
            .filter_map(|line| self.resolve_annotation(line))
            .collect()
    }

    /// Lines that name one of this registry's annotations but do not count.
    ///
    /// Resolution itself never reports these; callers use this to surface
    /// authoring mistakes without failing.
    pub fn rejected_annotations(&self, doc_lines: &[String]) -> Vec<RejectedAnnotation> {
        let mut rejected = Vec::new();
        for (line_index, line) in doc_lines.iter().enumerate() {
            let (name, reason) = match grammar::scan_line(line) {
                LineMatch::NoDirective => continue,
                LineMatch::Malformed { name } => (name, Rejection::MalformedArguments),
                LineMatch::Directive(raw) => {
                    let name = raw.name.clone();
                    if self.validate(raw).is_some() {
                        continue;
                    }
                    (name, Rejection::ValidationFailed)
                }
            };
            if self.descriptor(&name).is_some() {
                rejected.push(RejectedAnnotation {
                    line_index,
                    line: line.clone(),
                    name,
                    reason,
                });
            }
        }
        rejected
    }

    fn validate(&self, raw: RawAnnotation) -> Option<Annotation> {
        let descriptor = self.descriptor(&raw.name)?;
        let attributes = raw
            .attributes
            .into_iter()
            .filter(|(key, _)| descriptor.param_names.contains(&key.as_str()))
            .collect();
        let annotation = Annotation::new(raw.name, attributes);
        if (descriptor.validator)(&annotation) {
            Some(annotation)
        } else {
            trace!("@{} rejected by validator", annotation.name);
            None
        }
    }
}
