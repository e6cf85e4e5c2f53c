//! Annotation mini-language embedded in doc comments.
//!
//! An annotation is a single-line directive such as
//! `/// @Event( aggregate = "Order", isRootEvent = "true" )`. This module is split into:
//!
//! 1. [`grammar`] - recognizes one occurrence on one line and extracts its attribute map
//! 2. [`registry`] - resolves raw occurrences against a generator's descriptors
//! 3. [`facts`] - small pure helpers used to derive semantic facts from resolved annotations
//!
//! Generators never share a registry. Each fact query builds a fresh
//! [`AnnotationRegistry`] from static descriptor data and drops it afterwards.
//!
//! # Example
//!
//! ```
//! use annotation_codegen::annotation::{Annotation, AnnotationDescriptor, AnnotationRegistry};
//!
//! fn has_description(annotation: &Annotation) -> bool {
//!     !annotation.attribute("description").is_empty()
//! }
//!
//! let registry = AnnotationRegistry::new(vec![AnnotationDescriptor {
//!     name: "OutboundClient",
//!     param_names: &["name", "description"],
//!     validator: has_description,
//! }]);
//!
//! let lines = vec![r#"/// @OutboundClient( name = "billing", description = "invoices" )"#.to_string()];
//! let annotation = registry.resolve_annotation_by_name(&lines, "OutboundClient").unwrap();
//! assert_eq!(annotation.attribute("name"), "billing");
//! ```

pub mod facts;
pub mod grammar;
pub mod registry;

pub use registry::{AnnotationRegistry, RejectedAnnotation, Rejection};

use serde::Serialize;
use std::collections::BTreeMap;

/// One resolved annotation occurrence.
///
/// Attributes only ever contain keys listed in the matching descriptor's `param_names`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Annotation {
    pub name: String,
    pub attributes: BTreeMap<String, String>,
}

impl Annotation {
    pub fn new(name: impl Into<String>, attributes: BTreeMap<String, String>) -> Self {
        Self {
            name: name.into(),
            attributes,
        }
    }

    /// Attribute value, or the empty string when absent.
    pub fn attribute(&self, key: &str) -> &str {
        self.attributes.get(key).map(String::as_str).unwrap_or("")
    }

    pub fn has_attribute(&self, key: &str) -> bool {
        self.attributes.contains_key(key)
    }
}

/// Signature of a descriptor validator. Validators only look at their argument.
pub type Validator = fn(&Annotation) -> bool;

/// Schema a generator uses to recognize and validate one annotation name.
#[derive(Clone, Copy)]
pub struct AnnotationDescriptor {
    pub name: &'static str,
    pub param_names: &'static [&'static str],
    pub validator: Validator,
}

impl std::fmt::Debug for AnnotationDescriptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AnnotationDescriptor")
            .field("name", &self.name)
            .field("param_names", &self.param_names)
            .finish()
    }
}

/// Validator for annotations whose attributes are all optional.
pub fn accept_any(_: &Annotation) -> bool {
    true
}

/// A generator's closed vocabulary of annotations.
///
/// Implementors are enums with one variant per annotation name, each carrying a
/// strongly-typed attribute record. Conversion only ever sees annotations that
/// already passed grammar matching and descriptor validation.
pub trait AnnotationKind: Sized {
    /// Descriptors for every variant of the vocabulary.
    fn descriptors() -> Vec<AnnotationDescriptor>;

    /// Builds the typed variant from a validated annotation.
    fn from_annotation(annotation: &Annotation) -> Option<Self>;
}

/// Resolves the first valid occurrence of `name` in `doc_lines` as a typed variant.
///
/// A registry is constructed for this call only.
pub fn resolve_kind<K: AnnotationKind>(doc_lines: &[String], name: &str) -> Option<K> {
    let registry = AnnotationRegistry::new(K::descriptors());
    registry
        .resolve_annotation_by_name(doc_lines, name)
        .and_then(|annotation| K::from_annotation(&annotation))
}

/// Resolves every valid occurrence in `doc_lines` as typed variants, in line order.
pub fn resolve_all_kinds<K: AnnotationKind>(doc_lines: &[String]) -> Vec<K> {
    let registry = AnnotationRegistry::new(K::descriptors());
    registry
        .resolve_annotations(doc_lines)
        .iter()
        .filter_map(K::from_annotation)
        .collect()
}
