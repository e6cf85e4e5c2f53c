//! Event-sourced repositories for structs annotated with `@Repository`.
//!
//! ```text
//! /// @Repository( aggregate = "Order", model = "OrderState", methods = "find, exists" )
//! pub struct OrderRepository;
//! ```
//!
//! produces `gen_orderRepository.rs` with only the listed methods.

use super::render::Emission;
use super::unit::{package_name_for_structs, GenerationRun};
use super::{prefixed, GenerationOutcome, Generator};
use crate::annotation::{facts, resolve_kind, Annotation, AnnotationDescriptor, AnnotationKind};
use crate::error::Result;
use crate::model::{ParsedSources, Struct};
use log::debug;
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::Path;

pub const TYPE_REPOSITORY: &str = "Repository";

pub const PARAM_AGGREGATE: &str = "aggregate";
pub const PARAM_PACKAGE: &str = "package";
pub const PARAM_MODEL: &str = "model";
pub const PARAM_METHODS: &str = "methods";

/// Every method a repository can opt into through `methods`.
pub const KNOWN_METHODS: &[&str] = &[
    "find",
    "filterByEvent",
    "filterByMoment",
    "findStates",
    "exists",
    "allAggregateUIDs",
    "allAggregates",
    "purgeOnEventUIDs",
    "purgeOnEventType",
    "purgeAll",
];

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RepositoryAttributes {
    pub aggregate: String,
    pub package: String,
    pub model: String,
    /// Raw comma-separated `methods` value
    pub methods: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RepositoryAnnotation {
    Repository(RepositoryAttributes),
}

fn validate_repository(annotation: &Annotation) -> bool {
    !annotation.attribute(PARAM_AGGREGATE).is_empty()
}

impl AnnotationKind for RepositoryAnnotation {
    fn descriptors() -> Vec<AnnotationDescriptor> {
        vec![AnnotationDescriptor {
            name: TYPE_REPOSITORY,
            param_names: &[PARAM_AGGREGATE, PARAM_PACKAGE, PARAM_MODEL, PARAM_METHODS],
            validator: validate_repository,
        }]
    }

    fn from_annotation(annotation: &Annotation) -> Option<Self> {
        (annotation.name == TYPE_REPOSITORY).then(|| {
            RepositoryAnnotation::Repository(RepositoryAttributes {
                aggregate: facts::text(annotation, PARAM_AGGREGATE),
                package: facts::text(annotation, PARAM_PACKAGE),
                model: facts::text(annotation, PARAM_MODEL),
                methods: facts::text(annotation, PARAM_METHODS),
            })
        })
    }
}

pub fn repository_attributes(s: &Struct) -> Option<RepositoryAttributes> {
    resolve_kind::<RepositoryAnnotation>(&s.doc_lines, TYPE_REPOSITORY)
        .map(|RepositoryAnnotation::Repository(attributes)| attributes)
}

pub fn is_repository(s: &Struct) -> bool {
    repository_attributes(s).is_some()
}

pub fn aggregate_name(s: &Struct) -> String {
    repository_attributes(s).map(|a| a.aggregate).unwrap_or_default()
}

/// Module holding the aggregate's events; defaults to `<aggregate>Events` with a lowercase initial.
pub fn package_name(s: &Struct) -> String {
    match repository_attributes(s) {
        Some(a) if !a.package.is_empty() => a.package,
        _ => format!("{}Events", facts::to_first_lower(&aggregate_name(s))),
    }
}

/// Model type rebuilt from the events; defaults to the aggregate name.
pub fn model_name(s: &Struct) -> String {
    match repository_attributes(s) {
        Some(a) if !a.model.is_empty() => a.model,
        _ => aggregate_name(s),
    }
}

pub fn has_method(s: &Struct, method: &str) -> bool {
    repository_attributes(s).is_some_and(|a| facts::list_contains(&a.methods, method))
}

#[derive(Debug, Clone, Copy, Default)]
pub struct RepositoryGenerator;

impl Generator for RepositoryGenerator {
    fn name(&self) -> &'static str {
        "repository"
    }

    fn annotations(&self) -> Vec<AnnotationDescriptor> {
        RepositoryAnnotation::descriptors()
    }

    fn generate(&self, input_dir: &Path, sources: &ParsedSources) -> Result<GenerationOutcome> {
        let mut run = GenerationRun::new(self.name());
        if sources.structs.is_empty() {
            debug!("[repository] no structs");
            return run.skip();
        }

        let package_name = run.resolve_package(package_name_for_structs(&sources.structs))?;
        let target_dir = run.resolve_target(input_dir)?;

        for repository in sources.structs.iter().filter(|s| is_repository(s)) {
            let context = RepositoryContext::new(&package_name, repository);
            let target = target_dir.join(format!("{}.rs", facts::to_first_lower(&repository.name)));
            let emission = Emission::new(
                format!("{}.{}", repository.package_name, repository.name),
                prefixed(&target),
                "repository",
                REPOSITORY_TEMPLATE,
            )
            .with_data(&context)?;
            run.emit(emission)?;
        }

        run.finish()
    }
}

#[derive(Debug, Serialize)]
struct RepositoryContext {
    package_name: String,
    name: String,
    aggregate: String,
    events_package: String,
    /// Constant emitted by the event plugin, e.g. `ORDER_AGGREGATE_NAME`
    aggregate_const: String,
    model: String,
    model_module: String,
    /// `method name -> enabled` for every known method
    methods: BTreeMap<&'static str, bool>,
}

impl RepositoryContext {
    fn new(package_name: &str, s: &Struct) -> Self {
        let model = facts::to_first_upper(&model_name(s));
        let aggregate = facts::to_first_upper(&aggregate_name(s));
        Self {
            package_name: package_name.to_string(),
            name: s.name.clone(),
            aggregate_const: format!("{}_AGGREGATE_NAME", facts::to_snake_case(&aggregate).to_uppercase()),
            aggregate,
            events_package: self::package_name(s),
            model_module: format!("{}_model", facts::to_snake_case(&model)),
            model,
            methods: KNOWN_METHODS.iter().map(|m| (*m, has_method(s, m))).collect(),
        }
    }
}

const REPOSITORY_TEMPLATE: &str = r#"// Generated by annotation-codegen from package {{package_name}}. DO NOT EDIT.

use envelope::{Envelope, EnvelopeFilter};
use store::{EventStore, StoreError};
use {{model_module}}::{{model}};

impl {{name}} {
    pub const AGGREGATE_NAME: &'static str = {{events_package}}::{{aggregate_const}};
{{#if methods.find}}

    pub fn find_{{snake_case model}}(&self, store: &dyn EventStore, uid: &str) -> Result<{{model}}, StoreError> {
        self.do_find_{{snake_case model}}(store, uid, &EnvelopeFilter::AcceptAll).map(|(model, _)| model)
    }
{{#if methods.filterByEvent}}

    pub fn find_{{snake_case model}}_on_event(&self, store: &dyn EventStore, uid: &str, event_uid: &str) -> Result<{{model}}, StoreError> {
        self.do_find_{{snake_case model}}(store, uid, &EnvelopeFilter::ByEventUid(event_uid.to_string()))
            .map(|(model, _)| model)
    }
{{/if}}
{{#if methods.filterByMoment}}

    pub fn find_{{snake_case model}}_on_moment(&self, store: &dyn EventStore, uid: &str, moment: i64) -> Result<{{model}}, StoreError> {
        self.do_find_{{snake_case model}}(store, uid, &EnvelopeFilter::ByMoment(moment))
            .map(|(model, _)| model)
    }
{{/if}}

    pub fn do_find_{{snake_case model}}(
        &self,
        store: &dyn EventStore,
        uid: &str,
        filter: &EnvelopeFilter,
    ) -> Result<({{model}}, Vec<Envelope>), StoreError> {
        let envelopes = filter.apply(store.search(Self::AGGREGATE_NAME, uid)?);
        if envelopes.is_empty() {
            return Err(StoreError::NotFound(format!("{{model}} with uid {uid} not found")));
        }
        let mut model = {{model}}::default();
        {{events_package}}::apply_{{snake_case aggregate}}_events(&envelopes, &mut model)?;
        Ok((model, envelopes))
    }
{{/if}}
{{#if methods.findStates}}

    pub fn find_{{snake_case model}}_states(&self, store: &dyn EventStore, uid: &str) -> Result<Vec<{{model}}>, StoreError> {
        let mut model = {{model}}::default();
        let mut states = Vec::new();
        for envelope in store.search(Self::AGGREGATE_NAME, uid)? {
            {{events_package}}::apply_{{snake_case aggregate}}_event(&envelope, &mut model)?;
            states.push(model.clone());
        }
        Ok(states)
    }
{{/if}}
{{#if methods.exists}}

    pub fn exists_{{snake_case model}}(&self, store: &dyn EventStore, uid: &str) -> Result<bool, StoreError> {
        store.exists(Self::AGGREGATE_NAME, uid)
    }
{{/if}}
{{#if methods.allAggregateUIDs}}

    pub fn all_{{snake_case model}}_uids(&self, store: &dyn EventStore) -> Result<Vec<String>, StoreError> {
        store.all_aggregate_uids(Self::AGGREGATE_NAME)
    }
{{/if}}
{{#if methods.allAggregates}}

    pub fn all_{{snake_case model}}s(&self, store: &dyn EventStore) -> Result<Vec<{{model}}>, StoreError> {
        store
            .all_aggregate_uids(Self::AGGREGATE_NAME)?
            .iter()
            .map(|uid| self.do_find_{{snake_case model}}(store, uid, &EnvelopeFilter::AcceptAll).map(|(model, _)| model))
            .collect()
    }
{{/if}}
{{#if methods.purgeOnEventUIDs}}

    pub fn purge_{{snake_case model}}_on_event_uids(&self, store: &dyn EventStore, event_uids: &[String]) -> Result<(), StoreError> {
        store.purge_on_event_uids(Self::AGGREGATE_NAME, event_uids)
    }
{{/if}}
{{#if methods.purgeOnEventType}}

    pub fn purge_{{snake_case model}}_on_event_type(&self, store: &dyn EventStore, event_type_name: &str) -> Result<(), StoreError> {
        store.purge_on_event_type(Self::AGGREGATE_NAME, event_type_name)
    }
{{/if}}
{{#if methods.purgeAll}}

    pub fn purge_all_{{snake_case model}}s(&self, store: &dyn EventStore) -> Result<(), StoreError> {
        store.purge_all(Self::AGGREGATE_NAME)
    }
{{/if}}
}
"#;

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn repository(doc: &str) -> Struct {
        Struct {
            doc_lines: vec![doc.to_string()],
            package_name: "orders".to_string(),
            filename: "repository.rs".to_string(),
            name: "OrderRepository".to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_repository_facts_with_defaults() {
        let s = repository(r#"// @Repository( aggregate = "Order", methods = "find, exists" )"#);
        assert!(is_repository(&s));
        assert_eq!(aggregate_name(&s), "Order");
        assert_eq!(package_name(&s), "orderEvents");
        assert_eq!(model_name(&s), "Order");
        assert!(has_method(&s, "find"));
        assert!(has_method(&s, "exists"));
        assert!(!has_method(&s, "purgeAll"));
    }

    #[test]
    fn test_repository_facts_explicit() {
        let s = repository(r#"// @Repository( aggregate = "Order", package = "events", model = "OrderState" )"#);
        assert_eq!(package_name(&s), "events");
        assert_eq!(model_name(&s), "OrderState");
        assert!(!has_method(&s, "find"));
    }

    #[test]
    fn test_repository_requires_aggregate() {
        let s = repository(r#"// @Repository( methods = "find" )"#);
        assert!(!is_repository(&s));
        assert!(!has_method(&s, "find"));
    }

    #[test]
    fn test_generates_selected_methods_only() {
        let temp_dir = TempDir::new().unwrap();
        let sources = ParsedSources {
            structs: vec![repository(
                r#"// @Repository( aggregate = "Order", model = "OrderState", methods = "find, exists" )"#,
            )],
            ..Default::default()
        };

        let outcome = RepositoryGenerator.generate(temp_dir.path(), &sources).unwrap();
        let target = temp_dir.path().join("gen_orderRepository.rs");
        assert_eq!(outcome.artifacts(), &[target.clone()]);

        let content = fs::read_to_string(target).unwrap();
        assert!(content.contains("use order_state_model::OrderState;"));
        assert!(content.contains("= orderEvents::ORDER_AGGREGATE_NAME;"));
        assert!(content.contains("pub fn find_order_state(&self"));
        assert!(content.contains("orderEvents::apply_order_events(&envelopes, &mut model)?;"));
        assert!(content.contains("pub fn exists_order_state(&self"));
        assert!(!content.contains("find_order_state_on_event"));
        assert!(!content.contains("purge_all"));
    }

    #[test]
    fn test_without_repositories_is_skipped() {
        let temp_dir = TempDir::new().unwrap();
        let sources = ParsedSources {
            structs: vec![repository("/// Not a repository")],
            ..Default::default()
        };
        assert_eq!(
            RepositoryGenerator.generate(temp_dir.path(), &sources).unwrap(),
            GenerationOutcome::Skipped
        );
    }
}
