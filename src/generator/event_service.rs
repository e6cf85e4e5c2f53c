//! Event dispatchers for structs annotated with `@EventService`.
//!
//! Methods annotated with `@EventOperation( topic = "..." )` become subscriptions;
//! their first non-primitive argument names the event type they handle.

use super::render::Emission;
use super::unit::{package_name_for_structs, GenerationRun};
use super::{prefixed, GenerationOutcome, Generator};
use crate::annotation::{accept_any, facts, resolve_kind, Annotation, AnnotationDescriptor, AnnotationKind};
use crate::error::Result;
use crate::model::{Field, Operation, ParsedSources, Struct};
use log::debug;
use serde::Serialize;
use std::collections::BTreeSet;
use std::path::Path;

pub const TYPE_EVENT_SERVICE: &str = "EventService";
pub const TYPE_EVENT_OPERATION: &str = "EventOperation";

pub const PARAM_SELF: &str = "self";
pub const PARAM_ASYNC: &str = "async";
pub const PARAM_ADMIN: &str = "admin";
pub const PARAM_NO_TEST: &str = "noTest";
pub const PARAM_TOPIC: &str = "topic";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EventServiceAttributes {
    /// Name the service subscribes under
    pub self_name: String,
    pub is_async: bool,
    pub is_admin: bool,
    pub no_test: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventServiceAnnotation {
    EventService(EventServiceAttributes),
    EventOperation { topic: String },
}

fn validate_event_operation(annotation: &Annotation) -> bool {
    !annotation.attribute(PARAM_TOPIC).is_empty()
}

impl AnnotationKind for EventServiceAnnotation {
    fn descriptors() -> Vec<AnnotationDescriptor> {
        vec![
            AnnotationDescriptor {
                name: TYPE_EVENT_SERVICE,
                param_names: &[PARAM_SELF, PARAM_ASYNC, PARAM_ADMIN, PARAM_NO_TEST],
                validator: accept_any,
            },
            AnnotationDescriptor {
                name: TYPE_EVENT_OPERATION,
                param_names: &[PARAM_TOPIC],
                validator: validate_event_operation,
            },
        ]
    }

    fn from_annotation(annotation: &Annotation) -> Option<Self> {
        match annotation.name.as_str() {
            TYPE_EVENT_SERVICE => Some(EventServiceAnnotation::EventService(EventServiceAttributes {
                self_name: facts::text(annotation, PARAM_SELF),
                is_async: facts::flag(annotation, PARAM_ASYNC),
                is_admin: facts::flag(annotation, PARAM_ADMIN),
                no_test: facts::flag(annotation, PARAM_NO_TEST),
            })),
            TYPE_EVENT_OPERATION => Some(EventServiceAnnotation::EventOperation {
                topic: facts::text(annotation, PARAM_TOPIC),
            }),
            _ => None,
        }
    }
}

pub fn event_service_attributes(s: &Struct) -> Option<EventServiceAttributes> {
    match resolve_kind::<EventServiceAnnotation>(&s.doc_lines, TYPE_EVENT_SERVICE)? {
        EventServiceAnnotation::EventService(attributes) => Some(attributes),
        EventServiceAnnotation::EventOperation { .. } => None,
    }
}

pub fn is_event_service(s: &Struct) -> bool {
    event_service_attributes(s).is_some()
}

/// Subscriber name: the `self` attribute, or the struct name when absent.
pub fn self_name(s: &Struct) -> String {
    match event_service_attributes(s) {
        Some(attributes) if !attributes.self_name.is_empty() => attributes.self_name,
        _ => s.name.clone(),
    }
}

pub fn is_async(s: &Struct) -> bool {
    event_service_attributes(s).is_some_and(|a| a.is_async)
}

pub fn is_admin(s: &Struct) -> bool {
    event_service_attributes(s).is_some_and(|a| a.is_admin)
}

pub fn is_no_test(s: &Struct) -> bool {
    event_service_attributes(s).is_some_and(|a| a.no_test)
}

pub fn is_event_operation(o: &Operation) -> bool {
    topic(o).is_some()
}

pub fn topic(o: &Operation) -> Option<String> {
    match resolve_kind::<EventServiceAnnotation>(&o.doc_lines, TYPE_EVENT_OPERATION)? {
        EventServiceAnnotation::EventOperation { topic } => Some(topic),
        EventServiceAnnotation::EventService(_) => None,
    }
}

/// The argument carrying the event: the first one that is neither a primitive nor a context.
pub fn event_arg(o: &Operation) -> Option<&Field> {
    o.input_args
        .iter()
        .find(|arg| arg.is_custom() && !arg.is_vec() && !facts::last_segment(arg.dereferenced_type_name()).ends_with("Context"))
}

#[derive(Debug, Clone, Copy, Default)]
pub struct EventServiceGenerator;

impl Generator for EventServiceGenerator {
    fn name(&self) -> &'static str {
        "event-service"
    }

    fn annotations(&self) -> Vec<AnnotationDescriptor> {
        EventServiceAnnotation::descriptors()
    }

    fn generate(&self, input_dir: &Path, sources: &ParsedSources) -> Result<GenerationOutcome> {
        let mut run = GenerationRun::new(self.name());
        if sources.structs.is_empty() {
            debug!("[event-service] no structs");
            return run.skip();
        }

        let package_name = run.resolve_package(package_name_for_structs(&sources.structs))?;
        let target_dir = run.resolve_target(input_dir)?;

        let services: Vec<ServiceEntry> = sources
            .structs
            .iter()
            .filter(|s| is_event_service(s))
            .map(ServiceEntry::new)
            .collect();
        if services.is_empty() {
            return run.finish();
        }

        let handlers = HandlerContext {
            package_name: package_name.clone(),
            services: services.clone(),
        };
        let emission = Emission::new(
            package_name.clone(),
            prefixed(&target_dir.join("eventHandler.rs")),
            "event-handler",
            EVENT_HANDLER_TEMPLATE,
        )
        .with_data(&handlers)?;
        run.emit(emission)?;

        let tested: Vec<ServiceEntry> = services.into_iter().filter(|s| !s.no_test).collect();
        if !tested.is_empty() {
            let helpers = HandlerContext {
                package_name: package_name.clone(),
                services: tested,
            };
            let emission = Emission::new(
                package_name.clone(),
                prefixed(&target_dir.join("eventHandlerHelpers_test.rs")),
                "event-handler-helpers",
                EVENT_HANDLER_HELPERS_TEMPLATE,
            )
            .with_data(&helpers)?;
            run.emit(emission)?;
        }

        run.finish()
    }
}

#[derive(Debug, Serialize)]
struct HandlerContext {
    package_name: String,
    services: Vec<ServiceEntry>,
}

#[derive(Debug, Clone, Serialize)]
struct ServiceEntry {
    name: String,
    self_name: String,
    is_async: bool,
    is_admin: bool,
    no_test: bool,
    /// Distinct topics, sorted
    topics: BTreeSet<String>,
    operations: Vec<OperationEntry>,
    has_async_operations: bool,
}

#[derive(Debug, Clone, Serialize)]
struct OperationEntry {
    name: String,
    topic: String,
    event_type: String,
    event_name: String,
    is_async: bool,
}

impl ServiceEntry {
    fn new(s: &Struct) -> Self {
        let attributes = event_service_attributes(s).unwrap_or_default();
        let operations: Vec<OperationEntry> = s
            .operations
            .iter()
            .filter_map(|o| {
                let topic = topic(o)?;
                let arg = event_arg(o)?;
                let event_type = arg.dereferenced_type_name().to_string();
                Some(OperationEntry {
                    name: o.name.clone(),
                    topic,
                    event_name: facts::last_segment(&event_type).to_string(),
                    event_type,
                    is_async: o.is_async,
                })
            })
            .collect();
        Self {
            name: s.name.clone(),
            self_name: self_name(s),
            is_async: attributes.is_async,
            is_admin: attributes.is_admin,
            no_test: attributes.no_test,
            topics: operations.iter().map(|o| o.topic.clone()).collect(),
            has_async_operations: operations.iter().any(|o| o.is_async),
            operations,
        }
    }
}

const EVENT_HANDLER_TEMPLATE: &str = r#"// Generated by annotation-codegen from package {{package_name}}. DO NOT EDIT.

use bus::{EventBus, HandlerError};
use envelope::Envelope;

{{#each services}}
impl {{name}} {
    pub const SUBSCRIBER_NAME: &'static str = "{{self_name}}";
    pub const REQUIRES_ADMIN: bool = {{is_admin}};

    pub fn subscribe_to_events(&self, bus: &dyn EventBus) {
{{#each topics}}
        bus.subscribe("{{this}}", Self::SUBSCRIBER_NAME);
{{/each}}
    }
{{#if is_async}}

    pub fn handle_or_enqueue_event(&self, bus: &dyn EventBus, topic: &str, envelope: Envelope) -> Result<(), HandlerError> {
        bus.enqueue(Self::SUBSCRIBER_NAME, topic, envelope)
    }
{{/if}}

    pub {{#if has_async_operations}}async {{/if}}fn handle_event(&self, topic: &str, envelope: &Envelope) -> Result<(), HandlerError> {
        match (topic, envelope.event_type_name.as_str()) {
{{#each operations}}
            ("{{topic}}", "{{event_name}}") => {
                let event = {{event_type}}::unwrap(envelope)?;
                self.{{name}}(&event){{#if is_async}}.await{{/if}}
            }
{{/each}}
            _ => Ok(()),
        }
    }
}

{{/each}}
"#;

const EVENT_HANDLER_HELPERS_TEMPLATE: &str = r#"// Generated by annotation-codegen from package {{package_name}}. DO NOT EDIT.

use super::*;
use envelope::{Envelope, Metadata};

{{#each services}}
{{#each operations}}
pub fn {{snake_case event_name}}_envelope_for_{{snake_case ../name}}(event: &{{event_type}}) -> Envelope {
    event.wrap("1234321", Metadata::default()).expect("event must wrap")
}

{{/each}}
{{/each}}
"#;

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::fs;
    use tempfile::TempDir;

    fn operation(topic: &str) -> Operation {
        Operation {
            doc_lines: vec![format!(r#"// @EventOperation( topic = "{topic}" )"#)],
            name: "on_order_created".to_string(),
            related_struct: Some("MyEventService".to_string()),
            input_args: vec![
                Field::new("ctx", "&Context"),
                Field::new("uid", "&str"),
                Field::new("event", "&events::OrderCreated"),
            ],
            ..Default::default()
        }
    }

    fn service(doc: &str) -> Struct {
        Struct {
            doc_lines: vec![doc.to_string()],
            package_name: "orders".to_string(),
            filename: "service.rs".to_string(),
            name: "MyEventService".to_string(),
            fields: vec![],
            operations: vec![operation("other")],
        }
    }

    #[test]
    fn test_event_service_facts() {
        let s = service(r#"//@EventService( self = "me", async = "true", admin = "true" )"#);
        assert!(is_event_service(&s));
        assert_eq!(self_name(&s), "me");
        assert!(is_async(&s));
        assert!(is_admin(&s));
        assert!(!is_no_test(&s));

        let unnamed = service("// @EventService()");
        assert_eq!(self_name(&unnamed), "MyEventService");
    }

    #[test]
    fn test_event_operation_facts() {
        let o = operation("other1");
        assert!(is_event_operation(&o));
        assert_eq!(topic(&o).as_deref(), Some("other1"));
        assert_eq!(event_arg(&o).unwrap().dereferenced_type_name(), "events::OrderCreated");

        let blank = Operation {
            doc_lines: vec![r#"// @EventOperation( topic = "" )"#.to_string()],
            ..Default::default()
        };
        assert!(!is_event_operation(&blank));
    }

    #[test]
    fn test_generates_handler_and_helpers() {
        let temp_dir = TempDir::new().unwrap();
        let sources = ParsedSources {
            structs: vec![service(r#"// @EventService( self = "self", async = "true", admin = "true" )"#)],
            ..Default::default()
        };

        let outcome = EventServiceGenerator.generate(temp_dir.path(), &sources).unwrap();
        assert_eq!(
            outcome.artifacts(),
            &[
                temp_dir.path().join("gen_eventHandler.rs"),
                temp_dir.path().join("gen_eventHandlerHelpers_test.rs"),
            ]
        );

        let handler = fs::read_to_string(temp_dir.path().join("gen_eventHandler.rs")).unwrap();
        assert!(handler.contains(r#"bus.subscribe("other", Self::SUBSCRIBER_NAME);"#));
        assert!(handler.contains(r#"pub const SUBSCRIBER_NAME: &'static str = "self";"#));
        assert!(handler.contains("pub fn handle_or_enqueue_event("));
        assert!(handler.contains(r#"("other", "OrderCreated") => {"#));
        assert!(handler.contains("let event = events::OrderCreated::unwrap(envelope)?;"));

        let helpers = fs::read_to_string(temp_dir.path().join("gen_eventHandlerHelpers_test.rs")).unwrap();
        assert!(helpers.contains("pub fn order_created_envelope_for_my_event_service("));
    }

    #[test]
    fn test_no_test_suppresses_helpers() {
        let temp_dir = TempDir::new().unwrap();
        let sources = ParsedSources {
            structs: vec![service(r#"// @EventService( noTest = "true" )"#)],
            ..Default::default()
        };
        let outcome = EventServiceGenerator.generate(temp_dir.path(), &sources).unwrap();
        assert_eq!(outcome.artifacts(), &[temp_dir.path().join("gen_eventHandler.rs")]);
    }

    #[test]
    fn test_without_services_is_skipped() {
        let temp_dir = TempDir::new().unwrap();
        let sources = ParsedSources {
            structs: vec![service("/// An ordinary struct.")],
            ..Default::default()
        };
        assert_eq!(
            EventServiceGenerator.generate(temp_dir.path(), &sources).unwrap(),
            GenerationOutcome::Skipped
        );
    }
}
