//! Event-sourcing helpers for structs annotated with `@Event` / `@EventPart`.
//!
//! Artifacts, each only when something qualifies:
//!
//! | file | condition |
//! |------|-----------|
//! | `gen_aggregates.rs` | any event |
//! | `gen_wrappers.rs` | any event |
//! | `gen_anonymized.rs` | any sensitive event or event part |
//! | `../<pkg>Store/gen_<pkg>Store.rs` | any persistent event |
//! | `../<pkg>Publisher/gen_<pkg>Publisher.rs` | any transient event |
//! | `gen_wrappers_test.rs` | any event |
//! | `gen_interface.rs` | any event |

pub mod annotations;
mod templates;

use self::annotations::{
    event_attributes, field_sensitivity, is_event, is_sensitive_event_or_event_part, EventAnnotation,
    SensitivityLevel,
};
use super::render::Emission;
use super::unit::{package_name_for_structs, sibling_dir, GenerationRun};
use super::{prefixed, GenerationOutcome, Generator};
use crate::annotation::{facts, AnnotationDescriptor, AnnotationKind};
use crate::error::Result;
use crate::model::{Field, ParsedSources, Struct};
use handlebars::{handlebars_helper, Handlebars};
use log::debug;
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

#[derive(Debug, Clone, Copy, Default)]
pub struct EventGenerator;

impl Generator for EventGenerator {
    fn name(&self) -> &'static str {
        "event"
    }

    fn annotations(&self) -> Vec<AnnotationDescriptor> {
        EventAnnotation::descriptors()
    }

    fn generate(&self, input_dir: &Path, sources: &ParsedSources) -> Result<GenerationOutcome> {
        let mut run = GenerationRun::new(self.name());
        if sources.structs.is_empty() {
            debug!("[event] no structs");
            return run.skip();
        }

        let package_name = run.resolve_package(package_name_for_structs(&sources.structs))?;
        let target_dir = run.resolve_target(input_dir)?;
        let context = EventContext::build(&package_name, &sources.structs);

        let artifacts = [
            (!context.aggregates.is_empty(), "aggregates", templates::AGGREGATES, target_dir.join("aggregates.rs")),
            (!context.events.is_empty(), "wrappers", templates::WRAPPERS, target_dir.join("wrappers.rs")),
            (!context.sensitive.is_empty(), "anonymized", templates::ANONYMIZED, target_dir.join("anonymized.rs")),
            (
                context.is_any_persistent,
                "event-store",
                templates::EVENT_STORE,
                sibling_dir(&target_dir, &format!("{package_name}Store")).join(format!("{package_name}Store.rs")),
            ),
            (
                context.is_any_transient,
                "event-publisher",
                templates::EVENT_PUBLISHER,
                sibling_dir(&target_dir, &format!("{package_name}Publisher"))
                    .join(format!("{package_name}Publisher.rs")),
            ),
            (!context.events.is_empty(), "wrappers-test", templates::WRAPPERS_TEST, target_dir.join("wrappers_test.rs")),
            (!context.events.is_empty(), "interface", templates::INTERFACE, target_dir.join("interface.rs")),
        ];

        for (wanted, template_name, template_body, target) in artifacts {
            if !wanted {
                continue;
            }
            let emission = Emission::new(package_name.clone(), prefixed(&target), template_name, template_body)
                .with_helpers(register_event_helpers)
                .with_data(&context)?;
            run.emit(emission)?;
        }

        run.finish()
    }
}

handlebars_helper!(shouty: |s: str| facts::to_snake_case(s).to_uppercase());

fn register_event_helpers(handlebars: &mut Handlebars<'static>) {
    handlebars.register_helper("shouty", Box::new(shouty));
}

#[derive(Debug, Serialize)]
struct EventContext {
    package_name: String,
    aggregates: Vec<AggregateEntry>,
    /// Events in declaration order
    events: Vec<StructEntry>,
    /// Sensitive events and event parts
    sensitive: Vec<StructEntry>,
    is_any_persistent: bool,
    is_any_transient: bool,
}

#[derive(Debug, Serialize)]
struct AggregateEntry {
    name: String,
    name_lower: String,
    /// Event type names, sorted
    events: BTreeSet<String>,
    is_any_persistent: bool,
    is_any_sensitive: bool,
}

#[derive(Debug, Clone, Serialize)]
struct StructEntry {
    name: String,
    aggregate: String,
    is_root: bool,
    is_persistent: bool,
    is_transient: bool,
    is_sensitive: bool,
    /// Local variable name used in generated code: `e` for events, `ep` for parts
    identifier: &'static str,
    fields: Vec<FieldEntry>,
}

#[derive(Debug, Clone, Serialize)]
struct FieldEntry {
    name: String,
    type_name: String,
    is_sensitive: bool,
    is_deep_sensitive: bool,
    is_custom_sensitive: bool,
    sample_value: Option<String>,
}

impl EventContext {
    fn build(package_name: &str, structs: &[Struct]) -> Self {
        let mut aggregates: BTreeMap<String, AggregateEntry> = BTreeMap::new();
        let mut events = Vec::new();
        let mut sensitive = Vec::new();

        for s in structs {
            if let Some(attributes) = event_attributes(s) {
                let entry = StructEntry::new(s);
                let aggregate = aggregates
                    .entry(attributes.aggregate.clone())
                    .or_insert_with(|| AggregateEntry {
                        name: attributes.aggregate.clone(),
                        name_lower: facts::to_first_lower(&attributes.aggregate),
                        events: BTreeSet::new(),
                        is_any_persistent: false,
                        is_any_sensitive: false,
                    });
                aggregate.events.insert(s.name.clone());
                aggregate.is_any_persistent |= entry.is_persistent;
                aggregate.is_any_sensitive |= entry.is_sensitive;
                events.push(entry);
            }
            if is_sensitive_event_or_event_part(s) {
                sensitive.push(StructEntry::new(s));
            }
        }

        Self {
            package_name: package_name.to_string(),
            is_any_persistent: events.iter().any(|e| e.is_persistent),
            is_any_transient: events.iter().any(|e| e.is_transient),
            aggregates: aggregates.into_values().collect(),
            events,
            sensitive,
        }
    }
}

impl StructEntry {
    fn new(s: &Struct) -> Self {
        let attributes = event_attributes(s);
        Self {
            name: s.name.clone(),
            aggregate: attributes.as_ref().map(|a| a.aggregate.clone()).unwrap_or_default(),
            is_root: attributes.as_ref().is_some_and(|a| a.is_root_event),
            is_persistent: attributes.as_ref().is_some_and(|a| !a.is_transient),
            is_transient: attributes.as_ref().is_some_and(|a| a.is_transient),
            is_sensitive: is_sensitive_event_or_event_part(s),
            identifier: if is_event(s) { "e" } else { "ep" },
            fields: s.fields.iter().map(FieldEntry::new).collect(),
        }
    }
}

impl FieldEntry {
    fn new(f: &Field) -> Self {
        let level = field_sensitivity(f);
        Self {
            name: f.name.clone(),
            type_name: f.type_name.clone(),
            is_sensitive: level == Some(SensitivityLevel::Plain),
            is_deep_sensitive: level == Some(SensitivityLevel::Deep),
            is_custom_sensitive: level == Some(SensitivityLevel::Custom),
            sample_value: sample_value(f),
        }
    }
}

/// Literal used to populate a field in generated wrapper tests.
fn sample_value(f: &Field) -> Option<String> {
    let value = if f.is_vec() {
        let element = Field::new(f.name.clone(), f.element_type_name().unwrap_or_default());
        if element.is_int() {
            "vec![1, 2]".to_string()
        } else if element.is_string() {
            format!("vec![\"Example1{0}\".to_string(), \"Example2{0}\".to_string()]", f.name)
        } else {
            return None;
        }
    } else if f.is_int() {
        "42".to_string()
    } else if f.is_string() {
        format!("\"Example3{}\".to_string()", f.name)
    } else if f.is_bool() {
        "true".to_string()
    } else {
        return None;
    };

    if f.is_option() {
        Some(format!("Some({value})"))
    } else {
        Some(value)
    }
}
