//! Outbound clients declared on traits.
//!
//! A trait annotated with `@OutboundClient` describes a remote system this service
//! calls. Its methods carry `@OutboundOperation`. Nothing is generated yet; the plugin
//! validates the unit and logs what it found.

use super::unit::{package_name_for_interfaces, GenerationRun};
use super::{GenerationOutcome, Generator};
use crate::annotation::{facts, resolve_kind, Annotation, AnnotationDescriptor, AnnotationKind};
use crate::error::Result;
use crate::model::{Interface, Operation, ParsedSources};
use log::{debug, info};
use std::path::Path;

pub const TYPE_OUTBOUND_CLIENT: &str = "OutboundClient";
pub const TYPE_OUTBOUND_OPERATION: &str = "OutboundOperation";

pub const PARAM_NAME: &str = "name";
pub const PARAM_DESCRIPTION: &str = "description";
pub const PARAM_EXTERNAL: &str = "external";
pub const PARAM_HTTP: &str = "http";
pub const PARAM_INBOUND: &str = "inbound";
pub const PARAM_OUTBOUND: &str = "outbound";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutboundAnnotation {
    OutboundClient {
        name: String,
        description: String,
        is_external: bool,
        is_http: bool,
    },
    OutboundOperation {
        name: String,
        description: String,
        inbound: String,
        outbound: String,
    },
}

fn has_description(annotation: &Annotation) -> bool {
    !annotation.attribute(PARAM_DESCRIPTION).is_empty()
}

impl AnnotationKind for OutboundAnnotation {
    fn descriptors() -> Vec<AnnotationDescriptor> {
        vec![
            AnnotationDescriptor {
                name: TYPE_OUTBOUND_CLIENT,
                param_names: &[PARAM_NAME, PARAM_DESCRIPTION, PARAM_EXTERNAL, PARAM_HTTP],
                validator: has_description,
            },
            AnnotationDescriptor {
                name: TYPE_OUTBOUND_OPERATION,
                param_names: &[PARAM_NAME, PARAM_DESCRIPTION, PARAM_INBOUND, PARAM_OUTBOUND],
                validator: has_description,
            },
        ]
    }

    fn from_annotation(annotation: &Annotation) -> Option<Self> {
        match annotation.name.as_str() {
            TYPE_OUTBOUND_CLIENT => Some(OutboundAnnotation::OutboundClient {
                name: facts::text(annotation, PARAM_NAME),
                description: facts::text(annotation, PARAM_DESCRIPTION),
                is_external: facts::flag(annotation, PARAM_EXTERNAL),
                is_http: facts::flag(annotation, PARAM_HTTP),
            }),
            TYPE_OUTBOUND_OPERATION => Some(OutboundAnnotation::OutboundOperation {
                name: facts::text(annotation, PARAM_NAME),
                description: facts::text(annotation, PARAM_DESCRIPTION),
                inbound: facts::text(annotation, PARAM_INBOUND),
                outbound: facts::text(annotation, PARAM_OUTBOUND),
            }),
            _ => None,
        }
    }
}

pub fn is_outbound_client(i: &Interface) -> bool {
    resolve_kind::<OutboundAnnotation>(&i.doc_lines, TYPE_OUTBOUND_CLIENT).is_some()
}

pub fn client_description(i: &Interface) -> String {
    match resolve_kind::<OutboundAnnotation>(&i.doc_lines, TYPE_OUTBOUND_CLIENT) {
        Some(OutboundAnnotation::OutboundClient { description, .. }) => description,
        _ => String::new(),
    }
}

pub fn is_external_client(i: &Interface) -> bool {
    matches!(
        resolve_kind::<OutboundAnnotation>(&i.doc_lines, TYPE_OUTBOUND_CLIENT),
        Some(OutboundAnnotation::OutboundClient { is_external: true, .. })
    )
}

pub fn is_http_client(i: &Interface) -> bool {
    matches!(
        resolve_kind::<OutboundAnnotation>(&i.doc_lines, TYPE_OUTBOUND_CLIENT),
        Some(OutboundAnnotation::OutboundClient { is_http: true, .. })
    )
}

pub fn is_outbound_operation(o: &Operation) -> bool {
    resolve_kind::<OutboundAnnotation>(&o.doc_lines, TYPE_OUTBOUND_OPERATION).is_some()
}

pub fn operation_description(o: &Operation) -> String {
    match resolve_kind::<OutboundAnnotation>(&o.doc_lines, TYPE_OUTBOUND_OPERATION) {
        Some(OutboundAnnotation::OutboundOperation { description, .. }) => description,
        _ => String::new(),
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct OutboundGenerator;

impl Generator for OutboundGenerator {
    fn name(&self) -> &'static str {
        "outbound"
    }

    fn annotations(&self) -> Vec<AnnotationDescriptor> {
        OutboundAnnotation::descriptors()
    }

    fn generate(&self, input_dir: &Path, sources: &ParsedSources) -> Result<GenerationOutcome> {
        let mut run = GenerationRun::new(self.name());
        if sources.interfaces.is_empty() {
            debug!("[outbound] no interfaces");
            return run.skip();
        }

        let package_name = run.resolve_package(package_name_for_interfaces(&sources.interfaces))?;
        run.resolve_target(input_dir)?;

        for client in sources.interfaces.iter().filter(|i| is_outbound_client(i)) {
            info!(
                "Outbound-client: {}.{} ({})",
                package_name,
                client.name,
                client_description(client)
            );
            for operation in client.methods.iter().filter(|o| is_outbound_operation(o)) {
                info!(
                    "  Outbound-operation: {} ({})",
                    operation.name,
                    operation_description(operation)
                );
            }
        }

        run.finish()
    }
}
