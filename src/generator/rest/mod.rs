//! HTTP handlers for structs annotated with `@RestService`.
//!
//! Per service `S` in package `pkg`:
//!
//! - `gen_httpS.rs` with the route table and one handler per `@RestOperation`
//! - unless `noTest`: `gen_httpSHelpers_test.rs` and `pkgTestLog/gen_httpTestS.rs`

pub mod annotations;
mod templates;

use self::annotations::*;
use super::render::Emission;
use super::unit::{package_name_for_structs, GenerationRun};
use super::{prefixed, GenerationOutcome, Generator};
use crate::annotation::{facts, AnnotationDescriptor, AnnotationKind};
use crate::error::Result;
use crate::model::{Operation, ParsedSources, Struct};
use handlebars::{handlebars_helper, Handlebars};
use log::debug;
use serde::Serialize;
use std::path::Path;

#[derive(Debug, Clone, Copy, Default)]
pub struct RestGenerator;

impl Generator for RestGenerator {
    fn name(&self) -> &'static str {
        "rest"
    }

    fn annotations(&self) -> Vec<AnnotationDescriptor> {
        RestAnnotation::descriptors()
    }

    fn generate(&self, input_dir: &Path, sources: &ParsedSources) -> Result<GenerationOutcome> {
        let mut run = GenerationRun::new(self.name());
        if sources.structs.is_empty() {
            debug!("[rest] no structs");
            return run.skip();
        }

        let package_name = run.resolve_package(package_name_for_structs(&sources.structs))?;
        let target_dir = run.resolve_target(input_dir)?;

        for service in sources.structs.iter().filter(|s| is_rest_service(s)) {
            let context = ServiceContext::new(&package_name, service);
            let upper_name = facts::to_first_upper(&service.name);
            let source_description = format!("{}.{}", package_name, upper_name);

            let handlers = target_dir.join(format!("http{upper_name}.rs"));
            run.emit(
                Emission::new(source_description.clone(), prefixed(&handlers), "http-handlers", templates::HTTP_HANDLERS)
                    .with_helpers(register_rest_helpers)
                    .with_data(&context)?,
            )?;

            if is_rest_service_no_test(service) {
                continue;
            }

            let helpers = target_dir.join(format!("http{upper_name}Helpers_test.rs"));
            run.emit(
                Emission::new(
                    source_description.clone(),
                    prefixed(&helpers),
                    "http-test-helpers",
                    templates::HTTP_TEST_HELPERS,
                )
                .with_helpers(register_rest_helpers)
                .with_data(&context)?,
            )?;

            let test_log_package = format!("{package_name}TestLog");
            let test_service = target_dir
                .join(&test_log_package)
                .join(format!("httpTest{upper_name}.rs"));
            run.emit(
                Emission::new(
                    format!("{}.{}", test_log_package, upper_name),
                    prefixed(&test_service),
                    "test-service",
                    templates::HTTP_TEST_SERVICE,
                )
                .with_helpers(register_rest_helpers)
                .with_data(&context)?,
            )?;
        }

        run.finish()
    }
}

handlebars_helper!(route_pattern_helper: |path: str| route_pattern(path));

fn register_rest_helpers(handlebars: &mut Handlebars<'static>) {
    handlebars.register_helper("route_pattern", Box::new(route_pattern_helper));
}

#[derive(Debug, Serialize)]
struct ServiceContext {
    package_name: String,
    name: String,
    path: String,
    is_protected: bool,
    extract_request_context_method: &'static str,
    requires_role_validation: bool,
    operations: Vec<OperationEntry>,
}

#[derive(Debug, Serialize)]
struct OperationEntry {
    name: String,
    method: String,
    path: String,
    content_type: Option<&'static str>,
    filename: Option<String>,
    is_form: bool,
    is_transactional: bool,
    is_no_wrap: bool,
    has_after: bool,
    is_async: bool,
    roles: Vec<String>,
    produces_events: Vec<String>,
    path_params: Vec<String>,
    query_params: Vec<ParamEntry>,
    input_name: Option<String>,
    input_type: Option<String>,
    /// Arguments passed to the service method, e.g. `&context, &uid, &person`
    call_args: String,
    has_output: bool,
    returns_result: bool,
}

#[derive(Debug, Serialize)]
struct ParamEntry {
    name: String,
    type_name: String,
    is_mandatory: bool,
}

impl ServiceContext {
    fn new(package_name: &str, service: &Struct) -> Self {
        Self {
            package_name: package_name.to_string(),
            name: service.name.clone(),
            path: rest_service_path(service),
            is_protected: !is_rest_service_unprotected(service),
            extract_request_context_method: extract_request_context_method(service),
            requires_role_validation: requires_role_validation(service),
            operations: service
                .operations
                .iter()
                .filter(|o| is_rest_operation(o))
                .map(OperationEntry::new)
                .collect(),
        }
    }
}

impl OperationEntry {
    fn new(o: &Operation) -> Self {
        let path_params = path_params(o);
        let input = has_input(o)
            .then(|| o.input_args.iter().find(|arg| is_input_arg(arg)))
            .flatten();

        let query_params = o
            .input_args
            .iter()
            .filter(|arg| !is_context_arg(arg) && !is_request_context_arg(arg) && !is_input_arg(arg))
            .filter(|arg| !path_params.contains(&arg.name))
            .map(|arg| ParamEntry {
                name: arg.name.clone(),
                type_name: if arg.is_reference() && arg.is_string() {
                    "String".to_string()
                } else {
                    arg.dereferenced_type_name().to_string()
                },
                is_mandatory: is_input_arg_mandatory(o, arg),
            })
            .collect();

        let call_args = o
            .input_args
            .iter()
            .map(|arg| {
                let name = if is_context_arg(arg) || is_request_context_arg(arg) {
                    "context"
                } else {
                    arg.name.as_str()
                };
                if arg.is_reference() {
                    format!("&{name}")
                } else {
                    name.to_string()
                }
            })
            .collect::<Vec<_>>()
            .join(", ");

        let filename = operation_filename(o);
        Self {
            name: o.name.clone(),
            method: operation_method(o),
            path: operation_path(o),
            content_type: content_type(o),
            filename: (!filename.is_empty()).then_some(filename),
            is_form: is_form(o),
            is_transactional: is_transactional(o),
            is_no_wrap: is_no_wrap(o),
            has_after: has_after(o),
            is_async: o.is_async,
            roles: roles(o),
            produces_events: produces_events(o),
            path_params,
            query_params,
            input_name: input.map(|arg| arg.name.clone()),
            input_type: input.map(|arg| arg.dereferenced_type_name().to_string()),
            call_args,
            has_output: o.output.is_some(),
            returns_result: o.error.is_some(),
        }
    }
}
