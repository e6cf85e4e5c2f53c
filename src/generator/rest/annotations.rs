//! `@RestService` on structs and `@RestOperation` on their methods.

use crate::annotation::{facts, resolve_kind, Annotation, AnnotationDescriptor, AnnotationKind};
use crate::model::{Field, Operation, Struct};
use regex::Regex;
use std::sync::LazyLock;

pub const TYPE_REST_SERVICE: &str = "RestService";
pub const TYPE_REST_OPERATION: &str = "RestOperation";

pub const PARAM_PATH: &str = "path";
pub const PARAM_CREDENTIALS: &str = "credentials";
pub const PARAM_PROTECTED: &str = "protected";
pub const PARAM_NO_VALIDATION: &str = "noValidation";
pub const PARAM_NO_TEST: &str = "noTest";

pub const PARAM_METHOD: &str = "method";
pub const PARAM_FORMAT: &str = "format";
pub const PARAM_FORM: &str = "form";
pub const PARAM_TRANSACTIONAL: &str = "transaction";
pub const PARAM_NO_WRAP: &str = "noWrap";
pub const PARAM_AFTER: &str = "after";
pub const PARAM_FILENAME: &str = "filename";
pub const PARAM_ROLES: &str = "roles";
pub const PARAM_PRODUCES_EVENTS: &str = "producesEvents";
pub const PARAM_OPTIONAL: &str = "optionalArgs";

static PATH_PARAM_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\{(\w+)\}").expect("valid path parameter regex"));

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RestServiceAttributes {
    pub path: String,
    pub credentials: String,
    pub protected: bool,
    pub no_validation: bool,
    pub no_test: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RestOperationAttributes {
    pub path: String,
    pub method: String,
    pub format: String,
    pub form: bool,
    pub transactional: bool,
    pub no_wrap: bool,
    pub after: bool,
    pub filename: String,
    pub roles: Vec<String>,
    pub produces_events: Vec<String>,
    /// `None` when the attribute is absent: every argument is then mandatory
    pub optional_args: Option<Vec<String>>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RestAnnotation {
    RestService(RestServiceAttributes),
    RestOperation(RestOperationAttributes),
}

fn validate_rest_service(annotation: &Annotation) -> bool {
    !annotation.attribute(PARAM_PATH).is_empty()
}

fn validate_rest_operation(annotation: &Annotation) -> bool {
    !annotation.attribute(PARAM_METHOD).is_empty()
}

impl AnnotationKind for RestAnnotation {
    fn descriptors() -> Vec<AnnotationDescriptor> {
        vec![
            AnnotationDescriptor {
                name: TYPE_REST_SERVICE,
                param_names: &[PARAM_PATH, PARAM_CREDENTIALS, PARAM_PROTECTED, PARAM_NO_VALIDATION, PARAM_NO_TEST],
                validator: validate_rest_service,
            },
            AnnotationDescriptor {
                name: TYPE_REST_OPERATION,
                param_names: &[
                    PARAM_PATH,
                    PARAM_METHOD,
                    PARAM_FORMAT,
                    PARAM_FORM,
                    PARAM_TRANSACTIONAL,
                    PARAM_NO_WRAP,
                    PARAM_AFTER,
                    PARAM_FILENAME,
                    PARAM_ROLES,
                    PARAM_PRODUCES_EVENTS,
                    PARAM_OPTIONAL,
                ],
                validator: validate_rest_operation,
            },
        ]
    }

    fn from_annotation(annotation: &Annotation) -> Option<Self> {
        match annotation.name.as_str() {
            TYPE_REST_SERVICE => Some(RestAnnotation::RestService(RestServiceAttributes {
                path: facts::text(annotation, PARAM_PATH),
                credentials: facts::text(annotation, PARAM_CREDENTIALS),
                protected: facts::flag(annotation, PARAM_PROTECTED),
                no_validation: facts::flag(annotation, PARAM_NO_VALIDATION),
                no_test: facts::flag(annotation, PARAM_NO_TEST),
            })),
            TYPE_REST_OPERATION => Some(RestAnnotation::RestOperation(RestOperationAttributes {
                path: facts::text(annotation, PARAM_PATH),
                method: facts::text(annotation, PARAM_METHOD),
                format: facts::text(annotation, PARAM_FORMAT),
                form: facts::flag(annotation, PARAM_FORM),
                transactional: facts::flag(annotation, PARAM_TRANSACTIONAL),
                no_wrap: facts::flag(annotation, PARAM_NO_WRAP),
                after: facts::flag(annotation, PARAM_AFTER),
                filename: facts::text(annotation, PARAM_FILENAME),
                roles: facts::split_list(annotation.attribute(PARAM_ROLES)),
                produces_events: facts::split_list(annotation.attribute(PARAM_PRODUCES_EVENTS)),
                optional_args: annotation
                    .has_attribute(PARAM_OPTIONAL)
                    .then(|| facts::split_list(annotation.attribute(PARAM_OPTIONAL))),
            })),
            _ => None,
        }
    }
}

pub fn rest_service_attributes(s: &Struct) -> Option<RestServiceAttributes> {
    match resolve_kind::<RestAnnotation>(&s.doc_lines, TYPE_REST_SERVICE)? {
        RestAnnotation::RestService(attributes) => Some(attributes),
        RestAnnotation::RestOperation(_) => None,
    }
}

pub fn rest_operation_attributes(o: &Operation) -> Option<RestOperationAttributes> {
    match resolve_kind::<RestAnnotation>(&o.doc_lines, TYPE_REST_OPERATION)? {
        RestAnnotation::RestOperation(attributes) => Some(attributes),
        RestAnnotation::RestService(_) => None,
    }
}

pub fn is_rest_service(s: &Struct) -> bool {
    rest_service_attributes(s).is_some()
}

pub fn rest_service_path(s: &Struct) -> String {
    rest_service_attributes(s).map(|a| a.path).unwrap_or_default()
}

/// Function used by generated handlers to build the request context.
pub fn extract_request_context_method(s: &Struct) -> &'static str {
    let credentials = rest_service_attributes(s).map(|a| a.credentials).unwrap_or_default();
    match credentials.as_str() {
        "all" => "request::new_context",
        "admin" => "request::new_admin_context",
        "none" => "request::new_minimal_context",
        _ => "extract_request_context",
    }
}

pub fn is_rest_service_unprotected(s: &Struct) -> bool {
    rest_service_attributes(s).is_some_and(|a| !a.protected)
}

pub fn requires_role_validation(s: &Struct) -> bool {
    !rest_service_attributes(s).is_some_and(|a| a.no_validation)
}

pub fn is_rest_service_no_test(s: &Struct) -> bool {
    rest_service_attributes(s).is_some_and(|a| a.no_test)
}

pub fn is_rest_operation(o: &Operation) -> bool {
    rest_operation_attributes(o).is_some()
}

pub fn operation_path(o: &Operation) -> String {
    rest_operation_attributes(o).map(|a| a.path).unwrap_or_default()
}

pub fn operation_method(o: &Operation) -> String {
    rest_operation_attributes(o).map(|a| a.method).unwrap_or_default()
}

pub fn operation_format(o: &Operation) -> String {
    rest_operation_attributes(o).map(|a| a.format).unwrap_or_default()
}

pub fn content_type(o: &Operation) -> Option<&'static str> {
    match operation_format(o).as_str() {
        "JSON" => Some("application/json"),
        "HTML" => Some("text/html; charset=UTF-8"),
        "CSV" => Some("text/csv; charset=UTF-8"),
        "TXT" => Some("text/plain; charset=UTF-8"),
        "MD" => Some("text/markdown; charset=UTF-8"),
        _ => None,
    }
}

pub fn is_form(o: &Operation) -> bool {
    rest_operation_attributes(o).is_some_and(|a| a.form)
}

pub fn is_transactional(o: &Operation) -> bool {
    rest_operation_attributes(o).is_some_and(|a| a.transactional)
}

pub fn is_no_wrap(o: &Operation) -> bool {
    rest_operation_attributes(o).is_some_and(|a| a.no_wrap)
}

pub fn has_after(o: &Operation) -> bool {
    rest_operation_attributes(o).is_some_and(|a| a.after)
}

pub fn operation_filename(o: &Operation) -> String {
    rest_operation_attributes(o).map(|a| a.filename).unwrap_or_default()
}

pub fn roles(o: &Operation) -> Vec<String> {
    rest_operation_attributes(o).map(|a| a.roles).unwrap_or_default()
}

pub fn produces_events(o: &Operation) -> Vec<String> {
    rest_operation_attributes(o).map(|a| a.produces_events).unwrap_or_default()
}

/// Names of the `{param}` placeholders in the operation's path, in order.
pub fn path_params(o: &Operation) -> Vec<String> {
    PATH_PARAM_RE
        .captures_iter(&operation_path(o))
        .map(|c| c[1].to_string())
        .collect()
}

/// `/orders/{uid}` -> `/orders/:uid`
pub fn route_pattern(path: &str) -> String {
    PATH_PARAM_RE.replace_all(path, ":$1").into_owned()
}

/// An argument is mandatory unless listed in `optionalArgs` (compared case-insensitively).
/// Methods without `@RestOperation` have no mandatory arguments.
pub fn is_input_arg_mandatory(o: &Operation, arg: &Field) -> bool {
    let Some(attributes) = rest_operation_attributes(o) else {
        return false;
    };
    match attributes.optional_args {
        None => true,
        Some(optional) => !optional.iter().any(|name| name.eq_ignore_ascii_case(&arg.name)),
    }
}

pub fn is_context_arg(arg: &Field) -> bool {
    facts::last_segment(arg.dereferenced_type_name()) == "Context"
}

pub fn is_request_context_arg(arg: &Field) -> bool {
    facts::last_segment(arg.dereferenced_type_name()) == "RequestContext"
}

/// The argument decoded from the request body.
pub fn is_input_arg(arg: &Field) -> bool {
    arg.is_custom() && !is_context_arg(arg) && !is_request_context_arg(arg)
}

/// Only POST and PUT operations read a body, and only when they take a custom argument.
pub fn has_input(o: &Operation) -> bool {
    let method = operation_method(o);
    (method == "POST" || method == "PUT") && o.input_args.iter().any(is_input_arg)
}
