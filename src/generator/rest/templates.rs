pub const HTTP_HANDLERS: &str = r#"// Generated by annotation-codegen from package {{package_name}}. DO NOT EDIT.

use httpkit::{HttpError, HttpRoute, Request, Response, Router};
use std::sync::Arc;

impl {{name}} {
    pub const BASE_PATH: &'static str = "{{path}}";
    pub const PROTECTED: bool = {{is_protected}};

    pub const HTTP_ROUTES: &'static [HttpRoute] = &[
{{#each operations}}
        HttpRoute {
            method: "{{method}}",
            path: "{{path}}",
            roles: &[{{#each roles}}"{{this}}", {{/each}}],
            produces_events: &[{{#each produces_events}}"{{this}}", {{/each}}],
            transactional: {{is_transactional}},
            no_wrap: {{is_no_wrap}},
        },
{{/each}}
    ];

    pub fn http_router(self: Arc<Self>) -> Router<Self> {
        Router::new(self)
{{#each operations}}
            .route("{{method}}", "{{route_pattern path}}", Self::{{snake_case name}}_http)
{{/each}}
    }
{{#each operations}}

    /// {{method}} {{path}}
    {{#if is_async}}async {{/if}}fn {{snake_case name}}_http(&self, request: &Request) -> Result<Response, HttpError> {
        let context = {{@root.extract_request_context_method}}(request)?;
{{#if @root.requires_role_validation}}
        context.require_roles(&[{{#each roles}}"{{this}}", {{/each}}])?;
{{/if}}
{{#each path_params}}
        let {{this}} = request.path_param("{{this}}")?;
{{/each}}
{{#each query_params}}
        let {{name}}: {{type_name}} = request.query_param("{{name}}", {{is_mandatory}})?;
{{/each}}
{{#if input_type}}
        let {{input_name}}: {{input_type}} = request.{{#if is_form}}form{{else}}json{{/if}}_body()?;
{{/if}}
        {{#if has_output}}let result = {{/if}}self.{{name}}({{call_args}}){{#if is_async}}.await{{/if}}{{#if returns_result}}?{{/if}};
{{#if has_after}}
        self.after_{{snake_case name}}(&context)?;
{{/if}}
{{#if has_output}}
{{#if content_type}}
        Ok(Response::with_content_type("{{content_type}}", result){{#if filename}}.attachment("{{filename}}"){{/if}})
{{else}}
        Ok(Response::from(result))
{{/if}}
{{else}}
        Ok(Response::no_content())
{{/if}}
    }
{{/each}}
}
"#;

pub const HTTP_TEST_HELPERS: &str = r#"// Generated by annotation-codegen from package {{package_name}}. DO NOT EDIT.

use super::*;
use httpkit::testing::TestRequest;

{{#each operations}}
pub fn {{snake_case name}}_test_helper({{#each path_params}}{{this}}: &str, {{/each}}{{#if input_type}}body: &{{input_type}}{{/if}}) -> TestRequest {
    TestRequest::new("{{method}}", format!("{{path}}")){{#if input_type}}
        .{{#if is_form}}form{{else}}json{{/if}}_body(body){{/if}}
}

{{/each}}
"#;

pub const HTTP_TEST_SERVICE: &str = r#"// Generated by annotation-codegen from package {{package_name}}TestLog. DO NOT EDIT.

use httpkit::testing::{TestLog, TestRequest, TestResponse};

pub const SERVICE_NAME: &str = "{{name}}";

{{#each operations}}
/// Records a `{{method}} {{path}}` exchange for the generated API documentation.
pub fn log_{{snake_case name}}(log: &mut TestLog, request: &TestRequest, response: &TestResponse) {
    log.record(SERVICE_NAME, "{{uncapitalized name}}", "{{method}}", "{{path}}", request, response);
}

{{/each}}
"#;
