pub const AGGREGATES: &str = r#"// Generated by annotation-codegen from package {{package_name}}. DO NOT EDIT.

{{#each aggregates}}
pub const {{shouty name}}_AGGREGATE_NAME: &str = "{{name}}";

/// Events that make up the `{{name}}` aggregate.
pub const {{shouty name}}_EVENT_TYPE_NAMES: &[&str] = &[
{{#each events}}
    "{{this}}",
{{/each}}
];

#[derive(Debug, Clone, PartialEq)]
pub enum {{name}}Event {
{{#each events}}
    {{this}}({{this}}),
{{/each}}
}

{{/each}}
"#;

pub const WRAPPERS: &str = r#"// Generated by annotation-codegen from package {{package_name}}. DO NOT EDIT.

use envelope::{Envelope, Metadata};

{{#each events}}
impl {{name}} {
    pub const EVENT_TYPE_NAME: &'static str = "{{name}}";
    pub const AGGREGATE_NAME: &'static str = "{{aggregate}}";
    pub const IS_ROOT_EVENT: bool = {{is_root}};
    pub const IS_TRANSIENT: bool = {{is_transient}};

    pub fn wrap(&self, aggregate_uid: &str, metadata: Metadata) -> Result<Envelope, serde_json::Error> {
        Envelope::wrap(Self::AGGREGATE_NAME, aggregate_uid, Self::EVENT_TYPE_NAME, metadata, self)
    }

    pub fn unwrap(envelope: &Envelope) -> Result<Self, serde_json::Error> {
        serde_json::from_str(&envelope.event_data)
    }
}

{{/each}}
"#;

pub const ANONYMIZED: &str = r#"// Generated by annotation-codegen from package {{package_name}}. DO NOT EDIT.

use anonymize::Anonymize;

{{#each sensitive}}
impl Anonymize for {{name}} {
    fn anonymized(&self) -> Self {
        let mut {{identifier}} = self.clone();
{{#each fields}}
{{#if is_sensitive}}
        {{../identifier}}.{{name}} = anonymize::value(&{{../identifier}}.{{name}});
{{/if}}
{{#if is_deep_sensitive}}
        {{../identifier}}.{{name}} = {{../identifier}}.{{name}}.anonymized();
{{/if}}
{{#if is_custom_sensitive}}
        {{../identifier}}.{{name}} = {{../identifier}}.anonymize_{{name}}();
{{/if}}
{{/each}}
        {{identifier}}
    }
}

{{/each}}
"#;

pub const EVENT_STORE: &str = r#"// Generated by annotation-codegen from package {{package_name}}. DO NOT EDIT.

use envelope::Metadata;
use store::{EventStore, StoreError};

{{#each events}}
{{#if is_persistent}}
pub fn store_{{snake_case name}}(
    store: &dyn EventStore,
    aggregate_uid: &str,
    event: &{{@root.package_name}}::{{name}},
    metadata: Metadata,
) -> Result<(), StoreError> {
    let envelope = event.wrap(aggregate_uid, metadata)?;
    store.put({{@root.package_name}}::{{name}}::AGGREGATE_NAME, aggregate_uid, envelope)
}

{{/if}}
{{/each}}
"#;

pub const EVENT_PUBLISHER: &str = r#"// Generated by annotation-codegen from package {{package_name}}. DO NOT EDIT.

use envelope::Metadata;
use publisher::{PublishError, Publisher};

{{#each events}}
{{#if is_transient}}
pub fn publish_{{snake_case name}}(
    publisher: &dyn Publisher,
    aggregate_uid: &str,
    event: &{{@root.package_name}}::{{name}},
    metadata: Metadata,
) -> Result<(), PublishError> {
    let envelope = event.wrap(aggregate_uid, metadata)?;
    publisher.publish("{{aggregate}}", envelope)
}

{{/if}}
{{/each}}
"#;

pub const WRAPPERS_TEST: &str = r#"// Generated by annotation-codegen from package {{package_name}}. DO NOT EDIT.

use super::*;
use envelope::Metadata;

{{#each events}}
#[test]
fn test_{{snake_case name}}_wrapper() {
    let event = {{name}} {
{{#each fields}}
{{#if sample_value}}
        {{name}}: {{sample_value}},
{{/if}}
{{/each}}
        ..Default::default()
    };
    let envelope = event.wrap("1234321", Metadata::default()).unwrap();
    assert_eq!(envelope.aggregate_name, "{{aggregate}}");
    assert_eq!(envelope.event_type_name, "{{name}}");
    assert_eq!({{name}}::unwrap(&envelope).unwrap(), event);
}

{{/each}}
"#;

pub const INTERFACE: &str = r#"// Generated by annotation-codegen from package {{package_name}}. DO NOT EDIT.

{{#each aggregates}}
pub trait {{name}}EventHandler {
{{#each events}}
    fn on_{{snake_case this}}(&self, event: &{{this}}) -> Result<(), HandlerError>;
{{/each}}
}

{{/each}}
"#;
