//! `@Event`, `@EventPart` and the field-level `@Sensitive` directive.

use crate::annotation::{accept_any, facts, resolve_kind, Annotation, AnnotationDescriptor, AnnotationKind};
use crate::model::{Field, Struct};

pub const TYPE_EVENT: &str = "Event";
pub const TYPE_EVENT_PART: &str = "EventPart";
pub const TYPE_SENSITIVE: &str = "Sensitive";

pub const PARAM_AGGREGATE: &str = "aggregate";
pub const PARAM_IS_ROOT_EVENT: &str = "isRootEvent";
pub const PARAM_IS_TRANSIENT: &str = "isTransient";
pub const PARAM_IS_SENSITIVE: &str = "isSensitive";
pub const PARAM_LEVEL: &str = "level";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventAttributes {
    pub aggregate: String,
    pub is_root_event: bool,
    pub is_transient: bool,
    pub is_sensitive: bool,
}

/// How a sensitive field is anonymized.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SensitivityLevel {
    /// `level = "true"`: the value itself is replaced
    Plain,
    /// `level = "deep"`: the value anonymizes its own fields
    Deep,
    /// `level = "custom"`: the owning struct provides the anonymizer
    Custom,
}

impl SensitivityLevel {
    fn parse(value: &str) -> Option<Self> {
        match value {
            "true" => Some(SensitivityLevel::Plain),
            "deep" => Some(SensitivityLevel::Deep),
            "custom" => Some(SensitivityLevel::Custom),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventAnnotation {
    Event(EventAttributes),
    EventPart { is_sensitive: bool },
    Sensitive { level: SensitivityLevel },
}

fn validate_event(annotation: &Annotation) -> bool {
    !annotation.attribute(PARAM_AGGREGATE).is_empty()
}

fn validate_sensitive(annotation: &Annotation) -> bool {
    SensitivityLevel::parse(annotation.attribute(PARAM_LEVEL)).is_some()
}

impl AnnotationKind for EventAnnotation {
    fn descriptors() -> Vec<AnnotationDescriptor> {
        vec![
            AnnotationDescriptor {
                name: TYPE_EVENT,
                param_names: &[PARAM_AGGREGATE, PARAM_IS_ROOT_EVENT, PARAM_IS_TRANSIENT, PARAM_IS_SENSITIVE],
                validator: validate_event,
            },
            AnnotationDescriptor {
                name: TYPE_EVENT_PART,
                param_names: &[PARAM_IS_SENSITIVE],
                validator: accept_any,
            },
            AnnotationDescriptor {
                name: TYPE_SENSITIVE,
                param_names: &[PARAM_LEVEL],
                validator: validate_sensitive,
            },
        ]
    }

    fn from_annotation(annotation: &Annotation) -> Option<Self> {
        match annotation.name.as_str() {
            TYPE_EVENT => Some(EventAnnotation::Event(EventAttributes {
                aggregate: facts::text(annotation, PARAM_AGGREGATE),
                is_root_event: facts::flag(annotation, PARAM_IS_ROOT_EVENT),
                is_transient: facts::flag(annotation, PARAM_IS_TRANSIENT),
                is_sensitive: facts::flag(annotation, PARAM_IS_SENSITIVE),
            })),
            TYPE_EVENT_PART => Some(EventAnnotation::EventPart {
                is_sensitive: facts::flag(annotation, PARAM_IS_SENSITIVE),
            }),
            TYPE_SENSITIVE => SensitivityLevel::parse(annotation.attribute(PARAM_LEVEL))
                .map(|level| EventAnnotation::Sensitive { level }),
            _ => None,
        }
    }
}

pub fn event_attributes(s: &Struct) -> Option<EventAttributes> {
    match resolve_kind::<EventAnnotation>(&s.doc_lines, TYPE_EVENT)? {
        EventAnnotation::Event(attributes) => Some(attributes),
        _ => None,
    }
}

pub fn is_event(s: &Struct) -> bool {
    event_attributes(s).is_some()
}

pub fn is_event_part(s: &Struct) -> bool {
    resolve_kind::<EventAnnotation>(&s.doc_lines, TYPE_EVENT_PART).is_some()
}

pub fn aggregate_name(s: &Struct) -> String {
    event_attributes(s).map(|a| a.aggregate).unwrap_or_default()
}

pub fn aggregate_name_lower(s: &Struct) -> String {
    facts::to_first_lower(&aggregate_name(s))
}

pub fn is_root_event(s: &Struct) -> bool {
    event_attributes(s).is_some_and(|a| a.is_root_event)
}

/// Events are persistent unless explicitly marked transient.
pub fn is_persistent_event(s: &Struct) -> bool {
    event_attributes(s).is_some_and(|a| !a.is_transient)
}

pub fn is_transient_event(s: &Struct) -> bool {
    event_attributes(s).is_some_and(|a| a.is_transient)
}

pub fn is_sensitive_event(s: &Struct) -> bool {
    event_attributes(s).is_some_and(|a| a.is_sensitive)
}

pub fn is_sensitive_event_part(s: &Struct) -> bool {
    matches!(
        resolve_kind::<EventAnnotation>(&s.doc_lines, TYPE_EVENT_PART),
        Some(EventAnnotation::EventPart { is_sensitive: true })
    )
}

pub fn is_sensitive_event_or_event_part(s: &Struct) -> bool {
    is_sensitive_event(s) || is_sensitive_event_part(s)
}

pub fn field_sensitivity(f: &Field) -> Option<SensitivityLevel> {
    match resolve_kind::<EventAnnotation>(&f.doc_lines, TYPE_SENSITIVE)? {
        EventAnnotation::Sensitive { level } => Some(level),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn with_doc(line: &str) -> Struct {
        Struct {
            doc_lines: vec![line.to_string()],
            name: "OrderCreated".to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_root_event_scenario() {
        let s = with_doc(r#"// @Event( aggregate = "Order", isRootEvent = "true" )"#);
        assert!(is_event(&s));
        assert_eq!(aggregate_name(&s), "Order");
        assert_eq!(aggregate_name_lower(&s), "order");
        assert!(is_root_event(&s));
        assert!(is_persistent_event(&s));
        assert!(!is_transient_event(&s));
        assert!(!is_sensitive_event(&s));
        assert!(!is_event_part(&s));
    }

    #[test]
    fn test_transient_event() {
        let s = with_doc(r#"/// @Event( aggregate = "Order", isTransient = "true" )"#);
        assert!(is_transient_event(&s));
        assert!(!is_persistent_event(&s));
        assert!(!is_root_event(&s));
    }

    #[test]
    fn test_event_without_aggregate_does_not_count() {
        let s = with_doc("/// @Event()");
        assert!(!is_event(&s));
        assert!(!is_persistent_event(&s));
        assert_eq!(aggregate_name(&s), "");
    }

    #[test]
    fn test_flags_need_literal_true() {
        let s = with_doc(r#"/// @Event( aggregate = "Order", isRootEvent = "TRUE", isSensitive = "1" )"#);
        assert!(!is_root_event(&s));
        assert!(!is_sensitive_event(&s));
    }

    #[test]
    fn test_sensitive_event_part() {
        let part = with_doc(r#"/// @EventPart( isSensitive = "true" )"#);
        assert!(is_event_part(&part));
        assert!(!is_event(&part));
        assert!(is_sensitive_event_part(&part));
        assert!(is_sensitive_event_or_event_part(&part));

        let plain_part = with_doc("/// @EventPart()");
        assert!(is_event_part(&plain_part));
        assert!(!is_sensitive_event_or_event_part(&plain_part));
    }

    #[test]
    fn test_field_sensitivity_levels() {
        let mut f = Field::new("email", "String");
        assert_eq!(field_sensitivity(&f), None);

        f.doc_lines = vec![r#"/// @Sensitive( level = "true" )"#.to_string()];
        assert_eq!(field_sensitivity(&f), Some(SensitivityLevel::Plain));

        f.doc_lines = vec![r#"/// @Sensitive( level = "deep" )"#.to_string()];
        assert_eq!(field_sensitivity(&f), Some(SensitivityLevel::Deep));

        f.doc_lines = vec![r#"/// @Sensitive( level = "custom" )"#.to_string()];
        assert_eq!(field_sensitivity(&f), Some(SensitivityLevel::Custom));

        f.doc_lines = vec![r#"/// @Sensitive( level = "maybe" )"#.to_string()];
        assert_eq!(field_sensitivity(&f), None);
    }
}
