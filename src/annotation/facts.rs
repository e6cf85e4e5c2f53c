//! Pure helpers for deriving semantic facts from resolved annotations.
//!
//! Generators combine these with their own registries, e.g.
//! `is_root_event(s) = resolve(s.doc_lines, "Event").map(|a| flag(&a, "isRootEvent"))`.

use super::Annotation;

/// Boolean attribute: true only for the exact literal `"true"`.
pub fn flag(annotation: &Annotation, key: &str) -> bool {
    is_true(annotation.attribute(key))
}

pub fn is_true(value: &str) -> bool {
    value == "true"
}

/// String attribute, or `""` when absent.
pub fn text(annotation: &Annotation, key: &str) -> String {
    annotation.attribute(key).to_string()
}

/// Splits a comma-separated attribute value, trimming each element and dropping empty ones.
pub fn split_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(str::to_string)
        .collect()
}

/// Case-sensitive membership test on a comma-separated attribute value.
pub fn list_contains(value: &str, item: &str) -> bool {
    value.split(',').any(|candidate| candidate.trim() == item)
}

/// `orderCreated` -> `OrderCreated`. Empty input is returned unchanged.
pub fn to_first_upper(input: &str) -> String {
    let mut chars = input.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// `OrderCreated` -> `orderCreated`. Empty input is returned unchanged.
pub fn to_first_lower(input: &str) -> String {
    let mut chars = input.chars();
    match chars.next() {
        Some(first) => first.to_lowercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Lowers every capital that directly follows another capital: `getUID` -> `getUid`.
pub fn uncapitalized(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut last_upper = false;
    for c in input.chars() {
        if c.is_uppercase() {
            if last_upper {
                out.extend(c.to_lowercase());
            } else {
                out.push(c);
                last_upper = true;
            }
        } else {
            out.push(c);
            last_upper = false;
        }
    }
    out
}

/// `OrderCreated` -> `order_created`, `getUID` -> `get_uid`.
pub fn to_snake_case(input: &str) -> String {
    let chars: Vec<char> = input.chars().collect();
    let mut out = String::with_capacity(input.len() + 4);
    for (i, &c) in chars.iter().enumerate() {
        if c.is_uppercase() {
            let prev_lower = i > 0 && (chars[i - 1].is_lowercase() || chars[i - 1].is_ascii_digit());
            let next_lower = chars.get(i + 1).is_some_and(|n| n.is_lowercase());
            let prev_upper = i > 0 && chars[i - 1].is_uppercase();
            if i > 0 && chars[i - 1] != '_' && (prev_lower || (prev_upper && next_lower)) {
                out.push('_');
            }
            out.extend(c.to_lowercase());
        } else if c == '-' || c == ' ' {
            out.push('_');
        } else {
            out.push(c);
        }
    }
    out
}

/// Last segment of a `::`- or `.`-qualified name.
pub fn last_segment(name: &str) -> &str {
    name.rsplit(|c: char| c == ':' || c == '.').next().unwrap_or(name)
}
