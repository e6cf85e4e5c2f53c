//! Line-level grammar of the annotation language.
//!
//! ```text
//! line      := ws* leader? ws* '@' name ws* '(' arguments ')' ws* closer? ws*
//! leader    := '//' | '///' | '//!' | '/*' | '/**' | '*'
//! closer    := '*/'
//! arguments := ws* ( pair ( ',' pair )* )?
//! pair      := ws* key ws* '=' ws* '"' [^"]* '"' ws*
//! ```
//!
//! Values are taken verbatim between the quotes; no escape sequences are interpreted.
//! Anything that does not fit the grammar is a non-match, never a partial result.

use log::trace;
use regex::Regex;
use std::collections::BTreeMap;
use std::sync::LazyLock;

const LEADER: &str = r"(?:/\*\*?|//[/!]?|\*)?";
const NAME: &str = r"[A-Za-z_][A-Za-z0-9_]*";

static DIRECTIVE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r"^\s*{LEADER}\s*@(?P<name>{NAME})\s*\((?P<args>.*)\)\s*(?:\*/)?\s*$"
    ))
    .expect("directive pattern is valid")
});

// Looks like the start of a directive; used to tell malformed directives from prose.
static DIRECTIVE_START_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(r"^\s*{LEADER}\s*@(?P<name>{NAME})\s*\(")).expect("directive start pattern is valid")
});

static ARGUMENTS_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r#"^\s*(?:{NAME}\s*=\s*"[^"]*"\s*(?:,\s*{NAME}\s*=\s*"[^"]*"\s*)*)?$"#
    ))
    .expect("arguments pattern is valid")
});

static PAIR_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(r#"(?P<key>{NAME})\s*=\s*"(?P<value>[^"]*)""#)).expect("pair pattern is valid")
});

/// An annotation occurrence as written, before any descriptor filtering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawAnnotation {
    pub name: String,
    pub attributes: BTreeMap<String, String>,
}

/// Classification of a single comment line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineMatch {
    /// Plain prose, or something that does not even start like a directive.
    NoDirective,
    /// Starts like `@Name(` but the rest does not fit the grammar.
    Malformed { name: String },
    /// A fully-formed occurrence.
    Directive(RawAnnotation),
}

/// Classifies `line` against the grammar.
pub fn scan_line(line: &str) -> LineMatch {
    let Some(caps) = DIRECTIVE_RE.captures(line) else {
        return match DIRECTIVE_START_RE.captures(line) {
            Some(start) => LineMatch::Malformed {
                name: start["name"].to_string(),
            },
            None => LineMatch::NoDirective,
        };
    };

    let name = caps["name"].to_string();
    match parse_arguments(&caps["args"]) {
        Some(attributes) => LineMatch::Directive(RawAnnotation { name, attributes }),
        None => {
            trace!("Malformed argument list for @{}: {}", name, line);
            LineMatch::Malformed { name }
        }
    }
}

/// Returns the occurrence on `line`, if the line holds a fully-formed one.
pub fn parse_line(line: &str) -> Option<RawAnnotation> {
    match scan_line(line) {
        LineMatch::Directive(raw) => Some(raw),
        _ => None,
    }
}

/// Like [`parse_line`], restricted to one exact (case-sensitive) annotation name.
pub fn parse_line_named(line: &str, name: &str) -> Option<RawAnnotation> {
    parse_line(line).filter(|raw| raw.name == name)
}

/// Parses the text between the parentheses. A later duplicate key overwrites an earlier one.
fn parse_arguments(args: &str) -> Option<BTreeMap<String, String>> {
    if !ARGUMENTS_RE.is_match(args) {
        return None;
    }
    let attributes = PAIR_RE
        .captures_iter(args)
        .map(|pair| (pair["key"].to_string(), pair["value"].to_string()))
        .collect();
    Some(attributes)
}
