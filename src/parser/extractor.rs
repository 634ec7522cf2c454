//! Structured tool-call extraction from free model text
//!
//! Two tiers, first hit wins:
//!
//! 1. Every ```` ```json ```` fenced region, in order. A region may hold one
//!    object or an array of objects; all are flattened into one sequence.
//! 2. Only when tier 1 found nothing: the span from the first `{` to the last
//!    `}` of the whole reply, accepted only if it is a single object.
//!
//! Each candidate is cleaned of trailing commas, parsed strictly as JSON and,
//! failing that, as a Python literal. Extraction never fails: unusable text
//! yields an empty sequence.

use crate::parser::literal::parse_python_literal;
use crate::tools::types::ToolCallRequest;
use regex::Regex;
use serde_json::{Map, Value};
use std::sync::OnceLock;
use tracing::debug;

/// Key that must carry the argument object
pub const ARGUMENTS_KEY: &str = "arguments";

/// Frequently hallucinated spelling of [`ARGUMENTS_KEY`]
pub const MISSPELLED_ARGUMENTS_KEY: &str = "args";

/// Tool name recorded for an object without one
pub const MISSING_NAME: &str = "None";

fn fence_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"(?s)```json(.*?)```").expect("valid fence regex"))
}

fn trailing_comma_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r",\s*([\]}])").expect("valid comma regex"))
}

/// Turns model output into ordered tool-call requests
#[derive(Debug, Default, Clone, Copy)]
pub struct StructuredCallExtractor;

impl StructuredCallExtractor {
    pub fn new() -> Self {
        Self
    }

    /// Extract every tool-call request in textual order
    pub fn extract(&self, text: &str) -> Vec<ToolCallRequest> {
        let mut objects = extract_from_fences(text);

        if objects.is_empty() {
            objects = extract_from_braces(text);
        }

        let requests: Vec<ToolCallRequest> = objects.into_iter().map(into_request).collect();
        debug!(count = requests.len(), "extracted tool calls");
        requests
    }
}

/// Tier 1: fenced ```json regions
fn extract_from_fences(text: &str) -> Vec<Map<String, Value>> {
    let mut objects = Vec::new();

    for capture in fence_pattern().captures_iter(text) {
        let Some(body) = capture.get(1) else {
            continue;
        };

        match parse_lenient(body.as_str()) {
            Some(Value::Object(object)) => objects.push(object),
            Some(Value::Array(items)) => {
                objects.extend(items.into_iter().filter_map(|item| match item {
                    Value::Object(object) => Some(object),
                    _ => None,
                }));
            }
            _ => {}
        }
    }

    objects
}

/// Tier 2: outermost brace span of the whole reply
fn extract_from_braces(text: &str) -> Vec<Map<String, Value>> {
    let (Some(start), Some(end)) = (text.find('{'), text.rfind('}')) else {
        return Vec::new();
    };

    if end < start {
        return Vec::new();
    }

    match parse_lenient(&text[start..=end]) {
        Some(Value::Object(object)) => vec![object],
        _ => Vec::new(),
    }
}

/// Strict JSON first, Python literal second
fn parse_lenient(raw: &str) -> Option<Value> {
    let cleaned = strip_trailing_commas(raw.trim());

    serde_json::from_str(&cleaned)
        .ok()
        .or_else(|| parse_python_literal(&cleaned))
}

/// Drop a comma that directly precedes a closing bracket or brace
pub fn strip_trailing_commas(text: &str) -> String {
    trailing_comma_pattern().replace_all(text, "$1").into_owned()
}

/// Every object becomes a request; a missing or non-string `name` is rendered
/// so dispatch reports it as an unknown tool
fn into_request(mut object: Map<String, Value>) -> ToolCallRequest {
    let name = match object.remove("name") {
        Some(Value::String(name)) => name,
        None | Some(Value::Null) => MISSING_NAME.to_string(),
        Some(other) => other.to_string(),
    };

    let (arguments, misspelled) = match object.remove(ARGUMENTS_KEY) {
        Some(Value::Object(arguments)) => (arguments, false),
        Some(_) | None => (Map::new(), object.contains_key(MISSPELLED_ARGUMENTS_KEY)),
    };

    ToolCallRequest {
        name,
        arguments,
        misspelled_arguments: misspelled,
    }
}
