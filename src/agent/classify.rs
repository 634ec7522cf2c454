//! Reply classification
//!
//! Each oracle reply is classified exactly once into a [`ReplyClass`]; the
//! worker loop only matches on the result.

use crate::parser::StructuredCallExtractor;
use crate::tools::registry::Capability;
use crate::tools::types::ToolCallRequest;

/// What a worker does with one reply
#[derive(Debug, Clone, PartialEq)]
pub enum ReplyClass {
    /// Blank after trimming
    Empty,
    /// At least one well-formed tool call
    ToolRequests(Vec<ToolCallRequest>),
    /// Intent to call a tool without a usable call
    Hallucination(Hallucination),
    /// Anything else is the answer
    Final,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Hallucination {
    /// A capability name appears but nothing could be extracted
    MentionedTool(&'static str),
    /// Extracted calls carried `args` instead of `arguments`
    MisspelledArguments,
}

/// Classify a reply
pub fn classify(reply: &str, extractor: &StructuredCallExtractor) -> ReplyClass {
    if reply.trim().is_empty() {
        return ReplyClass::Empty;
    }

    let requests = extractor.extract(reply);
    if !requests.is_empty() {
        if requests.iter().any(|r| r.misspelled_arguments) {
            return ReplyClass::Hallucination(Hallucination::MisspelledArguments);
        }
        return ReplyClass::ToolRequests(requests);
    }

    match mentioned_capability(reply) {
        Some(name) => ReplyClass::Hallucination(Hallucination::MentionedTool(name)),
        None => ReplyClass::Final,
    }
}

/// First capability name found anywhere in the text
pub fn mentioned_capability(text: &str) -> Option<&'static str> {
    Capability::ALL
        .iter()
        .map(Capability::name)
        .find(|name| text.contains(name))
}
