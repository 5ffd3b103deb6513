//! Content flattening: turns a record's content value into ordered [`Segment`]s
//!
//! Content arrives as a plain string, a list of typed items, or occasionally something
//! else entirely. Every shape produces segments on a best-effort basis; nothing here
//! fails. Tool results may hold a nested content list, which is flattened one level
//! deep ([`MAX_NESTED_DEPTH`]); anything deeper is dumped as JSON text.

pub mod content;

use serde_json::Value;

pub use content::ContentItem;

use crate::models::Segment;

/// How many levels of tool-result content are flattened before falling back to a dump
pub const MAX_NESTED_DEPTH: usize = 1;

/// Character cap for raw dumps of unknown items
pub const MAX_DUMP_CHARS: usize = 2000;

const UNKNOWN_LABEL: &str = "unknown";

/// Flatten a content value into segments in input order
pub fn flatten(content: &Value) -> Vec<Segment> {
    flatten_at(content, 0)
}

fn flatten_at(content: &Value, depth: usize) -> Vec<Segment> {
    match content {
        Value::Null => Vec::new(),
        Value::Array(items) => {
            items.iter().filter_map(|item| item_segment(ContentItem::classify(item), depth)).collect()
        }
        other => item_segment(ContentItem::classify(other), depth).into_iter().collect(),
    }
}

fn item_segment(item: ContentItem<'_>, depth: usize) -> Option<Segment> {
    match item {
        ContentItem::Text(text) => {
            if text.trim().is_empty() {
                None
            } else {
                Some(Segment::text(text))
            }
        }
        ContentItem::ToolUse { name, input } => {
            Some(Segment::tool_use(name.map(str::to_string), render_arguments(input)))
        }
        ContentItem::ToolResult { tool_use_id, content, is_error } => {
            let label = match (tool_use_id, is_error) {
                (Some(id), true) => Some(format!("{id} (error)")),
                (Some(id), false) => Some(id.to_string()),
                (None, true) => Some("error".to_string()),
                (None, false) => None,
            };
            Some(Segment::tool_result(label, tool_result_body(content, depth)))
        }
        ContentItem::Unknown { kind, raw } => {
            Some(Segment::labeled_text(kind.unwrap_or(UNKNOWN_LABEL), unknown_body(raw)))
        }
    }
}

/// Tool arguments as pretty JSON; string arguments holding JSON are decoded first
fn render_arguments(input: Option<&Value>) -> String {
    match input {
        None | Some(Value::Null) => "{}".to_string(),
        Some(Value::String(raw)) => match serde_json::from_str::<Value>(raw) {
            Ok(parsed @ (Value::Object(_) | Value::Array(_))) => pretty(&parsed),
            _ => raw.clone(),
        },
        Some(other) => pretty(other),
    }
}

fn tool_result_body(content: Option<&Value>, depth: usize) -> String {
    match content {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(nested) if (nested.is_array() || nested.is_object()) && depth < MAX_NESTED_DEPTH => {
            flatten_at(nested, depth + 1)
                .iter()
                .map(|segment| match &segment.label {
                    Some(label) => format!("{label}: {}", segment.body),
                    None => segment.body.clone(),
                })
                .collect::<Vec<_>>()
                .join("\n\n")
        }
        Some(other) => pretty(other),
    }
}

/// Best-effort body for an unrecognized item: its first text-like field, else a JSON dump
fn unknown_body(raw: &Value) -> String {
    if let Some(object) = raw.as_object()
        && let Some(text) = ["text", "thinking", "content"]
            .iter()
            .filter_map(|key| object.get(*key).and_then(Value::as_str))
            .find(|s| !s.trim().is_empty())
    {
        return text.to_string();
    }
    match raw {
        Value::String(s) => s.clone(),
        other => truncate_chars(&pretty(other), MAX_DUMP_CHARS),
    }
}

fn pretty(value: &Value) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string())
}

/// Cut `text` to at most `limit` characters, marking the cut with `...`
pub fn truncate_chars(text: &str, limit: usize) -> String {
    match text.char_indices().nth(limit) {
        Some((byte_idx, _)) => format!("{}...", &text[..byte_idx]),
        None => text.to_string(),
    }
}
