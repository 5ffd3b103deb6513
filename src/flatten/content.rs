use serde_json::Value;

/// Content item kinds the flattener distinguishes
///
/// Matching on this enum must stay exhaustive: a new kind shows up as [`ContentItem::Unknown`]
/// and is rendered as labeled raw text, never dropped.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ContentItem<'a> {
    /// `text`, `input_text`, `output_text`, or a bare string in a content list
    Text(&'a str),
    ToolUse { name: Option<&'a str>, input: Option<&'a Value> },
    ToolResult { tool_use_id: Option<&'a str>, content: Option<&'a Value>, is_error: bool },
    Unknown { kind: Option<&'a str>, raw: &'a Value },
}

const TEXT_KINDS: &[&str] = &["text", "input_text", "output_text"];

impl<'a> ContentItem<'a> {
    pub fn classify(value: &'a Value) -> Self {
        let object = match value {
            Value::String(s) => return ContentItem::Text(s),
            Value::Object(object) => object,
            _ => return ContentItem::Unknown { kind: None, raw: value },
        };

        let kind = object.get("type").and_then(Value::as_str);
        match kind {
            Some(k) if TEXT_KINDS.contains(&k) => match object.get("text").and_then(Value::as_str) {
                Some(text) => ContentItem::Text(text),
                None => ContentItem::Unknown { kind, raw: value },
            },
            Some("tool_use") => ContentItem::ToolUse {
                name: object.get("name").and_then(Value::as_str),
                input: object.get("input"),
            },
            Some("tool_result") => ContentItem::ToolResult {
                tool_use_id: object.get("tool_use_id").and_then(Value::as_str),
                content: object.get("content"),
                is_error: object.get("is_error").and_then(Value::as_bool).unwrap_or(false),
            },
            _ => ContentItem::Unknown { kind, raw: value },
        }
    }
}
