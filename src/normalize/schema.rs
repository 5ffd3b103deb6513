use serde::Serialize;
use serde_json::{Map, Value};

use crate::models::Role;

/// Record layouts the normalizer understands
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SchemaKind {
    /// `{"type":"response_item","payload":{"message":{...}}}` or `payload.role` + `payload.content`
    CodexNested,
    /// `{"type":"user","message":{"role":"user","content":...},"timestamp":...}`
    Claude,
    /// `{"role":"user","content":...}`
    CodexTopLevel,
}

/// Predicate-plus-extractor pair for one schema
#[derive(Clone, Copy)]
pub struct SchemaMatcher {
    pub kind: SchemaKind,
    pub matches: fn(&Map<String, Value>) -> bool,
    pub extract: for<'a> fn(&'a Map<String, Value>) -> Option<(Role, &'a Value)>,
    /// Key paths tried in order; the first one that parses as a time wins
    pub timestamp_paths: &'static [&'static [&'static str]],
}

/// Matchers in priority order: nested shapes before flat ones, because a nested record may
/// also carry top-level keys that look like the flat schema.
pub const MATCHERS: &[SchemaMatcher] = &[
    SchemaMatcher {
        kind: SchemaKind::CodexNested,
        matches: is_codex_nested,
        extract: extract_codex_nested,
        timestamp_paths: &[
            &["payload", "message", "timestamp"],
            &["payload", "timestamp"],
            &["timestamp"],
            &["created_at"],
            &["time"],
            &["ts"],
        ],
    },
    SchemaMatcher {
        kind: SchemaKind::Claude,
        matches: is_claude,
        extract: extract_claude,
        timestamp_paths: &[
            &["timestamp"],
            &["message", "timestamp"],
            &["payload", "timestamp"],
            &["created_at"],
            &["time"],
            &["ts"],
        ],
    },
    SchemaMatcher {
        kind: SchemaKind::CodexTopLevel,
        matches: is_codex_top_level,
        extract: extract_codex_top_level,
        timestamp_paths: &[&["timestamp"], &["created_at"], &["time"], &["ts"]],
    },
];

/// Follow `path` through nested objects
pub fn lookup<'a>(record: &'a Map<String, Value>, path: &[&str]) -> Option<&'a Value> {
    let (first, rest) = path.split_first()?;
    rest.iter().try_fold(record.get(*first)?, |value, key| value.as_object()?.get(*key))
}

fn str_at<'a>(record: &'a Map<String, Value>, path: &[&str]) -> Option<&'a str> {
    lookup(record, path).and_then(Value::as_str)
}

fn object_at<'a>(record: &'a Map<String, Value>, path: &[&str]) -> Option<&'a Map<String, Value>> {
    lookup(record, path).and_then(Value::as_object)
}

fn is_codex_nested(record: &Map<String, Value>) -> bool {
    let Some(payload) = object_at(record, &["payload"]) else {
        return false;
    };
    match payload.get("message").and_then(Value::as_object) {
        Some(message) => message.get("role").is_some_and(Value::is_string),
        None => payload.get("role").is_some_and(Value::is_string) && payload.contains_key("content"),
    }
}

fn extract_codex_nested(record: &Map<String, Value>) -> Option<(Role, &Value)> {
    let payload = object_at(record, &["payload"])?;
    let holder = payload.get("message").and_then(Value::as_object).unwrap_or(payload);
    let role = holder.get("role").or_else(|| payload.get("role"))?.as_str()?;
    let content = holder.get("content").or_else(|| payload.get("content"))?;
    Some((Role::parse(role), content))
}

fn is_claude(record: &Map<String, Value>) -> bool {
    let Some(message) = object_at(record, &["message"]) else {
        return false;
    };
    let has_role = message.get("role").is_some_and(Value::is_string)
        || str_at(record, &["type"]).is_some_and(|t| t == "user" || t == "assistant");
    has_role && message.contains_key("content")
}

fn extract_claude(record: &Map<String, Value>) -> Option<(Role, &Value)> {
    let message = object_at(record, &["message"])?;
    let role = message
        .get("role")
        .and_then(Value::as_str)
        .or_else(|| str_at(record, &["type"]))?;
    Some((Role::parse(role), message.get("content")?))
}

/// Role for the flat schema: an explicit `role`, else a `type`/`source` naming a speaker
fn top_level_role(record: &Map<String, Value>) -> Option<Role> {
    if let Some(role) = str_at(record, &["role"]) {
        return Some(Role::parse(role));
    }
    ["type", "source"]
        .iter()
        .filter_map(|key| str_at(record, &[*key]))
        .map(Role::parse)
        .find(|role| *role != Role::Unknown)
}

fn top_level_content(record: &Map<String, Value>) -> Option<&Value> {
    if let Some(content) = record.get("content") {
        return Some(content);
    }
    if let Some(text) = record.get("text") {
        return Some(text);
    }
    match record.get("delta")? {
        Value::Object(delta) => delta.get("content").or_else(|| delta.get("text")),
        delta if delta.is_string() => Some(delta),
        _ => None,
    }
}

fn is_codex_top_level(record: &Map<String, Value>) -> bool {
    top_level_role(record).is_some() && top_level_content(record).is_some()
}

fn extract_codex_top_level(record: &Map<String, Value>) -> Option<(Role, &Value)> {
    Some((top_level_role(record)?, top_level_content(record)?))
}
