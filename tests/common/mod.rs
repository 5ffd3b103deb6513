//! Shared test utilities for integration tests
#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

use chatlog_md::render::is_role_heading;
use serde_json::{Value, json};
use tempfile::TempDir;

/// Builder for a directory of session log files
pub struct SessionDirBuilder {
    temp_dir: TempDir,
}

impl SessionDirBuilder {
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        Self { temp_dir }
    }

    pub fn path(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Write raw `content` at `relative`, creating parent directories
    pub fn with_file(self, relative: &str, content: &str) -> Self {
        let path = self.temp_dir.path().join(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("Failed to create parent dirs");
        }
        fs::write(&path, content).expect("Failed to write session file");
        self
    }

    /// Write one JSONL session made of `records`
    pub fn with_session(self, relative: &str, records: &[RecordBuilder]) -> Self {
        let content = records.iter().map(RecordBuilder::to_json).collect::<Vec<_>>().join("\n");
        self.with_file(relative, &content)
    }

    pub fn file(&self, relative: &str) -> PathBuf {
        self.temp_dir.path().join(relative)
    }

    /// Build and return the temp directory (consumes self)
    pub fn build(self) -> TempDir {
        self.temp_dir
    }
}

impl Default for SessionDirBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Clone, Copy)]
enum Shape {
    CodexTopLevel,
    CodexNested,
    Claude,
}

/// Builder for one log record in any of the supported layouts
#[derive(Clone)]
pub struct RecordBuilder {
    shape: Shape,
    role: String,
    content: Value,
    timestamp: Option<String>,
    cwd: Option<String>,
    session_id: Option<String>,
}

impl RecordBuilder {
    fn new(shape: Shape, role: &str, content: Value) -> Self {
        Self { shape, role: role.to_string(), content, timestamp: None, cwd: None, session_id: None }
    }

    /// `{"role": ..., "content": "..."}`
    pub fn codex(role: &str, text: &str) -> Self {
        Self::new(Shape::CodexTopLevel, role, json!(text))
    }

    /// `{"type":"response_item","payload":{"message":{...}}}` with one output_text item
    pub fn codex_nested(role: &str, text: &str) -> Self {
        Self::new(Shape::CodexNested, role, json!([{"type": "output_text", "text": text}]))
    }

    /// `{"type": role, "message": {"role": ..., "content": [...]}}`
    pub fn claude(role: &str, text: &str) -> Self {
        Self::new(Shape::Claude, role, json!([{"type": "text", "text": text}]))
    }

    /// Claude assistant record with one tool invocation
    pub fn claude_tool_use(name: &str, input: Value) -> Self {
        Self::new(Shape::Claude, "assistant", json!([{"type": "tool_use", "id": "toolu_1", "name": name, "input": input}]))
    }

    /// Claude user record carrying a tool result
    pub fn claude_tool_result(tool_use_id: &str, output: &str) -> Self {
        Self::new(
            Shape::Claude,
            "user",
            json!([{"type": "tool_result", "tool_use_id": tool_use_id, "content": output}]),
        )
    }

    pub fn timestamp(mut self, timestamp: &str) -> Self {
        self.timestamp = Some(timestamp.to_string());
        self
    }

    pub fn cwd(mut self, cwd: &str) -> Self {
        self.cwd = Some(cwd.to_string());
        self
    }

    pub fn session_id(mut self, session_id: &str) -> Self {
        self.session_id = Some(session_id.to_string());
        self
    }

    pub fn to_json(&self) -> String {
        let mut record = match self.shape {
            Shape::CodexTopLevel => json!({"role": self.role, "content": self.content}),
            Shape::CodexNested => json!({
                "type": "response_item",
                "payload": {"message": {"role": self.role, "content": self.content}}
            }),
            Shape::Claude => json!({
                "type": self.role,
                "message": {"role": self.role, "content": self.content}
            }),
        };

        let object = record.as_object_mut().expect("record is an object");
        if let Some(ts) = &self.timestamp {
            match self.shape {
                Shape::CodexNested => {
                    object["payload"]["timestamp"] = json!(ts);
                }
                _ => {
                    object.insert("timestamp".to_string(), json!(ts));
                }
            }
        }
        if let Some(cwd) = &self.cwd {
            object.insert("cwd".to_string(), json!(cwd));
        }
        if let Some(session_id) = &self.session_id {
            object.insert("sessionId".to_string(), json!(session_id));
        }

        record.to_string()
    }
}

/// Role headings (`### User`, ...) of a rendered document, in order
///
/// A heading counts only when it is followed by a blank line and the `_timestamp_` line.
pub fn role_headings(markdown: &str) -> Vec<&str> {
    let lines: Vec<&str> = markdown.lines().collect();
    lines
        .iter()
        .enumerate()
        .filter(|(idx, line)| {
            is_role_heading(line)
                && lines.get(idx + 1) == Some(&"")
                && lines.get(idx + 2).is_some_and(|ts| ts.len() > 2 && ts.starts_with('_') && ts.ends_with('_'))
        })
        .filter_map(|(_, line)| line.strip_prefix("### "))
        .collect()
}
