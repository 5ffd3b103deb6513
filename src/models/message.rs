use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Speaker of a chat message after normalization
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
    System,
    Tool,
    Unknown,
}

impl Role {
    pub const ALL: [Role; 5] = [Role::User, Role::Assistant, Role::System, Role::Tool, Role::Unknown];

    /// Map a raw role/type string onto a [`Role`].
    ///
    /// Exact names win; otherwise vendor variants such as `assistant_response` or `model`
    /// are folded into the closest conversational role.
    pub fn parse(raw: &str) -> Self {
        let lower = raw.trim().to_ascii_lowercase();
        match lower.as_str() {
            "user" | "human" => Role::User,
            "assistant" | "model" | "ai" => Role::Assistant,
            "system" | "developer" => Role::System,
            "tool" | "function" => Role::Tool,
            _ if lower.contains("assistant") => Role::Assistant,
            _ if lower.contains("user") => Role::User,
            _ => Role::Unknown,
        }
    }

    /// Heading label used by the Markdown renderer
    pub fn label(self) -> &'static str {
        match self {
            Role::User => "User",
            Role::Assistant => "Assistant",
            Role::System => "System",
            Role::Tool => "Tool",
            Role::Unknown => "Unknown",
        }
    }

    /// Roles rendered without `include_system`
    pub fn is_conversational(self) -> bool {
        matches!(self, Role::User | Role::Assistant | Role::Tool)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SegmentKind {
    Text,
    ToolUse,
    ToolResult,
}

/// One renderable unit of message content
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Segment {
    pub kind: SegmentKind,
    pub label: Option<String>,
    pub body: String,
}

impl Segment {
    pub fn text(body: impl Into<String>) -> Self {
        Self { kind: SegmentKind::Text, label: None, body: body.into() }
    }

    pub fn labeled_text(label: impl Into<String>, body: impl Into<String>) -> Self {
        Self { kind: SegmentKind::Text, label: Some(label.into()), body: body.into() }
    }

    pub fn tool_use(name: Option<String>, body: impl Into<String>) -> Self {
        Self { kind: SegmentKind::ToolUse, label: name, body: body.into() }
    }

    pub fn tool_result(label: Option<String>, body: impl Into<String>) -> Self {
        Self { kind: SegmentKind::ToolResult, label, body: body.into() }
    }
}

/// Canonical chat message produced from one raw record
///
/// Always holds at least one segment; construct through [`ChatMessage::new`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    role: Role,
    timestamp: Option<DateTime<Utc>>,
    segments: Vec<Segment>,
    source: usize,
    source_order: usize,
}

impl ChatMessage {
    /// Returns `None` when `segments` is empty: a record without content is not emitted.
    pub fn new(
        role: Role,
        timestamp: Option<DateTime<Utc>>,
        segments: Vec<Segment>,
        source: usize,
        source_order: usize,
    ) -> Option<Self> {
        if segments.is_empty() {
            return None;
        }
        Some(Self { role, timestamp, segments, source, source_order })
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn timestamp(&self) -> Option<DateTime<Utc>> {
        self.timestamp
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Input position of the source this message came from
    pub fn source(&self) -> usize {
        self.source
    }

    /// Position of the originating record within its source
    pub fn source_order(&self) -> usize {
        self.source_order
    }

    /// Plain text of all segments joined by blank lines (used for search and previews)
    pub fn plain_text(&self) -> String {
        let mut out = String::new();
        for segment in &self.segments {
            if !out.is_empty() {
                out.push_str("\n\n");
            }
            if let Some(label) = &segment.label {
                out.push_str(label);
                out.push_str(": ");
            }
            out.push_str(&segment.body);
        }
        out
    }
}
