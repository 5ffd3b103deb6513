use serde::{Deserialize, Serialize};

use super::message::ChatMessage;

/// How a source contributed to the document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SourceKind {
    /// Line-delimited JSON that went through the pipeline
    Jsonl {
        #[serde(default)]
        cwd: Option<String>,
        #[serde(default)]
        session_id: Option<String>,
    },
    /// Already-rendered text appended verbatim
    Passthrough { text: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceInfo {
    pub name: String,
    pub kind: SourceKind,
}

impl SourceInfo {
    pub fn jsonl(name: impl Into<String>, cwd: Option<String>, session_id: Option<String>) -> Self {
        Self { name: name.into(), kind: SourceKind::Jsonl { cwd, session_id } }
    }

    pub fn passthrough(name: impl Into<String>, text: impl Into<String>) -> Self {
        Self { name: name.into(), kind: SourceKind::Passthrough { text: text.into() } }
    }
}

/// Ordered messages plus the sources that contributed to them
///
/// Built once by the pipeline and only read afterwards.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    sources: Vec<SourceInfo>,
    messages: Vec<ChatMessage>,
}

impl Document {
    pub fn new(sources: Vec<SourceInfo>, messages: Vec<ChatMessage>) -> Self {
        Self { sources, messages }
    }

    pub fn sources(&self) -> &[SourceInfo] {
        &self.sources
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn source(&self, index: usize) -> Option<&SourceInfo> {
        self.sources.get(index)
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}
