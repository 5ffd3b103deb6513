//! Data models for converted chat sessions.
//!
//! - [`ChatMessage`] - One normalized message: role, optional timestamp, ordered segments
//! - [`Segment`] - Plain text, tool invocation or tool result inside a message
//! - [`Document`] - Merged, ordered messages plus the contributing [`SourceInfo`] list
//! - [`Diagnostics`] - Counts of parsed, skipped and dropped input
//!
//! Raw records never get a typed model: they stay `serde_json::Value` until the
//! normalizer has picked a schema for them.

pub mod diagnostics;
pub mod document;
pub mod message;

pub use diagnostics::Diagnostics;
pub use document::{Document, SourceInfo, SourceKind};
pub use message::{ChatMessage, Role, Segment, SegmentKind};
