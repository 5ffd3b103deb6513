//! Schema detection and field extraction for raw records
//!
//! Two log families are supported, told apart only by which structural keys are present:
//!
//! - **Codex**: either flat (`role` + `content` at the top level) or wrapped in a
//!   `response_item` payload (`payload.message` or `payload.role` + `payload.content`).
//! - **Claude**: a `message` object carrying `role` and `content`, with the record's own
//!   `timestamp` beside it.
//!
//! [`normalize`] walks [`schema::MATCHERS`] in priority order and returns the first
//! matcher whose extractor succeeds. Records nothing matches are
//! [`Normalized::Unrecognized`] and contribute no messages.

pub mod hints;
pub mod schema;

use chrono::{DateTime, Utc};
use serde_json::{Map, Value};

pub use hints::SourceHints;
pub use schema::{MATCHERS, SchemaKind, SchemaMatcher};

use crate::models::Role;
use crate::parsers::parse_timestamp;

/// Uniform view of a recognized record
#[derive(Debug, Clone, PartialEq)]
pub struct Extracted<'a> {
    pub schema: SchemaKind,
    pub role: Role,
    pub timestamp: Option<DateTime<Utc>>,
    pub content: &'a Value,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Normalized<'a> {
    Recognized(Extracted<'a>),
    Unrecognized,
}

/// Classify `record` against the built-in matchers
pub fn normalize(record: &Map<String, Value>) -> Normalized<'_> {
    normalize_with(record, MATCHERS)
}

/// Classify `record` against an explicit matcher list, first match wins
pub fn normalize_with<'a>(record: &'a Map<String, Value>, matchers: &[SchemaMatcher]) -> Normalized<'a> {
    for matcher in matchers {
        if !(matcher.matches)(record) {
            continue;
        }
        if let Some((role, content)) = (matcher.extract)(record) {
            return Normalized::Recognized(Extracted {
                schema: matcher.kind,
                role,
                timestamp: extract_timestamp(record, matcher.timestamp_paths),
                content,
            });
        }
    }
    Normalized::Unrecognized
}

/// First candidate path whose value parses as an absolute time
pub fn extract_timestamp(record: &Map<String, Value>, paths: &[&[&str]]) -> Option<DateTime<Utc>> {
    paths.iter().filter_map(|path| schema::lookup(record, path)).find_map(parse_timestamp)
}
