use serde_json::{Map, Value};

use super::schema::lookup;

const CWD_PATHS: &[&[&str]] = &[&["cwd"], &["payload", "cwd"], &["working_directory"]];
const SESSION_PATHS: &[&[&str]] = &[&["sessionId"], &["session_id"], &["payload", "sessionId"]];

/// Per-source metadata picked up from any record, recognized or not
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SourceHints {
    pub cwd: Option<String>,
    pub session_id: Option<String>,
}

impl SourceHints {
    /// Record the first working directory and session id seen
    pub fn observe(&mut self, record: &Map<String, Value>) {
        if self.cwd.is_none() {
            self.cwd = first_string(record, CWD_PATHS);
        }
        if self.session_id.is_none() {
            self.session_id = first_string(record, SESSION_PATHS).or_else(|| session_meta_id(record));
        }
    }
}

fn first_string(record: &Map<String, Value>, paths: &[&[&str]]) -> Option<String> {
    paths
        .iter()
        .filter_map(|path| lookup(record, path).and_then(Value::as_str))
        .find(|s| !s.trim().is_empty())
        .map(str::to_string)
}

/// Codex writes the session id as `payload.id` of its `session_meta` record
fn session_meta_id(record: &Map<String, Value>) -> Option<String> {
    if record.get("type").and_then(Value::as_str) != Some("session_meta") {
        return None;
    }
    first_string(record, &[&["payload", "id"]])
}
