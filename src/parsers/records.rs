use serde_json::{Map, Value};
use tracing::warn;

/// One decoded JSON object from one input line
#[derive(Debug, Clone, PartialEq)]
pub struct RawRecord {
    /// 1-based line number in the source text
    pub line: usize,
    /// Position among the records of this source (0-based)
    pub ordinal: usize,
    pub value: Map<String, Value>,
}

/// A non-empty line that did not decode to a JSON object
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedLine {
    pub line: usize,
    pub reason: String,
}

/// Lazy, single-pass parser over line-delimited JSON text
///
/// Empty lines are ignored. Lines that are not JSON objects are skipped and remembered
/// in [`RecordParser::skipped`]; they never stop the iteration.
pub struct RecordParser<'a> {
    source_name: &'a str,
    lines: std::iter::Enumerate<std::str::Lines<'a>>,
    next_ordinal: usize,
    skipped: Vec<SkippedLine>,
}

impl<'a> RecordParser<'a> {
    pub fn new(source_name: &'a str, text: &'a str) -> Self {
        let text = text.strip_prefix('\u{feff}').unwrap_or(text);
        Self { source_name, lines: text.lines().enumerate(), next_ordinal: 0, skipped: Vec::new() }
    }

    /// Lines skipped so far
    pub fn skipped(&self) -> &[SkippedLine] {
        &self.skipped
    }

    pub fn into_skipped(self) -> Vec<SkippedLine> {
        self.skipped
    }

    fn skip(&mut self, line: usize, reason: String) {
        warn!("Line {} in {} is not a JSON object: {}", line, self.source_name, reason);
        self.skipped.push(SkippedLine { line, reason });
    }
}

impl Iterator for RecordParser<'_> {
    type Item = RawRecord;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let (idx, line) = self.lines.next()?;
            let line = line.trim();
            if line.is_empty() {
                continue;
            }

            match serde_json::from_str::<Value>(line) {
                Ok(Value::Object(value)) => {
                    let ordinal = self.next_ordinal;
                    self.next_ordinal += 1;
                    return Some(RawRecord { line: idx + 1, ordinal, value });
                }
                Ok(other) => self.skip(idx + 1, format!("expected object, found {}", kind_of(&other))),
                Err(e) => self.skip(idx + 1, e.to_string()),
            }
        }
    }
}

/// Whether any non-empty line of `text` is a JSON object
pub fn looks_like_jsonl(text: &str) -> bool {
    text.lines()
        .map(str::trim)
        .filter(|line| line.starts_with('{'))
        .any(|line| matches!(serde_json::from_str::<Value>(line), Ok(Value::Object(_))))
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
