use std::ops::AddAssign;

use serde::{Deserialize, Serialize};

/// Counters describing what the pipeline kept and dropped
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostics {
    /// Sources handed to the pipeline
    pub sources: usize,
    /// Sources appended verbatim instead of parsed
    pub passthrough_sources: usize,
    /// Lines that decoded to a JSON object
    pub records_parsed: usize,
    /// Non-empty lines that were not a JSON object
    pub lines_unparsable: usize,
    /// Records matching neither schema
    pub records_unrecognized: usize,
    /// Records with a non-conversational role (system/unknown) left out
    pub records_filtered: usize,
    /// Records whose content produced no segments
    pub records_empty: usize,
    pub messages_emitted: usize,
    /// User text segments that scrubbing reduced to nothing
    pub segments_scrubbed_empty: usize,
}

impl Diagnostics {
    /// Records and lines skipped for being malformed or unrecognized
    pub fn skipped(&self) -> usize {
        self.lines_unparsable + self.records_unrecognized
    }
}

impl AddAssign for Diagnostics {
    fn add_assign(&mut self, rhs: Self) {
        self.sources += rhs.sources;
        self.passthrough_sources += rhs.passthrough_sources;
        self.records_parsed += rhs.records_parsed;
        self.lines_unparsable += rhs.lines_unparsable;
        self.records_unrecognized += rhs.records_unrecognized;
        self.records_filtered += rhs.records_filtered;
        self.records_empty += rhs.records_empty;
        self.messages_emitted += rhs.messages_emitted;
        self.segments_scrubbed_empty += rhs.segments_scrubbed_empty;
    }
}
