//! Line-delimited JSON parsing for chat session logs
//!
//! # Error Handling Strategy
//!
//! Parsing never fails. The core receives text that is already read and decoded, so the
//! only problems left are in the data itself:
//!
//! - **Unparsable lines**: Lines that are not a JSON object are logged at `warn` level,
//!   remembered as [`SkippedLine`]s and skipped. The next line is parsed as usual.
//!
//! - **Bad timestamps**: A timestamp value that cannot be read as an absolute time is
//!   treated as absent, not as an error.
//!
//! Deciding whether a source is usable at all (readable, valid UTF-8) happens at the
//! boundary in [`crate::pipeline::discovery`], before this module is involved.

pub mod records;
pub mod timestamps;

pub use records::{RawRecord, RecordParser, SkippedLine, looks_like_jsonl};
pub use timestamps::{parse_timestamp, parse_timestamp_str};
