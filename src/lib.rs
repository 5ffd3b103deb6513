//! chatlog-md - Convert Claude and Codex chat-session logs into Markdown
//!
//! Session logs are line-delimited JSON written by coding assistants. This library turns
//! one or more of them into a single chronological Markdown document:
//!
//! - Parsing records line by line, skipping anything that is not a JSON object
//! - Recognizing the Codex (flat and `response_item` payload) and Claude record layouts
//! - Flattening text, tool invocations and tool results into labeled segments
//! - Scrubbing IDE-injected context from user prompts
//! - Merging sources by timestamp and rendering deterministic Markdown
//!
//! The binary adds file discovery, timestamped output files and an interactive previewer.
//!
//! # Example
//!
//! ```
//! use chatlog_md::{ConvertOptions, SourceInput, convert};
//!
//! let log = r#"{"role":"user","content":"Hello","timestamp":"2025-01-01T00:00:00Z"}"#;
//! let conversion = convert(&[SourceInput::new("session.jsonl", log)], &ConvertOptions::default());
//!
//! assert!(conversion.markdown.contains("### User"));
//! assert!(conversion.markdown.contains("_2025-01-01 00:00:00 UTC_"));
//! ```

pub mod cli;
pub mod clipboard;
pub mod flatten;
pub mod merge;
pub mod models;
pub mod normalize;
pub mod output;
pub mod parsers;
pub mod pipeline;
pub mod render;
pub mod scrub;
pub mod tui;
pub mod utils;

// Re-export commonly used types
pub use models::{ChatMessage, Diagnostics, Document, Role, Segment, SegmentKind};
pub use output::OutputConfig;
pub use pipeline::{Conversion, ConvertOptions, SourceInput, convert};
pub use render::{RenderOptions, render_markdown};
pub use scrub::{ScrubRules, Scrubber};
pub use utils::paths::format_path_with_tilde;
