//! End-to-end conversion: sources in, Markdown and diagnostics out
//!
//! # Error Handling Strategy
//!
//! The pipeline follows a **graceful degradation** approach:
//!
//! - **Conversion** ([`convert`]) never fails. Bad lines, unknown record shapes and
//!   empty content are counted in [`Diagnostics`] and skipped.
//! - **Discovery and reading** ([`discovery`]) return `anyhow::Result`. A file that cannot
//!   be read, is too large or is not UTF-8 is reported as a warning by
//!   [`discovery::read_sources`] and left out; the other files are still converted.
//!
//! Each source is processed independently (in parallel with rayon); only the merge step
//! waits for all of them.

pub mod builder;
pub mod discovery;

pub use builder::{SourceFormat, SourceOutcome, convert, process_source, sniff_format};
pub use discovery::{find_session_files, read_source, read_sources};

use crate::models::{Diagnostics, Document};
use crate::render::RenderOptions;
use crate::scrub::ScrubRules;

/// One input handed to the pipeline: a display name and the full decoded text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceInput {
    pub name: String,
    pub text: String,
}

impl SourceInput {
    pub fn new(name: impl Into<String>, text: impl Into<String>) -> Self {
        Self { name: name.into(), text: text.into() }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConvertOptions {
    pub scrub: ScrubRules,
    pub render: RenderOptions,
    /// Keep `system` and `unknown` role messages
    pub include_system: bool,
}

/// Result of one pipeline run
#[derive(Debug, Clone)]
pub struct Conversion {
    pub document: Document,
    pub markdown: String,
    pub diagnostics: Diagnostics,
}
