//! Removal of IDE-injected boilerplate from user-authored text
//!
//! Three kinds of noise are stripped from `user` text segments:
//!
//! - `<environment_context>...</environment_context>` regions, tags included, anywhere
//!   in the text (case-insensitive, spanning lines).
//! - Blocks introduced by an `Active file:` or `Open tabs:` label, whether written as a
//!   heading (`## Open tabs:`), a bullet (`- Active file: x`) or a bare line. A block is the
//!   label line plus the list items or indented lines right after it; a blank line, a
//!   heading, a code fence or ordinary unindented text ends it.
//! - The `# Context from my IDE setup:` heading that precedes those blocks.
//!
//! Lines inside fenced code blocks are left alone by the label rules. This is a heuristic:
//! prose that happens to start a line with one of the labels outside a fence is removed,
//! and environment-context tags inside a fence are still stripped. Scrubbing an already
//! scrubbed text changes nothing.

use std::sync::LazyLock;

use regex::Regex;

use crate::models::{Segment, SegmentKind};

static EXCESS_BLANK_LINES: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"\n(?:[ \t]*\n){2,}").ok());

/// Marker strings the scrubber looks for
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScrubRules {
    /// Tag name of the injected environment region, without angle brackets
    pub environment_tag: String,
    /// Labels that start a removable block
    pub block_labels: Vec<String>,
    /// Heading texts removed on their own
    pub dropped_headings: Vec<String>,
}

impl Default for ScrubRules {
    fn default() -> Self {
        Self {
            environment_tag: "environment_context".to_string(),
            block_labels: vec!["Active file:".to_string(), "Open tabs:".to_string()],
            dropped_headings: vec!["Context from my IDE setup:".to_string()],
        }
    }
}

/// Compiled form of [`ScrubRules`]
#[derive(Debug, Clone)]
pub struct Scrubber {
    environment_region: Option<Regex>,
    block_labels: Vec<String>,
    dropped_headings: Vec<String>,
}

impl Scrubber {
    pub fn new(rules: &ScrubRules) -> Self {
        let tag = regex::escape(rules.environment_tag.trim());
        let environment_region = if tag.is_empty() {
            None
        } else {
            Regex::new(&format!(r"(?is)<{tag}\b[^>]*>.*?</{tag}\s*>")).ok()
        };

        Self {
            environment_region,
            block_labels: lowercase_all(&rules.block_labels),
            dropped_headings: lowercase_all(&rules.dropped_headings),
        }
    }

    /// Scrub one text body, then collapse blank-line runs and trim
    pub fn scrub(&self, text: &str) -> String {
        let without_regions = self.drop_environment_regions(text);
        let kept = self.drop_label_blocks(&without_regions);
        collapse_blank_lines(&kept).trim().to_string()
    }

    /// Remove environment regions until none is left
    ///
    /// Removing one region can join the text around it into a new complete region, so a
    /// single pass is not enough.
    fn drop_environment_regions(&self, text: &str) -> String {
        let mut text = text.to_string();
        let Some(region) = &self.environment_region else {
            return text;
        };
        // Every pass shortens the text, so this ends
        while region.is_match(&text) {
            text = region.replace_all(&text, "").into_owned();
        }
        text
    }

    /// Scrub the text segments of a user message, dropping those left empty
    ///
    /// Returns the surviving segments and how many were scrubbed away.
    pub fn scrub_segments(&self, segments: Vec<Segment>) -> (Vec<Segment>, usize) {
        let mut emptied = 0;
        let kept = segments
            .into_iter()
            .filter_map(|mut segment| {
                if segment.kind != SegmentKind::Text {
                    return Some(segment);
                }
                segment.body = self.scrub(&segment.body);
                if segment.body.is_empty() {
                    emptied += 1;
                    None
                } else {
                    Some(segment)
                }
            })
            .collect();
        (kept, emptied)
    }

    fn drop_label_blocks(&self, text: &str) -> String {
        let mut out: Vec<&str> = Vec::new();
        let mut in_fence = false;
        let mut in_block = false;

        for line in text.lines() {
            let trimmed = line.trim_start();

            if is_fence(trimmed) {
                in_block = false;
                in_fence = !in_fence;
                out.push(line);
                continue;
            }
            if in_fence {
                out.push(line);
                continue;
            }

            if in_block {
                if continues_block(line, trimmed) {
                    continue;
                }
                in_block = false;
            }

            let body = strip_line_markers(trimmed).to_ascii_lowercase();
            if trimmed.starts_with('#') && self.dropped_headings.iter().any(|h| body.starts_with(h)) {
                continue;
            }
            if self.block_labels.iter().any(|label| body.starts_with(label)) {
                in_block = true;
                continue;
            }

            out.push(line);
        }

        out.join("\n")
    }
}

impl Default for Scrubber {
    fn default() -> Self {
        Self::new(&ScrubRules::default())
    }
}

fn lowercase_all(values: &[String]) -> Vec<String> {
    values.iter().map(|v| v.trim().to_ascii_lowercase()).filter(|v| !v.is_empty()).collect()
}

fn is_fence(trimmed: &str) -> bool {
    trimmed.starts_with("```") || trimmed.starts_with("~~~")
}

fn is_list_item(trimmed: &str) -> bool {
    let mut chars = trimmed.chars();
    matches!(chars.next(), Some('-' | '*' | '+')) && matches!(chars.next(), Some(' ' | '\t') | None)
}

/// Whether `line` still belongs to a label block
fn continues_block(line: &str, trimmed: &str) -> bool {
    if trimmed.is_empty() || trimmed.starts_with('#') {
        return false;
    }
    is_list_item(trimmed) || line.starts_with([' ', '\t'])
}

/// Strip heading hashes, bullet markers and surrounding whitespace
fn strip_line_markers(trimmed: &str) -> &str {
    let without_hashes = trimmed.trim_start_matches('#').trim_start();
    if is_list_item(without_hashes) {
        without_hashes[1..].trim_start()
    } else {
        without_hashes
    }
}

fn collapse_blank_lines(text: &str) -> String {
    match EXCESS_BLANK_LINES.as_ref() {
        Some(regex) => regex.replace_all(text, "\n\n").into_owned(),
        None => text.to_string(),
    }
}
