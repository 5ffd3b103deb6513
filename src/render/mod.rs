//! Markdown rendering of a merged [`Document`]
//!
//! Layout:
//!
//! ```text
//! # <title>
//!
//! Sources: `a.jsonl`, `b.jsonl`
//!
//! ---
//!
//! ## Conversation: a.jsonl
//!
//! ### User
//!
//! _2025-01-01 00:00:00 UTC_
//!
//! Hello
//! ...
//! *Total messages: N*
//! ```
//!
//! A conversation section opens whenever the source changes between consecutive
//! messages. Tool invocations and results are rendered as labeled fenced blocks.
//! Output depends only on the document and options, so the same input always renders
//! to the same bytes.

use std::borrow::Cow;
use std::fmt::Write;

use chrono::{DateTime, Utc};

use crate::flatten::truncate_chars;
use crate::models::{ChatMessage, Document, Role, Segment, SegmentKind, SourceKind};

pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S UTC";
pub const NO_TIMESTAMP: &str = "No timestamp";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderOptions {
    pub title: String,
    /// Character cap for tool-result bodies; `None` renders them in full
    pub tool_output_limit: Option<usize>,
    pub show_footer: bool,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            title: "Claude/Codex Chat History".to_string(),
            tool_output_limit: Some(1000),
            show_footer: true,
        }
    }
}

/// Render the whole document
pub fn render_markdown(document: &Document, options: &RenderOptions) -> String {
    let mut out = String::new();
    render_header(&mut out, document, options);

    let mut current_source = None;
    let mut opened = vec![false; document.sources().len()];

    for message in document.messages() {
        if current_source != Some(message.source()) {
            current_source = Some(message.source());
            render_section_heading(&mut out, document, message.source(), &mut opened);
        }
        out.push('\n');
        out.push_str(&render_message(message, options));
    }

    for source in document.sources() {
        if let SourceKind::Passthrough { text } = &source.kind {
            let _ = write!(out, "\n---\n\n## Source: {} (verbatim)\n\n", source.name);
            out.push_str(text.trim_end());
            out.push('\n');
        }
    }

    if options.show_footer && !document.is_empty() {
        let _ = write!(out, "\n---\n\n*Total messages: {}*\n", document.messages().len());
    }

    out
}

/// Render a single message block: role heading, timestamp line, segments
pub fn render_message(message: &ChatMessage, options: &RenderOptions) -> String {
    let mut out = String::new();
    let _ = write!(out, "### {}\n\n_{}_\n", message.role().label(), format_timestamp(message.timestamp()));

    for segment in message.segments() {
        out.push('\n');
        render_segment(&mut out, segment, options);
    }
    out
}

pub fn format_timestamp(timestamp: Option<DateTime<Utc>>) -> String {
    match timestamp {
        Some(ts) => ts.format(TIMESTAMP_FORMAT).to_string(),
        None => NO_TIMESTAMP.to_string(),
    }
}

fn render_header(out: &mut String, document: &Document, options: &RenderOptions) {
    let _ = writeln!(out, "# {}\n", options.title);

    if document.sources().is_empty() {
        out.push_str("Sources: _none_\n");
    } else {
        let names: Vec<String> = document.sources().iter().map(|s| inline_code(&s.name)).collect();
        let _ = writeln!(out, "Sources: {}", names.join(", "));
    }
}

fn render_section_heading(out: &mut String, document: &Document, source: usize, opened: &mut [bool]) {
    let Some(info) = document.source(source) else {
        return;
    };
    let first_time = opened.get(source).is_some_and(|seen| !seen);
    if let Some(seen) = opened.get_mut(source) {
        *seen = true;
    }

    let suffix = if first_time { "" } else { " (continued)" };
    let _ = write!(out, "\n---\n\n## Conversation: {}{}\n", info.name, suffix);

    if first_time && let SourceKind::Jsonl { cwd, session_id } = &info.kind {
        if let Some(cwd) = cwd {
            let _ = write!(out, "\n**Working Directory:** {}\n", inline_code(cwd));
        }
        if let Some(session_id) = session_id {
            let _ = write!(out, "\n**Session ID:** {}\n", inline_code(session_id));
        }
    }
}

fn render_segment(out: &mut String, segment: &Segment, options: &RenderOptions) {
    match segment.kind {
        SegmentKind::Text => {
            if let Some(label) = &segment.label {
                let _ = write!(out, "**[{}]**\n\n", label);
            }
            out.push_str(&escape_role_headings(segment.body.trim_end()));
            out.push('\n');
        }
        SegmentKind::ToolUse => {
            let name = segment.label.as_deref().unwrap_or("unknown");
            let _ = write!(out, "**Tool use:** {}\n\n", inline_code(name));
            let info = if looks_like_json(&segment.body) { "json" } else { "" };
            fenced(out, &segment.body, info);
        }
        SegmentKind::ToolResult => {
            match &segment.label {
                Some(label) => {
                    let _ = write!(out, "**Tool result:** {}\n\n", inline_code(label));
                }
                None => out.push_str("**Tool result:**\n\n"),
            }
            let body = match options.tool_output_limit {
                Some(limit) => truncate_chars(&segment.body, limit),
                None => segment.body.clone(),
            };
            fenced(out, &body, "");
        }
    }
}

/// Write `body` in a fence longer than any backtick run inside it
fn fenced(out: &mut String, body: &str, info: &str) {
    let fence = "`".repeat(longest_backtick_run(body).max(2) + 1);
    let _ = writeln!(out, "{fence}{info}");
    let body = body.trim_end_matches('\n');
    if !body.is_empty() {
        out.push_str(body);
        out.push('\n');
    }
    let _ = writeln!(out, "{fence}");
}

fn inline_code(text: &str) -> String {
    if text.contains('`') {
        let ticks = "`".repeat(longest_backtick_run(text) + 1);
        format!("{ticks} {text} {ticks}")
    } else {
        format!("`{text}`")
    }
}

fn longest_backtick_run(text: &str) -> usize {
    let mut longest = 0;
    let mut current = 0;
    for ch in text.chars() {
        if ch == '`' {
            current += 1;
            longest = longest.max(current);
        } else {
            current = 0;
        }
    }
    longest
}

/// Whether `line` reads as a message heading (`### User`, `### Assistant`, ...)
pub fn is_role_heading(line: &str) -> bool {
    line.strip_prefix("### ").is_some_and(|rest| Role::ALL.iter().any(|role| role.label() == rest.trim_end()))
}

/// Backslash-escape body lines outside code fences that would read as a message heading
fn escape_role_headings(body: &str) -> Cow<'_, str> {
    if !body.lines().any(is_role_heading) {
        return Cow::Borrowed(body);
    }

    let mut in_fence = false;
    let lines: Vec<Cow<'_, str>> = body
        .lines()
        .map(|line| {
            let trimmed = line.trim_start();
            if trimmed.starts_with("```") || trimmed.starts_with("~~~") {
                in_fence = !in_fence;
            }
            if !in_fence && is_role_heading(line) {
                Cow::Owned(format!("\\{line}"))
            } else {
                Cow::Borrowed(line)
            }
        })
        .collect();
    Cow::Owned(lines.join("\n"))
}

fn looks_like_json(body: &str) -> bool {
    let trimmed = body.trim_start();
    trimmed.starts_with('{') || trimmed.starts_with('[')
}
