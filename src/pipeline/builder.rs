use rayon::prelude::*;
use tracing::{debug, info};

use super::{Conversion, ConvertOptions, SourceInput};
use crate::flatten::flatten;
use crate::merge::merge;
use crate::models::{ChatMessage, Diagnostics, Document, Role, SourceInfo};
use crate::normalize::{Normalized, SourceHints, normalize};
use crate::parsers::{RecordParser, looks_like_jsonl};
use crate::render::render_markdown;
use crate::scrub::Scrubber;

const PASSTHROUGH_EXTENSIONS: &[&str] = &[".md", ".markdown", ".txt"];

/// How a source is consumed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceFormat {
    Jsonl,
    Passthrough,
}

/// Per-source result, before the merge
#[derive(Debug, Clone)]
pub struct SourceOutcome {
    pub info: SourceInfo,
    pub messages: Vec<ChatMessage>,
    pub diagnostics: Diagnostics,
}

/// Decide whether a source is line-delimited JSON or already-rendered text
///
/// Markdown and text file names are always passed through. Anything else is parsed when
/// at least one line is a JSON object, or when it is empty.
pub fn sniff_format(name: &str, text: &str) -> SourceFormat {
    let lower = name.to_ascii_lowercase();
    if PASSTHROUGH_EXTENSIONS.iter().any(|ext| lower.ends_with(ext)) {
        return SourceFormat::Passthrough;
    }
    if text.trim().is_empty() || looks_like_jsonl(text) {
        SourceFormat::Jsonl
    } else {
        SourceFormat::Passthrough
    }
}

/// Convert every source and merge them into one rendered document
///
/// # Examples
///
/// ```
/// use chatlog_md::pipeline::{ConvertOptions, SourceInput, convert};
///
/// let input = SourceInput::new("s.jsonl", r#"{"role":"user","content":"Hello"}"#);
/// let conversion = convert(&[input], &ConvertOptions::default());
///
/// assert_eq!(conversion.diagnostics.messages_emitted, 1);
/// assert!(conversion.markdown.contains("### User"));
/// ```
pub fn convert(inputs: &[SourceInput], options: &ConvertOptions) -> Conversion {
    let scrubber = Scrubber::new(&options.scrub);

    // Sources are independent until the merge; collect keeps input order
    let outcomes: Vec<SourceOutcome> = inputs
        .par_iter()
        .enumerate()
        .map(|(index, input)| process_source(index, input, options, &scrubber))
        .collect();

    let mut diagnostics = Diagnostics::default();
    let mut sources = Vec::with_capacity(outcomes.len());
    let mut per_source = Vec::with_capacity(outcomes.len());
    for outcome in outcomes {
        diagnostics += outcome.diagnostics;
        sources.push(outcome.info);
        per_source.push(outcome.messages);
    }

    let document = Document::new(sources, merge(per_source));
    let markdown = render_markdown(&document, &options.render);

    debug!(
        "Converted {} sources: {} messages, {} skipped",
        diagnostics.sources,
        diagnostics.messages_emitted,
        diagnostics.skipped()
    );

    Conversion { document, markdown, diagnostics }
}

/// Run parse, normalize, flatten and scrub over one source
///
/// `index` is the source's input position and ends up on every message it yields.
pub fn process_source(
    index: usize,
    input: &SourceInput,
    options: &ConvertOptions,
    scrubber: &Scrubber,
) -> SourceOutcome {
    let mut diagnostics = Diagnostics { sources: 1, ..Default::default() };

    if sniff_format(&input.name, &input.text) == SourceFormat::Passthrough {
        diagnostics.passthrough_sources = 1;
        return SourceOutcome {
            info: SourceInfo::passthrough(&input.name, &input.text),
            messages: Vec::new(),
            diagnostics,
        };
    }

    let mut parser = RecordParser::new(&input.name, &input.text);
    let mut hints = SourceHints::default();
    let mut messages = Vec::new();

    for record in parser.by_ref() {
        diagnostics.records_parsed += 1;
        // Hints come from every record, recognized or not (session_meta carries the cwd)
        hints.observe(&record.value);

        let Normalized::Recognized(extracted) = normalize(&record.value) else {
            debug!("Unrecognized record shape at line {} in {}", record.line, input.name);
            diagnostics.records_unrecognized += 1;
            continue;
        };

        if !extracted.role.is_conversational() && !options.include_system {
            diagnostics.records_filtered += 1;
            continue;
        }

        let mut segments = flatten(extracted.content);
        // Only user prompts carry injected IDE context
        if extracted.role == Role::User {
            let (kept, emptied) = scrubber.scrub_segments(segments);
            diagnostics.segments_scrubbed_empty += emptied;
            segments = kept;
        }

        // No segments left: nothing to render for this record
        match ChatMessage::new(extracted.role, extracted.timestamp, segments, index, record.ordinal) {
            Some(message) => messages.push(message),
            None => diagnostics.records_empty += 1,
        }
    }

    diagnostics.lines_unparsable = parser.skipped().len();
    diagnostics.messages_emitted = messages.len();

    if diagnostics.skipped() > 0 {
        info!(
            "{}: {} records, {} skipped, {} messages",
            input.name,
            diagnostics.records_parsed,
            diagnostics.skipped(),
            diagnostics.messages_emitted
        );
    }

    SourceOutcome {
        info: SourceInfo::jsonl(&input.name, hints.cwd, hints.session_id),
        messages,
        diagnostics,
    }
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};

    use super::*;
    use crate::models::SegmentKind;

    fn run(inputs: &[SourceInput]) -> Conversion {
        convert(inputs, &ConvertOptions::default())
    }

    #[test]
    fn test_malformed_lines_are_skipped() {
        let text = "not json\n{broken\n{\"role\":\"user\",\"content\":\"Hello\"}\n";
        let conversion = run(&[SourceInput::new("a.jsonl", text)]);

        assert_eq!(conversion.diagnostics.skipped(), 2);
        assert_eq!(conversion.diagnostics.messages_emitted, 1);
        assert_eq!(conversion.markdown.matches("\n### ").count(), 1);
    }

    #[test]
    fn test_codex_nested_record() {
        let text = r#"{"type":"response_item","payload":{"message":{"role":"assistant","content":[{"type":"output_text","text":"Hi"}]},"timestamp":"2025-01-01T00:00:00Z"}}"#;
        let conversion = run(&[SourceInput::new("a.jsonl", text)]);

        let messages = conversion.document.messages();
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].role(), Role::Assistant);
        assert_eq!(messages[0].timestamp(), Some(Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap()));
        assert_eq!(messages[0].segments().len(), 1);
        assert_eq!(messages[0].segments()[0].kind, SegmentKind::Text);
        assert_eq!(messages[0].segments()[0].body, "Hi");
    }

    #[test]
    fn test_user_text_is_scrubbed() {
        let text = r#"{"role":"user","content":"<environment_context>cwd: /x</environment_context>Hello"}"#;
        let conversion = run(&[SourceInput::new("a.jsonl", text)]);
        assert_eq!(conversion.document.messages()[0].segments()[0].body, "Hello");
    }

    #[test]
    fn test_assistant_text_is_not_scrubbed() {
        let text = r#"{"role":"assistant","content":"Active file: src/main.rs"}"#;
        let conversion = run(&[SourceInput::new("a.jsonl", text)]);
        assert_eq!(conversion.document.messages()[0].segments()[0].body, "Active file: src/main.rs");
    }

    #[test]
    fn test_fully_scrubbed_message_is_dropped() {
        let text = r#"{"role":"user","content":"<environment_context>cwd: /x</environment_context>"}"#;
        let conversion = run(&[SourceInput::new("a.jsonl", text)]);

        assert!(conversion.document.is_empty());
        assert_eq!(conversion.diagnostics.segments_scrubbed_empty, 1);
        assert_eq!(conversion.diagnostics.records_empty, 1);
    }

    #[test]
    fn test_system_records_filtered_unless_requested() {
        let text = "{\"role\":\"system\",\"content\":\"rules\"}\n{\"role\":\"user\",\"content\":\"hi\"}\n";
        let input = [SourceInput::new("a.jsonl", text)];

        let default = run(&input);
        assert_eq!(default.diagnostics.records_filtered, 1);
        assert_eq!(default.document.messages().len(), 1);

        let options = ConvertOptions { include_system: true, ..Default::default() };
        let all = convert(&input, &options);
        assert_eq!(all.document.messages().len(), 2);
        assert_eq!(all.document.messages()[0].role(), Role::System);
    }

    #[test]
    fn test_unrecognized_records_counted() {
        let text = "{\"type\":\"session_meta\",\"payload\":{\"id\":\"abc\",\"cwd\":\"/work\"}}\n{\"role\":\"user\",\"content\":\"hi\"}\n";
        let conversion = run(&[SourceInput::new("a.jsonl", text)]);

        assert_eq!(conversion.diagnostics.records_unrecognized, 1);
        assert_eq!(conversion.diagnostics.records_parsed, 2);
        assert!(conversion.markdown.contains("**Working Directory:** `/work`"));
        assert!(conversion.markdown.contains("**Session ID:** `abc`"));
    }

    #[test]
    fn test_sources_merge_chronologically() {
        let a = "{\"role\":\"user\",\"content\":\"a1\",\"timestamp\":\"2025-01-01T00:00:00Z\"}\n\
                 {\"role\":\"user\",\"content\":\"a2\",\"timestamp\":\"2025-01-01T00:20:00Z\"}\n";
        let b = "{\"role\":\"assistant\",\"content\":\"b1\",\"timestamp\":\"2025-01-01T00:10:00Z\"}\n";
        let conversion = run(&[SourceInput::new("a.jsonl", a), SourceInput::new("b.jsonl", b)]);

        let bodies: Vec<&str> =
            conversion.document.messages().iter().map(|m| m.segments()[0].body.as_str()).collect();
        assert_eq!(bodies, vec!["a1", "b1", "a2"]);
    }

    #[test]
    fn test_passthrough_source() {
        let conversion = run(&[
            SourceInput::new("a.jsonl", "{\"role\":\"user\",\"content\":\"hi\"}"),
            SourceInput::new("old.md", "# Earlier export\n"),
        ]);

        assert_eq!(conversion.diagnostics.passthrough_sources, 1);
        assert!(conversion.markdown.contains("## Source: old.md (verbatim)\n\n# Earlier export\n"));
    }

    #[test]
    fn test_empty_input_renders_header_only() {
        let conversion = run(&[]);
        assert!(conversion.document.is_empty());
        assert_eq!(conversion.markdown, "# Claude/Codex Chat History\n\nSources: _none_\n");
    }

    #[test]
    fn test_sniff_format() {
        assert_eq!(sniff_format("notes.MD", "{\"role\":\"user\"}"), SourceFormat::Passthrough);
        assert_eq!(sniff_format("log.jsonl", ""), SourceFormat::Jsonl);
        assert_eq!(sniff_format("log.jsonl", "plain words"), SourceFormat::Passthrough);
        assert_eq!(sniff_format("log", "junk\n{\"role\":\"user\"}"), SourceFormat::Jsonl);
    }
}
