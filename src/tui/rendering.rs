use chrono::{DateTime, Utc};
use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, List, ListItem, ListState, Paragraph, Wrap};

use super::app::{Focus, MessageType, StatusMessage};
use super::layout::AppLayout;
use super::timestamps::format_list_timestamp;
use crate::models::{ChatMessage, Document, Role};
use crate::utils::sanitize_for_terminal;

const MUTED: Color = Color::Rgb(113, 113, 122);
const BRIGHT: Color = Color::Rgb(250, 250, 250);
const ACCENT: Color = Color::Rgb(16, 185, 129);
const ERROR: Color = Color::Rgb(239, 68, 68);
const BAR_BG: Color = Color::Rgb(24, 24, 27);

/// Characters of message text shown per list row
const ROW_TEXT_CHARS: usize = 60;

/// Everything one frame needs
pub struct RenderState<'a> {
    pub document: &'a Document,
    /// Message indices in match order
    pub matched: &'a [usize],
    pub selected_idx: usize,
    pub search_query: &'a str,
    pub focus: Focus,
    /// Markdown for the preview pane (selected message, or the whole document)
    pub preview: &'a str,
    pub preview_scroll: u16,
    pub status_message: Option<&'a StatusMessage>,
}

pub fn render_ui(frame: &mut Frame, state: &RenderState) {
    let layout = AppLayout::new(frame.area());

    render_search_bar(frame, layout.search_area, state);
    render_message_list(frame, layout.list_area, state);
    render_preview(frame, layout.preview_area, state);
    render_status_bar(frame, layout.status_area, state);
}

fn render_search_bar(frame: &mut Frame, area: Rect, state: &RenderState) {
    let line = Line::from(vec![
        Span::styled(" Search: ", Style::default().fg(MUTED)),
        Span::styled(sanitize_for_terminal(state.search_query), Style::default().fg(BRIGHT)),
    ]);
    frame.render_widget(Paragraph::new(line), area);
}

fn render_message_list(frame: &mut Frame, area: Rect, state: &RenderState) {
    let now = Utc::now();
    let items: Vec<ListItem> = state
        .matched
        .iter()
        .filter_map(|&idx| state.document.messages().get(idx))
        .map(|message| ListItem::new(list_row(state.document, message, now)))
        .collect();

    // Accent border marks the pane the arrow keys act on
    let border = if state.focus == Focus::List { ACCENT } else { MUTED };
    let list = List::new(items)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(border))
                .title(format!(" Messages ({}/{}) ", state.matched.len(), state.document.messages().len())),
        )
        .style(Style::default().fg(MUTED))
        .highlight_style(Style::default().fg(BRIGHT).bg(ACCENT).add_modifier(Modifier::BOLD));

    // Built per frame; ListState scrolls the selection into view
    let mut list_state = ListState::default();
    if !state.matched.is_empty() {
        list_state.select(Some(state.selected_idx.min(state.matched.len() - 1)));
    }
    frame.render_stateful_widget(list, area, &mut list_state);
}

fn list_row(document: &Document, message: &ChatMessage, now: DateTime<Utc>) -> String {
    let icon = match message.role() {
        Role::User => "👤",
        Role::Assistant => "🤖",
        Role::Tool => "🔧",
        Role::System => "⚙",
        Role::Unknown => "?",
    };
    let source = document.source(message.source()).map(|s| s.name.as_str()).unwrap_or("?");
    // First non-blank line only, cut to the row width
    let plain = message.plain_text();
    let first_line = plain.lines().find(|line| !line.trim().is_empty()).unwrap_or("");
    let text: String = sanitize_for_terminal(first_line).chars().take(ROW_TEXT_CHARS).collect();

    format!(
        "{} {} | {} | {}",
        icon,
        format_list_timestamp(message.timestamp(), now),
        sanitize_for_terminal(source),
        text
    )
}

fn render_preview(frame: &mut Frame, area: Rect, state: &RenderState) {
    let (title, border) = match state.focus {
        Focus::List => (" Message ", MUTED),
        Focus::Preview => (" Document (Tab: back) ", ACCENT),
    };

    let body = if state.preview.is_empty() {
        "No message selected".to_string()
    } else {
        // Log text may carry escape sequences of its own
        sanitize_for_terminal(state.preview)
    };

    let paragraph = Paragraph::new(body)
        .block(Block::default().borders(Borders::ALL).border_style(Style::default().fg(border)).title(title))
        .wrap(Wrap { trim: false })
        .scroll((state.preview_scroll, 0));

    frame.render_widget(paragraph, area);
}

fn render_status_bar(frame: &mut Frame, area: Rect, state: &RenderState) {
    let (text, fg) = match state.status_message {
        Some(status) => {
            let fg = match status.message_type {
                MessageType::Success => ACCENT,
                MessageType::Error => ERROR,
            };
            (format!(" {} ", sanitize_for_terminal(&status.text)), fg)
        }
        None => (format!(" {} ", status_parts(state).join(" | ")), BRIGHT),
    };

    frame.render_widget(Paragraph::new(text).style(Style::default().fg(fg).bg(BAR_BG)), area);
}

fn status_parts(state: &RenderState) -> Vec<String> {
    let mut parts = Vec::new();

    // Mode indicator
    match state.focus {
        Focus::List => parts.push("[LIST]".to_string()),
        Focus::Preview => parts.push("[DOCUMENT]".to_string()),
    }

    // Current selection
    if state.matched.is_empty() {
        parts.push("No messages".to_string());
    } else {
        parts.push(format!("message {}/{}", state.selected_idx + 1, state.matched.len()));
    }

    // Keybindings
    if !state.search_query.is_empty() {
        parts.push("Esc: clear".to_string());
    }
    parts.push("Tab: focus".to_string());
    parts.push("^Y: copy msg".to_string());
    parts.push("^D: copy all".to_string());
    parts.push("^S: export".to_string());
    parts.push("^R: reload".to_string());
    parts.push("^C: quit".to_string());
    parts
}

#[cfg(test)]
mod tests {
    use std::time::Instant;

    use chrono::TimeZone;
    use ratatui::Terminal;
    use ratatui::backend::TestBackend;

    use super::*;
    use crate::models::{Segment, SourceInfo};

    fn document() -> Document {
        let ts = Utc.timestamp_opt(1_700_000_000, 0).unwrap();
        Document::new(
            vec![SourceInfo::jsonl("session.jsonl", None, None)],
            vec![
                ChatMessage::new(Role::User, Some(ts), vec![Segment::text("First question")], 0, 0).unwrap(),
                ChatMessage::new(Role::Assistant, None, vec![Segment::text("\x1b[31mred\x1b[0m answer")], 0, 1)
                    .unwrap(),
            ],
        )
    }

    fn state<'a>(document: &'a Document, matched: &'a [usize], preview: &'a str) -> RenderState<'a> {
        RenderState {
            document,
            matched,
            selected_idx: 0,
            search_query: "",
            focus: Focus::List,
            preview,
            preview_scroll: 0,
            status_message: None,
        }
    }

    fn buffer_text(terminal: &Terminal<TestBackend>) -> String {
        terminal.backend().buffer().content().iter().map(|cell| cell.symbol()).collect()
    }

    #[test]
    fn test_render_ui_with_messages() {
        let mut terminal = Terminal::new(TestBackend::new(120, 30)).unwrap();
        let document = document();
        let matched = [0, 1];

        terminal.draw(|f| render_ui(f, &state(&document, &matched, "### User"))).unwrap();

        let text = buffer_text(&terminal);
        assert!(text.contains("First question"));
        assert!(text.contains("Messages (2/2)"));
        assert!(text.contains("message 1/2"));
    }

    #[test]
    fn test_render_ui_empty() {
        let mut terminal = Terminal::new(TestBackend::new(100, 20)).unwrap();
        let document = Document::default();

        terminal.draw(|f| render_ui(f, &state(&document, &[], ""))).unwrap();

        let text = buffer_text(&terminal);
        assert!(text.contains("No message selected"));
        assert!(text.contains("No messages"));
    }

    #[test]
    fn test_escape_sequences_not_drawn() {
        let mut terminal = Terminal::new(TestBackend::new(120, 30)).unwrap();
        let document = document();
        let matched = [1];

        terminal.draw(|f| render_ui(f, &state(&document, &matched, "\x1b[2Jpreview"))).unwrap();

        let text = buffer_text(&terminal);
        assert!(text.contains("red answer"));
        assert!(!text.contains('\x1b'));
    }

    #[test]
    fn test_status_message_replaces_hints() {
        let mut terminal = Terminal::new(TestBackend::new(100, 10)).unwrap();
        let document = document();
        let matched = [0];
        let status = StatusMessage {
            text: "✓ Copied".to_string(),
            message_type: MessageType::Success,
            expires_at: Instant::now(),
        };
        let mut render_state = state(&document, &matched, "x");
        render_state.status_message = Some(&status);

        terminal.draw(|f| render_ui(f, &render_state)).unwrap();

        let text = buffer_text(&terminal);
        assert!(text.contains("Copied"));
        assert!(!text.contains("^C: quit"));
    }

    #[test]
    fn test_document_focus_scrolls() {
        let mut terminal = Terminal::new(TestBackend::new(100, 10)).unwrap();
        let document = document();
        let matched = [0];
        let long: String = (0..50).map(|i| format!("line {i}\n")).collect();
        let mut render_state = state(&document, &matched, &long);
        render_state.focus = Focus::Preview;
        render_state.preview_scroll = 40;

        terminal.draw(|f| render_ui(f, &render_state)).unwrap();

        let text = buffer_text(&terminal);
        assert!(text.contains("line 40"));
        assert!(!text.contains("line 3 "));
        assert!(text.contains("[DOCUMENT]"));
    }
}
