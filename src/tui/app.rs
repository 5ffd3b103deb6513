//! Previewer state and event handling.
//!
//! `App` owns the current [`Conversion`] and everything the screen shows:
//!
//! - **Fuzzy search**: every message is pushed into `nucleo` with its role, source name
//!   and plain text as the haystack; the list shows matches in match order
//! - **Focus**: the list (preview shows the selected message) or the preview (whole
//!   document, scrollable)
//! - **Export**: clipboard copies, writing the document to the output directory, and
//!   reloading the sources from disk
//! - **Status messages**: transient feedback with expiry
//! - **Dirty state tracking**: redraw only when state changes

use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::Result;
use nucleo::{Config, Nucleo};
use ratatui::Terminal;
use ratatui::backend::Backend;

use super::events::{Action, poll_event};
use super::rendering::{RenderState, render_ui};
use crate::clipboard::{ClipboardProvider, SystemClipboard, copy_with_provider};
use crate::output::OutputConfig;
use crate::pipeline::Conversion;
use crate::render::{RenderOptions, render_message};
use crate::utils::format_path_with_tilde;

/// Duration for success status messages (milliseconds)
const STATUS_SUCCESS_DURATION_MS: u64 = 3000;
/// Duration for error status messages (milliseconds)
const STATUS_ERROR_DURATION_MS: u64 = 5000;

const MAX_QUERY_LEN: usize = 256;
const PAGE_SIZE: isize = 10;

/// Re-reads and re-converts the sources (Ctrl+R)
pub type Loader = Box<dyn Fn() -> Result<Conversion>>;

/// Type of status message
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageType {
    Success,
    Error,
}

/// Transient status message with expiry
#[derive(Debug, Clone)]
pub struct StatusMessage {
    pub text: String,
    pub message_type: MessageType,
    pub expires_at: Instant,
}

/// Which pane the navigation keys act on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    List,
    Preview,
}

pub struct App {
    nucleo: Nucleo<usize>,
    conversion: Conversion,
    render_options: RenderOptions,
    output: OutputConfig,
    loader: Option<Loader>,
    clipboard: Box<dyn ClipboardProvider>,
    selected_idx: usize,
    search_query: String,
    focus: Focus,
    preview_scroll: u16,
    should_quit: bool,
    status_message: Option<StatusMessage>,
    needs_redraw: bool,
    last_draw_time: Instant,
}

impl App {
    pub fn new(conversion: Conversion, render_options: RenderOptions, output: OutputConfig) -> Self {
        let nucleo = build_matcher(&conversion);

        Self {
            nucleo,
            conversion,
            render_options,
            output,
            loader: None,
            clipboard: Box::new(SystemClipboard::new()),
            selected_idx: 0,
            search_query: String::new(),
            focus: Focus::List,
            preview_scroll: 0,
            should_quit: false,
            status_message: None,
            needs_redraw: true,
            last_draw_time: Instant::now(),
        }
    }

    pub fn with_loader(mut self, loader: Loader) -> Self {
        self.loader = Some(loader);
        self
    }

    pub fn with_clipboard(mut self, clipboard: Box<dyn ClipboardProvider>) -> Self {
        self.clipboard = clipboard;
        self
    }

    /// Set a transient status message with automatic expiry
    fn set_status(&mut self, text: impl Into<String>, message_type: MessageType, duration_ms: u64) {
        self.status_message = Some(StatusMessage {
            text: text.into(),
            message_type,
            expires_at: Instant::now() + Duration::from_millis(duration_ms),
        });
        self.needs_redraw = true;
    }

    fn set_success(&mut self, text: impl Into<String>) {
        self.set_status(text, MessageType::Success, STATUS_SUCCESS_DURATION_MS);
    }

    fn set_error(&mut self, text: impl Into<String>) {
        self.set_status(text, MessageType::Error, STATUS_ERROR_DURATION_MS);
    }

    /// Clear the status message once it has expired
    fn check_and_clear_expired_status(&mut self) {
        if self.status_message.as_ref().is_some_and(|msg| Instant::now() >= msg.expires_at) {
            self.status_message = None;
            self.needs_redraw = true;
        }
    }

    pub fn run<B: Backend>(&mut self, terminal: &mut Terminal<B>) -> Result<()> {
        while !self.should_quit {
            self.check_and_clear_expired_status();

            if self.nucleo.tick(10).changed {
                self.needs_redraw = true;
            }

            let matched = self.collect_matched_items();

            // Redraw at least every 100ms so terminal resizes are picked up
            let now = Instant::now();
            if self.needs_redraw || now.duration_since(self.last_draw_time) >= Duration::from_millis(100) {
                let preview = self.preview_text(&matched);
                terminal.draw(|f| {
                    let state = RenderState {
                        document: &self.conversion.document,
                        matched: &matched,
                        selected_idx: self.selected_idx,
                        search_query: &self.search_query,
                        focus: self.focus,
                        preview: &preview,
                        preview_scroll: self.preview_scroll,
                        status_message: self.status_message.as_ref(),
                    };
                    render_ui(f, &state);
                })?;
                self.needs_redraw = false;
                self.last_draw_time = now;
            }

            let action = poll_event(Duration::from_millis(100))?;
            self.handle_action(action);
        }

        Ok(())
    }

    /// Indices of the matched messages, in match order
    fn collect_matched_items(&self) -> Vec<usize> {
        let snapshot = self.nucleo.snapshot();
        snapshot.matched_items(..snapshot.matched_item_count()).map(|item| *item.data).collect()
    }

    fn selected_message_index(&self) -> Option<usize> {
        self.collect_matched_items().get(self.selected_idx).copied()
    }

    /// Markdown for the preview pane
    fn preview_text(&self, matched: &[usize]) -> String {
        match self.focus {
            Focus::Preview => self.conversion.markdown.clone(),
            Focus::List => matched
                .get(self.selected_idx)
                .and_then(|&idx| self.conversion.document.messages().get(idx))
                .map(|message| render_message(message, &self.render_options))
                .unwrap_or_default(),
        }
    }

    fn handle_action(&mut self, action: Action) {
        match action {
            Action::Quit => self.should_quit = true,
            Action::ClearSearch => {
                if self.search_query.is_empty() {
                    self.should_quit = true;
                } else {
                    self.search_query.clear();
                    self.update_nucleo_pattern();
                    self.selected_idx = 0;
                    self.needs_redraw = true;
                }
            }
            Action::MoveUp => self.navigate(-1),
            Action::MoveDown => self.navigate(1),
            Action::PageUp => self.navigate(-PAGE_SIZE),
            Action::PageDown => self.navigate(PAGE_SIZE),
            Action::UpdateSearch(c) => self.update_search(c),
            Action::DeleteChar => self.delete_char(),
            Action::ToggleFocus => {
                self.focus = match self.focus {
                    Focus::List => Focus::Preview,
                    Focus::Preview => Focus::List,
                };
                self.preview_scroll = 0;
                self.needs_redraw = true;
            }
            Action::CopyMessage => self.copy_selected_message(),
            Action::CopyDocument => {
                let markdown = self.conversion.markdown.clone();
                match copy_with_provider(&markdown, self.clipboard.as_mut()) {
                    Ok(()) => self.set_success("✓ Copied document to clipboard"),
                    Err(e) => self.set_error(format!("✗ Clipboard error: {}", e)),
                }
            }
            Action::Export => match self.output.write(&self.conversion.markdown) {
                Ok(path) => self.set_success(format!("✓ Exported to {}", format_path_with_tilde(&path))),
                Err(e) => self.set_error(format!("✗ Export failed: {:#}", e)),
            },
            Action::Reload => self.reload(),
            Action::None => {}
        }
    }

    fn navigate(&mut self, delta: isize) {
        match self.focus {
            Focus::List => {
                let total = self.collect_matched_items().len();
                self.move_selection(delta, total);
            }
            Focus::Preview => self.scroll_preview(delta),
        }
    }

    fn move_selection(&mut self, delta: isize, total: usize) {
        if total == 0 {
            self.selected_idx = 0;
            return;
        }

        let old_idx = self.selected_idx;
        let new_idx = (self.selected_idx as isize + delta).max(0) as usize;
        self.selected_idx = new_idx.min(total - 1);

        if old_idx != self.selected_idx {
            self.needs_redraw = true;
        }
    }

    fn scroll_preview(&mut self, delta: isize) {
        let max_scroll = self.conversion.markdown.lines().count().saturating_sub(1);
        let max_scroll = u16::try_from(max_scroll).unwrap_or(u16::MAX) as isize;

        let old = self.preview_scroll;
        self.preview_scroll = (self.preview_scroll as isize + delta).clamp(0, max_scroll) as u16;
        if old != self.preview_scroll {
            self.needs_redraw = true;
        }
    }

    fn copy_selected_message(&mut self) {
        let Some(index) = self.selected_message_index() else {
            self.set_error("✗ No message to copy");
            return;
        };
        let Some(message) = self.conversion.document.messages().get(index) else {
            self.set_error("✗ Invalid selection");
            return;
        };

        let markdown = render_message(message, &self.render_options);
        match copy_with_provider(&markdown, self.clipboard.as_mut()) {
            Ok(()) => self.set_success("✓ Copied message to clipboard"),
            Err(e) => self.set_error(format!("✗ Clipboard error: {}", e)),
        }
    }

    fn reload(&mut self) {
        let Some(loader) = &self.loader else {
            self.set_error("✗ Reload is not available");
            return;
        };

        match loader() {
            Ok(conversion) => {
                let messages = conversion.diagnostics.messages_emitted;
                let sources = conversion.diagnostics.sources;
                self.replace_conversion(conversion);
                self.set_success(format!("✓ Reloaded {} messages from {} sources", messages, sources));
            }
            Err(e) => self.set_error(format!("✗ Reload failed: {:#}", e)),
        }
    }

    fn replace_conversion(&mut self, conversion: Conversion) {
        // Message indices change, so the old matcher cannot be reused
        self.nucleo = build_matcher(&conversion);
        self.conversion = conversion;
        self.update_nucleo_pattern();
        self.selected_idx = 0;
        self.preview_scroll = 0;
        self.needs_redraw = true;
    }

    fn update_search(&mut self, c: char) {
        if self.search_query.len() < MAX_QUERY_LEN {
            self.search_query.push(c);
            self.update_nucleo_pattern();
            self.selected_idx = 0;
            self.needs_redraw = true;
        }
    }

    fn delete_char(&mut self) {
        if self.search_query.pop().is_some() {
            self.update_nucleo_pattern();
            self.selected_idx = 0;
            self.needs_redraw = true;
        }
    }

    fn update_nucleo_pattern(&mut self) {
        // Column 0 is the only haystack column
        self.nucleo.pattern.reparse(
            0,
            &self.search_query,
            nucleo::pattern::CaseMatching::Smart,
            nucleo::pattern::Normalization::Smart,
            false,
        );
        // Kick off matching now so the next frame already has results
        self.nucleo.tick(10);
    }
}

/// Fresh matcher holding every message of `conversion`
fn build_matcher(conversion: &Conversion) -> Nucleo<usize> {
    let nucleo = Nucleo::new(Config::DEFAULT, Arc::new(|| {}), None, 1);

    let injector = nucleo.injector();
    let document = &conversion.document;
    for (idx, message) in document.messages().iter().enumerate() {
        let source = document.source(message.source()).map(|s| s.name.as_str()).unwrap_or_default();
        // Role and source name are searchable alongside the text
        let haystack = format!("{} {} {}", message.role().label(), source, message.plain_text());
        injector.push(idx, move |_idx, cols| {
            cols[0] = haystack.into();
        });
    }

    nucleo
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use tempfile::TempDir;

    use super::*;
    use crate::pipeline::{ConvertOptions, SourceInput, convert};

    #[derive(Clone, Default)]
    struct MockClipboard {
        copied: Rc<RefCell<Vec<String>>>,
        should_fail: bool,
    }

    impl ClipboardProvider for MockClipboard {
        fn set_text(&mut self, text: &str) -> Result<()> {
            if self.should_fail {
                anyhow::bail!("Mock clipboard error");
            }
            self.copied.borrow_mut().push(text.to_string());
            Ok(())
        }
    }

    fn conversion(lines: &[&str]) -> Conversion {
        convert(&[SourceInput::new("session.jsonl", lines.join("\n"))], &ConvertOptions::default())
    }

    fn sample() -> Conversion {
        conversion(&[
            r#"{"role":"user","content":"How do I parse JSON?","timestamp":"2025-01-01T00:00:00Z"}"#,
            r#"{"role":"assistant","content":"Use serde_json.","timestamp":"2025-01-01T00:01:00Z"}"#,
            r#"{"role":"user","content":"And YAML?","timestamp":"2025-01-01T00:02:00Z"}"#,
        ])
    }

    fn app_with(conversion: Conversion) -> (App, MockClipboard, TempDir) {
        let clipboard = MockClipboard::default();
        let temp = TempDir::new().unwrap();
        let output = OutputConfig::new(temp.path().join("out"), "ChatHistory");
        let mut app = App::new(conversion, RenderOptions::default(), output)
            .with_clipboard(Box::new(clipboard.clone()));
        settle(&mut app);
        (app, clipboard, temp)
    }

    fn settle(app: &mut App) {
        while app.nucleo.tick(10).running {}
    }

    #[test]
    fn test_app_new_initializes_state() {
        let (app, _, _temp) = app_with(sample());

        assert_eq!(app.selected_idx, 0);
        assert_eq!(app.search_query, "");
        assert_eq!(app.focus, Focus::List);
        assert!(!app.should_quit);
        assert!(app.needs_redraw);
        assert_eq!(app.collect_matched_items(), vec![0, 1, 2]);
    }

    #[test]
    fn test_move_selection_bounds() {
        let (mut app, _, _temp) = app_with(sample());

        app.handle_action(Action::MoveDown);
        assert_eq!(app.selected_idx, 1);
        app.handle_action(Action::PageDown);
        assert_eq!(app.selected_idx, 2);
        app.handle_action(Action::PageUp);
        assert_eq!(app.selected_idx, 0);
        app.handle_action(Action::MoveUp);
        assert_eq!(app.selected_idx, 0);
    }

    #[test]
    fn test_move_selection_with_empty_results() {
        let (mut app, _, _temp) = app_with(conversion(&[]));
        app.selected_idx = 5;
        app.move_selection(1, 0);
        assert_eq!(app.selected_idx, 0);
    }

    #[test]
    fn test_fuzzy_search_filters_messages() {
        let (mut app, _, _temp) = app_with(sample());

        for c in "yaml".chars() {
            app.handle_action(Action::UpdateSearch(c));
        }
        settle(&mut app);

        assert_eq!(app.collect_matched_items(), vec![2]);
    }

    #[test]
    fn test_search_matches_role_label() {
        let (mut app, _, _temp) = app_with(sample());

        for c in "Assistant".chars() {
            app.handle_action(Action::UpdateSearch(c));
        }
        settle(&mut app);

        assert_eq!(app.collect_matched_items(), vec![1]);
    }

    #[test]
    fn test_delete_char_and_clear_search() {
        let (mut app, _, _temp) = app_with(sample());
        app.handle_action(Action::UpdateSearch('x'));
        app.handle_action(Action::UpdateSearch('y'));

        app.handle_action(Action::DeleteChar);
        assert_eq!(app.search_query, "x");

        app.handle_action(Action::ClearSearch);
        assert_eq!(app.search_query, "");
        assert!(!app.should_quit);

        app.handle_action(Action::ClearSearch);
        assert!(app.should_quit);
    }

    #[test]
    fn test_search_query_length_limit() {
        let (mut app, _, _temp) = app_with(sample());
        for _ in 0..300 {
            app.update_search('a');
        }
        assert_eq!(app.search_query.len(), MAX_QUERY_LEN);
    }

    #[test]
    fn test_quit() {
        let (mut app, _, _temp) = app_with(sample());
        app.handle_action(Action::Quit);
        assert!(app.should_quit);
    }

    #[test]
    fn test_preview_follows_focus() {
        let (mut app, _, _temp) = app_with(sample());
        app.handle_action(Action::MoveDown);

        let matched = app.collect_matched_items();
        let preview = app.preview_text(&matched);
        assert!(preview.starts_with("### Assistant"));
        assert!(preview.contains("Use serde_json."));

        app.handle_action(Action::ToggleFocus);
        assert_eq!(app.focus, Focus::Preview);
        assert_eq!(app.preview_text(&matched), app.conversion.markdown);
    }

    #[test]
    fn test_navigation_scrolls_preview_when_focused() {
        let (mut app, _, _temp) = app_with(sample());
        app.handle_action(Action::ToggleFocus);

        app.handle_action(Action::MoveDown);
        app.handle_action(Action::MoveDown);
        assert_eq!(app.preview_scroll, 2);
        assert_eq!(app.selected_idx, 0);

        app.handle_action(Action::PageUp);
        assert_eq!(app.preview_scroll, 0);

        let last_line = app.conversion.markdown.lines().count() as u16 - 1;
        for _ in 0..20 {
            app.handle_action(Action::PageDown);
        }
        assert_eq!(app.preview_scroll, last_line);

        app.handle_action(Action::ToggleFocus);
        assert_eq!(app.preview_scroll, 0);
    }

    #[test]
    fn test_copy_selected_message() {
        let (mut app, clipboard, _temp) = app_with(sample());
        app.handle_action(Action::MoveDown);
        app.handle_action(Action::CopyMessage);

        let copied = clipboard.copied.borrow();
        assert_eq!(copied.len(), 1);
        assert!(copied[0].starts_with("### Assistant\n\n_2025-01-01 00:01:00 UTC_\n"));
        assert_eq!(app.status_message.as_ref().unwrap().message_type, MessageType::Success);
    }

    #[test]
    fn test_copy_document() {
        let (mut app, clipboard, _temp) = app_with(sample());
        app.handle_action(Action::CopyDocument);

        assert_eq!(clipboard.copied.borrow()[0], app.conversion.markdown);
        assert!(app.status_message.as_ref().unwrap().text.contains("Copied document"));
    }

    #[test]
    fn test_copy_without_messages() {
        let (mut app, clipboard, _temp) = app_with(conversion(&[]));
        app.handle_action(Action::CopyMessage);

        assert!(clipboard.copied.borrow().is_empty());
        let status = app.status_message.as_ref().unwrap();
        assert_eq!(status.message_type, MessageType::Error);
        assert!(status.text.contains("No message"));
    }

    #[test]
    fn test_clipboard_failure_reported() {
        let temp = TempDir::new().unwrap();
        let clipboard = MockClipboard { should_fail: true, ..Default::default() };
        let mut app = App::new(sample(), RenderOptions::default(), OutputConfig::new(temp.path(), "X"))
            .with_clipboard(Box::new(clipboard));
        settle(&mut app);

        app.handle_action(Action::CopyMessage);
        let status = app.status_message.as_ref().unwrap();
        assert_eq!(status.message_type, MessageType::Error);
        assert!(status.text.contains("Mock clipboard error"));
    }

    #[test]
    fn test_export_writes_document() {
        let (mut app, _, temp) = app_with(sample());
        app.handle_action(Action::Export);

        let status = app.status_message.as_ref().unwrap();
        assert_eq!(status.message_type, MessageType::Success, "{}", status.text);

        let written: Vec<_> = std::fs::read_dir(temp.path().join("out")).unwrap().collect();
        assert_eq!(written.len(), 1);
        let path = written[0].as_ref().unwrap().path();
        assert_eq!(std::fs::read_to_string(path).unwrap(), app.conversion.markdown);
    }

    #[test]
    fn test_reload_replaces_conversion() {
        let (app, _, _temp) = app_with(sample());
        let mut app = app.with_loader(Box::new(|| -> Result<Conversion> {
            Ok(conversion(&[r#"{"role":"user","content":"fresh"}"#]))
        }));
        app.handle_action(Action::MoveDown);

        app.handle_action(Action::Reload);
        settle(&mut app);

        assert_eq!(app.selected_idx, 0);
        assert_eq!(app.collect_matched_items(), vec![0]);
        assert!(app.conversion.markdown.contains("fresh"));
        assert!(app.status_message.as_ref().unwrap().text.contains("Reloaded 1 messages"));
    }

    #[test]
    fn test_reload_failure_keeps_conversion() {
        let (app, _, _temp) = app_with(sample());
        let mut app = app.with_loader(Box::new(|| -> Result<Conversion> { anyhow::bail!("disk gone") }));
        let before = app.conversion.markdown.clone();

        app.handle_action(Action::Reload);

        assert_eq!(app.conversion.markdown, before);
        let status = app.status_message.as_ref().unwrap();
        assert_eq!(status.message_type, MessageType::Error);
        assert!(status.text.contains("disk gone"));
    }

    #[test]
    fn test_reload_without_loader() {
        let (mut app, _, _temp) = app_with(sample());
        app.handle_action(Action::Reload);
        assert!(app.status_message.as_ref().unwrap().text.contains("not available"));
    }

    #[test]
    fn test_status_message_expiry() {
        let (mut app, _, _temp) = app_with(sample());

        app.set_status("Expired", MessageType::Success, 0);
        std::thread::sleep(Duration::from_millis(1));
        app.needs_redraw = false;
        app.check_and_clear_expired_status();
        assert!(app.status_message.is_none());
        assert!(app.needs_redraw);

        app.set_status("Active", MessageType::Success, 10_000);
        app.check_and_clear_expired_status();
        assert_eq!(app.status_message.as_ref().unwrap().text, "Active");
    }

    #[test]
    fn test_dirty_state_on_selection_move() {
        let (mut app, _, _temp) = app_with(sample());
        app.needs_redraw = false;

        app.handle_action(Action::MoveUp);
        assert!(!app.needs_redraw);

        app.handle_action(Action::MoveDown);
        assert!(app.needs_redraw);
    }
}
