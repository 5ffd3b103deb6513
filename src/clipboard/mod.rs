//! Copying rendered Markdown to the system clipboard
//!
//! The previewer holds one [`ClipboardProvider`] for its whole run. On X11 and Wayland the
//! copied text is served by the process that set it, so the arboard handle behind
//! [`SystemClipboard`] is created lazily and then kept.

use anyhow::{Context, Result, bail};
use arboard::Clipboard;

/// Maximum clipboard payload (10MB)
pub const MAX_CLIPBOARD_SIZE: usize = 10 * 1024 * 1024;

/// Sink for copied text (the system clipboard, or a mock in tests)
pub trait ClipboardProvider {
    fn set_text(&mut self, text: &str) -> Result<()>;
}

/// arboard-backed clipboard, opened on first use
#[derive(Default)]
pub struct SystemClipboard {
    clipboard: Option<Clipboard>,
}

impl SystemClipboard {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ClipboardProvider for SystemClipboard {
    fn set_text(&mut self, text: &str) -> Result<()> {
        let clipboard = match &mut self.clipboard {
            Some(clipboard) => clipboard,
            slot => slot.insert(Clipboard::new().context("Failed to initialize clipboard")?),
        };
        clipboard.set_text(text).context("Failed to set clipboard contents")?;
        Ok(())
    }
}

/// Checks that `text` is non-empty and within [`MAX_CLIPBOARD_SIZE`] bytes
pub fn validate_clipboard_text(text: &str) -> Result<()> {
    if text.is_empty() {
        bail!("Cannot copy empty text to clipboard");
    }

    if text.len() > MAX_CLIPBOARD_SIZE {
        bail!("Text too large for clipboard ({} bytes, max {})", text.len(), MAX_CLIPBOARD_SIZE);
    }

    Ok(())
}

/// Validate `text`, then hand it to `provider`
pub fn copy_with_provider(text: &str, provider: &mut dyn ClipboardProvider) -> Result<()> {
    validate_clipboard_text(text)?;
    provider.set_text(text)
}

/// Copy text to a fresh system clipboard handle
///
/// # Errors
/// Returns error if:
/// - Text is empty or larger than 10MB
/// - The system clipboard is unavailable (headless session) or refuses the write
pub fn copy_to_clipboard(text: &str) -> Result<()> {
    copy_with_provider(text, &mut SystemClipboard::new())
}
