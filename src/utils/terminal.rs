//! Sanitizing log-derived text before it reaches the terminal
//!
//! Session logs carry whatever the tools printed, including colored output and cursor
//! movement. The previewer draws that text inside a ratatui frame, where a stray escape
//! sequence would corrupt the screen, so everything shown goes through
//! [`sanitize_for_terminal`] first. The Markdown written to files is left untouched.

/// Removes terminal escape sequences and control characters
///
/// Handles CSI sequences (`ESC [ ... final`), OSC sequences (`ESC ] ... BEL` or
/// `ESC ] ... ESC \`) and two-character escapes. Tabs and newlines are kept; carriage
/// returns and other control characters are dropped.
///
/// # Examples
///
/// ```
/// use chatlog_md::utils::terminal::sanitize_for_terminal;
///
/// assert_eq!(sanitize_for_terminal("\x1b[31mRed\x1b[0m text"), "Red text");
/// ```
pub fn sanitize_for_terminal(text: &str) -> String {
    let mut result = String::with_capacity(text.len());
    let mut chars = text.chars().peekable();

    while let Some(ch) = chars.next() {
        if ch == '\x1b' {
            match chars.next() {
                Some('[') => {
                    // Parameters and intermediates, then a final byte in @..~
                    for next in chars.by_ref() {
                        if ('@'..='~').contains(&next) {
                            break;
                        }
                    }
                }
                Some(']') => {
                    while let Some(next) = chars.next() {
                        if next == '\x07' {
                            break;
                        }
                        if next == '\x1b' {
                            if chars.peek() == Some(&'\\') {
                                chars.next();
                            }
                            break;
                        }
                    }
                }
                _ => {}
            }
            continue;
        }

        if ch.is_control() && ch != '\t' && ch != '\n' {
            continue;
        }

        result.push(ch);
    }

    result
}
