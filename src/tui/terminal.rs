use std::io;

use anyhow::{Context, Result};
use crossterm::execute;
use crossterm::terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;

/// Raw-mode alternate screen for the lifetime of the value
///
/// The screen is restored exactly once, either by [`TerminalSession::restore`] or on drop
/// (early return, panic unwinding).
pub struct TerminalSession {
    terminal: Terminal<CrosstermBackend<io::Stdout>>,
    active: bool,
}

impl TerminalSession {
    pub fn enter() -> Result<Self> {
        enable_raw_mode().context("Failed to enable raw terminal mode")?;

        let mut stdout = io::stdout();
        if let Err(e) = execute!(stdout, EnterAlternateScreen) {
            // Undo raw mode so the shell is usable after the error is printed
            let _ = disable_raw_mode();
            return Err(e).context("Failed to enter alternate screen");
        }

        match Terminal::new(CrosstermBackend::new(stdout)) {
            Ok(terminal) => Ok(Self { terminal, active: true }),
            Err(e) => {
                // Same cleanup, now including the alternate screen
                let _ = execute!(io::stdout(), LeaveAlternateScreen);
                let _ = disable_raw_mode();
                Err(e).context("Failed to set up terminal")
            }
        }
    }

    pub fn terminal_mut(&mut self) -> &mut Terminal<CrosstermBackend<io::Stdout>> {
        &mut self.terminal
    }

    pub fn restore(mut self) -> Result<()> {
        self.leave()
    }

    fn leave(&mut self) -> Result<()> {
        // Already restored by an explicit call; drop must not do it twice
        if !self.active {
            return Ok(());
        }
        self.active = false;

        disable_raw_mode().context("Failed to disable raw terminal mode")?;
        execute!(self.terminal.backend_mut(), LeaveAlternateScreen).context("Failed to leave alternate screen")?;
        self.terminal.show_cursor().context("Failed to show cursor")?;
        Ok(())
    }
}

// Restore on every exit path, including panics and `?` returns from the event loop
impl Drop for TerminalSession {
    fn drop(&mut self) {
        // Best effort: there is nowhere to report an error while dropping
        let _ = self.leave();
    }
}
