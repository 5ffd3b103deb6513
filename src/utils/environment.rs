use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

/// Default input location: `~/.codex/sessions`
pub fn default_sessions_dir() -> Result<PathBuf> {
    let home = dirs::home_dir().context("Could not determine home directory")?;
    Ok(sessions_dir_in(&home))
}

fn sessions_dir_in(home: &Path) -> PathBuf {
    home.join(".codex").join("sessions")
}
