use std::fs::File;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};

const MAX_FILE_SIZE_BYTES: u64 = 64 * 1024 * 1024;

/// Refuse input files over 64 MiB
///
/// Checks the open handle, so the size seen is the size of the file about to be read.
pub fn validate_file_size(file: &File, path: &Path) -> Result<()> {
    let len = file
        .metadata()
        .with_context(|| format!("Failed to read file metadata: {}", path.display()))?
        .len();

    if len > MAX_FILE_SIZE_BYTES {
        bail!("File too large: {} ({} bytes, limit {} bytes)", path.display(), len, MAX_FILE_SIZE_BYTES);
    }
    Ok(())
}

/// Replace a leading `~` component with the home directory
pub fn expand_tilde(path: &Path) -> PathBuf {
    expand_tilde_internal(path, dirs::home_dir().as_deref())
}

fn expand_tilde_internal(path: &Path, home: Option<&Path>) -> PathBuf {
    match (home, path.strip_prefix("~")) {
        (Some(home), Ok(rest)) => home.join(rest),
        _ => path.to_path_buf(),
    }
}

/// Display form of `path` with the home directory shown as `~`
///
/// ```no_run
/// use std::path::Path;
/// use chatlog_md::format_path_with_tilde;
///
/// // "~/generatedMD/ChatHistory.md" when the home directory is /Users/alice
/// let shown = format_path_with_tilde(Path::new("/Users/alice/generatedMD/ChatHistory.md"));
/// ```
pub fn format_path_with_tilde(path: &Path) -> String {
    format_path_with_tilde_internal(path, dirs::home_dir().as_deref())
}

pub(crate) fn format_path_with_tilde_internal(path: &Path, home: Option<&Path>) -> String {
    match home.filter(|h| !h.as_os_str().is_empty()).map(|h| path.strip_prefix(h)) {
        Some(Ok(rest)) if rest.as_os_str().is_empty() => "~".to_string(),
        Some(Ok(rest)) => Path::new("~").join(rest).display().to_string(),
        _ => path.display().to_string(),
    }
}
