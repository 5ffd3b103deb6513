//! Locating and reading session files

use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use glob::{MatchOptions, Pattern};
use tracing::{debug, warn};
use walkdir::WalkDir;

use super::SourceInput;
use crate::utils::validate_file_size;

/// Extensions accepted when `--path` names a single file
const SINGLE_FILE_EXTENSIONS: &[&str] = &["jsonl", "md", "markdown", "txt"];

const MATCH_OPTIONS: MatchOptions =
    MatchOptions { case_sensitive: true, require_literal_separator: true, require_literal_leading_dot: false };

/// Find input files under `root`
///
/// A file with a known extension is returned as is. A directory is walked recursively
/// (symlinks are not followed) and every file whose path relative to `root` matches
/// `pattern` is returned. Results are sorted. A missing `root` yields an empty list.
///
/// # Errors
///
/// Returns an error if `pattern` is not a valid glob.
pub fn find_session_files(root: &Path, pattern: &str) -> Result<Vec<PathBuf>> {
    let glob = Pattern::new(pattern).with_context(|| format!("Invalid glob pattern: {}", pattern))?;

    if root.is_file() {
        let known = root
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| SINGLE_FILE_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()));
        if known {
            return Ok(vec![root.to_path_buf()]);
        }
        warn!("Ignoring {}: unsupported file extension", root.display());
        return Ok(Vec::new());
    }

    if !root.is_dir() {
        warn!("Path not found: {}", root.display());
        return Ok(Vec::new());
    }

    let mut files = Vec::new();
    for entry in WalkDir::new(root).follow_links(false) {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                warn!("Skipping unreadable entry under {}: {}", root.display(), e);
                continue;
            }
        };
        // Symlinks are reported as links here, never as files
        if !entry.file_type().is_file() {
            continue;
        }
        // Patterns are relative to the root, like `**/*.jsonl`
        let Ok(relative) = entry.path().strip_prefix(root) else {
            continue;
        };
        if glob.matches_path_with(relative, MATCH_OPTIONS) {
            files.push(entry.into_path());
        }
    }

    files.sort();
    debug!("Found {} files under {}", files.len(), root.display());
    Ok(files)
}

/// Read one file into a [`SourceInput`] named after its file name
///
/// # Errors
///
/// Returns an error if the file cannot be opened or read, exceeds the size limit, or is
/// not valid UTF-8.
pub fn read_source(path: &Path) -> Result<SourceInput> {
    let mut file = File::open(path).with_context(|| format!("Failed to open file: {}", path.display()))?;
    validate_file_size(&file, path)?;

    let mut bytes = Vec::new();
    file.read_to_end(&mut bytes).with_context(|| format!("Failed to read file: {}", path.display()))?;

    let text = match String::from_utf8(bytes) {
        Ok(text) => text,
        Err(e) => bail!("File is not valid UTF-8: {} ({})", path.display(), e.utf8_error()),
    };

    let name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());

    Ok(SourceInput::new(name, text))
}

/// Read every path, warning about and skipping the ones that fail
pub fn read_sources(paths: &[PathBuf]) -> Vec<SourceInput> {
    paths
        .iter()
        .filter_map(|path| match read_source(path) {
            Ok(source) => Some(source),
            Err(e) => {
                warn!("Skipping {}: {:#}", path.display(), e);
                None
            }
        })
        .collect()
}
