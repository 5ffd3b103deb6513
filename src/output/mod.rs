//! Writing rendered Markdown to timestamped files
//!
//! Files are named `<prefix>-YYYYmmdd-HHMMSS.md` in local time. When that name is taken,
//! `-1`, `-2`, ... is appended before the extension. Existing files are never
//! overwritten: the file is created with `create_new`, so a name claimed between the
//! check and the write moves on to the next suffix.

use std::fs::{self, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use chrono::{DateTime, Local};

const FILE_TIMESTAMP_FORMAT: &str = "%Y%m%d-%H%M%S";
const MAX_SUFFIX: usize = 10_000;

/// Where exported documents go
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputConfig {
    pub dir: PathBuf,
    pub prefix: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self { dir: PathBuf::from("generatedMD"), prefix: "ChatHistory".to_string() }
    }
}

impl OutputConfig {
    pub fn new(dir: impl Into<PathBuf>, prefix: impl Into<String>) -> Self {
        Self { dir: dir.into(), prefix: prefix.into() }
    }

    /// Write `markdown` to a fresh file stamped with the current local time
    pub fn write(&self, markdown: &str) -> Result<PathBuf> {
        self.write_at(markdown, Local::now())
    }

    /// Write `markdown` to a fresh file stamped with `now`
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be created, the file cannot be written, or
    /// no free name is found.
    pub fn write_at(&self, markdown: &str, now: DateTime<Local>) -> Result<PathBuf> {
        fs::create_dir_all(&self.dir)
            .with_context(|| format!("Failed to create output directory: {}", self.dir.display()))?;

        let stem = file_stem(&self.prefix, now);
        for suffix in 0..MAX_SUFFIX {
            let path = self.dir.join(file_name(&stem, suffix));
            match OpenOptions::new().write(true).create_new(true).open(&path) {
                Ok(mut file) => {
                    file.write_all(markdown.as_bytes())
                        .with_context(|| format!("Failed to write output file: {}", path.display()))?;
                    return Ok(path);
                }
                Err(e) if e.kind() == ErrorKind::AlreadyExists => continue,
                Err(e) => {
                    return Err(e).with_context(|| format!("Failed to create output file: {}", path.display()));
                }
            }
        }

        bail!("No free output file name for {} in {}", stem, self.dir.display())
    }
}

fn file_stem(prefix: &str, now: DateTime<Local>) -> String {
    format!("{}-{}", prefix, now.format(FILE_TIMESTAMP_FORMAT))
}

fn file_name(stem: &str, suffix: usize) -> String {
    if suffix == 0 { format!("{stem}.md") } else { format!("{stem}-{suffix}.md") }
}

/// Whether `path` is inside the output directory (used to keep exports out of the input set)
pub fn is_inside(path: &Path, dir: &Path) -> bool {
    match (path.canonicalize(), dir.canonicalize()) {
        (Ok(path), Ok(dir)) => path.starts_with(dir),
        _ => false,
    }
}
