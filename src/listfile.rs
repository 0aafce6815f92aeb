//! Plain-text list files: one entry per line.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use crate::Result;

/// Read a list file.
///
/// Lines are trimmed and blank lines skipped. A missing file is an empty list.
pub fn read_list(path: impl AsRef<Path>) -> Result<Vec<String>> {
    let path = path.as_ref();
    if !path.exists() {
        return Ok(Vec::new());
    }

    let content = fs::read_to_string(path)?;
    Ok(parse_lines(&content))
}

/// Read a list file, logging any error and falling back to an empty list.
pub fn load_list(path: impl AsRef<Path>) -> Vec<String> {
    let path = path.as_ref();
    log::info!("loading domain list {:?}...", path);
    let entries = read_list(path).unwrap_or_else(|e| {
        log::error!("{:?}: {}", path, e);
        Vec::new()
    });
    log::info!("domain list: {}", entries.len());
    entries
}

/// Split text into trimmed, non-empty lines.
pub fn parse_lines(content: &str) -> Vec<String> {
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}

/// A list written to its temporary file but not yet moved into place.
///
/// Dropping it without [`StagedList::commit`] removes the temporary file and
/// leaves the target untouched.
#[derive(Debug)]
pub struct StagedList {
    temp_path: PathBuf,
    path: PathBuf,
    committed: bool,
}

impl StagedList {
    /// Target file the list replaces on commit.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Rename the temporary file over the target.
    pub fn commit(mut self) -> Result<()> {
        fs::rename(&self.temp_path, &self.path)?;
        self.committed = true;
        Ok(())
    }
}

impl Drop for StagedList {
    fn drop(&mut self) {
        if !self.committed {
            let _ = fs::remove_file(&self.temp_path);
        }
    }
}

/// Write entries, one per line, to the temporary sibling of `path`.
///
/// Returns `None` for an empty list; nothing is written then. Fails without
/// touching `path` when the target cannot be replaced by a file.
pub fn stage_list<S: AsRef<str>>(
    path: impl AsRef<Path>,
    entries: &[S],
) -> Result<Option<StagedList>> {
    let path = path.as_ref();
    if entries.is_empty() {
        return Ok(None);
    }

    if path.is_dir() {
        return Err(io::Error::new(
            io::ErrorKind::Other,
            format!("{} is a directory", path.display()),
        )
        .into());
    }
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }

    let staged = StagedList {
        temp_path: temp_path_for(path),
        path: path.to_path_buf(),
        committed: false,
    };
    let mut file = fs::File::create(&staged.temp_path)?;
    for entry in entries {
        writeln!(file, "{}", entry.as_ref())?;
    }
    file.sync_all()?;

    Ok(Some(staged))
}

/// Replace `path` with the given entries, one per line.
///
/// Nothing is written for an empty list, and an existing file is left alone.
/// Otherwise the list goes to a temporary file first and is renamed into
/// place, so readers never see a half-written list.
///
/// Returns whether the file was written.
pub fn write_list<S: AsRef<str>>(path: impl AsRef<Path>, entries: &[S]) -> Result<bool> {
    match stage_list(path, entries)? {
        Some(staged) => {
            staged.commit()?;
            Ok(true)
        }
        None => Ok(false),
    }
}

/// Sibling temporary path: `black.txt` -> `black.txt.tmp`.
pub(crate) fn temp_path_for(path: &Path) -> PathBuf {
    let mut name = path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}
