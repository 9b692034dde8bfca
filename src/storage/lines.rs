//! Line-oriented file primitives used by the stores.

use crate::{Error, Result};
use std::fs::{self, File, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::Path;
use tempfile::NamedTempFile;

/// How `write_all_lines` treats existing file contents.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteMode {
    /// Add lines to the end of the file, creating it if missing.
    Append,
    /// Replace the whole file. The replacement is atomic: readers see either
    /// the old contents or the new, never a partial write.
    Overwrite,
}

/// Read every line of `path`.
///
/// Fails with `FileUnreadable` if the file cannot be opened or read; callers
/// decide whether that is fatal.
pub fn read_all_lines(path: &Path) -> Result<Vec<String>> {
    let unreadable = |source| Error::FileUnreadable {
        path: path.to_path_buf(),
        source,
    };

    let file = File::open(path).map_err(unreadable)?;
    BufReader::new(file)
        .lines()
        .collect::<std::io::Result<Vec<_>>>()
        .map_err(unreadable)
}

/// Write `lines` to `path`, one per line.
pub fn write_all_lines(path: &Path, lines: &[String], mode: WriteMode) -> Result<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    fs::create_dir_all(dir)?;

    match mode {
        WriteMode::Append => {
            let mut file = OpenOptions::new().create(true).append(true).open(path)?;
            for line in lines {
                writeln!(file, "{}", line)?;
            }
            file.flush()?;
        }
        WriteMode::Overwrite => {
            // Temp file in the same directory so the rename stays on one filesystem
            let mut tmp = NamedTempFile::new_in(dir)?;
            for line in lines {
                writeln!(tmp, "{}", line)?;
            }
            tmp.as_file().sync_all()?;
            tmp.persist(path).map_err(|e| Error::Io(e.error))?;
        }
    }
    Ok(())
}

/// Split `text` on `delimiter`.
///
/// Every delimiter separates two fields, so `"a,,b"` yields three fields and
/// `"a,"` yields two (the second empty).
pub fn split_fields(text: &str, delimiter: char) -> Vec<&str> {
    text.split(delimiter).collect()
}
