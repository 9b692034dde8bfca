//! Storage layer for askme data.
//!
//! This module handles persistence of users and questions as flat text files:
//!
//! - `users.txt` - one user per line, append-only (registration is the only write)
//! - `questions.txt` - one question per line, rewritten in full on every change
//!
//! Both files are read completely at startup. See [`codec`] for the line format.

pub mod codec;
pub mod lines;
pub mod questions;
pub mod users;

pub use codec::Record;
pub use lines::{WriteMode, read_all_lines, split_fields, write_all_lines};
pub use questions::QuestionStore;
pub use users::UserStore;

use crate::{Error, Result};
use std::path::{Path, PathBuf};

/// Problems found while loading a store file.
///
/// Loading never fails outright; the store comes up with whatever could be read.
#[derive(Debug, Default)]
pub struct LoadReport {
    /// Set when the file could not be read at all
    pub unreadable: Option<Error>,
    /// Lines that could not be decoded, with their line numbers
    pub malformed: Vec<Error>,
}

impl LoadReport {
    pub fn is_clean(&self) -> bool {
        self.unreadable.is_none() && self.malformed.is_empty()
    }

    /// One message per problem, for display to the user.
    pub fn warnings(&self) -> Vec<String> {
        self.unreadable
            .iter()
            .chain(self.malformed.iter())
            .map(|e| e.to_string())
            .collect()
    }
}

/// Read and decode every record in `path`, each paired with its 1-based line.
///
/// Blank lines are ignored. Malformed lines are skipped individually so a
/// single bad row never hides the rest of the file.
pub(crate) fn load_records<T: Record>(path: &Path) -> (Vec<(usize, T)>, LoadReport) {
    let mut report = LoadReport::default();

    let lines = match read_all_lines(path) {
        Ok(lines) => lines,
        Err(e) => {
            if path.exists() {
                tracing::warn!("{}", e);
            } else {
                tracing::debug!(path = %path.display(), "No file yet, starting empty");
            }
            report.unreadable = Some(e);
            return (Vec::new(), report);
        }
    };

    let mut records = Vec::with_capacity(lines.len());
    for (idx, line) in lines.iter().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        match T::decode(line) {
            Ok(record) => records.push((idx + 1, record)),
            Err(e) => {
                let e = e.at_line(idx + 1);
                tracing::warn!(path = %path.display(), "{}", e);
                report.malformed.push(e);
            }
        }
    }

    (records, report)
}

/// The id following `last`. Ids never wrap, so an exhausted range is an error.
pub(crate) fn next_id(last: i64, kind: &str) -> Result<i64> {
    last.checked_add(1)
        .ok_or_else(|| Error::Other(format!("No {} ids left after {}", kind, last)))
}

/// Environment variable overriding the data directory.
pub const DATA_DIR_ENV: &str = "ASKME_DATA_DIR";

/// Default directory holding the users, questions and config files.
///
/// `~/.local/share/askme` on Linux, the platform equivalent elsewhere.
pub fn default_data_dir() -> Result<PathBuf> {
    dirs::data_dir()
        .map(|dir| dir.join("askme"))
        .ok_or_else(|| Error::Other("Could not determine data directory".to_string()))
}

/// Resolve `file` against `data_dir` unless it is already absolute.
pub fn resolve_in(data_dir: &Path, file: &Path) -> PathBuf {
    if file.is_absolute() {
        file.to_path_buf()
    } else {
        data_dir.join(file)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::User;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_load_records_skips_blank_and_reports_malformed() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("users.txt");
        fs::write(&path, "1,a,pw,A,a@x,0\n\n2,b,pw\n3,c,pw,C,c@x,1\n").unwrap();

        let (users, report) = load_records::<User>(&path);

        let found: Vec<(usize, i64)> = users.iter().map(|(line, u)| (*line, u.id)).collect();
        assert_eq!(found, vec![(1, 1), (4, 3)]);
        assert!(report.unreadable.is_none());
        assert_eq!(report.malformed.len(), 1);
        assert!(report.warnings()[0].contains("line 3"));
    }

    #[test]
    fn test_load_records_unreadable() {
        let dir = TempDir::new().unwrap();
        let (users, report) = load_records::<User>(&dir.path().join("missing.txt"));

        assert!(users.is_empty());
        assert!(!report.is_clean());
        assert!(report.warnings()[0].contains("Can't read from file"));
    }

    #[test]
    fn test_next_id() {
        assert_eq!(next_id(-1, "user").unwrap(), 0);
        assert_eq!(next_id(302, "question").unwrap(), 303);
        assert!(matches!(next_id(i64::MAX, "question"), Err(Error::Other(_))));
    }

    #[test]
    fn test_resolve_in() {
        let base = Path::new("/data/askme");
        assert_eq!(
            resolve_in(base, Path::new("users.txt")),
            PathBuf::from("/data/askme/users.txt")
        );
        assert_eq!(
            resolve_in(base, Path::new("/elsewhere/q.txt")),
            PathBuf::from("/elsewhere/q.txt")
        );
    }
}
