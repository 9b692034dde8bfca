//! Registered users and their append-only file.

use super::codec::Record;
use super::lines::{WriteMode, write_all_lines};
use super::{LoadReport, load_records};
use crate::models::{NewUser, User, UserId};
use crate::{Error, Result};
use std::path::{Path, PathBuf};

/// All registered users, loaded once at startup.
#[derive(Debug)]
pub struct UserStore {
    path: PathBuf,
    users: Vec<User>,
    last_max_id: UserId,
    report: LoadReport,
}

impl UserStore {
    /// Load users from `path`.
    ///
    /// A missing or unreadable file yields an empty store, and malformed lines
    /// are skipped; both are recorded in [`UserStore::load_report`].
    pub fn load(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let (records, report) = load_records::<User>(&path);
        let users: Vec<User> = records.into_iter().map(|(_, user)| user).collect();
        let last_max_id = users.iter().map(|u| u.id).max().unwrap_or(-1);

        tracing::debug!(path = %path.display(), count = users.len(), "Loaded users");

        Self {
            path,
            users,
            last_max_id,
            report,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn load_report(&self) -> &LoadReport {
        &self.report
    }

    /// Users in file order.
    pub fn all(&self) -> &[User] {
        &self.users
    }

    pub fn len(&self) -> usize {
        self.users.len()
    }

    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }

    /// Highest id seen so far, -1 when no user exists.
    pub fn last_max_id(&self) -> UserId {
        self.last_max_id
    }

    /// First user whose username and password both match exactly.
    pub fn find_by_credentials(&self, username: &str, password: &str) -> Option<&User> {
        self.users
            .iter()
            .find(|u| u.username == username && u.password == password)
    }

    pub fn find_by_name(&self, username: &str) -> Option<&User> {
        self.users.iter().find(|u| u.username == username)
    }

    pub fn find_by_id(&self, id: UserId) -> Option<&User> {
        self.users.iter().find(|u| u.id == id)
    }

    /// Register a new user and append it to the users file.
    ///
    /// The in-memory collection only changes once the append succeeded.
    pub fn register(&mut self, new_user: NewUser) -> Result<User> {
        if self.find_by_name(&new_user.username).is_some() {
            return Err(Error::DuplicateUsername(new_user.username));
        }

        let user = new_user.with_id(super::next_id(self.last_max_id, "user")?);
        write_all_lines(&self.path, &[user.encode()], WriteMode::Append)?;

        self.last_max_id = user.id;
        self.users.push(user.clone());
        tracing::debug!(id = user.id, username = %user.username, "Registered user");

        Ok(user)
    }
}
