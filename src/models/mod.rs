//! Data models for askme entities.
//!
//! This module defines the core data structures:
//! - `User` - A registered account
//! - `Question` - A question from one user to another, optionally a reply in a thread
//! - `UserView` - The per-session indexes derived from the question store

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Identifier of a registered user.
pub type UserId = i64;

/// Identifier of a question.
pub type QuestionId = i64;

/// On-disk and prompt sentinel meaning "no parent" or "cancel".
pub const NO_ID: i64 = -1;

/// A registered account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub username: String,

    /// Stored and compared as plain text.
    #[serde(skip_serializing)]
    pub password: String,

    pub name: String,
    pub email: String,

    /// Whether other users may ask this user anonymous questions
    pub allow_anonymous_questions: bool,
}

/// Fields collected at sign-up, before an id is assigned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUser {
    pub username: String,
    pub password: String,
    pub name: String,
    pub email: String,
    pub allow_anonymous_questions: bool,
}

impl NewUser {
    /// Attach an id, producing the stored user.
    pub fn with_id(self, id: UserId) -> User {
        User {
            id,
            username: self.username,
            password: self.password,
            name: self.name,
            email: self.email,
            allow_anonymous_questions: self.allow_anonymous_questions,
        }
    }
}

impl fmt::Display for User {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ID: {}\t\tName: {}", self.id, self.name)
    }
}

/// A question addressed from one user to another.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    pub id: QuestionId,

    /// Root of the thread this question replies to, `None` for a root question
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<QuestionId>,

    pub from_user_id: UserId,
    pub to_user_id: UserId,

    /// Copied from the recipient's `allow_anonymous_questions` at creation
    pub is_anonymous: bool,

    pub text: String,

    /// Empty until answered
    #[serde(default)]
    pub answer: String,
}

impl Question {
    /// A question without a parent anchors a thread.
    pub fn is_root(&self) -> bool {
        self.parent_id.is_none()
    }

    pub fn is_answered(&self) -> bool {
        !self.answer.is_empty()
    }
}

/// Fields needed to create a question; the store assigns the id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewQuestion {
    pub parent_id: Option<QuestionId>,
    pub from_user_id: UserId,
    pub to_user_id: UserId,
    pub recipient_allows_anonymous: bool,
    pub text: String,
}

/// Root question id mapped to its replies in ascending id order.
pub type ThreadMap = BTreeMap<QuestionId, Vec<QuestionId>>;

/// Session-scoped indexes over the question store for a single user.
///
/// Holds no data of its own: every id refers back to the canonical store and
/// the whole view can be rebuilt from it at any time.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct UserView {
    /// Questions this user authored
    pub asked: Vec<QuestionId>,

    /// Questions addressed to this user
    pub received: Vec<QuestionId>,

    /// Received root questions and their replies
    pub threads: ThreadMap,
}

impl UserView {
    /// Replies recorded for `root_id`, if it is one of the user's received roots.
    pub fn thread(&self, root_id: QuestionId) -> Option<&[QuestionId]> {
        self.threads.get(&root_id).map(Vec::as_slice)
    }
}
