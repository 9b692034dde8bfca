//! The canonical question store.
//!
//! Questions live in an id-ordered map that is the single source of truth;
//! every per-user index is derived from it by [`QuestionStore::build_thread_index`].
//! Each mutation rewrites the whole backing file. If that write fails the
//! mutation is undone, so memory and disk never disagree.

use super::codec::Record;
use super::lines::{WriteMode, write_all_lines};
use super::{LoadReport, load_records};
use crate::models::{NewQuestion, Question, QuestionId, UserId, UserView};
use crate::{Error, Result};
use std::collections::btree_map::Entry;
use std::collections::{BTreeMap, HashSet};
use std::path::{Path, PathBuf};

fn not_found(id: QuestionId) -> Error {
    Error::NotFound(format!("Question not found: {}", id))
}

/// All questions keyed by id.
#[derive(Debug)]
pub struct QuestionStore {
    path: PathBuf,
    questions: BTreeMap<QuestionId, Question>,
    last_max_id: QuestionId,
    report: LoadReport,
}

impl QuestionStore {
    /// Load questions from `path`.
    ///
    /// A missing or unreadable file yields an empty store. When two rows share
    /// an id the first one wins and the later row is reported as malformed.
    pub fn load(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let (records, mut report) = load_records::<Question>(&path);

        let mut questions = BTreeMap::new();
        for (line, question) in records {
            match questions.entry(question.id) {
                Entry::Vacant(slot) => {
                    slot.insert(question);
                }
                Entry::Occupied(_) => {
                    let e = Error::MalformedRecord {
                        line,
                        reason: format!("duplicate question id {}", question.id),
                    };
                    tracing::warn!(path = %path.display(), "{}", e);
                    report.malformed.push(e);
                }
            }
        }

        let last_max_id = questions.keys().next_back().copied().unwrap_or(-1);
        tracing::debug!(path = %path.display(), count = questions.len(), "Loaded questions");

        Self {
            path,
            questions,
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

    pub fn len(&self) -> usize {
        self.questions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }

    /// Highest id assigned so far, -1 for a store that never held a question.
    pub fn last_max_id(&self) -> QuestionId {
        self.last_max_id
    }

    pub fn get(&self, id: QuestionId) -> Option<&Question> {
        self.questions.get(&id)
    }

    pub fn contains(&self, id: QuestionId) -> bool {
        self.questions.contains_key(&id)
    }

    /// All questions in ascending id order.
    pub fn iter(&self) -> impl Iterator<Item = &Question> {
        self.questions.values()
    }

    /// Questions whose id is in `ids`.
    ///
    /// Results come back in store order (ascending id), not in the order of
    /// `ids`. Unknown ids are skipped and each question appears at most once.
    pub fn get_by_ids(&self, ids: &[QuestionId]) -> Vec<&Question> {
        let wanted: HashSet<QuestionId> = ids.iter().copied().collect();
        self.questions
            .values()
            .filter(|q| wanted.contains(&q.id))
            .collect()
    }

    /// Build the asked/received/thread indexes for `user_id`.
    ///
    /// Every received root gets a bucket, then every reply whose parent owns a
    /// bucket is added to it in ascending id order. Replies to any other
    /// question are not threaded for this user.
    pub fn build_thread_index(&self, user_id: UserId) -> UserView {
        let mut view = UserView::default();

        for question in self.questions.values() {
            if question.from_user_id == user_id {
                view.asked.push(question.id);
            }
            if question.to_user_id == user_id {
                view.received.push(question.id);
                if question.is_root() {
                    view.threads.insert(question.id, Vec::new());
                }
            }
        }

        for question in self.questions.values() {
            if let Some(parent_id) = question.parent_id
                && let Some(bucket) = view.threads.get_mut(&parent_id)
            {
                bucket.push(question.id);
            }
        }

        view
    }

    /// Create a question and persist the store.
    ///
    /// The parent is not required to exist; callers check that. An unknown
    /// parent is stored as given and logged.
    pub fn create(&mut self, new: NewQuestion) -> Result<Question> {
        if let Some(parent_id) = new.parent_id
            && !self.contains(parent_id)
        {
            tracing::warn!(parent_id, "Creating a reply to a question that does not exist");
        }

        let question = Question {
            id: super::next_id(self.last_max_id, "question")?,
            parent_id: new.parent_id,
            from_user_id: new.from_user_id,
            to_user_id: new.to_user_id,
            is_anonymous: new.recipient_allows_anonymous,
            text: new.text,
            answer: String::new(),
        };

        self.questions.insert(question.id, question.clone());
        if let Err(e) = self.persist() {
            self.questions.remove(&question.id);
            return Err(e);
        }
        self.last_max_id = question.id;

        tracing::debug!(id = question.id, parent_id = ?question.parent_id, "Created question");
        Ok(question)
    }

    /// Answer question `id` and persist the store.
    ///
    /// Empty `text` keeps the current answer, so a question can be viewed
    /// through the answer flow without changing it. Otherwise the answer is
    /// replaced, even if one already exists.
    pub fn answer(&mut self, id: QuestionId, text: &str) -> Result<Question> {
        let question = self.questions.get_mut(&id).ok_or_else(|| not_found(id))?;
        let previous = if text.is_empty() {
            None
        } else {
            Some(std::mem::replace(&mut question.answer, text.to_string()))
        };

        if let Err(e) = self.persist() {
            if let (Some(previous), Some(question)) = (previous, self.questions.get_mut(&id)) {
                question.answer = previous;
            }
            return Err(e);
        }

        self.get(id).cloned().ok_or_else(|| not_found(id))
    }

    /// Delete question `id` and persist the store.
    ///
    /// Deleting a root that has a thread in `view` also deletes every reply in
    /// that thread. Returns the removed ids, the requested one first.
    pub fn delete(&mut self, id: QuestionId, view: &UserView) -> Result<Vec<QuestionId>> {
        let target = self.questions.get(&id).ok_or_else(|| not_found(id))?;

        let mut doomed = vec![id];
        if target.is_root()
            && let Some(replies) = view.thread(id)
        {
            doomed.extend_from_slice(replies);
        }

        let removed: Vec<Question> = doomed
            .iter()
            .filter_map(|qid| self.questions.remove(qid))
            .collect();

        if let Err(e) = self.persist() {
            for question in removed {
                self.questions.insert(question.id, question);
            }
            return Err(e);
        }

        let ids: Vec<QuestionId> = removed.iter().map(|q| q.id).collect();
        tracing::debug!(?ids, "Deleted questions");
        Ok(ids)
    }

    /// Rewrite the backing file from the in-memory map, in ascending id order.
    pub fn persist(&self) -> Result<()> {
        let lines: Vec<String> = self.questions.values().map(Record::encode).collect();
        write_all_lines(&self.path, &lines, WriteMode::Overwrite).inspect_err(|e| {
            tracing::warn!(path = %self.path.display(), "Failed to save questions: {}", e);
        })
    }

    /// Every answered question, in ascending id order.
    pub fn answered_feed(&self) -> impl Iterator<Item = &Question> {
        self.questions.values().filter(|q| q.is_answered())
    }
}
