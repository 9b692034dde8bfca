//! The signed-in user's session.
//!
//! A [`Session`] pairs the authenticated user with the [`UserView`] derived
//! from the question store. The view is rebuilt from the store by
//! [`Session::refresh`] after every mutation rather than patched in place, so
//! it can never point at a question the store no longer holds.

use crate::models::{Question, QuestionId, User, UserView};
use crate::storage::QuestionStore;

#[derive(Debug, Clone)]
pub struct Session {
    pub user: User,
    view: UserView,
}

/// Build the session for a freshly authenticated user.
pub fn assemble(user: User, questions: &QuestionStore) -> Session {
    let view = questions.build_thread_index(user.id);
    tracing::debug!(
        user_id = user.id,
        asked = view.asked.len(),
        received = view.received.len(),
        threads = view.threads.len(),
        "Assembled session"
    );
    Session { user, view }
}

impl Session {
    pub fn view(&self) -> &UserView {
        &self.view
    }

    /// Recompute the view from the canonical store.
    pub fn refresh(&mut self, questions: &QuestionStore) {
        self.view = questions.build_thread_index(self.user.id);
    }

    /// Received root questions with their thread replies, ascending by root id.
    pub fn threads<'a>(
        &'a self,
        questions: &'a QuestionStore,
    ) -> impl Iterator<Item = (&'a Question, Vec<&'a Question>)> + 'a {
        self.view.threads.iter().filter_map(move |(root_id, replies)| {
            questions
                .get(*root_id)
                .map(|root| (root, questions.get_by_ids(replies)))
        })
    }

    /// Questions this user asked, in store order.
    pub fn asked<'a>(&self, questions: &'a QuestionStore) -> Vec<&'a Question> {
        questions.get_by_ids(&self.view.asked)
    }

    pub fn has_thread(&self, root_id: QuestionId) -> bool {
        self.view.threads.contains_key(&root_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::NewQuestion;
    use crate::test_utils::TestEnv;

    fn session_for(env: &TestEnv, questions: &QuestionStore, username: &str) -> Session {
        let user = env.user_store().find_by_name(username).cloned().unwrap();
        assemble(user, questions)
    }

    #[test]
    fn test_assemble_populates_view() {
        let env = TestEnv::with_sample_data();
        let questions = env.question_store();
        let session = session_for(&env, &questions, "ali");

        assert_eq!(session.view().thread(101), Some(&[203, 205, 300, 302][..]));
        assert_eq!(session.view().asked, vec![211, 212]);
        assert!(session.has_thread(301));
        assert!(!session.has_thread(203));
    }

    #[test]
    fn test_threads_pairs_roots_with_replies() {
        let env = TestEnv::with_sample_data();
        let questions = env.question_store();
        let session = session_for(&env, &questions, "ali");

        let threads: Vec<(QuestionId, Vec<QuestionId>)> = session
            .threads(&questions)
            .map(|(root, replies)| (root.id, replies.iter().map(|q| q.id).collect()))
            .collect();

        assert_eq!(
            threads,
            vec![(101, vec![203, 205, 300, 302]), (301, vec![])]
        );
    }

    #[test]
    fn test_refresh_after_ask_and_delete() {
        let env = TestEnv::with_sample_data();
        let mut questions = env.question_store();
        let mut session = session_for(&env, &questions, "ali");

        let asked = questions
            .create(NewQuestion {
                parent_id: None,
                from_user_id: 13,
                to_user_id: 11,
                recipient_allows_anonymous: true,
                text: "Coffee?".to_string(),
            })
            .unwrap();
        session.refresh(&questions);
        assert!(session.view().asked.contains(&asked.id));

        questions.delete(205, session.view()).unwrap();
        session.refresh(&questions);
        assert_eq!(session.view().thread(101), Some(&[203, 300, 302][..]));

        questions.delete(101, session.view()).unwrap();
        session.refresh(&questions);
        assert!(!session.has_thread(101));
        assert_eq!(session.view().received, vec![301]);
    }

    #[test]
    fn test_asked_in_store_order() {
        let env = TestEnv::with_sample_data();
        let questions = env.question_store();
        let session = session_for(&env, &questions, "mostafa");

        let ids: Vec<QuestionId> = session.asked(&questions).iter().map(|q| q.id).collect();
        assert_eq!(ids, vec![101, 203, 300, 301, 302]);
    }
}
