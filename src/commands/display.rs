//! Console rendering of questions.

use crate::models::Question;

pub const NOT_ANSWERED_MSG: &str = "NOT answered YET!";

fn sender(q: &Question) -> String {
    if q.is_anonymous {
        "anonymous".to_string()
    } else {
        q.from_user_id.to_string()
    }
}

fn headline(q: &Question) -> String {
    format!(
        "Question Id ({}) from user id ({})\t Question: {}",
        q.id,
        sender(q),
        q.text
    )
}

/// A question with its answer, if any.
pub fn question(q: &Question) -> String {
    if q.is_answered() {
        format!("{}\n\t Answer: {}", headline(q), q.answer)
    } else {
        headline(q)
    }
}

/// A question the viewer asked; unanswered ones say so.
pub fn asked_question(q: &Question) -> String {
    if q.is_answered() {
        question(q)
    } else {
        format!("{}\n\t {}", headline(q), NOT_ANSWERED_MSG)
    }
}

/// A reply shown beneath its thread root.
pub fn thread_reply(q: &Question) -> String {
    let mut out = format!("\t Thread: {}", headline(q));
    if q.is_answered() {
        out.push_str(&format!("\n\t Thread: \t Answer: {}", q.answer));
    }
    out
}
