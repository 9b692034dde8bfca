//! Delimited text encoding for users and questions.
//!
//! One record per line, fields joined by a comma, no header and no escaping:
//!
//! - users: `id,username,password,name,email,allow_anonymous_questions`
//! - questions: `id,parent_question_id,from_user_id,to_user_id,is_anonymous,question_text,answer_text,`
//!
//! Question lines end with a trailing delimiter. Text containing a comma does
//! not survive a round trip; that is a known limitation of the format.

use super::lines::split_fields;
use crate::models::{NO_ID, Question, User};
use crate::{Error, Result};

pub const DELIMITER: char = ',';

/// A type stored as a single delimited line.
pub trait Record: Sized {
    /// Number of fields in an encoded line.
    const FIELDS: usize;

    fn encode(&self) -> String;

    /// Decode one line. Errors are `MalformedRecord` with line 0; loaders
    /// attach the real line number with [`Error::at_line`].
    fn decode(line: &str) -> Result<Self>;
}

impl Error {
    /// Attach a 1-based line number to a `MalformedRecord`.
    pub fn at_line(self, line: usize) -> Self {
        match self {
            Error::MalformedRecord { reason, .. } => Error::MalformedRecord { line, reason },
            other => other,
        }
    }
}

fn malformed(reason: impl Into<String>) -> Error {
    Error::MalformedRecord {
        line: 0,
        reason: reason.into(),
    }
}

fn expect_fields<'a>(line: &'a str, expected: usize) -> Result<Vec<&'a str>> {
    let fields = split_fields(line, DELIMITER);
    if fields.len() != expected {
        return Err(malformed(format!(
            "expected {} fields, found {}",
            expected,
            fields.len()
        )));
    }
    Ok(fields)
}

fn parse_int(field: &str, name: &str) -> Result<i64> {
    field
        .trim()
        .parse()
        .map_err(|_| malformed(format!("{} is not an integer: {:?}", name, field)))
}

/// Flags are written as `0|1`; any non-zero integer reads as true.
fn parse_flag(field: &str, name: &str) -> Result<bool> {
    parse_int(field, name).map(|v| v != 0)
}

fn flag(value: bool) -> u8 {
    u8::from(value)
}

fn warn_if_delimited(kind: &str, id: i64, field: &str, value: &str) {
    if value.contains(DELIMITER) {
        tracing::warn!(
            "{} {} has a '{}' in its {}; the stored record will not decode as written",
            kind,
            id,
            DELIMITER,
            field
        );
    }
}

impl Record for User {
    const FIELDS: usize = 6;

    fn encode(&self) -> String {
        for (field, value) in [
            ("username", &self.username),
            ("password", &self.password),
            ("name", &self.name),
            ("email", &self.email),
        ] {
            warn_if_delimited("User", self.id, field, value);
        }

        format!(
            "{},{},{},{},{},{}",
            self.id,
            self.username,
            self.password,
            self.name,
            self.email,
            flag(self.allow_anonymous_questions)
        )
    }

    fn decode(line: &str) -> Result<Self> {
        let f = expect_fields(line, Self::FIELDS)?;
        Ok(User {
            id: parse_int(f[0], "id")?,
            username: f[1].to_string(),
            password: f[2].to_string(),
            name: f[3].to_string(),
            email: f[4].to_string(),
            allow_anonymous_questions: parse_flag(f[5], "allow_anonymous_questions")?,
        })
    }
}

impl Record for Question {
    const FIELDS: usize = 7;

    fn encode(&self) -> String {
        warn_if_delimited("Question", self.id, "text", &self.text);
        warn_if_delimited("Question", self.id, "answer", &self.answer);

        format!(
            "{},{},{},{},{},{},{},",
            self.id,
            self.parent_id.unwrap_or(NO_ID),
            self.from_user_id,
            self.to_user_id,
            flag(self.is_anonymous),
            self.text,
            self.answer
        )
    }

    fn decode(line: &str) -> Result<Self> {
        let body = line.strip_suffix(DELIMITER).unwrap_or(line);
        let f = expect_fields(body, Self::FIELDS)?;

        let parent = parse_int(f[1], "parent_question_id")?;
        Ok(Question {
            id: parse_int(f[0], "id")?,
            parent_id: (parent != NO_ID).then_some(parent),
            from_user_id: parse_int(f[2], "from_user_id")?,
            to_user_id: parse_int(f[3], "to_user_id")?,
            is_anonymous: parse_flag(f[4], "is_anonymous")?,
            text: f[5].to_string(),
            answer: f[6].to_string(),
        })
    }
}
