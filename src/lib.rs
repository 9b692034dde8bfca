//! askme - A terminal question/answer system backed by flat text files.
//!
//! This library provides the core functionality for the `askme` CLI tool:
//! user and question stores, thread indexing, the per-session view and the
//! interactive menu.

pub mod action_log;
pub mod cli;
pub mod commands;
pub mod config;
pub mod models;
pub mod prompt;
pub mod session;
pub mod storage;

use models::UserId;
use std::path::PathBuf;


/// Library-level error type for askme operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Can't read from file {}: {source}", path.display())]
    FileUnreadable {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Malformed record on line {line}: {reason}")]
    MalformedRecord { line: usize, reason: String },

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("User already exists: {0}")]
    DuplicateUsername(String),

    #[error("Anonymous questions are not allowed for user {0}")]
    AnonymousNotAllowed(UserId),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("{0}")]
    Other(String),
}

/// Result type alias for askme operations.
pub type Result<T> = std::result::Result<T, Error>;
