//! Action logging for interactive sessions.
//!
//! Every menu action is recorded as one JSON line in `action.log` inside the
//! data directory. Logging never fails an action: write errors are reported as
//! warnings and otherwise ignored.

use crate::models::UserId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

/// Longest string argument kept verbatim in the log.
const MAX_ARG_LEN: usize = 100;

/// Represents a single action log entry.
#[derive(Debug, Serialize, Deserialize)]
pub struct ActionLog {
    /// ISO 8601 timestamp when the action occurred
    pub timestamp: DateTime<Utc>,

    /// Signed-in user, absent for sign-in and sign-up attempts
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<UserId>,

    /// Action name (e.g., "answer_question", "sign_up")
    pub action: String,

    /// Action arguments as JSON
    pub args: serde_json::Value,

    /// Whether the action succeeded
    pub success: bool,

    /// Error message if the action failed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,

    /// Action duration in milliseconds
    pub duration_ms: u64,
}

/// Appends entries to an action log file, or discards them when disabled.
#[derive(Debug, Clone)]
pub struct ActionLogger {
    path: Option<PathBuf>,
}

impl ActionLogger {
    pub fn new(path: Option<PathBuf>) -> Self {
        Self { path }
    }

    pub fn disabled() -> Self {
        Self { path: None }
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Record one action. Never fails.
    pub fn log(
        &self,
        user_id: Option<UserId>,
        action: &str,
        args: serde_json::Value,
        error: Option<String>,
        duration_ms: u64,
    ) {
        let Some(ref path) = self.path else {
            return;
        };

        let entry = ActionLog {
            timestamp: Utc::now(),
            user_id,
            action: action.to_string(),
            args: sanitize_args(&args),
            success: error.is_none(),
            error,
            duration_ms,
        };

        if let Err(e) = write_log_entry(path, &entry) {
            tracing::warn!(path = %path.display(), "Failed to write action log: {}", e);
        }
    }
}

/// Write a log entry to the log file.
fn write_log_entry(path: &Path, entry: &ActionLog) -> Result<(), Box<dyn std::error::Error>> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    let json = serde_json::to_string(entry)?;
    let mut file = OpenOptions::new().create(true).append(true).open(path)?;
    writeln!(file, "{}", json)?;

    Ok(())
}

/// Remove credentials and shorten long text before logging.
fn sanitize_args(args: &serde_json::Value) -> serde_json::Value {
    match args {
        serde_json::Value::Object(map) => {
            let mut sanitized = serde_json::Map::new();
            for (key, value) in map {
                if key.to_lowercase().contains("password") {
                    sanitized.insert(
                        key.clone(),
                        serde_json::Value::String("[REDACTED]".to_string()),
                    );
                } else {
                    sanitized.insert(key.clone(), sanitize_args(value));
                }
            }
            serde_json::Value::Object(sanitized)
        }
        serde_json::Value::String(s) if s.chars().count() > MAX_ARG_LEN => {
            let head: String = s.chars().take(MAX_ARG_LEN - 3).collect();
            serde_json::Value::String(format!("{}... ({} chars)", head, s.chars().count()))
        }
        _ => args.clone(),
    }
}
