//! Command implementations for the askme CLI.
//!
//! - [`menu`] - the interactive session (sign in/up and the main menu)
//! - [`display`] - console formatting of questions
//! - this module - the shared [`App`] context and the non-interactive commands
//!   (`users`, `feed`, `config show`, `config init`)

pub mod display;
pub mod menu;

use crate::action_log::ActionLogger;
use crate::config::{AnonymousPolicy, AskmeConfig, ResolvedConfig};
use crate::models::{Question, User};
use crate::storage::{QuestionStore, UserStore};
use crate::Result;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};

/// Command results that can be serialized to JSON or formatted for humans.
pub trait Output {
    /// Serialize to JSON string.
    fn to_json(&self) -> String;

    /// Format for human-readable output.
    fn to_human(&self) -> String;
}

/// Everything a command needs: both stores plus the resolved settings.
#[derive(Debug)]
pub struct App {
    pub users: UserStore,
    pub questions: QuestionStore,
    pub anonymous_policy: AnonymousPolicy,
    pub logger: ActionLogger,
}

impl App {
    /// Load both stores from the configured files.
    pub fn open(config: &ResolvedConfig) -> Self {
        Self {
            users: UserStore::load(config.users_path()),
            questions: QuestionStore::load(config.questions_path()),
            anonymous_policy: config.anonymous_policy(),
            logger: ActionLogger::new(config.action_log_path()),
        }
    }

    /// Problems found while loading. A missing file on first run is not one.
    pub fn load_warnings(&self) -> Vec<String> {
        let mut warnings = Vec::new();
        for (report, path) in [
            (self.users.load_report(), self.users.path()),
            (self.questions.load_report(), self.questions.path()),
        ] {
            if path.exists() {
                warnings.extend(report.warnings());
            }
        }
        warnings
    }
}

/// Result of `askme users`.
#[derive(Serialize)]
pub struct UsersList {
    pub users: Vec<User>,
    pub count: usize,
}

impl Output for UsersList {
    fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_default()
    }

    fn to_human(&self) -> String {
        if self.users.is_empty() {
            return "No users registered.".to_string();
        }
        let mut lines = vec![format!("{} user(s):", self.count)];
        lines.extend(self.users.iter().map(|u| u.to_string()));
        lines.join("\n")
    }
}

/// List every registered user.
pub fn list_users(app: &App) -> UsersList {
    let users = app.users.all().to_vec();
    UsersList {
        count: users.len(),
        users,
    }
}

/// Result of `askme feed`.
#[derive(Serialize)]
pub struct Feed {
    pub questions: Vec<Question>,
    pub count: usize,
}

impl Output for Feed {
    fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_default()
    }

    fn to_human(&self) -> String {
        if self.questions.is_empty() {
            return "No answered questions.".to_string();
        }
        self.questions
            .iter()
            .map(display::question)
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Every answered question, ascending by id.
pub fn list_feed(app: &App) -> Feed {
    let questions: Vec<Question> = app.questions.answered_feed().cloned().collect();
    Feed {
        count: questions.len(),
        questions,
    }
}

/// Result of `askme config show`.
pub struct ConfigShow {
    entries: Vec<(&'static str, String, String)>,
}

impl Output for ConfigShow {
    fn to_json(&self) -> String {
        let map: serde_json::Map<String, serde_json::Value> = self
            .entries
            .iter()
            .map(|(key, value, source)| {
                (
                    key.to_string(),
                    serde_json::json!({ "value": value, "source": source }),
                )
            })
            .collect();
        serde_json::Value::Object(map).to_string()
    }

    fn to_human(&self) -> String {
        self.entries
            .iter()
            .map(|(key, value, source)| format!("{} = {} ({})", key, value, source))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Resolved configuration with the source of every value.
pub fn show_config(config: &ResolvedConfig) -> ConfigShow {
    let entries = vec![
        (
            "data-dir",
            config.data_dir().display().to_string(),
            config.data_dir.source.to_string(),
        ),
        (
            "users-file",
            config.users_path().display().to_string(),
            config.users_file.source.to_string(),
        ),
        (
            "questions-file",
            config.questions_path().display().to_string(),
            config.questions_file.source.to_string(),
        ),
        (
            "anonymous-policy",
            config.anonymous_policy().to_string(),
            config.anonymous_policy.source.to_string(),
        ),
        (
            "action-log",
            config.action_log.value.to_string(),
            config.action_log.source.to_string(),
        ),
    ];
    ConfigShow { entries }
}

/// Result of `askme config init`.
#[derive(Serialize)]
pub struct ConfigInit {
    pub path: PathBuf,
    pub created: bool,
}

impl Output for ConfigInit {
    fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_default()
    }

    fn to_human(&self) -> String {
        if self.created {
            format!("Created {}", self.path.display())
        } else {
            format!("{} already exists, left unchanged", self.path.display())
        }
    }
}

/// Write a config.kdl holding the current effective settings, unless one exists.
pub fn init_config(config: &ResolvedConfig) -> Result<ConfigInit> {
    let path = config.config_path();
    if path.exists() {
        return Ok(ConfigInit {
            path,
            created: false,
        });
    }

    // Keep files inside the data directory relative so the directory can move
    let relative = |path: &Path| {
        path.strip_prefix(config.data_dir())
            .unwrap_or(path)
            .to_path_buf()
    };
    let file = AskmeConfig {
        users_file: Some(relative(config.users_path())),
        questions_file: Some(relative(config.questions_path())),
        anonymous_policy: Some(config.anonymous_policy()),
        action_log: Some(config.action_log.value),
    };
    let mut doc = file.to_kdl();
    doc.autoformat();

    fs::create_dir_all(config.data_dir())?;
    fs::write(&path, doc.to_string())?;

    Ok(ConfigInit {
        path,
        created: true,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ConfigOverrides, Resolved, ValueSource, read_config_file, resolve_with};
    use crate::test_utils::TestEnv;

    fn config_for(env: &TestEnv) -> ResolvedConfig {
        resolve_with(
            Resolved::new(env.data_path().to_path_buf(), ValueSource::CliFlag),
            &AskmeConfig::new(),
            &ConfigOverrides::new(),
        )
    }

    #[test]
    fn test_open_loads_both_stores() {
        let env = TestEnv::with_sample_data();
        let app = App::open(&config_for(&env));

        assert_eq!(app.users.len(), 3);
        assert_eq!(app.questions.len(), 8);
        assert!(app.load_warnings().is_empty());
    }

    #[test]
    fn test_first_run_has_no_warnings() {
        let env = TestEnv::new();
        let app = App::open(&config_for(&env));

        assert!(app.users.is_empty());
        assert!(app.load_warnings().is_empty());
    }

    #[test]
    fn test_malformed_rows_become_warnings() {
        let env = TestEnv::with_sample_data();
        fs::write(env.questions_path(), "1,-1,1,2,0,ok,,\nnot a question\n").unwrap();
        let app = App::open(&config_for(&env));

        let warnings = app.load_warnings();
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].contains("line 2"));
    }

    #[test]
    fn test_list_users_human_and_json() {
        let env = TestEnv::with_sample_data();
        let app = App::open(&config_for(&env));
        let result = list_users(&app);

        assert_eq!(result.count, 3);
        assert!(result.to_human().contains("ID: 13\t\tName: Ali"));
        let json = result.to_json();
        assert!(json.contains("\"count\":3"));
        assert!(!json.contains("\"password\""));
    }

    #[test]
    fn test_list_feed_only_answered() {
        let env = TestEnv::with_sample_data();
        let app = App::open(&config_for(&env));
        let feed = list_feed(&app);

        let ids: Vec<i64> = feed.questions.iter().map(|q| q.id).collect();
        assert_eq!(ids, vec![101, 203, 211, 300]);
        assert!(feed.to_human().contains("Answer: Good choice"));
    }

    #[test]
    fn test_empty_outputs() {
        let env = TestEnv::new();
        let app = App::open(&config_for(&env));

        assert_eq!(list_users(&app).to_human(), "No users registered.");
        assert_eq!(list_feed(&app).to_human(), "No answered questions.");
    }

    #[test]
    fn test_show_config_lists_sources() {
        let env = TestEnv::new();
        let shown = show_config(&config_for(&env));

        let human = shown.to_human();
        assert!(human.contains("anonymous-policy = advisory (default)"));
        assert!(human.contains("(cli)"));

        let json: serde_json::Value = serde_json::from_str(&shown.to_json()).unwrap();
        assert_eq!(json["action-log"]["value"], "true");
    }

    #[test]
    fn test_init_config_writes_once() {
        let env = TestEnv::new();
        let config = config_for(&env);

        let first = init_config(&config).unwrap();
        assert!(first.created);
        let written = read_config_file(env.data_path()).unwrap();
        assert_eq!(written.anonymous_policy, Some(AnonymousPolicy::Advisory));
        assert_eq!(written.users_file, Some(PathBuf::from("users.txt")));

        let second = init_config(&config).unwrap();
        assert!(!second.created);
    }
}
