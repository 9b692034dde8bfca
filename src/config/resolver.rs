//! Precedence resolution for configuration.
//!
//! ## Data directory (highest to lowest)
//!
//! 1. `--data-dir` CLI flag
//! 2. `ASKME_DATA_DIR` environment variable
//! 3. Platform data directory (`~/.local/share/askme`)
//!
//! ## Everything else (highest to lowest)
//!
//! 1. CLI flags (passed at runtime)
//! 2. `config.kdl` in the data directory
//! 3. Built-in defaults
//!
//! Relative file paths are resolved against the data directory.

use crate::config::schema::{AnonymousPolicy, AskmeConfig};
use crate::storage::{DATA_DIR_ENV, default_data_dir, resolve_in};
use crate::{Error, Result};
use std::fs;
use std::path::{Path, PathBuf};

pub const CONFIG_FILE: &str = "config.kdl";
pub const DEFAULT_USERS_FILE: &str = "users.txt";
pub const DEFAULT_QUESTIONS_FILE: &str = "questions.txt";
pub const ACTION_LOG_FILE: &str = "action.log";

/// Tracks where a resolved value came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValueSource {
    /// Value from environment variable
    EnvVar(String),
    /// Value from config.kdl
    ConfigFile,
    /// Value from CLI flag
    CliFlag,
    /// Built-in default value
    Default,
}

impl std::fmt::Display for ValueSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ValueSource::EnvVar(name) => write!(f, "env:{}", name),
            ValueSource::ConfigFile => write!(f, "config"),
            ValueSource::CliFlag => write!(f, "cli"),
            ValueSource::Default => write!(f, "default"),
        }
    }
}

/// A resolved value with its source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolved<T> {
    pub value: T,
    pub source: ValueSource,
}

impl<T> Resolved<T> {
    pub fn new(value: T, source: ValueSource) -> Self {
        Self { value, source }
    }
}

/// Fully resolved configuration with source tracking.
#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    pub data_dir: Resolved<PathBuf>,
    pub users_file: Resolved<PathBuf>,
    pub questions_file: Resolved<PathBuf>,
    pub anonymous_policy: Resolved<AnonymousPolicy>,
    pub action_log: Resolved<bool>,
}

impl ResolvedConfig {
    /// Defaults for a given data directory.
    pub fn defaults(data_dir: Resolved<PathBuf>) -> Self {
        let dir = data_dir.value.clone();
        Self {
            data_dir,
            users_file: Resolved::new(dir.join(DEFAULT_USERS_FILE), ValueSource::Default),
            questions_file: Resolved::new(dir.join(DEFAULT_QUESTIONS_FILE), ValueSource::Default),
            anonymous_policy: Resolved::new(AnonymousPolicy::default(), ValueSource::Default),
            action_log: Resolved::new(true, ValueSource::Default),
        }
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir.value
    }

    pub fn users_path(&self) -> &Path {
        &self.users_file.value
    }

    pub fn questions_path(&self) -> &Path {
        &self.questions_file.value
    }

    pub fn anonymous_policy(&self) -> AnonymousPolicy {
        self.anonymous_policy.value
    }

    /// Action log file, `None` when logging is disabled.
    pub fn action_log_path(&self) -> Option<PathBuf> {
        self.action_log
            .value
            .then(|| self.data_dir().join(ACTION_LOG_FILE))
    }

    pub fn config_path(&self) -> PathBuf {
        self.data_dir().join(CONFIG_FILE)
    }
}

/// CLI overrides for configuration resolution.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub data_dir: Option<PathBuf>,
    pub anonymous_policy: Option<AnonymousPolicy>,
}

impl ConfigOverrides {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_data_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.data_dir = Some(dir.into());
        self
    }

    pub fn with_anonymous_policy(mut self, policy: AnonymousPolicy) -> Self {
        self.anonymous_policy = Some(policy);
        self
    }
}

/// Pick the data directory from flag, environment value, or platform default.
pub fn resolve_data_dir(flag: Option<PathBuf>, env_value: Option<String>) -> Result<Resolved<PathBuf>> {
    if let Some(dir) = flag {
        return Ok(Resolved::new(dir, ValueSource::CliFlag));
    }
    if let Some(dir) = env_value.filter(|v| !v.is_empty()) {
        return Ok(Resolved::new(
            PathBuf::from(dir),
            ValueSource::EnvVar(DATA_DIR_ENV.to_string()),
        ));
    }
    Ok(Resolved::new(default_data_dir()?, ValueSource::Default))
}

/// Read config.kdl from `data_dir`; a missing file is an empty config.
pub fn read_config_file(data_dir: &Path) -> Result<AskmeConfig> {
    let path = data_dir.join(CONFIG_FILE);
    if !path.exists() {
        return Ok(AskmeConfig::new());
    }

    let text = fs::read_to_string(&path)?;
    AskmeConfig::parse(&text).map_err(|e| match e {
        Error::Config(msg) => Error::Config(format!("{}: {}", path.display(), msg)),
        other => other,
    })
}

/// Resolve configuration with full precedence chain.
pub fn resolve_config(overrides: &ConfigOverrides) -> Result<ResolvedConfig> {
    let data_dir = resolve_data_dir(
        overrides.data_dir.clone(),
        std::env::var(DATA_DIR_ENV).ok(),
    )?;
    let file = read_config_file(&data_dir.value)?;
    Ok(resolve_with(data_dir, &file, overrides))
}

/// Apply config file values and overrides on top of defaults.
pub fn resolve_with(
    data_dir: Resolved<PathBuf>,
    file: &AskmeConfig,
    overrides: &ConfigOverrides,
) -> ResolvedConfig {
    let mut result = ResolvedConfig::defaults(data_dir);
    let dir = result.data_dir().to_path_buf();

    if let Some(ref path) = file.users_file {
        result.users_file = Resolved::new(resolve_in(&dir, path), ValueSource::ConfigFile);
    }
    if let Some(ref path) = file.questions_file {
        result.questions_file = Resolved::new(resolve_in(&dir, path), ValueSource::ConfigFile);
    }

    if let Some(policy) = overrides.anonymous_policy {
        result.anonymous_policy = Resolved::new(policy, ValueSource::CliFlag);
    } else if let Some(policy) = file.anonymous_policy {
        result.anonymous_policy = Resolved::new(policy, ValueSource::ConfigFile);
    }

    if let Some(enabled) = file.action_log {
        result.action_log = Resolved::new(enabled, ValueSource::ConfigFile);
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn flagged(dir: &Path) -> Resolved<PathBuf> {
        Resolved::new(dir.to_path_buf(), ValueSource::CliFlag)
    }

    #[test]
    fn test_data_dir_precedence() {
        let from_flag = resolve_data_dir(Some("/flag".into()), Some("/env".to_string())).unwrap();
        assert_eq!(from_flag.value, PathBuf::from("/flag"));
        assert_eq!(from_flag.source, ValueSource::CliFlag);

        let from_env = resolve_data_dir(None, Some("/env".to_string())).unwrap();
        assert_eq!(from_env.value, PathBuf::from("/env"));
        assert_eq!(from_env.source.to_string(), "env:ASKME_DATA_DIR");
    }

    #[test]
    fn test_empty_env_value_ignored() {
        // The platform default may be unavailable in a bare environment
        if let Ok(resolved) = resolve_data_dir(None, Some(String::new())) {
            assert_eq!(resolved.source, ValueSource::Default);
        }
    }

    #[test]
    fn test_defaults() {
        let config = resolve_with(flagged(Path::new("/d")), &AskmeConfig::new(), &ConfigOverrides::new());

        assert_eq!(config.users_path(), Path::new("/d/users.txt"));
        assert_eq!(config.questions_path(), Path::new("/d/questions.txt"));
        assert_eq!(config.anonymous_policy(), AnonymousPolicy::Advisory);
        assert_eq!(config.action_log_path(), Some(PathBuf::from("/d/action.log")));
        assert_eq!(config.users_file.source, ValueSource::Default);
    }

    #[test]
    fn test_config_file_values() {
        let file = AskmeConfig {
            users_file: Some("people.txt".into()),
            questions_file: Some("/abs/q.txt".into()),
            anonymous_policy: Some(AnonymousPolicy::Enforce),
            action_log: Some(false),
        };
        let config = resolve_with(flagged(Path::new("/d")), &file, &ConfigOverrides::new());

        assert_eq!(config.users_path(), Path::new("/d/people.txt"));
        assert_eq!(config.questions_path(), Path::new("/abs/q.txt"));
        assert_eq!(config.anonymous_policy.source, ValueSource::ConfigFile);
        assert_eq!(config.action_log_path(), None);
    }

    #[test]
    fn test_cli_flag_beats_config_file() {
        let file = AskmeConfig {
            anonymous_policy: Some(AnonymousPolicy::Enforce),
            ..AskmeConfig::new()
        };
        let overrides = ConfigOverrides::new().with_anonymous_policy(AnonymousPolicy::Advisory);
        let config = resolve_with(flagged(Path::new("/d")), &file, &overrides);

        assert_eq!(config.anonymous_policy(), AnonymousPolicy::Advisory);
        assert_eq!(config.anonymous_policy.source, ValueSource::CliFlag);
    }

    #[test]
    fn test_read_config_file() {
        let dir = TempDir::new().unwrap();
        assert_eq!(read_config_file(dir.path()).unwrap(), AskmeConfig::new());

        fs::write(dir.path().join(CONFIG_FILE), "anonymous-policy \"enforce\"\n").unwrap();
        let file = read_config_file(dir.path()).unwrap();
        assert_eq!(file.anonymous_policy, Some(AnonymousPolicy::Enforce));

        fs::write(dir.path().join(CONFIG_FILE), "action-log 3\n").unwrap();
        let err = read_config_file(dir.path()).unwrap_err();
        assert!(err.to_string().contains("config.kdl"));
    }

    #[test]
    fn test_resolve_config_with_flag_dir() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join(CONFIG_FILE), "users-file \"u.txt\"\n").unwrap();

        let config = resolve_config(&ConfigOverrides::new().with_data_dir(dir.path())).unwrap();
        assert_eq!(config.users_path(), dir.path().join("u.txt"));
        assert_eq!(config.data_dir.source, ValueSource::CliFlag);
    }
}
