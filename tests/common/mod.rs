//! Common test utilities for askme integration tests.
//!
//! Provides `TestEnv` for isolated test environments that don't touch
//! the user's `~/.local/share/askme/` directory.

#![allow(dead_code)]

use assert_cmd::Command;
use std::fs;
use std::path::{Path, PathBuf};
pub use tempfile::TempDir;

pub const SAMPLE_USERS: &str = "\
11,mostafa,111,Mostafa,mostafa@example.com,1
13,ali,222,Ali,ali@example.com,0
45,hani,333,Hani,hani@example.com,1
";

pub const SAMPLE_QUESTIONS: &str = "\
101,-1,11,13,0,Should I learn C++ first or Java,I think C# is a better choice!,
203,101,11,13,0,Why do you think so!,Just Google. There is an answer on Quora.,
205,101,45,13,0,What about python?,,
211,-1,13,11,1,It was nice to chat to you,For my pleasure Dr Mostafa,
212,-1,13,45,0,Please search archive before asking,,
300,101,11,13,1,Is it ok to learn Java for OOP?,Good choice,
301,-1,11,13,0,Free to meet?,,
302,101,11,13,1,Why so late in reply?,,
";

/// A test environment with isolated data storage.
///
/// The `askme()` method returns a `Command` that sets `ASKME_DATA_DIR`
/// per-invocation, making tests parallel-safe.
pub struct TestEnv {
    pub data_dir: TempDir,
}

impl TestEnv {
    /// Create a new test environment with an empty data directory.
    pub fn new() -> Self {
        Self {
            data_dir: TempDir::new().unwrap(),
        }
    }

    /// Create a test environment holding the sample users and questions.
    pub fn with_sample_data() -> Self {
        let env = Self::new();
        fs::write(env.users_path(), SAMPLE_USERS).unwrap();
        fs::write(env.questions_path(), SAMPLE_QUESTIONS).unwrap();
        env
    }

    /// Get a Command for the askme binary with isolated data directory.
    pub fn askme(&self) -> Command {
        let mut cmd = Command::new(env!("CARGO_BIN_EXE_askme"));
        cmd.env("ASKME_DATA_DIR", self.data_dir.path());
        cmd.env_remove("ASKME_LOG");
        cmd
    }

    /// Run an interactive session fed with `lines`, one per input line.
    pub fn session(&self, lines: &[&str]) -> assert_cmd::assert::Assert {
        let mut input = lines.join("\n");
        input.push('\n');
        self.askme().write_stdin(input).assert()
    }

    pub fn data_path(&self) -> &Path {
        self.data_dir.path()
    }

    pub fn users_path(&self) -> PathBuf {
        self.data_path().join("users.txt")
    }

    pub fn questions_path(&self) -> PathBuf {
        self.data_path().join("questions.txt")
    }

    pub fn read_questions(&self) -> String {
        fs::read_to_string(self.questions_path()).unwrap_or_default()
    }

    pub fn read_users(&self) -> String {
        fs::read_to_string(self.users_path()).unwrap_or_default()
    }
}

impl Default for TestEnv {
    fn default() -> Self {
        Self::new()
    }
}
