//! CLI argument definitions for askme.

use crate::config::AnonymousPolicy;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// askme - Ask questions, answer them, and follow threads from the terminal.
///
/// Run without a command to start an interactive session.
#[derive(Parser, Debug)]
#[command(name = "askme")]
#[command(author, version, about = "A terminal question/answer system backed by flat files", long_about = None)]
pub struct Cli {
    /// Output in human-readable format instead of JSON
    #[arg(short = 'H', long = "human", global = true)]
    pub human_readable: bool,

    /// Directory holding users.txt, questions.txt and config.kdl.
    /// Can also be set via ASKME_DATA_DIR environment variable.
    #[arg(long = "data-dir", global = true)]
    pub data_dir: Option<PathBuf>,

    /// What to do with anonymous questions to users who do not accept them
    /// (advisory or enforce). Overrides config.kdl.
    #[arg(long = "anonymous-policy", global = true)]
    pub anonymous_policy: Option<AnonymousPolicy>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Top-level commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start an interactive session (the default)
    Session,

    /// List registered users
    Users,

    /// List every answered question
    Feed,

    /// Configuration commands
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

/// Config subcommands
#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Show the resolved configuration and where each value came from
    Show,

    /// Write config.kdl with the current settings if it does not exist
    Init,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn verify_cli() {
        // This will panic if the CLI is misconfigured
        Cli::command().debug_assert();
    }

    #[test]
    fn test_no_command_means_session() {
        let cli = Cli::try_parse_from(["askme"]).unwrap();
        assert!(cli.command.is_none());
        assert!(!cli.human_readable);
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from([
            "askme",
            "users",
            "-H",
            "--data-dir",
            "/tmp/askme",
            "--anonymous-policy",
            "enforce",
        ])
        .unwrap();

        assert!(matches!(cli.command, Some(Commands::Users)));
        assert!(cli.human_readable);
        assert_eq!(cli.data_dir, Some(PathBuf::from("/tmp/askme")));
        assert_eq!(cli.anonymous_policy, Some(AnonymousPolicy::Enforce));
    }

    #[test]
    fn test_invalid_policy_rejected() {
        assert!(Cli::try_parse_from(["askme", "--anonymous-policy", "strict"]).is_err());
    }

    #[test]
    fn test_config_subcommands() {
        let cli = Cli::try_parse_from(["askme", "config", "show"]).unwrap();
        assert!(matches!(
            cli.command,
            Some(Commands::Config {
                command: ConfigCommands::Show
            })
        ));
    }
}
