//! askme CLI - A terminal question/answer system backed by flat files.

use askme::cli::{Cli, Commands, ConfigCommands};
use askme::commands::{self, App, Output, menu};
use askme::config::{ConfigOverrides, ResolvedConfig, resolve_config};
use askme::prompt::ConsolePrompt;
use clap::Parser;
use std::io;
use std::process;
use tracing_subscriber::prelude::*;

/// Environment variable holding the log filter.
const LOG_ENV: &str = "ASKME_LOG";

fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::new(
        std::env::var(LOG_ENV).unwrap_or_else(|_| "warn".into()),
    );

    // stdout belongs to the menu and command output
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn main() {
    init_tracing();

    let cli = Cli::parse();
    let human = cli.human_readable;

    let mut overrides = ConfigOverrides::new();
    if let Some(dir) = cli.data_dir {
        overrides = overrides.with_data_dir(dir);
    }
    if let Some(policy) = cli.anonymous_policy {
        overrides = overrides.with_anonymous_policy(policy);
    }

    let result = resolve_config(&overrides).and_then(|config| run_command(cli.command, &config, human));

    if let Err(e) = result {
        tracing::debug!("Command failed: {:?}", e);
        if human {
            eprintln!("Error: {}", e);
        } else {
            eprintln!("{}", serde_json::json!({ "error": e.to_string() }));
        }
        process::exit(1);
    }
}

fn run_command(
    command: Option<Commands>,
    config: &ResolvedConfig,
    human: bool,
) -> Result<(), askme::Error> {
    match command.unwrap_or(Commands::Session) {
        Commands::Session => {
            let mut app = App::open(config);
            let stdin = io::stdin();
            let mut prompt = ConsolePrompt::new(stdin.lock(), io::stdout());
            menu::run_session(&mut app, &mut prompt)?;
        }
        Commands::Users => {
            let app = App::open(config);
            output(&commands::list_users(&app), human);
        }
        Commands::Feed => {
            let app = App::open(config);
            output(&commands::list_feed(&app), human);
        }
        Commands::Config { command } => match command {
            ConfigCommands::Show => output(&commands::show_config(config), human),
            ConfigCommands::Init => output(&commands::init_config(config)?, human),
        },
    }
    Ok(())
}

fn output<T: Output>(result: &T, human: bool) {
    if human {
        println!("{}", result.to_human());
    } else {
        println!("{}", result.to_json());
    }
}
