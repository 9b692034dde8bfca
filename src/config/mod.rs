//! Configuration for askme.
//!
//! ## config.kdl
//!
//! Located in the data directory (`~/.local/share/askme/config.kdl` by default).
//!
//! Contains:
//! - `users-file` - Users file, relative to the data directory unless absolute
//! - `questions-file` - Questions file, same rules
//! - `anonymous-policy` - "advisory" (default) or "enforce"
//! - `action-log` - `#true` (default) or `#false`
//!
//! ## Precedence
//!
//! CLI flag > config.kdl > defaults. The data directory itself comes from
//! `--data-dir`, then `ASKME_DATA_DIR`, then the platform default.
//!
//! Use the [`resolver`] module for precedence resolution.

pub mod resolver;
pub mod schema;

pub use resolver::{
    ConfigOverrides, Resolved, ResolvedConfig, ValueSource, read_config_file, resolve_config,
    resolve_data_dir, resolve_with,
};
pub use schema::{AnonymousPolicy, AskmeConfig};
