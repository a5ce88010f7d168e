// SPDX-FileCopyrightText: 2026 Mnema Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mnema - a memory-augmented conversational assistant.
//!
//! This is the binary entry point: the `shell` REPL plus a few inspection
//! commands over the local database.

#[cfg(not(target_env = "msvc"))]
use tikv_jemallocator::Jemalloc;

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: Jemalloc = Jemalloc;

mod inspect;
mod runtime;
mod shell;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use mnema_config::MnemaConfig;

/// Mnema - a conversational assistant that remembers.
#[derive(Parser, Debug)]
#[command(name = "mnema", version, about, long_about = None)]
struct Cli {
    /// Read configuration from this file instead of the standard locations.
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Launch an interactive chat session (the default).
    Shell,
    /// Inspect or edit the stored user profile.
    Profile {
        #[command(subcommand)]
        action: ProfileAction,
    },
    /// Print stored conversation history.
    History {
        /// Session to print. Lists all sessions when omitted.
        session: Option<String>,
        /// Number of most recent pairs to print.
        #[arg(long, default_value_t = 10)]
        pairs: usize,
    },
    /// Configuration utilities.
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand, Debug)]
enum ProfileAction {
    /// Print the stored profile.
    Show,
    /// Merge `key=value` assignments into the profile.
    Set {
        #[arg(required = true, value_name = "KEY=VALUE")]
        assignments: Vec<String>,
    },
}

#[derive(Subcommand, Debug)]
enum ConfigAction {
    /// Validate the configuration and print the effective settings.
    Check,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let loaded = match &cli.config {
        Some(path) => mnema_config::load_and_validate_path(path),
        None => mnema_config::load_and_validate(),
    };
    let config = match loaded {
        Ok(config) => config,
        Err(errors) => {
            mnema_config::render_errors(&errors);
            std::process::exit(1);
        }
    };

    init_tracing(&config.agent.log_level);

    let result = match cli.command.unwrap_or(Commands::Shell) {
        Commands::Shell => shell::run_shell(config).await,
        Commands::Profile { action } => match action {
            ProfileAction::Show => inspect::profile_show(&config).await,
            ProfileAction::Set { assignments } => {
                inspect::profile_set(&config, &assignments).await
            }
        },
        Commands::History { session, pairs } => {
            inspect::history(&config, session.as_deref(), pairs).await
        }
        Commands::Config {
            action: ConfigAction::Check,
        } => {
            config_check(&config);
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

fn config_check(config: &MnemaConfig) {
    println!("configuration OK");
    println!("  database:       {}", config.storage.database_path);
    println!("  chat model:     {}", config.provider.chat_model);
    println!("  summary model:  {}", config.provider.summary_model);
    println!(
        "  memory:         {}",
        if config.memory.enabled {
            format!("{} ({})", config.memory.embedder, config.memory.collection)
        } else {
            "disabled".to_string()
        }
    );
    println!(
        "  history window: {} pairs, {} tokens",
        config.history.max_history_pairs, config.history.max_tokens
    );
    println!("  tool calls:     {} per turn", config.agent.max_function_calls);
}

/// Installs the stderr subscriber. `RUST_LOG` overrides `agent.log_level`.
fn init_tracing(log_level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("mnema={log_level},warn")));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_thread_names(false)
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    #[cfg(not(target_env = "msvc"))]
    fn jemalloc_is_active() {
        use tikv_jemalloc_ctl::{epoch, stats};
        epoch::advance().unwrap();
        let allocated = stats::allocated::read().unwrap();
        assert!(allocated > 0, "jemalloc should report non-zero allocation");
    }

    #[test]
    fn cli_defaults_to_no_subcommand() {
        let cli = Cli::try_parse_from(["mnema"]).unwrap();
        assert!(cli.command.is_none());
        assert!(cli.config.is_none());
    }

    #[test]
    fn history_parses_session_and_pairs() {
        let cli = Cli::try_parse_from(["mnema", "history", "abc", "--pairs", "3"]).unwrap();
        match cli.command {
            Some(Commands::History { session, pairs }) => {
                assert_eq!(session.as_deref(), Some("abc"));
                assert_eq!(pairs, 3);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn profile_set_requires_assignments() {
        assert!(Cli::try_parse_from(["mnema", "profile", "set"]).is_err());
        let cli = Cli::try_parse_from([
            "mnema",
            "--config",
            "/tmp/m.toml",
            "profile",
            "set",
            "name=Ada",
        ])
        .unwrap();
        assert_eq!(cli.config, Some(PathBuf::from("/tmp/m.toml")));
    }

    #[test]
    fn binary_loads_config_defaults() {
        let config = mnema_config::load_and_validate_str("").expect("default config should be valid");
        assert_eq!(config.agent.name, "mnema");
    }
}
