// SPDX-FileCopyrightText: 2026 Sightline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Sightline - connects visually-impaired users with volunteers for live
//! video calls.
//!
//! This is the binary entry point for the call broker.

#[cfg(not(target_env = "msvc"))]
use tikv_jemallocator::Jemalloc;

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: Jemalloc = Jemalloc;

mod serve;
mod shutdown;
mod token;
mod volunteer;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use sightline_config::SightlineConfig;

/// Sightline - session broker for assisted video calls.
#[derive(Parser, Debug)]
#[command(name = "sightline", version, about, long_about = None)]
struct Cli {
    /// Read configuration from this file instead of the XDG hierarchy.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Start the HTTP gateway.
    Serve,
    /// Administer the volunteer directory.
    Volunteer {
        #[command(subcommand)]
        action: volunteer::VolunteerCommand,
    },
    /// Mint or inspect media join tokens.
    Token {
        #[command(subcommand)]
        action: token::TokenCommand,
    },
    /// Validate the configuration and print it with secrets redacted.
    Config,
}

fn load_config(path: Option<&std::path::Path>) -> SightlineConfig {
    let loaded = match path {
        Some(path) => sightline_config::load_and_validate_path(path),
        None => sightline_config::load_and_validate(),
    };
    match loaded {
        Ok(config) => config,
        Err(errors) => {
            sightline_config::render_errors(&errors);
            std::process::exit(1);
        }
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    let Some(command) = cli.command else {
        println!("sightline: use --help for available commands");
        return;
    };

    let config = load_config(cli.config.as_deref());

    let result = match command {
        Commands::Serve => serve::run_serve(config).await,
        Commands::Volunteer { action } => volunteer::run(&config, action).await,
        Commands::Token { action } => token::run(&config, action),
        Commands::Config => {
            println!("{config:#?}");
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("sightline: {e}");
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    #[cfg(not(target_env = "msvc"))]
    fn jemalloc_is_active() {
        // Only jemalloc supports advancing the epoch.
        use tikv_jemalloc_ctl::{epoch, stats};
        epoch::advance().unwrap();
        let allocated = stats::allocated::read().unwrap();
        assert!(allocated > 0, "jemalloc should report non-zero allocation");
    }

    #[test]
    fn cli_parses_volunteer_add() {
        let cli = Cli::try_parse_from([
            "sightline",
            "volunteer",
            "add",
            "v1",
            "--consent",
            "--language",
            "en",
            "--language",
            "hi",
        ])
        .unwrap();
        match cli.command {
            Some(Commands::Volunteer {
                action:
                    volunteer::VolunteerCommand::Add {
                        id,
                        consent,
                        available,
                        languages,
                    },
            }) => {
                assert_eq!(id, "v1");
                assert!(consent);
                assert!(!available);
                assert_eq!(languages, vec!["en", "hi"]);
            }
            other => panic!("unexpected parse: {other:?}"),
        }
    }

    #[test]
    fn cli_parses_explicit_bool_for_set_available() {
        let args = ["sightline", "volunteer", "set-available", "v1", "false"];
        let cli = Cli::try_parse_from(args).unwrap();
        assert!(matches!(
            cli.command,
            Some(Commands::Volunteer {
                action: volunteer::VolunteerCommand::SetAvailable { available: false, .. }
            })
        ));
    }

    #[test]
    fn cli_accepts_global_config_flag() {
        let cli = Cli::try_parse_from(["sightline", "serve", "--config", "/tmp/s.toml"]).unwrap();
        assert_eq!(cli.config.as_deref(), Some(std::path::Path::new("/tmp/s.toml")));
    }
}
