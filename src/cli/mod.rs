//! Command-line interface parsing and handling
//!
//! This module handles parsing command-line arguments and executing the appropriate commands.

pub mod demo;
pub mod settings;

use std::error::Error;

use clap::{Parser, Subcommand};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

use crate::cli::demo::run_demo;
use crate::cli::settings::{run_set, run_unset, SettingRegistry};
use crate::core::config::data::path_display;
use crate::core::config::Config;

const LONG_VERSION: &str = concat!(
    env!("CARGO_PKG_VERSION"),
    " (",
    env!("VERGEN_GIT_DESCRIBE"),
    ")"
);

#[derive(Parser)]
#[command(name = "murmur")]
#[command(version, long_version = LONG_VERSION)]
#[command(about = "Screen-reader narration for colony management games")]
#[command(
    long_about = "Murmur speaks what a colony management game shows on screen and adds \
keyboard modes for the parts that normally need a mouse: painting areas, browsing \
the commands of the selection, sorting the mod list and reading dialog trees.\n\n\
The demo runs against a built-in sample colony and prints every announcement.\n\n\
Controls (no mode open):\n\
  g                 Browse commands of the selection\n\
  G                 Browse commands at the map cursor\n\
  m                 Open the mod list\n\
  x / X             Expand / shrink the Home area\n\
  d                 Show a sample dialog\n\
  Arrows            Move the map cursor\n\
  r                 Repeat the last announcement\n\
  t                 Pause or resume the transcript\n\
  q / Ctrl+C        Quit\n\n\
Configuration:\n\
  murmur config     Show the configuration\n\
  murmur set        List settings, or set one with 'murmur set <key> <value>'"
)]
pub struct Args {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Write a transcript of every announcement to this file
    #[arg(short = 'l', long, global = true)]
    pub log: Option<String>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the narrator against the sample colony (default)
    Demo {
        /// Comma-separated key presses to replay instead of reading the terminal,
        /// for example "m,Down,Ctrl+Down,Enter"
        #[arg(long, value_name = "KEYS")]
        keys: Option<String>,
    },
    /// Print the current configuration
    Config,
    /// Set configuration values
    Set {
        /// Configuration key to set; lists all settings when omitted
        key: Option<String>,
        /// Value to set for the key
        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        value: Vec<String>,
    },
    /// Unset configuration values
    Unset {
        /// Configuration key to unset
        key: String,
    },
}

pub fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();
    let config_path = Config::get_config_path()?;
    let config = Config::load_from_path(&config_path)?;
    init_tracing(&config);

    match args.command.unwrap_or(Commands::Demo { keys: None }) {
        Commands::Demo { keys } => run_demo(&config, keys.as_deref(), args.log),
        Commands::Config => {
            println!("Config file: {}", path_display(&config_path));
            config.print_all();
            Ok(())
        }
        Commands::Set { key, value } => {
            let registry = SettingRegistry::new();
            match run_set(&registry, key.as_deref(), &value, &config_path) {
                Ok(message) => {
                    println!("{message}");
                    Ok(())
                }
                Err(err) => {
                    err.print();
                    std::process::exit(err.exit_code());
                }
            }
        }
        Commands::Unset { key } => {
            let registry = SettingRegistry::new();
            match run_unset(&registry, &key, &config_path) {
                Ok(message) => {
                    println!("{message}");
                    Ok(())
                }
                Err(err) => {
                    err.print();
                    std::process::exit(err.exit_code());
                }
            }
        }
    }
}

/// Diagnostics go to stderr; stdout carries the narration.
fn init_tracing(config: &Config) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_filter()))
        .unwrap_or_else(|_| EnvFilter::new(crate::core::config::data::DEFAULT_LOG_FILTER));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}
