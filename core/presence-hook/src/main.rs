//! presence-hook: CLI harness for the journal-driven presence plugin.
//!
//! Drives [`presence_core::PresencePlugin`] the way the host would, using a
//! logging client in place of the real presence SDK.
//!
//! ## Subcommands
//!
//! - `replay`: Feed a journal file through the plugin
//! - `classify`: Classify one journal entry read from stdin
//! - `prefs`: Enable or disable presence in the config file
//! - `status`: Show the effective flag and connection settings

mod classify;
mod logging;
mod prefs;
mod replay;

use clap::{Args, Parser, Subcommand};
use presence_core::GameMode;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "presence-hook")]
#[command(about = "Elite Dangerous rich presence harness")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Replay a journal file (one JSON entry per line) through the plugin
    Replay {
        /// Journal file, e.g. Journal.2024-05-01T120000.01.log
        #[arg(value_name = "JOURNAL")]
        journal: PathBuf,

        /// Delay between entries in milliseconds
        #[arg(long, default_value_t = 0)]
        interval_ms: u64,

        /// Plugin directory handed to the plugin on start
        #[arg(long)]
        plugin_dir: Option<PathBuf>,

        #[command(flatten)]
        config: ConfigArgs,
    },

    /// Classify one journal entry read from stdin and print the descriptor
    Classify {
        /// Ambient star system
        #[arg(long)]
        system: Option<String>,

        /// Ambient station (when docked)
        #[arg(long)]
        station: Option<String>,

        /// Use the CQC classifier
        #[arg(long)]
        cqc: bool,

        /// CQC session runs under Horizons
        #[arg(long, requires = "cqc")]
        horizons: bool,

        /// CQC session runs under Odyssey
        #[arg(long, requires = "cqc")]
        odyssey: bool,
    },

    /// Enable or disable presence
    Prefs {
        #[arg(long, conflicts_with = "enable", required_unless_present = "enable")]
        disable: bool,

        #[arg(long)]
        enable: bool,

        #[command(flatten)]
        config: ConfigArgs,
    },

    /// Print the effective preferences and connection settings
    Status {
        #[command(flatten)]
        config: ConfigArgs,
    },
}

#[derive(Args)]
struct ConfigArgs {
    /// Config file (defaults to the platform config directory)
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,
}

fn main() {
    let _logging_guard = logging::init();
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Replay {
            journal,
            interval_ms,
            plugin_dir,
            config,
        } => replay::run(&journal, interval_ms, plugin_dir, config.config),
        Commands::Classify {
            system,
            station,
            cqc,
            horizons,
            odyssey,
        } => {
            let mode = cqc.then_some(GameMode { horizons, odyssey });
            classify::run(system.as_deref(), station.as_deref(), mode)
        }
        Commands::Prefs {
            disable,
            enable: _,
            config,
        } => prefs::set(disable, config.config),
        Commands::Status { config } => prefs::status(config.config),
    };

    if let Err(e) = result {
        tracing::error!(error = %e, "presence-hook failed");
        std::process::exit(1);
    }
}
