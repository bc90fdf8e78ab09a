//! Config subcommands (init, check)

use clap::Subcommand;

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Write a configuration file with default values
    Init {
        /// Path to configuration file
        #[arg(long)]
        config_file: Option<String>,

        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
    /// Show whether the Telegram credentials are usable (no secrets)
    Check {
        /// Path to configuration file
        #[arg(long)]
        config: Option<String>,
    },
}
