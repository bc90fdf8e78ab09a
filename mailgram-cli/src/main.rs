mod cli;

use anyhow::Result;
use clap::{Parser, Subcommand};
use cli::config::ConfigCommands;
use cli::handlers;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "mailgram")]
#[command(version)]
#[command(about = "Relay email notifications to a Telegram chat")]
#[command(
    help_template = "{name} - {version}\n{about}\n\n{usage-heading}\n  {usage}\n\n{all-args}{options}\n"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Relay one notification to the configured chat
    ///
    /// Long bodies are split into several messages. Attachments are uploaded
    /// after the text when `send_attachments` is enabled; files that do not
    /// exist are skipped.
    ///
    /// JSON input (with --json), read from stdin:
    ///   {"recipients": ["a@x.com"], "subject": "Hi", "body": "...", "attachments": ["/tmp/a.pdf"]}
    ///
    /// Examples:
    ///   mailgram send --to admin@example.com --subject "New order" --body "Order #42"
    ///   mailgram send --to a@x.com --subject Report --body-file report.txt --attach report.pdf
    ///   echo '{"subject":"Hi","body":"Hello"}' | mailgram send --json
    Send {
        /// Recipient address (repeatable)
        #[arg(long = "to")]
        to: Vec<String>,

        /// Subject line
        #[arg(short, long, default_value = "")]
        subject: String,

        /// Message body
        #[arg(short, long, conflicts_with = "body_file")]
        body: Option<String>,

        /// Read the message body from a file
        #[arg(long)]
        body_file: Option<PathBuf>,

        /// Attachment path (repeatable)
        #[arg(short, long = "attach")]
        attach: Vec<PathBuf>,

        /// Read the whole notification as JSON from stdin
        #[arg(long, conflicts_with_all = ["to", "body", "body_file", "attach"])]
        json: bool,

        /// Path to configuration file
        #[arg(long)]
        config: Option<String>,
    },

    /// Send a test message to check the token and chat id
    Test {
        /// Path to configuration file
        #[arg(long)]
        config: Option<String>,
    },

    /// Manage the configuration file
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Send {
            to,
            subject,
            body,
            body_file,
            attach,
            json,
            config,
        } => {
            let input = if json {
                handlers::RequestInput::Json
            } else {
                handlers::RequestInput::Flags {
                    to,
                    subject,
                    body,
                    body_file,
                    attachments: attach,
                }
            };
            handlers::handle_send(input, config).await?;
        }
        Commands::Test { config } => {
            handlers::handle_test(config).await?;
        }
        Commands::Config { command } => match command {
            ConfigCommands::Init { config_file, force } => {
                handlers::handle_config_init(config_file, force)?;
            }
            ConfigCommands::Check { config } => {
                handlers::handle_config_check(config)?;
            }
        },
    }

    Ok(())
}
