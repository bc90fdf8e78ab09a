//! Command handlers for the mailgram CLI

use anyhow::Result;
use mailgram_core::config::{FileConfigProvider, ProviderStatus};
use mailgram_core::dispatch::{Dispatcher, RetryPolicy};
use mailgram_core::models::{Configuration, DispatchOutcome, NotificationRequest};
use mailgram_core::providers::{HttpTelegramClient, TracingNoticeSink};
use mailgram_core::services::logging::init_logging;
use std::io::Read;
use std::path::PathBuf;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// Sent verbatim by `mailgram test`
pub const TEST_MESSAGE: &str = "📧 *Test message*\n\nThis is a test message from mailgram.";

/// Where `send` takes its notification from
pub enum RequestInput {
    Flags {
        to: Vec<String>,
        subject: String,
        body: Option<String>,
        body_file: Option<PathBuf>,
        attachments: Vec<PathBuf>,
    },
    /// JSON document on stdin
    Json,
}

/// Expand `~/` and fall back to the default config location
pub fn resolve_config_path(config_arg: Option<&str>) -> Result<PathBuf> {
    match config_arg {
        None => Configuration::default_config_path()
            .map_err(|e| anyhow::anyhow!("Failed to get default config path: {}", e)),
        Some(arg) if arg.starts_with("~/") => {
            let home = std::env::var("HOME")
                .map_err(|_| anyhow::anyhow!("HOME environment variable not set"))?;
            Ok(PathBuf::from(arg.replacen("~/", &format!("{}/", home), 1)))
        }
        Some(arg) => Ok(PathBuf::from(arg)),
    }
}

fn load_config(config_arg: Option<&str>) -> Result<Configuration> {
    let path = resolve_config_path(config_arg)?;
    let config = FileConfigProvider::new(path)
        .load_configuration()
        .map_err(|e| anyhow::anyhow!("Failed to load configuration: {}", e))?;

    // A second subscriber (e.g. in tests) is not an error worth failing on
    let _ = init_logging(config.log_level);

    if let Err(problems) = config.validate() {
        return Err(anyhow::anyhow!(
            "Invalid configuration: {}",
            problems.join("; ")
        ));
    }
    Ok(config)
}

pub fn parse_request_json(input: &str) -> Result<NotificationRequest> {
    serde_json::from_str(input).map_err(|e| anyhow::anyhow!("Invalid notification JSON: {}", e))
}

pub fn build_request(input: RequestInput) -> Result<NotificationRequest> {
    match input {
        RequestInput::Json => {
            let mut raw = String::new();
            std::io::stdin()
                .read_to_string(&mut raw)
                .map_err(|e| anyhow::anyhow!("Failed to read stdin: {}", e))?;
            parse_request_json(&raw)
        }
        RequestInput::Flags {
            to,
            subject,
            body,
            body_file,
            attachments,
        } => {
            let body = match (body, body_file) {
                (Some(body), _) => body,
                (None, Some(path)) => std::fs::read_to_string(&path).map_err(|e| {
                    anyhow::anyhow!("Failed to read body file {}: {}", path.display(), e)
                })?,
                (None, None) => String::new(),
            };
            Ok(NotificationRequest::new(to, subject, body, attachments))
        }
    }
}

fn build_dispatcher(config: &Configuration) -> Result<Dispatcher> {
    let client = HttpTelegramClient::with_base_url(config.telegram.api_base.clone())
        .map_err(|e| anyhow::anyhow!("Failed to create HTTP client: {}", e))?;
    Ok(Dispatcher::new(Arc::new(client))
        .with_retry_policy(RetryPolicy::from_settings(&config.retry))
        .with_notice_sink(Arc::new(TracingNoticeSink)))
}

/// Cancel the dispatch on Ctrl-C; in-flight requests still complete
fn cancel_on_ctrl_c() -> CancellationToken {
    let token = CancellationToken::new();
    let child = token.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            child.cancel();
        }
    });
    token
}

fn print_outcome(outcome: &DispatchOutcome) {
    if outcome.success {
        println!(
            "✅ Delivered {} message part(s), {} attachment(s)",
            outcome.chunks_sent, outcome.attachments_sent
        );
    } else if outcome.cancelled {
        println!(
            "⏹️  Cancelled after {} message part(s)",
            outcome.chunks_sent
        );
    } else {
        println!(
            "❌ Delivery incomplete: {} failure(s)",
            outcome.failures.len()
        );
        for failure in &outcome.failures {
            println!("   - [{}] {}", failure.kind(), failure.message());
        }
    }
    if outcome.attachments_skipped > 0 {
        println!(
            "⚠️  {} attachment(s) not found, skipped",
            outcome.attachments_skipped
        );
    }
}

async fn run_dispatch(
    dispatcher: &Dispatcher,
    request: &NotificationRequest,
    config: &Configuration,
) -> Result<()> {
    let cancel = cancel_on_ctrl_c();
    let outcome = dispatcher
        .dispatch_with_cancel(request, &config.telegram, &cancel)
        .await
        .map_err(|e| anyhow::anyhow!("{}", e))?;

    print_outcome(&outcome);
    if outcome.success {
        Ok(())
    } else {
        Err(anyhow::anyhow!("Delivery did not complete"))
    }
}

pub async fn handle_send(input: RequestInput, config: Option<String>) -> Result<()> {
    let request = build_request(input)?;
    let config = load_config(config.as_deref())?;
    let dispatcher = build_dispatcher(&config)?;

    tracing::debug!(
        recipients = request.recipients.len(),
        attachments = request.attachments.len(),
        "Sending notification"
    );
    run_dispatch(&dispatcher, &request, &config).await
}

pub async fn handle_test(config: Option<String>) -> Result<()> {
    let config = load_config(config.as_deref())?;
    let dispatcher = build_dispatcher(&config)?
        .with_filter(|_, _: &NotificationRequest| TEST_MESSAGE.to_string());
    let request = NotificationRequest::default();

    println!("📤 Sending test message to {}", config.telegram.chat_id);
    run_dispatch(&dispatcher, &request, &config).await
}

pub fn handle_config_init(config_file: Option<String>, force: bool) -> Result<()> {
    let config_path = resolve_config_path(config_file.as_deref())?;

    println!("⚙️  Initializing mailgram configuration");
    println!("📄 Config file: {}", config_path.display());

    if config_path.exists() && !force {
        return Err(anyhow::anyhow!(
            "Configuration file already exists (use --force to overwrite)"
        ));
    }

    Configuration::default()
        .save_to_file(&config_path)
        .map_err(|e| anyhow::anyhow!("Failed to save configuration: {}", e))?;

    println!("✅ Configuration written");
    println!();
    println!("Next steps:");
    println!("  1. Set telegram.bot_token and telegram.chat_id in the file");
    println!("     (or export MAILGRAM_TELEGRAM_BOT_TOKEN / MAILGRAM_TELEGRAM_CHAT_ID)");
    println!("  2. Run: mailgram test");
    Ok(())
}

pub fn handle_config_check(config: Option<String>) -> Result<()> {
    let path = resolve_config_path(config.as_deref())?;
    let configuration = FileConfigProvider::new(path.clone())
        .load_configuration()
        .map_err(|e| anyhow::anyhow!("Failed to load configuration: {}", e))?;

    let status = ProviderStatus::of(&configuration.telegram);
    println!("📄 Config file: {}", path.display());
    println!(
        "telegram\t{}\tattachments={}",
        status.as_str(),
        if configuration.telegram.send_attachments {
            "on"
        } else {
            "off"
        }
    );

    if let Err(problems) = configuration.validate() {
        for problem in problems {
            println!("  - {}", problem);
        }
    }
    Ok(())
}
