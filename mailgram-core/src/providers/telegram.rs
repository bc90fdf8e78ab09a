//! Telegram Bot API client: sendMessage and sendDocument.
//!
//! Success is signalled by `ok: true` in the JSON body, not by the HTTP status,
//! so both calls hand back the raw response for the caller to interpret.

use crate::error::TransportError;
use crate::models::{attachment_name, DEFAULT_API_BASE};
use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::Client;
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

/// Per-request timeout for every Bot API call
pub const REQUEST_TIMEOUT_SECS: u64 = 30;

/// Render mode sent with every text message
pub const PARSE_MODE: &str = "Markdown";

const RATE_LIMIT_CODE: i64 = 429;

/// HTTP status and body of a Bot API call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawResponse {
    pub status: u16,
    pub body: String,
}

/// Decoded Bot API response envelope
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ApiResponse {
    #[serde(default)]
    pub ok: bool,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub error_code: Option<i64>,
}

impl RawResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    /// Decode the JSON envelope. An unparseable body counts as a failed call.
    pub fn api_result(&self) -> ApiResponse {
        serde_json::from_str(&self.body).unwrap_or_else(|_| ApiResponse {
            ok: false,
            description: Some(format!(
                "Unknown Telegram API error (HTTP {})",
                self.status
            )),
            error_code: None,
        })
    }

    pub fn is_ok(&self) -> bool {
        self.api_result().ok
    }

    pub fn is_rate_limited(&self) -> bool {
        self.status == 429 || self.api_result().error_code == Some(RATE_LIMIT_CODE)
    }
}

impl ApiResponse {
    pub fn description_or_default(&self) -> String {
        self.description
            .clone()
            .unwrap_or_else(|| "Unknown Telegram API error".to_string())
    }
}

/// The two Bot API operations the dispatcher needs
#[async_trait]
pub trait TelegramApi: Send + Sync {
    /// POST sendMessage with `chat_id`, `text` and `parse_mode=Markdown`
    async fn send_text(
        &self,
        token: &str,
        chat_id: &str,
        text: &str,
    ) -> Result<RawResponse, TransportError>;

    /// POST sendDocument with the file as a multipart `document` part
    async fn send_document(
        &self,
        token: &str,
        chat_id: &str,
        path: &Path,
    ) -> Result<RawResponse, TransportError>;
}

/// reqwest-backed Bot API client. Never log the token: it is part of every URL.
#[derive(Clone)]
pub struct HttpTelegramClient {
    client: Client,
    api_base: String,
}

impl HttpTelegramClient {
    pub fn new() -> Result<Self, TransportError> {
        Self::with_base_url(DEFAULT_API_BASE)
    }

    /// Client for a non-default API endpoint (self-hosted Bot API server, tests)
    pub fn with_base_url(api_base: impl Into<String>) -> Result<Self, TransportError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()?;
        Ok(Self {
            client,
            api_base: api_base.into().trim_end_matches('/').to_string(),
        })
    }

    fn method_url(&self, token: &str, method: &str) -> String {
        format!("{}/bot{}/{}", self.api_base, token, method)
    }

    async fn into_raw(response: reqwest::Response) -> Result<RawResponse, TransportError> {
        let status = response.status().as_u16();
        let body = response.text().await?;
        Ok(RawResponse { status, body })
    }
}

#[async_trait]
impl TelegramApi for HttpTelegramClient {
    async fn send_text(
        &self,
        token: &str,
        chat_id: &str,
        text: &str,
    ) -> Result<RawResponse, TransportError> {
        let params = [("chat_id", chat_id), ("text", text), ("parse_mode", PARSE_MODE)];
        let response = self
            .client
            .post(self.method_url(token, "sendMessage"))
            .form(&params)
            .send()
            .await?;
        Self::into_raw(response).await
    }

    async fn send_document(
        &self,
        token: &str,
        chat_id: &str,
        path: &Path,
    ) -> Result<RawResponse, TransportError> {
        let bytes = tokio::fs::read(path)
            .await
            .map_err(|source| TransportError::File {
                path: path.to_path_buf(),
                source,
            })?;
        let part = Part::bytes(bytes)
            .file_name(attachment_name(path))
            .mime_str(mime_type_for(path))?;
        let form = Form::new()
            .text("chat_id", chat_id.to_string())
            .part("document", part);

        let response = self
            .client
            .post(self.method_url(token, "sendDocument"))
            .multipart(form)
            .send()
            .await?;
        Self::into_raw(response).await
    }
}

/// MIME type from the file extension
pub fn mime_type_for(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .unwrap_or_default();
    match ext.as_str() {
        "txt" | "log" => "text/plain",
        "csv" => "text/csv",
        "htm" | "html" => "text/html",
        "md" => "text/markdown",
        "xml" => "application/xml",
        "json" => "application/json",
        "pdf" => "application/pdf",
        "zip" => "application/zip",
        "gz" => "application/gzip",
        "doc" => "application/msword",
        "docx" => "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
        "xls" => "application/vnd.ms-excel",
        "xlsx" => "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
        "odt" => "application/vnd.oasis.opendocument.text",
        "ics" => "text/calendar",
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "svg" => "image/svg+xml",
        "mp3" => "audio/mpeg",
        "ogg" => "audio/ogg",
        "mp4" => "video/mp4",
        _ => "application/octet-stream",
    }
}
