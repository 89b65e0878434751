//! Telegram Bot API client.
//!
//! Covers the handful of methods the bot needs: long polling, webhook
//! registration and sending text or documents.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::json;
use thiserror::Error;
use tracing::debug;

use crate::config::TelegramConfig;

/// Errors talking to the Bot API.
#[derive(Debug, Error)]
pub enum TelegramError {
    #[error("TELEGRAM_BOT_TOKEN is not configured")]
    MissingToken,

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Telegram API error in {method}: {description}")]
    Api {
        method: &'static str,
        description: String,
    },
}

/// Envelope around every Bot API response.
#[derive(Debug, Deserialize)]
struct ApiResponse<T> {
    ok: bool,
    result: Option<T>,
    description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Chat {
    pub id: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub message_id: i64,
    pub chat: Chat,
    #[serde(default)]
    pub text: Option<String>,
}

/// An incoming update; only messages are handled.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Update {
    pub update_id: i64,
    #[serde(default)]
    pub message: Option<Message>,
}

/// Where replies go.
#[async_trait]
pub trait ReplySink: Send + Sync {
    async fn send_text(&self, chat_id: i64, text: &str) -> Result<(), TelegramError>;

    async fn send_document(
        &self,
        chat_id: i64,
        file_name: &str,
        bytes: Vec<u8>,
    ) -> Result<(), TelegramError>;
}

/// Bot API client for one bot token.
#[derive(Clone)]
pub struct TelegramClient {
    client: Client,
    api_root: String,
}

impl TelegramClient {
    /// Create a client; fails without a bot token.
    pub fn new(config: &TelegramConfig) -> Result<Self, TelegramError> {
        let token = config
            .bot_token
            .as_deref()
            .filter(|t| !t.is_empty())
            .ok_or(TelegramError::MissingToken)?;

        // Long polls hold the connection open for the poll timeout
        let client = Client::builder()
            .timeout(Duration::from_secs(config.poll_timeout_seconds + 15))
            .build()?;

        Ok(Self {
            client,
            api_root: format!("{}/bot{}", config.base_url.trim_end_matches('/'), token),
        })
    }

    fn method_url(&self, method: &str) -> String {
        format!("{}/{}", self.api_root, method)
    }

    fn unwrap_response<T>(method: &'static str, body: ApiResponse<T>) -> Result<T, TelegramError> {
        match (body.ok, body.result) {
            (true, Some(result)) => Ok(result),
            _ => Err(TelegramError::Api {
                method,
                description: body
                    .description
                    .unwrap_or_else(|| "no description".to_string()),
            }),
        }
    }

    async fn call<T: DeserializeOwned>(
        &self,
        method: &'static str,
        params: serde_json::Value,
    ) -> Result<T, TelegramError> {
        debug!("Telegram: {}", method);
        let body: ApiResponse<T> = self
            .client
            .post(self.method_url(method))
            .json(&params)
            .send()
            .await?
            .json()
            .await?;
        Self::unwrap_response(method, body)
    }

    /// Long-poll for updates after `offset`.
    pub async fn get_updates(
        &self,
        offset: Option<i64>,
        timeout_seconds: u64,
    ) -> Result<Vec<Update>, TelegramError> {
        self.call(
            "getUpdates",
            json!({
                "offset": offset,
                "timeout": timeout_seconds,
                "allowed_updates": ["message"],
            }),
        )
        .await
    }

    /// Register `url` as the webhook endpoint.
    pub async fn set_webhook(&self, url: &str) -> Result<(), TelegramError> {
        let _: bool = self.call("setWebhook", json!({ "url": url })).await?;
        Ok(())
    }

    /// Remove any webhook so `getUpdates` works.
    pub async fn delete_webhook(&self) -> Result<(), TelegramError> {
        let _: bool = self.call("deleteWebhook", json!({})).await?;
        Ok(())
    }
}

#[async_trait]
impl ReplySink for TelegramClient {
    async fn send_text(&self, chat_id: i64, text: &str) -> Result<(), TelegramError> {
        let _: Message = self
            .call(
                "sendMessage",
                json!({
                    "chat_id": chat_id,
                    "text": text,
                    "parse_mode": "Markdown",
                }),
            )
            .await?;
        Ok(())
    }

    async fn send_document(
        &self,
        chat_id: i64,
        file_name: &str,
        bytes: Vec<u8>,
    ) -> Result<(), TelegramError> {
        debug!("Telegram: sendDocument {} ({} bytes)", file_name, bytes.len());
        let part = Part::bytes(bytes).file_name(file_name.to_string());
        let form = Form::new()
            .text("chat_id", chat_id.to_string())
            .part("document", part);

        let body: ApiResponse<Message> = self
            .client
            .post(self.method_url("sendDocument"))
            .multipart(form)
            .send()
            .await?
            .json()
            .await?;
        Self::unwrap_response("sendDocument", body).map(|_| ())
    }
}
