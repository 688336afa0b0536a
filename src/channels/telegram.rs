//! Telegram delivery adapter
//!
//! Long-polls the Bot API for incoming messages and relays each text
//! message through the query pipeline. Rejected and failed outcomes map to
//! fixed reply strings; internal errors never reach the chat.

use std::sync::Arc;
use std::time::Duration;

use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::pipeline::{QueryOutcome, QueryPipeline};
use crate::{Error, Result};

/// Telegram Bot API base URL
const API_BASE: &str = "https://api.telegram.org/bot";

/// Long-poll timeout passed to getUpdates, in seconds
const POLL_TIMEOUT_SECS: u64 = 30;

/// Pause between polls after a transport error
const ERROR_BACKOFF: Duration = Duration::from_secs(5);

/// Reply to the /start command
const START_REPLY: &str = "Hi! I help you find the best payment partners for \
your requirements. Just send me your request.";

/// Reply to the /help command
const HELP_REPLY: &str = "Describe your partner requirements (country, fee, \
currency, and so on) and I will pick the best options.";

/// Reply when the relevance gate rejects a query
const REJECTED_REPLY: &str = "I can only help with finding payment partners. \
Please refine your request.";

/// Reply when the pipeline fails internally
const FAILED_REPLY: &str = "Something went wrong while processing your \
request. Please try again later.";

/// Telegram long-polling bot
pub struct TelegramBot {
    token: String,
    client: Client,
    pipeline: Arc<QueryPipeline>,
}

impl TelegramBot {
    /// Create a bot over the given pipeline
    #[must_use]
    pub fn new(token: String, pipeline: Arc<QueryPipeline>) -> Self {
        Self {
            token,
            client: Client::new(),
            pipeline,
        }
    }

    /// Validate the bot token against the API
    ///
    /// # Errors
    ///
    /// Returns [`Error::Channel`] if the token is rejected
    pub async fn connect(&self) -> Result<()> {
        let url = format!("{API_BASE}{}/getMe", self.token);

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| Error::Channel(format!("Telegram getMe error: {e}")))?;

        if !response.status().is_success() {
            return Err(Error::Channel("invalid Telegram bot token".to_string()));
        }

        tracing::info!("Telegram bot connected");
        Ok(())
    }

    /// Poll for updates and relay messages until interrupted
    ///
    /// Deletes any existing webhook first so getUpdates works, then loops
    /// until ctrl-c.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Channel`] only for setup failures; per-update
    /// errors are logged and polling continues
    pub async fn run(&self) -> Result<()> {
        self.delete_webhook().await;

        let mut offset: Option<i64> = None;
        tracing::info!("Telegram bot polling for updates");

        loop {
            tokio::select! {
                () = shutdown_signal() => {
                    tracing::info!("shutdown signal received, stopping bot");
                    return Ok(());
                }
                result = self.poll_once(offset) => match result {
                    Ok(next_offset) => offset = next_offset.or(offset),
                    Err(e) => {
                        tracing::warn!(error = %e, "Telegram polling error");
                        tokio::time::sleep(ERROR_BACKOFF).await;
                    }
                }
            }
        }
    }

    /// One getUpdates call; handles every update and returns the next offset
    async fn poll_once(&self, offset: Option<i64>) -> Result<Option<i64>> {
        let url = format!("{API_BASE}{}/getUpdates", self.token);

        let mut params = serde_json::json!({
            "timeout": POLL_TIMEOUT_SECS,
            "allowed_updates": ["message"],
        });
        if let Some(off) = offset {
            params["offset"] = serde_json::json!(off);
        }

        let response = self
            .client
            .post(&url)
            .json(&params)
            .send()
            .await
            .map_err(|e| Error::Channel(format!("Telegram getUpdates error: {e}")))?;

        let updates: GetUpdatesResponse = response
            .json()
            .await
            .map_err(|e| Error::Channel(format!("Telegram getUpdates parse error: {e}")))?;

        let mut next_offset = None;
        for update in &updates.result {
            next_offset = Some(update.update_id + 1);
            self.handle_update(update).await;
        }

        Ok(next_offset)
    }

    /// Handle one update end to end; failures are logged, never propagated
    async fn handle_update(&self, update: &Update) {
        let Some(message) = &update.message else {
            return;
        };
        if message.from.as_ref().is_some_and(|user| user.is_bot) {
            return;
        }
        let Some(text) = message.text.as_deref() else {
            return;
        };
        let chat_id = message.chat.id;

        let reply = match text.trim() {
            "/start" => START_REPLY.to_string(),
            "/help" => HELP_REPLY.to_string(),
            query => {
                tracing::info!(chat_id, query, "incoming query");
                match self.pipeline.run(query).await {
                    QueryOutcome::Answered(answer) => answer,
                    QueryOutcome::Rejected => REJECTED_REPLY.to_string(),
                    QueryOutcome::Failed => FAILED_REPLY.to_string(),
                }
            }
        };

        if let Err(e) = self.send_message(chat_id, &reply).await {
            tracing::warn!(chat_id, error = %e, "failed to send reply");
        }
    }

    /// Send a plain-text message to a chat
    async fn send_message(&self, chat_id: i64, text: &str) -> Result<()> {
        let url = format!("{API_BASE}{}/sendMessage", self.token);

        let request = SendMessageRequest { chat_id, text };

        let response = self
            .client
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(|e| Error::Channel(format!("Telegram sendMessage error: {e}")))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Channel(format!(
                "Telegram sendMessage error: {status} - {body}"
            )));
        }

        Ok(())
    }

    /// Delete any existing webhook so getUpdates works
    async fn delete_webhook(&self) {
        let url = format!("{API_BASE}{}/deleteWebhook", self.token);
        if let Err(e) = self.client.post(&url).send().await {
            tracing::warn!(error = %e, "failed to delete Telegram webhook before polling");
        }
    }
}

/// Resolve when ctrl-c is received
async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "failed to listen for shutdown signal");
        // Without a signal handler, poll forever rather than busy-loop
        std::future::pending::<()>().await;
    }
}

/// Telegram sendMessage request
#[derive(Serialize)]
struct SendMessageRequest<'a> {
    chat_id: i64,
    text: &'a str,
}

/// Response from the getUpdates API
#[derive(Debug, Deserialize)]
struct GetUpdatesResponse {
    #[allow(dead_code)]
    ok: bool,
    #[serde(default)]
    result: Vec<Update>,
}

/// A single update
#[derive(Debug, Deserialize)]
struct Update {
    update_id: i64,
    message: Option<Message>,
}

/// Message content of an update
#[derive(Debug, Deserialize)]
struct Message {
    chat: Chat,
    from: Option<User>,
    text: Option<String>,
}

/// Chat info
#[derive(Debug, Deserialize)]
struct Chat {
    id: i64,
}

/// Sender info
#[derive(Debug, Deserialize)]
struct User {
    is_bot: bool,
}
