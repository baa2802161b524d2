use std::time::Duration;

use anyhow::{Context, Result};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, warn};

use crate::models::{LinkButton, Reply};
use crate::store::ReportStore;
use crate::workflow::Workflow;

const API_BASE: &str = "https://api.telegram.org";

/// Pause before re-polling after a transport error
const POLL_RETRY_DELAY: Duration = Duration::from_secs(5);

/// Client for the Telegram Bot HTTP API
pub struct TelegramClient {
    client: Client,
    base_url: String,
}

#[derive(Debug, Deserialize)]
struct ApiResponse<T> {
    ok: bool,
    result: Option<T>,
    description: Option<String>,
}

/// One long-poll update. Only message updates are requested.
#[derive(Debug, Deserialize)]
pub struct Update {
    pub update_id: i64,
    pub message: Option<Message>,
}

#[derive(Debug, Deserialize)]
pub struct Message {
    pub chat: Chat,
    pub from: Option<User>,
    pub text: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct Chat {
    pub id: i64,
}

#[derive(Debug, Deserialize)]
pub struct User {
    pub first_name: String,
}

#[derive(Debug, Serialize)]
struct GetUpdatesRequest {
    offset: i64,
    timeout: u64,
    allowed_updates: &'static [&'static str],
}

#[derive(Debug, Serialize)]
struct SendMessageRequest<'a> {
    chat_id: i64,
    text: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    reply_markup: Option<InlineKeyboardMarkup>,
}

#[derive(Debug, Serialize)]
struct InlineKeyboardMarkup {
    inline_keyboard: Vec<Vec<InlineKeyboardButton>>,
}

#[derive(Debug, Serialize)]
struct InlineKeyboardButton {
    text: String,
    url: String,
}

impl TelegramClient {
    pub fn new(token: &str) -> Self {
        Self::with_base_url(API_BASE, token)
    }

    fn with_base_url(base: &str, token: &str) -> Self {
        Self {
            client: Client::new(),
            base_url: format!("{base}/bot{token}"),
        }
    }

    /// Long-poll for updates after `offset`, blocking server-side for up to
    /// `timeout` seconds.
    pub async fn get_updates(&self, offset: i64, timeout: u64) -> Result<Vec<Update>> {
        let request = GetUpdatesRequest {
            offset,
            timeout,
            allowed_updates: &["message"],
        };

        let response = self
            .client
            .post(format!("{}/getUpdates", self.base_url))
            // Leave headroom over the server-side long-poll window
            .timeout(Duration::from_secs(timeout + 10))
            .json(&request)
            .send()
            .await
            .context("getUpdates request failed")?;

        let body: ApiResponse<Vec<Update>> = response
            .json()
            .await
            .context("Failed to parse getUpdates response")?;

        if !body.ok {
            anyhow::bail!(
                "getUpdates rejected: {}",
                body.description.unwrap_or_default()
            );
        }

        Ok(body.result.unwrap_or_default())
    }

    /// Send a text message, optionally with a row of inline URL buttons
    pub async fn send_message(&self, chat_id: i64, text: &str, links: &[LinkButton]) -> Result<()> {
        let reply_markup = if links.is_empty() {
            None
        } else {
            Some(InlineKeyboardMarkup {
                inline_keyboard: vec![links
                    .iter()
                    .map(|l| InlineKeyboardButton {
                        text: l.label.clone(),
                        url: l.url.clone(),
                    })
                    .collect()],
            })
        };

        let request = SendMessageRequest {
            chat_id,
            text,
            reply_markup,
        };

        let response = self
            .client
            .post(format!("{}/sendMessage", self.base_url))
            .json(&request)
            .send()
            .await
            .context("sendMessage request failed")?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!(status = %status, body = %body, "sendMessage failed");
            anyhow::bail!("sendMessage returned error: {} - {}", status, body);
        }

        debug!(chat_id, "Message sent");

        Ok(())
    }
}

/// Static reply to the /start command; never reaches the workflow
fn greeting(first_name: &str) -> String {
    format!(
        "👋 Hello {first_name}\n\
         \n\
         Send phone number in international format\n\
         \n\
         Example:\n\
         +919876543210"
    )
}

/// Poll for messages and dispatch each one. Transport failures are logged
/// and the loop keeps going; per-message failures never escape the workflow.
pub async fn run<S: ReportStore>(
    client: &TelegramClient,
    workflow: &Workflow<S>,
    poll_timeout: u64,
) -> Result<()> {
    info!("Bot polling started");

    let mut offset = 0;

    loop {
        let updates = match client.get_updates(offset, poll_timeout).await {
            Ok(updates) => updates,
            Err(err) => {
                warn!(error = %err, "Polling failed, retrying");
                tokio::time::sleep(POLL_RETRY_DELAY).await;
                continue;
            }
        };

        for update in updates {
            offset = offset.max(update.update_id + 1);

            let Some(message) = update.message else {
                continue;
            };

            handle_message(client, workflow, message).await;
        }
    }
}

async fn handle_message<S: ReportStore>(
    client: &TelegramClient,
    workflow: &Workflow<S>,
    message: Message,
) {
    let Some(text) = message.text else {
        return;
    };

    let chat_id = message.chat.id;

    let reply = if text.starts_with("/start") {
        let first_name = message.from.map(|u| u.first_name).unwrap_or_default();
        Reply::plain(greeting(&first_name))
    } else {
        workflow.handle_message(&text).await
    };

    if let Err(err) = client.send_message(chat_id, &reply.text, &reply.links).await {
        error!(chat_id, error = %err, "Failed to deliver reply");
    }
}
