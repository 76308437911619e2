//! Telegram Bot API client -- messages and polls.

use serde_json::json;
use tracing::debug;

use crate::error::TelegramError;

const API_BASE: &str = "https://api.telegram.org";

/// A poll ready to send. Telegram accepts 2 to 10 options; the bounds
/// are checked here before any network call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PollSpec {
    pub question: String,
    pub options: Vec<String>,
    pub is_anonymous: bool,
    pub allows_multiple_answers: bool,
    pub explanation: Option<String>,
}

impl PollSpec {
    /// # Errors
    ///
    /// Returns `InvalidOptionCount` when the option count is outside
    /// the API bounds.
    pub fn validate(&self) -> Result<(), TelegramError> {
        let count = self.options.len();
        if !(2..=10).contains(&count) {
            return Err(TelegramError::InvalidOptionCount { count });
        }
        Ok(())
    }
}

/// The outgoing message channel. The production implementation is
/// [`TelegramBot`]; tests substitute a recording fake.
pub trait MessageChannel {
    /// Send a text message, optionally into a forum topic.
    fn send_message(
        &self,
        text: &str,
        thread_id: Option<i64>,
    ) -> impl std::future::Future<Output = Result<(), TelegramError>> + Send;

    /// Send a poll, optionally into a forum topic. Returns the message id.
    fn send_poll(
        &self,
        spec: &PollSpec,
        thread_id: Option<i64>,
    ) -> impl std::future::Future<Output = Result<i64, TelegramError>> + Send;
}

/// Bot API client bound to one chat.
#[derive(Debug, Clone)]
pub struct TelegramBot {
    client: reqwest::Client,
    api_base: String,
    token: String,
    chat_id: i64,
}

impl TelegramBot {
    pub fn new(token: &str, chat_id: i64) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_base: API_BASE.to_string(),
            token: token.to_string(),
            chat_id,
        }
    }

    /// Point the client at a different API host (tests).
    pub fn with_api_base(mut self, base: &str) -> Self {
        self.api_base = base.trim_end_matches('/').to_string();
        self
    }

    async fn call(
        &self,
        method: &str,
        body: serde_json::Value,
    ) -> Result<serde_json::Value, TelegramError> {
        let url = format!("{}/bot{}/{}", self.api_base, self.token, method);
        debug!(method = %method, "calling Telegram API");

        let resp = self.client.post(&url).json(&body).send().await?;
        let status = resp.status();
        let payload: serde_json::Value = resp.json().await.unwrap_or_else(|_| json!({}));

        let ok = payload
            .get("ok")
            .and_then(serde_json::Value::as_bool)
            .unwrap_or(false);
        if !status.is_success() || !ok {
            let description = payload
                .get("description")
                .and_then(serde_json::Value::as_str)
                .unwrap_or("no description")
                .to_string();
            return Err(TelegramError::Api {
                method: method.to_string(),
                description,
            });
        }
        Ok(payload)
    }
}

impl MessageChannel for TelegramBot {
    async fn send_message(
        &self,
        text: &str,
        thread_id: Option<i64>,
    ) -> Result<(), TelegramError> {
        let mut body = json!({
            "chat_id": self.chat_id,
            "text": text,
        });
        if let Some(thread) = thread_id {
            body["message_thread_id"] = json!(thread);
        }
        self.call("sendMessage", body).await?;
        Ok(())
    }

    async fn send_poll(
        &self,
        spec: &PollSpec,
        thread_id: Option<i64>,
    ) -> Result<i64, TelegramError> {
        spec.validate()?;

        let mut body = json!({
            "chat_id": self.chat_id,
            "question": spec.question,
            "options": spec.options,
            "is_anonymous": spec.is_anonymous,
            "allows_multiple_answers": spec.allows_multiple_answers,
        });
        if let Some(ref explanation) = spec.explanation {
            body["explanation"] = json!(explanation);
        }
        if let Some(thread) = thread_id {
            body["message_thread_id"] = json!(thread);
        }

        let payload = self.call("sendPoll", body).await?;
        payload
            .get("result")
            .and_then(|r| r.get("message_id"))
            .and_then(serde_json::Value::as_i64)
            .ok_or_else(|| TelegramError::Api {
                method: "sendPoll".to_string(),
                description: "response missing result.message_id".to_string(),
            })
    }
}
