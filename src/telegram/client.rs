//! Bot API client

use super::types::{
    parse_mode, AnswerCallbackQuery, ApiResponse, EditMessageText, GetUpdates,
    InlineKeyboardMarkup, Message, SendMessage, Update, User,
};
use super::TelegramError;
use crate::runtime::{ActionAck, DeliveryError, MessageOptions, MessageRef, Notifier};
use crate::store::ParticipantId;
use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::time::Duration;

const ALLOWED_UPDATES: &[&str] = &["message", "callback_query"];

/// Bot API client and delivery channel. Holds no per-chat state.
pub struct TelegramBot {
    client: Client,
    base_url: String,
}

impl TelegramBot {
    /// `request_timeout` must exceed the long-poll timeout
    pub fn new(api_url: &str, token: &str, request_timeout: Duration) -> Result<Self, TelegramError> {
        let client = Client::builder().timeout(request_timeout).build()?;
        Ok(Self {
            client,
            base_url: format!("{}/bot{token}", api_url.trim_end_matches('/')),
        })
    }

    async fn call<P, R>(&self, method: &str, params: &P) -> Result<R, TelegramError>
    where
        P: Serialize + ?Sized + Sync,
        R: DeserializeOwned,
    {
        let url = format!("{}/{method}", self.base_url);
        let response: ApiResponse<R> = self
            .client
            .post(&url)
            .json(params)
            .send()
            .await?
            .json()
            .await?;
        response.into_result()
    }

    /// Validate the token and identify the bot
    pub async fn get_me(&self) -> Result<User, TelegramError> {
        self.call("getMe", &serde_json::json!({})).await
    }

    pub async fn get_updates(&self, offset: i64, timeout_secs: u64) -> Result<Vec<Update>, TelegramError> {
        let params = GetUpdates {
            offset,
            timeout: timeout_secs,
            allowed_updates: ALLOWED_UPDATES,
        };
        self.call("getUpdates", &params).await
    }
}

fn delivery_error(to: ParticipantId, e: &TelegramError) -> DeliveryError {
    if e.is_not_modified() {
        DeliveryError::NotModified
    } else if e.is_unreachable() {
        DeliveryError::Unreachable(to, e.to_string())
    } else {
        DeliveryError::Transport(e.to_string())
    }
}

#[async_trait]
impl Notifier for TelegramBot {
    async fn send_message(
        &self,
        to: ParticipantId,
        text: &str,
        options: &MessageOptions,
    ) -> Result<(), DeliveryError> {
        let params = SendMessage {
            chat_id: to.0,
            text,
            parse_mode: parse_mode(options.format),
            reply_markup: options.keyboard.as_ref().map(InlineKeyboardMarkup::from),
        };
        let message: Message = self
            .call("sendMessage", &params)
            .await
            .map_err(|e| delivery_error(to, &e))?;
        tracing::trace!(participant = %to, message_id = message.message_id, "Message sent");
        Ok(())
    }

    async fn edit_message(
        &self,
        target: MessageRef,
        text: &str,
        options: &MessageOptions,
    ) -> Result<(), DeliveryError> {
        let params = EditMessageText::new(target, text, options);
        // editMessageText returns the edited Message (or `true` for inline messages)
        self.call::<_, serde_json::Value>("editMessageText", &params)
            .await
            .map(|_| ())
            .map_err(|e| {
                if e.is_edit_target_gone() {
                    DeliveryError::NothingToEdit(target)
                } else {
                    delivery_error(target.chat, &e)
                }
            })
    }

    async fn answer_action(
        &self,
        ack: &ActionAck,
        notice: Option<&str>,
        alert: bool,
    ) -> Result<(), DeliveryError> {
        let params = AnswerCallbackQuery {
            callback_query_id: &ack.0,
            text: notice,
            show_alert: alert,
        };
        self.call::<_, bool>("answerCallbackQuery", &params)
            .await
            .map(|_| ())
            .map_err(|e| DeliveryError::Transport(e.to_string()))
    }
}
