//! Telegram Bot API transport
//!
//! `TelegramBot` delivers messages (`Notifier`) and `UpdatePoller` feeds
//! updates obtained by long polling (`EventSource`).

mod client;
mod poller;
mod types;

pub use client::TelegramBot;
pub use poller::UpdatePoller;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum TelegramError {
    #[error("HTTP error: {0}")]
    Http(reqwest::Error),
    #[error("Telegram API error {code}: {description}")]
    Api { code: i32, description: String },
    #[error("Telegram API response had no result")]
    MissingResult,
}

impl From<reqwest::Error> for TelegramError {
    fn from(e: reqwest::Error) -> Self {
        // The request URL embeds the bot token
        TelegramError::Http(e.without_url())
    }
}

impl TelegramError {
    pub fn is_not_modified(&self) -> bool {
        matches!(self, TelegramError::Api { description, .. } if description.contains("message is not modified"))
    }

    /// Blocked by the user, chat deleted, or similar
    pub fn is_unreachable(&self) -> bool {
        matches!(self, TelegramError::Api { code: 403, .. })
            || matches!(self, TelegramError::Api { description, .. } if description.contains("chat not found"))
    }

    /// The message was deleted or can no longer be edited
    pub fn is_edit_target_gone(&self) -> bool {
        matches!(self, TelegramError::Api { description, .. }
            if description.contains("message to edit not found")
                || description.contains("message can't be edited"))
    }

    pub fn is_unauthorized(&self) -> bool {
        matches!(self, TelegramError::Api { code: 401, .. })
    }
}
