//! Startup configuration from the environment

use crate::store::ParticipantId;
use std::time::Duration;
use thiserror::Error;

pub const DEFAULT_MAX_USERS: usize = 10;
pub const DEFAULT_SECRET: &str = "secret123";
pub const DEFAULT_API_URL: &str = "https://api.telegram.org";
const DEFAULT_POLL_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("BOT_TOKEN is not set")]
    MissingToken,
    #[error("{var} must be a positive integer, got {value:?}")]
    InvalidNumber { var: &'static str, value: String },
    #[error("ADMIN_ID must be a chat id, got {0:?}")]
    InvalidAdmin(String),
    #[error("shared secret must not be empty")]
    EmptySecret,
}

/// Everything the bot needs to start
#[derive(Clone)]
pub struct RaffleConfig {
    pub bot_token: String,
    /// Registry capacity; reaching it triggers the raffle
    pub max_users: usize,
    pub shared_secret: String,
    /// Operator chat that receives the raffle summary
    pub admin_id: Option<ParticipantId>,
    pub api_url: String,
    pub poll_timeout: Duration,
    pub retry_delay: Duration,
}

impl std::fmt::Debug for RaffleConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RaffleConfig")
            .field("bot_token", &"<redacted>")
            .field("max_users", &self.max_users)
            .field("shared_secret", &"<redacted>")
            .field("admin_id", &self.admin_id)
            .field("api_url", &self.api_url)
            .field("poll_timeout", &self.poll_timeout)
            .field("retry_delay", &self.retry_delay)
            .finish()
    }
}

impl RaffleConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Build from an arbitrary variable lookup. Empty values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |var: &str| lookup(var).filter(|v| !v.trim().is_empty());

        let bot_token = get("BOT_TOKEN").ok_or(ConfigError::MissingToken)?;

        let max_users = match get("MAX_USERS") {
            Some(value) => parse_positive("MAX_USERS", &value)?,
            None => DEFAULT_MAX_USERS,
        };

        let shared_secret = lookup("SHARED_SECRET")
            .or_else(|| lookup("PASSWORD"))
            .unwrap_or_else(|| DEFAULT_SECRET.to_string());
        if shared_secret.is_empty() {
            return Err(ConfigError::EmptySecret);
        }

        let admin_id = get("ADMIN_ID")
            .map(|value| {
                value
                    .trim()
                    .parse::<i64>()
                    .map(ParticipantId)
                    .map_err(|_| ConfigError::InvalidAdmin(value.clone()))
            })
            .transpose()?;

        let poll_timeout = match get("POLL_TIMEOUT_SECS") {
            Some(value) => u64::try_from(parse_positive("POLL_TIMEOUT_SECS", &value)?)
                .unwrap_or(DEFAULT_POLL_TIMEOUT_SECS),
            None => DEFAULT_POLL_TIMEOUT_SECS,
        };

        Ok(Self {
            bot_token,
            max_users,
            shared_secret,
            admin_id,
            api_url: get("TELEGRAM_API_URL").unwrap_or_else(|| DEFAULT_API_URL.to_string()),
            poll_timeout: Duration::from_secs(poll_timeout),
            retry_delay: Duration::from_secs(5),
        })
    }

    /// An odd capacity fills up but can never be split into pairs
    pub fn is_pairable(&self) -> bool {
        self.max_users % 2 == 0
    }

    /// HTTP timeout for Bot API calls, leaving room for the long poll
    pub fn request_timeout(&self) -> Duration {
        self.poll_timeout + Duration::from_secs(10)
    }
}

fn parse_positive(var: &'static str, value: &str) -> Result<usize, ConfigError> {
    match value.trim().parse::<usize>() {
        Ok(n) if n > 0 => Ok(n),
        _ => Err(ConfigError::InvalidNumber {
            var,
            value: value.to_string(),
        }),
    }
}
