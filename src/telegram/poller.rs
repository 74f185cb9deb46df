//! Long-polling update feed

use super::TelegramBot;
use crate::runtime::{EventSource, Inbound};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;

/// Infinite event source backed by `getUpdates`
pub struct UpdatePoller {
    bot: Arc<TelegramBot>,
    /// Next update id to request; confirms everything before it
    offset: i64,
    timeout_secs: u64,
    retry_delay: Duration,
    buffer: VecDeque<Inbound>,
}

impl UpdatePoller {
    pub fn new(bot: Arc<TelegramBot>, timeout: Duration, retry_delay: Duration) -> Self {
        Self {
            bot,
            offset: 0,
            timeout_secs: timeout.as_secs(),
            retry_delay,
            buffer: VecDeque::new(),
        }
    }

    async fn poll(&mut self) {
        let updates = match self.bot.get_updates(self.offset, self.timeout_secs).await {
            Ok(updates) => updates,
            Err(e) => {
                tracing::warn!(error = %e, retry_in_ms = %self.retry_delay.as_millis(), "Polling failed");
                tokio::time::sleep(self.retry_delay).await;
                return;
            }
        };

        for update in updates {
            let update_id = update.update_id;
            self.offset = self.offset.max(update_id + 1);
            match update.into_inbound() {
                Some(inbound) => self.buffer.push_back(inbound),
                None => tracing::debug!(update_id, "Ignoring update"),
            }
        }
    }
}

#[async_trait]
impl EventSource for UpdatePoller {
    async fn next_event(&mut self) -> Option<Inbound> {
        loop {
            if let Some(inbound) = self.buffer.pop_front() {
                return Some(inbound);
            }
            self.poll().await;
        }
    }
}
