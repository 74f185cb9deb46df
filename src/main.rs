//! Gift raffle - Telegram bot for a secret gift exchange
//!
//! Participants register through an inline menu. Once the registry reaches
//! capacity, everyone is paired at random and told their partner in private.

mod config;
mod menu;
mod messages;
mod pairing;
mod runtime;
mod state_machine;
mod store;
mod telegram;

use config::RaffleConfig;
use pairing::PairingEngine;
use runtime::ProductionManager;
use std::sync::Arc;
use store::RaffleStore;
use telegram::{TelegramBot, UpdatePoller};
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Local .env is optional
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "gift_raffle=info".into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .json()
                .with_current_span(false)
                .with_span_list(false),
        )
        .init();

    let config = match RaffleConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            tracing::error!(error = %e, "Invalid configuration");
            return Err(e.into());
        }
    };

    if !config.is_pairable() {
        tracing::warn!(
            max_users = config.max_users,
            "MAX_USERS is odd; the filled raffle cannot be paired"
        );
    }

    let bot = Arc::new(TelegramBot::new(
        &config.api_url,
        &config.bot_token,
        config.request_timeout(),
    )?);

    let me = match bot.get_me().await {
        Ok(me) => me,
        Err(e) => {
            if e.is_unauthorized() {
                tracing::error!("BOT_TOKEN was rejected by Telegram");
            } else {
                tracing::error!(error = %e, "Could not reach the Bot API");
            }
            return Err(e.into());
        }
    };

    tracing::info!(
        bot = %me.username.as_deref().unwrap_or(&me.first_name),
        max_users = config.max_users,
        operator = config.admin_id.is_some(),
        "Gift raffle bot started"
    );

    let store = Arc::new(RaffleStore::new(config.max_users, config.shared_secret.clone()));
    let manager: ProductionManager =
        runtime::RuntimeManager::new(store, bot.clone(), PairingEngine::new(config.admin_id));
    let poller = UpdatePoller::new(bot, config.poll_timeout, config.retry_delay);

    let cancel = CancellationToken::new();
    let shutdown = cancel.clone();
    tokio::spawn(async move {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl-C");
        }
        shutdown.cancel();
    });

    runtime::serve(poller, &manager, cancel).await;
    manager.shutdown().await;

    tracing::info!("Gift raffle bot stopped");
    Ok(())
}
