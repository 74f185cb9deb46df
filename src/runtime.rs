//! Runtime for executing conversations
//!
//! Each participant gets its own task, so events from one participant are
//! handled strictly in arrival order while different participants proceed
//! concurrently. The only state shared across tasks is the store, whose lock
//! makes the join check and insert atomic.

mod executor;
pub mod traits;

#[cfg(test)]
pub mod testing;

pub use executor::ConversationRuntime;
pub use traits::*;

use crate::pairing::PairingEngine;
use crate::state_machine::ConvContext;
use crate::store::{ParticipantId, RaffleStore, RegistrationStore};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{mpsc, RwLock};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// Manager wired to the in-memory store and the Telegram transport
pub type ProductionManager = RuntimeManager<RaffleStore, crate::telegram::TelegramBot>;

/// Buffered inbound events per participant
const CONVERSATION_QUEUE: usize = 64;

/// Handle to interact with a running conversation
pub struct ConversationHandle {
    pub event_tx: mpsc::Sender<Inbound>,
    task: JoinHandle<()>,
}

/// Manager for all conversation runtimes
pub struct RuntimeManager<S, N>
where
    S: RegistrationStore + 'static,
    N: Notifier + 'static,
{
    store: Arc<S>,
    notifier: Arc<N>,
    pairing: Arc<PairingEngine>,
    runtimes: RwLock<HashMap<ParticipantId, ConversationHandle>>,
}

impl<S, N> RuntimeManager<S, N>
where
    S: RegistrationStore + 'static,
    N: Notifier + 'static,
{
    pub fn new(store: Arc<S>, notifier: Arc<N>, pairing: PairingEngine) -> Self {
        Self {
            store,
            notifier,
            pairing: Arc::new(pairing),
            runtimes: RwLock::new(HashMap::new()),
        }
    }

    /// Route an inbound event to its participant's conversation
    pub async fn dispatch(&self, inbound: Inbound) {
        let participant = inbound.participant;
        let event_tx = self.get_or_create(participant).await;
        if let Err(e) = event_tx.send(inbound).await {
            tracing::error!(participant = %participant, error = %e, "Conversation runtime is gone");
        }
    }

    async fn get_or_create(&self, participant: ParticipantId) -> mpsc::Sender<Inbound> {
        if let Some(handle) = self.runtimes.read().await.get(&participant) {
            return handle.event_tx.clone();
        }

        let mut runtimes = self.runtimes.write().await;
        runtimes
            .entry(participant)
            .or_insert_with(|| self.spawn(participant))
            .event_tx
            .clone()
    }

    fn spawn(&self, participant: ParticipantId) -> ConversationHandle {
        let (event_tx, event_rx) = mpsc::channel(CONVERSATION_QUEUE);
        let runtime = ConversationRuntime::new(
            ConvContext::new(participant),
            Arc::clone(&self.store),
            Arc::clone(&self.notifier),
            Arc::clone(&self.pairing),
            event_rx,
        );
        let task = tokio::spawn(async move {
            runtime.run().await;
        });
        tracing::debug!(participant = %participant, "Conversation created");
        ConversationHandle { event_tx, task }
    }

    /// Number of participants with a live conversation
    #[allow(dead_code)] // Diagnostics and tests
    pub async fn active_conversations(&self) -> usize {
        self.runtimes.read().await.len()
    }

    /// Close every conversation and wait for queued events to drain
    pub async fn shutdown(&self) {
        let handles: Vec<ConversationHandle> =
            self.runtimes.write().await.drain().map(|(_, h)| h).collect();

        for ConversationHandle { event_tx, task } in handles {
            drop(event_tx);
            if let Err(e) = task.await {
                tracing::error!(error = %e, "Conversation runtime panicked");
            }
        }
    }
}

/// Feed events from `source` into `manager` until the source ends or
/// `cancel` fires
pub async fn serve<E, S, N>(mut source: E, manager: &RuntimeManager<S, N>, cancel: CancellationToken)
where
    E: EventSource,
    S: RegistrationStore + 'static,
    N: Notifier + 'static,
{
    loop {
        tokio::select! {
            () = cancel.cancelled() => {
                tracing::info!("Shutdown requested");
                break;
            }
            event = source.next_event() => match event {
                Some(inbound) => manager.dispatch(inbound).await,
                None => {
                    tracing::info!("Event source ended");
                    break;
                }
            },
        }
    }
}
