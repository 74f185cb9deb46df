//! Conversation runtime executor

use super::traits::{
    ActionAck, DeliveryError, Inbound, InboundKind, MessageOptions, MessageRef, Notifier, Profile,
    TextFormat,
};
use crate::menu::{self, MenuAction};
use crate::messages;
use crate::pairing::PairingEngine;
use crate::state_machine::{transition, ConvContext, ConvState, Effect, Event, TransitionError};
use crate::store::{RegisterOutcome, RegistrationStore};
use std::sync::Arc;
use tokio::sync::mpsc;

/// Drives one participant's dialogue. Events for the participant arrive in
/// order on `event_rx` and are handled one at a time.
pub struct ConversationRuntime<S, N>
where
    S: RegistrationStore + 'static,
    N: Notifier + 'static,
{
    context: ConvContext,
    state: ConvState,
    store: Arc<S>,
    notifier: Arc<N>,
    pairing: Arc<PairingEngine>,
    /// Platform metadata from the most recent inbound event
    profile: Profile,
    /// Button press still waiting for an answer
    pending_ack: Option<ActionAck>,
    /// Message the current button press came from; the only message edits touch
    edit_target: Option<MessageRef>,
    event_rx: mpsc::Receiver<Inbound>,
}

impl<S, N> ConversationRuntime<S, N>
where
    S: RegistrationStore + 'static,
    N: Notifier + 'static,
{
    pub fn new(
        context: ConvContext,
        store: Arc<S>,
        notifier: Arc<N>,
        pairing: Arc<PairingEngine>,
        event_rx: mpsc::Receiver<Inbound>,
    ) -> Self {
        Self {
            context,
            state: ConvState::default(),
            store,
            notifier,
            pairing,
            profile: Profile::default(),
            pending_ack: None,
            edit_target: None,
            event_rx,
        }
    }

    pub async fn run(mut self) {
        tracing::debug!(participant = %self.context.participant, "Starting conversation runtime");

        while let Some(inbound) = self.event_rx.recv().await {
            self.handle_inbound(inbound).await;
        }

        tracing::debug!(participant = %self.context.participant, "Conversation runtime stopped");
    }

    async fn handle_inbound(&mut self, inbound: Inbound) {
        let Inbound { profile, kind, .. } = inbound;
        self.profile = profile;
        self.edit_target = None;

        let event = match kind {
            InboundKind::Start => Event::Start {
                given_name: self.profile.given_name.clone(),
            },
            InboundKind::Text(text) => Event::Text { text },
            InboundKind::Action { data, ack, source } => {
                self.pending_ack = Some(ack);
                self.edit_target = source;
                if let Some(action) = MenuAction::from_id(&data) {
                    Event::Action { action }
                } else {
                    tracing::warn!(
                        participant = %self.context.participant,
                        data = %data,
                        "Unknown menu action"
                    );
                    self.flush_ack().await;
                    return;
                }
            }
        };

        if let Err(e) = self.process_event(event).await {
            tracing::debug!(
                participant = %self.context.participant,
                state = self.state.name(),
                awaiting_text = self.state.awaits_text(),
                error = %e,
                "Event not accepted"
            );
        }

        // Every button press gets answered, even when nothing else happened
        self.flush_ack().await;
    }

    async fn process_event(&mut self, event: Event) -> Result<(), TransitionError> {
        // Effects that consult the store feed their result back as a new event
        let mut events_to_process = vec![event];

        while let Some(current_event) = events_to_process.pop() {
            // Pure state transition
            let result = transition(&self.state, &self.context, current_event)?;

            if result.new_state != self.state {
                tracing::debug!(
                    participant = %self.context.participant,
                    from = self.state.name(),
                    to = result.new_state.name(),
                    "State changed"
                );
            }
            self.state = result.new_state;

            for effect in result.effects {
                if let Some(generated_event) = self.execute_effect(effect).await {
                    events_to_process.push(generated_event);
                }
            }
        }

        Ok(())
    }

    async fn execute_effect(&mut self, effect: Effect) -> Option<Event> {
        let participant = self.context.participant;
        match effect {
            Effect::OpenSession { given_name } => {
                self.store
                    .open_session(participant, given_name.as_deref())
                    .await;
                None
            }

            Effect::SaveNickname { nickname } => {
                if let Err(e) = self.store.try_set_nickname(participant, &nickname).await {
                    tracing::warn!(participant = %participant, error = %e, "Nickname not saved");
                }
                None
            }

            Effect::CheckCredential { attempt } => {
                let verified = self
                    .store
                    .try_verify_credential(participant, &attempt)
                    .await;
                tracing::info!(participant = %participant, verified, "Credential checked");
                Some(Event::CredentialChecked { verified })
            }

            Effect::TryRegister => {
                let outcome = self
                    .store
                    .try_register(participant, self.profile.handle.as_deref())
                    .await;
                tracing::info!(participant = %participant, outcome = outcome_label(&outcome), "Join attempted");
                Some(Event::RegistrationFinished { outcome })
            }

            Effect::Send {
                text,
                format,
                with_menu,
            } => {
                let options = self.options(format, with_menu).await;
                if let Err(e) = self.notifier.send_message(participant, &text, &options).await {
                    tracing::warn!(participant = %participant, error = %e, "Failed to send message");
                }
                None
            }

            Effect::Edit {
                text,
                format,
                with_menu,
            } => {
                let options = self.options(format, with_menu).await;
                self.edit_or_send(&text, &options).await;
                None
            }

            Effect::Acknowledge { notice, alert } => {
                if let Some(ack) = self.pending_ack.take() {
                    if let Err(e) = self
                        .notifier
                        .answer_action(&ack, notice.as_deref(), alert)
                        .await
                    {
                        tracing::debug!(participant = %participant, error = %e, "Failed to answer action");
                    }
                }
                None
            }

            Effect::ShowStatus => {
                let status = self.store.status(participant).await;
                let options = self.options(TextFormat::Markdown, true).await;
                self.edit_or_send(&messages::status(&status), &options).await;
                None
            }

            Effect::RunRaffle { roster } => {
                tracing::info!(
                    participant = %participant,
                    participants = roster.len(),
                    "Registry full, running raffle"
                );
                self.pairing.run(&roster, self.notifier.as_ref()).await;
                None
            }
        }
    }

    /// Message options, rendering the menu from the current store contents
    async fn options(&self, format: TextFormat, with_menu: bool) -> MessageOptions {
        let options = MessageOptions {
            keyboard: None,
            format,
        };
        if !with_menu {
            return options;
        }
        let view = self.store.menu_view(self.context.participant).await;
        options.with_keyboard(menu::main_menu(&view))
    }

    /// Best-effort edit of the pressed message. Unchanged content is ignored;
    /// without an editable message the text is sent as a new message instead.
    async fn edit_or_send(&self, text: &str, options: &MessageOptions) {
        let participant = self.context.participant;
        if let Some(target) = self.edit_target {
            match self.notifier.edit_message(target, text, options).await {
                Ok(()) | Err(DeliveryError::NotModified) => return,
                Err(DeliveryError::NothingToEdit(_)) => {}
                Err(e) => {
                    tracing::debug!(participant = %participant, error = %e, "Edit skipped");
                    return;
                }
            }
        }
        if let Err(e) = self.notifier.send_message(participant, text, options).await {
            tracing::warn!(participant = %participant, error = %e, "Failed to send message");
        }
    }

    async fn flush_ack(&mut self) {
        if let Some(ack) = self.pending_ack.take() {
            if let Err(e) = self.notifier.answer_action(&ack, None, false).await {
                tracing::debug!(
                    participant = %self.context.participant,
                    error = %e,
                    "Failed to answer action"
                );
            }
        }
    }
}

fn outcome_label(outcome: &RegisterOutcome) -> &'static str {
    match outcome {
        RegisterOutcome::AlreadyRegistered => "already_registered",
        RegisterOutcome::MissingData => "missing_data",
        RegisterOutcome::CapacityFull { .. } => "capacity_full",
        RegisterOutcome::Registered { roster: None, .. } => "registered",
        RegisterOutcome::Registered { roster: Some(_), .. } => "registered_filled",
    }
}
