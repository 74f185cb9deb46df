//! Pure state transition function

use super::{ConvContext, ConvState, Effect, Event};
use crate::menu::MenuAction;
use crate::messages;
use crate::store::RegisterOutcome;
use thiserror::Error;

/// Result of a state transition
#[derive(Debug)]
pub struct TransitionResult {
    pub new_state: ConvState,
    pub effects: Vec<Effect>,
}

impl TransitionResult {
    pub fn new(state: ConvState) -> Self {
        Self {
            new_state: state,
            effects: vec![],
        }
    }

    pub fn with_effect(mut self, effect: Effect) -> Self {
        self.effects.push(effect);
        self
    }

    pub fn with_effects(mut self, effects: impl IntoIterator<Item = Effect>) -> Self {
        self.effects.extend(effects);
        self
    }
}

/// Events the current state does not accept. The state is left unchanged.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TransitionError {
    #[error("free text is only accepted while typing a nickname or password")]
    UnexpectedText,
    #[error("menu actions are not accepted while waiting for {0}")]
    AwaitingText(&'static str),
    #[error("Invalid transition: {0}")]
    InvalidTransition(String),
}

/// Pure transition function
///
/// Given the same inputs it always produces the same outputs; all I/O is
/// described by the returned effects.
pub fn transition(
    state: &ConvState,
    _context: &ConvContext,
    event: Event,
) -> Result<TransitionResult, TransitionError> {
    match (state, event) {
        // ============================================================
        // Entry point, valid from every state
        // ============================================================
        (_, Event::Start { given_name }) => Ok(TransitionResult::new(ConvState::SelectingAction)
            .with_effect(Effect::OpenSession { given_name })
            .with_effect(Effect::send_with_menu(messages::welcome()))),

        // ============================================================
        // Main menu
        // ============================================================
        (ConvState::SelectingAction, Event::Action { action }) => Ok(menu_action(action)),

        (ConvState::SelectingAction, Event::Text { .. }) => Err(TransitionError::UnexpectedText),

        (ConvState::SelectingAction, Event::CredentialChecked { verified }) => {
            let text = if verified {
                messages::credential_accepted()
            } else {
                messages::credential_rejected()
            };
            Ok(TransitionResult::new(ConvState::SelectingAction)
                .with_effect(Effect::send_with_menu(text)))
        }

        (ConvState::SelectingAction, Event::RegistrationFinished { outcome }) => {
            Ok(TransitionResult::new(ConvState::SelectingAction)
                .with_effects(registration_effects(outcome)))
        }

        // ============================================================
        // Free text input
        // ============================================================
        (ConvState::TypingNickname, Event::Text { text }) if text.is_empty() => {
            Ok(TransitionResult::new(ConvState::TypingNickname)
                .with_effect(Effect::send(messages::nickname_required())))
        }

        (ConvState::TypingNickname, Event::Text { text }) => {
            let confirmation = messages::nickname_saved(&text);
            Ok(TransitionResult::new(ConvState::SelectingAction)
                .with_effect(Effect::SaveNickname { nickname: text })
                .with_effect(Effect::send_with_menu(confirmation)))
        }

        (ConvState::TypingCredential, Event::Text { text }) => {
            Ok(TransitionResult::new(ConvState::SelectingAction)
                .with_effect(Effect::CheckCredential { attempt: text }))
        }

        (ConvState::TypingNickname, Event::Action { .. }) => {
            Err(TransitionError::AwaitingText("a nickname"))
        }

        (ConvState::TypingCredential, Event::Action { .. }) => {
            Err(TransitionError::AwaitingText("the password"))
        }

        // Store results only arrive right after the effect that asked for them,
        // which always leaves the machine in SelectingAction
        (
            ConvState::TypingNickname | ConvState::TypingCredential,
            event @ (Event::CredentialChecked { .. } | Event::RegistrationFinished { .. }),
        ) => Err(TransitionError::InvalidTransition(format!(
            "{} in {}",
            event.kind(),
            state.name()
        ))),
    }
}

fn menu_action(action: MenuAction) -> TransitionResult {
    match action {
        MenuAction::SetNickname => TransitionResult::new(ConvState::TypingNickname)
            .with_effect(Effect::ack())
            .with_effect(Effect::prompt(messages::prompt_nickname())),

        MenuAction::SetCredential => TransitionResult::new(ConvState::TypingCredential)
            .with_effect(Effect::ack())
            .with_effect(Effect::prompt(messages::prompt_credential())),

        MenuAction::Join => TransitionResult::new(ConvState::SelectingAction)
            .with_effect(Effect::ack())
            .with_effect(Effect::TryRegister),

        MenuAction::Status => TransitionResult::new(ConvState::SelectingAction)
            .with_effect(Effect::ack())
            .with_effect(Effect::ShowStatus),

        MenuAction::AlreadyRegistered => TransitionResult::new(ConvState::SelectingAction)
            .with_effect(Effect::toast(messages::toast_registered(), false)),

        MenuAction::JoinDisabled => TransitionResult::new(ConvState::SelectingAction)
            .with_effect(Effect::toast(messages::toast_incomplete(), true)),
    }
}

fn registration_effects(outcome: RegisterOutcome) -> Vec<Effect> {
    match outcome {
        RegisterOutcome::AlreadyRegistered => {
            vec![Effect::send(messages::already_registered())]
        }
        RegisterOutcome::MissingData => vec![Effect::send(messages::missing_data())],
        RegisterOutcome::CapacityFull { .. } => vec![
            Effect::send(messages::capacity_full()),
            Effect::edit_with_menu(messages::main_menu()),
        ],
        RegisterOutcome::Registered {
            count,
            capacity,
            roster,
        } => {
            let mut effects = vec![Effect::edit_with_menu(messages::registered(count, capacity))];
            if let Some(roster) = roster {
                effects.push(Effect::RunRaffle { roster });
            }
            effects
        }
    }
}
