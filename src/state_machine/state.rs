//! Conversation state types

use crate::store::ParticipantId;

/// Dialogue cursor for one participant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConvState {
    /// Main menu is showing; button presses are accepted
    #[default]
    SelectingAction,
    /// Next free text becomes the nickname
    TypingNickname,
    /// Next free text is checked against the shared secret
    TypingCredential,
}

impl ConvState {
    /// Whether the state consumes free text
    pub fn awaits_text(self) -> bool {
        matches!(self, ConvState::TypingNickname | ConvState::TypingCredential)
    }

    pub fn name(self) -> &'static str {
        match self {
            ConvState::SelectingAction => "selecting_action",
            ConvState::TypingNickname => "typing_nickname",
            ConvState::TypingCredential => "typing_credential",
        }
    }
}

/// Context for a conversation (immutable configuration)
#[derive(Debug, Clone)]
pub struct ConvContext {
    pub participant: ParticipantId,
}

impl ConvContext {
    pub fn new(participant: ParticipantId) -> Self {
        Self { participant }
    }
}
