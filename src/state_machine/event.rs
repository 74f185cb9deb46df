//! Events that can occur in a conversation

use crate::menu::MenuAction;
use crate::store::RegisterOutcome;

/// Events that trigger state transitions
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    // User events
    Start {
        given_name: Option<String>,
    },
    Action {
        action: MenuAction,
    },
    Text {
        text: String,
    },

    // Store results fed back by the runtime
    CredentialChecked {
        verified: bool,
    },
    RegistrationFinished {
        outcome: RegisterOutcome,
    },
}

impl Event {
    pub fn kind(&self) -> &'static str {
        match self {
            Event::Start { .. } => "start",
            Event::Action { .. } => "action",
            Event::Text { .. } => "text",
            Event::CredentialChecked { .. } => "credential_checked",
            Event::RegistrationFinished { .. } => "registration_finished",
        }
    }
}
