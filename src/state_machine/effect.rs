//! Effects produced by state transitions

use crate::pairing::RosterEntry;
use crate::runtime::TextFormat;

/// Effects to be executed after state transition
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Create the session if this is the first contact
    OpenSession { given_name: Option<String> },

    /// Store the nickname in the session
    SaveNickname { nickname: String },

    /// Check a credential attempt (yields `Event::CredentialChecked`)
    CheckCredential { attempt: String },

    /// Run the join eligibility check (yields `Event::RegistrationFinished`)
    TryRegister,

    /// Send a new message, with the freshly rendered main menu if requested
    Send {
        text: String,
        format: TextFormat,
        with_menu: bool,
    },

    /// Replace the last message; failure is ignored
    Edit {
        text: String,
        format: TextFormat,
        with_menu: bool,
    },

    /// Answer the pending button press
    Acknowledge { notice: Option<String>, alert: bool },

    /// Render registry counts over the last message
    ShowStatus,

    /// Draw pairs and deliver results
    RunRaffle { roster: Vec<RosterEntry> },
}

impl Effect {
    pub fn send_with_menu(text: String) -> Self {
        Effect::Send {
            text,
            format: TextFormat::Markdown,
            with_menu: true,
        }
    }

    pub fn send(text: String) -> Self {
        Effect::Send {
            text,
            format: TextFormat::Markdown,
            with_menu: false,
        }
    }

    pub fn edit_with_menu(text: String) -> Self {
        Effect::Edit {
            text,
            format: TextFormat::Markdown,
            with_menu: true,
        }
    }

    pub fn prompt(text: String) -> Self {
        Effect::Edit {
            text,
            format: TextFormat::Markdown,
            with_menu: false,
        }
    }

    pub fn ack() -> Self {
        Effect::Acknowledge {
            notice: None,
            alert: false,
        }
    }

    pub fn toast(notice: String, alert: bool) -> Self {
        Effect::Acknowledge {
            notice: Some(notice),
            alert,
        }
    }
}
