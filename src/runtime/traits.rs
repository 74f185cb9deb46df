//! Trait abstractions for runtime I/O
//!
//! The transport implements these; the runtime and pairing engine only see
//! the traits, which lets tests drive them with mock implementations.

use crate::menu::Keyboard;
use crate::store::ParticipantId;
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// How message text is interpreted by the transport
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TextFormat {
    #[default]
    Plain,
    Markdown,
}

/// Rendering options for an outgoing message
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct MessageOptions {
    pub keyboard: Option<Keyboard>,
    pub format: TextFormat,
}

impl MessageOptions {
    pub fn plain() -> Self {
        Self::default()
    }

    pub fn markdown() -> Self {
        Self {
            keyboard: None,
            format: TextFormat::Markdown,
        }
    }

    pub fn with_keyboard(mut self, keyboard: Keyboard) -> Self {
        self.keyboard = Some(keyboard);
        self
    }
}

#[derive(Debug, Error)]
pub enum DeliveryError {
    #[error("recipient {0} is unreachable: {1}")]
    Unreachable(ParticipantId, String),
    #[error("message content is unchanged")]
    NotModified,
    #[error("message {} in chat {} can no longer be edited", .0.message_id, .0.chat)]
    NothingToEdit(MessageRef),
    #[error("transport error: {0}")]
    Transport(String),
}

/// Transport handle for acknowledging a button press
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionAck(pub String);

/// A message already shown in a participant's chat
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MessageRef {
    pub chat: ParticipantId,
    pub message_id: i64,
}

/// Platform metadata attached to every inbound event
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Profile {
    pub given_name: Option<String>,
    pub handle: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InboundKind {
    /// The entry command
    Start,
    /// A menu button press; `data` is the raw callback payload and `source`
    /// the message the button was attached to, when the transport knows it
    Action {
        data: String,
        ack: ActionAck,
        source: Option<MessageRef>,
    },
    /// Free text
    Text(String),
}

/// An event received from the transport
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Inbound {
    pub participant: ParticipantId,
    pub profile: Profile,
    pub kind: InboundKind,
}

/// Outbound delivery to participants
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send_message(
        &self,
        to: ParticipantId,
        text: &str,
        options: &MessageOptions,
    ) -> Result<(), DeliveryError>;

    /// Replace the content of `target`. Fails with `NotModified` when the
    /// content is identical and `NothingToEdit` when the message is gone.
    async fn edit_message(
        &self,
        target: MessageRef,
        text: &str,
        options: &MessageOptions,
    ) -> Result<(), DeliveryError>;

    /// Acknowledge a button press, optionally with a toast or alert
    async fn answer_action(
        &self,
        ack: &ActionAck,
        notice: Option<&str>,
        alert: bool,
    ) -> Result<(), DeliveryError>;
}

/// Unbounded feed of inbound events. `None` means the feed has ended.
#[async_trait]
pub trait EventSource: Send {
    async fn next_event(&mut self) -> Option<Inbound>;
}

// ============================================================================
// Arc implementations for trait objects
// ============================================================================

#[async_trait]
impl<T: Notifier + ?Sized> Notifier for Arc<T> {
    async fn send_message(
        &self,
        to: ParticipantId,
        text: &str,
        options: &MessageOptions,
    ) -> Result<(), DeliveryError> {
        (**self).send_message(to, text, options).await
    }

    async fn edit_message(
        &self,
        target: MessageRef,
        text: &str,
        options: &MessageOptions,
    ) -> Result<(), DeliveryError> {
        (**self).edit_message(target, text, options).await
    }

    async fn answer_action(
        &self,
        ack: &ActionAck,
        notice: Option<&str>,
        alert: bool,
    ) -> Result<(), DeliveryError> {
        (**self).answer_action(ack, notice, alert).await
    }
}
