//! Mock implementations for testing
//!
//! These mocks enable integration testing without real I/O.

use super::traits::*;
use crate::menu::MenuAction;
use crate::store::ParticipantId;
use async_trait::async_trait;
use std::collections::{BTreeMap, HashMap, HashSet, VecDeque};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

// ============================================================================
// Mock Notifier
// ============================================================================

/// A message recorded by the mock notifier
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedMessage {
    pub to: ParticipantId,
    /// Id of the message created (sends) or replaced (edits)
    pub message_id: i64,
    pub text: String,
    pub options: MessageOptions,
}

/// A recorded button press answer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedAck {
    pub ack: ActionAck,
    pub notice: Option<String>,
    pub alert: bool,
}

/// Messages currently on screen in one chat, keyed by message id
#[derive(Default)]
struct Chat {
    next_id: i64,
    visible: BTreeMap<i64, String>,
}

/// Notifier that records everything and can simulate unreachable recipients.
/// Message ids are assigned per chat starting at 1, like Telegram's.
#[allow(dead_code)]
pub struct MockNotifier {
    sent: Mutex<Vec<RecordedMessage>>,
    edits: Mutex<Vec<RecordedMessage>>,
    acks: Mutex<Vec<RecordedAck>>,
    chats: Mutex<HashMap<ParticipantId, Chat>>,
    failing: HashSet<ParticipantId>,
    /// Button press answers fail (query expired)
    failing_acks: bool,
}

#[allow(dead_code)]
impl MockNotifier {
    pub fn new() -> Self {
        Self {
            sent: Mutex::new(Vec::new()),
            edits: Mutex::new(Vec::new()),
            acks: Mutex::new(Vec::new()),
            chats: Mutex::new(HashMap::new()),
            failing: HashSet::new(),
            failing_acks: false,
        }
    }

    /// Every button press answer fails after being recorded
    pub fn failing_acks(mut self) -> Self {
        self.failing_acks = true;
        self
    }

    /// Every delivery to `id` fails
    pub fn failing_for(mut self, id: ParticipantId) -> Self {
        self.failing.insert(id);
        self
    }

    pub fn sent(&self) -> Vec<RecordedMessage> {
        self.sent.lock().unwrap().clone()
    }

    pub fn sent_to(&self, id: ParticipantId) -> Vec<RecordedMessage> {
        self.sent().into_iter().filter(|m| m.to == id).collect()
    }

    pub fn edits_to(&self, id: ParticipantId) -> Vec<RecordedMessage> {
        self.edits
            .lock()
            .unwrap()
            .iter()
            .filter(|m| m.to == id)
            .cloned()
            .collect()
    }

    /// Text of every send and edit, in order per kind
    pub fn all_texts(&self) -> Vec<String> {
        let mut texts: Vec<String> = self.sent().into_iter().map(|m| m.text).collect();
        texts.extend(self.edits.lock().unwrap().iter().map(|m| m.text.clone()));
        texts
    }

    /// What the participant can see now, oldest message first
    pub fn visible_to(&self, id: ParticipantId) -> Vec<String> {
        self.chats
            .lock()
            .unwrap()
            .get(&id)
            .map(|chat| chat.visible.values().cloned().collect())
            .unwrap_or_default()
    }

    pub fn acks(&self) -> Vec<RecordedAck> {
        self.acks.lock().unwrap().clone()
    }
}

impl Default for MockNotifier {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Notifier for MockNotifier {
    async fn send_message(
        &self,
        to: ParticipantId,
        text: &str,
        options: &MessageOptions,
    ) -> Result<(), DeliveryError> {
        if self.failing.contains(&to) {
            return Err(DeliveryError::Unreachable(to, "blocked by user".to_string()));
        }
        let message_id = {
            let mut chats = self.chats.lock().unwrap();
            let chat = chats.entry(to).or_default();
            chat.next_id += 1;
            chat.visible.insert(chat.next_id, text.to_string());
            chat.next_id
        };
        self.sent.lock().unwrap().push(RecordedMessage {
            to,
            message_id,
            text: text.to_string(),
            options: options.clone(),
        });
        Ok(())
    }

    async fn edit_message(
        &self,
        target: MessageRef,
        text: &str,
        options: &MessageOptions,
    ) -> Result<(), DeliveryError> {
        if self.failing.contains(&target.chat) {
            return Err(DeliveryError::Unreachable(
                target.chat,
                "blocked by user".to_string(),
            ));
        }
        {
            let mut chats = self.chats.lock().unwrap();
            let current = chats
                .get_mut(&target.chat)
                .and_then(|chat| chat.visible.get_mut(&target.message_id))
                .ok_or(DeliveryError::NothingToEdit(target))?;
            if current.as_str() == text {
                return Err(DeliveryError::NotModified);
            }
            *current = text.to_string();
        }
        self.edits.lock().unwrap().push(RecordedMessage {
            to: target.chat,
            message_id: target.message_id,
            text: text.to_string(),
            options: options.clone(),
        });
        Ok(())
    }

    async fn answer_action(
        &self,
        ack: &ActionAck,
        notice: Option<&str>,
        alert: bool,
    ) -> Result<(), DeliveryError> {
        self.acks.lock().unwrap().push(RecordedAck {
            ack: ack.clone(),
            notice: notice.map(str::to_string),
            alert,
        });
        if self.failing_acks {
            return Err(DeliveryError::Transport("query is too old".to_string()));
        }
        Ok(())
    }
}

// ============================================================================
// Event Sources
// ============================================================================

/// Event source that replays a fixed script and then ends
pub struct ScriptedSource {
    events: VecDeque<Inbound>,
}

impl ScriptedSource {
    pub fn new(events: impl IntoIterator<Item = Inbound>) -> Self {
        Self {
            events: events.into_iter().collect(),
        }
    }
}

#[async_trait]
impl EventSource for ScriptedSource {
    async fn next_event(&mut self) -> Option<Inbound> {
        self.events.pop_front()
    }
}

/// Event source that never yields
pub struct PendingSource;

#[async_trait]
impl EventSource for PendingSource {
    async fn next_event(&mut self) -> Option<Inbound> {
        std::future::pending().await
    }
}

// ============================================================================
// Inbound Builders
// ============================================================================

fn profile(given_name: Option<&str>, id: i64) -> Profile {
    Profile {
        given_name: given_name.map(str::to_string),
        handle: Some(format!("user{id}")),
    }
}

fn next_ack() -> ActionAck {
    static COUNTER: AtomicU64 = AtomicU64::new(1);
    ActionAck(format!("cb-{}", COUNTER.fetch_add(1, Ordering::Relaxed)))
}

pub fn start(id: i64, given_name: &str) -> Inbound {
    Inbound {
        participant: ParticipantId(id),
        profile: profile(Some(given_name), id),
        kind: InboundKind::Start,
    }
}

/// Button press whose source message is unknown to the transport
pub fn action(id: i64, action: MenuAction) -> Inbound {
    raw_action(id, action.id())
}

/// Button press on the participant's message `message_id`
pub fn action_on(id: i64, action: MenuAction, message_id: i64) -> Inbound {
    let mut inbound = raw_action(id, action.id());
    if let InboundKind::Action { source, .. } = &mut inbound.kind {
        *source = Some(MessageRef {
            chat: ParticipantId(id),
            message_id,
        });
    }
    inbound
}

pub fn raw_action(id: i64, data: &str) -> Inbound {
    Inbound {
        participant: ParticipantId(id),
        profile: profile(None, id),
        kind: InboundKind::Action {
            data: data.to_string(),
            ack: next_ack(),
            source: None,
        },
    }
}

pub fn text(id: i64, text: &str) -> Inbound {
    Inbound {
        participant: ParticipantId(id),
        profile: profile(None, id),
        kind: InboundKind::Text(text.to_string()),
    }
}
