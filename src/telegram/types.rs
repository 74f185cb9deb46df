//! Bot API wire types (the subset this bot uses)

use super::TelegramError;
use crate::menu::Keyboard;
use crate::runtime::{ActionAck, Inbound, InboundKind, MessageOptions, MessageRef, Profile, TextFormat};
use crate::store::ParticipantId;
use serde::{Deserialize, Serialize};

/// Envelope around every Bot API response
#[derive(Debug, Deserialize)]
pub struct ApiResponse<T> {
    pub ok: bool,
    pub result: Option<T>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub error_code: Option<i32>,
}

impl<T> ApiResponse<T> {
    pub fn into_result(self) -> Result<T, TelegramError> {
        if !self.ok {
            return Err(TelegramError::Api {
                code: self.error_code.unwrap_or_default(),
                description: self.description.unwrap_or_default(),
            });
        }
        self.result.ok_or(TelegramError::MissingResult)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct User {
    pub id: i64,
    pub first_name: String,
    #[serde(default)]
    pub username: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Chat {
    pub id: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Message {
    pub message_id: i64,
    pub chat: Chat,
    #[serde(default)]
    pub from: Option<User>,
    #[serde(default)]
    pub text: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CallbackQuery {
    pub id: String,
    pub from: User,
    #[serde(default)]
    pub message: Option<Message>,
    #[serde(default)]
    pub data: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Update {
    pub update_id: i64,
    #[serde(default)]
    pub message: Option<Message>,
    #[serde(default)]
    pub callback_query: Option<CallbackQuery>,
}

fn profile(user: Option<&User>) -> Profile {
    Profile {
        given_name: user.map(|u| u.first_name.clone()),
        handle: user.and_then(|u| u.username.clone()),
    }
}

/// Command name with any `@botname` suffix removed
fn command_name(text: &str) -> Option<&str> {
    let token = text.strip_prefix('/')?.split_whitespace().next()?;
    Some(token.split('@').next().unwrap_or(token))
}

impl Update {
    /// Translate into a runtime event. Commands other than `/start` and
    /// non-text messages yield `None`.
    pub fn into_inbound(self) -> Option<Inbound> {
        if let Some(query) = self.callback_query {
            let data = query.data?;
            let source = query.message.as_ref().map(|m| MessageRef {
                chat: ParticipantId(m.chat.id),
                message_id: m.message_id,
            });
            let chat = source.map_or(ParticipantId(query.from.id), |m| m.chat);
            return Some(Inbound {
                participant: chat,
                profile: profile(Some(&query.from)),
                kind: InboundKind::Action {
                    data,
                    ack: ActionAck(query.id),
                    source,
                },
            });
        }

        let message = self.message?;
        let text = message.text?;
        let kind = if text.starts_with('/') {
            match command_name(&text) {
                Some("start") => InboundKind::Start,
                _ => return None,
            }
        } else {
            InboundKind::Text(text)
        };

        Some(Inbound {
            participant: ParticipantId(message.chat.id),
            profile: profile(message.from.as_ref()),
            kind,
        })
    }
}

// ============================================================================
// Request bodies
// ============================================================================

#[derive(Debug, Serialize)]
pub struct GetUpdates<'a> {
    pub offset: i64,
    pub timeout: u64,
    pub allowed_updates: &'a [&'a str],
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InlineKeyboardButton {
    pub text: String,
    pub callback_data: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InlineKeyboardMarkup {
    pub inline_keyboard: Vec<Vec<InlineKeyboardButton>>,
}

impl From<&Keyboard> for InlineKeyboardMarkup {
    fn from(keyboard: &Keyboard) -> Self {
        Self {
            inline_keyboard: keyboard
                .iter()
                .map(|row| {
                    row.iter()
                        .map(|button| InlineKeyboardButton {
                            text: button.label.clone(),
                            callback_data: button.action.id().to_string(),
                        })
                        .collect()
                })
                .collect(),
        }
    }
}

pub fn parse_mode(format: TextFormat) -> Option<&'static str> {
    match format {
        TextFormat::Plain => None,
        TextFormat::Markdown => Some("Markdown"),
    }
}

#[derive(Debug, Serialize)]
pub struct SendMessage<'a> {
    pub chat_id: i64,
    pub text: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parse_mode: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reply_markup: Option<InlineKeyboardMarkup>,
}

#[derive(Debug, Serialize)]
pub struct EditMessageText<'a> {
    pub chat_id: i64,
    pub message_id: i64,
    pub text: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parse_mode: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reply_markup: Option<InlineKeyboardMarkup>,
}

impl<'a> EditMessageText<'a> {
    pub fn new(target: MessageRef, text: &'a str, options: &MessageOptions) -> Self {
        Self {
            chat_id: target.chat.0,
            message_id: target.message_id,
            text,
            parse_mode: parse_mode(options.format),
            reply_markup: options.keyboard.as_ref().map(InlineKeyboardMarkup::from),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct AnswerCallbackQuery<'a> {
    pub callback_query_id: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<&'a str>,
    pub show_alert: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::menu::{main_menu, MenuView};
    use serde_json::json;

    fn parse(value: serde_json::Value) -> Update {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_start_command() {
        let update = parse(json!({
            "update_id": 10,
            "message": {
                "message_id": 1,
                "chat": {"id": 42, "type": "private"},
                "from": {"id": 42, "is_bot": false, "first_name": "Alice", "username": "alice"},
                "text": "/start"
            }
        }));
        let inbound = update.into_inbound().unwrap();
        assert_eq!(inbound.participant, ParticipantId(42));
        assert_eq!(inbound.kind, InboundKind::Start);
        assert_eq!(inbound.profile.given_name.as_deref(), Some("Alice"));
        assert_eq!(inbound.profile.handle.as_deref(), Some("alice"));
    }

    #[test]
    fn test_start_with_bot_suffix() {
        assert_eq!(command_name("/start@raffle_bot"), Some("start"));
        assert_eq!(command_name("/start payload"), Some("start"));
        assert_eq!(command_name("/"), None);
    }

    #[test]
    fn test_other_commands_ignored() {
        let update = parse(json!({
            "update_id": 11,
            "message": {"message_id": 2, "chat": {"id": 42}, "text": "/status"}
        }));
        assert!(update.into_inbound().is_none());
    }

    #[test]
    fn test_non_text_message_ignored() {
        let update = parse(json!({
            "update_id": 12,
            "message": {"message_id": 3, "chat": {"id": 42}}
        }));
        assert!(update.into_inbound().is_none());
    }

    #[test]
    fn test_free_text() {
        let update = parse(json!({
            "update_id": 13,
            "message": {"message_id": 4, "chat": {"id": 42}, "text": "Alice the Great"}
        }));
        let inbound = update.into_inbound().unwrap();
        assert_eq!(inbound.kind, InboundKind::Text("Alice the Great".to_string()));
    }

    #[test]
    fn test_callback_query() {
        let update = parse(json!({
            "update_id": 14,
            "callback_query": {
                "id": "cb-1",
                "from": {"id": 42, "first_name": "Alice"},
                "message": {"message_id": 77, "chat": {"id": 42}},
                "data": "join_raffle"
            }
        }));
        let inbound = update.into_inbound().unwrap();
        assert_eq!(
            inbound.kind,
            InboundKind::Action {
                data: "join_raffle".to_string(),
                ack: ActionAck("cb-1".to_string()),
                source: Some(MessageRef {
                    chat: ParticipantId(42),
                    message_id: 77
                }),
            }
        );
    }

    #[test]
    fn test_edit_targets_the_given_message() {
        let target = MessageRef {
            chat: ParticipantId(42),
            message_id: 77,
        };
        let options = MessageOptions::markdown().with_keyboard(main_menu(&MenuView::default()));
        let value = serde_json::to_value(EditMessageText::new(target, "⛔ full", &options)).unwrap();
        assert_eq!(value["chat_id"], 42);
        assert_eq!(value["message_id"], 77);
        assert_eq!(value["parse_mode"], "Markdown");
        assert!(value["reply_markup"]["inline_keyboard"].is_array());
    }

    #[test]
    fn test_error_envelope() {
        let response: ApiResponse<Message> = serde_json::from_value(json!({
            "ok": false,
            "error_code": 400,
            "description": "Bad Request: message is not modified"
        }))
        .unwrap();
        let err = response.into_result().unwrap_err();
        assert!(err.is_not_modified());
    }

    #[test]
    fn test_keyboard_serialization() {
        let markup = InlineKeyboardMarkup::from(&main_menu(&MenuView::default()));
        let value = serde_json::to_value(&markup).unwrap();
        assert_eq!(value["inline_keyboard"][0][0]["callback_data"], "set_nickname");
        assert_eq!(value["inline_keyboard"][1][0]["callback_data"], "noop_disabled");
        assert_eq!(value["inline_keyboard"][2][0]["callback_data"], "status");
    }
}
