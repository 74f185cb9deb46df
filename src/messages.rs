//! User-facing message text
//!
//! Formatted messages use Telegram's legacy Markdown. Anything typed by a
//! participant goes through [`escape_markdown`] and is placed outside every
//! entity, since legacy Markdown has no escapes inside an entity.

use crate::store::StatusView;

/// Escape the characters legacy Markdown treats as entity delimiters.
/// Only valid outside an entity.
pub fn escape_markdown(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        if matches!(c, '_' | '*' | '`' | '[') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

pub fn welcome() -> String {
    "🎄 *Welcome to the gift exchange raffle!* 🎄\n\n\
     Set up your details with the buttons below to take part."
        .to_string()
}

pub fn main_menu() -> String {
    "🎄 *Main menu*".to_string()
}

pub fn prompt_nickname() -> String {
    "👤 Please type the *nickname* you want to use:".to_string()
}

pub fn prompt_credential() -> String {
    "🔑 Please type the event *password*:".to_string()
}

pub fn nickname_required() -> String {
    "👤 The nickname can't be empty, please type it again:".to_string()
}

pub fn nickname_saved(nickname: &str) -> String {
    format!("✅ Nickname saved: {}", escape_markdown(nickname))
}

pub fn credential_accepted() -> String {
    "✅ Password accepted.".to_string()
}

pub fn credential_rejected() -> String {
    "❌ Wrong password. Try again from the menu.".to_string()
}

pub fn missing_data() -> String {
    "❌ Some details are missing.".to_string()
}

pub fn already_registered() -> String {
    "✅ You are already registered.".to_string()
}

pub fn capacity_full() -> String {
    "⛔ Sorry, the raffle is full.".to_string()
}

pub fn registered(count: usize, capacity: usize) -> String {
    format!("✅ *Registered!*\n\nWaiting for participants: {count}/{capacity}")
}

pub fn status(view: &StatusView) -> String {
    let mine = if view.is_registered {
        "Registered ✅"
    } else {
        "Not registered ❌"
    };
    format!(
        "📊 *Raffle status*:\n- Registered: {} / {}\n- You: {mine}",
        view.registered, view.capacity
    )
}

pub fn toast_registered() -> String {
    "You're all set. Wait for the draw!".to_string()
}

pub fn toast_incomplete() -> String {
    "Complete your nickname and password first.".to_string()
}

pub fn pairing_result(partner: &str) -> String {
    format!(
        "🎁 *Raffle results!* 🎁\n\nYour secret (mutual) partner is: {}",
        escape_markdown(partner)
    )
}

pub fn unpairable(count: usize) -> String {
    format!(
        "⚠️ The limit ({count}) was reached, but the number of participants is odd. \
         The raffle can't be drawn in pairs."
    )
}

pub fn operator_summary(pairs: usize, failed: usize) -> String {
    format!("🎁 Raffle finished: {pairs} pairs drawn, {failed} deliveries failed.")
}

pub fn operator_unpairable(count: usize) -> String {
    format!("⚠️ Raffle aborted: {count} participants can't be split into pairs.")
}
