//! Main menu projection
//!
//! The menu is derived from the store on every render and never cached.

/// Every button the bot can render. Wire ids are the callback payloads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MenuAction {
    SetNickname,
    SetCredential,
    Join,
    Status,
    /// Shown instead of the edit buttons once registered
    AlreadyRegistered,
    /// Placeholder join button while data is incomplete
    JoinDisabled,
}

impl MenuAction {
    pub const ALL: [MenuAction; 6] = [
        MenuAction::SetNickname,
        MenuAction::SetCredential,
        MenuAction::Join,
        MenuAction::Status,
        MenuAction::AlreadyRegistered,
        MenuAction::JoinDisabled,
    ];

    pub fn id(self) -> &'static str {
        match self {
            MenuAction::SetNickname => "set_nickname",
            MenuAction::SetCredential => "set_password",
            MenuAction::Join => "join_raffle",
            MenuAction::Status => "status",
            MenuAction::AlreadyRegistered => "noop",
            MenuAction::JoinDisabled => "noop_disabled",
        }
    }

    pub fn from_id(id: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|action| action.id() == id)
    }
}

/// Display flags for one participant
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MenuView {
    pub nickname_set: bool,
    pub credential_verified: bool,
    pub registered: bool,
}

impl MenuView {
    pub fn join_enabled(&self) -> bool {
        self.nickname_set && self.credential_verified && !self.registered
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Button {
    pub label: String,
    pub action: MenuAction,
}

impl Button {
    fn new(label: impl Into<String>, action: MenuAction) -> Self {
        Self {
            label: label.into(),
            action,
        }
    }
}

/// Rows of inline buttons
pub type Keyboard = Vec<Vec<Button>>;

fn mark(set: bool) -> &'static str {
    if set {
        "✅"
    } else {
        "❌"
    }
}

pub fn main_menu(view: &MenuView) -> Keyboard {
    let mut rows = Vec::with_capacity(3);

    if view.registered {
        rows.push(vec![Button::new(
            "✅ You're registered",
            MenuAction::AlreadyRegistered,
        )]);
    } else {
        rows.push(vec![
            Button::new(
                format!("👤 Nickname {}", mark(view.nickname_set)),
                MenuAction::SetNickname,
            ),
            Button::new(
                format!("🔑 Password {}", mark(view.credential_verified)),
                MenuAction::SetCredential,
            ),
        ]);
        if view.join_enabled() {
            rows.push(vec![Button::new("📝 Join the raffle", MenuAction::Join)]);
        } else {
            rows.push(vec![Button::new(
                "📝 Join (complete your data)",
                MenuAction::JoinDisabled,
            )]);
        }
    }

    rows.push(vec![Button::new("📊 Status", MenuAction::Status)]);
    rows
}
