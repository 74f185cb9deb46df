//! Per-participant draft data collected before registration

use super::ParticipantId;
use std::collections::HashMap;

/// Draft registration data for one participant
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Session {
    /// Display name; seeded from the platform given name on `/start`
    pub nickname: Option<String>,
    /// True only while the latest credential submission matched the secret
    pub credential_verified: bool,
}

impl Session {
    pub fn with_nickname(nickname: Option<String>) -> Self {
        Self {
            nickname: nickname.filter(|n| !n.is_empty()),
            credential_verified: false,
        }
    }

    pub fn has_nickname(&self) -> bool {
        self.nickname.as_deref().is_some_and(|n| !n.is_empty())
    }

    /// Both prerequisites for joining are satisfied
    pub fn is_complete(&self) -> bool {
        self.has_nickname() && self.credential_verified
    }
}

/// Sessions keyed by participant; entries live for the process lifetime
#[derive(Debug, Default)]
pub struct SessionStore {
    sessions: HashMap<ParticipantId, Session>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create the session on first contact. An existing session is left untouched.
    pub fn open(&mut self, id: ParticipantId, given_name: Option<&str>) -> &mut Session {
        self.sessions
            .entry(id)
            .or_insert_with(|| Session::with_nickname(given_name.map(str::to_string)))
    }

    pub fn get(&self, id: ParticipantId) -> Option<&Session> {
        self.sessions.get(&id)
    }

    /// Session for mutation, created empty if this participant never sent `/start`
    pub fn get_or_default(&mut self, id: ParticipantId) -> &mut Session {
        self.sessions.entry(id).or_default()
    }
}
