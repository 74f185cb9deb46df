//! In-memory participant store
//!
//! Owns the session store and the registry behind a single lock so that the
//! join eligibility check and the insert are one atomic step. All mutation goes
//! through the `try_*` operations below; the raw maps are never exposed.

mod registry;
mod session;

pub use registry::{RegistrationRecord, Registry, RegistryError};
pub use session::{Session, SessionStore};

use crate::menu::MenuView;
use crate::pairing::RosterEntry;
use async_trait::async_trait;
use std::fmt;
use thiserror::Error;
use tokio::sync::Mutex;

/// Stable per-chat key used everywhere a participant is addressed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ParticipantId(pub i64);

impl fmt::Display for ParticipantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum StoreError {
    #[error("nickname must not be empty")]
    EmptyNickname,
}

/// Result of a join attempt, in the order the checks are applied
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegisterOutcome {
    /// Identity already holds a record; nothing changed
    AlreadyRegistered,
    /// Nickname missing or credential not verified
    MissingData,
    /// No slot left
    CapacityFull { capacity: usize },
    /// Record inserted. `roster` is set only by the insert that filled the
    /// registry to exactly its capacity.
    Registered {
        count: usize,
        capacity: usize,
        roster: Option<Vec<RosterEntry>>,
    },
}

/// Counts shown by the status action
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusView {
    pub registered: usize,
    pub capacity: usize,
    pub is_registered: bool,
}

/// Storage for sessions and registrations
#[async_trait]
pub trait RegistrationStore: Send + Sync {
    /// Create the session on first contact, seeding the nickname
    async fn open_session(&self, id: ParticipantId, given_name: Option<&str>);

    async fn try_set_nickname(&self, id: ParticipantId, nickname: &str) -> Result<(), StoreError>;

    /// Compare against the shared secret; a mismatch revokes earlier verification
    async fn try_verify_credential(&self, id: ParticipantId, attempt: &str) -> bool;

    /// Atomic eligibility check plus insert
    async fn try_register(&self, id: ParticipantId, handle: Option<&str>) -> RegisterOutcome;

    async fn menu_view(&self, id: ParticipantId) -> MenuView;

    async fn status(&self, id: ParticipantId) -> StatusView;
}

struct StoreInner {
    sessions: SessionStore,
    registry: Registry,
}

/// Process-lifetime store shared by every conversation
pub struct RaffleStore {
    inner: Mutex<StoreInner>,
    secret: String,
}

impl RaffleStore {
    pub fn new(capacity: usize, secret: impl Into<String>) -> Self {
        Self {
            inner: Mutex::new(StoreInner {
                sessions: SessionStore::new(),
                registry: Registry::new(capacity),
            }),
            secret: secret.into(),
        }
    }

    /// Number of confirmed registrations
    #[allow(dead_code)] // Used by tests and diagnostics
    pub async fn registered_count(&self) -> usize {
        self.inner.lock().await.registry.len()
    }

    /// Registration record for one participant
    #[allow(dead_code)] // Used by tests
    pub async fn record(&self, id: ParticipantId) -> Option<RegistrationRecord> {
        self.inner.lock().await.registry.get(id).cloned()
    }

    /// Copy of the session for one participant
    #[allow(dead_code)] // Used by tests
    pub async fn session(&self, id: ParticipantId) -> Option<Session> {
        self.inner.lock().await.sessions.get(id).cloned()
    }
}

#[async_trait]
impl RegistrationStore for RaffleStore {
    async fn open_session(&self, id: ParticipantId, given_name: Option<&str>) {
        self.inner.lock().await.sessions.open(id, given_name);
    }

    async fn try_set_nickname(&self, id: ParticipantId, nickname: &str) -> Result<(), StoreError> {
        if nickname.is_empty() {
            return Err(StoreError::EmptyNickname);
        }
        let mut inner = self.inner.lock().await;
        inner.sessions.get_or_default(id).nickname = Some(nickname.to_string());
        Ok(())
    }

    async fn try_verify_credential(&self, id: ParticipantId, attempt: &str) -> bool {
        let verified = attempt == self.secret;
        let mut inner = self.inner.lock().await;
        inner.sessions.get_or_default(id).credential_verified = verified;
        verified
    }

    async fn try_register(&self, id: ParticipantId, handle: Option<&str>) -> RegisterOutcome {
        let mut inner = self.inner.lock().await;
        let StoreInner { sessions, registry } = &mut *inner;

        if registry.contains(id) {
            return RegisterOutcome::AlreadyRegistered;
        }

        let name = match sessions.get(id) {
            Some(session) if session.is_complete() => session.nickname.clone(),
            _ => None,
        };
        let Some(name) = name else {
            return RegisterOutcome::MissingData;
        };

        let record = RegistrationRecord {
            name,
            handle: handle.map(str::to_string),
        };
        match registry.insert(id, record) {
            Ok(count) => {
                let capacity = registry.capacity();
                let roster = (count == capacity).then(|| registry.roster());
                RegisterOutcome::Registered {
                    count,
                    capacity,
                    roster,
                }
            }
            Err(RegistryError::CapacityFull { capacity }) => {
                RegisterOutcome::CapacityFull { capacity }
            }
            Err(RegistryError::AlreadyRegistered(_)) => RegisterOutcome::AlreadyRegistered,
        }
    }

    async fn menu_view(&self, id: ParticipantId) -> MenuView {
        let inner = self.inner.lock().await;
        let session = inner.sessions.get(id);
        MenuView {
            nickname_set: session.is_some_and(Session::has_nickname),
            credential_verified: session.is_some_and(|s| s.credential_verified),
            registered: inner.registry.contains(id),
        }
    }

    async fn status(&self, id: ParticipantId) -> StatusView {
        let inner = self.inner.lock().await;
        StatusView {
            registered: inner.registry.len(),
            capacity: inner.registry.capacity(),
            is_registered: inner.registry.contains(id),
        }
    }
}
