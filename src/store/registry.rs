//! Capacity-bounded, append-only registry of confirmed participants

use super::ParticipantId;
use crate::pairing::RosterEntry;
use std::collections::HashMap;
use thiserror::Error;

/// Confirmed registration; a snapshot that is never mutated after insertion
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistrationRecord {
    pub name: String,
    /// Platform handle, informational only
    pub handle: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum RegistryError {
    #[error("participant {0} is already registered")]
    AlreadyRegistered(ParticipantId),
    #[error("registry is full ({capacity} participants)")]
    CapacityFull { capacity: usize },
}

#[derive(Debug)]
pub struct Registry {
    capacity: usize,
    records: HashMap<ParticipantId, RegistrationRecord>,
}

impl Registry {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            records: HashMap::with_capacity(capacity),
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_full(&self) -> bool {
        self.records.len() >= self.capacity
    }

    pub fn contains(&self, id: ParticipantId) -> bool {
        self.records.contains_key(&id)
    }

    pub fn get(&self, id: ParticipantId) -> Option<&RegistrationRecord> {
        self.records.get(&id)
    }

    /// Insert a record, returning the new registry size.
    ///
    /// Fails without side effects on a duplicate identity or when no slot remains.
    pub fn insert(
        &mut self,
        id: ParticipantId,
        record: RegistrationRecord,
    ) -> Result<usize, RegistryError> {
        if self.contains(id) {
            return Err(RegistryError::AlreadyRegistered(id));
        }
        if self.is_full() {
            return Err(RegistryError::CapacityFull {
                capacity: self.capacity,
            });
        }
        self.records.insert(id, record);
        Ok(self.records.len())
    }

    /// Frozen copy of every registered identity and its snapshotted name,
    /// ordered by identity
    pub fn roster(&self) -> Vec<RosterEntry> {
        let mut roster: Vec<RosterEntry> = self
            .records
            .iter()
            .map(|(id, record)| RosterEntry {
                participant: *id,
                name: record.name.clone(),
            })
            .collect();
        roster.sort_by_key(|entry| entry.participant);
        roster
    }
}
