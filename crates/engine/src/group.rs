//! The module contains [`Group`], the people splitting a bill.

use std::collections::BTreeMap;

use crate::{EngineError, IdAllocator, ParticipantId, ResultEngine};

/// A member of the splitting group.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Participant {
    pub id: ParticipantId,
    pub name: String,
}

/// The participants of a bill, kept in insertion order.
///
/// Names are not required to be unique: two people called "Sam" are two
/// participants with different ids.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Group {
    participants: BTreeMap<ParticipantId, Participant>,
}

impl Group {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a participant with a fresh id. The name is trimmed and must not
    /// be empty.
    pub fn add(&mut self, ids: &IdAllocator, name: &str) -> ResultEngine<&Participant> {
        let name = name.trim();
        if name.is_empty() {
            return Err(EngineError::validation("participant name must not be empty"));
        }

        let id = ids.next_participant_id();
        tracing::debug!(%id, name, "participant added");
        Ok(self.participants.entry(id).or_insert(Participant {
            id,
            name: name.to_string(),
        }))
    }

    /// Removes a participant. Removing an absent id is a no-op.
    pub fn remove(&mut self, id: ParticipantId) -> Option<Participant> {
        self.participants.remove(&id)
    }

    pub fn get(&self, id: ParticipantId) -> ResultEngine<&Participant> {
        self.participants
            .get(&id)
            .ok_or_else(|| EngineError::KeyNotFound(format!("participant {id}")))
    }

    pub fn contains(&self, id: ParticipantId) -> bool {
        self.participants.contains_key(&id)
    }

    /// Participants in the order they were added.
    pub fn participants(&self) -> impl Iterator<Item = &Participant> {
        self.participants.values()
    }

    pub fn len(&self) -> usize {
        self.participants.len()
    }

    pub fn is_empty(&self) -> bool {
        self.participants.is_empty()
    }
}
