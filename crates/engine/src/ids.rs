//! Typed identifiers and the allocator that issues them.
//!
//! Identifiers are plain `u64` counters wrapped in one newtype per entity
//! kind, so an item id can never be passed where a participant id is
//! expected. They are unique for the lifetime of the [`IdAllocator`] that
//! issued them, monotonically increasing and never reused.

use std::{
    fmt,
    sync::atomic::{AtomicU64, Ordering},
};

use serde::{Deserialize, Serialize};

macro_rules! typed_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(
            Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(u64);

        impl $name {
            /// Wraps a raw identifier (e.g. one received over the wire).
            #[must_use]
            pub const fn new(raw: u64) -> Self {
                Self(raw)
            }

            #[must_use]
            pub const fn get(self) -> u64 {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<u64> for $name {
            fn from(value: u64) -> Self {
                Self(value)
            }
        }
    };
}

typed_id!(
    /// Identifier of an [`Item`](crate::Item) on a receipt.
    ItemId
);
typed_id!(
    /// Identifier of a [`Participant`](crate::Participant).
    ParticipantId
);
typed_id!(
    /// Identifier of a single [`AssignedItem`](crate::AssignedItem) record.
    AssignmentId
);

/// Issues identifiers, one counter per entity kind.
///
/// The allocator is an explicit object owned by whoever owns the bills (a
/// server, a test), never a process-wide global. Counters are atomic so a
/// shared allocator can be used from several sessions at once.
#[derive(Debug)]
pub struct IdAllocator {
    items: AtomicU64,
    participants: AtomicU64,
    assignments: AtomicU64,
}

impl IdAllocator {
    /// A fresh allocator; the first id of every kind is `1`.
    #[must_use]
    pub fn new() -> Self {
        Self {
            items: AtomicU64::new(1),
            participants: AtomicU64::new(1),
            assignments: AtomicU64::new(1),
        }
    }

    pub fn next_item_id(&self) -> ItemId {
        ItemId(self.items.fetch_add(1, Ordering::Relaxed))
    }

    pub fn next_participant_id(&self) -> ParticipantId {
        ParticipantId(self.participants.fetch_add(1, Ordering::Relaxed))
    }

    pub fn next_assignment_id(&self) -> AssignmentId {
        AssignmentId(self.assignments.fetch_add(1, Ordering::Relaxed))
    }
}

impl Default for IdAllocator {
    fn default() -> Self {
        Self::new()
    }
}
