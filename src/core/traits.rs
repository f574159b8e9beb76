//! Core traits
//!
//! The allocation calculator needs to know which participant ids are valid for
//! an event, but not where that knowledge lives. Anything able to answer the
//! existence check can back it: a set or a slice of ids in tests and benches,
//! the event ledger in the processing pipeline.

use std::collections::HashSet;

/// Participant existence check for one event
pub trait ParticipantDirectory {
    /// Whether the participant id belongs to the event
    fn contains(&self, participant_id: &str) -> bool;
}

impl ParticipantDirectory for HashSet<String> {
    fn contains(&self, participant_id: &str) -> bool {
        HashSet::contains(self, participant_id)
    }
}

impl ParticipantDirectory for [&str] {
    fn contains(&self, participant_id: &str) -> bool {
        self.iter().any(|id| *id == participant_id)
    }
}
