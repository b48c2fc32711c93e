// src/application/ledger.rs
use crate::domain::{Note, NoteId};
use std::collections::BTreeMap;

pub type OpId = u64;

/// Sequence number handed to each refresh when it starts.
pub type RefreshGen = u64;

/// A note removed from the local list whose remote deletion has not settled.
#[derive(Debug, Clone)]
pub struct PendingDelete {
    pub note: Note,
    /// Index the note had in the list, used to put it back on rollback.
    pub position: usize,
}

/// Optimistic deletes awaiting remote confirmation.
///
/// Confirmed deletes are remembered with the generation of the next refresh
/// to start, so a refresh that began earlier cannot bring the note back.
#[derive(Debug, Default)]
pub struct PendingLedger {
    next_id: OpId,
    entries: BTreeMap<OpId, PendingDelete>,
    confirmed: Vec<(NoteId, RefreshGen)>,
}

impl PendingLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, pending: PendingDelete) -> OpId {
        let id = self.next_id;
        self.next_id += 1;
        self.entries.insert(id, pending);
        id
    }

    /// Remove an entry once its remote outcome is known. `None` means the
    /// ledger was cleared in the meantime.
    pub fn settle(&mut self, id: OpId) -> Option<PendingDelete> {
        self.entries.remove(&id)
    }

    pub fn is_pending_delete(&self, note_id: &NoteId) -> bool {
        self.entries.values().any(|p| &p.note.id == note_id)
    }

    /// Mark a delete as done on the backend. Refreshes started before
    /// `next_refresh` may still carry the note.
    pub fn confirm(&mut self, note_id: NoteId, next_refresh: RefreshGen) {
        self.confirmed.push((note_id, next_refresh));
    }

    /// Whether a note from a refresh started at `started` must stay hidden.
    pub fn hides(&self, note_id: &NoteId, started: RefreshGen) -> bool {
        self.is_pending_delete(note_id)
            || self
                .confirmed
                .iter()
                .any(|(id, since)| id == note_id && started < *since)
    }

    /// Forget confirmations no refresh newer than `applied` can contradict.
    pub fn prune_confirmed(&mut self, applied: RefreshGen) {
        self.confirmed.retain(|(_, since)| *since > applied);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.confirmed.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn note(id: &str) -> Note {
        Note {
            id: NoteId::new(id),
            name: format!("note {}", id),
            description: "d".to_string(),
            image: None,
        }
    }

    #[test]
    fn given_recorded_delete_when_checking_then_note_is_pending() {
        let mut ledger = PendingLedger::new();

        ledger.record(PendingDelete {
            note: note("1"),
            position: 0,
        });

        assert!(ledger.is_pending_delete(&NoteId::new("1")));
        assert!(!ledger.is_pending_delete(&NoteId::new("2")));
        assert_eq!(ledger.len(), 1);
    }

    #[test]
    fn given_settled_entry_when_settling_again_then_returns_none() {
        let mut ledger = PendingLedger::new();
        let id = ledger.record(PendingDelete {
            note: note("1"),
            position: 3,
        });

        let first = ledger.settle(id).expect("Entry should be pending");
        let second = ledger.settle(id);

        assert_eq!(first.position, 3);
        assert!(second.is_none());
        assert!(ledger.is_empty());
    }

    #[test]
    fn given_cleared_ledger_when_settling_then_returns_none() {
        let mut ledger = PendingLedger::new();
        let id = ledger.record(PendingDelete {
            note: note("1"),
            position: 0,
        });

        ledger.clear();

        assert!(ledger.settle(id).is_none());
    }

    #[test]
    fn given_confirmed_delete_when_checking_refreshes_then_only_older_ones_hide_it() {
        let mut ledger = PendingLedger::new();

        ledger.confirm(NoteId::new("1"), 4);

        assert!(ledger.hides(&NoteId::new("1"), 3));
        assert!(!ledger.hides(&NoteId::new("1"), 4));
        assert!(!ledger.hides(&NoteId::new("2"), 3));
        assert!(ledger.is_empty());
    }

    #[test]
    fn given_applied_refresh_when_pruning_then_drops_covered_confirmations() {
        let mut ledger = PendingLedger::new();
        ledger.confirm(NoteId::new("1"), 2);
        ledger.confirm(NoteId::new("2"), 5);

        ledger.prune_confirmed(3);

        assert!(!ledger.hides(&NoteId::new("1"), 0));
        assert!(ledger.hides(&NoteId::new("2"), 4));
    }

    #[test]
    fn given_multiple_records_when_recording_then_ids_are_distinct() {
        let mut ledger = PendingLedger::new();

        let a = ledger.record(PendingDelete { note: note("1"), position: 0 });
        let b = ledger.record(PendingDelete { note: note("2"), position: 0 });

        assert_ne!(a, b);
    }
}
