use super::*;
use crate::{Event, EventBus};

impl Session {
    /// Reverts the most recent undoable unit: the last entry, or the
    /// whole trailing batch when the last entry belongs to one. An empty
    /// history is a benign no-op, not an error.
    pub fn undo_last(&mut self, events: &mut EventBus) -> UndoOutcome {
        let removed = self.ledger.pop_last_unit();
        if removed.is_empty() {
            events.push(Event::NothingToUndo);
            return UndoOutcome::Nothing;
        }
        self.ledger.revert(&removed);
        let outcome = match removed[0].batch_id.clone() {
            Some(batch_id) => {
                self.clear_selection_if_batch(&batch_id);
                events.push(Event::BatchUndone {
                    batch_id: batch_id.clone(),
                    count: removed.len(),
                });
                UndoOutcome::Batch {
                    batch_id,
                    count: removed.len(),
                }
            }
            None => {
                let entry = &removed[0];
                events.push(Event::FineUndone {
                    name: entry.name.clone(),
                    delta: entry.delta,
                });
                UndoOutcome::Entry {
                    name: entry.name.clone(),
                    delta: entry.delta,
                }
            }
        };
        self.persist();
        outcome
    }

    /// Removes a batch wherever it sits in the history and reverts its
    /// deltas. Returns how many entries were removed; zero means the id
    /// was not present (already undone, or never written).
    pub fn undo_batch(&mut self, batch_id: &str, events: &mut EventBus) -> usize {
        let removed = self.ledger.remove_batch(batch_id);
        if removed.is_empty() {
            return 0;
        }
        self.ledger.revert(&removed);
        self.clear_selection_if_batch(batch_id);
        events.push(Event::BatchUndone {
            batch_id: batch_id.to_string(),
            count: removed.len(),
        });
        self.persist();
        removed.len()
    }

    /// Selection state lives and dies with its batch: undoing that batch
    /// through any path clears the winner too.
    fn clear_selection_if_batch(&mut self, batch_id: &str) {
        if self.selection.batch_id.as_deref() == Some(batch_id) {
            self.selection.clear();
        }
    }
}
