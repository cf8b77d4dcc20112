use crate::{Pence, RngState};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// One applied fine. `delta` is always the amount actually added, after
/// clamping, so reverting an entry is exact.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LedgerEntry {
    #[serde(rename = "t")]
    pub at: DateTime<Utc>,
    pub name: String,
    pub delta: Pence,
    #[serde(rename = "batchId", default)]
    pub batch_id: Option<String>,
}

/// Durable fine totals plus the append-only history they were built from.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Ledger {
    totals: HashMap<String, Pence>,
    history: Vec<LedgerEntry>,
}

impl Ledger {
    pub fn from_parts(totals: HashMap<String, Pence>, history: Vec<LedgerEntry>) -> Self {
        Self { totals, history }
    }

    pub fn total(&self, name: &str) -> Pence {
        self.totals.get(name).copied().unwrap_or(0)
    }

    pub fn set_total(&mut self, name: &str, pence: Pence) {
        self.totals.insert(name.to_string(), pence);
    }

    pub fn totals(&self) -> &HashMap<String, Pence> {
        &self.totals
    }

    pub fn history(&self) -> &[LedgerEntry] {
        &self.history
    }

    pub fn is_empty(&self) -> bool {
        self.history.is_empty()
    }

    pub fn append(&mut self, entry: LedgerEntry) {
        self.history.push(entry);
    }

    /// Removes the last undoable unit: the final entry, or, when that entry
    /// belongs to a batch, the whole contiguous run of that batch at the
    /// tail. Totals are untouched; pass the result to [`Ledger::revert`].
    pub fn pop_last_unit(&mut self) -> Vec<LedgerEntry> {
        let Some(last) = self.history.last() else {
            return Vec::new();
        };
        let mut removed = Vec::new();
        match last.batch_id.clone() {
            Some(batch_id) => {
                while self
                    .history
                    .last()
                    .is_some_and(|entry| entry.batch_id.as_deref() == Some(batch_id.as_str()))
                {
                    if let Some(entry) = self.history.pop() {
                        removed.push(entry);
                    }
                }
            }
            None => {
                if let Some(entry) = self.history.pop() {
                    removed.push(entry);
                }
            }
        }
        removed
    }

    /// Removes every entry carrying the given batch id, wherever it sits
    /// in the history. Remaining entries keep their order.
    pub fn remove_batch(&mut self, batch_id: &str) -> Vec<LedgerEntry> {
        let mut removed = Vec::new();
        self.history.retain(|entry| {
            if entry.batch_id.as_deref() == Some(batch_id) {
                removed.push(entry.clone());
                false
            } else {
                true
            }
        });
        removed
    }

    /// Subtracts each entry's delta from its player's total, flooring at
    /// zero. Reversion never re-clamps against a cap.
    pub fn revert(&mut self, entries: &[LedgerEntry]) {
        for entry in entries {
            let current = self.total(&entry.name);
            self.set_total(&entry.name, (current - entry.delta).max(0));
        }
    }

    /// Zeroes the totals for the given players and clears the history.
    /// Totals for other names are left alone.
    pub fn reset_for(&mut self, names: &[String]) {
        for name in names {
            self.totals.insert(name.clone(), 0);
        }
        self.history.clear();
    }
}

/// Batch ids look like `b_<millis36>_<5 alnum>`: sortable-ish by time,
/// unique enough for a single night's ledger.
pub fn new_batch_id(at: DateTime<Utc>, rng: &mut RngState) -> String {
    const DIGITS: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";
    let millis = at.timestamp_millis().max(0) as u64;
    let mut stamp: Vec<u8> = Vec::new();
    let mut rest = millis;
    loop {
        stamp.push(DIGITS[(rest % 36) as usize]);
        rest /= 36;
        if rest == 0 {
            break;
        }
    }
    stamp.reverse();
    let mut id = String::from("b_");
    id.extend(stamp.iter().map(|b| *b as char));
    id.push('_');
    for _ in 0..5 {
        id.push(DIGITS[(rng.next_u64() % 36) as usize] as char);
    }
    id
}
