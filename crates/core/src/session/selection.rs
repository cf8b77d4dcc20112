use super::*;
use crate::{new_batch_id, Event, EventBus, LedgerEntry};

impl Session {
    /// Players on the wheel: session order, minus explicit exclusions.
    pub fn eligible_names(&self) -> Vec<String> {
        self.players
            .iter()
            .filter(|name| !self.excluded.contains(*name))
            .cloned()
            .collect()
    }

    pub fn toggle_exclusion(
        &mut self,
        name: &str,
        events: &mut EventBus,
    ) -> Result<bool, SessionError> {
        self.expect_screen(Screen::Selection)?;
        self.expect_player(name)?;
        let excluded = if self.excluded.remove(name) {
            false
        } else {
            self.excluded.insert(name.to_string());
            true
        };
        events.push(Event::ExclusionToggled {
            name: name.to_string(),
            excluded,
        });
        self.persist();
        Ok(excluded)
    }

    /// Picks one eligible player uniformly and doubles their total up to
    /// the doubled cap. Any outstanding previous pick is reverted first,
    /// so at most one doubling is ever live.
    pub fn run_selection(&mut self, events: &mut EventBus) -> Result<SelectionOutcome, SessionError> {
        self.expect_screen(Screen::Selection)?;
        let eligible = self.eligible_names();
        if eligible.len() < 2 {
            return Err(SessionError::NotEnoughEligible(eligible.len()));
        }
        self.revert_selection(events);

        let idx = self.rng.pick(eligible.len()).unwrap_or(0);
        let winner = eligible[idx].clone();
        let before = self.ledger.total(&winner);
        let after = before.saturating_mul(2).min(self.config.doubled_cap);
        let delta = after - before;

        let mut batch_id = None;
        if delta > 0 {
            let id = new_batch_id(Utc::now(), &mut self.rng);
            self.ledger.set_total(&winner, after);
            self.ledger.append(LedgerEntry {
                at: Utc::now(),
                name: winner.clone(),
                delta,
                batch_id: Some(id.clone()),
            });
            batch_id = Some(id);
        }
        self.selection = SelectionState {
            winner_name: Some(winner.clone()),
            batch_id: batch_id.clone(),
            amount_before: Some(before),
            amount_after: Some(after),
        };

        let max_reached = after >= self.config.doubled_cap;
        events.push(Event::SelectionWon {
            winner: winner.clone(),
            before,
            after,
            max_reached,
        });
        self.persist();
        Ok(SelectionOutcome {
            winner,
            before,
            after,
            delta,
            batch_id,
            max_reached,
        })
    }

    /// Same as [`Session::run_selection`]; the revert-then-pick behavior
    /// makes a respin read as if the first spin never happened.
    pub fn respin_selection(
        &mut self,
        events: &mut EventBus,
    ) -> Result<SelectionOutcome, SessionError> {
        self.run_selection(events)
    }

    fn revert_selection(&mut self, events: &mut EventBus) {
        if !self.selection.is_outstanding() {
            return;
        }
        let winner = self.selection.winner_name.clone().unwrap_or_default();
        let batch_id = self.selection.batch_id.clone();
        if let Some(id) = batch_id.as_deref() {
            let removed = self.ledger.remove_batch(id);
            self.ledger.revert(&removed);
        }
        self.selection.clear();
        events.push(Event::SelectionReverted { winner, batch_id });
    }
}
