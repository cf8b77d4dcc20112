use super::*;
use crate::{new_batch_id, Event, EventBus, LedgerEntry};

impl Session {
    /// Adds a fine to one player, clamping against their current cap.
    /// `batch_id` groups the entry with siblings applied in the same call
    /// chain; plain fines pass `None`.
    pub fn apply_fine(
        &mut self,
        name: &str,
        amount: Pence,
        batch_id: Option<&str>,
        events: &mut EventBus,
    ) -> Result<FineOutcome, SessionError> {
        self.expect_screen(Screen::Tracking)?;
        self.expect_player(name)?;
        if amount <= 0 {
            return Err(SessionError::InvalidAmount);
        }
        let outcome = self.fine_unchecked(name, amount, batch_id);
        events.push(Event::FineApplied {
            name: name.to_string(),
            applied: outcome.applied,
            total: self.ledger.total(name),
            capped: outcome.capped,
        });
        self.persist();
        Ok(outcome)
    }

    /// Applies the same amount to every listed player under one shared
    /// batch id. Each player clamps independently; history keeps the
    /// input order. Returns whether anyone was capped.
    pub fn apply_fine_to_many(
        &mut self,
        names: &[String],
        amount_each: Pence,
        batch_id: &str,
        events: &mut EventBus,
    ) -> Result<bool, SessionError> {
        self.expect_screen(Screen::Tracking)?;
        if amount_each <= 0 {
            return Err(SessionError::InvalidAmount);
        }
        for name in names {
            self.expect_player(name)?;
        }
        if names.is_empty() {
            return Ok(false);
        }
        let mut any_capped = false;
        for name in names {
            any_capped |= self.fine_unchecked(name, amount_each, Some(batch_id)).capped;
        }
        events.push(Event::BatchApplied {
            batch_id: batch_id.to_string(),
            amount_each,
            count: names.len(),
            any_capped,
        });
        self.persist();
        Ok(any_capped)
    }

    /// A table special: the selected player triggered it, everyone else
    /// pays. `checkout` supplies the per-head amount for rules without a
    /// fixed one (ton-plus finishes).
    pub fn apply_special(
        &mut self,
        kind: SpecialKind,
        checkout: Option<Pence>,
        events: &mut EventBus,
    ) -> Result<SpecialOutcome, SessionError> {
        self.expect_screen(Screen::Tracking)?;
        let trigger = self
            .selected_player()
            .map(str::to_string)
            .ok_or(SessionError::NoPlayerSelected)?;
        let rule = self
            .config
            .special(kind)
            .ok_or(SessionError::UnknownSpecial(kind))?;
        let amount_each = match rule.pence_each {
            Some(pence) => pence,
            None => checkout.ok_or(SessionError::MissingCheckout)?,
        };
        if amount_each <= 0 {
            return Err(SessionError::InvalidAmount);
        }
        let fined: Vec<String> = self
            .players
            .iter()
            .filter(|player| **player != trigger)
            .cloned()
            .collect();
        if fined.is_empty() {
            return Err(SessionError::NoOtherPlayers);
        }
        let batch_id = new_batch_id(Utc::now(), &mut self.rng);
        let mut any_capped = false;
        for name in &fined {
            any_capped |= self
                .fine_unchecked(name, amount_each, Some(&batch_id))
                .capped;
        }
        events.push(Event::SpecialApplied {
            kind,
            trigger: trigger.clone(),
            batch_id: batch_id.clone(),
            amount_each,
            count: fined.len(),
            any_capped,
        });
        self.persist();
        Ok(SpecialOutcome {
            kind,
            trigger,
            amount_each,
            fined,
            batch_id,
            any_capped,
        })
    }

    /// Clamp-and-record core shared by every fine path. The applied delta
    /// is what actually lands in the history, so undo is exact.
    fn fine_unchecked(&mut self, name: &str, amount: Pence, batch_id: Option<&str>) -> FineOutcome {
        let cap = self.config.cap_for(self.is_selection_winner(name));
        let current = self.ledger.total(name);
        let attempted = current.saturating_add(amount);
        let (applied, capped) = if attempted >= cap {
            ((cap - current).max(0), true)
        } else {
            (amount, false)
        };
        self.ledger.set_total(name, attempted.min(cap));
        if applied > 0 {
            self.ledger.append(LedgerEntry {
                at: Utc::now(),
                name: name.to_string(),
                delta: applied,
                batch_id: batch_id.map(str::to_string),
            });
        }
        FineOutcome { applied, capped }
    }
}
