use super::*;
use crate::{Event, EventBus, StoreRecord};
use std::collections::HashMap;

impl Session {
    /// Starts a fresh session: trims and dedupes the given names, zeroes
    /// their totals, clears the history, and lands on the tracking
    /// screen with the first player selected.
    pub fn start_session(
        &mut self,
        names: &[String],
        events: &mut EventBus,
    ) -> Result<(), SessionError> {
        let trimmed: Vec<String> = names
            .iter()
            .map(|name| name.trim().to_string())
            .filter(|name| !name.is_empty())
            .collect();
        if trimmed.is_empty() {
            return Err(SessionError::NoPlayers);
        }
        if trimmed.len() > self.config.max_players {
            return Err(SessionError::TooManyPlayers(self.config.max_players));
        }

        let players = dedupe_names(&trimmed);
        self.ledger.reset_for(&players);
        self.players = players;
        self.selected = Some(0);
        self.excluded.clear();
        self.selection.clear();
        self.created_at = Some(Utc::now());
        self.saved_game = None;
        self.screen = Screen::Tracking;

        events.push(Event::SessionStarted {
            players: self.players.clone(),
        });
        self.persist();
        Ok(())
    }

    pub fn select_player(
        &mut self,
        name: &str,
        events: &mut EventBus,
    ) -> Result<usize, SessionError> {
        let index = self
            .players
            .iter()
            .position(|player| player == name)
            .ok_or_else(|| SessionError::UnknownPlayer(name.to_string()))?;
        self.selected = Some(index);
        events.push(Event::PlayerSelected {
            name: name.to_string(),
            index,
        });
        self.persist();
        Ok(index)
    }

    /// Rebuilds in-memory state from the saved snapshot. Returns false
    /// when there is nothing to resume. Reads only: the store is not
    /// written, so resuming is free of side effects.
    pub fn resume_session(&mut self, events: &mut EventBus) -> bool {
        let Some(game) = self.saved_game.clone() else {
            return false;
        };
        if game.players.is_empty() {
            return false;
        }
        let last = game.players.len() - 1;
        self.selected = Some(game.selected_player_index.min(last));
        self.players = game.players;
        self.excluded = game.excluded_from_selection;
        self.selection = game.selection;
        self.created_at = Some(game.created_at);
        self.screen = game.screen;

        events.push(Event::SessionResumed {
            screen: self.screen,
            players: self.players.clone(),
        });
        true
    }

    /// Hard reset: wipes totals, history, and any saved game, and
    /// returns to setup.
    pub fn reset_session(&mut self, events: &mut EventBus) {
        self.ledger = Ledger::default();
        self.players.clear();
        self.selected = None;
        self.excluded.clear();
        self.selection.clear();
        self.created_at = None;
        self.saved_game = None;
        self.screen = Screen::Setup;

        events.push(Event::SessionReset);
        self.persist();
    }

    /// The full durable record as it would be written right now.
    pub fn export_record(&self) -> StoreRecord {
        StoreRecord {
            totals_by_name: self.ledger.totals().clone(),
            history: self.ledger.history().to_vec(),
            game: self.current_snapshot(),
        }
    }

    pub(super) fn persist(&mut self) {
        let record = self.export_record();
        if let Err(err) = self.store.save(&record) {
            log::warn!("session save failed: {err}");
        }
    }

    /// Live state wins; before a resume the stored snapshot is carried
    /// through untouched so an unrelated write cannot orphan it.
    fn current_snapshot(&self) -> Option<SessionSnapshot> {
        if self.players.is_empty() {
            return self.saved_game.clone();
        }
        Some(SessionSnapshot {
            created_at: self.created_at.unwrap_or_else(Utc::now),
            updated_at: Utc::now(),
            screen: self.screen,
            players: self.players.clone(),
            selected_player_index: self.selected.unwrap_or(0),
            excluded_from_selection: self.excluded.clone(),
            selection: self.selection.clone(),
        })
    }
}

/// Case-insensitive dedupe by suffixing repeats: `sam, Sam` becomes
/// `sam, Sam (2)`.
fn dedupe_names(names: &[String]) -> Vec<String> {
    let mut seen: HashMap<String, usize> = HashMap::new();
    names
        .iter()
        .map(|name| {
            let count = seen.entry(name.to_lowercase()).or_insert(0);
            *count += 1;
            if *count > 1 {
                format!("{name} ({count})")
            } else {
                name.clone()
            }
        })
        .collect()
}
