use crate::{
    FinesConfig, Ledger, MemoryStore, Pence, RngState, Screen, SelectionState, SessionSnapshot,
    SpecialKind, StateStore,
};
use chrono::{DateTime, Utc};
use std::collections::BTreeSet;
use thiserror::Error;

mod fines;
mod persist;
mod screen;
mod selection;
mod undo;

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("no player names given")]
    NoPlayers,
    #[error("too many players (max {0})")]
    TooManyPlayers(usize),
    #[error("unknown player: {0}")]
    UnknownPlayer(String),
    #[error("no player selected")]
    NoPlayerSelected,
    #[error("no other players to fine")]
    NoOtherPlayers,
    #[error("fine amount must be positive")]
    InvalidAmount,
    #[error("special {0:?} is not in the schedule")]
    UnknownSpecial(SpecialKind),
    #[error("checkout amount required for this special")]
    MissingCheckout,
    #[error("need at least two eligible players, have {0}")]
    NotEnoughEligible(usize),
    #[error("no selection winner to confirm")]
    NoSelectionWinner,
    #[error("cannot move from {0:?} to {1:?}")]
    InvalidTransition(Screen, Screen),
    #[error("expected {0:?} screen, currently on {1:?}")]
    WrongScreen(Screen, Screen),
}

/// One night's fines session: the ledger, the screen flow, the wheel
/// state, and the storage collaborator everything is persisted through.
pub struct Session {
    pub config: FinesConfig,
    pub ledger: Ledger,
    pub rng: RngState,
    screen: Screen,
    players: Vec<String>,
    selected: Option<usize>,
    excluded: BTreeSet<String>,
    selection: SelectionState,
    created_at: Option<DateTime<Utc>>,
    saved_game: Option<SessionSnapshot>,
    store: Box<dyn StateStore>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FineOutcome {
    pub applied: Pence,
    pub capped: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SpecialOutcome {
    pub kind: SpecialKind,
    pub trigger: String,
    pub amount_each: Pence,
    pub fined: Vec<String>,
    pub batch_id: String,
    pub any_capped: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SelectionOutcome {
    pub winner: String,
    pub before: Pence,
    pub after: Pence,
    pub delta: Pence,
    pub batch_id: Option<String>,
    pub max_reached: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub enum UndoOutcome {
    Nothing,
    Entry { name: String, delta: Pence },
    Batch { batch_id: String, count: usize },
}

impl Session {
    pub fn new(config: FinesConfig, rng: RngState) -> Self {
        Self::with_store(config, rng, Box::new(MemoryStore::new()))
    }

    /// Builds a session over the given store. The record is loaded once
    /// here: totals and history hydrate the ledger immediately, while any
    /// saved game waits for an explicit [`Session::resume_session`].
    pub fn with_store(config: FinesConfig, rng: RngState, mut store: Box<dyn StateStore>) -> Self {
        let record = store.load();
        Self {
            config,
            ledger: Ledger::from_parts(record.totals_by_name, record.history),
            rng,
            screen: Screen::Setup,
            players: Vec::new(),
            selected: None,
            excluded: BTreeSet::new(),
            selection: SelectionState::default(),
            created_at: None,
            saved_game: record.game,
            store,
        }
    }

    pub fn players(&self) -> &[String] {
        &self.players
    }

    pub fn selected_index(&self) -> Option<usize> {
        self.selected
    }

    pub fn selected_player(&self) -> Option<&str> {
        self.selected
            .and_then(|idx| self.players.get(idx))
            .map(String::as_str)
    }

    pub fn excluded(&self) -> &BTreeSet<String> {
        &self.excluded
    }

    pub fn selection(&self) -> &SelectionState {
        &self.selection
    }

    pub fn saved_session(&self) -> Option<&SessionSnapshot> {
        self.saved_game.as_ref()
    }

    pub fn has_saved_session(&self) -> bool {
        self.saved_game
            .as_ref()
            .is_some_and(|game| !game.players.is_empty())
    }

    fn expect_player(&self, name: &str) -> Result<(), SessionError> {
        if self.players.iter().any(|player| player == name) {
            Ok(())
        } else {
            Err(SessionError::UnknownPlayer(name.to_string()))
        }
    }

    fn is_selection_winner(&self, name: &str) -> bool {
        self.selection.winner_name.as_deref() == Some(name)
    }
}
