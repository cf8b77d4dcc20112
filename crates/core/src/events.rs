use crate::{Pence, Screen, SpecialKind};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum Event {
    SessionStarted { players: Vec<String> },
    SessionResumed {
        screen: Screen,
        players: Vec<String>,
    },
    SessionReset,
    ScreenChanged { screen: Screen },
    PlayerSelected { name: String, index: usize },
    FineApplied {
        name: String,
        applied: Pence,
        total: Pence,
        capped: bool,
    },
    BatchApplied {
        batch_id: String,
        amount_each: Pence,
        count: usize,
        any_capped: bool,
    },
    SpecialApplied {
        kind: SpecialKind,
        trigger: String,
        batch_id: String,
        amount_each: Pence,
        count: usize,
        any_capped: bool,
    },
    FineUndone { name: String, delta: Pence },
    BatchUndone { batch_id: String, count: usize },
    NothingToUndo,
    SelectionWon {
        winner: String,
        before: Pence,
        after: Pence,
        max_reached: bool,
    },
    SelectionReverted {
        winner: String,
        batch_id: Option<String>,
    },
    ExclusionToggled { name: String, excluded: bool },
}

#[derive(Debug, Default)]
pub struct EventBus {
    queue: Vec<Event>,
}

impl EventBus {
    pub fn push(&mut self, event: Event) {
        self.queue.push(event);
    }

    pub fn drain(&mut self) -> impl Iterator<Item = Event> + '_ {
        self.queue.drain(..)
    }
}
