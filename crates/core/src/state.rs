use crate::{LedgerEntry, Pence};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Screen {
    Setup,
    Tracking,
    Selection,
    Final,
}

impl Screen {
    /// Legal forward/back navigation. Setup is re-entered only via a
    /// full reset, never by walking backwards.
    pub fn can_move_to(self, next: Screen) -> bool {
        matches!(
            (self, next),
            (Screen::Setup, Screen::Tracking)
                | (Screen::Tracking, Screen::Selection)
                | (Screen::Selection, Screen::Tracking)
                | (Screen::Selection, Screen::Final)
                | (Screen::Final, Screen::Selection)
        )
    }

    pub fn label(self) -> &'static str {
        match self {
            Screen::Setup => "setup",
            Screen::Tracking => "tracking",
            Screen::Selection => "selection",
            Screen::Final => "final",
        }
    }
}

/// Outcome of the most recent unreverted double-fines pick. All fields
/// travel together: either a winner is outstanding or the whole thing is
/// clear. `batch_id` is unset when the doubling added nothing.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct SelectionState {
    #[serde(rename = "winnerName", default)]
    pub winner_name: Option<String>,
    #[serde(rename = "batchId", default)]
    pub batch_id: Option<String>,
    #[serde(rename = "amountBefore", default)]
    pub amount_before: Option<Pence>,
    #[serde(rename = "amountAfter", default)]
    pub amount_after: Option<Pence>,
}

impl SelectionState {
    pub fn is_outstanding(&self) -> bool {
        self.winner_name.is_some()
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }
}

/// Resumable session context. Totals are deliberately absent: they are
/// re-hydrated by name from the ledger record this snapshot travels with.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SessionSnapshot {
    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
    #[serde(rename = "updatedAt")]
    pub updated_at: DateTime<Utc>,
    pub screen: Screen,
    pub players: Vec<String>,
    #[serde(rename = "selectedPlayerIndex", default)]
    pub selected_player_index: usize,
    #[serde(rename = "excludedFromSelection", default)]
    pub excluded_from_selection: BTreeSet<String>,
    #[serde(flatten)]
    pub selection: SelectionState,
}

/// The entire durable record: totals, history, and the optional resumable
/// session. This shape is the storage contract; everything else is
/// in-memory only.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct StoreRecord {
    #[serde(rename = "totalsByName", default)]
    pub totals_by_name: HashMap<String, Pence>,
    #[serde(default)]
    pub history: Vec<LedgerEntry>,
    #[serde(default)]
    pub game: Option<SessionSnapshot>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn screen_transitions_follow_the_flow() {
        assert!(Screen::Setup.can_move_to(Screen::Tracking));
        assert!(Screen::Tracking.can_move_to(Screen::Selection));
        assert!(Screen::Selection.can_move_to(Screen::Tracking));
        assert!(Screen::Selection.can_move_to(Screen::Final));
        assert!(Screen::Final.can_move_to(Screen::Selection));

        assert!(!Screen::Setup.can_move_to(Screen::Selection));
        assert!(!Screen::Setup.can_move_to(Screen::Final));
        assert!(!Screen::Tracking.can_move_to(Screen::Final));
        assert!(!Screen::Tracking.can_move_to(Screen::Setup));
        assert!(!Screen::Final.can_move_to(Screen::Tracking));
        assert!(!Screen::Final.can_move_to(Screen::Setup));
    }

    #[test]
    fn screens_serialize_lowercase() {
        assert_eq!(serde_json::to_string(&Screen::Tracking).unwrap(), "\"tracking\"");
        let screen: Screen = serde_json::from_str("\"final\"").unwrap();
        assert_eq!(screen, Screen::Final);
    }

    #[test]
    fn record_round_trips_with_wire_keys() {
        let mut totals = HashMap::new();
        totals.insert("ann".to_string(), 1250);
        let record = StoreRecord {
            totals_by_name: totals,
            history: vec![LedgerEntry {
                at: Utc::now(),
                name: "ann".to_string(),
                delta: 1250,
                batch_id: None,
            }],
            game: Some(SessionSnapshot {
                created_at: Utc::now(),
                updated_at: Utc::now(),
                screen: Screen::Selection,
                players: vec!["ann".to_string(), "bob".to_string()],
                selected_player_index: 1,
                excluded_from_selection: BTreeSet::from(["bob".to_string()]),
                selection: SelectionState {
                    winner_name: Some("ann".to_string()),
                    batch_id: Some("b_x_00000".to_string()),
                    amount_before: Some(625),
                    amount_after: Some(1250),
                },
            }),
        };

        let json = serde_json::to_string(&record).unwrap();
        assert!(json.contains("\"totalsByName\""));
        assert!(json.contains("\"batchId\""));
        assert!(json.contains("\"selectedPlayerIndex\""));
        assert!(json.contains("\"excludedFromSelection\""));
        assert!(json.contains("\"winnerName\""));
        assert!(json.contains("\"amountBefore\""));
        assert!(json.contains("\"t\""));

        let back: StoreRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(back, record);
    }

    #[test]
    fn sparse_record_fills_defaults() {
        let record: StoreRecord = serde_json::from_str("{}").unwrap();
        assert!(record.totals_by_name.is_empty());
        assert!(record.history.is_empty());
        assert!(record.game.is_none());

        let snapshot: SessionSnapshot = serde_json::from_str(
            r#"{
                "createdAt": "2026-08-21T19:00:00Z",
                "updatedAt": "2026-08-21T21:30:00Z",
                "screen": "tracking",
                "players": ["ann"]
            }"#,
        )
        .unwrap();
        assert_eq!(snapshot.selected_player_index, 0);
        assert!(snapshot.excluded_from_selection.is_empty());
        assert!(!snapshot.selection.is_outstanding());
    }
}
