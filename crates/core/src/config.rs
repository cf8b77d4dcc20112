use crate::Pence;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FinePreset {
    pub label: String,
    pub pence: Pence,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum SpecialKind {
    OneEighty,
    BullFinish,
    TonFinish,
}

/// A table-rule penalty charged to everyone except the player who hit it.
/// `pence_each: None` means the amount comes with the event (ton-plus
/// finishes fine the checkout score in pence).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpecialRule {
    pub kind: SpecialKind,
    pub label: String,
    #[serde(default)]
    pub pence_each: Option<Pence>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FinesConfig {
    /// Ceiling for a player's total under normal play.
    pub base_cap: Pence,
    /// Ceiling once a player's total has been doubled by the wheel.
    pub doubled_cap: Pence,
    pub presets: Vec<FinePreset>,
    pub specials: Vec<SpecialRule>,
    #[serde(default = "default_max_players")]
    pub max_players: usize,
}

fn default_max_players() -> usize {
    6
}

impl Default for FinesConfig {
    fn default() -> Self {
        let preset = |label: &str, pence: Pence| FinePreset {
            label: label.to_string(),
            pence,
        };
        let special = |kind: SpecialKind, label: &str, pence_each: Option<Pence>| SpecialRule {
            kind,
            label: label.to_string(),
            pence_each,
        };
        Self {
            base_cap: 2500,
            doubled_cap: 5000,
            presets: vec![
                preset("50p", 50),
                preset("£1", 100),
                preset("£2.50", 250),
                preset("£5", 500),
            ],
            specials: vec![
                special(SpecialKind::OneEighty, "180", Some(180)),
                special(SpecialKind::BullFinish, "Bull-Out", Some(200)),
                special(SpecialKind::TonFinish, "Ton+ Out", None),
            ],
            max_players: default_max_players(),
        }
    }
}

impl FinesConfig {
    pub fn cap_for(&self, doubled: bool) -> Pence {
        if doubled {
            self.doubled_cap
        } else {
            self.base_cap
        }
    }

    pub fn preset(&self, label: &str) -> Option<&FinePreset> {
        self.presets
            .iter()
            .find(|preset| preset.label.eq_ignore_ascii_case(label))
    }

    pub fn special(&self, kind: SpecialKind) -> Option<&SpecialRule> {
        self.specials.iter().find(|rule| rule.kind == kind)
    }
}
