use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::deck::{Card, CARDS_PER_DECK};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum CountSystem {
    #[default]
    #[serde(rename = "Hi-Lo")]
    HiLo,
    #[serde(rename = "Hi-Opt I")]
    HiOptI,
    #[serde(rename = "Hi-Opt II")]
    HiOptII,
    #[serde(rename = "Omega II")]
    OmegaII,
    #[serde(rename = "KO (Knockout)")]
    Knockout,
    #[serde(rename = "Ace-Five")]
    AceFive,
    Custom,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct CountingInput {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default)]
    pub system: CountSystem,
    #[serde(default)]
    pub custom_values: Option<HashMap<String, i32>>,
}

/// Running tally of the cards seen since the last shuffle.
#[derive(Debug, Clone)]
pub struct CardCounter {
    system: CountSystem,
    running_count: f64,
    values: HashMap<String, i32>,
}

impl CardCounter {
    pub fn new(
        system: CountSystem,
        custom_values: Option<HashMap<String, i32>>,
    ) -> Result<Self, String> {
        let values = match system {
            CountSystem::Custom => {
                custom_values.ok_or("Custom count system requires custom_values")?
            }
            _ => system_values(system),
        };
        Ok(CardCounter {
            system,
            running_count: 0.0,
            values,
        })
    }

    pub fn system(&self) -> CountSystem {
        self.system
    }

    pub fn update(&mut self, card: &Card) {
        let value = self.values.get(&card.rank).copied().unwrap_or(0);
        self.running_count += value as f64;
    }

    pub fn reset(&mut self) {
        self.running_count = 0.0;
    }

    pub fn running_count(&self) -> f64 {
        self.running_count
    }
}

/// Decks left in the shoe as a fraction. Not clamped; the insurance math
/// floors the divisor itself.
pub fn decks_remaining(remaining_cards: usize) -> f64 {
    remaining_cards as f64 / CARDS_PER_DECK as f64
}

pub fn build_counter(config: Option<CountingInput>) -> Result<Option<CardCounter>, String> {
    let cfg = match config {
        Some(cfg) if cfg.enabled => cfg,
        _ => return Ok(None),
    };
    CardCounter::new(cfg.system, cfg.custom_values).map(Some)
}

fn system_values(system: CountSystem) -> HashMap<String, i32> {
    // Tags for A, 2..9, then every ten-valued rank
    let (ace, low, ten): (i32, [i32; 8], i32) = match system {
        CountSystem::HiLo => (-1, [1, 1, 1, 1, 1, 0, 0, 0], -1),
        CountSystem::HiOptI => (0, [0, 1, 1, 1, 1, 0, 0, 0], -1),
        CountSystem::HiOptII => (0, [1, 1, 2, 2, 1, 1, 0, 0], -2),
        CountSystem::OmegaII => (0, [1, 1, 2, 2, 2, 1, 0, -1], -2),
        CountSystem::Knockout => (-1, [1, 1, 1, 1, 1, 1, 0, 0], -1),
        CountSystem::AceFive => (-1, [0, 0, 0, 1, 0, 0, 0, 0], 0),
        CountSystem::Custom => (0, [0; 8], 0),
    };

    let mut values = HashMap::new();
    values.insert("A".to_string(), ace);
    for (offset, value) in low.iter().enumerate() {
        values.insert((offset + 2).to_string(), *value);
    }
    for rank in ["10", "J", "Q", "K"] {
        values.insert(rank.to_string(), ten);
    }
    values
}
