use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::card::Flashcard;

use super::category::ALL_CATEGORIES;

/// Point-in-time state handed to the cache: the collection, the active
/// category, and the browse position last held in each category.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub cards: Vec<Flashcard>,
    #[serde(default = "default_category")]
    pub category: String,
    #[serde(default)]
    pub positions: HashMap<String, usize>,
}

fn default_category() -> String {
    ALL_CATEGORIES.to_string()
}

impl Snapshot {
    /// Copies cached scheduling state onto freshly loaded cards by uid.
    /// Returns how many cards picked up saved progress.
    pub fn overlay_progress(&self, cards: &mut [Flashcard]) -> usize {
        let saved: HashMap<&str, &Flashcard> = self
            .cards
            .iter()
            .map(|card| (card.uid.as_str(), card))
            .collect();

        let mut restored = 0;
        for card in cards.iter_mut() {
            if let Some(cached) = saved.get(card.uid.as_str()) {
                card.srs = cached.srs;
                restored += 1;
            }
        }
        restored
    }
}
