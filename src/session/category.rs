use std::collections::HashSet;
use std::fmt;

use crate::card::Flashcard;

/// Label of the "no filter" entry at the head of every category list.
pub const ALL_CATEGORIES: &str = "全部";

#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum CategoryFilter {
    #[default]
    All,
    Only(String),
}

impl CategoryFilter {
    pub fn from_label(label: &str) -> Self {
        if label == ALL_CATEGORIES {
            CategoryFilter::All
        } else {
            CategoryFilter::Only(label.to_string())
        }
    }

    pub fn label(&self) -> &str {
        match self {
            CategoryFilter::All => ALL_CATEGORIES,
            CategoryFilter::Only(name) => name,
        }
    }

    pub fn matches(&self, card: &Flashcard) -> bool {
        match self {
            CategoryFilter::All => true,
            CategoryFilter::Only(name) => card.category == *name,
        }
    }
}

impl fmt::Display for CategoryFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Distinct non-blank categories in first-seen order, headed by the sentinel.
pub fn collect_categories(cards: &[Flashcard]) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut categories = vec![ALL_CATEGORIES.to_string()];
    for card in cards {
        let name = card.category.as_str();
        if name.trim().is_empty() || name == ALL_CATEGORIES {
            continue;
        }
        if seen.insert(name) {
            categories.push(name.to_string());
        }
    }
    categories
}
