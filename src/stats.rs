use chrono::NaiveDate;

use crate::card::Flashcard;
use crate::session::collect_categories;

#[derive(Debug, Clone, Copy, Hash, Eq, PartialEq)]
pub enum CardBucket {
    New,
    Due,
    /// Reviewed and not yet due again, however weak its ease factor.
    Mastered,
}

impl CardBucket {
    pub fn classify(card: &Flashcard, today: NaiveDate) -> Self {
        if card.is_new() {
            CardBucket::New
        } else if card.is_due(today) {
            CardBucket::Due
        } else {
            CardBucket::Mastered
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            CardBucket::New => "New",
            CardBucket::Due => "Due",
            CardBucket::Mastered => "Mastered",
        }
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct DashboardStats {
    pub new: usize,
    pub due: usize,
    pub mastered: usize,
}

impl DashboardStats {
    pub fn from_cards<'a>(cards: impl IntoIterator<Item = &'a Flashcard>, today: NaiveDate) -> Self {
        let mut stats = DashboardStats::default();
        for card in cards {
            stats.update(CardBucket::classify(card, today));
        }
        stats
    }

    pub fn update(&mut self, bucket: CardBucket) {
        match bucket {
            CardBucket::New => self.new += 1,
            CardBucket::Due => self.due += 1,
            CardBucket::Mastered => self.mastered += 1,
        }
    }

    pub fn get(&self, bucket: CardBucket) -> usize {
        match bucket {
            CardBucket::New => self.new,
            CardBucket::Due => self.due,
            CardBucket::Mastered => self.mastered,
        }
    }

    pub fn total(&self) -> usize {
        self.new + self.due + self.mastered
    }

    /// Cards a review session would show today.
    pub fn reviewable(&self) -> usize {
        self.new + self.due
    }
}

/// Per-category counts, in the same first-seen order as the category list.
pub fn category_breakdown(cards: &[Flashcard], today: NaiveDate) -> Vec<(String, DashboardStats)> {
    collect_categories(cards)
        .into_iter()
        .skip(1)
        .map(|category| {
            let stats = DashboardStats::from_cards(
                cards.iter().filter(|card| card.category == category),
                today,
            );
            (category, stats)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::card::SrsState;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 18).unwrap()
    }

    fn card(uid: &str, category: &str, level: u32, due_in: Option<i64>) -> Flashcard {
        let mut card = Flashcard::new(uid, category, "Q", "A");
        card.srs = SrsState {
            srs_level: level,
            easiness: 2.5,
            interval: 1,
            next_review: due_in.map(|days| today() + chrono::Duration::days(days)),
        };
        card
    }

    #[test]
    fn new_takes_priority_over_due() {
        // a failed card is new again even though it has a date
        let failed = card("1", "A", 0, Some(-2));
        assert_eq!(CardBucket::classify(&failed, today()), CardBucket::New);
    }

    #[test]
    fn counts_each_bucket_once() {
        let cards = vec![
            card("1", "A", 0, None),
            card("2", "A", 1, Some(0)),
            card("3", "B", 3, Some(-9)),
            card("4", "B", 2, Some(5)),
            card("5", "A", 1, Some(1)),
        ];
        let stats = DashboardStats::from_cards(&cards, today());
        assert_eq!(
            stats,
            DashboardStats {
                new: 1,
                due: 2,
                mastered: 2
            }
        );
        assert_eq!(stats.total(), cards.len());
        assert_eq!(stats.reviewable(), 3);
        assert_eq!(stats.get(CardBucket::Mastered), 2);
    }

    #[test]
    fn breakdown_follows_category_order() {
        let cards = vec![
            card("1", "Verbs", 0, None),
            card("2", "Nouns", 2, Some(3)),
            card("3", "Verbs", 1, Some(0)),
        ];
        let breakdown = category_breakdown(&cards, today());
        assert_eq!(breakdown.len(), 2);
        assert_eq!(breakdown[0].0, "Verbs");
        assert_eq!(breakdown[0].1.reviewable(), 2);
        assert_eq!(breakdown[1].0, "Nouns");
        assert_eq!(breakdown[1].1.mastered, 1);
    }
}
