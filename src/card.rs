use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

pub const DEFAULT_EASINESS: f64 = 2.5;
pub const MIN_EASINESS: f64 = 1.3;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Flashcard {
    pub uid: String,
    pub category: String,
    #[serde(rename = "type")]
    pub kind: CardKind,
    pub question: String,
    pub answer: String,
    #[serde(default)]
    pub note: String,
    #[serde(default)]
    pub options: Vec<String>,
    #[serde(flatten)]
    pub srs: SrsState,
}

impl Flashcard {
    pub fn new(
        uid: impl Into<String>,
        category: impl Into<String>,
        question: impl Into<String>,
        answer: impl Into<String>,
    ) -> Self {
        Flashcard {
            uid: uid.into(),
            category: category.into(),
            kind: CardKind::Flashcard,
            question: question.into(),
            answer: answer.into(),
            note: String::new(),
            options: Vec::new(),
            srs: SrsState::default(),
        }
    }

    pub fn is_new(&self) -> bool {
        self.srs.is_new()
    }

    pub fn is_due(&self, today: NaiveDate) -> bool {
        self.srs.is_due(today)
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CardKind {
    #[default]
    Flashcard,
    /// Multiple choice; the record carries a non-empty `options` list.
    Quiz,
}

/// Scheduling progress for one card.
///
/// Replaced wholesale on every rating, never patched field by field.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct SrsState {
    pub srs_level: u32,
    pub easiness: f64,
    pub interval: u32,
    pub next_review: Option<NaiveDate>,
}

impl Default for SrsState {
    fn default() -> Self {
        SrsState {
            srs_level: 0,
            easiness: DEFAULT_EASINESS,
            interval: 0,
            next_review: None,
        }
    }
}

impl SrsState {
    pub fn is_new(&self) -> bool {
        self.srs_level == 0
    }

    /// Compares calendar dates only; a card scheduled for today is due all day.
    pub fn is_due(&self, today: NaiveDate) -> bool {
        self.next_review.is_some_and(|date| date <= today)
    }
}
