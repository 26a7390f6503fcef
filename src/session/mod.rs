//! The study session: one owned collection of flashcards, viewed either as
//! a browsable deck or as today's review queue.
//!
//! Both views hold positions into the same backing collection, so a rating
//! applied in review is visible from browse without any copying.

pub mod category;
pub mod snapshot;
pub mod view;

use std::collections::HashMap;

use rand::Rng;
use tracing::{debug, info, warn};

use crate::card::{Flashcard, SrsState};
use crate::error::SessionError;
use crate::srs::{self, Clock, LocalClock, Quality};
use crate::stats::DashboardStats;

pub use category::{ALL_CATEGORIES, CategoryFilter, collect_categories};
pub use snapshot::Snapshot;
pub use view::{Mode, View};

/// What the rendering layer needs to draw the header of the current view.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Status {
    pub mode: Mode,
    /// 1-based; 0 when the view is empty.
    pub position: usize,
    pub total: usize,
    pub category: String,
    pub remaining: usize,
    pub has_cards: bool,
    pub complete: bool,
}

/// Result of one rating, kept so the event can be replayed or logged.
#[derive(Clone, Debug, PartialEq)]
pub struct RatingOutcome {
    pub uid: String,
    pub quality: Quality,
    pub previous: SrsState,
    pub next: SrsState,
    pub advanced: bool,
}

pub struct Session<C: Clock = LocalClock> {
    cards: Vec<Flashcard>,
    index: HashMap<String, usize>,
    categories: Vec<String>,
    filter: CategoryFilter,
    view: View,
    positions: HashMap<String, usize>,
    clock: C,
}

impl Session<LocalClock> {
    pub fn new(cards: Vec<Flashcard>) -> Result<Self, SessionError> {
        Self::with_clock(cards, LocalClock)
    }

    pub fn restore(snapshot: Snapshot) -> Result<Self, SessionError> {
        Self::restore_with_clock(snapshot, LocalClock)
    }
}

impl<C: Clock> Session<C> {
    pub fn with_clock(cards: Vec<Flashcard>, clock: C) -> Result<Self, SessionError> {
        let mut session = Session {
            cards: Vec::new(),
            index: HashMap::new(),
            categories: collect_categories(&[]),
            filter: CategoryFilter::All,
            view: View::browse(Vec::new()),
            positions: HashMap::new(),
            clock,
        };
        session.load(cards)?;
        Ok(session)
    }

    /// Rebuilds a session from a cached snapshot, in browse mode, at the
    /// category and position it was saved with.
    pub fn restore_with_clock(snapshot: Snapshot, clock: C) -> Result<Self, SessionError> {
        let Snapshot {
            cards,
            category,
            positions,
        } = snapshot;
        let mut session = Self::with_clock(cards, clock)?;

        let filter = CategoryFilter::from_label(&category);
        if filter != CategoryFilter::All && !session.categories.contains(&category) {
            warn!(%category, "cached category no longer exists, showing all cards");
        } else {
            session.filter_category(filter);
        }

        session.positions = positions;
        if let Some(&position) = session.positions.get(session.filter.label()) {
            session.view.set_browse_cursor(position);
        }
        Ok(session)
    }

    /// Replaces the whole collection and resets every piece of view state.
    pub fn load(&mut self, cards: Vec<Flashcard>) -> Result<(), SessionError> {
        let mut index = HashMap::with_capacity(cards.len());
        for (position, card) in cards.iter().enumerate() {
            if index.insert(card.uid.clone(), position).is_some() {
                return Err(SessionError::DuplicateUid(card.uid.clone()));
            }
        }

        self.categories = collect_categories(&cards);
        self.cards = cards;
        self.index = index;
        self.filter = CategoryFilter::All;
        self.positions.clear();
        self.view = View::browse(self.browse_order());
        info!(
            cards = self.cards.len(),
            categories = self.categories.len() - 1,
            "loaded collection"
        );
        Ok(())
    }

    pub fn mode(&self) -> Mode {
        self.view.mode()
    }

    pub fn view(&self) -> &View {
        &self.view
    }

    pub fn filter(&self) -> &CategoryFilter {
        &self.filter
    }

    /// Category labels in first-seen order, starting with [`ALL_CATEGORIES`].
    pub fn categories(&self) -> &[String] {
        &self.categories
    }

    pub fn cards(&self) -> &[Flashcard] {
        &self.cards
    }

    pub fn card(&self, uid: &str) -> Option<&Flashcard> {
        self.index.get(uid).map(|&position| &self.cards[position])
    }

    pub fn today(&self) -> chrono::NaiveDate {
        self.clock.today()
    }

    /// Switches mode, resetting the cursor and rebuilding the view.
    pub fn set_mode(&mut self, mode: Mode) {
        self.remember_position();
        self.rebuild_view(mode);
        debug!(mode = mode.label(), size = self.view.len(), "mode set");
    }

    /// Changes the category filter. In review this rebuilds the queue under
    /// the new category rather than narrowing the old queue.
    pub fn filter_category(&mut self, filter: CategoryFilter) {
        self.remember_position();
        self.filter = filter;
        self.rebuild_view(self.mode());
        debug!(category = %self.filter, size = self.view.len(), "category filter set");
    }

    fn rebuild_view(&mut self, mode: Mode) {
        self.view = match mode {
            Mode::Browse => View::browse(self.browse_order()),
            Mode::Review => View::review(self.build_review_queue()),
        };
    }

    fn browse_order(&self) -> Vec<usize> {
        self.cards
            .iter()
            .enumerate()
            .filter(|(_, card)| self.filter.matches(card))
            .map(|(position, _)| position)
            .collect()
    }

    /// New or due cards in the active category, in collection order.
    pub fn build_review_queue(&self) -> Vec<usize> {
        let today = self.clock.today();
        self.cards
            .iter()
            .enumerate()
            .filter(|(_, card)| self.filter.matches(card))
            .filter(|(_, card)| card.is_new() || card.is_due(today))
            .map(|(position, _)| position)
            .collect()
    }

    /// Shuffles the browse deck and returns to its first card.
    pub fn shuffle<R: Rng + ?Sized>(&mut self, rng: &mut R) -> bool {
        self.view.shuffle(rng)
    }

    /// Moves by `step` cards. A false return means nothing changed.
    pub fn change_question(&mut self, step: isize) -> bool {
        self.view.step(step)
    }

    pub fn current_card(&self) -> Option<&Flashcard> {
        self.view.current().map(|position| &self.cards[position])
    }

    pub fn is_complete(&self) -> bool {
        self.view.is_complete()
    }

    /// Rates the card under the review cursor, stores its new schedule and
    /// moves on to the next card in the queue.
    pub fn handle_srs_action(&mut self, quality: Quality) -> Result<RatingOutcome, SessionError> {
        if self.mode() != Mode::Review {
            return Err(SessionError::NotReviewing);
        }
        let position = self.view.current().ok_or(SessionError::NoCurrentCard)?;
        let card = &self.cards[position];
        let uid = card.uid.clone();
        let previous = card.srs;

        let next = srs::schedule(&previous, quality, self.clock.today());
        self.apply_schedule(&uid, next)?;
        let advanced = self.view.advance_after_rating();

        debug!(
            %uid,
            quality = quality.label(),
            level = next.srs_level,
            interval = next.interval,
            advanced,
            "card rated"
        );
        Ok(RatingOutcome {
            uid,
            quality,
            previous,
            next,
            advanced,
        })
    }

    /// Replaces the schedule of the card with `uid`, returning the old one.
    pub fn apply_schedule(&mut self, uid: &str, next: SrsState) -> Result<SrsState, SessionError> {
        let position = *self
            .index
            .get(uid)
            .ok_or_else(|| SessionError::UnknownCard(uid.to_string()))?;
        Ok(std::mem::replace(&mut self.cards[position].srs, next))
    }

    pub fn status(&self) -> Status {
        let total = self.view.len();
        let complete = self.view.is_complete();
        let cursor = self.view.cursor();
        Status {
            mode: self.mode(),
            position: if total == 0 { 0 } else { cursor + 1 },
            total,
            category: self.filter.label().to_string(),
            remaining: if complete { 0 } else { total - cursor },
            has_cards: total > 0,
            complete,
        }
    }

    /// New/due/mastered counts over the entire collection, ignoring filters.
    pub fn dashboard_stats(&self) -> DashboardStats {
        DashboardStats::from_cards(&self.cards, self.clock.today())
    }

    pub fn snapshot(&self) -> Snapshot {
        let mut positions = self.positions.clone();
        if let View::Browse { cursor, .. } = self.view {
            positions.insert(self.filter.label().to_string(), cursor);
        }
        Snapshot {
            cards: self.cards.clone(),
            category: self.filter.label().to_string(),
            positions,
        }
    }

    fn remember_position(&mut self) {
        if let View::Browse { cursor, .. } = self.view {
            self.positions
                .insert(self.filter.label().to_string(), cursor);
        }
    }
}
