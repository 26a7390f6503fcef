use chrono::{Days, Local, NaiveDate};

use crate::card::{MIN_EASINESS, SrsState};
use crate::error::SrsError;

pub const FIRST_INTERVAL: u32 = 1;
const SECOND_INTERVAL: u32 = 6;
const EASINESS_PENALTY: f64 = 0.2;
const PASS_THRESHOLD: u8 = 3;

/// Source of "today" for scheduling and due checks.
pub trait Clock {
    fn today(&self) -> NaiveDate;
}

/// Local calendar date at midnight.
#[derive(Clone, Copy, Debug, Default)]
pub struct LocalClock;

impl Clock for LocalClock {
    fn today(&self) -> NaiveDate {
        Local::now().date_naive()
    }
}

impl Clock for NaiveDate {
    fn today(&self) -> NaiveDate {
        *self
    }
}

/// Recall quality, worst to best.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Quality {
    Fail = 0,
    Hard = 2,
    Good = 4,
    Easy = 5,
}

impl Quality {
    pub const ALL: [Quality; 4] = [Quality::Fail, Quality::Hard, Quality::Good, Quality::Easy];

    pub fn value(self) -> u8 {
        self as u8
    }

    pub fn is_pass(self) -> bool {
        self.value() >= PASS_THRESHOLD
    }

    pub fn label(&self) -> &'static str {
        match self {
            Quality::Fail => "Fail",
            Quality::Hard => "Hard",
            Quality::Good => "Good",
            Quality::Easy => "Easy",
        }
    }
}

impl TryFrom<u8> for Quality {
    type Error = SrsError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Quality::Fail),
            2 => Ok(Quality::Hard),
            4 => Ok(Quality::Good),
            5 => Ok(Quality::Easy),
            other => Err(SrsError::InvalidQuality(other)),
        }
    }
}

fn next_easiness(easiness: f64, quality: Quality) -> f64 {
    let next = if quality.is_pass() {
        let q = 5.0 - quality.value() as f64;
        easiness + (0.1 - q * (0.08 + q * 0.02))
    } else {
        easiness - EASINESS_PENALTY
    };
    round_two_places(next.max(MIN_EASINESS))
}

fn round_two_places(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// `today + days`, saturating at the last representable date.
pub fn future_date(today: NaiveDate, days: u32) -> NaiveDate {
    today
        .checked_add_days(Days::new(days as u64))
        .unwrap_or(NaiveDate::MAX)
}

/// Computes the schedule that follows `state` after a review rated `quality`.
///
/// Failing ratings reset the level and retry after one day. Passing ratings
/// step through 1 day, then 6 days, then grow by the new easiness each time.
/// Intervals are not capped.
pub fn schedule(state: &SrsState, quality: Quality, today: NaiveDate) -> SrsState {
    let easiness = next_easiness(state.easiness, quality);

    let (srs_level, interval) = if quality.is_pass() {
        let interval = match state.srs_level {
            0 => FIRST_INTERVAL,
            1 => SECOND_INTERVAL,
            _ => (state.interval as f64 * easiness).round() as u32,
        };
        (state.srs_level.saturating_add(1), interval)
    } else {
        (0, FIRST_INTERVAL)
    };

    SrsState {
        srs_level,
        easiness,
        interval,
        next_review: Some(future_date(today, interval)),
    }
}

/// Same as [`schedule`] for a raw integer rating.
pub fn schedule_raw(state: &SrsState, quality: u8, today: NaiveDate) -> Result<SrsState, SrsError> {
    let quality = Quality::try_from(quality)?;
    Ok(schedule(state, quality, today))
}
