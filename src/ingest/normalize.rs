use std::collections::HashMap;

use blake3::Hasher;
use chrono::NaiveDate;
use tracing::warn;

use crate::card::{CardKind, DEFAULT_EASINESS, Flashcard, MIN_EASINESS, SrsState};
use crate::session::ALL_CATEGORIES;
use crate::srs::FIRST_INTERVAL;

use super::csv::{RawRecord, split_options};

pub const DEFAULT_CATEGORY: &str = "Default";

const UID_LEN: usize = 16;

/// Hash of the text with case and whitespace runs folded, so re-exports of
/// the same sheet keep their uids.
pub fn content_hash(s: &str) -> Option<String> {
    let lower = s.to_lowercase();

    let mut collapsed = String::with_capacity(lower.len());
    let mut last_was_space = false;
    for ch in lower.chars() {
        if ch.is_whitespace() {
            if !last_was_space {
                collapsed.push(' ');
                last_was_space = true;
            }
        } else {
            collapsed.push(ch);
            last_was_space = false;
        }
    }

    let trimmed = collapsed.trim();
    if trimmed.is_empty() {
        return None;
    }

    let mut hasher = Hasher::new();
    hasher.update(trimmed.as_bytes());
    Some(hasher.finalize().to_string())
}

fn field<'a>(row: &'a RawRecord, name: &str) -> &'a str {
    row.get(name).map(|v| v.trim()).unwrap_or("")
}

fn parse_or<T: std::str::FromStr>(row: &RawRecord, name: &str, default: T) -> T {
    let value = field(row, name);
    if value.is_empty() {
        return default;
    }
    match value.parse() {
        Ok(parsed) => parsed,
        Err(_) => {
            warn!(column = name, value, "unparsable value, using default");
            default
        }
    }
}

fn parse_schedule(row: &RawRecord, today: NaiveDate) -> SrsState {
    let srs_level = parse_or(row, "srs_level", 0u32);
    let mut interval = parse_or(row, "interval", 0u32);
    if srs_level > 0 && interval == 0 {
        warn!(srs_level, "reviewed card without an interval, using one day");
        interval = FIRST_INTERVAL;
    }

    let easiness = parse_or(row, "easiness", DEFAULT_EASINESS);
    let easiness = if easiness.is_finite() {
        easiness.max(MIN_EASINESS)
    } else {
        DEFAULT_EASINESS
    };

    let raw_date = field(row, "next_review");
    let mut next_review = if raw_date.is_empty() {
        None
    } else {
        let parsed = NaiveDate::parse_from_str(raw_date, "%Y-%m-%d").ok();
        if parsed.is_none() {
            warn!(value = raw_date, "invalid next_review date, clearing it");
        }
        parsed
    };
    if srs_level > 0 && next_review.is_none() {
        next_review = Some(today);
    }

    SrsState {
        srs_level,
        easiness,
        interval,
        next_review,
    }
}

/// Builds one flashcard from a sheet row, or `None` when the row has no
/// question or answer. `line` is only used for log messages.
pub fn normalize_record(row: &RawRecord, line: usize, today: NaiveDate) -> Option<Flashcard> {
    let question = field(row, "question");
    let answer = field(row, "answer");
    if question.is_empty() || answer.is_empty() {
        warn!(line, "dropping row without question or answer");
        return None;
    }

    let category = match field(row, "category") {
        "" => DEFAULT_CATEGORY,
        ALL_CATEGORIES => {
            warn!(line, "category collides with the all-categories label, using default");
            DEFAULT_CATEGORY
        }
        other => other,
    };

    let options = split_options(field(row, "options"));
    let kind = if field(row, "type").eq_ignore_ascii_case("quiz") {
        if options.is_empty() {
            warn!(line, "quiz row has no options, treating as flashcard");
            CardKind::Flashcard
        } else {
            CardKind::Quiz
        }
    } else {
        CardKind::Flashcard
    };

    let uid = match field(row, "uid") {
        "" => content_hash(&format!("{question}\n{answer}"))
            .map(|hash| hash[..UID_LEN].to_string())
            .unwrap_or_else(|| format!("row-{line}")),
        uid => uid.to_string(),
    };

    Some(Flashcard {
        uid,
        category: category.to_string(),
        kind,
        question: question.to_string(),
        answer: answer.to_string(),
        note: field(row, "note").to_string(),
        options: if kind == CardKind::Quiz { options } else { Vec::new() },
        srs: parse_schedule(row, today),
    })
}

/// Normalizes a whole sheet, keeping row order and making uids unique.
pub fn normalize_records(rows: &[RawRecord], today: NaiveDate) -> Vec<Flashcard> {
    let mut seen: HashMap<String, usize> = HashMap::new();
    let mut cards = Vec::with_capacity(rows.len());

    for (row_idx, row) in rows.iter().enumerate() {
        let line = row_idx + 2;
        let Some(mut card) = normalize_record(row, line, today) else {
            continue;
        };

        let count = seen.entry(card.uid.clone()).or_insert(0);
        *count += 1;
        if *count > 1 {
            let mut suffix = *count;
            let mut candidate = format!("{}#{}", card.uid, suffix);
            while seen.contains_key(&candidate) {
                suffix += 1;
                candidate = format!("{}#{}", card.uid, suffix);
            }
            warn!(line, uid = %card.uid, renamed = %candidate, "duplicate uid");
            seen.insert(candidate.clone(), 1);
            card.uid = candidate;
        }
        cards.push(card);
    }

    cards
}
