pub mod csv;
pub mod normalize;
pub mod source;

use anyhow::Result;
use chrono::NaiveDate;
use tracing::info;

use crate::card::Flashcard;

pub use self::csv::{RawRecord, parse_csv};
pub use normalize::{content_hash, normalize_records};
pub use source::read_source;

/// Fetches, parses and normalizes a sheet into a batch ready for a session.
pub async fn load_cards(source: &str, today: NaiveDate) -> Result<Vec<Flashcard>> {
    let text = read_source(source).await?;
    let rows = parse_csv(&text)?;
    let cards = normalize_records(&rows, today);
    info!(rows = rows.len(), cards = cards.len(), "sheet loaded");
    Ok(cards)
}
