pub mod forget;
pub mod stats;
pub mod study;

use anyhow::{Result, anyhow};
use tracing::info;

use crate::cache::CacheStore;
use crate::config::Config;
use crate::ingest;
use crate::session::{Session, Snapshot};
use crate::srs::{Clock, LocalClock};

/// Builds a session for `source`, carrying over any cached progress.
/// Offline, the cached snapshot is the whole collection.
pub async fn open_session(
    config: &Config,
    source: &str,
    offline: bool,
) -> Result<(Session, CacheStore)> {
    let store = CacheStore::open(config.cache_dir())?;
    let cached = store.load(source)?;

    if offline {
        let snapshot = cached.ok_or_else(|| {
            anyhow!("No cached cards for {source}. Run once without --offline to download them.")
        })?;
        return Ok((Session::restore(snapshot)?, store));
    }

    let mut cards = ingest::load_cards(source, LocalClock.today()).await?;
    let session = match cached {
        Some(snapshot) => {
            let restored = snapshot.overlay_progress(&mut cards);
            info!(restored, "applied cached progress");
            Session::restore(Snapshot { cards, ..snapshot })?
        }
        None => Session::new(cards)?,
    };
    Ok((session, store))
}
