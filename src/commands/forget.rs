use anyhow::Result;

use crate::cache::CacheStore;
use crate::config::Config;
use crate::palette::Palette;

/// Deletes saved progress for `source`. Returns whether anything was removed.
pub fn run(config: &Config, source: &str) -> Result<bool> {
    let store = CacheStore::open(config.cache_dir())?;
    let removed = store.clear(source)?;
    if removed {
        println!("{}", Palette::paint(Palette::SUCCESS, "Removed saved progress."));
    } else {
        println!("{}", Palette::dim("No saved progress for this sheet."));
    }
    Ok(removed)
}
