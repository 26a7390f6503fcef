use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::{debug, info};

use crate::session::Snapshot;

const KEY_LEN: usize = 16;

/// Saved study progress, one JSON file per sheet source.
#[derive(Debug, Clone)]
pub struct CacheStore {
    dir: PathBuf,
}

impl CacheStore {
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)
            .with_context(|| format!("Failed to create cache directory {}", dir.display()))?;
        Ok(Self { dir })
    }

    pub fn path_for(&self, source: &str) -> PathBuf {
        let hash = blake3::hash(source.trim().as_bytes()).to_string();
        self.dir.join(format!("{}.json", &hash[..KEY_LEN]))
    }

    pub fn load(&self, source: &str) -> Result<Option<Snapshot>> {
        let path = self.path_for(source);
        let contents = match fs::read_to_string(&path) {
            Ok(contents) => contents,
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                debug!(path = %path.display(), "no cached progress");
                return Ok(None);
            }
            Err(err) => {
                return Err(err)
                    .with_context(|| format!("Failed to read cache file {}", path.display()));
            }
        };

        let snapshot: Snapshot = serde_json::from_str(&contents)
            .with_context(|| format!("Failed to parse cache file {}", path.display()))?;
        Ok(Some(snapshot))
    }

    /// Writes through a temp file in the same directory so a crash never
    /// leaves a half-written snapshot behind.
    pub fn save(&self, source: &str, snapshot: &Snapshot) -> Result<()> {
        let path = self.path_for(source);
        let serialized =
            serde_json::to_string_pretty(snapshot).context("Failed to serialize snapshot")?;

        let mut tmp = tempfile::NamedTempFile::new_in(&self.dir)
            .with_context(|| format!("Failed to create temp file in {}", self.dir.display()))?;
        tmp.write_all(serialized.as_bytes())
            .context("Failed to write snapshot")?;
        tmp.persist(&path)
            .with_context(|| format!("Failed to write cache file {}", path.display()))?;

        info!(path = %path.display(), cards = snapshot.cards.len(), "progress saved");
        Ok(())
    }

    pub fn clear(&self, source: &str) -> Result<bool> {
        remove_if_exists(&self.path_for(source))
    }
}

fn remove_if_exists(path: &Path) -> Result<bool> {
    match fs::remove_file(path) {
        Ok(()) => Ok(true),
        Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(false),
        Err(err) => {
            Err(err).with_context(|| format!("Failed to remove cache file {}", path.display()))
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;
    use crate::card::Flashcard;

    fn snapshot() -> Snapshot {
        Snapshot {
            cards: vec![Flashcard::new("u1", "Vocabulary", "猫", "cat")],
            category: "Vocabulary".into(),
            positions: HashMap::from([("Vocabulary".to_string(), 0)]),
        }
    }

    #[test]
    fn save_then_load() {
        let tmp = tempfile::tempdir().unwrap();
        let store = CacheStore::open(tmp.path().join("cache")).unwrap();
        let source = "https://example.com/sheet.csv";

        assert!(store.load(source).unwrap().is_none());
        store.save(source, &snapshot()).unwrap();
        assert_eq!(store.load(source).unwrap(), Some(snapshot()));
    }

    #[test]
    fn sources_get_separate_files() {
        let tmp = tempfile::tempdir().unwrap();
        let store = CacheStore::open(tmp.path()).unwrap();
        assert_ne!(store.path_for("a.csv"), store.path_for("b.csv"));
        assert_eq!(store.path_for(" a.csv "), store.path_for("a.csv"));
    }

    #[test]
    fn clear_reports_removal() {
        let tmp = tempfile::tempdir().unwrap();
        let store = CacheStore::open(tmp.path()).unwrap();
        assert!(!store.clear("deck.csv").unwrap());
        store.save("deck.csv", &snapshot()).unwrap();
        assert!(store.clear("deck.csv").unwrap());
        assert!(store.load("deck.csv").unwrap().is_none());
    }

    #[test]
    fn corrupt_file_is_an_error() {
        let tmp = tempfile::tempdir().unwrap();
        let store = CacheStore::open(tmp.path()).unwrap();
        fs::write(store.path_for("deck.csv"), "{not json").unwrap();
        let err = store.load("deck.csv").unwrap_err();
        assert!(err.to_string().contains("Failed to parse cache file"));
    }
}
