use std::path::Path;

use anyhow::{Context, Result};
use tracing::info;

pub fn is_remote(source: &str) -> bool {
    let lower = source.trim_start().to_ascii_lowercase();
    lower.starts_with("http://") || lower.starts_with("https://")
}

/// Reads the raw sheet text, from a published CSV link or a local file.
pub async fn read_source(source: &str) -> Result<String> {
    if is_remote(source) {
        fetch_url(source).await
    } else {
        read_file(Path::new(source)).await
    }
}

async fn fetch_url(url: &str) -> Result<String> {
    info!(url, "fetching sheet");
    let response = reqwest::get(url)
        .await
        .with_context(|| format!("failed to fetch {url}"))?
        .error_for_status()
        .with_context(|| format!("sheet request to {url} was rejected"))?;
    response
        .text()
        .await
        .with_context(|| format!("failed to read response body from {url}"))
}

async fn read_file(path: &Path) -> Result<String> {
    info!(path = %path.display(), "reading sheet");
    tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("failed to read sheet file: {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn recognizes_remote_sources() {
        assert!(is_remote("https://docs.google.com/spreadsheets/d/e/x/pub?output=csv"));
        assert!(is_remote("HTTP://example.com/a.csv"));
        assert!(!is_remote("decks/vocab.csv"));
        assert!(!is_remote("/tmp/https.csv"));
    }

    #[tokio::test]
    async fn reads_local_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "question,answer\nQ,A\n").unwrap();
        let text = read_source(file.path().to_str().unwrap()).await.unwrap();
        assert_eq!(text, "question,answer\nQ,A\n");
    }

    #[tokio::test]
    async fn missing_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope.csv");
        let err = read_source(missing.to_str().unwrap()).await.unwrap_err();
        assert!(err.to_string().contains("failed to read sheet file"));
    }
}
