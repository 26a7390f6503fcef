use std::env;
use std::path::PathBuf;

use anyhow::{Result, anyhow, bail};
use directories::ProjectDirs;

pub const DATA_DIR_ENV: &str = "SHEETCARDS_DATA_DIR";
pub const SOURCE_ENV: &str = "SHEETCARDS_SOURCE";

#[derive(Debug, Clone)]
pub struct Config {
    pub data_dir: PathBuf,
    pub default_source: Option<String>,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        let data_dir = match non_empty_env(DATA_DIR_ENV) {
            Some(dir) => PathBuf::from(dir),
            None => default_data_dir()?,
        };
        std::fs::create_dir_all(&data_dir)?;

        Ok(Config {
            data_dir,
            default_source: non_empty_env(SOURCE_ENV),
        })
    }

    /// The sheet to load: the one given on the command line, else the
    /// configured default.
    pub fn resolve_source(&self, cli_source: Option<String>) -> Result<String> {
        match cli_source.or_else(|| self.default_source.clone()) {
            Some(source) => Ok(source),
            None => bail!("No sheet given. Pass a CSV link or path, or set {SOURCE_ENV}."),
        }
    }

    pub fn cache_dir(&self) -> PathBuf {
        self.data_dir.join("cache")
    }

    pub fn log_dir(&self) -> PathBuf {
        self.data_dir.join("logs")
    }
}

fn non_empty_env(key: &str) -> Option<String> {
    env::var(key)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

fn default_data_dir() -> Result<PathBuf> {
    let proj_dirs = ProjectDirs::from("", "", "sheetcards")
        .ok_or_else(|| anyhow!("Could not determine project directory"))?;
    Ok(proj_dirs.data_dir().to_path_buf())
}
