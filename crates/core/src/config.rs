//! Application configuration handling.
//!
//! Configuration lives in a TOML file under the user's config directory and
//! can be overridden per-key with `DAYBOARD_*` environment variables.

use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

const CONFIG_DIR: &str = "dayboard";
const CONFIG_FILE: &str = "config.toml";

const DEFAULT_TEMPLATE: &str = r#"# dayboard configuration.
#
# Endpoint returning {"livres": [...], "impedidos": [...]} for a date.
roster_url = "http://localhost:8000/api/day-roster"

# Endpoint returning {"metas": [...]} for a date.
goals_url = "http://localhost:8000/api/goals"

# Optional YYYY-MM-DD the board opens on; defaults to today.
# start_date = "2026-08-07"
"#;

/// User-facing configuration for the board.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Endpoint returning the availability roster for a date.
    pub roster_url: String,
    /// Endpoint returning the goal feed for a date.
    pub goals_url: String,
    /// Optional `YYYY-MM-DD` the board opens on; defaults to today.
    #[serde(default)]
    pub start_date: Option<String>,
}

impl AppConfig {
    /// Path of the config file under the user's config directory.
    pub fn path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(CONFIG_DIR)
            .join(CONFIG_FILE)
    }

    /// Load the configuration from the default location.
    pub fn load() -> Result<Self> {
        Self::load_from(Self::path())
    }

    /// Load from an explicit file path, layering `DAYBOARD_*` environment
    /// variables on top. A missing file yields the built-in defaults.
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let settings = config::Config::builder()
            .set_default("roster_url", "http://localhost:8000/api/day-roster")?
            .set_default("goals_url", "http://localhost:8000/api/goals")?
            .add_source(config::File::from(path.to_path_buf()).required(false))
            .add_source(config::Environment::with_prefix("DAYBOARD"))
            .build()
            .with_context(|| format!("failed to read configuration {}", path.display()))?;

        settings
            .try_deserialize()
            .with_context(|| format!("failed to parse configuration {}", path.display()))
    }
}

/// Write a commented default config file when none exists yet, returning
/// its path.
pub fn ensure_default_config() -> Result<PathBuf> {
    ensure_default_at(AppConfig::path())
}

fn ensure_default_at(path: PathBuf) -> Result<PathBuf> {
    if path.exists() {
        return Ok(path);
    }
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    fs::write(&path, DEFAULT_TEMPLATE)
        .with_context(|| format!("failed to write {}", path.display()))?;
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn bootstrap_writes_a_default_only_once() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("dayboard").join("config.toml");

        let written = ensure_default_at(path.clone())?;
        assert!(written.exists());

        fs::write(&path, "roster_url = \"http://unit.local/roster\"\n")?;
        ensure_default_at(path.clone())?;
        let kept = fs::read_to_string(&path)?;
        assert!(kept.contains("unit.local"));
        Ok(())
    }

    #[test]
    fn file_values_override_defaults() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("config.toml");
        fs::write(
            &path,
            r#"
roster_url = "http://unit.local/roster"
goals_url = "http://unit.local/goals"
start_date = "2026-08-07"
"#,
        )?;

        let config = AppConfig::load_from(&path)?;
        assert_eq!(config.roster_url, "http://unit.local/roster");
        assert_eq!(config.goals_url, "http://unit.local/goals");
        assert_eq!(config.start_date.as_deref(), Some("2026-08-07"));
        Ok(())
    }

    #[test]
    fn missing_file_yields_defaults() -> Result<()> {
        let dir = tempdir()?;
        let config = AppConfig::load_from(dir.path().join("absent.toml"))?;
        assert!(!config.roster_url.is_empty());
        assert_eq!(config.start_date, None);
        Ok(())
    }
}
