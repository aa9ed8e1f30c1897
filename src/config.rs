use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use crate::library::{DEFAULT_LOAN_DURATION_DAYS, LibraryOptions};

pub const DEFAULT_DATABASE: &str = "libris.db";
pub const DEFAULT_PORT: u16 = 8080;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct LibrisConfig {
    pub database: Option<String>,
    pub loan_duration_days: Option<i64>,
    pub port: Option<u16>,
}

impl LibrisConfig {
    /// Database path: explicit override, then config, then the default
    pub fn database_path(&self, override_path: Option<&Path>) -> PathBuf {
        override_path
            .map(Path::to_path_buf)
            .or_else(|| self.database.as_ref().map(PathBuf::from))
            .unwrap_or_else(|| PathBuf::from(DEFAULT_DATABASE))
    }

    pub fn library_options(&self) -> LibraryOptions {
        LibraryOptions {
            loan_duration_days: self.loan_duration_days.unwrap_or(DEFAULT_LOAN_DURATION_DAYS),
        }
    }

    pub fn port(&self, override_port: Option<u16>) -> u16 {
        override_port.or(self.port).unwrap_or(DEFAULT_PORT)
    }
}

pub fn default_config_path() -> PathBuf {
    PathBuf::from("libris.toml")
}

pub fn load_config(path: Option<&Path>) -> anyhow::Result<Option<LibrisConfig>> {
    let path = path.map(Path::to_path_buf).unwrap_or_else(default_config_path);
    if !path.exists() {
        return Ok(None);
    }

    let contents = std::fs::read_to_string(&path)?;
    let config: LibrisConfig = toml::from_str(&contents)?;
    if let Some(days) = config.loan_duration_days {
        if days <= 0 {
            anyhow::bail!("loan_duration_days must be positive in {} (got {})", path.display(), days);
        }
    }
    Ok(Some(config))
}

pub fn write_config(path: &Path, config: &LibrisConfig, force: bool) -> anyhow::Result<()> {
    if path.exists() && !force {
        anyhow::bail!("config already exists at {} (use --force to overwrite)", path.display());
    }

    let contents = toml::to_string_pretty(config)?;
    std::fs::write(path, contents)?;
    Ok(())
}

pub fn ensure_db_dir(db_path: &Path) -> anyhow::Result<()> {
    if let Some(parent) = db_path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            std::fs::create_dir_all(parent)?;
        }
    }
    Ok(())
}
