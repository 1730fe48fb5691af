//! TOML configuration for the importer.
//!
//! The configuration carries three concerns: where the SQLite content store
//! lives, which store scopes exist (with their locale codes), and the import
//! defaults (identifier prefixes and the locale allow-list).

use anyhow::{Context, Result};
use serde::Deserialize;
use std::collections::HashSet;
use std::path::{Path, PathBuf};

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub db: DbConfig,
    #[serde(default)]
    pub general: GeneralConfig,
    #[serde(default)]
    pub import: ImportConfig,
    #[serde(default)]
    pub stores: Vec<StoreConfig>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DbConfig {
    pub path: PathBuf,
}

/// Default-scope settings, consulted when a store does not override them.
#[derive(Debug, Deserialize, Clone, Default)]
pub struct GeneralConfig {
    #[serde(default)]
    pub locale: Option<String>,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct ImportConfig {
    #[serde(default)]
    pub block_prefix: String,
    #[serde(default)]
    pub page_prefix: String,
    #[serde(default)]
    pub allowed_locales: Vec<String>,
}

/// A single store scope (storefront view).
#[derive(Debug, Deserialize, Clone)]
pub struct StoreConfig {
    pub id: i64,
    pub code: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub locale: Option<String>,
}

pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    let config: Config = toml::from_str(&content).with_context(|| "Failed to parse config file")?;

    validate(&config)?;

    Ok(config)
}

fn validate(config: &Config) -> Result<()> {
    let mut ids = HashSet::new();
    let mut codes = HashSet::new();

    for store in &config.stores {
        if store.id <= 0 {
            anyhow::bail!(
                "stores.id must be > 0 (store '{}' has id {})",
                store.code,
                store.id
            );
        }
        if store.code.trim().is_empty() {
            anyhow::bail!("stores.code must not be empty (store id {})", store.id);
        }
        if !ids.insert(store.id) {
            anyhow::bail!("Duplicate store id: {}", store.id);
        }
        if !codes.insert(store.code.as_str()) {
            anyhow::bail!("Duplicate store code: '{}'", store.code);
        }
    }

    Ok(())
}
