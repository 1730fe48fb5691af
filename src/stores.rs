//! Store scopes and locale resolution.
//!
//! The [`StoreDirectory`] trait is the seam to whatever knows about the
//! configured storefronts. [`ConfigStoreDirectory`] answers from the TOML
//! configuration, with store-scope values falling back to the default
//! scope. [`resolve_locale_stores`] builds the locale-store map the import
//! pipelines iterate over.

use anyhow::Result;
use async_trait::async_trait;
use tracing::debug;

use crate::config::Config;
use crate::models::{LocaleStore, LocaleStoreMap, StoreScope};

/// Configuration path holding a store's locale code.
pub const XML_PATH_LOCALE: &str = "general/locale/code";

/// Read access to store scopes and their scoped configuration.
#[async_trait]
pub trait StoreDirectory: Send + Sync {
    /// All storefront scopes, excluding the admin scope.
    async fn stores(&self) -> Result<Vec<StoreScope>>;

    /// A configuration value at store scope, falling back to default scope.
    async fn config_value(&self, path: &str, store_id: i64) -> Result<Option<String>>;
}

/// [`StoreDirectory`] backed by the `[[stores]]` and `[general]` config tables.
#[derive(Debug, Clone, Default)]
pub struct ConfigStoreDirectory {
    stores: Vec<(StoreScope, Option<String>)>,
    default_locale: Option<String>,
}

impl ConfigStoreDirectory {
    pub fn from_config(config: &Config) -> Self {
        Self {
            stores: config
                .stores
                .iter()
                .map(|s| {
                    (
                        StoreScope {
                            id: s.id,
                            code: s.code.clone(),
                            name: s.name.clone(),
                        },
                        s.locale.clone(),
                    )
                })
                .collect(),
            default_locale: config.general.locale.clone(),
        }
    }

    /// Build a directory from `(id, code, locale)` triples.
    pub fn from_stores<'a>(stores: impl IntoIterator<Item = (i64, &'a str, &'a str)>) -> Self {
        Self {
            stores: stores
                .into_iter()
                .map(|(id, code, locale)| {
                    (
                        StoreScope {
                            id,
                            code: code.to_string(),
                            name: None,
                        },
                        Some(locale.to_string()),
                    )
                })
                .collect(),
            default_locale: None,
        }
    }
}

#[async_trait]
impl StoreDirectory for ConfigStoreDirectory {
    async fn stores(&self) -> Result<Vec<StoreScope>> {
        Ok(self.stores.iter().map(|(scope, _)| scope.clone()).collect())
    }

    async fn config_value(&self, path: &str, store_id: i64) -> Result<Option<String>> {
        if path != XML_PATH_LOCALE {
            return Ok(None);
        }
        let store_value = self
            .stores
            .iter()
            .find(|(scope, _)| scope.id == store_id)
            .and_then(|(_, locale)| locale.clone());
        Ok(store_value.or_else(|| self.default_locale.clone()))
    }
}

/// Map every store scope to its locale code.
///
/// With a non-empty `allowed_locales`, only stores whose locale is exactly
/// one of the listed codes are kept. Stores sharing a locale each get their
/// own entry.
pub async fn resolve_locale_stores(
    directory: &dyn StoreDirectory,
    allowed_locales: &[String],
) -> Result<LocaleStoreMap> {
    let mut entries = Vec::new();

    for store in directory.stores().await? {
        let Some(locale) = directory.config_value(XML_PATH_LOCALE, store.id).await? else {
            debug!(store = %store.code, "store has no locale configured, skipping");
            continue;
        };

        if !allowed_locales.is_empty() && !allowed_locales.contains(&locale) {
            continue;
        }

        entries.push(LocaleStore {
            locale,
            store_id: store.id,
        });
    }

    Ok(LocaleStoreMap::new(entries))
}

/// Print the resolved locale-store map (`cms-import stores`).
pub async fn list_stores(config: &Config, allowed_locales: &[String]) -> Result<()> {
    let directory = ConfigStoreDirectory::from_config(config);
    let map = resolve_locale_stores(&directory, allowed_locales).await?;
    let stores = directory.stores().await?;

    println!("{:<8} {:<16} {:<24} LOCALE", "STORE", "CODE", "NAME");
    for entry in map.entries() {
        let scope = stores.iter().find(|s| s.id == entry.store_id);
        let code = scope.map(|s| s.code.as_str()).unwrap_or("-");
        let name = scope.and_then(|s| s.name.as_deref()).unwrap_or("-");
        println!(
            "{:<8} {:<16} {:<24} {}",
            entry.store_id, code, name, entry.locale
        );
    }

    Ok(())
}
