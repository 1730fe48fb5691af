//! Core data models used throughout the importer.
//!
//! These types represent the store scopes, the locale-store map, and the
//! block and page entities that flow from the record pipelines into the
//! content repository.

use serde::Serialize;

/// The admin / all-stores scope id.
pub const ALL_STORES: i64 = 0;

/// A configured store scope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreScope {
    pub id: i64,
    pub code: String,
    /// Display name, shown by `cms-import stores`.
    pub name: Option<String>,
}

/// One entry of the locale-store map.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LocaleStore {
    pub locale: String,
    pub store_id: i64,
}

/// Locale code to store id pairs, in store enumeration order.
///
/// Two stores may share a locale code; both entries are kept.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LocaleStoreMap {
    entries: Vec<LocaleStore>,
}

impl LocaleStoreMap {
    pub fn new(entries: Vec<LocaleStore>) -> Self {
        Self { entries }
    }

    pub fn entries(&self) -> &[LocaleStore] {
        &self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Stores whose locale code equals `locale` exactly.
    pub fn stores_for<'a>(&'a self, locale: &'a str) -> impl Iterator<Item = i64> + 'a {
        self.entries
            .iter()
            .filter(move |e| e.locale == locale)
            .map(|e| e.store_id)
    }
}

/// A reusable content fragment.
/// The two content entity types handled by `block`, `page` and `list`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    Blocks,
    Pages,
}

impl EntityKind {
    pub fn label(&self) -> &'static str {
        match self {
            EntityKind::Blocks => "blocks",
            EntityKind::Pages => "pages",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Block {
    pub id: Option<i64>,
    pub identifier: String,
    pub title: String,
    pub content: String,
    pub is_active: bool,
    pub store_ids: Vec<i64>,
}

impl Block {
    pub fn new(identifier: impl Into<String>) -> Self {
        Self {
            id: None,
            identifier: identifier.into(),
            title: String::new(),
            content: String::new(),
            is_active: true,
            store_ids: Vec::new(),
        }
    }
}

/// A full content page with layout and metadata fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Page {
    pub id: Option<i64>,
    pub identifier: String,
    pub title: String,
    pub secondary_title: String,
    pub meta_keywords: String,
    pub meta_description: String,
    pub meta_title: String,
    pub content: String,
    pub page_layout: String,
    pub content_heading: String,
    pub layout_update_xml: String,
    pub is_active: bool,
    pub store_ids: Vec<i64>,
}

impl Page {
    pub fn new(identifier: impl Into<String>) -> Self {
        Self {
            id: None,
            identifier: identifier.into(),
            title: String::new(),
            secondary_title: String::new(),
            meta_keywords: String::new(),
            meta_description: String::new(),
            meta_title: String::new(),
            content: String::new(),
            page_layout: String::new(),
            content_heading: String::new(),
            layout_update_xml: String::new(),
            is_active: true,
            store_ids: Vec::new(),
        }
    }
}

/// Normalize a block or page identifier: prefix, then lower-case.
pub fn normalize_identifier(prefix: &str, raw: &str) -> String {
    format!("{}{}", prefix, raw).to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_lowercases_prefix_and_identifier() {
        assert_eq!(normalize_identifier("imported-", "ABOUT"), "imported-about");
        assert_eq!(normalize_identifier("Shop_", "Footer"), "shop_footer");
        assert_eq!(normalize_identifier("", "Welcome"), "welcome");
    }

    #[test]
    fn entity_kind_labels() {
        assert_eq!(EntityKind::Blocks.label(), "blocks");
        assert_eq!(EntityKind::Pages.label(), "pages");
    }

    #[test]
    fn stores_for_keeps_shared_locales() {
        let map = LocaleStoreMap::new(vec![
            LocaleStore {
                locale: "de_DE".to_string(),
                store_id: 1,
            },
            LocaleStore {
                locale: "en_US".to_string(),
                store_id: 2,
            },
            LocaleStore {
                locale: "de_DE".to_string(),
                store_id: 4,
            },
        ]);

        let de: Vec<i64> = map.stores_for("de_DE").collect();
        assert_eq!(de, vec![1, 4]);
        assert_eq!(map.stores_for("de").count(), 0);
    }
}
