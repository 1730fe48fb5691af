//! Typed import records.
//!
//! Decoded rows are validated into [`BlockRecord`] and [`PageRecord`] before
//! any entity is written. Page rows carry per-locale columns of the form
//! `<field>-<locale>` (e.g. `title-de_DE`); these are grouped into one
//! [`LocalizedPageFields`] per locale.

use anyhow::{anyhow, Result};
use std::collections::BTreeMap;

use crate::source::ContentRecord;

/// Page fields that are read from locale-suffixed columns.
pub const LOCALIZED_PAGE_FIELDS: [&str; 6] = [
    "title",
    "secondary_title",
    "meta_keywords",
    "meta_description",
    "meta_title",
    "content",
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockRecord {
    pub identifier: String,
    pub locale: String,
    pub title: String,
    pub content: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LocalizedPageFields {
    pub title: String,
    pub secondary_title: String,
    pub meta_keywords: String,
    pub meta_description: String,
    pub meta_title: String,
    pub content: String,
}

impl LocalizedPageFields {
    fn set(&mut self, field: &str, value: &str) {
        let slot = match field {
            "title" => &mut self.title,
            "secondary_title" => &mut self.secondary_title,
            "meta_keywords" => &mut self.meta_keywords,
            "meta_description" => &mut self.meta_description,
            "meta_title" => &mut self.meta_title,
            "content" => &mut self.content,
            _ => return,
        };
        *slot = value.to_string();
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRecord {
    pub identifier: String,
    /// Optional `locale` column restricting the row to one locale.
    pub locale: Option<String>,
    pub page_layout: String,
    pub content_heading: String,
    pub layout_update_xml: String,
    pub localized: BTreeMap<String, LocalizedPageFields>,
}

impl PageRecord {
    /// Whether this row should be written to a store with `locale`.
    ///
    /// The row needs localized columns for `locale`; an explicit `locale`
    /// column further restricts it to that one locale.
    pub fn targets(&self, locale: &str) -> bool {
        if !self.localized.contains_key(locale) {
            return false;
        }
        match &self.locale {
            Some(own) => own == locale,
            None => true,
        }
    }

    /// Localized fields for `locale`; empty when the row has none.
    pub fn localized_for(&self, locale: &str) -> LocalizedPageFields {
        self.localized.get(locale).cloned().unwrap_or_default()
    }
}

fn required<'a>(record: &'a ContentRecord, column: &str, row: usize) -> Result<&'a str> {
    record
        .get(column)
        .ok_or_else(|| anyhow!("row {}: missing required column '{}'", row, column))
}

impl BlockRecord {
    /// Validate a decoded row; `row` is the 1-based data row number.
    pub fn from_record(record: &ContentRecord, row: usize) -> Result<Self> {
        Ok(Self {
            identifier: required(record, "identifier", row)?.to_string(),
            locale: required(record, "locale", row)?.to_string(),
            title: required(record, "title", row)?.to_string(),
            content: required(record, "content", row)?.to_string(),
        })
    }
}

impl PageRecord {
    /// Validate a decoded row; `row` is the 1-based data row number.
    pub fn from_record(record: &ContentRecord, row: usize) -> Result<Self> {
        let mut localized: BTreeMap<String, LocalizedPageFields> = BTreeMap::new();
        for (column, value) in record.columns() {
            let Some((field, locale)) = column.split_once('-') else {
                continue;
            };
            if locale.is_empty() || !LOCALIZED_PAGE_FIELDS.contains(&field) {
                continue;
            }
            localized
                .entry(locale.to_string())
                .or_default()
                .set(field, value);
        }

        let optional = |column: &str| record.get(column).unwrap_or_default().to_string();

        Ok(Self {
            identifier: required(record, "identifier", row)?.to_string(),
            locale: record
                .get("locale")
                .filter(|l| !l.is_empty())
                .map(str::to_string),
            page_layout: optional("page_layout"),
            content_heading: optional("content_heading"),
            layout_update_xml: optional("layout_update_xml"),
            localized,
        })
    }
}

/// Validate all rows as blocks, failing on the first invalid one.
pub fn block_records(records: &[ContentRecord]) -> Result<Vec<BlockRecord>> {
    records
        .iter()
        .enumerate()
        .map(|(i, r)| BlockRecord::from_record(r, i + 1))
        .collect()
}

/// Validate all rows as pages, failing on the first invalid one.
pub fn page_records(records: &[ContentRecord]) -> Result<Vec<PageRecord>> {
    records
        .iter()
        .enumerate()
        .map(|(i, r)| PageRecord::from_record(r, i + 1))
        .collect()
}
