//! In-memory [`ContentRepository`] implementation for tests and dry runs.
//!
//! Entities live in `Vec`s behind `std::sync::RwLock`. By default any block
//! is accepted, including one whose identifier already exists in the same
//! store; [`InMemoryRepository::with_unique_identifiers`] enables the same
//! uniqueness rule the SQLite store enforces.

use std::sync::RwLock;

use anyhow::{bail, Result};
use async_trait::async_trait;

use crate::models::{Block, Page, ALL_STORES};

use super::{shares_store, ContentRepository, DUPLICATE_BLOCK_MESSAGE, DUPLICATE_PAGE_MESSAGE};

pub struct InMemoryRepository {
    blocks: RwLock<Vec<Block>>,
    pages: RwLock<Vec<Page>>,
    unique_identifiers: bool,
}

impl InMemoryRepository {
    pub fn new() -> Self {
        Self {
            blocks: RwLock::new(Vec::new()),
            pages: RwLock::new(Vec::new()),
            unique_identifiers: false,
        }
    }

    /// Reject a block or page whose identifier is already used in one of its stores.
    pub fn with_unique_identifiers(mut self) -> Self {
        self.unique_identifiers = true;
        self
    }
}

impl Default for InMemoryRepository {
    fn default() -> Self {
        Self::new()
    }
}

/// Replace the item with a matching id, or append it under the next free id.
fn upsert<T: Clone>(
    items: &mut Vec<T>,
    item: &T,
    get_id: impl Fn(&T) -> Option<i64>,
    set_id: impl Fn(&mut T, i64),
) -> i64 {
    if let Some(id) = get_id(item) {
        if let Some(pos) = items.iter().position(|existing| get_id(existing) == Some(id)) {
            items[pos] = item.clone();
            return id;
        }
    }
    let new_id = items.iter().filter_map(|i| get_id(i)).max().unwrap_or(0) + 1;
    let mut stored = item.clone();
    set_id(&mut stored, new_id);
    items.push(stored);
    new_id
}

#[async_trait]
impl ContentRepository for InMemoryRepository {
    async fn save_block(&self, block: &Block) -> Result<i64> {
        let mut blocks = self.blocks.write().unwrap();
        if self.unique_identifiers
            && blocks.iter().any(|b| {
                b.id != block.id
                    && b.identifier == block.identifier
                    && shares_store(&b.store_ids, &block.store_ids)
            })
        {
            bail!(DUPLICATE_BLOCK_MESSAGE);
        }
        Ok(upsert(&mut blocks, block, |b| b.id, |b, id| b.id = Some(id)))
    }

    async fn find_page(&self, identifier: &str, store_id: i64) -> Result<Option<Page>> {
        let pages = self.pages.read().unwrap();
        let exact = pages
            .iter()
            .find(|p| p.identifier == identifier && p.store_ids.contains(&store_id));
        let any_store = || {
            pages
                .iter()
                .find(|p| p.identifier == identifier && p.store_ids.contains(&ALL_STORES))
        };
        Ok(exact.or_else(any_store).cloned())
    }

    async fn save_page(&self, page: &Page) -> Result<i64> {
        let mut pages = self.pages.write().unwrap();
        if self.unique_identifiers
            && pages.iter().any(|p| {
                p.id != page.id
                    && p.identifier == page.identifier
                    && shares_store(&p.store_ids, &page.store_ids)
            })
        {
            bail!(DUPLICATE_PAGE_MESSAGE);
        }
        Ok(upsert(&mut pages, page, |p| p.id, |p, id| p.id = Some(id)))
    }

    async fn list_blocks(&self) -> Result<Vec<Block>> {
        Ok(self.blocks.read().unwrap().clone())
    }

    async fn list_pages(&self) -> Result<Vec<Page>> {
        Ok(self.pages.read().unwrap().clone())
    }
}
