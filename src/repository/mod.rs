//! Content repository abstraction.
//!
//! The [`ContentRepository`] trait defines the persistence operations the
//! import pipelines need, so the pipelines run unchanged against the SQLite
//! store used by the CLI or the in-memory store used in tests.
//!
//! Implementations must be `Send + Sync` to work with async runtimes.

pub mod memory;
pub mod sqlite;

use anyhow::Result;
use async_trait::async_trait;

use crate::models::{Block, Page, ALL_STORES};

pub use memory::InMemoryRepository;
pub use sqlite::SqliteRepository;

/// Raised when a block identifier is already assigned to one of the stores.
pub const DUPLICATE_BLOCK_MESSAGE: &str =
    "A block identifier with the same properties already exists in the selected store.";

/// Raised when a page identifier is already assigned to one of the stores.
pub const DUPLICATE_PAGE_MESSAGE: &str = "A page URL key for specified store already exists.";

/// Abstract storage backend for blocks and pages.
///
/// # Operations
///
/// | Method | Purpose |
/// |--------|---------|
/// | [`save_block`](ContentRepository::save_block) | Insert a new block or update an existing one |
/// | [`find_page`](ContentRepository::find_page) | Look up a page by identifier within a store |
/// | [`save_page`](ContentRepository::save_page) | Insert a new page or update an existing one |
/// | [`list_blocks`](ContentRepository::list_blocks) | All stored blocks |
/// | [`list_pages`](ContentRepository::list_pages) | All stored pages |
#[async_trait]
pub trait ContentRepository: Send + Sync {
    /// Persist a block. A block without `id` is inserted.
    ///
    /// Returns the block's id (existing or newly assigned).
    async fn save_block(&self, block: &Block) -> Result<i64>;

    /// Find the page with `identifier` visible in `store_id`.
    ///
    /// A page assigned to the exact store wins over one assigned to all
    /// stores. `None` is the normal result for a new page.
    async fn find_page(&self, identifier: &str, store_id: i64) -> Result<Option<Page>>;

    /// Persist a page. A page without `id` is inserted.
    ///
    /// Returns the page's id (existing or newly assigned).
    async fn save_page(&self, page: &Page) -> Result<i64>;

    async fn list_blocks(&self) -> Result<Vec<Block>>;

    async fn list_pages(&self) -> Result<Vec<Page>>;
}

/// Whether two store assignments overlap; the all-stores scope overlaps everything.
pub(crate) fn shares_store(a: &[i64], b: &[i64]) -> bool {
    if a.contains(&ALL_STORES) || b.contains(&ALL_STORES) {
        return !a.is_empty() && !b.is_empty();
    }
    a.iter().any(|s| b.contains(s))
}
