//! SQLite-backed [`ContentRepository`] implementation.
//!
//! Blocks and pages live in `cms_block` / `cms_page`, with their store
//! assignments in the `cms_block_store` / `cms_page_store` link tables.
//! Every save runs in one transaction: the entity row is inserted or
//! updated, then its store links are replaced.

use std::collections::HashMap;

use anyhow::{bail, Result};
use async_trait::async_trait;
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};

use crate::models::{Block, Page, ALL_STORES};

use super::{shares_store, ContentRepository, DUPLICATE_BLOCK_MESSAGE, DUPLICATE_PAGE_MESSAGE};

const PAGE_COLUMNS: &str = "p.page_id, p.identifier, p.title, p.secondary_title, p.meta_keywords, \
     p.meta_description, p.meta_title, p.content, p.page_layout, p.content_heading, \
     p.layout_update_xml, p.is_active";

/// SQLite implementation of the [`ContentRepository`] trait.
pub struct SqliteRepository {
    pool: SqlitePool,
}

impl SqliteRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Store assignments of other entities sharing `identifier`.
    async fn other_assignments(
        &self,
        table: &str,
        link_table: &str,
        id_column: &str,
        identifier: &str,
        own_id: Option<i64>,
    ) -> Result<Vec<Vec<i64>>> {
        let sql = format!(
            "SELECT e.{id}, l.store_id FROM {table} e \
             JOIN {link} l ON l.{id} = e.{id} \
             WHERE e.identifier = ? AND e.{id} != ?",
            id = id_column,
            table = table,
            link = link_table,
        );
        let rows = sqlx::query(&sql)
            .bind(identifier)
            .bind(own_id.unwrap_or(-1))
            .fetch_all(&self.pool)
            .await?;

        let mut grouped: HashMap<i64, Vec<i64>> = HashMap::new();
        for row in rows {
            grouped
                .entry(row.get::<i64, _>(0))
                .or_default()
                .push(row.get::<i64, _>(1));
        }
        Ok(grouped.into_values().collect())
    }

    async fn store_links(&self, link_table: &str, id_column: &str) -> Result<HashMap<i64, Vec<i64>>> {
        let sql = format!(
            "SELECT {id}, store_id FROM {link} ORDER BY store_id ASC",
            id = id_column,
            link = link_table,
        );
        let rows = sqlx::query(&sql).fetch_all(&self.pool).await?;

        let mut links: HashMap<i64, Vec<i64>> = HashMap::new();
        for row in rows {
            links
                .entry(row.get::<i64, _>(0))
                .or_default()
                .push(row.get::<i64, _>(1));
        }
        Ok(links)
    }
}

fn page_from_row(row: &SqliteRow, store_ids: Vec<i64>) -> Page {
    Page {
        id: Some(row.get("page_id")),
        identifier: row.get("identifier"),
        title: row.get("title"),
        secondary_title: row.get("secondary_title"),
        meta_keywords: row.get("meta_keywords"),
        meta_description: row.get("meta_description"),
        meta_title: row.get("meta_title"),
        content: row.get("content"),
        page_layout: row.get("page_layout"),
        content_heading: row.get("content_heading"),
        layout_update_xml: row.get("layout_update_xml"),
        is_active: row.get("is_active"),
        store_ids,
    }
}

#[async_trait]
impl ContentRepository for SqliteRepository {
    async fn save_block(&self, block: &Block) -> Result<i64> {
        let others = self
            .other_assignments(
                "cms_block",
                "cms_block_store",
                "block_id",
                &block.identifier,
                block.id,
            )
            .await?;
        if others.iter().any(|s| shares_store(s, &block.store_ids)) {
            bail!(DUPLICATE_BLOCK_MESSAGE);
        }

        let now = chrono::Utc::now().timestamp();
        let mut tx = self.pool.begin().await?;

        let block_id = match block.id {
            Some(id) => {
                sqlx::query(
                    r#"
                    UPDATE cms_block
                    SET identifier = ?, title = ?, content = ?, is_active = ?, update_time = ?
                    WHERE block_id = ?
                    "#,
                )
                .bind(&block.identifier)
                .bind(&block.title)
                .bind(&block.content)
                .bind(block.is_active)
                .bind(now)
                .bind(id)
                .execute(&mut *tx)
                .await?;
                id
            }
            None => sqlx::query(
                r#"
                INSERT INTO cms_block (identifier, title, content, is_active, creation_time, update_time)
                VALUES (?, ?, ?, ?, ?, ?)
                "#,
            )
            .bind(&block.identifier)
            .bind(&block.title)
            .bind(&block.content)
            .bind(block.is_active)
            .bind(now)
            .bind(now)
            .execute(&mut *tx)
            .await?
            .last_insert_rowid(),
        };

        sqlx::query("DELETE FROM cms_block_store WHERE block_id = ?")
            .bind(block_id)
            .execute(&mut *tx)
            .await?;
        for store_id in &block.store_ids {
            sqlx::query("INSERT INTO cms_block_store (block_id, store_id) VALUES (?, ?)")
                .bind(block_id)
                .bind(store_id)
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;
        Ok(block_id)
    }

    async fn find_page(&self, identifier: &str, store_id: i64) -> Result<Option<Page>> {
        let sql = format!(
            "SELECT {} FROM cms_page p \
             JOIN cms_page_store s ON s.page_id = p.page_id \
             WHERE p.identifier = ? AND s.store_id IN (?, ?) \
             ORDER BY s.store_id DESC LIMIT 1",
            PAGE_COLUMNS
        );
        let row = sqlx::query(&sql)
            .bind(identifier)
            .bind(ALL_STORES)
            .bind(store_id)
            .fetch_optional(&self.pool)
            .await?;

        let row = match row {
            Some(row) => row,
            None => return Ok(None),
        };

        let page_id: i64 = row.get("page_id");
        let store_ids: Vec<i64> = sqlx::query_scalar(
            "SELECT store_id FROM cms_page_store WHERE page_id = ? ORDER BY store_id ASC",
        )
        .bind(page_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(Some(page_from_row(&row, store_ids)))
    }

    async fn save_page(&self, page: &Page) -> Result<i64> {
        let others = self
            .other_assignments(
                "cms_page",
                "cms_page_store",
                "page_id",
                &page.identifier,
                page.id,
            )
            .await?;
        if others.iter().any(|s| shares_store(s, &page.store_ids)) {
            bail!(DUPLICATE_PAGE_MESSAGE);
        }

        let now = chrono::Utc::now().timestamp();
        let mut tx = self.pool.begin().await?;

        let page_id = match page.id {
            Some(id) => {
                sqlx::query(
                    r#"
                    UPDATE cms_page
                    SET identifier = ?, title = ?, secondary_title = ?, meta_keywords = ?,
                        meta_description = ?, meta_title = ?, content = ?, page_layout = ?,
                        content_heading = ?, layout_update_xml = ?, is_active = ?, update_time = ?
                    WHERE page_id = ?
                    "#,
                )
                .bind(&page.identifier)
                .bind(&page.title)
                .bind(&page.secondary_title)
                .bind(&page.meta_keywords)
                .bind(&page.meta_description)
                .bind(&page.meta_title)
                .bind(&page.content)
                .bind(&page.page_layout)
                .bind(&page.content_heading)
                .bind(&page.layout_update_xml)
                .bind(page.is_active)
                .bind(now)
                .bind(id)
                .execute(&mut *tx)
                .await?;
                id
            }
            None => sqlx::query(
                r#"
                INSERT INTO cms_page (identifier, title, secondary_title, meta_keywords,
                                      meta_description, meta_title, content, page_layout,
                                      content_heading, layout_update_xml, is_active,
                                      creation_time, update_time)
                VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
                "#,
            )
            .bind(&page.identifier)
            .bind(&page.title)
            .bind(&page.secondary_title)
            .bind(&page.meta_keywords)
            .bind(&page.meta_description)
            .bind(&page.meta_title)
            .bind(&page.content)
            .bind(&page.page_layout)
            .bind(&page.content_heading)
            .bind(&page.layout_update_xml)
            .bind(page.is_active)
            .bind(now)
            .bind(now)
            .execute(&mut *tx)
            .await?
            .last_insert_rowid(),
        };

        sqlx::query("DELETE FROM cms_page_store WHERE page_id = ?")
            .bind(page_id)
            .execute(&mut *tx)
            .await?;
        for store_id in &page.store_ids {
            sqlx::query("INSERT INTO cms_page_store (page_id, store_id) VALUES (?, ?)")
                .bind(page_id)
                .bind(store_id)
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;
        Ok(page_id)
    }

    async fn list_blocks(&self) -> Result<Vec<Block>> {
        let mut links = self.store_links("cms_block_store", "block_id").await?;
        let rows = sqlx::query(
            "SELECT block_id, identifier, title, content, is_active FROM cms_block ORDER BY block_id ASC",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .iter()
            .map(|row| {
                let id: i64 = row.get("block_id");
                Block {
                    id: Some(id),
                    identifier: row.get("identifier"),
                    title: row.get("title"),
                    content: row.get("content"),
                    is_active: row.get("is_active"),
                    store_ids: links.remove(&id).unwrap_or_default(),
                }
            })
            .collect())
    }

    async fn list_pages(&self) -> Result<Vec<Page>> {
        let mut links = self.store_links("cms_page_store", "page_id").await?;
        let sql = format!("SELECT {} FROM cms_page p ORDER BY p.page_id ASC", PAGE_COLUMNS);
        let rows = sqlx::query(&sql).fetch_all(&self.pool).await?;

        Ok(rows
            .iter()
            .map(|row| {
                let id: i64 = row.get("page_id");
                page_from_row(row, links.remove(&id).unwrap_or_default())
            })
            .collect())
    }
}
