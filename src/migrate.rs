use anyhow::Result;
use sqlx::SqlitePool;

use crate::config::Config;
use crate::db;

pub async fn run_migrations(config: &Config) -> Result<()> {
    let pool = db::connect(config).await?;
    create_schema(&pool).await?;
    pool.close().await;
    Ok(())
}

/// Create the content tables. Safe to run repeatedly.
pub async fn create_schema(pool: &SqlitePool) -> Result<()> {
    // Blocks
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS cms_block (
            block_id INTEGER PRIMARY KEY AUTOINCREMENT,
            identifier TEXT NOT NULL,
            title TEXT NOT NULL,
            content TEXT NOT NULL DEFAULT '',
            is_active INTEGER NOT NULL DEFAULT 1,
            creation_time INTEGER NOT NULL,
            update_time INTEGER NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS cms_block_store (
            block_id INTEGER NOT NULL,
            store_id INTEGER NOT NULL,
            PRIMARY KEY (block_id, store_id),
            FOREIGN KEY (block_id) REFERENCES cms_block(block_id) ON DELETE CASCADE
        )
        "#,
    )
    .execute(pool)
    .await?;

    // Pages
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS cms_page (
            page_id INTEGER PRIMARY KEY AUTOINCREMENT,
            identifier TEXT NOT NULL,
            title TEXT NOT NULL DEFAULT '',
            secondary_title TEXT NOT NULL DEFAULT '',
            meta_keywords TEXT NOT NULL DEFAULT '',
            meta_description TEXT NOT NULL DEFAULT '',
            meta_title TEXT NOT NULL DEFAULT '',
            content TEXT NOT NULL DEFAULT '',
            page_layout TEXT NOT NULL DEFAULT '',
            content_heading TEXT NOT NULL DEFAULT '',
            layout_update_xml TEXT NOT NULL DEFAULT '',
            is_active INTEGER NOT NULL DEFAULT 1,
            creation_time INTEGER NOT NULL,
            update_time INTEGER NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS cms_page_store (
            page_id INTEGER NOT NULL,
            store_id INTEGER NOT NULL,
            PRIMARY KEY (page_id, store_id),
            FOREIGN KEY (page_id) REFERENCES cms_page(page_id) ON DELETE CASCADE
        )
        "#,
    )
    .execute(pool)
    .await?;

    // Indexes
    sqlx::query("CREATE INDEX IF NOT EXISTS idx_cms_block_identifier ON cms_block(identifier)")
        .execute(pool)
        .await?;
    sqlx::query("CREATE INDEX IF NOT EXISTS idx_cms_page_identifier ON cms_page(identifier)")
        .execute(pool)
        .await?;
    sqlx::query("CREATE INDEX IF NOT EXISTS idx_cms_page_store_store ON cms_page_store(store_id)")
        .execute(pool)
        .await?;

    Ok(())
}
