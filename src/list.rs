//! Listing of persisted blocks and pages (`cms-import list`).

use anyhow::Result;

use crate::config::Config;
use crate::db;
use crate::migrate;
use crate::models::EntityKind;
use crate::repository::{ContentRepository, SqliteRepository};

fn format_stores(store_ids: &[i64]) -> String {
    store_ids
        .iter()
        .map(|s| s.to_string())
        .collect::<Vec<_>>()
        .join(",")
}

pub async fn run_list(config: &Config, kind: EntityKind, json: bool) -> Result<()> {
    let pool = db::connect(config).await?;
    migrate::create_schema(&pool).await?;
    let repo = SqliteRepository::new(pool);

    match kind {
        EntityKind::Blocks => {
            let blocks = repo.list_blocks().await?;
            if json {
                println!("{}", serde_json::to_string_pretty(&blocks)?);
            } else {
                println!("{:<6} {:<32} {:<10} TITLE", "ID", "IDENTIFIER", "STORES");
                for block in &blocks {
                    println!(
                        "{:<6} {:<32} {:<10} {}",
                        block.id.unwrap_or_default(),
                        block.identifier,
                        format_stores(&block.store_ids),
                        block.title
                    );
                }
            }
        }
        EntityKind::Pages => {
            let pages = repo.list_pages().await?;
            if json {
                println!("{}", serde_json::to_string_pretty(&pages)?);
            } else {
                println!(
                    "{:<6} {:<32} {:<10} {:<16} TITLE",
                    "ID", "IDENTIFIER", "STORES", "LAYOUT"
                );
                for page in &pages {
                    println!(
                        "{:<6} {:<32} {:<10} {:<16} {}",
                        page.id.unwrap_or_default(),
                        page.identifier,
                        format_stores(&page.store_ids),
                        page.page_layout,
                        page.title
                    );
                }
            }
        }
    }

    repo.pool().close().await;
    Ok(())
}
