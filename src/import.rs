//! Block and page import pipelines.
//!
//! Both pipelines resolve the locale-store map once per run, then walk the
//! records in file order and write one entity per (record, matching store)
//! pair. Nothing is retried or suppressed: the first failing save aborts the
//! run, and entities saved before it stay saved.

use anyhow::Result;
use std::path::Path;
use tracing::{debug, info};

use crate::config::Config;
use crate::db;
use crate::migrate;
use crate::models::{normalize_identifier, Block, EntityKind, Page};
use crate::records::{block_records, page_records, BlockRecord, PageRecord};
use crate::repository::{ContentRepository, SqliteRepository};
use crate::source::read_records;
use crate::stores::{resolve_locale_stores, ConfigStoreDirectory, StoreDirectory};

/// Per-run settings passed explicitly into each pipeline.
#[derive(Debug, Clone, Default)]
pub struct ImportOptions {
    /// Prepended to every identifier before lower-casing.
    pub prefix: String,
    /// Locale codes to import; empty means every configured store.
    pub allowed_locales: Vec<String>,
    /// Count writes without saving anything.
    pub dry_run: bool,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ImportStats {
    pub records: u64,
    pub saved: u64,
    pub skipped: u64,
}

/// Create a new block for every record in every store of its locale.
///
/// Blocks are never looked up first; whether a repeated identifier is
/// accepted is up to the repository.
pub async fn import_blocks(
    repo: &dyn ContentRepository,
    directory: &dyn StoreDirectory,
    records: &[BlockRecord],
    options: &ImportOptions,
) -> Result<ImportStats> {
    let locale_stores = resolve_locale_stores(directory, &options.allowed_locales).await?;
    let mut stats = ImportStats::default();

    for record in records {
        stats.records += 1;
        let block_id = normalize_identifier(&options.prefix, &record.identifier);
        let mut written = 0u64;

        for store_id in locale_stores.stores_for(&record.locale) {
            written += 1;
            if options.dry_run {
                continue;
            }

            let mut block = Block::new(block_id.clone());
            block.title = record.title.clone();
            block.content = record.content.clone();
            block.store_ids = vec![store_id];

            let id = repo.save_block(&block).await?;
            debug!(identifier = %block_id, store_id, id, "saved block");
        }

        if written == 0 {
            stats.skipped += 1;
        }
        stats.saved += written;
    }

    info!(
        records = stats.records,
        saved = stats.saved,
        skipped = stats.skipped,
        "block import finished"
    );
    Ok(stats)
}

/// Create or overwrite the page for every record in every store it targets.
///
/// A record targets a store when it carries localized columns for the
/// store's locale and, if it has a `locale` column, that column names the
/// same locale.
pub async fn import_pages(
    repo: &dyn ContentRepository,
    directory: &dyn StoreDirectory,
    records: &[PageRecord],
    options: &ImportOptions,
) -> Result<ImportStats> {
    let locale_stores = resolve_locale_stores(directory, &options.allowed_locales).await?;
    let mut stats = ImportStats::default();

    for record in records {
        stats.records += 1;
        let identifier = normalize_identifier(&options.prefix, &record.identifier);
        let mut written = 0u64;

        for entry in locale_stores.entries() {
            if !record.targets(&entry.locale) {
                continue;
            }
            written += 1;
            if options.dry_run {
                continue;
            }

            let mut page = match repo.find_page(&identifier, entry.store_id).await? {
                Some(existing) => existing,
                None => Page::new(identifier.clone()),
            };
            apply_page_fields(&mut page, record, &entry.locale, entry.store_id);

            let id = repo.save_page(&page).await?;
            debug!(identifier = %identifier, store_id = entry.store_id, id, "saved page");
        }

        if written == 0 {
            stats.skipped += 1;
        }
        stats.saved += written;
    }

    info!(
        records = stats.records,
        saved = stats.saved,
        skipped = stats.skipped,
        "page import finished"
    );
    Ok(stats)
}

/// Overwrite every imported field of `page` from `record` for one store.
fn apply_page_fields(page: &mut Page, record: &PageRecord, locale: &str, store_id: i64) {
    let localized = record.localized_for(locale);
    page.title = localized.title;
    page.secondary_title = localized.secondary_title;
    page.meta_keywords = localized.meta_keywords;
    page.meta_description = localized.meta_description;
    page.meta_title = localized.meta_title;
    page.content = localized.content;
    page.page_layout = record.page_layout.clone();
    page.content_heading = record.content_heading.clone();
    page.layout_update_xml = record.layout_update_xml.clone();
    page.store_ids = vec![store_id];
}

/// `cms-import block|page <file>`: decode the file and run the pipeline
/// against the configured SQLite store.
pub async fn run_import(
    config: &Config,
    kind: EntityKind,
    path: &Path,
    prefix: Option<String>,
    locales: Vec<String>,
    dry_run: bool,
) -> Result<()> {
    let options = ImportOptions {
        prefix: prefix.unwrap_or_else(|| match kind {
            EntityKind::Blocks => config.import.block_prefix.clone(),
            EntityKind::Pages => config.import.page_prefix.clone(),
        }),
        allowed_locales: if locales.is_empty() {
            config.import.allowed_locales.clone()
        } else {
            locales
        },
        dry_run,
    };

    let rows = read_records(path)?;
    let directory = ConfigStoreDirectory::from_config(config);

    let pool = db::connect(config).await?;
    migrate::create_schema(&pool).await?;
    let repo = SqliteRepository::new(pool);

    let stats = match kind {
        EntityKind::Blocks => {
            let records = block_records(&rows)?;
            import_blocks(&repo, &directory, &records, &options).await?
        }
        EntityKind::Pages => {
            let records = page_records(&rows)?;
            import_pages(&repo, &directory, &records, &options).await?
        }
    };

    repo.pool().close().await;

    if dry_run {
        println!("import {} (dry-run)", kind.label());
    } else {
        println!("import {}", kind.label());
    }
    println!("  records: {}", stats.records);
    println!("  saved: {}", stats.saved);
    println!("  skipped: {}", stats.skipped);
    println!("ok");

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::records::LocalizedPageFields;
    use crate::repository::{InMemoryRepository, DUPLICATE_BLOCK_MESSAGE};
    use std::collections::BTreeMap;

    fn stores() -> ConfigStoreDirectory {
        ConfigStoreDirectory::from_stores([
            (1, "de", "de_DE"),
            (2, "en", "en_US"),
            (3, "fr", "fr_FR"),
        ])
    }

    fn block_record(identifier: &str, locale: &str) -> BlockRecord {
        BlockRecord {
            identifier: identifier.to_string(),
            locale: locale.to_string(),
            title: "Welcome".to_string(),
            content: "Hello".to_string(),
        }
    }

    fn page_record(identifier: &str, locales: &[&str]) -> PageRecord {
        let mut localized = BTreeMap::new();
        for locale in locales {
            localized.insert(
                locale.to_string(),
                LocalizedPageFields {
                    title: format!("Title {}", locale),
                    secondary_title: format!("Secondary {}", locale),
                    meta_keywords: format!("keywords {}", locale),
                    meta_description: format!("description {}", locale),
                    meta_title: format!("Meta {}", locale),
                    content: format!("<p>{}</p>", locale),
                },
            );
        }
        PageRecord {
            identifier: identifier.to_string(),
            locale: None,
            page_layout: "1column".to_string(),
            content_heading: "Heading".to_string(),
            layout_update_xml: "<update/>".to_string(),
            localized,
        }
    }

    fn options(prefix: &str, allowed: &[&str]) -> ImportOptions {
        ImportOptions {
            prefix: prefix.to_string(),
            allowed_locales: allowed.iter().map(|l| l.to_string()).collect(),
            dry_run: false,
        }
    }

    #[tokio::test]
    async fn block_without_matching_store_is_skipped() {
        let repo = InMemoryRepository::new();
        let stats = import_blocks(
            &repo,
            &stores(),
            &[block_record("welcome", "it_IT")],
            &options("", &[]),
        )
        .await
        .unwrap();

        assert_eq!(stats.saved, 0);
        assert_eq!(stats.skipped, 1);
        assert!(repo.list_blocks().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn block_identifier_is_prefixed_and_lowercased() {
        let repo = InMemoryRepository::new();
        import_blocks(
            &repo,
            &stores(),
            &[block_record("ABOUT", "de_DE")],
            &options("imported-", &[]),
        )
        .await
        .unwrap();

        let blocks = repo.list_blocks().await.unwrap();
        assert_eq!(blocks.len(), 1);
        assert_eq!(blocks[0].identifier, "imported-about");
        assert_eq!(blocks[0].title, "Welcome");
        assert_eq!(blocks[0].content, "Hello");
        assert_eq!(blocks[0].store_ids, vec![1]);
    }

    #[tokio::test]
    async fn block_is_written_once_per_store_sharing_the_locale() {
        let repo = InMemoryRepository::new();
        let directory = ConfigStoreDirectory::from_stores([(1, "de", "de_DE"), (4, "at", "de_DE")]);
        let stats = import_blocks(
            &repo,
            &directory,
            &[block_record("welcome", "de_DE")],
            &options("", &[]),
        )
        .await
        .unwrap();

        assert_eq!(stats.saved, 2);
        let stores: Vec<Vec<i64>> = repo
            .list_blocks()
            .await
            .unwrap()
            .into_iter()
            .map(|b| b.store_ids)
            .collect();
        assert_eq!(stores, vec![vec![1], vec![4]]);
    }

    #[tokio::test]
    async fn block_reimport_duplicates_in_permissive_repository() {
        let repo = InMemoryRepository::new();
        let records = [block_record("welcome", "de_DE")];
        import_blocks(&repo, &stores(), &records, &options("", &[]))
            .await
            .unwrap();
        import_blocks(&repo, &stores(), &records, &options("", &[]))
            .await
            .unwrap();

        assert_eq!(repo.list_blocks().await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn block_reimport_aborts_in_unique_repository() {
        let repo = InMemoryRepository::new().with_unique_identifiers();
        let records = [
            block_record("first", "de_DE"),
            block_record("welcome", "de_DE"),
            block_record("last", "de_DE"),
        ];
        repo.save_block(&{
            let mut b = Block::new("welcome");
            b.store_ids = vec![1];
            b
        })
        .await
        .unwrap();

        let err = import_blocks(&repo, &stores(), &records, &options("", &[]))
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), DUPLICATE_BLOCK_MESSAGE);

        // The record before the failure stays; the one after is never written.
        let identifiers: Vec<String> = repo
            .list_blocks()
            .await
            .unwrap()
            .into_iter()
            .map(|b| b.identifier)
            .collect();
        assert_eq!(identifiers, vec!["welcome".to_string(), "first".to_string()]);
    }

    #[tokio::test]
    async fn allow_list_excludes_block_locale() {
        let repo = InMemoryRepository::new();
        let stats = import_blocks(
            &repo,
            &stores(),
            &[block_record("welcome", "de_DE")],
            &options("", &["en_US"]),
        )
        .await
        .unwrap();

        assert_eq!(stats.saved, 0);
        assert!(repo.list_blocks().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn dry_run_counts_without_saving() {
        let repo = InMemoryRepository::new();
        let mut opts = options("", &[]);
        opts.dry_run = true;
        let stats = import_blocks(&repo, &stores(), &[block_record("welcome", "de_DE")], &opts)
            .await
            .unwrap();

        assert_eq!(stats.saved, 1);
        assert!(repo.list_blocks().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn page_fields_are_written_per_locale() {
        let repo = InMemoryRepository::new();
        let stats = import_pages(
            &repo,
            &stores(),
            &[page_record("About", &["de_DE", "en_US"])],
            &options("cms-", &[]),
        )
        .await
        .unwrap();
        assert_eq!(stats.saved, 2);

        let de = repo.find_page("cms-about", 1).await.unwrap().unwrap();
        assert_eq!(de.title, "Title de_DE");
        assert_eq!(de.secondary_title, "Secondary de_DE");
        assert_eq!(de.meta_keywords, "keywords de_DE");
        assert_eq!(de.meta_description, "description de_DE");
        assert_eq!(de.meta_title, "Meta de_DE");
        assert_eq!(de.content, "<p>de_DE</p>");
        assert_eq!(de.page_layout, "1column");
        assert_eq!(de.content_heading, "Heading");
        assert_eq!(de.layout_update_xml, "<update/>");
        assert_eq!(de.store_ids, vec![1]);

        let en = repo.find_page("cms-about", 2).await.unwrap().unwrap();
        assert_eq!(en.title, "Title en_US");
        assert_eq!(en.store_ids, vec![2]);
    }

    #[tokio::test]
    async fn page_is_not_written_to_stores_of_other_locales() {
        let repo = InMemoryRepository::new();
        import_pages(
            &repo,
            &stores(),
            &[page_record("about", &["de_DE"])],
            &options("", &[]),
        )
        .await
        .unwrap();

        assert!(repo.find_page("about", 1).await.unwrap().is_some());
        assert!(repo.find_page("about", 2).await.unwrap().is_none());
        assert!(repo.find_page("about", 3).await.unwrap().is_none());
        assert_eq!(repo.list_pages().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn page_locale_column_gates_like_blocks() {
        let repo = InMemoryRepository::new();
        let mut record = page_record("about", &["de_DE", "en_US"]);
        record.locale = Some("en_US".to_string());
        import_pages(&repo, &stores(), &[record], &options("", &[]))
            .await
            .unwrap();

        let pages = repo.list_pages().await.unwrap();
        assert_eq!(pages.len(), 1);
        assert_eq!(pages[0].store_ids, vec![2]);
        assert_eq!(pages[0].title, "Title en_US");
    }

    #[tokio::test]
    async fn page_locale_without_localized_data_keeps_existing_page() {
        let repo = InMemoryRepository::new();
        import_pages(
            &repo,
            &stores(),
            &[page_record("about", &["de_DE"])],
            &options("", &[]),
        )
        .await
        .unwrap();

        let mut record = page_record("about", &["en_US"]);
        record.locale = Some("de_DE".to_string());
        let stats = import_pages(&repo, &stores(), &[record], &options("", &[]))
            .await
            .unwrap();

        assert_eq!(stats.saved, 0);
        assert_eq!(stats.skipped, 1);
        let de = repo.find_page("about", 1).await.unwrap().unwrap();
        assert_eq!(de.title, "Title de_DE");
        assert_eq!(de.content, "<p>de_DE</p>");
    }

    #[tokio::test]
    async fn page_reimport_overwrites_instead_of_duplicating() {
        let repo = InMemoryRepository::new().with_unique_identifiers();
        let records = [page_record("about", &["de_DE"])];
        import_pages(&repo, &stores(), &records, &options("", &[]))
            .await
            .unwrap();
        let first = repo.list_pages().await.unwrap();

        import_pages(&repo, &stores(), &records, &options("", &[]))
            .await
            .unwrap();
        let second = repo.list_pages().await.unwrap();

        assert_eq!(second.len(), 1);
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn page_reimport_replaces_changed_fields() {
        let repo = InMemoryRepository::new();
        import_pages(
            &repo,
            &stores(),
            &[page_record("about", &["de_DE"])],
            &options("", &[]),
        )
        .await
        .unwrap();

        let mut changed = page_record("about", &["de_DE"]);
        changed.page_layout = "2columns-left".to_string();
        changed.localized.get_mut("de_DE").unwrap().title = "Neu".to_string();
        import_pages(&repo, &stores(), &[changed], &options("", &[]))
            .await
            .unwrap();

        let pages = repo.list_pages().await.unwrap();
        assert_eq!(pages.len(), 1);
        assert_eq!(pages[0].title, "Neu");
        assert_eq!(pages[0].page_layout, "2columns-left");
    }
}
