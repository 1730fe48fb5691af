//! # CMS Importer
//!
//! Imports localized CMS blocks and pages from semicolon-separated files
//! into a content store, one entity per record and matching store scope.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────┐   ┌──────────────┐   ┌──────────────┐
//! │ Import file │──▶│ Typed records│──▶│  Pipelines   │
//! │ (; and ')   │   │ block / page │   │ block / page │
//! └─────────────┘   └──────────────┘   └──────┬───────┘
//!                                             │
//!                   ┌──────────────┐          ▼
//!                   │ Locale-store │──▶ ┌────────────┐
//!                   │   resolver   │    │ Repository │
//!                   └──────────────┘    │ SQLite/mem │
//!                                       └────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```bash
//! cms-import init                        # create database
//! cms-import stores                      # show locale -> store map
//! cms-import block ./blocks.csv          # import blocks
//! cms-import page ./pages.csv --locale de_DE
//! cms-import list pages
//! ```
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | TOML configuration parsing |
//! | [`models`] | Store, block and page types |
//! | [`source`] | Delimited file decoding |
//! | [`records`] | Typed block / page records |
//! | [`stores`] | Store directory and locale resolution |
//! | [`repository`] | Content repository trait and backends |
//! | [`import`] | Block and page import pipelines |
//! | [`list`] | Listing stored entities |
//! | [`db`] | Database connection |
//! | [`migrate`] | Schema migrations |

pub mod config;
pub mod db;
pub mod import;
pub mod list;
pub mod migrate;
pub mod models;
pub mod records;
pub mod repository;
pub mod source;
pub mod stores;
