//! # CMS Importer CLI (`cms-import`)
//!
//! Imports CMS blocks and pages from semicolon-separated files into the
//! configured content store.
//!
//! ## Usage
//!
//! ```bash
//! cms-import --config ./config/cms.toml <command>
//! ```
//!
//! ## Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `cms-import init` | Create the SQLite database and run schema migrations |
//! | `cms-import stores` | Print the resolved locale to store map |
//! | `cms-import block <file>` | Create blocks from an import file |
//! | `cms-import page <file>` | Create or update pages from an import file |
//! | `cms-import list <blocks\|pages>` | Print stored blocks or pages |
//!
//! ## Import file
//!
//! Semicolon-separated, single-quote enclosed, first row is the header:
//!
//! ```text
//! identifier;locale;title;content
//! welcome;de_DE;Willkommen;'<p>Hallo</p>'
//! ```

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::EnvFilter;

use cms_importer::config;
use cms_importer::import;
use cms_importer::list;
use cms_importer::migrate;
use cms_importer::models::EntityKind;
use cms_importer::stores;

/// CMS Importer — load localized blocks and pages from delimited files.
///
/// All commands accept a `--config` flag pointing to a TOML configuration
/// file that names the database and the store scopes.
#[derive(Parser)]
#[command(
    name = "cms-import",
    about = "Import localized CMS blocks and pages from delimited text files",
    version
)]
struct Cli {
    /// Path to configuration file (TOML).
    #[arg(long, global = true, default_value = "./config/cms.toml")]
    config: PathBuf,

    /// Log every saved entity (overrides RUST_LOG).
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize the database schema.
    ///
    /// Idempotent; imports also create missing tables on their own.
    Init,

    /// List store scopes with their resolved locale codes.
    Stores {
        /// Only show stores with this locale (repeatable).
        #[arg(long = "locale")]
        locales: Vec<String>,
    },

    /// Import CMS blocks from the given file.
    ///
    /// Every row creates one new block per store whose locale equals the
    /// row's `locale` column.
    Block {
        #[command(flatten)]
        args: ImportArgs,
    },

    /// Import CMS pages from the given file.
    ///
    /// Every row creates or overwrites one page per store it has localized
    /// columns for (`title-<locale>`, `content-<locale>`, ...).
    Page {
        #[command(flatten)]
        args: ImportArgs,
    },

    /// Print stored blocks or pages.
    List {
        kind: ListKind,

        /// Print JSON instead of a table.
        #[arg(long)]
        json: bool,
    },
}

#[derive(clap::Args)]
struct ImportArgs {
    /// Full path to the file being imported.
    filename: PathBuf,

    /// Identifier prefix (overrides `import.block_prefix` / `import.page_prefix`).
    #[arg(long)]
    prefix: Option<String>,

    /// Import only stores with this locale (repeatable; overrides `import.allowed_locales`).
    #[arg(long = "locale")]
    locales: Vec<String>,

    /// Show record and write counts without saving anything.
    #[arg(long)]
    dry_run: bool,
}

#[derive(Clone, Copy, ValueEnum)]
enum ListKind {
    Blocks,
    Pages,
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("cms_importer=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let cfg = config::load_config(&cli.config)?;

    match cli.command {
        Commands::Init => {
            migrate::run_migrations(&cfg).await?;
            println!("Database initialized successfully.");
        }
        Commands::Stores { locales } => {
            let allowed = if locales.is_empty() {
                cfg.import.allowed_locales.clone()
            } else {
                locales
            };
            stores::list_stores(&cfg, &allowed).await?;
        }
        Commands::Block { args } => {
            import::run_import(
                &cfg,
                EntityKind::Blocks,
                &args.filename,
                args.prefix,
                args.locales,
                args.dry_run,
            )
            .await?;
        }
        Commands::Page { args } => {
            import::run_import(
                &cfg,
                EntityKind::Pages,
                &args.filename,
                args.prefix,
                args.locales,
                args.dry_run,
            )
            .await?;
        }
        Commands::List { kind, json } => {
            let kind = match kind {
                ListKind::Blocks => EntityKind::Blocks,
                ListKind::Pages => EntityKind::Pages,
            };
            list::run_list(&cfg, kind, json).await?;
        }
    }

    Ok(())
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("{:#}", err);
            ExitCode::FAILURE
        }
    }
}
