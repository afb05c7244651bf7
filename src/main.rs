//! # netcfg-index CLI (`ncx`)
//!
//! ```bash
//! ncx --config ./config/ncx.toml <command>
//! ```
//!
//! | Command | Description |
//! |---------|-------------|
//! | `ncx init` | Create the SQLite database and run schema migrations |
//! | `ncx ingest` | Mask, segment, embed and store every configured file |
//! | `ncx inspect <file>` | Print the sections of one file (no database) |
//! | `ncx mask <file>` | Print the masked text of one file (no database) |
//! | `ncx get <key>` | Print a stored section by key |
//! | `ncx search "<query>"` | Semantic search over stored sections |
//! | `ncx embed pending` | Backfill missing or stale embeddings |

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use netcfg_index::{config, embed_cmd, get, ingest, inspect, logging, migrate, search};
use netcfg_index_core::models::{SectionType, Vendor};
use netcfg_index_core::store::SectionFilter;

/// Secret masking, vendor-aware segmentation and semantic search for
/// network device configurations.
#[derive(Parser)]
#[command(
    name = "ncx",
    about = "Mask, segment and index network device configurations",
    version
)]
struct Cli {
    /// Path to configuration file (TOML).
    #[arg(long, global = true, default_value = "./config/ncx.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize the database schema. Safe to run repeatedly.
    Init,

    /// Ingest configuration files from the filesystem connector.
    ///
    /// Every file is masked, segmented, embedded (when a provider is
    /// configured) and stored, replacing the device's previous sections.
    Ingest {
        /// Show file and section counts without writing to the database.
        #[arg(long)]
        dry_run: bool,

        /// Maximum number of files to process.
        #[arg(long)]
        limit: Option<usize>,
    },

    /// Segment one file and print its sections.
    Inspect {
        file: PathBuf,

        /// Vendor to assume instead of fingerprinting the file
        /// (e.g. `cisco_ios`, `juniper_junos`).
        #[arg(long, value_parser = parse_vendor)]
        vendor: Option<Vendor>,

        /// Print the report as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Print the masked, normalized text of one file.
    Mask { file: PathBuf },

    /// Retrieve a section by key (`device:section_type:section_id:chunk_index`).
    Get { key: String },

    /// Semantic search over stored sections.
    Search {
        query: String,

        #[arg(long)]
        device: Option<String>,

        #[arg(long, value_parser = parse_vendor)]
        vendor: Option<Vendor>,

        /// One of `interfaces`, `acls`, `protocols`, `global`.
        #[arg(long)]
        section_type: Option<SectionType>,

        #[arg(long)]
        limit: Option<usize>,
    },

    /// Manage embedding vectors.
    Embed {
        #[command(subcommand)]
        action: EmbedAction,
    },
}

#[derive(Subcommand)]
enum EmbedAction {
    /// Embed sections that are missing vectors or whose text changed.
    Pending {
        #[arg(long)]
        limit: Option<usize>,

        /// Override the batch size from config (texts per API call).
        #[arg(long)]
        batch_size: Option<usize>,

        /// Show counts without embedding anything.
        #[arg(long)]
        dry_run: bool,
    },
}

fn parse_vendor(s: &str) -> Result<Vendor, String> {
    let vendor = Vendor::parse(s);
    if vendor == Vendor::Unknown && !s.trim().eq_ignore_ascii_case("unknown") {
        let names: Vec<_> = Vendor::ALL.iter().map(|v| v.as_str()).collect();
        return Err(format!(
            "unknown vendor '{}': expected one of {}",
            s,
            names.join(", ")
        ));
    }
    Ok(vendor)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Commands that don't require config
    match &cli.command {
        Commands::Inspect { file, vendor, json } => {
            logging::init_logging("warn");
            return inspect::run_inspect(file, *vendor, *json);
        }
        Commands::Mask { file } => {
            logging::init_logging("warn");
            return inspect::run_mask(file);
        }
        _ => {}
    }

    let cfg = config::load_config(&cli.config)?;
    logging::init_logging(&cfg.logging.level);

    match cli.command {
        Commands::Init => {
            migrate::run_migrations(&cfg).await?;
            println!("Database initialized successfully.");
        }
        Commands::Ingest { dry_run, limit } => {
            ingest::run_ingest(&cfg, dry_run, limit).await?;
        }
        Commands::Get { key } => {
            get::run_get(&cfg, &key).await?;
        }
        Commands::Search {
            query,
            device,
            vendor,
            section_type,
            limit,
        } => {
            let filter = SectionFilter {
                device_name: device,
                vendor,
                section_type,
            };
            search::run_search(&cfg, &query, filter, limit).await?;
        }
        Commands::Embed { action } => match action {
            EmbedAction::Pending {
                limit,
                batch_size,
                dry_run,
            } => {
                embed_cmd::run_embed_pending(&cfg, limit, batch_size, dry_run).await?;
            }
        },
        Commands::Inspect { .. } | Commands::Mask { .. } => {
            // Handled above (before config loading)
            unreachable!()
        }
    }

    Ok(())
}
