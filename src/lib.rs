//! # netcfg-index
//!
//! Ingests network device configurations (Cisco IOS/NX-OS/IOS-XR, Arista
//! EOS, HP Comware, Juniper Junos), masks every embedded secret, cuts each
//! file into vendor-aware sections, embeds them and stores them in SQLite
//! for semantic search.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────┐   ┌──────────────────────┐   ┌───────────┐
//! │  Filesystem  │──▶│ Mask → Segment →     │──▶│  SQLite   │
//! │  connector   │   │ Embed (OpenAI)       │   │ sections  │
//! └──────────────┘   └──────────────────────┘   └─────┬─────┘
//!                                                     ▼
//!                                               ┌───────────┐
//!                                               │ CLI (ncx) │
//!                                               └───────────┘
//! ```
//!
//! Masking and segmentation live in the `netcfg-index-core` crate; this
//! crate wires them to the filesystem, SQLite and the embedding API.
//!
//! ## Quick Start
//!
//! ```bash
//! ncx init                          # create database
//! ncx inspect configs/core-1.conf   # preview sections, no database
//! ncx ingest                        # mask, segment, embed and store
//! ncx embed pending                 # backfill vectors
//! ncx search "bgp neighbors" --vendor cisco_ios
//! ```
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | TOML configuration parsing |
//! | [`connector_fs`] | Filesystem connector |
//! | [`db`] | Database connection |
//! | [`migrate`] | Schema migrations |
//! | [`sqlite_store`] | SQLite section store |
//! | [`embedding`] | Embedding providers |
//! | [`ingest`] | Ingestion pipeline |
//! | [`embed_cmd`] | Embedding backfill |
//! | [`search`] | Semantic search |
//! | [`get`] | Section lookup |
//! | [`inspect`] | Offline mask/inspect commands |

pub mod config;
pub mod connector_fs;
pub mod db;
pub mod embed_cmd;
pub mod embedding;
pub mod get;
pub mod ingest;
pub mod inspect;
pub mod logging;
pub mod migrate;
pub mod search;
pub mod sqlite_store;
