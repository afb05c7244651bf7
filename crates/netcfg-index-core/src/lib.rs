//! # netcfg-index core
//!
//! Pure logic for netcfg-index: data models, secret masking, vendor
//! fingerprinting, vendor-aware configuration segmentation, and the
//! embedding/store traits the application plugs its backends into.
//!
//! This crate contains no tokio, sqlx, filesystem I/O, or other
//! native-only dependencies. Every function here is a synchronous
//! computation over caller-provided text.
//!
//! ```rust
//! use netcfg_index_core::mask::normalize_and_mask;
//! use netcfg_index_core::models::Vendor;
//! use netcfg_index_core::segment::segment_config;
//!
//! let raw = "interface Gi0/1\n description uplink\n!\nsnmp-server community public RO\n";
//! let masked = normalize_and_mask(raw);
//! let sections = segment_config(&masked, "edge-1", Vendor::CiscoIos);
//! assert_eq!(sections[0].section_id, "Gi0/1");
//! ```

pub mod embedding;
pub mod mask;
pub mod models;
pub mod segment;
pub mod store;
pub mod vendor;
