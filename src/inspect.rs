//! Offline commands that work on a single file without a database:
//! `ncx mask` and `ncx inspect`.

use anyhow::Result;
use serde::Serialize;
use std::path::Path;

use netcfg_index_core::mask::normalize_and_mask;
use netcfg_index_core::models::{Section, Vendor};
use netcfg_index_core::vendor::Dialect;

use crate::connector_fs;
use crate::ingest;

#[derive(Debug, Serialize)]
pub struct InspectReport {
    pub device_name: String,
    pub vendor: Vendor,
    pub dialect: Dialect,
    pub sections: Vec<Section>,
}

pub fn inspect_file(path: &Path, vendor: Option<Vendor>) -> Result<InspectReport> {
    let doc = connector_fs::read_document(path, vendor)?;
    let sections = ingest::sections_for(&doc);
    Ok(InspectReport {
        dialect: Dialect::for_vendor(doc.vendor),
        device_name: doc.device_name,
        vendor: doc.vendor,
        sections,
    })
}

pub fn run_inspect(path: &Path, vendor: Option<Vendor>, json: bool) -> Result<()> {
    let report = inspect_file(path, vendor)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!("device:   {}", report.device_name);
    println!("vendor:   {}", report.vendor);
    println!("sections: {}", report.sections.len());
    println!();
    for s in &report.sections {
        println!(
            "[{}] {} {} ({} lines)",
            s.chunk_index,
            s.section_type,
            s.section_id,
            s.lines().count()
        );
        for line in s.lines() {
            println!("    {}", line);
        }
        println!();
    }
    Ok(())
}

pub fn run_mask(path: &Path) -> Result<()> {
    let doc = connector_fs::read_document(path, Some(Vendor::Unknown))?;
    println!("{}", normalize_and_mask(&doc.raw_text));
    Ok(())
}
