//! Section retrieval by storage key (`device:type:id:chunk`).

use anyhow::{bail, Result};

use netcfg_index_core::models::SectionRecord;
use netcfg_index_core::store::SectionStore;

use crate::config::Config;
use crate::db;
use crate::sqlite_store::SqliteSectionStore;

pub async fn get_section(config: &Config, key: &str) -> Result<SectionRecord> {
    let pool = db::connect(config).await?;
    let store = SqliteSectionStore::new(pool);
    let found = store.get_section(key).await;
    store.pool().close().await;

    match found? {
        Some(record) => Ok(record),
        None => bail!("section not found: {}", key),
    }
}

pub async fn run_get(config: &Config, key: &str) -> Result<()> {
    let record = get_section(config, key).await?;
    let s = &record.section;

    println!("--- Section ---");
    println!("key:          {}", record.key);
    println!("device:       {}", s.device_name);
    println!("vendor:       {}", s.vendor);
    println!("section_type: {}", s.section_type);
    println!("section_id:   {}", s.section_id);
    println!("chunk_index:  {}", s.chunk_index);
    println!("file:         {}", record.file_path);
    println!("hash:         {}", record.content_hash);
    println!();
    println!("--- Snippet ---");
    println!("{}", s.raw_snippet);

    Ok(())
}
