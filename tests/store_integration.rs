//! Integration tests for the SQLite section store.
//!
//! These run the real ingest, backfill and search paths against a fresh
//! SQLite database with a deterministic in-process embedding provider.

use anyhow::Result;
use async_trait::async_trait;
use netcfg_index::config::{parse_config, Config};
use netcfg_index::embed_cmd::embed_pending;
use netcfg_index::ingest::{ingest_document, ingest_documents, DocumentOutcome};
use netcfg_index::search::search_sections;
use netcfg_index::sqlite_store::SqliteSectionStore;
use netcfg_index::{db, migrate};
use netcfg_index_core::embedding::EmbeddingProvider;
use netcfg_index_core::models::{ConfigDocument, SectionType, Vendor};
use netcfg_index_core::store::{SectionFilter, SectionStore};
use tempfile::TempDir;

// ─── Test Provider ──────────────────────────────────────────────────

/// Embeds text as keyword presence flags: interface, routing, identity.
struct KeywordProvider;

#[async_trait]
impl EmbeddingProvider for KeywordProvider {
    fn model_name(&self) -> &str {
        "keywords"
    }

    fn dims(&self) -> usize {
        3
    }

    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        Ok(texts
            .iter()
            .map(|t| {
                let t = t.to_lowercase();
                let flag = |hit: bool| if hit { 1.0 } else { 0.0 };
                vec![
                    flag(t.contains("interface")),
                    flag(t.contains("ospf") || t.contains("bgp")),
                    flag(t.contains("hostname") || t.contains("host-name")),
                ]
            })
            .collect())
    }
}

// ─── Helpers ────────────────────────────────────────────────────────

fn test_config(tmp: &TempDir) -> Config {
    let content = format!(
        r#"[db]
path = "{}/data/ncx.sqlite"
"#,
        tmp.path().display()
    );
    parse_config(&content).unwrap()
}

async fn open_store(tmp: &TempDir) -> SqliteSectionStore {
    let config = test_config(tmp);
    let pool = db::connect(&config).await.unwrap();
    migrate::apply_schema(&pool).await.unwrap();
    SqliteSectionStore::new(pool)
}

fn doc(name: &str, vendor: Vendor, text: &str) -> ConfigDocument {
    ConfigDocument {
        device_name: name.to_string(),
        vendor,
        raw_text: text.to_string(),
        file_path: format!("configs/{}.conf", name),
    }
}

fn ios_doc() -> ConfigDocument {
    doc(
        "core-1",
        Vendor::CiscoIos,
        "hostname core-1\n\
         username admin password 7 08314E1B\n\
         interface GigabitEthernet0/1\n \
         description uplink\n\
         router ospf 1\n \
         network 10.0.0.0 0.0.0.255 area 0\n",
    )
}

fn junos_doc() -> ConfigDocument {
    doc(
        "mx1",
        Vendor::JuniperJunos,
        "set system host-name mx1\n\
         set interfaces ge-0/0/0 unit 0 family inet address 10.0.0.1/24\n\
         set protocols bgp group EBGP neighbor 10.0.0.2\n",
    )
}

// ─── Tests ──────────────────────────────────────────────────────────

#[tokio::test]
async fn test_ingest_stores_masked_sections() {
    let tmp = TempDir::new().unwrap();
    let store = open_store(&tmp).await;

    let outcome = ingest_document(&ios_doc(), &store, None, 16).await.unwrap();
    assert_eq!(
        outcome,
        DocumentOutcome::Stored {
            sections: 3,
            embedded: 0
        }
    );

    let record = store
        .get_section("core-1:global:hostname:0")
        .await
        .unwrap()
        .expect("global section stored");
    assert_eq!(record.section.vendor, Vendor::CiscoIos);
    assert_eq!(record.file_path, "configs/core-1.conf");
    assert!(record.embedding.is_none());
    assert!(record.section.raw_snippet.contains("password 7 ***MASKED***"));
    assert!(!record.section.text.contains("08314E1B"));

    let (sections, vectors) = store.counts().await.unwrap();
    assert_eq!((sections, vectors), (3, 0));
}

#[tokio::test]
async fn test_reingest_replaces_device_sections() {
    let tmp = TempDir::new().unwrap();
    let store = open_store(&tmp).await;

    ingest_document(&ios_doc(), &store, Some(&KeywordProvider), 16)
        .await
        .unwrap();
    ingest_document(&junos_doc(), &store, Some(&KeywordProvider), 16)
        .await
        .unwrap();

    let trimmed = doc("core-1", Vendor::CiscoIos, "hostname core-1\n");
    ingest_document(&trimmed, &store, Some(&KeywordProvider), 16)
        .await
        .unwrap();

    assert!(store
        .get_section("core-1:interfaces:GigabitEthernet0/1:1")
        .await
        .unwrap()
        .is_none());
    assert!(store
        .get_section("mx1:interfaces:ge-0/0/0:0")
        .await
        .unwrap()
        .is_some());

    // 1 for core-1, 3 for mx1; old core-1 vectors are gone too
    let (sections, vectors) = store.counts().await.unwrap();
    assert_eq!((sections, vectors), (4, 4));
}

#[tokio::test]
async fn test_embed_pending_backfills_vectors() {
    let tmp = TempDir::new().unwrap();
    let store = open_store(&tmp).await;

    let stats = ingest_documents(&[ios_doc(), junos_doc()], &store, None, 16).await;
    assert_eq!(stats.sections, 6);
    assert_eq!(stats.pending, 6);

    let missing = store.sections_missing_embeddings("keywords", 100).await.unwrap();
    assert_eq!(missing.len(), 6);
    let limited = store.sections_missing_embeddings("keywords", 2).await.unwrap();
    assert_eq!(limited.len(), 2);

    let backfill = embed_pending(&store, &KeywordProvider, None, 4).await.unwrap();
    assert_eq!(backfill.pending, 6);
    assert_eq!(backfill.embedded, 6);
    assert_eq!(backfill.failed, 0);

    assert!(store.sections_missing_embeddings("keywords", 100).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_search_with_filters() {
    let tmp = TempDir::new().unwrap();
    let store = open_store(&tmp).await;

    ingest_documents(&[ios_doc(), junos_doc()], &store, Some(&KeywordProvider), 16).await;

    let hits = search_sections(
        &store,
        &KeywordProvider,
        "ospf or bgp neighbors",
        &SectionFilter::default(),
        10,
    )
    .await
    .unwrap();
    assert_eq!(hits.len(), 6);
    let top: Vec<_> = hits[..2].iter().map(|h| h.key.as_str()).collect();
    assert_eq!(top, vec!["core-1:protocols:ospf 1:2", "mx1:protocols:bgp group EBGP:0"]);

    let filter = SectionFilter {
        vendor: Some(Vendor::JuniperJunos),
        section_type: Some(SectionType::Protocols),
        ..Default::default()
    };
    let hits = search_sections(&store, &KeywordProvider, "bgp", &filter, 10)
        .await
        .unwrap();
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].section.section_id, "bgp group EBGP");

    let filter = SectionFilter {
        device_name: Some("core-1".to_string()),
        ..Default::default()
    };
    let hits = search_sections(&store, &KeywordProvider, "interface", &filter, 1)
        .await
        .unwrap();
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].key, "core-1:interfaces:GigabitEthernet0/1:1");
}

#[tokio::test]
async fn test_upsert_embedding_requires_section() {
    let tmp = TempDir::new().unwrap();
    let store = open_store(&tmp).await;

    let err = store
        .upsert_embedding("ghost:global:x:0", &[1.0, 0.0, 0.0], "keywords")
        .await
        .unwrap_err();
    assert!(err.to_string().contains("no section stored"));
}

#[tokio::test]
async fn test_apply_schema_idempotent() {
    let tmp = TempDir::new().unwrap();
    let store = open_store(&tmp).await;
    migrate::apply_schema(store.pool()).await.unwrap();
    migrate::apply_schema(store.pool()).await.unwrap();
}

#[tokio::test]
async fn test_vectors_from_another_model_are_stale() {
    let tmp = TempDir::new().unwrap();
    let store = open_store(&tmp).await;

    ingest_document(&junos_doc(), &store, Some(&KeywordProvider), 16)
        .await
        .unwrap();
    store
        .upsert_embedding("mx1:protocols:bgp group EBGP:0", &[0.0, 1.0, 0.0], "older-model")
        .await
        .unwrap();

    let missing = store.sections_missing_embeddings("keywords", 100).await.unwrap();
    let keys: Vec<_> = missing.iter().map(|r| r.key.as_str()).collect();
    assert_eq!(keys, vec!["mx1:protocols:bgp group EBGP:0"]);

    let hits = search_sections(&store, &KeywordProvider, "bgp", &SectionFilter::default(), 10)
        .await
        .unwrap();
    assert_eq!(hits.len(), 2);
    assert!(hits.iter().all(|h| h.section.section_type != SectionType::Protocols));
}
