//! Filesystem connector: finds device configuration files and turns them
//! into [`ConfigDocument`]s.
//!
//! The device name is the path relative to the connector root without its
//! extension (`core-sw1.conf` → `core-sw1`, `dc1/core.conf` → `dc1/core`),
//! so same-named files in different directories stay distinct devices. The
//! vendor is fingerprinted from the file contents. Files are decoded as
//! UTF-8 with invalid sequences replaced, so a stray latin-1 banner never
//! makes a config unreadable.

use anyhow::{anyhow, bail, Context, Result};
use globset::{Glob, GlobSet, GlobSetBuilder};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use netcfg_index_core::models::{ConfigDocument, Vendor};
use netcfg_index_core::vendor::infer_vendor;

use crate::config::FilesystemConnectorConfig;

/// A configuration file found by [`scan_filesystem`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigFile {
    pub path: PathBuf,
    /// Path relative to the connector root, `/`-separated on every platform.
    pub relative_path: String,
}

impl ConfigFile {
    pub fn device_name(&self) -> String {
        Path::new(&self.relative_path)
            .with_extension("")
            .to_string_lossy()
            .into_owned()
    }
}

/// Walk the connector root and return matching files sorted by relative path.
pub fn scan_filesystem(fs_config: &FilesystemConnectorConfig) -> Result<Vec<ConfigFile>> {
    let root = &fs_config.root;
    if !root.exists() {
        bail!(
            "Filesystem connector root does not exist: {}",
            root.display()
        );
    }

    let include_set = build_globset(&fs_config.include_globs)?;

    let mut default_excludes = vec!["**/.git/**".to_string()];
    default_excludes.extend(fs_config.exclude_globs.clone());
    let exclude_set = build_globset(&default_excludes)?;

    let mut files = Vec::new();

    let walker = WalkDir::new(root).follow_links(fs_config.follow_symlinks);
    for entry in walker {
        let entry = entry?;
        if !entry.file_type().is_file() {
            continue;
        }

        let path = entry.path();
        let relative = path.strip_prefix(root).unwrap_or(path);
        let rel_str = relative.to_string_lossy().replace('\\', "/");

        if exclude_set.is_match(&rel_str) {
            continue;
        }
        if !include_set.is_match(&rel_str) {
            continue;
        }

        files.push(ConfigFile {
            path: path.to_path_buf(),
            relative_path: rel_str,
        });
    }

    files.sort_by(|a, b| a.relative_path.cmp(&b.relative_path));
    tracing::debug!(root = %root.display(), count = files.len(), "scanned filesystem");

    Ok(files)
}

/// Read one file and build its document, inferring the vendor.
pub fn load_document(file: &ConfigFile) -> Result<ConfigDocument> {
    let doc = read_document(&file.path, None)?;
    Ok(ConfigDocument {
        device_name: file.device_name(),
        ..doc
    })
}

/// Read a file from disk into a [`ConfigDocument`]. An explicit `vendor`
/// skips fingerprinting.
pub fn read_document(path: &Path, vendor: Option<Vendor>) -> Result<ConfigDocument> {
    let bytes =
        std::fs::read(path).with_context(|| format!("Failed to read {}", path.display()))?;
    let raw_text = String::from_utf8_lossy(&bytes).into_owned();
    let vendor = vendor.unwrap_or_else(|| infer_vendor(&raw_text));

    Ok(ConfigDocument {
        device_name: device_name_for(path),
        vendor,
        raw_text,
        file_path: path.display().to_string(),
    })
}

fn device_name_for(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default()
}

fn build_globset(patterns: &[String]) -> Result<GlobSet> {
    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        builder.add(Glob::new(pattern).map_err(|e| anyhow!("invalid glob '{}': {}", pattern, e))?);
    }
    Ok(builder.build()?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn fs_config(root: &Path) -> FilesystemConnectorConfig {
        FilesystemConnectorConfig {
            root: root.to_path_buf(),
            ..Default::default()
        }
    }

    #[test]
    fn test_scan_applies_globs_and_sorts() {
        let tmp = TempDir::new().unwrap();
        fs::create_dir_all(tmp.path().join("dc2")).unwrap();
        fs::create_dir_all(tmp.path().join(".git")).unwrap();
        fs::write(tmp.path().join("b.conf"), "hostname b").unwrap();
        fs::write(tmp.path().join("dc2/a.conf"), "hostname a").unwrap();
        fs::write(tmp.path().join("notes.txt"), "ignore").unwrap();
        fs::write(tmp.path().join(".git/x.conf"), "ignore").unwrap();

        let files = scan_filesystem(&fs_config(tmp.path())).unwrap();
        let rel: Vec<_> = files.iter().map(|f| f.relative_path.as_str()).collect();
        assert_eq!(rel, vec!["b.conf", "dc2/a.conf"]);
        assert_eq!(files[0].device_name(), "b");
        assert_eq!(files[1].device_name(), "dc2/a");
    }

    #[test]
    fn test_same_stem_in_sibling_dirs_are_distinct_devices() {
        let tmp = TempDir::new().unwrap();
        fs::create_dir_all(tmp.path().join("dc1")).unwrap();
        fs::create_dir_all(tmp.path().join("dc2")).unwrap();
        fs::write(tmp.path().join("dc1/core.conf"), "interface Gi0/1\n").unwrap();
        fs::write(tmp.path().join("dc2/core.conf"), "interface Gi0/9\n").unwrap();

        let docs: Vec<_> = scan_filesystem(&fs_config(tmp.path()))
            .unwrap()
            .iter()
            .map(|f| load_document(f).unwrap())
            .collect();
        let names: Vec<_> = docs.iter().map(|d| d.device_name.as_str()).collect();
        assert_eq!(names, vec!["dc1/core", "dc2/core"]);
    }

    #[test]
    fn test_exclude_globs() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("keep.conf"), "x").unwrap();
        fs::write(tmp.path().join("lab-old.conf"), "x").unwrap();
        let mut cfg = fs_config(tmp.path());
        cfg.exclude_globs = vec!["**/lab-*".to_string()];
        let files = scan_filesystem(&cfg).unwrap();
        assert_eq!(files.len(), 1);
        assert_eq!(files[0].relative_path, "keep.conf");
    }

    #[test]
    fn test_missing_root_is_an_error() {
        let tmp = TempDir::new().unwrap();
        assert!(scan_filesystem(&fs_config(&tmp.path().join("nope"))).is_err());
    }

    #[test]
    fn test_read_document_infers_vendor_and_tolerates_bad_utf8() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("edge-1.conf");
        let mut bytes = b"! Cisco IOS\nversion 15.2\nbanner motd caf".to_vec();
        bytes.push(0xE9);
        fs::write(&path, &bytes).unwrap();

        let doc = read_document(&path, None).unwrap();
        assert_eq!(doc.device_name, "edge-1");
        assert_eq!(doc.vendor, Vendor::CiscoIos);
        assert!(doc.raw_text.ends_with('\u{FFFD}'));

        let doc = read_document(&path, Some(Vendor::AristaEos)).unwrap();
        assert_eq!(doc.vendor, Vendor::AristaEos);
    }
}
