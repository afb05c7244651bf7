//! Core data models used throughout netcfg-index.
//!
//! A [`ConfigDocument`] is one device configuration as read from disk.
//! Segmentation turns it into an ordered list of [`Section`]s, which the
//! application wraps into [`SectionRecord`]s for embedding and storage.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Device vendor / configuration dialect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Vendor {
    CiscoIos,
    CiscoNxos,
    CiscoIosXr,
    AristaEos,
    HpComware,
    JuniperJunos,
    Unknown,
}

impl Vendor {
    pub const ALL: [Vendor; 7] = [
        Vendor::CiscoIos,
        Vendor::CiscoNxos,
        Vendor::CiscoIosXr,
        Vendor::AristaEos,
        Vendor::HpComware,
        Vendor::JuniperJunos,
        Vendor::Unknown,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Vendor::CiscoIos => "cisco_ios",
            Vendor::CiscoNxos => "cisco_nxos",
            Vendor::CiscoIosXr => "cisco_ios_xr",
            Vendor::AristaEos => "arista_eos",
            Vendor::HpComware => "hp_comware",
            Vendor::JuniperJunos => "juniper_junos",
            Vendor::Unknown => "unknown",
        }
    }

    /// Parse a vendor identifier. Unrecognized identifiers map to
    /// [`Vendor::Unknown`].
    pub fn parse(s: &str) -> Vendor {
        let needle = s.trim().to_ascii_lowercase();
        Vendor::ALL
            .iter()
            .copied()
            .find(|v| v.as_str() == needle)
            .unwrap_or(Vendor::Unknown)
    }
}

impl fmt::Display for Vendor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Vendor {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Vendor::parse(s))
    }
}

/// Category tag of a section.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SectionType {
    Interfaces,
    Acls,
    Protocols,
    Global,
}

impl SectionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            SectionType::Interfaces => "interfaces",
            SectionType::Acls => "acls",
            SectionType::Protocols => "protocols",
            SectionType::Global => "global",
        }
    }
}

impl fmt::Display for SectionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SectionType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "interfaces" => Ok(SectionType::Interfaces),
            "acls" => Ok(SectionType::Acls),
            "protocols" => Ok(SectionType::Protocols),
            "global" => Ok(SectionType::Global),
            other => Err(format!(
                "unknown section type '{}': expected interfaces, acls, protocols or global",
                other
            )),
        }
    }
}

/// One device configuration as handed to the pipeline.
#[derive(Debug, Clone)]
pub struct ConfigDocument {
    pub device_name: String,
    pub vendor: Vendor,
    pub raw_text: String,
    pub file_path: String,
}

/// A semantically coherent block of configuration lines.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Section {
    pub device_name: String,
    pub vendor: Vendor,
    pub section_type: SectionType,
    pub section_id: String,
    pub chunk_index: u32,
    /// Header line followed by `raw_snippet`; this is what gets embedded.
    pub text: String,
    pub raw_snippet: String,
}

impl Section {
    /// Build a section from its member lines, rendering the header.
    pub fn new<S: AsRef<str>>(
        device_name: &str,
        vendor: Vendor,
        section_type: SectionType,
        section_id: &str,
        chunk_index: u32,
        lines: &[S],
    ) -> Self {
        let raw_snippet = lines
            .iter()
            .map(|l| l.as_ref())
            .collect::<Vec<_>>()
            .join("\n");
        let text = format!(
            "Device {}, vendor {}, section_type {}, section_id {}, chunk_index {}\n{}",
            device_name, vendor, section_type, section_id, chunk_index, raw_snippet
        );
        Self {
            device_name: device_name.to_string(),
            vendor,
            section_type,
            section_id: section_id.to_string(),
            chunk_index,
            text,
            raw_snippet,
        }
    }

    /// `device_name:section_type:section_id:chunk_index`.
    pub fn storage_key(&self) -> String {
        storage_key(
            &self.device_name,
            self.section_type,
            &self.section_id,
            self.chunk_index,
        )
    }

    /// Lines of the snippet, in original order.
    pub fn lines(&self) -> impl Iterator<Item = &str> {
        self.raw_snippet.lines()
    }

    /// Lowercase hex SHA-256 of `text`, used for embedding staleness checks.
    pub fn content_hash(&self) -> String {
        let mut hasher = Sha256::new();
        hasher.update(self.text.as_bytes());
        format!("{:x}", hasher.finalize())
    }
}

pub fn storage_key(
    device_name: &str,
    section_type: SectionType,
    section_id: &str,
    chunk_index: u32,
) -> String {
    format!(
        "{}:{}:{}:{}",
        device_name, section_type, section_id, chunk_index
    )
}

/// An embedding vector together with the model that produced it.
#[derive(Debug, Clone, PartialEq)]
pub struct SectionEmbedding {
    pub model: String,
    pub vector: Vec<f32>,
}

/// A section as persisted: section plus provenance, content hash and an
/// optional embedding vector.
#[derive(Debug, Clone, Serialize)]
pub struct SectionRecord {
    pub key: String,
    pub section: Section,
    pub file_path: String,
    pub content_hash: String,
    #[serde(skip_serializing)]
    pub embedding: Option<SectionEmbedding>,
}

impl SectionRecord {
    pub fn new(section: Section, file_path: &str) -> Self {
        Self {
            key: section.storage_key(),
            content_hash: section.content_hash(),
            file_path: file_path.to_string(),
            section,
            embedding: None,
        }
    }

    pub fn with_embedding(mut self, model: &str, vector: Vec<f32>) -> Self {
        self.embedding = Some(SectionEmbedding {
            model: model.to_string(),
            vector,
        });
        self
    }
}
