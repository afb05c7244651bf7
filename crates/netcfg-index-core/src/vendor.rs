//! Vendor fingerprinting and dialect selection.
//!
//! [`infer_vendor`] guesses the vendor from the configuration text using
//! ordered substring rules; [`Dialect::for_vendor`] picks the segmentation
//! strategy for a vendor.

use serde::Serialize;

use crate::models::Vendor;

/// Guess the vendor of a configuration from its text.
///
/// Rules are checked in order against the lower-cased text; the first
/// match wins:
///
/// | Vendor | Needle |
/// |--------|--------|
/// | `cisco_ios_xr` | `cisco ios xr` or `ios xr` |
/// | `cisco_nxos` | `nx-os` or `nxos` |
/// | `cisco_ios` | `cisco` and `version ` |
/// | `arista_eos` | `arista` or `eos` |
/// | `juniper_junos` | `junos` |
/// | `hp_comware` | `comware` or `hp` |
///
/// The needles are short, so a stray `eos` or `hp` inside an unrelated word
/// will win. That is accepted for a heuristic that only picks a segmenter.
pub fn infer_vendor(config_text: &str) -> Vendor {
    let text = config_text.to_lowercase();
    if text.contains("cisco ios xr") || text.contains("ios xr") {
        return Vendor::CiscoIosXr;
    }
    if text.contains("nx-os") || text.contains("nxos") {
        return Vendor::CiscoNxos;
    }
    if text.contains("cisco") && text.contains("version ") {
        return Vendor::CiscoIos;
    }
    if text.contains("arista") || text.contains("eos") {
        return Vendor::AristaEos;
    }
    if text.contains("junos") {
        return Vendor::JuniperJunos;
    }
    if text.contains("comware") || text.contains("hp") {
        return Vendor::HpComware;
    }
    Vendor::Unknown
}

/// Segmentation strategy family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Dialect {
    /// Bang/indentation delimited CLI (Cisco, Arista, HP).
    CliBlock,
    /// Junos flat `set` statements.
    JunosSet,
    /// Fixed-size line chunks.
    Fallback,
}

impl Dialect {
    pub fn for_vendor(vendor: Vendor) -> Dialect {
        match vendor {
            Vendor::CiscoIos
            | Vendor::CiscoNxos
            | Vendor::CiscoIosXr
            | Vendor::AristaEos
            | Vendor::HpComware => Dialect::CliBlock,
            Vendor::JuniperJunos => Dialect::JunosSet,
            Vendor::Unknown => Dialect::Fallback,
        }
    }
}
