//! Grouping segmenter for Junos `set`-style configuration.
//!
//! Junos exports are flat: every statement carries its full hierarchy path,
//! so related statements can be scattered across the file. Instead of
//! detecting block boundaries, each line is assigned a `(type, id)` key and
//! all lines sharing a key are gathered into one section. Sections come out
//! in the order their key was first seen, each with `chunk_index = 0`.

use std::collections::HashMap;

use super::{SectionStrategy, SegmentError};
use crate::models::{Section, SectionType, Vendor};

/// Tokens after which a protocol statement carries a useful instance name.
const PROTOCOL_MARKERS: [&str; 5] = ["area", "group", "instance", "asn", "remote-as"];

type GroupKey = (SectionType, String);

/// Insertion-ordered grouping of lines by key.
#[derive(Default)]
struct OrderedGroups<'a> {
    index: HashMap<GroupKey, usize>,
    groups: Vec<(GroupKey, Vec<&'a str>)>,
}

impl<'a> OrderedGroups<'a> {
    fn push(&mut self, key: GroupKey, line: &'a str) {
        match self.index.get(&key) {
            Some(&slot) => self.groups[slot].1.push(line),
            None => {
                self.index.insert(key.clone(), self.groups.len());
                self.groups.push((key, vec![line]));
            }
        }
    }
}

/// Compute the grouping key of one stripped, non-comment line.
pub fn junos_key(stripped: &str) -> (SectionType, String) {
    let tokens: Vec<&str> = stripped.split_whitespace().collect();
    if !stripped.to_lowercase().starts_with("set ") || tokens.len() < 3 {
        return (SectionType::Global, "global".to_string());
    }

    let top = tokens[1].to_lowercase();
    match top.as_str() {
        "interfaces" => (SectionType::Interfaces, tokens[2].to_string()),
        "protocols" => {
            let marker = tokens
                .iter()
                .enumerate()
                .skip(3)
                .find(|(_, t)| PROTOCOL_MARKERS.contains(&t.to_lowercase().as_str()))
                .map(|(i, _)| i);
            let id = match marker {
                Some(i) => {
                    let end = (i + 2).min(tokens.len());
                    format!("{} {}", tokens[2], tokens[i..end].join(" "))
                }
                None => tokens[2].to_string(),
            };
            (SectionType::Protocols, id)
        }
        "firewall" | "security" => (SectionType::Acls, format!("{} {}", tokens[1], tokens[2])),
        "policy-options" => {
            let id = match tokens.iter().position(|t| *t == "policy-statement") {
                Some(i) => match tokens.get(i + 1) {
                    Some(name) => format!("policy-statement {}", name),
                    None => "policy-statement".to_string(),
                },
                None => "policy-options".to_string(),
            };
            (SectionType::Acls, id)
        }
        _ => (SectionType::Global, top),
    }
}

/// Segment masked Junos `set` text into one section per key.
pub fn segment_junos(masked_text: &str, device_name: &str, vendor: Vendor) -> Vec<Section> {
    let mut groups = OrderedGroups::default();

    for line in masked_text.lines() {
        let stripped = line.trim();
        if stripped.is_empty() || stripped.starts_with('#') {
            continue;
        }
        groups.push(junos_key(stripped), line);
    }

    groups
        .groups
        .into_iter()
        .map(|((section_type, section_id), lines)| {
            Section::new(device_name, vendor, section_type, &section_id, 0, &lines)
        })
        .collect()
}

/// [`SectionStrategy`] wrapper around [`segment_junos`].
#[derive(Debug, Default, Clone, Copy)]
pub struct JunosSetSegmenter;

impl SectionStrategy for JunosSetSegmenter {
    fn name(&self) -> &'static str {
        "junos_set"
    }

    fn segment(
        &self,
        masked_text: &str,
        device_name: &str,
        vendor: Vendor,
    ) -> Result<Vec<Section>, SegmentError> {
        Ok(segment_junos(masked_text, device_name, vendor))
    }
}
