//! Block segmenter for bang/indentation CLI dialects (Cisco IOS, NX-OS,
//! IOS-XR, Arista EOS, HP Comware).
//!
//! # Algorithm
//!
//! One forward pass with a single open block:
//!
//! 1. A line whose stripped form starts with `!` is a comment. It joins
//!    the open block, or is dropped if nothing is open yet.
//! 2. Any other line is classified with [`classify`]. It opens a new block
//!    when nothing is open, or when its classification differs from the
//!    open block's **and** [`is_block_starter`] holds for it.
//! 3. Otherwise the line joins the open block.
//!
//! Opening a block flushes the previous one with the next value of a
//! document-wide `chunk_index` counter. Lines that only reach the generic
//! first-token rule never split a block, which keeps sub-commands (indented
//! or not) with the stanza they follow.

use std::sync::OnceLock;

use regex::Regex;

use super::{SectionStrategy, SegmentError};
use crate::models::{Section, SectionType, Vendor};

struct StarterPatterns {
    interface: Regex,
    acl: Regex,
    router: Regex,
    route_map: Regex,
    policy_map: Regex,
    class_map: Regex,
}

static STARTERS: OnceLock<StarterPatterns> = OnceLock::new();

fn starters() -> &'static StarterPatterns {
    STARTERS.get_or_init(|| {
        let re = |p: &str| Regex::new(p).expect("block starter patterns are valid regexes");
        StarterPatterns {
            interface: re(r"(?i)^\s*interface\s+(\S+)"),
            acl: re(r"(?i)^\s*(ip|ipv6)\s+access-list\s+(\S+)"),
            router: re(r"(?i)^\s*router\s+(\S+)\s*(\S+)?"),
            route_map: re(r"(?i)^\s*route-map\s+(\S+)"),
            policy_map: re(r"(?i)^\s*policy-map\s+(\S+)"),
            class_map: re(r"(?i)^\s*class-map\s+(\S+)"),
        }
    })
}

/// Keyword prefixes that map to a fixed global section id.
const GLOBAL_KEYWORDS: [(&str, &str); 5] = [
    ("logging ", "logging"),
    ("ntp ", "ntp"),
    ("snmp-server ", "snmp"),
    ("aaa ", "aaa"),
    ("hostname ", "hostname"),
];

/// Classify a line into `(section_type, section_id)`. First rule wins.
pub fn classify(line: &str) -> (SectionType, String) {
    let p = starters();

    if let Some(caps) = p.interface.captures(line) {
        return (SectionType::Interfaces, caps[1].to_string());
    }
    if let Some(caps) = p.acl.captures(line) {
        return (SectionType::Acls, caps[2].to_string());
    }
    if let Some(caps) = p.router.captures(line) {
        let proto = caps[1].to_lowercase();
        let id = match caps.get(2) {
            Some(ident) => format!("{} {}", proto, ident.as_str()),
            None => proto,
        };
        return (SectionType::Protocols, id);
    }
    if let Some(caps) = p.route_map.captures(line) {
        return (SectionType::Acls, format!("route-map {}", &caps[1]));
    }
    if let Some(caps) = p.policy_map.captures(line) {
        return (SectionType::Global, format!("policy-map {}", &caps[1]));
    }
    if let Some(caps) = p.class_map.captures(line) {
        return (SectionType::Global, format!("class-map {}", &caps[1]));
    }

    let stripped = line.trim().to_lowercase();
    if stripped.starts_with("line ") {
        return (SectionType::Global, stripped);
    }
    for (prefix, id) in GLOBAL_KEYWORDS {
        if stripped.starts_with(prefix) {
            return (SectionType::Global, id.to_string());
        }
    }
    if stripped.starts_with("ip route") || stripped.starts_with("ipv6 route") {
        return (SectionType::Protocols, "static-routes".to_string());
    }

    let first = stripped.split_whitespace().next().unwrap_or_default();
    (SectionType::Global, first.to_string())
}

/// True when the line is an explicit block-opening construct: interface,
/// access-list, router, route-map, policy-map, class-map or `line`.
pub fn is_block_starter(line: &str) -> bool {
    let p = starters();
    p.interface.is_match(line)
        || p.acl.is_match(line)
        || p.router.is_match(line)
        || p.route_map.is_match(line)
        || p.policy_map.is_match(line)
        || p.class_map.is_match(line)
        || line.trim().to_lowercase().starts_with("line ")
}

fn is_comment(line: &str) -> bool {
    line.trim().starts_with('!')
}

struct OpenBlock<'a> {
    section_type: SectionType,
    section_id: String,
    lines: Vec<&'a str>,
}

/// Segment masked CLI-style configuration text.
pub fn segment_cli(masked_text: &str, device_name: &str, vendor: Vendor) -> Vec<Section> {
    let mut sections = Vec::new();
    let mut current: Option<OpenBlock<'_>> = None;
    let mut chunk_index: u32 = 0;

    let mut flush = |block: OpenBlock<'_>, sections: &mut Vec<Section>| {
        sections.push(Section::new(
            device_name,
            vendor,
            block.section_type,
            &block.section_id,
            chunk_index,
            &block.lines,
        ));
        chunk_index += 1;
    };

    for line in masked_text.lines() {
        if is_comment(line) {
            if let Some(block) = current.as_mut() {
                block.lines.push(line);
            }
            continue;
        }

        let (section_type, section_id) = classify(line);

        let opens_block = match &current {
            None => true,
            Some(block) => {
                (section_type, section_id.as_str())
                    != (block.section_type, block.section_id.as_str())
                    && is_block_starter(line)
            }
        };

        if opens_block {
            if let Some(done) = current.take() {
                flush(done, &mut sections);
            }
            current = Some(OpenBlock {
                section_type,
                section_id,
                lines: vec![line],
            });
        } else if let Some(block) = current.as_mut() {
            block.lines.push(line);
        }
    }

    if let Some(done) = current.take() {
        flush(done, &mut sections);
    }

    sections
}

/// [`SectionStrategy`] wrapper around [`segment_cli`].
#[derive(Debug, Default, Clone, Copy)]
pub struct CliBlockSegmenter;

impl SectionStrategy for CliBlockSegmenter {
    fn name(&self) -> &'static str {
        "cli_block"
    }

    fn segment(
        &self,
        masked_text: &str,
        device_name: &str,
        vendor: Vendor,
    ) -> Result<Vec<Section>, SegmentError> {
        Ok(segment_cli(masked_text, device_name, vendor))
    }
}
