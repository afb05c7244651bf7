//! Fixed-size line chunking for configurations with no known dialect.

use super::{SectionStrategy, SegmentError};
use crate::models::{Section, SectionType, Vendor};

/// Maximum number of lines per fallback chunk.
pub const FALLBACK_CHUNK_LINES: usize = 80;

/// Split non-blank lines into consecutive chunks of
/// [`FALLBACK_CHUNK_LINES`]. Chunk `n` is `global-chunk-<n>` with
/// `chunk_index = n`.
pub fn segment_fallback(masked_text: &str, device_name: &str, vendor: Vendor) -> Vec<Section> {
    let lines: Vec<&str> = masked_text
        .lines()
        .filter(|l| !l.trim().is_empty())
        .collect();

    lines
        .chunks(FALLBACK_CHUNK_LINES)
        .enumerate()
        .map(|(n, chunk)| {
            Section::new(
                device_name,
                vendor,
                SectionType::Global,
                &format!("global-chunk-{}", n),
                n as u32,
                chunk,
            )
        })
        .collect()
}

#[derive(Debug, Default, Clone, Copy)]
pub struct FallbackChunkSegmenter;

impl SectionStrategy for FallbackChunkSegmenter {
    fn name(&self) -> &'static str {
        "fallback_chunk"
    }

    fn segment(
        &self,
        masked_text: &str,
        device_name: &str,
        vendor: Vendor,
    ) -> Result<Vec<Section>, SegmentError> {
        Ok(segment_fallback(masked_text, device_name, vendor))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn numbered(n: usize) -> String {
        (0..n)
            .map(|i| format!("line {}", i))
            .collect::<Vec<_>>()
            .join("\n")
    }

    #[test]
    fn test_empty() {
        assert!(segment_fallback("", "d", Vendor::Unknown).is_empty());
        assert!(segment_fallback("  \n\t\n", "d", Vendor::Unknown).is_empty());
    }

    #[test]
    fn test_exact_multiple() {
        let sections = segment_fallback(&numbered(160), "d", Vendor::Unknown);
        assert_eq!(sections.len(), 2);
        assert!(sections.iter().all(|s| s.lines().count() == 80));
    }

    #[test]
    fn test_partial_last_chunk() {
        let sections = segment_fallback(&numbered(81), "d", Vendor::Unknown);
        assert_eq!(sections.len(), 2);
        assert_eq!(sections[0].section_id, "global-chunk-0");
        assert_eq!(sections[1].section_id, "global-chunk-1");
        assert_eq!(sections[1].chunk_index, 1);
        assert_eq!(sections[1].raw_snippet, "line 80");
        assert!(sections.iter().all(|s| s.section_type == SectionType::Global));
    }

    #[test]
    fn test_blank_lines_not_counted() {
        let text = "a\n\n   \nb";
        let sections = segment_fallback(text, "d", Vendor::Unknown);
        assert_eq!(sections.len(), 1);
        assert_eq!(sections[0].raw_snippet, "a\nb");
    }
}
