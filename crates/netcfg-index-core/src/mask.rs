//! Secret masking and line normalization.
//!
//! Every configuration is passed through [`normalize_and_mask`] before it
//! is segmented, so no section (and therefore no embedding or stored row)
//! ever carries a credential in clear text.
//!
//! # Patterns
//!
//! Patterns are applied in a fixed order, each to the output of the
//! previous one. A pattern keeps its first capture group (the keyword
//! prefix) and replaces the second (the secret value) with
//! [`MASK_MARKER`]:
//!
//! | # | Prefix kept | Example |
//! |---|-------------|---------|
//! | 1 | `password [type] ` | `enable password 7 ***MASKED***` |
//! | 2 | `secret [type] ` | `enable secret 5 ***MASKED***` |
//! | 3 | `username U password [type] ` | `username admin password 7 ***MASKED***` |
//! | 4 | `snmp-server community C ` | `snmp-server community public ***MASKED***` |
//! | 5 | `pre-shared-key [fmt] ` | `pre-shared-key ascii-text ***MASKED***` |
//! | 6 | `encrypted-password ` | `encrypted-password ***MASKED***` |
//! | 7 | `authentication key ` | `authentication key ***MASKED***` |
//! | 8 | `wpa-psk ` | `wpa-psk ***MASKED***` |
//!
//! The marker contains no whitespace, so re-masking masked text is a
//! no-op.

use std::sync::OnceLock;

use regex::Regex;

/// Literal written in place of every redacted value.
pub const MASK_MARKER: &str = "***MASKED***";

const SECRET_PATTERNS: [&str; 8] = [
    r"(?i)(password\s+\d?\s+)(\S+)",
    r"(?i)(secret\s+\d?\s+)(\S+)",
    r"(?i)(username\s+\S+\s+password\s+\d?\s+)(\S+)",
    r"(?i)(snmp-server\s+community\s+\S+\s+)(\S+)",
    r"(?i)(pre-shared-key\s+\S*\s+)(\S+)",
    r#"(?i)(encrypted-password\s+)("?.+"?)"#,
    r"(?i)(authentication\s+key\s+)(\S+)",
    r"(?i)(wpa-psk\s+)(\S+)",
];

static COMPILED: OnceLock<Vec<Regex>> = OnceLock::new();

/// The compiled secret patterns, in application order.
pub fn secret_patterns() -> &'static [Regex] {
    COMPILED.get_or_init(|| {
        SECRET_PATTERNS
            .iter()
            .map(|p| Regex::new(p).expect("secret patterns are valid regexes"))
            .collect()
    })
}

/// Mask every secret value on a single line.
pub fn mask_line(line: &str) -> String {
    let replacement = format!("${{1}}{}", MASK_MARKER);
    let mut masked = line.to_string();
    for pattern in secret_patterns() {
        masked = pattern
            .replace_all(&masked, replacement.as_str())
            .into_owned();
    }
    masked
}

/// Line terminators accepted on input: `\n`, `\r\n`, a bare `\r`, and the
/// vertical-tab, form-feed, separator and Unicode line/paragraph breaks.
fn is_line_break(c: char) -> bool {
    matches!(
        c,
        '\n' | '\r' | '\x0b' | '\x0c' | '\x1c' | '\x1d' | '\x1e' | '\u{85}' | '\u{2028}' | '\u{2029}'
    )
}

/// Strip trailing whitespace, drop blank lines, and mask each remaining
/// line. Lines are rejoined with `\n` without a trailing newline, so the
/// segmenters only ever see `\n` terminators.
pub fn normalize_and_mask(config_text: &str) -> String {
    config_text
        .split(is_line_break)
        .map(str::trim_end)
        .filter(|line| !line.is_empty())
        .map(mask_line)
        .collect::<Vec<_>>()
        .join("\n")
}
