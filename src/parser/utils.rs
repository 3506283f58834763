//! Label escaping for writing Newick strings.
//!
//! Labels are stored verbatim (quotes stripped, whitespace inside kept), so
//! writing them back requires quoting whenever they contain a character the
//! Newick grammar treats as structure.

/// Characters that force a label to be single-quoted when written.
const SPECIAL_CHARS: &[char] = &[',', ';', '(', ')', ':', '[', ']', '\'', '\t', '\n', '\r'];

/// Checks whether a label must be quoted to be read back unchanged.
///
/// # Examples
/// ```
/// # use cladekit::parser::utils::needs_quoting;
/// assert!(!needs_quoting("Pukeko"));
/// assert!(!needs_quoting("Australasian Swamphen"));
/// assert!(needs_quoting("Pu[ke]ko"));
/// assert!(needs_quoting("Baillon's Crake"));
/// assert!(needs_quoting(" padded"));
/// assert!(needs_quoting(""));
/// ```
pub fn needs_quoting(label: &str) -> bool {
    label.is_empty() || label.trim() != label || label.contains(SPECIAL_CHARS)
}

/// Escapes a label for use in a Newick string.
///
/// Labels that need quoting are wrapped in single quotes with internal
/// single quotes doubled; all others are returned unchanged.
///
/// # Examples
/// ```
/// # use cladekit::parser::utils::escape_label;
/// assert_eq!(escape_label("Pukeko"), "Pukeko");
/// assert_eq!(escape_label("Pu[ke]ko"), "'Pu[ke]ko'");
/// assert_eq!(escape_label("Baillon's Crake"), "'Baillon''s Crake'");
/// ```
pub fn escape_label(label: &str) -> String {
    if needs_quoting(label) {
        format!("'{}'", label.replace('\'', "''"))
    } else {
        label.to_string()
    }
}
