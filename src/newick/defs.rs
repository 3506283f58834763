//! Constants for the Newick parser and writer.

/// Newick label delimiters: parentheses, comma, colon, semicolon, comment start.
///
/// Whitespace is not a delimiter; unquoted labels may contain inner spaces
/// and are trimmed at both ends.
pub(crate) const NEWICK_LABEL_DELIMITERS: &[u8] = b"(),:;[";

/// Default guess for number of tips, when unknown
pub(crate) const DEFAULT_NUM_TIPS_GUESS: usize = 10;
