//! Crate-level error type.
//!
//! Parsing failures carry a [ParsingError] with position and context; the
//! remaining variants cover queries against a built tree and the batch
//! workflows layered on top of the parser.

use crate::parser::ParsingError;
use thiserror::Error;

/// Result type alias for tree engine operations
pub type Result<T> = std::result::Result<T, TreeError>;

/// Error type for tree engine operations
#[derive(Error, Debug)]
pub enum TreeError {
    /// Malformed Newick input
    #[error(transparent)]
    Parse(#[from] ParsingError),

    /// A gene tree does not have as many tips as the reference tree
    #[error("Tip count mismatch: expected {expected} tips but tree has {found}")]
    TipCountMismatch {
        /// Number of tips in the reference tree
        expected: usize,
        /// Number of tips in the offending tree
        found: usize,
    },

    /// A query named a label that is not in the node table
    #[error("Unknown node label '{0}'")]
    UnknownLabel(String),

    /// Reading input failed
    #[error("IO error - {0}")]
    Io(#[from] std::io::Error),
}
