//! Cladekit is a library to parse phylogenetic trees from Newick strings
//! into labelled node tables and to query them.
//!
//! Core functionality provided:
//! - Newick: Parse single Newick strings, or files with one tree per line
//!   (malformed lines are skipped and reported, not fatal).
//! - Node table: Every node of a [Tree] is reachable by label. Tips keep
//!   their input label, internal nodes and the root get synthetic labels
//!   `<1>`, `<2>`, ... in the order their closing parentheses appear, so
//!   re-parsing the same string yields the same labels.
//! - Queries: descendants, clades (as lists or order-independent sets),
//!   ancestors, sisters, branch lengths, root distances.
//! - Branch lengths are kept as their original text, `1.23e-5` stays
//!   `1.23e-5`; numeric values are parsed only when requested.
//! - Records: the four-field and ten-field per-node records of
//!   [crate::model::records].
//! - Concordance: gene concordance factors of a species tree, see
//!   [crate::concordance].
//!
//! # Usage patterns
//! 1. The quick API below and in [crate::newick] uses default settings.
//! 2. Configure a [NewickParser](crate::newick::NewickParser) with
//!    [ParseOptions](crate::newick::ParseOptions) for control over
//!    rootedness, decoration interpretation and the terminator check.
//!
//! ## Example
//!
//! Parse a single Newick string:
//! ```
//! use cladekit::parse_newick_str;
//!
//! let tree = parse_newick_str("((A:0.1,B:0.2)95:0.3,C:0.4);").unwrap();
//! assert_eq!(tree.num_tips(), 3);
//! assert_eq!(tree.clade("<1>").unwrap(), vec!["A", "B"]);
//! assert_eq!(tree.ancestor("<1>").unwrap(), Some("<2>"));
//! assert_eq!(tree.branch_length("<1>").unwrap().unwrap().as_str(), "0.3");
//! ```
//!
//! Parse a file of gene trees:
//! ```no_run
//! use cladekit::parse_newick_file;
//!
//! let batch = parse_newick_file("gene_trees.nwk").unwrap();
//! println!("Parsed {} trees, skipped {}", batch.num_parsed(), batch.num_skipped());
//! ```

pub mod concordance;
pub mod error;
pub mod legacy;
pub mod model;
pub mod newick;
pub mod parser;

use crate::model::Tree;
use crate::newick::{BatchResult, ParseOptions};
use crate::parser::parsing_error::ParsingError;
use std::path::Path;

// ============================================================================
// Quick Newick API
// ============================================================================
/// Parse a Newick string using default settings, returning a [Tree].
///
/// See [`newick::parse_str`] for full documentation of this convenience function.
pub fn parse_newick_str<S: AsRef<str>>(newick: S) -> Result<Tree, ParsingError> {
    newick::parse_str(newick)
}

/// Parse a file with one Newick string per line using default settings.
///
/// See [`newick::parse_file`] for full documentation of this convenience function.
pub fn parse_newick_file<P: AsRef<Path>>(path: P) -> error::Result<BatchResult> {
    newick::parse_file(path, &ParseOptions::default())
}
