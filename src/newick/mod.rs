//! Newick format parser and writer for phylogenetic trees.
//!
//! This module provides [`NewickParser`] to parse Newick strings into
//! [`Tree`] node tables. The parser drives a [`TreeBuilder`] in a single
//! left-to-right pass and assigns a synthetic label `<k>` to every node
//! closed by a `)`, numbered in the order the closing parentheses occur.
//!
//! # Quick API
//! For simple use cases:
//! * [`parse_str`] - parses a single string with default options
//! * [`parse_str_with`] - parses a single string with given [`ParseOptions`]
//! * [`parse_lines`] / [`parse_file`] - parses one tree per line, skipping
//!   malformed lines
//!
//! # Full API
//! For more control, configure a [`NewickParser`] (optionally with another
//! [`TreeBuilder`]) and call [`NewickParser::parse_str`] repeatedly.
//!
//! # Format
//! The accepted grammar:
//! * `tree ::= node ';'`
//! * `node ::= tip | internal`
//! * `internal ::= '(' node (',' node)+ ')' [decoration] [branch_length]`
//! * `tip ::= label [branch_length]`
//! * `branch_length ::= ':' number`
//!
//! Furthermore:
//! * Whitespace can occur between elements
//! * Comments are square brackets and can occur between elements; they are
//!   skipped
//! * Labels may be single-quoted, with `''` standing for one quote
//! * Unquoted labels are trimmed of surrounding whitespace, so `(A ,B);`
//!   has tip `A`; quote a label to keep such whitespace (`('A ',B);`)
//! * The decoration after `)` is a support value or an internal node name,
//!   see [`DecorationMode`]
//! * A single tip `A;` is a valid tree; it is given a synthetic root `<1>`
//!
//! [`Tree`]: crate::model::Tree
//! [`TreeBuilder`]: crate::model::TreeBuilder

mod batch;
mod defs;
mod options;
mod parser;
pub mod writer;

pub use self::batch::{BatchResult, SkippedTree, parse_file, parse_lines};
pub use self::options::{DecorationMode, ParseOptions};
pub use self::parser::NewickParser;
pub use self::writer::{NewickStyle, to_newick};

use crate::model::Tree;
use crate::parser::ParsingError;

// ============================================================================
// QUICK PARSING API (pub)
// ============================================================================
/// Parses a single Newick string with default [`ParseOptions`].
///
/// # Example
/// ```
/// use cladekit::newick::parse_str;
///
/// let tree = parse_str("(Fratercula_cirrhata,(Fratercula_arctica,Fratercula_corniculata));").unwrap();
/// assert_eq!(tree.root_label(), "<2>");
/// ```
pub fn parse_str<S: AsRef<str>>(newick: S) -> Result<Tree, ParsingError> {
    parse_str_with(newick, &ParseOptions::default())
}

/// Parses a single Newick string with the given options.
pub fn parse_str_with<S: AsRef<str>>(newick: S, options: &ParseOptions) -> Result<Tree, ParsingError> {
    NewickParser::with_options(options.clone()).parse_str(newick.as_ref())
}
