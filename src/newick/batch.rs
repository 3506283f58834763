//! Batch parsing of tree files with one Newick string per line.
//!
//! Lines are parsed independently and in parallel. A malformed line does not
//! abort the batch; it is recorded as a [SkippedTree] and logged.

use crate::error::Result;
use crate::model::Tree;
use crate::newick::options::ParseOptions;
use crate::newick::parser::NewickParser;
use crate::parser::ParsingError;
use log::{info, warn};
use rayon::prelude::*;
use std::fs;
use std::path::Path;

/// A line that could not be parsed.
#[derive(Debug, Clone, PartialEq)]
pub struct SkippedTree {
    /// 1-based line number in the input
    pub line: usize,
    pub error: ParsingError,
}

/// Trees parsed from a batch, in input order, plus the skipped lines.
#[derive(Debug, Default)]
pub struct BatchResult {
    pub trees: Vec<Tree>,
    /// 1-based input line number of each entry of `trees`
    pub lines: Vec<usize>,
    pub skipped: Vec<SkippedTree>,
}

impl BatchResult {
    pub fn num_parsed(&self) -> usize {
        self.trees.len()
    }

    pub fn num_skipped(&self) -> usize {
        self.skipped.len()
    }
}

/// Parses one tree per non-blank line of `text`.
///
/// Blank lines are ignored and do not count as skipped.
///
/// # Example
/// ```
/// use cladekit::newick::{ParseOptions, parse_lines};
///
/// let batch = parse_lines("(A,B,C);\n\n((A,B),C;\n(A,(B,C));\n", &ParseOptions::default());
/// assert_eq!(batch.num_parsed(), 2);
/// assert_eq!(batch.skipped[0].line, 3);
/// ```
pub fn parse_lines(text: &str, options: &ParseOptions) -> BatchResult {
    let lines: Vec<(usize, &str)> = text
        .lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(i, line)| (i + 1, line))
        .collect();

    let results: Vec<(usize, std::result::Result<Tree, ParsingError>)> = lines
        .par_iter()
        .map_init(
            || NewickParser::with_options(options.clone()),
            |parser, &(line, newick)| (line, parser.parse_str(newick)),
        )
        .collect();

    let mut batch = BatchResult::default();
    for (line, result) in results {
        match result {
            Ok(tree) => {
                batch.trees.push(tree);
                batch.lines.push(line);
            }
            Err(error) => {
                warn!("Skipping tree on line {line}: {error}");
                batch.skipped.push(SkippedTree { line, error });
            }
        }
    }

    info!(
        "Parsed {} trees, skipped {} malformed",
        batch.num_parsed(),
        batch.num_skipped()
    );
    batch
}

/// Reads a file and parses one tree per non-blank line.
///
/// # Errors
/// Only failing to read the file is an error; malformed trees are reported
/// in [BatchResult::skipped].
pub fn parse_file<P: AsRef<Path>>(path: P, options: &ParseOptions) -> Result<BatchResult> {
    let path = path.as_ref();
    let text = fs::read_to_string(path)?;
    info!("Read {} bytes from {}", text.len(), path.display());
    Ok(parse_lines(&text, options))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TreeError;
    use crate::parser::ParsingErrorType;

    #[test]
    fn test_keeps_input_order() {
        let text = "(A,B);\n(C,D);\n(E,F);\n(G,H);\n";
        let batch = parse_lines(text, &ParseOptions::default());
        let firsts: Vec<&str> = batch.trees.iter().map(|t| t.tip_labels()[0]).collect();
        assert_eq!(firsts, vec!["A", "C", "E", "G"]);
        assert!(batch.skipped.is_empty());
    }

    #[test]
    fn test_skipped_lines_keep_line_numbers() {
        let text = "(A,B);\n(A,,B);\n\n(A:x,B);\n";
        let batch = parse_lines(text, &ParseOptions::default());
        assert_eq!(batch.num_parsed(), 1);
        let lines: Vec<usize> = batch.skipped.iter().map(|s| s.line).collect();
        assert_eq!(lines, vec![2, 4]);
        assert_eq!(batch.lines, vec![1]);
        assert!(matches!(
            batch.skipped[1].error.kind(),
            ParsingErrorType::InvalidBranchLength(_)
        ));
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let result = parse_file("/definitely/not/here.nwk", &ParseOptions::default());
        assert!(matches!(result, Err(TreeError::Io(_))));
    }
}
