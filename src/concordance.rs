//! Gene concordance factors of a species tree.
//!
//! For every non-tip node of a species tree, the concordance factor is the
//! share of gene trees that contain a branch with the same clade. Clades are
//! compared as tip-label sets; gene trees parsed as unrooted also match the
//! complement of a clade.
//!
//! Gene trees with a different number of tips than the species tree are not
//! used and are counted separately, as are gene tree lines that failed to
//! parse. Neither aborts the analysis.
//!
//! # Example
//! ```
//! use cladekit::concordance::ConcordanceAnalysis;
//! use cladekit::newick::{ParseOptions, parse_lines, parse_str};
//!
//! let species = parse_str("((A,B),(C,D));").unwrap();
//! let genes = parse_lines("((A,B),(C,D));\n((A,C),(B,D));\n", &ParseOptions::default());
//!
//! let mut analysis = ConcordanceAnalysis::new(&species);
//! analysis.add_batch(&genes);
//! let rows = analysis.rows();
//! assert_eq!(rows[0].clade, "A,B");
//! assert_eq!(rows[0].concordant, 1);
//! assert_eq!(rows[0].factor, 0.5);
//! ```

use crate::error::{Result, TreeError};
use crate::model::{CladeSet, NodeId, Tree};
use crate::newick::BatchResult;
use log::{debug, warn};
use rayon::prelude::*;
use serde::Serialize;

/// Concordance of one species tree node.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConcordanceRow {
    /// Synthetic label of the species tree node
    pub node: String,
    /// Sorted tip labels of the clade, comma-joined
    pub clade: String,
    /// Number of used gene trees containing the clade
    pub concordant: usize,
    /// Number of gene trees used
    pub trees_used: usize,
    /// `concordant / trees_used`, `0` when no tree was used
    pub factor: f64,
}

/// Counts of gene trees seen by a [ConcordanceAnalysis].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ConcordanceSummary {
    pub trees_used: usize,
    pub skipped_malformed: usize,
    pub skipped_tip_mismatch: usize,
    /// Used gene trees lacking the species root clade (differing tip sets)
    pub root_clade_absent: usize,
}

/// Accumulates concordance counts of gene trees against a species tree.
#[derive(Debug)]
pub struct ConcordanceAnalysis<'s> {
    species: &'s Tree,
    clades: Vec<(NodeId, CladeSet<'s>)>,
    concordant: Vec<usize>,
    summary: ConcordanceSummary,
}

impl<'s> ConcordanceAnalysis<'s> {
    /// Creates an analysis over the non-tip nodes of `species`.
    pub fn new(species: &'s Tree) -> Self {
        let clades = species.clade_sets();
        debug!(
            "Concordance analysis over {} species tree clades",
            clades.len()
        );
        Self {
            species,
            concordant: vec![0; clades.len()],
            clades,
            summary: ConcordanceSummary::default(),
        }
    }

    /// Adds a single gene tree.
    ///
    /// # Errors
    /// [TreeError::TipCountMismatch] if the gene tree has a different number
    /// of tips; the tree is then counted as skipped and not used.
    pub fn add_gene_tree(&mut self, gene: &Tree) -> Result<()> {
        let hits = self.match_clades(gene).inspect_err(|_| {
            self.summary.skipped_tip_mismatch += 1;
        })?;
        self.record(&hits, None);
        Ok(())
    }

    /// Adds all trees of a batch; gene trees are compared in parallel.
    ///
    /// Malformed lines of the batch and tip count mismatches are counted and
    /// logged as warnings.
    pub fn add_batch(&mut self, batch: &BatchResult) {
        self.summary.skipped_malformed += batch.num_skipped();

        let results: Vec<Result<Vec<bool>>> = batch
            .trees
            .par_iter()
            .map(|gene| self.match_clades(gene))
            .collect();

        for (&line, result) in batch.lines.iter().zip(results) {
            match result {
                Ok(hits) => self.record(&hits, Some(line)),
                Err(error) => {
                    warn!("Skipping gene tree on line {line}: {error}");
                    self.summary.skipped_tip_mismatch += 1;
                }
            }
        }
    }

    /// Returns for every species clade whether `gene` contains it.
    fn match_clades(&self, gene: &Tree) -> Result<Vec<bool>> {
        let expected = self.species.num_tips();
        let found = gene.num_tips();
        if expected != found {
            return Err(TreeError::TipCountMismatch { expected, found });
        }

        let gene_clades = gene.clade_sets();
        Ok(self
            .clades
            .iter()
            .map(|(_, clade)| {
                gene.is_trivial_split(clade)
                    || gene_clades
                        .iter()
                        .any(|(_, gene_clade)| gene.same_branch(gene_clade, clade))
            })
            .collect())
    }

    /// Counts a used gene tree; `line` is its input line, if from a batch.
    fn record(&mut self, hits: &[bool], line: Option<usize>) {
        self.summary.trees_used += 1;
        for (count, &hit) in self.concordant.iter_mut().zip(hits) {
            if hit {
                *count += 1;
            }
        }

        let root = self.species.root().id();
        let root_absent = self
            .clades
            .iter()
            .zip(hits)
            .any(|((id, _), &hit)| *id == root && !hit);
        if root_absent {
            let root_label = self.species.root_label();
            match line {
                Some(line) => {
                    warn!("Gene tree on line {line} lacks the species root clade {root_label}")
                }
                None => warn!(
                    "Gene tree {} lacks the species root clade {root_label}",
                    self.summary.trees_used
                ),
            }
            self.summary.root_clade_absent += 1;
        }
    }

    /// Returns one row per non-tip species tree node, in node order.
    pub fn rows(&self) -> Vec<ConcordanceRow> {
        let trees_used = self.summary.trees_used;
        self.clades
            .iter()
            .zip(&self.concordant)
            .map(|((id, clade), &concordant)| ConcordanceRow {
                node: self.species[*id].label().to_string(),
                clade: clade.iter().copied().collect::<Vec<_>>().join(","),
                concordant,
                trees_used,
                factor: if trees_used == 0 {
                    0.0
                } else {
                    concordant as f64 / trees_used as f64
                },
            })
            .collect()
    }

    pub fn summary(&self) -> ConcordanceSummary {
        self.summary
    }
}
