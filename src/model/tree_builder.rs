//! Trait for constructing node tables during parsing.
//!
//! The [`TreeBuilder`] trait decouples the Newick parser from the concrete
//! tree representation. The parser calls builder methods in the order it
//! completes nodes during its left-to-right scan:
//!
//! - a tip as soon as its label and branch length are read,
//! - an internal node when its closing parenthesis (plus decoration and
//!   branch length) is read,
//! - the root last.
//!
//! Because closing parentheses are met in the same order, a builder can hand
//! out synthetic labels `<1>`, `<2>`, ... simply by counting
//! [`add_internal`](TreeBuilder::add_internal) and
//! [`add_root`](TreeBuilder::add_root) calls.
//!
//! # Builder lifecycle
//! ```text
//! Empty ──→ init_next() ──→ Building ──→ add_* ──→ finish_tree() ──→ Empty
//!   ↑                                                                  │
//!   └──────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The built-in implementation is
//! [`NodeTableBuilder`](crate::model::NodeTableBuilder).

use crate::model::node::{BranchLength, NodeId};
use crate::parser::ParsingErrorType;

// =#========================================================================#=
// TREE BUILDER (trait)
// =#========================================================================T=
/// Abstraction for constructing trees during parsing.
pub trait TreeBuilder {
    /// The tree type produced by this builder.
    type Tree;

    /// Prepares the builder for constructing a new tree.
    ///
    /// # Arguments
    /// * `num_tips` - Expected number of tips (hint for allocation)
    fn init_next(&mut self, num_tips: usize);

    /// Adds a tip with the given verbatim label.
    ///
    /// # Errors
    /// Rejects labels that would make the node table ambiguous, i.e.
    /// duplicates and labels shaped like synthetic internal labels.
    fn add_tip(
        &mut self,
        label: String,
        branch_length: Option<BranchLength>,
    ) -> Result<NodeId, ParsingErrorType>;

    /// Adds an internal (non-root) node over previously added children.
    ///
    /// # Arguments
    /// * `children` - Nodes returned by earlier `add_*` calls, in input order
    /// * `decoration` - Raw text found after the closing parenthesis, if any
    /// * `branch_length` - Branch length of the edge above the node, if any
    fn add_internal(
        &mut self,
        children: Vec<NodeId>,
        decoration: Option<String>,
        branch_length: Option<BranchLength>,
    ) -> NodeId;

    /// Adds the root, completing the tree structure.
    fn add_root(
        &mut self,
        children: Vec<NodeId>,
        decoration: Option<String>,
        branch_length: Option<BranchLength>,
    ) -> NodeId;

    /// Finalizes the building process and returns the resulting tree.
    ///
    /// Returns `None` if no root was added. Leaves the builder empty.
    fn finish_tree(&mut self) -> Option<Self::Tree>;
}
