//! Data model for parsed phylogenetic trees.
//!
//! # Tree representation
//! A [Tree] is a node table: an arena of [Node]s referenced by [NodeId],
//! plus an index from label to node. Each node is a tip, an internal node
//! or the root ([NodeType]), records its parent, its children, its branch
//! length (kept as the original text, see [BranchLength]) and an optional
//! [Decoration] (support value or internal node name).
//!
//! # Building trees
//! Trees are constructed during parsing via the [TreeBuilder] trait, which
//! decouples the parser from the concrete representation. The provided
//! implementation is [NodeTableBuilder], which also hands out the synthetic
//! internal labels.
//!
//! # Flat records
//! [NodeRecord] and [LegacyNodeRecord] are the per-node string records
//! expected by existing downstream scripts.

pub mod node;
pub mod node_table_builder;
pub mod records;
pub mod tree;
pub mod tree_builder;

pub use node::{BranchLength, Decoration, NA, Node, NodeId, NodeType};
pub use node_table_builder::NodeTableBuilder;
pub use records::{LegacyNodeRecord, NodeRecord};
pub use tree::{CladeSet, Tree};
pub use tree_builder::TreeBuilder;
