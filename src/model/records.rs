//! Flat per-node records derived from a [Tree](crate::model::Tree).
//!
//! Downstream scripts consume the node table as a mapping from node label to
//! a list of strings, with `"NA"` for absent values. Two layouts exist:
//! the four-field [NodeRecord] and the ten-field [LegacyNodeRecord] of the
//! first-generation parser. Both serialize with `serde`, one row per node.

use serde::Serialize;

/// Four-field record: `[branch_length, ancestor, node_type, support_or_label]`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NodeRecord {
    pub node: String,
    pub branch_length: String,
    pub ancestor: String,
    pub node_type: String,
    pub support_or_label: String,
}

impl NodeRecord {
    /// Returns the record fields (without the node label) in legacy order.
    pub fn fields(&self) -> [&str; 4] {
        [
            &self.branch_length,
            &self.ancestor,
            &self.node_type,
            &self.support_or_label,
        ]
    }
}

/// Ten-field record of the first-generation parser.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LegacyNodeRecord {
    pub node: String,
    pub branch_length: String,
    pub ancestor: String,
    pub ancestor_branch_length: String,
    pub sister: String,
    pub sister_branch_length: String,
    pub descendant1: String,
    pub descendant1_branch_length: String,
    pub descendant2: String,
    pub descendant2_branch_length: String,
    pub node_type: String,
}

impl LegacyNodeRecord {
    /// Returns the record fields (without the node label) in legacy order.
    pub fn fields(&self) -> [&str; 10] {
        [
            &self.branch_length,
            &self.ancestor,
            &self.ancestor_branch_length,
            &self.sister,
            &self.sister_branch_length,
            &self.descendant1,
            &self.descendant1_branch_length,
            &self.descendant2,
            &self.descendant2_branch_length,
            &self.node_type,
        ]
    }
}
