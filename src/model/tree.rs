//! Provides the node table of a parsed tree and the queries on it.
//!
//! A [Tree] is immutable once built. Nodes live in an arena and are
//! referenced by [NodeId]; every node is also reachable by its label (the
//! verbatim tip label or a synthetic `<k>`).
//!
//! # Iteration order
//! [`Tree::nodes`] yields nodes in *completion order* of the left-to-right
//! scan of the input: a tip once its label has been read, an internal node
//! once its closing parenthesis has been read. The root always comes last.
//! The order is identical across re-parses of the same string.

use crate::error::{Result, TreeError};
use crate::model::node::{BranchLength, Node, NodeId, NodeType};
use crate::model::records::{LegacyNodeRecord, NodeRecord};
use crate::newick::{NewickStyle, to_newick};
use log::debug;
use std::collections::{BTreeSet, HashMap};

/// A set of tip labels, compared order-independently.
pub type CladeSet<'a> = BTreeSet<&'a str>;

// =$========================================================================$=
// TREE
// =$========================================================================$=
/// A phylogenetic tree parsed from one Newick string.
///
/// # Structure
/// - Exactly one root; every other node has exactly one parent.
/// - Tips carry the labels from the input, which are unique and non-empty.
/// - Internal nodes and the root carry synthetic labels `<1>`, `<2>`, ...
///   numbered by the order of their closing parentheses.
#[derive(Debug, Clone)]
pub struct Tree {
    nodes: Vec<Node>,
    index: HashMap<String, NodeId>,
    root: NodeId,
    rooted: bool,
}

// ============================================================================
// Construction, Getters / Accessors (pub)
// ============================================================================
impl Tree {
    pub(crate) fn from_parts(
        nodes: Vec<Node>,
        index: HashMap<String, NodeId>,
        root: NodeId,
        rooted: bool,
    ) -> Self {
        let tree = Tree {
            nodes,
            index,
            root,
            rooted,
        };
        debug_assert!(tree.is_valid());

        if !rooted && tree[root].children().len() == 2 {
            debug!("unrooted tree has a bifurcating root; its two child clades are one split");
        }

        tree
    }

    /// Returns all nodes in completion order (see module docs).
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    /// Returns the node with the given id.
    ///
    /// # Panics
    /// Panics if `id` is out of bounds.
    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id]
    }

    /// Returns the node with the given label, if present.
    pub fn get(&self, label: &str) -> Option<&Node> {
        self.index.get(label).map(|&id| &self.nodes[id])
    }

    /// Returns the id of the node with the given label.
    ///
    /// # Errors
    /// [TreeError::UnknownLabel] if no node has this label.
    pub fn node_id(&self, label: &str) -> Result<NodeId> {
        self.index
            .get(label)
            .copied()
            .ok_or_else(|| TreeError::UnknownLabel(label.to_string()))
    }

    fn lookup(&self, label: &str) -> Result<&Node> {
        self.node_id(label).map(|id| &self.nodes[id])
    }

    /// Returns the root node.
    pub fn root(&self) -> &Node {
        &self.nodes[self.root]
    }

    /// Returns the synthetic label of the root.
    pub fn root_label(&self) -> &str {
        self.nodes[self.root].label()
    }

    /// Returns whether the tree is treated as rooted.
    pub fn is_rooted(&self) -> bool {
        self.rooted
    }

    /// Returns the number of nodes in this tree.
    pub fn num_nodes(&self) -> usize {
        self.nodes.len()
    }

    /// Returns the number of tips in this tree.
    pub fn num_tips(&self) -> usize {
        self.nodes.iter().filter(|n| n.is_tip()).count()
    }

    /// Returns the number of internal (non-root, non-tip) nodes.
    pub fn num_internal(&self) -> usize {
        self.nodes.iter().filter(|n| n.is_internal()).count()
    }

    /// Returns the tip labels in input order.
    pub fn tip_labels(&self) -> Vec<&str> {
        self.nodes
            .iter()
            .filter(|n| n.is_tip())
            .map(|n| n.label())
            .collect()
    }

    /// Returns the role of the labelled node.
    pub fn node_type(&self, label: &str) -> Result<NodeType> {
        Ok(self.lookup(label)?.node_type())
    }

    /// Returns the label of the parent, or `None` for the root.
    pub fn ancestor(&self, label: &str) -> Result<Option<&str>> {
        let node = self.lookup(label)?;
        Ok(node.parent().map(|p| self.nodes[p].label()))
    }

    /// Returns the branch length above the labelled node, if present.
    pub fn branch_length(&self, label: &str) -> Result<Option<&BranchLength>> {
        Ok(self.lookup(label)?.branch_length())
    }

    /// Returns the first other child of the node's parent (in input order),
    /// or `None` for the root.
    pub fn sister(&self, label: &str) -> Result<Option<&str>> {
        let node = self.lookup(label)?;
        Ok(self.sister_of(node).map(|s| s.label()))
    }

    fn sister_of(&self, node: &Node) -> Option<&Node> {
        let parent = &self.nodes[node.parent()?];
        parent
            .children()
            .iter()
            .find(|&&c| c != node.id())
            .map(|&c| &self.nodes[c])
    }

    /// Returns the labels of all nodes whose parent is the labelled node.
    ///
    /// A tip has no children and yields itself.
    ///
    /// # Example
    /// ```
    /// let tree = cladekit::parse_newick_str("(A:1,B:2,(C:3,D:4):5);").unwrap();
    /// assert_eq!(tree.descendants("<2>").unwrap(), vec!["A", "B", "<1>"]);
    /// assert_eq!(tree.descendants("A").unwrap(), vec!["A"]);
    /// ```
    pub fn descendants(&self, label: &str) -> Result<Vec<&str>> {
        let node = self.lookup(label)?;
        if node.children().is_empty() {
            return Ok(vec![node.label()]);
        }
        Ok(node
            .children()
            .iter()
            .map(|&c| self.nodes[c].label())
            .collect())
    }

    /// Returns the tip labels below the labelled node, expanded depth-first
    /// left to right. A tip yields itself.
    ///
    /// # Example
    /// ```
    /// let tree = cladekit::parse_newick_str("((A,B),(C,D));").unwrap();
    /// assert_eq!(tree.clade("<2>").unwrap(), vec!["C", "D"]);
    /// assert_eq!(tree.clade("<3>").unwrap(), vec!["A", "B", "C", "D"]);
    /// ```
    pub fn clade(&self, label: &str) -> Result<Vec<&str>> {
        let id = self.node_id(label)?;
        Ok(self.clade_of(id))
    }

    /// Returns the tip labels below the given node (see [`Tree::clade`]).
    pub fn clade_of(&self, id: NodeId) -> Vec<&str> {
        self.pre_order_iter_from(id)
            .filter(|n| n.is_tip())
            .map(|n| n.label())
            .collect()
    }

    /// Returns the clade of the labelled node as an order-independent set.
    pub fn clade_set(&self, label: &str) -> Result<CladeSet<'_>> {
        Ok(self.clade(label)?.into_iter().collect())
    }

    /// Returns the clade set of every non-tip node, in node order.
    pub fn clade_sets(&self) -> Vec<(NodeId, CladeSet<'_>)> {
        let mut sets: Vec<Option<CladeSet<'_>>> = vec![None; self.nodes.len()];
        for node in self.post_order_iter() {
            let set = if node.is_tip() {
                CladeSet::from([node.label()])
            } else {
                let mut set = CladeSet::new();
                for &child in node.children() {
                    if let Some(child_set) = sets[child].as_ref() {
                        set.extend(child_set.iter().copied());
                    }
                }
                set
            };
            sets[node.id()] = Some(set);
        }

        self.nodes
            .iter()
            .filter(|n| !n.is_tip())
            .filter_map(|n| sets[n.id()].take().map(|set| (n.id(), set)))
            .collect()
    }

    /// Returns whether two clades denote the same branch of this tree.
    ///
    /// Clades are compared as sets. For unrooted trees a clade also matches
    /// its complement with respect to this tree's tips.
    pub fn same_branch(&self, a: &CladeSet<'_>, b: &CladeSet<'_>) -> bool {
        if a == b {
            return true;
        }
        if self.rooted {
            return false;
        }
        let tips = self.tip_labels();
        tips.len() == a.len() + b.len() && tips.iter().all(|t| a.contains(t) != b.contains(t))
    }

    /// Returns whether `clade` is a trivial split of this unrooted tree.
    ///
    /// A split separating at most one tip from the rest is present in every
    /// unrooted tree over the same tips, whether or not the Newick string
    /// happened to place a node there. Always `false` for rooted trees.
    pub fn is_trivial_split(&self, clade: &CladeSet<'_>) -> bool {
        if self.rooted || !clade.iter().all(|t| self.get(t).is_some_and(|n| n.is_tip())) {
            return false;
        }
        clade.len() <= 1 || self.num_tips() - clade.len() <= 1
    }

    /// Returns whether this tree has a branch with the given clade: some
    /// non-tip node matching it (see [`Tree::same_branch`]), or for unrooted
    /// trees a trivial split (see [`Tree::is_trivial_split`]).
    pub fn contains_clade(&self, clade: &CladeSet<'_>) -> bool {
        self.is_trivial_split(clade)
            || self
                .clade_sets()
                .iter()
                .any(|(_, set)| self.same_branch(set, clade))
    }

    /// Returns the sum of all branch lengths in the tree.
    pub fn total_branch_length(&self) -> f64 {
        self.nodes
            .iter()
            .filter_map(|n| n.branch_length())
            .map(|bl| bl.value())
            .sum()
    }

    /// Returns the summed branch lengths on the path from the root to the
    /// labelled node, excluding the root's own branch length.
    ///
    /// Missing branch lengths count as zero.
    pub fn root_distance(&self, label: &str) -> Result<f64> {
        let mut node = self.lookup(label)?;
        let mut distance = 0.0;
        while let Some(parent) = node.parent() {
            distance += node.branch_length().map_or(0.0, |bl| bl.value());
            node = &self.nodes[parent];
        }
        Ok(distance)
    }

    /// Returns the Newick string of this tree in the given style.
    pub fn to_newick(&self, style: NewickStyle) -> String {
        to_newick(self, style)
    }

    /// Returns the input string with a synthetic label inserted after every
    /// closing parenthesis; decorations and branch lengths are kept verbatim.
    ///
    /// # Example
    /// ```
    /// let tree = cladekit::parse_newick_str("((A:1,B:2)0.9:3,C:4);").unwrap();
    /// assert_eq!(tree.labeled_newick(), "((A:1,B:2)<1>0.9:3,C:4)<2>;");
    /// ```
    pub fn labeled_newick(&self) -> String {
        self.to_newick(NewickStyle::Labeled)
    }

    /// Returns the topology with synthetic labels but without branch lengths
    /// or decorations, e.g. `((A,B)<1>,C)<2>;`.
    pub fn labeled_topology(&self) -> String {
        self.to_newick(NewickStyle::LabeledTopology)
    }

    /// Returns the bare topology: tip labels and parentheses only.
    pub fn bare_topology(&self) -> String {
        self.to_newick(NewickStyle::Topology)
    }

    /// Returns the flat record of every node, in node order.
    pub fn records(&self) -> Vec<NodeRecord> {
        self.nodes
            .iter()
            .map(|node| NodeRecord {
                node: node.label().to_string(),
                branch_length: na_or(node.branch_length().map(|bl| bl.as_str())),
                ancestor: na_or(node.parent().map(|p| self.nodes[p].label())),
                node_type: node.node_type().to_string(),
                support_or_label: na_or(node.decoration().map(|d| d.as_str())),
            })
            .collect()
    }

    /// Returns the ten-field legacy record of every node, in node order.
    ///
    /// Only the first two children of a polytomy are listed.
    pub fn legacy_records(&self) -> Vec<LegacyNodeRecord> {
        let bl_of = |node: Option<&Node>| na_or(node.and_then(|n| n.branch_length()).map(|bl| bl.as_str()));
        let label_of = |node: Option<&Node>| na_or(node.map(|n| n.label()));

        self.nodes
            .iter()
            .map(|node| {
                let ancestor = node.parent().map(|p| &self.nodes[p]);
                let sister = self.sister_of(node);
                let first = node.children().first().map(|&c| &self.nodes[c]);
                let second = node.children().get(1).map(|&c| &self.nodes[c]);
                LegacyNodeRecord {
                    node: node.label().to_string(),
                    branch_length: bl_of(Some(node)),
                    ancestor: label_of(ancestor),
                    ancestor_branch_length: bl_of(ancestor),
                    sister: label_of(sister),
                    sister_branch_length: bl_of(sister),
                    descendant1: label_of(first),
                    descendant1_branch_length: bl_of(first),
                    descendant2: label_of(second),
                    descendant2_branch_length: bl_of(second),
                    node_type: node.node_type().to_string(),
                }
            })
            .collect()
    }

    /// Validates the structure and all index references.
    ///
    /// Checks:
    /// - Root id is in bounds, is the only root and has no parent
    /// - Node ids match their arena position and labels are indexed
    /// - Children point back to their parent and parents list their children
    /// - Tips have no children, other nodes have at least one
    pub fn is_valid(&self) -> bool {
        if self.root >= self.nodes.len() || !self.nodes[self.root].is_root() {
            return false;
        }

        let mut num_roots = 0;
        for (id, node) in self.nodes.iter().enumerate() {
            if node.id() != id || self.index.get(node.label()) != Some(&id) {
                return false;
            }

            match node.node_type() {
                NodeType::Root => {
                    num_roots += 1;
                    if node.parent().is_some() || node.children().is_empty() {
                        return false;
                    }
                }
                NodeType::Internal => {
                    if node.children().len() < 2 {
                        return false;
                    }
                }
                NodeType::Tip => {
                    if !node.children().is_empty() {
                        return false;
                    }
                }
            }

            if !node.is_root() {
                match node.parent() {
                    Some(p) if p < self.nodes.len() => {
                        if !self.nodes[p].children().contains(&id) {
                            return false;
                        }
                    }
                    _ => return false,
                }
            }

            if node.children().iter().any(|&c| c >= self.nodes.len() || self.nodes[c].parent() != Some(id)) {
                return false;
            }
        }

        num_roots == 1 && self.index.len() == self.nodes.len()
    }
}

fn na_or(value: Option<&str>) -> String {
    value.unwrap_or(crate::model::node::NA).to_string()
}

impl std::ops::Index<NodeId> for Tree {
    type Output = Node;

    fn index(&self, index: NodeId) -> &Self::Output {
        &self.nodes[index]
    }
}

// =$========================================================================$=
// ITERATORS
// =$========================================================================$=
impl Tree {
    /// Returns an iterator over the tree in post-order (children before parents).
    pub fn post_order_iter(&self) -> PostOrderIter<'_> {
        PostOrderIter {
            tree: self,
            stack: vec![(self.root, false)],
        }
    }

    /// Returns an iterator over the tree in pre-order (parents before children).
    pub fn pre_order_iter(&self) -> PreOrderIter<'_> {
        self.pre_order_iter_from(self.root)
    }

    /// Returns a pre-order iterator over the subtree below `id` (inclusive).
    pub fn pre_order_iter_from(&self, id: NodeId) -> PreOrderIter<'_> {
        PreOrderIter {
            tree: self,
            stack: vec![id],
        }
    }
}

/// Iterator for post-order traversal (children before parents).
///
/// Uses an explicit stack, so deep caterpillar trees do not recurse.
pub struct PostOrderIter<'a> {
    tree: &'a Tree,
    stack: Vec<(NodeId, bool)>, // (id, children_visited)
}

impl<'a> Iterator for PostOrderIter<'a> {
    type Item = &'a Node;

    fn next(&mut self) -> Option<Self::Item> {
        while let Some((id, children_visited)) = self.stack.pop() {
            let node = &self.tree[id];

            if children_visited || node.is_tip() {
                return Some(node);
            }

            self.stack.push((id, true));
            // Reverse, so the leftmost child is processed first
            for &child in node.children().iter().rev() {
                self.stack.push((child, false));
            }
        }
        None
    }
}

/// Iterator for pre-order traversal (parents before children).
pub struct PreOrderIter<'a> {
    tree: &'a Tree,
    stack: Vec<NodeId>,
}

impl<'a> Iterator for PreOrderIter<'a> {
    type Item = &'a Node;

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.stack.pop()?;
        let node = &self.tree[id];
        self.stack.extend(node.children().iter().rev());
        Some(node)
    }
}

#[cfg(test)]
mod tests {
    use crate::newick::{ParseOptions, parse_str, parse_str_with};
    use pretty_assertions::assert_eq;

    #[test]
    fn test_post_order_visits_children_first() {
        let tree = parse_str("((A,B),(C,D,E));").unwrap();
        let order: Vec<_> = tree.post_order_iter().map(|n| n.label()).collect();
        assert_eq!(order, vec!["A", "B", "<1>", "C", "D", "E", "<2>", "<3>"]);
    }

    #[test]
    fn test_pre_order_visits_parents_first() {
        let tree = parse_str("((A,B),(C,D,E));").unwrap();
        let order: Vec<_> = tree.pre_order_iter().map(|n| n.label()).collect();
        assert_eq!(order, vec!["<3>", "<1>", "A", "B", "<2>", "C", "D", "E"]);
    }

    #[test]
    fn test_clade_sets_cover_non_tips() {
        let tree = parse_str("((A,B),(C,D));").unwrap();
        let sets = tree.clade_sets();
        assert_eq!(sets.len(), 3);
        let root_set = &sets.last().unwrap().1;
        assert_eq!(root_set.len(), 4);
    }

    #[test]
    fn test_same_branch_rooted_vs_unrooted() {
        let newick = "((A,B),(C,D));";
        let rooted = parse_str(newick).unwrap();
        let unrooted = parse_str_with(newick, &ParseOptions::default().with_unrooted()).unwrap();

        let ab = rooted.clade_set("<1>").unwrap();
        let cd = rooted.clade_set("<2>").unwrap();
        assert!(!rooted.same_branch(&ab, &cd));
        assert!(unrooted.same_branch(&ab, &cd));
        assert!(rooted.same_branch(&ab, &ab));
    }

    #[test]
    fn test_trivial_splits_only_when_unrooted() {
        let newick = "((A,B),C,D);";
        let rooted = parse_str(newick).unwrap();
        let unrooted = parse_str_with(newick, &ParseOptions::default().with_unrooted()).unwrap();

        let abc = ["A", "B", "C"].into_iter().collect();
        let d = ["D"].into_iter().collect();
        let ab = ["A", "B"].into_iter().collect();
        let abx = ["A", "B", "X"].into_iter().collect();
        assert!(unrooted.is_trivial_split(&abc));
        assert!(unrooted.is_trivial_split(&d));
        assert!(!unrooted.is_trivial_split(&ab));
        assert!(!unrooted.is_trivial_split(&abx));
        assert!(!rooted.is_trivial_split(&abc));
        assert!(unrooted.contains_clade(&abc));
        assert!(!rooted.contains_clade(&abc));
    }

    #[test]
    fn test_root_distance_and_total_length() {
        let tree = parse_str("((A:1,B:2):0.5,C:4):9;").unwrap();
        assert_eq!(tree.root_distance("A").unwrap(), 1.5);
        assert_eq!(tree.root_distance("<2>").unwrap(), 0.0);
        assert_eq!(tree.total_branch_length(), 16.5);
    }

    #[test]
    fn test_unknown_label() {
        let tree = parse_str("(A,B);").unwrap();
        assert!(tree.clade("Z").is_err());
        assert!(tree.ancestor("<9>").is_err());
    }
}
