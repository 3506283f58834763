//! Newick string writing for [Tree]s.
//!
//! Four styles are supported, see [NewickStyle]. All of them escape labels
//! that would otherwise not be read back unchanged.

use crate::model::node::Node;
use crate::model::{NodeId, Tree};
use crate::parser::utils::escape_label;
use clap::ValueEnum;

/// Extra buffer in Newick string length/capacity estimate
const BUFFER_CHARS: usize = 10;

/// Style for serializing a tree to Newick format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum NewickStyle {
    /// The input form: tip labels, decorations and branch lengths, no
    /// synthetic labels.
    #[default]
    Original,
    /// The input form with the synthetic label of each internal node and the
    /// root written directly after its closing parenthesis, before any
    /// decoration, e.g. `((A:1,B:2)<1>0.9:3,C:4)<2>;`.
    Labeled,
    /// Topology with synthetic labels, no decorations or branch lengths,
    /// e.g. `((A,B)<1>,C)<2>;`.
    LabeledTopology,
    /// Bare topology: tip labels and parentheses only, e.g. `((A,B),C);`.
    Topology,
}

impl NewickStyle {
    fn synthetic_labels(self) -> bool {
        matches!(self, NewickStyle::Labeled | NewickStyle::LabeledTopology)
    }

    fn annotations(self) -> bool {
        matches!(self, NewickStyle::Original | NewickStyle::Labeled)
    }
}

/// Returns the Newick representation of the tree with closing semicolon.
///
/// A tree parsed from a single leaf (`A;`) has a synthetic root with one
/// child. Styles with synthetic labels write that root as `(A)<1>;`; the
/// other styles write the leaf alone, so the result parses again.
///
/// # Example
/// ```
/// use cladekit::newick::{NewickStyle, parse_str, to_newick};
///
/// let tree = parse_str("((A:1,B:2)0.9:3,C:4);").unwrap();
/// assert_eq!(to_newick(&tree, NewickStyle::Original), "((A:1,B:2)0.9:3,C:4);");
/// assert_eq!(to_newick(&tree, NewickStyle::LabeledTopology), "((A,B)<1>,C)<2>;");
/// assert_eq!(to_newick(&tree, NewickStyle::Topology), "((A,B),C);");
/// ```
pub fn to_newick(tree: &Tree, style: NewickStyle) -> String {
    let mut newick = String::with_capacity(estimate_newick_len(tree, style));

    let root = tree.root();
    match root.children() {
        [only] if !style.synthetic_labels() => build_newick(tree, &mut newick, *only, style),
        _ => build_newick(tree, &mut newick, root.id(), style),
    }
    newick.push(';');

    newick
}

/// Appends the subtree below `start` to the Newick string.
///
/// Walks the tree with an explicit stack of `(node, next child)` entries,
/// so deeply nested trees do not exhaust the call stack.
fn build_newick(tree: &Tree, newick: &mut String, start: NodeId, style: NewickStyle) {
    let mut stack: Vec<(NodeId, usize)> = vec![(start, 0)];

    while let Some((id, next_child)) = stack.pop() {
        let node = &tree[id];

        if node.is_tip() {
            newick.push_str(&escape_label(node.label()));
            if style.annotations() {
                push_branch_length(newick, node);
            }
            continue;
        }

        if let Some(&child) = node.children().get(next_child) {
            newick.push(if next_child == 0 { '(' } else { ',' });
            stack.push((id, next_child + 1));
            stack.push((child, 0));
            continue;
        }

        newick.push(')');
        if style.synthetic_labels() {
            newick.push_str(node.label());
        }
        if style.annotations() {
            if let Some(decoration) = node.decoration() {
                newick.push_str(&escape_label(decoration.as_str()));
            }
            push_branch_length(newick, node);
        }
    }
}

fn push_branch_length(newick: &mut String, node: &Node) {
    if let Some(branch_length) = node.branch_length() {
        newick.push(':');
        newick.push_str(branch_length.as_str());
    }
}

/// Estimates the length of the Newick string of a tree, used to
/// pre-allocate the output.
fn estimate_newick_len(tree: &Tree, style: NewickStyle) -> usize {
    tree.nodes()
        .iter()
        .map(|node| {
            let mut len = node.label().len() + 2;
            if style.annotations() {
                len += node.branch_length().map_or(0, |bl| bl.as_str().len() + 1);
                len += node.decoration().map_or(0, |d| d.as_str().len());
            }
            len
        })
        .sum::<usize>()
        + BUFFER_CHARS
}
