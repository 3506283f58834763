//! Node module for the node table of a parsed tree.

use std::fmt;

/// Index of a node in a tree (arena).
pub type NodeId = usize;

/// Text used for absent values in flat records.
pub const NA: &str = "NA";

// =#========================================================================#=
// NODE TYPE
// =#========================================================================#=
/// Role of a node in the tree.
#[derive(PartialEq, Eq, Debug, Clone, Copy, Hash)]
pub enum NodeType {
    /// Leaf carrying an input label
    Tip,
    /// Non-root node closed by a `)`
    Internal,
    /// The single outermost node
    Root,
}

impl NodeType {
    /// Returns the lower-case name used in records (`tip`, `internal`, `root`).
    pub fn as_str(&self) -> &'static str {
        match self {
            NodeType::Tip => "tip",
            NodeType::Internal => "internal",
            NodeType::Root => "root",
        }
    }
}

impl fmt::Display for NodeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =#========================================================================#=
// BRANCH LENGTH
// =#========================================================================#=
/// Branch length as written in the input.
///
/// The original token is kept so that values like `1.23e-5` or `0.100`
/// are reproduced exactly; conversion to `f64` happens only on demand.
#[derive(PartialEq, Debug, Clone)]
pub struct BranchLength(String);

impl BranchLength {
    /// Creates a branch length from its textual token.
    ///
    /// # Returns
    /// `None` if the token is not a well-formed (optionally signed, possibly
    /// scientific) decimal number.
    ///
    /// # Example
    /// ```
    /// use cladekit::model::BranchLength;
    ///
    /// let bl = BranchLength::parse("1.23e-5").unwrap();
    /// assert_eq!(bl.as_str(), "1.23e-5");
    /// assert!(BranchLength::parse("1.2.3").is_none());
    /// assert!(BranchLength::parse("").is_none());
    /// ```
    pub fn parse(token: &str) -> Option<Self> {
        let well_formed = !token.is_empty()
            && token.bytes().any(|b| b.is_ascii_digit())
            && token.parse::<f64>().is_ok();
        well_formed.then(|| BranchLength(token.to_string()))
    }

    /// Returns the original text of this branch length.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns the numeric value of this branch length.
    ///
    /// Numerals beyond the `f64` range give an infinite value; the text
    /// itself is still kept as written.
    pub fn value(&self) -> f64 {
        // Validated in `parse`
        self.0.parse().unwrap_or(f64::NAN)
    }
}

impl fmt::Display for BranchLength {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// =#========================================================================#=
// DECORATION
// =#========================================================================#=
/// Text attached after a closing parenthesis, before any branch length.
///
/// Whether it is read as a clade support value or as an internal node name
/// depends on the [DecorationMode](crate::newick::DecorationMode) the tree
/// was parsed with.
#[derive(PartialEq, Debug, Clone)]
pub enum Decoration {
    /// Clade support value, e.g. a bootstrap proportion
    Support(String),
    /// Internal node name
    Name(String),
}

impl Decoration {
    /// Returns the decoration text regardless of its interpretation.
    pub fn as_str(&self) -> &str {
        match self {
            Decoration::Support(text) | Decoration::Name(text) => text,
        }
    }
}

// =#========================================================================#=
// NODE
// =#========================================================================#=
/// A node in the node table.
///
/// # Invariants
/// - `label` is the verbatim tip label for tips and `<k>` for all others
/// - only the root has no parent
/// - tips have no children and no decoration
#[derive(PartialEq, Debug, Clone)]
pub struct Node {
    pub(crate) id: NodeId,
    pub(crate) label: String,
    pub(crate) node_type: NodeType,
    pub(crate) parent: Option<NodeId>,
    pub(crate) children: Vec<NodeId>,
    pub(crate) branch_length: Option<BranchLength>,
    pub(crate) decoration: Option<Decoration>,
}

impl Node {
    /// Returns the arena index of this node.
    pub fn id(&self) -> NodeId {
        self.id
    }

    /// Returns the label identifying this node.
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Returns the role of this node.
    pub fn node_type(&self) -> NodeType {
        self.node_type
    }

    /// Returns whether this node is a tip.
    pub fn is_tip(&self) -> bool {
        self.node_type == NodeType::Tip
    }

    /// Returns whether this node is an internal (non-root) node.
    pub fn is_internal(&self) -> bool {
        self.node_type == NodeType::Internal
    }

    /// Returns whether this node is the root.
    pub fn is_root(&self) -> bool {
        self.node_type == NodeType::Root
    }

    /// Returns the parent, or `None` for the root.
    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    /// Returns the children in input order.
    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    /// Returns the branch length of the edge above this node, if given.
    pub fn branch_length(&self) -> Option<&BranchLength> {
        self.branch_length.as_ref()
    }

    /// Returns the decoration (support value or name), if given.
    pub fn decoration(&self) -> Option<&Decoration> {
        self.decoration.as_ref()
    }

    /// Returns the support value, if the decoration was read as one.
    pub fn support(&self) -> Option<&str> {
        match &self.decoration {
            Some(Decoration::Support(text)) => Some(text),
            _ => None,
        }
    }

    /// Returns the internal node name, if the decoration was read as one.
    pub fn name(&self) -> Option<&str> {
        match &self.decoration {
            Some(Decoration::Name(text)) => Some(text),
            _ => None,
        }
    }
}

/// Returns whether `label` has the form of a synthetic internal label `<digits>`.
///
/// # Example
/// ```
/// use cladekit::model::node::is_synthetic_label;
///
/// assert!(is_synthetic_label("<12>"));
/// assert!(!is_synthetic_label("<>"));
/// assert!(!is_synthetic_label("<1a>"));
/// assert!(!is_synthetic_label("A"));
/// ```
pub fn is_synthetic_label(label: &str) -> bool {
    label
        .strip_prefix('<')
        .and_then(|rest| rest.strip_suffix('>'))
        .is_some_and(|digits| !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit()))
}

/// Formats the synthetic label for the `k`-th closing parenthesis.
pub fn synthetic_label(k: usize) -> String {
    format!("<{k}>")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_branch_length_keeps_text() {
        let bl = BranchLength::parse("0.100").unwrap();
        assert_eq!(bl.as_str(), "0.100");
        assert_eq!(bl.value(), 0.1);
        assert_eq!(bl.to_string(), "0.100");
    }

    #[test]
    fn test_branch_length_signed_and_scientific() {
        assert_eq!(BranchLength::parse("-2").unwrap().value(), -2.0);
        assert_eq!(BranchLength::parse("+1.5E+3").unwrap().value(), 1500.0);
        assert!(BranchLength::parse("e").is_none());
        assert!(BranchLength::parse("-").is_none());
        let huge = BranchLength::parse("1e999").unwrap();
        assert_eq!(huge.as_str(), "1e999");
        assert_eq!(huge.value(), f64::INFINITY);
        assert_eq!(BranchLength::parse("-1e400").unwrap().value(), f64::NEG_INFINITY);
    }

    #[test]
    fn test_node_type_names() {
        assert_eq!(NodeType::Tip.to_string(), "tip");
        assert_eq!(NodeType::Internal.to_string(), "internal");
        assert_eq!(NodeType::Root.to_string(), "root");
    }

    #[test]
    fn test_synthetic_label_round_trip() {
        assert!(is_synthetic_label(&synthetic_label(7)));
        assert_eq!(synthetic_label(7), "<7>");
    }
}
