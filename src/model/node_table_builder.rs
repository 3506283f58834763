//! Builder producing a [Tree] node table.

use crate::model::node::{
    BranchLength, Decoration, Node, NodeId, NodeType, is_synthetic_label, synthetic_label,
};
use crate::model::tree::Tree;
use crate::model::tree_builder::TreeBuilder;
use crate::newick::{DecorationMode, ParseOptions};
use crate::parser::ParsingErrorType;
use log::trace;
use std::collections::HashMap;

// =#========================================================================#=
// NODE TABLE BUILDER
// =#========================================================================$=
/// Builder for [Tree] implementing [TreeBuilder].
///
/// Assigns synthetic labels `<k>` in the order internal nodes and the root
/// are added, i.e. in the order their closing parentheses appear.
#[derive(Debug)]
pub struct NodeTableBuilder {
    assume_rooted: bool,
    decoration: DecorationMode,
    nodes: Vec<Node>,
    index: HashMap<String, NodeId>,
    num_closed: usize,
    root: Option<NodeId>,
}

impl NodeTableBuilder {
    /// Creates a new builder using the given options.
    pub fn new(options: &ParseOptions) -> Self {
        Self {
            assume_rooted: options.assume_rooted(),
            decoration: options.decoration(),
            nodes: Vec::new(),
            index: HashMap::new(),
            num_closed: 0,
            root: None,
        }
    }

    fn interpret(&self, decoration: Option<String>) -> Option<Decoration> {
        let text = decoration.filter(|text| !text.is_empty())?;
        Some(match self.decoration {
            DecorationMode::Support => Decoration::Support(text),
            DecorationMode::Name => Decoration::Name(text),
            DecorationMode::Infer => {
                let numeric = text.bytes().any(|b| b.is_ascii_digit());
                if numeric && text.parse::<f64>().is_ok() {
                    Decoration::Support(text)
                } else {
                    Decoration::Name(text)
                }
            }
        })
    }

    fn add_closed(
        &mut self,
        node_type: NodeType,
        children: Vec<NodeId>,
        decoration: Option<String>,
        branch_length: Option<BranchLength>,
    ) -> NodeId {
        self.num_closed += 1;
        let id = self.nodes.len();
        let label = synthetic_label(self.num_closed);
        trace!("assigned {label} to {node_type} node with {} children", children.len());

        for &child in &children {
            self.nodes[child].parent = Some(id);
        }

        let decoration = self.interpret(decoration);
        self.index.insert(label.clone(), id);
        self.nodes.push(Node {
            id,
            label,
            node_type,
            parent: None,
            children,
            branch_length,
            decoration,
        });
        id
    }
}

impl Default for NodeTableBuilder {
    fn default() -> Self {
        Self::new(&ParseOptions::default())
    }
}

impl TreeBuilder for NodeTableBuilder {
    type Tree = Tree;

    fn init_next(&mut self, num_tips: usize) {
        let capacity = 2 * num_tips.max(1);
        self.nodes = Vec::with_capacity(capacity);
        self.index = HashMap::with_capacity(capacity);
        self.num_closed = 0;
        self.root = None;
    }

    fn add_tip(
        &mut self,
        label: String,
        branch_length: Option<BranchLength>,
    ) -> Result<NodeId, ParsingErrorType> {
        if label.is_empty() {
            return Err(ParsingErrorType::EmptyLabel);
        }
        if is_synthetic_label(&label) {
            return Err(ParsingErrorType::LabelCollision(label));
        }
        if self.index.contains_key(&label) {
            return Err(ParsingErrorType::DuplicateTipLabel(label));
        }

        let id = self.nodes.len();
        self.index.insert(label.clone(), id);
        self.nodes.push(Node {
            id,
            label,
            node_type: NodeType::Tip,
            parent: None,
            children: Vec::new(),
            branch_length,
            decoration: None,
        });
        Ok(id)
    }

    fn add_internal(
        &mut self,
        children: Vec<NodeId>,
        decoration: Option<String>,
        branch_length: Option<BranchLength>,
    ) -> NodeId {
        self.add_closed(NodeType::Internal, children, decoration, branch_length)
    }

    fn add_root(
        &mut self,
        children: Vec<NodeId>,
        decoration: Option<String>,
        branch_length: Option<BranchLength>,
    ) -> NodeId {
        let id = self.add_closed(NodeType::Root, children, decoration, branch_length);
        self.root = Some(id);
        id
    }

    fn finish_tree(&mut self) -> Option<Tree> {
        let root = self.root.take()?;
        let nodes = std::mem::take(&mut self.nodes);
        let index = std::mem::take(&mut self.index);
        self.num_closed = 0;
        Some(Tree::from_parts(nodes, index, root, self.assume_rooted))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_cherry() {
        let mut builder = NodeTableBuilder::default();
        builder.init_next(2);
        let a = builder.add_tip("A".to_string(), None).unwrap();
        let b = builder.add_tip("B".to_string(), None).unwrap();
        let root = builder.add_root(vec![a, b], None, None);
        let tree = builder.finish_tree().unwrap();

        assert_eq!(tree.root_label(), "<1>");
        assert_eq!(tree[root].children(), &[a, b]);
        assert_eq!(tree[a].parent(), Some(root));
        assert!(tree.is_valid());
    }

    #[test]
    fn test_rejects_duplicate_and_synthetic_labels() {
        let mut builder = NodeTableBuilder::default();
        builder.init_next(2);
        builder.add_tip("A".to_string(), None).unwrap();
        assert_eq!(
            builder.add_tip("A".to_string(), None),
            Err(ParsingErrorType::DuplicateTipLabel("A".to_string()))
        );
        assert_eq!(
            builder.add_tip("<1>".to_string(), None),
            Err(ParsingErrorType::LabelCollision("<1>".to_string()))
        );
    }

    #[test]
    fn test_decoration_modes() {
        let options = ParseOptions::default();
        let builder = NodeTableBuilder::new(&options);
        assert_eq!(
            builder.interpret(Some("95".to_string())),
            Some(Decoration::Support("95".to_string()))
        );
        assert_eq!(
            builder.interpret(Some("Aves".to_string())),
            Some(Decoration::Name("Aves".to_string()))
        );
        assert_eq!(builder.interpret(Some(String::new())), None);

        let builder =
            NodeTableBuilder::new(&options.clone().with_decoration(DecorationMode::Name));
        assert_eq!(
            builder.interpret(Some("95".to_string())),
            Some(Decoration::Name("95".to_string()))
        );

        let builder = NodeTableBuilder::new(&options.with_decoration(DecorationMode::Support));
        assert_eq!(
            builder.interpret(Some("Aves".to_string())),
            Some(Decoration::Support("Aves".to_string()))
        );
    }

    #[test]
    fn test_finish_without_root_is_none() {
        let mut builder = NodeTableBuilder::default();
        builder.init_next(1);
        builder.add_tip("A".to_string(), None).unwrap();
        assert!(builder.finish_tree().is_none());
    }
}
