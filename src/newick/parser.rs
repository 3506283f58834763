//! Structs and logic to parse Newick strings.
//!
//! This module provides the [NewickParser] struct, which drives a
//! [TreeBuilder] in a single left-to-right pass. Open parentheses are kept on
//! an explicit stack rather than the call stack, so caterpillar trees with
//! many thousands of tips parse like any other. Every closing parenthesis
//! completes one node; builders number these nodes to obtain the synthetic
//! labels `<1>`, `<2>`, ...

use crate::model::node::{BranchLength, NodeId};
use crate::model::tree_builder::TreeBuilder;
use crate::model::NodeTableBuilder;
use crate::newick::defs::{DEFAULT_NUM_TIPS_GUESS, NEWICK_LABEL_DELIMITERS};
use crate::newick::options::ParseOptions;
use crate::parser::byte_parser::ByteParser;
use crate::parser::parsing_error::{ParsingError, ParsingErrorType};
use log::debug;

// =#========================================================================#=
// NEWICK PARSER
// =#========================================================================$=
/// Parser (configuration) for single Newick strings.
///
/// Generic over [TreeBuilder] (construction).
///
/// # Construction
/// * [`new(tree_builder, options)`](Self::new) - generic constructor
/// * [`new_defaults()`](NewickParser::new_defaults) - uses a
///   [NodeTableBuilder] and default [ParseOptions]
/// * [`with_options(options)`](NewickParser::with_options) - uses a
///   [NodeTableBuilder] and the given options
///
/// # Configuration
/// * [`with_num_tips(num_tips)`](Self::with_num_tips)
///     - Can be configured with number of tips in trees to parse,
///       otherwise it is inferred from the first parsed tree.
///
/// # Example
/// ```
/// use cladekit::newick::NewickParser;
///
/// let mut parser = NewickParser::new_defaults();
/// let tree = parser.parse_str("((A:1.0,B:1.0)95:0.5,C:1.5);").unwrap();
/// assert_eq!(tree.num_tips(), 3);
/// assert_eq!(tree.get("<1>").unwrap().support(), Some("95"));
/// ```
pub struct NewickParser<T: TreeBuilder> {
    know_num_tips: bool,
    num_tips: usize,
    tips_in_tree: usize,
    closed_in_tree: usize,
    tree_builder: T,
    options: ParseOptions,
}

// ============================================================================
// Construction & Configuration (pub)
// ============================================================================
impl<T: TreeBuilder> NewickParser<T> {
    /// Creates a new [NewickParser] with the given tree builder and options.
    pub fn new(tree_builder: T, options: ParseOptions) -> Self {
        Self {
            know_num_tips: false,
            num_tips: DEFAULT_NUM_TIPS_GUESS,
            tips_in_tree: 0,
            closed_in_tree: 0,
            tree_builder,
            options,
        }
    }

    /// Sets the expected number of tips in each parsed tree.
    ///
    /// This allows pre-allocation of the node table.
    pub fn with_num_tips(mut self, num_tips: usize) -> Self {
        self.num_tips = num_tips;
        self.know_num_tips = true;
        self
    }

    /// Returns the options this parser was configured with.
    pub fn options(&self) -> &ParseOptions {
        &self.options
    }

    /// Consumes the parser and returns the tree builder.
    pub fn into_builder(self) -> T {
        self.tree_builder
    }
}

impl NewickParser<NodeTableBuilder> {
    /// Creates a new [NewickParser] building [Tree](crate::model::Tree)s
    /// with default options.
    pub fn new_defaults() -> Self {
        Self::with_options(ParseOptions::default())
    }

    /// Creates a new [NewickParser] building [Tree](crate::model::Tree)s
    /// with the given options.
    pub fn with_options(options: ParseOptions) -> Self {
        let builder = NodeTableBuilder::new(&options);
        Self::new(builder, options)
    }
}

impl Default for NewickParser<NodeTableBuilder> {
    fn default() -> Self {
        Self::new_defaults()
    }
}

// ============================================================================
// API Parsing (pub)
// ============================================================================
impl<T: TreeBuilder> NewickParser<T> {
    /// Parses a single Newick tree.
    ///
    /// Whitespace and comments around the tree are ignored. A missing
    /// terminating `;` is accepted unless the parser was configured with a
    /// strict terminator.
    ///
    /// # Returns
    /// * `Ok(T::Tree)` - The parsed tree
    /// * `Err(ParsingError)` - If the Newick string is malformed
    pub fn parse_str(&mut self, newick: &str) -> Result<T::Tree, ParsingError> {
        if newick.trim().is_empty() {
            return Err(ParsingError::without_context(ParsingErrorType::EmptyInput));
        }
        let mut parser = ByteParser::for_str(newick);

        self.tree_builder.init_next(self.num_tips);
        self.tips_in_tree = 0;
        self.closed_in_tree = 0;

        self.parse_root(&mut parser)?;

        let tree = self.tree_builder.finish_tree().ok_or_else(|| {
            ParsingError::without_context(ParsingErrorType::InvalidNewickString(
                "no root was completed".to_string(),
            ))
        })?;

        debug!(
            "parsed tree with {} tips and {} synthetic labels from {} bytes",
            self.tips_in_tree,
            self.closed_in_tree,
            newick.len()
        );

        // If number of tips not known yet, take it from the first tree
        if !self.know_num_tips {
            self.num_tips = self.tips_in_tree;
            self.know_num_tips = true;
        }

        Ok(tree)
    }
}

// ============================================================================
// Parsing
// ============================================================================
impl<T: TreeBuilder> NewickParser<T> {
    /// Parses the root of the tree and adds it:
    /// - `(children)[decoration][:branch_length];`, or
    /// - `label[:branch_length];`, in which case the single tip is wrapped
    ///   in a synthetic root.
    fn parse_root(&mut self, parser: &mut ByteParser) -> Result<(), ParsingError> {
        parser.skip_comment_and_whitespace()?;

        if parser.peek_is(b'(') {
            let children = self.parse_children(parser)?;
            let decoration = self.parse_decoration(parser)?;
            let branch_length = self.parse_branch_length(parser)?;
            self.parse_terminator(parser)?;
            self.tree_builder
                .add_root(children, decoration, branch_length);
            self.closed_in_tree += 1;
        } else {
            let tip = self.parse_tip(parser)?;
            self.parse_terminator(parser)?;
            self.tree_builder.add_root(vec![tip], None, None);
            self.closed_in_tree += 1;
        }

        Ok(())
    }

    /// Consumes the terminating `;` and checks that nothing but whitespace
    /// and comments follow.
    fn parse_terminator(&mut self, parser: &mut ByteParser) -> Result<(), ParsingError> {
        parser.skip_comment_and_whitespace()?;

        if parser.is_eof() {
            if self.options.strict_terminator() {
                return Err(ParsingError::from_parser(
                    ParsingErrorType::MissingTerminator,
                    parser,
                ));
            }
            debug!("accepting tree without terminating ';'");
            return Ok(());
        }

        if parser.peek_is(b')') {
            return Err(ParsingError::unbalanced(
                parser,
                "unmatched ')'".to_string(),
            ));
        }

        if !parser.consume_if(b';') {
            let next_char = parser.peek().map(char::from);
            return Err(ParsingError::invalid_newick_string(
                parser,
                format!("Expected ';' at end of tree but found {:?}", next_char),
            ));
        }

        parser.skip_comment_and_whitespace()?;
        if !parser.is_eof() {
            return Err(ParsingError::from_parser(
                ParsingErrorType::TrailingContent,
                parser,
            ));
        }

        Ok(())
    }

    /// Parses a parenthesized, comma-separated list of at least two children
    /// and returns their ids in input order.
    ///
    /// Nested internal nodes are completed on an explicit stack of open
    /// child lists, so the nesting depth is bounded by memory only.
    ///
    /// Expects parser at opening `(`.
    fn parse_children(&mut self, parser: &mut ByteParser) -> Result<Vec<NodeId>, ParsingError> {
        if !parser.consume_if(b'(') {
            let next_char = parser.peek().map(char::from);
            return Err(ParsingError::invalid_newick_string(
                parser,
                format!("Expected '(' before children but found {:?}", next_char),
            ));
        }

        // Child lists of the enclosing, still open nodes
        let mut open: Vec<Vec<NodeId>> = Vec::new();
        let mut current: Vec<NodeId> = Vec::with_capacity(2);

        loop {
            parser.skip_comment_and_whitespace()?;
            if parser.consume_if(b'(') {
                open.push(std::mem::replace(&mut current, Vec::with_capacity(2)));
                continue;
            }
            current.push(self.parse_tip(parser)?);

            // Consume separators, closing as many nodes as end here
            loop {
                parser.skip_comment_and_whitespace()?;
                match parser.peek() {
                    Some(b',') => {
                        parser.next_byte();
                        break;
                    }
                    Some(b')') => {
                        parser.next_byte();
                        if current.len() < 2 {
                            return Err(ParsingError::from_parser(
                                ParsingErrorType::TooFewChildren(current.len()),
                                parser,
                            ));
                        }
                        let Some(parent) = open.pop() else {
                            return Ok(current);
                        };
                        let children = std::mem::replace(&mut current, parent);
                        current.push(self.close_internal(parser, children)?);
                    }
                    Some(b';') | None => {
                        return Err(ParsingError::unbalanced(
                            parser,
                            "missing ')'".to_string(),
                        ));
                    }
                    Some(other) => {
                        return Err(ParsingError::invalid_newick_string(
                            parser,
                            format!(
                                "Expected ',' or ')' after child but found {:?}",
                                char::from(other)
                            ),
                        ));
                    }
                }
            }
        }
    }

    /// Reads `[decoration][:branch_length]` after the closing parenthesis of
    /// an internal node, adds the node, and returns its id.
    fn close_internal(
        &mut self,
        parser: &mut ByteParser,
        children: Vec<NodeId>,
    ) -> Result<NodeId, ParsingError> {
        let decoration = self.parse_decoration(parser)?;
        let branch_length = self.parse_branch_length(parser)?;
        self.closed_in_tree += 1;
        Ok(self
            .tree_builder
            .add_internal(children, decoration, branch_length))
    }

    /// Parses a tip `label[:branch_length]`, adds it, and returns its id.
    fn parse_tip(&mut self, parser: &mut ByteParser) -> Result<NodeId, ParsingError> {
        let label = parser.parse_label(NEWICK_LABEL_DELIMITERS)?;
        if label.is_empty() {
            return Err(if parser.is_eof() {
                ParsingError::unexpected_eof(parser)
            } else {
                ParsingError::from_parser(ParsingErrorType::EmptyLabel, parser)
            });
        }

        let branch_length = self.parse_branch_length(parser)?;
        self.tips_in_tree += 1;

        self.tree_builder
            .add_tip(label, branch_length)
            .map_err(|kind| ParsingError::from_parser(kind, parser))
    }

    /// Parses the optional text following a closing parenthesis.
    fn parse_decoration(&mut self, parser: &mut ByteParser) -> Result<Option<String>, ParsingError> {
        let decoration = parser.parse_label(NEWICK_LABEL_DELIMITERS)?;
        Ok((!decoration.is_empty()).then_some(decoration))
    }

    /// Parses optional branch length `[:number]`:
    /// - Skips comments/whitespace before and after `:`
    /// - Supports sign and scientific notation (e.g., `-1.5e-10`)
    /// - Keeps the token as text
    ///
    /// # Returns
    /// - `Ok(Some(branch_length))` if a well-formed branch length was found
    /// - `Ok(None)` if no `:` follows
    /// - [ParsingError] if `:` is not followed by a well-formed number
    fn parse_branch_length(
        &mut self,
        parser: &mut ByteParser,
    ) -> Result<Option<BranchLength>, ParsingError> {
        parser.skip_comment_and_whitespace()?;
        if !parser.consume_if(b':') {
            return Ok(None);
        }
        parser.skip_comment_and_whitespace()?;

        let token = parser.parse_numeral_token();
        BranchLength::parse(token)
            .map(Some)
            .ok_or_else(|| ParsingError::invalid_branch_length(parser, token))
    }
}
