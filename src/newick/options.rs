//! Parser configuration.

use clap::ValueEnum;

/// How the text after a closing parenthesis is interpreted.
///
/// Newick does not distinguish between clade support values and internal
/// node names; both are written as `)<text>`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum DecorationMode {
    /// Numeric text is a support value, anything else a node name.
    #[default]
    Infer,
    /// Always a support value.
    Support,
    /// Always an internal node name.
    Name,
}

/// Options controlling how Newick strings are parsed and how the resulting
/// trees compare clades.
///
/// # Example
/// ```
/// use cladekit::newick::{DecorationMode, ParseOptions};
///
/// let options = ParseOptions::default()
///     .with_unrooted()
///     .with_decoration(DecorationMode::Name)
///     .with_strict_terminator();
/// assert!(!options.assume_rooted());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseOptions {
    assume_rooted: bool,
    decoration: DecorationMode,
    strict_terminator: bool,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            assume_rooted: true,
            decoration: DecorationMode::Infer,
            strict_terminator: false,
        }
    }
}

impl ParseOptions {
    /// Treats parsed trees as unrooted: a clade also matches its complement.
    ///
    /// Rootedness is never inferred from the number of children at the root.
    pub fn with_unrooted(mut self) -> Self {
        self.assume_rooted = false;
        self
    }

    /// Sets whether parsed trees are treated as rooted.
    pub fn with_rooted(mut self, assume_rooted: bool) -> Self {
        self.assume_rooted = assume_rooted;
        self
    }

    /// Sets the interpretation of text following a closing parenthesis.
    pub fn with_decoration(mut self, decoration: DecorationMode) -> Self {
        self.decoration = decoration;
        self
    }

    /// Makes a missing terminating `;` an error instead of appending one.
    pub fn with_strict_terminator(mut self) -> Self {
        self.strict_terminator = true;
        self
    }

    /// Returns whether trees are treated as rooted.
    pub fn assume_rooted(&self) -> bool {
        self.assume_rooted
    }

    /// Returns the decoration interpretation.
    pub fn decoration(&self) -> DecorationMode {
        self.decoration
    }

    /// Returns whether a missing `;` is an error.
    pub fn strict_terminator(&self) -> bool {
        self.strict_terminator
    }
}
