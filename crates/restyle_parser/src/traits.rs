//! Parser trait definition.

use restyle_tree::{Syntax, Tree};

use crate::ParseError;

/// Options for a single parse.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParseOptions {
    /// Dialect to parse the text as.
    pub syntax: Syntax,
    /// Grammar rule to start parsing from, e.g. `declaration` when the text
    /// is a fragment rather than a whole stylesheet.
    pub rule: Option<String>,
}

impl ParseOptions {
    /// Options for parsing a whole stylesheet in the given dialect.
    pub fn new(syntax: Syntax) -> Self {
        Self { syntax, rule: None }
    }

    /// Sets the start rule.
    pub fn with_rule(mut self, rule: impl Into<String>) -> Self {
        self.rule = Some(rule.into());
        self
    }
}

/// Trait for parsing source text into a [`Tree`].
///
/// The engine treats implementations as a black box: text and dialect in,
/// dialect-tagged tree out. Serialization is `Tree::to_string`, so a parser
/// must build trees whose leaves reproduce the source exactly.
///
/// # Example
///
/// ```rust,ignore
/// use restyle_parser::{ParseError, ParseOptions, Parser};
/// use restyle_tree::{Syntax, Tree};
///
/// struct MyParser;
///
/// impl Parser for MyParser {
///     fn name(&self) -> &str {
///         "my-parser"
///     }
///
///     fn syntaxes(&self) -> &[Syntax] {
///         &[Syntax::Css]
///     }
///
///     fn parse(&self, source: &str, options: &ParseOptions) -> Result<Tree, ParseError> {
///         todo!()
///     }
/// }
/// ```
pub trait Parser: Send + Sync {
    /// Returns the name of this parser.
    fn name(&self) -> &str;

    /// Returns the dialects this parser handles.
    fn syntaxes(&self) -> &[Syntax];

    /// Parses the source text into a tree tagged with `options.syntax`.
    fn parse(&self, source: &str, options: &ParseOptions) -> Result<Tree, ParseError>;

    /// Returns true if this parser can handle the given dialect.
    fn can_parse(&self, syntax: Syntax) -> bool {
        self.syntaxes().contains(&syntax)
    }
}
