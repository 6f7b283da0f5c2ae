//! Seam between the engine and the parser.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::debug;

use restyle_parser::{ParseOptions, Parser, TokenParser};
use restyle_tree::{Position, Syntax, Tree};

use crate::SyntaxError;

/// Options for a single string operation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StringOptions {
    /// Dialect of the text. Plain CSS when unset.
    pub syntax: Option<Syntax>,
    /// File the text came from. Stamped on diagnostics and syntax errors.
    pub filename: Option<PathBuf>,
    /// Grammar rule to start parsing from.
    pub context: Option<String>,
}

impl StringOptions {
    /// Creates options for plain CSS with no filename.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the dialect.
    pub fn with_syntax(mut self, syntax: Syntax) -> Self {
        self.syntax = Some(syntax);
        self
    }

    /// Sets the filename.
    pub fn with_filename(mut self, filename: impl Into<PathBuf>) -> Self {
        self.filename = Some(filename.into());
        self
    }

    /// Sets the start rule.
    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context = Some(context.into());
        self
    }

    /// The dialect to parse as.
    pub fn syntax(&self) -> Syntax {
        self.syntax.unwrap_or_default()
    }

    /// The filename, if any.
    pub fn filename(&self) -> Option<&Path> {
        self.filename.as_deref()
    }
}

/// Turns text into trees and back.
#[derive(Clone)]
pub struct TreeAdapter {
    parser: Arc<dyn Parser>,
}

impl TreeAdapter {
    /// Creates an adapter over the given parser.
    pub fn new(parser: Arc<dyn Parser>) -> Self {
        Self { parser }
    }

    /// The underlying parser.
    pub fn parser(&self) -> &dyn Parser {
        self.parser.as_ref()
    }

    /// Parses text under the requested dialect.
    pub fn parse(&self, text: &str, options: &StringOptions) -> Result<Tree, SyntaxError> {
        let mut parse_options = ParseOptions::new(options.syntax());
        if let Some(context) = &options.context {
            parse_options = parse_options.with_rule(context.as_str());
        }

        debug!(
            "Parsing {} bytes as {} with '{}'",
            text.len(),
            parse_options.syntax,
            self.parser.name()
        );

        self.parser.parse(text, &parse_options).map_err(|e| {
            let mut err = SyntaxError::new(e.to_string());
            if let Some(offset) = e.offset() {
                err = err.with_position(Position::from_offset(text, offset as u32));
            }
            if let Some(filename) = options.filename() {
                err = err.with_filename(filename);
            }
            err
        })
    }

    /// Serializes a tree back to text.
    pub fn serialize(&self, tree: &Tree) -> String {
        tree.to_string()
    }
}

impl Default for TreeAdapter {
    fn default() -> Self {
        Self::new(Arc::new(TokenParser::new()))
    }
}

impl std::fmt::Debug for TreeAdapter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TreeAdapter")
            .field("parser", &self.parser.name())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    #[rstest]
    #[case::css("a { color: red; }\n", Syntax::Css)]
    #[case::scss("// x\n.a { &:hover { b: c } }", Syntax::Scss)]
    #[case::less("@x: 1px;\n.a { .mixin(); }", Syntax::Less)]
    #[case::empty("", Syntax::Css)]
    fn test_serialize_parse_identity(#[case] text: &str, #[case] syntax: Syntax) {
        let adapter = TreeAdapter::default();
        let tree = adapter
            .parse(text, &StringOptions::new().with_syntax(syntax))
            .unwrap();

        assert_eq!(tree.syntax(), syntax);
        assert_eq!(adapter.serialize(&tree), text);
    }

    #[test]
    fn test_default_syntax_is_css() {
        let adapter = TreeAdapter::default();
        let tree = adapter.parse("a{}", &StringOptions::new()).unwrap();
        assert_eq!(tree.syntax(), Syntax::Css);
    }

    #[test]
    fn test_syntax_error_carries_filename_and_position() {
        let adapter = TreeAdapter::default();
        let options = StringOptions::new().with_filename("src/a.css");
        let err = adapter.parse("a {\n  b: c;\n", &options).unwrap_err();

        assert_eq!(err.message, "Unclosed '{'");
        assert_eq!(err.filename.as_deref(), Some(Path::new("src/a.css")));
        assert_eq!(err.position, Some(Position::new(1, 2)));
        assert!(err.to_string().starts_with("src/a.css\nUnclosed '{'"));
    }

    #[test]
    fn test_context_is_forwarded() {
        let adapter = TreeAdapter::default();

        let ok = StringOptions::new().with_context("declaration");
        assert!(adapter.parse("color: red", &ok).is_ok());

        let unknown = StringOptions::new().with_context("nope");
        let err = adapter.parse("color: red", &unknown).unwrap_err();
        assert!(err.message.starts_with("Unsupported"));
        assert!(err.position.is_none());
    }
}
