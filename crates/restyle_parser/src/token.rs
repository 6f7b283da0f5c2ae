//! Lossless token parser.
//!
//! This parser knows nothing about selectors, declarations or at-rules. It
//! splits the source into whitespace, comment, string, punctuation and word
//! tokens, and nests tokens between matching brackets into block nodes. That
//! is enough structure for plugins that rewrite spacing or reorder tokens,
//! and it keeps every byte of the source so serialization is exact.

use restyle_tree::{Node, NodeKind, Span, Syntax, Tree};

use crate::{ParseError, ParseOptions, Parser};

/// Start rules the token parser accepts. The token grammar is the same for
/// all of them.
const KNOWN_RULES: &[&str] = &[
    "stylesheet",
    "ruleset",
    "selector",
    "block",
    "declaration",
    "property",
    "value",
    "atrule",
];

/// Lossless token parser for every known dialect.
pub struct TokenParser;

impl TokenParser {
    /// Creates a new token parser.
    pub fn new() -> Self {
        Self
    }
}

impl Default for TokenParser {
    fn default() -> Self {
        Self::new()
    }
}

impl Parser for TokenParser {
    fn name(&self) -> &str {
        "token"
    }

    fn syntaxes(&self) -> &[Syntax] {
        &Syntax::ALL
    }

    fn parse(&self, source: &str, options: &ParseOptions) -> Result<Tree, ParseError> {
        if let Some(rule) = &options.rule
            && !KNOWN_RULES.contains(&rule.as_str())
        {
            return Err(ParseError::unsupported(format!("start rule '{}'", rule)));
        }

        let root = Tokenizer::new(source, options.syntax).run()?;
        Ok(Tree::new(options.syntax, root))
    }
}

/// An open bracket whose block is still being collected.
struct Frame {
    open: u8,
    start: usize,
    children: Vec<Node>,
}

struct Tokenizer<'s> {
    source: &'s str,
    bytes: &'s [u8],
    syntax: Syntax,
    pos: usize,
    root: Vec<Node>,
    stack: Vec<Frame>,
}

impl<'s> Tokenizer<'s> {
    fn new(source: &'s str, syntax: Syntax) -> Self {
        Self {
            source,
            bytes: source.as_bytes(),
            syntax,
            pos: 0,
            root: Vec::new(),
            stack: Vec::new(),
        }
    }

    fn run(mut self) -> Result<Node, ParseError> {
        while self.pos < self.bytes.len() {
            let start = self.pos;
            match self.bytes[start] {
                b if is_space(b) => {
                    self.pos = self.scan_while(start, is_space);
                    self.push_leaf(NodeKind::Whitespace, start);
                }
                b'/' if self.peek(start + 1) == Some(b'*') => self.block_comment(start)?,
                b'/' if self.peek(start + 1) == Some(b'/') && self.allows_line_comment(start) => {
                    self.pos = self.scan_while(start, |b| b != b'\n');
                    self.push_leaf(NodeKind::Comment, start);
                }
                quote @ (b'"' | b'\'') => self.string(start, quote)?,
                open @ (b'{' | b'(' | b'[') => {
                    let is_url = open == b'(' && self.follows_url(start);
                    self.pos = start + 1;
                    let bracket = self.leaf(NodeKind::Punctuation, start);
                    self.stack.push(Frame {
                        open,
                        start,
                        children: vec![bracket],
                    });
                    if is_url {
                        self.url_body(start)?;
                    }
                }
                close @ (b'}' | b')' | b']') => self.close(start, close)?,
                b if is_punctuation(b) => {
                    self.pos = start + 1;
                    self.push_leaf(NodeKind::Punctuation, start);
                }
                _ => {
                    self.pos = self.scan_word(start);
                    self.push_leaf(NodeKind::Word, start);
                }
            }
        }

        if let Some(frame) = self.stack.last() {
            return Err(ParseError::invalid_source_at(
                format!("Unclosed '{}'", frame.open as char),
                frame.start,
            ));
        }

        Ok(Node::new_parent(
            NodeKind::Root,
            Span::new(0, self.bytes.len() as u32),
            self.root,
        ))
    }

    fn peek(&self, at: usize) -> Option<u8> {
        self.bytes.get(at).copied()
    }

    fn scan_while(&self, from: usize, pred: impl Fn(u8) -> bool) -> usize {
        self.bytes[from..]
            .iter()
            .position(|b| !pred(*b))
            .map_or(self.bytes.len(), |idx| from + idx)
    }

    /// Ends a word at the next delimiter. A backslash escapes the character
    /// after it, so `.a\{b` is a single word.
    fn scan_word(&self, start: usize) -> usize {
        let mut at = start;
        while let Some(b) = self.peek(at) {
            if b == b'\\' {
                at += 1;
                at += self.source[at..].chars().next().map_or(0, char::len_utf8);
            } else if at > start && is_delimiter(b) {
                break;
            } else {
                at += 1;
            }
        }
        at
    }

    /// Whether the `(` at `open` directly follows a `url` function name.
    fn follows_url(&self, open: usize) -> bool {
        open >= 3
            && self.bytes[open - 3..open].eq_ignore_ascii_case(b"url")
            && (open == 3 || is_delimiter(self.bytes[open - 4]))
    }

    /// Reads an unquoted `url(...)` argument as one word up to the closing
    /// parenthesis. Quoted arguments are left to the regular tokens.
    fn url_body(&mut self, open: usize) -> Result<(), ParseError> {
        let body = open + 1;
        let first = self.scan_while(body, is_space);
        if matches!(self.peek(first), Some(b'"' | b'\'')) {
            return Ok(());
        }

        let mut at = body;
        loop {
            match self.peek(at) {
                Some(b'\\') => at += 2,
                Some(b')') => break,
                Some(_) => at += 1,
                None => return Err(ParseError::invalid_source_at("Unclosed '('", open)),
            }
        }

        if at > body {
            self.pos = at;
            self.push_leaf(NodeKind::Word, body);
        }
        Ok(())
    }

    /// `//` comments exist in every dialect but plain CSS. A `//` right after
    /// `:` is the scheme separator of an unquoted URL.
    fn allows_line_comment(&self, start: usize) -> bool {
        self.syntax != Syntax::Css && (start == 0 || self.bytes[start - 1] != b':')
    }

    fn block_comment(&mut self, start: usize) -> Result<(), ParseError> {
        let body = &self.source[start + 2..];
        let end = body
            .find("*/")
            .ok_or_else(|| ParseError::invalid_source_at("Unterminated comment", start))?;
        self.pos = start + 2 + end + 2;
        self.push_leaf(NodeKind::Comment, start);
        Ok(())
    }

    fn string(&mut self, start: usize, quote: u8) -> Result<(), ParseError> {
        let mut at = start + 1;
        loop {
            match self.peek(at) {
                Some(b'\\') => at += 2,
                Some(b) if b == quote => break,
                Some(b'\n') | None => {
                    return Err(ParseError::invalid_source_at("Unterminated string", start));
                }
                Some(_) => at += 1,
            }
        }
        self.pos = at + 1;
        self.push_leaf(NodeKind::String, start);
        Ok(())
    }

    fn close(&mut self, start: usize, close: u8) -> Result<(), ParseError> {
        let Some(frame) = self.stack.pop() else {
            return Err(ParseError::invalid_source_at(
                format!("Unexpected '{}'", close as char),
                start,
            ));
        };

        let expected = closing_bracket(frame.open);
        if expected != close {
            return Err(ParseError::invalid_source_at(
                format!(
                    "Unexpected '{}', expected '{}'",
                    close as char, expected as char
                ),
                start,
            ));
        }

        self.pos = start + 1;
        let mut children = frame.children;
        children.push(self.leaf(NodeKind::Punctuation, start));

        let block = Node::new_parent(
            NodeKind::Block,
            Span::new(frame.start as u32, self.pos as u32),
            children,
        );
        self.current().push(block);
        Ok(())
    }

    fn leaf(&self, kind: NodeKind, start: usize) -> Node {
        Node::new_text(
            kind,
            Span::new(start as u32, self.pos as u32),
            &self.source[start..self.pos],
        )
    }

    fn push_leaf(&mut self, kind: NodeKind, start: usize) {
        let node = self.leaf(kind, start);
        self.current().push(node);
    }

    fn current(&mut self) -> &mut Vec<Node> {
        match self.stack.last_mut() {
            Some(frame) => &mut frame.children,
            None => &mut self.root,
        }
    }
}

fn is_space(b: u8) -> bool {
    matches!(b, b' ' | b'\t' | b'\n' | b'\r' | 0x0c)
}

fn is_punctuation(b: u8) -> bool {
    matches!(b, b':' | b';' | b',' | b'>' | b'~')
}

fn is_delimiter(b: u8) -> bool {
    is_space(b)
        || is_punctuation(b)
        || matches!(
            b,
            b'/' | b'"' | b'\'' | b'{' | b'}' | b'(' | b')' | b'[' | b']'
        )
}

fn closing_bracket(open: u8) -> u8 {
    match open {
        b'{' => b'}',
        b'(' => b')',
        _ => b']',
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    fn parse(source: &str, syntax: Syntax) -> Result<Tree, ParseError> {
        TokenParser::new().parse(source, &ParseOptions::new(syntax))
    }

    fn kinds(node: &Node) -> Vec<NodeKind> {
        node.children.iter().map(|c| c.kind).collect()
    }

    #[rstest]
    #[case::empty("")]
    #[case::single_rule("a{color:red}")]
    #[case::spaced("a {\n  color: red;\n}\n")]
    #[case::nested("@media (min-width: 10px) { .a > .b { top: 0 } }")]
    #[case::strings(r#"a::before { content: "}\"{"; font: 'x y' }"#)]
    #[case::comments("/* head */ a { /* in } */ b: c }")]
    #[case::url("a { background: url(http://example.com/x.png) }")]
    #[case::unicode("a::after { content: \"→\"; } .ñ { x: y }")]
    #[case::slash_value("a { font: 12px/1.5 serif }")]
    #[case::escaped_brace(".a\\{b { color: red }\n")]
    #[case::escaped_unicode(".\\→x, .b\\:hover { top: 0 }")]
    #[case::protocol_relative_url("a { background: url(//cdn.example.com/x.png); }\n")]
    fn test_round_trip(#[case] source: &str) {
        let tree = parse(source, Syntax::Css).unwrap();
        assert_eq!(tree.to_string(), source);
    }

    #[test]
    fn test_tree_is_tagged_with_syntax() {
        let tree = parse("a{}", Syntax::Less).unwrap();
        assert_eq!(tree.syntax(), Syntax::Less);
        assert_eq!(tree.root().kind, NodeKind::Root);
    }

    #[test]
    fn test_block_structure() {
        let tree = parse("a { b: c; }", Syntax::Css).unwrap();
        let root = tree.root();

        assert_eq!(
            kinds(root),
            vec![NodeKind::Word, NodeKind::Whitespace, NodeKind::Block]
        );

        let block = &root.children[2];
        assert_eq!(block.span, Span::new(2, 11));
        assert_eq!(block.children.first().and_then(Node::text), Some("{"));
        assert_eq!(block.children.last().and_then(Node::text), Some("}"));
    }

    #[test]
    fn test_line_comment_in_scss() {
        let tree = parse("// note\na{}", Syntax::Scss).unwrap();
        let first = &tree.root().children[0];

        assert_eq!(first.kind, NodeKind::Comment);
        assert_eq!(first.text(), Some("// note"));
    }

    #[test]
    fn test_no_line_comment_in_css() {
        let tree = parse("// note\na{}", Syntax::Css).unwrap();
        assert_eq!(tree.root().children[0].kind, NodeKind::Word);
    }

    #[test]
    fn test_url_scheme_is_not_a_comment() {
        let source = "a { b: url(http://x.y/z) }";
        let tree = parse(source, Syntax::Scss).unwrap();

        assert!(tree.root().find_all(NodeKind::Comment).is_empty());
        assert_eq!(tree.to_string(), source);
    }

    #[rstest]
    #[case::scss(Syntax::Scss, "a { background: url(//cdn.example.com/x.png); }\n")]
    #[case::less(Syntax::Less, "a { background: url(//cdn.example.com/x.png); }\n")]
    #[case::upper_case(Syntax::Scss, "a { b: URL(//cdn.example.com/x.png) }")]
    #[case::scss_interpolation(Syntax::Scss, "a { b: url(//#{$cdn}/x.png) }")]
    #[case::less_interpolation(Syntax::Less, "a { b: url(//@{cdn}/x.png) }")]
    #[case::quoted(Syntax::Scss, "a { b: url( \"//x.y/z\" ) }")]
    #[case::empty(Syntax::Less, "a { b: url() }")]
    fn test_protocol_relative_url_is_not_a_comment(#[case] syntax: Syntax, #[case] source: &str) {
        let tree = parse(source, syntax).unwrap();

        assert!(tree.root().find_all(NodeKind::Comment).is_empty());
        assert_eq!(tree.to_string(), source);
    }

    #[test]
    fn test_unquoted_url_is_one_word() {
        let tree = parse("a{b:url(//x.y/a b.png)}", Syntax::Scss).unwrap();
        let words: Vec<_> = tree
            .root()
            .find_all(NodeKind::Word)
            .into_iter()
            .filter_map(Node::text)
            .collect();

        assert_eq!(words, vec!["a", "b", "url", "//x.y/a b.png"]);
    }

    #[test]
    fn test_url_function_suffix_is_not_a_url() {
        let tree = parse("a { b: myurl(x // c\n) }", Syntax::Scss).unwrap();
        assert_eq!(tree.root().find_all(NodeKind::Comment).len(), 1);
    }

    #[test]
    fn test_escaped_brace_stays_in_selector() {
        let tree = parse(".a\\{b { color: red }", Syntax::Css).unwrap();
        let first = &tree.root().children[0];

        assert_eq!(first.kind, NodeKind::Word);
        assert_eq!(first.text(), Some(".a\\{b"));
        assert_eq!(tree.root().find_all(NodeKind::Block).len(), 1);
    }

    #[rstest]
    #[case::unclosed_url("a { b: url(//x.y", "Unclosed '('", 10)]
    #[case::unclosed_block("a {", "Unclosed '{'", 2)]
    #[case::stray_close("a }", "Unexpected '}'", 2)]
    #[case::mismatched("a ( }", "Unexpected '}', expected ')'", 4)]
    #[case::unterminated_string("a { content: \"x }", "Unterminated string", 13)]
    #[case::string_across_lines("a { content: 'x\n' }", "Unterminated string", 13)]
    #[case::unterminated_comment("a { /* b }", "Unterminated comment", 4)]
    fn test_invalid_source(
        #[case] source: &str,
        #[case] message: &str,
        #[case] offset: usize,
    ) {
        let err = parse(source, Syntax::Css).unwrap_err();
        assert_eq!(err.to_string(), message);
        assert_eq!(err.offset(), Some(offset));
    }

    #[test]
    fn test_known_start_rule() {
        let options = ParseOptions::new(Syntax::Css).with_rule("declaration");
        let tree = TokenParser::new().parse("color: red", &options).unwrap();
        assert_eq!(tree.to_string(), "color: red");
    }

    #[test]
    fn test_unknown_start_rule() {
        let options = ParseOptions::new(Syntax::Css).with_rule("keyframe-selector-list");
        let err = TokenParser::new().parse("from", &options).unwrap_err();
        assert!(matches!(err, ParseError::Unsupported(_)));
    }

    #[test]
    fn test_can_parse_all_syntaxes() {
        let parser = TokenParser::new();
        for syntax in Syntax::ALL {
            assert!(parser.can_parse(syntax));
        }
    }
}
