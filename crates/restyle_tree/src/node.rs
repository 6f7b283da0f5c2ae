//! Node definition.

use std::fmt;
use std::ops::ControlFlow;

use serde::Serialize;

use crate::Span;

/// The kind of a [`Node`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum NodeKind {
    /// The stylesheet root.
    Root,
    /// A bracketed group. The opening and closing brackets are its first and
    /// last children.
    Block,
    /// Spaces, tabs and newlines.
    Whitespace,
    /// A `/* ... */` or `// ...` comment.
    Comment,
    /// A quoted string, quotes included.
    String,
    /// A single punctuation character such as `:` `;` `,` or a bracket.
    Punctuation,
    /// Anything else: identifiers, numbers, selectors, at-keywords.
    Word,
}

impl NodeKind {
    /// Returns true if nodes of this kind hold children rather than text.
    #[inline]
    pub const fn is_parent(&self) -> bool {
        matches!(self, NodeKind::Root | NodeKind::Block)
    }
}

/// A node in the syntax tree.
///
/// Text nodes carry their exact source text in `value`; parent nodes carry
/// children and serialize as the concatenation of them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Node {
    /// The kind of this node.
    #[serde(rename = "type")]
    pub kind: NodeKind,

    /// Byte span in the source text the node was parsed from.
    ///
    /// Nodes created or edited by plugins keep whatever span they were given;
    /// spans are not recomputed after mutation.
    pub span: Span,

    /// Child nodes (for parent nodes).
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<Node>,

    /// Text value (for leaf nodes).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
}

impl Node {
    /// Creates a new parent node with children.
    pub fn new_parent(kind: NodeKind, span: Span, children: Vec<Node>) -> Self {
        Self {
            kind,
            span,
            children,
            value: None,
        }
    }

    /// Creates a new text node with a value.
    pub fn new_text(kind: NodeKind, span: Span, value: impl Into<String>) -> Self {
        Self {
            kind,
            span,
            children: Vec::new(),
            value: Some(value.into()),
        }
    }

    /// Returns true if this node is a text node.
    #[inline]
    pub fn is_text(&self) -> bool {
        self.value.is_some()
    }

    /// Returns the text of a leaf node.
    #[inline]
    pub fn text(&self) -> Option<&str> {
        self.value.as_deref()
    }

    /// Replaces the text of a leaf node.
    pub fn set_text(&mut self, value: impl Into<String>) {
        self.value = Some(value.into());
    }

    /// Visits this node and all descendants depth-first, pre-order.
    ///
    /// Returning `ControlFlow::Break` from the callback stops the walk.
    pub fn walk<'a, F>(&'a self, f: &mut F) -> ControlFlow<()>
    where
        F: FnMut(&'a Node) -> ControlFlow<()>,
    {
        f(self)?;
        for child in &self.children {
            child.walk(f)?;
        }
        ControlFlow::Continue(())
    }

    /// Visits this node and all descendants mutably, depth-first, pre-order.
    ///
    /// Children are visited after the callback returns, so a callback that
    /// replaces `children` sees its replacements walked.
    pub fn walk_mut<F>(&mut self, f: &mut F)
    where
        F: FnMut(&mut Node),
    {
        f(self);
        for child in &mut self.children {
            child.walk_mut(f);
        }
    }

    /// Collects references to every descendant (including self) matching `kind`.
    pub fn find_all(&self, kind: NodeKind) -> Vec<&Node> {
        let mut found = Vec::new();
        let _ = self.walk(&mut |node| {
            if node.kind == kind {
                found.push(node);
            }
            ControlFlow::Continue(())
        });
        found
    }

    fn write_to(&self, out: &mut impl fmt::Write) -> fmt::Result {
        if let Some(value) = &self.value {
            out.write_str(value)?;
        }
        for child in &self.children {
            child.write_to(out)?;
        }
        Ok(())
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.write_to(f)
    }
}
