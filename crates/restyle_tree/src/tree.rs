//! Dialect-tagged syntax tree.

use std::fmt;

use serde::Serialize;

use crate::{Node, Syntax};

/// The parsed representation of one stylesheet.
///
/// A tree lives for one parse, transform, serialize cycle. Plugins in process
/// mode mutate it in place through [`Tree::root_mut`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Tree {
    syntax: Syntax,
    root: Node,
}

impl Tree {
    /// Creates a tree from a root node.
    pub fn new(syntax: Syntax, root: Node) -> Self {
        Self { syntax, root }
    }

    /// The dialect this tree was parsed as.
    #[inline]
    pub fn syntax(&self) -> Syntax {
        self.syntax
    }

    /// The root node.
    #[inline]
    pub fn root(&self) -> &Node {
        &self.root
    }

    /// Mutable access to the root node.
    #[inline]
    pub fn root_mut(&mut self) -> &mut Node {
        &mut self.root
    }
}

impl fmt::Display for Tree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.root, f)
    }
}
