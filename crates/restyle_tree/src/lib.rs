//! # restyle_tree
//!
//! Syntax tree definitions for restyle.
//!
//! A [`Tree`] is the parsed form of one stylesheet. It is tagged with the
//! [`Syntax`] dialect it was parsed as and owns a mutable [`Node`] hierarchy
//! that plugins inspect (lint mode) or rewrite in place (process mode).
//!
//! Trees are lossless: serializing an unmodified tree with
//! [`Tree::to_string`](ToString::to_string) reproduces the source text
//! byte-for-byte.
//!
//! ## Example
//!
//! ```rust
//! use restyle_tree::{Node, NodeKind, Span, Syntax, Tree};
//!
//! let root = Node::new_parent(
//!     NodeKind::Root,
//!     Span::new(0, 2),
//!     vec![
//!         Node::new_text(NodeKind::Word, Span::new(0, 1), "a"),
//!         Node::new_text(NodeKind::Punctuation, Span::new(1, 2), ";"),
//!     ],
//! );
//! let tree = Tree::new(Syntax::Css, root);
//! assert_eq!(tree.to_string(), "a;");
//! ```

mod node;
mod span;
mod syntax;
mod tree;

pub use node::{Node, NodeKind};
pub use span::{Location, Position, Span};
pub use syntax::{Syntax, UnknownSyntax};
pub use tree::Tree;
