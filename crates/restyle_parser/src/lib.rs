//! # restyle_parser
//!
//! Parser abstraction layer for restyle.
//!
//! This crate provides:
//! - A `Parser` trait through which the engine turns text into a [`Tree`]
//! - `ParseError`, the failure type every parser reports
//! - `TokenParser`, a built-in lossless parser that understands brackets,
//!   strings and comments but no dialect grammar
//!
//! ## Example
//!
//! ```rust
//! use restyle_parser::{ParseOptions, Parser, TokenParser};
//! use restyle_tree::Syntax;
//!
//! let parser = TokenParser::new();
//! let source = "a { color: red; }";
//!
//! let tree = parser.parse(source, &ParseOptions::new(Syntax::Css)).unwrap();
//! assert_eq!(tree.to_string(), source);
//! ```
//!
//! [`Tree`]: restyle_tree::Tree

mod error;
mod token;
mod traits;

pub use error::ParseError;
pub use token::TokenParser;
pub use traits::{ParseOptions, Parser};
