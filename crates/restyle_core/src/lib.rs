//! # restyle_core
//!
//! Core engine for restyle.
//!
//! This crate provides:
//! - The `Engine` façade: configuration intake, plugin registration and the
//!   lint/process operations on strings, files and paths
//! - The `Plugin` contract and an ordered `PluginRegistry` honouring
//!   run-before constraints
//! - Path filtering and parallel directory traversal
//!
//! ## Example
//!
//! ```rust,ignore
//! use restyle_core::{Config, Engine, RunReport};
//!
//! let config = Config::from_file(".restyle.json")?;
//! let mut engine = Engine::new();
//! engine.use_plugin(my_plugins::SortOrder::default())?;
//! engine.configure(config)?;
//!
//! match engine.run_path("src")? {
//!     RunReport::Lint(report) => {
//!         for diagnostic in report.diagnostics() {
//!             println!("{:?}: {}", diagnostic.file(), diagnostic.message);
//!         }
//!     }
//!     RunReport::Process(report) => println!("{} file(s) rewritten", report.rewritten()),
//! }
//! ```

mod adapter;
mod config;
mod diagnostic;
mod engine;
mod error;
pub mod path_filter;
mod pipeline;
mod plugin;
pub mod registry;
pub mod traverser;

pub use adapter::{StringOptions, TreeAdapter};
pub use config::{Config, ErrorPolicy, PluginValue};
pub use diagnostic::{Diagnostic, Severity};
pub use engine::{Engine, MAX_FILE_SIZE, RunReport};
pub use error::{EngineError, PluginError, RegistryError, SyntaxError};
pub use path_filter::PathFilter;
pub use pipeline::{Pipeline, PipelineOutput};
pub use plugin::{FnPlugin, Mode, Plugin, Settings};
pub use registry::{PluginRegistry, RegisteredPlugin, Registration};
pub use traverser::{FileOutcome, Report, Traverser};
