//! Engine error types.

use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

use restyle_tree::Position;

/// Version banner appended to every syntax error.
pub(crate) const VERSION_BANNER: &str = concat!("restyle core version: ", env!("CARGO_PKG_VERSION"));

/// Errors that can occur while configuring the engine or running it.
#[derive(Debug, Error)]
pub enum EngineError {
    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// The input text could not be parsed.
    #[error(transparent)]
    Syntax(#[from] SyntaxError),

    /// A plugin callable failed.
    #[error("Plugin '{plugin}' failed: {source}")]
    Plugin {
        /// Name of the failing plugin.
        plugin: String,
        /// The plugin's own error.
        #[source]
        source: PluginError,
    },

    /// Plugin registration was rejected.
    #[error("Registry error: {0}")]
    Registry(#[from] RegistryError),

    /// The file is excluded or its extension is not handled by any plugin.
    #[error("Not eligible for processing: {}", .0.display())]
    Ineligible(PathBuf),

    /// File error.
    #[error("File error: {0}")]
    File(String),

    /// Internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl EngineError {
    /// Creates a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Creates a file error.
    pub fn file(message: impl Into<String>) -> Self {
        Self::File(message.into())
    }

    /// Wraps a plugin failure with the plugin's name.
    pub fn plugin(plugin: impl Into<String>, source: PluginError) -> Self {
        Self::Plugin {
            plugin: plugin.into(),
            source,
        }
    }
}

/// Input text could not be parsed under the requested dialect.
///
/// Renders as the originating filename (if any), the parser's message and
/// the version banner, one per line.
#[derive(Debug)]
pub struct SyntaxError {
    /// File the text came from.
    pub filename: Option<PathBuf>,
    /// The parser's message.
    pub message: String,
    /// Where parsing failed, when the parser reports it.
    pub position: Option<Position>,
}

impl SyntaxError {
    /// Creates a syntax error from a parser message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            filename: None,
            message: message.into(),
            position: None,
        }
    }

    /// Sets the originating filename.
    pub fn with_filename(mut self, filename: impl Into<PathBuf>) -> Self {
        self.filename = Some(filename.into());
        self
    }

    /// Sets the failure position.
    pub fn with_position(mut self, position: Position) -> Self {
        self.position = Some(position);
        self
    }
}

impl fmt::Display for SyntaxError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(filename) = &self.filename {
            writeln!(f, "{}", filename.display())?;
        }
        f.write_str(&self.message)?;
        if let Some(position) = self.position {
            write!(f, " (line {}, column {})", position.line, position.column)?;
        }
        write!(f, "\n{}", VERSION_BANNER)
    }
}

impl std::error::Error for SyntaxError {}

/// Errors raised by plugin callables.
#[derive(Debug, Error)]
pub enum PluginError {
    /// The plugin's configured value is not usable.
    #[error("Invalid options: {0}")]
    InvalidOptions(String),

    /// The plugin met a tree it cannot handle.
    #[error("{0}")]
    Failed(String),
}

impl PluginError {
    /// Creates an invalid options error.
    pub fn invalid_options(message: impl Into<String>) -> Self {
        Self::InvalidOptions(message.into())
    }

    /// Creates a generic failure.
    pub fn failed(message: impl Into<String>) -> Self {
        Self::Failed(message.into())
    }
}

/// Reasons a plugin registration is rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    /// A plugin with the same name is already registered.
    #[error("Plugin '{0}' is already registered")]
    Duplicate(String),

    /// The plugin's run-before target would close a cycle.
    #[error("Plugin '{plugin}' cannot run before '{target}': the order would be cyclic")]
    Cycle {
        /// The plugin being registered.
        plugin: String,
        /// Its run-before target.
        target: String,
    },
}
