//! Path eligibility checks.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use globset::{GlobBuilder, GlobSet, GlobSetBuilder};
use tracing::warn;

use restyle_tree::Syntax;

use crate::EngineError;

/// Decides whether a path takes part in a run.
///
/// Exclusion patterns are globs where `*` stops at `/` and `**` crosses
/// directories. They are matched against the path relative to the base
/// directory, without a leading `./` or a trailing `/`.
#[derive(Debug, Clone, Default)]
pub struct PathFilter {
    exclude: Option<GlobSet>,
    base_dir: Option<PathBuf>,
}

impl PathFilter {
    /// Compiles the exclusion patterns.
    pub fn new(patterns: &[String], base_dir: Option<&Path>) -> Result<Self, EngineError> {
        Ok(Self {
            exclude: Self::build_globset(patterns)?,
            base_dir: base_dir.map(Path::to_path_buf),
        })
    }

    fn build_globset(patterns: &[String]) -> Result<Option<GlobSet>, EngineError> {
        if patterns.is_empty() {
            return Ok(None);
        }

        let mut builder = GlobSetBuilder::new();
        for pattern in patterns {
            let glob = GlobBuilder::new(pattern)
                .literal_separator(true)
                .build()
                .map_err(|e| EngineError::config(format!("Invalid glob pattern: {}", e)))?;
            builder.add(glob);
        }

        let globset = builder
            .build()
            .map_err(|e| EngineError::config(format!("Failed to build globset: {}", e)))?;

        Ok(Some(globset))
    }

    /// Returns the text exclusion patterns are matched against.
    fn match_target(&self, path: &Path) -> String {
        let relative = self
            .base_dir
            .as_deref()
            .and_then(|base| path.strip_prefix(base).ok())
            .unwrap_or(path);
        let text = relative.to_string_lossy();
        let text = text.strip_prefix("./").unwrap_or(&text);
        text.trim_end_matches('/').to_string()
    }

    /// Returns true if an exclusion pattern matches the path.
    pub fn is_excluded(&self, path: &Path) -> bool {
        self.exclude
            .as_ref()
            .is_some_and(|excludes| excludes.is_match(self.match_target(path)))
    }

    /// Checks a directory (or any path) against existence and exclusion.
    ///
    /// A missing path logs a warning and is not accepted.
    pub fn accepts_dir(&self, path: &Path) -> bool {
        if !path.exists() {
            warn!("Path {} was not found.", path.display());
            return false;
        }
        !self.is_excluded(path)
    }

    /// Checks a file: its extension must be one of `supported`, then the
    /// directory checks apply.
    pub fn accepts_file(&self, path: &Path, supported: &BTreeSet<Syntax>) -> bool {
        match Syntax::from_path(path) {
            Some(syntax) if supported.contains(&syntax) => self.accepts_dir(path),
            _ => false,
        }
    }

    /// Dispatches to [`accepts_dir`](Self::accepts_dir) or
    /// [`accepts_file`](Self::accepts_file) by what is on disk.
    pub fn is_eligible(&self, path: &Path, supported: &BTreeSet<Syntax>) -> bool {
        if path.is_dir() {
            self.accepts_dir(path)
        } else {
            self.accepts_file(path, supported)
        }
    }
}
