//! File and directory traversal.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use rayon::prelude::*;
use tracing::{debug, warn};
use walkdir::WalkDir;

use restyle_tree::Syntax;

use crate::{Diagnostic, EngineError, ErrorPolicy, PathFilter};

/// What processing did to one file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FileOutcome {
    /// The rewritten text equals the original; nothing was written.
    Unchanged,
    /// The file was rewritten in place.
    Rewritten,
}

impl FileOutcome {
    /// `0` for unchanged, `1` for rewritten.
    pub fn indicator(self) -> u8 {
        match self {
            FileOutcome::Unchanged => 0,
            FileOutcome::Rewritten => 1,
        }
    }
}

/// Per-file results of a path operation.
///
/// Files are listed in traversal order: directory entries sorted by name,
/// nested directories flattened in place.
#[derive(Debug)]
pub struct Report<T> {
    /// Files that were handled, with their result.
    pub successes: Vec<(PathBuf, T)>,
    /// Files that failed, with their error.
    pub failures: Vec<(PathBuf, EngineError)>,
}

impl<T> Report<T> {
    /// Creates an empty report.
    pub fn new() -> Self {
        Self {
            successes: Vec::new(),
            failures: Vec::new(),
        }
    }

    /// Returns true if no file failed.
    pub fn is_ok(&self) -> bool {
        self.failures.is_empty()
    }

    /// Number of files in the report.
    pub fn len(&self) -> usize {
        self.successes.len() + self.failures.len()
    }

    /// Returns true if no file was handled.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Paths of every handled file.
    pub fn paths(&self) -> impl Iterator<Item = &Path> {
        self.successes.iter().map(|(path, _)| path.as_path())
    }
}

impl<T> Default for Report<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl Report<Vec<Diagnostic>> {
    /// All diagnostics, in file order.
    pub fn diagnostics(&self) -> impl Iterator<Item = &Diagnostic> {
        self.successes.iter().flat_map(|(_, found)| found.iter())
    }

    /// Flattens the report into one diagnostics list.
    pub fn into_diagnostics(self) -> Vec<Diagnostic> {
        self.successes
            .into_iter()
            .flat_map(|(_, found)| found)
            .collect()
    }
}

impl Report<FileOutcome> {
    /// Number of files that were rewritten.
    pub fn rewritten(&self) -> usize {
        self.successes
            .iter()
            .filter(|(_, outcome)| *outcome == FileOutcome::Rewritten)
            .count()
    }

    /// Number of files left untouched.
    pub fn unchanged(&self) -> usize {
        self.successes.len() - self.rewritten()
    }
}

/// Walks a file or directory and applies an operation to every eligible file.
#[derive(Debug, Clone, Copy)]
pub struct Traverser<'a> {
    filter: &'a PathFilter,
    supported: &'a BTreeSet<Syntax>,
    policy: ErrorPolicy,
}

impl<'a> Traverser<'a> {
    /// Creates a traverser.
    ///
    /// `supported` is the set of dialects files must have as extension.
    pub fn new(filter: &'a PathFilter, supported: &'a BTreeSet<Syntax>, policy: ErrorPolicy) -> Self {
        Self {
            filter,
            supported,
            policy,
        }
    }

    /// Lists eligible files under `path`, in traversal order.
    ///
    /// A single eligible file yields itself. Excluded directories are not
    /// descended into.
    pub fn files(&self, path: &Path) -> Vec<PathBuf> {
        if !path.is_dir() {
            return if self.filter.accepts_file(path, self.supported) {
                vec![path.to_path_buf()]
            } else {
                Vec::new()
            };
        }

        if !self.filter.accepts_dir(path) {
            return Vec::new();
        }

        let filter = self.filter;
        WalkDir::new(path)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|entry| {
                entry.depth() == 0 || !entry.file_type().is_dir() || !filter.is_excluded(entry.path())
            })
            .filter_map(|entry| match entry {
                Ok(entry) => Some(entry),
                Err(e) => {
                    warn!("Skipping unreadable entry: {}", e);
                    None
                }
            })
            .filter(|entry| entry.path().is_file())
            .map(|entry| entry.into_path())
            .filter(|file| self.filter.accepts_file(file, self.supported))
            .collect()
    }

    /// Runs `op` over every eligible file in parallel.
    ///
    /// With [`ErrorPolicy::Continue`] every failure is recorded in the report.
    /// With [`ErrorPolicy::Abort`] the first failure is returned instead.
    pub fn walk<T, F>(&self, path: &Path, op: F) -> Result<Report<T>, EngineError>
    where
        T: Send,
        F: Fn(&Path) -> Result<T, EngineError> + Sync,
    {
        if !path.exists() {
            warn!("Path {} was not found.", path.display());
            return Ok(Report::new());
        }

        let files = self.files(path);
        debug!("Found {} eligible file(s) under {}", files.len(), path.display());

        match self.policy {
            ErrorPolicy::Abort => {
                let successes = files
                    .into_par_iter()
                    .map(|file| op(&file).map(|result| (file, result)))
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(Report {
                    successes,
                    failures: Vec::new(),
                })
            }
            ErrorPolicy::Continue => {
                let results: Vec<(PathBuf, Result<T, EngineError>)> = files
                    .into_par_iter()
                    .map(|file| {
                        let result = op(&file);
                        (file, result)
                    })
                    .collect();

                let mut report = Report::new();
                for (file, result) in results {
                    match result {
                        Ok(value) => report.successes.push((file, value)),
                        Err(error) => {
                            warn!("Failed to handle {}: {}", file.display(), error);
                            report.failures.push((file, error));
                        }
                    }
                }
                Ok(report)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::fs;
    use tempfile::{TempDir, tempdir};

    fn fixture() -> TempDir {
        let dir = tempdir().unwrap();
        let root = dir.path();
        fs::create_dir_all(root.join("src/nested")).unwrap();
        fs::create_dir_all(root.join("vendor")).unwrap();
        fs::write(root.join("src/a.css"), "a{}").unwrap();
        fs::write(root.join("src/b.scss"), "b{}").unwrap();
        fs::write(root.join("src/nested/c.css"), "c{}").unwrap();
        fs::write(root.join("src/notes.txt"), "x").unwrap();
        fs::write(root.join("vendor/reset.css"), "*{}").unwrap();
        dir
    }

    fn names(root: &Path, files: &[PathBuf]) -> Vec<String> {
        files
            .iter()
            .map(|f| f.strip_prefix(root).unwrap().to_string_lossy().replace('\\', "/"))
            .collect()
    }

    #[test]
    fn test_files_filters_extension_and_exclusion() {
        let dir = fixture();
        let filter = PathFilter::new(&["vendor/**".to_string()], Some(dir.path())).unwrap();
        let supported = BTreeSet::from([Syntax::Css]);
        let traverser = Traverser::new(&filter, &supported, ErrorPolicy::Continue);

        let files = traverser.files(dir.path());
        assert_eq!(names(dir.path(), &files), vec!["src/a.css", "src/nested/c.css"]);
    }

    #[test]
    fn test_excluded_directory_is_pruned() {
        let dir = fixture();
        let filter = PathFilter::new(&["src".to_string()], Some(dir.path())).unwrap();
        let supported = BTreeSet::from([Syntax::Css, Syntax::Scss]);
        let traverser = Traverser::new(&filter, &supported, ErrorPolicy::Continue);

        let files = traverser.files(dir.path());
        assert_eq!(names(dir.path(), &files), vec!["vendor/reset.css"]);
    }

    #[test]
    fn test_single_file() {
        let dir = fixture();
        let filter = PathFilter::default();
        let supported = BTreeSet::from([Syntax::Css]);
        let traverser = Traverser::new(&filter, &supported, ErrorPolicy::Continue);

        assert_eq!(traverser.files(&dir.path().join("src/a.css")).len(), 1);
        assert!(traverser.files(&dir.path().join("src/b.scss")).is_empty());
    }

    #[test]
    fn test_walk_continue_collects_failures() {
        let dir = fixture();
        let filter = PathFilter::default();
        let supported = BTreeSet::from([Syntax::Css]);
        let traverser = Traverser::new(&filter, &supported, ErrorPolicy::Continue);

        let report = traverser
            .walk(dir.path(), |path| {
                if path.ends_with("a.css") {
                    Err(EngineError::file("boom"))
                } else {
                    Ok(1)
                }
            })
            .unwrap();

        assert_eq!(report.successes.len(), 2);
        assert_eq!(report.failures.len(), 1);
        assert!(report.failures[0].0.ends_with("src/a.css"));
        assert!(!report.is_ok());
    }

    #[test]
    fn test_walk_abort_returns_first_failure() {
        let dir = fixture();
        let filter = PathFilter::default();
        let supported = BTreeSet::from([Syntax::Css]);
        let traverser = Traverser::new(&filter, &supported, ErrorPolicy::Abort);

        let err = traverser
            .walk(dir.path(), |path| {
                if path.ends_with("a.css") {
                    Err(EngineError::file("boom"))
                } else {
                    Ok(())
                }
            })
            .unwrap_err();
        assert_eq!(err.to_string(), "File error: boom");
    }

    #[test]
    fn test_walk_missing_path_is_empty() {
        let dir = tempdir().unwrap();
        let filter = PathFilter::default();
        let supported = BTreeSet::from([Syntax::Css]);
        let traverser = Traverser::new(&filter, &supported, ErrorPolicy::Continue);

        let report: Report<()> = traverser
            .walk(&dir.path().join("missing"), |_| Ok(()))
            .unwrap();
        assert!(report.is_empty());
    }

    #[test]
    fn test_report_helpers() {
        let report = Report {
            successes: vec![
                (PathBuf::from("a.css"), FileOutcome::Rewritten),
                (PathBuf::from("b.css"), FileOutcome::Unchanged),
                (PathBuf::from("c.css"), FileOutcome::Rewritten),
            ],
            failures: Vec::new(),
        };

        assert_eq!(report.rewritten(), 2);
        assert_eq!(report.unchanged(), 1);
        assert_eq!(FileOutcome::Unchanged.indicator(), 0);
        assert_eq!(FileOutcome::Rewritten.indicator(), 1);
    }
}
