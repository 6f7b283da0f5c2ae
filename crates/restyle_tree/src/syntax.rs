//! Stylesheet dialects.

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// A stylesheet dialect a tree or plugin is associated with.
///
/// The lowercase name doubles as the file extension for the dialect.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Syntax {
    /// Plain CSS. Used when no dialect is given.
    #[default]
    Css,
    /// Less.
    Less,
    /// Indented Sass.
    Sass,
    /// SCSS.
    Scss,
}

impl Syntax {
    /// All known dialects.
    pub const ALL: [Syntax; 4] = [Syntax::Css, Syntax::Less, Syntax::Sass, Syntax::Scss];

    /// Returns the lowercase tag of this dialect.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Syntax::Css => "css",
            Syntax::Less => "less",
            Syntax::Sass => "sass",
            Syntax::Scss => "scss",
        }
    }

    /// Detects the dialect from the substring after the final `.` of a path.
    ///
    /// Returns `None` when the path has no extension or the extension is not a
    /// known dialect.
    pub fn from_path(path: &Path) -> Option<Self> {
        let name = path.file_name()?.to_str()?;
        let (_, extension) = name.rsplit_once('.')?;
        extension.parse().ok()
    }
}

impl fmt::Display for Syntax {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a string is not a known dialect tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownSyntax(pub String);

impl fmt::Display for UnknownSyntax {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown syntax '{}'", self.0)
    }
}

impl std::error::Error for UnknownSyntax {}

impl FromStr for Syntax {
    type Err = UnknownSyntax;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Syntax::ALL
            .into_iter()
            .find(|syntax| syntax.as_str() == s)
            .ok_or_else(|| UnknownSyntax(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("styles/main.css", Some(Syntax::Css))]
    #[case("theme.less", Some(Syntax::Less))]
    #[case("a/b.sass", Some(Syntax::Sass))]
    #[case("vendor.min.scss", Some(Syntax::Scss))]
    #[case("README.md", None)]
    #[case("Makefile", None)]
    #[case("styles.CSS", None)]
    fn test_from_path(#[case] path: &str, #[case] expected: Option<Syntax>) {
        assert_eq!(Syntax::from_path(Path::new(path)), expected);
    }

    #[test]
    fn test_parse_unknown() {
        let err = "stylus".parse::<Syntax>().unwrap_err();
        assert_eq!(err.to_string(), "unknown syntax 'stylus'");
    }

    #[test]
    fn test_serde_uses_lowercase_tags() {
        let json = serde_json::to_string(&Syntax::Scss).unwrap();
        assert_eq!(json, r#""scss""#);

        let syntax: Syntax = serde_json::from_str(r#""less""#).unwrap();
        assert_eq!(syntax, Syntax::Less);
    }

    #[test]
    fn test_default_is_css() {
        assert_eq!(Syntax::default(), Syntax::Css);
    }
}
