//! Engine configuration.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use jsonschema::Validator;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use restyle_tree::Syntax;

use crate::EngineError;

// Embed the schema
const SCHEMA_JSON: &str = include_str!("../../../schemas/v1/config.json");
static CONFIG_SCHEMA: OnceLock<Result<Validator, String>> = OnceLock::new();

/// Configuration for the engine.
///
/// Global flags are typed fields. Every other key is a plugin name mapped to
/// that plugin's value.
///
/// ```json
/// {
///   "lint": false,
///   "exclude": ["vendor/**"],
///   "sortOrder": [["position", "top"], ["color"]],
///   "colorCase": null
/// }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    /// Report diagnostics instead of rewriting.
    #[serde(default)]
    pub lint: bool,

    /// Log a marker per processed file and warn on duplicate plugins.
    ///
    /// Markers are `tracing` events at `INFO` level: `✓ <path>` for a
    /// rewritten file and two spaces before the path for an unchanged one.
    /// Nothing is printed unless the caller installs a subscriber.
    #[serde(default)]
    pub verbose: bool,

    /// Dialect to use for every file instead of the extension.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub syntax: Option<Syntax>,

    /// Glob patterns of paths to skip.
    #[serde(default)]
    pub exclude: Vec<String>,

    /// What a directory run does when one file fails.
    #[serde(default)]
    pub on_error: ErrorPolicy,

    /// Directory exclusion patterns are relative to.
    /// This is usually the directory containing the configuration file.
    #[serde(skip)]
    pub base_dir: Option<PathBuf>,

    /// Plugin values keyed by plugin name.
    #[serde(flatten)]
    pub plugins: BTreeMap<String, Value>,
}

/// Whether a directory run continues past a failing file.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ErrorPolicy {
    /// Keep going and report the failure next to the other results.
    #[default]
    Continue,
    /// Stop at the first failure and return it.
    Abort,
}

/// Whether a plugin participates in runs, and with which options.
#[derive(Debug, Clone, PartialEq)]
pub enum PluginValue {
    /// Configured as `null`: the plugin is skipped.
    Disabled,
    /// The plugin runs. `Value::Null` means no options were given.
    Enabled(Value),
}

impl PluginValue {
    /// Returns whether the plugin participates in runs.
    pub fn is_enabled(&self) -> bool {
        matches!(self, PluginValue::Enabled(_))
    }

    /// Gets the plugin options, if enabled.
    pub fn options(&self) -> Option<&Value> {
        match self {
            PluginValue::Enabled(value) => Some(value),
            PluginValue::Disabled => None,
        }
    }
}

impl Default for PluginValue {
    fn default() -> Self {
        PluginValue::Enabled(Value::Null)
    }
}

impl From<Value> for PluginValue {
    fn from(value: Value) -> Self {
        if value.is_null() {
            PluginValue::Disabled
        } else {
            PluginValue::Enabled(value)
        }
    }
}

impl Config {
    /// Creates a new empty configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads configuration from a JSON file.
    ///
    /// Exclusion patterns are resolved against the file's directory.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, EngineError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .map_err(|e| EngineError::config(format!("Failed to read config: {}", e)))?;

        let mut config = Self::from_json(&content)?;
        if let Some(parent) = path.parent() {
            config.base_dir = Some(parent.to_path_buf());
        }

        Ok(config)
    }

    /// Parses configuration from a JSON string.
    pub fn from_json(json: &str) -> Result<Self, EngineError> {
        let value: Value = serde_json::from_str(json)
            .map_err(|e| EngineError::config(format!("Invalid JSON: {}", e)))?;
        Self::from_value(value)
    }

    /// Builds configuration from a JSON value with schema validation.
    ///
    /// Anything but a JSON object is rejected.
    pub fn from_value(value: Value) -> Result<Self, EngineError> {
        if !value.is_object() {
            return Err(EngineError::config(format!(
                "Expected a JSON object, got {}",
                json_type(&value)
            )));
        }

        let schema = CONFIG_SCHEMA
            .get_or_init(|| {
                let schema_json: Value = serde_json::from_str(SCHEMA_JSON)
                    .map_err(|e| format!("Invalid embedded config schema: {}", e))?;
                Validator::new(&schema_json)
                    .map_err(|e| format!("Invalid config schema compilation: {}", e))
            })
            .as_ref()
            .map_err(|e| EngineError::Internal(e.clone()))?;

        if let Err(e) = schema.validate(&value) {
            return Err(EngineError::config(format!(
                "Config validation failed: {} at {}",
                e,
                e.instance_path()
            )));
        }

        serde_json::from_value(value)
            .map_err(|e| EngineError::config(format!("Invalid config: {}", e)))
    }

    /// Sets the base directory for exclusion patterns.
    pub fn with_base_dir(mut self, base_dir: impl Into<PathBuf>) -> Self {
        self.base_dir = Some(base_dir.into());
        self
    }

    /// Sets a plugin value.
    pub fn with_plugin(mut self, name: impl Into<String>, value: Value) -> Self {
        self.plugins.insert(name.into(), value);
        self
    }

    /// Returns the configured value for a plugin, if any.
    pub fn plugin_value(&self, name: &str) -> Option<PluginValue> {
        self.plugins.get(name).cloned().map(PluginValue::from)
    }
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;
    use serde_json::json;

    #[test]
    fn test_config_new() {
        let config = Config::new();
        assert!(!config.lint);
        assert!(!config.verbose);
        assert!(config.syntax.is_none());
        assert!(config.exclude.is_empty());
        assert_eq!(config.on_error, ErrorPolicy::Continue);
        assert!(config.plugins.is_empty());
    }

    #[test]
    fn test_config_from_json() {
        let json = r#"{
            "lint": true,
            "verbose": true,
            "syntax": "scss",
            "exclude": ["dist/*", "vendor/**"],
            "onError": "abort",
            "sortOrder": [["color"]],
            "colorCase": "lower",
            "eofNewline": null
        }"#;

        let config = Config::from_json(json).unwrap();
        assert!(config.lint);
        assert!(config.verbose);
        assert_eq!(config.syntax, Some(Syntax::Scss));
        assert_eq!(config.exclude, vec!["dist/*", "vendor/**"]);
        assert_eq!(config.on_error, ErrorPolicy::Abort);
        assert_eq!(config.plugins.len(), 3);
        assert_eq!(config.plugins["colorCase"], json!("lower"));
    }

    #[test]
    fn test_plugin_value() {
        let config = Config::new()
            .with_plugin("colorCase", json!("upper"))
            .with_plugin("eofNewline", Value::Null);

        assert_eq!(
            config.plugin_value("colorCase"),
            Some(PluginValue::Enabled(json!("upper")))
        );
        assert_eq!(config.plugin_value("eofNewline"), Some(PluginValue::Disabled));
        assert_eq!(config.plugin_value("unknown"), None);
    }

    #[test]
    fn test_plugin_value_enabled() {
        assert!(PluginValue::default().is_enabled());
        assert!(PluginValue::from(json!(false)).is_enabled());
        assert!(!PluginValue::from(Value::Null).is_enabled());
        assert_eq!(PluginValue::Disabled.options(), None);
        assert_eq!(
            PluginValue::from(json!({"max": 2})).options(),
            Some(&json!({"max": 2}))
        );
    }

    #[rstest]
    #[case::array(json!(["lint"]), "Expected a JSON object, got an array")]
    #[case::string(json!("lint"), "Expected a JSON object, got a string")]
    #[case::null(Value::Null, "Expected a JSON object, got null")]
    fn test_non_object_rejected(#[case] value: Value, #[case] expected: &str) {
        let err = Config::from_value(value).unwrap_err();
        assert!(matches!(err, EngineError::Config(_)));
        assert!(err.to_string().contains(expected), "{}", err);
    }

    #[rstest]
    #[case::lint_type(r#"{ "lint": "yes" }"#)]
    #[case::unknown_syntax(r#"{ "syntax": "stylus" }"#)]
    #[case::exclude_type(r#"{ "exclude": "dist/*" }"#)]
    #[case::exclude_items(r#"{ "exclude": [1, 2] }"#)]
    #[case::error_policy(r#"{ "onError": "retry" }"#)]
    fn test_config_validation_errors(#[case] json: &str) {
        let err = Config::from_json(json).unwrap_err();
        assert!(
            err.to_string().contains("Config validation failed"),
            "Error message '{}' should mention validation",
            err
        );
    }

    #[test]
    fn test_invalid_json() {
        let err = Config::from_json("{ lint: true").unwrap_err();
        assert!(err.to_string().contains("Invalid JSON"));
    }

    #[test]
    fn test_from_file_sets_base_dir() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("restyle.json");
        fs::write(&path, r#"{ "exclude": ["dist/*"] }"#).unwrap();

        let config = Config::from_file(&path).unwrap();
        assert_eq!(config.base_dir.as_deref(), Some(dir.path()));
        assert_eq!(config.exclude, vec!["dist/*"]);
    }

    #[test]
    fn test_from_file_missing() {
        let err = Config::from_file("/nonexistent/restyle.json").unwrap_err();
        assert!(err.to_string().contains("Failed to read config"));
    }
}
