//! Task configuration with provenance
//!
//! A [`TaskConfig`] is what the hosting build tool hands to discovery: the
//! source roots, the destination directory, the discovery policy and the
//! task-level option layer. It is built from up to three layers.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use sha2::{Digest, Sha256};
use std::fs;
use std::path::{Path, PathBuf};

use super::defaults::BuiltinDefaults;
use super::merge::merge_layers;
use super::options::TaskOptions;

/// Origin of a configuration layer
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum ConfigOrigin {
    Builtin,
    File,
    Cli,
}

/// A contributing config layer with provenance
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigSource {
    pub origin: ConfigOrigin,

    /// File path (None for builtin/cli)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,

    /// SHA-256 digest of raw file bytes (None for builtin/cli)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub digest: Option<String>,
}

/// Effective task configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TaskConfig {
    /// Directories scanned for manifest files
    #[serde(default, deserialize_with = "one_or_many")]
    pub src: Vec<PathBuf>,

    /// Output directory shared by every manifest in the run
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dest: Option<PathBuf>,

    /// Look for manifests below the source roots, not just directly in them
    #[serde(default)]
    pub recursive: bool,

    /// Task-level option layer
    #[serde(flatten)]
    pub options: TaskOptions,

    /// Contributing layers in precedence order
    #[serde(skip)]
    pub sources: Vec<ConfigSource>,
}

/// `src = "assets"` and `src = ["assets", "vendor"]` are both accepted.
fn one_or_many<'de, D>(deserializer: D) -> Result<Vec<PathBuf>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum OneOrMany {
        One(PathBuf),
        Many(Vec<PathBuf>),
    }

    Ok(match Option::<OneOrMany>::deserialize(deserializer)? {
        None => Vec::new(),
        Some(OneOrMany::One(path)) => vec![path],
        Some(OneOrMany::Many(paths)) => paths,
    })
}

impl TaskConfig {
    /// Build task config from layers: builtin < config file < CLI overrides
    pub fn build(
        config_path: Option<&Path>,
        cli_overrides: Option<Value>,
    ) -> Result<Self, ConfigError> {
        let mut layers = Vec::new();
        let mut sources = Vec::new();

        layers.push(BuiltinDefaults::default().to_value());
        sources.push(ConfigSource {
            origin: ConfigOrigin::Builtin,
            path: None,
            digest: None,
        });

        if let Some(path) = config_path {
            if path.exists() {
                let (value, digest) = Self::load_toml_file(path)?;
                layers.push(value);
                sources.push(ConfigSource {
                    origin: ConfigOrigin::File,
                    path: Some(path.to_string_lossy().to_string()),
                    digest: Some(digest),
                });
            }
        }

        if let Some(cli) = cli_overrides {
            layers.push(cli);
            sources.push(ConfigSource {
                origin: ConfigOrigin::Cli,
                path: None,
                digest: None,
            });
        }

        let merged = merge_layers(layers);
        let mut config: TaskConfig = serde_json::from_value(merged)
            .map_err(|e| ConfigError::ParseError(format!("invalid task config: {}", e)))?;
        config.validate()?;
        config.sources = sources;
        Ok(config)
    }

    /// Load and parse a TOML file, returning the value and digest
    fn load_toml_file(path: &Path) -> Result<(Value, String), ConfigError> {
        let bytes = fs::read(path).map_err(|e| ConfigError::IoError(e.to_string()))?;

        let mut hasher = Sha256::new();
        hasher.update(&bytes);
        let digest = hex::encode(hasher.finalize());

        let contents = String::from_utf8(bytes)
            .map_err(|e| ConfigError::ParseError(format!("Invalid UTF-8: {}", e)))?;

        let toml_value: toml::Value = toml::from_str(&contents)
            .map_err(|e| ConfigError::ParseError(format!("TOML parse error: {}", e)))?;

        Ok((Self::toml_to_json(toml_value), digest))
    }

    /// Convert TOML Value to JSON Value
    fn toml_to_json(toml: toml::Value) -> Value {
        match toml {
            toml::Value::String(s) => Value::String(s),
            toml::Value::Integer(i) => Value::Number(i.into()),
            toml::Value::Float(f) => serde_json::Number::from_f64(f)
                .map(Value::Number)
                .unwrap_or(Value::Null),
            toml::Value::Boolean(b) => Value::Bool(b),
            toml::Value::Datetime(dt) => Value::String(dt.to_string()),
            toml::Value::Array(arr) => Value::Array(arr.into_iter().map(Self::toml_to_json).collect()),
            toml::Value::Table(table) => Value::Object(
                table
                    .into_iter()
                    .map(|(k, v)| (k, Self::toml_to_json(v)))
                    .collect(),
            ),
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if let Some(ext) = &self.options.extension {
            if ext.is_empty() {
                return Err(ConfigError::ValidationError(
                    "extension must not be empty".to_string(),
                ));
            }
            if ext.starts_with('.') {
                return Err(ConfigError::ValidationError(format!(
                    "extension must not start with a dot: {:?}",
                    ext
                )));
            }
            if ext.contains(['/', '\\']) {
                return Err(ConfigError::ValidationError(format!(
                    "extension must not contain a path separator: {:?}",
                    ext
                )));
            }
        }
        Ok(())
    }

    /// Fail unless at least one source root is configured
    pub fn require_sources(&self) -> Result<(), ConfigError> {
        if self.src.is_empty() {
            return Err(ConfigError::ValidationError(
                "no source directories configured (set `src`)".to_string(),
            ));
        }
        Ok(())
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    IoError(String),

    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Validation error: {0}")]
    ValidationError(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_build_with_defaults_only() {
        let config = TaskConfig::build(None, None).unwrap();

        assert!(config.src.is_empty());
        assert!(config.dest.is_none());
        assert!(!config.recursive);
        assert_eq!(config.options, TaskOptions::default());
        assert_eq!(config.sources.len(), 1);
        assert_eq!(config.sources[0].origin, ConfigOrigin::Builtin);
    }

    #[test]
    fn test_load_toml_file() {
        let mut temp = NamedTempFile::new().unwrap();
        writeln!(temp, "src = [\"assets/js\"]").unwrap();
        writeln!(temp, "dest = \"build\"").unwrap();
        writeln!(temp, "banner = true").unwrap();
        writeln!(temp, "extension = \"coffee\"").unwrap();

        let config = TaskConfig::build(Some(temp.path()), None).unwrap();

        assert_eq!(config.src, vec![PathBuf::from("assets/js")]);
        assert_eq!(config.dest, Some(PathBuf::from("build")));
        assert_eq!(config.options.banner, Some(true));
        assert_eq!(config.options.extension.as_deref(), Some("coffee"));
        assert_eq!(config.options.source_map, None);
        assert_eq!(config.sources[1].origin, ConfigOrigin::File);
        assert_eq!(config.sources[1].digest.as_ref().map(|d| d.len()), Some(64));
    }

    #[test]
    fn test_single_src_string() {
        let mut temp = NamedTempFile::new().unwrap();
        writeln!(temp, "src = \"assets\"").unwrap();

        let config = TaskConfig::build(Some(temp.path()), None).unwrap();
        assert_eq!(config.src, vec![PathBuf::from("assets")]);
    }

    #[test]
    fn test_cli_overrides_file() {
        let mut temp = NamedTempFile::new().unwrap();
        writeln!(temp, "src = [\"a\", \"b\"]").unwrap();
        writeln!(temp, "source_map = true").unwrap();

        let cli = serde_json::json!({"src": ["c"], "source_map": false});
        let config = TaskConfig::build(Some(temp.path()), Some(cli)).unwrap();

        assert_eq!(config.src, vec![PathBuf::from("c")]);
        assert_eq!(config.options.source_map, Some(false));
        assert_eq!(config.sources.len(), 3);
    }

    #[test]
    fn test_missing_config_file_is_skipped() {
        let config = TaskConfig::build(Some(Path::new("/nonexistent/manifest-concat.toml")), None)
            .unwrap();
        assert_eq!(config.sources.len(), 1);
    }

    #[test]
    fn test_invalid_toml() {
        let mut temp = NamedTempFile::new().unwrap();
        writeln!(temp, "src = [").unwrap();

        let err = TaskConfig::build(Some(temp.path()), None).unwrap_err();
        assert!(matches!(err, ConfigError::ParseError(_)));
    }

    #[test]
    fn test_validation_extension() {
        for bad in ["", ".js", "a/b"] {
            let cli = serde_json::json!({"extension": bad});
            let err = TaskConfig::build(None, Some(cli)).unwrap_err();
            assert!(err.to_string().contains("extension"), "{}", bad);
        }
    }

    #[test]
    fn test_require_sources() {
        let config = TaskConfig::build(None, None).unwrap();
        assert!(config.require_sources().is_err());

        let config = TaskConfig::build(None, Some(serde_json::json!({"src": ["x"]}))).unwrap();
        assert!(config.require_sources().is_ok());
    }
}
