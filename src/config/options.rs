//! Per-manifest option merging
//!
//! Three layers, lowest to highest precedence:
//! 1. Built-in defaults ([`EffectiveOptions::default`])
//! 2. Task options (config file / CLI), shared by every manifest in a run
//! 3. The manifest's own `options` block
//!
//! Each field is merged on its own and the result is a fresh value; the
//! lower layers are only ever borrowed.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Default extension for expansion filters and target names
pub const DEFAULT_EXTENSION: &str = "js";

/// Fully merged options for a single manifest
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EffectiveOptions {
    /// Extension used by directory expansion and target naming (no dot)
    pub extension: String,

    /// Offset joined between the manifest directory and `require` paths
    pub cwd: String,

    /// Prepend a banner naming the manifest
    pub banner: bool,

    /// Ask the concatenation engine for a source map
    pub source_map: bool,

    /// Manifest-level destination, file or directory
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dest_override: Option<String>,
}

impl Default for EffectiveOptions {
    fn default() -> Self {
        Self {
            extension: DEFAULT_EXTENSION.to_string(),
            cwd: String::new(),
            banner: false,
            source_map: false,
            dest_override: None,
        }
    }
}

/// Task-level options (layer 2). Unset fields fall through to the defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskOptions {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_map: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub banner: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extension: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cwd: Option<String>,
}

/// The `options` block of a manifest document (layer 3)
///
/// Booleans follow JavaScript truthiness, so `1` or `"yes"` enable a flag
/// and `0`, `""` or `null` disable it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ManifestOptions {
    #[serde(default, deserialize_with = "truthy")]
    pub source_map: Option<bool>,

    #[serde(default, deserialize_with = "truthy")]
    pub banner: Option<bool>,

    #[serde(default, deserialize_with = "lenient_string")]
    pub cwd: Option<String>,

    #[serde(default, deserialize_with = "lenient_string")]
    pub dest: Option<String>,
}

fn truthy<'de, D>(deserializer: D) -> Result<Option<bool>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(Some(is_truthy(&value)))
}

/// Non-string values are dropped with a warning instead of failing the
/// whole `options` block.
fn lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::String(s) => Ok(Some(s)),
        Value::Null => Ok(None),
        other => {
            tracing::warn!(value = %other, "option is not a string, ignoring it");
            Ok(None)
        }
    }
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map(|f| f != 0.0 && !f.is_nan()).unwrap_or(true),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// Merge the three option layers into a new [`EffectiveOptions`].
pub fn merge_options(
    defaults: &EffectiveOptions,
    task: &TaskOptions,
    manifest: &ManifestOptions,
) -> EffectiveOptions {
    EffectiveOptions {
        extension: task
            .extension
            .clone()
            .unwrap_or_else(|| defaults.extension.clone()),
        cwd: manifest
            .cwd
            .clone()
            .or_else(|| task.cwd.clone())
            .unwrap_or_else(|| defaults.cwd.clone()),
        banner: manifest.banner.or(task.banner).unwrap_or(defaults.banner),
        source_map: manifest
            .source_map
            .or(task.source_map)
            .unwrap_or(defaults.source_map),
        dest_override: manifest
            .dest
            .clone()
            .filter(|d| !d.is_empty())
            .or_else(|| defaults.dest_override.clone()),
    }
}
