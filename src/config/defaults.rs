//! Built-in task defaults (layer 1)
//!
//! Option fields (`extension`, `cwd`, `banner`, `source_map`) are left out
//! on purpose: unset task options fall through to
//! [`EffectiveOptions::default`](super::EffectiveOptions) during the
//! per-manifest merge.

use serde::{Deserialize, Serialize};

/// Default config file name looked up in the working directory
pub const CONFIG_FILE_NAME: &str = "manifest-concat.toml";

/// Built-in default task settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuiltinDefaults {
    /// Search below source roots for manifests (default: false)
    pub recursive: bool,
}

impl Default for BuiltinDefaults {
    fn default() -> Self {
        Self { recursive: false }
    }
}

impl BuiltinDefaults {
    /// Convert to JSON Value for merging
    pub fn to_value(&self) -> serde_json::Value {
        serde_json::json!({
            "src": [],
            "recursive": self.recursive,
        })
    }
}
