//! Configuration
//!
//! Task configuration is merged in three layers:
//! 1. Built-in defaults
//! 2. Config file (manifest-concat.toml)
//! 3. CLI flags
//!
//! Each manifest then merges its own `options` block on top of the task
//! options (see [`options`]).

mod defaults;
mod merge;
pub mod options;
mod task;

pub use defaults::{BuiltinDefaults, CONFIG_FILE_NAME};
pub use merge::{deep_merge, merge_layers};
pub use options::{merge_options, EffectiveOptions, ManifestOptions, TaskOptions, DEFAULT_EXTENSION};
pub use task::{ConfigError, ConfigOrigin, ConfigSource, TaskConfig};
