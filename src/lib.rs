//! manifest-concat - ordered file lists from JSON require manifests
//!
//! Resolves manifest files (JSON documents listing source files and
//! directory-expansion directives) into deduplicated, ordered file lists
//! with an output target, and hands them to a concatenation engine as
//! [`concat_job::Job`]s.

pub mod config;
pub mod discovery;
pub mod expand;
pub mod manifest;
pub mod paths;

pub use concat_job::{Job, JobOptions, JobSet};
pub use config::{EffectiveOptions, TaskConfig, TaskOptions};
pub use discovery::{discover, DiscoveryReport, ManifestDiscovery};
pub use manifest::{Directive, ManifestDocument, ResolveContext};
