//! Concatenation job types
//!
//! Defines the hand-off between manifest resolution and the concatenation
//! engine: one [`Job`] per valid manifest, collected into a [`JobSet`].

pub mod error;
pub mod job;

pub use error::JobError;
pub use job::{banner_for, Job, JobOptions, JobSet};

/// Schema version for the job set document.
pub const SCHEMA_VERSION: u32 = 1;

/// Schema identifier for the job set document.
pub const SCHEMA_ID: &str = "manifest-concat/jobs@1";

/// Extension appended to a job destination for its source map.
pub const SOURCE_MAP_EXTENSION: &str = "map";
