//! Jobs handed to the concatenation engine.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::JobError;
use crate::{SCHEMA_ID, SCHEMA_VERSION, SOURCE_MAP_EXTENSION};

/// Banner text prepended to a job's output, naming the manifest it came from.
pub fn banner_for(manifest_path: &Path) -> String {
    format!("// Manifest: {}\n\n", manifest_path.display())
}

fn is_false(value: &bool) -> bool {
    !*value
}

/// Per-job options for the concatenation engine
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobOptions {
    /// Text written before the first source
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub banner: Option<String>,

    /// Emit `<destination>.map` alongside the output
    #[serde(default, skip_serializing_if = "is_false")]
    pub source_map: bool,
}

/// One concatenation job: read `sources` in order, write `destination`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Job {
    /// Unique task identifier within a job set
    pub id: String,

    /// Absolute source paths, in concatenation order
    pub sources: Vec<PathBuf>,

    /// Output file
    pub destination: PathBuf,

    pub options: JobOptions,
}

impl Job {
    /// Build a job, rejecting an empty source list.
    pub fn new(
        id: impl Into<String>,
        sources: Vec<PathBuf>,
        destination: PathBuf,
        options: JobOptions,
    ) -> Result<Self, JobError> {
        let id = id.into();
        if sources.is_empty() {
            return Err(JobError::NoSources(id));
        }
        Ok(Self {
            id,
            sources,
            destination,
            options,
        })
    }

    /// Where the source map goes, if one was requested
    pub fn source_map_destination(&self) -> Option<PathBuf> {
        if !self.options.source_map {
            return None;
        }
        let mut name = self.destination.clone().into_os_string();
        name.push(".");
        name.push(SOURCE_MAP_EXTENSION);
        Some(PathBuf::from(name))
    }
}

/// Ordered set of jobs produced by one discovery run (`jobs.json`)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobSet {
    /// Schema version
    pub schema_version: u32,

    /// Schema identifier
    pub schema_id: String,

    /// When the set was produced
    pub created_at: DateTime<Utc>,

    /// Jobs in emission order
    pub jobs: Vec<Job>,
}

impl Default for JobSet {
    fn default() -> Self {
        Self::new()
    }
}

impl JobSet {
    pub fn new() -> Self {
        Self {
            schema_version: SCHEMA_VERSION,
            schema_id: SCHEMA_ID.to_string(),
            created_at: Utc::now(),
            jobs: Vec::new(),
        }
    }

    /// Append a job, keeping ids unique.
    pub fn push(&mut self, job: Job) -> Result<(), JobError> {
        if self.contains(&job.id) {
            return Err(JobError::DuplicateId(job.id));
        }
        self.jobs.push(job);
        Ok(())
    }

    pub fn contains(&self, id: &str) -> bool {
        self.jobs.iter().any(|j| j.id == id)
    }

    /// Find a job by id
    pub fn get(&self, id: &str) -> Option<&Job> {
        self.jobs.iter().find(|j| j.id == id)
    }

    pub fn len(&self) -> usize {
        self.jobs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.jobs.is_empty()
    }

    /// Job ids in the order the engine should run them
    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.jobs.iter().map(|j| j.id.as_str())
    }

    /// Serialize to JSON
    pub fn to_json(&self) -> Result<String, JobError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Load from JSON, checking the schema version
    pub fn from_json(json: &str) -> Result<Self, JobError> {
        let set: Self = serde_json::from_str(json)?;
        if set.schema_version != SCHEMA_VERSION {
            return Err(JobError::SchemaVersion {
                found: set.schema_version,
                expected: SCHEMA_VERSION,
            });
        }
        Ok(set)
    }

    /// Write to file
    pub fn write_to_file(&self, path: &Path) -> Result<(), JobError> {
        let json = self.to_json()?;
        fs::write(path, json).map_err(|source| JobError::Io {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Load from file
    pub fn from_file(path: &Path) -> Result<Self, JobError> {
        let json = fs::read_to_string(path).map_err(|source| JobError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&json)
    }
}
