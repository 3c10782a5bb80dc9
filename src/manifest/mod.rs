//! Manifest documents
//!
//! A [`ManifestDocument`] is built once per manifest file and resolved
//! completely during construction:
//!
//! 1. read and parse the JSON document
//! 2. merge options (defaults < task < manifest)
//! 3. resolve directives into the ordered file list
//! 4. resolve the output target
//! 5. derive the task id
//!
//! Nothing about a document changes afterwards. Read and parse failures
//! are not errors for the run: the document simply resolves to no files
//! and is reported invalid.

pub mod directive;
pub mod target;
pub mod task_id;

pub use directive::{parse_contents, resolve, Directive, DirectiveResolver};
pub use target::resolve_target;
pub use task_id::derive_id;

use concat_job::{banner_for, Job, JobOptions};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::config::{merge_options, EffectiveOptions, ManifestOptions, TaskOptions};
use crate::paths::absolutize;

/// Errors reading a manifest file
#[derive(Debug, thiserror::Error)]
pub enum ManifestError {
    #[error("cannot read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("invalid JSON in {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Top level of a manifest file. Both keys are optional.
#[derive(Debug, Default, Deserialize)]
pub struct RawManifest {
    #[serde(default)]
    pub options: Option<Value>,

    #[serde(default)]
    pub contents: Option<Value>,
}

impl RawManifest {
    /// Read and parse a manifest file
    pub fn from_file(path: &Path) -> Result<Self, ManifestError> {
        let json = fs::read_to_string(path).map_err(|source| ManifestError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&json).map_err(|source| ManifestError::Json {
            path: path.to_path_buf(),
            source,
        })
    }

    /// The `options` block; malformed blocks are dropped with a warning
    pub fn manifest_options(&self) -> ManifestOptions {
        let Some(value) = &self.options else {
            return ManifestOptions::default();
        };
        match ManifestOptions::deserialize(value) {
            Ok(options) => options,
            Err(e) => {
                tracing::warn!(error = %e, "ignoring malformed `options` block");
                ManifestOptions::default()
            }
        }
    }
}

/// Inputs shared by every manifest in a run
#[derive(Debug, Clone, Copy)]
pub struct ResolveContext<'a> {
    /// Directory relative destinations are resolved against
    pub base_dir: &'a Path,

    /// Task-level destination directory
    pub dest: Option<&'a Path>,

    /// Task-level option layer
    pub options: &'a TaskOptions,
}

/// One resolved manifest
#[derive(Debug, Clone, Serialize)]
pub struct ManifestDocument {
    source_path: PathBuf,
    base_directory: PathBuf,
    base_name: String,
    options: EffectiveOptions,
    #[serde(skip)]
    directives: Vec<Directive>,
    resolved_contents: Vec<PathBuf>,
    target: Option<PathBuf>,
    task_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    load_error: Option<String>,
}

impl ManifestDocument {
    /// Load and fully resolve the manifest at `source_path`
    pub fn load(source_path: &Path, ctx: &ResolveContext<'_>) -> Self {
        let source_path = absolutize(ctx.base_dir, source_path);
        tracing::info!(manifest = %source_path.display(), "processing");

        let (raw, load_error) = match RawManifest::from_file(&source_path) {
            Ok(raw) => (raw, None),
            Err(e) => {
                tracing::warn!(error = %e, "manifest unreadable, resolving to no files");
                (RawManifest::default(), Some(e.to_string()))
            }
        };

        let mut document = Self::from_raw(source_path, &raw, ctx);
        document.load_error = load_error;
        document
    }

    /// Resolve an already parsed manifest located at `source_path`
    pub fn from_raw(source_path: PathBuf, raw: &RawManifest, ctx: &ResolveContext<'_>) -> Self {
        let base_directory = source_path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default();
        let base_name = source_path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();

        let options = merge_options(
            &EffectiveOptions::default(),
            ctx.options,
            &raw.manifest_options(),
        );
        tracing::debug!(
            manifest = %source_path.display(),
            extension = %options.extension,
            cwd = %options.cwd,
            banner = options.banner,
            source_map = options.source_map,
            dest = ?options.dest_override,
            "effective options"
        );

        let directives = parse_contents(raw.contents.as_ref());
        let resolved_contents = resolve(&directives, &base_directory, &options);

        let target = match options.dest_override.as_deref() {
            Some(dest) => resolve_target(Some(Path::new(dest)), &base_name, &options.extension, true),
            None => resolve_target(ctx.dest, &base_name, &options.extension, false),
        }
        .map(|t| absolutize(ctx.base_dir, &t));

        let task_id = derive_id(&base_name, &source_path);

        Self {
            source_path,
            base_directory,
            base_name,
            options,
            directives,
            resolved_contents,
            target,
            task_id,
            load_error: None,
        }
    }

    /// Absolute path of the manifest file
    pub fn source_path(&self) -> &Path {
        &self.source_path
    }

    pub fn base_directory(&self) -> &Path {
        &self.base_directory
    }

    /// File name without the `.json` extension
    pub fn base_name(&self) -> &str {
        &self.base_name
    }

    pub fn options(&self) -> &EffectiveOptions {
        &self.options
    }

    /// Directives as parsed, before resolution
    pub fn directives(&self) -> &[Directive] {
        &self.directives
    }

    /// Ordered, duplicate-free list of resolved files
    pub fn resolved_contents(&self) -> &[PathBuf] {
        &self.resolved_contents
    }

    pub fn target(&self) -> Option<&Path> {
        self.target.as_deref()
    }

    pub fn task_id(&self) -> &str {
        &self.task_id
    }

    /// Why the manifest could not be read, if it could not
    pub fn load_error(&self) -> Option<&str> {
        self.load_error.as_deref()
    }

    /// Has files to concatenate and somewhere to put them
    pub fn is_valid(&self) -> bool {
        !self.resolved_contents.is_empty() && self.target.is_some()
    }

    /// Engine options derived from the effective options
    pub fn job_options(&self) -> JobOptions {
        JobOptions {
            banner: self.options.banner.then(|| banner_for(&self.source_path)),
            source_map: self.options.source_map,
        }
    }

    /// The concatenation job for this manifest, if it is valid
    pub fn to_job(&self) -> Option<Job> {
        let target = self.target.clone().filter(|_| self.is_valid())?;
        Job::new(
            self.task_id.clone(),
            self.resolved_contents.clone(),
            target,
            self.job_options(),
        )
        .ok()
    }
}
