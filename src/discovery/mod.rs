//! Manifest discovery
//!
//! Walks the configured source roots for `*.json` manifests, resolves each
//! one and collects the valid ones into a [`JobSet`] for the concatenation
//! engine. Nothing here is fatal: bad roots and bad manifests are logged
//! and left out.

use concat_job::JobSet;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::config::{TaskConfig, TaskOptions};
use crate::manifest::{ManifestDocument, ResolveContext};
use crate::paths::{absolutize, is_hidden};

/// Manifest file extension
pub const MANIFEST_EXTENSION: &str = "json";

/// Outcome of a discovery run
#[derive(Debug, Default)]
pub struct DiscoveryReport {
    /// Jobs for every valid manifest, in discovery order
    pub jobs: JobSet,

    /// Every manifest that was resolved, valid or not
    pub documents: Vec<ManifestDocument>,

    /// Source roots skipped because they are not directories
    pub skipped_roots: Vec<PathBuf>,
}

impl DiscoveryReport {
    /// Manifests that produced no job
    pub fn invalid(&self) -> impl Iterator<Item = &ManifestDocument> {
        self.documents.iter().filter(|d| !d.is_valid())
    }
}

/// Finds and resolves manifests under a set of source roots
#[derive(Debug, Clone)]
pub struct ManifestDiscovery {
    base_dir: PathBuf,
    dest: Option<PathBuf>,
    options: TaskOptions,
    recursive: bool,
}

impl ManifestDiscovery {
    /// Relative roots and destinations are resolved against `base_dir`
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
            dest: None,
            options: TaskOptions::default(),
            recursive: false,
        }
    }

    /// Take destination, options and policy from a task config
    pub fn from_config(config: &TaskConfig, base_dir: impl Into<PathBuf>) -> Self {
        let mut discovery = Self::new(base_dir)
            .with_options(config.options.clone())
            .with_recursive(config.recursive);
        if let Some(dest) = &config.dest {
            discovery = discovery.with_dest(dest);
        }
        discovery
    }

    /// Set the task-level destination directory. An empty path means no
    /// destination, so manifests without their own `dest` get no target.
    pub fn with_dest(mut self, dest: impl AsRef<Path>) -> Self {
        let dest = dest.as_ref();
        self.dest = if dest.as_os_str().is_empty() {
            None
        } else {
            Some(absolutize(&self.base_dir, dest))
        };
        self
    }

    pub fn with_options(mut self, options: TaskOptions) -> Self {
        self.options = options;
        self
    }

    /// Search whole trees instead of direct children only
    pub fn with_recursive(mut self, recursive: bool) -> Self {
        self.recursive = recursive;
        self
    }

    /// Manifest files under `root`, sorted by path
    pub fn find_manifests(&self, root: &Path) -> Result<Vec<PathBuf>, walkdir::Error> {
        let max_depth = if self.recursive { usize::MAX } else { 1 };
        let mut manifests = Vec::new();

        for entry in WalkDir::new(root)
            .min_depth(1)
            .max_depth(max_depth)
            .follow_links(false)
            .into_iter()
            .filter_entry(|e| e.depth() == 0 || !is_hidden(e.path()))
        {
            let entry = entry?;
            let path = entry.path();
            if path.is_file() && path.extension().is_some_and(|ext| ext == MANIFEST_EXTENSION) {
                manifests.push(entry.into_path());
            }
        }

        manifests.sort();
        Ok(manifests)
    }

    fn dest_is_usable(&self) -> bool {
        match &self.dest {
            Some(dest) if dest.exists() && !dest.is_dir() => {
                tracing::warn!(dest = %dest.display(), "destination is not a directory, skipping");
                false
            }
            _ => true,
        }
    }

    /// Resolve every manifest under `roots` and collect the valid ones
    pub fn discover<P: AsRef<Path>>(&self, roots: &[P]) -> DiscoveryReport {
        let mut report = DiscoveryReport::default();

        if !self.dest_is_usable() {
            report.skipped_roots = roots
                .iter()
                .map(|r| absolutize(&self.base_dir, r.as_ref()))
                .collect();
            return report;
        }

        let ctx = ResolveContext {
            base_dir: &self.base_dir,
            dest: self.dest.as_deref(),
            options: &self.options,
        };
        let mut visited = HashSet::new();

        for root in roots {
            let root = absolutize(&self.base_dir, root.as_ref());
            if !root.is_dir() {
                tracing::warn!(root = %root.display(), "source is not a directory, skipping");
                report.skipped_roots.push(root);
                continue;
            }

            let manifests = match self.find_manifests(&root) {
                Ok(manifests) => manifests,
                Err(e) => {
                    tracing::warn!(root = %root.display(), error = %e, "cannot scan source, skipping");
                    report.skipped_roots.push(root);
                    continue;
                }
            };

            for manifest_path in manifests {
                if !visited.insert(manifest_path.clone()) {
                    tracing::debug!(manifest = %manifest_path.display(), "already processed");
                    continue;
                }

                let document = ManifestDocument::load(&manifest_path, &ctx);
                if let Some(job) = document.to_job() {
                    tracing::info!(
                        task = %job.id,
                        files = job.sources.len(),
                        dest = %job.destination.display(),
                        "job ready"
                    );
                    if let Err(e) = report.jobs.push(job) {
                        tracing::warn!(error = %e, "dropping job");
                    }
                } else {
                    tracing::debug!(manifest = %manifest_path.display(), "no files or no target, skipping");
                }
                report.documents.push(document);
            }
        }

        if report.jobs.is_empty() {
            tracing::info!("no manifests produced a job");
        }
        report
    }
}

/// Discover manifests under `source_roots` and return the emitted jobs.
///
/// Relative paths are resolved against `base_dir`; manifests are looked up
/// directly inside each root.
pub fn discover<P: AsRef<Path>>(
    base_dir: &Path,
    source_roots: &[P],
    dest_hint: Option<&Path>,
    task_options: &TaskOptions,
) -> JobSet {
    let mut discovery = ManifestDiscovery::new(base_dir).with_options(task_options.clone());
    if let Some(dest) = dest_hint {
        discovery = discovery.with_dest(dest);
    }
    discovery.discover(source_roots).jobs
}
