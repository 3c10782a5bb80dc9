//! Filesystem expansion for directory directives
//!
//! Two primitives back `require_directory` and `require_tree`:
//! - [`matching_directories`] expands a glob pattern into directories
//! - [`list_files`] lists `*.<extension>` files under one directory
//!
//! Results are always sorted by path (component-wise, so a directory's
//! contents follow the directory name), never in `read_dir` order. Entries
//! whose name starts with a dot are skipped, as shell globs do.

use globset::{Glob, GlobBuilder, GlobMatcher};
use std::path::{Component, Path, PathBuf};
use walkdir::{DirEntry, WalkDir};

use crate::paths::is_hidden;

/// Errors for expansion
#[derive(Debug, thiserror::Error)]
pub enum ExpandError {
    #[error("Glob pattern error: {0}")]
    GlobError(#[from] globset::Error),

    #[error("Walk error: {0}")]
    WalkError(#[from] walkdir::Error),
}

/// How far below a directory [`list_files`] looks
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Depth {
    /// Direct children only (`*.ext`)
    Immediate,
    /// Any depth (`**/*.ext`)
    Recursive,
}

impl Depth {
    fn max_depth(self) -> usize {
        match self {
            Depth::Immediate => 1,
            Depth::Recursive => usize::MAX,
        }
    }
}

const GLOB_META: &[char] = &['*', '?', '[', '{'];

fn has_glob_meta(component: &str) -> bool {
    component.contains(GLOB_META)
}

/// Split a pattern into its literal leading directory and the glob remainder
fn split_pattern(pattern: &Path) -> (PathBuf, Vec<String>) {
    let mut base = PathBuf::new();
    let mut rest = Vec::new();

    for component in pattern.components() {
        let text = component.as_os_str().to_string_lossy();
        if rest.is_empty() && !(matches!(component, Component::Normal(_)) && has_glob_meta(&text)) {
            base.push(component);
        } else {
            rest.push(text.into_owned());
        }
    }

    (base, rest)
}

fn visible(entry: &DirEntry) -> bool {
    entry.depth() == 0 || !is_hidden(entry.path())
}

/// Expand `pattern` into every existing path it matches, sorted.
///
/// A pattern without wildcards matches itself if it exists.
pub fn expand_pattern(pattern: &Path) -> Result<Vec<PathBuf>, ExpandError> {
    let (base, rest) = split_pattern(pattern);

    if rest.is_empty() {
        return Ok(if pattern.exists() {
            vec![base]
        } else {
            Vec::new()
        });
    }

    if !base.is_dir() {
        return Ok(Vec::new());
    }

    let max_depth = if rest.iter().any(|c| c.contains("**")) {
        usize::MAX
    } else {
        rest.len()
    };
    let matcher = GlobBuilder::new(&rest.join("/"))
        .literal_separator(true)
        .build()?
        .compile_matcher();

    let mut matches = Vec::new();
    for entry in WalkDir::new(&base)
        .min_depth(1)
        .max_depth(max_depth)
        .follow_links(false)
        .into_iter()
        .filter_entry(visible)
    {
        let entry = entry?;
        let Ok(rel_path) = entry.path().strip_prefix(&base) else {
            continue;
        };
        if matcher.is_match(rel_path) {
            matches.push(entry.into_path());
        }
    }

    matches.sort();
    Ok(matches)
}

/// Expand `pattern` and keep only directories
pub fn matching_directories(pattern: &Path) -> Result<Vec<PathBuf>, ExpandError> {
    Ok(expand_pattern(pattern)?
        .into_iter()
        .filter(|p| p.is_dir())
        .collect())
}

fn extension_matcher(extension: &str) -> Result<GlobMatcher, ExpandError> {
    let pattern = format!("*.{}", globset::escape(extension));
    Ok(Glob::new(&pattern)?.compile_matcher())
}

/// List regular files named `*.<extension>` under `dir`, sorted by path.
///
/// Ordering is component-wise, not plain string order: `a/b/y.js` comes
/// before `a.js`.
pub fn list_files(dir: &Path, extension: &str, depth: Depth) -> Result<Vec<PathBuf>, ExpandError> {
    let matcher = extension_matcher(extension)?;
    let mut files = Vec::new();

    for entry in WalkDir::new(dir)
        .min_depth(1)
        .max_depth(depth.max_depth())
        .follow_links(false)
        .into_iter()
        .filter_entry(visible)
    {
        let entry = entry?;
        if !entry.path().is_file() {
            continue;
        }
        if matcher.is_match(entry.file_name()) {
            files.push(entry.into_path());
        }
    }

    files.sort();
    Ok(files)
}
