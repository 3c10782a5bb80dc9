//! Shared fixture builders for integration tests
//!
//! Each fixture is a throwaway directory tree laid out like a small web
//! project: manifests next to the scripts they require.

#![allow(dead_code)]

use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// A temporary project tree
pub struct Project {
    dir: TempDir,
}

impl Project {
    pub fn new() -> Self {
        Self {
            dir: TempDir::new().expect("create temp dir"),
        }
    }

    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    pub fn path(&self, rel: &str) -> PathBuf {
        self.root().join(rel)
    }

    /// Write a file, creating parent directories
    pub fn file(&self, rel: &str, contents: &str) -> &Self {
        let path = self.path(rel);
        fs::create_dir_all(path.parent().expect("has parent")).expect("create parent");
        fs::write(&path, contents).expect("write file");
        self
    }

    /// Write several script files whose contents are their own names
    pub fn scripts(&self, rels: &[&str]) -> &Self {
        for rel in rels {
            self.file(rel, &format!("// {}\n", rel));
        }
        self
    }

    /// Write a manifest document
    pub fn manifest(&self, rel: &str, json: Value) -> &Self {
        self.file(rel, &serde_json::to_string_pretty(&json).expect("serialize manifest"))
    }

    pub fn dir(&self, rel: &str) -> &Self {
        fs::create_dir_all(self.path(rel)).expect("create dir");
        self
    }

    /// Paths relative to the project root, with `/` separators
    pub fn relative(&self, paths: &[PathBuf]) -> Vec<String> {
        paths
            .iter()
            .map(|p| {
                p.strip_prefix(self.root())
                    .expect("path inside project")
                    .to_string_lossy()
                    .replace('\\', "/")
            })
            .collect()
    }
}
