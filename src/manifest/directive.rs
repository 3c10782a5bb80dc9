//! Manifest directives and their resolution
//!
//! A manifest's `contents` array is turned into a list of [`Directive`]s,
//! which are then applied in order by a [`DirectiveResolver`]. The
//! resolver owns the only mutable state of a resolution: the accumulated
//! file list and its membership set. Both are scoped to one manifest.

use serde_json::Value;
use std::collections::HashSet;
use std::fmt;
use std::path::{Path, PathBuf};

use crate::config::EffectiveOptions;
use crate::expand::{list_files, matching_directories, Depth};
use crate::paths::join_normalized;

/// One instruction from a manifest's `contents`
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Directive {
    /// A single file, relative to the manifest directory plus `cwd`
    Require(String),
    /// Resolved exactly like `Require`
    Include(String),
    /// `*.<extension>` directly inside every directory matching the glob
    RequireDirectory(String),
    /// `**/*.<extension>` below every directory matching the glob
    RequireTree(String),
    /// Unknown key; logged and ignored
    Unhandled { kind: String },
}

impl Directive {
    pub const REQUIRE: &'static str = "require";
    pub const INCLUDE: &'static str = "include";
    pub const REQUIRE_DIRECTORY: &'static str = "require_directory";
    pub const REQUIRE_TREE: &'static str = "require_tree";

    /// Build a directive from an object key (case-insensitive) and its value.
    ///
    /// Returns `None` when a known directive carries a non-string value.
    pub fn from_entry(key: &str, value: &Value) -> Option<Self> {
        let kind = key.to_lowercase();
        let make: fn(String) -> Directive = match kind.as_str() {
            Self::REQUIRE => Directive::Require,
            Self::INCLUDE => Directive::Include,
            Self::REQUIRE_DIRECTORY => Directive::RequireDirectory,
            Self::REQUIRE_TREE => Directive::RequireTree,
            _ => return Some(Directive::Unhandled { kind }),
        };
        value.as_str().map(|v| make(v.to_string()))
    }

    /// Directive key as written in a manifest
    pub fn kind(&self) -> &str {
        match self {
            Directive::Require(_) => Self::REQUIRE,
            Directive::Include(_) => Self::INCLUDE,
            Directive::RequireDirectory(_) => Self::REQUIRE_DIRECTORY,
            Directive::RequireTree(_) => Self::REQUIRE_TREE,
            Directive::Unhandled { kind } => kind,
        }
    }
}

impl fmt::Display for Directive {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Directive::Require(v)
            | Directive::Include(v)
            | Directive::RequireDirectory(v)
            | Directive::RequireTree(v) => write!(f, "{} {}", self.kind(), v),
            Directive::Unhandled { kind } => write!(f, "{} (unhandled)", kind),
        }
    }
}

/// Parse a manifest's `contents` value into directives, in order.
///
/// Strings are plain requires; each key of an object is its own directive,
/// taken in the order the keys appear. Anything else is skipped. A missing
/// or non-array `contents` yields no directives.
pub fn parse_contents(contents: Option<&Value>) -> Vec<Directive> {
    let Some(entries) = contents.and_then(Value::as_array) else {
        if contents.is_some() {
            tracing::warn!("`contents` is not an array, ignoring it");
        }
        return Vec::new();
    };

    let mut directives = Vec::new();
    for (index, entry) in entries.iter().enumerate() {
        match entry {
            Value::String(path) => directives.push(Directive::Require(path.clone())),
            Value::Object(map) => {
                for (key, value) in map {
                    match Directive::from_entry(key, value) {
                        Some(directive) => directives.push(directive),
                        None => tracing::warn!(
                            index,
                            directive = %key,
                            "directive value is not a string, skipping"
                        ),
                    }
                }
            }
            other => tracing::warn!(index, entry = %other, "unsupported contents entry, skipping"),
        }
    }
    directives
}

/// Applies directives for one manifest, keeping first occurrences only
pub struct DirectiveResolver<'a> {
    manifest_dir: &'a Path,
    options: &'a EffectiveOptions,
    contents: Vec<PathBuf>,
    seen: HashSet<PathBuf>,
}

impl<'a> DirectiveResolver<'a> {
    pub fn new(manifest_dir: &'a Path, options: &'a EffectiveOptions) -> Self {
        Self {
            manifest_dir,
            options,
            contents: Vec::new(),
            seen: HashSet::new(),
        }
    }

    /// Apply one directive, appending whatever it contributes
    pub fn apply(&mut self, directive: &Directive) {
        match directive {
            Directive::Require(value) | Directive::Include(value) => {
                let path = join_normalized(self.manifest_dir, &[&self.options.cwd, value]);
                self.add_file(path);
            }
            Directive::RequireDirectory(pattern) => self.add_matching(pattern, Depth::Immediate),
            Directive::RequireTree(pattern) => self.add_matching(pattern, Depth::Recursive),
            Directive::Unhandled { kind } => {
                tracing::warn!(directive = %kind, "directive unhandled");
            }
        }
    }

    fn add_matching(&mut self, pattern: &str, depth: Depth) {
        let full_pattern = join_normalized(self.manifest_dir, &[pattern]);

        let directories = match matching_directories(&full_pattern) {
            Ok(dirs) => dirs,
            Err(e) => {
                tracing::warn!(pattern = %full_pattern.display(), error = %e, "cannot expand pattern");
                return;
            }
        };
        if directories.is_empty() {
            tracing::warn!(pattern = %full_pattern.display(), "pattern matched no directory");
            return;
        }

        for dir in directories {
            match list_files(&dir, &self.options.extension, depth) {
                Ok(files) => {
                    for file in files {
                        self.add_file(file);
                    }
                }
                Err(e) => {
                    tracing::warn!(dir = %dir.display(), error = %e, "cannot list directory");
                }
            }
        }
    }

    fn add_file(&mut self, path: PathBuf) {
        if !path.is_file() {
            tracing::warn!(path = %path.display(), "file not found, skipping");
            return;
        }
        if self.seen.contains(&path) {
            tracing::trace!(path = %path.display(), "already included");
            return;
        }
        tracing::debug!(path = %path.display(), "added");
        self.seen.insert(path.clone());
        self.contents.push(path);
    }

    /// The resolved, duplicate-free file list
    pub fn finish(self) -> Vec<PathBuf> {
        self.contents
    }
}

/// Resolve directives in order into a deduplicated list of existing files
pub fn resolve(
    directives: &[Directive],
    manifest_dir: &Path,
    options: &EffectiveOptions,
) -> Vec<PathBuf> {
    let mut resolver = DirectiveResolver::new(manifest_dir, options);
    for directive in directives {
        resolver.apply(directive);
    }
    resolver.finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::fs;
    use tempfile::TempDir;

    fn tree(files: &[&str]) -> TempDir {
        let dir = TempDir::new().unwrap();
        for file in files {
            let path = dir.path().join(file);
            fs::create_dir_all(path.parent().unwrap()).unwrap();
            fs::write(&path, file.as_bytes()).unwrap();
        }
        dir
    }

    fn names(root: &Path, paths: &[PathBuf]) -> Vec<String> {
        paths
            .iter()
            .map(|p| p.strip_prefix(root).unwrap().to_string_lossy().replace('\\', "/"))
            .collect()
    }

    fn run(root: &Path, contents: Value, options: &EffectiveOptions) -> Vec<String> {
        let directives = parse_contents(Some(&contents));
        names(root, &resolve(&directives, root, options))
    }

    #[test]
    fn test_parse_strings_and_objects() {
        let contents = json!([
            "a.js",
            {"require": "b.js"},
            {"REQUIRE_DIRECTORY": "lib"},
            {"require_tree": "vendor", "include": "c.js"},
            {"bogus": "x"}
        ]);
        let directives = parse_contents(Some(&contents));
        assert_eq!(
            directives,
            vec![
                Directive::Require("a.js".into()),
                Directive::Require("b.js".into()),
                Directive::RequireDirectory("lib".into()),
                Directive::RequireTree("vendor".into()),
                Directive::Include("c.js".into()),
                Directive::Unhandled { kind: "bogus".into() },
            ]
        );
    }

    #[test]
    fn test_parse_skips_bad_entries() {
        let contents = json!([42, null, {"require": 7}, "ok.js"]);
        assert_eq!(
            parse_contents(Some(&contents)),
            vec![Directive::Require("ok.js".into())]
        );
    }

    #[test]
    fn test_parse_non_array_contents() {
        assert!(parse_contents(None).is_empty());
        assert!(parse_contents(Some(&json!({"require": "a.js"}))).is_empty());
        assert!(parse_contents(Some(&json!("a.js"))).is_empty());
    }

    #[test]
    fn test_require_keeps_manifest_order() {
        let dir = tree(&["a.js", "b.js", "c.js"]);
        let out = run(dir.path(), json!(["c.js", "a.js", {"require": "b.js"}]), &EffectiveOptions::default());
        assert_eq!(out, vec!["c.js", "a.js", "b.js"]);
    }

    #[test]
    fn test_require_skips_missing_files() {
        let dir = tree(&["a.js", "c.js"]);
        let out = run(dir.path(), json!(["a.js", "missing.js", "c.js"]), &EffectiveOptions::default());
        assert_eq!(out, vec!["a.js", "c.js"]);
    }

    #[test]
    fn test_require_skips_directories() {
        let dir = tree(&["lib/a.js"]);
        let out = run(dir.path(), json!(["lib"]), &EffectiveOptions::default());
        assert!(out.is_empty());
    }

    #[test]
    fn test_require_dedup_first_wins() {
        let dir = tree(&["a.js", "b.js"]);
        let out = run(
            dir.path(),
            json!(["a.js", "b.js", "./a.js", "lib/../a.js"]),
            &EffectiveOptions::default(),
        );
        assert_eq!(out, vec!["a.js", "b.js"]);
    }

    #[test]
    fn test_require_uses_cwd() {
        let dir = tree(&["src/a.js", "a.js"]);
        let options = EffectiveOptions {
            cwd: "src".to_string(),
            ..Default::default()
        };
        let out = run(dir.path(), json!(["a.js"]), &options);
        assert_eq!(out, vec!["src/a.js"]);
    }

    #[test]
    fn test_include_is_require() {
        let dir = tree(&["src/a.js"]);
        let options = EffectiveOptions {
            cwd: "src".to_string(),
            ..Default::default()
        };
        let out = run(dir.path(), json!([{"include": "a.js"}, "a.js", {"include": "nope.js"}]), &options);
        assert_eq!(out, vec!["src/a.js"]);
    }

    #[test]
    fn test_require_directory_lexical_and_filtered() {
        let dir = tree(&["lib/c.js", "lib/b.js", "lib/x.css", "lib/sub/d.js"]);
        let out = run(dir.path(), json!([{"require_directory": "lib"}]), &EffectiveOptions::default());
        assert_eq!(out, vec!["lib/b.js", "lib/c.js"]);
    }

    #[test]
    fn test_require_directory_ignores_cwd() {
        let dir = tree(&["lib/a.js", "src/lib/b.js"]);
        let options = EffectiveOptions {
            cwd: "src".to_string(),
            ..Default::default()
        };
        let out = run(dir.path(), json!([{"require_directory": "lib"}]), &options);
        assert_eq!(out, vec!["lib/a.js"]);
    }

    #[test]
    fn test_require_directory_glob() {
        let dir = tree(&["mods/b/2.js", "mods/a/1.js", "mods/a/deep/3.js"]);
        let out = run(dir.path(), json!([{"require_directory": "mods/*"}]), &EffectiveOptions::default());
        assert_eq!(out, vec!["mods/a/1.js", "mods/b/2.js"]);
    }

    #[test]
    fn test_require_before_require_directory() {
        let dir = tree(&["lib/a.js", "lib/b.js", "lib/c.js"]);
        let out = run(
            dir.path(),
            json!(["lib/c.js", {"require_directory": "lib"}]),
            &EffectiveOptions::default(),
        );
        assert_eq!(out, vec!["lib/c.js", "lib/a.js", "lib/b.js"]);

        let out = run(
            dir.path(),
            json!([{"require_directory": "lib"}, "lib/c.js"]),
            &EffectiveOptions::default(),
        );
        assert_eq!(out, vec!["lib/a.js", "lib/b.js", "lib/c.js"]);
    }

    #[test]
    fn test_require_tree_nested_and_deduplicated() {
        let dir = tree(&["app/main.js", "app/models/user.js", "app/models/base/model.js", "app/views/list.js"]);
        let out = run(
            dir.path(),
            json!([
                "app/models/base/model.js",
                {"require_directory": "app"},
                {"require_tree": "app"}
            ]),
            &EffectiveOptions::default(),
        );
        assert_eq!(
            out,
            vec![
                "app/models/base/model.js",
                "app/main.js",
                "app/models/user.js",
                "app/views/list.js",
            ]
        );
    }

    #[test]
    fn test_extension_drives_expansion() {
        let dir = tree(&["lib/a.coffee", "lib/b.js"]);
        let options = EffectiveOptions {
            extension: "coffee".to_string(),
            ..Default::default()
        };
        let out = run(dir.path(), json!([{"require_tree": "lib"}]), &options);
        assert_eq!(out, vec!["lib/a.coffee"]);
    }

    #[test]
    fn test_unmatched_pattern_and_unknown_directive_are_ignored() {
        let dir = tree(&["a.js"]);
        let out = run(
            dir.path(),
            json!([{"require_tree": "nope"}, {"require_self": "x"}, "a.js"]),
            &EffectiveOptions::default(),
        );
        assert_eq!(out, vec!["a.js"]);
    }

    #[test]
    fn test_directive_display() {
        assert_eq!(Directive::RequireTree("lib".into()).to_string(), "require_tree lib");
        assert_eq!(
            Directive::Unhandled { kind: "x".into() }.to_string(),
            "x (unhandled)"
        );
    }
}
