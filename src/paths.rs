//! Lexical path helpers
//!
//! Paths are compared for deduplication by value, so `lib/../a.js` and
//! `a.js` have to collapse to the same [`PathBuf`] without touching the
//! filesystem.

use std::path::{Component, Path, PathBuf};

/// Resolve `.` and `..` components without requiring the path to exist
pub fn normalize_path(path: &Path) -> PathBuf {
    let mut components: Vec<Component<'_>> = Vec::new();

    for component in path.components() {
        match component {
            Component::ParentDir => match components.last() {
                Some(Component::Normal(_)) => {
                    components.pop();
                }
                // `..` at the root stays at the root
                Some(Component::RootDir) | Some(Component::Prefix(_)) => {}
                _ => components.push(component),
            },
            Component::CurDir => {}
            other => components.push(other),
        }
    }

    components.iter().collect()
}

/// Join `parts` onto `base` and normalize.
///
/// Unlike [`Path::join`], an absolute part does not replace what came
/// before it: `/`-prefixed manifest entries stay inside the manifest
/// directory.
pub fn join_normalized(base: &Path, parts: &[&str]) -> PathBuf {
    let mut joined = base.to_path_buf();
    for part in parts {
        let relative = part.trim_start_matches(['/', '\\']);
        if !relative.is_empty() {
            joined.push(relative);
        }
    }
    normalize_path(&joined)
}

/// Make `path` absolute against `base_dir`, normalizing the result
pub fn absolutize(base_dir: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        normalize_path(path)
    } else {
        normalize_path(&base_dir.join(path))
    }
}

/// True for `.git`, `.DS_Store` and friends
pub fn is_hidden(path: &Path) -> bool {
    path.file_name()
        .and_then(|n| n.to_str())
        .map(|n| n.starts_with('.'))
        .unwrap_or(false)
}
