//! Task identifiers
//!
//! `manifest_<sanitized base name>_<first 8 hex chars of sha256(source path)>`.
//! The name keeps ids readable; the hash keeps same-named manifests in
//! different directories apart.

use regex_lite::Regex;
use sha2::{Digest, Sha256};
use std::path::Path;
use std::sync::OnceLock;

/// Prefix shared by every generated id
pub const TASK_ID_PREFIX: &str = "manifest_";

/// Hex characters of the path digest kept in an id
pub const SHORT_HASH_LEN: usize = 8;

fn non_alphanumeric() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new("[^a-z0-9]").expect("static regex"))
}

/// Lower-case and replace every character outside `[a-z0-9]` with `_`
pub fn sanitize(name: &str) -> String {
    non_alphanumeric()
        .replace_all(&name.to_lowercase(), "_")
        .into_owned()
}

/// Truncated SHA-256 of the path string
pub fn short_hash(source_path: &Path) -> String {
    let mut hasher = Sha256::new();
    hasher.update(source_path.to_string_lossy().as_bytes());
    let mut digest = hex::encode(hasher.finalize());
    digest.truncate(SHORT_HASH_LEN);
    digest
}

/// Derive the task id for a manifest
pub fn derive_id(base_name: &str, source_path: &Path) -> String {
    format!(
        "{}{}_{}",
        TASK_ID_PREFIX,
        sanitize(base_name),
        short_hash(source_path)
    )
}
