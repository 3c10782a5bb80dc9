//! Output target resolution

use std::path::{Path, PathBuf};

/// Compute where a manifest's output goes.
///
/// - no hint (or an empty one): `None`
/// - `hint_may_be_file` and the hint ends in `.<extension>`: the hint itself
/// - otherwise the hint is a directory: `<hint>/<base_name>.<extension>`
///
/// Task-level hints are shared by every manifest in a run and are always
/// treated as directories; a manifest's own `dest` may name a file.
pub fn resolve_target(
    dest_hint: Option<&Path>,
    base_name: &str,
    extension: &str,
    hint_may_be_file: bool,
) -> Option<PathBuf> {
    let hint = dest_hint.filter(|h| !h.as_os_str().is_empty())?;

    if hint_may_be_file && names_file(hint, extension) {
        return Some(hint.to_path_buf());
    }

    Some(hint.join(format!("{}.{}", base_name, extension)))
}

fn names_file(hint: &Path, extension: &str) -> bool {
    hint.to_string_lossy().ends_with(&format!(".{}", extension))
}
