//! BLP0 external mipmap filename convention.
//!
//! Given main path `X.blp`, mipmap `i` lives at `X.b<NN>` where `NN` is the
//! two-digit zero-padded mipmap index (spec.md §6). Grounded on the
//! teacher's `path::make_mipmap_path`, which keyed off the same convention.

use std::ffi::OsStr;
use std::path::{Path, PathBuf};

/// Derive the sidecar path for mipmap level `i` of `main_path`. Returns
/// `None` if `main_path` doesn't have a `.blp` extension (case-insensitive)
/// to replace.
pub fn make_mipmap_path(main_path: &Path, i: usize) -> Option<PathBuf> {
    let ext = main_path.extension().and_then(OsStr::to_str)?;
    if !ext.eq_ignore_ascii_case("blp") {
        return None;
    }
    Some(main_path.with_extension(format!("b{i:02}")))
}
