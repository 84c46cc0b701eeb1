//! Storage addresses: where an entry lives on disk.

use std::path::{Path, PathBuf};

use savefs_codec::Format;

use crate::Key;

/// The file holding `key` under `format`: `<root>/<key stem>.<extension>`.
///
/// Pure and deterministic; performs no I/O.
pub fn address_of(root: &Path, key: &Key, format: &Format) -> PathBuf {
    root.join(format!("{}.{}", key.file_stem(), format.extension()))
}
