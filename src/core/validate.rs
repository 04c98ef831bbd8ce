//! Source validation.
//!
//! A candidate root is valid only when every manifest document is present
//! as a readable regular file. There is no partial credit.

use crate::core::fs::FileSystem;
use crate::core::manifest;
use std::path::Path;

/// True iff every manifest document exists as a readable file under `root`.
pub fn validate_source(fs: &dyn FileSystem, root: &Path) -> bool {
    manifest::documents()
        .iter()
        .all(|doc| fs.is_file(&root.join(doc.rel_path)))
}

/// Manifest paths absent under `root`, in manifest order.
pub fn missing_documents(fs: &dyn FileSystem, root: &Path) -> Vec<&'static str> {
    manifest::documents()
        .iter()
        .filter(|doc| !fs.is_file(&root.join(doc.rel_path)))
        .map(|doc| doc.rel_path)
        .collect()
}
