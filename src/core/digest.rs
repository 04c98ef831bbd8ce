//! Content digests used to report what a write actually changed.

use serde::Serialize;
use sha2::{Digest, Sha256};

pub fn sha256_hex(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    format!("{:x}", hasher.finalize())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FileChange {
    Created,
    Updated,
    Unchanged,
}

impl FileChange {
    /// Compare the previous content of a path (if any) with what is about
    /// to be written there.
    pub fn classify(previous: Option<&[u8]>, next: &[u8]) -> Self {
        match previous {
            None => FileChange::Created,
            Some(prev) if sha256_hex(prev) == sha256_hex(next) => FileChange::Unchanged,
            Some(_) => FileChange::Updated,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sha256_hex_matches_known_vector() {
        assert_eq!(
            sha256_hex(b"abc"),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn classify_distinguishes_all_cases() {
        assert_eq!(FileChange::classify(None, b"x"), FileChange::Created);
        assert_eq!(FileChange::classify(Some(&b"x"[..]), b"x"), FileChange::Unchanged);
        assert_eq!(FileChange::classify(Some(&b"x"[..]), b"y"), FileChange::Updated);
    }
}
