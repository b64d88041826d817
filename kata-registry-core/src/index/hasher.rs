//! Content hashing for component bundles
//!
//! Uses SHA-256 over the bundle's files in canonical order. Each file
//! contributes its relative path and its bytes, both length-prefixed, so
//! renames and moves change the digest and no two file sets can produce the
//! same input stream.

use sha2::{Digest, Sha256};

use super::bundle::ComponentBundle;

/// Length of a hex-encoded SHA-256 digest
pub const HASH_LEN: usize = 64;

/// Hash a bundle's file set
pub fn hash_bundle(bundle: &ComponentBundle) -> String {
    hash_files(
        bundle
            .files()
            .iter()
            .map(|f| (f.consumer_path.as_str(), f.content.as_bytes())),
    )
}

/// Hash `(relative path, bytes)` pairs; the pairs are sorted by path first
pub fn hash_files<'a>(files: impl IntoIterator<Item = (&'a str, &'a [u8])>) -> String {
    let mut files: Vec<(&str, &[u8])> = files.into_iter().collect();
    files.sort_by(|a, b| a.0.cmp(b.0));

    let mut hasher = Sha256::new();
    for (path, content) in files {
        hasher.update((path.len() as u64).to_be_bytes());
        hasher.update(path.as_bytes());
        hasher.update((content.len() as u64).to_be_bytes());
        hasher.update(content);
    }

    hex::encode(hasher.finalize())
}

/// Whether a string is a well-formed content hash
pub fn is_valid_hash(hash: &str) -> bool {
    hash.len() == HASH_LEN && hash.bytes().all(|b| matches!(b, b'0'..=b'9' | b'a'..=b'f'))
}
