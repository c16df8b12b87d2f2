//! Structural digest for catalog objects.
//!
//! The digest is fed by the same `Hash` implementation that backs equality,
//! so two objects that compare equal always produce the same digest.

use std::fmt::Write as _;
use std::hash::{Hash, Hasher};

/// A `Hasher` that buffers everything written to it and digests it with MD5.
#[derive(Debug, Default, Clone)]
pub struct StructuralHasher {
    buf: Vec<u8>,
}

impl StructuralHasher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Full 128-bit digest of everything written so far.
    pub fn digest(&self) -> [u8; 16] {
        md5::compute(&self.buf).0
    }
}

impl Hasher for StructuralHasher {
    fn write(&mut self, bytes: &[u8]) {
        self.buf.extend_from_slice(bytes);
    }

    fn finish(&self) -> u64 {
        let digest = self.digest();
        let mut head = [0u8; 8];
        head.copy_from_slice(&digest[..8]);
        u64::from_le_bytes(head)
    }
}

/// Digest any hashable value.
pub fn digest_of<T: Hash + ?Sized>(value: &T) -> [u8; 16] {
    let mut hasher = StructuralHasher::new();
    value.hash(&mut hasher);
    hasher.digest()
}

/// Lowercase hex rendering of a digest, used in log output.
pub fn to_hex(digest: &[u8; 16]) -> String {
    digest.iter().fold(String::with_capacity(32), |mut out, b| {
        let _ = write!(out, "{b:02x}");
        out
    })
}
