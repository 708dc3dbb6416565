//! Key derivation and fingerprints using BLAKE3

use std::fmt;

/// Size of a BLAKE3 output in bytes (256 bits)
pub const HASH_BYTE_SIZE: usize = 32;

/// Context string for deriving sealed-box keys from an X25519 shared secret
pub const SEAL_CONTEXT: &str = "cloudseal 2024 sealed metadata key v1";

/// A BLAKE3 digest
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Digest([u8; HASH_BYTE_SIZE]);

impl Digest {
    /// Get the digest bytes
    pub fn as_bytes(&self) -> &[u8; HASH_BYTE_SIZE] {
        &self.0
    }

    /// Hex encoding of the first `n` bytes
    pub fn short_hex(&self, n: usize) -> String {
        hex::encode(&self.0[..n.min(HASH_BYTE_SIZE)])
    }
}

impl fmt::Debug for Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Digest({})", self.short_hex(HASH_BYTE_SIZE))
    }
}

/// Derive key material from `input` in the given domain
pub fn derive_key(context: &str, input: &[u8]) -> Digest {
    Digest(blake3::derive_key(context, input))
}

/// Short, non-reversible fingerprint for logging which key is in use
pub fn fingerprint(data: &[u8]) -> String {
    Digest(*blake3::hash(data).as_bytes()).short_hex(8)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_derive_key_deterministic() {
        let a = derive_key(SEAL_CONTEXT, b"shared secret");
        let b = derive_key(SEAL_CONTEXT, b"shared secret");
        assert_eq!(a, b);
    }

    #[test]
    fn test_derive_key_context_separation() {
        let a = derive_key(SEAL_CONTEXT, b"shared secret");
        let b = derive_key("some other context", b"shared secret");
        assert_ne!(a, b);
    }

    #[test]
    fn test_fingerprint_length() {
        let fp = fingerprint(b"key material");
        assert_eq!(fp.len(), 16);
        assert_ne!(fp, fingerprint(b"other key material"));
    }

    #[test]
    fn test_short_hex_matches_digest_prefix() {
        let digest = derive_key(SEAL_CONTEXT, b"input");
        assert_eq!(digest.short_hex(4), hex::encode(&digest.as_bytes()[..4]));
        assert_eq!(digest.short_hex(64).len(), HASH_BYTE_SIZE * 2);
    }
}
