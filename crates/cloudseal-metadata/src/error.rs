//! Error types for the cloudseal-metadata crate
//!
//! Every error is terminal for the encode or decode call that raised it.
//! Nothing is retried internally.

use thiserror::Error;

/// Result type alias using `MetadataError`
pub type Result<T> = std::result::Result<T, MetadataError>;

/// Errors that can occur while encoding or decoding a metadata document
#[derive(Error, Debug)]
pub enum MetadataError {
    /// A fresh metadata key could not be generated
    #[error("metadata key generation failed: {0}")]
    KeyGeneration(String),

    /// The metadata key could not be wrapped for the identity
    #[error("metadata key wrap failed: {0}")]
    KeyWrap(String),

    /// A wrapped key was malformed or could not be decrypted
    #[error("metadata key recovery failed for slot {slot}: {reason}")]
    KeyRecovery { slot: u32, reason: String },

    /// A file entry references a key slot the document does not carry
    #[error("file {identifier} references missing metadata key slot {slot}")]
    MissingKeySlot { identifier: String, slot: u32 },

    /// Encrypting a file's attributes failed
    #[error("payload encryption failed: {0}")]
    PayloadEncrypt(String),

    /// Decrypting a file's attributes failed
    #[error("payload decryption failed for {identifier}: {reason}")]
    PayloadDecrypt { identifier: String, reason: String },

    /// Decrypted attributes were not a valid attributes document
    #[error("malformed file attributes: {0}")]
    PayloadFormat(String),

    /// The outer document was not valid
    #[error("malformed metadata document: {0}")]
    DocumentFormat(String),

    /// The local store rejected a write
    #[error("persistence failed: {0}")]
    Persistence(String),

    /// Serializing a document failed
    #[error("serialization error: {0}")]
    Serialization(String),
}

impl MetadataError {
    /// True for failures to recover a key, including dangling slot references
    pub fn is_key_recovery(&self) -> bool {
        matches!(self, Self::KeyRecovery { .. } | Self::MissingKeySlot { .. })
    }
}

impl From<crate::store::StoreError> for MetadataError {
    fn from(err: crate::store::StoreError) -> Self {
        Self::Persistence(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_slot_is_key_recovery() {
        let err = MetadataError::MissingKeySlot {
            identifier: "abc".into(),
            slot: 3,
        };
        assert!(err.is_key_recovery());
        assert_eq!(err.to_string(), "file abc references missing metadata key slot 3");
    }

    #[test]
    fn test_other_kinds_are_not_key_recovery() {
        assert!(!MetadataError::DocumentFormat("eof".into()).is_key_recovery());
        assert!(!MetadataError::Persistence("full".into()).is_key_recovery());
    }
}
