//! Encryption of per-file attribute documents
//!
//! This layer only frames plaintext and ciphertext: it turns attributes into
//! JSON text and hands that to the provider. Cipher choice is the
//! provider's business.

use crate::{document::EncryptedFileAttributes, record::FileRecord, MetadataError, Result};
use cloudseal_crypto::{CryptoProvider, MetadataKey};

impl From<&FileRecord> for EncryptedFileAttributes {
    fn from(record: &FileRecord) -> Self {
        Self {
            key: record.key.clone(),
            filename: record.file_name.clone(),
            mimetype: record.mime_type.clone(),
            version: record.version,
        }
    }
}

/// Serialize and encrypt `attrs` under `key`
pub fn encrypt_attributes<P: CryptoProvider>(
    provider: &P,
    attrs: &EncryptedFileAttributes,
    key: &MetadataKey,
) -> Result<String> {
    let json =
        serde_json::to_string(attrs).map_err(|e| MetadataError::Serialization(e.to_string()))?;
    provider
        .symmetric_encrypt_json(&json, key)
        .map_err(|e| MetadataError::PayloadEncrypt(e.to_string()))
}

/// Decrypt and parse an attributes payload belonging to `identifier`
pub fn decrypt_attributes<P: CryptoProvider>(
    provider: &P,
    identifier: &str,
    payload: &str,
    key: &MetadataKey,
) -> Result<EncryptedFileAttributes> {
    let json = provider
        .symmetric_decrypt_json(payload, key)
        .map_err(|e| MetadataError::PayloadDecrypt {
            identifier: identifier.to_string(),
            reason: e.to_string(),
        })?;
    serde_json::from_str(&json)
        .map_err(|e| MetadataError::PayloadFormat(format!("{}: {}", identifier, e)))
}
