//! Symmetric encryption using AES-GCM
//!
//! Metadata keys are 128-bit, so attribute documents use AES-128-GCM. Sealed
//! boxes derive a 256-bit key and use AES-256-GCM.

use crate::{keys::MetadataKey, CryptoError, Result};
use aes_gcm::{aead::Aead as AeadTrait, Aes128Gcm, Aes256Gcm, KeyInit};
use base64::Engine;
use rand::rngs::OsRng;

/// Size of an AES-GCM nonce in bytes (96 bits)
pub const NONCE_SIZE: usize = 12;

/// Size of the GCM authentication tag
pub const TAG_SIZE: usize = 16;

/// Separator between ciphertext and nonce in framed metadata text.
/// It is the base64 encoding of `|`.
pub const FRAME_SEPARATOR: &str = "fA==";

/// A nonce for AEAD encryption
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Nonce {
    bytes: [u8; NONCE_SIZE],
}

impl Nonce {
    /// Generate a random nonce
    pub fn generate() -> Self {
        let mut bytes = [0u8; NONCE_SIZE];
        rand::RngCore::fill_bytes(&mut OsRng, &mut bytes);
        Self { bytes }
    }

    /// Create from raw bytes
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        if bytes.len() != NONCE_SIZE {
            return Err(CryptoError::InvalidNonce(format!(
                "nonce must be {} bytes, got {}",
                NONCE_SIZE,
                bytes.len()
            )));
        }
        let mut arr = [0u8; NONCE_SIZE];
        arr.copy_from_slice(bytes);
        Ok(Self { bytes: arr })
    }

    /// Get the nonce bytes
    pub fn as_bytes(&self) -> &[u8; NONCE_SIZE] {
        &self.bytes
    }
}

/// AES-GCM encryption/decryption, keyed by length
///
/// A 16-byte key selects AES-128-GCM and a 32-byte key AES-256-GCM.
pub struct Aead {
    key: Vec<u8>,
}

impl Aead {
    /// Create a new AEAD instance
    pub fn new(key: &[u8]) -> Result<Self> {
        match key.len() {
            16 | 32 => Ok(Self { key: key.to_vec() }),
            n => Err(CryptoError::InvalidKey(format!(
                "AES-GCM key must be 16 or 32 bytes, got {}",
                n
            ))),
        }
    }

    /// Encrypt data with the given nonce
    pub fn encrypt(&self, nonce: &Nonce, plaintext: &[u8]) -> Result<Vec<u8>> {
        let nonce_arr = aes_gcm::Nonce::from_slice(nonce.as_bytes());
        let result = if self.key.len() == 16 {
            Aes128Gcm::new_from_slice(&self.key)
                .map_err(|e| CryptoError::Encryption(e.to_string()))?
                .encrypt(nonce_arr, plaintext)
        } else {
            Aes256Gcm::new_from_slice(&self.key)
                .map_err(|e| CryptoError::Encryption(e.to_string()))?
                .encrypt(nonce_arr, plaintext)
        };
        result.map_err(|e| CryptoError::Encryption(e.to_string()))
    }

    /// Decrypt data with the given nonce
    pub fn decrypt(&self, nonce: &Nonce, ciphertext: &[u8]) -> Result<Vec<u8>> {
        let nonce_arr = aes_gcm::Nonce::from_slice(nonce.as_bytes());
        let result = if self.key.len() == 16 {
            Aes128Gcm::new_from_slice(&self.key)
                .map_err(|e| CryptoError::Decryption(e.to_string()))?
                .decrypt(nonce_arr, ciphertext)
        } else {
            Aes256Gcm::new_from_slice(&self.key)
                .map_err(|e| CryptoError::Decryption(e.to_string()))?
                .decrypt(nonce_arr, ciphertext)
        };
        result.map_err(|e| CryptoError::Decryption(e.to_string()))
    }
}

impl Drop for Aead {
    fn drop(&mut self) {
        zeroize::Zeroize::zeroize(&mut self.key);
    }
}

/// Encrypt a JSON document under a metadata key.
///
/// Output is `base64(ciphertext || tag) + "fA==" + base64(nonce)`.
pub fn encrypt_json(text: &str, key: &MetadataKey) -> Result<String> {
    let raw = key.raw_bytes()?;
    let aead = Aead::new(&raw)?;
    let nonce = Nonce::generate();
    let ciphertext = aead.encrypt(&nonce, text.as_bytes())?;

    let engine = &base64::engine::general_purpose::STANDARD;
    Ok(format!(
        "{}{}{}",
        engine.encode(ciphertext),
        FRAME_SEPARATOR,
        engine.encode(nonce.as_bytes())
    ))
}

/// Decrypt framed text produced by [`encrypt_json`]
pub fn decrypt_json(framed: &str, key: &MetadataKey) -> Result<String> {
    // The nonce half never carries padding, so the last separator is the real one
    let (ciphertext_b64, nonce_b64) = framed.rsplit_once(FRAME_SEPARATOR).ok_or_else(|| {
        CryptoError::InvalidCiphertext("missing ciphertext/nonce separator".into())
    })?;

    let engine = &base64::engine::general_purpose::STANDARD;
    let ciphertext = engine.decode(ciphertext_b64)?;
    if ciphertext.len() < TAG_SIZE {
        return Err(CryptoError::InvalidCiphertext(format!(
            "ciphertext shorter than the {}-byte tag",
            TAG_SIZE
        )));
    }
    let nonce = Nonce::from_bytes(&engine.decode(nonce_b64)?)?;

    let raw = key.raw_bytes()?;
    let plaintext = Aead::new(&raw)?.decrypt(&nonce, &ciphertext)?;
    Ok(String::from_utf8(plaintext)?)
}
