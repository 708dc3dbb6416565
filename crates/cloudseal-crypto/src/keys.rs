//! Key types for the metadata protocol
//!
//! Two families of keys are involved:
//! - Metadata keys: random symmetric keys, one current key per directory,
//!   that protect every per-file attribute document in that directory
//! - Identity keys: X25519 key pairs that wrap metadata keys for transport

use crate::{hashing, CryptoError, Result, METADATA_KEY_LEN};
use base64::Engine;
use rand::rngs::OsRng;
use serde::{Deserialize, Serialize};
use zeroize::{Zeroize, ZeroizeOnDrop};

/// Size of an X25519 key in bytes
pub const X25519_KEY_SIZE: usize = 32;

fn b64() -> &'static base64::engine::GeneralPurpose {
    &base64::engine::general_purpose::STANDARD
}

/// A directory metadata key
///
/// The key is carried as its base64 text ("key material"). That text, not
/// the raw bytes, is what gets wrapped, persisted, and handed to the
/// symmetric layer, which keeps the representation identical to what the
/// other clients store.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize, Zeroize, ZeroizeOnDrop)]
#[serde(transparent)]
pub struct MetadataKey {
    material: String,
}

impl MetadataKey {
    /// Generate a new random 128-bit metadata key
    pub fn generate() -> Self {
        let mut raw = [0u8; METADATA_KEY_LEN];
        rand::RngCore::fill_bytes(&mut OsRng, &mut raw);
        let key = Self::from_raw_bytes(&raw);
        raw.zeroize();
        key
    }

    /// Build a key from raw bytes, encoding them as key material
    pub fn from_raw_bytes(raw: &[u8]) -> Self {
        Self {
            material: b64().encode(raw),
        }
    }

    /// Wrap existing key material without validating it
    pub fn from_material(material: impl Into<String>) -> Self {
        Self {
            material: material.into(),
        }
    }

    /// The key material as text
    pub fn as_str(&self) -> &str {
        &self.material
    }

    /// Decode the key material back to raw key bytes
    pub fn raw_bytes(&self) -> Result<Vec<u8>> {
        let raw = b64().decode(&self.material)?;
        if raw.len() != METADATA_KEY_LEN {
            return Err(CryptoError::InvalidKey(format!(
                "metadata key must be {} bytes, got {}",
                METADATA_KEY_LEN,
                raw.len()
            )));
        }
        Ok(raw)
    }

    /// Short fingerprint, safe to log
    pub fn fingerprint(&self) -> String {
        hashing::fingerprint(self.material.as_bytes())
    }
}

impl std::fmt::Debug for MetadataKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "MetadataKey({})", self.fingerprint())
    }
}

/// A public key for asymmetric encryption (X25519)
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublicKey {
    bytes: [u8; X25519_KEY_SIZE],
}

impl PublicKey {
    /// Create from raw bytes
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        if bytes.len() != X25519_KEY_SIZE {
            return Err(CryptoError::InvalidKey(format!(
                "public key must be {} bytes, got {}",
                X25519_KEY_SIZE,
                bytes.len()
            )));
        }
        let mut arr = [0u8; X25519_KEY_SIZE];
        arr.copy_from_slice(bytes);
        Ok(Self { bytes: arr })
    }

    /// Get the key bytes
    pub fn as_bytes(&self) -> &[u8; X25519_KEY_SIZE] {
        &self.bytes
    }

    /// Encode as base64
    pub fn to_base64(&self) -> String {
        b64().encode(self.bytes)
    }

    /// Decode from base64
    pub fn from_base64(s: &str) -> Result<Self> {
        let bytes = b64().decode(s)?;
        Self::from_bytes(&bytes)
    }
}

impl std::fmt::Debug for PublicKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "PublicKey({})", self.to_base64())
    }
}

/// A secret key for asymmetric encryption (X25519)
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct SecretKey {
    bytes: [u8; X25519_KEY_SIZE],
}

impl SecretKey {
    /// Generate a new random secret key
    pub fn generate() -> Self {
        let mut bytes = [0u8; X25519_KEY_SIZE];
        rand::RngCore::fill_bytes(&mut OsRng, &mut bytes);
        Self { bytes }
    }

    /// Create from raw bytes
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        if bytes.len() != X25519_KEY_SIZE {
            return Err(CryptoError::InvalidKey(format!(
                "secret key must be {} bytes, got {}",
                X25519_KEY_SIZE,
                bytes.len()
            )));
        }
        let mut arr = [0u8; X25519_KEY_SIZE];
        arr.copy_from_slice(bytes);
        Ok(Self { bytes: arr })
    }

    /// Get the key bytes
    pub fn as_bytes(&self) -> &[u8; X25519_KEY_SIZE] {
        &self.bytes
    }

    /// Derive the public key from this secret key
    pub fn public_key(&self) -> PublicKey {
        use x25519_dalek::{PublicKey as X25519Public, StaticSecret};
        let secret = StaticSecret::from(self.bytes);
        let public = X25519Public::from(&secret);
        PublicKey {
            bytes: *public.as_bytes(),
        }
    }

    /// Encode as base64
    pub fn to_base64(&self) -> String {
        b64().encode(self.bytes)
    }

    /// Decode from base64
    pub fn from_base64(s: &str) -> Result<Self> {
        let bytes = b64().decode(s.trim())?;
        Self::from_bytes(&bytes)
    }
}

/// The key pair a client uses to wrap and unwrap metadata keys
#[derive(Clone)]
pub struct IdentityKeyPair {
    secret: SecretKey,
    public: PublicKey,
}

impl IdentityKeyPair {
    /// Generate a new random key pair
    pub fn generate() -> Self {
        Self::from_secret_key(SecretKey::generate())
    }

    /// Create from an existing secret key
    pub fn from_secret_key(secret: SecretKey) -> Self {
        let public = secret.public_key();
        Self { secret, public }
    }

    /// Get the secret key
    pub fn secret_key(&self) -> &SecretKey {
        &self.secret
    }

    /// Get the public key
    pub fn public_key(&self) -> &PublicKey {
        &self.public
    }
}

impl std::fmt::Debug for IdentityKeyPair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IdentityKeyPair")
            .field("public", &self.public)
            .finish_non_exhaustive()
    }
}
