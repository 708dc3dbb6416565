//! Wrapping and unwrapping of directory metadata keys
//!
//! The key material (already base64 text) is base64-encoded a second time
//! before it is sealed for the identity. Other clients expect exactly this
//! double encoding; dropping a layer breaks their decoding.
//!
//! ```text
//! wrap:   material -> base64 -> asymmetric seal -> base64   (transport text)
//! unwrap: transport text -> base64⁻¹ -> asymmetric open -> base64⁻¹ -> material
//! ```

use crate::{document::KeySlots, MetadataError, Result};
use base64::Engine;
use cloudseal_crypto::{CryptoProvider, IdentityKeyPair, MetadataKey, METADATA_KEY_LEN};
use std::collections::BTreeMap;
use tracing::debug;

fn b64() -> &'static base64::engine::GeneralPurpose {
    &base64::engine::general_purpose::STANDARD
}

/// A metadata key together with its wrapped transport form
#[derive(Clone, Debug)]
pub struct WrappedKey {
    /// The key material used to encrypt file attributes
    pub key: MetadataKey,
    /// Base64 of the sealed, double-encoded key material
    pub wrapped: String,
}

/// Wrap `existing`, or a freshly generated key when `existing` is `None`.
///
/// Generated keys are always [`METADATA_KEY_LEN`] bytes. Generation and
/// wrapping are attempted once; a failure of either is returned as
/// [`MetadataError::KeyGeneration`] or [`MetadataError::KeyWrap`].
pub fn wrap_key<P: CryptoProvider>(
    provider: &P,
    existing: Option<&MetadataKey>,
    identity: &IdentityKeyPair,
) -> Result<WrappedKey> {
    let key = match existing {
        Some(key) => key.clone(),
        None => {
            let raw = provider
                .generate_symmetric_key(METADATA_KEY_LEN)
                .map_err(|e| MetadataError::KeyGeneration(e.to_string()))?;
            if raw.len() != METADATA_KEY_LEN {
                return Err(MetadataError::KeyGeneration(format!(
                    "provider returned a {}-byte key, expected {}",
                    raw.len(),
                    METADATA_KEY_LEN
                )));
            }
            MetadataKey::from_raw_bytes(&raw)
        }
    };

    let double_encoded = b64().encode(key.as_str().as_bytes());
    let sealed = provider
        .asymmetric_encrypt(double_encoded.as_bytes(), identity)
        .map_err(|e| MetadataError::KeyWrap(e.to_string()))?;

    debug!(key = %key.fingerprint(), generated = existing.is_none(), "wrapped metadata key");

    Ok(WrappedKey {
        key,
        wrapped: b64().encode(sealed),
    })
}

/// Recover the key material from its wrapped transport form
pub fn unwrap_key<P: CryptoProvider>(
    provider: &P,
    slot: u32,
    wrapped: &str,
    identity: &IdentityKeyPair,
) -> Result<MetadataKey> {
    let recovery = |reason: String| MetadataError::KeyRecovery { slot, reason };

    let sealed = b64()
        .decode(wrapped)
        .map_err(|e| recovery(format!("wrapped key is not base64: {}", e)))?;
    let inner = provider
        .asymmetric_decrypt(&sealed, identity)
        .map_err(|e| recovery(e.to_string()))?;
    let material = b64()
        .decode(&inner)
        .map_err(|e| recovery(format!("inner key layer is not base64: {}", e)))?;
    let material =
        String::from_utf8(material).map_err(|e| recovery(format!("key is not utf-8: {}", e)))?;

    Ok(MetadataKey::from_material(material))
}

/// Every key slot of a document, unwrapped
#[derive(Clone, Debug, Default)]
pub struct UnwrappedKeys {
    keys: BTreeMap<u32, MetadataKey>,
}

impl UnwrappedKeys {
    /// Unwrap all slots. The first slot that fails aborts the whole set.
    pub fn unwrap_all<P: CryptoProvider>(
        provider: &P,
        slots: &KeySlots,
        identity: &IdentityKeyPair,
    ) -> Result<Self> {
        let mut keys = BTreeMap::new();
        for (&slot, wrapped) in slots {
            let key = unwrap_key(provider, slot, wrapped, identity)?;
            debug!(slot, key = %key.fingerprint(), "unwrapped metadata key");
            keys.insert(slot, key);
        }
        Ok(Self { keys })
    }

    /// The key in the numerically highest slot
    pub fn current(&self) -> Option<(u32, &MetadataKey)> {
        self.keys.iter().next_back().map(|(&slot, key)| (slot, key))
    }

    /// The key in `slot`
    pub fn get(&self, slot: u32) -> Option<&MetadataKey> {
        self.keys.get(&slot)
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}
