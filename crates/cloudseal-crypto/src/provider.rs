//! The crypto provider seam
//!
//! The metadata codec never touches a cipher directly. It is written against
//! [`CryptoProvider`], so applications that already ship their own
//! primitives (platform keychains, hardware-backed identities) can plug them
//! in. [`DefaultCryptoProvider`] is the implementation built on this crate.

use crate::{
    keys::{IdentityKeyPair, MetadataKey},
    sealed::{Opener, SealedBox, Sealer},
    symmetric, CryptoError, Result,
};
use rand::rngs::OsRng;

/// Primitives consumed by the metadata codec
pub trait CryptoProvider {
    /// Produce `len` bytes of fresh symmetric key material
    fn generate_symmetric_key(&self, len: usize) -> Result<Vec<u8>>;

    /// Encrypt `plaintext` so that only `identity` can recover it
    fn asymmetric_encrypt(&self, plaintext: &[u8], identity: &IdentityKeyPair) -> Result<Vec<u8>>;

    /// Reverse [`CryptoProvider::asymmetric_encrypt`]
    fn asymmetric_decrypt(&self, ciphertext: &[u8], identity: &IdentityKeyPair) -> Result<Vec<u8>>;

    /// Encrypt a JSON document under a metadata key, returning transport text
    fn symmetric_encrypt_json(&self, text: &str, key: &MetadataKey) -> Result<String>;

    /// Reverse [`CryptoProvider::symmetric_encrypt_json`]
    fn symmetric_decrypt_json(&self, text: &str, key: &MetadataKey) -> Result<String>;
}

/// X25519 sealed boxes plus AES-GCM
#[derive(Clone, Copy, Debug, Default)]
pub struct DefaultCryptoProvider;

impl DefaultCryptoProvider {
    /// Create a new provider
    pub fn new() -> Self {
        Self
    }
}

impl CryptoProvider for DefaultCryptoProvider {
    fn generate_symmetric_key(&self, len: usize) -> Result<Vec<u8>> {
        if len == 0 {
            return Err(CryptoError::KeyGeneration("key length must be non-zero".into()));
        }
        let mut key = vec![0u8; len];
        rand::RngCore::try_fill_bytes(&mut OsRng, &mut key)
            .map_err(|e| CryptoError::KeyGeneration(e.to_string()))?;
        Ok(key)
    }

    fn asymmetric_encrypt(&self, plaintext: &[u8], identity: &IdentityKeyPair) -> Result<Vec<u8>> {
        Ok(Sealer::new(identity.public_key()).seal(plaintext)?.to_bytes())
    }

    fn asymmetric_decrypt(&self, ciphertext: &[u8], identity: &IdentityKeyPair) -> Result<Vec<u8>> {
        let sealed = SealedBox::from_bytes(ciphertext)?;
        Opener::new(identity).open(&sealed)
    }

    fn symmetric_encrypt_json(&self, text: &str, key: &MetadataKey) -> Result<String> {
        symmetric::encrypt_json(text, key)
    }

    fn symmetric_decrypt_json(&self, text: &str, key: &MetadataKey) -> Result<String> {
        symmetric::decrypt_json(text, key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rstest::rstest;

    #[rstest]
    #[case(16)]
    #[case(32)]
    fn test_generate_symmetric_key_length(#[case] len: usize) {
        let key = DefaultCryptoProvider::new().generate_symmetric_key(len).unwrap();
        assert_eq!(key.len(), len);
    }

    #[test]
    fn test_generate_zero_length_fails() {
        let result = DefaultCryptoProvider::new().generate_symmetric_key(0);
        assert!(matches!(result, Err(CryptoError::KeyGeneration(_))));
    }

    #[test]
    fn test_asymmetric_roundtrip() {
        let provider = DefaultCryptoProvider::new();
        let identity = IdentityKeyPair::generate();
        let wrapped = provider.asymmetric_encrypt(b"key material", &identity).unwrap();
        let unwrapped = provider.asymmetric_decrypt(&wrapped, &identity).unwrap();
        assert_eq!(unwrapped, b"key material");
    }

    #[test]
    fn test_asymmetric_garbage_fails() {
        let provider = DefaultCryptoProvider::new();
        let identity = IdentityKeyPair::generate();
        assert!(provider.asymmetric_decrypt(b"garbage", &identity).is_err());
    }

    proptest! {
        #[test]
        fn prop_symmetric_json_roundtrip(text in ".{0,256}") {
            let provider = DefaultCryptoProvider::new();
            let key = MetadataKey::generate();
            let framed = provider.symmetric_encrypt_json(&text, &key).unwrap();
            prop_assert_eq!(provider.symmetric_decrypt_json(&framed, &key).unwrap(), text);
        }
    }
}
