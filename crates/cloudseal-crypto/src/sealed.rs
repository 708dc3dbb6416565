//! Sealed boxes for wrapping metadata keys
//!
//! An ephemeral X25519 key agrees a shared secret with the recipient
//! identity, BLAKE3 derives an AES-256-GCM key from it, and the payload is
//! encrypted under that key. Only the holder of the identity secret key can
//! open the box.
//!
//! Wire layout: `version (1) || ephemeral public key (32) || nonce (12) || ciphertext`.

use crate::{
    hashing::{derive_key, SEAL_CONTEXT},
    keys::{IdentityKeyPair, PublicKey, SecretKey, X25519_KEY_SIZE},
    symmetric::{Aead, Nonce, NONCE_SIZE, TAG_SIZE},
    CryptoError, Result, CRYPTO_VERSION,
};
use rand::rngs::OsRng;
use x25519_dalek::{PublicKey as X25519Public, StaticSecret};

const HEADER_LEN: usize = 1 + X25519_KEY_SIZE + NONCE_SIZE;

/// A parsed sealed box
#[derive(Clone, Debug)]
pub struct SealedBox {
    /// Format version
    pub version: u8,
    /// The sender's ephemeral public key
    pub ephemeral_public: [u8; X25519_KEY_SIZE],
    /// The AEAD nonce
    pub nonce: Nonce,
    /// Ciphertext including the GCM tag
    pub ciphertext: Vec<u8>,
}

impl SealedBox {
    /// Serialize to the wire layout
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(HEADER_LEN + self.ciphertext.len());
        out.push(self.version);
        out.extend_from_slice(&self.ephemeral_public);
        out.extend_from_slice(self.nonce.as_bytes());
        out.extend_from_slice(&self.ciphertext);
        out
    }

    /// Parse the wire layout
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        if bytes.len() < HEADER_LEN + TAG_SIZE {
            return Err(CryptoError::InvalidCiphertext(format!(
                "sealed box must be at least {} bytes, got {}",
                HEADER_LEN + TAG_SIZE,
                bytes.len()
            )));
        }
        let version = bytes[0];
        if version != CRYPTO_VERSION {
            return Err(CryptoError::InvalidCiphertext(format!(
                "unsupported sealed box version {}",
                version
            )));
        }
        let mut ephemeral_public = [0u8; X25519_KEY_SIZE];
        ephemeral_public.copy_from_slice(&bytes[1..1 + X25519_KEY_SIZE]);
        let nonce = Nonce::from_bytes(&bytes[1 + X25519_KEY_SIZE..HEADER_LEN])?;

        Ok(Self {
            version,
            ephemeral_public,
            nonce,
            ciphertext: bytes[HEADER_LEN..].to_vec(),
        })
    }
}

/// Seals payloads for a recipient public key
pub struct Sealer {
    recipient_public: PublicKey,
}

impl Sealer {
    /// Create a new sealer for the given recipient
    pub fn new(recipient_public: &PublicKey) -> Self {
        Self {
            recipient_public: recipient_public.clone(),
        }
    }

    /// Seal a payload
    pub fn seal(&self, plaintext: &[u8]) -> Result<SealedBox> {
        let ephemeral_secret = StaticSecret::random_from_rng(OsRng);
        let ephemeral_public = X25519Public::from(&ephemeral_secret);

        let recipient = X25519Public::from(*self.recipient_public.as_bytes());
        let shared_secret = ephemeral_secret.diffie_hellman(&recipient);
        let key = derive_key(SEAL_CONTEXT, shared_secret.as_bytes());

        let nonce = Nonce::generate();
        let ciphertext = Aead::new(key.as_bytes())?.encrypt(&nonce, plaintext)?;

        Ok(SealedBox {
            version: CRYPTO_VERSION,
            ephemeral_public: *ephemeral_public.as_bytes(),
            nonce,
            ciphertext,
        })
    }
}

/// Opens sealed boxes addressed to an identity
pub struct Opener {
    secret: SecretKey,
}

impl Opener {
    /// Create an opener from the recipient's key pair
    pub fn new(identity: &IdentityKeyPair) -> Self {
        Self {
            secret: identity.secret_key().clone(),
        }
    }

    /// Open a sealed box
    pub fn open(&self, sealed: &SealedBox) -> Result<Vec<u8>> {
        let secret = StaticSecret::from(*self.secret.as_bytes());
        let ephemeral = X25519Public::from(sealed.ephemeral_public);
        let shared_secret = secret.diffie_hellman(&ephemeral);
        let key = derive_key(SEAL_CONTEXT, shared_secret.as_bytes());

        Aead::new(key.as_bytes())?.decrypt(&sealed.nonce, &sealed.ciphertext)
    }
}
