//! # Cloudseal Crypto
//!
//! Cryptographic primitives backing the cloudseal metadata codec.
//!
//! This crate provides:
//! - **Metadata keys**: Random 128-bit symmetric keys carried as base64 text
//! - **Key wrapping**: X25519 sealed boxes that wrap a metadata key for an identity
//! - **Metadata framing**: AES-128-GCM encryption of JSON sub-documents in the
//!   `ciphertext|nonce` text format shared with the mobile and desktop clients
//! - **Provider seam**: The [`CryptoProvider`] trait the codec is written against
//!
//! ## Security Model
//!
//! All encryption happens client-side. The storage server only ever sees
//! wrapped keys and encrypted attribute payloads.
//!
//! ## Example
//!
//! ```rust,ignore
//! use cloudseal_crypto::{CryptoProvider, DefaultCryptoProvider, IdentityKeyPair};
//!
//! let provider = DefaultCryptoProvider::new();
//! let identity = IdentityKeyPair::generate();
//!
//! let sealed = provider.asymmetric_encrypt(b"metadata key", &identity)?;
//! let opened = provider.asymmetric_decrypt(&sealed, &identity)?;
//! ```

pub mod error;
pub mod hashing;
pub mod keys;
pub mod provider;
pub mod sealed;
pub mod symmetric;

pub use error::{CryptoError, Result};
pub use keys::{IdentityKeyPair, MetadataKey, PublicKey, SecretKey};
pub use provider::{CryptoProvider, DefaultCryptoProvider};
pub use sealed::{Opener, SealedBox, Sealer};
pub use symmetric::{Aead, Nonce};

/// The version byte of the sealed-box wire format
pub const CRYPTO_VERSION: u8 = 1;

/// Length of a metadata key in bytes (AES-128)
pub const METADATA_KEY_LEN: usize = 16;
