//! # Cloudseal Metadata
//!
//! Codec for the end-to-end encrypted metadata document that accompanies
//! every encrypted directory. The document lets clients share per-file
//! encryption parameters (content key, plaintext name, MIME type, IV, tag)
//! through a server that never sees any of them in the clear.
//!
//! Layers, leaf first:
//! - [`key_wrap`]: seals the directory metadata key for an identity, one
//!   wrapped key per integer slot
//! - [`attributes`]: encrypts each file's attribute document with the
//!   metadata key
//! - [`codec`]: assembles and parses whole documents
//! - [`reconcile`]: writes decoded entries for files the client already knows
//!
//! ## Example
//!
//! ```rust,ignore
//! use cloudseal_metadata::{MemoryMetadataStore, MetadataCodec};
//! use cloudseal_crypto::IdentityKeyPair;
//!
//! let identity = IdentityKeyPair::generate();
//! let store = MemoryMetadataStore::new();
//! let codec = MetadataCodec::new(&identity, &store);
//!
//! let json = codec.encode(&records, "https://cloud/dir", None)?;
//! let summary = codec.decode(&json, "alice", "https://cloud/dir")?;
//! ```

pub mod attributes;
pub mod codec;
pub mod config;
pub mod document;
pub mod error;
pub mod key_wrap;
pub mod reconcile;
pub mod record;
pub mod store;

pub use codec::{DecodeSummary, DecodedDirectory, MetadataCodec};
pub use config::CodecConfig;
pub use document::{EncryptedFileAttributes, FileEntry, MetadataDocument, MetadataHeader, Sharing};
pub use error::{MetadataError, Result};
pub use key_wrap::{unwrap_key, wrap_key, UnwrappedKeys, WrappedKey};
pub use reconcile::DecodedFile;
pub use record::{FileRecord, LocalEntity};
pub use store::{MemoryMetadataStore, MetadataStore, StoreError};
