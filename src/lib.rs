//! # Cloudseal
//!
//! End-to-end encrypted directory metadata.
//!
//! - [`crypto`]: key types, sealed-box key wrapping, AES-GCM metadata framing
//! - [`metadata`]: the metadata document codec and local reconciliation

pub use cloudseal_crypto as crypto;
pub use cloudseal_metadata as metadata;
