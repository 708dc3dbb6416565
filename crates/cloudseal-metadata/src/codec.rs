//! Encoding and decoding of whole metadata documents
//!
//! A codec is built per call site from its collaborators; it holds no state
//! of its own between calls.
//!
//! # Decode is not transactional
//!
//! [`MetadataCodec::decode`] deletes the directory's local file records
//! before it unwraps keys and decrypts entries. A failure after that point
//! (bad key slot, undecryptable entry, rejected write) leaves the directory
//! without local records until a later decode succeeds. A document that
//! fails to parse deletes nothing. Callers must also serialize encode and
//! decode calls per directory; the codec does not.

use crate::{
    attributes::{decrypt_attributes, encrypt_attributes},
    config::CodecConfig,
    document::{EncryptedFileAttributes, FileEntry, KeySlots, MetadataDocument, MetadataHeader},
    key_wrap::{wrap_key, UnwrappedKeys},
    reconcile::{DecodedFile, Reconciled, Reconciler},
    record::FileRecord,
    store::MetadataStore,
    MetadataError, Result,
};
use cloudseal_crypto::{CryptoProvider, DefaultCryptoProvider, IdentityKeyPair, MetadataKey};
use std::collections::BTreeMap;
use tracing::{debug, info, warn};

/// Outcome of a successful decode
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DecodeSummary {
    /// Slot persisted as the directory's current key, if the document had any
    pub current_slot: Option<u32>,
    /// `metadata.version` of the document
    pub version: u32,
    /// Local records removed before repopulating
    pub removed: usize,
    /// Records written for known files
    pub saved: usize,
    /// Entries skipped because no local file matched
    pub dropped: usize,
}

/// A fully decrypted document, detached from any store
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DecodedDirectory {
    pub current_slot: Option<u32>,
    pub version: u32,
    pub files: Vec<DecodedFile>,
}

/// Encodes local records into metadata documents and back
pub struct MetadataCodec<'a, S: MetadataStore, P: CryptoProvider = DefaultCryptoProvider> {
    identity: &'a IdentityKeyPair,
    store: &'a S,
    provider: P,
    config: CodecConfig,
}

impl<'a, S: MetadataStore> MetadataCodec<'a, S, DefaultCryptoProvider> {
    /// Create a codec using the default crypto provider
    pub fn new(identity: &'a IdentityKeyPair, store: &'a S) -> Self {
        Self::with_provider(identity, store, DefaultCryptoProvider::new())
    }
}

impl<'a, S: MetadataStore, P: CryptoProvider> MetadataCodec<'a, S, P> {
    /// Create a codec with a custom crypto provider
    pub fn with_provider(identity: &'a IdentityKeyPair, store: &'a S, provider: P) -> Self {
        Self {
            identity,
            store,
            provider,
            config: CodecConfig::default(),
        }
    }

    /// Replace the configuration
    pub fn with_config(mut self, config: CodecConfig) -> Self {
        self.config = config;
        self
    }

    /// Encode `records` into a metadata document for `server_url`.
    ///
    /// Uses `existing_key` when given and generates a new metadata key
    /// otherwise. The key is persisted as the directory key once it has been
    /// wrapped, and before any file is encrypted with it.
    pub fn encode(
        &self,
        records: &[FileRecord],
        server_url: &str,
        existing_key: Option<&MetadataKey>,
    ) -> Result<String> {
        self.encode_document(records, server_url, existing_key)?
            .to_json()
    }

    /// Like [`MetadataCodec::encode`], returning the document unserialized
    pub fn encode_document(
        &self,
        records: &[FileRecord],
        server_url: &str,
        existing_key: Option<&MetadataKey>,
    ) -> Result<MetadataDocument> {
        let wrapped = wrap_key(&self.provider, existing_key, self.identity)?;

        self.store.set_directory_key(server_url, &wrapped.key)?;

        let mut files = BTreeMap::new();
        let mut version = self.config.default_version;
        for record in records {
            let attrs = EncryptedFileAttributes::from(record);
            let encrypted_payload = encrypt_attributes(&self.provider, &attrs, &wrapped.key)?;

            files.insert(
                record.file_name_identifier.clone(),
                FileEntry {
                    initialization_vector: record.initialization_vector.clone(),
                    authentication_tag: record.authentication_tag.clone(),
                    metadata_key_index: self.config.initial_slot,
                    encrypted_payload,
                },
            );
            debug!(identifier = %record.file_name_identifier, "encrypted file attributes");

            // Last record wins, not the maximum
            version = record.version;
        }

        let mut metadata_keys = KeySlots::new();
        metadata_keys.insert(self.config.initial_slot, wrapped.wrapped);

        info!(
            server_url,
            files = files.len(),
            version,
            key = %wrapped.key.fingerprint(),
            "encoded metadata document"
        );

        Ok(MetadataDocument {
            files,
            metadata: MetadataHeader {
                metadata_keys,
                version,
            },
            sharing: None,
        })
    }

    /// Decode `json` and replace the local records of `account` in
    /// `server_url` with what it describes.
    ///
    /// See the module docs for the non-transactional failure window.
    pub fn decode(&self, json: &str, account: &str, server_url: &str) -> Result<DecodeSummary> {
        let document = MetadataDocument::from_json(json)?;

        let removed = self.store.delete_file_records(account, server_url)?;
        debug!(account, server_url, removed, "cleared local file records");

        let result = self.repopulate(&document, account, server_url);
        match result {
            Ok(mut summary) => {
                summary.removed = removed;
                info!(
                    account,
                    server_url,
                    saved = summary.saved,
                    dropped = summary.dropped,
                    current_slot = ?summary.current_slot,
                    "decoded metadata document"
                );
                Ok(summary)
            }
            Err(err) => {
                warn!(
                    account,
                    server_url,
                    removed,
                    error = %err,
                    "decode failed after local records were cleared"
                );
                Err(err)
            }
        }
    }

    /// Decrypt `json` without touching the store
    pub fn inspect(&self, json: &str) -> Result<DecodedDirectory> {
        let document = MetadataDocument::from_json(json)?;
        let keys = UnwrappedKeys::unwrap_all(
            &self.provider,
            &document.metadata.metadata_keys,
            self.identity,
        )?;
        let files = self.open_files(&document, &keys)?;

        Ok(DecodedDirectory {
            current_slot: keys.current().map(|(slot, _)| slot),
            version: document.metadata.version,
            files,
        })
    }

    fn repopulate(
        &self,
        document: &MetadataDocument,
        account: &str,
        server_url: &str,
    ) -> Result<DecodeSummary> {
        let keys = UnwrappedKeys::unwrap_all(
            &self.provider,
            &document.metadata.metadata_keys,
            self.identity,
        )?;

        let current_slot = match keys.current() {
            Some((slot, key)) => {
                self.store.set_directory_key(server_url, key)?;
                debug!(server_url, slot, "stored current metadata key");
                Some(slot)
            }
            None => None,
        };

        let files = self.open_files(document, &keys)?;

        let reconciler = Reconciler::new(self.store, account, server_url);
        let mut summary = DecodeSummary {
            current_slot,
            version: document.metadata.version,
            ..Default::default()
        };
        for file in &files {
            match reconciler.apply(file)? {
                Reconciled::Saved(_) => summary.saved += 1,
                Reconciled::Dropped => summary.dropped += 1,
            }
        }
        Ok(summary)
    }

    fn open_files(
        &self,
        document: &MetadataDocument,
        keys: &UnwrappedKeys,
    ) -> Result<Vec<DecodedFile>> {
        document
            .files
            .iter()
            .map(|(identifier, entry)| {
                let key = keys.get(entry.metadata_key_index).ok_or_else(|| {
                    MetadataError::MissingKeySlot {
                        identifier: identifier.clone(),
                        slot: entry.metadata_key_index,
                    }
                })?;
                let attributes = decrypt_attributes(
                    &self.provider,
                    identifier,
                    &entry.encrypted_payload,
                    key,
                )?;
                Ok(DecodedFile {
                    identifier: identifier.clone(),
                    entry: entry.clone(),
                    attributes,
                })
            })
            .collect()
    }
}
