//! Merging decoded entries into local state
//!
//! Decode only enriches files the client already knows. An entry without a
//! local counterpart is skipped, never created.

use crate::{
    document::{EncryptedFileAttributes, FileEntry},
    record::FileRecord,
    store::MetadataStore,
    Result,
};
use tracing::{debug, warn};

/// A file entry with its attributes decrypted
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DecodedFile {
    /// File-name identifier (the `files` map key)
    pub identifier: String,
    pub entry: FileEntry,
    pub attributes: EncryptedFileAttributes,
}

/// What happened to one decoded file
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Reconciled {
    /// A matching local entity existed and a record was written
    Saved(FileRecord),
    /// No local entity; nothing was written
    Dropped,
}

/// Writes decoded files for one account and directory
pub struct Reconciler<'a, S: MetadataStore> {
    store: &'a S,
    account: &'a str,
    server_url: &'a str,
}

impl<'a, S: MetadataStore> Reconciler<'a, S> {
    pub fn new(store: &'a S, account: &'a str, server_url: &'a str) -> Self {
        Self {
            store,
            account,
            server_url,
        }
    }

    /// Persist `file` if the account already knows it.
    ///
    /// A store that rejects the write fails the call with
    /// [`crate::MetadataError::Persistence`].
    pub fn apply(&self, file: &DecodedFile) -> Result<Reconciled> {
        if self
            .store
            .find_local_entity(self.account, &file.identifier)
            .is_none()
        {
            warn!(identifier = %file.identifier, "no local file for metadata entry, skipping");
            return Ok(Reconciled::Dropped);
        }

        let record = self.to_record(file);
        self.store.save_file_record(&record)?;
        debug!(identifier = %file.identifier, version = record.version, "saved file record");
        Ok(Reconciled::Saved(record))
    }

    fn to_record(&self, file: &DecodedFile) -> FileRecord {
        FileRecord {
            account: self.account.to_string(),
            server_url: self.server_url.to_string(),
            file_name: file.attributes.filename.clone(),
            file_name_identifier: file.identifier.clone(),
            file_name_identifier_path: FileRecord::identifier_path(
                self.server_url,
                &file.identifier,
            ),
            key: file.attributes.key.clone(),
            mime_type: file.attributes.mimetype.clone(),
            initialization_vector: file.entry.initialization_vector.clone(),
            authentication_tag: file.entry.authentication_tag.clone(),
            version: file.attributes.version,
        }
    }
}
