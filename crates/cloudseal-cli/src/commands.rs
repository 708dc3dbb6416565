//! Subcommand implementations

use crate::config::CliConfig;
use anyhow::{Context, Result};
use cloudseal_crypto::IdentityKeyPair;
use cloudseal_metadata::{
    DecodeSummary, FileRecord, MemoryMetadataStore, MetadataCodec, MetadataStore,
};
use serde::Serialize;
use std::path::Path;

/// A freshly generated identity
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneratedIdentity {
    pub secret_key: String,
    pub public_key: String,
}

/// One line of `inspect` output. Keys are deliberately absent.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InspectedFile {
    pub identifier: String,
    pub filename: String,
    pub mimetype: String,
    pub version: u32,
    pub metadata_key: u32,
}

/// Summary of an inspected document
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InspectReport {
    pub current_slot: Option<u32>,
    pub version: u32,
    pub files: Vec<InspectedFile>,
}

pub fn keygen() -> GeneratedIdentity {
    let identity = IdentityKeyPair::generate();
    GeneratedIdentity {
        secret_key: identity.secret_key().to_base64(),
        public_key: identity.public_key().to_base64(),
    }
}

fn load_store(config: &CliConfig) -> Result<MemoryMetadataStore> {
    match &config.state_path {
        Some(path) => MemoryMetadataStore::load(path)
            .with_context(|| format!("failed to load state from {}", path.display())),
        None => Ok(MemoryMetadataStore::new()),
    }
}

fn save_store(config: &CliConfig, store: &MemoryMetadataStore) -> Result<()> {
    if let Some(path) = &config.state_path {
        store
            .save(path)
            .with_context(|| format!("failed to save state to {}", path.display()))?;
        tracing::debug!("state saved to {}", path.display());
    }
    Ok(())
}

fn read(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))
}

/// Encode the records in `records_path` and return the document text
pub fn encode(config: &CliConfig, records_path: &Path, server_url: &str) -> Result<String> {
    let identity = config.identity_keypair()?;
    let records: Vec<FileRecord> =
        serde_json::from_str(&read(records_path)?).with_context(|| {
            format!("{} is not a JSON array of file records", records_path.display())
        })?;

    let store = load_store(config)?;
    let existing = store.directory_key(server_url);
    if existing.is_none() {
        tracing::info!("no metadata key for {}, generating one", server_url);
    }

    let json = MetadataCodec::new(&identity, &store)
        .with_config(config.codec_config())
        .encode(&records, server_url, existing.as_ref())
        .context("failed to encode metadata")?;

    save_store(config, &store)?;
    Ok(json)
}

/// Decode `document_path` into the state file
pub fn decode(
    config: &CliConfig,
    document_path: &Path,
    account: &str,
    server_url: &str,
) -> Result<DecodeSummary> {
    let identity = config.identity_keypair()?;
    let json = read(document_path)?;
    let store = load_store(config)?;

    let result = MetadataCodec::new(&identity, &store)
        .with_config(config.codec_config())
        .decode(&json, account, server_url);

    // Records may already be cleared on failure; persist what the store holds
    save_store(config, &store)?;
    result.context("failed to decode metadata")
}

/// Decrypt `document_path` and describe it without persisting anything
pub fn inspect(config: &CliConfig, document_path: &Path) -> Result<InspectReport> {
    let identity = config.identity_keypair()?;
    let json = read(document_path)?;
    let store = MemoryMetadataStore::new();

    let directory = MetadataCodec::new(&identity, &store)
        .inspect(&json)
        .context("failed to inspect metadata")?;

    Ok(InspectReport {
        current_slot: directory.current_slot,
        version: directory.version,
        files: directory
            .files
            .into_iter()
            .map(|file| InspectedFile {
                metadata_key: file.entry.metadata_key_index,
                identifier: file.identifier,
                filename: file.attributes.filename,
                mimetype: file.attributes.mimetype,
                version: file.attributes.version,
            })
            .collect(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use cloudseal_metadata::{LocalEntity, StoreError};

    const URL: &str = "https://cloud.example.com/vault";

    fn config_in(dir: &Path, identity: &GeneratedIdentity) -> CliConfig {
        CliConfig {
            identity: Some(identity.secret_key.clone()),
            state_path: Some(dir.join("state.json")),
            default_version: 1,
            debug: false,
        }
    }

    fn write_records(dir: &Path) -> std::path::PathBuf {
        let records = vec![FileRecord {
            account: "alice".into(),
            server_url: URL.into(),
            file_name: "plan.txt".into(),
            file_name_identifier: "3f2a9c".into(),
            file_name_identifier_path: FileRecord::identifier_path(URL, "3f2a9c"),
            key: "cGVyLWZpbGUta2V5".into(),
            mime_type: "text/plain".into(),
            initialization_vector: "AA==".into(),
            authentication_tag: "BB==".into(),
            version: 1,
        }];
        let path = dir.join("records.json");
        std::fs::write(&path, serde_json::to_string(&records).unwrap()).unwrap();
        path
    }

    #[test]
    fn test_encode_then_inspect() {
        let dir = tempfile::tempdir().unwrap();
        let identity = keygen();
        let config = config_in(dir.path(), &identity);

        let json = encode(&config, &write_records(dir.path()), URL).unwrap();
        let doc_path = dir.path().join("metadata.json");
        std::fs::write(&doc_path, &json).unwrap();

        let report = inspect(&config, &doc_path).unwrap();
        assert_eq!(report.current_slot, Some(0));
        assert_eq!(report.files.len(), 1);
        assert_eq!(report.files[0].filename, "plan.txt");
        assert!(!serde_json::to_string(&report).unwrap().contains("cGVyLWZpbGUta2V5"));
    }

    #[test]
    fn test_encode_reuses_state_key() {
        let dir = tempfile::tempdir().unwrap();
        let identity = keygen();
        let config = config_in(dir.path(), &identity);
        let records = write_records(dir.path());

        encode(&config, &records, URL).unwrap();
        let first = MemoryMetadataStore::load(config.state_path.as_ref().unwrap())
            .unwrap()
            .directory_key(URL);
        encode(&config, &records, URL).unwrap();
        let second = MemoryMetadataStore::load(config.state_path.as_ref().unwrap())
            .unwrap()
            .directory_key(URL);

        assert!(first.is_some());
        assert_eq!(first, second);
    }

    #[test]
    fn test_decode_into_state() -> std::result::Result<(), StoreError> {
        let dir = tempfile::tempdir().unwrap();
        let identity = keygen();
        let config = config_in(dir.path(), &identity);

        let json = encode(&config, &write_records(dir.path()), URL).unwrap();
        let doc_path = dir.path().join("metadata.json");
        std::fs::write(&doc_path, &json).unwrap();

        let state = MemoryMetadataStore::load(config.state_path.as_ref().unwrap())?;
        state.insert_entity(LocalEntity::new("alice", URL, "3f2a9c"));
        state.save(config.state_path.as_ref().unwrap())?;

        let summary = decode(&config, &doc_path, "alice", URL).unwrap();
        assert_eq!(summary.saved, 1);

        let state = MemoryMetadataStore::load(config.state_path.as_ref().unwrap())?;
        assert_eq!(state.file_records("alice", URL)[0].file_name, "plan.txt");
        Ok(())
    }
}
