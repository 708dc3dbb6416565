//! Local records the codec reads and writes

use serde::{Deserialize, Serialize};

/// The local encryption parameters of one file in an encrypted directory
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileRecord {
    pub account: String,
    /// Directory URL the record belongs to
    pub server_url: String,
    /// Plaintext file name
    pub file_name: String,
    /// Opaque name the server stores the file under
    pub file_name_identifier: String,
    /// `server_url/file_name_identifier`
    pub file_name_identifier_path: String,
    /// Per-file content key
    pub key: String,
    pub mime_type: String,
    pub initialization_vector: String,
    pub authentication_tag: String,
    pub version: u32,
}

impl FileRecord {
    /// Join a directory URL and an identifier the way record paths are stored
    pub fn identifier_path(server_url: &str, identifier: &str) -> String {
        format!("{}/{}", server_url, identifier)
    }
}

/// A file the local client already knows about
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocalEntity {
    pub account: String,
    pub server_url: String,
    /// Server-visible name; the file-name identifier in encrypted directories
    pub file_name: String,
}

impl LocalEntity {
    pub fn new(
        account: impl Into<String>,
        server_url: impl Into<String>,
        file_name: impl Into<String>,
    ) -> Self {
        Self {
            account: account.into(),
            server_url: server_url.into(),
            file_name: file_name.into(),
        }
    }
}
