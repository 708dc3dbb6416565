//! Wire types of the metadata document
//!
//! Field names here are the contract with every other client that reads
//! these documents. Renaming one breaks interoperability silently.
//!
//! ```text
//! {
//!   "metadata": { "metadataKeys": { "0": "<wrapped>" }, "version": 1 },
//!   "files": {
//!     "<identifier>": {
//!       "initializationVector": "<b64>",
//!       "authenticationTag": "<b64>",
//!       "metadataKey": 0,
//!       "encrypted": "<framed ciphertext>"
//!     }
//!   }
//! }
//! ```

use crate::{MetadataError, Result};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

/// Wrapped metadata keys indexed by slot.
///
/// On the wire the slot is a JSON object key and therefore a string.
/// `serde_json` parses it back into `u32`, so a non-numeric slot is a
/// document format error at parse time. The map orders slots numerically.
pub type KeySlots = BTreeMap<u32, String>;

/// The root document exchanged with the server
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetadataDocument {
    /// Encrypted file entries keyed by file-name identifier
    pub files: BTreeMap<String, FileEntry>,
    /// Key slots and schema version
    pub metadata: MetadataHeader,
    /// Reserved for recipient sharing; never written
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sharing: Option<Sharing>,
}

/// The `metadata` block
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetadataHeader {
    /// Wrapped (sealed, then base64) metadata keys
    #[serde(rename = "metadataKeys")]
    pub metadata_keys: KeySlots,
    /// Schema version, carried over from the encoded records
    pub version: u32,
}

/// One encrypted file in the `files` map
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileEntry {
    /// Content IV, passed through untouched
    pub initialization_vector: String,
    /// Content auth tag, passed through untouched
    pub authentication_tag: String,
    /// Slot of the key that decrypts `encrypted`
    #[serde(rename = "metadataKey")]
    pub metadata_key_index: u32,
    /// Framed ciphertext of an [`EncryptedFileAttributes`] document
    #[serde(rename = "encrypted")]
    pub encrypted_payload: String,
}

/// Reserved recipient list
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sharing {
    #[serde(default)]
    pub recipient: HashMap<String, String>,
}

/// The per-file attributes protected by the metadata key
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncryptedFileAttributes {
    /// Per-file content key
    pub key: String,
    /// Plaintext file name
    pub filename: String,
    /// Plaintext MIME type
    pub mimetype: String,
    /// Version of the originating record
    pub version: u32,
}

impl MetadataDocument {
    /// Parse a document from JSON text
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| MetadataError::DocumentFormat(e.to_string()))
    }

    /// Serialize the document to JSON text
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string(self).map_err(|e| MetadataError::Serialization(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"{
        "metadata": {
            "metadataKeys": { "0": "d3JhcHBlZC0w", "1": "d3JhcHBlZC0x", "10": "d3JhcHBlZC0xMA==" },
            "version": 1
        },
        "files": {
            "abc": {
                "initializationVector": "AA==",
                "authenticationTag": "BB==",
                "metadataKey": 1,
                "encrypted": "Y2lwaGVy"
            }
        }
    }"#;

    #[test]
    fn test_parse_wire_names() {
        let doc = MetadataDocument::from_json(SAMPLE).unwrap();
        let entry = &doc.files["abc"];
        assert_eq!(entry.initialization_vector, "AA==");
        assert_eq!(entry.authentication_tag, "BB==");
        assert_eq!(entry.metadata_key_index, 1);
        assert_eq!(entry.encrypted_payload, "Y2lwaGVy");
        assert_eq!(doc.metadata.version, 1);
        assert!(doc.sharing.is_none());
    }

    #[test]
    fn test_slots_ordered_numerically() {
        // "10" sorts before "2" as a string; numerically it is the largest
        let doc = MetadataDocument::from_json(SAMPLE).unwrap();
        let slots: Vec<u32> = doc.metadata.metadata_keys.keys().copied().collect();
        assert_eq!(slots, vec![0, 1, 10]);
    }

    #[test]
    fn test_serialize_wire_names_and_no_sharing() {
        let doc = MetadataDocument::from_json(SAMPLE).unwrap();
        let value: serde_json::Value = serde_json::from_str(&doc.to_json().unwrap()).unwrap();

        assert_eq!(value["metadata"]["metadataKeys"]["0"], "d3JhcHBlZC0w");
        assert_eq!(value["files"]["abc"]["metadataKey"], 1);
        assert_eq!(value["files"]["abc"]["encrypted"], "Y2lwaGVy");
        assert!(value.get("sharing").is_none());
    }

    #[test]
    fn test_non_numeric_slot_rejected() {
        let json = r#"{"metadata":{"metadataKeys":{"zero":"eA=="},"version":1},"files":{}}"#;
        assert!(matches!(
            MetadataDocument::from_json(json),
            Err(MetadataError::DocumentFormat(_))
        ));
    }

    #[test]
    fn test_negative_slot_rejected() {
        let json = r#"{"metadata":{"metadataKeys":{"-1":"eA=="},"version":1},"files":{}}"#;
        assert!(MetadataDocument::from_json(json).is_err());
    }

    #[test]
    fn test_missing_field_rejected() {
        let json = r#"{"metadata":{"metadataKeys":{}},"files":{}}"#;
        assert!(matches!(
            MetadataDocument::from_json(json),
            Err(MetadataError::DocumentFormat(_))
        ));
    }

    #[test]
    fn test_sharing_accepted_when_present() {
        let json = r#"{"metadata":{"metadataKeys":{},"version":1},"files":{},"sharing":{"recipient":{"bob":"a2V5"}}}"#;
        let doc = MetadataDocument::from_json(json).unwrap();
        assert_eq!(doc.sharing.unwrap().recipient["bob"], "a2V5");
    }

    #[test]
    fn test_sharing_null_is_absent() {
        let json = r#"{"metadata":{"metadataKeys":{},"version":1},"files":{},"sharing":null}"#;
        let doc = MetadataDocument::from_json(json).unwrap();
        assert!(doc.sharing.is_none());
    }

    #[test]
    fn test_attributes_field_order() {
        let attrs = EncryptedFileAttributes {
            key: "k".into(),
            filename: "a.txt".into(),
            mimetype: "text/plain".into(),
            version: 1,
        };
        assert_eq!(
            serde_json::to_string(&attrs).unwrap(),
            r#"{"key":"k","filename":"a.txt","mimetype":"text/plain","version":1}"#
        );
    }
}
