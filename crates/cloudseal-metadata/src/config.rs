//! Codec configuration

/// Tunables for [`crate::MetadataCodec`]
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CodecConfig {
    /// `metadata.version` written when a directory has no file records
    pub default_version: u32,
    /// Key slot the current metadata key is written to on encode
    pub initial_slot: u32,
}

impl Default for CodecConfig {
    fn default() -> Self {
        Self {
            default_version: 1,
            initial_slot: 0,
        }
    }
}

impl CodecConfig {
    /// Set the version used for empty directories
    pub fn with_default_version(mut self, version: u32) -> Self {
        self.default_version = version;
        self
    }
}
