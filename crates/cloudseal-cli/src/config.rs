//! CLI configuration

use anyhow::{Context, Result};
use cloudseal_crypto::{IdentityKeyPair, SecretKey};
use cloudseal_metadata::CodecConfig;
use std::path::PathBuf;

/// Settings shared by every subcommand
#[derive(Clone, Debug, Default)]
pub struct CliConfig {
    /// Base64 X25519 identity secret key
    pub identity: Option<String>,
    /// JSON state file holding directory keys, records, and known files
    pub state_path: Option<PathBuf>,
    /// Version written for directories without records
    pub default_version: u32,
    /// Enable debug logging
    pub debug: bool,
}

impl CliConfig {
    /// Decode the configured identity
    pub fn identity_keypair(&self) -> Result<IdentityKeyPair> {
        let encoded = self
            .identity
            .as_deref()
            .context("no identity configured; pass --identity or set CLOUDSEAL_IDENTITY")?;
        let secret = SecretKey::from_base64(encoded).context("identity is not a valid secret key")?;
        Ok(IdentityKeyPair::from_secret_key(secret))
    }

    /// Codec settings derived from the CLI settings
    pub fn codec_config(&self) -> CodecConfig {
        CodecConfig::default().with_default_version(self.default_version)
    }

    /// Log filter used when `RUST_LOG` is unset
    pub fn default_log_filter(&self) -> String {
        let level = if self.debug { "debug" } else { "info" };
        format!("cloudseal={level},cloudseal_metadata={level},cloudseal_cli={level}")
    }
}
