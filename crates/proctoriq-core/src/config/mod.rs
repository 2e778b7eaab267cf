mod env;
mod types;


pub use types::*;

use std::path::Path;

use anyhow::{Context, bail};

use crate::vault::{Secret, VaultProvider};

/// Vault key holding the Qdrant API key.
pub const QDRANT_API_KEY: &str = "PROCTORIQ_QDRANT_API_KEY";

impl Config {
    /// Load configuration from a TOML file with env var overrides.
    ///
    /// Falls back to defaults when the file does not exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let mut config = if path.exists() {
            let content = std::fs::read_to_string(path).context("failed to read config file")?;
            toml::from_str::<Self>(&content).context("failed to parse config file")?
        } else {
            tracing::debug!("config file {} not found, using defaults", path.display());
            Self::default()
        };

        config.apply_env_overrides();
        Ok(config)
    }

    /// Reject settings the pipeline cannot run with.
    ///
    /// # Errors
    ///
    /// Returns an error naming the first invalid setting.
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.embedding.dimension == 0 {
            bail!("embedding.dimension must be greater than zero");
        }
        if self.index.name.trim().is_empty() {
            bail!("index.name must not be empty");
        }
        if !(self.index.url.starts_with("http://") || self.index.url.starts_with("https://")) {
            bail!("index.url must be an http(s) URL, got {:?}", self.index.url);
        }
        if self.splitter.chunk_size == 0 {
            bail!("splitter.chunk_size must be greater than zero");
        }
        if self.splitter.chunk_overlap >= self.splitter.chunk_size {
            bail!(
                "splitter.chunk_overlap ({}) must be smaller than splitter.chunk_size ({})",
                self.splitter.chunk_overlap,
                self.splitter.chunk_size
            );
        }
        if self.retrieval.default_limit == 0 || self.retrieval.context_limit == 0 {
            bail!("retrieval limits must be greater than zero");
        }
        Ok(())
    }

    /// Resolve sensitive configuration values through the vault.
    ///
    /// # Errors
    ///
    /// Returns an error if the vault backend fails or the Qdrant API key is missing.
    pub async fn resolve_secrets(&mut self, vault: &dyn VaultProvider) -> anyhow::Result<()> {
        let key = vault
            .get_secret(QDRANT_API_KEY)
            .await?
            .filter(|v| !v.trim().is_empty())
            .with_context(|| format!("{QDRANT_API_KEY} is not set"))?;
        self.secrets.qdrant_api_key = Some(Secret::new(key));
        Ok(())
    }
}
