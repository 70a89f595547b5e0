use std::path::{Path, PathBuf};

use sitepilot_core::credentials::{
    load_credential, remove_credential, save_credential, CredentialKey,
};

use crate::error::{Error, Result};

/// Source of the two secrets. The orchestrator and the clients only see this
/// trait, never the storage behind it.
pub trait CredentialProvider: Send + Sync {
    fn get(&self, key: CredentialKey) -> Result<Option<String>>;
    fn set(&self, key: CredentialKey, value: &str) -> Result<()>;
    fn clear(&self, key: CredentialKey) -> Result<()>;
}

/// Secrets persisted in a JSON file on disk
#[derive(Debug, Clone)]
pub struct LocalCredentialStore {
    path: PathBuf,
}

impl LocalCredentialStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl CredentialProvider for LocalCredentialStore {
    fn get(&self, key: CredentialKey) -> Result<Option<String>> {
        Ok(load_credential(&self.path, key)?)
    }

    fn set(&self, key: CredentialKey, value: &str) -> Result<()> {
        log::debug!("Saving {} to {}", key.label(), self.path.display());
        Ok(save_credential(&self.path, key, value)?)
    }

    fn clear(&self, key: CredentialKey) -> Result<()> {
        Ok(remove_credential(&self.path, key)?)
    }
}

/// Fetch a secret that must be present before any request is dispatched.
pub fn require(provider: &dyn CredentialProvider, key: CredentialKey) -> Result<String> {
    provider.get(key)?.ok_or_else(|| {
        Error::Configuration(format!(
            "Please provide both GitHub Token and Gemini API Key ({} is not set, run `sitepilot auth set`).",
            key.label()
        ))
    })
}

/// Store a secret. The model key is only stored once a client accepts it.
pub fn store(provider: &dyn CredentialProvider, key: CredentialKey, value: &str) -> Result<()> {
    let value = value.trim();
    if key == CredentialKey::ModelApiKey {
        crate::model::gemini::GeminiClient::check_api_key(value)?;
    }
    provider.set(key, value)
}

#[cfg(test)]
pub use memory::MemoryCredentials;
