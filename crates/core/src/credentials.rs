//! Credential file storage
//!
//! Secrets are kept in a small JSON object on disk, keyed by fixed names.
//! The file is re-read on every lookup so edits made by another process are
//! picked up immediately.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

/// The two secrets the assistant needs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum CredentialKey {
    GitHubToken,
    ModelApiKey,
}

impl CredentialKey {
    pub const ALL: [CredentialKey; 2] = [CredentialKey::GitHubToken, CredentialKey::ModelApiKey];

    /// Name under which the secret is stored.
    pub fn storage_name(&self) -> &'static str {
        match self {
            CredentialKey::GitHubToken => "githubToken",
            CredentialKey::ModelApiKey => "geminiApiKey",
        }
    }

    /// Human readable label.
    pub fn label(&self) -> &'static str {
        match self {
            CredentialKey::GitHubToken => "GitHub token",
            CredentialKey::ModelApiKey => "Gemini API key",
        }
    }
}

/// Error type for credential operations
#[derive(Debug)]
pub enum CredentialError {
    IoError(String),
    CorruptStore(String),
    InvalidApiKey(String),
}

impl std::fmt::Display for CredentialError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CredentialError::IoError(msg) => write!(f, "IO error: {}", msg),
            CredentialError::CorruptStore(msg) => write!(f, "Credential file is corrupt: {}", msg),
            CredentialError::InvalidApiKey(msg) => write!(f, "Invalid API key: {}", msg),
        }
    }
}

impl std::error::Error for CredentialError {}

impl From<std::io::Error> for CredentialError {
    fn from(err: std::io::Error) -> Self {
        CredentialError::IoError(err.to_string())
    }
}

/// Load every stored secret. A missing file is an empty store.
pub fn load_store(path: &Path) -> Result<BTreeMap<String, String>, CredentialError> {
    if !path.exists() {
        return Ok(BTreeMap::new());
    }

    let raw = fs::read_to_string(path)?;
    if raw.trim().is_empty() {
        return Ok(BTreeMap::new());
    }

    serde_json::from_str(&raw).map_err(|e| CredentialError::CorruptStore(e.to_string()))
}

/// Read one secret. Empty values count as absent.
pub fn load_credential(path: &Path, key: CredentialKey) -> Result<Option<String>, CredentialError> {
    let store = load_store(path)?;
    Ok(store
        .get(key.storage_name())
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty()))
}

/// Store one secret, keeping the others.
pub fn save_credential(path: &Path, key: CredentialKey, value: &str) -> Result<(), CredentialError> {
    let mut store = load_store(path)?;
    store.insert(key.storage_name().to_string(), value.trim().to_string());
    write_store(path, &store)
}

/// Remove one secret. Removing an absent secret is not an error.
pub fn remove_credential(path: &Path, key: CredentialKey) -> Result<(), CredentialError> {
    let mut store = load_store(path)?;
    if store.remove(key.storage_name()).is_some() {
        write_store(path, &store)?;
    }
    Ok(())
}

fn write_store(path: &Path, store: &BTreeMap<String, String>) -> Result<(), CredentialError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    let json = serde_json::to_string_pretty(store)
        .map_err(|e| CredentialError::CorruptStore(e.to_string()))?;
    fs::write(path, json)?;

    // Secrets are readable by the owner only
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        fs::set_permissions(path, fs::Permissions::from_mode(0o600))?;
    }

    Ok(())
}

/// Check that a model API key can be sent as an HTTP header value.
pub fn validate_api_key(key: &str) -> Result<(), CredentialError> {
    if key.trim().is_empty() {
        return Err(CredentialError::InvalidApiKey("key is empty".to_string()));
    }
    if key.trim() != key {
        return Err(CredentialError::InvalidApiKey(
            "key has leading or trailing whitespace".to_string(),
        ));
    }
    if !key.chars().all(|c| c.is_ascii_graphic()) {
        return Err(CredentialError::InvalidApiKey(
            "key contains whitespace or non-printable characters".to_string(),
        ));
    }
    Ok(())
}

/// Mask a secret for display, keeping the last four characters.
pub fn mask_secret(secret: &str) -> String {
    let chars: Vec<char> = secret.chars().collect();
    if chars.len() <= 4 {
        return "*".repeat(chars.len());
    }
    let visible: String = chars[chars.len() - 4..].iter().collect();
    format!("{}{}", "*".repeat(chars.len() - 4), visible)
}
