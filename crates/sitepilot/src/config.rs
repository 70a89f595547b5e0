use std::path::PathBuf;

use crate::error::{Error, Result};
use crate::model::Provider;

pub const DEFAULT_GITHUB_API: &str = "https://api.github.com";
pub const DEFAULT_GEMINI_API: &str = "https://generativelanguage.googleapis.com";
pub const DEFAULT_OLLAMA_URL: &str = "http://localhost:11434";
pub const DEFAULT_GEMINI_MODEL: &str = "gemini-2.5-flash";
pub const DEFAULT_OLLAMA_MODEL: &str = "qwen2.5-coder";

/// Where the website lives
#[derive(Debug, Clone)]
pub struct SiteConfig {
    pub api_base: String,
    pub owner: String,
    pub repo: String,
    pub branch: String,
}

impl SiteConfig {
    pub fn from_global(global: &crate::Global) -> Self {
        Self {
            api_base: global.github_api.trim_end_matches('/').to_string(),
            owner: global.owner.clone(),
            repo: global.repo.clone(),
            branch: global.branch.clone(),
        }
    }

    /// `owner/repo@branch`, for messages
    pub fn display_name(&self) -> String {
        format!("{}/{}@{}", self.owner, self.repo, self.branch)
    }
}

/// Which model answers change requests
#[derive(Debug, Clone)]
pub struct ModelConfig {
    pub provider: Provider,
    pub model: String,
    pub gemini_api: String,
    pub ollama_url: String,
}

impl ModelConfig {
    pub fn from_global(global: &crate::Global) -> Self {
        let model = global.model.clone().unwrap_or_else(|| match global.provider {
            Provider::Gemini => DEFAULT_GEMINI_MODEL.to_string(),
            Provider::Ollama => DEFAULT_OLLAMA_MODEL.to_string(),
        });

        Self {
            provider: global.provider,
            model,
            gemini_api: global.gemini_api.trim_end_matches('/').to_string(),
            ollama_url: global.ollama_url.clone(),
        }
    }
}

/// Credential file location: `--credentials` or `<config dir>/sitepilot/credentials.json`
pub fn credentials_path(global: &crate::Global) -> Result<PathBuf> {
    if let Some(path) = &global.credentials {
        return Ok(path.clone());
    }

    let config_dir = dirs_next::config_dir()
        .ok_or_else(|| Error::Configuration("Unable to determine config directory".to_string()))?;

    Ok(config_dir.join("sitepilot").join("credentials.json"))
}
