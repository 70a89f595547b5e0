use std::sync::Arc;

use sitepilot_core::site::{ChangeRequest, ChangeSet};

use crate::config::ModelConfig;
use crate::credentials::CredentialProvider;
use crate::error::Result;

pub mod gemini;
pub mod ollama;

pub use gemini::GeminiClient;
pub use ollama::OllamaClient;

/// Language model that turns an instruction plus the current files into a
/// change set
#[allow(async_fn_in_trait)]
pub trait ModelClient {
    /// Fails with a configuration error when a request must not be attempted.
    fn ensure_configured(&self) -> Result<()>;

    async fn propose_changes(&self, request: &ChangeRequest) -> Result<ChangeSet>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum Provider {
    /// Google Gemini with a structured response schema
    Gemini,
    /// Local model served by Ollama
    Ollama,
}

/// The configured provider
pub enum ModelBackend {
    Gemini(GeminiClient),
    Ollama(OllamaClient),
}

impl ModelBackend {
    pub fn from_config(
        config: &ModelConfig,
        credentials: Arc<dyn CredentialProvider>,
    ) -> Result<Self> {
        Ok(match config.provider {
            Provider::Gemini => ModelBackend::Gemini(GeminiClient::new(
                &config.gemini_api,
                &config.model,
                credentials,
            )?),
            Provider::Ollama => {
                ModelBackend::Ollama(OllamaClient::new(&config.ollama_url, &config.model))
            }
        })
    }
}

impl ModelClient for ModelBackend {
    fn ensure_configured(&self) -> Result<()> {
        match self {
            ModelBackend::Gemini(client) => client.ensure_configured(),
            ModelBackend::Ollama(client) => client.ensure_configured(),
        }
    }

    async fn propose_changes(&self, request: &ChangeRequest) -> Result<ChangeSet> {
        match self {
            ModelBackend::Gemini(client) => client.propose_changes(request).await,
            ModelBackend::Ollama(client) => client.propose_changes(request).await,
        }
    }
}
