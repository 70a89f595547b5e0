use rig::client::CompletionClient;
use rig::completion::Prompt;
use rig::providers::ollama;
use sitepilot_core::prompt::{build_prompt, json_only_preamble};
use sitepilot_core::response::parse_change_set;
use sitepilot_core::site::{ChangeRequest, ChangeSet};

use super::ModelClient;
use crate::error::{Error, Result};

/// Local model served by Ollama. The schema is described in the preamble and
/// the JSON is pulled out of the reply.
pub struct OllamaClient {
    url: String,
    model: String,
}

impl OllamaClient {
    pub fn new(url: &str, model: &str) -> Self {
        Self {
            url: url.to_string(),
            model: model.to_string(),
        }
    }

    fn create_client(&self) -> Result<ollama::Client> {
        use rig::client::Nothing;

        ollama::Client::builder()
            .api_key(Nothing)
            .base_url(&self.url)
            .build()
            .map_err(|e| Error::Model(format!("Failed to create Ollama client: {}", e)))
    }
}

impl ModelClient for OllamaClient {
    fn ensure_configured(&self) -> Result<()> {
        if self.url.trim().is_empty() || self.model.trim().is_empty() {
            return Err(Error::Configuration(
                "Ollama URL and model must both be set".to_string(),
            ));
        }
        Ok(())
    }

    async fn propose_changes(&self, request: &ChangeRequest) -> Result<ChangeSet> {
        let prompt = build_prompt(request);
        log::debug!(
            "Prompting {} at {} ({} chars)",
            self.model,
            self.url,
            prompt.len()
        );

        let client = self.create_client()?;
        let agent = client
            .agent(&self.model)
            .preamble(&json_only_preamble())
            .build();

        let response = agent
            .prompt(&prompt)
            .await
            .map_err(|e| Error::Model(format!("Model generation failed: {}", e)))?;

        Ok(parse_change_set(&response)?)
    }
}
