use std::sync::Arc;

use reqwest::header::{HeaderValue, CONTENT_TYPE};
use sitepilot_core::credentials::{validate_api_key, CredentialKey};
use sitepilot_core::gemini::{
    build_generate_request, error_message, generate_url, response_text, GenerateContentResponse,
};
use sitepilot_core::prompt::build_prompt;
use sitepilot_core::response::parse_change_set;
use sitepilot_core::site::{ChangeRequest, ChangeSet};

use super::ModelClient;
use crate::credentials::{require, CredentialProvider};
use crate::error::{Error, Result};

const API_KEY_HEADER: &str = "x-goog-api-key";

/// Gemini `generateContent` client with a structured response schema
pub struct GeminiClient {
    client: reqwest::Client,
    api_base: String,
    model: String,
    credentials: Arc<dyn CredentialProvider>,
}

impl GeminiClient {
    pub fn new(
        api_base: &str,
        model: &str,
        credentials: Arc<dyn CredentialProvider>,
    ) -> Result<Self> {
        let client = reqwest::Client::builder()
            .build()
            .map_err(|e| Error::Model(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            api_base: api_base.to_string(),
            model: model.to_string(),
            credentials,
        })
    }

    /// Check that `key` could be used to authenticate a request.
    pub fn check_api_key(key: &str) -> Result<HeaderValue> {
        validate_api_key(key)?;
        HeaderValue::from_str(key)
            .map_err(|e| Error::Configuration(format!("Invalid Gemini API Key format: {e}")))
    }

    fn api_key(&self) -> Result<HeaderValue> {
        let key = require(self.credentials.as_ref(), CredentialKey::ModelApiKey)?;
        Self::check_api_key(&key)
    }
}

impl ModelClient for GeminiClient {
    fn ensure_configured(&self) -> Result<()> {
        self.api_key().map(|_| ())
    }

    async fn propose_changes(&self, request: &ChangeRequest) -> Result<ChangeSet> {
        let api_key = self.api_key()?;
        let prompt = build_prompt(request);
        let url = generate_url(&self.api_base, &self.model);
        log::debug!("POST {} ({} prompt chars)", url, prompt.len());

        let response = self
            .client
            .post(&url)
            .header(API_KEY_HEADER, api_key)
            .header(CONTENT_TYPE, "application/json")
            .json(&build_generate_request(&prompt))
            .send()
            .await
            .map_err(|e| Error::Model(format!("Failed to reach Gemini: {e}")))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| Error::Model(format!("Failed to read Gemini response: {e}")))?;

        if !status.is_success() {
            return Err(Error::Model(format!(
                "Gemini API Error ({}): {}",
                status.as_u16(),
                error_message(&body)
            )));
        }

        let parsed: GenerateContentResponse = serde_json::from_str(&body)
            .map_err(|e| Error::Model(format!("Unexpected Gemini response: {e}")))?;
        let text = response_text(&parsed).map_err(|reason| Error::Model(format!("Gemini {reason}")))?;

        Ok(parse_change_set(&text)?)
    }
}
