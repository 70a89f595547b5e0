use std::sync::Arc;

use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION, USER_AGENT};
use serde::de::DeserializeOwned;
use sitepilot_core::credentials::CredentialKey;
use sitepilot_core::github::{
    build_put_request, contents_url, error_message, filter_text_entries, transform_content_file,
    ContentEntry, ContentFile, PutContentResponse,
};
use sitepilot_core::site::{PlannedWrite, SiteFile};

use crate::config::SiteConfig;
use crate::credentials::{require, CredentialProvider};
use crate::error::{Error, Result};

/// Read/write access to the text files of one repository branch
#[allow(async_fn_in_trait)]
pub trait Repository {
    /// Fails with a configuration error when the store cannot be used at all.
    fn ensure_configured(&self) -> Result<()>;

    /// Every text file at the repository root, with content and revision.
    async fn list_text_files(&self) -> Result<Vec<SiteFile>>;

    /// Create or update one file. Returns the revision the store assigned.
    async fn write_file(&self, write: &PlannedWrite) -> Result<Option<String>>;
}

/// Repository backed by the GitHub contents API
pub struct GitHubRepository {
    client: reqwest::Client,
    config: SiteConfig,
    credentials: Arc<dyn CredentialProvider>,
}

impl GitHubRepository {
    pub fn new(config: SiteConfig, credentials: Arc<dyn CredentialProvider>) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(
            ACCEPT,
            HeaderValue::from_static("application/vnd.github.v3+json"),
        );
        headers.insert(
            USER_AGENT,
            HeaderValue::from_static(concat!("sitepilot/", env!("CARGO_PKG_VERSION"))),
        );

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .build()
            .map_err(|e| Error::Network(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            config,
            credentials,
        })
    }

    fn url(&self, path: &str) -> String {
        contents_url(
            &self.config.api_base,
            &self.config.owner,
            &self.config.repo,
            path,
        )
    }

    fn auth_header(&self) -> Result<HeaderValue> {
        let token = require(self.credentials.as_ref(), CredentialKey::GitHubToken)?;
        HeaderValue::from_str(&format!("token {token}"))
            .map_err(|_| Error::Configuration("GitHub token contains invalid characters".to_string()))
    }

    /// Send an authenticated request and decode a successful JSON body.
    async fn send<T: DeserializeOwned>(&self, request: reqwest::RequestBuilder) -> Result<T> {
        let response = request
            .header(AUTHORIZATION, self.auth_header()?)
            .send()
            .await
            .map_err(|e| Error::Network(format!("Failed to reach GitHub: {e}")))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| Error::Network(format!("Failed to read GitHub response: {e}")))?;

        if !status.is_success() {
            return Err(Error::remote(status, error_message(&body)));
        }

        serde_json::from_str(&body)
            .map_err(|e| Error::remote(status, format!("Unexpected response body: {e}")))
    }

    async fn fetch_file(&self, entry: &ContentEntry) -> Result<SiteFile> {
        let url = format!(
            "{}?ref={}",
            self.url(&entry.path),
            urlencoding::encode(&self.config.branch)
        );
        log::debug!("GET {}", url);

        let file: ContentFile = self.send(self.client.get(&url)).await?;
        transform_content_file(file).map_err(|e| Error::decode(&entry.path, e))
    }
}

impl Repository for GitHubRepository {
    fn ensure_configured(&self) -> Result<()> {
        require(self.credentials.as_ref(), CredentialKey::GitHubToken).map(|_| ())
    }

    async fn list_text_files(&self) -> Result<Vec<SiteFile>> {
        let url = format!(
            "{}?ref={}",
            self.url(""),
            urlencoding::encode(&self.config.branch)
        );
        log::debug!("GET {}", url);

        let entries: Vec<ContentEntry> = self.send(self.client.get(&url)).await?;
        let entries = filter_text_entries(entries);
        log::info!(
            "Fetching {} text file(s) from {}",
            entries.len(),
            self.config.display_name()
        );

        // One at a time; the first failure aborts the listing
        let mut files = Vec::with_capacity(entries.len());
        for entry in &entries {
            files.push(self.fetch_file(entry).await?);
        }

        Ok(files)
    }

    async fn write_file(&self, write: &PlannedWrite) -> Result<Option<String>> {
        let url = self.url(&write.name);
        let body = build_put_request(write, &self.config.branch);
        log::debug!("PUT {} ({})", url, body.message);

        let response: PutContentResponse = self.send(self.client.put(&url).json(&body)).await?;

        Ok(response.content.map(|content| content.sha))
    }
}
