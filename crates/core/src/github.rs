//! GitHub contents API types and transformations

use base64::Engine;
use serde::{Deserialize, Serialize};

use crate::site::{is_text_file, PlannedWrite, SiteFile};

// =============================================================================
// API Response Types (Deserialization)
// =============================================================================

/// Entry of a directory listing returned by `GET /repos/{owner}/{repo}/contents/{dir}`
#[derive(Debug, Deserialize, Clone)]
pub struct ContentEntry {
    #[serde(rename = "type")]
    pub kind: String, // file, dir, symlink, submodule
    pub name: String,
    pub path: String,
    pub sha: String,
    #[serde(default)]
    pub size: u64,
}

/// Single file returned by `GET /repos/{owner}/{repo}/contents/{path}`
#[derive(Debug, Deserialize, Clone)]
pub struct ContentFile {
    pub name: String,
    pub path: String,
    pub sha: String,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub encoding: Option<String>,
}

/// Response of a successful `PUT /repos/{owner}/{repo}/contents/{path}`
#[derive(Debug, Deserialize, Clone)]
pub struct PutContentResponse {
    #[serde(default)]
    pub content: Option<ContentRef>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ContentRef {
    pub sha: String,
}

/// Error body returned with non-success statuses
#[derive(Debug, Deserialize, Clone)]
pub struct GitHubErrorBody {
    pub message: String,
}

// =============================================================================
// API Request Types (Serialization)
// =============================================================================

/// Body of a create-or-update contents request
#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct PutContentRequest {
    pub message: String,
    pub content: String,
    pub branch: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sha: Option<String>,
}

// =============================================================================
// Errors
// =============================================================================

/// Error raised when stored content cannot be turned back into text
#[derive(Debug, Clone, PartialEq)]
pub enum ContentError {
    MissingContent,
    UnsupportedEncoding(String),
    InvalidBase64(String),
    InvalidUtf8(String),
}

impl std::fmt::Display for ContentError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ContentError::MissingContent => write!(f, "response has no content field"),
            ContentError::UnsupportedEncoding(enc) => {
                write!(f, "unsupported content encoding: {}", enc)
            }
            ContentError::InvalidBase64(msg) => write!(f, "invalid base64 content: {}", msg),
            ContentError::InvalidUtf8(msg) => write!(f, "content is not valid UTF-8: {}", msg),
        }
    }
}

impl std::error::Error for ContentError {}

// =============================================================================
// Transformation Functions
// =============================================================================

/// Encode text for the `content` field of a write request.
pub fn encode_content(text: &str) -> String {
    base64::engine::general_purpose::STANDARD.encode(text.as_bytes())
}

/// Decode the `content` field of a file response.
///
/// GitHub wraps the base64 payload every 60 characters, so whitespace is
/// dropped before decoding.
pub fn decode_content(encoded: &str) -> Result<String, ContentError> {
    let compact: String = encoded.chars().filter(|c| !c.is_ascii_whitespace()).collect();
    let bytes = base64::engine::general_purpose::STANDARD
        .decode(compact.as_bytes())
        .map_err(|e| ContentError::InvalidBase64(e.to_string()))?;

    String::from_utf8(bytes).map_err(|e| ContentError::InvalidUtf8(e.to_string()))
}

/// Keep only regular files with one of the supported text extensions.
pub fn filter_text_entries(entries: Vec<ContentEntry>) -> Vec<ContentEntry> {
    entries
        .into_iter()
        .filter(|entry| entry.kind == "file" && is_text_file(&entry.name))
        .collect()
}

/// Turn a file response into a [`SiteFile`].
pub fn transform_content_file(file: ContentFile) -> Result<SiteFile, ContentError> {
    match file.encoding.as_deref() {
        None | Some("base64") => {}
        Some(other) => return Err(ContentError::UnsupportedEncoding(other.to_string())),
    }

    let encoded = file.content.ok_or(ContentError::MissingContent)?;
    let content = decode_content(&encoded)?;

    Ok(SiteFile {
        name: file.path,
        content,
        revision: Some(file.sha),
    })
}

/// Commit message recorded for a machine-generated write.
pub fn commit_message(write: &PlannedWrite) -> String {
    format!("feat: {} {} via AI dev assistant", write.kind().as_str(), write.name)
}

/// Build the request body for a planned write on `branch`.
pub fn build_put_request(write: &PlannedWrite, branch: &str) -> PutContentRequest {
    PutContentRequest {
        message: commit_message(write),
        content: encode_content(&write.content),
        branch: branch.to_string(),
        sha: write.revision.clone(),
    }
}

/// Percent-encode every segment of a repository path, keeping the separators.
pub fn encode_path(path: &str) -> String {
    path.split('/')
        .map(|segment| urlencoding::encode(segment).into_owned())
        .collect::<Vec<_>>()
        .join("/")
}

/// URL of the contents endpoint for `path` (empty for the repository root).
pub fn contents_url(api_base: &str, owner: &str, repo: &str, path: &str) -> String {
    format!(
        "{}/repos/{}/{}/contents/{}",
        api_base.trim_end_matches('/'),
        owner,
        repo,
        encode_path(path)
    )
}

/// Extract the human readable message of an error response body.
pub fn error_message(body: &str) -> String {
    match serde_json::from_str::<GitHubErrorBody>(body) {
        Ok(parsed) => parsed.message,
        Err(_) if body.trim().is_empty() => "no response body".to_string(),
        Err(_) => body.trim().to_string(),
    }
}
