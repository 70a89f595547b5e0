//! Parsing of model replies into change sets

use serde_json::Value;

use crate::site::{validate_file_name, ChangeSet, ProposedFile};

/// Error raised when a model reply does not match the response schema
#[derive(Debug, Clone, PartialEq)]
pub enum ResponseError {
    Empty,
    InvalidJson(String),
    NotAnObject,
    InvalidFile { index: usize, reason: String },
}

impl std::fmt::Display for ResponseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ResponseError::Empty => write!(f, "model returned an empty response"),
            ResponseError::InvalidJson(msg) => write!(f, "model response is not valid JSON: {}", msg),
            ResponseError::NotAnObject => write!(f, "model response is not a JSON object"),
            ResponseError::InvalidFile { index, reason } => {
                write!(f, "files[{}] is invalid: {}", index, reason)
            }
        }
    }
}

impl std::error::Error for ResponseError {}

/// Extract the JSON payload from a model reply.
///
/// Strips markdown fences (```json or ```) and any commentary around them.
pub fn extract_json(response: &str) -> &str {
    let trimmed = response.trim();

    let fenced = if let Some(start) = trimmed.find("```json") {
        Some(&trimmed[start + "```json".len()..])
    } else {
        trimmed.find("```").map(|start| &trimmed[start + "```".len()..])
    };

    match fenced {
        Some(after) => {
            let end = after.find("```").unwrap_or(after.len());
            after[..end].trim()
        }
        None => trimmed,
    }
}

/// Parse a model reply into a [`ChangeSet`].
///
/// A reply whose `files` field is missing, null, not a list or empty is a
/// valid "no changes" answer. Replies that are not JSON objects, and file
/// entries without a string `name` and `content`, are errors.
pub fn parse_change_set(response: &str) -> Result<ChangeSet, ResponseError> {
    let trimmed = response.trim();
    if trimmed.is_empty() {
        return Err(ResponseError::Empty);
    }

    // Schema-constrained replies are bare JSON; only look for fences otherwise
    let value: Value = match serde_json::from_str(trimmed) {
        Ok(value) => value,
        Err(_) => serde_json::from_str(extract_json(trimmed))
            .map_err(|e| ResponseError::InvalidJson(e.to_string()))?,
    };

    let object = value.as_object().ok_or(ResponseError::NotAnObject)?;

    let Some(entries) = object.get("files").and_then(Value::as_array) else {
        return Ok(ChangeSet::default());
    };

    let mut files = Vec::with_capacity(entries.len());
    for (index, entry) in entries.iter().enumerate() {
        let name = entry
            .get("name")
            .and_then(Value::as_str)
            .ok_or_else(|| ResponseError::InvalidFile {
                index,
                reason: "missing string field 'name'".to_string(),
            })?;
        let content = entry
            .get("content")
            .and_then(Value::as_str)
            .ok_or_else(|| ResponseError::InvalidFile {
                index,
                reason: "missing string field 'content'".to_string(),
            })?;

        validate_file_name(name).map_err(|reason| ResponseError::InvalidFile { index, reason })?;

        files.push(ProposedFile {
            name: name.to_string(),
            content: content.to_string(),
        });
    }

    Ok(ChangeSet { files })
}
