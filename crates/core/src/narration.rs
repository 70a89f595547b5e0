//! Progress messages shown to the user while a request runs

use serde::Serialize;

/// Who a chat line belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Speaker {
    User,
    System,
}

/// A single line of user-visible narration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum Narration {
    Instruction { text: String },
    FetchingFiles,
    Thinking,
    NoChanges,
    Pushing { count: usize },
    Updated { name: String },
    Created { name: String },
    WriteFailed { name: String, reason: String },
    PushComplete,
    PartialPush { failed: usize, total: usize },
    Preview { url: String },
    Error { reason: String },
}

impl Narration {
    pub fn speaker(&self) -> Speaker {
        match self {
            Narration::Instruction { .. } => Speaker::User,
            _ => Speaker::System,
        }
    }

    /// Whether the line reports a failure.
    pub fn is_failure(&self) -> bool {
        matches!(
            self,
            Narration::WriteFailed { .. } | Narration::PartialPush { .. } | Narration::Error { .. }
        )
    }
}

impl std::fmt::Display for Narration {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Narration::Instruction { text } => write!(f, "{}", text),
            Narration::FetchingFiles => write!(f, "Fetching current website files from GitHub..."),
            Narration::Thinking => write!(f, "Thinking... this may take a moment."),
            Narration::NoChanges => write!(f, "AI did not suggest any changes."),
            Narration::Pushing { count } => write!(
                f,
                "AI generated updates for {} file(s). Pushing to GitHub...",
                count
            ),
            Narration::Updated { name } => write!(f, "Updated {}", name),
            Narration::Created { name } => write!(f, "Created new file: {}", name),
            Narration::WriteFailed { name, reason } => {
                write!(f, "Failed to write {}: {}", name, reason)
            }
            Narration::PushComplete => {
                write!(f, "Updates pushed successfully! Refreshing preview...")
            }
            Narration::PartialPush { failed, total } => write!(
                f,
                "{} of {} file(s) could not be written. Changes already pushed were kept.",
                failed, total
            ),
            Narration::Preview { url } => write!(f, "Preview: {}", url),
            Narration::Error { reason } => write!(f, "Error: {}", reason),
        }
    }
}
