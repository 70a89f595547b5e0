//! Website files and the change sets proposed for them

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Extensions of the files the assistant reads and rewrites.
pub const TEXT_EXTENSIONS: &[&str] = &[".html", ".css", ".js"];

/// A text file stored at the repository root.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SiteFile {
    /// Path of the file within the repository.
    pub name: String,
    /// Full text content.
    pub content: String,
    /// Revision token required to overwrite the file. `None` for files that
    /// do not exist in the repository yet.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub revision: Option<String>,
}

/// A file as proposed by the model: full content, no revision.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProposedFile {
    pub name: String,
    pub content: String,
}

/// Ordered list of files the model wants to create or update.
///
/// An empty change set is a valid answer meaning "nothing to change".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeSet {
    #[serde(default)]
    pub files: Vec<ProposedFile>,
}

impl ChangeSet {
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }
}

/// A natural-language instruction together with the files visible when it
/// was submitted.
#[derive(Debug, Clone)]
pub struct ChangeRequest {
    pub instruction: String,
    pub files: Vec<SiteFile>,
}

/// Whether a write creates a new file or overwrites an existing one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum WriteKind {
    Create,
    Update,
}

impl WriteKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            WriteKind::Create => "create",
            WriteKind::Update => "update",
        }
    }
}

/// A single write derived from a proposed file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedWrite {
    pub name: String,
    pub content: String,
    pub revision: Option<String>,
}

impl PlannedWrite {
    pub fn kind(&self) -> WriteKind {
        if self.revision.is_some() {
            WriteKind::Update
        } else {
            WriteKind::Create
        }
    }
}

/// Returns true when `name` ends with one of [`TEXT_EXTENSIONS`].
pub fn is_text_file(name: &str) -> bool {
    TEXT_EXTENSIONS.iter().any(|ext| name.ends_with(ext))
}

/// Tracks the latest known revision of every file while a change set is
/// being applied.
///
/// Files are matched by exact name. After a successful write the revision
/// reported by the store replaces the captured one, so a change set naming
/// the same file twice never reuses a stale token.
#[derive(Debug, Clone, Default)]
pub struct RevisionLedger {
    revisions: HashMap<String, Option<String>>,
}

impl RevisionLedger {
    pub fn from_files(files: &[SiteFile]) -> Self {
        let revisions = files
            .iter()
            .map(|file| (file.name.clone(), file.revision.clone()))
            .collect();
        Self { revisions }
    }

    /// Build the write for `file`: an update carrying the known revision when
    /// the name was fetched (or already written), a creation otherwise.
    pub fn plan(&self, file: &ProposedFile) -> PlannedWrite {
        PlannedWrite {
            name: file.name.clone(),
            content: file.content.clone(),
            revision: self.revisions.get(&file.name).cloned().flatten(),
        }
    }

    /// Record the outcome of a successful write.
    pub fn record(&mut self, name: &str, revision: Option<String>) {
        self.revisions.insert(name.to_string(), revision);
    }
}

/// Plan every write of a change set against the fetched files, in order.
pub fn plan_writes(changes: &ChangeSet, current: &[SiteFile]) -> Vec<PlannedWrite> {
    let ledger = RevisionLedger::from_files(current);
    changes.files.iter().map(|file| ledger.plan(file)).collect()
}

/// Reject file names that would escape the repository root or are otherwise
/// unusable as a contents path.
pub fn validate_file_name(name: &str) -> Result<(), String> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err("file name is empty".to_string());
    }
    if trimmed != name {
        return Err(format!("file name has surrounding whitespace: {name:?}"));
    }
    if name.chars().any(|c| c.is_control()) {
        return Err(format!("file name contains control characters: {name:?}"));
    }
    if name.contains('\\') {
        return Err(format!("backslashes are not allowed: {name}"));
    }
    if name.starts_with('/') {
        return Err(format!("absolute paths are not allowed: {name}"));
    }
    if name.split('/').any(|segment| segment.is_empty() || segment == ".." || segment == ".") {
        return Err(format!("invalid path segment in {name}"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn site_file(name: &str, revision: Option<&str>) -> SiteFile {
        SiteFile {
            name: name.to_string(),
            content: String::new(),
            revision: revision.map(str::to_string),
        }
    }

    fn proposed(name: &str, content: &str) -> ProposedFile {
        ProposedFile {
            name: name.to_string(),
            content: content.to_string(),
        }
    }

    #[test]
    fn test_is_text_file() {
        assert!(is_text_file("index.html"));
        assert!(is_text_file("style.css"));
        assert!(is_text_file("app.js"));
        assert!(!is_text_file("README.md"));
        assert!(!is_text_file("logo.png"));
        assert!(!is_text_file("data.json"));
        assert!(!is_text_file("html"));
    }

    #[test]
    fn test_plan_writes_update_carries_revision() {
        let current = vec![site_file("index.html", Some("abc"))];
        let changes = ChangeSet {
            files: vec![proposed("index.html", "<h1 style=\"color:blue\">Hi</h1>")],
        };

        let writes = plan_writes(&changes, &current);
        assert_eq!(writes.len(), 1);
        assert_eq!(writes[0].name, "index.html");
        assert_eq!(writes[0].revision.as_deref(), Some("abc"));
        assert_eq!(writes[0].kind(), WriteKind::Update);
    }

    #[test]
    fn test_plan_writes_new_file_is_creation() {
        let current = vec![site_file("index.html", Some("abc"))];
        let changes = ChangeSet {
            files: vec![
                proposed("about.html", "<p>About</p>"),
                proposed("index.html", "<a href=\"about.html\">About</a>"),
            ],
        };

        let writes = plan_writes(&changes, &current);
        assert_eq!(writes[0].kind(), WriteKind::Create);
        assert_eq!(writes[0].revision, None);
        assert_eq!(writes[1].kind(), WriteKind::Update);
        // Order of the change set is preserved
        assert_eq!(writes[0].name, "about.html");
        assert_eq!(writes[1].name, "index.html");
    }

    #[test]
    fn test_plan_matches_names_exactly() {
        let current = vec![site_file("Index.html", Some("abc"))];
        let changes = ChangeSet {
            files: vec![proposed("index.html", "x")],
        };

        assert_eq!(plan_writes(&changes, &current)[0].kind(), WriteKind::Create);
    }

    #[test]
    fn test_ledger_uses_latest_revision() {
        let mut ledger = RevisionLedger::from_files(&[site_file("index.html", Some("abc"))]);
        ledger.record("index.html", Some("def".to_string()));
        ledger.record("about.html", Some("123".to_string()));

        let index = ledger.plan(&proposed("index.html", "x"));
        assert_eq!(index.revision.as_deref(), Some("def"));

        let about = ledger.plan(&proposed("about.html", "y"));
        assert_eq!(about.kind(), WriteKind::Update);
        assert_eq!(about.revision.as_deref(), Some("123"));
    }

    #[test]
    fn test_empty_change_set() {
        let changes = ChangeSet::default();
        assert!(changes.is_empty());
        assert!(plan_writes(&changes, &[]).is_empty());
    }

    #[test]
    fn test_validate_file_name_accepts_relative_paths() {
        assert!(validate_file_name("index.html").is_ok());
        assert!(validate_file_name("pages/about.html").is_ok());
    }

    #[test]
    fn test_validate_file_name_rejects_unsafe_paths() {
        assert!(validate_file_name("").is_err());
        assert!(validate_file_name("  ").is_err());
        assert!(validate_file_name("/etc/passwd").is_err());
        assert!(validate_file_name("../secret.html").is_err());
        assert!(validate_file_name("a//b.html").is_err());
        assert!(validate_file_name("./index.html").is_err());
        assert!(validate_file_name("pages\\about.html").is_err());
        assert!(validate_file_name(" index.html").is_err());
    }
}
