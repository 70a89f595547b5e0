//! Core library for sitepilot
//!
//! This crate implements the **Functional Core** of the sitepilot assistant,
//! following the Functional Core - Imperative Shell architectural pattern.
//!
//! # Architecture Overview
//!
//! - **`sitepilot_core`** (this crate): data model and pure transformations
//! - **`sitepilot`**: HTTP clients, the change orchestrator and the CLI
//!   (the Imperative Shell)
//!
//! Nothing in this crate talks to the network. The one piece of I/O it does
//! own is the credential file, whose functions take an explicit path so they
//! can be exercised against a temporary directory.
//!
//! # Module Organization
//!
//! - [`site`]: website files, change sets and write planning
//! - [`github`]: GitHub contents API types, base64 codec, commit messages
//! - [`gemini`]: Gemini `generateContent` request and response types
//! - [`prompt`]: prompt assembly and the structured response schema
//! - [`response`]: parsing model replies into change sets
//! - [`state`]: the Idle / Fetching / Applying lifecycle
//! - [`narration`]: progress messages shown to the user
//! - [`credentials`]: the on-disk credential store
//! - [`preview`]: cache-busting preview URLs
//!
//! # Example Usage
//!
//! ```rust,ignore
//! use sitepilot_core::response::parse_change_set;
//! use sitepilot_core::site::{plan_writes, SiteFile};
//!
//! let current = vec![SiteFile {
//!     name: "index.html".to_string(),
//!     content: "<h1>Hi</h1>".to_string(),
//!     revision: Some("abc".to_string()),
//! }];
//!
//! let changes = parse_change_set(r#"{"files":[{"name":"index.html","content":"<h1>Hello</h1>"}]}"#)?;
//! let writes = plan_writes(&changes, &current);
//!
//! assert_eq!(writes[0].revision.as_deref(), Some("abc"));
//! ```

pub mod credentials;
pub mod gemini;
pub mod github;
pub mod narration;
pub mod preview;
pub mod prompt;
pub mod response;
pub mod site;
pub mod state;
