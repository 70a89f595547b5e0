use std::sync::Arc;

use serde::Serialize;
use sitepilot_core::site::SiteFile;

use crate::config::{credentials_path, SiteConfig};
use crate::credentials::LocalCredentialStore;
use crate::github::{GitHubRepository, Repository};
use crate::prelude::*;

#[derive(Debug, clap::Parser)]
pub struct FilesOptions {
    /// Output as JSON
    #[clap(long)]
    pub json: bool,
}

#[derive(Debug, Serialize)]
struct FileSummary<'a> {
    name: &'a str,
    size: usize,
    revision: Option<&'a str>,
}

impl<'a> From<&'a SiteFile> for FileSummary<'a> {
    fn from(file: &'a SiteFile) -> Self {
        Self {
            name: &file.name,
            size: file.content.len(),
            revision: file.revision.as_deref(),
        }
    }
}

pub async fn run(options: FilesOptions, global: crate::Global) -> Result<()> {
    let credentials = Arc::new(LocalCredentialStore::new(credentials_path(&global)?));
    let site = SiteConfig::from_global(&global);
    let display_name = site.display_name();
    let repository = GitHubRepository::new(site, credentials)?;

    repository.ensure_configured()?;
    let files = repository.list_text_files().await?;
    let summaries: Vec<FileSummary> = files.iter().map(FileSummary::from).collect();

    if options.json {
        let json = serde_json::to_string_pretty(&summaries)
            .map_err(|e| eyre!("JSON serialization failed: {}", e))?;
        println!("{}", json);
        return Ok(());
    }

    if summaries.is_empty() {
        println!("No text files in {}", display_name);
        return Ok(());
    }

    let mut table = new_table();
    table.add_row(prettytable::row!["Name", "Size", "Revision"]);
    for summary in &summaries {
        table.add_row(prettytable::row![
            summary.name,
            summary.size,
            summary.revision.unwrap_or("-")
        ]);
    }
    table.printstd();

    Ok(())
}
