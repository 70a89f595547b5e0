use std::sync::Arc;

use tokio::io::{AsyncBufReadExt, BufReader};

use crate::config::{credentials_path, ModelConfig, SiteConfig};
use crate::credentials::LocalCredentialStore;
use crate::github::GitHubRepository;
use crate::model::ModelBackend;
use crate::narrator::TerminalNarrator;
use crate::orchestrator::{ChangeOrchestrator, Outcome};
use crate::prelude::*;

type Assistant = ChangeOrchestrator<GitHubRepository, ModelBackend, TerminalNarrator>;

#[derive(Debug, clap::Parser)]
pub struct ChatOptions {
    /// Print progress as JSON lines instead of coloured text
    #[clap(long)]
    pub json: bool,
}

#[derive(Debug, clap::Parser)]
pub struct AskOptions {
    /// What to change, in plain language
    #[clap(required = true, num_args = 1..)]
    pub instruction: Vec<String>,

    /// Print progress as JSON lines instead of coloured text
    #[clap(long)]
    pub json: bool,
}

fn assistant(global: &crate::Global, json: bool) -> Result<Assistant> {
    let credentials = Arc::new(LocalCredentialStore::new(credentials_path(global)?));
    let site = SiteConfig::from_global(global);
    let model = ModelConfig::from_global(global);

    if global.verbose {
        eprintln!("Repository: {}", site.display_name());
        eprintln!("Model: {} ({:?})", model.model, model.provider);
        eprintln!("Credentials: {}", credentials.path().display());
    }

    let repository = GitHubRepository::new(site, credentials.clone())?;
    let backend = ModelBackend::from_config(&model, credentials)?;

    Ok(ChangeOrchestrator::new(repository, backend, TerminalNarrator::new(json))
        .with_preview_url(global.preview_url.clone()))
}

/// Read instructions from stdin until `exit`, `quit` or end of input.
pub async fn run_chat(options: ChatOptions, global: crate::Global) -> Result<()> {
    let assistant = assistant(&global, options.json)?;
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    if !options.json {
        eprintln!(
            "Describe a change to {}. Type `exit` to leave.",
            SiteConfig::from_global(&global).display_name()
        );
    }

    while let Some(line) = lines
        .next_line()
        .await
        .context("Failed to read from stdin")?
    {
        if matches!(line.trim(), "exit" | "quit") {
            break;
        }
        assistant.submit(&line).await;
    }

    Ok(())
}

/// Submit one instruction. Fails when the request or any write failed.
pub async fn run_ask(options: AskOptions, global: crate::Global) -> Result<()> {
    let assistant = assistant(&global, options.json)?;
    let instruction = options.instruction.join(" ");

    let outcome = assistant.submit(&instruction).await;
    if outcome.is_success() {
        return Ok(());
    }

    match outcome {
        Outcome::Ignored(rejection) => Err(eyre!("Nothing to do: {}", rejection)),
        Outcome::Failed(err) => Err(eyre!(err)),
        Outcome::Applied(report) => Err(eyre!(
            "{} of {} file(s) could not be written",
            report.failed.len(),
            report.total()
        )),
        Outcome::NoChanges => Ok(()),
    }
}
