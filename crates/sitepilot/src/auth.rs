use colored::Colorize;
use sitepilot_core::credentials::{mask_secret, CredentialKey};

use crate::config::credentials_path;
use crate::credentials::{store, CredentialProvider, LocalCredentialStore};
use crate::prelude::*;

#[derive(Debug, clap::Parser)]
#[command(name = "auth")]
#[command(about = "Manage the stored GitHub token and model API key")]
pub struct App {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, clap::Subcommand)]
pub enum Commands {
    /// Store a secret
    #[clap(name = "set")]
    Set(SetOptions),

    /// Show which secrets are stored, masked
    #[clap(name = "show")]
    Show,

    /// Remove a stored secret
    #[clap(name = "clear")]
    Clear(ClearOptions),
}

#[derive(Debug, Clone, Copy, clap::ValueEnum)]
pub enum Secret {
    /// Token used for the GitHub contents API
    GithubToken,
    /// Gemini API key
    ModelKey,
}

impl From<Secret> for CredentialKey {
    fn from(secret: Secret) -> Self {
        match secret {
            Secret::GithubToken => CredentialKey::GitHubToken,
            Secret::ModelKey => CredentialKey::ModelApiKey,
        }
    }
}

#[derive(Debug, clap::Parser)]
pub struct SetOptions {
    /// Which secret to store
    #[clap(value_enum)]
    pub key: Secret,

    /// The secret value
    pub value: String,
}

#[derive(Debug, clap::Parser)]
pub struct ClearOptions {
    /// Which secret to remove
    #[clap(value_enum)]
    pub key: Secret,
}

pub async fn run(app: App, global: crate::Global) -> Result<()> {
    let local = LocalCredentialStore::new(credentials_path(&global)?);

    match app.command {
        Commands::Set(options) => {
            let key = CredentialKey::from(options.key);
            store(&local, key, &options.value)?;
            println!("{} {} saved", "✓".green(), key.label());
        }
        Commands::Show => {
            println!("{}", local.path().display().to_string().dimmed());

            let mut table = new_table();
            for key in CredentialKey::ALL {
                let value = match local.get(key)? {
                    Some(secret) => mask_secret(&secret),
                    None => "not set".red().to_string(),
                };
                table.add_row(prettytable::row![key.label(), value]);
            }
            table.printstd();
        }
        Commands::Clear(options) => {
            let key = CredentialKey::from(options.key);
            local.clear(key)?;
            println!("{} removed", key.label());
        }
    }

    Ok(())
}
