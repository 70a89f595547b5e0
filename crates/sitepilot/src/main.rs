use crate::prelude::*;
use clap::Parser;

mod auth;
mod chat;
mod config;
mod credentials;
mod error;
mod files;
mod github;
mod model;
mod narrator;
mod orchestrator;
mod prelude;

#[derive(Debug, clap::Parser)]
#[command(
    author,
    version,
    about,
    long_about = "Describe a change to a static website in plain language and let an AI push it to GitHub"
)]
pub struct App {
    #[command(subcommand)]
    pub command: SubCommands,

    #[clap(flatten)]
    global: Global,
}

#[derive(Debug, Clone, clap::Args)]
pub struct Global {
    /// Owner of the website repository
    #[clap(long, env = "SITEPILOT_REPO_OWNER", global = true, default_value = "saad-pie")]
    owner: String,

    /// Name of the website repository
    #[clap(
        long,
        env = "SITEPILOT_REPO_NAME",
        global = true,
        default_value = "steve-ai-chatbot-7015"
    )]
    repo: String,

    /// Branch files are read from and committed to
    #[clap(long, env = "SITEPILOT_BRANCH", global = true, default_value = "main")]
    branch: String,

    /// GitHub REST API base URL
    #[clap(
        long,
        env = "GITHUB_API_URL",
        global = true,
        default_value = config::DEFAULT_GITHUB_API
    )]
    github_api: String,

    /// Model provider
    #[clap(
        long,
        env = "SITEPILOT_PROVIDER",
        global = true,
        value_enum,
        default_value_t = model::Provider::Gemini
    )]
    provider: model::Provider,

    /// Model name (defaults to gemini-2.5-flash for Gemini, qwen2.5-coder for Ollama)
    #[clap(long, env = "SITEPILOT_MODEL", global = true)]
    model: Option<String>,

    /// Gemini API base URL
    #[clap(
        long,
        env = "GEMINI_API_URL",
        global = true,
        default_value = config::DEFAULT_GEMINI_API
    )]
    gemini_api: String,

    /// Ollama base URL
    #[clap(
        long,
        env = "OLLAMA_URL",
        global = true,
        default_value = config::DEFAULT_OLLAMA_URL
    )]
    ollama_url: String,

    /// Base URL of the published site, used to print a fresh preview link
    #[clap(long, env = "SITEPILOT_PREVIEW_URL", global = true)]
    preview_url: Option<String>,

    /// Path of the credential file
    #[clap(long, env = "SITEPILOT_CREDENTIALS", global = true)]
    credentials: Option<std::path::PathBuf>,

    /// Whether to display additional information.
    #[clap(long, env = "SITEPILOT_VERBOSE", global = true, default_value = "false")]
    verbose: bool,
}

#[derive(Debug, clap::Parser)]
pub enum SubCommands {
    /// Interactive session: each line you type is one change request
    Chat(crate::chat::ChatOptions),

    /// Submit a single change request
    Ask(crate::chat::AskOptions),

    /// List the website files the assistant works on
    Files(crate::files::FilesOptions),

    /// Manage the stored GitHub token and model API key
    Auth(crate::auth::App),
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();
    color_eyre::install()?;

    let app = App::parse();

    match app.command {
        SubCommands::Chat(options) => crate::chat::run_chat(options, app.global).await,
        SubCommands::Ask(options) => crate::chat::run_ask(options, app.global).await,
        SubCommands::Files(options) => crate::files::run(options, app.global).await,
        SubCommands::Auth(sub_app) => crate::auth::run(sub_app, app.global).await,
    }
    .map_err(|err: color_eyre::eyre::Report| eyre!(err))
}
