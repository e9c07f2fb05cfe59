//! CLI command definitions, routing, and tracing setup.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use color_eyre::eyre::Result;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::info;

use articleforge_core::{EnrichPipeline, ProgressReporter, RunReport, Stage};
use articleforge_shared::{
    AppConfig, RuntimeConfig, config_file_path, init_config, load_config, load_config_from,
};
use articleforge_storage::ArticleStore;

// ---------------------------------------------------------------------------
// CLI structure
// ---------------------------------------------------------------------------

/// ArticleForge — enrich stored articles with sourced, rewritten content.
#[derive(Parser)]
#[command(
    name = "articleforge",
    version,
    about = "Enrich a backlog of articles with web-sourced references and generative rewrites.",
    long_about = None,
)]
pub(crate) struct Cli {
    /// Log format: text (default) or json.
    #[arg(long, default_value = "text", global = true)]
    pub log_format: LogFormat,

    /// Verbosity level (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Path to a config file (defaults to ~/.articleforge/articleforge.toml).
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

/// Log output format.
#[derive(Clone, Debug, clap::ValueEnum)]
pub(crate) enum LogFormat {
    Text,
    Json,
}

/// Top-level CLI subcommands.
#[derive(Subcommand)]
pub(crate) enum Command {
    /// Run one enrichment pass: select, discover, acquire, rewrite, persist.
    Run,

    /// List articles stored in the article API.
    List {
        /// Show only original (non-generated) articles.
        #[arg(long)]
        originals: bool,
    },

    /// Show one stored article in full.
    Show {
        /// Storage-assigned article id.
        id: i64,
    },

    /// Configuration management.
    Config {
        /// Config subcommand.
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Config subcommands.
#[derive(Subcommand)]
pub(crate) enum ConfigAction {
    /// Initialize config file with defaults.
    Init,
    /// Show resolved configuration.
    Show,
}

// ---------------------------------------------------------------------------
// Tracing setup
// ---------------------------------------------------------------------------

/// Initialize tracing based on CLI flags.
pub(crate) fn init_tracing(cli: &Cli) {
    use tracing_subscriber::{EnvFilter, fmt};

    let filter = match cli.verbose {
        0 => "articleforge=info",
        1 => "articleforge=debug",
        _ => "articleforge=trace",
    };

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    match cli.log_format {
        LogFormat::Text => {
            fmt()
                .with_env_filter(env_filter)
                .with_target(false)
                .init();
        }
        LogFormat::Json => {
            fmt().json().with_env_filter(env_filter).init();
        }
    }
}

// ---------------------------------------------------------------------------
// Command dispatch
// ---------------------------------------------------------------------------

/// Run the CLI command.
pub(crate) async fn run(cli: Cli) -> Result<()> {
    let config = load_app_config(cli.config.as_deref())?;

    match cli.command {
        Command::Run => cmd_run(&config).await,
        Command::List { originals } => cmd_list(&config, originals).await,
        Command::Show { id } => cmd_show(&config, id).await,
        Command::Config { action } => match action {
            ConfigAction::Init => cmd_config_init(),
            ConfigAction::Show => cmd_config_show(&config),
        },
    }
}

fn load_app_config(path: Option<&std::path::Path>) -> Result<AppConfig> {
    let config = match path {
        Some(path) => load_config_from(path)?,
        None => load_config()?,
    };
    Ok(config)
}

// ---------------------------------------------------------------------------
// run
// ---------------------------------------------------------------------------

async fn cmd_run(config: &AppConfig) -> Result<()> {
    // Missing secrets are fatal before any stage runs.
    let runtime = RuntimeConfig::resolve(config)?;

    info!(model = %runtime.model, "starting enrichment run");

    let pipeline = EnrichPipeline::new(&runtime)?;
    let reporter = CliProgress::new();
    let report = pipeline.run(&reporter).await;

    match &report {
        RunReport::Completed { article_id, title } => {
            println!();
            println!("  Generated article persisted.");
            println!("  ID:    {article_id}");
            println!("  Title: {title}");
            println!();
        }
        RunReport::Halted { stage, reason } => {
            println!();
            println!("  Run halted at stage '{stage}': {reason}");
            println!("  Nothing was persisted; the source article stays eligible.");
            println!();
        }
    }

    // A halted run is a normal outcome, not a process failure.
    Ok(())
}

// ---------------------------------------------------------------------------
// CLI progress reporter
// ---------------------------------------------------------------------------

/// CLI progress reporter using an indicatif spinner.
struct CliProgress {
    spinner: ProgressBar,
}

impl CliProgress {
    fn new() -> Self {
        let spinner = ProgressBar::new_spinner();
        spinner.set_style(
            ProgressStyle::with_template("{spinner:.cyan} {msg}")
                .expect("valid template")
                .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"]),
        );
        spinner.enable_steady_tick(std::time::Duration::from_millis(80));
        Self { spinner }
    }
}

impl ProgressReporter for CliProgress {
    fn stage(&self, stage: Stage) {
        let msg = match stage {
            Stage::SelectSource => "Selecting source article",
            Stage::DiscoverReferences => "Discovering reference links",
            Stage::AcquireExcerpts => "Acquiring reference excerpts",
            Stage::Rewrite => "Rewriting with the generative model",
            Stage::Persist => "Persisting generated article",
        };
        self.spinner.set_message(msg);
    }

    fn done(&self, _report: &RunReport) {
        self.spinner.finish_and_clear();
    }
}

// ---------------------------------------------------------------------------
// list
// ---------------------------------------------------------------------------

async fn cmd_list(config: &AppConfig, originals: bool) -> Result<()> {
    let base_url = resolve_storage_url(config)?;
    let store = ArticleStore::from_base_url(base_url)?;

    let articles = store.list().await?;
    let shown: Vec<_> = articles
        .iter()
        .filter(|a| !originals || !a.is_generated)
        .collect();

    if shown.is_empty() {
        println!("No articles found.");
        return Ok(());
    }

    for article in shown {
        let kind = if article.is_generated { "generated" } else { "original " };
        println!("  [{:>5}] {}  {}", article.id, kind, article.title);
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// show
// ---------------------------------------------------------------------------

async fn cmd_show(config: &AppConfig, id: i64) -> Result<()> {
    let base_url = resolve_storage_url(config)?;
    let store = ArticleStore::from_base_url(base_url)?;

    let article = store.get(id).await?;
    let kind = if article.is_generated { "generated" } else { "original" };

    println!("  ID:     {}", article.id);
    println!("  Kind:   {kind}");
    println!("  Title:  {}", article.title);
    if let Some(url) = &article.source_url {
        println!("  Source: {url}");
    }
    if let Some(refs) = &article.references {
        for (i, link) in refs.iter().enumerate() {
            println!("  Ref {}:  {link}", i + 1);
        }
    }
    println!();
    println!("{}", article.content);

    Ok(())
}

/// The list and show commands only talk to storage; they do not require
/// the search or model keys.
fn resolve_storage_url(config: &AppConfig) -> Result<String> {
    if let Some(url) = &config.storage.base_url {
        if !url.trim().is_empty() {
            return Ok(url.trim().to_string());
        }
    }
    let var = &config.storage.base_url_env;
    match std::env::var(var) {
        Ok(val) if !val.trim().is_empty() => Ok(val.trim().to_string()),
        _ => Err(color_eyre::eyre::eyre!(
            "article storage API base URL not found. Set the {var} environment variable."
        )),
    }
}

// ---------------------------------------------------------------------------
// config
// ---------------------------------------------------------------------------

fn cmd_config_init() -> Result<()> {
    let path = init_config()?;
    println!("Created default config at {}", path.display());
    Ok(())
}

fn cmd_config_show(config: &AppConfig) -> Result<()> {
    let path = config_file_path()?;
    println!("# config file: {}", path.display());
    println!("{}", toml::to_string_pretty(config)?);
    Ok(())
}
