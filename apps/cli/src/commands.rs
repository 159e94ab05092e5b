//! CLI command definitions, routing, and tracing setup.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use color_eyre::eyre::{Result, eyre};
use indicatif::{ProgressBar, ProgressStyle};
use tracing::info;

use sourcebrief_documents::Document;
use sourcebrief_retrieval::{
    BraveProvider, RetrievalError, Retriever, SearchProvider, SearxngProvider,
    site_filtered_query,
};
use sourcebrief_shared::{
    AppConfig, RetrievalConfig, SessionLog, init_config, load_config, validate_brave_api_key,
};

// ---------------------------------------------------------------------------
// CLI structure
// ---------------------------------------------------------------------------

/// SourceBrief — answer questions from web sources, with citations.
#[derive(Parser)]
#[command(
    name = "sourcebrief",
    version,
    about = "Search the web, condense the top sources into a short answer, and cite them.",
    long_about = None,
)]
pub(crate) struct Cli {
    /// Log format: text (default) or json.
    #[arg(long, default_value = "text", global = true)]
    pub log_format: LogFormat,

    /// Verbosity level (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

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
    /// Answer a question from web sources.
    Ask {
        /// The question to answer.
        query: String,

        /// Maximum number of sources to retrieve.
        #[arg(short, long)]
        sources: Option<usize>,

        /// Maximum text fragments extracted per source.
        #[arg(short, long)]
        fragments: Option<usize>,

        /// Word budget for the condensed answer.
        #[arg(short = 'w', long)]
        max_words: Option<usize>,

        /// Per-source fetch timeout in seconds.
        #[arg(short, long)]
        timeout: Option<u64>,

        /// Search provider: searxng or brave (defaults to config).
        #[arg(short, long)]
        provider: Option<String>,
    },

    /// Search for lecture/class videos (site-filtered, links only).
    Videos {
        /// Topic or class to search for.
        topic: String,

        /// Maximum number of results.
        #[arg(short, long)]
        sources: Option<usize>,

        /// Search provider: searxng or brave (defaults to config).
        #[arg(short, long)]
        provider: Option<String>,
    },

    /// Extract text from a local document (PDF, DOCX, or plain text).
    Extract {
        /// Path to the file.
        file: PathBuf,
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
        0 => "sourcebrief=info",
        1 => "sourcebrief=debug",
        _ => "sourcebrief=trace",
    };

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(filter));

    match cli.log_format {
        LogFormat::Text => {
            fmt()
                .with_env_filter(env_filter)
                .with_target(false)
                .init();
        }
        LogFormat::Json => {
            fmt()
                .json()
                .with_env_filter(env_filter)
                .init();
        }
    }
}

// ---------------------------------------------------------------------------
// Command dispatch
// ---------------------------------------------------------------------------

/// Run the CLI command.
pub(crate) async fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Command::Ask {
            query,
            sources,
            fragments,
            max_words,
            timeout,
            provider,
        } => {
            cmd_ask(
                &query,
                sources,
                fragments,
                max_words,
                timeout,
                provider.as_deref(),
            )
            .await
        }
        Command::Videos {
            topic,
            sources,
            provider,
        } => cmd_videos(&topic, sources, provider.as_deref()).await,
        Command::Extract { file } => cmd_extract(&file).await,
        Command::Config { action } => match action {
            ConfigAction::Init => cmd_config_init().await,
            ConfigAction::Show => cmd_config_show().await,
        },
    }
}

/// Build the configured search provider, honoring a CLI override.
fn build_provider(config: &AppConfig, flag: Option<&str>) -> Result<Box<dyn SearchProvider>> {
    let name = flag.unwrap_or(&config.search.provider);
    match name {
        "searxng" => Ok(Box::new(SearxngProvider::new(
            &config.search.searxng_base_url,
        )?)),
        "brave" => {
            let api_key = validate_brave_api_key(config)?;
            Ok(Box::new(BraveProvider::new(api_key)?))
        }
        other => Err(eyre!(
            "unknown search provider '{other}': expected 'searxng' or 'brave'"
        )),
    }
}

// ---------------------------------------------------------------------------
// ask
// ---------------------------------------------------------------------------

async fn cmd_ask(
    query: &str,
    sources: Option<usize>,
    fragments: Option<usize>,
    max_words: Option<usize>,
    timeout: Option<u64>,
    provider_flag: Option<&str>,
) -> Result<()> {
    if query.trim().is_empty() {
        return Err(eyre!("query must not be empty"));
    }

    let config = load_config()?;
    let provider = build_provider(&config, provider_flag)?;

    // CLI flags override config file values
    let mut retrieval = RetrievalConfig::from(&config);
    if let Some(n) = sources {
        retrieval.max_sources = n;
    }
    if let Some(n) = fragments {
        retrieval.max_fragments_per_source = n;
    }
    if let Some(w) = max_words {
        retrieval.max_words = Some(w);
    }
    if let Some(t) = timeout {
        retrieval.fetch_timeout_secs = t;
    }

    info!(
        provider = provider.name(),
        max_sources = retrieval.max_sources,
        "answering question"
    );

    let retriever = Retriever::new(retrieval)?;
    let mut log = SessionLog::new();

    let spinner = searching_spinner();
    let result = retriever
        .retrieve_and_condense(provider.as_ref(), query, &mut log)
        .await;
    spinner.finish_and_clear();

    match result {
        Ok(answer) => {
            println!();
            println!("  Answer from web sources:");
            println!();
            println!("  {}", answer.text.trim_end());
            println!();
            println!("  Top sources:");
            for source in &answer.sources {
                println!("  - {source}");
            }
            println!();
        }
        Err(RetrievalError::NoContentExtracted { sources }) => {
            println!();
            println!("  No answer found. Try rephrasing the question.");
            if !sources.is_empty() {
                println!();
                println!("  Sources that were tried:");
                for source in &sources {
                    println!("  - {source}");
                }
            }
            println!();
        }
        Err(RetrievalError::SearchUnavailable(message)) => {
            println!();
            println!("  Search error: {message}");
            println!();
        }
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// videos
// ---------------------------------------------------------------------------

async fn cmd_videos(topic: &str, sources: Option<usize>, provider_flag: Option<&str>) -> Result<()> {
    if topic.trim().is_empty() {
        return Err(eyre!("topic must not be empty"));
    }

    let config = load_config()?;
    let provider = build_provider(&config, provider_flag)?;
    let max_results = sources.unwrap_or(config.defaults.max_sources);

    let query = site_filtered_query(topic, "youtube.com");
    info!(provider = provider.name(), %query, "searching videos");

    let spinner = searching_spinner();
    let result = provider.search(&query, max_results).await;
    spinner.finish_and_clear();

    match result {
        Ok(locations) if locations.is_empty() => {
            println!();
            println!("  No videos found for '{topic}'.");
            println!();
        }
        Ok(locations) => {
            println!();
            println!("  Top results:");
            for location in &locations {
                println!("  - {location}");
            }
            println!();
        }
        Err(e) => {
            println!();
            println!("  Search error: {e}");
            println!();
        }
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// extract
// ---------------------------------------------------------------------------

async fn cmd_extract(file: &PathBuf) -> Result<()> {
    let document = Document::from_path(file)?;
    info!(path = %file.display(), kind = %document.kind(), "extracting text");

    let text = document.extract_text()?;

    println!();
    println!("  Extracted text ({}):", document.kind());
    println!();
    println!("{text}");

    Ok(())
}

// ---------------------------------------------------------------------------
// config
// ---------------------------------------------------------------------------

async fn cmd_config_init() -> Result<()> {
    let path = init_config()?;
    println!("Config initialized at: {}", path.display());
    Ok(())
}

async fn cmd_config_show() -> Result<()> {
    let config: AppConfig = load_config()?;
    let toml_str = toml::to_string_pretty(&config)?;
    println!("{toml_str}");
    Ok(())
}

// ---------------------------------------------------------------------------
// Spinner
// ---------------------------------------------------------------------------

/// Spinner shown while the pipeline runs.
fn searching_spinner() -> ProgressBar {
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::with_template("{spinner:.cyan} {msg}")
            .unwrap()
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"]),
    );
    spinner.enable_steady_tick(std::time::Duration::from_millis(80));
    spinner.set_message("Searching and condensing sources...");
    spinner
}
