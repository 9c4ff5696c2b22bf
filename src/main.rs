use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, level_filters::LevelFilter, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use jongso_server::analysis::LlmReviewClassifier;
use jongso_server::config::{EnvSecrets, FileConfig};
use jongso_server::enrichment::{
    EnrichmentCache, DEFAULT_FRESHNESS_DAYS, DEFAULT_WRITE_CONCURRENCY,
};
use jongso_server::llm::{CompletionOptions, OpenAIProvider};
use jongso_server::places::GooglePlacesClient;
use jongso_server::shop_store::ShopStore;
use jongso_server::{
    run_server, NullShopStore, RequestsLoggingLevel, SearchService, ServerConfig, SqliteShopStore,
};

const DEFAULT_PORT: u16 = 8000;
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 5;
const DEFAULT_LLM_BASE_URL: &str = "https://api.openai.com/v1";
const DEFAULT_CHAT_MODEL: &str = "gpt-3.5-turbo";

fn parse_path(s: &str) -> Result<PathBuf> {
    let path_buf = PathBuf::from(s);
    let original_path = match path_buf.canonicalize() {
        Ok(path) => path,
        Err(msg) => {
            if msg.kind() == std::io::ErrorKind::NotFound {
                path_buf
            } else {
                return Err(msg).with_context(|| format!("Error resolving path: {}", s));
            }
        }
    };
    if original_path.is_absolute() {
        return Ok(original_path);
    }
    let cwd = std::env::current_dir()?;
    Ok(cwd.join(original_path))
}

#[derive(Parser, Debug)]
struct CliArgs {
    /// Path to a TOML config file. CLI flags take precedence over it.
    #[clap(long, value_parser = parse_path)]
    pub config: Option<PathBuf>,

    /// Path to the SQLite database for enrichment records. Without one the
    /// server runs without caching or persistence.
    #[clap(long, value_parser = parse_path)]
    pub db_path: Option<PathBuf>,

    /// The port to listen on.
    #[clap(short, long)]
    pub port: Option<u16>,

    /// The level of logging to perform on each request.
    #[clap(long)]
    pub logging_level: Option<RequestsLoggingLevel>,

    /// Maximum age in days of a stored enrichment before it counts as stale.
    #[clap(long)]
    pub freshness_days: Option<i64>,

    /// Maximum number of concurrent background store writes.
    #[clap(long)]
    pub write_concurrency: Option<usize>,

    /// Timeout in seconds for maps provider and language model requests.
    #[clap(long)]
    pub request_timeout_secs: Option<u64>,
}

fn parse_logging_level(value: &str) -> Option<RequestsLoggingLevel> {
    <RequestsLoggingLevel as clap::ValueEnum>::from_str(value, true).ok()
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli_args = CliArgs::parse();

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            EnvFilter::builder()
                .with_default_directive(LevelFilter::INFO.into())
                .with_env_var("LOG_LEVEL")
                .from_env_lossy(),
        )
        .try_init()
        .unwrap();

    let file_config = match &cli_args.config {
        Some(path) => FileConfig::load(path)?,
        None => FileConfig::default(),
    };

    // CLI flags win over the config file, defaults fill the rest
    let db_path = cli_args
        .db_path
        .or(file_config.db_path.map(PathBuf::from));
    let port = cli_args.port.or(file_config.port).unwrap_or(DEFAULT_PORT);
    let logging_level = cli_args
        .logging_level
        .or_else(|| {
            file_config
                .logging_level
                .as_deref()
                .and_then(parse_logging_level)
        })
        .unwrap_or_default();
    let freshness_days = cli_args
        .freshness_days
        .or(file_config.freshness_days)
        .unwrap_or(DEFAULT_FRESHNESS_DAYS);
    let write_concurrency = cli_args
        .write_concurrency
        .or(file_config.write_concurrency)
        .unwrap_or(DEFAULT_WRITE_CONCURRENCY);
    let request_timeout = Duration::from_secs(
        cli_args
            .request_timeout_secs
            .or(file_config.request_timeout_secs)
            .unwrap_or(DEFAULT_REQUEST_TIMEOUT_SECS),
    );

    let secrets = EnvSecrets::from_env();

    let store: Arc<dyn ShopStore> = match &db_path {
        Some(path) => {
            info!("Opening shop database at {:?}", path);
            let store = SqliteShopStore::new(path)?;
            info!("Shop database holds {} records", store.count()?);
            Arc::new(store)
        }
        None => {
            warn!("No database configured, running without caching or persistence");
            Arc::new(NullShopStore)
        }
    };

    let maps_api_key = secrets
        .google_maps_api_key
        .context("GOOGLE_MAPS_API_KEY is not set")?;
    let provider = Arc::new(GooglePlacesClient::new(maps_api_key, request_timeout));

    if secrets.openai_api_key.is_none() {
        warn!("OPENAI_API_KEY is not set, review analysis will degrade to defaults");
    }
    let file_llm = file_config.llm.unwrap_or_default();
    let llm_base_url = secrets
        .openai_base_url
        .or(file_llm.base_url)
        .unwrap_or_else(|| DEFAULT_LLM_BASE_URL.to_string());
    let chat_model = secrets
        .chat_model
        .or(file_llm.model)
        .unwrap_or_else(|| DEFAULT_CHAT_MODEL.to_string());
    info!("Using chat model {} at {}", chat_model, llm_base_url);

    let llm = Arc::new(OpenAIProvider::new(
        llm_base_url,
        chat_model,
        secrets.openai_api_key,
    ));
    let classifier = Arc::new(LlmReviewClassifier::new(
        llm,
        CompletionOptions {
            timeout: request_timeout,
            ..CompletionOptions::default()
        },
    ));

    let cache = Arc::new(EnrichmentCache::new(
        store,
        provider.clone(),
        classifier,
        chrono::Duration::days(freshness_days),
        write_concurrency,
    ));
    let search = Arc::new(SearchService::new(provider, cache));

    let server_config = ServerConfig {
        requests_logging_level: logging_level,
        port,
    };

    info!("Ready to serve at port {}!", port);
    run_server(server_config, search).await
}
