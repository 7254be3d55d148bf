use std::path::PathBuf;

/// Default Fusionbase API root.
pub const DEFAULT_BASE_URL: &str = "https://api.fusionbase.com/api/v2";
/// Source key of the German commercial register, used to scope entity search.
pub const DEFAULT_SEARCH_SOURCE_KEY: &str = "1051122944";
/// Source keys dropped from search results (UK business registry).
pub const EXCLUDED_SOURCE_KEYS: &[&str] = &["1784627846"];
/// Service key of the company web context service.
pub const WEB_CONTEXT_SERVICE_KEY: &str = "4658603456";

pub const COMPANIES_PATH: &str = "data/companies.csv";
pub const ENRICHED_COMPANIES_PATH: &str = "data/enriched_companies.csv";
pub const WEB_ENRICHED_COMPANIES_PATH: &str = "data/enriched_companies_via_web_query.csv";

/// Relation identifiers resolved for every company found in the registry.
#[derive(Debug, Clone)]
pub struct RelationIds {
    pub network: String,
    pub financial_kpis: String,
    pub balance_sheet: String,
    pub profit_and_loss: String,
    pub web_context: String,
    pub news: String,
}

impl RelationIds {
    pub fn from_env() -> anyhow::Result<Self> {
        Ok(Self {
            network: required_var("FUSIONBASE_RELATION_NETWORK")?,
            financial_kpis: required_var("FUSIONBASE_RELATION_FINANCIAL_KPIS")?,
            balance_sheet: required_var("FUSIONBASE_RELATION_BALANCE_SHEET")?,
            profit_and_loss: required_var("FUSIONBASE_RELATION_PROFIT_AND_LOSS")?,
            web_context: required_var("FUSIONBASE_RELATION_WEB_CONTEXT")?,
            news: required_var("FUSIONBASE_RELATION_NEWS")?,
        })
    }
}

/// Settings shared by both enrichment binaries.
///
/// The API key is read once here and handed to the client; nothing else in the
/// crate touches the environment.
#[derive(Debug, Clone)]
pub struct Config {
    pub api_key: String,
    pub base_url: String,
    pub input_path: PathBuf,
    pub output_path: PathBuf,
}

impl Config {
    /// Loads the API settings, defaulting the input and output paths to the
    /// given constants unless `ENRICH_INPUT_PATH` / `ENRICH_OUTPUT_PATH` are set.
    pub fn from_env(default_input: &str, default_output: &str) -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let config = Self {
            api_key: required_var("FUSIONBASE_API_KEY")?,
            base_url: std::env::var("FUSIONBASE_BASE_URL")
                .ok()
                .filter(|s| !s.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_string())
                .trim_end_matches('/')
                .to_string(),
            input_path: std::env::var("ENRICH_INPUT_PATH")
                .ok()
                .filter(|s| !s.trim().is_empty())
                .unwrap_or_else(|| default_input.to_string())
                .into(),
            output_path: std::env::var("ENRICH_OUTPUT_PATH")
                .ok()
                .filter(|s| !s.trim().is_empty())
                .unwrap_or_else(|| default_output.to_string())
                .into(),
        };

        if !config.base_url.starts_with("http://") && !config.base_url.starts_with("https://") {
            anyhow::bail!("FUSIONBASE_BASE_URL must start with http:// or https://");
        }

        // Never log the key itself
        tracing::info!("Configuration loaded successfully");
        tracing::debug!("Fusionbase base URL: {}", config.base_url);
        tracing::debug!("Input file: {}", config.input_path.display());
        tracing::debug!("Output file: {}", config.output_path.display());

        Ok(config)
    }
}

fn required_var(name: &str) -> anyhow::Result<String> {
    std::env::var(name)
        .map_err(|_| anyhow::anyhow!("{} environment variable required", name))
        .and_then(|value| {
            if value.trim().is_empty() {
                anyhow::bail!("{} cannot be empty", name);
            }
            Ok(value)
        })
}
