//! Enriches companies with live web context data.
//!
//! Works for any company, including small ones that are not in a public
//! register. No guarantee is given on the returned data points since the
//! service gathers them live.

use fusionbase_enrichment::client::FusionbaseClient;
use fusionbase_enrichment::config::{Config, COMPANIES_PATH, WEB_ENRICHED_COMPANIES_PATH};
use fusionbase_enrichment::{enrichment, obs, tabular};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    obs::init_tracing();

    let config = Config::from_env(COMPANIES_PATH, WEB_ENRICHED_COMPANIES_PATH)?;
    let client = FusionbaseClient::new(config.base_url.clone(), &config.api_key)?;

    let mut companies = tabular::load_companies(&config.input_path)?;
    let summary = enrichment::enrich_web_context(&client, &mut companies).await;

    tabular::save_companies(&config.output_path, &companies)?;
    summary.log();

    Ok(())
}
