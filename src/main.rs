use fusionbase_enrichment::client::FusionbaseClient;
use fusionbase_enrichment::config::{
    Config, RelationIds, COMPANIES_PATH, ENRICHED_COMPANIES_PATH,
};
use fusionbase_enrichment::{enrichment, obs, tabular};

/// Enriches `data/companies.csv` with registry data.
///
/// For every company: search, fetch the entity, resolve the network,
/// financial, web context and news relations, and extract the active
/// management. The enriched list is written to `data/enriched_companies.csv`.
/// A failed search aborts the run before anything is written.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    obs::init_tracing();

    let config = Config::from_env(COMPANIES_PATH, ENRICHED_COMPANIES_PATH)?;
    let relations = RelationIds::from_env()?;
    let client = FusionbaseClient::new(config.base_url.clone(), &config.api_key)?;

    let mut companies = tabular::load_companies(&config.input_path)?;
    let summary = enrichment::enrich_companies(&client, &relations, &mut companies).await?;

    tabular::save_companies(&config.output_path, &companies)?;
    summary.log();

    Ok(())
}
