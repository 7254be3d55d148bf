/// Company enrichment workflows
///
/// Registry path, per company:
/// 1. Search the company by name (failures abort the run)
/// 2. Fetch the entity record
/// 3. Resolve the network, financial, web context and news relations
/// 4. Extract active management and partners from the network
/// 5. Attach everything to the company record
///
/// Web context path: invoke the web context service for every company,
/// whether or not it exists in the registry.
use crate::client::FusionbaseClient;
use crate::config::{RelationIds, WEB_CONTEXT_SERVICE_KEY};
use crate::errors::{AppError, ResultExt};
use crate::models::{CompanyRecord, EnrichmentField, SearchQuery, ServiceInputs};
use crate::relations::{extract_active_relations, parse_links};
use serde_json::Value;

/// Outcome of enriching one company.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CompanyOutcome {
    /// No search candidate; the record was left untouched.
    NotFound,
    /// The record was enriched. `degraded_fields` counts fields that failed.
    Enriched {
        fb_entity_id: String,
        degraded_fields: usize,
    },
}

/// Totals of a run, logged once at the end.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub processed: usize,
    pub enriched: usize,
    pub not_found: usize,
    pub degraded_fields: usize,
}

impl RunSummary {
    fn record(&mut self, outcome: &CompanyOutcome) {
        self.processed += 1;
        match outcome {
            CompanyOutcome::NotFound => self.not_found += 1,
            CompanyOutcome::Enriched {
                degraded_fields, ..
            } => {
                self.enriched += 1;
                self.degraded_fields += degraded_fields;
            }
        }
    }

    pub fn log(&self) {
        tracing::info!(
            "Enrichment complete: {} processed, {} enriched, {} not found, {} degraded field(s)",
            self.processed,
            self.enriched,
            self.not_found,
            self.degraded_fields
        );
    }
}

/// Resolves one relation, degrading any failure to `None`.
///
/// Returns the value and whether the call failed (as opposed to returning
/// no data).
async fn fetch_relation(
    client: &FusionbaseClient,
    entity_id: &str,
    relation_id: &str,
    what: &str,
) -> (Option<Value>, bool) {
    match client.resolve_relation(entity_id, relation_id).await {
        Ok(Some(value)) => {
            tracing::debug!("{} for {}: {}", what, entity_id, value);
            (Some(value), false)
        }
        Ok(None) => {
            tracing::info!("No {} available for {}", what, entity_id);
            (None, false)
        }
        Err(e) => {
            tracing::warn!(
                "Error fetching relation data for entity {} and relation {}: {}",
                entity_id,
                relation_id,
                e
            );
            (None, true)
        }
    }
}

/// Enriches a single company from the registry.
///
/// Only search errors are returned; every later failure leaves the
/// corresponding field empty.
pub async fn enrich_company(
    client: &FusionbaseClient,
    relations: &RelationIds,
    company: &mut CompanyRecord,
) -> Result<CompanyOutcome, AppError> {
    let name = company.name().to_string();
    let query = SearchQuery::registry(&name, company.postal_code());
    let results = client
        .search(&query)
        .await
        .with_context(|| format!("Searching for company '{}'", name))?;

    let Some(best) = results.best_match() else {
        tracing::info!("Company {} not found in Fusionbase.", name);
        return Ok(CompanyOutcome::NotFound);
    };
    let entity_id = best.fb_entity_id.clone();
    let mut degraded_fields = 0;

    // Fetched for availability only
    match client.get_entity(&entity_id, "organization").await {
        Ok(Some(_)) => tracing::debug!("Fetched entity {} for '{}'", entity_id, name),
        Ok(None) => {}
        Err(e) => tracing::error!("Unable to fetch entity {}: {}", entity_id, e),
    }

    let (network, failed) = fetch_relation(client, &entity_id, &relations.network, "network").await;
    degraded_fields += failed as usize;
    let active_management = network.map(|network| {
        let active = extract_active_relations(&parse_links(&network));
        tracing::info!(
            "Found {} active management/partner relation(s) for '{}'",
            active.len(),
            name
        );
        serde_json::to_value(active).unwrap_or(Value::Null)
    });

    let mut fields = vec![(EnrichmentField::ActiveManagement, active_management)];
    for (field, relation_id, what) in [
        (
            EnrichmentField::FinancialKpis,
            &relations.financial_kpis,
            "financial KPIs",
        ),
        (
            EnrichmentField::BalanceSheet,
            &relations.balance_sheet,
            "balance sheet",
        ),
        (
            EnrichmentField::IncomeStatement,
            &relations.profit_and_loss,
            "income statement",
        ),
        (
            EnrichmentField::WebData,
            &relations.web_context,
            "web context",
        ),
        (EnrichmentField::News, &relations.news, "news"),
    ] {
        let (value, failed) = fetch_relation(client, &entity_id, relation_id, what).await;
        degraded_fields += failed as usize;
        fields.push((field, value));
    }

    for (field, value) in fields {
        company.attach(field, value);
    }

    Ok(CompanyOutcome::Enriched {
        fb_entity_id: entity_id,
        degraded_fields,
    })
}

/// Enriches every company in order, one at a time.
///
/// A search failure aborts the run and is returned; nothing is written by the
/// caller in that case.
pub async fn enrich_companies(
    client: &FusionbaseClient,
    relations: &RelationIds,
    companies: &mut [CompanyRecord],
) -> Result<RunSummary, AppError> {
    let total = companies.len();
    let mut summary = RunSummary::default();

    for (idx, company) in companies.iter_mut().enumerate() {
        tracing::info!("[{}/{}] Processing company: {}", idx + 1, total, company.name());
        let outcome = enrich_company(client, relations, company).await?;
        summary.record(&outcome);
    }

    Ok(summary)
}

/// Attaches the web context service result to every company.
///
/// Companies need not exist in the registry. Service failures are logged and
/// leave `web_data` unattached for that company.
pub async fn enrich_web_context(
    client: &FusionbaseClient,
    companies: &mut [CompanyRecord],
) -> RunSummary {
    let total = companies.len();
    let mut summary = RunSummary::default();

    for (idx, company) in companies.iter_mut().enumerate() {
        tracing::info!("[{}/{}] Processing company: {}", idx + 1, total, company.name());
        summary.processed += 1;

        let inputs = ServiceInputs {
            entity_name: company.name(),
            postal_code: company.postal_code(),
            street: company.street(),
            city: company.city(),
        };

        let result = client.invoke_service(inputs, WEB_CONTEXT_SERVICE_KEY).await;
        match result {
            Ok(response) if !response.is_empty() => {
                let data = response.into_data();
                tracing::debug!("Web context for '{}': {:?}", company.name(), data);
                company.attach(EnrichmentField::WebData, data);
                summary.enriched += 1;
            }
            Ok(_) => {
                tracing::info!("Web context service returned nothing for '{}'", company.name());
                summary.not_found += 1;
            }
            Err(e) => {
                tracing::warn!("Error invoking service: {}", e);
                summary.degraded_fields += 1;
            }
        }
    }

    summary
}
