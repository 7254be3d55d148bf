use crate::errors::AppError;
use crate::models::{SearchQuery, SearchResponse, ServiceInputs, ServiceRequest, ServiceResponse};
use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE};
use serde_json::Value;
use std::time::Duration;

/// Ceiling for relation resolution; web context and news relations are gathered live.
pub const RELATION_TIMEOUT: Duration = Duration::from_secs(120);

const API_KEY_HEADER: &str = "X-API-KEY";

/// Client for the Fusionbase company-intelligence API.
///
/// Every call is a single attempt. Callers decide whether a failure aborts the
/// run or only degrades one field.
#[derive(Clone)]
pub struct FusionbaseClient {
    client: reqwest::Client,
    base_url: String,
}

impl FusionbaseClient {
    /// Creates a new `FusionbaseClient`.
    ///
    /// # Arguments
    ///
    /// * `base_url` - API root, e.g. `https://api.fusionbase.com/api/v2`.
    /// * `api_key` - Sent as `X-API-KEY` on every request.
    pub fn new(base_url: impl Into<String>, api_key: &str) -> Result<Self, AppError> {
        let mut key = HeaderValue::from_str(api_key)
            .map_err(|_| AppError::Config("API key contains invalid characters".to_string()))?;
        key.set_sensitive(true);

        let mut headers = HeaderMap::new();
        headers.insert(API_KEY_HEADER, key);
        headers.insert(
            CONTENT_TYPE,
            HeaderValue::from_static("application/json; charset=utf-8"),
        );

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .build()
            .map_err(|e| {
                AppError::Transport(format!("Failed to create Fusionbase client: {}", e))
            })?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    /// Searches organizations by name.
    ///
    /// Candidates whose `source_key` is listed in `excluded_source_keys` are
    /// removed. An empty result list is a normal outcome.
    pub async fn search(&self, query: &SearchQuery<'_>) -> Result<SearchResponse, AppError> {
        let endpoint = format!("{}/search/entities/organization", self.base_url);
        let mut params = vec![("q", query.name)];
        if let Some(source_key) = query.source_key {
            params.push(("source_key", source_key));
        }
        let url = reqwest::Url::parse_with_params(&endpoint, &params)
            .map_err(|e| AppError::Config(format!("Failed to build search URL: {}", e)))?;

        tracing::info!(
            "Searching Fusionbase for '{}' (postal code: {})",
            query.name,
            query.postal_code.unwrap_or("-")
        );

        let response = self.client.get(url).send().await?;
        let response = ensure_success(response).await?;
        let mut results: SearchResponse = response.json().await?;

        let before = results.results.len();
        results.results.retain(|hit| {
            hit.entity
                .source_key
                .as_deref()
                .map_or(true, |key| !query.excluded_source_keys.contains(&key))
        });

        tracing::debug!(
            "Search for '{}' returned {} candidate(s), {} after source filtering",
            query.name,
            before,
            results.results.len()
        );
        Ok(results)
    }

    /// Fetches the full entity record.
    ///
    /// Returns `Ok(None)` without a request when `entity_id` is empty.
    pub async fn get_entity(
        &self,
        entity_id: &str,
        entity_type: &str,
    ) -> Result<Option<Value>, AppError> {
        if entity_id.trim().is_empty() {
            return Ok(None);
        }

        let url = format!(
            "{}/entities/{}/get/{}",
            self.base_url, entity_type, entity_id
        );

        let response = self.client.get(&url).send().await?;
        if !response.status().is_success() {
            return Err(status_error(response).await);
        }

        Ok(Some(response.json().await?))
    }

    /// Resolves one relation for an entity and returns the first result's
    /// `entity.value`.
    ///
    /// Returns `Ok(None)` without a request when either identifier is empty,
    /// and `Ok(None)` when the API answers with an empty list.
    pub async fn resolve_relation(
        &self,
        entity_id: &str,
        relation_id: &str,
    ) -> Result<Option<Value>, AppError> {
        if entity_id.trim().is_empty() || relation_id.trim().is_empty() {
            return Ok(None);
        }

        let url = format!(
            "{}/relation/resolve/{}/{}",
            self.base_url, relation_id, entity_id
        );

        let response = self
            .client
            .post(&url)
            .timeout(RELATION_TIMEOUT)
            .send()
            .await?;
        let response = ensure_success(response).await?;
        let body: Value = response.json().await?;

        relation_value(body)
    }

    /// Invokes a Fusionbase service with the company's address details.
    pub async fn invoke_service(
        &self,
        inputs: ServiceInputs<'_>,
        service_key: &str,
    ) -> Result<ServiceResponse, AppError> {
        let url = format!("{}/service/invoke", self.base_url);
        let payload = ServiceRequest {
            inputs,
            service_key,
        };

        tracing::info!(
            "Invoking service {} for '{}'",
            service_key,
            payload.inputs.entity_name
        );

        let response = self.client.post(&url).json(&payload).send().await?;
        let response = ensure_success(response).await?;

        Ok(response.json().await?)
    }
}

/// Extracts `[0].entity.value` from a relation resolve response.
fn relation_value(body: Value) -> Result<Option<Value>, AppError> {
    let Value::Array(mut items) = body else {
        return Err(AppError::UnexpectedShape(
            "relation response is not a list".to_string(),
        ));
    };
    if items.is_empty() {
        return Ok(None);
    }

    let mut first = items.swap_remove(0);
    first
        .get_mut("entity")
        .and_then(|entity| entity.get_mut("value"))
        .map(|value| Some(value.take()))
        .ok_or_else(|| {
            AppError::UnexpectedShape("relation result has no entity.value".to_string())
        })
}

async fn ensure_success(response: reqwest::Response) -> Result<reqwest::Response, AppError> {
    if response.status().is_success() {
        Ok(response)
    } else {
        Err(status_error(response).await)
    }
}

async fn status_error(response: reqwest::Response) -> AppError {
    let status = response.status();
    let body = response
        .text()
        .await
        .unwrap_or_else(|_| "Unknown error".to_string());
    AppError::Status { status, body }
}
