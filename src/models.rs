use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::fmt;

// ============ Search ============

/// Response of `GET /search/entities/organization`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SearchResponse {
    #[serde(default)]
    pub results: Vec<SearchHit>,
}

impl SearchResponse {
    /// Best match heuristic: the first remaining candidate wins.
    pub fn best_match(&self) -> Option<&EntitySummary> {
        self.results.first().map(|hit| &hit.entity)
    }
}

/// A single search candidate.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchHit {
    pub entity: EntitySummary,
}

/// Entity summary embedded in a search candidate.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EntitySummary {
    /// Unique remote identifier.
    pub fb_entity_id: String,
    /// Registry the candidate originates from.
    #[serde(default)]
    pub source_key: Option<String>,
    /// Remaining fields, kept as returned.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, Value>,
}

/// Parameters of an entity search.
#[derive(Debug, Clone)]
pub struct SearchQuery<'a> {
    pub name: &'a str,
    /// Carried for logging; the search endpoint has no postal code filter.
    pub postal_code: Option<&'a str>,
    pub source_key: Option<&'a str>,
    pub excluded_source_keys: &'a [&'a str],
}

impl<'a> SearchQuery<'a> {
    /// Search scoped to the German commercial register, excluding the UK registry.
    pub fn registry(name: &'a str, postal_code: Option<&'a str>) -> Self {
        Self {
            name,
            postal_code,
            source_key: Some(crate::config::DEFAULT_SEARCH_SOURCE_KEY),
            excluded_source_keys: crate::config::EXCLUDED_SOURCE_KEYS,
        }
    }
}

// ============ Relations ============

/// Deserializes a field that may carry any JSON type, keeping it only when it
/// fits `T`.
fn lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = Value::deserialize(deserializer)?;
    Ok(serde_json::from_value(value).ok())
}

/// Identifiers arrive as strings or numbers.
fn string_or_number<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::String(s) => Some(s),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    })
}

/// One edge of the corporate network returned by the network relation.
///
/// Every field is optional and read independently: a field of the wrong type
/// counts as missing without affecting the rest of the link.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RelationRecord {
    /// Graph distance from the queried entity.
    #[serde(default, deserialize_with = "lenient")]
    pub depth: Option<f64>,
    /// Coded role, e.g. `MANAGING_DIRECTOR` or `PROCURA`.
    #[serde(default, deserialize_with = "lenient")]
    pub label: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub meta: Option<RelationMeta>,
    /// The related party.
    #[serde(default, deserialize_with = "lenient")]
    pub entity_from: Option<RelatedParty>,
}

impl RelationRecord {
    /// Direct relation without an end date.
    pub fn is_active_direct(&self) -> bool {
        self.depth == Some(1.0)
            && self
                .meta
                .as_ref()
                .map_or(true, |meta| meta.end_date.as_ref().map_or(true, Value::is_null))
    }

    pub fn label(&self) -> &str {
        self.label.as_deref().unwrap_or("")
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RelationMeta {
    /// `null` or absent while the relation is active.
    #[serde(default)]
    pub end_date: Option<Value>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RelatedParty {
    #[serde(default, deserialize_with = "string_or_number")]
    pub fb_entity_id: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub attributes: Option<PartyAttributes>,
}

impl RelatedParty {
    /// English display name, if the registry provides one as text.
    pub fn english_name(&self) -> Option<&str> {
        self.attributes
            .as_ref()?
            .display_name
            .as_ref()?
            .get("en")?
            .as_str()
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PartyAttributes {
    /// Localized names keyed by language code.
    #[serde(default, deserialize_with = "lenient")]
    pub display_name: Option<HashMap<String, Value>>,
}

/// Role class assigned by the relation filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GermanLabel {
    #[serde(rename = "Geschäftsführung")]
    Geschaeftsfuehrung,
    #[serde(rename = "Prokura")]
    Prokura,
}

impl GermanLabel {
    pub fn as_str(&self) -> &'static str {
        match self {
            GermanLabel::Geschaeftsfuehrung => "Geschäftsführung",
            GermanLabel::Prokura => "Prokura",
        }
    }
}

impl fmt::Display for GermanLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A classified, currently active management or partner relation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActiveRelation {
    pub name: String,
    pub fb_entity_id: String,
    pub label: String,
    pub german_label: GermanLabel,
}

// ============ Service invocation ============

/// Inputs of `POST /service/invoke`.
#[derive(Debug, Clone, Serialize)]
pub struct ServiceInputs<'a> {
    pub entity_name: &'a str,
    pub postal_code: Option<&'a str>,
    pub street: Option<&'a str>,
    pub city: Option<&'a str>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ServiceRequest<'a> {
    pub inputs: ServiceInputs<'a>,
    pub service_key: &'a str,
}

/// Keeps an explicit `null` as `Some(Value::Null)` so presence is observable.
fn present<'de, D>(deserializer: D) -> Result<Option<Value>, D::Error>
where
    D: Deserializer<'de>,
{
    Value::deserialize(deserializer).map(Some)
}

/// Raw service response; only `data` is used downstream.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ServiceResponse {
    /// `None` if the key is missing, `Some(Value::Null)` if it is `null`.
    #[serde(default, deserialize_with = "present")]
    pub data: Option<Value>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, Value>,
}

impl ServiceResponse {
    /// True for an empty response object.
    pub fn is_empty(&self) -> bool {
        self.data.is_none() && self.extra.is_empty()
    }

    /// The `data` payload, with `null` as no data.
    pub fn into_data(self) -> Option<Value> {
        self.data.filter(|data| !data.is_null())
    }
}

// ============ Company records ============

/// Enrichment columns, in the order the pipeline attaches them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EnrichmentField {
    ActiveManagement,
    FinancialKpis,
    BalanceSheet,
    IncomeStatement,
    WebData,
    News,
}

impl EnrichmentField {
    pub fn column_name(&self) -> &'static str {
        match self {
            EnrichmentField::ActiveManagement => "active_management",
            EnrichmentField::FinancialKpis => "financial_kpis",
            EnrichmentField::BalanceSheet => "balance_sheet",
            EnrichmentField::IncomeStatement => "income_statement",
            EnrichmentField::WebData => "web_data",
            EnrichmentField::News => "news",
        }
    }
}

/// One input row plus whatever the pipeline attached to it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CompanyRecord {
    /// Original cells in header order.
    columns: Vec<(String, String)>,
    /// Attached fields; `None` means attached but no data.
    enrichment: Vec<(EnrichmentField, Option<Value>)>,
}

impl CompanyRecord {
    pub fn new(columns: Vec<(String, String)>) -> Self {
        Self {
            columns,
            enrichment: Vec::new(),
        }
    }

    /// Cell value of an input column; empty cells count as absent.
    pub fn get(&self, column: &str) -> Option<&str> {
        self.columns
            .iter()
            .find(|(name, _)| name == column)
            .map(|(_, value)| value.as_str())
            .filter(|value| !value.trim().is_empty())
    }

    pub fn name(&self) -> &str {
        self.get("name").unwrap_or("")
    }

    pub fn postal_code(&self) -> Option<&str> {
        self.get("postal_code")
    }

    pub fn street(&self) -> Option<&str> {
        self.get("street")
    }

    pub fn city(&self) -> Option<&str> {
        self.get("city")
    }

    pub fn columns(&self) -> &[(String, String)] {
        &self.columns
    }

    /// Attaches (or replaces) an enrichment field.
    pub fn attach(&mut self, field: EnrichmentField, value: Option<Value>) {
        match self.enrichment.iter_mut().find(|(f, _)| *f == field) {
            Some(slot) => slot.1 = value,
            None => self.enrichment.push((field, value)),
        }
    }

    /// `None` if the field was never attached, `Some(None)` if attached empty.
    pub fn enrichment(&self, field: EnrichmentField) -> Option<Option<&Value>> {
        self.enrichment
            .iter()
            .find(|(f, _)| *f == field)
            .map(|(_, value)| value.as_ref())
    }

    pub fn enrichment_fields(&self) -> impl Iterator<Item = EnrichmentField> + '_ {
        self.enrichment.iter().map(|(field, _)| *field)
    }

    pub fn is_enriched(&self) -> bool {
        !self.enrichment.is_empty()
    }
}
