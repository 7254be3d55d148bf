//! Fusionbase Company Enrichment Library
//!
//! Enriches a list of companies loaded from CSV with data from the Fusionbase
//! API: entity resolution, corporate network relations, financial statements,
//! web context and news.
//!
//! # Modules
//!
//! - `client`: Fusionbase API client.
//! - `config`: Configuration management.
//! - `enrichment`: Per-company enrichment workflows.
//! - `errors`: Error handling types.
//! - `models`: Wire models and company records.
//! - `obs`: Logging initialisation.
//! - `relations`: Active management and partner extraction.
//! - `tabular`: CSV input and output.

pub mod client;
pub mod config;
pub mod enrichment;
pub mod errors;
pub mod models;
pub mod obs;
pub mod relations;
pub mod tabular;
