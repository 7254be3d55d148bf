//! CSV loading and saving of company lists.

use crate::errors::{AppError, ResultExt};
use crate::models::{CompanyRecord, EnrichmentField};
use std::io::{Read, Write};
use std::path::Path;

/// Loads companies from a CSV file with a header row.
///
/// All cells are kept as text, so postal codes keep their leading zeros.
pub fn load_companies(path: &Path) -> Result<Vec<CompanyRecord>, AppError> {
    let file = std::fs::File::open(path)
        .with_context(|| format!("Failed to open CSV file: {}", path.display()))?;
    read_companies(file).with_context(|| format!("Failed to read CSV file: {}", path.display()))
}

/// Reads companies from any CSV source.
pub fn read_companies<R: Read>(source: R) -> Result<Vec<CompanyRecord>, AppError> {
    let mut reader = csv::Reader::from_reader(source);
    let headers = reader.headers()?.clone();

    if !headers.iter().any(|h| h == "name") {
        return Err(AppError::Config(
            "Missing required column: name".to_string(),
        ));
    }

    let mut companies = Vec::new();
    for (idx, result) in reader.records().enumerate() {
        let row = result.with_context(|| format!("Failed to read row {}", idx + 1))?;
        let columns = headers
            .iter()
            .zip(row.iter())
            .map(|(header, value)| (header.to_string(), value.to_string()))
            .collect();
        companies.push(CompanyRecord::new(columns));
    }

    tracing::info!("Loaded {} companies", companies.len());
    Ok(companies)
}

/// Writes companies to a CSV file, overwriting it.
pub fn save_companies(path: &Path, companies: &[CompanyRecord]) -> Result<(), AppError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
    }
    let file = std::fs::File::create(path)
        .with_context(|| format!("Failed to create CSV file: {}", path.display()))?;
    write_companies(file, companies)
        .with_context(|| format!("Failed to write CSV file: {}", path.display()))?;

    tracing::info!("Wrote {} companies to {}", companies.len(), path.display());
    Ok(())
}

/// Writes the original columns followed by every enrichment column attached to
/// at least one company, in first-attached order.
///
/// Attached values are written as compact JSON; absent values are empty cells.
pub fn write_companies<W: Write>(sink: W, companies: &[CompanyRecord]) -> Result<(), AppError> {
    let mut columns: Vec<String> = Vec::new();
    for company in companies {
        for (name, _) in company.columns() {
            if !columns.contains(name) {
                columns.push(name.clone());
            }
        }
    }

    let mut fields: Vec<EnrichmentField> = Vec::new();
    for company in companies {
        for field in company.enrichment_fields() {
            if !fields.contains(&field) {
                fields.push(field);
            }
        }
    }

    let mut writer = csv::Writer::from_writer(sink);
    let mut header: Vec<&str> = columns.iter().map(String::as_str).collect();
    header.extend(fields.iter().map(|field| field.column_name()));
    writer.write_record(&header)?;

    for company in companies {
        let mut row: Vec<String> = columns
            .iter()
            .map(|column| {
                company
                    .columns()
                    .iter()
                    .find(|(name, _)| name == column)
                    .map(|(_, value)| value.clone())
                    .unwrap_or_default()
            })
            .collect();

        for field in &fields {
            let cell = match company.enrichment(*field) {
                Some(Some(value)) => serde_json::to_string(value).map_err(|e| {
                    AppError::Decode(format!("Failed to encode {}: {}", field.column_name(), e))
                })?,
                _ => String::new(),
            };
            row.push(cell);
        }

        writer.write_record(&row)?;
    }

    writer.flush()?;
    Ok(())
}
