use std::collections::HashMap;

use crate::config::ReconConfig;
use crate::error::EngineError;
use crate::model::{columns, HarmonizedRecord, RawTable};

/// Remap an export table onto the canonical column set.
///
/// Headers are matched case- and whitespace-insensitively against the alias
/// table; the first matching header wins per canonical column. Canonical
/// columns with no resolvable header are empty for every record — export
/// schema drift is tolerated, except for the required columns.
pub fn harmonize(
    table: &RawTable,
    config: &ReconConfig,
) -> Result<Vec<HarmonizedRecord>, EngineError> {
    let resolved = resolve_headers(&table.headers, config);

    for required in columns::REQUIRED {
        if !resolved.contains_key(*required) {
            return Err(EngineError::Schema {
                column: (*required).to_string(),
            });
        }
    }

    let records = table
        .rows
        .iter()
        .map(|row| {
            let mut record = HarmonizedRecord::default();
            for (canonical, &idx) in &resolved {
                let value = row.get(idx).map(String::as_str).unwrap_or("");
                record.set(canonical, value.to_string());
            }
            record
        })
        .collect();

    Ok(records)
}

/// Map canonical column name → header index for this table.
fn resolve_headers(headers: &[String], config: &ReconConfig) -> HashMap<String, usize> {
    let normalized: Vec<String> = headers.iter().map(|h| normalize_header(h)).collect();
    let mut resolved = HashMap::new();

    for entry in &config.columns {
        let canonical_norm = normalize_header(&entry.canonical);
        let position = normalized.iter().position(|h| {
            *h == canonical_norm || entry.aliases.iter().any(|a| normalize_header(a) == *h)
        });
        if let Some(idx) = position {
            resolved.insert(entry.canonical.clone(), idx);
        }
    }

    resolved
}

fn normalize_header(header: &str) -> String {
    header.trim().to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(headers: &[&str], rows: &[&[&str]]) -> RawTable {
        RawTable {
            headers: headers.iter().map(|h| h.to_string()).collect(),
            rows: rows
                .iter()
                .map(|r| r.iter().map(|c| c.to_string()).collect())
                .collect(),
        }
    }

    #[test]
    fn maps_exact_headers() {
        let t = table(
            &["Tracking Number", "Status Date", "Status"],
            &[&["1z123", "2024-01-05", "In Transit"]],
        );
        let records = harmonize(&t, &ReconConfig::default()).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].tracking_number, "1z123");
        assert_eq!(records[0].status_date, "2024-01-05");
        assert_eq!(records[0].status, "In Transit");
    }

    #[test]
    fn maps_variant_headers_case_and_whitespace() {
        let t = table(
            &["  TRACKING NUMBER ", "Scheduled Delivery", "RMA"],
            &[&["1z1", "2024-02-01", "61234567"]],
        );
        let records = harmonize(&t, &ReconConfig::default()).unwrap();
        assert_eq!(records[0].tracking_number, "1z1");
        // "Scheduled Delivery" is an accepted spelling of the status date
        assert_eq!(records[0].status_date, "2024-02-01");
        assert_eq!(records[0].rma_field, "61234567");
    }

    #[test]
    fn unknown_columns_are_ignored_and_missing_are_empty() {
        let t = table(
            &["Tracking Number", "Status Date", "Some Internal Col"],
            &[&["1z1", "2024-02-01", "noise"]],
        );
        let records = harmonize(&t, &ReconConfig::default()).unwrap();
        assert_eq!(records[0].status, "");
        assert_eq!(records[0].shipper_name, "");
    }

    #[test]
    fn missing_required_column_is_a_schema_error() {
        let t = table(&["Status Date", "Status"], &[]);
        let err = harmonize(&t, &ReconConfig::default()).unwrap_err();
        assert!(matches!(err, EngineError::Schema { ref column } if column == "Tracking Number"));
    }

    #[test]
    fn first_matching_header_wins() {
        // Both headers alias onto Status Date; the leftmost is used.
        let t = table(
            &["Tracking Number", "Date Delivered", "Scheduled Delivery"],
            &[&["1z1", "2024-03-01", "2024-03-05"]],
        );
        let records = harmonize(&t, &ReconConfig::default()).unwrap();
        assert_eq!(records[0].status_date, "2024-03-01");
    }

    #[test]
    fn short_rows_pad_with_empty() {
        let t = table(
            &["Tracking Number", "Status Date", "Status"],
            &[&["1z1", "2024-01-05"]],
        );
        let records = harmonize(&t, &ReconConfig::default()).unwrap();
        assert_eq!(records[0].status, "");
    }
}
