use std::collections::HashMap;
use std::sync::OnceLock;

use chrono::NaiveDate;
use regex::Regex;

use crate::config::ReconConfig;
use crate::extract::extract_rma;
use crate::model::{HarmonizedRecord, NormalizedRow, RowKey};

/// Carrier tracking number: `1Z` + 16 alphanumerics.
fn tracking_number_regex() -> &'static Regex {
    static RX: OnceLock<Regex> = OnceLock::new();
    RX.get_or_init(|| Regex::new(r"(?i)\b1Z[0-9A-Z]{16}\b").expect("tracking number pattern"))
}

/// Accepted status-date spellings across export variants.
const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%m/%d/%Y", "%d.%m.%Y"];

#[derive(Debug, Default)]
pub struct NormalizeOutput {
    pub rows: Vec<NormalizedRow>,
    pub merged_duplicates: usize,
    pub missing_tracking: usize,
}

/// Build the one-row-per-(RMA, tracking-number) view.
///
/// Every record with a resolvable tracking number produces exactly one row;
/// duplicate keys are folded by [`merge_rows`], never dropped silently.
/// Records with no tracking number anywhere cannot form a key and are
/// surfaced through `missing_tracking`. Input arrival order is preserved.
pub fn normalize(records: &[HarmonizedRecord], config: &ReconConfig) -> NormalizeOutput {
    let mut output = NormalizeOutput::default();
    let mut index: HashMap<RowKey, usize> = HashMap::new();

    for record in records {
        let Some(tracking_number) = resolve_tracking_number(record) else {
            output.missing_tracking += 1;
            continue;
        };

        let fields: Vec<(&str, &str)> = config
            .candidate_columns
            .iter()
            .map(|c| (c.as_str(), record.get(c)))
            .collect();
        let extraction = extract_rma(&fields);

        let row = NormalizedRow {
            rma_id: extraction.id().to_string(),
            tracking_number,
            extraction,
            manifest_date: norm_na(&record.manifest_date),
            status: canonical_status(&record.status),
            status_date: norm_na(&record.status_date),
            shipper_name: norm_na(&record.shipper_name),
            ship_to: norm_na(&record.ship_to),
            exception: join_exception(&record.exception_description, &record.exception_resolution),
            weight: norm_na(&record.weight),
        };

        match index.get(&row.key()) {
            Some(&at) => {
                merge_rows(&mut output.rows[at], row);
                output.merged_duplicates += 1;
            }
            None => {
                index.insert(row.key(), output.rows.len());
                output.rows.push(row);
            }
        }
    }

    output
}

/// The Tracking Number cell, or the first tracking number embedded in the
/// details column. Uppercased either way.
fn resolve_tracking_number(record: &HarmonizedRecord) -> Option<String> {
    let direct = record.tracking_number.trim();
    if !direct.is_empty() {
        return Some(direct.to_uppercase());
    }
    tracking_number_regex()
        .find(&record.tracking_details)
        .map(|m| m.as_str().to_uppercase())
}

/// Fold a duplicate-key row into the existing one.
///
/// The row with the most recent parseable status date supplies the
/// authoritative context; on equal dates the later input row wins, and an
/// unparseable incoming date never displaces a parseable one. Exception
/// text from both rows is kept either way.
fn merge_rows(existing: &mut NormalizedRow, incoming: NormalizedRow) {
    let incoming_wins = match (
        parse_status_date(&existing.status_date),
        parse_status_date(&incoming.status_date),
    ) {
        (Some(current), Some(candidate)) => candidate >= current,
        (None, Some(_)) => true,
        (_, None) => false,
    };

    let exception = concat_exception(&existing.exception, &incoming.exception);
    if incoming_wins {
        *existing = incoming;
    }
    existing.exception = exception;
}

pub fn parse_status_date(value: &str) -> Option<NaiveDate> {
    let text = value.trim();
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(text, fmt).ok())
}

fn concat_exception(left: &str, right: &str) -> String {
    if right.is_empty() || left.contains(right) {
        return left.to_string();
    }
    if left.is_empty() {
        return right.to_string();
    }
    format!("{left}; {right}")
}

fn join_exception(description: &str, resolution: &str) -> String {
    let parts: Vec<&str> = [description, resolution]
        .iter()
        .map(|v| norm_na_str(v))
        .filter(|v| !v.is_empty())
        .collect();
    parts.join(" ")
}

/// Normalize the various "not available" spellings to `N/A`.
pub fn norm_na(value: &str) -> String {
    let text = value.trim();
    if text.is_empty() {
        return "N/A".into();
    }
    let lower = text.to_lowercase();
    if lower == "nan" || lower == "none" || lower.contains("not avail") {
        return "N/A".into();
    }
    text.to_string()
}

/// Like [`norm_na`] but drops "not available" values to the empty string.
fn norm_na_str(value: &str) -> &str {
    let text = value.trim();
    let lower = text.to_lowercase();
    if lower == "nan" || lower == "none" || lower.contains("not avail") || lower == "n/a" {
        ""
    } else {
        text
    }
}

/// Map free-text status values onto the canonical labels.
pub fn canonical_status(value: &str) -> String {
    let lower = value.trim().to_lowercase();
    if lower.contains("delivered") {
        return "Delivered".into();
    }
    if lower.contains("exception") {
        return "Exception".into();
    }
    if lower.contains("in transit") {
        return "In Transit".into();
    }
    if lower.contains("out for delivery") || lower.contains("out of delivery") {
        return "Out for Delivery".into();
    }
    if lower.contains("manifest") {
        return "Manifest".into();
    }
    if lower.contains("void") {
        return "Void".into();
    }
    if lower.is_empty() || lower.contains("not avail") {
        return "N/A".into();
    }
    value.trim().to_string()
}
