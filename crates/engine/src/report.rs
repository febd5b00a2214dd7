use std::collections::HashMap;

use crate::model::{
    Baseline, NormalizedRow, ReconSummary, ReportRow, ReportTables,
};

/// Build the final report tables from the two partitions.
///
/// Row order follows the normalized view (input arrival order) so reports
/// compare row-by-row across runs. The baseline, when supplied, contributes
/// annotation values by key and nothing else; it is never modified.
pub fn assemble(
    standard: Vec<NormalizedRow>,
    non_standard: Vec<NormalizedRow>,
    baseline: Option<&Baseline>,
) -> ReportTables {
    let annotation_columns = baseline
        .map(|b| b.annotation_columns.clone())
        .unwrap_or_default();
    let width = annotation_columns.len();

    let standard = standard
        .into_iter()
        .map(|row| report_row(row, baseline, width))
        .collect();
    let non_standard = non_standard
        .into_iter()
        .map(|row| report_row(row, baseline, width))
        .collect();

    ReportTables {
        standard,
        non_standard,
        annotation_columns,
    }
}

fn report_row(row: NormalizedRow, baseline: Option<&Baseline>, width: usize) -> ReportRow {
    let status_line = compose_status_line(&row);
    let annotations = baseline
        .and_then(|b| b.rows.get(&row.key()).cloned())
        .unwrap_or_else(|| vec![String::new(); width]);
    let reason = row.extraction.reason();

    ReportRow {
        rma_id: row.rma_id,
        tracking_number: row.tracking_number,
        status: row.status,
        status_date: row.status_date,
        shipper_name: row.shipper_name,
        ship_to: row.ship_to,
        exception: row.exception,
        status_line,
        manifest_date: row.manifest_date,
        weight: row.weight,
        reason,
        annotations,
    }
}

/// The per-tracking-number status summary line:
/// `<tn> - <status>, <status-date> → <ship-to>`, with the exception text
/// appended in parentheses only when present.
pub fn compose_status_line(row: &NormalizedRow) -> String {
    let mut line = format!(
        "{} - {}, {} → {}",
        row.tracking_number, row.status, row.status_date, row.ship_to
    );
    if !row.exception.is_empty() {
        line.push_str(&format!(" ({})", row.exception));
    }
    line
}

/// Summary counts for the audit collaborator; it never inspects row internals.
pub fn compute_summary(
    report: &ReportTables,
    input_rows: usize,
    merged_duplicates: usize,
    missing_tracking: usize,
) -> ReconSummary {
    let mut reason_counts: HashMap<String, usize> = HashMap::new();
    for row in &report.non_standard {
        if let Some(reason) = row.reason {
            *reason_counts.entry(reason.to_string()).or_insert(0) += 1;
        }
    }

    ReconSummary {
        input_rows,
        normalized_rows: report.standard.len() + report.non_standard.len(),
        merged_duplicates,
        missing_tracking,
        standard: report.standard.len(),
        non_standard: report.non_standard.len(),
        reason_counts,
    }
}
