// Excel I/O: baseline report read (calamine) and report write (rust_xlsxwriter)

use std::collections::HashMap;
use std::path::Path;

use calamine::{open_workbook_auto, Data, Reader};
use chrono::{Duration, NaiveDate};
use rust_xlsxwriter::{Format, FormatAlign, Workbook, Worksheet};

use rmarecon_engine::model::{Baseline, ReportRow, ReportTables, RowKey};

// ---------------------------------------------------------------------------
// Baseline import
// ---------------------------------------------------------------------------

/// Columns the engine recomputes every run. Anything else in a prior report
/// is treated as a hand-entered annotation and carried forward.
const FACT_COLUMNS: &[&str] = &[
    "Manifest Date",
    "RMA Number",
    "Tracking Number",
    "Status Line",
    "Status",
    "Status Date",
    "Shipper Name",
    "Ship To",
    "Exception",
    "Weight",
    "Reason",
];

/// Read a prior report workbook as an annotation baseline.
///
/// Only the first worksheet is consulted. The file is opened read-only and
/// never written back; annotation values are keyed by (RMA, tracking number).
pub fn read_baseline(path: &Path) -> Result<Baseline, String> {
    let mut workbook = open_workbook_auto(path).map_err(|e| e.to_string())?;
    let sheet_name = workbook
        .sheet_names()
        .first()
        .cloned()
        .ok_or_else(|| "baseline workbook has no sheets".to_string())?;
    let range = workbook
        .worksheet_range(&sheet_name)
        .map_err(|e| e.to_string())?;

    let mut rows = range.rows();
    let header_row = rows
        .next()
        .ok_or_else(|| "baseline sheet is empty".to_string())?;
    let headers: Vec<String> = header_row.iter().map(cell_to_string).collect();

    let rma_col = find_column(&headers, "RMA Number")
        .ok_or_else(|| "baseline is missing an 'RMA Number' column".to_string())?;
    let tn_col = find_column(&headers, "Tracking Number")
        .ok_or_else(|| "baseline is missing a 'Tracking Number' column".to_string())?;

    let annotation_indices: Vec<usize> = headers
        .iter()
        .enumerate()
        .filter(|(_, h)| {
            let name = h.trim();
            !name.is_empty() && !FACT_COLUMNS.iter().any(|f| f.eq_ignore_ascii_case(name))
        })
        .map(|(i, _)| i)
        .collect();
    let annotation_columns: Vec<String> = annotation_indices
        .iter()
        .map(|&i| headers[i].trim().to_string())
        .collect();

    let mut baseline_rows: HashMap<RowKey, Vec<String>> = HashMap::new();
    for row in rows {
        let key = RowKey {
            rma_id: cell_at(row, rma_col),
            tracking_number: cell_at(row, tn_col).to_uppercase(),
        };
        if key.rma_id.is_empty() && key.tracking_number.is_empty() {
            continue;
        }
        let values: Vec<String> = annotation_indices
            .iter()
            .map(|&i| cell_at(row, i))
            .collect();
        // First occurrence wins; a report never holds duplicate keys anyway
        baseline_rows.entry(key).or_insert(values);
    }

    Ok(Baseline {
        annotation_columns,
        rows: baseline_rows,
    })
}

fn find_column(headers: &[String], name: &str) -> Option<usize> {
    headers
        .iter()
        .position(|h| h.trim().eq_ignore_ascii_case(name))
}

fn cell_at(row: &[Data], index: usize) -> String {
    row.get(index).map(cell_to_string).unwrap_or_default()
}

fn cell_to_string(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(s) => s.trim().to_string(),
        Data::Float(n) => {
            // Integers without trailing decimals
            if n.fract() == 0.0 && n.abs() < 1e15 {
                format!("{}", *n as i64)
            } else {
                n.to_string()
            }
        }
        Data::Int(n) => n.to_string(),
        Data::Bool(b) => b.to_string(),
        Data::Error(e) => format!("{e:?}"),
        Data::DateTime(dt) => serial_to_string(dt.as_f64()),
        Data::DateTimeIso(s) | Data::DurationIso(s) => s.clone(),
    }
}

/// Render an Excel date serial (1900 epoch) as an ISO date, keeping the
/// time part only when one is present.
fn serial_to_string(serial: f64) -> String {
    let epoch = match NaiveDate::from_ymd_opt(1899, 12, 30) {
        Some(d) => d,
        None => return serial.to_string(),
    };
    let days = serial.trunc() as i64;
    let date = epoch + Duration::days(days);
    let seconds = (serial.fract() * 86_400.0).round() as i64;
    if seconds == 0 {
        date.format("%Y-%m-%d").to_string()
    } else {
        let time = date.and_hms_opt(0, 0, 0).map(|t| t + Duration::seconds(seconds));
        match time {
            Some(t) => t.format("%Y-%m-%d %H:%M:%S").to_string(),
            None => date.format("%Y-%m-%d").to_string(),
        }
    }
}

// ---------------------------------------------------------------------------
// Report export
// ---------------------------------------------------------------------------

const REPORT_COLUMNS: &[&str] = &[
    "Manifest Date",
    "RMA Number",
    "Tracking Number",
    "Status Line",
    "Status",
    "Status Date",
    "Shipper Name",
    "Ship To",
    "Exception",
    "Weight",
];

/// Write the two report tables to an xlsx workbook, one sheet each.
///
/// The non-standard sheet carries an extra Reason column; annotation columns
/// from the baseline are appended to both sheets.
pub fn write_report(
    tables: &ReportTables,
    standard_sheet: &str,
    non_standard_sheet: &str,
    path: &Path,
) -> Result<(), String> {
    let mut workbook = Workbook::new();

    let worksheet = workbook.add_worksheet();
    worksheet.set_name(standard_sheet).map_err(|e| e.to_string())?;
    write_sheet(worksheet, &tables.standard, false, &tables.annotation_columns)?;

    let worksheet = workbook.add_worksheet();
    worksheet
        .set_name(non_standard_sheet)
        .map_err(|e| e.to_string())?;
    write_sheet(worksheet, &tables.non_standard, true, &tables.annotation_columns)?;

    workbook.save(path).map_err(|e| e.to_string())?;
    Ok(())
}

fn write_sheet(
    worksheet: &mut Worksheet,
    rows: &[ReportRow],
    with_reason: bool,
    annotation_columns: &[String],
) -> Result<(), String> {
    let header_format = Format::new().set_bold();
    let body_format = Format::new()
        .set_text_wrap()
        .set_align(FormatAlign::Top);

    let mut headers: Vec<&str> = REPORT_COLUMNS.to_vec();
    if with_reason {
        headers.push("Reason");
    }
    headers.extend(annotation_columns.iter().map(|c| c.as_str()));

    for (col, name) in headers.iter().enumerate() {
        worksheet
            .write_with_format(0, col as u16, *name, &header_format)
            .map_err(|e| e.to_string())?;
        worksheet
            .set_column_width(col as u16, column_width(name))
            .map_err(|e| e.to_string())?;
    }

    for (idx, row) in rows.iter().enumerate() {
        let r = (idx + 1) as u32;
        let mut values: Vec<&str> = vec![
            &row.manifest_date,
            &row.rma_id,
            &row.tracking_number,
            &row.status_line,
            &row.status,
            &row.status_date,
            &row.shipper_name,
            &row.ship_to,
            &row.exception,
            &row.weight,
        ];
        let reason = row.reason.map(|r| r.to_string()).unwrap_or_default();
        if with_reason {
            values.push(&reason);
        }
        values.extend(row.annotations.iter().map(|a| a.as_str()));

        for (col, value) in values.iter().enumerate() {
            worksheet
                .write_with_format(r, col as u16, *value, &body_format)
                .map_err(|e| e.to_string())?;
        }
    }

    // Keep the header row visible while scrolling
    worksheet.set_freeze_panes(1, 0).map_err(|e| e.to_string())?;
    Ok(())
}

fn column_width(name: &str) -> f64 {
    match name {
        "Manifest Date" => 15.0,
        "RMA Number" => 15.0,
        "Tracking Number" => 22.0,
        "Status Line" => 120.0,
        "Status" => 20.0,
        "Status Date" => 18.0,
        "Shipper Name" => 40.0,
        "Ship To" => 50.0,
        "Exception" => 80.0,
        "Weight" => 10.0,
        "Reason" => 24.0,
        _ => 30.0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rmarecon_engine::model::NonStandardReason;
    use tempfile::tempdir;

    fn report_row(rma: &str, tn: &str, reason: Option<NonStandardReason>) -> ReportRow {
        ReportRow {
            rma_id: rma.into(),
            tracking_number: tn.into(),
            status: "In Transit".into(),
            status_date: "2024-01-05".into(),
            shipper_name: "Shipper".into(),
            ship_to: "CUSTOMER".into(),
            exception: String::new(),
            status_line: format!("{tn} - In Transit, 2024-01-05 → CUSTOMER"),
            manifest_date: "2024-01-01".into(),
            weight: "1.5".into(),
            reason,
            annotations: Vec::new(),
        }
    }

    #[test]
    fn test_write_then_read_back_as_baseline() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("report.xlsx");

        let mut standard = report_row("61111111", "1Z1", None);
        standard.annotations = vec!["chased 01-02".into()];
        let tables = ReportTables {
            standard: vec![standard],
            non_standard: vec![report_row(
                "123456789",
                "1Z2",
                Some(NonStandardReason::ExtraDigits),
            )],
            annotation_columns: vec!["Notes".into()],
        };

        write_report(&tables, "RMA Analysis", "Non-Standard RMAs", &path).unwrap();

        // A written report is next week's baseline: fact columns are
        // excluded, hand-entered columns come back keyed by (RMA, TN)
        let baseline = read_baseline(&path).unwrap();
        assert_eq!(baseline.annotation_columns, vec!["Notes"]);
        let key = RowKey {
            rma_id: "61111111".into(),
            tracking_number: "1Z1".into(),
        };
        assert_eq!(baseline.rows[&key], vec!["chased 01-02"]);
    }

    #[test]
    fn test_read_baseline_requires_key_columns() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("baseline.xlsx");

        let mut workbook = Workbook::new();
        let ws = workbook.add_worksheet();
        ws.write(0, 0, "Status").unwrap();
        ws.write(0, 1, "Notes").unwrap();
        workbook.save(&path).unwrap();

        let err = read_baseline(&path).unwrap_err();
        assert!(err.contains("RMA Number"));
    }

    #[test]
    fn test_read_baseline_uppercases_tracking_keys() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("baseline.xlsx");

        let mut workbook = Workbook::new();
        let ws = workbook.add_worksheet();
        ws.write(0, 0, "RMA Number").unwrap();
        ws.write(0, 1, "Tracking Number").unwrap();
        ws.write(0, 2, "Owner").unwrap();
        ws.write(1, 0, "61111111").unwrap();
        ws.write(1, 1, "1z999aa10123456784").unwrap();
        ws.write(1, 2, "mk").unwrap();
        workbook.save(&path).unwrap();

        let baseline = read_baseline(&path).unwrap();
        let key = RowKey {
            rma_id: "61111111".into(),
            tracking_number: "1Z999AA10123456784".into(),
        };
        assert_eq!(baseline.rows[&key], vec!["mk"]);
    }

    #[test]
    fn test_numeric_rma_cells_read_without_decimal_tail() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("baseline.xlsx");

        let mut workbook = Workbook::new();
        let ws = workbook.add_worksheet();
        ws.write(0, 0, "RMA Number").unwrap();
        ws.write(0, 1, "Tracking Number").unwrap();
        ws.write(0, 2, "Notes").unwrap();
        ws.write(1, 0, 61111111.0).unwrap();
        ws.write(1, 1, "1Z1").unwrap();
        ws.write(1, 2, "numeric key").unwrap();
        workbook.save(&path).unwrap();

        let baseline = read_baseline(&path).unwrap();
        let key = RowKey {
            rma_id: "61111111".into(),
            tracking_number: "1Z1".into(),
        };
        assert_eq!(baseline.rows[&key], vec!["numeric key"]);
    }

    #[test]
    fn test_serial_dates_render_as_iso() {
        // 2024-01-05 is serial 45296 in the 1900 date system
        assert_eq!(serial_to_string(45296.0), "2024-01-05");
        assert_eq!(serial_to_string(45296.5), "2024-01-05 12:00:00");
    }
}
