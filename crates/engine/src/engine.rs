use crate::config::ReconConfig;
use crate::error::EngineError;
use crate::harmonize::harmonize;
use crate::model::{Baseline, RawTable, ReconMeta, ReconResult};
use crate::normalize::normalize;
use crate::partition::partition;
use crate::report::{assemble, compute_summary};

/// Run the full pipeline: harmonize → extract/normalize → partition →
/// assemble. Pure and deterministic over its inputs; the baseline is
/// consulted read-only.
pub fn run(
    config: &ReconConfig,
    export: &RawTable,
    baseline: Option<&Baseline>,
) -> Result<ReconResult, EngineError> {
    let records = harmonize(export, config)?;
    let normalized = normalize(&records, config);
    let (standard, non_standard) = partition(normalized.rows);
    let report = assemble(standard, non_standard, baseline);
    let summary = compute_summary(
        &report,
        export.rows.len(),
        normalized.merged_duplicates,
        normalized.missing_tracking,
    );

    Ok(ReconResult {
        meta: ReconMeta {
            config_name: config.name.clone(),
            engine_version: env!("CARGO_PKG_VERSION").to_string(),
            run_at: chrono::Utc::now().to_rfc3339(),
        },
        summary,
        report,
    })
}

/// Parse CSV text into a raw table. File reading and encoding concerns
/// belong to the io crate; this only sees UTF-8 text.
pub fn load_csv_table(csv_data: &str) -> Result<RawTable, EngineError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(csv_data.as_bytes());

    let headers: Vec<String> = reader
        .headers()
        .map_err(|e| EngineError::Io(e.to_string()))?
        .iter()
        .map(|h| h.to_string())
        .collect();

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record.map_err(|e| EngineError::Io(e.to_string()))?;
        rows.push(record.iter().map(|c| c.to_string()).collect());
    }

    Ok(RawTable { headers, rows })
}
