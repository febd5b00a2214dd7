// rmarecon CLI - headless RMA shipment reconciliation

mod exit_codes;

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use rmarecon_engine::{EngineError, ReconConfig};

use exit_codes::{EXIT_INVALID_CONFIG, EXIT_IO, EXIT_SCHEMA, EXIT_SUCCESS, EXIT_USAGE};

#[derive(Parser)]
#[command(name = "rmarecon")]
#[command(about = "Reconcile carrier tracking exports against RMA records")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run reconciliation over a carrier tracking export
    #[command(after_help = "\
Examples:
  rmarecon run export.csv
  rmarecon run export.csv --baseline last_week.xlsx -o report.xlsx
  rmarecon run export.csv --config recon.toml --json")]
    Run {
        /// Carrier tracking export (CSV/TSV; delimiter is auto-detected)
        export: PathBuf,

        /// Prior report workbook; its hand-entered columns are carried forward
        #[arg(long)]
        baseline: Option<PathBuf>,

        /// Output workbook path (defaults to <export>_report.xlsx)
        #[arg(long, short = 'o')]
        output: Option<PathBuf>,

        /// TOML config with alias table overrides
        #[arg(long)]
        config: Option<PathBuf>,

        /// Print the full result as JSON to stdout
        #[arg(long)]
        json: bool,
    },

    /// Validate a config file without running
    #[command(after_help = "\
Examples:
  rmarecon validate recon.toml")]
    Validate {
        /// Path to the TOML config file
        config: PathBuf,
    },
}

pub struct CliError {
    pub code: u8,
    pub message: String,
    pub hint: Option<String>,
}

impl CliError {
    fn usage(msg: impl Into<String>) -> Self {
        Self { code: EXIT_USAGE, message: msg.into(), hint: None }
    }

    fn io(msg: impl Into<String>) -> Self {
        Self { code: EXIT_IO, message: msg.into(), hint: None }
    }

    fn config(msg: impl Into<String>) -> Self {
        Self { code: EXIT_INVALID_CONFIG, message: msg.into(), hint: None }
    }

    fn engine(err: EngineError) -> Self {
        match err {
            EngineError::Schema { ref column } => Self {
                code: EXIT_SCHEMA,
                message: err.to_string(),
                hint: Some(format!(
                    "add an alias for '{column}' under [[column]] in the config"
                )),
            },
            EngineError::ConfigParse(_) | EngineError::ConfigValidation(_) => Self {
                code: EXIT_INVALID_CONFIG,
                message: err.to_string(),
                hint: None,
            },
            EngineError::Io(_) => Self::io(err.to_string()),
        }
    }
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Run { export, baseline, output, config, json } => {
            cmd_run(export, baseline, output, config, json)
        }
        Commands::Validate { config } => cmd_validate(config),
    };

    match result {
        Ok(()) => ExitCode::from(EXIT_SUCCESS),
        Err(CliError { code, message, hint }) => {
            if !message.is_empty() {
                eprintln!("error: {}", message);
            }
            if let Some(hint) = hint {
                eprintln!("hint:  {}", hint);
            }
            ExitCode::from(code)
        }
    }
}

fn cmd_run(
    export_path: PathBuf,
    baseline_path: Option<PathBuf>,
    output_path: Option<PathBuf>,
    config_path: Option<PathBuf>,
    json_output: bool,
) -> Result<(), CliError> {
    let config = load_config(config_path.as_deref())?;
    let output_path = output_path.unwrap_or_else(|| default_output_path(&export_path));

    // The baseline is read-only; refuse to clobber it with the report
    if let Some(ref baseline) = baseline_path {
        if same_path(baseline, &output_path) {
            return Err(CliError::usage(format!(
                "output path {} would overwrite the baseline; pass a different -o",
                output_path.display()
            )));
        }
    }

    tracing::info!(export = %export_path.display(), "reading export");
    let table = rmarecon_io::csv::import(&export_path)
        .map_err(|e| CliError::io(format!("cannot read {}: {e}", export_path.display())))?;

    let baseline = match baseline_path {
        Some(ref path) => {
            tracing::info!(baseline = %path.display(), "reading baseline");
            Some(
                rmarecon_io::xlsx::read_baseline(path)
                    .map_err(|e| CliError::io(format!("cannot read {}: {e}", path.display())))?,
            )
        }
        None => None,
    };

    tracing::info!(rows = table.rows.len(), "running reconciliation");
    let result = rmarecon_engine::run(&config, &table, baseline.as_ref())
        .map_err(CliError::engine)?;

    tracing::info!(output = %output_path.display(), "writing report");
    rmarecon_io::xlsx::write_report(
        &result.report,
        &config.output.standard_sheet,
        &config.output.non_standard_sheet,
        &output_path,
    )
    .map_err(|e| CliError::io(format!("cannot write {}: {e}", output_path.display())))?;

    if json_output {
        let json_str = serde_json::to_string_pretty(&result)
            .map_err(|e| CliError::io(format!("JSON serialization error: {e}")))?;
        println!("{json_str}");
    }

    // Human summary to stderr
    let s = &result.summary;
    eprintln!(
        "{}: {} rows in — {} standard, {} non-standard ({} duplicate keys merged, {} without tracking number)",
        config.name, s.input_rows, s.standard, s.non_standard, s.merged_duplicates, s.missing_tracking
    );
    for (reason, count) in sorted_reasons(&result.summary.reason_counts) {
        eprintln!("  non-standard [{reason}]: {count}");
    }
    eprintln!("wrote {}", output_path.display());

    Ok(())
}

fn cmd_validate(config_path: PathBuf) -> Result<(), CliError> {
    let config = load_config(Some(&config_path))?;
    eprintln!(
        "{}: ok ({} column entries, {} candidate columns)",
        config_path.display(),
        config.columns.len(),
        config.candidate_columns.len()
    );
    Ok(())
}

fn load_config(path: Option<&Path>) -> Result<ReconConfig, CliError> {
    match path {
        Some(path) => {
            let text = std::fs::read_to_string(path)
                .map_err(|e| CliError::io(format!("cannot read {}: {e}", path.display())))?;
            ReconConfig::from_toml(&text).map_err(|e| CliError::config(e.to_string()))
        }
        None => Ok(ReconConfig::default()),
    }
}

/// `export.csv` → `export_report.xlsx`, beside the input.
fn default_output_path(export: &Path) -> PathBuf {
    let stem = export
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("rma");
    export.with_file_name(format!("{stem}_report.xlsx"))
}

fn same_path(a: &Path, b: &Path) -> bool {
    match (a.canonicalize(), b.canonicalize()) {
        (Ok(a), Ok(b)) => a == b,
        _ => a == b,
    }
}

fn sorted_reasons(counts: &std::collections::HashMap<String, usize>) -> Vec<(&String, &usize)> {
    let mut entries: Vec<_> = counts.iter().collect();
    entries.sort();
    entries
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_output_sits_beside_the_export() {
        let out = default_output_path(Path::new("/data/week32.csv"));
        assert_eq!(out, PathBuf::from("/data/week32_report.xlsx"));
    }

    #[test]
    fn default_output_handles_extensionless_input() {
        let out = default_output_path(Path::new("export"));
        assert_eq!(out, PathBuf::from("export_report.xlsx"));
    }

    #[test]
    fn same_path_compares_lexically_when_files_do_not_exist() {
        assert!(same_path(Path::new("/tmp/a.xlsx"), Path::new("/tmp/a.xlsx")));
        assert!(!same_path(Path::new("/tmp/a.xlsx"), Path::new("/tmp/b.xlsx")));
    }

    #[test]
    fn missing_config_file_is_an_io_error() {
        let err = load_config(Some(Path::new("/nonexistent/recon.toml"))).unwrap_err();
        assert_eq!(err.code, crate::exit_codes::EXIT_IO);
    }
}
