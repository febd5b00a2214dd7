//! `rmarecon-engine` — carrier-export / RMA reconciliation engine.
//!
//! Pure engine crate: receives pre-loaded tables, returns the classified
//! Standard / Non-Standard report tables plus run metadata. Reading export
//! files and writing report artifacts belong to `rmarecon-io`.

pub mod config;
pub mod engine;
pub mod error;
pub mod extract;
pub mod harmonize;
pub mod model;
pub mod normalize;
pub mod partition;
pub mod report;

pub use config::ReconConfig;
pub use engine::{load_csv_table, run};
pub use error::EngineError;
pub use model::{
    Baseline, ExtractionResult, NonStandardReason, NormalizedRow, RawTable, ReconResult,
    ReportRow, ReportTables, RowKey,
};
