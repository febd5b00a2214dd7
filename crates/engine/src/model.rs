use std::collections::HashMap;

use serde::Serialize;

// ---------------------------------------------------------------------------
// Canonical schema
// ---------------------------------------------------------------------------

/// Canonical column names of a harmonized export row.
///
/// Export headers drift across carrier portal versions; the harmonizer maps
/// every known spelling onto this fixed set via the config alias table.
pub mod columns {
    pub const MANIFEST_DATE: &str = "Manifest Date";
    pub const RMA_NUMBER: &str = "RMA Number";
    pub const PACKAGE_REF_1: &str = "Package Reference No. 1";
    pub const PACKAGE_REF_2: &str = "Package Reference No. 2";
    pub const TRACKING_NUMBER: &str = "Tracking Number";
    pub const TRACKING_DETAILS: &str = "Tracking Number - Details";
    pub const STATUS: &str = "Status";
    pub const STATUS_DATE: &str = "Status Date";
    pub const SHIPPER_NAME: &str = "Shipper Name";
    pub const SHIP_TO: &str = "Ship To";
    pub const EXCEPTION_DESCRIPTION: &str = "Exception Description";
    pub const EXCEPTION_RESOLUTION: &str = "Exception Resolution";
    pub const SHIP_TO_LOCATION: &str = "Ship To Location";
    pub const WEIGHT: &str = "Weight";

    pub const ALL: &[&str] = &[
        MANIFEST_DATE,
        RMA_NUMBER,
        PACKAGE_REF_1,
        PACKAGE_REF_2,
        TRACKING_NUMBER,
        TRACKING_DETAILS,
        STATUS,
        STATUS_DATE,
        SHIPPER_NAME,
        SHIP_TO,
        EXCEPTION_DESCRIPTION,
        EXCEPTION_RESOLUTION,
        SHIP_TO_LOCATION,
        WEIGHT,
    ];

    /// A run cannot proceed when these are unresolvable under every alias.
    pub const REQUIRED: &[&str] = &[TRACKING_NUMBER, STATUS_DATE];
}

// ---------------------------------------------------------------------------
// Input
// ---------------------------------------------------------------------------

/// A tabular input exactly as ingested: original headers, string cells.
#[derive(Debug, Clone, Default)]
pub struct RawTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

/// One export row remapped onto the canonical column set.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HarmonizedRecord {
    pub manifest_date: String,
    pub rma_field: String,
    pub package_ref_1: String,
    pub package_ref_2: String,
    pub tracking_number: String,
    pub tracking_details: String,
    pub status: String,
    pub status_date: String,
    pub shipper_name: String,
    pub ship_to: String,
    pub exception_description: String,
    pub exception_resolution: String,
    pub ship_to_location: String,
    pub weight: String,
}

impl HarmonizedRecord {
    pub fn set(&mut self, canonical: &str, value: String) {
        match canonical {
            columns::MANIFEST_DATE => self.manifest_date = value,
            columns::RMA_NUMBER => self.rma_field = value,
            columns::PACKAGE_REF_1 => self.package_ref_1 = value,
            columns::PACKAGE_REF_2 => self.package_ref_2 = value,
            columns::TRACKING_NUMBER => self.tracking_number = value,
            columns::TRACKING_DETAILS => self.tracking_details = value,
            columns::STATUS => self.status = value,
            columns::STATUS_DATE => self.status_date = value,
            columns::SHIPPER_NAME => self.shipper_name = value,
            columns::SHIP_TO => self.ship_to = value,
            columns::EXCEPTION_DESCRIPTION => self.exception_description = value,
            columns::EXCEPTION_RESOLUTION => self.exception_resolution = value,
            columns::SHIP_TO_LOCATION => self.ship_to_location = value,
            columns::WEIGHT => self.weight = value,
            _ => {}
        }
    }

    pub fn get(&self, canonical: &str) -> &str {
        match canonical {
            columns::MANIFEST_DATE => &self.manifest_date,
            columns::RMA_NUMBER => &self.rma_field,
            columns::PACKAGE_REF_1 => &self.package_ref_1,
            columns::PACKAGE_REF_2 => &self.package_ref_2,
            columns::TRACKING_NUMBER => &self.tracking_number,
            columns::TRACKING_DETAILS => &self.tracking_details,
            columns::STATUS => &self.status,
            columns::STATUS_DATE => &self.status_date,
            columns::SHIPPER_NAME => &self.shipper_name,
            columns::SHIP_TO => &self.ship_to,
            columns::EXCEPTION_DESCRIPTION => &self.exception_description,
            columns::EXCEPTION_RESOLUTION => &self.exception_resolution,
            columns::SHIP_TO_LOCATION => &self.ship_to_location,
            columns::WEIGHT => &self.weight,
            _ => "",
        }
    }
}

// ---------------------------------------------------------------------------
// Extraction
// ---------------------------------------------------------------------------

/// An 8-digit run found in a candidate column, tagged with where it was found.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RmaCandidate {
    pub token: String,
    /// Index into the ordered candidate column list.
    pub column: usize,
    /// Byte offset of the run within its source field.
    pub offset: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NonStandardReason {
    ExtraDigits,
    FallbackReference,
    NoRma,
}

impl std::fmt::Display for NonStandardReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ExtraDigits => write!(f, "extra-digit"),
            Self::FallbackReference => write!(f, "fallback-reference"),
            Self::NoRma => write!(f, "no identifiable RMA"),
        }
    }
}

/// Outcome of resolving one record's candidate set to at most one RMA.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ExtractionResult {
    Standard { rma: String },
    NonStandard { reason: NonStandardReason, fallback_id: String },
}

impl ExtractionResult {
    /// The identifier that keys the normalized row: the RMA for standard
    /// rows, the fallback identifier otherwise.
    pub fn id(&self) -> &str {
        match self {
            Self::Standard { rma } => rma,
            Self::NonStandard { fallback_id, .. } => fallback_id,
        }
    }

    pub fn is_standard(&self) -> bool {
        matches!(self, Self::Standard { .. })
    }

    pub fn reason(&self) -> Option<NonStandardReason> {
        match self {
            Self::Standard { .. } => None,
            Self::NonStandard { reason, .. } => Some(*reason),
        }
    }
}

// ---------------------------------------------------------------------------
// Normalized view
// ---------------------------------------------------------------------------

/// Key of the normalized one-row-per-(RMA, tracking-number) view.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RowKey {
    pub rma_id: String,
    pub tracking_number: String,
}

/// One (RMA-or-fallback, tracking-number) pair with full shipment context.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NormalizedRow {
    pub rma_id: String,
    pub tracking_number: String,
    pub extraction: ExtractionResult,
    pub manifest_date: String,
    pub status: String,
    pub status_date: String,
    pub shipper_name: String,
    pub ship_to: String,
    /// Exception description and resolution joined; empty when none.
    pub exception: String,
    pub weight: String,
}

impl NormalizedRow {
    pub fn key(&self) -> RowKey {
        RowKey {
            rma_id: self.rma_id.clone(),
            tracking_number: self.tracking_number.clone(),
        }
    }
}

// ---------------------------------------------------------------------------
// Baseline
// ---------------------------------------------------------------------------

/// A prior report, consulted read-only to carry annotations forward.
///
/// Live tracking facts always come from the current export; the baseline
/// contributes only its annotation columns, keyed by (RMA, tracking number).
#[derive(Debug, Clone, Default)]
pub struct Baseline {
    pub annotation_columns: Vec<String>,
    pub rows: HashMap<RowKey, Vec<String>>,
}

// ---------------------------------------------------------------------------
// Report
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReportRow {
    pub rma_id: String,
    pub tracking_number: String,
    pub status: String,
    pub status_date: String,
    pub shipper_name: String,
    pub ship_to: String,
    pub exception: String,
    pub status_line: String,
    pub manifest_date: String,
    pub weight: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<NonStandardReason>,
    /// Values aligned with `ReportTables::annotation_columns`.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub annotations: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct ReportTables {
    pub standard: Vec<ReportRow>,
    pub non_standard: Vec<ReportRow>,
    /// Baseline columns carried forward; empty when no baseline was supplied.
    pub annotation_columns: Vec<String>,
}

// ---------------------------------------------------------------------------
// Summary + Output
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize)]
pub struct ReconSummary {
    pub input_rows: usize,
    pub normalized_rows: usize,
    /// Duplicate (RMA, tracking-number) keys folded by the merge policy.
    pub merged_duplicates: usize,
    /// Export rows with no resolvable tracking number; they cannot be keyed.
    pub missing_tracking: usize,
    pub standard: usize,
    pub non_standard: usize,
    pub reason_counts: HashMap<String, usize>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ReconMeta {
    pub config_name: String,
    pub engine_version: String,
    pub run_at: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ReconResult {
    pub meta: ReconMeta,
    pub summary: ReconSummary,
    pub report: ReportTables,
}
