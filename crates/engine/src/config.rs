use serde::Deserialize;

use crate::error::EngineError;
use crate::model::columns;

// ---------------------------------------------------------------------------
// Top-level config
// ---------------------------------------------------------------------------

/// Engine configuration: the versioned column alias table, the ordered
/// candidate columns the extractor scans, and output sheet names.
///
/// Everything has a built-in default matching the current carrier export,
/// so the tool runs without a config file. New export variants are handled
/// by adding alias entries, never by branching logic.
#[derive(Debug, Clone, Deserialize)]
pub struct ReconConfig {
    #[serde(default = "default_name")]
    pub name: String,
    /// One entry per canonical column, listing every accepted header spelling.
    #[serde(default = "default_aliases", rename = "column")]
    pub columns: Vec<ColumnAlias>,
    /// Canonical columns scanned for RMA candidates, in priority order.
    #[serde(default = "default_candidates")]
    pub candidate_columns: Vec<String>,
    #[serde(default)]
    pub output: OutputConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ColumnAlias {
    pub canonical: String,
    pub aliases: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    #[serde(default = "default_standard_sheet")]
    pub standard_sheet: String,
    #[serde(default = "default_non_standard_sheet")]
    pub non_standard_sheet: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            standard_sheet: default_standard_sheet(),
            non_standard_sheet: default_non_standard_sheet(),
        }
    }
}

impl Default for ReconConfig {
    fn default() -> Self {
        Self {
            name: default_name(),
            columns: default_aliases(),
            candidate_columns: default_candidates(),
            output: OutputConfig::default(),
        }
    }
}

fn default_name() -> String {
    "RMA Analysis".into()
}

fn default_standard_sheet() -> String {
    "RMA Analysis".into()
}

fn default_non_standard_sheet() -> String {
    "Non-Standard RMAs".into()
}

fn default_candidates() -> Vec<String> {
    vec![
        columns::RMA_NUMBER.into(),
        columns::PACKAGE_REF_1.into(),
        columns::PACKAGE_REF_2.into(),
        columns::TRACKING_DETAILS.into(),
    ]
}

fn alias(canonical: &str, aliases: &[&str]) -> ColumnAlias {
    ColumnAlias {
        canonical: canonical.into(),
        aliases: aliases.iter().map(|a| a.to_string()).collect(),
    }
}

/// Built-in alias table for the known carrier export variants.
fn default_aliases() -> Vec<ColumnAlias> {
    vec![
        alias(columns::MANIFEST_DATE, &["manifest date"]),
        alias(columns::RMA_NUMBER, &["rma number", "rma"]),
        alias(
            columns::PACKAGE_REF_1,
            &["package reference no. 1", "package reference no.1", "package reference 1"],
        ),
        alias(
            columns::PACKAGE_REF_2,
            &["package reference no. 2", "package reference no.2", "package reference 2"],
        ),
        alias(columns::TRACKING_NUMBER, &["tracking number", "tracking no."]),
        alias(
            columns::TRACKING_DETAILS,
            &["tracking number - details", "tracking number details"],
        ),
        alias(columns::STATUS, &["status", "current status"]),
        // Older exports carry the date under delivery-centric headers.
        alias(
            columns::STATUS_DATE,
            &["status date", "status_date", "scheduled delivery", "date delivered"],
        ),
        alias(columns::SHIPPER_NAME, &["shipper name", "shipper"]),
        alias(columns::SHIP_TO, &["ship to", "ship to name", "consignee"]),
        alias(columns::EXCEPTION_DESCRIPTION, &["exception description"]),
        alias(columns::EXCEPTION_RESOLUTION, &["exception resolution"]),
        alias(columns::SHIP_TO_LOCATION, &["ship to location"]),
        alias(columns::WEIGHT, &["weight"]),
    ]
}

// ---------------------------------------------------------------------------
// Parse + Validate
// ---------------------------------------------------------------------------

impl ReconConfig {
    pub fn from_toml(input: &str) -> Result<Self, EngineError> {
        let config: ReconConfig =
            toml::from_str(input).map_err(|e| EngineError::ConfigParse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), EngineError> {
        for entry in &self.columns {
            if !columns::ALL.contains(&entry.canonical.as_str()) {
                return Err(EngineError::ConfigValidation(format!(
                    "unknown canonical column '{}'",
                    entry.canonical
                )));
            }
        }

        for required in columns::REQUIRED {
            if !self.columns.iter().any(|e| e.canonical == *required) {
                return Err(EngineError::ConfigValidation(format!(
                    "required column '{required}' has no alias entry"
                )));
            }
        }

        if self.candidate_columns.is_empty() {
            return Err(EngineError::ConfigValidation(
                "at least one candidate column is required".into(),
            ));
        }
        for candidate in &self.candidate_columns {
            if !columns::ALL.contains(&candidate.as_str()) {
                return Err(EngineError::ConfigValidation(format!(
                    "candidate column '{candidate}' is not a canonical column"
                )));
            }
        }

        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
