use crate::model::{columns, ExtractionResult, NonStandardReason, RmaCandidate};

/// Fallback identifier when a record yields nothing usable at all.
pub const NO_RMA_ID: &str = "N/A";

/// Resolve a record's candidate text fields to at most one 8-digit RMA.
///
/// `fields` is the ordered (column name, text) list from the config's
/// candidate columns. Resolution order, reproduced exactly on every run:
///
/// 1. any 8-digit run starting with `6`,
/// 2. else any 8-digit run starting with `7`,
/// 3. else the first 8-digit run, in column-then-position order,
/// 4. else a 9+ digit run (extra-digit RMA) as fallback identifier,
/// 5. else a non-empty Package Reference No. 2 value (alternate reference),
/// 6. else no identifiable RMA.
///
/// Ties within a tier break leftmost-column, then leftmost-position.
pub fn extract_rma(fields: &[(&str, &str)]) -> ExtractionResult {
    let mut candidates: Vec<RmaCandidate> = Vec::new();
    let mut extra_digit_run: Option<String> = None;

    for (column, (_, raw)) in fields.iter().enumerate() {
        let text = clean_cell(raw);
        for (offset, run) in digit_runs(text) {
            if run.len() == 8 {
                // de-duplicate in encounter order
                if !candidates.iter().any(|c| c.token == run) {
                    candidates.push(RmaCandidate {
                        token: run,
                        column,
                        offset,
                    });
                }
            } else if run.len() > 8 && extra_digit_run.is_none() {
                extra_digit_run = Some(run);
            }
        }
    }

    for tier in [Some('6'), Some('7'), None] {
        let hit = candidates
            .iter()
            .find(|c| tier.map_or(true, |d| c.token.starts_with(d)));
        if let Some(candidate) = hit {
            return ExtractionResult::Standard {
                rma: candidate.token.clone(),
            };
        }
    }

    if let Some(run) = extra_digit_run {
        return ExtractionResult::NonStandard {
            reason: NonStandardReason::ExtraDigits,
            fallback_id: run,
        };
    }

    let package_ref_2 = fields
        .iter()
        .find(|(name, _)| *name == columns::PACKAGE_REF_2)
        .map(|(_, text)| clean_cell(text))
        .unwrap_or("");
    if !package_ref_2.is_empty() {
        return ExtractionResult::NonStandard {
            reason: NonStandardReason::FallbackReference,
            fallback_id: package_ref_2.to_string(),
        };
    }

    ExtractionResult::NonStandard {
        reason: NonStandardReason::NoRma,
        fallback_id: NO_RMA_ID.to_string(),
    }
}

/// Trim and drop the Excel-style `.0` suffix numeric cells pick up.
fn clean_cell(raw: &str) -> &str {
    let text = raw.trim();
    text.strip_suffix(".0").unwrap_or(text)
}

/// Maximal runs of ASCII digits with their byte offsets.
///
/// Runs are maximal by construction, so an 8-digit window inside a longer
/// run never counts as a match.
fn digit_runs(text: &str) -> Vec<(usize, String)> {
    let mut runs = Vec::new();
    let mut start: Option<usize> = None;

    for (idx, ch) in text.char_indices() {
        if ch.is_ascii_digit() {
            start.get_or_insert(idx);
        } else if let Some(s) = start.take() {
            runs.push((s, text[s..idx].to_string()));
        }
    }
    if let Some(s) = start {
        runs.push((s, text[s..].to_string()));
    }

    runs
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fields<'a>(pairs: &'a [(&'a str, &'a str)]) -> &'a [(&'a str, &'a str)] {
        pairs
    }

    #[test]
    fn prefers_leading_six_over_seven_regardless_of_column_order() {
        let result = extract_rma(fields(&[
            ("RMA Number", "71234567"),
            ("Package Reference No. 1", "61234567"),
        ]));
        assert_eq!(
            result,
            ExtractionResult::Standard {
                rma: "61234567".into()
            }
        );
    }

    #[test]
    fn prefers_leading_seven_over_rest() {
        let result = extract_rma(fields(&[
            ("RMA Number", "31234567"),
            ("Package Reference No. 1", "71234567"),
        ]));
        assert_eq!(
            result,
            ExtractionResult::Standard {
                rma: "71234567".into()
            }
        );
    }

    #[test]
    fn tie_breaks_by_column_then_position() {
        let result = extract_rma(fields(&[
            ("RMA Number", "ref 31111111 then 32222222"),
            ("Package Reference No. 1", "30000000"),
        ]));
        assert_eq!(
            result,
            ExtractionResult::Standard {
                rma: "31111111".into()
            }
        );
    }

    #[test]
    fn eight_digits_embedded_in_text() {
        let result = extract_rma(fields(&[("RMA Number", "RMA 67024814")]));
        assert_eq!(
            result,
            ExtractionResult::Standard {
                rma: "67024814".into()
            }
        );
    }

    #[test]
    fn nine_digit_run_is_extra_digit_fallback() {
        let result = extract_rma(fields(&[("RMA Number", "123456789")]));
        assert_eq!(
            result,
            ExtractionResult::NonStandard {
                reason: NonStandardReason::ExtraDigits,
                fallback_id: "123456789".into()
            }
        );
    }

    #[test]
    fn eight_digit_window_inside_long_run_does_not_match() {
        // 6 leads the run, but the run is 9 digits long
        let result = extract_rma(fields(&[("RMA Number", "612345678")]));
        assert!(matches!(
            result,
            ExtractionResult::NonStandard {
                reason: NonStandardReason::ExtraDigits,
                ..
            }
        ));
    }

    #[test]
    fn clean_match_wins_over_extra_digit_evidence() {
        let result = extract_rma(fields(&[
            ("RMA Number", "123456789"),
            ("Package Reference No. 1", "31234567"),
        ]));
        assert_eq!(
            result,
            ExtractionResult::Standard {
                rma: "31234567".into()
            }
        );
    }

    #[test]
    fn package_ref_2_is_alternate_reference_fallback() {
        let result = extract_rma(fields(&[
            ("RMA Number", "no digits here"),
            ("Package Reference No. 2", "PR2-AB12"),
        ]));
        assert_eq!(
            result,
            ExtractionResult::NonStandard {
                reason: NonStandardReason::FallbackReference,
                fallback_id: "PR2-AB12".into()
            }
        );
    }

    #[test]
    fn nothing_matches_at_all() {
        let result = extract_rma(fields(&[("RMA Number", "pending")]));
        assert_eq!(
            result,
            ExtractionResult::NonStandard {
                reason: NonStandardReason::NoRma,
                fallback_id: NO_RMA_ID.into()
            }
        );
    }

    #[test]
    fn excel_float_suffix_is_stripped() {
        let result = extract_rma(fields(&[("RMA Number", "61234567.0")]));
        assert_eq!(
            result,
            ExtractionResult::Standard {
                rma: "61234567".into()
            }
        );
    }

    #[test]
    fn duplicate_tokens_dedupe_in_encounter_order() {
        let result = extract_rma(fields(&[
            ("RMA Number", "31234567"),
            ("Package Reference No. 1", "31234567 32222222"),
        ]));
        assert_eq!(
            result,
            ExtractionResult::Standard {
                rma: "31234567".into()
            }
        );
    }

    #[test]
    fn determinism_same_fields_same_result() {
        let input = [
            ("RMA Number", "71234567 61234567"),
            ("Package Reference No. 1", "62222222"),
        ];
        let first = extract_rma(&input);
        for _ in 0..10 {
            assert_eq!(extract_rma(&input), first);
        }
    }
}
