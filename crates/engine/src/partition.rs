use crate::model::NormalizedRow;

/// Split the normalized view into Standard and Non-Standard RMA buckets.
///
/// Standard iff extraction resolved a clean 8-digit RMA; every non-standard
/// row keeps its specific reason for display. The two partitions are
/// disjoint, their union is the input, and arrival order is preserved.
pub fn partition(rows: Vec<NormalizedRow>) -> (Vec<NormalizedRow>, Vec<NormalizedRow>) {
    let mut standard = Vec::new();
    let mut non_standard = Vec::new();

    for row in rows {
        if row.extraction.is_standard() {
            standard.push(row);
        } else {
            non_standard.push(row);
        }
    }

    (standard, non_standard)
}
