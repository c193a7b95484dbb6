use std::collections::BTreeMap;

use log::warn;

use super::model::RatingTable;

// ---------------------------------------------------------------------------
// Rater completeness filtering
// ---------------------------------------------------------------------------

/// Outcome of [`drop_incomplete_raters`]: the reduced table plus what was
/// removed and why.
#[derive(Debug, Clone)]
pub struct CompletenessReport {
    /// Table containing only rows from complete raters.
    pub table: RatingTable,
    /// Worker ids that were removed, sorted.
    pub dropped: Vec<String>,
    /// Highest per-rater observation count, treated as the complete total.
    pub max_count: usize,
    /// Observation count per rater, before filtering.
    pub rater_counts: BTreeMap<String, usize>,
}

/// Remove raters with fewer observations than the most complete rater.
///
/// The bar is set by the data itself: whoever rated the most combinations
/// defines the complete count, and everyone short of it is dropped with a
/// warning. An aborted session therefore cannot leave half-filled rating
/// vectors skewing the correlations.
pub fn drop_incomplete_raters(table: &RatingTable) -> CompletenessReport {
    let mut rater_counts: BTreeMap<String, usize> = BTreeMap::new();
    for row in table.rows() {
        *rater_counts.entry(row.worker_id.clone()).or_insert(0) += 1;
    }
    let max_count = rater_counts.values().copied().max().unwrap_or(0);

    // BTreeMap iteration keeps `dropped` sorted.
    let dropped: Vec<String> = rater_counts
        .iter()
        .filter(|(_, &n)| n < max_count)
        .map(|(worker, _)| worker.clone())
        .collect();

    for worker in &dropped {
        warn!(
            "dropping incomplete rater {} ({} of {} observations)",
            worker, rater_counts[worker], max_count
        );
    }

    let table = table.filter(|row| dropped.binary_search(&row.worker_id).is_err());
    CompletenessReport {
        table,
        dropped,
        max_count,
        rater_counts,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
