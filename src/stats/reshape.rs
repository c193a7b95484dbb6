use std::collections::BTreeMap;

use crate::data::model::{columns, RatingTable};
use crate::error::Result;

use super::correlation::{corrcoef, nanmean, Matrix};

// ---------------------------------------------------------------------------
// Reshaped views of the observation table
// ---------------------------------------------------------------------------

/// Every feature's ratings pivoted to a raters × items matrix.
///
/// Row and column universes are global: each matrix has one row per rater
/// and one column per item of the *whole* table, in the sorted unique
/// order, so the same index means the same rater in every feature's
/// matrix. Cells without an observation are `None`.
#[derive(Debug, Clone)]
pub struct RatingsByFeature {
    pub features: Vec<String>,
    pub raters: Vec<String>,
    pub items: Vec<String>,
    /// featureName → `matrix[rater][item]`.
    pub matrices: BTreeMap<String, Matrix>,
}

impl RatingsByFeature {
    pub fn matrix(&self, feature: &str) -> Option<&Matrix> {
        self.matrices.get(feature)
    }
}

/// Every rater's ratings pivoted to a features × items matrix.
/// The mirror image of [`RatingsByFeature`], keyed by worker id.
#[derive(Debug, Clone)]
pub struct RatingsByRater {
    pub raters: Vec<String>,
    pub features: Vec<String>,
    pub items: Vec<String>,
    /// workerId → `matrix[feature][item]`.
    pub matrices: BTreeMap<String, Matrix>,
}

impl RatingsByRater {
    pub fn matrix(&self, worker: &str) -> Option<&Matrix> {
        self.matrices.get(worker)
    }
}

/// Feature × feature correlation over rater-averaged item vectors.
#[derive(Debug, Clone)]
pub struct FeatureCorrelation {
    pub features: Vec<String>,
    pub items: Vec<String>,
    /// `means[feature][item]`: mean rating across raters, `None` where no
    /// rater covered the combination.
    pub means: Matrix,
    /// `matrix[feature][feature]` Pearson correlations.
    pub matrix: Matrix,
}

/// Item × item correlation over rater-averaged feature vectors.
#[derive(Debug, Clone)]
pub struct ItemCorrelation {
    pub items: Vec<String>,
    pub features: Vec<String>,
    /// `means[item][feature]`: mean rating across raters.
    pub means: Matrix,
    /// `matrix[item][item]` Pearson correlations.
    pub matrix: Matrix,
}

// ---------------------------------------------------------------------------
// Cell lookup
// ---------------------------------------------------------------------------

/// First-occurrence index of (worker, item, feature) → rated value.
///
/// Duplicated triples keep the value of the earliest row, missing ratings
/// included, so a duplicate can never resurrect a value the first row
/// lacked.
fn cell_index(table: &RatingTable) -> BTreeMap<(&str, &str, &str), Option<f64>> {
    let mut index = BTreeMap::new();
    for row in table.rows() {
        index
            .entry((
                row.worker_id.as_str(),
                row.item_name.as_str(),
                row.feature_name.as_str(),
            ))
            .or_insert_with(|| row.scaled_or_raw());
    }
    index
}

// ---------------------------------------------------------------------------
// Pivots
// ---------------------------------------------------------------------------

/// Pivot the table into one raters × items matrix per feature.
///
/// A rater who skipped a cell (or a whole feature) keeps their row with
/// `None` in the unfilled positions, so every row stays aligned to the
/// same item order and every matrix to the same rater order. This is the
/// direct input to [`corrcoef`] for per-feature reliability.
pub fn ratings_by_feature(table: &RatingTable) -> RatingsByFeature {
    let features = table.unique_strings(columns::FEATURE_NAME);
    let raters = table.unique_strings(columns::WORKER_ID);
    let items = table.unique_strings(columns::ITEM_NAME);
    let index = cell_index(table);

    let mut matrices = BTreeMap::new();
    for feature in &features {
        let matrix: Matrix = raters
            .iter()
            .map(|rater| {
                items
                    .iter()
                    .map(|item| {
                        index
                            .get(&(rater.as_str(), item.as_str(), feature.as_str()))
                            .copied()
                            .flatten()
                    })
                    .collect()
            })
            .collect();
        matrices.insert(feature.clone(), matrix);
    }

    RatingsByFeature {
        features,
        raters,
        items,
        matrices,
    }
}

/// Pivot the table into one features × items matrix per rater.
pub fn ratings_by_rater(table: &RatingTable) -> RatingsByRater {
    let raters = table.unique_strings(columns::WORKER_ID);
    let features = table.unique_strings(columns::FEATURE_NAME);
    let items = table.unique_strings(columns::ITEM_NAME);
    let index = cell_index(table);

    let mut matrices = BTreeMap::new();
    for rater in &raters {
        let matrix: Matrix = features
            .iter()
            .map(|feature| {
                items
                    .iter()
                    .map(|item| {
                        index
                            .get(&(rater.as_str(), item.as_str(), feature.as_str()))
                            .copied()
                            .flatten()
                    })
                    .collect()
            })
            .collect();
        matrices.insert(rater.clone(), matrix);
    }

    RatingsByRater {
        raters,
        features,
        items,
        matrices,
    }
}

// ---------------------------------------------------------------------------
// Rater-averaged correlation matrices
// ---------------------------------------------------------------------------

/// Mean rating per (feature, item) across all observations that hit the
/// combination. All matching rows contribute, duplicates included.
fn mean_by_feature_item(table: &RatingTable) -> BTreeMap<(&str, &str), Option<f64>> {
    let mut values: BTreeMap<(&str, &str), Vec<Option<f64>>> = BTreeMap::new();
    for row in table.rows() {
        values
            .entry((row.feature_name.as_str(), row.item_name.as_str()))
            .or_default()
            .push(row.scaled_or_raw());
    }
    values
        .into_iter()
        .map(|(key, vals)| (key, nanmean(&vals)))
        .collect()
}

/// Correlate every feature against every other feature.
///
/// Each feature becomes one vector over the item catalog where each entry
/// is the rater-averaged rating for that item; combinations no rater
/// covered stay `None` in the vector, leaving the pairwise exclusion in
/// [`corrcoef`] to skip them.
pub fn feature_vs_feature(table: &RatingTable) -> Result<FeatureCorrelation> {
    let features = table.unique_strings(columns::FEATURE_NAME);
    let items = table.unique_strings(columns::ITEM_NAME);
    let cell_means = mean_by_feature_item(table);

    let means: Matrix = features
        .iter()
        .map(|feature| {
            items
                .iter()
                .map(|item| {
                    cell_means
                        .get(&(feature.as_str(), item.as_str()))
                        .copied()
                        .flatten()
                })
                .collect()
        })
        .collect();

    let matrix = corrcoef(&means)?;
    Ok(FeatureCorrelation {
        features,
        items,
        means,
        matrix,
    })
}

/// Correlate every item against every other item.
///
/// The mirror of [`feature_vs_feature`]: each item becomes one vector of
/// rater-averaged ratings over the feature catalog.
pub fn item_vs_item(table: &RatingTable) -> Result<ItemCorrelation> {
    let items = table.unique_strings(columns::ITEM_NAME);
    let features = table.unique_strings(columns::FEATURE_NAME);
    let cell_means = mean_by_feature_item(table);

    let means: Matrix = items
        .iter()
        .map(|item| {
            features
                .iter()
                .map(|feature| {
                    cell_means
                        .get(&(feature.as_str(), item.as_str()))
                        .copied()
                        .flatten()
                })
                .collect()
        })
        .collect();

    let matrix = corrcoef(&means)?;
    Ok(ItemCorrelation {
        items,
        features,
        means,
        matrix,
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
