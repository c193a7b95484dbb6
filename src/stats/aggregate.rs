use std::cmp::Ordering;
use std::fmt;

use serde::Serialize;

use crate::data::model::{RaterKind, RatingTable};
use crate::error::{Error, Result};

use super::correlation::{corrcoef, nanmean, triu_indices, upper_triangle, Matrix};
use super::reshape::{feature_vs_feature, item_vs_item, RatingsByFeature};

// ---------------------------------------------------------------------------
// Quality bands
// ---------------------------------------------------------------------------

/// Verdict attached to an agreement score for reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Quality {
    Excellent,
    Good,
    Fair,
    Poor,
    /// The score is undefined: every underlying correlation was
    /// incomputable, typically because all ratings were identical.
    NoVariance,
}

impl Quality {
    /// Band an agreement score: ≥0.7 excellent, ≥0.5 good, ≥0.3 fair,
    /// below that poor.
    pub fn from_score(score: Option<f64>) -> Self {
        match score {
            None => Quality::NoVariance,
            Some(r) if r >= 0.7 => Quality::Excellent,
            Some(r) if r >= 0.5 => Quality::Good,
            Some(r) if r >= 0.3 => Quality::Fair,
            Some(_) => Quality::Poor,
        }
    }
}

impl fmt::Display for Quality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Quality::Excellent => "Excellent",
            Quality::Good => "Good",
            Quality::Fair => "Fair",
            Quality::Poor => "Poor",
            Quality::NoVariance => "No Variance",
        };
        write!(f, "{s}")
    }
}

// ---------------------------------------------------------------------------
// Deterministic Option<f64> ordering
// ---------------------------------------------------------------------------

/// Ascending order with undefined scores after every defined one.
fn cmp_score_ascending(a: Option<f64>, b: Option<f64>) -> Ordering {
    match (a, b) {
        (Some(x), Some(y)) => x.total_cmp(&y),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// Descending order, undefined scores still last.
fn cmp_score_descending(a: Option<f64>, b: Option<f64>) -> Ordering {
    match (a, b) {
        (Some(x), Some(y)) => y.total_cmp(&x),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

// ---------------------------------------------------------------------------
// Feature reliability
// ---------------------------------------------------------------------------

/// One feature's inter-rater reliability.
#[derive(Debug, Clone, Serialize)]
pub struct FeatureConsistency {
    pub feature: String,
    /// Mean of the pairwise rater correlations (upper triangle of the
    /// rater × rater matrix), undefined pairings dropped.
    pub mean_correlation: Option<f64>,
    pub quality: Quality,
}

/// Score every feature by how much its raters agree with each other,
/// weakest first.
///
/// For each feature the rater × rater correlation matrix is reduced to
/// one number: the mean of its upper triangle. Features whose score is
/// undefined sort after all scored ones; ties break on the feature name
/// so the ranking is reproducible.
pub fn sort_features_by_consistency(
    by_feature: &RatingsByFeature,
) -> Result<Vec<FeatureConsistency>> {
    let mut results = Vec::with_capacity(by_feature.features.len());
    for feature in &by_feature.features {
        let Some(ratings) = by_feature.matrix(feature) else {
            continue;
        };
        let rater_vs_rater = corrcoef(ratings)?;
        let score = nanmean(&upper_triangle(&rater_vs_rater, 1)?);
        results.push(FeatureConsistency {
            feature: feature.clone(),
            mean_correlation: score,
            quality: Quality::from_score(score),
        });
    }
    results.sort_by(|a, b| {
        cmp_score_ascending(a.mean_correlation, b.mean_correlation)
            .then_with(|| a.feature.cmp(&b.feature))
    });
    Ok(results)
}

// ---------------------------------------------------------------------------
// Rater agreement
// ---------------------------------------------------------------------------

/// One rater's agreement with the other raters on one feature.
#[derive(Debug, Clone, Serialize)]
pub struct FeatureRaterScore {
    pub feature: String,
    pub rater: String,
    /// `(row sum - 1) / (n - 1)` over the rater's correlation row;
    /// `None` as soon as any pairing in the row is undefined.
    pub score: Option<f64>,
}

/// One rater's cross-feature summary.
#[derive(Debug, Clone, Serialize)]
pub struct RaterScore {
    pub rater: String,
    pub kind: RaterKind,
    /// Mean of the rater's per-feature scores, undefined features dropped.
    pub mean_agreement: Option<f64>,
    pub quality: Quality,
}

/// Full rater agreement analysis.
#[derive(Debug, Clone, Serialize)]
pub struct RaterAgreement {
    /// Sorted worker ids; indexes every matrix row and column.
    pub raters: Vec<String>,
    /// One entry per (feature, rater) combination, feature-major.
    pub per_feature: Vec<FeatureRaterScore>,
    /// Rater × rater correlation matrix per feature, in feature order.
    pub feature_matrices: Vec<Matrix>,
    /// Cell-wise average of `feature_matrices`.
    pub mean_matrix: Matrix,
    /// Cross-feature summary per rater, weakest first.
    pub summary: Vec<RaterScore>,
    /// Features where every rater's score is undefined. They carry no
    /// discriminating signal and are already excluded from the means.
    pub zero_variance_features: Vec<String>,
}

/// How well each rater agrees with the others, per feature and overall.
pub fn compute_rater_agreement(by_feature: &RatingsByFeature) -> Result<RaterAgreement> {
    let raters = by_feature.raters.clone();
    let n = raters.len();

    let mut per_feature = Vec::new();
    let mut matrices = Vec::new();
    let mut zero_variance_features = Vec::new();

    for feature in &by_feature.features {
        let Some(ratings) = by_feature.matrix(feature) else {
            continue;
        };
        let rater_vs_rater = corrcoef(ratings)?;
        let scores: Vec<Option<f64>> =
            (0..n).map(|i| row_agreement(&rater_vs_rater[i])).collect();

        if n > 0 && scores.iter().all(Option::is_none) {
            zero_variance_features.push(feature.clone());
        }
        for (rater, score) in raters.iter().zip(&scores) {
            per_feature.push(FeatureRaterScore {
                feature: feature.clone(),
                rater: rater.clone(),
                score: *score,
            });
        }
        matrices.push(rater_vs_rater);
    }

    let mean_matrix = average_matrices(&matrices)?;

    let mut summary: Vec<RaterScore> = raters
        .iter()
        .map(|rater| {
            let scores: Vec<Option<f64>> = per_feature
                .iter()
                .filter(|s| &s.rater == rater)
                .map(|s| s.score)
                .collect();
            let mean_agreement = nanmean(&scores);
            RaterScore {
                rater: rater.clone(),
                kind: RaterKind::classify(rater),
                mean_agreement,
                quality: Quality::from_score(mean_agreement),
            }
        })
        .collect();
    summary.sort_by(|a, b| {
        cmp_score_ascending(a.mean_agreement, b.mean_agreement).then_with(|| a.rater.cmp(&b.rater))
    });

    Ok(RaterAgreement {
        raters,
        per_feature,
        feature_matrices: matrices,
        mean_matrix,
        summary,
        zero_variance_features,
    })
}

/// Average correlation of one rater with every *other* rater, given their
/// row of the rater × rater matrix. The guaranteed 1.0 self-correlation
/// is subtracted out rather than skipped, matching the matrix row layout.
fn row_agreement(row: &[Option<f64>]) -> Option<f64> {
    let n = row.len();
    if n < 2 {
        return None;
    }
    let mut sum = 0.0;
    for cell in row {
        sum += (*cell)?;
    }
    Some((sum - 1.0) / (n as f64 - 1.0))
}

/// Element-wise mean over a list of equally sized square matrices,
/// undefined cells dropped per position. All matrices must share one
/// dimension; a ragged input fails with [`Error::DimensionMismatch`].
pub fn average_matrices(matrices: &[Matrix]) -> Result<Matrix> {
    let Some(first) = matrices.first() else {
        return Ok(Vec::new());
    };
    let n = first.len();
    for matrix in matrices {
        if matrix.len() != n {
            return Err(Error::DimensionMismatch {
                expected: n,
                found: matrix.len(),
            });
        }
        for row in matrix {
            if row.len() != n {
                return Err(Error::DimensionMismatch {
                    expected: n,
                    found: row.len(),
                });
            }
        }
    }

    let mut avg: Matrix = vec![vec![None; n]; n];
    for i in 0..n {
        for j in 0..n {
            let cells: Vec<Option<f64>> = matrices.iter().map(|m| m[i][j]).collect();
            avg[i][j] = nanmean(&cells);
        }
    }
    Ok(avg)
}

// ---------------------------------------------------------------------------
// Pairwise redundancy / similarity
// ---------------------------------------------------------------------------

/// Direction of a defined correlation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Sign {
    Positive,
    Negative,
}

impl fmt::Display for Sign {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Sign::Positive => write!(f, "positive"),
            Sign::Negative => write!(f, "negative"),
        }
    }
}

/// One unordered pair from a correlation matrix, with the derived values
/// both sort orders need.
#[derive(Debug, Clone, Serialize)]
pub struct CorrelationPair {
    pub a: String,
    pub b: String,
    pub correlation: Option<f64>,
    pub abs_correlation: Option<f64>,
    /// Proportion of variance explained, `correlation²`.
    pub r_squared: Option<f64>,
    pub sign: Option<Sign>,
}

impl CorrelationPair {
    fn new(a: String, b: String, r: Option<f64>) -> Self {
        CorrelationPair {
            a,
            b,
            correlation: r,
            abs_correlation: r.map(f64::abs),
            r_squared: r.map(|v| v * v),
            sign: r.map(|v| if v > 0.0 { Sign::Positive } else { Sign::Negative }),
        }
    }

    /// Display label, e.g. `"size vs weight"`.
    pub fn label(&self) -> String {
        format!("{} vs {}", self.a, self.b)
    }
}

/// Available pair orderings. Both work off values stored on the pair, so
/// switching order never recomputes a correlation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PairOrder {
    /// Weakest relationships first (the default table order).
    RSquaredAscending,
    /// Strongest relationships first.
    AbsCorrelationDescending,
}

/// Re-sort a pair list in place. Undefined correlations go last in both
/// orders; ties break on the pair labels.
pub fn sort_pairs(pairs: &mut [CorrelationPair], order: PairOrder) {
    match order {
        PairOrder::RSquaredAscending => pairs.sort_by(|x, y| {
            cmp_score_ascending(x.r_squared, y.r_squared)
                .then_with(|| x.a.cmp(&y.a))
                .then_with(|| x.b.cmp(&y.b))
        }),
        PairOrder::AbsCorrelationDescending => pairs.sort_by(|x, y| {
            cmp_score_descending(x.abs_correlation, y.abs_correlation)
                .then_with(|| x.a.cmp(&y.a))
                .then_with(|| x.b.cmp(&y.b))
        }),
    }
}

fn pairs_from_matrix(labels: &[String], matrix: &Matrix) -> Vec<CorrelationPair> {
    let mut pairs: Vec<CorrelationPair> = triu_indices(labels.len(), 1)
        .into_iter()
        .map(|(i, j)| CorrelationPair::new(labels[i].clone(), labels[j].clone(), matrix[i][j]))
        .collect();
    sort_pairs(&mut pairs, PairOrder::RSquaredAscending);
    pairs
}

/// All unordered feature pairs with their correlation, weakest first.
/// High `r_squared` pairs measure the same underlying dimension twice.
pub fn feature_redundancy(table: &RatingTable) -> Result<Vec<CorrelationPair>> {
    let fc = feature_vs_feature(table)?;
    Ok(pairs_from_matrix(&fc.features, &fc.matrix))
}

/// All unordered item pairs with their correlation, weakest first.
/// High-correlation pairs are items the feature set cannot tell apart.
pub fn item_similarity(table: &RatingTable) -> Result<Vec<CorrelationPair>> {
    let ic = item_vs_item(table)?;
    Ok(pairs_from_matrix(&ic.items, &ic.matrix))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::Observation;
    use crate::stats::reshape::ratings_by_feature;
    use std::collections::BTreeMap;

    fn obs(worker: &str, item: &str, feature: &str, rating: f64) -> Observation {
        Observation {
            worker_id: worker.to_string(),
            item_name: item.to_string(),
            feature_name: feature.to_string(),
            rating: Some(rating),
            rating_scaled: None,
            rating_scaled_max: None,
            extra: BTreeMap::new(),
        }
    }

    /// Table where each rater rates each item with the given values, one
    /// vector per rater, for a single feature.
    fn feature_table(feature: &str, raters: &[(&str, &[f64])], items: &[&str]) -> Vec<Observation> {
        let mut rows = Vec::new();
        for (worker, values) in raters {
            for (item, value) in items.iter().zip(values.iter()) {
                rows.push(obs(worker, item, feature, *value));
            }
        }
        rows
    }

    #[test]
    fn quality_bands() {
        assert_eq!(Quality::from_score(Some(0.9)), Quality::Excellent);
        assert_eq!(Quality::from_score(Some(0.7)), Quality::Excellent);
        assert_eq!(Quality::from_score(Some(0.5)), Quality::Good);
        assert_eq!(Quality::from_score(Some(0.3)), Quality::Fair);
        assert_eq!(Quality::from_score(Some(0.1)), Quality::Poor);
        assert_eq!(Quality::from_score(Some(-0.4)), Quality::Poor);
        assert_eq!(Quality::from_score(None), Quality::NoVariance);
    }

    #[test]
    fn consistent_raters_score_one() {
        let rows = feature_table(
            "size",
            &[("w1", &[1.0, 2.0, 3.0]), ("w2", &[2.0, 4.0, 6.0])],
            &["ant", "cat", "dog"],
        );
        let table = RatingTable::from_rows(rows);
        let ranked = sort_features_by_consistency(&ratings_by_feature(&table)).unwrap();

        assert_eq!(ranked.len(), 1);
        let score = ranked[0].mean_correlation.unwrap();
        assert!((score - 1.0).abs() < 1e-12);
        assert_eq!(ranked[0].quality, Quality::Excellent);
    }

    #[test]
    fn weakest_features_rank_first_and_undefined_last() {
        let mut rows = feature_table(
            "agree",
            &[("w1", &[1.0, 2.0, 3.0]), ("w2", &[1.0, 2.0, 3.0])],
            &["ant", "cat", "dog"],
        );
        rows.extend(feature_table(
            "disagree",
            &[("w1", &[1.0, 2.0, 3.0]), ("w2", &[3.0, 2.0, 1.0])],
            &["ant", "cat", "dog"],
        ));
        // Every rating identical: zero variance, undefined score.
        rows.extend(feature_table(
            "flat",
            &[("w1", &[5.0, 5.0, 5.0]), ("w2", &[5.0, 5.0, 5.0])],
            &["ant", "cat", "dog"],
        ));
        let table = RatingTable::from_rows(rows);
        let ranked = sort_features_by_consistency(&ratings_by_feature(&table)).unwrap();

        let order: Vec<&str> = ranked.iter().map(|r| r.feature.as_str()).collect();
        assert_eq!(order, vec!["disagree", "agree", "flat"]);
        assert_eq!(ranked[2].mean_correlation, None);
        assert_eq!(ranked[2].quality, Quality::NoVariance);
    }

    #[test]
    fn agreement_scores_average_the_other_raters() {
        // Three raters in perfect agreement: every row of the rater
        // matrix is [1, 1, 1], so each score is (3 - 1) / 2 = 1.
        let rows = feature_table(
            "size",
            &[
                ("w1", &[1.0, 2.0, 3.0]),
                ("w2", &[2.0, 4.0, 6.0]),
                ("w3", &[3.0, 6.0, 9.0]),
            ],
            &["ant", "cat", "dog"],
        );
        let table = RatingTable::from_rows(rows);
        let agreement = compute_rater_agreement(&ratings_by_feature(&table)).unwrap();

        assert_eq!(agreement.raters, vec!["w1", "w2", "w3"]);
        assert_eq!(agreement.per_feature.len(), 3);
        for entry in &agreement.per_feature {
            let score = entry.score.unwrap();
            assert!((score - 1.0).abs() < 1e-12);
        }
        assert!(agreement.zero_variance_features.is_empty());
    }

    #[test]
    fn one_flat_rater_poisons_every_row_of_that_feature() {
        // w3 rates everything 5: their correlation with anyone is
        // undefined, which makes every rater's plain row sum undefined.
        let rows = feature_table(
            "size",
            &[
                ("w1", &[1.0, 2.0, 3.0]),
                ("w2", &[2.0, 4.0, 6.0]),
                ("w3", &[5.0, 5.0, 5.0]),
            ],
            &["ant", "cat", "dog"],
        );
        let table = RatingTable::from_rows(rows);
        let agreement = compute_rater_agreement(&ratings_by_feature(&table)).unwrap();

        for entry in &agreement.per_feature {
            assert_eq!(entry.score, None);
        }
        assert_eq!(agreement.zero_variance_features, vec!["size"]);
        for rater in &agreement.summary {
            assert_eq!(rater.mean_agreement, None);
            assert_eq!(rater.quality, Quality::NoVariance);
        }
    }

    #[test]
    fn summary_skips_undefined_features() {
        // "good" scores 1.0 for everyone; "flat" is undefined and must
        // not drag the cross-feature mean down.
        let mut rows = feature_table(
            "good",
            &[("w1", &[1.0, 2.0, 3.0]), ("w2", &[2.0, 4.0, 6.0])],
            &["ant", "cat", "dog"],
        );
        rows.extend(feature_table(
            "flat",
            &[("w1", &[5.0, 5.0, 5.0]), ("w2", &[5.0, 5.0, 5.0])],
            &["ant", "cat", "dog"],
        ));
        let table = RatingTable::from_rows(rows);
        let agreement = compute_rater_agreement(&ratings_by_feature(&table)).unwrap();

        assert_eq!(agreement.zero_variance_features, vec!["flat"]);
        for rater in &agreement.summary {
            let score = rater.mean_agreement.unwrap();
            assert!((score - 1.0).abs() < 1e-12);
            assert_eq!(rater.quality, Quality::Excellent);
        }
    }

    #[test]
    fn summary_classifies_and_sorts_weakest_first() {
        // w_human tracks gpt-4o perfectly; A99 is noisier.
        let rows = feature_table(
            "size",
            &[
                ("gpt-4o", &[1.0, 2.0, 3.0, 4.0]),
                ("w_human", &[1.0, 2.0, 3.0, 4.0]),
                ("A99", &[2.0, 1.0, 4.0, 3.0]),
            ],
            &["ant", "cat", "dog", "eel"],
        );
        let table = RatingTable::from_rows(rows);
        let agreement = compute_rater_agreement(&ratings_by_feature(&table)).unwrap();

        assert_eq!(agreement.summary[0].rater, "A99");
        assert_eq!(agreement.summary[0].kind, RaterKind::Human);
        let llm = agreement
            .summary
            .iter()
            .find(|r| r.rater == "gpt-4o")
            .unwrap();
        assert_eq!(llm.kind, RaterKind::Llm);
        assert!(llm.mean_agreement.unwrap() > agreement.summary[0].mean_agreement.unwrap());
    }

    #[test]
    fn agreement_keeps_one_rater_matrix_per_feature() {
        let mut rows = feature_table(
            "agree",
            &[("w1", &[1.0, 2.0, 3.0]), ("w2", &[2.0, 4.0, 6.0])],
            &["ant", "cat", "dog"],
        );
        rows.extend(feature_table(
            "invert",
            &[("w1", &[1.0, 2.0, 3.0]), ("w2", &[3.0, 2.0, 1.0])],
            &["ant", "cat", "dog"],
        ));
        let table = RatingTable::from_rows(rows);
        let agreement = compute_rater_agreement(&ratings_by_feature(&table)).unwrap();

        // One matrix per feature, each raters x raters with the diagonal
        // pinned, in feature order: agree then invert.
        assert_eq!(agreement.feature_matrices.len(), 2);
        for matrix in &agreement.feature_matrices {
            assert_eq!(matrix.len(), 2);
            assert_eq!(matrix[0][0], Some(1.0));
            assert_eq!(matrix[1][1], Some(1.0));
        }
        assert!((agreement.feature_matrices[0][0][1].unwrap() - 1.0).abs() < 1e-12);
        assert!((agreement.feature_matrices[1][0][1].unwrap() + 1.0).abs() < 1e-12);

        // The averaged matrix is the cell-wise mean of the retained ones.
        assert!(agreement.mean_matrix[0][1].unwrap().abs() < 1e-12);
    }

    #[test]
    fn averaging_matrices_cell_by_cell() {
        let a: Matrix = vec![
            vec![Some(1.0), Some(0.5)],
            vec![Some(0.5), Some(1.0)],
        ];
        let b: Matrix = vec![
            vec![Some(1.0), Some(0.3)],
            vec![Some(0.3), Some(1.0)],
        ];
        let avg = average_matrices(&[a, b]).unwrap();
        assert_eq!(avg[0][0], Some(1.0));
        let cell = avg[0][1].unwrap();
        assert!((cell - 0.4).abs() < 1e-12);
    }

    #[test]
    fn averaging_skips_undefined_cells() {
        let a: Matrix = vec![vec![Some(1.0), None], vec![None, Some(1.0)]];
        let b: Matrix = vec![vec![Some(1.0), Some(0.6)], vec![Some(0.6), Some(1.0)]];
        let avg = average_matrices(&[a, b]).unwrap();
        assert_eq!(avg[0][1], Some(0.6));

        let all_none: Matrix = vec![vec![Some(1.0), None], vec![None, Some(1.0)]];
        let avg = average_matrices(&[all_none.clone(), all_none]).unwrap();
        assert_eq!(avg[0][1], None);
    }

    #[test]
    fn averaging_rejects_mismatched_shapes() {
        let a: Matrix = vec![vec![Some(1.0)]];
        let b: Matrix = vec![vec![Some(1.0), None], vec![None, Some(1.0)]];
        assert!(average_matrices(&[a, b]).is_err());
        assert!(average_matrices(&[]).unwrap().is_empty());
    }

    #[test]
    fn anti_correlated_features_are_fully_redundant() {
        let mut rows = feature_table(
            "open",
            &[("w1", &[1.0, 0.0, 1.0, 0.0])],
            &["ant", "cat", "dog", "eel"],
        );
        rows.extend(feature_table(
            "shut",
            &[("w1", &[0.0, 1.0, 0.0, 1.0])],
            &["ant", "cat", "dog", "eel"],
        ));
        let table = RatingTable::from_rows(rows);
        let pairs = feature_redundancy(&table).unwrap();

        assert_eq!(pairs.len(), 1);
        let pair = &pairs[0];
        assert_eq!(pair.label(), "open vs shut");
        assert!((pair.correlation.unwrap() + 1.0).abs() < 1e-12);
        assert!((pair.abs_correlation.unwrap() - 1.0).abs() < 1e-12);
        assert!((pair.r_squared.unwrap() - 1.0).abs() < 1e-12);
        assert_eq!(pair.sign, Some(Sign::Negative));
    }

    #[test]
    fn pair_orders_share_one_computation() {
        let mut pairs = vec![
            CorrelationPair::new("a".into(), "b".into(), Some(0.9)),
            CorrelationPair::new("a".into(), "c".into(), Some(-0.2)),
            CorrelationPair::new("b".into(), "c".into(), None),
        ];

        sort_pairs(&mut pairs, PairOrder::RSquaredAscending);
        let labels: Vec<String> = pairs.iter().map(|p| p.label()).collect();
        assert_eq!(labels, vec!["a vs c", "a vs b", "b vs c"]);

        sort_pairs(&mut pairs, PairOrder::AbsCorrelationDescending);
        let labels: Vec<String> = pairs.iter().map(|p| p.label()).collect();
        assert_eq!(labels, vec!["a vs b", "a vs c", "b vs c"]);
    }

    #[test]
    fn item_pairs_come_from_averaged_feature_vectors() {
        let mut rows = Vec::new();
        // cat and dog get identical feature profiles; eel is inverted.
        for (feature, cat, dog, eel) in [
            ("size", 1.0, 1.0, 3.0),
            ("legs", 2.0, 2.0, 2.0),
            ("fur", 3.0, 3.0, 1.0),
        ] {
            rows.push(obs("w1", "cat", feature, cat));
            rows.push(obs("w1", "dog", feature, dog));
            rows.push(obs("w1", "eel", feature, eel));
        }
        let table = RatingTable::from_rows(rows);
        let mut pairs = item_similarity(&table).unwrap();

        sort_pairs(&mut pairs, PairOrder::AbsCorrelationDescending);
        assert_eq!(pairs[0].label(), "cat vs dog");
        assert!((pairs[0].correlation.unwrap() - 1.0).abs() < 1e-12);
        let cat_eel = pairs.iter().find(|p| p.label() == "cat vs eel").unwrap();
        assert!((cat_eel.correlation.unwrap() + 1.0).abs() < 1e-12);
    }
}
