use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;

use crate::data::filter::drop_incomplete_raters;
use crate::data::model::{columns, RaterKind, RatingTable};
use crate::error::Result;
use crate::stats::aggregate::{
    compute_rater_agreement, feature_redundancy, item_similarity, sort_features_by_consistency,
    CorrelationPair, FeatureConsistency, RaterAgreement,
};
use crate::stats::reshape::{self, RatingsByFeature};

// ---------------------------------------------------------------------------
// Analysis session
// ---------------------------------------------------------------------------

/// One analysis run over a loaded rating table.
///
/// The session owns the raw table and derives a working table from it:
/// incomplete raters removed at ingest, plus any raters excluded by hand
/// afterwards. Every exclusion change rebuilds the working table from the
/// source and invalidates the cached pivot, so each analysis call sees one
/// consistent snapshot and nothing ever mutates a table in place.
pub struct AnalysisSession {
    /// Rows as loaded, before any exclusion.
    source: RatingTable,
    /// Raters removed automatically for incomplete coverage, sorted.
    dropped_raters: Vec<String>,
    /// Highest per-rater observation count in the source.
    max_count: usize,
    /// Observation count per rater in the source.
    rater_counts: BTreeMap<String, usize>,
    /// Raters excluded by hand on top of the automatic drop.
    excluded: BTreeSet<String>,
    /// Working table: source minus dropped and excluded raters.
    table: RatingTable,
    /// Cached per-feature pivot of the working table.
    by_feature: Option<RatingsByFeature>,
}

impl AnalysisSession {
    /// Start a session, removing raters with incomplete coverage.
    pub fn new(source: RatingTable) -> Self {
        Self::build(source, true)
    }

    /// Start a session keeping every rater, incomplete ones included.
    pub fn keep_all_raters(source: RatingTable) -> Self {
        Self::build(source, false)
    }

    fn build(source: RatingTable, drop_incomplete: bool) -> Self {
        let report = drop_incomplete_raters(&source);
        let dropped_raters = if drop_incomplete {
            report.dropped
        } else {
            Vec::new()
        };
        let mut session = AnalysisSession {
            source,
            dropped_raters,
            max_count: report.max_count,
            rater_counts: report.rater_counts,
            excluded: BTreeSet::new(),
            table: RatingTable::default(),
            by_feature: None,
        };
        session.rebuild();
        session
    }

    /// Rebuild the working table from the source and the exclusion sets.
    fn rebuild(&mut self) {
        let dropped = &self.dropped_raters;
        let excluded = &self.excluded;
        self.table = self.source.filter(|row| {
            dropped.binary_search(&row.worker_id).is_err() && !excluded.contains(&row.worker_id)
        });
        self.by_feature = None;
    }

    // -- Accessors --

    /// The current working table.
    pub fn table(&self) -> &RatingTable {
        &self.table
    }

    /// The table as loaded, before any exclusion.
    pub fn source(&self) -> &RatingTable {
        &self.source
    }

    /// Raters removed automatically at ingest.
    pub fn dropped_raters(&self) -> &[String] {
        &self.dropped_raters
    }

    /// Raters currently excluded by hand.
    pub fn excluded_raters(&self) -> &BTreeSet<String> {
        &self.excluded
    }

    // -- Exclusion toggling --

    /// Exclude a rater from every subsequent analysis.
    pub fn exclude_rater(&mut self, worker: &str) {
        if self.excluded.insert(worker.to_string()) {
            self.rebuild();
        }
    }

    /// Bring a manually excluded rater back.
    pub fn restore_rater(&mut self, worker: &str) {
        if self.excluded.remove(worker) {
            self.rebuild();
        }
    }

    /// Flip a rater between excluded and included.
    pub fn toggle_rater(&mut self, worker: &str) {
        if self.excluded.contains(worker) {
            self.restore_rater(worker);
        } else {
            self.exclude_rater(worker);
        }
    }

    // -- Analyses over the current table --

    /// The per-feature rater × item pivot, cached until the next
    /// exclusion change.
    pub fn ratings_by_feature(&mut self) -> &RatingsByFeature {
        let table = &self.table;
        self.by_feature
            .get_or_insert_with(|| reshape::ratings_by_feature(table))
    }

    /// Feature reliability ranking, weakest first.
    pub fn feature_consistency(&mut self) -> Result<Vec<FeatureConsistency>> {
        sort_features_by_consistency(self.ratings_by_feature())
    }

    /// Rater agreement analysis.
    pub fn rater_agreement(&mut self) -> Result<RaterAgreement> {
        compute_rater_agreement(self.ratings_by_feature())
    }

    /// Feature redundancy pairs, weakest first.
    pub fn feature_redundancy(&self) -> Result<Vec<CorrelationPair>> {
        feature_redundancy(&self.table)
    }

    /// Item similarity pairs, weakest first.
    pub fn item_similarity(&self) -> Result<Vec<CorrelationPair>> {
        item_similarity(&self.table)
    }

    /// Headline counts for the current working table.
    pub fn summary(&self) -> DataSummary {
        let raters = self.table.unique_strings(columns::WORKER_ID);
        let n_llm_raters = raters
            .iter()
            .filter(|r| RaterKind::classify(r) == RaterKind::Llm)
            .count();

        let category_counts = if self
            .table
            .column_names
            .iter()
            .any(|c| c == "itemCategory")
        {
            self.table
                .group_by("itemCategory")
                .counts()
                .into_iter()
                .map(|(k, v)| (k.to_string(), v))
                .collect()
        } else {
            BTreeMap::new()
        };

        DataSummary {
            n_items: self.table.unique(columns::ITEM_NAME).len(),
            n_features: self.table.unique(columns::FEATURE_NAME).len(),
            n_llm_raters,
            n_human_raters: raters.len() - n_llm_raters,
            n_raters: raters.len(),
            n_observations: self.table.len(),
            max_count: self.max_count,
            rater_counts: self.rater_counts.clone(),
            dropped_raters: self.dropped_raters.clone(),
            excluded_raters: self.excluded.iter().cloned().collect(),
            category_counts,
        }
    }
}

// ---------------------------------------------------------------------------
// DataSummary
// ---------------------------------------------------------------------------

/// Headline counts of a session's working table.
#[derive(Debug, Clone, Serialize)]
pub struct DataSummary {
    pub n_items: usize,
    pub n_features: usize,
    pub n_raters: usize,
    pub n_llm_raters: usize,
    pub n_human_raters: usize,
    pub n_observations: usize,
    /// Highest per-rater observation count in the source table.
    pub max_count: usize,
    /// Observation count per rater in the source table.
    pub rater_counts: BTreeMap<String, usize>,
    pub dropped_raters: Vec<String>,
    pub excluded_raters: Vec<String>,
    /// Observations per item category, when the column is present.
    pub category_counts: BTreeMap<String, usize>,
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
