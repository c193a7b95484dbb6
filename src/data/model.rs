use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use serde::Serialize;

// ---------------------------------------------------------------------------
// CellValue – a single cell in a table column
// ---------------------------------------------------------------------------

/// A dynamically-typed cell value for schema-less table columns.
/// Using `BTreeMap` / `BTreeSet` downstream so `CellValue` must be `Ord`.
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    String(String),
    Integer(i64),
    Float(f64),
    Bool(bool),
    Null,
}

// -- Manual Eq/Ord so we can put CellValue in BTreeSet --

impl Eq for CellValue {}

impl PartialOrd for CellValue {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for CellValue {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        use CellValue::*;
        fn discriminant(v: &CellValue) -> u8 {
            match v {
                Null => 0,
                Bool(_) => 1,
                Integer(_) => 2,
                Float(_) => 3,
                String(_) => 4,
            }
        }
        let da = discriminant(self);
        let db = discriminant(other);
        if da != db {
            return da.cmp(&db);
        }
        match (self, other) {
            (Null, Null) => std::cmp::Ordering::Equal,
            (Bool(a), Bool(b)) => a.cmp(b),
            (Integer(a), Integer(b)) => a.cmp(b),
            (Float(a), Float(b)) => a.total_cmp(b),
            (String(a), String(b)) => a.cmp(b),
            _ => std::cmp::Ordering::Equal,
        }
    }
}

impl std::hash::Hash for CellValue {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        std::mem::discriminant(self).hash(state);
        match self {
            CellValue::String(s) => s.hash(state),
            CellValue::Integer(i) => i.hash(state),
            CellValue::Float(f) => f.to_bits().hash(state),
            CellValue::Bool(b) => b.hash(state),
            CellValue::Null => {}
        }
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::String(s) => write!(f, "{s}"),
            CellValue::Integer(i) => write!(f, "{i}"),
            CellValue::Float(v) => write!(f, "{v:.4}"),
            CellValue::Bool(b) => write!(f, "{b}"),
            CellValue::Null => write!(f, "<null>"),
        }
    }
}

impl CellValue {
    /// Try to interpret the value as an `f64`. Numeric-looking strings
    /// coerce too, since rating columns may arrive untyped from CSV.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            CellValue::Float(v) => Some(*v),
            CellValue::Integer(i) => Some(*i as f64),
            CellValue::String(s) => s.trim().parse::<f64>().ok(),
            _ => None,
        }
    }
}

impl From<&str> for CellValue {
    fn from(s: &str) -> Self {
        CellValue::String(s.to_string())
    }
}

impl From<String> for CellValue {
    fn from(s: String) -> Self {
        CellValue::String(s)
    }
}

impl From<i64> for CellValue {
    fn from(i: i64) -> Self {
        CellValue::Integer(i)
    }
}

impl From<f64> for CellValue {
    fn from(v: f64) -> Self {
        CellValue::Float(v)
    }
}

impl From<bool> for CellValue {
    fn from(b: bool) -> Self {
        CellValue::Bool(b)
    }
}

// ---------------------------------------------------------------------------
// Column names shared by the loader and the analyses
// ---------------------------------------------------------------------------

/// Canonical column names as they appear in source tables.
pub mod columns {
    pub const WORKER_ID: &str = "workerId";
    pub const ITEM_NAME: &str = "itemName";
    pub const FEATURE_NAME: &str = "featureName";
    pub const RATING: &str = "rating";
    pub const RATING_SCALED: &str = "ratingsScaled";
    pub const RATING_SCALED_MAX: &str = "ratingsScaledMax";
}

// ---------------------------------------------------------------------------
// Observation – one row of the table
// ---------------------------------------------------------------------------

/// A single rating observation (one row of the source table).
///
/// The three identity fields plus the rating values form the canonical
/// schema; every other source column is kept untyped in `extra` so tables
/// with arbitrary additional columns pass through untouched.
#[derive(Debug, Clone)]
pub struct Observation {
    /// Rater identifier: a human worker id or an LLM model name.
    pub worker_id: String,
    /// Rated noun.
    pub item_name: String,
    /// Semantic dimension being rated. Checklist features arrive already
    /// exploded into one name per option.
    pub feature_name: String,
    /// Raw rating value (0/1 for yes-no and checklist, integer for scale).
    pub rating: Option<f64>,
    /// Rating normalized to [0,1] via the feature type's min/max bounds.
    pub rating_scaled: Option<f64>,
    /// Alternate normalization: raw rating divided by the type's max bound.
    pub rating_scaled_max: Option<f64>,
    /// Dynamic columns: column_name → value (year, groupName, itemCategory, ...).
    pub extra: BTreeMap<String, CellValue>,
}

impl Observation {
    /// Look up any column by its source name, canonical fields included.
    /// Unknown or absent columns yield `None` rather than an error.
    pub fn get(&self, column: &str) -> Option<CellValue> {
        match column {
            columns::WORKER_ID => Some(CellValue::String(self.worker_id.clone())),
            columns::ITEM_NAME => Some(CellValue::String(self.item_name.clone())),
            columns::FEATURE_NAME => Some(CellValue::String(self.feature_name.clone())),
            columns::RATING => self.rating.map(CellValue::Float),
            columns::RATING_SCALED => self.rating_scaled.map(CellValue::Float),
            columns::RATING_SCALED_MAX => self.rating_scaled_max.map(CellValue::Float),
            other => self.extra.get(other).cloned(),
        }
    }

    /// The value the analyses consume: the scaled rating when present,
    /// otherwise the raw rating.
    pub fn scaled_or_raw(&self) -> Option<f64> {
        self.rating_scaled.or(self.rating)
    }

    /// Iterate over every present cell as (column_name, value).
    pub fn cells(&self) -> impl Iterator<Item = (&str, CellValue)> + '_ {
        let canonical = [
            columns::WORKER_ID,
            columns::ITEM_NAME,
            columns::FEATURE_NAME,
            columns::RATING,
            columns::RATING_SCALED,
            columns::RATING_SCALED_MAX,
        ]
        .into_iter()
        .filter_map(|col| self.get(col).map(|v| (col, v)));

        canonical.chain(self.extra.iter().map(|(k, v)| (k.as_str(), v.clone())))
    }
}

// ---------------------------------------------------------------------------
// RatingTable – the complete observation table
// ---------------------------------------------------------------------------

/// The full observation table with pre-computed column indices.
///
/// Every filtering operation returns a brand-new table with rebuilt
/// indices; nothing mutates in place, so an analysis holding
/// `&RatingTable` always sees a consistent snapshot.
#[derive(Debug, Clone, Default)]
pub struct RatingTable {
    /// All observations (rows), in source order.
    rows: Vec<Observation>,
    /// Ordered list of column names present in at least one row.
    pub column_names: Vec<String>,
    /// For each column the sorted set of unique values.
    pub unique_values: BTreeMap<String, BTreeSet<CellValue>>,
}

impl RatingTable {
    /// Build column indices from the given rows.
    pub fn from_rows(rows: Vec<Observation>) -> Self {
        let mut column_names_set: BTreeSet<String> = BTreeSet::new();
        let mut unique_values: BTreeMap<String, BTreeSet<CellValue>> = BTreeMap::new();

        for row in &rows {
            for (col, val) in row.cells() {
                column_names_set.insert(col.to_string());
                unique_values.entry(col.to_string()).or_default().insert(val);
            }
        }
        let column_names: Vec<String> = column_names_set.into_iter().collect();
        RatingTable {
            rows,
            column_names,
            unique_values,
        }
    }

    /// Number of observations.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether the table is empty.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// All rows in source order.
    pub fn rows(&self) -> &[Observation] {
        &self.rows
    }

    /// Sorted distinct values of `column`. The order is total and stable
    /// between calls on the same data; matrix row/column correspondence
    /// downstream depends on it. Unknown columns yield an empty list.
    pub fn unique(&self, column: &str) -> Vec<CellValue> {
        self.unique_values
            .get(column)
            .map(|set| set.iter().cloned().collect())
            .unwrap_or_default()
    }

    /// Sorted distinct values of `column` as display strings, the form
    /// used for matrix row/column labels.
    pub fn unique_strings(&self, column: &str) -> Vec<String> {
        self.unique(column).iter().map(|v| v.to_string()).collect()
    }

    /// New table containing only the rows satisfying `predicate`.
    pub fn filter<F>(&self, predicate: F) -> RatingTable
    where
        F: Fn(&Observation) -> bool,
    {
        RatingTable::from_rows(self.rows.iter().filter(|r| predicate(r)).cloned().collect())
    }

    /// New table of rows matching *all* given column conditions. An empty
    /// condition list matches everything. A row without the conditioned
    /// column never matches.
    pub fn subset(&self, conditions: &[(&str, Match)]) -> RatingTable {
        self.filter(|row| {
            conditions.iter().all(|(col, m)| match row.get(col) {
                Some(value) => m.matches(&value),
                None => false,
            })
        })
    }

    /// First `n` rows as a new table.
    pub fn head(&self, n: usize) -> RatingTable {
        RatingTable::from_rows(self.rows.iter().take(n).cloned().collect())
    }

    /// One entry per row: the row's value for `column`, `None` where absent.
    pub fn column(&self, name: &str) -> Vec<Option<CellValue>> {
        self.rows.iter().map(|r| r.get(name)).collect()
    }

    /// Partition rows into groups keyed by their value for `column`.
    /// Rows without the column group under [`CellValue::Null`].
    pub fn group_by(&self, column: &str) -> GroupedTable {
        let mut groups: BTreeMap<CellValue, Vec<Observation>> = BTreeMap::new();
        for row in &self.rows {
            let key = row.get(column).unwrap_or(CellValue::Null);
            groups.entry(key).or_default().push(row.clone());
        }
        GroupedTable {
            column: column.to_string(),
            groups,
        }
    }
}

// ---------------------------------------------------------------------------
// Match – a per-column subset condition
// ---------------------------------------------------------------------------

/// Condition for [`RatingTable::subset`]: either an exact value or set
/// membership.
#[derive(Debug, Clone)]
pub enum Match {
    Value(CellValue),
    AnyOf(BTreeSet<CellValue>),
}

impl Match {
    pub fn value(v: impl Into<CellValue>) -> Self {
        Match::Value(v.into())
    }

    pub fn any_of<T: Into<CellValue>>(values: impl IntoIterator<Item = T>) -> Self {
        Match::AnyOf(values.into_iter().map(Into::into).collect())
    }

    fn matches(&self, value: &CellValue) -> bool {
        match self {
            Match::Value(v) => v == value,
            Match::AnyOf(set) => set.contains(value),
        }
    }
}

// ---------------------------------------------------------------------------
// GroupedTable – result of group_by
// ---------------------------------------------------------------------------

/// Rows partitioned by the value of one column. Each source row appears in
/// exactly one group.
#[derive(Debug, Clone)]
pub struct GroupedTable {
    /// The column the grouping was keyed on.
    pub column: String,
    groups: BTreeMap<CellValue, Vec<Observation>>,
}

impl GroupedTable {
    /// Row count per group.
    pub fn counts(&self) -> BTreeMap<CellValue, usize> {
        self.groups.iter().map(|(k, v)| (k.clone(), v.len())).collect()
    }

    /// Apply a reduction to each group, materialised as its own table.
    pub fn apply<T, F>(&self, f: F) -> BTreeMap<CellValue, T>
    where
        F: Fn(&RatingTable) -> T,
    {
        self.groups
            .iter()
            .map(|(k, rows)| (k.clone(), f(&RatingTable::from_rows(rows.clone()))))
            .collect()
    }

    /// The rows of one group as a table; empty for unknown keys.
    pub fn get(&self, key: &CellValue) -> RatingTable {
        RatingTable::from_rows(self.groups.get(key).cloned().unwrap_or_default())
    }

    /// Sorted group keys.
    pub fn keys(&self) -> Vec<&CellValue> {
        self.groups.keys().collect()
    }
}

// ---------------------------------------------------------------------------
// RaterKind – LLM vs Human classification
// ---------------------------------------------------------------------------

/// Rater population, derived from the worker id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum RaterKind {
    #[serde(rename = "LLM")]
    Llm,
    Human,
}

/// Worker-id prefixes that identify surrogate (LLM) raters.
const LLM_PREFIXES: [&str; 6] = ["gpt", "gemini", "claude", "o3", "palm", "llama"];

impl RaterKind {
    /// Classify a worker id by its (case-insensitive) prefix.
    pub fn classify(worker_id: &str) -> Self {
        let lower = worker_id.to_lowercase();
        if LLM_PREFIXES.iter().any(|p| lower.starts_with(p)) {
            RaterKind::Llm
        } else {
            RaterKind::Human
        }
    }
}

impl fmt::Display for RaterKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RaterKind::Llm => write!(f, "LLM"),
            RaterKind::Human => write!(f, "Human"),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

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

    fn small_table() -> RatingTable {
        let mut a = obs("w1", "dog", "is_alive", 1.0);
        a.extra.insert("year".into(), CellValue::Integer(2025));
        let mut b = obs("w2", "cat", "is_alive", 1.0);
        b.extra.insert("year".into(), CellValue::Integer(2025));
        let c = obs("w1", "hammer", "is_alive", 0.0);
        RatingTable::from_rows(vec![a, b, c])
    }

    #[test]
    fn unique_is_sorted_and_stable() {
        let table = small_table();
        let items = table.unique_strings("itemName");
        assert_eq!(items, vec!["cat", "dog", "hammer"]);
        // Same order on a rebuilt table containing the same rows.
        let rebuilt = table.filter(|_| true);
        assert_eq!(rebuilt.unique_strings("itemName"), items);
    }

    #[test]
    fn unique_unknown_column_is_empty() {
        let table = small_table();
        assert!(table.unique("noSuchColumn").is_empty());
    }

    #[test]
    fn get_resolves_canonical_and_extra_columns() {
        let table = small_table();
        let row = &table.rows()[0];
        assert_eq!(row.get("workerId"), Some(CellValue::String("w1".into())));
        assert_eq!(row.get("rating"), Some(CellValue::Float(1.0)));
        assert_eq!(row.get("year"), Some(CellValue::Integer(2025)));
        assert_eq!(row.get("ratingsScaled"), None);
        assert_eq!(row.get("imaginary"), None);
    }

    #[test]
    fn scaled_or_raw_prefers_scaled() {
        let mut row = obs("w1", "dog", "size", 4.0);
        assert_eq!(row.scaled_or_raw(), Some(4.0));
        row.rating_scaled = Some(0.75);
        assert_eq!(row.scaled_or_raw(), Some(0.75));
    }

    #[test]
    fn subset_matches_values_and_sets() {
        let table = small_table();
        let one = table.subset(&[
            ("workerId", Match::value("w1")),
            ("itemName", Match::value("dog")),
        ]);
        assert_eq!(one.len(), 1);

        let pair = table.subset(&[("itemName", Match::any_of(["dog", "cat"]))]);
        assert_eq!(pair.len(), 2);

        let all = table.subset(&[]);
        assert_eq!(all.len(), table.len());

        let none = table.subset(&[("noSuchColumn", Match::value("x"))]);
        assert!(none.is_empty());
    }

    #[test]
    fn subset_is_a_new_table() {
        let table = small_table();
        let filtered = table.subset(&[("workerId", Match::value("w1"))]);
        assert_eq!(filtered.len(), 2);
        assert_eq!(table.len(), 3);
        assert_eq!(filtered.unique_strings("workerId"), vec!["w1"]);
    }

    #[test]
    fn group_by_partitions_all_rows() {
        let table = small_table();
        let grouped = table.group_by("workerId");
        let counts = grouped.counts();
        let total: usize = counts.values().sum();
        assert_eq!(total, table.len());
        assert_eq!(counts.get(&CellValue::from("w1")), Some(&2));
        assert_eq!(counts.get(&CellValue::from("w2")), Some(&1));
    }

    #[test]
    fn group_by_missing_column_uses_null_key() {
        // "year" is present on two of the three rows.
        let table = small_table();
        let grouped = table.group_by("year");
        let counts = grouped.counts();
        assert_eq!(counts.get(&CellValue::Integer(2025)), Some(&2));
        assert_eq!(counts.get(&CellValue::Null), Some(&1));
    }

    #[test]
    fn group_get_unknown_key_is_empty() {
        let table = small_table();
        let grouped = table.group_by("workerId");
        assert!(grouped.get(&CellValue::from("w9")).is_empty());
    }

    #[test]
    fn group_apply_reduces_per_group() {
        let table = small_table();
        let sums = table
            .group_by("workerId")
            .apply(|t| t.rows().iter().filter_map(|r| r.rating).sum::<f64>());
        assert_eq!(sums.get(&CellValue::from("w1")), Some(&1.0));
        assert_eq!(sums.get(&CellValue::from("w2")), Some(&1.0));
    }

    #[test]
    fn head_and_column_accessors() {
        let table = small_table();
        assert_eq!(table.head(2).len(), 2);
        let col = table.column("year");
        assert_eq!(col.len(), 3);
        assert_eq!(col[2], None);
    }

    #[test]
    fn cell_value_orders_by_kind_then_value() {
        let mut values = vec![
            CellValue::from("b"),
            CellValue::from(2.0),
            CellValue::from("a"),
            CellValue::Null,
            CellValue::from(1i64),
        ];
        values.sort();
        assert_eq!(
            values,
            vec![
                CellValue::Null,
                CellValue::Integer(1),
                CellValue::Float(2.0),
                CellValue::String("a".into()),
                CellValue::String("b".into()),
            ]
        );
    }

    #[test]
    fn cell_value_coerces_numeric_strings() {
        assert_eq!(CellValue::from("0.5").as_f64(), Some(0.5));
        assert_eq!(CellValue::from("3").as_f64(), Some(3.0));
        assert_eq!(CellValue::from("dog").as_f64(), None);
        assert_eq!(CellValue::Integer(4).as_f64(), Some(4.0));
    }

    #[test]
    fn rater_kind_classifies_by_prefix() {
        assert_eq!(RaterKind::classify("gpt-4o"), RaterKind::Llm);
        assert_eq!(RaterKind::classify("Gemini-2.5-pro"), RaterKind::Llm);
        assert_eq!(RaterKind::classify("claude-sonnet"), RaterKind::Llm);
        assert_eq!(RaterKind::classify("o3-mini"), RaterKind::Llm);
        assert_eq!(RaterKind::classify("A2TG7YT3Z1RXDF"), RaterKind::Human);
        assert_eq!(RaterKind::classify("worker_12"), RaterKind::Human);
    }
}
