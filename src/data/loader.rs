use std::collections::BTreeMap;
use std::path::Path;

use anyhow::{bail, Context, Result};
use log::warn;
use serde_json::Value as JsonValue;

use super::model::{columns, CellValue, Observation, RatingTable};

/// Header spelling used by some older export scripts for the scaled rating.
const RATING_SCALED_ALIAS: &str = "ratingScaled";

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Load a rating table from a file.  Dispatch by extension.
///
/// Supported formats:
/// * `.csv`  – header row naming the columns, one observation per row
/// * `.json` – `[{ "workerId": ..., "itemName": ..., ...extra }, ...]`
pub fn load_file(path: &Path) -> Result<RatingTable> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    let table = match ext.as_str() {
        "csv" => load_csv(path)?,
        "json" => load_json(path)?,
        other => bail!("Unsupported file extension: .{other}"),
    };

    warn_duplicate_triples(&table);
    Ok(table)
}

// ---------------------------------------------------------------------------
// CSV loader
// ---------------------------------------------------------------------------

/// CSV layout: header row with column names.  `workerId`, `itemName` and
/// `featureName` are required; `rating`, `ratingsScaled` (or the older
/// `ratingScaled` spelling) and `ratingsScaledMax` are optional numeric
/// columns.  Everything else is kept as an extra column with a guessed type.
fn load_csv(path: &Path) -> Result<RatingTable> {
    let mut reader = csv::Reader::from_path(path).context("opening CSV")?;
    let headers: Vec<String> = reader
        .headers()
        .context("reading CSV headers")?
        .iter()
        .map(|h| h.to_string())
        .collect();

    let find = |name: &str| headers.iter().position(|h| h == name);

    let worker_idx = find(columns::WORKER_ID)
        .with_context(|| format!("CSV missing '{}' column", columns::WORKER_ID))?;
    let item_idx = find(columns::ITEM_NAME)
        .with_context(|| format!("CSV missing '{}' column", columns::ITEM_NAME))?;
    let feature_idx = find(columns::FEATURE_NAME)
        .with_context(|| format!("CSV missing '{}' column", columns::FEATURE_NAME))?;

    let rating_idx = find(columns::RATING);
    let scaled_idx = find(columns::RATING_SCALED).or_else(|| find(RATING_SCALED_ALIAS));
    let scaled_max_idx = find(columns::RATING_SCALED_MAX);
    let identity = [worker_idx, item_idx, feature_idx];
    let numeric: Vec<usize> = [rating_idx, scaled_idx, scaled_max_idx]
        .into_iter()
        .flatten()
        .collect();

    let mut rows = Vec::new();

    for (row_no, result) in reader.records().enumerate() {
        let record = result.with_context(|| format!("CSV row {row_no}"))?;

        let worker_id = record.get(worker_idx).unwrap_or("").trim();
        let item_name = record.get(item_idx).unwrap_or("").trim();
        let feature_name = record.get(feature_idx).unwrap_or("").trim();
        if worker_id.is_empty() || item_name.is_empty() || feature_name.is_empty() {
            warn!("CSV row {row_no}: missing worker/item/feature id, skipping");
            continue;
        }

        let mut extra = BTreeMap::new();
        for (col_idx, value) in record.iter().enumerate() {
            if identity.contains(&col_idx) || numeric.contains(&col_idx) {
                continue;
            }
            extra.insert(headers[col_idx].clone(), guess_cell_type(value));
        }

        rows.push(Observation {
            worker_id: worker_id.to_string(),
            item_name: item_name.to_string(),
            feature_name: feature_name.to_string(),
            rating: rating_idx.and_then(|i| parse_rating(record.get(i), row_no, columns::RATING)),
            rating_scaled: scaled_idx
                .and_then(|i| parse_rating(record.get(i), row_no, columns::RATING_SCALED)),
            rating_scaled_max: scaled_max_idx
                .and_then(|i| parse_rating(record.get(i), row_no, columns::RATING_SCALED_MAX)),
            extra,
        });
    }

    Ok(RatingTable::from_rows(rows))
}

/// Parse an optional numeric rating cell.  Empty cells are missing values;
/// non-numeric text is treated the same but gets a warning.
fn parse_rating(cell: Option<&str>, row: usize, col: &str) -> Option<f64> {
    let s = cell.unwrap_or("").trim();
    if s.is_empty() {
        return None;
    }
    match s.parse::<f64>() {
        // A literal NaN marker means "no value", same as an empty cell.
        Ok(v) if v.is_nan() => None,
        Ok(v) => Some(v),
        Err(_) => {
            warn!("CSV row {row}, {col}: '{s}' is not a number, treating as missing");
            None
        }
    }
}

fn guess_cell_type(s: &str) -> CellValue {
    if s.is_empty() {
        return CellValue::Null;
    }
    if let Ok(i) = s.parse::<i64>() {
        return CellValue::Integer(i);
    }
    if let Ok(f) = s.parse::<f64>() {
        return CellValue::Float(f);
    }
    if s == "true" || s == "false" {
        return CellValue::Bool(s == "true");
    }
    CellValue::String(s.to_string())
}

// ---------------------------------------------------------------------------
// JSON loader
// ---------------------------------------------------------------------------

/// Expected JSON schema (records-oriented):
///
/// ```json
/// [
///   {
///     "workerId": "gpt-4o",
///     "itemName": "dog",
///     "featureName": "is_alive",
///     "rating": 1,
///     "ratingsScaled": 1.0,
///     "itemCategory": "animals"
///   },
///   ...
/// ]
/// ```
fn load_json(path: &Path) -> Result<RatingTable> {
    let text = std::fs::read_to_string(path).context("reading JSON file")?;
    let root: JsonValue = serde_json::from_str(&text).context("parsing JSON")?;

    let records = root.as_array().context("Expected top-level JSON array")?;

    let mut rows = Vec::with_capacity(records.len());

    for (i, rec) in records.iter().enumerate() {
        let obj = rec
            .as_object()
            .with_context(|| format!("Row {i} is not a JSON object"))?;

        let worker_id = json_string(obj.get(columns::WORKER_ID), i, columns::WORKER_ID)?;
        let item_name = json_string(obj.get(columns::ITEM_NAME), i, columns::ITEM_NAME)?;
        let feature_name = json_string(obj.get(columns::FEATURE_NAME), i, columns::FEATURE_NAME)?;

        let rating = obj.get(columns::RATING).and_then(JsonValue::as_f64);
        let rating_scaled = obj
            .get(columns::RATING_SCALED)
            .or_else(|| obj.get(RATING_SCALED_ALIAS))
            .and_then(JsonValue::as_f64);
        let rating_scaled_max = obj
            .get(columns::RATING_SCALED_MAX)
            .and_then(JsonValue::as_f64);

        let mut extra = BTreeMap::new();
        for (key, val) in obj {
            match key.as_str() {
                columns::WORKER_ID
                | columns::ITEM_NAME
                | columns::FEATURE_NAME
                | columns::RATING
                | columns::RATING_SCALED
                | columns::RATING_SCALED_MAX
                | RATING_SCALED_ALIAS => continue,
                _ => {
                    extra.insert(key.clone(), json_to_cell(val));
                }
            }
        }

        rows.push(Observation {
            worker_id,
            item_name,
            feature_name,
            rating,
            rating_scaled,
            rating_scaled_max,
            extra,
        });
    }

    Ok(RatingTable::from_rows(rows))
}

fn json_string(val: Option<&JsonValue>, row: usize, col: &str) -> Result<String> {
    val.and_then(|v| v.as_str())
        .map(|s| s.to_string())
        .with_context(|| format!("Row {row}: missing or non-string '{col}'"))
}

fn json_to_cell(val: &JsonValue) -> CellValue {
    match val {
        JsonValue::String(s) => CellValue::String(s.clone()),
        JsonValue::Number(n) => {
            if let Some(i) = n.as_i64() {
                CellValue::Integer(i)
            } else if let Some(f) = n.as_f64() {
                CellValue::Float(f)
            } else {
                CellValue::String(n.to_string())
            }
        }
        JsonValue::Bool(b) => CellValue::Bool(*b),
        JsonValue::Null => CellValue::Null,
        other => CellValue::String(other.to_string()),
    }
}

// ---------------------------------------------------------------------------
// Duplicate detection
// ---------------------------------------------------------------------------

/// Warn when the same (worker, item, feature) triple occurs more than once.
/// The reshape step keeps the first occurrence, so duplicates silently
/// disappear from the analyses; the warning makes that visible.
fn warn_duplicate_triples(table: &RatingTable) {
    let mut seen: BTreeMap<(&str, &str, &str), usize> = BTreeMap::new();
    for row in table.rows() {
        *seen
            .entry((
                row.worker_id.as_str(),
                row.item_name.as_str(),
                row.feature_name.as_str(),
            ))
            .or_insert(0) += 1;
    }
    let duplicated: Vec<_> = seen.iter().filter(|(_, &n)| n > 1).collect();
    if let Some(((worker, item, feature), count)) = duplicated.first() {
        warn!(
            "{} duplicated (worker, item, feature) triples, e.g. ({worker}, {item}, {feature}) x{count}; \
             analyses keep the first occurrence",
            duplicated.len()
        );
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
