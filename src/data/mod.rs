/// Data layer: core table types, loading, and rater filtering.
///
/// Architecture:
/// ```text
///  .csv / .json
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  parse file → RatingTable
///   └──────────┘
///        │
///        ▼
///   ┌─────────────┐
///   │ RatingTable │  Vec<Observation>, column index
///   └─────────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  filter   │  drop incomplete raters → reduced RatingTable
///   └──────────┘
/// ```

pub mod filter;
pub mod loader;
pub mod model;
