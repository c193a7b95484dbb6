/// Statistics layer: correlation primitives, reshape pivots, and the
/// aggregate analyses built on them.
///
/// ```text
///   RatingTable
///        │
///        ▼
///   ┌──────────┐
///   │ reshape   │  per-feature rater×item matrices,
///   └──────────┘  rater-averaged feature/item vectors
///        │
///        ▼
///   ┌─────────────┐
///   │ correlation │  pairwise Pearson with missing-pair exclusion
///   └─────────────┘
///        │
///        ▼
///   ┌───────────┐
///   │ aggregate  │  reliability ranking, rater agreement, pair lists
///   └───────────┘
/// ```

pub mod aggregate;
pub mod correlation;
pub mod reshape;
