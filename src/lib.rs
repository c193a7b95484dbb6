//! Inter-rater reliability and redundancy analysis for semantic feature
//! rating studies.
//!
//! A rating table holds one observation per (rater, item, feature)
//! triple. The crate reshapes that table into per-feature and per-rater
//! matrices, correlates them pairwise with missing values excluded per
//! pair, and reduces the results to four reports: feature reliability,
//! rater agreement, feature redundancy, and item similarity.
//!
//! ```text
//!  .csv / .json ──► data::loader ──► RatingTable ──► stats::reshape
//!                                                          │
//!        reports ◄── stats::aggregate ◄── stats::correlation
//! ```
//!
//! [`AnalysisSession`] ties the layers together: it owns the loaded
//! table, applies the rater exclusion policy, and caches the pivots the
//! aggregate reports share. Undefined results (no overlapping
//! observations, zero variance) travel as `None` rather than failing the
//! run, so a single degenerate feature never sinks the rest of a report.

pub mod data;
pub mod error;
pub mod session;
pub mod stats;

pub use data::model::{CellValue, Match, Observation, RaterKind, RatingTable};
pub use error::{Error, Result};
pub use session::{AnalysisSession, DataSummary};
