//! Transformation stages, composed in fixed order by the pipeline:
//! derivation, duplicate resolution, zip-code share filter, target projection.

pub mod dedup;
pub mod derive;
pub mod renovation;
pub mod zip_filter;

pub use dedup::{resolve_duplicates, DedupOutcome, InvariantError};
pub use derive::{distance_km, enrich_all};
pub use renovation::{project_target, years_since_renovation};
pub use zip_filter::{compute_share_filter, ShareFilter, ZipcodeAggregate};
