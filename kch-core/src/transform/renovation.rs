//! Renovation age and the target-population projection.

use std::collections::BTreeSet;

use crate::record::{EnrichedRecord, TargetRecord};

/// Years since last renovation, measured against a reference year.
///
/// 0 means "never renovated" and stays 0 regardless of the reference year.
/// The absolute value guards against a renovation year after the reference
/// year; none are expected in the data.
pub fn years_since_renovation(yr_renovated: i32, reference_year: i32) -> i32 {
    if yr_renovated == 0 {
        0
    } else {
        (reference_year - yr_renovated).abs()
    }
}

/// Project the deduplicated dataset down to the target population: only
/// properties in accepted zip codes, structural columns dropped, renovation
/// age appended.
pub fn project_target(
    records: &[EnrichedRecord],
    accepted: &BTreeSet<u32>,
    reference_year: i32,
) -> Vec<TargetRecord> {
    records
        .iter()
        .filter(|r| accepted.contains(&r.zipcode))
        .map(|r| {
            let yrs = years_since_renovation(r.yr_renovated, reference_year);
            TargetRecord::from_enriched(r, yrs)
        })
        .collect()
}
