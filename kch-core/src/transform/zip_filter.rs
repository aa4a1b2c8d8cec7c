//! Zip-code share filter — the target-population selection rule.
//!
//! Over the deduplicated dataset, compute the median `price_sqft_living`.
//! For each zip code, the "share" is the percentage of its properties priced
//! at or below that global median. A zip code is accepted when its share
//! meets the threshold (default 80%).
//!
//! Zip codes with fewer properties than the minimum support are excluded
//! from the share computation entirely and never accepted: a single extreme
//! sale would make its share statistically meaningless. This generalizes the
//! original analysis, which dropped one specific single-property zip code by
//! value.

use std::collections::{BTreeMap, BTreeSet};

use crate::record::EnrichedRecord;

/// Per-zip aggregation backing the share computation. Transient: only the
/// accepted and excluded zip sets outlive the filter.
#[derive(Debug, Clone, PartialEq)]
pub struct ZipcodeAggregate {
    pub zipcode: u32,
    /// Properties in this zip code.
    pub total: usize,
    /// Properties priced at or below the global median per sqft.
    pub at_or_below_median: usize,
    /// Percentage share, 0–100.
    pub share: f64,
}

/// Outcome of the share filter: the accepted zip set plus the numbers that
/// produced it.
#[derive(Debug, Clone)]
pub struct ShareFilter {
    /// Global median `price_sqft_living` over the deduplicated dataset.
    pub median_price_sqft_living: f64,
    /// Aggregates for every zip code meeting the support threshold.
    pub aggregates: Vec<ZipcodeAggregate>,
    /// Zip codes whose share met the threshold.
    pub accepted: BTreeSet<u32>,
    /// Zip codes dropped for insufficient support (count below minimum).
    pub excluded_low_support: BTreeSet<u32>,
}

/// Median with the usual even-length rule: mean of the two middle values.
pub fn median(mut values: Vec<f64>) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    values.sort_by(f64::total_cmp);
    let mid = values.len() / 2;
    if values.len() % 2 == 1 {
        Some(values[mid])
    } else {
        Some((values[mid - 1] + values[mid]) / 2.0)
    }
}

/// Compute the share filter over the deduplicated dataset.
pub fn compute_share_filter(
    records: &[EnrichedRecord],
    share_threshold: f64,
    min_support: usize,
) -> ShareFilter {
    let global_median = median(records.iter().map(|r| r.price_sqft_living).collect());

    let mut by_zip: BTreeMap<u32, (usize, usize)> = BTreeMap::new();
    if let Some(m) = global_median {
        for record in records {
            let entry = by_zip.entry(record.zipcode).or_insert((0, 0));
            entry.0 += 1;
            if record.price_sqft_living <= m {
                entry.1 += 1;
            }
        }
    }

    let mut aggregates = Vec::new();
    let mut accepted = BTreeSet::new();
    let mut excluded_low_support = BTreeSet::new();

    for (zipcode, (total, at_or_below_median)) in by_zip {
        if total < min_support {
            excluded_low_support.insert(zipcode);
            continue;
        }
        let share = (at_or_below_median as f64 / total as f64) * 100.0;
        if share >= share_threshold {
            accepted.insert(zipcode);
        }
        aggregates.push(ZipcodeAggregate {
            zipcode,
            total,
            at_or_below_median,
            share,
        });
    }

    ShareFilter {
        median_price_sqft_living: global_median.unwrap_or(0.0),
        aggregates,
        accepted,
        excluded_low_support,
    }
}
