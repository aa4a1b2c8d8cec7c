//! Pipeline composition — the fixed stage order, run once per invocation.
//!
//! ingest → derive → duplicate resolution → share filter → target projection.
//! Each stage is a pure function over an explicit record collection; this
//! module only wires them together and collects the run summary.

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::{CleanConfig, ConfigError};
use crate::ingest::{self, IngestError};
use crate::record::{EnrichedRecord, SaleRecord, TargetRecord};
use crate::transform::{
    compute_share_filter, enrich_all, project_target, resolve_duplicates, InvariantError,
};

/// Errors from a pipeline run. All abort the run; there is no partial-output
/// recovery beyond rerunning from scratch.
#[derive(Debug, Error)]
pub enum RunError {
    #[error("config error: {0}")]
    Config(#[from] ConfigError),

    #[error("ingest error: {0}")]
    Ingest(#[from] IngestError),

    #[error("invariant violation: {0}")]
    Invariant(#[from] InvariantError),
}

/// Counts and derived facts of one run, reported by the CLI and persisted in
/// the manifest.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunSummary {
    pub input_path: String,
    /// BLAKE3 hex digest of the raw input bytes.
    pub dataset_hash: String,
    pub raw_rows: usize,
    pub superseded_rows: usize,
    pub surviving_rows: usize,
    pub multi_sold_properties: usize,
    pub target_rows: usize,
    pub median_price_sqft_living: f64,
    pub share_threshold: f64,
    pub min_zip_support: usize,
    pub accepted_zipcodes: Vec<u32>,
    /// Zip codes excluded from the share computation for low support.
    pub excluded_zipcodes: Vec<u32>,
}

/// Everything a run produces, ready for export.
#[derive(Debug)]
pub struct PipelineOutput {
    /// Full enriched, deduplicated dataset.
    pub enriched: Vec<EnrichedRecord>,
    /// Target-population dataset (accepted zip codes only).
    pub target: Vec<TargetRecord>,
    pub summary: RunSummary,
}

/// Run the whole pipeline against the configured input file.
pub fn run_pipeline(config: &CleanConfig) -> Result<PipelineOutput, RunError> {
    config.validate()?;
    let raw = ingest::read_sales(&config.io.input)?;
    run_from_records(raw.records, config, &config.io.input, &raw.dataset_hash)
}

/// Run the transformation stages over already-parsed records.
///
/// Split out so tests and callers with in-memory data skip the filesystem.
pub fn run_from_records(
    sales: Vec<SaleRecord>,
    config: &CleanConfig,
    input_path: &Path,
    dataset_hash: &str,
) -> Result<PipelineOutput, RunError> {
    let raw_rows = sales.len();

    let enriched = enrich_all(sales, config.reference_point());
    let dedup = resolve_duplicates(enriched)?;
    let share = compute_share_filter(
        &dedup.records,
        config.filter.share_threshold,
        config.filter.min_zip_support,
    );
    let target = project_target(
        &dedup.records,
        &share.accepted,
        config.derive.renovation_reference_year,
    );

    let summary = RunSummary {
        input_path: input_path.display().to_string(),
        dataset_hash: dataset_hash.to_string(),
        raw_rows,
        superseded_rows: dedup.superseded,
        surviving_rows: dedup.records.len(),
        multi_sold_properties: dedup.multi_sold_properties,
        target_rows: target.len(),
        median_price_sqft_living: share.median_price_sqft_living,
        share_threshold: config.filter.share_threshold,
        min_zip_support: config.filter.min_zip_support,
        accepted_zipcodes: share.accepted.iter().copied().collect(),
        excluded_zipcodes: share.excluded_low_support.iter().copied().collect(),
    };

    Ok(PipelineOutput {
        enriched: dedup.records,
        target,
        summary,
    })
}
