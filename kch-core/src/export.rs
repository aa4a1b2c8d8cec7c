//! Export — the two cleaned CSVs and a versioned run manifest.
//!
//! Artifacts written into the output directory:
//! - `kch_clean_data.csv` — full enriched, deduplicated dataset
//! - `kch_target_population.csv` — target-population rows only
//! - `manifest.json` — run summary with a `schema_version` field; unknown
//!   versions are rejected on load
//!
//! Partial files left behind by a failed run are fine to discard; the job
//! reruns from scratch.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};

use crate::pipeline::{PipelineOutput, RunSummary};
use crate::record::{EnrichedRecord, TargetRecord};

/// Current schema version for the persisted manifest.
pub const SCHEMA_VERSION: u32 = 1;

pub const CLEAN_DATA_FILE: &str = "kch_clean_data.csv";
pub const TARGET_DATA_FILE: &str = "kch_target_population.csv";
pub const MANIFEST_FILE: &str = "manifest.json";

/// The persisted run manifest.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunManifest {
    pub schema_version: u32,
    #[serde(flatten)]
    pub summary: RunSummary,
}

/// Serialize the full enriched dataset as CSV with a header row.
pub fn enriched_to_csv(records: &[EnrichedRecord]) -> Result<String> {
    records_to_csv(records, EnrichedRecord::COLUMNS)
}

/// Serialize the target-population dataset as CSV with a header row.
pub fn target_to_csv(records: &[TargetRecord]) -> Result<String> {
    records_to_csv(records, TargetRecord::COLUMNS)
}

fn records_to_csv<T: Serialize>(records: &[T], columns: &[&str]) -> Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);
    if records.is_empty() {
        // serialize() derives the header from the first record, so an empty
        // run has to write it explicitly.
        wtr.write_record(columns)?;
    }
    for record in records {
        wtr.serialize(record)?;
    }
    let data = wtr.into_inner().context("failed to flush CSV writer")?;
    String::from_utf8(data).context("CSV output is not valid UTF-8")
}

/// Serialize the run manifest to pretty JSON.
pub fn manifest_to_json(summary: &RunSummary) -> Result<String> {
    let manifest = RunManifest {
        schema_version: SCHEMA_VERSION,
        summary: summary.clone(),
    };
    serde_json::to_string_pretty(&manifest).context("failed to serialize run manifest")
}

/// Deserialize a run manifest, rejecting unknown schema versions.
pub fn manifest_from_json(json: &str) -> Result<RunManifest> {
    let manifest: RunManifest =
        serde_json::from_str(json).context("failed to deserialize run manifest")?;
    if manifest.schema_version > SCHEMA_VERSION {
        bail!(
            "unsupported manifest schema version {} (max supported: {})",
            manifest.schema_version,
            SCHEMA_VERSION
        );
    }
    Ok(manifest)
}

/// Write the full artifact set into `output_dir`, creating it if needed.
///
/// Returns the paths of the files written.
pub fn save_artifacts(output: &PipelineOutput, output_dir: &Path) -> Result<Vec<PathBuf>> {
    std::fs::create_dir_all(output_dir)
        .with_context(|| format!("failed to create output dir: {}", output_dir.display()))?;

    let clean_path = output_dir.join(CLEAN_DATA_FILE);
    std::fs::write(&clean_path, enriched_to_csv(&output.enriched)?)
        .with_context(|| format!("failed to write {}", clean_path.display()))?;

    let target_path = output_dir.join(TARGET_DATA_FILE);
    std::fs::write(&target_path, target_to_csv(&output.target)?)
        .with_context(|| format!("failed to write {}", target_path.display()))?;

    let manifest_path = output_dir.join(MANIFEST_FILE);
    std::fs::write(&manifest_path, manifest_to_json(&output.summary)?)
        .with_context(|| format!("failed to write {}", manifest_path.display()))?;

    Ok(vec![clean_path, target_path, manifest_path])
}

/// Load the manifest from an output directory. Rejects unknown versions.
pub fn load_manifest(output_dir: &Path) -> Result<RunManifest> {
    let path = output_dir.join(MANIFEST_FILE);
    let json = std::fs::read_to_string(&path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    manifest_from_json(&json)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::SaleRecord;
    use chrono::NaiveDate;

    fn sample_enriched(multi: bool) -> EnrichedRecord {
        let sale = SaleRecord {
            id: 7129300520,
            date: NaiveDate::from_ymd_opt(2014, 10, 13).unwrap(),
            price: 221_900.0,
            bedrooms: 3.0,
            bathrooms: 1.0,
            sqft_living: 1180.0,
            sqft_lot: 5650.0,
            floors: 1.0,
            waterfront: Some(0.0),
            view: None,
            condition: 3,
            grade: 7,
            sqft_above: 1180.0,
            sqft_basement: 0.0,
            yr_built: 1955,
            yr_renovated: 0,
            zipcode: 98178,
            lat: 47.5112,
            long: -122.257,
            sqft_living15: 1340.0,
            sqft_lot15: 5650.0,
        };
        let mut record = EnrichedRecord::from_sale(sale, 12.5);
        if multi {
            record.multi_sold = true;
            record.date_sold_old = Some(NaiveDate::from_ymd_opt(2013, 2, 1).unwrap());
            record.price_sold_old = Some(199_000.0);
        }
        record
    }

    fn sample_summary() -> RunSummary {
        RunSummary {
            input_path: "data/sales.csv".into(),
            dataset_hash: "abc123".into(),
            raw_rows: 10,
            superseded_rows: 1,
            surviving_rows: 9,
            multi_sold_properties: 1,
            target_rows: 4,
            median_price_sqft_living: 264.5,
            share_threshold: 80.0,
            min_zip_support: 2,
            accepted_zipcodes: vec![98001, 98002],
            excluded_zipcodes: vec![98039],
        }
    }

    #[test]
    fn enriched_csv_has_all_columns() {
        let csv = enriched_to_csv(&[sample_enriched(false)]).unwrap();
        let header = csv.lines().next().unwrap();
        let cols: Vec<&str> = header.split(',').collect();
        assert_eq!(cols.len(), 28);
        assert_eq!(cols[0], "id");
        assert!(cols.contains(&"dist_to_seattle"));
        assert!(cols.contains(&"price_sqft_living"));
        assert!(cols.contains(&"multi_sold"));
        assert!(cols.contains(&"date_sold_old"));
        assert!(cols.contains(&"price_sold_old"));
    }

    #[test]
    fn unset_history_serializes_as_empty_cells() {
        let csv = enriched_to_csv(&[sample_enriched(false)]).unwrap();
        let row = csv.lines().nth(1).unwrap();
        assert!(row.ends_with("false,,"));
    }

    #[test]
    fn multi_sold_history_is_written_out() {
        let csv = enriched_to_csv(&[sample_enriched(true)]).unwrap();
        let row = csv.lines().nth(1).unwrap();
        assert!(row.contains("true,2013-02-01,199000.0"));
    }

    #[test]
    fn dates_serialize_iso() {
        let csv = enriched_to_csv(&[sample_enriched(false)]).unwrap();
        let row = csv.lines().nth(1).unwrap();
        assert!(row.contains("2014-10-13"));
    }

    #[test]
    fn target_csv_has_reduced_column_set() {
        let target = TargetRecord::from_enriched(&sample_enriched(false), 0);
        let csv = target_to_csv(&[target]).unwrap();
        let header = csv.lines().next().unwrap();
        let cols: Vec<&str> = header.split(',').collect();
        assert_eq!(cols.len(), 15);
        assert!(!cols.contains(&"bedrooms"));
        assert!(!cols.contains(&"sqft_living"));
        assert!(!cols.contains(&"month"));
        assert!(cols.contains(&"yr_built"));
        assert!(cols.contains(&"yrs_since_renovation"));
    }

    #[test]
    fn column_consts_match_the_serialized_header() {
        let csv = enriched_to_csv(&[sample_enriched(false)]).unwrap();
        assert_eq!(
            csv.lines().next().unwrap(),
            EnrichedRecord::COLUMNS.join(",")
        );

        let target = TargetRecord::from_enriched(&sample_enriched(false), 0);
        let csv = target_to_csv(&[target]).unwrap();
        assert_eq!(csv.lines().next().unwrap(), TargetRecord::COLUMNS.join(","));
    }

    #[test]
    fn empty_output_still_has_a_header_row() {
        let csv = enriched_to_csv(&[]).unwrap();
        assert_eq!(csv.trim_end(), EnrichedRecord::COLUMNS.join(","));

        let csv = target_to_csv(&[]).unwrap();
        assert_eq!(csv.trim_end(), TargetRecord::COLUMNS.join(","));
    }

    #[test]
    fn manifest_roundtrip() {
        let json = manifest_to_json(&sample_summary()).unwrap();
        let manifest = manifest_from_json(&json).unwrap();
        assert_eq!(manifest.schema_version, SCHEMA_VERSION);
        assert_eq!(manifest.summary.raw_rows, 10);
        assert_eq!(manifest.summary.accepted_zipcodes, vec![98001, 98002]);
    }

    #[test]
    fn manifest_rejects_unknown_version() {
        let mut json = manifest_to_json(&sample_summary()).unwrap();
        json = json.replace("\"schema_version\": 1", "\"schema_version\": 99");
        let err = manifest_from_json(&json).unwrap_err();
        assert!(err.to_string().contains("unsupported manifest schema version 99"));
    }

    #[test]
    fn save_artifacts_writes_all_three_files() {
        let output = PipelineOutput {
            enriched: vec![sample_enriched(true)],
            target: vec![TargetRecord::from_enriched(&sample_enriched(true), 5)],
            summary: sample_summary(),
        };
        let dir = tempfile::tempdir().unwrap();
        let written = save_artifacts(&output, dir.path()).unwrap();
        assert_eq!(written.len(), 3);
        assert!(dir.path().join(CLEAN_DATA_FILE).exists());
        assert!(dir.path().join(TARGET_DATA_FILE).exists());
        assert!(dir.path().join(MANIFEST_FILE).exists());

        let manifest = load_manifest(dir.path()).unwrap();
        assert_eq!(manifest.summary.dataset_hash, "abc123");
    }
}
