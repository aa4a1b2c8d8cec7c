//! Ingestion — raw CSV to typed `SaleRecord`s, with strict type normalization.
//!
//! The header is validated against the column contract before any row is
//! parsed. Every coercion failure is fatal and carries the row number and
//! column name; this is a batch job, so the run aborts rather than skipping
//! rows.
//!
//! Normalization rules:
//! - `date` parses from `MM/DD/YYYY` into a calendar date (no time part)
//! - `condition` coerces any numeric form to i32 and must land in 1–5
//! - `yr_renovated` maps empty/NaN to 0 ("never renovated"), then coerces
//! - `waterfront`/`view` tolerate empty cells, everything else is required

use std::path::Path;

use chrono::NaiveDate;
use thiserror::Error;

use crate::record::SaleRecord;
use crate::schema::{self, validate_header};

/// Errors from the ingestion layer. All are fatal.
#[derive(Debug, Error)]
pub enum IngestError {
    #[error("failed to read '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("header does not match the raw column contract: {}", .errors.join("; "))]
    Header { errors: Vec<String> },

    #[error("malformed input at row {row}, column '{column}': {reason}")]
    MalformedField {
        row: usize,
        column: &'static str,
        reason: String,
    },

    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
}

/// The parsed input plus provenance for the run manifest.
#[derive(Debug)]
pub struct RawInput {
    /// Records in file order. Duplicate `id`s are expected here.
    pub records: Vec<SaleRecord>,
    /// BLAKE3 hex digest of the raw input bytes.
    pub dataset_hash: String,
}

/// Read and normalize the raw sales CSV.
pub fn read_sales(path: &Path) -> Result<RawInput, IngestError> {
    let bytes = std::fs::read(path).map_err(|source| IngestError::Io {
        path: path.display().to_string(),
        source,
    })?;
    let dataset_hash = blake3::hash(&bytes).to_hex().to_string();

    let records = parse_sales(&bytes)?;
    Ok(RawInput {
        records,
        dataset_hash,
    })
}

/// Parse raw CSV bytes into typed records. Split out from `read_sales` so
/// tests can feed in-memory fixtures without touching the filesystem.
pub fn parse_sales(bytes: &[u8]) -> Result<Vec<SaleRecord>, IngestError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_reader(bytes);

    let header = reader.headers()?.clone();
    let columns: Vec<&str> = header.iter().collect();
    let validation = validate_header(&columns);
    if !validation.is_valid {
        return Err(IngestError::Header {
            errors: validation.errors,
        });
    }

    let mut records = Vec::new();
    for (i, row) in reader.records().enumerate() {
        let row = row?;
        // 1-based data row numbers, matching what a person sees in the file
        // minus the header line.
        records.push(parse_row(&row, i + 1)?);
    }
    Ok(records)
}

fn parse_row(row: &csv::StringRecord, row_no: usize) -> Result<SaleRecord, IngestError> {
    Ok(SaleRecord {
        id: parse_u64(row, row_no, schema::COL_ID, "id")?,
        date: parse_date(row, row_no, schema::COL_DATE, "date")?,
        price: parse_f64(row, row_no, schema::COL_PRICE, "price")?,
        bedrooms: parse_f64(row, row_no, schema::COL_BEDROOMS, "bedrooms")?,
        bathrooms: parse_f64(row, row_no, schema::COL_BATHROOMS, "bathrooms")?,
        sqft_living: parse_f64(row, row_no, schema::COL_SQFT_LIVING, "sqft_living")?,
        sqft_lot: parse_f64(row, row_no, schema::COL_SQFT_LOT, "sqft_lot")?,
        floors: parse_f64(row, row_no, schema::COL_FLOORS, "floors")?,
        waterfront: parse_optional_f64(row, row_no, schema::COL_WATERFRONT, "waterfront")?,
        view: parse_optional_f64(row, row_no, schema::COL_VIEW, "view")?,
        condition: parse_condition(row, row_no)?,
        grade: parse_i32(row, row_no, schema::COL_GRADE, "grade")?,
        sqft_above: parse_f64(row, row_no, schema::COL_SQFT_ABOVE, "sqft_above")?,
        sqft_basement: parse_f64(row, row_no, schema::COL_SQFT_BASEMENT, "sqft_basement")?,
        yr_built: parse_i32(row, row_no, schema::COL_YR_BUILT, "yr_built")?,
        yr_renovated: parse_yr_renovated(row, row_no)?,
        zipcode: parse_u32(row, row_no, schema::COL_ZIPCODE, "zipcode")?,
        lat: parse_f64(row, row_no, schema::COL_LAT, "lat")?,
        long: parse_f64(row, row_no, schema::COL_LONG, "long")?,
        sqft_living15: parse_f64(row, row_no, schema::COL_SQFT_LIVING15, "sqft_living15")?,
        sqft_lot15: parse_f64(row, row_no, schema::COL_SQFT_LOT15, "sqft_lot15")?,
    })
}

fn field<'a>(
    row: &'a csv::StringRecord,
    row_no: usize,
    idx: usize,
    column: &'static str,
) -> Result<&'a str, IngestError> {
    row.get(idx).ok_or(IngestError::MalformedField {
        row: row_no,
        column,
        reason: "field missing".into(),
    })
}

fn parse_f64(
    row: &csv::StringRecord,
    row_no: usize,
    idx: usize,
    column: &'static str,
) -> Result<f64, IngestError> {
    let raw = field(row, row_no, idx, column)?;
    raw.parse::<f64>().map_err(|_| IngestError::MalformedField {
        row: row_no,
        column,
        reason: format!("'{raw}' is not numeric"),
    })
}

/// Empty or NaN cells become `None`; anything else must be numeric.
fn parse_optional_f64(
    row: &csv::StringRecord,
    row_no: usize,
    idx: usize,
    column: &'static str,
) -> Result<Option<f64>, IngestError> {
    let raw = field(row, row_no, idx, column)?;
    if raw.is_empty() || raw.eq_ignore_ascii_case("nan") {
        return Ok(None);
    }
    parse_f64(row, row_no, idx, column).map(Some)
}

fn parse_u64(
    row: &csv::StringRecord,
    row_no: usize,
    idx: usize,
    column: &'static str,
) -> Result<u64, IngestError> {
    let raw = field(row, row_no, idx, column)?;
    raw.parse::<u64>().map_err(|_| IngestError::MalformedField {
        row: row_no,
        column,
        reason: format!("'{raw}' is not an unsigned integer"),
    })
}

fn parse_u32(
    row: &csv::StringRecord,
    row_no: usize,
    idx: usize,
    column: &'static str,
) -> Result<u32, IngestError> {
    let raw = field(row, row_no, idx, column)?;
    raw.parse::<u32>().map_err(|_| IngestError::MalformedField {
        row: row_no,
        column,
        reason: format!("'{raw}' is not an unsigned integer"),
    })
}

/// Integer coercion with pandas `astype` semantics: a numeric form like
/// `3.0` truncates to 3, non-numeric fails.
fn parse_i32(
    row: &csv::StringRecord,
    row_no: usize,
    idx: usize,
    column: &'static str,
) -> Result<i32, IngestError> {
    let value = parse_f64(row, row_no, idx, column)?;
    if !value.is_finite() {
        return Err(IngestError::MalformedField {
            row: row_no,
            column,
            reason: format!("'{value}' is not a finite number"),
        });
    }
    Ok(value.trunc() as i32)
}

fn parse_date(
    row: &csv::StringRecord,
    row_no: usize,
    idx: usize,
    column: &'static str,
) -> Result<NaiveDate, IngestError> {
    let raw = field(row, row_no, idx, column)?;
    NaiveDate::parse_from_str(raw, "%m/%d/%Y").map_err(|e| IngestError::MalformedField {
        row: row_no,
        column,
        reason: format!("'{raw}' is not an MM/DD/YYYY date: {e}"),
    })
}

fn parse_condition(row: &csv::StringRecord, row_no: usize) -> Result<i32, IngestError> {
    let value = parse_i32(row, row_no, schema::COL_CONDITION, "condition")?;
    if !(1..=5).contains(&value) {
        return Err(IngestError::MalformedField {
            row: row_no,
            column: "condition",
            reason: format!("{value} is outside the 1-5 condition scale"),
        });
    }
    Ok(value)
}

/// Missing renovation year means "never renovated", never "unknown".
fn parse_yr_renovated(row: &csv::StringRecord, row_no: usize) -> Result<i32, IngestError> {
    let raw = field(row, row_no, schema::COL_YR_RENOVATED, "yr_renovated")?;
    if raw.is_empty() || raw.eq_ignore_ascii_case("nan") {
        return Ok(0);
    }
    parse_i32(row, row_no, schema::COL_YR_RENOVATED, "yr_renovated")
}
