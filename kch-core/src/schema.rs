//! Raw CSV column contract — the boundary between the input file and the pipeline.
//!
//! The King County sales export carries a fixed 21-column header. Ingestion
//! validates the header against this contract before touching any row, so a
//! renamed or missing column fails fast instead of producing a misparsed
//! dataset.

/// The canonical raw header, in file order.
pub const RAW_COLUMNS: &[&str] = &[
    "id",
    "date",
    "price",
    "bedrooms",
    "bathrooms",
    "sqft_living",
    "sqft_lot",
    "floors",
    "waterfront",
    "view",
    "condition",
    "grade",
    "sqft_above",
    "sqft_basement",
    "yr_built",
    "yr_renovated",
    "zipcode",
    "lat",
    "long",
    "sqft_living15",
    "sqft_lot15",
];

// Column indices into a validated raw row.
pub const COL_ID: usize = 0;
pub const COL_DATE: usize = 1;
pub const COL_PRICE: usize = 2;
pub const COL_BEDROOMS: usize = 3;
pub const COL_BATHROOMS: usize = 4;
pub const COL_SQFT_LIVING: usize = 5;
pub const COL_SQFT_LOT: usize = 6;
pub const COL_FLOORS: usize = 7;
pub const COL_WATERFRONT: usize = 8;
pub const COL_VIEW: usize = 9;
pub const COL_CONDITION: usize = 10;
pub const COL_GRADE: usize = 11;
pub const COL_SQFT_ABOVE: usize = 12;
pub const COL_SQFT_BASEMENT: usize = 13;
pub const COL_YR_BUILT: usize = 14;
pub const COL_YR_RENOVATED: usize = 15;
pub const COL_ZIPCODE: usize = 16;
pub const COL_LAT: usize = 17;
pub const COL_LONG: usize = 18;
pub const COL_SQFT_LIVING15: usize = 19;
pub const COL_SQFT_LOT15: usize = 20;

/// Result of header validation.
#[derive(Debug, Clone)]
pub struct HeaderValidation {
    pub is_valid: bool,
    pub errors: Vec<String>,
}

/// Validate a parsed header row against the raw column contract.
///
/// Columns must be present in the contract order. Extra trailing columns are
/// rejected as well: the pipeline has no pass-through story for columns it
/// does not know how to type.
pub fn validate_header(columns: &[&str]) -> HeaderValidation {
    let mut errors = Vec::new();

    for (i, expected) in RAW_COLUMNS.iter().enumerate() {
        match columns.get(i) {
            Some(found) if found.trim() == *expected => {}
            Some(found) => {
                errors.push(format!(
                    "column {i}: expected '{expected}', got '{found}'"
                ));
            }
            None => {
                errors.push(format!("missing required column '{expected}' (index {i})"));
            }
        }
    }

    for (i, found) in columns.iter().enumerate().skip(RAW_COLUMNS.len()) {
        errors.push(format!("unexpected extra column '{found}' (index {i})"));
    }

    HeaderValidation {
        is_valid: errors.is_empty(),
        errors,
    }
}
