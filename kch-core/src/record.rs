//! Record types — raw sale rows and the two output shapes.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One raw sale event, typed. `id` is NOT unique: a property sold twice
/// appears as two records with the same `id`.
///
/// `waterfront` and `view` tolerate empty cells (the raw export leaves them
/// blank for a handful of rows); every other column is required.
#[derive(Debug, Clone, PartialEq)]
pub struct SaleRecord {
    pub id: u64,
    pub date: NaiveDate,
    pub price: f64,
    pub bedrooms: f64,
    pub bathrooms: f64,
    pub sqft_living: f64,
    pub sqft_lot: f64,
    pub floors: f64,
    pub waterfront: Option<f64>,
    pub view: Option<f64>,
    /// 1–5 scale, coerced from whatever numeric form the file carries.
    pub condition: i32,
    pub grade: i32,
    pub sqft_above: f64,
    pub sqft_basement: f64,
    pub yr_built: i32,
    /// 0 means never renovated. Empty/NaN cells are normalized to 0 at ingest.
    pub yr_renovated: i32,
    pub zipcode: u32,
    pub lat: f64,
    pub long: f64,
    pub sqft_living15: f64,
    pub sqft_lot15: f64,
}

/// A surviving sale record plus all derived columns. One per property after
/// duplicate resolution; serialized as-is into the full cleaned CSV.
///
/// Field order is the output column order: the 21 raw columns followed by
/// the derived ones.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnrichedRecord {
    pub id: u64,
    pub date: NaiveDate,
    pub price: f64,
    pub bedrooms: f64,
    pub bathrooms: f64,
    pub sqft_living: f64,
    pub sqft_lot: f64,
    pub floors: f64,
    pub waterfront: Option<f64>,
    pub view: Option<f64>,
    pub condition: i32,
    pub grade: i32,
    pub sqft_above: f64,
    pub sqft_basement: f64,
    pub yr_built: i32,
    pub yr_renovated: i32,
    pub zipcode: u32,
    pub lat: f64,
    pub long: f64,
    pub sqft_living15: f64,
    pub sqft_lot15: f64,
    pub month: u32,
    pub year: i32,
    /// Kilometers to the reference coordinate, kept numeric end to end.
    pub dist_to_seattle: f64,
    pub price_sqft_living: f64,
    /// True when this `id` appeared more than once in the raw file.
    pub multi_sold: bool,
    /// Date of the immediately preceding sale for multi-sold properties.
    pub date_sold_old: Option<NaiveDate>,
    /// Price of the immediately preceding sale for multi-sold properties.
    pub price_sold_old: Option<f64>,
}

impl EnrichedRecord {
    /// Output column order, matching the serialized field order. Used to
    /// emit a header row even when a run produces no records.
    pub const COLUMNS: &'static [&'static str] = &[
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
        "month",
        "year",
        "dist_to_seattle",
        "price_sqft_living",
        "multi_sold",
        "date_sold_old",
        "price_sold_old",
    ];

    /// Build the derived-but-not-yet-deduplicated form of a raw record.
    ///
    /// `multi_sold` and the `*_sold_old` fields start unset; duplicate
    /// resolution fills them in for surviving multi-sold records.
    pub fn from_sale(sale: SaleRecord, dist_to_seattle: f64) -> Self {
        use chrono::Datelike;

        let month = sale.date.month();
        let year = sale.date.year();
        let price_sqft_living = sale.price / sale.sqft_living;

        Self {
            id: sale.id,
            date: sale.date,
            price: sale.price,
            bedrooms: sale.bedrooms,
            bathrooms: sale.bathrooms,
            sqft_living: sale.sqft_living,
            sqft_lot: sale.sqft_lot,
            floors: sale.floors,
            waterfront: sale.waterfront,
            view: sale.view,
            condition: sale.condition,
            grade: sale.grade,
            sqft_above: sale.sqft_above,
            sqft_basement: sale.sqft_basement,
            yr_built: sale.yr_built,
            yr_renovated: sale.yr_renovated,
            zipcode: sale.zipcode,
            lat: sale.lat,
            long: sale.long,
            sqft_living15: sale.sqft_living15,
            sqft_lot15: sale.sqft_lot15,
            month,
            year,
            dist_to_seattle,
            price_sqft_living,
            multi_sold: false,
            date_sold_old: None,
            price_sold_old: None,
        }
    }
}

/// The reduced target-population row: structural columns dropped, renovation
/// age appended. Only properties in accepted zip codes are projected.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TargetRecord {
    pub id: u64,
    pub date: NaiveDate,
    pub price: f64,
    pub condition: i32,
    pub yr_built: i32,
    pub yr_renovated: i32,
    pub zipcode: u32,
    pub lat: f64,
    pub long: f64,
    pub dist_to_seattle: f64,
    pub price_sqft_living: f64,
    pub multi_sold: bool,
    pub date_sold_old: Option<NaiveDate>,
    pub price_sold_old: Option<f64>,
    pub yrs_since_renovation: i32,
}

impl TargetRecord {
    /// Output column order, matching the serialized field order.
    pub const COLUMNS: &'static [&'static str] = &[
        "id",
        "date",
        "price",
        "condition",
        "yr_built",
        "yr_renovated",
        "zipcode",
        "lat",
        "long",
        "dist_to_seattle",
        "price_sqft_living",
        "multi_sold",
        "date_sold_old",
        "price_sold_old",
        "yrs_since_renovation",
    ];

    pub fn from_enriched(record: &EnrichedRecord, yrs_since_renovation: i32) -> Self {
        Self {
            id: record.id,
            date: record.date,
            price: record.price,
            condition: record.condition,
            yr_built: record.yr_built,
            yr_renovated: record.yr_renovated,
            zipcode: record.zipcode,
            lat: record.lat,
            long: record.long,
            dist_to_seattle: record.dist_to_seattle,
            price_sqft_living: record.price_sqft_living,
            multi_sold: record.multi_sold,
            date_sold_old: record.date_sold_old,
            price_sold_old: record.price_sold_old,
            yrs_since_renovation,
        }
    }
}
