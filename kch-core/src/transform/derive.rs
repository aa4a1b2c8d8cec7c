//! Column derivation — calendar fields, geodesic distance, price per sqft.

use geo::{point, GeodesicDistance};

use crate::record::{EnrichedRecord, SaleRecord};

/// Ellipsoidal geodesic distance in kilometers (Karney's algorithm on the
/// WGS84 ellipsoid, via `geo`). Matches the precision of a geodesic library
/// rather than a spherical haversine approximation.
pub fn distance_km(from: (f64, f64), to: (f64, f64)) -> f64 {
    let a = point!(x: from.1, y: from.0);
    let b = point!(x: to.1, y: to.0);
    a.geodesic_distance(&b) / 1000.0
}

/// Derive the computed columns for every raw record, in input order.
///
/// `reference` is the (lat, long) the distance column is measured from.
/// Sale-history fields are left unset here; duplicate resolution owns them.
pub fn enrich_all(sales: Vec<SaleRecord>, reference: (f64, f64)) -> Vec<EnrichedRecord> {
    sales
        .into_iter()
        .map(|sale| {
            let dist = distance_km(reference, (sale.lat, sale.long));
            EnrichedRecord::from_sale(sale, dist)
        })
        .collect()
}
