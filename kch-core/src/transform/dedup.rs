//! Duplicate resolution — one surviving record per property.
//!
//! Records are grouped by `id` in input order. Within a group of size >1,
//! all but the last record are superseded and dropped; the survivor keeps
//! the immediately preceding sale's date and price in `date_sold_old` /
//! `price_sold_old`. A property sold three times therefore retains only the
//! second-to-last sale as history; anything earlier is discarded.

use std::collections::HashMap;

use chrono::NaiveDate;
use thiserror::Error;

use crate::record::EnrichedRecord;

/// Violations of the duplicate-resolution invariants. These indicate a bug,
/// not bad input, and abort the run.
#[derive(Debug, Error)]
pub enum InvariantError {
    #[error("duplicate resolution for id {id} resolved to no surviving record")]
    NoSurvivor { id: u64 },

    #[error(
        "record conservation violated: {raw} raw rows != {surviving} surviving + {superseded} superseded"
    )]
    Conservation {
        raw: usize,
        surviving: usize,
        superseded: usize,
    },
}

/// Result of duplicate resolution.
#[derive(Debug)]
pub struct DedupOutcome {
    /// Surviving records, preserving input-relative order.
    pub records: Vec<EnrichedRecord>,
    /// Number of superseded rows dropped.
    pub superseded: usize,
    /// Number of distinct properties that were sold more than once.
    pub multi_sold_properties: usize,
}

/// Resolve multi-sale duplicates, folding old price/date into survivors.
pub fn resolve_duplicates(records: Vec<EnrichedRecord>) -> Result<DedupOutcome, InvariantError> {
    let raw = records.len();

    let mut group_size: HashMap<u64, usize> = HashMap::new();
    for record in &records {
        *group_size.entry(record.id).or_default() += 1;
    }
    let unique_ids = group_size.len();
    let multi_sold_properties = group_size.values().filter(|&&n| n > 1).count();

    let mut occurrence: HashMap<u64, usize> = HashMap::new();
    let mut last_superseded: HashMap<u64, (NaiveDate, f64)> = HashMap::new();
    let mut surviving = Vec::with_capacity(unique_ids);
    let mut superseded = 0usize;

    for mut record in records {
        let size = group_size[&record.id];
        let seen = occurrence.entry(record.id).or_insert(0);
        *seen += 1;

        if *seen < size {
            // Not the most recent sale: drop the row, but remember it as the
            // "old" sale for whichever record of this group survives.
            last_superseded.insert(record.id, (record.date, record.price));
            superseded += 1;
            continue;
        }

        if size > 1 {
            let (old_date, old_price) = last_superseded
                .remove(&record.id)
                .ok_or(InvariantError::NoSurvivor { id: record.id })?;
            record.multi_sold = true;
            record.date_sold_old = Some(old_date);
            record.price_sold_old = Some(old_price);
        }
        surviving.push(record);
    }

    if surviving.len() + superseded != raw || surviving.len() != unique_ids {
        return Err(InvariantError::Conservation {
            raw,
            surviving: surviving.len(),
            superseded,
        });
    }

    Ok(DedupOutcome {
        records: surviving,
        superseded,
        multi_sold_properties,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::SaleRecord;

    fn record(id: u64, date: (i32, u32, u32), price: f64) -> EnrichedRecord {
        let sale = SaleRecord {
            id,
            date: NaiveDate::from_ymd_opt(date.0, date.1, date.2).unwrap(),
            price,
            bedrooms: 3.0,
            bathrooms: 2.0,
            sqft_living: 1000.0,
            sqft_lot: 4000.0,
            floors: 1.0,
            waterfront: Some(0.0),
            view: Some(0.0),
            condition: 3,
            grade: 7,
            sqft_above: 1000.0,
            sqft_basement: 0.0,
            yr_built: 1970,
            yr_renovated: 0,
            zipcode: 98178,
            lat: 47.5112,
            long: -122.257,
            sqft_living15: 1000.0,
            sqft_lot15: 4000.0,
        };
        EnrichedRecord::from_sale(sale, 10.0)
    }

    #[test]
    fn unique_ids_pass_through_untouched() {
        let outcome =
            resolve_duplicates(vec![record(1, (2014, 5, 2), 100.0), record(2, (2014, 6, 3), 200.0)])
                .unwrap();
        assert_eq!(outcome.records.len(), 2);
        assert_eq!(outcome.superseded, 0);
        assert_eq!(outcome.multi_sold_properties, 0);
        assert!(outcome.records.iter().all(|r| !r.multi_sold));
        assert!(outcome.records.iter().all(|r| r.price_sold_old.is_none()));
    }

    #[test]
    fn twice_sold_property_keeps_old_price_and_date() {
        let outcome = resolve_duplicates(vec![
            record(1, (2014, 5, 2), 100.0),
            record(1, (2015, 1, 10), 150.0),
        ])
        .unwrap();
        assert_eq!(outcome.records.len(), 1);
        assert_eq!(outcome.superseded, 1);
        assert_eq!(outcome.multi_sold_properties, 1);

        let survivor = &outcome.records[0];
        assert!(survivor.multi_sold);
        assert_eq!(survivor.price, 150.0);
        assert_eq!(survivor.price_sold_old, Some(100.0));
        assert_eq!(
            survivor.date_sold_old,
            Some(NaiveDate::from_ymd_opt(2014, 5, 2).unwrap())
        );
    }

    #[test]
    fn thrice_sold_property_retains_only_second_to_last_sale() {
        // The worked example: id 795000620 sold at D1/D2/D3.
        let outcome = resolve_duplicates(vec![
            record(795000620, (2014, 6, 1), 100.0),
            record(795000620, (2014, 9, 1), 120.0),
            record(795000620, (2015, 3, 1), 150.0),
        ])
        .unwrap();
        assert_eq!(outcome.records.len(), 1);
        assert_eq!(outcome.superseded, 2);

        let survivor = &outcome.records[0];
        assert_eq!(survivor.price, 150.0);
        assert!(survivor.multi_sold);
        assert_eq!(survivor.price_sold_old, Some(120.0));
        assert_eq!(
            survivor.date_sold_old,
            Some(NaiveDate::from_ymd_opt(2014, 9, 1).unwrap())
        );
    }

    #[test]
    fn interleaved_groups_survive_in_input_order() {
        let outcome = resolve_duplicates(vec![
            record(1, (2014, 5, 2), 100.0),
            record(2, (2014, 5, 3), 200.0),
            record(1, (2014, 8, 2), 110.0),
            record(3, (2014, 5, 4), 300.0),
        ])
        .unwrap();
        let ids: Vec<u64> = outcome.records.iter().map(|r| r.id).collect();
        // Survivor of id 1 is its second occurrence, so it lands between 2 and 3.
        assert_eq!(ids, vec![2, 1, 3]);
    }

    #[test]
    fn survivor_is_last_by_row_order_not_by_date() {
        // "Most recent" means last in file order, even if dates disagree.
        let outcome = resolve_duplicates(vec![
            record(1, (2015, 5, 2), 150.0),
            record(1, (2014, 5, 2), 100.0),
        ])
        .unwrap();
        let survivor = &outcome.records[0];
        assert_eq!(survivor.price, 100.0);
        assert_eq!(survivor.price_sold_old, Some(150.0));
    }

    #[test]
    fn empty_input_resolves_to_empty() {
        let outcome = resolve_duplicates(Vec::new()).unwrap();
        assert!(outcome.records.is_empty());
        assert_eq!(outcome.superseded, 0);
    }
}
