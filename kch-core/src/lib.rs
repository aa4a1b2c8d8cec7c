//! KCH Core — cleaning and feature engineering for the King County house-price dataset.
//!
//! This crate contains the whole transformation pass:
//! - Column contract for the raw sales CSV
//! - Typed sale records and the enriched/target output rows
//! - Ingestion with strict type normalization
//! - Derivation stages (calendar fields, geodesic distance, price per sqft)
//! - Multi-sale duplicate resolution with old price/date folding
//! - Zip-code share filter over the price-per-sqft median
//! - CSV export plus a versioned run manifest
//!
//! The pipeline is a fixed composition of pure stages, each taking and
//! returning an explicit record collection. There is no shared mutable
//! working table; `pipeline::run_pipeline` wires the stages in order.

pub mod config;
pub mod export;
pub mod ingest;
pub mod pipeline;
pub mod record;
pub mod schema;
pub mod transform;
