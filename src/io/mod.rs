//! Input/output helpers.
//!
//! - daily climatology CSV ingest + validation (`ingest`)
//! - GeoJSON station directory (`stations`)
//! - per-period CSV export (`export`)
//! - periods JSON read/write (`periods`)

pub mod export;
pub mod ingest;
pub mod periods;
pub mod stations;
