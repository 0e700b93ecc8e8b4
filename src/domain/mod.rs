//! Domain types used throughout the pipeline.
//!
//! This module defines:
//!
//! - per-station daily observations (`DailyObservation`, `StationSeries`)
//! - finder outputs (`RainyPeriod`, `PeriodSet`)
//! - station metadata (`Station`, `StationDirectory`)
//! - the resolved run configuration (`RunConfig`)

pub mod types;

pub use types::*;
