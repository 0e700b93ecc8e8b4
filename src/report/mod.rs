//! Reporting utilities: station summaries, period blocks, scan rankings.
//!
//! We keep formatting code in one place so:
//! - the finder stays clean and testable
//! - output changes are localized (important for future snapshot tests)

pub mod format;

pub use format::*;
