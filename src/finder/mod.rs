//! Rainy-period detection — the numeric core of the crate.
//!
//! Responsibilities:
//!
//! - trailing fixed-count window sums over a station's recorded rows (`rolling`)
//! - the repeated maximum-window selection with suppression (`periods`)
//!
//! Everything here is pure: no I/O, no shared state, no station metadata.
//! Callers resolve identifiers to series and join display metadata afterwards.

pub mod periods;
pub mod rolling;

pub use periods::*;
pub use rolling::*;
