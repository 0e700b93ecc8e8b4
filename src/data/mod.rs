//! Data sources that do not come from user-supplied files.

pub mod sample;

pub use sample::*;
