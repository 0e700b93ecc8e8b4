//! `pluvio` library crate.
//!
//! The binary (`pluvio`) is a thin wrapper around this library so that:
//!
//! - core logic is testable without spawning processes
//! - modules are reusable (e.g., future batch jobs, service endpoints, notebooks)
//! - code stays easy to navigate as the project grows

pub mod app;
pub mod cli;
pub mod data;
pub mod debug;
pub mod domain;
pub mod error;
pub mod finder;
pub mod io;
pub mod plot;
pub mod report;
pub mod tui;
