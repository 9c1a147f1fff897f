//! Visit aggregation and ranking.
//!
//! Turns the station and place catalogs plus the flat list of visit records
//! into the rankings and rollup-window counts a dashboard renders. Everything
//! in here is pure and synchronous.

pub mod lookup;
pub mod pipeline;
pub mod ranking;
pub mod types;
pub mod utility;
pub mod windows;

pub use pipeline::aggregate_dashboard;
