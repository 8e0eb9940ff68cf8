//! Persistence for statistics and monthly reports

pub mod report_store;
pub mod stats_store;
