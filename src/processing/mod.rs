//! Skill matching, aggregation and monthly analysis

pub mod analyzer;
pub mod catalog;
pub mod classifier;
pub mod document;
pub mod ingest;
pub mod matcher;
pub mod month;
pub mod normalizer;
pub mod skill_categories;
pub mod statistics;
pub mod trends;
