//! AI skill extraction module

pub mod extractor;
pub mod prompts;
pub mod response;
