//! Data models: input corpora, candidates, results and configuration.

pub mod config;
pub mod corpus;
pub mod result;
