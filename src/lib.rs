//! citizens - import service for citizen records with mutual relatives
//!
//! Batches of citizens are validated field by field, checked as a whole for
//! unique ids and symmetric relatives, and stored all-or-nothing. Single
//! citizens can then be patched with relative edges kept symmetric, and each
//! import answers birthday and age-percentile queries.

pub mod batch;
pub mod cli;
pub mod config;
pub mod http_server;
pub mod observability;
pub mod schema;
pub mod service;
pub mod stats;
pub mod storage;
