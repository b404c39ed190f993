pub mod config;
pub mod domain;
pub mod error;
pub mod infra;
pub mod logging;
pub mod merge;
pub mod observability;
pub mod query;
pub mod search;
