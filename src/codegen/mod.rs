//! Pattern and relation compilation, prefetch orchestration, bulk data
//! loading, and the per-command executors built on top of them.

pub mod commands;
pub mod data;
pub mod pattern;
pub mod prefetch;
pub mod relations;
