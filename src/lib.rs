// Pedantic lints this crate opts out of:
// - cast_sign_loss / cast_possible_wrap: SQLite COUNT/SUM results and LIMIT
//   values cross between i64 and u64/usize
// - missing_errors_doc: every fallible fn returns the crate Result
// - module_name_repetitions: SearchQuery, StatsOutput and friends keep their module name
// - unused_async: required by rmcp's #[tool] macro
#![allow(
    clippy::cast_sign_loss,
    clippy::cast_possible_wrap,
    clippy::missing_errors_doc,
    clippy::module_name_repetitions,
    clippy::unused_async
)]

pub mod cli;
pub mod config;
pub mod db;
pub mod error;
pub mod indexer;
pub mod mcp;
pub mod models;
pub mod operations;
pub mod relations;
pub mod search;
pub mod stats;
