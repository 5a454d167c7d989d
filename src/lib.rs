//! Per-author contribution statistics for git repositories.
//!
//! Commits are grouped by a canonical author key ([`identity`]), their file
//! changes filtered ([`filter`]) and summed ([`summary`]), rolled up per
//! repository and merged across repositories ([`stats`]).

pub mod analyze;
pub mod cli;
pub mod config;
pub mod error;
pub mod filter;
pub mod git;
pub mod identity;
pub mod logging;
pub mod model;
pub mod range;
pub mod report;
pub mod stats;
pub mod summary;
