//! CLI command handlers.
//!
//! This module provides testable command handlers that are invoked by main.rs.
//! Each handler implements the business logic for a specific CLI subcommand
//! and returns the process exit code.

mod audit;
mod evaluate;
mod norm;

pub use audit::{run_attach, run_delete, run_import, run_init, run_list, run_set, SetArgs};
pub use evaluate::{run_plan, run_report, run_score, EvaluateArgs};
pub use norm::{run_norm_delete, run_norm_list, run_norm_save, run_norm_show};

// Re-export pipeline types used by handlers
pub use crate::pipeline::CatalogSource;
