//! Pipeline orchestration for audit operations.
//!
//! This module provides the shared open store → load catalog → evaluate →
//! report steps, reducing duplication across CLI command handlers.

mod load;
mod output;
mod report_stage;

pub use load::{build_context, open_store, resolve_store_path, CatalogSource};
pub use output::{should_use_color, write_output, OutputTarget};
pub use report_stage::{output_evaluation, report_config};

/// Structured pipeline error types for better diagnostics.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    /// Failed to read or parse a catalog or answer sheet
    #[error("Load failed for {path}: {source}")]
    LoadFailed {
        path: String,
        source: anyhow::Error,
    },

    /// A named norm is not in the library
    #[error("Unknown norm '{name}'")]
    UnknownNorm { name: String },

    /// Report generation or output failed
    #[error("Report failed: {source}")]
    ReportFailed {
        #[source]
        source: anyhow::Error,
    },
}

/// Exit codes for CI/CD integration
pub mod exit_codes {
    /// Success
    pub const SUCCESS: i32 = 0;
    /// Compliance rate is below the requested minimum
    pub const BELOW_THRESHOLD: i32 = 1;
    /// Some records of a batch could not be saved
    pub const PARTIAL_FAILURE: i32 = 1;
    /// An error occurred
    pub const ERROR: i32 = 3;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_codes_values() {
        assert_eq!(exit_codes::SUCCESS, 0);
        assert_eq!(exit_codes::BELOW_THRESHOLD, 1);
        assert_eq!(exit_codes::PARTIAL_FAILURE, 1);
        assert_eq!(exit_codes::ERROR, 3);
    }

    #[test]
    fn test_pipeline_error_messages() {
        let err = PipelineError::UnknownNorm {
            name: "iso27001".to_string(),
        };
        assert_eq!(err.to_string(), "Unknown norm 'iso27001'");
    }
}
