//! Default values for audit-tools configuration.

use std::path::PathBuf;

/// Audit id used when neither the command line nor the config names one.
pub const DEFAULT_AUDIT_ID: &str = "default";

/// Default report title.
pub const DEFAULT_REPORT_TITLE: &str = "Compliance Audit Report";

/// Default currency suffix for amounts.
pub const DEFAULT_CURRENCY: &str = "€";

/// Domains scoring under this rate are flagged as weakest.
pub const DEFAULT_WEAK_DOMAIN_THRESHOLD: u32 = 50;

/// File name of the response store.
pub const DEFAULT_STORE_FILE: &str = "responses.json";

/// Default store location: `<data dir>/audit-tools/responses.json`,
/// falling back to the current directory.
#[must_use]
pub fn default_store_path() -> PathBuf {
    dirs::data_dir().map_or_else(
        || PathBuf::from(DEFAULT_STORE_FILE),
        |dir| dir.join("audit-tools").join(DEFAULT_STORE_FILE),
    )
}
