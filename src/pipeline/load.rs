//! Store opening, catalog resolution and context construction.

use super::PipelineError;
use crate::catalog::{load_catalog, Catalog};
use crate::config::{default_store_path, AppConfig, Validatable};
use crate::context::AuditContext;
use crate::store::{JsonFileStore, NormLibrary};
use anyhow::{bail, Context, Result};
use std::path::PathBuf;

/// Where the catalog of an operation comes from.
///
/// A file takes precedence over a saved norm. With neither, operations run
/// against an empty catalog: records keep their stored text and
/// recommendations fall back to the configured defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CatalogSource {
    /// Catalog file (CSV, YAML or JSON)
    pub path: Option<PathBuf>,
    /// Name of a norm saved in the store
    pub norm: Option<String>,
}

impl CatalogSource {
    #[must_use]
    pub fn file(path: impl Into<PathBuf>) -> Self {
        Self {
            path: Some(path.into()),
            norm: None,
        }
    }

    #[must_use]
    pub fn norm(name: impl Into<String>) -> Self {
        Self {
            path: None,
            norm: Some(name.into()),
        }
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.path.is_none() && self.norm.is_none()
    }

    /// Human-readable origin, for report metadata.
    #[must_use]
    pub fn describe(&self) -> Option<String> {
        match (&self.path, &self.norm) {
            (Some(path), _) => Some(path.display().to_string()),
            (None, Some(name)) => Some(format!("norm:{name}")),
            (None, None) => None,
        }
    }

    /// Load the catalog, looking saved norms up in `library`.
    pub fn load(&self, library: &dyn NormLibrary) -> Result<Catalog> {
        if let Some(path) = &self.path {
            let catalog = load_catalog(path).map_err(|e| PipelineError::LoadFailed {
                path: path.display().to_string(),
                source: e.into(),
            })?;
            return Ok(catalog);
        }
        if let Some(name) = &self.norm {
            let rows = library
                .get_norm(name)?
                .ok_or_else(|| PipelineError::UnknownNorm { name: name.clone() })?;
            tracing::debug!("Using norm '{}' ({} rows)", name, rows.len());
            return Ok(Catalog::new(rows));
        }
        tracing::debug!("No catalog given, evaluating stored records only");
        Ok(Catalog::default())
    }
}

/// Store file from configuration, or the per-user default.
#[must_use]
pub fn resolve_store_path(config: &AppConfig) -> PathBuf {
    config.store.path.clone().unwrap_or_else(default_store_path)
}

/// Open the configured response store.
pub fn open_store(config: &AppConfig) -> Result<JsonFileStore> {
    let path = resolve_store_path(config);
    tracing::debug!("Opening store {}", path.display());
    JsonFileStore::open(&path)
        .with_context(|| format!("Failed to open store: {}", path.display()))
}

/// Validate the configuration and build the context of one operation.
pub fn build_context(
    audit_id: &str,
    catalog: Catalog,
    config: &AppConfig,
) -> Result<AuditContext> {
    let errors = config.validate();
    if !errors.is_empty() {
        let lines: Vec<String> = errors.iter().map(|e| format!("  {e}")).collect();
        bail!("Invalid configuration:\n{}", lines.join("\n"));
    }
    AuditContext::from_config(audit_id, catalog, config)
        .with_context(|| format!("Failed to prepare audit '{audit_id}'"))
}
