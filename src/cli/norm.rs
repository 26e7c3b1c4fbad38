//! Norm library command handlers.
//!
//! Implements `norm save|list|show|delete` over the catalogs saved in the
//! response store.

use crate::catalog::load_catalog;
use crate::config::AppConfig;
use crate::pipeline::{exit_codes, open_store, write_output, OutputTarget};
use crate::store::{NormInfo, NormLibrary};
use anyhow::{bail, Context, Result};
use std::fmt::Write as _;
use std::path::Path;

/// Run `norm save`: import a catalog file under a name.
pub fn run_norm_save(config: &AppConfig, name: &str, path: &Path) -> Result<i32> {
    if name.trim().is_empty() {
        bail!("Norm name must not be empty");
    }
    let catalog = load_catalog(path)
        .with_context(|| format!("Failed to load catalog: {}", path.display()))?;
    if catalog.is_empty() {
        bail!("Catalog {} has no rows", path.display());
    }
    let mut store = open_store(config)?;
    let info = store.save_norm(name.trim(), catalog.to_vec())?;
    tracing::info!("Saved norm '{}' ({} rows)", info.name, info.rows);
    Ok(exit_codes::SUCCESS)
}

/// Run `norm list`.
pub fn run_norm_list(config: &AppConfig, json: bool) -> Result<i32> {
    let store = open_store(config)?;
    let norms = store.list_norms()?;
    let content = if json {
        serde_json::to_string_pretty(&norms)?
    } else {
        format_norms(&norms)
    };
    write_output(&content, &OutputTarget::Stdout)?;
    Ok(exit_codes::SUCCESS)
}

/// Run `norm show`: print the rows of a saved norm as YAML or JSON.
pub fn run_norm_show(config: &AppConfig, name: &str, json: bool) -> Result<i32> {
    let store = open_store(config)?;
    let Some(rows) = store.get_norm(name)? else {
        bail!("Unknown norm '{name}'");
    };
    let content = if json {
        serde_json::to_string_pretty(&rows)?
    } else {
        serde_yaml::to_string(&rows).context("failed to serialize norm")?
    };
    write_output(&content, &OutputTarget::Stdout)?;
    Ok(exit_codes::SUCCESS)
}

/// Run `norm delete`.
pub fn run_norm_delete(config: &AppConfig, name: &str) -> Result<i32> {
    let mut store = open_store(config)?;
    if !store.delete_norm(name)? {
        bail!("Unknown norm '{name}'");
    }
    tracing::info!("Deleted norm '{name}'");
    Ok(exit_codes::SUCCESS)
}

fn format_norms(norms: &[NormInfo]) -> String {
    if norms.is_empty() {
        return "No norms saved.".to_string();
    }
    let width = norms
        .iter()
        .map(|n| n.name.chars().count())
        .max()
        .unwrap_or(0)
        .max("NORM".len());
    let mut out = String::new();
    let _ = writeln!(out, "{:<width$}  {:>5}  UPDATED", "NORM", "ROWS");
    for norm in norms {
        let _ = writeln!(
            out,
            "{:<width$}  {:>5}  {}",
            norm.name,
            norm.rows,
            norm.updated_at.format("%Y-%m-%d %H:%M:%S")
        );
    }
    out
}
