//! Descriptive metadata of an audit.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Project, client and standard an audit belongs to.
///
/// Every field is optional; stores fill `created_at` when the audit is first
/// written.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditInfo {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client: Option<String>,
    /// Norm or standard the audit is run against
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub standard: Option<String>,
    /// Version of the standard
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

impl AuditInfo {
    #[must_use]
    pub fn project(mut self, project: impl Into<String>) -> Self {
        self.project = non_blank(Some(project.into()));
        self
    }

    #[must_use]
    pub fn client(mut self, client: impl Into<String>) -> Self {
        self.client = non_blank(Some(client.into()));
        self
    }

    #[must_use]
    pub fn standard(mut self, standard: impl Into<String>) -> Self {
        self.standard = non_blank(Some(standard.into()));
        self
    }

    #[must_use]
    pub fn version(mut self, version: impl Into<String>) -> Self {
        self.version = non_blank(Some(version.into()));
        self
    }

    /// Overwrite fields that `update` sets. `created_at` is never replaced
    /// once known.
    pub fn merge(&mut self, update: Self) {
        if let Some(project) = non_blank(update.project) {
            self.project = Some(project);
        }
        if let Some(client) = non_blank(update.client) {
            self.client = Some(client);
        }
        if let Some(standard) = non_blank(update.standard) {
            self.standard = Some(standard);
        }
        if let Some(version) = non_blank(update.version) {
            self.version = Some(version);
        }
        if self.created_at.is_none() {
            self.created_at = update.created_at;
        }
    }

    /// `"ACME SI (Client Co)"`, or `None` without a project.
    #[must_use]
    pub fn project_label(&self) -> Option<String> {
        let project = self.project.as_deref()?;
        Some(match self.client.as_deref() {
            Some(client) => format!("{project} ({client})"),
            None => project.to_string(),
        })
    }

    /// `"ISO 27001 v2022"`, or `None` without a standard.
    #[must_use]
    pub fn standard_label(&self) -> Option<String> {
        let standard = self.standard.as_deref()?;
        Some(match self.version.as_deref() {
            Some(version) => format!("{standard} v{version}"),
            None => standard.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_merge_keeps_unset_fields_and_creation_time() {
        let created = Utc.with_ymd_and_hms(2026, 9, 1, 8, 0, 0).single();
        let mut info = AuditInfo {
            created_at: created,
            ..AuditInfo::default().project("Refonte SI").standard("ISO 27001")
        };
        info.merge(AuditInfo {
            created_at: Some(Utc::now()),
            client: Some("  ".to_string()),
            ..AuditInfo::default().version("2022")
        });
        assert_eq!(info.project.as_deref(), Some("Refonte SI"));
        assert_eq!(info.client, None);
        assert_eq!(info.standard_label().as_deref(), Some("ISO 27001 v2022"));
        assert_eq!(info.created_at, created);
    }

    #[test]
    fn test_labels() {
        let info = AuditInfo::default().project("Refonte SI").client("ACME");
        assert_eq!(info.project_label().as_deref(), Some("Refonte SI (ACME)"));
        assert_eq!(info.standard_label(), None);
        assert_eq!(AuditInfo::default().project_label(), None);
    }

    #[test]
    fn test_empty_fields_are_not_serialized() {
        let json = serde_json::to_value(AuditInfo::default().standard("interne")).unwrap();
        assert_eq!(json, serde_json::json!({"standard": "interne"}));
    }
}
