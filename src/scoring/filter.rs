//! Record views: domain, free-text and open-item filters.

use crate::model::ResponseRecord;
use serde::{Deserialize, Serialize};

/// Filter selecting a view over an audit's records.
///
/// All criteria combine with AND. An empty filter keeps everything.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RecordFilter {
    /// Exact domain name
    pub domain: Option<String>,
    /// Case-insensitive substring over qid, item, question and comment
    pub query: Option<String>,
    /// Keep only non-compliant and partially-compliant records
    pub open_only: bool,
}

impl RecordFilter {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn domain(mut self, domain: impl Into<String>) -> Self {
        self.domain = Some(domain.into());
        self
    }

    #[must_use]
    pub fn query(mut self, query: impl Into<String>) -> Self {
        self.query = Some(query.into());
        self
    }

    #[must_use]
    pub const fn open_only(mut self, open_only: bool) -> Self {
        self.open_only = open_only;
        self
    }

    /// Whether the filter keeps every record.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.domain.as_deref().map_or(true, str::is_empty)
            && self.query.as_deref().map_or(true, |q| q.trim().is_empty())
            && !self.open_only
    }

    #[must_use]
    pub fn matches(&self, record: &ResponseRecord) -> bool {
        if let Some(domain) = self.domain.as_deref().filter(|d| !d.is_empty()) {
            if record.domain != domain {
                return false;
            }
        }
        if self.open_only && !record.level.is_open() {
            return false;
        }
        match self.query.as_deref().map(str::trim).filter(|q| !q.is_empty()) {
            Some(query) => {
                let needle = query.to_lowercase();
                [&record.qid, &record.item, &record.question, &record.comment]
                    .iter()
                    .any(|field| field.to_lowercase().contains(&needle))
            }
            None => true,
        }
    }

    /// Records kept by the filter, in input order.
    pub fn apply<'a>(&self, records: &'a [ResponseRecord]) -> Vec<&'a ResponseRecord> {
        records.iter().filter(|r| self.matches(r)).collect()
    }
}
