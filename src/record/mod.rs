//! Core data model for the harvesting pipeline
//!
//! This module defines:
//! - [`Link`] - an opaque detail-page identifier, unique within a run
//! - [`FieldValue`] - a scalar/list field value with a distinguished absent marker
//! - [`Record`] - one harvested record over the fixed column schema
//! - [`FailedLink`] - a link that failed extraction, with failure metadata
//! - [`RoundResult`] - the partitioned outcome of one retry round
//! - [`RunSummary`] - aggregate counts computed at consolidation time

pub mod schema;

use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::fmt;

/// An opaque identifier (URL or path) for one detail page.
///
/// The frontier guarantees uniqueness within a run before a link is ever
/// handed downstream.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Link(String);

impl Link {
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Link {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Link {
    fn from(raw: &str) -> Self {
        Self(raw.to_string())
    }
}

/// A single field value on a record.
///
/// Absence is a per-field outcome, never a record-level error: an extractor
/// that cannot locate a field sets [`FieldValue::Absent`] and the record
/// still counts as a success.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Text(String),
    Number(i64),
    List(Vec<String>),
    Absent,
}

impl FieldValue {
    pub fn is_absent(&self) -> bool {
        matches!(self, FieldValue::Absent)
    }

    /// Renders the value for tabular output; absent values render empty
    pub fn render(&self) -> String {
        match self {
            FieldValue::Text(s) => s.clone(),
            FieldValue::Number(n) => n.to_string(),
            FieldValue::List(items) => items.join("; "),
            FieldValue::Absent => String::new(),
        }
    }

    /// Wraps optional text, mapping None (and empty strings) to Absent
    pub fn from_optional_text(text: Option<String>) -> Self {
        match text {
            Some(s) if !s.trim().is_empty() => FieldValue::Text(s.trim().to_string()),
            _ => FieldValue::Absent,
        }
    }
}

/// One harvested record: a mapping of schema columns to field values,
/// carrying its source link and site identifier.
#[derive(Debug, Clone)]
pub struct Record {
    site: String,
    link: Link,
    fields: HashMap<String, FieldValue>,
}

impl Record {
    /// Creates an empty record for the given site and source link.
    ///
    /// The `site` and `job_url` columns are pre-populated so every row can be
    /// traced back to its origin even if extraction yields nothing else.
    pub fn new(site: impl Into<String>, link: Link) -> Self {
        let site = site.into();
        let mut fields = HashMap::new();
        fields.insert("site".to_string(), FieldValue::Text(site.clone()));
        fields.insert("job_url".to_string(), FieldValue::Text(link.to_string()));
        Self { site, link, fields }
    }

    pub fn site(&self) -> &str {
        &self.site
    }

    pub fn link(&self) -> &Link {
        &self.link
    }

    /// Sets a field value. Unknown columns are stored too; the tabular
    /// writers simply ignore anything outside the schema.
    pub fn set(&mut self, column: impl Into<String>, value: FieldValue) {
        self.fields.insert(column.into(), value);
    }

    /// Gets a field value, treating unset columns as absent
    pub fn get(&self, column: &str) -> &FieldValue {
        self.fields.get(column).unwrap_or(&FieldValue::Absent)
    }

    /// Number of fields that carry a non-absent value
    pub fn populated_fields(&self) -> usize {
        self.fields.values().filter(|v| !v.is_absent()).count()
    }
}

/// A link that failed extraction in some round, with failure metadata
#[derive(Debug, Clone)]
pub struct FailedLink {
    pub link: Link,
    pub error: String,
    pub failed_at: DateTime<Utc>,
}

impl FailedLink {
    pub fn new(link: Link, error: impl Into<String>) -> Self {
        Self {
            link,
            error: error.into(),
            failed_at: Utc::now(),
        }
    }
}

/// The output of one retry round: successes and failures, partitioned.
///
/// Conservation invariant: `successes.len() + failures.len()` equals the
/// number of links the round was given.
#[derive(Debug, Default)]
pub struct RoundResult {
    pub round: usize,
    pub successes: Vec<Record>,
    pub failures: Vec<FailedLink>,
}

impl RoundResult {
    pub fn new(round: usize) -> Self {
        Self {
            round,
            successes: Vec::new(),
            failures: Vec::new(),
        }
    }

    /// Folds another partial result (e.g. one batch) into this one
    pub fn merge(&mut self, other: RoundResult) {
        self.successes.extend(other.successes);
        self.failures.extend(other.failures);
    }

    /// The links to feed into the next round
    pub fn failed_links(&self) -> Vec<Link> {
        self.failures.iter().map(|f| f.link.clone()).collect()
    }

    pub fn total(&self) -> usize {
        self.successes.len() + self.failures.len()
    }
}

/// Per-round success/failure counts for the run summary
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoundCounts {
    pub round: usize,
    pub successes: usize,
    pub failures: usize,
}

/// Aggregate counts for a completed run, computed once by the consolidator
#[derive(Debug, Clone)]
pub struct RunSummary {
    /// Total links discovered (or loaded, for rescrape runs)
    pub total_links: usize,

    /// Total successful records across all rounds
    pub total_successes: usize,

    /// Links still failing after the terminal round
    pub permanent_failures: usize,

    /// Number of rounds executed (round 0 counts)
    pub rounds_executed: usize,

    /// Per-round success/failure counts, in round order
    pub per_round: Vec<RoundCounts>,

    /// Hash of the configuration the run was started with
    pub config_hash: String,
}

impl RunSummary {
    /// Success rate as a percentage of total discovered links
    pub fn success_rate(&self) -> f64 {
        if self.total_links == 0 {
            0.0
        } else {
            (self.total_successes as f64 / self.total_links as f64) * 100.0
        }
    }
}
