//! Filter engine: a stable, side-effect-free selection of records.
//!
//! The predicate is the AND of five independent checks; four of them are
//! skipped when their criterion is empty, and the score range always runs.
//! `apply` never reorders and never fails: an empty input or an inverted
//! score range simply yields an empty subset.

use crate::{
    error::{DeskError, DeskResult},
    record::{ApplicationRecord, ApplicationStatus, RiskLevel, MAX_CREDIT_SCORE, MIN_CREDIT_SCORE},
    types::CreditScore,
};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Inclusive `[min, max]`. Serialized as a two-element array.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreRange(pub CreditScore, pub CreditScore);

impl ScoreRange {
    pub fn min(&self) -> CreditScore {
        self.0
    }

    pub fn max(&self) -> CreditScore {
        self.1
    }

    pub fn contains(&self, score: CreditScore) -> bool {
        self.0 <= score && score <= self.1
    }
}

/// Inclusive `[start, end]` on application dates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl DateRange {
    pub fn contains(&self, at: DateTime<Utc>) -> bool {
        self.start <= at && at <= self.end
    }
}

/// The active selection. Replaced wholesale; never edited in place.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterCriteria {
    pub search_term: String,
    pub risk_level: BTreeSet<RiskLevel>,
    pub status: BTreeSet<ApplicationStatus>,
    pub score_range: ScoreRange,
    pub date_range: Option<DateRange>,
    /// Date bounds as entered, trimmed. A single filled bound counts as an
    /// active filter even though it restricts nothing.
    #[serde(default)]
    pub date_input: (String, String),
}

impl Default for FilterCriteria {
    fn default() -> Self {
        Self::with_score_bounds(MIN_CREDIT_SCORE, MAX_CREDIT_SCORE)
    }
}

impl FilterCriteria {
    /// Unrestricted criteria over the given score domain.
    pub fn with_score_bounds(floor: CreditScore, ceiling: CreditScore) -> Self {
        Self {
            search_term: String::new(),
            risk_level: BTreeSet::new(),
            status: BTreeSet::new(),
            score_range: ScoreRange(floor, ceiling),
            date_range: None,
            date_input: (String::new(), String::new()),
        }
    }

    pub fn matches(&self, record: &ApplicationRecord) -> bool {
        self.matches_with(record, &self.search_term.to_lowercase())
    }

    fn matches_with(&self, record: &ApplicationRecord, needle_lower: &str) -> bool {
        if !needle_lower.is_empty() && !record.matches_search(needle_lower) {
            return false;
        }
        if !self.risk_level.is_empty() && !self.risk_level.contains(&record.risk_level) {
            return false;
        }
        if !self.status.is_empty() && !self.status.contains(&record.status) {
            return false;
        }
        if !self.score_range.contains(record.credit_score) {
            return false;
        }
        match &self.date_range {
            Some(range) => range.contains(record.application_date),
            None => true,
        }
    }

    /// Field-by-field merge. Fields absent from `update` keep their value.
    /// Returns the replacement criteria; `self` is never modified, so a
    /// rejected update leaves the caller's criteria as they were.
    pub fn merged(&self, update: FilterUpdate) -> DeskResult<FilterCriteria> {
        let mut next = self.clone();
        if let Some(term) = update.search_term {
            next.search_term = term;
        }
        if let Some(levels) = update.risk_level {
            next.risk_level = levels;
        }
        if let Some(statuses) = update.status {
            next.status = statuses;
        }
        if let Some((min, max)) = update.score_range {
            next.score_range = ScoreRange(min, max);
        }
        if let Some((start, end)) = update.date_range {
            next.date_range = parse_date_range(&start, &end)?;
            next.date_input = (start.trim().to_string(), end.trim().to_string());
        }
        Ok(next)
    }
}

/// Stable filter: matching records in their original relative order.
pub fn apply(records: &[ApplicationRecord], criteria: &FilterCriteria) -> Vec<ApplicationRecord> {
    let needle = criteria.search_term.to_lowercase();
    records
        .iter()
        .filter(|r| criteria.matches_with(r, &needle))
        .cloned()
        .collect()
}

/// A partial criteria update as it arrives from a caller.
///
/// Shape errors (unknown fields, non-integer score bounds, unknown risk or
/// status names) are caught when parsing; date strings are checked when
/// merging. Either way the update is rejected before anything changes.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct FilterUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub search_term: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub risk_level: Option<BTreeSet<RiskLevel>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<BTreeSet<ApplicationStatus>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score_range: Option<(CreditScore, CreditScore)>,
    /// Either bound empty clears the date restriction.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_range: Option<(String, String)>,
}

impl FilterUpdate {
    pub fn from_json(value: serde_json::Value) -> DeskResult<Self> {
        serde_json::from_value(value)
            .map_err(|e| DeskError::invalid_criteria("filters", e.to_string()))
    }

    pub fn search(term: impl Into<String>) -> Self {
        Self {
            search_term: Some(term.into()),
            ..Self::default()
        }
    }

    pub fn risk_levels(levels: impl IntoIterator<Item = RiskLevel>) -> Self {
        Self {
            risk_level: Some(levels.into_iter().collect()),
            ..Self::default()
        }
    }

    pub fn statuses(statuses: impl IntoIterator<Item = ApplicationStatus>) -> Self {
        Self {
            status: Some(statuses.into_iter().collect()),
            ..Self::default()
        }
    }

    pub fn score_range(min: CreditScore, max: CreditScore) -> Self {
        Self {
            score_range: Some((min, max)),
            ..Self::default()
        }
    }

    pub fn date_range(start: impl Into<String>, end: impl Into<String>) -> Self {
        Self {
            date_range: Some((start.into(), end.into())),
            ..Self::default()
        }
    }
}

/// Each filled bound must parse; the range applies only when both are filled.
fn parse_date_range(start: &str, end: &str) -> DeskResult<Option<DateRange>> {
    let start = parse_optional_bound("dateRange.start", start)?;
    let end = parse_optional_bound("dateRange.end", end)?;
    Ok(start.zip(end).map(|(start, end)| DateRange { start, end }))
}

fn parse_optional_bound(field: &str, raw: &str) -> DeskResult<Option<DateTime<Utc>>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(None);
    }
    parse_bound(field, raw).map(Some)
}

/// RFC 3339, or a bare `YYYY-MM-DD` taken as UTC midnight.
fn parse_bound(field: &str, raw: &str) -> DeskResult<DateTime<Utc>> {
    if let Ok(at) = DateTime::parse_from_rfc3339(raw) {
        return Ok(at.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|dt| dt.and_utc())
        .ok_or_else(|| DeskError::invalid_criteria(field, format!("unparseable date '{raw}'")))
}
