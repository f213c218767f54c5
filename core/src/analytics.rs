//! Analytics aggregation over a record subset.
//!
//! This module:
//!   1. Counts the subset by stored risk level and by score band
//!   2. Computes totals, mean score, and approval rate
//!   3. Emits the (income, score, risk) correlation sample in subset order
//!   4. Synthesizes the decorative monthly trend series
//!   5. Builds the dashboard overview over a full population
//!
//! The trend series is drawn from its own RNG stream and never looks at
//! the records. It is a placeholder, not a historical rollup.
//! Every other field is a pure function of the subset.

use crate::{
    record::{ApplicationRecord, ApplicationStatus, RiskLevel},
    rng::DeskRng,
    types::CreditScore,
};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

const TREND_SPACING_DAYS: i64 = 30;

// ── Public types ─────────────────────────────────────────────────────────────

/// Five non-overlapping bands covering every possible score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ScoreBand {
    #[serde(rename = "Excellent (750+)")]
    Excellent,
    #[serde(rename = "Good (700-749)")]
    Good,
    #[serde(rename = "Fair (650-699)")]
    Fair,
    #[serde(rename = "Poor (600-649)")]
    Poor,
    #[serde(rename = "Very Poor (<600)")]
    VeryPoor,
}

impl ScoreBand {
    pub const ALL: [ScoreBand; 5] = [
        Self::Excellent,
        Self::Good,
        Self::Fair,
        Self::Poor,
        Self::VeryPoor,
    ];

    pub fn for_score(score: CreditScore) -> Self {
        match score {
            s if s >= 750 => Self::Excellent,
            s if s >= 700 => Self::Good,
            s if s >= 650 => Self::Fair,
            s if s >= 600 => Self::Poor,
            _ => Self::VeryPoor,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Excellent => "Excellent (750+)",
            Self::Good => "Good (700-749)",
            Self::Fair => "Fair (650-699)",
            Self::Poor => "Poor (600-649)",
            Self::VeryPoor => "Very Poor (<600)",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IncomeScorePoint {
    pub income: u64,
    pub score: CreditScore,
    pub risk_level: RiskLevel,
}

/// One point of the simulated monthly series.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrendPoint {
    /// Short month name, e.g. "Mar".
    pub month: String,
    pub applications: u32,
    pub avg_score: u32,
    pub approval_rate: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyticsReport {
    /// Only levels present in the subset appear.
    pub risk_distribution: BTreeMap<RiskLevel, usize>,
    /// Every band appears, zero or not.
    pub score_ranges: BTreeMap<ScoreBand, usize>,
    pub monthly_trend: Vec<TrendPoint>,
    pub income_score_sample: Vec<IncomeScorePoint>,
    pub total_applications: usize,
    pub avg_score: CreditScore,
    pub total_loan_value: u64,
    /// Percentage, rounded.
    pub approval_rate: u32,
}

/// Result of `summarize`: an explicit "no data" marker for an empty
/// subset, a full report otherwise.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AnalyticsSummary {
    NoData,
    Report(AnalyticsReport),
}

impl AnalyticsSummary {
    pub fn is_no_data(&self) -> bool {
        matches!(self, Self::NoData)
    }

    pub fn report(&self) -> Option<&AnalyticsReport> {
        match self {
            Self::NoData => None,
            Self::Report(report) => Some(report),
        }
    }
}

/// How many applications the dashboard lists as recent.
pub const RECENT_APPLICATIONS: usize = 5;

/// Headline counts over the full population.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardOverview {
    pub total_applications: usize,
    pub approved: usize,
    pub pending: usize,
    pub under_review: usize,
    pub rejected: usize,
    /// Stored risk level High or Critical.
    pub high_risk: usize,
    pub avg_score: CreditScore,
    pub total_loan_amount: u64,
    pub approval_rate: u32,
    /// Newest applications first; ties keep population order.
    pub recent: Vec<ApplicationRecord>,
}

// ── Aggregation ──────────────────────────────────────────────────────────────

/// Summarize a subset. `trend_rng` and `now` feed only the decorative
/// monthly series; `trend_points` is its length.
pub fn summarize(
    subset: &[ApplicationRecord],
    trend_rng: &mut DeskRng,
    now: DateTime<Utc>,
    trend_points: usize,
) -> AnalyticsSummary {
    if subset.is_empty() {
        return AnalyticsSummary::NoData;
    }

    let mut risk_distribution = BTreeMap::new();
    let mut score_ranges: BTreeMap<ScoreBand, usize> =
        ScoreBand::ALL.iter().map(|band| (*band, 0)).collect();
    let mut score_sum: i64 = 0;
    let mut total_loan_value: u64 = 0;
    let mut approved = 0usize;

    for record in subset {
        *risk_distribution.entry(record.risk_level).or_insert(0) += 1;
        *score_ranges.entry(ScoreBand::for_score(record.credit_score)).or_insert(0) += 1;
        score_sum += i64::from(record.credit_score);
        total_loan_value = total_loan_value.saturating_add(record.loan_amount);
        if record.status == ApplicationStatus::Approved {
            approved += 1;
        }
    }

    let total = subset.len();
    let income_score_sample = subset
        .iter()
        .map(|r| IncomeScorePoint {
            income: r.income,
            score: r.credit_score,
            risk_level: r.risk_level,
        })
        .collect();

    AnalyticsSummary::Report(AnalyticsReport {
        risk_distribution,
        score_ranges,
        monthly_trend: monthly_trend(trend_rng, now, trend_points),
        income_score_sample,
        total_applications: total,
        avg_score: rounded_mean(score_sum, total),
        total_loan_value,
        approval_rate: percentage(approved, total),
    })
}

/// Simulated series, oldest point first, one point per 30 days ending at
/// `now`. Independent of any records.
pub fn monthly_trend(rng: &mut DeskRng, now: DateTime<Utc>, points: usize) -> Vec<TrendPoint> {
    (0..points)
        .map(|i| {
            let months_back = (points - 1 - i) as i64;
            let at = now - Duration::days(TREND_SPACING_DAYS * months_back);
            TrendPoint {
                month: at.format("%b").to_string(),
                applications: rng.i64_in(30..80) as u32,
                avg_score: rng.i64_in(600..700) as u32,
                approval_rate: rng.i64_in(60..90) as u32,
            }
        })
        .collect()
}

pub fn overview(records: &[ApplicationRecord]) -> DashboardOverview {
    let mut out = DashboardOverview {
        total_applications: records.len(),
        ..DashboardOverview::default()
    };
    if records.is_empty() {
        return out;
    }

    let mut score_sum: i64 = 0;
    for record in records {
        match record.status {
            ApplicationStatus::Approved => out.approved += 1,
            ApplicationStatus::Pending => out.pending += 1,
            ApplicationStatus::UnderReview => out.under_review += 1,
            ApplicationStatus::Rejected => out.rejected += 1,
        }
        if record.risk_level.is_elevated() {
            out.high_risk += 1;
        }
        score_sum += i64::from(record.credit_score);
        out.total_loan_amount = out.total_loan_amount.saturating_add(record.loan_amount);
    }
    out.avg_score = rounded_mean(score_sum, records.len());
    out.approval_rate = percentage(out.approved, records.len());
    out.recent = most_recent(records, RECENT_APPLICATIONS);
    out
}

/// The `limit` newest records, sorted on borrowed references so the
/// caller's order is left alone.
pub fn most_recent(records: &[ApplicationRecord], limit: usize) -> Vec<ApplicationRecord> {
    let mut by_date: Vec<&ApplicationRecord> = records.iter().collect();
    by_date.sort_by(|a, b| b.application_date.cmp(&a.application_date));
    by_date.into_iter().take(limit).cloned().collect()
}

fn rounded_mean(sum: i64, count: usize) -> CreditScore {
    (sum as f64 / count as f64).round() as CreditScore
}

fn percentage(part: usize, whole: usize) -> u32 {
    (part as f64 / whole as f64 * 100.0).round() as u32
}
