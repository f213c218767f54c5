//! The credit-application record and its enumerated fields.

use crate::types::{CreditScore, RecordId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

pub const MIN_CREDIT_SCORE: CreditScore = 400;
pub const MAX_CREDIT_SCORE: CreditScore = 800;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum RiskLevel {
    Low,
    Medium,
    High,
    Critical,
}

impl RiskLevel {
    pub const ALL: [RiskLevel; 4] = [Self::Low, Self::Medium, Self::High, Self::Critical];

    /// Fixed thresholds: >700 Low, >600 Medium, >500 High, else Critical.
    pub fn from_score(score: CreditScore) -> Self {
        if score > 700 {
            Self::Low
        } else if score > 600 {
            Self::Medium
        } else if score > 500 {
            Self::High
        } else {
            Self::Critical
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Low => "Low",
            Self::Medium => "Medium",
            Self::High => "High",
            Self::Critical => "Critical",
        }
    }

    /// High and Critical count as elevated on the dashboard.
    pub fn is_elevated(&self) -> bool {
        matches!(self, Self::High | Self::Critical)
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ApplicationStatus {
    Pending,
    Approved,
    Rejected,
    #[serde(rename = "Under Review")]
    UnderReview,
}

impl ApplicationStatus {
    pub const ALL: [ApplicationStatus; 4] = [
        Self::Pending,
        Self::Approved,
        Self::Rejected,
        Self::UnderReview,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Self::Pending => "Pending",
            Self::Approved => "Approved",
            Self::Rejected => "Rejected",
            Self::UnderReview => "Under Review",
        }
    }
}

impl fmt::Display for ApplicationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One entry in a record's score explanation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExplainabilityFactor {
    pub factor: String,
    /// Signed contribution; negative factors pull the score down.
    pub impact: f64,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplicationRecord {
    pub id: RecordId,
    pub applicant_name: String,
    /// Only the live feed writes this after generation.
    pub credit_score: CreditScore,
    /// Derived from `credit_score` at generation time and never re-derived.
    /// See `current_risk` for the level implied by today's score.
    pub risk_level: RiskLevel,
    pub status: ApplicationStatus,
    pub application_date: DateTime<Utc>,
    pub loan_amount: u64,
    pub income: u64,
    /// Years.
    pub employment_history: u32,
    pub debt_to_income_ratio: f64,
    /// Percentage of on-time payments, [0, 100).
    pub payment_history: f64,
    pub credit_utilization: f64,
    /// Years.
    pub account_age: u32,
    pub recent_inquiries: u32,
    pub explainability_factors: Vec<ExplainabilityFactor>,
}

impl ApplicationRecord {
    /// Risk level implied by the current score.
    pub fn current_risk(&self) -> RiskLevel {
        RiskLevel::from_score(self.credit_score)
    }

    /// True once feed perturbations have moved the score across a
    /// risk threshold. The stored `risk_level` is left as generated.
    pub fn risk_is_stale(&self) -> bool {
        self.current_risk() != self.risk_level
    }

    /// Case-insensitive match of an already-lowercased needle against
    /// the applicant name or id.
    pub(crate) fn matches_search(&self, needle_lower: &str) -> bool {
        self.applicant_name.to_lowercase().contains(needle_lower)
            || self.id.to_lowercase().contains(needle_lower)
    }
}
