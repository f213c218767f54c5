//! Change notifications published by the desk.
//!
//! RULE: Presentation reads state; it learns about changes ONLY through
//! these events. Every committed write publishes exactly one DeskChange,
//! after the filtered subset and summary have been recomputed.

use crate::types::{CreditScore, Generation, RecordId, Revision};
use serde::{Deserialize, Serialize};

/// Every event the desk can publish.
/// Variants are added over time, never removed or reordered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DeskEvent {
    // ── Population ─────────────────────────────────
    PopulationGenerated {
        generation: Generation,
        count: usize,
    },

    // ── Live feed ──────────────────────────────────
    ScorePerturbed {
        id: RecordId,
        from: CreditScore,
        to: CreditScore,
    },

    // ── Criteria ───────────────────────────────────
    FiltersReplaced {
        /// Whether the new criteria differ from the defaults.
        active: bool,
        /// Size of the recomputed subset.
        matched: usize,
    },
}

impl DeskEvent {
    /// Stable string name, used in logs and the runner's replies.
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::PopulationGenerated { .. } => "population_generated",
            Self::ScorePerturbed { .. } => "score_perturbed",
            Self::FiltersReplaced { .. } => "filters_replaced",
        }
    }
}

/// A committed change. Revisions start at 0 for the initial population
/// and increase by one per commit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeskChange {
    pub revision: Revision,
    pub event: DeskEvent,
}
