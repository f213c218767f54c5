//! In-memory record store.
//!
//! RULE: Only the store mutates records.
//! The desk calls `replace_all` on regeneration and `perturb_one` on each
//! feed tick; everything else reads through `snapshot`.
//!
//! The collection lives behind `RwLock<Arc<Vec<_>>>`. A snapshot is a clone
//! of the `Arc`, so it is taken in O(1) and never changes afterwards:
//! `perturb_one` goes through `Arc::make_mut`, which copies the vector
//! whenever an older snapshot is still alive, and `replace_all` swaps the
//! whole `Arc` under the write lock. Readers see the old collection or the
//! new one, never a mix.

use crate::{
    record::ApplicationRecord,
    rng::DeskRng,
    types::{CreditScore, RecordId},
};
use serde::{Deserialize, Serialize};
use std::sync::{Arc, PoisonError, RwLock};

/// Point-in-time, read-only view of a record collection.
pub type Snapshot = Arc<Vec<ApplicationRecord>>;

/// Inclusive score bounds plus the largest step a perturbation may take.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScoreBounds {
    pub floor: CreditScore,
    pub ceiling: CreditScore,
    pub max_delta: CreditScore,
}

impl ScoreBounds {
    pub fn clamp(&self, score: CreditScore) -> CreditScore {
        score.clamp(self.floor, self.ceiling)
    }
}

/// Outcome of a single feed perturbation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Perturbation {
    pub index: usize,
    pub id: RecordId,
    pub from: CreditScore,
    pub to: CreditScore,
}

pub struct RecordStore {
    records: RwLock<Snapshot>,
    bounds: ScoreBounds,
}

impl RecordStore {
    pub fn new(records: Vec<ApplicationRecord>, bounds: ScoreBounds) -> Self {
        Self {
            records: RwLock::new(Arc::new(records)),
            bounds,
        }
    }

    pub fn bounds(&self) -> ScoreBounds {
        self.bounds
    }

    /// The current collection. Later writes never show through it.
    pub fn snapshot(&self) -> Snapshot {
        let guard = self.records.read().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(&guard)
    }

    /// Swap in a whole new collection.
    pub fn replace_all(&self, records: Vec<ApplicationRecord>) {
        let fresh = Arc::new(records);
        let mut guard = self.records.write().unwrap_or_else(PoisonError::into_inner);
        *guard = fresh;
    }

    /// Nudge one uniformly chosen record's score by a delta in
    /// `[-max_delta, +max_delta]`, clamped to the bounds.
    /// Returns `None` on an empty collection. Never touches `risk_level`.
    pub fn perturb_one(&self, rng: &mut DeskRng) -> Option<Perturbation> {
        let mut guard = self.records.write().unwrap_or_else(PoisonError::into_inner);
        if guard.is_empty() {
            return None;
        }

        let index = rng.pick_index(guard.len());
        let max = i64::from(self.bounds.max_delta);
        let delta = rng.i64_between(-max..=max) as CreditScore;

        let records = Arc::make_mut(&mut *guard);
        let record = &mut records[index];
        let from = record.credit_score;
        record.credit_score = self.bounds.clamp(from.saturating_add(delta));

        Some(Perturbation {
            index,
            id: record.id.clone(),
            from,
            to: record.credit_score,
        })
    }

    /// Owned copy of the record with this id, as of now.
    pub fn get(&self, id: &str) -> Option<ApplicationRecord> {
        self.snapshot().iter().find(|r| r.id == id).cloned()
    }

    pub fn len(&self) -> usize {
        self.snapshot().len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshot().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        config::DeskConfig,
        generator::RecordGenerator,
        rng::{RngBank, StreamSlot},
    };
    use chrono::Utc;

    const BOUNDS: ScoreBounds = ScoreBounds {
        floor: 400,
        ceiling: 800,
        max_delta: 5,
    };

    fn seeded_store(seed: u64) -> RecordStore {
        let config = DeskConfig::default_test();
        let mut rng = RngBank::new(seed).for_stream(StreamSlot::Generator);
        let records = RecordGenerator::new(&config).generate(&mut rng, Utc::now());
        RecordStore::new(records, BOUNDS)
    }

    #[test]
    fn perturb_on_empty_store_is_noop() {
        let store = RecordStore::new(Vec::new(), BOUNDS);
        let mut rng = RngBank::new(1).for_stream(StreamSlot::Feed);
        for _ in 0..10 {
            assert!(store.perturb_one(&mut rng).is_none());
        }
        assert!(store.is_empty());
    }

    #[test]
    fn perturb_stays_within_bounds_and_step() {
        let store = seeded_store(42);
        let mut rng = RngBank::new(42).for_stream(StreamSlot::Feed);
        for _ in 0..5_000 {
            let p = store.perturb_one(&mut rng).unwrap();
            assert!((400..=800).contains(&p.to), "{} escaped bounds", p.to);
            assert!((p.to - p.from).abs() <= 5);
        }
        assert!(store.snapshot().iter().all(|r| (400..=800).contains(&r.credit_score)));
    }

    #[test]
    fn perturb_leaves_risk_level_alone() {
        let store = seeded_store(9);
        let before: Vec<_> = store.snapshot().iter().map(|r| r.risk_level).collect();
        let mut rng = RngBank::new(9).for_stream(StreamSlot::Feed);
        for _ in 0..2_000 {
            store.perturb_one(&mut rng);
        }
        let after: Vec<_> = store.snapshot().iter().map(|r| r.risk_level).collect();
        assert_eq!(before, after);
    }

    #[test]
    fn snapshot_is_isolated_from_later_writes() {
        let store = seeded_store(5);
        let taken = store.snapshot();
        let frozen: Vec<_> = taken.iter().map(|r| r.credit_score).collect();

        let mut rng = RngBank::new(5).for_stream(StreamSlot::Feed);
        for _ in 0..500 {
            store.perturb_one(&mut rng);
        }
        store.replace_all(Vec::new());

        let still: Vec<_> = taken.iter().map(|r| r.credit_score).collect();
        assert_eq!(frozen, still);
        assert_eq!(taken.len(), 50);
        assert!(store.is_empty());
    }

    #[test]
    fn get_finds_by_id_and_sees_perturbations() {
        let store = seeded_store(21);
        let mut rng = RngBank::new(21).for_stream(StreamSlot::Feed);
        let p = store.perturb_one(&mut rng).unwrap();

        let found = store.get(&p.id).unwrap();
        assert_eq!(found.credit_score, p.to);
        assert_eq!(store.get("app_50").unwrap().id, "app_50");
        assert!(store.get("app_51").is_none());
        assert!(store.get("").is_none());
    }

    #[test]
    fn clamps_at_the_edges() {
        let store = seeded_store(11);
        let mut records = (*store.snapshot()).clone();
        records.truncate(1);
        records[0].credit_score = 800;
        store.replace_all(records);

        let mut rng = RngBank::new(11).for_stream(StreamSlot::Feed);
        for _ in 0..200 {
            let p = store.perturb_one(&mut rng).unwrap();
            assert_eq!(p.index, 0);
            assert!(p.to <= 800);
        }
    }
}
