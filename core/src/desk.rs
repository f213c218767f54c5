//! The desk: one explicitly constructed session over a record population.
//!
//! WRITE PATH (fixed, the same for every mutation):
//!   1. Take the writer lock.
//!   2. Mutate the record store or replace the criteria.
//!   3. Re-filter the current snapshot under the current criteria.
//!   4. Re-summarize the new subset.
//!   5. Swap the derived view, stamped with the next revision, in one step.
//!   6. Publish one DeskChange with that revision.
//!
//! RULES:
//!   - The filtered subset and the summary are never edited, only replaced
//!     by recomputing from (records, criteria).
//!   - Writers are serialized; readers never wait on a recompute.
//!   - Callers that need the subset and the summary together read them
//!     through `view()`; separate getters may straddle a commit.
//!   - A rejected update returns before step 2, leaving everything as it was.
//!   - `risk_level` is never re-derived after generation; use
//!     `ApplicationRecord::risk_is_stale` to see drift.

use crate::{
    analytics::{self, AnalyticsSummary, DashboardOverview},
    command::DeskCommand,
    config::DeskConfig,
    error::DeskResult,
    event::{DeskChange, DeskEvent},
    filter::{self, FilterCriteria, FilterUpdate},
    generator::RecordGenerator,
    record::ApplicationRecord,
    rng::{DeskRng, RngBank, StreamSlot},
    store::{Perturbation, RecordStore, ScoreBounds, Snapshot},
    types::{Generation, Revision},
};
use chrono::{DateTime, Utc};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, RwLock};
use tokio::sync::watch;

/// Derived state of one commit: the pure result of (records, criteria) at
/// `revision`. Cloning it is cheap; the subset and summary are shared.
#[derive(Debug, Clone)]
pub struct DeskView {
    pub revision: Revision,
    pub criteria: FilterCriteria,
    pub subset: Snapshot,
    pub summary: Arc<AnalyticsSummary>,
}

/// State only writers touch.
struct WriterState {
    bank: RngBank,
    feed_rng: DeskRng,
    trend_rng: DeskRng,
    generation: Generation,
    revision: Revision,
}

pub struct Desk {
    config: DeskConfig,
    store: RecordStore,
    view: RwLock<DeskView>,
    writer: Mutex<WriterState>,
    changes: watch::Sender<DeskChange>,
}

impl Desk {
    /// Open a desk and generate its first population, dated against the
    /// wall clock.
    pub fn new(config: DeskConfig, seed: u64) -> DeskResult<Self> {
        Self::new_at(config, seed, Utc::now())
    }

    /// Open a desk with an explicit "now". Same seed, config, and `now`
    /// produce the same population and summary.
    pub fn new_at(config: DeskConfig, seed: u64, now: DateTime<Utc>) -> DeskResult<Self> {
        config.validate()?;

        let bank = RngBank::new(seed);
        let mut gen_rng = bank.for_stream_at(StreamSlot::Generator, 0);
        let mut trend_rng = bank.for_stream(StreamSlot::Trend);
        let feed_rng = bank.for_stream(StreamSlot::Feed);

        let records = RecordGenerator::new(&config).generate(&mut gen_rng, now);
        let count = records.len();
        let store = RecordStore::new(
            records,
            ScoreBounds {
                floor: config.score_floor,
                ceiling: config.score_ceiling,
                max_delta: config.max_score_delta,
            },
        );

        let criteria = FilterCriteria::with_score_bounds(config.score_floor, config.score_ceiling);
        let view = derive(
            &store.snapshot(),
            criteria,
            &mut trend_rng,
            now,
            config.trend_points,
            0,
        );

        let (changes, _) = watch::channel(DeskChange {
            revision: 0,
            event: DeskEvent::PopulationGenerated {
                generation: 0,
                count,
            },
        });

        log::info!("desk: opened with seed={seed}, generated {count} records");

        Ok(Self {
            config,
            store,
            view: RwLock::new(view),
            writer: Mutex::new(WriterState {
                bank,
                feed_rng,
                trend_rng,
                generation: 0,
                revision: 0,
            }),
            changes,
        })
    }

    pub fn config(&self) -> &DeskConfig {
        &self.config
    }

    // ── Reads ──────────────────────────────────────────────────

    /// Full population, point-in-time.
    pub fn records(&self) -> Snapshot {
        self.store.snapshot()
    }

    /// Current copy of one record, looked up by id.
    pub fn record(&self, id: &str) -> Option<ApplicationRecord> {
        self.store.get(id)
    }

    /// Criteria, subset, and summary of the last commit, read under one
    /// guard so they always belong together.
    pub fn view(&self) -> DeskView {
        self.read_view().clone()
    }

    /// Records matching the current criteria, in population order.
    pub fn filtered_records(&self) -> Snapshot {
        Arc::clone(&self.read_view().subset)
    }

    /// Summary of the current filtered subset.
    pub fn summary(&self) -> Arc<AnalyticsSummary> {
        Arc::clone(&self.read_view().summary)
    }

    pub fn criteria(&self) -> FilterCriteria {
        self.read_view().criteria.clone()
    }

    /// Criteria that `clear_filters` restores.
    pub fn default_criteria(&self) -> FilterCriteria {
        FilterCriteria::with_score_bounds(self.config.score_floor, self.config.score_ceiling)
    }

    /// True when any criterion differs from the defaults, including a date
    /// range with only one bound filled.
    pub fn has_active_filters(&self) -> bool {
        self.read_view().criteria != self.default_criteria()
    }

    /// Dashboard headline counts over the full population.
    pub fn overview(&self) -> DashboardOverview {
        analytics::overview(&self.records())
    }

    pub fn generation(&self) -> Generation {
        self.lock_writer().generation
    }

    /// Revision of the last committed change.
    pub fn revision(&self) -> Revision {
        self.changes.borrow().revision
    }

    /// Receiver that observes every commit. The current value is the last
    /// committed change.
    pub fn subscribe(&self) -> watch::Receiver<DeskChange> {
        self.changes.subscribe()
    }

    // ── Writes ─────────────────────────────────────────────────

    /// Merge a partial update into the current criteria and recompute.
    /// Invalid updates are rejected with prior criteria kept.
    pub fn update_filters(&self, update: FilterUpdate) -> DeskResult<()> {
        let mut writer = self.lock_writer();
        let next = match self.read_view().criteria.merged(update) {
            Ok(next) => next,
            Err(e) => {
                log::warn!("desk: rejected filter update: {e}");
                return Err(e);
            }
        };
        self.replace_criteria(&mut writer, next);
        Ok(())
    }

    /// Parse and apply an update straight from JSON.
    pub fn update_filters_json(&self, raw: serde_json::Value) -> DeskResult<()> {
        let update = FilterUpdate::from_json(raw).inspect_err(|e| {
            log::warn!("desk: rejected filter update: {e}");
        })?;
        self.update_filters(update)
    }

    /// Replace the criteria with the defaults.
    pub fn clear_filters(&self) {
        let mut writer = self.lock_writer();
        self.replace_criteria(&mut writer, self.default_criteria());
    }

    /// Replace the whole population with a fresh, independent one.
    /// Ids restart at `app_1`; the criteria are kept.
    pub fn regenerate(&self) {
        self.regenerate_at(Utc::now());
    }

    pub fn regenerate_at(&self, now: DateTime<Utc>) {
        let mut writer = self.lock_writer();
        writer.generation += 1;
        let generation = writer.generation;

        let mut gen_rng = writer.bank.for_stream_at(StreamSlot::Generator, generation);
        let records = RecordGenerator::new(&self.config).generate(&mut gen_rng, now);
        let count = records.len();
        self.store.replace_all(records);

        let criteria = self.read_view().criteria.clone();
        self.recompute(&mut writer, criteria, now);
        log::info!("desk: regenerated population generation={generation} count={count}");
        self.publish(&mut writer, DeskEvent::PopulationGenerated { generation, count });
    }

    /// One live-feed step. `None`, with nothing published, when the
    /// population is empty.
    pub fn perturb_one(&self) -> Option<Perturbation> {
        let mut writer = self.lock_writer();
        let perturbation = self.store.perturb_one(&mut writer.feed_rng)?;

        let criteria = self.read_view().criteria.clone();
        self.recompute(&mut writer, criteria, Utc::now());
        log::debug!(
            "desk: perturbed {} {} -> {}",
            perturbation.id,
            perturbation.from,
            perturbation.to
        );
        self.publish(
            &mut writer,
            DeskEvent::ScorePerturbed {
                id: perturbation.id.clone(),
                from: perturbation.from,
                to: perturbation.to,
            },
        );
        Some(perturbation)
    }

    pub fn apply_command(&self, command: DeskCommand) -> DeskResult<()> {
        match command {
            DeskCommand::UpdateFilters { filters } => self.update_filters_json(filters)?,
            DeskCommand::ClearFilters => self.clear_filters(),
            DeskCommand::Regenerate => self.regenerate(),
            DeskCommand::Perturb => {
                self.perturb_one();
            }
        }
        Ok(())
    }

    // ── Internals ──────────────────────────────────────────────

    fn replace_criteria(&self, writer: &mut WriterState, criteria: FilterCriteria) {
        let active = criteria != self.default_criteria();
        self.recompute(writer, criteria, Utc::now());
        let matched = self.read_view().subset.len();
        log::info!("desk: filters replaced active={active} matched={matched}");
        self.publish(writer, DeskEvent::FiltersReplaced { active, matched });
    }

    /// Swap in the view for the commit `publish` is about to announce.
    fn recompute(&self, writer: &mut WriterState, criteria: FilterCriteria, now: DateTime<Utc>) {
        let view = derive(
            &self.store.snapshot(),
            criteria,
            &mut writer.trend_rng,
            now,
            self.config.trend_points,
            writer.revision + 1,
        );
        *self.view.write().unwrap_or_else(PoisonError::into_inner) = view;
    }

    fn publish(&self, writer: &mut WriterState, event: DeskEvent) {
        writer.revision += 1;
        debug_assert_eq!(self.read_view().revision, writer.revision);
        let change = DeskChange {
            revision: writer.revision,
            event,
        };
        log::debug!("desk: commit revision={} {}", change.revision, change.event.type_name());
        self.changes.send_replace(change);
    }

    fn read_view(&self) -> std::sync::RwLockReadGuard<'_, DeskView> {
        self.view.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn lock_writer(&self) -> MutexGuard<'_, WriterState> {
        self.writer.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

fn derive(
    records: &[ApplicationRecord],
    criteria: FilterCriteria,
    trend_rng: &mut DeskRng,
    now: DateTime<Utc>,
    trend_points: usize,
    revision: Revision,
) -> DeskView {
    let subset = filter::apply(records, &criteria);
    let summary = analytics::summarize(&subset, trend_rng, now, trend_points);
    DeskView {
        revision,
        criteria,
        subset: Arc::new(subset),
        summary: Arc::new(summary),
    }
}
