//! Synthetic population generation.
//!
//! Generation is a pure function of (config, rng stream, now): it returns
//! a fresh collection and touches nothing else. Ids always start at
//! `app_1`, so a regenerated population reuses the id sequence of the one
//! it replaces; the two never coexist in the store.

use crate::{
    config::DeskConfig,
    name_generator::NameGenerator,
    record::{ApplicationRecord, ApplicationStatus, ExplainabilityFactor, RiskLevel},
    rng::DeskRng,
};
use chrono::{DateTime, Duration, Utc};

const MS_PER_DAY: f64 = 24.0 * 60.0 * 60.0 * 1000.0;

/// (factor, impact floor, impact span, description). Impacts are drawn
/// from [floor, floor + span); the sign of the floor sets the direction.
const FACTOR_TEMPLATES: [(&str, f64, f64, &str); 5] = [
    (
        "Payment History",
        30.0,
        40.0,
        "Consistent on-time payments improve credit score",
    ),
    (
        "Credit Utilization",
        15.0,
        30.0,
        "Lower credit utilization is better for score",
    ),
    (
        "Length of Credit History",
        10.0,
        20.0,
        "Longer credit history indicates reliability",
    ),
    (
        "Credit Mix",
        5.0,
        15.0,
        "Diverse credit types show responsible management",
    ),
    (
        "Recent Inquiries",
        -5.0,
        -10.0,
        "Recent credit inquiries may lower score temporarily",
    ),
];

pub struct RecordGenerator<'a> {
    config: &'a DeskConfig,
    names: NameGenerator<'a>,
}

impl<'a> RecordGenerator<'a> {
    pub fn new(config: &'a DeskConfig) -> Self {
        Self {
            config,
            names: NameGenerator::new(&config.name_pool),
        }
    }

    /// Generate `population_size` records dated within the lookback
    /// window before `now`.
    pub fn generate(&self, rng: &mut DeskRng, now: DateTime<Utc>) -> Vec<ApplicationRecord> {
        let n = self.config.population_size;
        let mut records = Vec::with_capacity(n);
        for index in 0..n {
            records.push(self.generate_one(index, rng, now));
        }
        records
    }

    fn generate_one(
        &self,
        index: usize,
        rng: &mut DeskRng,
        now: DateTime<Utc>,
    ) -> ApplicationRecord {
        let credit_score = rng.i64_in(
            i64::from(self.config.score_floor)..i64::from(self.config.score_ceiling),
        ) as i32;
        let applicant_name = self.names.pick(rng).to_string();

        let lookback_ms = f64::from(self.config.lookback_days) * MS_PER_DAY;
        let age = Duration::milliseconds((rng.next_f64() * lookback_ms) as i64);
        let status = ApplicationStatus::ALL[rng.pick_index(ApplicationStatus::ALL.len())];

        ApplicationRecord {
            id: format!("app_{}", index + 1),
            applicant_name,
            credit_score,
            risk_level: RiskLevel::from_score(credit_score),
            status,
            application_date: now - age,
            loan_amount: rng.i64_in(50_000..550_000) as u64,
            income: rng.i64_in(30_000..180_000) as u64,
            employment_history: rng.i64_between(1..=15) as u32,
            debt_to_income_ratio: rng.f64_in(0.1..0.6),
            payment_history: rng.f64_in(0.0..100.0),
            credit_utilization: rng.f64_in(0.1..1.0),
            account_age: rng.i64_between(1..=20) as u32,
            recent_inquiries: rng.i64_between(0..=9) as u32,
            explainability_factors: explainability_factors(rng),
        }
    }
}

fn explainability_factors(rng: &mut DeskRng) -> Vec<ExplainabilityFactor> {
    FACTOR_TEMPLATES
        .iter()
        .map(|&(factor, floor, span, description)| ExplainabilityFactor {
            factor: factor.to_string(),
            impact: floor + rng.next_f64() * span,
            description: description.to_string(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rng::{RngBank, StreamSlot};
    use chrono::TimeZone;

    fn fixed_now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 15, 12, 0, 0).unwrap()
    }

    fn population(seed: u64) -> Vec<ApplicationRecord> {
        let config = DeskConfig::default_test();
        let mut rng = RngBank::new(seed).for_stream(StreamSlot::Generator);
        RecordGenerator::new(&config).generate(&mut rng, fixed_now())
    }

    #[test]
    fn generates_configured_count_with_sequential_ids() {
        let records = population(42);
        assert_eq!(records.len(), 50);
        for (i, r) in records.iter().enumerate() {
            assert_eq!(r.id, format!("app_{}", i + 1));
        }
    }

    #[test]
    fn risk_level_matches_score_at_generation() {
        for r in population(7) {
            assert_eq!(r.risk_level, RiskLevel::from_score(r.credit_score), "{}", r.id);
            assert!(!r.risk_is_stale());
        }
    }

    #[test]
    fn fields_within_domain_ranges() {
        let now = fixed_now();
        for r in population(1337) {
            assert!((400..800).contains(&r.credit_score), "score {}", r.credit_score);
            assert!((50_000..550_000).contains(&r.loan_amount));
            assert!((30_000..180_000).contains(&r.income));
            assert!((1..=15).contains(&r.employment_history));
            assert!((1..=20).contains(&r.account_age));
            assert!(r.recent_inquiries <= 9);
            assert!((0.1..0.6).contains(&r.debt_to_income_ratio));
            assert!((0.1..1.0).contains(&r.credit_utilization));
            assert!(r.application_date <= now);
            assert!(r.application_date > now - Duration::days(30));
        }
    }

    #[test]
    fn five_factors_with_only_inquiries_negative() {
        for r in population(3) {
            assert_eq!(r.explainability_factors.len(), 5);
            for f in &r.explainability_factors {
                if f.factor == "Recent Inquiries" {
                    assert!(f.impact <= -5.0 && f.impact > -15.0, "{}", f.impact);
                } else {
                    assert!(f.impact > 0.0, "{} impact {}", f.factor, f.impact);
                }
            }
        }
    }

    #[test]
    fn same_seed_same_population() {
        assert_eq!(population(99), population(99));
        assert_ne!(population(99), population(100));
    }
}
