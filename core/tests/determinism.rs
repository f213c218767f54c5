//! Same seed, same operations, same desk.
//!
//! Two desks opened with one seed and driven through one sequence of
//! operations must agree on every record and every non-decorative figure.

use chrono::{DateTime, TimeZone, Utc};
use credit_desk_core::{config::DeskConfig, filter::FilterUpdate, record::RiskLevel, Desk};

fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 9, 1, 8, 0, 0).unwrap()
}

fn drive(seed: u64) -> Desk {
    let desk = Desk::new_at(DeskConfig::default_test(), seed, now()).unwrap();
    for _ in 0..200 {
        desk.perturb_one();
    }
    desk.update_filters(FilterUpdate::risk_levels([RiskLevel::Medium, RiskLevel::High]))
        .unwrap();
    desk.regenerate_at(now());
    for _ in 0..100 {
        desk.perturb_one();
    }
    desk
}

#[test]
fn same_seed_produces_identical_state() {
    const SEED: u64 = 0xDEAD_BEEF_CAFE_1234;
    let a = drive(SEED);
    let b = drive(SEED);

    assert_eq!(*a.records(), *b.records());
    assert_eq!(*a.filtered_records(), *b.filtered_records());
    assert_eq!(a.revision(), b.revision());

    let (ra, rb) = (a.summary(), b.summary());
    let (ra, rb) = (ra.report().unwrap(), rb.report().unwrap());
    assert_eq!(ra.risk_distribution, rb.risk_distribution);
    assert_eq!(ra.score_ranges, rb.score_ranges);
    assert_eq!(ra.avg_score, rb.avg_score);
    assert_eq!(ra.approval_rate, rb.approval_rate);
    assert_eq!(ra.total_loan_value, rb.total_loan_value);
}

#[test]
fn initial_population_is_reproducible() {
    let a = Desk::new_at(DeskConfig::default_test(), 42, now()).unwrap();
    let b = Desk::new_at(DeskConfig::default_test(), 42, now()).unwrap();
    assert_eq!(*a.records(), *b.records());
    assert_eq!(*a.summary(), *b.summary());
}

#[test]
fn different_seeds_produce_different_populations() {
    let a = Desk::new_at(DeskConfig::default_test(), 42, now()).unwrap();
    let b = Desk::new_at(DeskConfig::default_test(), 99, now()).unwrap();
    assert_ne!(*a.records(), *b.records(), "seed is not being used");
}

#[test]
fn regenerated_population_is_independent_of_the_first() {
    let desk = Desk::new_at(DeskConfig::default_test(), 42, now()).unwrap();
    let first = desk.records();
    desk.regenerate_at(now());
    let scores_a: Vec<i32> = first.iter().map(|r| r.credit_score).collect();
    let scores_b: Vec<i32> = desk.records().iter().map(|r| r.credit_score).collect();
    assert_ne!(scores_a, scores_b);
}
