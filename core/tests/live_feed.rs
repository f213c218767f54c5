//! Live feed timing and shutdown, on tokio's paused clock.

use credit_desk_core::{
    config::DeskConfig,
    event::DeskEvent,
    feed::LiveFeed,
    Desk,
};
use std::sync::Arc;
use std::time::Duration;

fn open(seed: u64, interval_ms: u64) -> Arc<Desk> {
    let config = DeskConfig {
        feed_interval_ms: interval_ms,
        ..DeskConfig::default_test()
    };
    Arc::new(Desk::new(config, seed).unwrap())
}

#[tokio::test(start_paused = true)]
async fn first_step_waits_one_full_period() {
    let desk = open(42, 5_000);
    let feed = LiveFeed::spawn(Arc::clone(&desk));

    tokio::time::sleep(Duration::from_millis(4_999)).await;
    assert_eq!(desk.revision(), 0);

    tokio::time::sleep(Duration::from_millis(2)).await;
    assert_eq!(desk.revision(), 1);

    let stats = feed.stop().await.unwrap();
    assert_eq!(stats.ticks, 1);
    assert_eq!(stats.perturbations, 1);
}

#[tokio::test(start_paused = true)]
async fn fires_once_per_period() {
    let desk = open(7, 5_000);
    let feed = LiveFeed::spawn(Arc::clone(&desk));

    tokio::time::sleep(Duration::from_millis(5_000 * 10 + 1)).await;
    let stats = feed.stop().await.unwrap();
    assert_eq!(stats.ticks, 10);
    assert_eq!(desk.revision(), 10);
    assert!(desk.records().iter().all(|r| (400..=800).contains(&r.credit_score)));
}

#[tokio::test(start_paused = true)]
async fn subscribers_see_each_perturbation() {
    let desk = open(3, 1_000);
    let mut rx = desk.subscribe();
    let feed = LiveFeed::spawn(Arc::clone(&desk));

    for expected in 1..=3u64 {
        rx.changed().await.unwrap();
        let change = rx.borrow_and_update().clone();
        assert_eq!(change.revision, expected);
        assert!(matches!(change.event, DeskEvent::ScorePerturbed { .. }));
    }
    feed.stop().await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn stop_leaves_no_running_timer() {
    let desk = open(11, 1_000);
    let feed = LiveFeed::spawn(Arc::clone(&desk));
    tokio::time::sleep(Duration::from_millis(3_500)).await;
    let stats = feed.stop().await.unwrap();
    assert_eq!(stats.ticks, 3);

    let revision = desk.revision();
    tokio::time::sleep(Duration::from_secs(60)).await;
    assert_eq!(desk.revision(), revision);
}

#[tokio::test(start_paused = true)]
async fn dropping_the_handle_cancels_the_feed() {
    let desk = open(12, 1_000);
    let feed = LiveFeed::spawn(Arc::clone(&desk));
    tokio::time::sleep(Duration::from_millis(1_500)).await;
    drop(feed);

    let revision = desk.revision();
    tokio::time::sleep(Duration::from_secs(30)).await;
    assert_eq!(desk.revision(), revision);
    // The task held the only other reference.
    assert_eq!(Arc::strong_count(&desk), 1);
}

#[tokio::test(start_paused = true)]
async fn empty_population_ticks_without_changes() {
    let config = DeskConfig {
        population_size: 0,
        feed_interval_ms: 1_000,
        ..DeskConfig::default_test()
    };
    let desk = Arc::new(Desk::new(config, 1).unwrap());
    let feed = LiveFeed::spawn(Arc::clone(&desk));
    tokio::time::sleep(Duration::from_millis(5_500)).await;

    let stats = feed.stop().await.unwrap();
    assert_eq!(stats.ticks, 5);
    assert_eq!(stats.perturbations, 0);
    assert_eq!(desk.revision(), 0);
}
