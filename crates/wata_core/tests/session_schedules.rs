use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use wata_core::{ConfettiParams, ManualClock, Photo, SessionConfig, SessionDeps, TavernSession};

struct Harness {
    session: TavernSession,
    clock: Arc<ManualClock>,
    fired: Arc<AtomicUsize>,
}

async fn start(config: SessionConfig) -> Harness {
    let clock = Arc::new(ManualClock::new(0));
    let fired = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&fired);
    let deps = SessionDeps {
        clock: clock.clone(),
        celebration: Arc::new(move |_: &ConfettiParams| {
            counter.fetch_add(1, Ordering::SeqCst);
        }),
        ..SessionDeps::offline()
    };
    let session = TavernSession::start(config, deps).await.unwrap();
    Harness {
        session,
        clock,
        fired,
    }
}

async fn sleep_ms(ms: u64) {
    tokio::time::sleep(Duration::from_millis(ms)).await;
}

fn photo(id: &str) -> Photo {
    Photo::with_id(id, format!("data:image/png;base64,{id}"), format!("{id}.png"))
}

#[tokio::test(start_paused = true)]
async fn greeting_interval_change_rekeys_without_stacking() {
    let harness = start(SessionConfig::default()).await;
    let session = &harness.session;

    sleep_ms(3_000).await;
    assert_eq!(session.snapshot().await.greeting_revision, 0);

    session.set_greeting_interval(2_000).await.unwrap();
    sleep_ms(8_001).await;
    assert_eq!(session.snapshot().await.greeting_revision, 4);
    session.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn same_interval_keeps_running_schedule() {
    let harness = start(SessionConfig::default()).await;
    let session = &harness.session;

    session.set_greeting_interval(2_000).await.unwrap();
    sleep_ms(1_500).await;
    session.set_greeting_interval(2_000).await.unwrap();
    sleep_ms(600).await;
    assert_eq!(session.snapshot().await.greeting_revision, 1);
    session.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn greeting_never_repeats_back_to_back() {
    let config = SessionConfig {
        greeting_interval_ms: 1_000,
        ..SessionConfig::default()
    };
    let harness = start(config).await;
    sleep_ms(500).await;
    let mut previous = harness.session.snapshot().await.greeting;
    for _ in 0..20 {
        sleep_ms(1_000).await;
        let current = harness.session.snapshot().await.greeting;
        assert_ne!(current, previous);
        previous = current;
    }
    harness.session.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn photo_autoplay_needs_two_photos_and_the_flag() {
    let harness = start(SessionConfig::default()).await;
    let session = &harness.session;

    session.add_photo(photo("a")).await.unwrap();
    sleep_ms(10_001).await;
    assert_eq!(session.snapshot().await.photo_index, Some(0));

    session.add_photo(photo("b")).await.unwrap();
    sleep_ms(5_001).await;
    assert_eq!(session.snapshot().await.photo_index, Some(1));

    session.set_autoplay(false).await;
    sleep_ms(20_000).await;
    assert_eq!(session.snapshot().await.photo_index, Some(1));

    session.set_autoplay(true).await;
    sleep_ms(5_001).await;
    assert_eq!(session.snapshot().await.photo_index, Some(0));
    session.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn countdown_ticks_fire_celebration_once_per_crossing() {
    let config = SessionConfig {
        target_epoch_ms: 10_000,
        ..SessionConfig::default()
    };
    let harness = start(config).await;
    let session = &harness.session;
    assert_eq!(session.snapshot().await.countdown.seconds, 10);
    sleep_ms(500).await;

    harness.clock.set(9_000);
    sleep_ms(1_000).await;
    assert_eq!(session.snapshot().await.countdown.seconds, 1);

    harness.clock.set(10_000);
    sleep_ms(1_000).await;
    assert_eq!(harness.fired.load(Ordering::SeqCst), 1);
    assert!(session.snapshot().await.celebrating);

    harness.clock.advance(3_000);
    sleep_ms(3_000).await;
    assert_eq!(harness.fired.load(Ordering::SeqCst), 1);

    session.set_target_epoch_ms(20_000).await;
    assert!(!session.snapshot().await.celebrating);
    assert_eq!(harness.fired.load(Ordering::SeqCst), 1);

    harness.clock.set(20_000);
    sleep_ms(1_200).await;
    assert_eq!(harness.fired.load(Ordering::SeqCst), 2);
    session.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn target_in_the_past_fires_at_start() {
    let config = SessionConfig {
        target_epoch_ms: -1,
        ..SessionConfig::default()
    };
    let harness = start(config).await;
    assert_eq!(harness.fired.load(Ordering::SeqCst), 1);
    assert!(harness.session.snapshot().await.countdown.is_zero());
    harness.session.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn shutdown_stops_all_schedules() {
    let config = SessionConfig {
        greeting_interval_ms: 1_000,
        ..SessionConfig::default()
    };
    let harness = start(config).await;
    let session = &harness.session;
    harness.session.shutdown().await;

    session.set_greeting_interval(500).await.unwrap();
    sleep_ms(10_000).await;
    assert_eq!(session.snapshot().await.greeting_revision, 0);
}
