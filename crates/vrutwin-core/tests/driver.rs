use std::io::Write;
use std::time::Duration;
use vrutwin_core::config::TwinConfig;
use vrutwin_core::driver::{self, DriverError};
use vrutwin_core::facility::FacilityType;
use vrutwin_core::twin::TruckState;

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter("vrutwin_core=debug")
        .with_test_writer()
        .try_init();
}

fn seeded_config() -> TwinConfig {
    let mut config = TwinConfig::default();
    config.log.seed = Some(99);
    config
}

#[tokio::test(start_paused = true)]
async fn test_realtime_gas_run() {
    init_tracing();
    let handle = driver::spawn(seeded_config());
    handle.start().await.unwrap();

    tokio::time::sleep(Duration::from_millis(28_500)).await;
    let snap = handle.latest();
    assert!(snap.is_running);
    assert!(
        (snap.liters_recovered - 14.25).abs() < 0.06,
        "liters = {}",
        snap.liters_recovered
    );
    assert_eq!(snap.pulse_count, 1);
    assert!(snap.secondary_flow_visible);
    // First visit: arrived at ~12.8 s, leaves at ~27.8 s
    assert!(matches!(snap.truck_state, TruckState::Leaving | TruckState::Resetting | TruckState::Idle));

    handle.shutdown().await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn test_pause_freezes_and_clears_timers() {
    let handle = driver::spawn(seeded_config());
    handle.start().await.unwrap();
    tokio::time::sleep(Duration::from_millis(12_050)).await;

    handle.stop().await.unwrap();
    tokio::time::sleep(Duration::from_millis(50)).await;
    let paused = handle.latest();
    assert!(!paused.is_running);
    assert_eq!(paused.pending_timers, 0);
    assert_eq!(paused.truck_state, TruckState::Idle);

    tokio::time::sleep(Duration::from_secs(30)).await;
    let later = handle.latest();
    assert_eq!(later.liters_recovered, paused.liters_recovered);
    assert_eq!(later.truck_state, TruckState::Idle);
    assert_eq!(later.pending_timers, 0);

    handle.shutdown().await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn test_facility_switch_over_channel() {
    let handle = driver::spawn(seeded_config());
    handle.start().await.unwrap();
    tokio::time::sleep(Duration::from_secs(5)).await;

    handle.set_facility(FacilityType::Storage).await.unwrap();
    tokio::time::sleep(Duration::from_millis(50)).await;
    let switched = handle.latest();
    assert_eq!(switched.facility, FacilityType::Storage);
    assert_eq!(switched.liters_recovered, 0.0);
    assert!(!switched.is_running);

    handle.start().await.unwrap();
    tokio::time::sleep(Duration::from_millis(2_050)).await;
    let snap = handle.latest();
    assert!((snap.liters_recovered - 10.0).abs() < 0.6, "liters = {}", snap.liters_recovered);

    let last = handle.shutdown().await.unwrap();
    assert!(!last.is_running);
    assert_eq!(last.pending_timers, 0);
}

#[tokio::test(start_paused = true)]
async fn test_subscribers_see_updates() {
    let handle = driver::spawn(seeded_config());
    let mut rx = handle.subscribe();
    handle.start().await.unwrap();

    rx.changed().await.unwrap();
    tokio::time::sleep(Duration::from_secs(1)).await;
    rx.changed().await.unwrap();
    assert!(rx.borrow().is_running);

    handle.shutdown().await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn test_commands_after_shutdown_fail() {
    let handle = driver::spawn(seeded_config());
    let rx = handle.subscribe();
    handle.shutdown().await.unwrap();

    // The task is gone; the watch channel keeps its last value
    assert_eq!(rx.borrow().pending_timers, 0);

    let handle = driver::spawn(seeded_config());
    handle.send(driver::TwinCommand::Shutdown).await.unwrap();
    tokio::time::sleep(Duration::from_millis(10)).await;
    let err = handle.start().await.unwrap_err();
    assert!(matches!(err, DriverError::Closed));
}

#[test]
fn test_config_file_roundtrip_into_view() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(
        file,
        r#"{{ "facility": "storage", "truck": {{ "cycle_delay_ms": 4000 }}, "log": {{ "seed": 5 }} }}"#
    )
    .unwrap();

    let config = TwinConfig::from_file(file.path()).unwrap();
    assert_eq!(config.facility, FacilityType::Storage);
    assert_eq!(config.truck.cycle_delay(), Duration::from_secs(4));
    assert_eq!(config.truck.fill_duration(), Duration::from_secs(15));

    let mut view = vrutwin_core::view::SimulationView::mount(config);
    view.set_running(true, Duration::ZERO);
    vrutwin_core::driver::fast_forward(&mut view, Duration::ZERO, Duration::from_millis(4_100));
    assert_eq!(view.truck_state(), TruckState::Arriving);
    assert!((view.reading().liters_recovered - 20.5).abs() < 1e-9);
}

#[test]
fn test_missing_config_file() {
    let dir = tempfile::tempdir().unwrap();
    let err = TwinConfig::from_file(dir.path().join("absent.json")).unwrap_err();
    assert!(matches!(err, vrutwin_core::config::ConfigError::IoError(_)));
}
