//! Whole schedules driven against an in-process server

use anyhow::Result;
use std::io::Write;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use txload_config::{ConfigLoader, PacingMode, ServerConfig};
use txload_core::TransactionId;
use txload_dispatch::{DispatchEngine, ScheduleDriver, Target};
use txload_resilience::ShutdownCoordinator;
use txload_server::TransactionServer;
use txload_store::{create_seeded_store, record_key};

const CONFIG: &str = r#"{
    "tps": {"warmup": 20, "ramp": 40, "peak": 60},
    "dispatch": {"pool_size": 2, "pacing": "disabled", "launch_interval_ms": 50, "io_timeout": 5},
    "store": {"record_count": 50}
}"#;

#[tokio::test]
async fn test_schedule_runs_every_slice_in_order() -> Result<()> {
    let mut file = tempfile::Builder::new().suffix(".json").tempfile()?;
    file.write_all(CONFIG.as_bytes())?;
    let config = ConfigLoader::with_prefix("TXLOAD_SCHEDULE_TEST").from_file(file.path())?;
    assert_eq!(config.dispatch.pacing, PacingMode::Disabled);

    let coordinator = Arc::new(ShutdownCoordinator::with_timeouts(
        Duration::from_secs(5),
        Duration::from_millis(500),
    ));
    let server = TransactionServer::new(ServerConfig::default(), coordinator.clone());
    let handle = server.start_on(vec![
        TcpListener::bind("127.0.0.1:0").await?,
        TcpListener::bind("127.0.0.1:0").await?,
    ]);
    let targets: Vec<Target> = handle.local_addrs().into_iter().map(Target::from).collect();

    let store = create_seeded_store(&config.store);
    let engine = DispatchEngine::new(config.dispatch.clone(), store.clone(), coordinator.clone())
        .with_targets(targets);
    let driver = ScheduleDriver::new(engine, coordinator.clone());

    let report = driver.run(&config.tps).await;

    let labels: Vec<&str> = report.slices.iter().map(|s| s.label.as_str()).collect();
    assert_eq!(labels, vec!["warmup", "ramp", "peak"]);
    assert_eq!(report.slices[0].requests_per_connection, 10);
    assert_eq!(report.slices[1].requests_per_connection, 20);
    assert_eq!(report.slices[2].requests_per_connection, 30);
    assert_eq!(report.completed(), 120);
    assert_eq!(report.failed_connections(), 0);
    // Two launch gaps
    assert!(report.elapsed >= Duration::from_millis(100));

    // Both ports served some of the traffic
    let mut seen_ports = std::collections::HashSet::new();
    for i in 1..=30 {
        let value = store.get(&record_key(i)).expect("seeded key");
        for token in value.split(' ').filter(|t| t.starts_with("tx_")) {
            let id: TransactionId = token.parse()?;
            seen_ports.insert(id.port());
        }
    }
    assert_eq!(seen_ports.len(), 2);

    coordinator.shutdown().await?;
    handle.join().await;
    Ok(())
}

#[tokio::test]
async fn test_shutdown_mid_schedule_skips_later_slices() -> Result<()> {
    let coordinator = Arc::new(ShutdownCoordinator::with_timeouts(
        Duration::from_secs(5),
        Duration::from_millis(500),
    ));
    let server = TransactionServer::new(ServerConfig::default(), coordinator.clone());
    let handle = server.start_on(vec![TcpListener::bind("127.0.0.1:0").await?]);
    let targets: Vec<Target> = handle.local_addrs().into_iter().map(Target::from).collect();

    let mut config = ConfigLoader::with_prefix("TXLOAD_SCHEDULE_TEST").from_env()?;
    config.dispatch.pool_size = 1;
    config.dispatch.pacing = PacingMode::Disabled;
    config.store.record_count = 10;
    for (label, tps) in [("1", 5), ("2", 5), ("3", 5)] {
        config.tps.push(txload_core::SliceEntry::new(label, tps));
    }

    let store = create_seeded_store(&config.store);
    let engine = DispatchEngine::new(config.dispatch.clone(), store, coordinator.clone())
        .with_targets(targets);
    let driver = ScheduleDriver::new(engine, coordinator.clone())
        .with_launch_interval(Duration::from_secs(30));

    let stopper = {
        let coordinator = coordinator.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(200)).await;
            coordinator.shutdown().await
        })
    };

    let report = tokio::time::timeout(Duration::from_secs(10), driver.run(&config.tps))
        .await
        .expect("driver ignored shutdown");

    assert_eq!(report.slices.len(), 1);
    assert_eq!(report.slices[0].completed(), 5);
    assert_eq!(report.skipped, 2);

    stopper.await??;
    handle.join().await;
    Ok(())
}
