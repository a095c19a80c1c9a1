//! `txload drive`

use anyhow::Result;
use std::sync::Arc;
use tracing::{info, warn};
use txload_config::TxLoadConfig;
use txload_dispatch::{DispatchEngine, RunReport, ScheduleDriver};
use txload_resilience::ShutdownCoordinator;
use txload_store::{create_seeded_store, SharedRecordStore};

use crate::signal::shutdown_signal;

/// Replay the schedule against an already running server
pub async fn drive(
    mut config: TxLoadConfig,
    host: Option<String>,
    pacing: Option<String>,
) -> Result<()> {
    if let Some(host) = host {
        config.dispatch.host = host;
    }
    super::apply_pacing(&mut config.dispatch, pacing.as_deref())?;

    let coordinator = super::coordinator();
    let store = create_seeded_store(&config.store);
    let engine = DispatchEngine::new(config.dispatch.clone(), store.clone(), coordinator.clone());

    let report = drive_schedule(&config, engine, coordinator.clone()).await;
    print_report(&report, &store)?;
    Ok(())
}

/// Run the schedule, stopping early on Ctrl+C or SIGTERM
pub(crate) async fn drive_schedule(
    config: &TxLoadConfig,
    engine: DispatchEngine,
    coordinator: Arc<ShutdownCoordinator>,
) -> RunReport {
    if config.tps.is_empty() {
        warn!("The schedule is empty, nothing to send");
    }

    let driver = ScheduleDriver::new(engine, coordinator.clone());
    let run = driver.run(&config.tps);
    tokio::pin!(run);

    tokio::select! {
        report = &mut run => {
            super::shutdown(&coordinator).await;
            report
        }
        _ = shutdown_signal() => {
            // Raise the signal and let in-flight slices wind down
            let stopping = {
                let coordinator = coordinator.clone();
                tokio::spawn(async move { super::shutdown(&coordinator).await })
            };
            let report = run.await;
            let _ = stopping.await;
            report
        }
    }
}

pub(crate) fn print_report(report: &RunReport, store: &SharedRecordStore) -> Result<()> {
    println!("{}", report.summary());
    println!("store: {}", serde_json::to_string_pretty(&store.stats())?);
    info!(
        completed = report.completed(),
        failed_connections = report.failed_connections(),
        "Run complete"
    );
    Ok(())
}
