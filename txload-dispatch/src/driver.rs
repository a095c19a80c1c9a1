//! Schedule driver
//!
//! Launches one engine run per schedule entry, in schedule order, waiting
//! `launch_interval` between two launches. Runs overlap whenever a slice
//! lasts longer than the interval. The driver returns once every launched
//! run has finished.

use futures::future::join_all;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;
use tracing::{error, info, warn};
use txload_core::Schedule;
use txload_resilience::ShutdownCoordinator;

use crate::engine::DispatchEngine;
use crate::report::RunReport;

pub struct ScheduleDriver {
    engine: Arc<DispatchEngine>,
    launch_interval: Duration,
    coordinator: Arc<ShutdownCoordinator>,
}

impl ScheduleDriver {
    /// Driver using the engine's configured launch interval
    pub fn new(engine: DispatchEngine, coordinator: Arc<ShutdownCoordinator>) -> Self {
        let launch_interval = engine.config().launch_interval;
        Self {
            engine: Arc::new(engine),
            launch_interval,
            coordinator,
        }
    }

    pub fn with_launch_interval(mut self, launch_interval: Duration) -> Self {
        self.launch_interval = launch_interval;
        self
    }

    pub fn engine(&self) -> &DispatchEngine {
        &self.engine
    }

    /// Run the whole schedule
    pub async fn run(&self, schedule: &Schedule) -> RunReport {
        let started = Instant::now();
        let mut shutdown = self.coordinator.listener();
        let mut handles = Vec::with_capacity(schedule.len());

        info!(
            slices = schedule.len(),
            total_tps = schedule.total_tps(),
            interval_ms = self.launch_interval.as_millis() as u64,
            "Starting schedule"
        );

        for (position, entry) in schedule.iter().enumerate() {
            if position > 0 {
                tokio::select! {
                    _ = tokio::time::sleep(self.launch_interval) => {}
                    _ = shutdown.recv() => {}
                }
            }
            if shutdown.is_shutdown() {
                break;
            }

            let engine = self.engine.clone();
            let entry = entry.clone();
            handles.push(tokio::spawn(async move { engine.run_slice(&entry).await }));
        }

        let skipped = schedule.len() - handles.len();
        if skipped > 0 {
            warn!(skipped, "Shutdown requested, remaining slices not launched");
        }

        let mut slices = Vec::with_capacity(handles.len());
        for result in join_all(handles).await {
            match result {
                Ok(report) => slices.push(report),
                Err(e) => error!("Slice task panicked: {}", e),
            }
        }

        let report = RunReport {
            slices,
            skipped,
            elapsed: started.elapsed(),
        };
        info!(
            completed = report.completed(),
            failed_connections = report.failed_connections(),
            elapsed_ms = report.elapsed.as_millis() as u64,
            "Schedule finished"
        );
        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use txload_config::DispatchConfig;
    use txload_core::SliceEntry;
    use txload_store::LockedRecordStore;

    fn driver(coordinator: Arc<ShutdownCoordinator>) -> ScheduleDriver {
        let engine = DispatchEngine::new(
            DispatchConfig::default(),
            Arc::new(LockedRecordStore::new()),
            coordinator.clone(),
        );
        ScheduleDriver::new(engine, coordinator)
    }

    fn idle_schedule() -> Schedule {
        ["a", "b", "c"]
            .into_iter()
            .map(|label| SliceEntry::new(label, 0))
            .collect()
    }

    #[tokio::test(start_paused = true)]
    async fn test_launches_one_interval_apart() {
        let coordinator = Arc::new(ShutdownCoordinator::new());
        let driver = driver(coordinator).with_launch_interval(Duration::from_secs(1));

        let started = Instant::now();
        let report = driver.run(&idle_schedule()).await;

        let labels: Vec<&str> = report.slices.iter().map(|s| s.label.as_str()).collect();
        assert_eq!(labels, vec!["a", "b", "c"]);
        assert_eq!(report.skipped, 0);
        // Two gaps, none after the last launch
        let elapsed = started.elapsed();
        assert!(elapsed >= Duration::from_secs(2));
        assert!(elapsed < Duration::from_secs(3));
    }

    #[tokio::test]
    async fn test_shutdown_skips_remaining_slices() {
        let coordinator = Arc::new(ShutdownCoordinator::new());
        coordinator.trigger().unwrap();

        let report = driver(coordinator).run(&idle_schedule()).await;
        assert!(report.slices.is_empty());
        assert_eq!(report.skipped, 3);
    }

    #[tokio::test]
    async fn test_empty_schedule() {
        let coordinator = Arc::new(ShutdownCoordinator::new());
        let report = driver(coordinator).run(&Schedule::default()).await;
        assert!(report.slices.is_empty());
        assert_eq!(report.completed(), 0);
    }
}
