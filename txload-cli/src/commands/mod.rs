//! Subcommand implementations

pub mod config;
pub mod drive;
pub mod run;
pub mod serve;

use anyhow::Result;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;
use txload_config::{DispatchConfig, PacingMode};
use txload_resilience::ShutdownCoordinator;

/// Grace given to in-flight requests once a signal arrives
const GRACEFUL_TIMEOUT: Duration = Duration::from_secs(10);
const FORCED_GRACE: Duration = Duration::from_millis(500);

pub(crate) fn coordinator() -> Arc<ShutdownCoordinator> {
    Arc::new(ShutdownCoordinator::with_timeouts(GRACEFUL_TIMEOUT, FORCED_GRACE))
}

/// Apply a `--pacing` flag to the dispatch configuration
pub(crate) fn apply_pacing(dispatch: &mut DispatchConfig, pacing: Option<&str>) -> Result<()> {
    if let Some(mode) = pacing {
        dispatch.pacing = PacingMode::from_str(mode).map_err(|e| anyhow::anyhow!(e))?;
    }
    Ok(())
}

/// Shut down, logging rather than failing when tasks outlive the grace period
pub(crate) async fn shutdown(coordinator: &ShutdownCoordinator) {
    if let Err(e) = coordinator.shutdown().await {
        tracing::warn!("{}", e);
    }
}
