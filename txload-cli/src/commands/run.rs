//! `txload run`: server and driver in one process

use anyhow::Result;
use tracing::info;
use txload_config::TxLoadConfig;
use txload_dispatch::{DispatchEngine, Target};
use txload_server::TransactionServer;
use txload_store::create_seeded_store;

pub async fn run(mut config: TxLoadConfig, pacing: Option<String>) -> Result<()> {
    super::apply_pacing(&mut config.dispatch, pacing.as_deref())?;

    let coordinator = super::coordinator();
    let server = TransactionServer::new(config.server.clone(), coordinator.clone());
    let handle = server.start().await;
    if handle.is_idle() {
        anyhow::bail!(
            "None of the {} configured ports could be bound",
            config.server.ports.count
        );
    }

    // Only dial ports that actually came up
    let targets: Vec<Target> = handle
        .ports()
        .into_iter()
        .map(|port| Target::new(config.dispatch.host.clone(), port))
        .collect();
    info!(ports = ?handle.ports(), "In-process server ready");

    let store = create_seeded_store(&config.store);
    let engine = DispatchEngine::new(config.dispatch.clone(), store.clone(), coordinator.clone())
        .with_targets(targets);

    let report = super::drive::drive_schedule(&config, engine, coordinator).await;
    let stats = handle.stats();
    handle.join().await;

    super::drive::print_report(&report, &store)?;
    println!(
        "server: {} connections, {} replies, {} accept errors",
        stats.connections, stats.replies, stats.accept_errors
    );
    Ok(())
}
