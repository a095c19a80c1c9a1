//! `txload serve`

use anyhow::Result;
use tracing::info;
use txload_config::TxLoadConfig;
use txload_server::TransactionServer;

use crate::signal::shutdown_signal;

/// Serve every configured port until Ctrl+C or SIGTERM
pub async fn serve(config: TxLoadConfig) -> Result<()> {
    let coordinator = super::coordinator();
    let server = TransactionServer::new(config.server.clone(), coordinator.clone());

    let handle = server.start().await;
    if handle.is_idle() {
        anyhow::bail!(
            "None of the {} configured ports could be bound",
            config.server.ports.count
        );
    }

    info!(ports = ?handle.ports(), "Transaction server ready");
    shutdown_signal().await;

    super::shutdown(&coordinator).await;
    let stats = handle.stats();
    handle.join().await;

    info!(
        connections = stats.connections,
        replies = stats.replies,
        accept_errors = stats.accept_errors,
        "Transaction server stopped"
    );
    Ok(())
}
