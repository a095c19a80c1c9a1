//! Listener management and accept loops

use futures::future::join_all;
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};
use txload_config::ServerConfig;
use txload_core::TxLoadError;
use txload_resilience::ShutdownCoordinator;

use crate::connection::{serve_connection, ConnectionContext};
use crate::id::TransactionIdGenerator;

#[derive(Debug, Default)]
pub(crate) struct StatsCounters {
    pub(crate) connections: AtomicU64,
    pub(crate) accept_errors: AtomicU64,
    pub(crate) replies: AtomicU64,
}

/// Server-wide counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerStats {
    pub connections: u64,
    pub accept_errors: u64,
    pub replies: u64,
}

/// A port that is being served
#[derive(Debug, Clone, Copy)]
pub struct BoundPort {
    /// Port the server identifies itself with in transaction ids
    pub port: u16,
    pub local_addr: SocketAddr,
}

/// Transaction server
pub struct TransactionServer {
    config: ServerConfig,
    coordinator: Arc<ShutdownCoordinator>,
    counters: Arc<StatsCounters>,
}

impl TransactionServer {
    pub fn new(config: ServerConfig, coordinator: Arc<ShutdownCoordinator>) -> Self {
        Self {
            config,
            coordinator,
            counters: Arc::new(StatsCounters::default()),
        }
    }

    /// Bind every configured port and start serving.
    ///
    /// A port that cannot be bound is reported in the handle's failures; the
    /// remaining ports are served regardless.
    pub async fn start(&self) -> ServerHandle {
        let mut handle = ServerHandle::new(self.counters.clone());

        for port in self.config.ports.ports() {
            match TcpListener::bind((self.config.bind_address.as_str(), port)).await {
                Ok(listener) => match self.spawn_listener(listener) {
                    Ok((bound, task)) => handle.push(bound, task),
                    Err(e) => handle.fail(port, e),
                },
                Err(e) => handle.fail(port, e),
            }
        }

        info!(
            bind_address = %self.config.bind_address,
            serving = handle.bound.len(),
            failed = handle.failures.len(),
            "Transaction server started"
        );
        handle
    }

    /// Serve already-bound listeners, e.g. ones bound to port 0
    pub fn start_on(&self, listeners: Vec<TcpListener>) -> ServerHandle {
        let mut handle = ServerHandle::new(self.counters.clone());
        for listener in listeners {
            match self.spawn_listener(listener) {
                Ok((bound, task)) => handle.push(bound, task),
                Err(e) => handle.fail(0, e),
            }
        }
        handle
    }

    /// Spawn the accept loop for one listener
    fn spawn_listener(
        &self,
        listener: TcpListener,
    ) -> std::io::Result<(BoundPort, JoinHandle<()>)> {
        let local_addr = listener.local_addr()?;
        let port = local_addr.port();
        let ctx = ConnectionContext::new(
            Arc::new(TransactionIdGenerator::new(port)),
            self.config.read_buffer_size,
            self.config.idle_timeout,
        )
        .with_counters(self.counters.clone());

        let coordinator = self.coordinator.clone();
        let task = tokio::spawn(accept_loop(listener, ctx, coordinator));

        info!(port, %local_addr, "Listening");
        Ok((BoundPort { port, local_addr }, task))
    }
}

async fn accept_loop(
    listener: TcpListener,
    ctx: ConnectionContext,
    coordinator: Arc<ShutdownCoordinator>,
) {
    let _guard = coordinator.track();
    let mut shutdown = coordinator.listener();
    let port = ctx.port;

    loop {
        tokio::select! {
            _ = shutdown.recv() => break,
            accepted = listener.accept() => match accepted {
                Ok((stream, peer)) => {
                    debug!(port, %peer, "Accepted connection");
                    ctx.counters.connections.fetch_add(1, Ordering::Relaxed);

                    let guard = coordinator.track();
                    let conn_shutdown = coordinator.listener();
                    let conn_ctx = ctx.clone();
                    tokio::spawn(async move {
                        let _guard = guard;
                        serve_connection(stream, peer, conn_ctx, conn_shutdown).await;
                    });
                }
                Err(source) => {
                    let e = TxLoadError::Accept { port, source };
                    ctx.counters.accept_errors.fetch_add(1, Ordering::Relaxed);
                    warn!(port, policy = ?e.policy(), "{}", e);
                }
            },
        }
    }

    info!(port, "Listener stopped");
}

/// Running server: bound ports, bind failures and accept-loop tasks
pub struct ServerHandle {
    bound: Vec<BoundPort>,
    failures: Vec<TxLoadError>,
    tasks: Vec<JoinHandle<()>>,
    counters: Arc<StatsCounters>,
}

impl ServerHandle {
    fn new(counters: Arc<StatsCounters>) -> Self {
        Self {
            bound: Vec::new(),
            failures: Vec::new(),
            tasks: Vec::new(),
            counters,
        }
    }

    fn push(&mut self, bound: BoundPort, task: JoinHandle<()>) {
        self.bound.push(bound);
        self.tasks.push(task);
    }

    fn fail(&mut self, port: u16, source: std::io::Error) {
        let e = TxLoadError::Listen { port, source };
        error!(port, policy = ?e.policy(), "{}", e);
        self.failures.push(e);
    }

    pub fn bound(&self) -> &[BoundPort] {
        &self.bound
    }

    pub fn ports(&self) -> Vec<u16> {
        self.bound.iter().map(|b| b.port).collect()
    }

    pub fn local_addrs(&self) -> Vec<SocketAddr> {
        self.bound.iter().map(|b| b.local_addr).collect()
    }

    /// Ports that could not be bound
    pub fn failures(&self) -> &[TxLoadError] {
        &self.failures
    }

    /// True when no port is being served
    pub fn is_idle(&self) -> bool {
        self.bound.is_empty()
    }

    pub fn stats(&self) -> ServerStats {
        ServerStats {
            connections: self.counters.connections.load(Ordering::Relaxed),
            accept_errors: self.counters.accept_errors.load(Ordering::Relaxed),
            replies: self.counters.replies.load(Ordering::Relaxed),
        }
    }

    /// Wait for every accept loop to stop
    pub async fn join(self) {
        for result in join_all(self.tasks).await {
            if let Err(e) = result {
                error!("Accept loop panicked: {}", e);
            }
        }
    }
}
