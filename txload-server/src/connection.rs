//! Per-connection request/reply loop

use std::net::SocketAddr;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tracing::{debug, warn};
use txload_core::{IoStage, TxLoadError};
use txload_resilience::{with_deadline, ShutdownListener};

use crate::id::TransactionIdGenerator;
use crate::server::StatsCounters;

/// Everything a connection task needs from its listener
#[derive(Clone)]
pub struct ConnectionContext {
    pub port: u16,
    pub generator: Arc<TransactionIdGenerator>,
    pub read_buffer_size: usize,
    pub idle_timeout: Option<Duration>,
    pub(crate) counters: Arc<StatsCounters>,
}

impl ConnectionContext {
    pub fn new(
        generator: Arc<TransactionIdGenerator>,
        read_buffer_size: usize,
        idle_timeout: Option<Duration>,
    ) -> Self {
        Self {
            port: generator.port(),
            generator,
            read_buffer_size,
            idle_timeout,
            counters: Arc::new(StatsCounters::default()),
        }
    }

    pub(crate) fn with_counters(mut self, counters: Arc<StatsCounters>) -> Self {
        self.counters = counters;
        self
    }
}

/// Serve one connection until the peer leaves, an I/O error occurs or
/// shutdown is requested. Returns the number of replies sent.
pub async fn serve_connection(
    mut stream: TcpStream,
    peer: SocketAddr,
    ctx: ConnectionContext,
    mut shutdown: ShutdownListener,
) -> u64 {
    let port = ctx.port;
    let mut buf = vec![0u8; ctx.read_buffer_size.max(1)];
    let mut replies = 0u64;

    let outcome = loop {
        let n = tokio::select! {
            _ = shutdown.recv() => break Ok(()),
            read = with_deadline(ctx.idle_timeout, stream.read(&mut buf)) => match read {
                Err(_) => break Err(TxLoadError::Timeout { port, stage: IoStage::Read }),
                Ok(Err(e)) => break Err(TxLoadError::connection(port, IoStage::Read, e)),
                Ok(Ok(0)) => break Err(TxLoadError::ConnectionClosed { port }),
                Ok(Ok(n)) => n,
            },
        };

        debug!(
            port,
            %peer,
            payload = %String::from_utf8_lossy(&buf[..n]),
            "Received record"
        );

        let reply = ctx.generator.next_id().to_string();
        tokio::select! {
            _ = shutdown.recv() => break Ok(()),
            written = with_deadline(ctx.idle_timeout, stream.write_all(reply.as_bytes())) => match written {
                Err(_) => break Err(TxLoadError::Timeout { port, stage: IoStage::Write }),
                Ok(Err(e)) => break Err(TxLoadError::connection(port, IoStage::Write, e)),
                Ok(Ok(())) => {}
            },
        }
        replies += 1;
        ctx.counters.replies.fetch_add(1, Ordering::Relaxed);
    };

    match outcome {
        Ok(()) => debug!(port, %peer, replies, "Connection closed on shutdown"),
        Err(e) if e.is_peer_close() => debug!(port, %peer, replies, "Connection closed by peer"),
        Err(e) => warn!(port, %peer, replies, policy = ?e.policy(), "Connection closed: {}", e),
    }

    replies
}
