//! Rate-controlled dispatch engine
//!
//! One engine run covers one schedule slice. The slice's TPS is split evenly
//! over `pool_size` connections (capped per connection). Connection `i` dials
//! target `i mod targets.len()` and, for each request, reads a record from the
//! store, sends it, reads back the transaction id and stores
//! `value + " " + id` under the same key. The read-modify-write is not atomic:
//! two connections on the same key may overwrite each other's suffix.
//!
//! With [`PacingMode::Remaining`] every request is followed by a sleep of
//! `1000 / remaining` ms, `remaining` being a budget shared by all connections
//! of the slice and decremented after each sleep.

use futures::future::join_all;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::time::Instant;
use tracing::{debug, error, info, warn};
use txload_config::{DispatchConfig, PacingMode};
use txload_core::{IoStage, SliceEntry, TxLoadError};
use txload_resilience::{with_deadline, ShutdownCoordinator, ShutdownListener};
use txload_store::{record_key, SharedRecordStore};

use crate::plan::SlicePlan;
use crate::report::{ConnectionOutcome, SliceReport};
use crate::target::Target;

/// Dispatch engine
pub struct DispatchEngine {
    config: DispatchConfig,
    targets: Arc<Vec<Target>>,
    store: SharedRecordStore,
    key_space: usize,
    coordinator: Arc<ShutdownCoordinator>,
}

impl DispatchEngine {
    /// Engine dialing the configured host and port range. Keys cycle over
    /// the records present in the store.
    pub fn new(
        config: DispatchConfig,
        store: SharedRecordStore,
        coordinator: Arc<ShutdownCoordinator>,
    ) -> Self {
        let targets = Target::from_config(&config);
        let key_space = store.len();
        Self {
            config,
            targets: Arc::new(targets),
            store,
            key_space: key_space.max(1),
            coordinator,
        }
    }

    /// Replace the dial targets
    pub fn with_targets(mut self, targets: Vec<Target>) -> Self {
        self.targets = Arc::new(targets);
        self
    }

    /// Cycle keys over `user_1 ..= user_<key_space>`
    pub fn with_key_space(mut self, key_space: usize) -> Self {
        self.key_space = key_space.max(1);
        self
    }

    pub fn config(&self) -> &DispatchConfig {
        &self.config
    }

    pub fn targets(&self) -> &[Target] {
        &self.targets
    }

    pub fn plan(&self, entry: &SliceEntry) -> SlicePlan {
        SlicePlan::new(entry, &self.config)
    }

    /// Run one slice and wait for every connection to finish or abort
    pub async fn run_slice(&self, entry: &SliceEntry) -> SliceReport {
        let plan = self.plan(entry);
        let started = Instant::now();

        if plan.is_empty() || self.targets.is_empty() {
            info!(slice = %plan.label, tps = plan.tps, "Nothing to send");
            return SliceReport::empty(plan.label, plan.tps);
        }

        info!(
            slice = %plan.label,
            tps = plan.tps,
            connections = plan.connections,
            per_connection = plan.requests_per_connection,
            "Starting slice"
        );

        let budget = Arc::new(AtomicU32::new(plan.tps));
        let handles: Vec<_> = (0..plan.connections)
            .map(|index| {
                let worker = ConnectionWorker {
                    slice: plan.label.clone(),
                    index,
                    target: self.targets[index % self.targets.len()].clone(),
                    requests: plan.requests_per_connection,
                    budget: budget.clone(),
                    store: self.store.clone(),
                    key_space: self.key_space,
                    pacing: self.config.pacing,
                    io_timeout: self.config.io_timeout,
                    read_buffer_size: self.config.read_buffer_size.max(1),
                };
                let guard = self.coordinator.track();
                let shutdown = self.coordinator.listener();
                tokio::spawn(async move {
                    let _guard = guard;
                    worker.run(shutdown).await
                })
            })
            .collect();

        let mut connections = Vec::with_capacity(handles.len());
        for result in join_all(handles).await {
            match result {
                Ok(outcome) => connections.push(outcome),
                Err(e) => error!(slice = %plan.label, "Connection task panicked: {}", e),
            }
        }

        let report = SliceReport {
            label: plan.label,
            tps: plan.tps,
            requests_per_connection: plan.requests_per_connection,
            connections,
            elapsed: started.elapsed(),
        };

        info!(
            slice = %report.label,
            completed = report.completed(),
            failed_connections = report.failed_connections(),
            elapsed_ms = report.elapsed.as_millis() as u64,
            "Slice finished"
        );
        report
    }
}

/// State owned by one dispatch connection task
struct ConnectionWorker {
    slice: String,
    index: usize,
    target: Target,
    requests: u32,
    budget: Arc<AtomicU32>,
    store: SharedRecordStore,
    key_space: usize,
    pacing: PacingMode,
    io_timeout: Option<Duration>,
    read_buffer_size: usize,
}

impl ConnectionWorker {
    async fn run(self, mut shutdown: ShutdownListener) -> ConnectionOutcome {
        let mut outcome = ConnectionOutcome {
            index: self.index,
            port: self.target.port,
            completed: 0,
            missing_keys: 0,
            error: None,
        };

        match self.dial().await {
            Ok(mut stream) => {
                if let Err(e) = self.drive(&mut stream, &mut outcome, &mut shutdown).await {
                    outcome.error = Some(e);
                }
            }
            Err(e) => outcome.error = Some(e),
        }

        match &outcome.error {
            None => debug!(
                slice = %self.slice,
                connection = self.index,
                port = self.target.port,
                completed = outcome.completed,
                "Connection finished"
            ),
            Some(e) => warn!(
                slice = %self.slice,
                connection = self.index,
                port = self.target.port,
                completed = outcome.completed,
                policy = ?e.policy(),
                "Connection abandoned: {}",
                e
            ),
        }

        outcome
    }

    async fn dial(&self) -> Result<TcpStream, TxLoadError> {
        let port = self.target.port;
        match with_deadline(
            self.io_timeout,
            TcpStream::connect((self.target.host.as_str(), port)),
        )
        .await
        {
            Ok(Ok(stream)) => Ok(stream),
            Ok(Err(e)) => Err(TxLoadError::connection(port, IoStage::Dial, e)),
            Err(_) => Err(TxLoadError::Timeout {
                port,
                stage: IoStage::Dial,
            }),
        }
    }

    async fn drive(
        &self,
        stream: &mut TcpStream,
        outcome: &mut ConnectionOutcome,
        shutdown: &mut ShutdownListener,
    ) -> Result<(), TxLoadError> {
        let port = self.target.port;
        let mut buf = vec![0u8; self.read_buffer_size];

        for j in 0..self.requests as usize {
            if shutdown.is_shutdown() || self.budget.load(Ordering::Acquire) == 0 {
                break;
            }

            let key = record_key((j % self.key_space) + 1);
            match self.store.get(&key) {
                Some(value) => {
                    let n = tokio::select! {
                        _ = shutdown.recv() => {
                            debug!(
                                slice = %self.slice,
                                connection = self.index,
                                port,
                                "Shutdown while waiting on the server"
                            );
                            return Ok(());
                        }
                        exchanged = self.exchange(stream, value.as_bytes(), &mut buf) => exchanged?,
                    };

                    let transaction_id = String::from_utf8_lossy(&buf[..n]);
                    self.store
                        .set(&key, format!("{} {}", value, transaction_id));
                    outcome.completed += 1;
                }
                None => {
                    debug!(slice = %self.slice, key = %key, "Key not in store, skipping");
                    outcome.missing_keys += 1;
                }
            }

            self.pace(shutdown).await;
        }

        Ok(())
    }

    /// Send one record and read its reply into `buf`
    async fn exchange(
        &self,
        stream: &mut TcpStream,
        payload: &[u8],
        buf: &mut [u8],
    ) -> Result<usize, TxLoadError> {
        let port = self.target.port;
        with_deadline(self.io_timeout, stream.write_all(payload))
            .await
            .map_err(|_| TxLoadError::Timeout {
                port,
                stage: IoStage::Write,
            })?
            .map_err(|e| TxLoadError::connection(port, IoStage::Write, e))?;

        let n = with_deadline(self.io_timeout, stream.read(buf))
            .await
            .map_err(|_| TxLoadError::Timeout {
                port,
                stage: IoStage::Read,
            })?
            .map_err(|e| TxLoadError::connection(port, IoStage::Read, e))?;
        if n == 0 {
            return Err(TxLoadError::ConnectionClosed { port });
        }
        Ok(n)
    }

    /// Sleep `1000 / remaining` ms, then take one unit off the shared budget
    async fn pace(&self, shutdown: &mut ShutdownListener) {
        if self.pacing == PacingMode::Remaining {
            let remaining = self.budget.load(Ordering::Acquire);
            if remaining > 0 {
                let delay = Duration::from_millis(u64::from(1000 / remaining));
                tokio::select! {
                    _ = tokio::time::sleep(delay) => {}
                    _ = shutdown.recv() => {}
                }
            }
        }

        let _ = self
            .budget
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |remaining| {
                Some(remaining.saturating_sub(1))
            });
    }
}
