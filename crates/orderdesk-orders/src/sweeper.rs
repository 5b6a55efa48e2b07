//! Background sweeper: advances every pending order to `processing` and
//! then to `completed`.
//!
//! Each tick snapshots the pending orders once, then walks them one at a
//! time. Both steps are persisted separately, so an order whose
//! processing fails (or whose tick is cut short) stays in `processing`
//! and is never picked up again by the pending scan.

use std::sync::Arc;
use std::time::Duration;

use orderdesk_core::error::{OrderDeskError, OrderDeskResult};
use orderdesk_core::models::order::{Order, OrderStatus};
use orderdesk_core::repository::OrderRepository;
use tokio::sync::Mutex;
use tokio::task::{JoinError, JoinHandle, JoinSet};
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::processor::OrderProcessor;

#[derive(Debug, Clone)]
pub struct SweeperConfig {
    /// Time between the starts of consecutive ticks.
    pub interval: Duration,
    /// Delay used by the simulated processor for each order.
    pub processing_delay: Duration,
    /// How long shutdown waits for an in-flight tick.
    pub shutdown_grace: Duration,
}

impl Default for SweeperConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(120),
            processing_delay: Duration::from_secs(1),
            shutdown_grace: Duration::from_secs(30),
        }
    }
}

/// What one tick did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SweepReport {
    /// Size of the pending snapshot.
    pub examined: usize,
    pub completed: usize,
    /// Orders whose processing or final write failed.
    pub failed: usize,
    /// Orders that left `pending` (e.g. were cancelled) after the snapshot.
    pub skipped: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SweepOutcome {
    Ran(SweepReport),
    /// Another tick was still running.
    Skipped,
}

enum Advance {
    Completed,
    Skipped,
}

struct Inner<O, P> {
    order_repo: O,
    processor: P,
    config: SweeperConfig,
    /// Held for the duration of a tick so two ticks never overlap.
    job_slot: Mutex<()>,
}

/// Periodic driver of the order lifecycle.
pub struct Sweeper<O, P> {
    inner: Arc<Inner<O, P>>,
}

impl<O, P> Clone for Sweeper<O, P> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<O, P> Sweeper<O, P>
where
    O: OrderRepository + 'static,
    P: OrderProcessor,
{
    pub fn new(order_repo: O, processor: P, config: SweeperConfig) -> Self {
        Self {
            inner: Arc::new(Inner {
                order_repo,
                processor,
                config,
                job_slot: Mutex::new(()),
            }),
        }
    }

    /// Run a single tick now. Returns `Skipped` without doing anything if
    /// a tick is already in progress.
    ///
    /// Per-order failures are counted in the report; only a failure to
    /// read the pending snapshot is returned as an error.
    pub async fn sweep_once(&self) -> OrderDeskResult<SweepOutcome> {
        let Ok(_slot) = self.inner.job_slot.try_lock() else {
            warn!("sweep already in progress, skipping tick");
            return Ok(SweepOutcome::Skipped);
        };

        let report = self.inner.sweep().await?;
        Ok(SweepOutcome::Ran(report))
    }

    /// Spawn the periodic loop. Ticks fire on a fixed schedule, the first
    /// one `interval` after start. A tick that fires while the previous one
    /// is still running is skipped.
    pub fn start(&self) -> SweeperHandle {
        let cancel = CancellationToken::new();
        let sweeper = self.clone();
        let token = cancel.clone();
        let join = tokio::spawn(async move {
            sweeper.run_loop(token).await;
        });

        SweeperHandle {
            cancel,
            join,
            grace: self.inner.config.shutdown_grace,
        }
    }

    async fn run_loop(&self, cancel: CancellationToken) {
        let interval = self.inner.config.interval;
        info!(interval_secs = interval.as_secs(), "order sweeper started");

        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        // The first tick completes immediately.
        ticker.tick().await;

        // Each tick runs in its own task so a slow tick does not delay the
        // schedule and a panicking one does not take the loop down with it.
        // Dropping the set aborts whatever is still running.
        let mut ticks = JoinSet::new();

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    let sweeper = self.clone();
                    ticks.spawn(async move { sweeper.sweep_once().await });
                }
                Some(joined) = ticks.join_next(), if !ticks.is_empty() => log_tick(joined),
                _ = cancel.cancelled() => {
                    info!("order sweeper shutting down");
                    while let Some(joined) = ticks.join_next().await {
                        log_tick(joined);
                    }
                    return;
                }
            }
        }
    }
}

fn log_tick(joined: Result<OrderDeskResult<SweepOutcome>, JoinError>) {
    match joined {
        Ok(Ok(SweepOutcome::Ran(report))) => debug!(?report, "sweep tick finished"),
        Ok(Ok(SweepOutcome::Skipped)) => {}
        Ok(Err(e)) => error!(error = %e, "sweep tick failed"),
        Err(e) if e.is_panic() => error!(error = %e, "sweep tick panicked"),
        Err(_) => {}
    }
}

impl<O, P> Inner<O, P>
where
    O: OrderRepository,
    P: OrderProcessor,
{
    async fn sweep(&self) -> OrderDeskResult<SweepReport> {
        info!("sweep tick started");
        let batch = self.order_repo.list_by_status(OrderStatus::Pending).await?;
        let mut report = SweepReport {
            examined: batch.len(),
            ..SweepReport::default()
        };
        if batch.is_empty() {
            info!("no pending orders to process");
            return Ok(report);
        }
        info!(batch_size = batch.len(), "sweeping pending orders");

        for order in &batch {
            match self.advance(order).await {
                Ok(Advance::Completed) => {
                    info!(order_id = %order.id, "order completed");
                    report.completed += 1;
                }
                Ok(Advance::Skipped) => report.skipped += 1,
                Err(e) => {
                    error!(order_id = %order.id, error = %e, "failed to process order");
                    report.failed += 1;
                }
            }
        }

        info!(
            completed = report.completed,
            failed = report.failed,
            skipped = report.skipped,
            "sweep finished"
        );
        Ok(report)
    }

    async fn advance(&self, order: &Order) -> OrderDeskResult<Advance> {
        let processing = match self
            .order_repo
            .set_status(order, OrderStatus::Processing)
            .await
        {
            Ok(processing) => processing,
            Err(OrderDeskError::StatusConflict { .. }) => {
                debug!(order_id = %order.id, "order left pending after snapshot");
                return Ok(Advance::Skipped);
            }
            Err(e) => return Err(e),
        };

        self.processor.process(&processing).await?;
        self.order_repo
            .set_status(&processing, OrderStatus::Completed)
            .await?;
        Ok(Advance::Completed)
    }
}

/// Handle to a running sweeper loop.
pub struct SweeperHandle {
    cancel: CancellationToken,
    join: JoinHandle<()>,
    grace: Duration,
}

impl SweeperHandle {
    /// Stop scheduling ticks and wait up to `shutdown_grace` for an
    /// in-flight tick. A tick still running after that is aborted, which
    /// may leave its current order in `processing`.
    pub async fn shutdown(mut self) {
        self.cancel.cancel();

        let stopped = tokio::time::timeout(self.grace, &mut self.join).await;
        match stopped {
            Ok(Ok(())) => info!("order sweeper stopped"),
            Ok(Err(e)) => error!(error = %e, "order sweeper task panicked"),
            Err(_) => {
                warn!(
                    grace_secs = self.grace.as_secs(),
                    "order sweeper did not stop in time, aborting in-flight tick"
                );
                self.join.abort();
            }
        }
    }
}
