//! Scheduler - owns every recurring job (ticker)
//!
//! # 設計原則
//! - fixed delay after completion: the next run is armed only once the
//!   current one finished, so a ticker never overlaps itself
//! - `startup_delay` staggers first runs
//! - failures and panics are caught, logged and recorded; the ticker is
//!   always re-armed
//! - shutdown stops new runs; in-flight runs finish (`shutdown_and_join`)
//!
//! Tickers must be idempotent: a run may observe work that an earlier run
//! (or another process) already handled.

use async_trait::async_trait;
use futures::FutureExt;
use std::collections::BTreeMap;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{RwLock, watch};
use tokio::task::JoinHandle;
use tokio::time::Instant;

use super::status::{TickerOutcome, TickerStatus};
use crate::domain::TickerError;
use crate::domain::errors::panic_message;
use crate::ports::Clock;

/// A recurring job.
#[async_trait]
pub trait TickerJob: Send + Sync + 'static {
    async fn run(&self) -> Result<(), TickerError>;
}

#[derive(Debug, thiserror::Error)]
pub enum SchedulerError {
    #[error("ticker '{0}' is already registered")]
    DuplicateTicker(String),
}

struct Ticker {
    name: String,
    interval: Duration,
    startup_delay: Duration,
    job: Arc<dyn TickerJob>,
}

type Statuses = Arc<RwLock<BTreeMap<String, TickerStatus>>>;

pub struct Scheduler {
    clock: Arc<dyn Clock>,
    slow_threshold: Duration,
    pending: Vec<Ticker>,
    statuses: Statuses,
    shutdown_tx: watch::Sender<bool>,
    joins: Vec<JoinHandle<()>>,
    started: bool,
}

impl Scheduler {
    pub fn new(clock: Arc<dyn Clock>, slow_threshold: Duration) -> Self {
        let (shutdown_tx, _) = watch::channel(false);
        Self {
            clock,
            slow_threshold,
            pending: Vec::new(),
            statuses: Arc::new(RwLock::new(BTreeMap::new())),
            shutdown_tx,
            joins: Vec::new(),
            started: false,
        }
    }

    /// Add a ticker. Names are unique for the lifetime of the scheduler.
    ///
    /// Registering after `start` arms the ticker right away.
    pub async fn register(
        &mut self,
        name: impl Into<String>,
        interval: Duration,
        startup_delay: Duration,
        job: Arc<dyn TickerJob>,
    ) -> Result<(), SchedulerError> {
        let name = name.into();
        {
            let mut statuses = self.statuses.write().await;
            if statuses.contains_key(&name) {
                return Err(SchedulerError::DuplicateTicker(name));
            }
            statuses.insert(name.clone(), TickerStatus::new(name.clone(), interval));
        }
        self.pending.push(Ticker {
            name,
            interval,
            startup_delay,
            job,
        });
        if self.started {
            self.spawn_pending();
        }
        Ok(())
    }

    /// Arm every registered ticker.
    pub fn start(&mut self) {
        self.started = true;
        self.spawn_pending();
    }

    fn spawn_pending(&mut self) {
        for ticker in self.pending.drain(..) {
            let ctx = LoopContext {
                clock: Arc::clone(&self.clock),
                slow_threshold: self.slow_threshold,
                statuses: Arc::clone(&self.statuses),
                shutdown_rx: self.shutdown_tx.subscribe(),
            };
            tracing::debug!(
                ticker = %ticker.name,
                interval_ms = ticker.interval.as_millis() as u64,
                "ticker armed"
            );
            self.joins.push(tokio::spawn(ticker_loop(ticker, ctx)));
        }
    }

    /// Status of every registered ticker, by name.
    pub async fn status(&self) -> Vec<TickerStatus> {
        self.statuses.read().await.values().cloned().collect()
    }

    pub fn is_shutting_down(&self) -> bool {
        *self.shutdown_tx.borrow()
    }

    /// Stop arming new runs. In-flight runs are not cancelled.
    pub fn request_shutdown(&self) {
        self.shutdown_tx.send_replace(true);
    }

    /// Request shutdown and wait for every ticker loop to exit.
    pub async fn shutdown_and_join(self) {
        self.request_shutdown();
        for join in self.joins {
            if let Err(err) = join.await {
                tracing::error!(error = %err, "ticker loop ended abnormally");
            }
        }
    }
}

struct LoopContext {
    clock: Arc<dyn Clock>,
    slow_threshold: Duration,
    statuses: Statuses,
    shutdown_rx: watch::Receiver<bool>,
}

async fn ticker_loop(ticker: Ticker, mut ctx: LoopContext) {
    if wait_or_shutdown(ticker.startup_delay, &mut ctx.shutdown_rx).await {
        return;
    }

    loop {
        if *ctx.shutdown_rx.borrow() {
            break;
        }

        let started = Instant::now();
        let result = match AssertUnwindSafe(ticker.job.run()).catch_unwind().await {
            Ok(result) => result,
            Err(payload) => Err(TickerError::Panicked(panic_message(payload.as_ref()))),
        };
        let elapsed = started.elapsed();

        let outcome = match result {
            Ok(()) => TickerOutcome::Ok,
            Err(err) => {
                tracing::error!(ticker = %ticker.name, error = %err, "ticker errored");
                TickerOutcome::Failed(err.to_string())
            }
        };
        if elapsed > ctx.slow_threshold {
            tracing::warn!(
                ticker = %ticker.name,
                elapsed_ms = elapsed.as_millis() as u64,
                "ticker run was slow"
            );
        }
        if let Some(status) = ctx.statuses.write().await.get_mut(&ticker.name) {
            status.record(outcome, elapsed, ctx.clock.now());
        }

        if wait_or_shutdown(ticker.interval, &mut ctx.shutdown_rx).await {
            break;
        }
    }
    tracing::debug!(ticker = %ticker.name, "ticker stopped");
}

/// Sleep for `delay`; returns true if shutdown was requested meanwhile.
async fn wait_or_shutdown(delay: Duration, shutdown_rx: &mut watch::Receiver<bool>) -> bool {
    if *shutdown_rx.borrow() {
        return true;
    }
    tokio::select! {
        _ = tokio::time::sleep(delay) => *shutdown_rx.borrow(),
        // Err: the scheduler was dropped
        changed = shutdown_rx.changed() => changed.is_err() || *shutdown_rx.borrow(),
    }
}
