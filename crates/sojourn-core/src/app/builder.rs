//! EngineBuilder - wiring and startup validation
//!
//! # 学習ポイント
//! - Builder パターンで ports と handler を組み立てる
//! - 起動時検証（Fail-fast）: 足りない port や handler は build() で検出
//! - build() 後の registry は読み取り専用で共有される

use std::sync::Arc;

use super::collector::{CollectorManager, CollectorSweep};
use super::notification::NotificationDispatcher;
use super::poller::ActivityPoller;
use super::processor::ActivityProcessor;
use super::status::EngineStatus;
use super::ticker::{Scheduler, SchedulerError};
use crate::config::Config;
use crate::impls::PayloadResolver;
use crate::pipeline::handlers;
use crate::pipeline::{EffectHandler, HandlerRegistry, Pipeline, RegistryError};
use crate::ports::{
    ActivityResolver, ActivityStore, ActorDirectory, Clock, Ledger, SystemClock, Transport,
};

pub const POLL_TICKER: &str = "minion_activities";
pub const SWEEP_TICKER: &str = "collector_sweep";

/// Assembles an `Engine`.
///
/// # 使用例
/// ```ignore
/// let engine = EngineBuilder::new(config)
///     .store(store)
///     .ledger(ledger)
///     .directory(directory)
///     .transport(transport)
///     .canonical_handlers()?
///     .expect_handlers(&["Loot Doubling"])
///     .build()?;
/// ```
pub struct EngineBuilder {
    config: Config,
    registry: HandlerRegistry,
    expected_handlers: Option<Vec<String>>,
    store: Option<Arc<dyn ActivityStore>>,
    ledger: Option<Arc<dyn Ledger>>,
    directory: Option<Arc<dyn ActorDirectory>>,
    resolver: Arc<dyn ActivityResolver>,
    transport: Option<Arc<dyn Transport>>,
    clock: Arc<dyn Clock>,
}

#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    #[error("Missing effect handlers: {0:?}. These handlers were expected but not registered.")]
    MissingHandlers(Vec<String>),

    #[error("Missing port: {0}")]
    MissingPort(&'static str),
}

impl EngineBuilder {
    pub fn new(config: Config) -> Self {
        Self {
            config,
            registry: HandlerRegistry::new(),
            expected_handlers: None,
            store: None,
            ledger: None,
            directory: None,
            resolver: Arc::new(PayloadResolver::new()),
            transport: None,
            clock: Arc::new(SystemClock),
        }
    }

    pub fn store(mut self, store: Arc<dyn ActivityStore>) -> Self {
        self.store = Some(store);
        self
    }

    pub fn ledger(mut self, ledger: Arc<dyn Ledger>) -> Self {
        self.ledger = Some(ledger);
        self
    }

    pub fn directory(mut self, directory: Arc<dyn ActorDirectory>) -> Self {
        self.directory = Some(directory);
        self
    }

    /// Defaults to `PayloadResolver`.
    pub fn resolver(mut self, resolver: Arc<dyn ActivityResolver>) -> Self {
        self.resolver = resolver;
        self
    }

    pub fn transport(mut self, transport: Arc<dyn Transport>) -> Self {
        self.transport = Some(transport);
        self
    }

    /// Defaults to `SystemClock`.
    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Append one handler to the pipeline.
    pub fn handler(mut self, handler: Arc<dyn EffectHandler>) -> Result<Self, RegistryError> {
        self.registry.register(handler)?;
        Ok(self)
    }

    /// Append the built-in handlers in their documented order.
    pub fn canonical_handlers(mut self) -> Result<Self, RegistryError> {
        for handler in handlers::canonical() {
            self.registry.register(handler)?;
        }
        Ok(self)
    }

    /// Handler names that must be registered by the time `build` runs.
    pub fn expect_handlers(mut self, names: &[&str]) -> Self {
        self.expected_handlers = Some(names.iter().map(|name| name.to_string()).collect());
        self
    }

    pub fn build(self) -> Result<Engine, BuildError> {
        if let Some(expected) = &self.expected_handlers {
            let missing: Vec<String> = expected
                .iter()
                .filter(|name| !self.registry.contains(name))
                .cloned()
                .collect();
            if !missing.is_empty() {
                return Err(BuildError::MissingHandlers(missing));
            }
        }
        let store = self.store.ok_or(BuildError::MissingPort("activity store"))?;
        let ledger = self.ledger.ok_or(BuildError::MissingPort("ledger"))?;
        let directory = self
            .directory
            .ok_or(BuildError::MissingPort("actor directory"))?;
        let transport = self.transport.ok_or(BuildError::MissingPort("transport"))?;

        let handler_names = self.registry.names();
        let collectors = Arc::new(CollectorManager::new(self.config.collector_ttl));
        let processor = Arc::new(ActivityProcessor::new(
            Pipeline::new(Arc::new(self.registry), self.config.handler_budget),
            ledger,
            directory,
            self.resolver,
            NotificationDispatcher::new(transport, Arc::clone(&collectors)),
            self.config.rng_seed,
        ));
        let poller = Arc::new(ActivityPoller::new(
            store,
            Arc::clone(&processor),
            Arc::clone(&self.clock),
            self.config.batch_size,
        ));
        let scheduler = Scheduler::new(self.clock, self.config.ticker_slow_threshold);

        Ok(Engine {
            config: self.config,
            scheduler,
            processor,
            poller,
            collectors,
            handler_names,
        })
    }
}

/// A wired completion engine: the poller and the collector sweep, driven by
/// one scheduler.
pub struct Engine {
    config: Config,
    scheduler: Scheduler,
    processor: Arc<ActivityProcessor>,
    poller: Arc<ActivityPoller>,
    collectors: Arc<CollectorManager>,
    handler_names: Vec<String>,
}

impl Engine {
    /// Register both tickers and arm them.
    pub async fn start(&mut self) -> Result<(), SchedulerError> {
        self.scheduler
            .register(
                POLL_TICKER,
                self.config.poll_interval,
                self.config.poll_startup_delay,
                self.poller.clone(),
            )
            .await?;
        self.scheduler
            .register(
                SWEEP_TICKER,
                self.config.collector_sweep_interval,
                self.config.collector_sweep_interval,
                Arc::new(CollectorSweep::new(Arc::clone(&self.collectors))),
            )
            .await?;
        self.scheduler.start();
        tracing::info!(
            mode = ?self.config.mode,
            handlers = self.handler_names.len(),
            poll_interval_ms = self.config.poll_interval.as_millis() as u64,
            "engine started"
        );
        Ok(())
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn poller(&self) -> &Arc<ActivityPoller> {
        &self.poller
    }

    pub fn processor(&self) -> &Arc<ActivityProcessor> {
        &self.processor
    }

    pub fn collectors(&self) -> &Arc<CollectorManager> {
        &self.collectors
    }

    pub fn request_shutdown(&self) {
        self.scheduler.request_shutdown();
    }

    pub async fn status(&self) -> EngineStatus {
        EngineStatus {
            tickers: self.scheduler.status().await,
            live_collectors: self.collectors.len().await,
            handlers: self.handler_names.clone(),
        }
    }

    /// Stop arming runs and wait for in-flight ones.
    pub async fn shutdown_and_join(self) {
        self.scheduler.shutdown_and_join().await;
        tracing::info!("engine stopped");
    }
}
