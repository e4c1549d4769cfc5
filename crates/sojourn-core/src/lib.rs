//! sojourn-core
//!
//! Completion engine for timed activities: the poller that claims finished
//! trips, the effect pipeline that runs over them and the dispatcher that
//! tells the owner what happened.
//!
//! # モジュール構成
//! - **domain**: ドメインモデル（ids, items, bank, activity, actor, outcome, errors）
//! - **ports**: 抽象化レイヤー（ActivityStore, Ledger, ActorDirectory, ActivityResolver, Transport, Clock）
//! - **pipeline**: 効果ハンドラー（EffectHandler, HandlerRegistry, Pipeline, 組み込み handler）
//! - **app**: アプリケーションロジック（Scheduler, ActivityPoller, ActivityProcessor, EngineBuilder）
//! - **impls**: 実装（InMemory* など開発用）
//! - **config**: 設定（Config, DeploymentMode）

pub mod app;
pub mod config;
pub mod domain;
pub mod impls;
pub mod pipeline;
pub mod ports;
