//! App - アプリケーション層
//!
//! このモジュールは、ports と pipeline を組み合わせてアプリケーションロジックを実装します。
//!
//! # 主要コンポーネント
//! - **EngineBuilder**: エンジンの構築とワイヤリング
//! - **Scheduler**: ticker の登録と実行（fixed delay, shutdown gate）
//! - **ActivityPoller**: 期限切れ activity の取得と claim（list_due→claim→process）
//! - **ActivityProcessor**: 1 件の activity の処理（resolve→pipeline→ledger→notify）
//! - **NotificationDispatcher**: 完了メッセージの送信
//! - **CollectorManager**: actor ごとのインタラクション collector

pub mod builder;
pub mod collector;
pub mod notification;
pub mod poller;
pub mod processor;
pub mod status;
pub mod ticker;

// 主要な型を再エクスポート
pub use self::builder::{BuildError, Engine, EngineBuilder, POLL_TICKER, SWEEP_TICKER};
pub use self::collector::{CollectorHandle, CollectorManager, CollectorSweep};
pub use self::notification::{DispatchOutcome, Notification, NotificationDispatcher};
pub use self::poller::{ActivityPoller, PollReport};
pub use self::processor::{ActivityProcessor, ProcessError, ProcessReport};
pub use self::status::{EngineStatus, TickerOutcome, TickerStatus};
pub use self::ticker::{Scheduler, SchedulerError, TickerJob};
