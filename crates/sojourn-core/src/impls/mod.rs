//! Impls - 実装（開発用・テスト用）
//!
//! In-memory adapters for every port. The demo binary runs on them and the
//! tests use them as fakes; production adapters (database, chat transport)
//! live outside this crate.

pub mod inmem_directory;
pub mod inmem_ledger;
pub mod inmem_store;
pub mod inmem_transport;
pub mod payload_resolver;

pub use self::inmem_directory::InMemoryActorDirectory;
pub use self::inmem_ledger::InMemoryLedger;
pub use self::inmem_store::InMemoryActivityStore;
pub use self::inmem_transport::{InMemoryTransport, SentRecord, TracingTransport};
pub use self::payload_resolver::PayloadResolver;
