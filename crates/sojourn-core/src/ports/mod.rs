//! Ports - 抽象化レイヤー
//!
//! Hexagonal-style seams to everything outside the completion subsystem:
//! the activity store, the ledger, the actor directory, the upstream
//! simulation, the message transport, time and id generation.

pub mod activity_store;
pub mod actor_directory;
pub mod clock;
pub mod id_generator;
pub mod ledger;
pub mod resolver;
pub mod transport;

pub use self::activity_store::ActivityStore;
pub use self::actor_directory::ActorDirectory;
pub use self::clock::{Clock, FixedClock, SystemClock, TokioClock};
pub use self::id_generator::{IdGenerator, UlidGenerator};
pub use self::ledger::Ledger;
pub use self::resolver::{ActivityResolver, Resolution};
pub use self::transport::Transport;
