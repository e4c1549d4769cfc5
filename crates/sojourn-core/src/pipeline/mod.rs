//! Pipeline - 効果ハンドラーの実行
//!
//! # 主要コンポーネント
//! - **EffectHandler**: one named stage (`{name, run}`)
//! - **HandlerRegistry**: the ordered, fixed-at-startup list of stages
//! - **Pipeline**: runs the list over one activity and aggregates the result
//! - **handlers**: the built-in stages in their documented order

pub mod handler;
pub mod handlers;
pub mod registry;
pub mod runner;

pub use self::handler::{EffectContext, EffectHandler, MessageSink};
pub use self::registry::{HandlerRegistry, RegistryError};
pub use self::runner::{Pipeline, PipelineRun};
