//! Errors - one enum per seam.
//!
//! None of these is allowed to escape the scheduler: each call site decides
//! whether an error is a normal skip, a logged failure or a user message.

use thiserror::Error;

use super::bank::Bank;
use super::ids::{ActivityId, ActorId, ChannelId};

/// Activity store / actor directory failures.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store unavailable: {0}")]
    Unavailable(String),

    #[error("actor not found: {0}")]
    ActorNotFound(ActorId),
}

#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("{actor} does not hold {missing}")]
    InsufficientHoldings { actor: ActorId, missing: Bank },

    #[error("ledger unavailable: {0}")]
    Unavailable(String),
}

#[derive(Debug, Error)]
pub enum TransportError {
    /// The destination was removed or can no longer be written to.
    #[error("unusable destination: {0}")]
    UnusableDestination(ChannelId),

    #[error("transport failed: {0}")]
    Failed(String),
}

/// An effect handler failed; the pipeline skips its contribution.
#[derive(Debug, Error)]
pub enum HandlerError {
    #[error("{0}")]
    Failed(String),
}

impl HandlerError {
    pub fn failed(message: impl Into<String>) -> Self {
        HandlerError::Failed(message.into())
    }
}

/// The upstream simulation could not produce a result for an activity.
#[derive(Debug, Error)]
pub enum ResolveError {
    #[error("invalid payload for {activity}: {reason}")]
    InvalidPayload { activity: ActivityId, reason: String },

    #[error("resolver unavailable: {0}")]
    Unavailable(String),
}

/// A ticker callback failed. Logged by the scheduler, never fatal.
#[derive(Debug, Error)]
pub enum TickerError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("{0}")]
    Failed(String),

    #[error("panicked: {0}")]
    Panicked(String),
}

/// Best-effort text of a panic payload.
pub(crate) fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic payload".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::items::COINS;

    #[test]
    fn insufficient_holdings_names_what_is_missing() {
        let actor = ActorId::generate();
        let err = LedgerError::InsufficientHoldings {
            actor,
            missing: Bank::new().with(COINS, 3),
        };
        assert_eq!(err.to_string(), format!("{actor} does not hold 3x Coins"));
    }

    #[test]
    fn panic_payloads_are_readable() {
        let boxed: Box<dyn std::any::Any + Send> = Box::new("boom");
        assert_eq!(panic_message(boxed.as_ref()), "boom");
        let boxed: Box<dyn std::any::Any + Send> = Box::new(String::from("bang"));
        assert_eq!(panic_message(boxed.as_ref()), "bang");
    }
}
