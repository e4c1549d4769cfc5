//! Status - ticker and engine status views
//!
//! Plain serializable snapshots; the CLI prints them as JSON.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::time::Duration;

use crate::domain::outcome::duration_ms;

/// How the last run of a ticker ended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "result", content = "error", rename_all = "snake_case")]
pub enum TickerOutcome {
    Ok,
    Failed(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TickerStatus {
    pub name: String,
    #[serde(with = "duration_ms")]
    pub interval: Duration,
    pub runs: u64,
    pub failures: u64,
    pub last_outcome: Option<TickerOutcome>,
    #[serde(with = "option_duration_ms")]
    pub last_duration: Option<Duration>,
    pub last_finished_at: Option<DateTime<Utc>>,
}

impl TickerStatus {
    pub fn new(name: impl Into<String>, interval: Duration) -> Self {
        Self {
            name: name.into(),
            interval,
            runs: 0,
            failures: 0,
            last_outcome: None,
            last_duration: None,
            last_finished_at: None,
        }
    }

    pub(crate) fn record(
        &mut self,
        outcome: TickerOutcome,
        elapsed: Duration,
        finished_at: DateTime<Utc>,
    ) {
        self.runs += 1;
        if matches!(outcome, TickerOutcome::Failed(_)) {
            self.failures += 1;
        }
        self.last_outcome = Some(outcome);
        self.last_duration = Some(elapsed);
        self.last_finished_at = Some(finished_at);
    }
}

/// Snapshot of a running engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EngineStatus {
    pub tickers: Vec<TickerStatus>,
    pub live_collectors: usize,
    pub handlers: Vec<String>,
}

mod option_duration_ms {
    use serde::Serializer;
    use std::time::Duration;

    pub fn serialize<S: Serializer>(
        value: &Option<Duration>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        match value {
            Some(d) => serializer.serialize_some(&(d.as_millis() as u64)),
            None => serializer.serialize_none(),
        }
    }
}
