//! The poll → interpret → notify loop.
//!
//! Cursor policy:
//! - advanced to the server's `current_date` after a verdict is delivered, and
//!   when there is no new work;
//! - left untouched when the poll fails, the record cannot be interpreted, or
//!   delivery fails, so the same window is asked for again next cycle.

use std::{sync::Arc, time::Duration};

use chrono::Utc;
use tokio::time::sleep;
use tokio_util::sync::CancellationToken;

use crate::{
    config::Config,
    interpreter::{interpret, Interpretation},
    notifier::{Notification, Notifier},
    ports::HomeworkSource,
    Result,
};

/// Result of one poll cycle.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CycleOutcome {
    /// A verdict reached the chat; the cursor moved to `cursor`.
    Delivered { cursor: i64 },
    /// Nothing changed; the cursor moved to `cursor`.
    NoNewWork { cursor: i64 },
    /// The newest record was malformed; the operator was told why.
    Rejected(String),
    /// Something failed mid-cycle; carries the summary sent to the operator.
    Faulted(String),
}

impl CycleOutcome {
    pub fn delay(&self, cfg: &Config) -> Duration {
        match self {
            Self::Faulted(_) => cfg.retry_delay,
            _ => cfg.poll_interval,
        }
    }
}

/// `from_date` to send for `cursor`. An unset (zero or negative) cursor looks
/// back one poll interval from `now`.
pub fn effective_from_date(cursor: i64, now: i64, interval: Duration) -> i64 {
    if cursor > 0 {
        return cursor;
    }
    let lookback = i64::try_from(interval.as_secs()).unwrap_or(i64::MAX);
    now.saturating_sub(lookback)
}

pub fn now_unix() -> i64 {
    Utc::now().timestamp()
}

pub struct Watcher {
    cfg: Arc<Config>,
    source: Arc<dyn HomeworkSource>,
    notifier: Notifier,
    cursor: i64,
}

impl Watcher {
    pub fn new(
        cfg: Arc<Config>,
        source: Arc<dyn HomeworkSource>,
        notifier: Notifier,
        initial_cursor: i64,
    ) -> Self {
        Self {
            cfg,
            source,
            notifier,
            cursor: initial_cursor,
        }
    }

    pub fn cursor(&self) -> i64 {
        self.cursor
    }

    /// Run cycles until `cancel` fires. Failures never end the loop.
    pub async fn run(&mut self, cancel: CancellationToken) {
        tracing::info!(
            "watching homework statuses every {}s from cursor {}",
            self.cfg.poll_interval.as_secs(),
            self.cursor
        );

        loop {
            let outcome = tokio::select! {
                _ = cancel.cancelled() => break,
                outcome = self.run_cycle() => outcome,
            };

            let delay = outcome.delay(&self.cfg);
            tokio::select! {
                _ = cancel.cancelled() => break,
                _ = sleep(delay) => {}
            }
        }

        tracing::info!("watcher stopped at cursor {}", self.cursor);
    }

    /// One poll cycle. Any failure is logged and reported to the operator chat.
    pub async fn run_cycle(&mut self) -> CycleOutcome {
        match self.try_cycle().await {
            Ok(outcome) => outcome,
            Err(e) => {
                tracing::error!("cycle failed: {e:?}");
                let summary = format!("Bot failed with error: {e}");
                if let Err(notify_err) = self
                    .notifier
                    .notify(&Notification::Diagnostic(summary.clone()))
                    .await
                {
                    tracing::error!("failed to report error to operator: {notify_err}");
                }
                CycleOutcome::Faulted(summary)
            }
        }
    }

    async fn try_cycle(&mut self) -> Result<CycleOutcome> {
        let from_date = effective_from_date(self.cursor, now_unix(), self.cfg.poll_interval);
        let resp = self.source.poll(from_date).await?;

        match interpret(resp.newest()) {
            Interpretation::NoNewWork => {
                tracing::info!("no new homework since {from_date}");
                self.cursor = resp.current_date;
                Ok(CycleOutcome::NoNewWork {
                    cursor: self.cursor,
                })
            }
            Interpretation::Verdict(text) => {
                if let Some(updated) = resp.newest().and_then(|r| r.date_updated.as_deref()) {
                    tracing::debug!("newest homework updated at {updated}");
                }
                self.notifier.notify(&Notification::Status(text)).await?;
                self.cursor = resp.current_date;
                Ok(CycleOutcome::Delivered {
                    cursor: self.cursor,
                })
            }
            Interpretation::Error(e) => {
                tracing::error!("unusable homework record: {e} ({:?})", resp.newest());
                let reason = e.to_string();
                self.notifier
                    .notify(&Notification::Diagnostic(reason.clone()))
                    .await?;
                Ok(CycleOutcome::Rejected(reason))
            }
        }
    }
}
