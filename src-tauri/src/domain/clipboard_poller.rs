//! Usage: Clipboard change detection by periodic sampling (last-value comparison).

use std::ops::ControlFlow;
use std::time::Duration;
use tokio::time::{Instant, MissedTickBehavior};

pub(crate) const CLIPBOARD_CHANGE_EVENT: &str = "clipboard-change";
pub(crate) const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(1000);

/// Holds the last sampled clipboard text of one window instance.
///
/// Only the immediately preceding sample is remembered, so a value that comes back
/// after something else was copied is reported again.
#[derive(Debug, Clone)]
pub(crate) struct ClipboardPoller {
    last_value: String,
}

impl ClipboardPoller {
    pub(crate) fn start(initial: String) -> Self {
        Self {
            last_value: initial,
        }
    }

    #[cfg(test)]
    pub(crate) fn last_value(&self) -> &str {
        &self.last_value
    }

    /// Records `current` and returns it when it differs from the previous sample.
    pub(crate) fn observe(&mut self, current: String) -> Option<&str> {
        if current == self.last_value {
            return None;
        }
        self.last_value = current;
        Some(&self.last_value)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum PollOutcome {
    Unchanged,
    Changed,
    SurfaceGone,
}

/// Calls `tick` once per `period` (first call after one full period) until it breaks.
pub(crate) async fn run_poll_loop<F>(period: Duration, mut tick: F)
where
    F: FnMut() -> ControlFlow<()>,
{
    let mut interval = tokio::time::interval_at(Instant::now() + period, period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        interval.tick().await;
        if tick().is_break() {
            break;
        }
    }
}
