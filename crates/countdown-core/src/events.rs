use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::timer::{Controls, TimerState};

/// Every state change in the system produces an Event.
/// The CLI prints them; the tick loop renders from them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Event {
    TimerStarted {
        length_secs: u64,
        remaining_secs: u64,
        at: DateTime<Utc>,
    },
    TimerPaused {
        remaining_secs: u64,
        at: DateTime<Utc>,
    },
    /// Countdown reached zero, or the user stopped it.
    TimerFinished {
        /// Length of the countdown that ended.
        length_secs: u64,
        /// `true` when ended by the stop control rather than by expiry.
        stopped: bool,
        at: DateTime<Utc>,
    },
    /// Time spent in the background was subtracted on resume.
    ElapsedReconciled {
        elapsed_secs: u64,
        remaining_secs: u64,
        at: DateTime<Utc>,
    },
    AlarmScheduled {
        wake_up_at: i64,
        at: DateTime<Utc>,
    },
    AlarmCancelled {
        at: DateTime<Utc>,
    },
    StateSnapshot {
        state: TimerState,
        length_secs: u64,
        remaining_secs: u64,
        display: String,
        progress_pct: f64,
        controls: Controls,
        at: DateTime<Utc>,
    },
}
