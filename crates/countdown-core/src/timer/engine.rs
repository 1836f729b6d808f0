//! Countdown engine implementation.
//!
//! The engine is a three-state machine. It does not use internal threads or
//! read the clock - the caller is responsible for calling `tick()` once per
//! second while the countdown runs, and for reconciling time spent away.
//!
//! ## State Transitions
//!
//! ```text
//! Stopped -> Running -> Paused -> Running
//!               |          |
//!               +----------+--> Stopped   (stop, or countdown reaches zero)
//! ```
//!
//! ## Usage
//!
//! ```ignore
//! let mut engine = CountdownEngine::new(600);
//! engine.start();
//! // Once per second:
//! if let Some(Event::TimerFinished { .. }) = engine.tick() {
//!     engine.finish(600);
//! }
//! ```

use std::fmt;

use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::events::Event;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimerState {
    #[default]
    Stopped,
    Paused,
    Running,
}

impl TimerState {
    pub fn as_str(self) -> &'static str {
        match self {
            TimerState::Stopped => "stopped",
            TimerState::Paused => "paused",
            TimerState::Running => "running",
        }
    }

    /// Controls enabled while in this state.
    pub fn controls(self) -> Controls {
        match self {
            TimerState::Running => Controls {
                start: false,
                pause: true,
                stop: true,
            },
            TimerState::Stopped => Controls {
                start: true,
                pause: false,
                stop: false,
            },
            TimerState::Paused => Controls {
                start: true,
                pause: false,
                stop: true,
            },
        }
    }
}

impl fmt::Display for TimerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for TimerState {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "stopped" => Ok(TimerState::Stopped),
            "paused" => Ok(TimerState::Paused),
            "running" => Ok(TimerState::Running),
            other => Err(format!("unknown timer state: {other}")),
        }
    }
}

/// Which of the start / pause / stop controls are enabled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Controls {
    pub start: bool,
    pub pause: bool,
    pub stop: bool,
}

/// Core countdown engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CountdownEngine {
    state: TimerState,
    /// Length of the current countdown in seconds.
    length_secs: u64,
    remaining_secs: u64,
}

impl CountdownEngine {
    /// Create a stopped engine with a full countdown of `length_secs`.
    pub fn new(length_secs: u64) -> Self {
        Self {
            state: TimerState::Stopped,
            length_secs,
            remaining_secs: length_secs,
        }
    }

    /// Rebuild an engine from persisted values.
    ///
    /// `remaining_secs` is clamped to `length_secs`.
    pub fn restore(state: TimerState, length_secs: u64, remaining_secs: u64) -> Self {
        Self {
            state,
            length_secs,
            remaining_secs: remaining_secs.min(length_secs),
        }
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn state(&self) -> TimerState {
        self.state
    }

    pub fn length_secs(&self) -> u64 {
        self.length_secs
    }

    pub fn remaining_secs(&self) -> u64 {
        self.remaining_secs
    }

    pub fn controls(&self) -> Controls {
        self.state.controls()
    }

    /// Countdown text, `m:ss`. Minutes are not capped at 59.
    pub fn display(&self) -> String {
        format_countdown(self.remaining_secs)
    }

    /// Elapsed seconds of the current countdown (progress bar value).
    pub fn progress(&self) -> u64 {
        self.length_secs - self.remaining_secs
    }

    /// 0.0 .. 100.0 progress of the current countdown.
    pub fn progress_pct(&self) -> f64 {
        if self.length_secs == 0 {
            return 0.0;
        }
        self.progress() as f64 / self.length_secs as f64 * 100.0
    }

    /// Build a full state snapshot event.
    pub fn snapshot(&self) -> Event {
        Event::StateSnapshot {
            state: self.state,
            length_secs: self.length_secs,
            remaining_secs: self.remaining_secs,
            display: self.display(),
            progress_pct: self.progress_pct(),
            controls: self.controls(),
            at: Utc::now(),
        }
    }

    // ── Commands ─────────────────────────────────────────────────────

    pub fn start(&mut self) -> Option<Event> {
        match self.state {
            TimerState::Stopped | TimerState::Paused if self.remaining_secs > 0 => {
                self.state = TimerState::Running;
                Some(Event::TimerStarted {
                    length_secs: self.length_secs,
                    remaining_secs: self.remaining_secs,
                    at: Utc::now(),
                })
            }
            _ => None,
        }
    }

    pub fn pause(&mut self) -> Option<Event> {
        match self.state {
            TimerState::Running => {
                self.state = TimerState::Paused;
                Some(Event::TimerPaused {
                    remaining_secs: self.remaining_secs,
                    at: Utc::now(),
                })
            }
            _ => None,
        }
    }

    /// Stop a running or paused countdown and reset it to `new_length_secs`.
    pub fn stop(&mut self, new_length_secs: u64) -> Option<Event> {
        match self.state {
            TimerState::Running | TimerState::Paused => {
                let length_secs = self.length_secs;
                self.finish(new_length_secs);
                Some(Event::TimerFinished {
                    length_secs,
                    stopped: true,
                    at: Utc::now(),
                })
            }
            TimerState::Stopped => None,
        }
    }

    /// Call once per second. Returns `Some(Event::TimerFinished)` when the
    /// countdown reaches zero; the engine is then Stopped at zero until
    /// [`finish`](Self::finish) resets it.
    pub fn tick(&mut self) -> Option<Event> {
        if self.state != TimerState::Running {
            return None;
        }
        self.remaining_secs = self.remaining_secs.saturating_sub(1);
        if self.remaining_secs == 0 {
            self.state = TimerState::Stopped;
            return Some(Event::TimerFinished {
                length_secs: self.length_secs,
                stopped: false,
                at: Utc::now(),
            });
        }
        None
    }

    /// Reset to Stopped with a full countdown of `new_length_secs`.
    pub fn finish(&mut self, new_length_secs: u64) {
        self.state = TimerState::Stopped;
        self.length_secs = new_length_secs;
        self.remaining_secs = new_length_secs;
    }

    /// Subtract time that passed while no tick source was running.
    ///
    /// Returns `true` when the countdown is exhausted.
    pub fn reconcile(&mut self, elapsed_secs: u64) -> bool {
        self.remaining_secs = self.remaining_secs.saturating_sub(elapsed_secs);
        self.remaining_secs == 0
    }
}

/// Format seconds as `m:ss`.
pub fn format_countdown(secs: u64) -> String {
    format!("{}:{:02}", secs / 60, secs % 60)
}
