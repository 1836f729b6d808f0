//! # Countdown Core Library
//!
//! This library provides the core logic for the Countdown timer. Every
//! operation is available through the standalone `countdown` CLI, which is a
//! thin host over this crate.
//!
//! ## Architecture
//!
//! - **Timer Engine**: A three-state countdown machine (Stopped, Paused,
//!   Running) advanced by one decrement per caller-driven `tick()`
//! - **Controller**: Foreground-session lifecycle. `resume()` restores and
//!   reconciles persisted state, `suspend()` persists it and arms the alarm
//! - **Storage**: SQLite key-value preferences and TOML configuration
//! - **Alarm / Notify**: Seams for the wake-up alarm and timer notifications
//!
//! ## Key Components
//!
//! - [`CountdownEngine`]: Core countdown state machine
//! - [`TimerController`]: Lifecycle controller over engine + persistence
//! - [`Database`]: Key-value persistence
//! - [`Config`]: Application configuration management

pub mod alarm;
pub mod controller;
pub mod error;
pub mod events;
pub mod notify;
pub mod storage;
pub mod timer;

pub use alarm::{on_alarm_expired, remove_alarm, set_alarm, AlarmScheduler, StoredAlarm};
pub use controller::{ControllerSettings, TimerController};
pub use error::{ConfigError, CoreError, DatabaseError};
pub use events::Event;
pub use notify::{Notification, NotificationAction, Notifier, StoredNotifier};
pub use storage::{Config, Database, Prefs};
pub use timer::{Controls, CountdownEngine, TimerState};

/// Current wall-clock time in epoch seconds.
pub fn now_secs() -> i64 {
    chrono::Utc::now().timestamp()
}
