//! Typed preference values over the kv store.

use std::str::FromStr;

use tracing::warn;

use super::Database;
use crate::error::Result;
use crate::notify::Notification;
use crate::timer::TimerState;

const PREVIOUS_TIMER_LENGTH_SECONDS: &str = "previous_timer_length_seconds";
const SECONDS_REMAINING: &str = "seconds_remaining";
const TIMER_STATE: &str = "timer_state";
const ALARM_SET_TIME: &str = "alarm_set_time";
const ALARM_WAKE_UP_TIME: &str = "alarm_wake_up_time";
const NOTIFICATION: &str = "notification";

/// Typed view of the persisted timer values.
///
/// Corrupt values are logged and read as their defaults.
#[derive(Clone, Copy)]
pub struct Prefs<'db> {
    db: &'db Database,
}

impl<'db> Prefs<'db> {
    pub fn new(db: &'db Database) -> Self {
        Self { db }
    }

    /// Length of the countdown that was in progress when last persisted.
    pub fn previous_timer_length_seconds(&self) -> Result<u64> {
        self.parsed_or_default(PREVIOUS_TIMER_LENGTH_SECONDS)
    }

    pub fn set_previous_timer_length_seconds(&self, secs: u64) -> Result<()> {
        self.db
            .kv_set(PREVIOUS_TIMER_LENGTH_SECONDS, &secs.to_string())
    }

    pub fn seconds_remaining(&self) -> Result<u64> {
        self.parsed_or_default(SECONDS_REMAINING)
    }

    pub fn set_seconds_remaining(&self, secs: u64) -> Result<()> {
        self.db.kv_set(SECONDS_REMAINING, &secs.to_string())
    }

    pub fn timer_state(&self) -> Result<TimerState> {
        self.parsed_or_default(TIMER_STATE)
    }

    pub fn set_timer_state(&self, state: TimerState) -> Result<()> {
        self.db.kv_set(TIMER_STATE, state.as_str())
    }

    /// Epoch seconds at which the wake-up alarm was armed; 0 when unarmed.
    pub fn alarm_set_time(&self) -> Result<i64> {
        self.parsed_or_default(ALARM_SET_TIME)
    }

    pub fn set_alarm_set_time(&self, epoch_secs: i64) -> Result<()> {
        self.db.kv_set(ALARM_SET_TIME, &epoch_secs.to_string())
    }

    /// Epoch seconds at which the pending wake-up alarm fires.
    pub fn alarm_wake_up_time(&self) -> Result<Option<i64>> {
        match self.db.kv_get(ALARM_WAKE_UP_TIME)? {
            Some(raw) => match raw.parse() {
                Ok(v) => Ok(Some(v)),
                Err(_) => {
                    warn!(key = ALARM_WAKE_UP_TIME, value = %raw, "ignoring corrupt stored value");
                    Ok(None)
                }
            },
            None => Ok(None),
        }
    }

    pub fn set_alarm_wake_up_time(&self, wake_up_at: Option<i64>) -> Result<()> {
        match wake_up_at {
            Some(t) => self.db.kv_set(ALARM_WAKE_UP_TIME, &t.to_string()),
            None => self.db.kv_delete(ALARM_WAKE_UP_TIME),
        }
    }

    /// The notification currently on display, if any.
    pub fn notification(&self) -> Result<Option<Notification>> {
        match self.db.kv_get(NOTIFICATION)? {
            Some(raw) => match serde_json::from_str(&raw) {
                Ok(n) => Ok(Some(n)),
                Err(e) => {
                    warn!(key = NOTIFICATION, error = %e, "ignoring corrupt stored notification");
                    Ok(None)
                }
            },
            None => Ok(None),
        }
    }

    pub fn set_notification(&self, notification: Option<&Notification>) -> Result<()> {
        match notification {
            Some(n) => self.db.kv_set(NOTIFICATION, &serde_json::to_string(n)?),
            None => self.db.kv_delete(NOTIFICATION),
        }
    }

    fn parsed_or_default<T>(&self, key: &str) -> Result<T>
    where
        T: FromStr + Default,
    {
        let Some(raw) = self.db.kv_get(key)? else {
            return Ok(T::default());
        };
        match raw.parse() {
            Ok(v) => Ok(v),
            Err(_) => {
                warn!(key, value = %raw, "ignoring corrupt stored value");
                Ok(T::default())
            }
        }
    }
}
