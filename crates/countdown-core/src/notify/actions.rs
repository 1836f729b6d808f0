//! Actions offered on a notification.
//!
//! These run without a foreground session: they only touch persisted values,
//! the alarm and the notification itself.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::info;

use super::Notifier;
use crate::alarm::{elapsed_since, remove_alarm, set_alarm, AlarmScheduler};
use crate::error::{CoreError, Result};
use crate::storage::Prefs;
use crate::timer::TimerState;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationAction {
    Stop,
    Pause,
    Resume,
    Start,
}

impl NotificationAction {
    pub fn as_str(self) -> &'static str {
        match self {
            NotificationAction::Stop => "stop",
            NotificationAction::Pause => "pause",
            NotificationAction::Resume => "resume",
            NotificationAction::Start => "start",
        }
    }

    fn allowed_in(self, state: TimerState) -> bool {
        match self {
            NotificationAction::Stop => state != TimerState::Stopped,
            NotificationAction::Pause => state == TimerState::Running,
            NotificationAction::Resume => state == TimerState::Paused,
            NotificationAction::Start => state == TimerState::Stopped,
        }
    }
}

impl fmt::Display for NotificationAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for NotificationAction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "stop" => Ok(NotificationAction::Stop),
            "pause" => Ok(NotificationAction::Pause),
            "resume" => Ok(NotificationAction::Resume),
            "start" => Ok(NotificationAction::Start),
            other => Err(format!("unknown notification action: {other}")),
        }
    }
}

/// Run a notification action against the persisted timer.
///
/// `timer_length_secs` is the configured length used by `Start`. Returns the
/// resulting timer state.
///
/// # Errors
/// Returns [`CoreError::InvalidTransition`] when the action is not offered in
/// the stored state.
pub fn apply_action<A, N>(
    action: NotificationAction,
    prefs: &Prefs<'_>,
    scheduler: &mut A,
    notifier: &mut N,
    now: i64,
    timer_length_secs: u64,
) -> Result<TimerState>
where
    A: AlarmScheduler + ?Sized,
    N: Notifier + ?Sized,
{
    let state = prefs.timer_state()?;
    if !action.allowed_in(state) {
        return Err(CoreError::InvalidTransition {
            action: action.as_str(),
            state,
        });
    }

    let next = match action {
        NotificationAction::Stop => {
            remove_alarm(prefs, scheduler)?;
            notifier.hide()?;
            TimerState::Stopped
        }
        NotificationAction::Pause => {
            let alarm_set_time = prefs.alarm_set_time()?;
            let mut remaining = prefs.seconds_remaining()?;
            if alarm_set_time > 0 {
                remaining = remaining.saturating_sub(elapsed_since(alarm_set_time, now));
            }
            prefs.set_seconds_remaining(remaining)?;
            remove_alarm(prefs, scheduler)?;
            notifier.show_timer_paused()?;
            TimerState::Paused
        }
        NotificationAction::Resume => {
            let remaining = prefs.seconds_remaining()?;
            let wake_up_at = set_alarm(prefs, scheduler, now, remaining)?;
            notifier.show_timer_running(wake_up_at)?;
            TimerState::Running
        }
        NotificationAction::Start => {
            prefs.set_seconds_remaining(timer_length_secs)?;
            prefs.set_previous_timer_length_seconds(timer_length_secs)?;
            let wake_up_at = set_alarm(prefs, scheduler, now, timer_length_secs)?;
            notifier.show_timer_running(wake_up_at)?;
            TimerState::Running
        }
    };

    prefs.set_timer_state(next)?;
    info!(action = %action, state = %next, "notification action applied");
    Ok(next)
}
