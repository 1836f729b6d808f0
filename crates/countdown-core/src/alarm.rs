//! Wake-up alarm.
//!
//! When a running countdown leaves the foreground, a one-shot alarm is armed
//! for the moment it would reach zero, and the arming time is recorded so the
//! next foreground session can subtract the time spent away.

use tracing::{debug, info};

use crate::error::Result;
use crate::notify::Notifier;
use crate::storage::Prefs;
use crate::timer::TimerState;

/// Registers one-shot wake-up alarms with whatever fires them.
pub trait AlarmScheduler {
    /// Arm the alarm for `wake_up_at` (epoch seconds), replacing any pending one.
    fn schedule(&mut self, wake_up_at: i64) -> Result<()>;
    fn cancel(&mut self) -> Result<()>;
    /// Pending wake-up time, if armed.
    fn pending(&self) -> Result<Option<i64>>;
}

/// Alarm kept in the kv store; `countdown watch` fires it.
pub struct StoredAlarm<'db> {
    prefs: Prefs<'db>,
}

impl<'db> StoredAlarm<'db> {
    pub fn new(prefs: Prefs<'db>) -> Self {
        Self { prefs }
    }
}

impl AlarmScheduler for StoredAlarm<'_> {
    fn schedule(&mut self, wake_up_at: i64) -> Result<()> {
        self.prefs.set_alarm_wake_up_time(Some(wake_up_at))
    }

    fn cancel(&mut self) -> Result<()> {
        self.prefs.set_alarm_wake_up_time(None)
    }

    fn pending(&self) -> Result<Option<i64>> {
        self.prefs.alarm_wake_up_time()
    }
}

/// Arm the alarm for `now + seconds_remaining` and record `now` as the
/// arming time. Returns the wake-up time.
pub fn set_alarm<A: AlarmScheduler + ?Sized>(
    prefs: &Prefs<'_>,
    scheduler: &mut A,
    now: i64,
    seconds_remaining: u64,
) -> Result<i64> {
    let remaining = i64::try_from(seconds_remaining).unwrap_or(i64::MAX);
    let wake_up_at = now.saturating_add(remaining);
    scheduler.schedule(wake_up_at)?;
    prefs.set_alarm_set_time(now)?;
    info!(wake_up_at, seconds_remaining, "wake-up alarm armed");
    Ok(wake_up_at)
}

/// Cancel any pending alarm and clear the arming time.
pub fn remove_alarm<A: AlarmScheduler + ?Sized>(
    prefs: &Prefs<'_>,
    scheduler: &mut A,
) -> Result<()> {
    scheduler.cancel()?;
    prefs.set_alarm_set_time(0)?;
    debug!("wake-up alarm removed");
    Ok(())
}

/// Seconds from `since` to `now`; a clock that moved backwards counts as zero.
pub(crate) fn elapsed_since(since: i64, now: i64) -> u64 {
    u64::try_from(now.saturating_sub(since)).unwrap_or(0)
}

/// Handle a fired wake-up alarm: the countdown ran out while in the
/// background.
pub fn on_alarm_expired<A, N>(prefs: &Prefs<'_>, scheduler: &mut A, notifier: &mut N) -> Result<()>
where
    A: AlarmScheduler + ?Sized,
    N: Notifier + ?Sized,
{
    notifier.show_timer_expired()?;
    prefs.set_timer_state(TimerState::Stopped)?;
    remove_alarm(prefs, scheduler)?;
    info!("countdown expired in the background");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notify::{Notification, StoredNotifier};
    use crate::storage::Database;

    #[test]
    fn set_alarm_records_time_and_wake_up() {
        let db = Database::open_memory().unwrap();
        let prefs = Prefs::new(&db);
        let mut alarm = StoredAlarm::new(prefs);

        let wake = set_alarm(&prefs, &mut alarm, 1_000, 90).unwrap();
        assert_eq!(wake, 1_090);
        assert_eq!(alarm.pending().unwrap(), Some(1_090));
        assert_eq!(prefs.alarm_set_time().unwrap(), 1_000);
    }

    #[test]
    fn remove_alarm_clears_everything() {
        let db = Database::open_memory().unwrap();
        let prefs = Prefs::new(&db);
        let mut alarm = StoredAlarm::new(prefs);
        set_alarm(&prefs, &mut alarm, 1_000, 90).unwrap();

        remove_alarm(&prefs, &mut alarm).unwrap();
        assert_eq!(alarm.pending().unwrap(), None);
        assert_eq!(prefs.alarm_set_time().unwrap(), 0);
    }

    #[test]
    fn elapsed_ignores_clock_going_backwards() {
        assert_eq!(elapsed_since(100, 160), 60);
        assert_eq!(elapsed_since(100, 40), 0);
    }

    #[test]
    fn expiry_stops_timer_and_notifies() {
        let db = Database::open_memory().unwrap();
        let prefs = Prefs::new(&db);
        prefs.set_timer_state(TimerState::Running).unwrap();
        let mut alarm = StoredAlarm::new(prefs);
        let mut notifier = StoredNotifier::new(prefs, true);
        set_alarm(&prefs, &mut alarm, 1_000, 5).unwrap();

        on_alarm_expired(&prefs, &mut alarm, &mut notifier).unwrap();
        assert_eq!(prefs.timer_state().unwrap(), TimerState::Stopped);
        assert_eq!(prefs.alarm_set_time().unwrap(), 0);
        assert_eq!(alarm.pending().unwrap(), None);
        assert_eq!(prefs.notification().unwrap(), Some(Notification::Expired));
    }
}
