//! Foreground-session controller.
//!
//! Wraps a [`CountdownEngine`] with the persistence that lets a countdown
//! outlive the process. A host calls [`TimerController::resume`] when a
//! session comes to the foreground, drives [`TimerController::tick`] once per
//! second while it stays there, and calls [`TimerController::suspend`] before
//! it goes away.
//!
//! Time spent away is recovered from the alarm arming time:
//!
//! ```text
//! remaining -= now - alarm_set_time      (when alarm_set_time > 0)
//! ```

use chrono::Utc;
use tracing::{debug, info};

use crate::alarm::{elapsed_since, remove_alarm, set_alarm, AlarmScheduler};
use crate::error::{CoreError, Result};
use crate::events::Event;
use crate::notify::Notifier;
use crate::storage::{Config, Prefs};
use crate::timer::{Controls, CountdownEngine, TimerState};

/// Settings the controller reads from configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ControllerSettings {
    /// Length of a new countdown.
    pub timer_length_secs: u64,
    /// Arm a wake-up alarm when suspending a running countdown.
    pub alarm_enabled: bool,
}

impl ControllerSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            timer_length_secs: config.timer_length_secs(),
            alarm_enabled: config.alarm.enabled,
        }
    }
}

pub struct TimerController<'db, A, N> {
    engine: CountdownEngine,
    prefs: Prefs<'db>,
    alarm: A,
    notifier: N,
    settings: ControllerSettings,
}

impl<'db, A: AlarmScheduler, N: Notifier> TimerController<'db, A, N> {
    /// Create a controller. Nothing is loaded until [`resume`](Self::resume).
    pub fn new(prefs: Prefs<'db>, alarm: A, notifier: N, settings: ControllerSettings) -> Self {
        Self {
            engine: CountdownEngine::new(settings.timer_length_secs),
            prefs,
            alarm,
            notifier,
            settings,
        }
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn engine(&self) -> &CountdownEngine {
        &self.engine
    }

    pub fn state(&self) -> TimerState {
        self.engine.state()
    }

    pub fn controls(&self) -> Controls {
        self.engine.controls()
    }

    pub fn display(&self) -> String {
        self.engine.display()
    }

    pub fn snapshot(&self) -> Event {
        self.engine.snapshot()
    }

    // ── Lifecycle ────────────────────────────────────────────────────

    /// Bring the timer to the foreground at `now` (epoch seconds).
    ///
    /// Restores persisted state, subtracts the time spent in the background,
    /// finishes the countdown if it ran out, then disarms the alarm and hides
    /// the notification.
    pub fn resume(&mut self, now: i64) -> Result<Vec<Event>> {
        let mut events = self.init_timer(now)?;

        if self.alarm.pending()?.is_some() {
            events.push(Event::AlarmCancelled { at: Utc::now() });
        }
        remove_alarm(&self.prefs, &mut self.alarm)?;
        self.notifier.hide()?;

        debug!(
            state = %self.engine.state(),
            remaining_secs = self.engine.remaining_secs(),
            "timer resumed"
        );
        Ok(events)
    }

    fn init_timer(&mut self, now: i64) -> Result<Vec<Event>> {
        let mut events = Vec::new();
        let state = self.prefs.timer_state()?;

        let length_secs = match state {
            TimerState::Stopped => self.settings.timer_length_secs,
            TimerState::Paused | TimerState::Running => {
                self.prefs.previous_timer_length_seconds()?
            }
        };
        let remaining_secs = match state {
            TimerState::Stopped => length_secs,
            TimerState::Paused | TimerState::Running => self.prefs.seconds_remaining()?,
        };
        self.engine = CountdownEngine::restore(state, length_secs, remaining_secs);

        let alarm_set_time = self.prefs.alarm_set_time()?;
        if alarm_set_time > 0 {
            let elapsed_secs = elapsed_since(alarm_set_time, now);
            self.engine.reconcile(elapsed_secs);
            events.push(Event::ElapsedReconciled {
                elapsed_secs,
                remaining_secs: self.engine.remaining_secs(),
                at: Utc::now(),
            });
        }

        if self.engine.remaining_secs() == 0 {
            events.push(self.on_timer_expired()?);
        }
        Ok(events)
    }

    /// Send the timer to the background at `now` (epoch seconds).
    ///
    /// A running countdown arms the wake-up alarm and shows the running
    /// notification; a paused one shows the paused notification. The length,
    /// remaining seconds and state are persisted in every case.
    pub fn suspend(&mut self, now: i64) -> Result<Vec<Event>> {
        let mut events = Vec::new();

        match self.engine.state() {
            TimerState::Running => {
                let remaining_secs = self.engine.remaining_secs();
                let wake_up_at = if self.settings.alarm_enabled {
                    let wake_up_at = set_alarm(&self.prefs, &mut self.alarm, now, remaining_secs)?;
                    events.push(Event::AlarmScheduled {
                        wake_up_at,
                        at: Utc::now(),
                    });
                    wake_up_at
                } else {
                    self.prefs.set_alarm_set_time(now)?;
                    now.saturating_add(i64::try_from(remaining_secs).unwrap_or(i64::MAX))
                };
                self.notifier.show_timer_running(wake_up_at)?;
            }
            TimerState::Paused => self.notifier.show_timer_paused()?,
            TimerState::Stopped => {}
        }

        self.persist()?;
        debug!(state = %self.engine.state(), "timer suspended");
        Ok(events)
    }

    // ── Controls ─────────────────────────────────────────────────────

    pub fn start(&mut self) -> Result<Event> {
        let state = self.engine.state();
        let event = self.engine.start().ok_or(CoreError::InvalidTransition {
            action: "start",
            state,
        })?;
        info!(remaining_secs = self.engine.remaining_secs(), "countdown started");
        Ok(event)
    }

    pub fn pause(&mut self) -> Result<Event> {
        let state = self.engine.state();
        let event = self.engine.pause().ok_or(CoreError::InvalidTransition {
            action: "pause",
            state,
        })?;
        info!(remaining_secs = self.engine.remaining_secs(), "countdown paused");
        Ok(event)
    }

    pub fn stop(&mut self) -> Result<Event> {
        let state = self.engine.state();
        let event = self
            .engine
            .stop(self.settings.timer_length_secs)
            .ok_or(CoreError::InvalidTransition {
                action: "stop",
                state,
            })?;
        self.prefs.set_seconds_remaining(self.engine.remaining_secs())?;
        info!("countdown stopped");
        Ok(event)
    }

    /// One-second tick. Returns `Some(Event::TimerFinished)` when the
    /// countdown expires; the timer is then already reset.
    pub fn tick(&mut self) -> Result<Option<Event>> {
        match self.engine.tick() {
            Some(event @ Event::TimerFinished { .. }) => {
                self.reset_to_configured_length()?;
                info!("countdown finished");
                Ok(Some(event))
            }
            other => Ok(other),
        }
    }

    // ── Internal ─────────────────────────────────────────────────────

    /// Countdown ran out while no tick source was running.
    fn on_timer_expired(&mut self) -> Result<Event> {
        let length_secs = self.engine.length_secs();
        self.reset_to_configured_length()?;
        info!(length_secs, "countdown expired while suspended");
        Ok(Event::TimerFinished {
            length_secs,
            stopped: false,
            at: Utc::now(),
        })
    }

    fn reset_to_configured_length(&mut self) -> Result<()> {
        self.engine.finish(self.settings.timer_length_secs);
        self.prefs.set_seconds_remaining(self.engine.remaining_secs())
    }

    fn persist(&self) -> Result<()> {
        self.prefs
            .set_previous_timer_length_seconds(self.engine.length_secs())?;
        self.prefs.set_seconds_remaining(self.engine.remaining_secs())?;
        self.prefs.set_timer_state(self.engine.state())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::alarm::StoredAlarm;
    use crate::notify::{Notification, StoredNotifier};
    use crate::storage::Database;

    const SETTINGS: ControllerSettings = ControllerSettings {
        timer_length_secs: 600,
        alarm_enabled: true,
    };

    type Controller<'db> = TimerController<'db, StoredAlarm<'db>, StoredNotifier<'db>>;

    fn controller(db: &Database, settings: ControllerSettings) -> Controller<'_> {
        let prefs = Prefs::new(db);
        TimerController::new(
            prefs,
            StoredAlarm::new(prefs),
            StoredNotifier::new(prefs, true),
            settings,
        )
    }

    fn session(db: &Database, now: i64) -> Controller<'_> {
        let mut c = controller(db, SETTINGS);
        c.resume(now).unwrap();
        c
    }

    #[test]
    fn fresh_resume_is_stopped_at_configured_length() {
        let db = Database::open_memory().unwrap();
        let c = session(&db, 1_000);
        assert_eq!(c.state(), TimerState::Stopped);
        assert_eq!(c.engine().remaining_secs(), 600);
        assert_eq!(c.display(), "10:00");
        assert_eq!(
            c.controls(),
            Controls { start: true, pause: false, stop: false }
        );
    }

    #[test]
    fn suspend_running_arms_alarm_and_persists() {
        let db = Database::open_memory().unwrap();
        let mut c = session(&db, 1_000);
        c.start().unwrap();
        c.tick().unwrap();
        let events = c.suspend(1_001).unwrap();
        assert!(matches!(
            events.as_slice(),
            [Event::AlarmScheduled { wake_up_at: 1_600, .. }]
        ));

        let prefs = Prefs::new(&db);
        assert_eq!(prefs.timer_state().unwrap(), TimerState::Running);
        assert_eq!(prefs.seconds_remaining().unwrap(), 599);
        assert_eq!(prefs.previous_timer_length_seconds().unwrap(), 600);
        assert_eq!(prefs.alarm_set_time().unwrap(), 1_001);
        assert_eq!(prefs.alarm_wake_up_time().unwrap(), Some(1_600));
        assert_eq!(
            prefs.notification().unwrap(),
            Some(Notification::Running { wake_up_at: 1_600 })
        );
    }

    #[test]
    fn resume_subtracts_background_time() {
        let db = Database::open_memory().unwrap();
        let mut c = session(&db, 1_000);
        c.start().unwrap();
        c.suspend(1_000).unwrap();

        let mut c = controller(&db, SETTINGS);
        let events = c.resume(1_250).unwrap();
        assert!(matches!(
            events.as_slice(),
            [
                Event::ElapsedReconciled { elapsed_secs: 250, remaining_secs: 350, .. },
                Event::AlarmCancelled { .. },
            ]
        ));
        assert_eq!(c.state(), TimerState::Running);
        assert_eq!(c.display(), "5:50");

        let prefs = Prefs::new(&db);
        assert_eq!(prefs.alarm_set_time().unwrap(), 0);
        assert_eq!(prefs.alarm_wake_up_time().unwrap(), None);
        assert!(prefs.notification().unwrap().is_none());
    }

    #[test]
    fn resume_after_expiry_finishes() {
        let db = Database::open_memory().unwrap();
        let mut c = session(&db, 1_000);
        c.start().unwrap();
        c.suspend(1_000).unwrap();

        let mut c = controller(&db, SETTINGS);
        let events = c.resume(2_000).unwrap();
        assert!(events.iter().any(|e| matches!(
            e,
            Event::TimerFinished { length_secs: 600, stopped: false, .. }
        )));
        assert_eq!(c.state(), TimerState::Stopped);
        assert_eq!(c.engine().remaining_secs(), 600);
        assert_eq!(Prefs::new(&db).seconds_remaining().unwrap(), 600);
    }

    #[test]
    fn paused_countdown_does_not_advance_in_background() {
        let db = Database::open_memory().unwrap();
        let mut c = session(&db, 1_000);
        c.start().unwrap();
        c.tick().unwrap();
        c.pause().unwrap();
        assert!(c.suspend(1_001).unwrap().is_empty());
        assert_eq!(
            Prefs::new(&db).notification().unwrap(),
            Some(Notification::Paused)
        );

        let c = session(&db, 9_000);
        assert_eq!(c.state(), TimerState::Paused);
        assert_eq!(c.engine().remaining_secs(), 599);
        assert!(Prefs::new(&db).notification().unwrap().is_none());
    }

    #[test]
    fn running_countdown_keeps_its_length_when_config_changes() {
        let db = Database::open_memory().unwrap();
        let mut c = session(&db, 1_000);
        c.start().unwrap();
        c.suspend(1_000).unwrap();

        let shorter = ControllerSettings {
            timer_length_secs: 120,
            ..SETTINGS
        };
        let mut c = controller(&db, shorter);
        c.resume(1_010).unwrap();
        assert_eq!(c.engine().length_secs(), 600);
        assert_eq!(c.engine().remaining_secs(), 590);

        c.stop().unwrap();
        assert_eq!(c.engine().length_secs(), 120);
        assert_eq!(c.engine().remaining_secs(), 120);
    }

    #[test]
    fn tick_to_zero_resets_and_persists() {
        let db = Database::open_memory().unwrap();
        let settings = ControllerSettings {
            timer_length_secs: 2,
            ..SETTINGS
        };
        let mut c = controller(&db, settings);
        c.resume(1_000).unwrap();
        c.start().unwrap();
        assert!(c.tick().unwrap().is_none());
        assert!(matches!(
            c.tick().unwrap(),
            Some(Event::TimerFinished { stopped: false, .. })
        ));
        assert_eq!(c.state(), TimerState::Stopped);
        assert_eq!(c.engine().remaining_secs(), 2);
        assert_eq!(Prefs::new(&db).seconds_remaining().unwrap(), 2);
    }

    #[test]
    fn disabled_controls_are_rejected() {
        let db = Database::open_memory().unwrap();
        let mut c = session(&db, 1_000);
        assert!(matches!(
            c.pause(),
            Err(CoreError::InvalidTransition { action: "pause", state: TimerState::Stopped })
        ));
        assert!(c.stop().is_err());
        c.start().unwrap();
        assert!(c.start().is_err());
        c.pause().unwrap();
        assert!(c.stop().is_ok());
    }

    #[test]
    fn without_alarm_background_time_is_still_reconciled() {
        let db = Database::open_memory().unwrap();
        let settings = ControllerSettings {
            alarm_enabled: false,
            ..SETTINGS
        };
        let mut c = controller(&db, settings);
        c.resume(1_000).unwrap();
        c.start().unwrap();
        assert!(c.suspend(1_000).unwrap().is_empty());

        let prefs = Prefs::new(&db);
        assert_eq!(prefs.alarm_wake_up_time().unwrap(), None);
        assert_eq!(prefs.alarm_set_time().unwrap(), 1_000);

        let mut c = controller(&db, settings);
        c.resume(1_060).unwrap();
        assert_eq!(c.engine().remaining_secs(), 540);
    }

    #[test]
    fn expired_alarm_then_resume_starts_fresh() {
        let db = Database::open_memory().unwrap();
        let mut c = session(&db, 1_000);
        c.start().unwrap();
        c.suspend(1_000).unwrap();

        let prefs = Prefs::new(&db);
        let mut alarm = StoredAlarm::new(prefs);
        let mut notifier = StoredNotifier::new(prefs, true);
        crate::alarm::on_alarm_expired(&prefs, &mut alarm, &mut notifier).unwrap();

        let c = session(&db, 1_700);
        assert_eq!(c.state(), TimerState::Stopped);
        assert_eq!(c.engine().remaining_secs(), 600);
    }
}
