//! Timer notifications.
//!
//! A notification is shown while the countdown is in the background
//! (running or paused) and when the wake-up alarm fires. Opening the
//! foreground session hides it.

mod actions;

pub use actions::{apply_action, NotificationAction};

use chrono::{DateTime, Local, TimeZone};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::Result;
use crate::storage::Prefs;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Notification {
    Running {
        /// Epoch seconds at which the countdown ends.
        wake_up_at: i64,
    },
    Paused,
    Expired,
}

impl Notification {
    /// Text shown to the user.
    pub fn message(&self) -> String {
        match self {
            Notification::Running { wake_up_at } => match local_time(*wake_up_at) {
                Some(end) => format!("Timer is running. End: {}", end.format("%H:%M")),
                None => "Timer is running.".to_string(),
            },
            Notification::Paused => "Timer is paused.".to_string(),
            Notification::Expired => "Timer expired!".to_string(),
        }
    }

    /// Actions offered alongside this notification.
    pub fn actions(&self) -> &'static [NotificationAction] {
        match self {
            Notification::Running { .. } => &[NotificationAction::Stop, NotificationAction::Pause],
            Notification::Paused => &[NotificationAction::Stop, NotificationAction::Resume],
            Notification::Expired => &[NotificationAction::Start],
        }
    }
}

fn local_time(epoch_secs: i64) -> Option<DateTime<Local>> {
    Local.timestamp_opt(epoch_secs, 0).single()
}

/// Displays timer notifications.
pub trait Notifier {
    fn show_timer_running(&mut self, wake_up_at: i64) -> Result<()>;
    fn show_timer_paused(&mut self) -> Result<()>;
    fn show_timer_expired(&mut self) -> Result<()>;
    fn hide(&mut self) -> Result<()>;
}

/// Notifier that records the current notification in the kv store so a
/// later `countdown notification show` can display it.
pub struct StoredNotifier<'db> {
    prefs: Prefs<'db>,
    enabled: bool,
}

impl<'db> StoredNotifier<'db> {
    pub fn new(prefs: Prefs<'db>, enabled: bool) -> Self {
        Self { prefs, enabled }
    }

    /// The notification currently on display.
    pub fn current(&self) -> Result<Option<Notification>> {
        self.prefs.notification()
    }

    fn show(&mut self, notification: Notification) -> Result<()> {
        if !self.enabled {
            return Ok(());
        }
        info!(text = %notification.message(), "showing notification");
        self.prefs.set_notification(Some(&notification))
    }
}

impl Notifier for StoredNotifier<'_> {
    fn show_timer_running(&mut self, wake_up_at: i64) -> Result<()> {
        self.show(Notification::Running { wake_up_at })
    }

    fn show_timer_paused(&mut self) -> Result<()> {
        self.show(Notification::Paused)
    }

    fn show_timer_expired(&mut self) -> Result<()> {
        self.show(Notification::Expired)
    }

    fn hide(&mut self) -> Result<()> {
        self.prefs.set_notification(None)
    }
}
