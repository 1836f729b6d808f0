//! Shared setup for commands that touch the timer.

use countdown_core::{
    Config, ControllerSettings, Database, Prefs, StoredAlarm, StoredNotifier, TimerController,
};

pub type Controller<'db> = TimerController<'db, StoredAlarm<'db>, StoredNotifier<'db>>;

/// Open database and loaded configuration for one command invocation.
pub struct Session {
    db: Database,
    config: Config,
}

impl Session {
    pub fn open() -> Result<Self, Box<dyn std::error::Error>> {
        Ok(Self {
            db: Database::open()?,
            config: Config::load()?,
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn prefs(&self) -> Prefs<'_> {
        Prefs::new(&self.db)
    }

    pub fn alarm(&self) -> StoredAlarm<'_> {
        StoredAlarm::new(self.prefs())
    }

    pub fn notifier(&self) -> StoredNotifier<'_> {
        StoredNotifier::new(self.prefs(), self.config.notifications.enabled)
    }

    pub fn controller(&self) -> Controller<'_> {
        TimerController::new(
            self.prefs(),
            self.alarm(),
            self.notifier(),
            ControllerSettings::from_config(&self.config),
        )
    }
}
