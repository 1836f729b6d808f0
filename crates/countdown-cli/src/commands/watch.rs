//! Fires the wake-up alarm armed by a suspended countdown.

use std::time::Duration;

use chrono::{Local, TimeZone};
use countdown_core::{now_secs, on_alarm_expired, AlarmScheduler, Notification};
use tracing::{debug, info};

use super::session::Session;
use super::write_stderr;

pub fn run(once: bool) -> Result<(), Box<dyn std::error::Error>> {
    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(watch(once))
}

async fn watch(once: bool) -> Result<(), Box<dyn std::error::Error>> {
    let session = Session::open()?;
    let poll = Duration::from_secs(session.config().alarm.poll_interval_secs);
    let bell = session.config().notifications.bell;

    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    loop {
        let prefs = session.prefs();
        let mut alarm = session.alarm();
        let now = now_secs();

        let wait = match alarm.pending()? {
            Some(wake_up_at) if wake_up_at <= now => {
                let mut notifier = session.notifier();
                on_alarm_expired(&prefs, &mut alarm, &mut notifier)?;
                println!("{}", Notification::Expired.message());
                if bell {
                    write_stderr("\x07");
                }
                info!(wake_up_at, "wake-up alarm fired");
                if once {
                    return Ok(());
                }
                poll
            }
            Some(wake_up_at) => {
                if once {
                    println!("alarm pending: {}", format_local(wake_up_at));
                    return Ok(());
                }
                let until = Duration::from_secs(u64::try_from(wake_up_at - now).unwrap_or(0));
                until.min(poll)
            }
            None => {
                if once {
                    println!("no alarm pending");
                    return Ok(());
                }
                poll
            }
        };

        debug!(?wait, "waiting for wake-up alarm");
        tokio::select! {
            _ = tokio::time::sleep(wait) => {}
            signal = &mut ctrl_c => {
                signal?;
                return Ok(());
            }
        }
    }
}

fn format_local(epoch_secs: i64) -> String {
    match Local.timestamp_opt(epoch_secs, 0).single() {
        Some(t) => t.format("%Y-%m-%d %H:%M:%S").to_string(),
        None => epoch_secs.to_string(),
    }
}
