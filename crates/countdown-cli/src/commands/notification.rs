use clap::Subcommand;
use countdown_core::notify::apply_action;
use countdown_core::{now_secs, NotificationAction};
use serde_json::json;

use super::session::Session;

#[derive(Subcommand)]
pub enum NotificationCommand {
    /// Print the notification currently on display
    Show,
    /// Stop the countdown from the notification
    Stop,
    /// Pause the countdown from the notification
    Pause,
    /// Resume a paused countdown from the notification
    Resume,
    /// Start a new countdown from the notification
    Start,
}

pub fn run(command: NotificationCommand) -> Result<(), Box<dyn std::error::Error>> {
    let session = Session::open()?;
    let prefs = session.prefs();

    let action = match command {
        NotificationCommand::Show => {
            let output = match prefs.notification()? {
                Some(n) => json!({
                    "notification": n,
                    "message": n.message(),
                    "actions": n.actions(),
                }),
                None => json!({ "notification": null }),
            };
            println!("{}", serde_json::to_string_pretty(&output)?);
            return Ok(());
        }
        NotificationCommand::Stop => NotificationAction::Stop,
        NotificationCommand::Pause => NotificationAction::Pause,
        NotificationCommand::Resume => NotificationAction::Resume,
        NotificationCommand::Start => NotificationAction::Start,
    };

    let mut alarm = session.alarm();
    let mut notifier = session.notifier();
    let state = apply_action(
        action,
        &prefs,
        &mut alarm,
        &mut notifier,
        now_secs(),
        session.config().timer_length_secs(),
    )?;
    println!(
        "{}",
        serde_json::to_string_pretty(&json!({ "action": action, "state": state }))?
    );
    Ok(())
}
