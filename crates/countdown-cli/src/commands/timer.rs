use countdown_core::{now_secs, Event};
use serde::Serialize;

use super::session::Session;

pub enum TimerAction {
    Start,
    Pause,
    Stop,
    Status,
}

#[derive(Serialize)]
struct Output {
    events: Vec<Event>,
    snapshot: Event,
}

/// One foreground session: resume, apply the control, suspend.
///
/// State is persisted even when the control is rejected.
pub fn run(action: TimerAction) -> Result<(), Box<dyn std::error::Error>> {
    let session = Session::open()?;
    let mut controller = session.controller();
    let mut events = controller.resume(now_secs())?;

    let result = match action {
        TimerAction::Start => controller.start().map(Some),
        TimerAction::Pause => controller.pause().map(Some),
        TimerAction::Stop => controller.stop().map(Some),
        TimerAction::Status => Ok(None),
    };
    let snapshot = controller.snapshot();
    let suspended = controller.suspend(now_secs())?;

    events.extend(result?);
    events.extend(suspended);
    let output = Output { events, snapshot };
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}
