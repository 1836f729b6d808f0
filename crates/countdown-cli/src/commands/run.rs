//! Foreground countdown driven by a one-second tokio interval.

use std::io::Write;
use std::time::Duration;

use countdown_core::{now_secs, Event, TimerState};
use tokio::time::{interval, MissedTickBehavior};
use tracing::debug;

use super::session::{Controller, Session};
use super::write_stderr;

const BAR_WIDTH: usize = 30;

pub fn run(start: bool) -> Result<(), Box<dyn std::error::Error>> {
    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(foreground(start))
}

/// Resume, tick until the countdown stops or Ctrl-C arrives, then suspend.
///
/// `resume` has already disarmed the alarm, so `suspend` runs on every exit
/// path, including errors from the tick loop.
async fn foreground(start: bool) -> Result<(), Box<dyn std::error::Error>> {
    let session = Session::open()?;
    let bell = session.config().notifications.bell;
    let mut controller = session.controller();

    for event in controller.resume(now_secs())? {
        report(&event, bell);
    }

    let outcome = tick_loop(&mut controller, start, bell).await;
    write_stderr("\n");

    let suspended = controller.suspend(now_secs());
    outcome?;
    suspended?;
    Ok(())
}

async fn tick_loop(
    controller: &mut Controller<'_>,
    start: bool,
    bell: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    if start && controller.controls().start {
        controller.start()?;
    }

    let mut ticker = interval(Duration::from_secs(1));
    ticker.set_missed_tick_behavior(MissedTickBehavior::Burst);
    // The first tick completes immediately.
    ticker.tick().await;

    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    render(controller);
    while controller.state() == TimerState::Running {
        tokio::select! {
            _ = ticker.tick() => {
                let finished = controller.tick()?;
                render(controller);
                if let Some(event) = finished {
                    report(&event, bell);
                    break;
                }
            }
            signal = &mut ctrl_c => {
                signal?;
                debug!("interrupted; suspending");
                break;
            }
        }
    }
    Ok(())
}

fn render(controller: &Controller<'_>) {
    if let Err(e) = draw(controller) {
        debug!(error = %e, "progress render failed");
    }
}

fn draw(controller: &Controller<'_>) -> std::io::Result<()> {
    let engine = controller.engine();
    let filled = if engine.length_secs() == 0 {
        0
    } else {
        (engine.progress() as usize * BAR_WIDTH) / engine.length_secs() as usize
    };
    let mut stderr = std::io::stderr().lock();
    write!(
        stderr,
        "\r{:>7} [{}{}] {}",
        controller.display(),
        "#".repeat(filled),
        "-".repeat(BAR_WIDTH - filled),
        controller.state(),
    )?;
    stderr.flush()
}

fn report(event: &Event, bell: bool) {
    if let Event::TimerFinished { stopped: false, .. } = event {
        write_stderr("\n");
        println!("Timer expired!");
        if bell {
            write_stderr("\x07");
        }
    }
}
