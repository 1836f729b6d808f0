pub mod config;
pub mod notification;
pub mod run;
pub mod session;
pub mod timer;
pub mod watch;

use std::io::Write;

/// Write `text` to stderr. A closed or broken stderr is logged and ignored.
pub fn write_stderr(text: &str) {
    let mut stderr = std::io::stderr().lock();
    if let Err(e) = stderr.write_all(text.as_bytes()).and_then(|()| stderr.flush()) {
        tracing::debug!(error = %e, "stderr unavailable");
    }
}
