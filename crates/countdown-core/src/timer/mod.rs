mod engine;

pub use engine::{format_countdown, Controls, CountdownEngine, TimerState};
