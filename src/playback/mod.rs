mod controller;
mod error;
pub mod process;

pub use controller::{PlaybackAttempt, PlaybackController, StopOutcome};
