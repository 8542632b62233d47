pub mod controller;
mod loop_worker;
pub mod state;

pub use controller::CaptureController;
pub use state::{CaptureSnapshot, SessionState, SessionStatus};
