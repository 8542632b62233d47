pub mod assembler;
pub mod config;
pub mod error;
pub mod frame;
pub mod gate;
pub mod overlay;
pub mod sequence;
pub mod session;
pub mod source;
pub mod writer;

pub use assembler::{assemble_video, AssemblySettings};
pub use config::{CaptureConfig, ConfigStore};
pub use error::CaptureError;
pub use frame::CapturedFrame;
pub use session::{CaptureController, CaptureSnapshot, SessionState, SessionStatus};
pub use source::{FrameSource, TestPatternSource};
pub use writer::FrameWriter;
