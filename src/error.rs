use std::path::PathBuf;
use std::process::ExitStatus;

/// Errors produced by the capture engine.
#[derive(Debug, thiserror::Error)]
pub enum CaptureError {
    /// The frame source could not produce a frame. Transient: the session
    /// stays running and retries on the next tick.
    #[error("frame source unavailable: {0}")]
    DeviceUnavailable(String),

    /// A file in the image folder matched the extension filter but not the
    /// `{prefix}<index>.{extension}` naming pattern. Fatal to session start;
    /// resuming at index 0 could overwrite existing images.
    #[error("cannot resume sequence: '{path}' does not match '{prefix}<index>.{extension}'")]
    MalformedSequenceFile {
        path: PathBuf,
        prefix: String,
        extension: String,
    },

    /// Rejected at the configuration boundary, before a session starts.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// Encoding or decoding a bitmap failed.
    #[error("image error: {0}")]
    Image(#[from] image::ImageError),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// The external video assembly tool ran but reported failure.
    #[error("video assembly tool exited with {status}")]
    AssemblyFailed { status: ExitStatus },
}
