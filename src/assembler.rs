//! Boundary to the external video assembly tool.
//!
//! Given a complete, correctly indexed image sequence, `ffmpeg` either
//! produces a video file or fails with its own exit status; nothing about
//! the encode itself is modeled here.

use std::path::PathBuf;
use std::process::Command;

use log::info;
use serde::{Deserialize, Serialize};

use crate::config::CaptureConfig;
use crate::error::CaptureError;

/// Fixed parameters handed to the tool.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssemblySettings {
    pub fps: u32,
    pub codec: String,
    pub bitrate: String,
    pub video_name: String,
    pub video_extension: String,
}

impl Default for AssemblySettings {
    fn default() -> Self {
        Self {
            fps: 10,
            codec: "mpeg4".into(),
            bitrate: "50000k".into(),
            video_name: "timelapse".into(),
            video_extension: "mp4".into(),
        }
    }
}

/// Runs `ffmpeg` over the configured image sequence and returns the output
/// path. Overwrites an existing output file.
pub fn assemble_video(
    config: &CaptureConfig,
    settings: &AssemblySettings,
) -> Result<PathBuf, CaptureError> {
    let input_pattern = format!(
        "{}/{}%d.{}",
        config.image_folder.display(),
        config.image_name_prefix,
        config.image_extension
    );
    let output = PathBuf::from(format!(
        "{}.{}",
        settings.video_name, settings.video_extension
    ));

    info!(
        "Assembling {} at {} fps into {}",
        input_pattern,
        settings.fps,
        output.display()
    );

    let status = Command::new("ffmpeg")
        .arg("-r")
        .arg(settings.fps.to_string())
        .arg("-i")
        .arg(&input_pattern)
        .arg("-vcodec")
        .arg(&settings.codec)
        .arg("-b")
        .arg(&settings.bitrate)
        .arg("-y")
        .arg(&output)
        .status()?;

    if !status.success() {
        return Err(CaptureError::AssemblyFailed { status });
    }
    Ok(output)
}
