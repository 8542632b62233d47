//! The device boundary: anything that can hand the session one bitmap per
//! request. The real driver lives outside this crate; the session only needs
//! this trait plus a synthetic stand-in for development and tests.

use image::{Rgb, RgbImage};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::error::CaptureError;

/// One frame per request, or [`CaptureError::DeviceUnavailable`].
///
/// `capture_frame` may block on device I/O; the session confines the call to
/// a blocking task, so implementations do not need to be async.
pub trait FrameSource: Send + 'static {
    fn capture_frame(&mut self) -> Result<RgbImage, CaptureError>;
}

/// Synthetic frame source: a diagonal gradient with sensor noise whose
/// overall lightness follows a slow day/night cycle. Lets the binary and the
/// tests drive the whole pipeline, brightness gate included, without a
/// camera attached.
pub struct TestPatternSource {
    width: u32,
    height: u32,
    /// Frames per simulated day/night cycle.
    cycle_frames: u64,
    frame_count: u64,
    rng: StdRng,
}

impl TestPatternSource {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            cycle_frames: 120,
            frame_count: 0,
            rng: StdRng::from_entropy(),
        }
    }

    /// Lightness multiplier for the current frame, swinging 0.05..=1.0.
    fn cycle_level(&self) -> f32 {
        let phase = (self.frame_count % self.cycle_frames) as f32
            / self.cycle_frames as f32
            * std::f32::consts::TAU;
        0.525 + 0.475 * phase.sin()
    }
}

impl FrameSource for TestPatternSource {
    fn capture_frame(&mut self) -> Result<RgbImage, CaptureError> {
        let level = self.cycle_level();
        let (width, height) = (self.width, self.height);
        let rng = &mut self.rng;

        let image = RgbImage::from_fn(width, height, |x, y| {
            let ramp = (x + y) as f32 / (width + height) as f32;
            let noise: f32 = rng.gen_range(-0.03..0.03);
            let value = ((ramp * level + noise).clamp(0.0, 1.0) * 255.0) as u8;
            Rgb([value, value, value])
        });

        self.frame_count += 1;
        Ok(image)
    }
}
