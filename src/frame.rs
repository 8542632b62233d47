use chrono::{DateTime, Utc};
use image::RgbImage;

/// A single frame pulled from the frame source, alive for one capture cycle.
#[derive(Debug, Clone)]
pub struct CapturedFrame {
    pub image: RgbImage,
    pub timestamp: DateTime<Utc>,
}

impl CapturedFrame {
    /// Wraps a freshly acquired bitmap, stamping the capture time.
    pub fn new(image: RgbImage) -> Self {
        Self {
            image,
            timestamp: Utc::now(),
        }
    }
}
