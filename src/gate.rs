//! Brightness admission gate.
//!
//! Decides per captured frame whether it is worth keeping. The frame is
//! shrunk to a small fixed square before analysis, so the cost per frame is
//! constant regardless of the source resolution; a 10x10 average is plenty
//! to tell a night capture from a lit scene.

use image::imageops::{self, FilterType};
use image::{DynamicImage, RgbImage};

const SAMPLE_DIM: u32 = 10;

/// Outcome of gating one frame.
#[derive(Debug, Clone, Copy)]
pub struct GateDecision {
    pub admitted: bool,
    /// Mean luma of the downsampled frame, normalized to [0, 1].
    pub lightness: f32,
}

/// Mean perceptual lightness of `image`, normalized to [0, 1].
pub fn average_lightness(image: &RgbImage) -> f32 {
    let sample = imageops::resize(image, SAMPLE_DIM, SAMPLE_DIM, FilterType::Triangle);
    let gray = DynamicImage::ImageRgb8(sample).into_luma8();
    let sum: u32 = gray.pixels().map(|px| u32::from(px.0[0])).sum();
    let count = gray.width() * gray.height();
    sum as f32 / (count as f32 * 255.0)
}

/// Evaluates `image` against `threshold`. A threshold of 0 (or below)
/// disables gating entirely; otherwise the frame is admitted when its mean
/// lightness exceeds the threshold.
pub fn evaluate(image: &RgbImage, threshold: f32) -> GateDecision {
    let lightness = average_lightness(image);
    GateDecision {
        admitted: threshold <= 0.0 || lightness > threshold,
        lightness,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;

    fn uniform(level: u8) -> RgbImage {
        RgbImage::from_pixel(64, 48, Rgb([level, level, level]))
    }

    #[test]
    fn black_frame_is_rejected_above_threshold() {
        let decision = evaluate(&uniform(0), 0.3);
        assert!(!decision.admitted);
        assert!(decision.lightness < 0.01);
    }

    #[test]
    fn zero_threshold_admits_everything() {
        assert!(evaluate(&uniform(0), 0.0).admitted);
        assert!(evaluate(&uniform(255), 0.0).admitted);
    }

    #[test]
    fn bright_frame_passes_a_high_threshold() {
        let decision = evaluate(&uniform(255), 0.9);
        assert!(decision.admitted);
        assert!(decision.lightness > 0.99);
    }

    #[test]
    fn threshold_of_one_rejects_even_a_white_frame() {
        // Admission requires lightness strictly above the threshold.
        assert!(!evaluate(&uniform(255), 1.0).admitted);
    }

    #[test]
    fn mid_gray_lightness_is_near_half() {
        let lightness = average_lightness(&uniform(128));
        assert!((lightness - 0.5).abs() < 0.02, "lightness was {lightness}");
    }
}
