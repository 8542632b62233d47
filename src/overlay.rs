//! Burns a human-readable capture timestamp into a frame.
//!
//! The timestamp alphabet is tiny (digits, dash, colon, space), so the
//! glyphs live in an embedded 5x7 pixel font drawn scaled-up rather than
//! pulling in a font rasterizer.

use chrono::{DateTime, Local};
use image::{Rgb, RgbImage};

const GLYPH_WIDTH: u32 = 5;
const GLYPH_HEIGHT: u32 = 7;
const SCALE: u32 = 4;
/// Top-left anchor of the text, matching where the original tool stamped it.
const ORIGIN: (u32, u32) = (30, 30);
const COLOR: Rgb<u8> = Rgb([50, 205, 50]);

/// Draws `timestamp` as `YYYY-MM-DD HH:MM:SS` (local time) onto `image`.
/// Runs before gating, so the gate sees the frame exactly as persisted.
pub fn stamp_timestamp(image: &mut RgbImage, timestamp: DateTime<Local>) {
    let text = timestamp.format("%Y-%m-%d %H:%M:%S").to_string();
    draw_text(image, &text, ORIGIN.0, ORIGIN.1);
}

fn draw_text(image: &mut RgbImage, text: &str, left: u32, top: u32) {
    let advance = (GLYPH_WIDTH + 1) * SCALE;
    for (slot, ch) in text.chars().enumerate() {
        draw_glyph(image, ch, left + slot as u32 * advance, top);
    }
}

fn draw_glyph(image: &mut RgbImage, ch: char, left: u32, top: u32) {
    let rows = glyph(ch);
    for (row, bits) in rows.iter().enumerate() {
        for col in 0..GLYPH_WIDTH {
            if bits & (1 << (GLYPH_WIDTH - 1 - col)) == 0 {
                continue;
            }
            for dy in 0..SCALE {
                for dx in 0..SCALE {
                    let x = left + col * SCALE + dx;
                    let y = top + row as u32 * SCALE + dy;
                    if x < image.width() && y < image.height() {
                        image.put_pixel(x, y, COLOR);
                    }
                }
            }
        }
    }
}

/// 5x7 bitmaps for the timestamp alphabet; anything else renders blank.
fn glyph(ch: char) -> [u8; GLYPH_HEIGHT as usize] {
    match ch {
        '0' => [0b01110, 0b10001, 0b10011, 0b10101, 0b11001, 0b10001, 0b01110],
        '1' => [0b00100, 0b01100, 0b00100, 0b00100, 0b00100, 0b00100, 0b01110],
        '2' => [0b01110, 0b10001, 0b00001, 0b00010, 0b00100, 0b01000, 0b11111],
        '3' => [0b11111, 0b00010, 0b00100, 0b00010, 0b00001, 0b10001, 0b01110],
        '4' => [0b00010, 0b00110, 0b01010, 0b10010, 0b11111, 0b00010, 0b00010],
        '5' => [0b11111, 0b10000, 0b11110, 0b00001, 0b00001, 0b10001, 0b01110],
        '6' => [0b00110, 0b01000, 0b10000, 0b11110, 0b10001, 0b10001, 0b01110],
        '7' => [0b11111, 0b00001, 0b00010, 0b00100, 0b01000, 0b01000, 0b01000],
        '8' => [0b01110, 0b10001, 0b10001, 0b01110, 0b10001, 0b10001, 0b01110],
        '9' => [0b01110, 0b10001, 0b10001, 0b01111, 0b00001, 0b00010, 0b01100],
        '-' => [0b00000, 0b00000, 0b00000, 0b11111, 0b00000, 0b00000, 0b00000],
        ':' => [0b00000, 0b00100, 0b00000, 0b00000, 0b00000, 0b00100, 0b00000],
        _ => [0; GLYPH_HEIGHT as usize],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn dark(width: u32, height: u32) -> RgbImage {
        RgbImage::from_pixel(width, height, Rgb([0, 0, 0]))
    }

    fn stamped_pixels(image: &RgbImage) -> usize {
        image.pixels().filter(|px| **px == COLOR).count()
    }

    #[test]
    fn stamping_marks_pixels_without_resizing() {
        let mut image = dark(640, 480);
        let when = Local.with_ymd_and_hms(2024, 3, 1, 12, 30, 45).unwrap();
        stamp_timestamp(&mut image, when);

        assert_eq!((image.width(), image.height()), (640, 480));
        assert!(stamped_pixels(&image) > 100);
    }

    #[test]
    fn text_is_clipped_on_tiny_frames() {
        let mut image = dark(8, 8);
        let when = Local.with_ymd_and_hms(2024, 3, 1, 12, 30, 45).unwrap();
        stamp_timestamp(&mut image, when);
        // Nothing to assert beyond not panicking and dims being intact.
        assert_eq!((image.width(), image.height()), (8, 8));
    }

    #[test]
    fn unknown_characters_render_blank() {
        let mut image = dark(200, 100);
        draw_text(&mut image, "abc", 0, 0);
        assert_eq!(stamped_pixels(&image), 0);
    }
}
