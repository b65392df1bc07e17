//! Synthetic stills for offline testing
//!
//! Stands in for frames from the HQ camera so capture paths can be exercised
//! without hardware.

use image::{Rgb, RgbImage};

/// Gradient frame that differs per capture index.
pub fn synthetic_still(capture_number: u64, width: u32, height: u32) -> RgbImage {
    let base = (capture_number % 256) as u8;
    RgbImage::from_fn(width, height, |x, y| {
        Rgb([
            base.wrapping_add((x % 256) as u8),
            base.wrapping_add((y % 256) as u8),
            base.wrapping_add(((x + y) % 256) as u8),
        ])
    })
}
