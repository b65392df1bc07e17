//! Crosshair overlay for centring a well under the camera.
//!
//! The mark is a horizontal and a vertical line through the centre of the
//! preview window plus a circle of adjustable radius around the centre.
//! Overlay planes on the Pi display stack need a width that is a multiple of
//! 32 and a height that is a multiple of 16, so buffers are padded.

use crate::camera::PreviewWindow;
use crate::errors::ScanError;
use image::{Rgb, RgbImage, Rgba, RgbaImage};
use serde::{Deserialize, Serialize};

pub const WIDTH_ALIGN: u32 = 32;
pub const HEIGHT_ALIGN: u32 = 16;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CrosshairStyle {
    pub radius: u32,
    pub thickness: u32,
    /// RGB
    pub color: [u8; 3],
    pub alpha: u8,
}

impl Default for CrosshairStyle {
    fn default() -> Self {
        Self {
            radius: 100,
            thickness: 1,
            color: [255, 0, 0],
            alpha: 255,
        }
    }
}

impl CrosshairStyle {
    /// Nudge the radius by `delta`, never below zero.
    pub fn adjust_radius(&mut self, delta: i64) {
        self.radius = (self.radius as i64 + delta).clamp(0, u32::MAX as i64) as u32;
    }

    pub fn validate(&self) -> Result<(), ScanError> {
        if self.thickness == 0 {
            return Err(ScanError::invalid_argument("crosshair thickness must be at least 1"));
        }
        Ok(())
    }
}

/// An RGBA overlay ready to hand to a camera backend.
#[derive(Debug, Clone, PartialEq)]
pub struct Overlay {
    pub image: RgbaImage,
    pub window: PreviewWindow,
    pub alpha: u8,
}

impl Overlay {
    pub fn padded_size(&self) -> (u32, u32) {
        self.image.dimensions()
    }
}

pub fn pad_to(value: u32, align: u32) -> u32 {
    value.div_ceil(align) * align
}

/// Parse `#rrggbb` (leading `#` optional).
pub fn parse_hex_color(raw: &str) -> Result<[u8; 3], ScanError> {
    let hex = raw.trim().trim_start_matches('#');
    if hex.len() != 6 || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(ScanError::invalid_argument(format!(
            "colour must look like #rrggbb, got {raw:?}"
        )));
    }
    let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16);
    match (channel(0), channel(2), channel(4)) {
        (Ok(r), Ok(g), Ok(b)) => Ok([r, g, b]),
        _ => Err(ScanError::invalid_argument(format!("invalid colour {raw:?}"))),
    }
}

/// Which pixels of a `width` x `height` buffer the mark covers, for a
/// window of `w` x `h`.
fn crosshair_mask(
    width: u32,
    height: u32,
    w: u32,
    h: u32,
    style: &CrosshairStyle,
    with_circle: bool,
) -> Vec<bool> {
    let mut mask = vec![false; (width * height) as usize];
    let cx = (w / 2) as i64;
    let cy = (h / 2) as i64;
    let t = style.thickness.max(1) as i64;
    let lo = (t - 1) / 2;
    let hi = t / 2;

    let mut set = |x: i64, y: i64| {
        if x >= 0 && y >= 0 && (x as u32) < width && (y as u32) < height {
            mask[(y as u32 * width + x as u32) as usize] = true;
        }
    };

    for x in 0..=w as i64 {
        for y in (cy - lo)..=(cy + hi) {
            set(x, y);
        }
    }
    for y in 0..=h as i64 {
        for x in (cx - lo)..=(cx + hi) {
            set(x, y);
        }
    }

    if with_circle {
        let r = style.radius as f64;
        let half = (t as f64 / 2.0).max(0.5);
        let reach = (r + half).ceil() as i64;
        for dy in -reach..=reach {
            for dx in -reach..=reach {
                let d = ((dx * dx + dy * dy) as f64).sqrt();
                if (d - r).abs() <= half {
                    set(cx + dx, cy + dy);
                }
            }
        }
    }
    mask
}

/// Render the crosshair for `window` into a padded RGBA buffer.
///
/// Marked pixels get the style colour with `style.alpha`; everything else is
/// fully transparent.
pub fn render_crosshair(style: &CrosshairStyle, window: PreviewWindow) -> Overlay {
    let width = pad_to(window.width, WIDTH_ALIGN);
    let height = pad_to(window.height, HEIGHT_ALIGN);
    let mask = crosshair_mask(width, height, window.width, window.height, style, true);

    let [r, g, b] = style.color;
    let image = RgbaImage::from_fn(width, height, |x, y| {
        if mask[(y * width + x) as usize] {
            Rgba([r, g, b, style.alpha])
        } else {
            Rgba([0, 0, 0, 0])
        }
    });

    Overlay {
        image,
        window,
        alpha: style.alpha,
    }
}

/// Copy of `frame` with the centre lines drawn on it.
pub fn draw_cross_hairs(frame: &RgbImage, style: &CrosshairStyle) -> RgbImage {
    let mut out = frame.clone();
    let (w, h) = frame.dimensions();
    let mask = crosshair_mask(w, h, w, h, style, false);
    for (pixel, marked) in out.pixels_mut().zip(mask) {
        if marked {
            *pixel = Rgb(style.color);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn window(w: u32, h: u32) -> PreviewWindow {
        PreviewWindow::new(0, 0, w, h)
    }

    #[test]
    fn test_padding() {
        assert_eq!(pad_to(640, 32), 640);
        assert_eq!(pad_to(630, 32), 640);
        assert_eq!(pad_to(470, 16), 480);
        let overlay = render_crosshair(&CrosshairStyle::default(), window(630, 470));
        assert_eq!(overlay.padded_size(), (640, 480));
    }

    #[test]
    fn test_mark_pixels() {
        let style = CrosshairStyle {
            radius: 50,
            thickness: 1,
            color: [10, 20, 30],
            alpha: 200,
        };
        let overlay = render_crosshair(&style, window(640, 480));
        let mark = Rgba([10, 20, 30, 200]);
        let clear = Rgba([0, 0, 0, 0]);

        assert_eq!(*overlay.image.get_pixel(320, 240), mark);
        assert_eq!(*overlay.image.get_pixel(0, 240), mark);
        assert_eq!(*overlay.image.get_pixel(320, 0), mark);
        assert_eq!(*overlay.image.get_pixel(370, 240), mark);
        assert_eq!(*overlay.image.get_pixel(320, 190), mark);
        assert_eq!(*overlay.image.get_pixel(0, 0), clear);
        assert_eq!(*overlay.image.get_pixel(100, 100), clear);
        assert_eq!(*overlay.image.get_pixel(321, 241), clear);
    }

    #[test]
    fn test_thick_lines() {
        let style = CrosshairStyle {
            radius: 0,
            thickness: 3,
            ..CrosshairStyle::default()
        };
        let overlay = render_crosshair(&style, window(64, 32));
        for y in 15..=17 {
            assert_eq!(overlay.image.get_pixel(2, y)[3], 255);
        }
        assert_eq!(overlay.image.get_pixel(2, 19)[3], 0);
    }

    #[test]
    fn test_parse_hex_color() {
        assert_eq!(parse_hex_color("#ff8000").unwrap(), [255, 128, 0]);
        assert_eq!(parse_hex_color("00FF00").unwrap(), [0, 255, 0]);
        assert!(parse_hex_color("#fff").is_err());
        assert!(parse_hex_color("#gg0000").is_err());
    }

    #[test]
    fn test_adjust_radius_clamps() {
        let mut style = CrosshairStyle::default();
        style.adjust_radius(-10);
        assert_eq!(style.radius, 90);
        style.adjust_radius(-1000);
        assert_eq!(style.radius, 0);
        style.adjust_radius(1);
        assert_eq!(style.radius, 1);
    }

    #[test]
    fn test_draw_cross_hairs_on_frame() {
        let frame = RgbImage::from_pixel(9, 7, Rgb([0, 0, 0]));
        let style = CrosshairStyle {
            color: [0, 255, 0],
            ..CrosshairStyle::default()
        };
        let out = draw_cross_hairs(&frame, &style);
        assert_eq!(*out.get_pixel(0, 3), Rgb([0, 255, 0]));
        assert_eq!(*out.get_pixel(4, 0), Rgb([0, 255, 0]));
        assert_eq!(*out.get_pixel(0, 0), Rgb([0, 0, 0]));
        assert_eq!(*frame.get_pixel(4, 3), Rgb([0, 0, 0]));
    }
}
