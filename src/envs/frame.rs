//! Rendered RGB frames
use image::RgbImage;
use serde::{Deserialize, Serialize};

/// An RGB color.
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    pub const WHITE: Self = Self(255, 255, 255);
    pub const BLACK: Self = Self(0, 0, 0);
}

impl From<Rgb> for image::Rgb<u8> {
    #[inline]
    fn from(color: Rgb) -> Self {
        Self([color.0, color.1, color.2])
    }
}

impl From<image::Rgb<u8>> for Rgb {
    #[inline]
    fn from(pixel: image::Rgb<u8>) -> Self {
        let [r, g, b] = pixel.0;
        Self(r, g, b)
    }
}

/// A rendered RGB image with the origin at the top-left corner.
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    image: RgbImage,
}

impl Frame {
    /// Create a frame filled with a single color.
    pub fn new(width: u32, height: u32, background: Rgb) -> Self {
        Self {
            image: RgbImage::from_pixel(width, height, background.into()),
        }
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    /// Packed row-major RGB bytes.
    pub fn pixels(&self) -> &[u8] {
        self.image.as_raw()
    }

    /// The underlying image buffer.
    pub const fn as_image(&self) -> &RgbImage {
        &self.image
    }

    /// Color of the pixel at column `x`, row `y`.
    pub fn pixel(&self, x: u32, y: u32) -> Option<Rgb> {
        if x < self.width() && y < self.height() {
            Some((*self.image.get_pixel(x, y)).into())
        } else {
            None
        }
    }

    /// Set a pixel color. Coordinates outside of the frame are ignored.
    pub fn set_pixel(&mut self, x: i64, y: i64, color: Rgb) {
        if let (Ok(x), Ok(y)) = (u32::try_from(x), u32::try_from(y)) {
            if x < self.width() && y < self.height() {
                self.image.put_pixel(x, y, color.into());
            }
        }
    }

    /// Fill the rectangle with corners `(x0, y0)` and `(x1, y1)` (inclusive), clipped to the frame.
    pub fn fill_rect(&mut self, x0: i64, y0: i64, x1: i64, y1: i64, color: Rgb) {
        for y in y0.min(y1)..=y0.max(y1) {
            for x in x0.min(x1)..=x0.max(x1) {
                self.set_pixel(x, y, color);
            }
        }
    }

    /// Fill a disc centred at `(cx, cy)`, clipped to the frame.
    pub fn fill_circle(&mut self, cx: f64, cy: f64, radius: f64, color: Rgb) {
        #[allow(clippy::cast_possible_truncation)]
        let (x0, x1, y0, y1) = (
            (cx - radius).floor() as i64,
            (cx + radius).ceil() as i64,
            (cy - radius).floor() as i64,
            (cy + radius).ceil() as i64,
        );
        let radius_squared = radius * radius;
        for y in y0..=y1 {
            for x in x0..=x1 {
                let dx = x as f64 - cx;
                let dy = y as f64 - cy;
                if dx * dx + dy * dy <= radius_squared {
                    self.set_pixel(x, y, color);
                }
            }
        }
    }

    /// Draw a line segment of the given half-width from `start` to `end`.
    pub fn draw_line(&mut self, start: (f64, f64), end: (f64, f64), half_width: f64, color: Rgb) {
        let (dx, dy) = (end.0 - start.0, end.1 - start.1);
        let length = (dx * dx + dy * dy).sqrt();
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let num_points = length.ceil().max(1.0) as usize;
        for i in 0..=num_points {
            let t = i as f64 / num_points as f64;
            self.fill_circle(start.0 + t * dx, start.1 + t * dy, half_width, color);
        }
    }
}
