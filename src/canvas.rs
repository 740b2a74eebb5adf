use std::path::Path;

use embedded_graphics::pixelcolor::Rgb888;
use embedded_graphics::prelude::*;
use image::{ImageFormat, Rgb, RgbImage};
use serde::{Deserialize, Serialize};

use crate::error::{Result, StimError};

/// Byte order of each pixel in a raw dump.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "kebab-case")]
pub enum ChannelOrder {
    #[default]
    Rgb,
    Bgr,
}

/// Convert tightly packed RGB bytes to the given channel order.
pub fn reorder_rgb(rgb: &[u8], order: ChannelOrder) -> Vec<u8> {
    match order {
        ChannelOrder::Rgb => rgb.to_vec(),
        ChannelOrder::Bgr => rgb
            .chunks_exact(3)
            .flat_map(|px| [px[2], px[1], px[0]])
            .collect(),
    }
}

pub struct Canvas {
    image: RgbImage,
}

impl Canvas {
    pub fn new(width: u32, height: u32, background: Rgb<u8>) -> Self {
        Self {
            image: RgbImage::from_pixel(width, height, background),
        }
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    #[cfg(test)]
    pub fn pixel(&self, x: u32, y: u32) -> Rgb<u8> {
        *self.image.get_pixel(x, y)
    }

    #[cfg(test)]
    pub fn image(&self) -> &RgbImage {
        &self.image
    }

    /// Blend `color` over the pixel at (x, y) with the given coverage.
    /// Writes outside the canvas are dropped.
    pub fn blend(&mut self, x: i32, y: i32, color: Rgb<u8>, coverage: f32) {
        if x < 0 || y < 0 || x >= self.width() as i32 || y >= self.height() as i32 {
            return;
        }
        let coverage = coverage.clamp(0.0, 1.0);
        if coverage == 0.0 {
            return;
        }
        let dst = self.image.get_pixel_mut(x as u32, y as u32);
        for c in 0..3 {
            let bg = dst.0[c] as f32;
            let fg = color.0[c] as f32;
            dst.0[c] = (bg + (fg - bg) * coverage).round() as u8;
        }
    }

    /// Headerless row-major pixel bytes, 3 per pixel.
    pub fn to_raw(&self, order: ChannelOrder) -> Vec<u8> {
        reorder_rgb(self.image.as_raw(), order)
    }

    pub fn save_png(&self, path: &Path) -> Result<()> {
        self.image
            .save_with_format(path, ImageFormat::Png)
            .map_err(|e| StimError::image(path, e))
    }

    pub fn scaled_target(&mut self, origin: (i32, i32), scale: u32) -> ScaledTarget<'_> {
        ScaledTarget {
            canvas: self,
            origin,
            scale: scale.max(1),
        }
    }
}

/// Draw target that blows every pixel up to a `scale` x `scale` block,
/// offset by `origin`. Used to render bitmap fonts at larger sizes.
pub struct ScaledTarget<'a> {
    canvas: &'a mut Canvas,
    origin: (i32, i32),
    scale: u32,
}

impl DrawTarget for ScaledTarget<'_> {
    type Color = Rgb888;
    type Error = core::convert::Infallible;

    fn draw_iter<I>(&mut self, pixels: I) -> core::result::Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Self::Color>>,
    {
        let scale = self.scale as i32;
        for Pixel(Point { x, y }, color) in pixels {
            let color = Rgb([color.r(), color.g(), color.b()]);
            let left = self.origin.0 + x * scale;
            let top = self.origin.1 + y * scale;
            for dy in 0..scale {
                for dx in 0..scale {
                    self.canvas.blend(left + dx, top + dy, color, 1.0);
                }
            }
        }
        Ok(())
    }
}

impl OriginDimensions for ScaledTarget<'_> {
    fn size(&self) -> Size {
        Size::new(
            self.canvas.width() / self.scale,
            self.canvas.height() / self.scale,
        )
    }
}
