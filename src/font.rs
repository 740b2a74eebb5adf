use std::path::{Path, PathBuf};

use ab_glyph::{point, Font, FontVec, PxScale, ScaleFont};
use embedded_graphics::mono_font::{ascii::FONT_10X20, MonoTextStyle};
use embedded_graphics::pixelcolor::Rgb888;
use embedded_graphics::prelude::*;
use embedded_graphics::text::{Baseline, Text};
use image::Rgb;
use tracing::debug;

use crate::canvas::Canvas;
use crate::error::{Result, StimError};
use crate::frame::{TextSize, LARGE_FONT_SIZE, SMALL_FONT_SIZE};

/// Em height of the built-in bitmap font, in pixels.
const BUILTIN_EM: f32 = 20.0;

#[derive(Debug, Clone)]
pub enum FontSource {
    TrueType(PathBuf),
    Builtin,
}

/// A font at one size that can put text on a canvas.
pub enum GlyphSet {
    TrueType { font: FontVec, scale: PxScale },
    Builtin { scale: u32 },
}

impl GlyphSet {
    /// Load a TrueType/OpenType font. `size` is the em size in pixels.
    pub fn load_truetype(path: &Path, size: f32) -> Result<Self> {
        let data = std::fs::read(path).map_err(|source| StimError::FontRead {
            path: path.to_path_buf(),
            source,
        })?;
        let font =
            FontVec::try_from_vec(data).map_err(|_| StimError::InvalidFont(path.to_path_buf()))?;
        let units_per_em = font.units_per_em().unwrap_or(1000.0);
        let scale = PxScale::from(size * font.height_unscaled() / units_per_em);
        debug!("Loaded {} at {}px (scale {})", path.display(), size, scale.y);
        Ok(GlyphSet::TrueType { font, scale })
    }

    /// The 10x20 bitmap font, magnified by the integer factor closest to `size`.
    pub fn builtin(size: f32) -> Self {
        let scale = (size / BUILTIN_EM).round().max(1.0) as u32;
        GlyphSet::Builtin { scale }
    }

    /// Draw `text` with its top-left corner at `origin`.
    pub fn draw_text(&self, canvas: &mut Canvas, origin: (i32, i32), text: &str, color: Rgb<u8>) {
        match self {
            GlyphSet::TrueType { font, scale } => {
                draw_truetype(font, *scale, canvas, origin, text, color)
            }
            GlyphSet::Builtin { scale } => {
                let [r, g, b] = color.0;
                let style = MonoTextStyle::new(&FONT_10X20, Rgb888::new(r, g, b));
                let mut target = canvas.scaled_target(origin, *scale);
                Text::with_baseline(text, Point::zero(), style, Baseline::Top)
                    .draw(&mut target)
                    .ok();
            }
        }
    }
}

fn draw_truetype(
    font: &FontVec,
    scale: PxScale,
    canvas: &mut Canvas,
    origin: (i32, i32),
    text: &str,
    color: Rgb<u8>,
) {
    let scaled = font.as_scaled(scale);
    let mut caret = point(origin.0 as f32, origin.1 as f32 + scaled.ascent());
    let mut previous = None;

    for c in text.chars() {
        let mut glyph = scaled.scaled_glyph(c);
        if let Some(previous) = previous {
            caret.x += scaled.kern(previous, glyph.id);
        }
        glyph.position = caret;
        caret.x += scaled.h_advance(glyph.id);
        previous = Some(glyph.id);

        if let Some(outlined) = font.outline_glyph(glyph) {
            let bounds = outlined.px_bounds();
            outlined.draw(|x, y, coverage| {
                canvas.blend(
                    bounds.min.x as i32 + x as i32,
                    bounds.min.y as i32 + y as i32,
                    color,
                    coverage,
                );
            });
        }
    }
}

/// Large and small glyph sets, loaded once per run.
pub struct FontSet {
    pub large: GlyphSet,
    pub small: GlyphSet,
}

impl FontSet {
    pub fn load(source: &FontSource) -> Result<Self> {
        match source {
            FontSource::TrueType(path) => Ok(FontSet {
                large: GlyphSet::load_truetype(path, LARGE_FONT_SIZE)?,
                small: GlyphSet::load_truetype(path, SMALL_FONT_SIZE)?,
            }),
            FontSource::Builtin => Ok(FontSet {
                large: GlyphSet::builtin(LARGE_FONT_SIZE),
                small: GlyphSet::builtin(SMALL_FONT_SIZE),
            }),
        }
    }

    pub fn get(&self, size: TextSize) -> &GlyphSet {
        match size {
            TextSize::Large => &self.large,
            TextSize::Small => &self.small,
        }
    }
}
