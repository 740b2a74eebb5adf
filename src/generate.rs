use std::path::PathBuf;

use indicatif::{ParallelProgressIterator, ProgressBar};
use rayon::prelude::*;
use tracing::{debug, info, instrument};

use crate::canvas::{Canvas, ChannelOrder};
use crate::error::{Result, StimError};
use crate::export::{verify_frame, write_frame, FrameOutput};
use crate::font::FontSet;
use crate::frame::{Frame, BACKGROUND, FRAME_COUNT, HEIGHT, MAX_FRAMES, TEXT_COLOR, WIDTH};

#[derive(Debug, Clone)]
pub struct GenerateConfig {
    pub output_dir: PathBuf,
    pub frames: u32,
    pub channel_order: ChannelOrder,
}

impl Default for GenerateConfig {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("."),
            frames: FRAME_COUNT,
            channel_order: ChannelOrder::Rgb,
        }
    }
}

pub fn render_frame(frame: &Frame, fonts: &FontSet) -> Canvas {
    let mut canvas = Canvas::new(WIDTH, HEIGHT, BACKGROUND);
    for item in frame.layout() {
        fonts
            .get(item.size)
            .draw_text(&mut canvas, item.origin, &item.text, TEXT_COLOR);
    }
    canvas
}

/// Render and write every frame. Stops at the first failure; files already
/// written stay on disk.
#[instrument(skip_all, fields(frames = config.frames, dir = %config.output_dir.display()))]
pub fn generate_all(
    config: &GenerateConfig,
    fonts: &FontSet,
    pb: &ProgressBar,
) -> Result<Vec<FrameOutput>> {
    if config.frames == 0 || config.frames > MAX_FRAMES {
        return Err(StimError::FrameCount(config.frames));
    }
    std::fs::create_dir_all(&config.output_dir)
        .map_err(|e| StimError::io(&config.output_dir, e))?;

    info!("Generating {} frames", config.frames);

    let mut outputs = (0..config.frames)
        .into_par_iter()
        .progress_with(pb.clone())
        .map(|index| {
            let frame = Frame::new(index);
            let canvas = render_frame(&frame, fonts);
            write_frame(&canvas, &frame, &config.output_dir, config.channel_order)
        })
        .collect::<Result<Vec<_>>>()?;

    outputs.sort_by_key(|output| output.index);
    Ok(outputs)
}

#[instrument(skip_all, fields(frames = outputs.len()))]
pub fn verify_all(outputs: &[FrameOutput], order: ChannelOrder) -> Result<()> {
    outputs.par_iter().try_for_each(|output| {
        verify_frame(output, order)?;
        debug!("Verified frame {}", output.index);
        Ok(())
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::font::FontSource;
    use crate::frame::RAW_FRAME_LEN;
    use anyhow::Result;
    use tempfile::tempdir;

    fn builtin_fonts() -> FontSet {
        FontSet::load(&FontSource::Builtin).unwrap()
    }

    #[test]
    fn test_render_frame_background_and_text() {
        let canvas = render_frame(&Frame::new(0), &builtin_fonts());
        assert_eq!(canvas.width(), WIDTH);
        assert_eq!(canvas.height(), HEIGHT);
        assert_eq!(canvas.pixel(0, 0), BACKGROUND);
        assert_eq!(canvas.pixel(WIDTH - 1, HEIGHT - 1), BACKGROUND);

        let text_pixels = canvas
            .image()
            .pixels()
            .filter(|p| **p == TEXT_COLOR)
            .count();
        assert!(text_pixels > 0);
    }

    fn ink_bbox(canvas: &Canvas, rows: std::ops::Range<u32>) -> Option<(u32, u32, u32, u32)> {
        let image = canvas.image();
        let mut bbox: Option<(u32, u32, u32, u32)> = None;
        for y in rows {
            for x in 0..image.width() {
                if *image.get_pixel(x, y) == BACKGROUND {
                    continue;
                }
                bbox = Some(match bbox {
                    None => (x, y, x, y),
                    Some((x0, y0, x1, y1)) => (x0.min(x), y0.min(y), x1.max(x), y1.max(y)),
                });
            }
        }
        bbox
    }

    #[test]
    fn test_render_frame_truetype_layout() -> Result<()> {
        let font = std::path::Path::new(env!("CARGO_MANIFEST_DIR"))
            .join("tests/fonts/DejaVuSansMono.ttf");
        let fonts = FontSet::load(&FontSource::TrueType(font))?;
        let canvas = render_frame(&Frame::new(255), &fonts);
        assert_eq!(canvas.pixel(0, 0), BACKGROUND);

        // title: ascent 66.8px puts the baseline near y = 127, ascenders near 71
        let (left, top, right, bottom) = ink_bbox(&canvas, 0..250).expect("title not drawn");
        assert!(left >= 60, "title left = {}", left);
        assert!(right < WIDTH, "title right = {}", right);
        assert!((68..=76).contains(&top), "title top = {}", top);
        assert!((136..=146).contains(&bottom), "title bottom = {}", bottom);

        // labels: baseline near y = 322, digit tops near 305
        let (left, top, right, bottom) = ink_bbox(&canvas, 250..HEIGHT).expect("labels not drawn");
        assert!(left >= 10, "label left = {}", left);
        assert!(right < 970 + 116, "label right = {}", right);
        assert!((302..=307).contains(&top), "label top = {}", top);
        assert!((320..=323).contains(&bottom), "label bottom = {}", bottom);

        // one label per column
        for k in 0..4u32 {
            let column = 10 + k * 320;
            let inked = (300..330).any(|y| {
                (column..column + 116).any(|x| canvas.pixel(x, y) == TEXT_COLOR)
            });
            assert!(inked, "no label in column {}", k);
        }
        Ok(())
    }

    #[test]
    fn test_render_frame_differs_by_index() {
        let fonts = builtin_fonts();
        let a = render_frame(&Frame::new(1), &fonts);
        let b = render_frame(&Frame::new(2), &fonts);
        assert_ne!(a.image().as_raw(), b.image().as_raw());
    }

    #[test]
    fn test_generate_rejects_zero_frames() {
        let dir = tempdir().unwrap();
        let config = GenerateConfig {
            output_dir: dir.path().to_path_buf(),
            frames: 0,
            ..Default::default()
        };
        let result = generate_all(&config, &builtin_fonts(), &ProgressBar::hidden());
        assert!(matches!(result, Err(StimError::FrameCount(0))));
    }

    #[test]
    fn test_generate_creates_output_dir() -> Result<()> {
        let dir = tempdir()?;
        let config = GenerateConfig {
            output_dir: dir.path().join("nested").join("out"),
            frames: 3,
            channel_order: ChannelOrder::Bgr,
        };
        let outputs = generate_all(&config, &builtin_fonts(), &ProgressBar::hidden())?;
        assert_eq!(
            outputs.iter().map(|o| o.index).collect::<Vec<_>>(),
            vec![0, 1, 2]
        );
        verify_all(&outputs, ChannelOrder::Bgr)?;
        Ok(())
    }

    #[test]
    fn test_generate_full_run() -> Result<()> {
        let dir = tempdir()?;
        let config = GenerateConfig {
            output_dir: dir.path().to_path_buf(),
            ..Default::default()
        };
        let outputs = generate_all(&config, &builtin_fonts(), &ProgressBar::hidden())?;
        assert_eq!(outputs.len(), FRAME_COUNT as usize);

        let files = std::fs::read_dir(dir.path())?.count();
        assert_eq!(files, 512);

        for (i, output) in outputs.iter().enumerate() {
            assert_eq!(output.index as usize, i);
            assert_eq!(std::fs::metadata(&output.raw)?.len(), RAW_FRAME_LEN as u64);
        }
        verify_all(&outputs, ChannelOrder::Rgb)?;

        let first_raw = dir.path().join("stim_img_00000000.raw");
        assert_eq!(std::fs::metadata(&first_raw)?.len(), 2_764_800);

        let last = image::open(dir.path().join("stim_img_00000255.png"))?;
        assert_eq!(last.color(), image::ColorType::Rgb8);
        let last = last.to_rgb8();
        assert_eq!(last.dimensions(), (1280, 720));
        assert_eq!(*last.get_pixel(0, 0), BACKGROUND);
        Ok(())
    }
}
