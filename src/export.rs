use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::canvas::{reorder_rgb, Canvas, ChannelOrder};
use crate::error::{Result, StimError};
use crate::frame::{Frame, HEIGHT, RAW_FRAME_LEN, WIDTH};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrameOutput {
    pub index: u32,
    pub png: PathBuf,
    pub raw: PathBuf,
    pub raw_len: usize,
}

/// Write both artifacts of a frame into `out_dir`.
pub fn write_frame(
    canvas: &Canvas,
    frame: &Frame,
    out_dir: &Path,
    order: ChannelOrder,
) -> Result<FrameOutput> {
    let png = out_dir.join(frame.png_name());
    let raw = out_dir.join(frame.raw_name());

    canvas.save_png(&png)?;

    let bytes = canvas.to_raw(order);
    std::fs::write(&raw, &bytes).map_err(|e| StimError::io(&raw, e))?;

    debug!("Wrote {} and {}", png.display(), raw.display());
    Ok(FrameOutput {
        index: frame.index,
        png,
        raw,
        raw_len: bytes.len(),
    })
}

/// Check that the raw dump is the PNG's pixel buffer, byte for byte.
pub fn verify_frame(output: &FrameOutput, order: ChannelOrder) -> Result<()> {
    let raw = std::fs::read(&output.raw).map_err(|e| StimError::io(&output.raw, e))?;
    if raw.len() != RAW_FRAME_LEN {
        return Err(StimError::RawSize {
            path: output.raw.clone(),
            expected: RAW_FRAME_LEN,
            actual: raw.len(),
        });
    }

    let decoded = image::open(&output.png)
        .map_err(|e| StimError::image(&output.png, e))?
        .to_rgb8();
    let (width, height) = decoded.dimensions();
    if (width, height) != (WIDTH, HEIGHT) {
        return Err(StimError::Dimensions {
            path: output.png.clone(),
            width,
            height,
            expected_width: WIDTH,
            expected_height: HEIGHT,
        });
    }

    let expected = reorder_rgb(decoded.as_raw(), order);
    if let Some(offset) = expected.iter().zip(raw.iter()).position(|(a, b)| a != b) {
        return Err(StimError::PixelMismatch {
            png: output.png.clone(),
            raw: output.raw.clone(),
            offset,
        });
    }
    Ok(())
}

pub fn write_manifest(path: &Path, outputs: &[FrameOutput]) -> Result<()> {
    let file = File::create(path).map_err(|e| StimError::io(path, e))?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, outputs)?;
    writer.flush().map_err(|e| StimError::io(path, e))?;
    Ok(())
}
