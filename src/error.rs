use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum StimError {
    #[error("failed to read font file {path}")]
    FontRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("font file {0} is not a valid TrueType/OpenType font")]
    InvalidFont(PathBuf),

    #[error("I/O error on {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("image error on {path}")]
    Image {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("raw dump {path} has {actual} bytes, expected {expected}")]
    RawSize {
        path: PathBuf,
        expected: usize,
        actual: usize,
    },

    #[error("image {path} is {width}x{height}, expected {expected_width}x{expected_height}")]
    Dimensions {
        path: PathBuf,
        width: u32,
        height: u32,
        expected_width: u32,
        expected_height: u32,
    },

    #[error("raw dump {raw} differs from {png} at byte {offset}")]
    PixelMismatch {
        png: PathBuf,
        raw: PathBuf,
        offset: usize,
    },

    #[error("frame count {0} out of range (1..={max})", max = crate::frame::MAX_FRAMES)]
    FrameCount(u32),

    #[error("failed to serialize manifest")]
    Manifest(#[from] serde_json::Error),
}

impl StimError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        StimError::Io {
            path: path.into(),
            source,
        }
    }

    pub fn image(path: impl Into<PathBuf>, source: image::ImageError) -> Self {
        StimError::Image {
            path: path.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, StimError>;
