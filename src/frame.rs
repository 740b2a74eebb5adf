use image::Rgb;

pub const WIDTH: u32 = 1280;
pub const HEIGHT: u32 = 720;
pub const BACKGROUND: Rgb<u8> = Rgb([58, 110, 165]);
pub const TEXT_COLOR: Rgb<u8> = Rgb([255, 255, 0]);

/// Number of frames in one stimulus run.
pub const FRAME_COUNT: u32 = 256;

/// File names carry an 8 digit index, so this many frames at most.
pub const MAX_FRAMES: u32 = 100_000_000;

pub const LARGE_FONT_SIZE: f32 = 72.0;
pub const SMALL_FONT_SIZE: f32 = 24.0;

/// Size of one raw dump: row-major, 3 bytes per pixel, no header.
pub const RAW_FRAME_LEN: usize = WIDTH as usize * HEIGHT as usize * 3;

const LARGE_ORIGIN: (i32, i32) = (60, 60);
const SMALL_ROW_Y: i32 = 300;
const SMALL_COLUMNS: i32 = 4;
const SMALL_MARGIN_X: i32 = 10;

const FILE_PREFIX: &str = "stim_img_";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextSize {
    Large,
    Small,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextItem {
    pub size: TextSize,
    /// Top-left anchor of the text box.
    pub origin: (i32, i32),
    pub text: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Frame {
    pub index: u32,
}

impl Frame {
    pub fn new(index: u32) -> Self {
        Self { index }
    }

    pub fn label(&self) -> String {
        format!("{:08}", self.index)
    }

    pub fn title(&self) -> String {
        format!("Stimulus Image No. {:08}", self.index)
    }

    /// Text drawn on the frame: one large title and the bare index repeated
    /// in four columns.
    pub fn layout(&self) -> Vec<TextItem> {
        let mut items = Vec::with_capacity(1 + SMALL_COLUMNS as usize);
        items.push(TextItem {
            size: TextSize::Large,
            origin: LARGE_ORIGIN,
            text: self.title(),
        });
        let column_width = WIDTH as i32 / SMALL_COLUMNS;
        for k in 0..SMALL_COLUMNS {
            items.push(TextItem {
                size: TextSize::Small,
                origin: (SMALL_MARGIN_X + k * column_width, SMALL_ROW_Y),
                text: self.label(),
            });
        }
        items
    }

    pub fn png_name(&self) -> String {
        format!("{}{}.png", FILE_PREFIX, self.label())
    }

    pub fn raw_name(&self) -> String {
        format!("{}{}.raw", FILE_PREFIX, self.label())
    }
}
