//! Text rasterizer: word-wraps plain text and draws it onto a JPEG canvas.
//!
//! Glyphs come from the built-in 8x8 bitmap font, so output is identical for
//! identical input and settings on every machine.

use font8x8::{
    UnicodeFonts, BASIC_FONTS, BLOCK_FONTS, BOX_FONTS, GREEK_FONTS, LATIN_FONTS, MISC_FONTS,
};
use image::codecs::jpeg::JpegEncoder;
use image::{Rgb, RgbImage};

use crate::error::CoreError;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// MIME type of the encoded output.
pub const CONTENT_TYPE: &str = "image/jpeg";

/// Side length of a bitmap glyph in pixels, before scaling.
pub const GLYPH_SIZE: u32 = 8;

/// Largest width or height a baseline JPEG can carry.
pub const MAX_IMAGE_DIMENSION: u32 = 65_535;

pub const DEFAULT_WIDTH: u32 = 800;
pub const DEFAULT_PADDING: u32 = 20;
pub const DEFAULT_COLUMNS: usize = 80;
pub const DEFAULT_LINE_SPACING: u32 = 3;
pub const DEFAULT_JPEG_QUALITY: u8 = 90;

const WHITE: Rgb<u8> = Rgb([255, 255, 255]);
const BLACK: Rgb<u8> = Rgb([0, 0, 0]);

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Immutable rasterizer configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderSettings {
    /// Canvas width in pixels.
    pub width: u32,
    /// Blank margin on every side, in pixels.
    pub padding: u32,
    /// Soft wrap width in characters.
    pub columns: usize,
    /// Integer upscale applied to each glyph.
    pub glyph_scale: u32,
    /// Extra pixels between consecutive lines.
    pub line_spacing: u32,
    /// JPEG quality, 1-100.
    pub jpeg_quality: u8,
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self {
            width: DEFAULT_WIDTH,
            padding: DEFAULT_PADDING,
            columns: DEFAULT_COLUMNS,
            glyph_scale: 1,
            line_spacing: DEFAULT_LINE_SPACING,
            jpeg_quality: DEFAULT_JPEG_QUALITY,
        }
    }
}

impl RenderSettings {
    /// Pixel height occupied by one line of text.
    pub fn line_height(&self) -> u32 {
        GLYPH_SIZE * self.glyph_scale.max(1) + self.line_spacing
    }

    /// Canvas height for `lines` lines of text.
    pub fn canvas_height(&self, lines: usize) -> u32 {
        2 * self.padding + lines as u32 * self.line_height()
    }

    /// Most lines that fit under the JPEG dimension limit (never below one).
    pub fn max_lines(&self) -> usize {
        let usable = MAX_IMAGE_DIMENSION.saturating_sub(2 * self.padding);
        ((usable / self.line_height()) as usize).max(1)
    }
}

/// An encoded image plus the layout facts callers may want to log.
#[derive(Debug, Clone)]
pub struct RenderedImage {
    pub width: u32,
    pub height: u32,
    /// Number of text lines drawn.
    pub lines: usize,
    /// Whether lines were dropped to stay within [`MAX_IMAGE_DIMENSION`].
    pub truncated: bool,
    /// JPEG-encoded canvas.
    pub bytes: Vec<u8>,
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Word-wrap `text` to `columns` characters, breaking only at whitespace.
///
/// Source line breaks are kept rather than folded into the paragraph, so
/// greetings, signatures and quoted replies keep their shape. Whitespace runs
/// inside a line collapse to a single space, and trailing whitespace of the
/// whole text is ignored. A word
/// longer than `columns` is placed alone on its line without being split.
/// Always returns at least one line.
pub fn wrap_text(text: &str, columns: usize) -> Vec<String> {
    let columns = columns.max(1);
    let mut lines = Vec::new();

    for source in text.trim_end().split('\n') {
        let mut current = String::new();
        let mut current_len = 0usize;

        for word in source.split_whitespace() {
            let word_len = word.chars().count();
            if current_len == 0 {
                current.push_str(word);
                current_len = word_len;
            } else if current_len + 1 + word_len <= columns {
                current.push(' ');
                current.push_str(word);
                current_len += 1 + word_len;
            } else {
                lines.push(std::mem::take(&mut current));
                current.push_str(word);
                current_len = word_len;
            }
        }
        lines.push(current);
    }

    lines
}

/// Rasterize `text` to a JPEG.
///
/// Height is `2 * padding + lines * line_height`; width is fixed by the
/// settings. Text that would exceed [`MAX_IMAGE_DIMENSION`] is cut at the
/// last line that fits and flagged as truncated.
pub fn render(text: &str, settings: &RenderSettings) -> Result<RenderedImage, CoreError> {
    let mut lines = wrap_text(text, settings.columns);
    let truncated = lines.len() > settings.max_lines();
    lines.truncate(settings.max_lines());

    let height = settings.canvas_height(lines.len());
    let line_height = settings.line_height();
    let mut canvas = RgbImage::from_pixel(settings.width, height, WHITE);

    for (row, line) in lines.iter().enumerate() {
        let y = settings.padding + row as u32 * line_height;
        draw_line(&mut canvas, line, settings.padding, y, settings.glyph_scale.max(1));
    }

    let mut bytes = Vec::new();
    JpegEncoder::new_with_quality(&mut bytes, settings.jpeg_quality)
        .encode_image(&canvas)
        .map_err(|e| CoreError::Encode(e.to_string()))?;

    Ok(RenderedImage {
        width: settings.width,
        height,
        lines: lines.len(),
        truncated,
        bytes,
    })
}

// ---------------------------------------------------------------------------
// Drawing
// ---------------------------------------------------------------------------

/// Draw one line with its top-left corner at `(x0, y0)`, clipping at the
/// canvas edge.
fn draw_line(canvas: &mut RgbImage, line: &str, x0: u32, y0: u32, scale: u32) {
    let cell = GLYPH_SIZE * scale;
    let visible = (canvas.width().saturating_sub(x0) / cell + 1) as usize;

    for (col, c) in line.chars().take(visible).enumerate() {
        let x = x0 + col as u32 * cell;
        for (gy, &bits) in glyph(c).iter().enumerate() {
            for gx in 0..GLYPH_SIZE {
                if (bits >> gx) & 1 == 0 {
                    continue;
                }
                fill_block(canvas, x + gx * scale, y0 + gy as u32 * scale, scale);
            }
        }
    }
}

fn fill_block(canvas: &mut RgbImage, x: u32, y: u32, size: u32) {
    for py in y..y + size {
        for px in x..x + size {
            if px < canvas.width() && py < canvas.height() {
                canvas.put_pixel(px, py, BLACK);
            }
        }
    }
}

/// Bitmap for `c`; rows top to bottom, least significant bit leftmost.
fn glyph(c: char) -> [u8; 8] {
    if c.is_control() {
        return [0; 8];
    }
    BASIC_FONTS
        .get(c)
        .or_else(|| LATIN_FONTS.get(c))
        .or_else(|| GREEK_FONTS.get(c))
        .or_else(|| BOX_FONTS.get(c))
        .or_else(|| BLOCK_FONTS.get(c))
        .or_else(|| MISC_FONTS.get(c))
        .or_else(|| BASIC_FONTS.get('?'))
        .unwrap_or([0; 8])
}
