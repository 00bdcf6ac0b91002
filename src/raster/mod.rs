//! The interface to the glyph rasterizer.
//!
//! A [`Rasterizer`] opens font data into [`Face`]s. Faces report metrics in
//! pixels for the size most recently set with [`Face::set_char_size`], except
//! for [`Face::face_metrics`] which is in font units.

use std::{fmt::Debug, sync::Arc};

use crate::math::Size;

pub mod truetype;

/// How glyph coverage is produced.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum AntiAliasing {
    /// 8-bit grayscale coverage.
    Normal,
    /// 1-bit coverage.
    Mono,
}

impl AntiAliasing {
    /// Returns `Normal` when `enabled`, otherwise `Mono`.
    #[must_use]
    pub const fn from_enabled(enabled: bool) -> Self {
        if enabled {
            Self::Normal
        } else {
            Self::Mono
        }
    }
}

/// The layout of a [`GlyphBitmap`]'s buffer.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum PixelMode {
    /// One byte of coverage per pixel.
    Gray,
    /// One bit per pixel, most significant bit first.
    Mono,
}

/// A rendered glyph's coverage.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct GlyphBitmap {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub rows: u32,
    /// Bytes per row.
    pub pitch: usize,
    /// The buffer layout, or `None` for an empty bitmap.
    pub pixel_mode: Option<PixelMode>,
    /// `rows * pitch` bytes of coverage.
    pub buffer: Vec<u8>,
}

impl GlyphBitmap {
    /// Returns the coverage of the pixel at `x`, `y`. Mono bitmaps are
    /// either fully covered or empty.
    #[must_use]
    pub fn coverage(&self, x: u32, y: u32) -> u8 {
        let row = y as usize * self.pitch;
        match self.pixel_mode {
            Some(PixelMode::Gray) => self.buffer[row + x as usize],
            Some(PixelMode::Mono) => {
                if self.buffer[row + x as usize / 8] & (0x80 >> (x & 7)) != 0 {
                    0xFF
                } else {
                    0
                }
            }
            None => 0,
        }
    }
}

/// Metrics of a single glyph, in pixels.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct GlyphMetrics {
    /// The horizontal distance to the next glyph's origin.
    pub advance: f32,
    /// The bounding box width.
    pub width: f32,
    /// The bounding box height.
    pub height: f32,
    /// Distance from the origin to the left edge of the bounding box.
    pub bearing_x: f32,
    /// Distance from the baseline up to the top of the bounding box.
    pub bearing_y: f32,
}

/// A glyph rendered by [`Face::render_glyph`].
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RenderedGlyph {
    /// The glyph's metrics.
    pub metrics: GlyphMetrics,
    /// The glyph's coverage.
    pub bitmap: GlyphBitmap,
}

/// Global face metrics, in font units.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct FaceMetrics {
    /// Distance from the baseline to the top of the tallest glyphs.
    pub ascender: f32,
    /// Distance from the baseline to the bottom of the lowest glyphs.
    /// Usually negative.
    pub descender: f32,
    /// Baseline to baseline distance.
    pub height: f32,
    /// Font units per em square.
    pub units_per_em: f32,
}

/// Metrics for the current size, in pixels.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct SizeMetrics {
    /// Horizontal pixels per em.
    pub x_ppem: f32,
    /// Vertical pixels per em.
    pub y_ppem: f32,
    /// Pixels per horizontal font unit.
    pub x_scale: f32,
    /// Pixels per vertical font unit.
    pub y_scale: f32,
    /// Scaled ascender.
    pub ascender: f32,
    /// Scaled descender.
    pub descender: f32,
    /// Scaled line height.
    pub height: f32,
}

/// Opens font data.
pub trait Rasterizer: Debug + Send + Sync {
    /// Opens `data` as a face. The data is kept alive by the face.
    fn new_face(&self, data: Arc<[u8]>) -> crate::Result<Box<dyn Face>>;
}

/// An opened font face.
pub trait Face: Debug + Send + Sync {
    /// Returns true if the face maps unicode codepoints to glyphs.
    fn has_unicode_charmap(&self) -> bool;

    /// Returns true if the face can be rendered at any size.
    fn is_scalable(&self) -> bool;

    /// The sizes, in points at 72 dpi, of the face's bitmap strikes.
    fn fixed_sizes(&self) -> Vec<f32>;

    /// Selects the size glyphs are measured and rendered at.
    fn set_char_size(&mut self, point_size: Size<f32>, dpi: Size<u32>) -> crate::Result<()>;

    /// Global metrics in font units.
    fn face_metrics(&self) -> FaceMetrics;

    /// Metrics for the current size.
    fn size_metrics(&self) -> SizeMetrics;

    /// Every codepoint the unicode charmap covers, in ascending order.
    fn codepoints(&self) -> Vec<u32>;

    /// Measures the glyph for `codepoint` without rendering it.
    fn glyph_metrics(&self, codepoint: u32) -> crate::Result<GlyphMetrics>;

    /// Renders the glyph for `codepoint`.
    fn render_glyph(&self, codepoint: u32, mode: AntiAliasing) -> crate::Result<RenderedGlyph>;
}
