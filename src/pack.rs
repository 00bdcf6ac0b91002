//! Row-based placement of glyph bitmaps into square texture pages.
//!
//! Glyphs are laid out left to right in rows. When a glyph no longer fits on
//! the current row, a new row starts below the tallest glyph placed so far.
//! Every glyph is surrounded by [`INTER_GLYPH_PAD_SPACE`] pixels so that
//! filtering never samples a neighbor.
//!
//! [`estimate_page_size`] runs the exact same placement as
//! [`GlyphPacker::allocate`], so a page sized by the estimate is guaranteed to
//! hold every glyph that was measured.

use crate::math::{Point, Size};

/// The empty space kept between glyphs and around the page edges.
pub const INTER_GLYPH_PAD_SPACE: u32 = 2;

/// The smallest page edge length that will be estimated.
pub const MINIMUM_PAGE_SIZE: u32 = 32;

/// Places rectangles on a page of a fixed size.
#[derive(Debug, Clone)]
pub struct GlyphPacker {
    size: Size<u32>,
    x: u32,
    y: u32,
    line_bottom: u32,
}

impl GlyphPacker {
    /// Returns a packer for an empty page of `size`.
    #[must_use]
    pub const fn new(size: Size<u32>) -> Self {
        Self {
            size,
            x: INTER_GLYPH_PAD_SPACE,
            y: INTER_GLYPH_PAD_SPACE,
            line_bottom: INTER_GLYPH_PAD_SPACE,
        }
    }

    /// The size of the page being packed.
    #[must_use]
    pub const fn size(&self) -> Size<u32> {
        self.size
    }

    /// Reserves space for `area`, returning its top-left corner. Returns
    /// `None` without modifying the packer if the page is full.
    pub fn allocate(&mut self, area: Size<u32>) -> Option<Point<u32>> {
        let width = area.width.checked_add(INTER_GLYPH_PAD_SPACE)?;
        let height = area.height.checked_add(INTER_GLYPH_PAD_SPACE)?;

        let (mut x, mut y) = (self.x, self.y);
        let mut right = x.checked_add(width)?;
        if right > self.size.width {
            // Start a new row.
            x = INTER_GLYPH_PAD_SPACE;
            y = self.line_bottom;
            right = x.checked_add(width)?;
            if right > self.size.width {
                return None;
            }
        }

        let bottom = y.checked_add(height)?;
        if bottom > self.size.height {
            return None;
        }

        self.x = right;
        self.y = y;
        self.line_bottom = self.line_bottom.max(bottom);
        Some(Point::new(x, y))
    }

    /// Returns true if nothing has been allocated yet.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.line_bottom == INTER_GLYPH_PAD_SPACE
            && self.x == INTER_GLYPH_PAD_SPACE
            && self.y == INTER_GLYPH_PAD_SPACE
    }
}

/// Returns the smallest power of two page edge length, starting at
/// [`MINIMUM_PAGE_SIZE`], that holds every size in `sizes`. If no size up to
/// `maximum` is large enough, `maximum` is returned and the caller places
/// what fits.
#[must_use]
pub fn estimate_page_size<I>(sizes: I, maximum: u32) -> u32
where
    I: IntoIterator<Item = Size<u32>>,
    I::IntoIter: Clone,
{
    let sizes = sizes.into_iter();
    let mut page_size = MINIMUM_PAGE_SIZE;
    while page_size < maximum {
        let mut packer = GlyphPacker::new(Size::new(page_size, page_size));
        if sizes.clone().all(|size| packer.allocate(size).is_some()) {
            return page_size;
        }
        page_size = match page_size.checked_mul(2) {
            Some(next) => next,
            None => break,
        };
    }
    maximum
}
