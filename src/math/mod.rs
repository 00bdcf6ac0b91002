mod point;
mod rect;
mod size;

pub use self::{point::*, rect::*, size::*};

/// Snaps imprecise coordinates to whole pixels. Rounds half-way values away
/// from zero, so `0.5` becomes `1.0` and `-0.5` becomes `-1.0`.
pub trait PixelAlignment {
    /// Returns `self` rounded to the nearest whole pixel.
    #[must_use]
    fn pixel_aligned(self) -> Self;
}

impl PixelAlignment for f32 {
    fn pixel_aligned(self) -> Self {
        self.round()
    }
}

impl PixelAlignment for Point<f32> {
    fn pixel_aligned(self) -> Self {
        Self::new(self.x.pixel_aligned(), self.y.pixel_aligned())
    }
}

impl PixelAlignment for Rect<f32> {
    fn pixel_aligned(self) -> Self {
        Self::new(
            Point::new(self.x1().pixel_aligned(), self.y1().pixel_aligned()),
            Point::new(self.x2().pixel_aligned(), self.y2().pixel_aligned()),
        )
    }
}
