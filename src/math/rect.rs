#[cfg(feature = "serialization")]
use serde::{Deserialize, Serialize};

use crate::math::{Point, Size};

/// A rectangle described by its top-left origin and its size.
#[derive(Default, Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serialization", derive(Serialize, Deserialize))]
pub struct Rect<S = f32> {
    /// The top-left corner.
    pub origin: Point<S>,
    /// The width and height.
    pub size: Size<S>,
}

impl<S> Rect<S>
where
    S: std::ops::Sub<Output = S> + std::ops::Add<Output = S> + Copy + PartialOrd,
{
    /// Returns a rectangle at `origin` with `size`.
    pub fn sized(origin: impl Into<Point<S>>, size: impl Into<Size<S>>) -> Self {
        Self {
            origin: origin.into(),
            size: size.into(),
        }
    }

    /// Returns a rectangle spanning from `min` to `max`.
    pub fn new(min: impl Into<Point<S>>, max: impl Into<Point<S>>) -> Self {
        let min = min.into();
        let max = max.into();
        Self {
            origin: min,
            size: Size::new(max.x - min.x, max.y - min.y),
        }
    }

    /// The left edge.
    pub fn x1(&self) -> S {
        self.origin.x
    }

    /// The top edge.
    pub fn y1(&self) -> S {
        self.origin.y
    }

    /// The right edge.
    pub fn x2(&self) -> S {
        self.origin.x + self.size.width
    }

    /// The bottom edge.
    pub fn y2(&self) -> S {
        self.origin.y + self.size.height
    }

    /// The horizontal extent.
    pub fn width(&self) -> S {
        self.size.width
    }

    /// The vertical extent.
    pub fn height(&self) -> S {
        self.size.height
    }

    /// Returns true if `rect` lies entirely inside of this rectangle. The
    /// far edges of `rect` are never computed, so rectangles positioned near
    /// the limits of `S` cannot overflow.
    pub fn contains_rect(&self, rect: &Self) -> bool {
        rect.x1() >= self.x1()
            && rect.y1() >= self.y1()
            && rect.x1() <= self.x2()
            && rect.y1() <= self.y2()
            && rect.width() <= self.x2() - rect.x1()
            && rect.height() <= self.y2() - rect.y1()
    }

    /// Returns the overlapping area of both rectangles. When they do not
    /// overlap, the result has a zero width or height.
    pub fn intersection(&self, other: &Self) -> Self {
        let x1 = max_of(self.x1(), other.x1());
        let y1 = max_of(self.y1(), other.y1());
        let x2 = min_of(self.x2(), other.x2());
        let y2 = min_of(self.y2(), other.y2());
        if x1 < x2 && y1 < y2 {
            Self::new(Point::new(x1, y1), Point::new(x2, y2))
        } else {
            Self::new(Point::new(x1, y1), Point::new(x1, y1))
        }
    }

    /// Moves this rectangle by `offset`.
    pub fn translate(&self, offset: Point<S>) -> Self {
        Self {
            origin: self.origin + offset,
            size: self.size,
        }
    }
}

impl Rect<u32> {
    /// Converts this rectangle to floating point components.
    #[must_use]
    pub fn to_f32(self) -> Rect<f32> {
        Rect {
            origin: self.origin.to_f32(),
            size: self.size.to_f32(),
        }
    }
}

fn max_of<S: PartialOrd>(a: S, b: S) -> S {
    if a > b {
        a
    } else {
        b
    }
}

fn min_of<S: PartialOrd>(a: S, b: S) -> S {
    if a < b {
        a
    } else {
        b
    }
}
