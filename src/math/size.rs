#[cfg(feature = "serialization")]
use serde::{Deserialize, Serialize};

/// A width and height.
#[derive(Copy, Clone, Default, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serialization", derive(Serialize, Deserialize))]
pub struct Size<S = f32> {
    /// The horizontal measurement.
    pub width: S,
    /// The vertical measurement.
    pub height: S,
}

impl<S> Size<S> {
    /// Returns a new size.
    pub const fn new(width: S, height: S) -> Self {
        Self { width, height }
    }

    /// Returns `width * height`.
    pub fn area(&self) -> S
    where
        S: std::ops::Mul<Output = S> + Copy,
    {
        self.width * self.height
    }
}

impl Size<u32> {
    /// Converts this size to floating point components.
    #[must_use]
    pub fn to_f32(self) -> Size<f32> {
        Size::new(self.width as f32, self.height as f32)
    }

    /// Returns true if either dimension is zero.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }
}

impl From<Size<u32>> for Size<f32> {
    fn from(value: Size<u32>) -> Self {
        value.to_f32()
    }
}

impl std::ops::Mul<f32> for Size<f32> {
    type Output = Self;

    fn mul(self, rhs: f32) -> Self {
        Self::new(self.width * rhs, self.height * rhs)
    }
}
