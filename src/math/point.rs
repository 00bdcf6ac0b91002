#[cfg(feature = "serialization")]
use serde::{Deserialize, Serialize};

use crate::math::Size;

/// An x and y coordinate.
#[derive(Copy, Clone, Default, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serialization", derive(Serialize, Deserialize))]
pub struct Point<S = f32> {
    /// The horizontal component.
    pub x: S,
    /// The vertical component.
    pub y: S,
}

impl<S> Point<S> {
    /// Returns a new point.
    pub const fn new(x: S, y: S) -> Self {
        Self { x, y }
    }
}

impl Point<u32> {
    /// Converts this point to floating point components.
    #[must_use]
    pub fn to_f32(self) -> Point<f32> {
        Point::new(self.x as f32, self.y as f32)
    }
}

impl<S> std::ops::Add for Point<S>
where
    S: std::ops::Add<Output = S>,
{
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl<S> std::ops::Sub for Point<S>
where
    S: std::ops::Sub<Output = S>,
{
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        Self::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl<S> std::ops::Add<Size<S>> for Point<S>
where
    S: std::ops::Add<Output = S>,
{
    type Output = Self;

    fn add(self, rhs: Size<S>) -> Self {
        Self::new(self.x + rhs.width, self.y + rhs.height)
    }
}

impl std::ops::Mul<f32> for Point<f32> {
    type Output = Self;

    fn mul(self, rhs: f32) -> Self {
        Self::new(self.x * rhs, self.y * rhs)
    }
}
