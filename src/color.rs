use palette::Srgba;
#[cfg(feature = "serialization")]
use serde::{Deserialize, Serialize};

/// A RGBA color with f32 components.
#[derive(Clone, Debug, Copy, PartialEq)]
#[cfg_attr(feature = "serialization", derive(Serialize, Deserialize))]
pub struct Color {
    /// The red component, 0.0 to 1.0.
    pub red: f32,
    /// The green component, 0.0 to 1.0.
    pub green: f32,
    /// The blue component, 0.0 to 1.0.
    pub blue: f32,
    /// The alpha component, 0.0 to 1.0.
    pub alpha: f32,
}

impl Default for Color {
    fn default() -> Self {
        Self::WHITE
    }
}

impl From<Srgba> for Color {
    fn from(color: Srgba) -> Self {
        Self::new(color.color.red, color.color.green, color.color.blue, color.alpha)
    }
}

impl From<Color> for Srgba {
    fn from(color: Color) -> Self {
        Self::new(color.red, color.green, color.blue, color.alpha)
    }
}

impl Color {
    /// Opaque white. Glyph imagery is white, so this draws text unmodified.
    pub const WHITE: Self = Self::new(1., 1., 1., 1.);
    /// Opaque black.
    pub const BLACK: Self = Self::new(0., 0., 0., 1.);
    /// Fully transparent black.
    pub const CLEAR_BLACK: Self = Self::new(0., 0., 0., 0.);

    /// Returns a new color.
    #[must_use]
    pub const fn new(red: f32, green: f32, blue: f32, alpha: f32) -> Self {
        Self {
            red,
            green,
            blue,
            alpha,
        }
    }

    /// Returns the components as an array.
    #[must_use]
    pub const fn rgba(&self) -> [f32; 4] {
        [self.red, self.green, self.blue, self.alpha]
    }

    /// Linearly interpolates between `self` and `other`.
    #[must_use]
    pub fn lerp(&self, other: &Self, amount: f32) -> Self {
        Self::new(
            self.red + (other.red - self.red) * amount,
            self.green + (other.green - self.green) * amount,
            self.blue + (other.blue - self.blue) * amount,
            self.alpha + (other.alpha - self.alpha) * amount,
        )
    }
}

/// Colors for the four corners of a quad.
#[derive(Clone, Debug, Copy, PartialEq)]
#[cfg_attr(feature = "serialization", derive(Serialize, Deserialize))]
pub struct ColorRect {
    /// The color of the top-left corner.
    pub top_left: Color,
    /// The color of the top-right corner.
    pub top_right: Color,
    /// The color of the bottom-left corner.
    pub bottom_left: Color,
    /// The color of the bottom-right corner.
    pub bottom_right: Color,
}

impl Default for ColorRect {
    fn default() -> Self {
        Self::uniform(Color::WHITE)
    }
}

impl From<Color> for ColorRect {
    fn from(color: Color) -> Self {
        Self::uniform(color)
    }
}

impl ColorRect {
    /// Returns a rect with every corner set to `color`.
    #[must_use]
    pub const fn uniform(color: Color) -> Self {
        Self {
            top_left: color,
            top_right: color,
            bottom_left: color,
            bottom_right: color,
        }
    }

    /// Returns the bilinearly interpolated color at `x`, `y` where both are
    /// fractions of the quad's width and height.
    #[must_use]
    pub fn color_at(&self, x: f32, y: f32) -> Color {
        let top = self.top_left.lerp(&self.top_right, x);
        let bottom = self.bottom_left.lerp(&self.bottom_right, x);
        top.lerp(&bottom, y)
    }

    /// Returns the colors of a sub-area given as fractions of this quad.
    #[must_use]
    pub fn sub_rect(&self, left: f32, right: f32, top: f32, bottom: f32) -> Self {
        Self {
            top_left: self.color_at(left, top),
            top_right: self.color_at(right, top),
            bottom_left: self.color_at(left, bottom),
            bottom_right: self.color_at(right, bottom),
        }
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;

    #[test]
    fn sub_rect_interpolates_gradients() {
        let colors = ColorRect {
            top_left: Color::BLACK,
            top_right: Color::WHITE,
            bottom_left: Color::BLACK,
            bottom_right: Color::WHITE,
        };
        let half = colors.sub_rect(0.5, 1., 0., 1.);
        assert_relative_eq!(half.top_left.red, 0.5);
        assert_relative_eq!(half.top_right.red, 1.0);
        assert_relative_eq!(half.bottom_left.green, 0.5);
    }

    #[test]
    fn palette_round_trip() {
        let color = Color::new(0.25, 0.5, 0.75, 1.);
        let srgba: Srgba = color.into();
        assert_eq!(Color::from(srgba), color);
    }
}
