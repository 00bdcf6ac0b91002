//! Fonts: glyph sources, metrics and text layout.
//!
//! A [`Font`] draws its glyphs either from pages rasterized on demand out of
//! an outline font ([`FreeTypeSource`]) or from images of a pre-rendered
//! atlas ([`PixmapSource`]). Fonts are usually owned by a [`FontManager`].

use std::{fmt::Display, str::FromStr};

#[cfg(feature = "serialization")]
use serde::{Deserialize, Serialize};

use crate::Error;

mod definition;
mod font;
mod freetype;
mod glyph;
mod layout;
mod manager;
mod pixmap;

pub use self::{
    definition::{FontDefinition, FontKind, MappingDefinition, DEFAULT_POINT_SIZE},
    font::{Font, FontVariant, GlyphSource, GLYPHS_PER_PAGE},
    freetype::{FreeTypeFontMut, FreeTypeSource},
    glyph::{FontGlyph, GlyphImage, GlyphMap},
    layout::WORD_DELIMITERS,
    manager::{DuplicatePolicy, FontContext, FontManager},
    pixmap::{HorizontalAdvance, PixmapFontMut, PixmapSource, SHARED_ATLAS_GROUP},
};

/// How text is positioned within its area.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
#[cfg_attr(feature = "serialization", derive(Serialize, Deserialize))]
pub enum TextFormatting {
    /// Each line starts at the left edge.
    LeftAligned,
    /// Each line ends at the right edge.
    RightAligned,
    /// Each line is centred horizontally.
    Centred,
    /// Spaces are stretched so each line fills the width.
    Justified,
    /// Wrapped at word boundaries, then left aligned.
    WordWrapLeftAligned,
    /// Wrapped at word boundaries, then right aligned.
    WordWrapRightAligned,
    /// Wrapped at word boundaries, then centred.
    WordWrapCentred,
    /// Wrapped at word boundaries, then justified. The last line of each
    /// paragraph is left aligned.
    WordWrapJustified,
}

impl TextFormatting {
    /// Returns true for the word wrapping variants.
    #[must_use]
    pub const fn is_word_wrapped(self) -> bool {
        matches!(
            self,
            Self::WordWrapLeftAligned
                | Self::WordWrapRightAligned
                | Self::WordWrapCentred
                | Self::WordWrapJustified
        )
    }

    /// Returns true for the justified variants.
    #[must_use]
    pub const fn is_justified(self) -> bool {
        matches!(self, Self::Justified | Self::WordWrapJustified)
    }

    /// Returns the alignment used for each line once text is wrapped.
    #[must_use]
    pub const fn unwrapped(self) -> Self {
        match self {
            Self::WordWrapLeftAligned => Self::LeftAligned,
            Self::WordWrapRightAligned => Self::RightAligned,
            Self::WordWrapCentred => Self::Centred,
            Self::WordWrapJustified => Self::Justified,
            other => other,
        }
    }
}

impl Default for TextFormatting {
    fn default() -> Self {
        Self::LeftAligned
    }
}

impl Display for TextFormatting {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::LeftAligned => "LeftAligned",
            Self::RightAligned => "RightAligned",
            Self::Centred => "Centred",
            Self::Justified => "Justified",
            Self::WordWrapLeftAligned => "WordWrapLeftAligned",
            Self::WordWrapRightAligned => "WordWrapRightAligned",
            Self::WordWrapCentred => "WordWrapCentred",
            Self::WordWrapJustified => "WordWrapJustified",
        })
    }
}

impl FromStr for TextFormatting {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "LeftAligned" => Ok(Self::LeftAligned),
            "RightAligned" => Ok(Self::RightAligned),
            "Centred" => Ok(Self::Centred),
            "Justified" => Ok(Self::Justified),
            "WordWrapLeftAligned" => Ok(Self::WordWrapLeftAligned),
            "WordWrapRightAligned" => Ok(Self::WordWrapRightAligned),
            "WordWrapCentred" => Ok(Self::WordWrapCentred),
            "WordWrapJustified" => Ok(Self::WordWrapJustified),
            other => Err(Error::InvalidRequest(format!(
                "unknown text formatting '{}'",
                other
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formatting_names() {
        for formatting in &[
            TextFormatting::LeftAligned,
            TextFormatting::Centred,
            TextFormatting::WordWrapJustified,
        ] {
            assert_eq!(
                formatting.to_string().parse::<TextFormatting>().unwrap(),
                *formatting
            );
        }
        assert!(matches!(
            "Diagonal".parse::<TextFormatting>(),
            Err(Error::InvalidRequest(_))
        ));
    }

    #[test]
    fn wrapped_formats_unwrap() {
        assert!(TextFormatting::WordWrapCentred.is_word_wrapped());
        assert!(!TextFormatting::Centred.is_word_wrapped());
        assert_eq!(
            TextFormatting::WordWrapRightAligned.unwrapped(),
            TextFormatting::RightAligned
        );
        assert!(TextFormatting::WordWrapJustified.is_justified());
        assert!(!TextFormatting::LeftAligned.is_justified());
    }
}
