use std::{
    collections::{btree_map, BTreeMap},
    ops::RangeBounds,
};

use crate::atlas::{Image, TextureAtlas};

/// A reference to the image of a glyph within an atlas.
#[derive(Clone, Debug)]
pub struct GlyphImage {
    atlas: TextureAtlas,
    name: String,
}

impl GlyphImage {
    /// Returns a reference to the image `name` in `atlas`.
    pub fn new(atlas: TextureAtlas, name: impl Into<String>) -> Self {
        Self {
            atlas,
            name: name.into(),
        }
    }

    /// The atlas holding the image.
    #[must_use]
    pub const fn atlas(&self) -> &TextureAtlas {
        &self.atlas
    }

    /// The name of the image within the atlas.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Looks up the image. Returns `None` if the atlas no longer defines it.
    #[must_use]
    pub fn resolve(&self) -> Option<Image> {
        self.atlas.image(&self.name).ok()
    }
}

/// Layout information for one codepoint.
#[derive(Clone, Debug)]
pub struct FontGlyph {
    advance: f32,
    unscaled_advance: f32,
    image: Option<GlyphImage>,
}

impl FontGlyph {
    /// Returns a glyph without an image, used until the glyph is rasterized.
    #[must_use]
    pub const fn new(advance: f32) -> Self {
        Self {
            advance,
            unscaled_advance: advance,
            image: None,
        }
    }

    /// Returns a glyph with an image and an advance given at native
    /// resolution, scaled by `scale`.
    #[must_use]
    pub fn with_image(unscaled_advance: f32, scale: f32, image: GlyphImage) -> Self {
        Self {
            advance: unscaled_advance * scale,
            unscaled_advance,
            image: Some(image),
        }
    }

    /// The pen movement after drawing this glyph, multiplied by `x_scale`.
    #[must_use]
    pub fn advance(&self, x_scale: f32) -> f32 {
        self.advance * x_scale
    }

    /// The advance at native resolution.
    #[must_use]
    pub const fn unscaled_advance(&self) -> f32 {
        self.unscaled_advance
    }

    pub(crate) fn rescale(&mut self, scale: f32) {
        self.advance = self.unscaled_advance * scale;
    }

    /// The glyph's image, if it has been rasterized.
    #[must_use]
    pub const fn image(&self) -> Option<&GlyphImage> {
        self.image.as_ref()
    }

    /// Returns true once the glyph has an image.
    #[must_use]
    pub const fn is_rasterized(&self) -> bool {
        self.image.is_some()
    }

    pub(crate) fn set_image(&mut self, image: GlyphImage) {
        self.image = Some(image);
    }
}

/// The glyphs of a font, ordered by codepoint.
#[derive(Clone, Debug, Default)]
pub struct GlyphMap {
    glyphs: BTreeMap<u32, FontGlyph>,
}

impl GlyphMap {
    /// Returns the glyph for `codepoint`.
    #[must_use]
    pub fn get(&self, codepoint: u32) -> Option<&FontGlyph> {
        self.glyphs.get(&codepoint)
    }

    /// Returns the glyph for `codepoint` for modification.
    pub fn get_mut(&mut self, codepoint: u32) -> Option<&mut FontGlyph> {
        self.glyphs.get_mut(&codepoint)
    }

    /// Returns true if `codepoint` has a glyph.
    #[must_use]
    pub fn contains(&self, codepoint: u32) -> bool {
        self.glyphs.contains_key(&codepoint)
    }

    /// Stores `glyph` for `codepoint`, returning the glyph it replaced.
    pub fn insert(&mut self, codepoint: u32, glyph: FontGlyph) -> Option<FontGlyph> {
        self.glyphs.insert(codepoint, glyph)
    }

    /// Removes every glyph.
    pub fn clear(&mut self) {
        self.glyphs.clear();
    }

    /// The number of glyphs.
    #[must_use]
    pub fn len(&self) -> usize {
        self.glyphs.len()
    }

    /// Returns true if there are no glyphs.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.glyphs.is_empty()
    }

    /// The largest codepoint with a glyph.
    #[must_use]
    pub fn last_codepoint(&self) -> Option<u32> {
        self.glyphs.keys().next_back().copied()
    }

    /// Iterates the glyphs in codepoint order.
    pub fn iter(&self) -> btree_map::Iter<'_, u32, FontGlyph> {
        self.glyphs.iter()
    }

    /// Iterates the glyphs whose codepoints are within `range`.
    pub fn range<R: RangeBounds<u32>>(&self, range: R) -> btree_map::Range<'_, u32, FontGlyph> {
        self.glyphs.range(range)
    }

    /// Iterates the glyphs for modification.
    pub fn values_mut(&mut self) -> btree_map::ValuesMut<'_, u32, FontGlyph> {
        self.glyphs.values_mut()
    }
}
