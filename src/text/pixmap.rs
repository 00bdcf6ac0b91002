use std::str::FromStr;

#[cfg(feature = "serialization")]
use serde::{Deserialize, Serialize};

use crate::{
    atlas::{AtlasDefinition, AtlasRegistry, TextureAtlas},
    math::Size,
    text::{
        definition::MappingDefinition,
        font::FontCommon,
        glyph::{FontGlyph, GlyphImage},
    },
    Error,
};

/// The resource group naming a font whose atlas is already registered.
pub const SHARED_ATLAS_GROUP: &str = "*";

/// The horizontal advance of a mapped glyph.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serialization", derive(Serialize, Deserialize))]
pub enum HorizontalAdvance {
    /// Derived from the image: its width plus its horizontal offset.
    Auto,
    /// A fixed advance at native resolution.
    Fixed(f32),
}

impl HorizontalAdvance {
    /// Returns `Auto` for the conventional sentinel of `-1`.
    #[must_use]
    pub fn from_f32(advance: f32) -> Self {
        if (advance + 1.).abs() < f32::EPSILON {
            Self::Auto
        } else {
            Self::Fixed(advance)
        }
    }
}

impl Default for HorizontalAdvance {
    fn default() -> Self {
        Self::Auto
    }
}

/// Glyphs mapped onto images of a pre-rendered atlas.
#[derive(Debug)]
pub struct PixmapSource {
    atlas: TextureAtlas,
    owns_atlas: bool,
    image_name_prefix: String,
    ascender: f32,
    descender: f32,
    mapped_images: Vec<(u32, String)>,
}

impl PixmapSource {
    pub(crate) fn new(common: &FontCommon, atlases: &AtlasRegistry) -> crate::Result<Self> {
        let (atlas, owns_atlas) = Self::acquire_atlas(common, atlases)?;
        Ok(Self {
            image_name_prefix: atlas.name(),
            atlas,
            owns_atlas,
            ascender: 0.,
            descender: 0.,
            mapped_images: Vec::new(),
        })
    }

    fn acquire_atlas(
        common: &FontCommon,
        atlases: &AtlasRegistry,
    ) -> crate::Result<(TextureAtlas, bool)> {
        if common.resource_group == SHARED_ATLAS_GROUP {
            Ok((atlases.get(&common.filename)?, false))
        } else {
            let group = common.effective_resource_group();
            let raw = common.context.resources.load_raw_data(&common.filename, group)?;
            let raw = String::from_utf8(raw).map_err(|_| {
                Error::Definition(format!("'{}' is not valid utf-8", common.filename))
            })?;
            let definition = AtlasDefinition::parse(&raw)?;
            let atlas = definition.load(common.context.renderer.clone(), group)?;
            Ok((atlas, true))
        }
    }

    /// The atlas the glyph images are taken from.
    #[must_use]
    pub const fn atlas(&self) -> &TextureAtlas {
        &self.atlas
    }

    /// Returns true if the atlas was loaded by, and is released with, this
    /// font.
    #[must_use]
    pub const fn owns_atlas(&self) -> bool {
        self.owns_atlas
    }

    /// The name of the atlas glyph images are looked up in.
    #[must_use]
    pub fn image_name_prefix(&self) -> &str {
        &self.image_name_prefix
    }

    pub(crate) fn notify_display_size_changed(&self, size: Size<f32>) {
        if self.owns_atlas {
            self.atlas.notify_display_size_changed(size);
        }
    }

    pub(crate) fn update_font(&mut self, common: &mut FontCommon) {
        let horizontal = common.horizontal_factor();
        for glyph in common.glyphs.values_mut() {
            glyph.rescale(horizontal);
        }
        self.apply_vertical_metrics(common);

        // Shared atlases keep the scaling configured by whoever registered
        // them.
        if self.owns_atlas {
            self.atlas.set_native_resolution(common.native_resolution);
            self.atlas.set_auto_scaling_enabled(common.auto_scale);
        }
    }

    fn apply_vertical_metrics(&self, common: &mut FontCommon) {
        let vertical = common.vertical_factor();
        common.ascender = self.ascender * vertical;
        common.descender = self.descender * vertical;
        common.height = common.ascender - common.descender;
    }

    pub(crate) fn mappings(&self, common: &FontCommon) -> Vec<MappingDefinition> {
        self.mapped_images
            .iter()
            .filter_map(|(codepoint, image)| {
                common.glyphs.get(*codepoint).map(|glyph| MappingDefinition {
                    codepoint: *codepoint,
                    image: image.clone(),
                    advance: HorizontalAdvance::Fixed(glyph.unscaled_advance()),
                })
            })
            .collect()
    }

    fn release_atlas(&mut self) {
        if self.owns_atlas {
            self.atlas.unload();
        }
    }
}

impl Drop for PixmapSource {
    fn drop(&mut self) {
        self.release_atlas();
    }
}

/// Mutable access to a pixmap [`Font`](crate::text::Font).
#[derive(Debug)]
pub struct PixmapFontMut<'a> {
    pub(crate) common: &'a mut FontCommon,
    pub(crate) source: &'a mut PixmapSource,
}

impl<'a> PixmapFontMut<'a> {
    /// Maps `codepoint` to the atlas image named `image_name`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownObject`] if the atlas has no such image and
    /// [`Error::InvalidRequest`] if `codepoint` is already mapped.
    pub fn define_mapping(
        &mut self,
        codepoint: u32,
        image_name: &str,
        advance: HorizontalAdvance,
    ) -> crate::Result<()> {
        let image = self.source.atlas.image(image_name)?;
        if self.common.glyphs.contains(codepoint) {
            return Err(Error::InvalidRequest(format!(
                "codepoint {} is already mapped in font '{}'",
                codepoint, self.common.name
            )));
        }

        let source_rect = image.source_rect();
        let offset = image.offset();
        let unscaled_advance = match advance {
            HorizontalAdvance::Auto => (source_rect.size.width as f32 + offset.x).trunc(),
            HorizontalAdvance::Fixed(advance) => advance,
        };

        let top = offset.y;
        let bottom = source_rect.size.height as f32 + offset.y;
        if -top > self.source.ascender {
            self.source.ascender = -top;
        }
        if -bottom < self.source.descender {
            self.source.descender = -bottom;
        }
        self.source.apply_vertical_metrics(self.common);

        self.common.glyphs.insert(
            codepoint,
            FontGlyph::with_image(
                unscaled_advance,
                self.common.horizontal_factor(),
                GlyphImage::new(self.source.atlas.clone(), image_name),
            ),
        );
        self.common.max_codepoint = self.common.max_codepoint.max(codepoint);
        self.source
            .mapped_images
            .push((codepoint, image_name.to_owned()));
        tracing::trace!(font = %self.common.name, codepoint, image = image_name, "mapped glyph");
        Ok(())
    }

    /// Parses a mapping of the form `codepoint,advance,image` and defines
    /// it. An advance of `-1` derives the advance from the image.
    pub fn define_mapping_str(&mut self, mapping: &str) -> crate::Result<()> {
        let mut parts = mapping.splitn(3, ',');
        let codepoint = parts
            .next()
            .and_then(|part| u32::from_str(part.trim()).ok())
            .ok_or_else(|| {
                Error::InvalidRequest(format!(
                    "glyph mapping does not begin with a codepoint: {}",
                    mapping
                ))
            })?;
        let advance = parts
            .next()
            .and_then(|part| f32::from_str(part.trim()).ok())
            .ok_or_else(|| {
                Error::InvalidRequest(format!(
                    "glyph mapping lacks an advance: {}",
                    mapping
                ))
            })?;
        let image = parts
            .next()
            .map(str::trim)
            .filter(|image| !image.is_empty())
            .ok_or_else(|| {
                Error::InvalidRequest(format!("glyph mapping lacks an image: {}", mapping))
            })?;

        self.define_mapping(codepoint, image, HorizontalAdvance::from_f32(advance))
    }

    /// The atlas the glyph images are taken from.
    #[must_use]
    pub fn atlas(&self) -> &TextureAtlas {
        &self.source.atlas
    }

    /// Rebinds the font to the registered atlas named `name`. Existing
    /// mappings are discarded; an owned atlas is released.
    pub fn set_image_name_prefix(
        &mut self,
        atlases: &AtlasRegistry,
        name: &str,
    ) -> crate::Result<()> {
        let atlas = atlases.get(name)?;
        self.source.release_atlas();
        self.source.atlas = atlas;
        self.source.owns_atlas = false;
        self.source.image_name_prefix = name.to_owned();
        self.source.ascender = 0.;
        self.source.descender = 0.;
        self.source.mapped_images.clear();
        self.common.resource_group = SHARED_ATLAS_GROUP.to_owned();
        self.common.filename = name.to_owned();
        self.common.glyphs.clear();
        self.common.set_max_codepoint(0);
        self.source.update_font(self.common);
        Ok(())
    }
}
