use std::{collections::HashSet, ops::RangeInclusive};

use crate::{
    atlas::{scale_between, AtlasRegistry},
    math::Size,
    text::{
        definition::{FontDefinition, FontKind},
        freetype::{FreeTypeFontMut, FreeTypeSource},
        glyph::{FontGlyph, GlyphMap},
        manager::FontContext,
        pixmap::{PixmapFontMut, PixmapSource},
    },
    Error,
};

/// Glyphs are rasterized in blocks of this many consecutive codepoints.
pub const GLYPHS_PER_PAGE: u32 = 256;

/// State shared by every kind of font.
#[derive(Debug)]
pub(crate) struct FontCommon {
    pub(crate) name: String,
    pub(crate) filename: String,
    pub(crate) resource_group: String,
    pub(crate) auto_scale: bool,
    pub(crate) native_resolution: Size<f32>,
    pub(crate) scale: Size<f32>,
    pub(crate) ascender: f32,
    pub(crate) descender: f32,
    pub(crate) height: f32,
    pub(crate) max_codepoint: u32,
    pub(crate) glyphs: GlyphMap,
    pub(crate) loaded_pages: HashSet<u32>,
    pub(crate) context: FontContext,
}

impl FontCommon {
    fn new(definition: &FontDefinition, context: FontContext) -> Self {
        let display = context.renderer.display_size();
        let native_resolution = definition.native_resolution;
        Self {
            name: definition.name.clone(),
            filename: definition.filename.clone(),
            resource_group: definition.resource_group.clone(),
            auto_scale: definition.auto_scaled,
            native_resolution,
            scale: scale_between(native_resolution, display),
            ascender: 0.,
            descender: 0.,
            height: 0.,
            max_codepoint: 0,
            glyphs: GlyphMap::default(),
            loaded_pages: HashSet::new(),
            context,
        }
    }

    /// The resource group to load from, falling back to the context's
    /// default group.
    pub(crate) fn effective_resource_group(&self) -> &str {
        if self.resource_group.is_empty() {
            &self.context.default_resource_group
        } else {
            &self.resource_group
        }
    }

    /// The factor applied to horizontal native-resolution values.
    pub(crate) fn horizontal_factor(&self) -> f32 {
        if self.auto_scale {
            self.scale.width
        } else {
            1.
        }
    }

    /// The factor applied to vertical native-resolution values.
    pub(crate) fn vertical_factor(&self) -> f32 {
        if self.auto_scale {
            self.scale.height
        } else {
            1.
        }
    }

    pub(crate) fn set_max_codepoint(&mut self, codepoint: u32) {
        self.max_codepoint = codepoint;
        self.loaded_pages.clear();
    }
}

pub(crate) fn is_valid_resolution(resolution: Size<f32>) -> bool {
    resolution.width > 0. && resolution.height > 0.
}

pub(crate) fn invalid_native_resolution(font: &str) -> Error {
    Error::Definition(format!(
        "font '{}' must have a positive native resolution",
        font
    ))
}

/// Where a font's glyphs come from.
#[derive(Debug)]
pub enum GlyphSource {
    /// Glyphs rasterized on demand from an outline font.
    FreeType(FreeTypeSource),
    /// Glyphs mapped to images of a pre-rendered atlas.
    Pixmap(PixmapSource),
}

/// Mutable access to the kind-specific settings of a [`Font`].
#[derive(Debug)]
pub enum FontVariant<'a> {
    /// A rasterized outline font.
    FreeType(FreeTypeFontMut<'a>),
    /// A pre-rendered bitmap font.
    Pixmap(PixmapFontMut<'a>),
}

/// A named font: glyph metrics, glyph imagery and text layout.
#[derive(Debug)]
pub struct Font {
    pub(crate) common: FontCommon,
    pub(crate) source: GlyphSource,
}

impl Font {
    /// Loads the font described by `definition`. Borrowed pixmap atlases are
    /// looked up in `atlases`.
    pub fn new(
        definition: &FontDefinition,
        context: FontContext,
        atlases: &AtlasRegistry,
    ) -> crate::Result<Self> {
        if !is_valid_resolution(definition.native_resolution) {
            return Err(invalid_native_resolution(&definition.name));
        }
        let mut common = FontCommon::new(definition, context);
        tracing::info!(
            font = %common.name,
            kind = %definition.kind,
            file = %common.filename,
            group = %common.effective_resource_group(),
            "creating font"
        );

        let source = match definition.kind {
            FontKind::FreeType => GlyphSource::FreeType(FreeTypeSource::new(
                &common,
                definition.point_size,
                definition.anti_aliased,
                definition.line_spacing,
            )?),
            FontKind::Pixmap => GlyphSource::Pixmap(PixmapSource::new(&common, atlases)?),
        };

        let mut font = Self { common, source };
        font.update_font()?;

        if let FontVariant::Pixmap(mut pixmap) = font.variant_mut() {
            for mapping in &definition.mappings {
                pixmap.define_mapping(mapping.codepoint, &mapping.image, mapping.advance)?;
            }
        }

        tracing::info!(
            font = %font.common.name,
            glyphs = font.common.glyphs.len(),
            "font loaded"
        );
        Ok(font)
    }

    /// The unique name of this font.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.common.name
    }

    /// The file this font was loaded from.
    #[must_use]
    pub fn filename(&self) -> &str {
        &self.common.filename
    }

    /// The resource group the file was loaded from. Empty for the default
    /// group.
    #[must_use]
    pub fn resource_group(&self) -> &str {
        &self.common.resource_group
    }

    /// The kind of glyph source.
    #[must_use]
    pub const fn kind(&self) -> FontKind {
        match self.source {
            GlyphSource::FreeType(_) => FontKind::FreeType,
            GlyphSource::Pixmap(_) => FontKind::Pixmap,
        }
    }

    /// The glyph source.
    #[must_use]
    pub const fn source(&self) -> &GlyphSource {
        &self.source
    }

    /// Returns mutable access to the kind-specific settings.
    pub fn variant_mut(&mut self) -> FontVariant<'_> {
        match &mut self.source {
            GlyphSource::FreeType(source) => FontVariant::FreeType(FreeTypeFontMut {
                common: &mut self.common,
                source,
            }),
            GlyphSource::Pixmap(source) => FontVariant::Pixmap(PixmapFontMut {
                common: &mut self.common,
                source,
            }),
        }
    }

    /// Rebuilds glyphs and metrics for the current settings and scale.
    pub fn update_font(&mut self) -> crate::Result<()> {
        match &mut self.source {
            GlyphSource::FreeType(source) => source.update_font(&mut self.common),
            GlyphSource::Pixmap(source) => {
                source.update_font(&mut self.common);
                Ok(())
            }
        }
    }

    /// Returns true if the font scales with the display size.
    #[must_use]
    pub const fn is_auto_scaled(&self) -> bool {
        self.common.auto_scale
    }

    /// Enables or disables scaling with the display size.
    pub fn set_auto_scaling_enabled(&mut self, enabled: bool) -> crate::Result<()> {
        if enabled == self.common.auto_scale {
            return Ok(());
        }
        self.common.auto_scale = enabled;
        self.update_font()
    }

    /// The resolution the font's sizes are given for.
    #[must_use]
    pub const fn native_resolution(&self) -> Size<f32> {
        self.common.native_resolution
    }

    /// Sets the resolution the font's sizes are given for, rescaling against
    /// the renderer's current display size.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidRequest`] if either dimension is not positive.
    pub fn set_native_resolution(&mut self, resolution: Size<f32>) -> crate::Result<()> {
        if !is_valid_resolution(resolution) {
            return Err(Error::InvalidRequest(format!(
                "native resolution {}x{} must be positive",
                resolution.width, resolution.height
            )));
        }
        self.common.native_resolution = resolution;
        let display = self.common.context.renderer.display_size();
        self.notify_display_size_changed(display)
    }

    /// The current ratio of display size to native resolution.
    #[must_use]
    pub const fn scale(&self) -> Size<f32> {
        self.common.scale
    }

    /// Recomputes the scale factors for a display of `size`. Auto-scaled
    /// fonts are rebuilt.
    pub fn notify_display_size_changed(&mut self, size: Size<f32>) -> crate::Result<()> {
        self.common.scale = scale_between(self.common.native_resolution, size);
        if let GlyphSource::Pixmap(source) = &self.source {
            source.notify_display_size_changed(size);
        }

        if self.common.auto_scale {
            self.update_font()
        } else {
            Ok(())
        }
    }

    /// Distance from the baseline to the top of the tallest glyph.
    #[must_use]
    pub fn ascender(&self, y_scale: f32) -> f32 {
        self.common.ascender * y_scale
    }

    /// Distance from the baseline to the bottom of the lowest glyph. Zero or
    /// negative.
    #[must_use]
    pub fn descender(&self, y_scale: f32) -> f32 {
        self.common.descender * y_scale
    }

    /// The distance between the top of the tallest glyph and the bottom of
    /// the lowest.
    #[must_use]
    pub fn font_height(&self, y_scale: f32) -> f32 {
        (self.common.ascender - self.common.descender) * y_scale
    }

    /// The distance between consecutive baselines.
    #[must_use]
    pub fn line_spacing(&self, y_scale: f32) -> f32 {
        self.common.height * y_scale
    }

    /// The distance from the top of a line to its baseline.
    #[must_use]
    pub fn baseline(&self, y_scale: f32) -> f32 {
        self.common.ascender * y_scale
    }

    /// The largest codepoint this font has a glyph for.
    #[must_use]
    pub const fn max_codepoint(&self) -> u32 {
        self.common.max_codepoint
    }

    /// Returns true if the font has a glyph for `codepoint`.
    #[must_use]
    pub fn is_codepoint_available(&self, codepoint: u32) -> bool {
        self.common.glyphs.contains(codepoint)
    }

    /// Every glyph, without triggering rasterization.
    #[must_use]
    pub const fn glyphs(&self) -> &GlyphMap {
        &self.common.glyphs
    }

    /// Returns the glyph for `codepoint`, rasterizing its block of
    /// [`GLYPHS_PER_PAGE`] codepoints on first use. Rasterization failures
    /// are logged; use [`Font::prepare_glyphs`] to observe them.
    pub fn glyph_data(&mut self, codepoint: u32) -> Option<&FontGlyph> {
        if codepoint > self.common.max_codepoint {
            return None;
        }

        let page = codepoint / GLYPHS_PER_PAGE;
        if self.common.loaded_pages.insert(page) {
            let (start, end) = page_range(page);
            if let Err(err) = self.rasterize(start, end) {
                tracing::error!(
                    font = %self.common.name,
                    start,
                    end,
                    error = %err,
                    "failed to rasterize glyphs"
                );
            }
        }

        self.common.glyphs.get(codepoint)
    }

    /// Rasterizes every glyph in `codepoints` now, returning the first error
    /// encountered.
    pub fn prepare_glyphs(&mut self, codepoints: RangeInclusive<u32>) -> crate::Result<()> {
        let start = *codepoints.start();
        let end = (*codepoints.end()).min(self.common.max_codepoint);
        if start > end {
            return Ok(());
        }

        for page in start / GLYPHS_PER_PAGE..=end / GLYPHS_PER_PAGE {
            if self.common.loaded_pages.insert(page) {
                let (page_start, page_end) = page_range(page);
                if let Err(err) = self.rasterize(page_start, page_end) {
                    self.common.loaded_pages.remove(&page);
                    return Err(err);
                }
            }
        }
        Ok(())
    }

    fn rasterize(&mut self, start: u32, end: u32) -> crate::Result<()> {
        match &mut self.source {
            GlyphSource::FreeType(source) => source.rasterize(&mut self.common, start, end),
            GlyphSource::Pixmap(_) => Ok(()),
        }
    }

    /// Returns a definition that recreates this font.
    #[must_use]
    pub fn to_definition(&self) -> FontDefinition {
        let mut definition = match &self.source {
            GlyphSource::FreeType(source) => {
                let mut definition =
                    FontDefinition::freetype(self.common.name.clone(), self.common.filename.clone());
                definition.point_size = source.point_size();
                definition.anti_aliased = source.is_anti_aliased();
                definition.line_spacing = source.line_spacing_override();
                definition
            }
            GlyphSource::Pixmap(source) => {
                let mut definition =
                    FontDefinition::pixmap(self.common.name.clone(), self.common.filename.clone());
                definition.mappings = source.mappings(&self.common);
                definition
            }
        };
        definition.resource_group = self.common.resource_group.clone();
        definition.auto_scaled = self.common.auto_scale;
        definition.native_resolution = self.common.native_resolution;
        definition
    }
}

const fn page_range(page: u32) -> (u32, u32) {
    let start = page * GLYPHS_PER_PAGE;
    (start, start | (GLYPHS_PER_PAGE - 1))
}
