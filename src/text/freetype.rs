use std::sync::Arc;

use crate::{
    atlas::TextureAtlas,
    math::{Point, Rect, Size},
    pack::{estimate_page_size, GlyphPacker},
    raster::{AntiAliasing, Face, GlyphBitmap, PixelMode},
    text::{
        font::FontCommon,
        glyph::{FontGlyph, GlyphImage},
    },
    Error,
};

/// Glyphs rasterized on demand from an outline font.
#[derive(Debug)]
pub struct FreeTypeSource {
    data: Arc<[u8]>,
    face: Option<Box<dyn Face>>,
    point_size: f32,
    anti_aliased: bool,
    line_spacing: f32,
    pages: Vec<TextureAtlas>,
}

impl FreeTypeSource {
    pub(crate) fn new(
        common: &FontCommon,
        point_size: f32,
        anti_aliased: bool,
        line_spacing: f32,
    ) -> crate::Result<Self> {
        let data = common
            .context
            .resources
            .load_raw_data(&common.filename, common.effective_resource_group())?;
        Ok(Self {
            data: Arc::from(data),
            face: None,
            point_size,
            anti_aliased,
            line_spacing,
            pages: Vec::new(),
        })
    }

    /// The size glyphs are rendered at, in points.
    #[must_use]
    pub const fn point_size(&self) -> f32 {
        self.point_size
    }

    /// Returns true if glyphs are rendered with grayscale coverage.
    #[must_use]
    pub const fn is_anti_aliased(&self) -> bool {
        self.anti_aliased
    }

    /// The line spacing used instead of the face's, or zero.
    #[must_use]
    pub const fn line_spacing_override(&self) -> f32 {
        self.line_spacing
    }

    /// The atlas pages holding rasterized glyphs.
    #[must_use]
    pub fn pages(&self) -> &[TextureAtlas] {
        &self.pages
    }

    fn free(&mut self, common: &mut FontCommon) {
        common.glyphs.clear();
        for page in self.pages.drain(..) {
            page.unload();
        }
        self.face = None;
    }

    pub(crate) fn update_font(&mut self, common: &mut FontCommon) -> crate::Result<()> {
        self.free(common);

        let mut face = common
            .context
            .rasterizer
            .new_face(self.data.clone())
            .map_err(|err| match err {
                Error::InvalidFontData(_) => Error::InvalidFontData(common.filename.clone()),
                other => other,
            })?;
        if !face.has_unicode_charmap() {
            return Err(Error::NoUnicodeCharmap(common.name.clone()));
        }

        let renderer = &common.context.renderer;
        let dpi = Size::new(renderer.horizontal_dpi(), renderer.vertical_dpi());
        let point_size = Size::new(
            self.point_size * common.horizontal_factor(),
            self.point_size * common.vertical_factor(),
        );

        if face.set_char_size(point_size, dpi).is_err() {
            // Bitmap strikes only exist at specific sizes; use the closest.
            let wanted = self.point_size * 72. / dpi.height as f32;
            let best = face
                .fixed_sizes()
                .into_iter()
                .min_by(|a, b| (a - wanted).abs().total_cmp(&(b - wanted).abs()))
                .unwrap_or(0.);
            if best <= 0.
                || face
                    .set_char_size(Size::new(best, best), Size::new(72, 72))
                    .is_err()
            {
                return Err(Error::UnsupportedPointSize {
                    font: common.name.clone(),
                    point_size: self.point_size,
                });
            }
        }

        if face.is_scalable() {
            let y_scale = face.size_metrics().y_scale;
            let metrics = face.face_metrics();
            common.ascender = metrics.ascender * y_scale;
            common.descender = metrics.descender * y_scale;
            common.height = metrics.height * y_scale;
        } else {
            let metrics = face.size_metrics();
            common.ascender = metrics.ascender;
            common.descender = metrics.descender;
            common.height = metrics.height;
        }
        if self.line_spacing > 0. {
            common.height = self.line_spacing;
        }

        let mut max_codepoint = 0;
        for codepoint in face.codepoints() {
            max_codepoint = max_codepoint.max(codepoint);
            match face.glyph_metrics(codepoint) {
                Ok(metrics) => {
                    common
                        .glyphs
                        .insert(codepoint, FontGlyph::new(metrics.advance));
                }
                Err(err) => {
                    tracing::trace!(font = %common.name, codepoint, error = %err, "skipping glyph");
                }
            }
        }
        common.set_max_codepoint(max_codepoint);
        self.face = Some(face);

        tracing::debug!(
            font = %common.name,
            point_size = self.point_size,
            glyphs = common.glyphs.len(),
            "updated font"
        );
        Ok(())
    }

    /// Renders every glyph between `start` and `end` that has no image yet.
    /// Spare room on each page is filled with glyphs after `end`, then with
    /// glyphs before `start`.
    pub(crate) fn rasterize(
        &mut self,
        common: &mut FontCommon,
        start: u32,
        end: u32,
    ) -> crate::Result<()> {
        let face = match &self.face {
            Some(face) => face,
            None => return Ok(()),
        };

        let required = common
            .glyphs
            .range(start..=end)
            .filter(|(_, glyph)| !glyph.is_rasterized())
            .map(|(codepoint, _)| *codepoint)
            .collect::<Vec<_>>();
        let mode = AntiAliasing::from_enabled(self.anti_aliased);
        let renderer = common.context.renderer.clone();

        let mut next = 0;
        while next < required.len() {
            let sizes = required[next..]
                .iter()
                .filter_map(|&codepoint| face.glyph_metrics(codepoint).ok())
                .map(|metrics| Size::new(metrics.width.ceil() as u32, metrics.height.ceil() as u32))
                .collect::<Vec<_>>();
            let page_size = estimate_page_size(sizes, renderer.max_texture_size());

            let mut page = PageBuilder::new(
                TextureAtlas::new(
                    format!("{}_auto_glyph_images_{}", common.name, required[next]),
                    renderer.clone(),
                    Size::new(page_size, page_size),
                )?,
                mode,
            );
            tracing::debug!(font = %common.name, size = page_size, "created glyph page");

            while next < required.len() {
                match page.place(&**face, common, required[next])? {
                    Placement::Placed => next += 1,
                    Placement::Full if page.packer.is_empty() => {
                        // Too large for even an empty page.
                        tracing::error!(
                            font = %common.name,
                            codepoint = required[next],
                            "glyph does not fit in the largest texture, using an empty image"
                        );
                        page.place_empty(common, required[next])?;
                        next += 1;
                    }
                    Placement::Full => break,
                }
            }

            if next == required.len() {
                let after = common
                    .glyphs
                    .range(end.saturating_add(1)..)
                    .filter(|(_, glyph)| !glyph.is_rasterized())
                    .map(|(codepoint, _)| *codepoint)
                    .collect::<Vec<_>>();
                let before = common
                    .glyphs
                    .range(..start)
                    .rev()
                    .filter(|(_, glyph)| !glyph.is_rasterized())
                    .map(|(codepoint, _)| *codepoint)
                    .collect::<Vec<_>>();
                for codepoint in after.into_iter().chain(before) {
                    if let Placement::Full = page.place(&**face, common, codepoint)? {
                        break;
                    }
                }
            }

            page.upload()?;
            self.pages.push(page.atlas);
        }

        Ok(())
    }
}

enum Placement {
    Placed,
    Full,
}

struct PageBuilder {
    atlas: TextureAtlas,
    packer: GlyphPacker,
    pixels: Vec<u8>,
    mode: AntiAliasing,
}

impl PageBuilder {
    fn new(atlas: TextureAtlas, mode: AntiAliasing) -> Self {
        let size = atlas.texture_size();
        Self {
            atlas,
            packer: GlyphPacker::new(size),
            pixels: vec![0; size.area() as usize * 4],
            mode,
        }
    }

    fn place(
        &mut self,
        face: &dyn Face,
        common: &mut FontCommon,
        codepoint: u32,
    ) -> crate::Result<Placement> {
        let rendered = match face.render_glyph(codepoint, self.mode) {
            Ok(rendered) => rendered,
            Err(err) => {
                tracing::error!(
                    font = %common.name,
                    codepoint,
                    error = %err,
                    "failed to render glyph, using an empty image"
                );
                self.place_empty(common, codepoint)?;
                return Ok(Placement::Placed);
            }
        };

        let size = Size::new(rendered.bitmap.width, rendered.bitmap.rows);
        let origin = match self.packer.allocate(size) {
            Some(origin) => origin,
            None => return Ok(Placement::Full),
        };
        self.blit(&rendered.bitmap, origin.x, origin.y);

        let name = codepoint.to_string();
        self.atlas.define_image(
            name.clone(),
            Rect::sized(origin, size),
            Point::new(rendered.metrics.bearing_x, -rendered.metrics.bearing_y),
        )?;
        if let Some(glyph) = common.glyphs.get_mut(codepoint) {
            glyph.set_image(GlyphImage::new(self.atlas.clone(), name));
        }
        Ok(Placement::Placed)
    }

    fn place_empty(&mut self, common: &mut FontCommon, codepoint: u32) -> crate::Result<()> {
        let name = codepoint.to_string();
        self.atlas
            .define_image(name.clone(), Rect::default(), Point::default())?;
        if let Some(glyph) = common.glyphs.get_mut(codepoint) {
            glyph.set_image(GlyphImage::new(self.atlas.clone(), name));
        }
        Ok(())
    }

    fn blit(&mut self, bitmap: &GlyphBitmap, x: u32, y: u32) {
        let stride = self.packer.size().width as usize * 4;
        for row in 0..bitmap.rows {
            let row_start = (y + row) as usize * stride + x as usize * 4;
            for column in 0..bitmap.width {
                let coverage = bitmap.coverage(column, row);
                if bitmap.pixel_mode == Some(PixelMode::Mono) && coverage == 0 {
                    continue;
                }
                let offset = row_start + column as usize * 4;
                self.pixels[offset..offset + 4].copy_from_slice(&[0xFF, 0xFF, 0xFF, coverage]);
            }
        }
    }

    fn upload(&self) -> crate::Result<()> {
        self.atlas.upload(&self.pixels, self.packer.size())
    }
}

impl Drop for FreeTypeSource {
    fn drop(&mut self) {
        for page in self.pages.drain(..) {
            page.unload();
        }
    }
}

/// Mutable access to a rasterized [`Font`](crate::text::Font). Each setter
/// rebuilds the font's glyphs and metrics.
#[derive(Debug)]
pub struct FreeTypeFontMut<'a> {
    pub(crate) common: &'a mut FontCommon,
    pub(crate) source: &'a mut FreeTypeSource,
}

impl<'a> FreeTypeFontMut<'a> {
    /// The size glyphs are rendered at, in points.
    #[must_use]
    pub fn point_size(&self) -> f32 {
        self.source.point_size
    }

    /// Renders glyphs at `point_size` points.
    pub fn set_point_size(&mut self, point_size: f32) -> crate::Result<()> {
        if (point_size - self.source.point_size).abs() < f32::EPSILON {
            return Ok(());
        }
        self.source.point_size = point_size;
        self.source.update_font(self.common)
    }

    /// Returns true if glyphs are rendered with grayscale coverage.
    #[must_use]
    pub fn is_anti_aliased(&self) -> bool {
        self.source.anti_aliased
    }

    /// Switches between grayscale and monochrome rendering.
    pub fn set_anti_aliased(&mut self, anti_aliased: bool) -> crate::Result<()> {
        if anti_aliased == self.source.anti_aliased {
            return Ok(());
        }
        self.source.anti_aliased = anti_aliased;
        self.source.update_font(self.common)
    }

    /// The line spacing used instead of the face's, or zero.
    #[must_use]
    pub fn line_spacing_override(&self) -> f32 {
        self.source.line_spacing
    }

    /// Overrides the face's line spacing. Zero restores it.
    pub fn set_line_spacing(&mut self, line_spacing: f32) -> crate::Result<()> {
        self.source.line_spacing = line_spacing;
        self.source.update_font(self.common)
    }

    /// The atlas pages holding rasterized glyphs.
    #[must_use]
    pub fn pages(&self) -> &[TextureAtlas] {
        &self.source.pages
    }
}
