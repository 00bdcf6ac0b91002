use std::sync::Arc;

use rusttype::{point, Scale};

use crate::{
    math::Size,
    raster::{
        AntiAliasing, Face, FaceMetrics, GlyphBitmap, GlyphMetrics, PixelMode, Rasterizer,
        RenderedGlyph, SizeMetrics,
    },
    Error,
};

/// Rasterizes TrueType and OpenType fonts using `rusttype`. Character maps,
/// face metrics and bitmap strikes are read with `ttf-parser`.
///
/// `rusttype` only accepts font data it owns, so every open face holds its
/// own copy of the font bytes. Everything read through `ttf-parser` is
/// collected when the face is opened, and the shared bytes are not retained
/// by the face.
#[derive(Debug, Default, Clone, Copy)]
pub struct TrueTypeRasterizer;

impl Rasterizer for TrueTypeRasterizer {
    fn new_face(&self, data: Arc<[u8]>) -> crate::Result<Box<dyn Face>> {
        let tables = FaceTables::parse(&data)?;
        let font = rusttype::Font::try_from_vec(data.to_vec())
            .ok_or_else(|| Error::InvalidFontData(String::from("rusttype rejected the data")))?;

        Ok(Box::new(TrueTypeFace {
            font,
            tables,
            pixels_per_em: Size::default(),
        }))
    }
}

/// The parts of the font tables a face answers questions from.
#[derive(Debug)]
struct FaceTables {
    metrics: FaceMetrics,
    unicode_charmap: bool,
    scalable: bool,
    fixed_sizes: Vec<f32>,
    codepoints: Vec<u32>,
}

impl FaceTables {
    fn parse(data: &[u8]) -> crate::Result<Self> {
        let face =
            ttf_parser::Face::parse(data, 0).map_err(|err| Error::InvalidFontData(err.to_string()))?;
        let tables = face.tables();

        let mut unicode_charmap = false;
        let mut codepoints = Vec::new();
        if let Some(cmap) = tables.cmap {
            for subtable in cmap.subtables {
                if !subtable.is_unicode() {
                    continue;
                }
                unicode_charmap = true;
                subtable.codepoints(|codepoint| {
                    if subtable
                        .glyph_index(codepoint)
                        .map_or(false, |id| id.0 != 0)
                    {
                        codepoints.push(codepoint);
                    }
                });
            }
        }
        codepoints.sort_unstable();
        codepoints.dedup();

        Ok(Self {
            metrics: FaceMetrics {
                ascender: f32::from(face.ascender()),
                descender: f32::from(face.descender()),
                height: f32::from(face.height()),
                units_per_em: f32::from(face.units_per_em()),
            },
            unicode_charmap,
            scalable: tables.glyf.is_some() || tables.cff.is_some() || tables.cff2.is_some(),
            fixed_sizes: tables
                .sbix
                .map(|sbix| {
                    sbix.strikes
                        .into_iter()
                        .map(|strike| f32::from(strike.pixels_per_em))
                        .collect()
                })
                .unwrap_or_default(),
            codepoints,
        })
    }
}

#[derive(Debug)]
struct TrueTypeFace {
    font: rusttype::Font<'static>,
    tables: FaceTables,
    pixels_per_em: Size<f32>,
}

impl TrueTypeFace {
    /// rusttype scales so that `ascent - descent` spans the requested
    /// height, rather than the em square.
    fn scale(&self) -> Scale {
        let metrics = &self.tables.metrics;
        let ratio = (metrics.ascender - metrics.descender) / metrics.units_per_em;
        Scale {
            x: self.pixels_per_em.width * ratio,
            y: self.pixels_per_em.height * ratio,
        }
    }

    fn glyph(&self, codepoint: u32) -> crate::Result<rusttype::PositionedGlyph<'static>> {
        let ch = std::char::from_u32(codepoint).ok_or_else(|| Error::Rasterization {
            codepoint,
            reason: String::from("not a valid unicode scalar value"),
        })?;
        let glyph = self.font.glyph(ch);
        if glyph.id().0 == 0 {
            return Err(Error::Rasterization {
                codepoint,
                reason: String::from("no glyph in font"),
            });
        }
        Ok(glyph.scaled(self.scale()).positioned(point(0., 0.)))
    }

    fn measure(glyph: &rusttype::PositionedGlyph<'static>) -> GlyphMetrics {
        let advance = glyph.unpositioned().h_metrics().advance_width;
        match glyph.pixel_bounding_box() {
            Some(bounds) => GlyphMetrics {
                advance,
                width: bounds.width() as f32,
                height: bounds.height() as f32,
                bearing_x: bounds.min.x as f32,
                bearing_y: -bounds.min.y as f32,
            },
            None => GlyphMetrics {
                advance,
                ..GlyphMetrics::default()
            },
        }
    }
}

impl Face for TrueTypeFace {
    fn has_unicode_charmap(&self) -> bool {
        self.tables.unicode_charmap
    }

    fn is_scalable(&self) -> bool {
        self.tables.scalable
    }

    fn fixed_sizes(&self) -> Vec<f32> {
        self.tables.fixed_sizes.clone()
    }

    fn set_char_size(&mut self, point_size: Size<f32>, dpi: Size<u32>) -> crate::Result<()> {
        if point_size.width <= 0.
            || point_size.height <= 0.
            || self.tables.metrics.units_per_em <= 0.
        {
            return Err(Error::InvalidRequest(format!(
                "cannot set a character size of {}x{} points",
                point_size.width, point_size.height
            )));
        }
        self.pixels_per_em = Size::new(
            point_size.width * dpi.width as f32 / 72.,
            point_size.height * dpi.height as f32 / 72.,
        );
        Ok(())
    }

    fn face_metrics(&self) -> FaceMetrics {
        self.tables.metrics
    }

    fn size_metrics(&self) -> SizeMetrics {
        let x_scale = self.pixels_per_em.width / self.tables.metrics.units_per_em;
        let y_scale = self.pixels_per_em.height / self.tables.metrics.units_per_em;
        SizeMetrics {
            x_ppem: self.pixels_per_em.width,
            y_ppem: self.pixels_per_em.height,
            x_scale,
            y_scale,
            ascender: (self.tables.metrics.ascender * y_scale).ceil(),
            descender: (self.tables.metrics.descender * y_scale).floor(),
            height: (self.tables.metrics.height * y_scale).ceil(),
        }
    }

    fn codepoints(&self) -> Vec<u32> {
        self.tables.codepoints.clone()
    }

    fn glyph_metrics(&self, codepoint: u32) -> crate::Result<GlyphMetrics> {
        Ok(Self::measure(&self.glyph(codepoint)?))
    }

    fn render_glyph(&self, codepoint: u32, mode: AntiAliasing) -> crate::Result<RenderedGlyph> {
        let glyph = self.glyph(codepoint)?;
        let metrics = Self::measure(&glyph);
        let bitmap = match glyph.pixel_bounding_box() {
            Some(bounds) => {
                let width = bounds.width() as u32;
                let rows = bounds.height() as u32;
                match mode {
                    AntiAliasing::Normal => {
                        let pitch = width as usize;
                        let mut buffer = vec![0; pitch * rows as usize];
                        glyph.draw(|x, y, coverage| {
                            buffer[y as usize * pitch + x as usize] =
                                (coverage.clamp(0., 1.) * 255.).round() as u8;
                        });
                        GlyphBitmap {
                            width,
                            rows,
                            pitch,
                            pixel_mode: Some(PixelMode::Gray),
                            buffer,
                        }
                    }
                    AntiAliasing::Mono => {
                        let pitch = (width as usize + 7) / 8;
                        let mut buffer = vec![0; pitch * rows as usize];
                        glyph.draw(|x, y, coverage| {
                            if coverage >= 0.5 {
                                buffer[y as usize * pitch + x as usize / 8] |= 0x80 >> (x & 7);
                            }
                        });
                        GlyphBitmap {
                            width,
                            rows,
                            pitch,
                            pixel_mode: Some(PixelMode::Mono),
                            buffer,
                        }
                    }
                }
            }
            None => GlyphBitmap::default(),
        };

        Ok(RenderedGlyph { metrics, bitmap })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn garbage_is_rejected() {
        let data: Arc<[u8]> = Arc::from(&b"definitely not a font"[..]);
        assert!(matches!(
            TrueTypeRasterizer.new_face(data),
            Err(Error::InvalidFontData(_))
        ));
    }

    #[test]
    fn truncated_tables_are_rejected() {
        // A TrueType version tag with no table directory.
        assert!(matches!(
            FaceTables::parse(&[0, 1, 0, 0]),
            Err(Error::InvalidFontData(_))
        ));
    }

    #[test]
    fn empty_data_is_rejected() {
        let data: Arc<[u8]> = Arc::from(Vec::new());
        assert!(TrueTypeRasterizer.new_face(data).is_err());
    }
}
