use std::sync::Arc;

use approx::assert_relative_eq;

use crate::{
    atlas::AtlasDefinition,
    math::{Point, Rect, Size},
    prelude::*,
    raster::{AntiAliasing, FaceMetrics, GlyphBitmap, GlyphMetrics, PixelMode, RenderedGlyph, SizeMetrics},
    text::{FontGlyph, FontVariant, GlyphSource, MappingDefinition, SHARED_ATLAS_GROUP},
};

const SNOWMAN: u32 = 0x2603;
const SMILE: u32 = 0x263A;

/// Opens synthetic faces. The font data selects the kind of face.
#[derive(Debug, Default)]
struct TestRasterizer;

impl Rasterizer for TestRasterizer {
    fn new_face(&self, data: Arc<[u8]>) -> crate::Result<Box<dyn Face>> {
        match &*data {
            b"scalable" => Ok(Box::new(TestFace::new(true, true))),
            b"strikes" => Ok(Box::new(TestFace::new(false, true))),
            b"symbols" => Ok(Box::new(TestFace::new(true, false))),
            _ => Err(Error::InvalidFontData(String::from("unrecognized test font"))),
        }
    }
}

/// A monospaced face covering printable ascii plus two symbols. Every glyph
/// advances 0.6 em and is 0.5 em wide and 0.7 em tall, sitting on the
/// baseline. The snowman always fails to render.
#[derive(Debug)]
struct TestFace {
    scalable: bool,
    unicode: bool,
    pixels_per_em: Size<f32>,
}

impl TestFace {
    const fn new(scalable: bool, unicode: bool) -> Self {
        Self {
            scalable,
            unicode,
            pixels_per_em: Size::new(0., 0.),
        }
    }

    fn covers(codepoint: u32) -> bool {
        (32..=126).contains(&codepoint) || codepoint == SNOWMAN || codepoint == SMILE
    }
}

impl Face for TestFace {
    fn has_unicode_charmap(&self) -> bool {
        self.unicode
    }

    fn is_scalable(&self) -> bool {
        self.scalable
    }

    fn fixed_sizes(&self) -> Vec<f32> {
        if self.scalable {
            Vec::new()
        } else {
            vec![10.]
        }
    }

    fn set_char_size(&mut self, point_size: Size<f32>, dpi: Size<u32>) -> crate::Result<()> {
        if self.scalable {
            self.pixels_per_em = Size::new(
                point_size.width * dpi.width as f32 / 72.,
                point_size.height * dpi.height as f32 / 72.,
            );
            Ok(())
        } else if (point_size.height - 10.).abs() < 0.01 && dpi == Size::new(72, 72) {
            self.pixels_per_em = Size::new(10., 10.);
            Ok(())
        } else {
            Err(Error::InvalidRequest(String::from("no strike at that size")))
        }
    }

    fn face_metrics(&self) -> FaceMetrics {
        FaceMetrics {
            ascender: 800.,
            descender: -200.,
            height: 1200.,
            units_per_em: 1000.,
        }
    }

    fn size_metrics(&self) -> SizeMetrics {
        let ppem = self.pixels_per_em;
        SizeMetrics {
            x_ppem: ppem.width,
            y_ppem: ppem.height,
            x_scale: ppem.width / 1000.,
            y_scale: ppem.height / 1000.,
            ascender: 0.8 * ppem.height,
            descender: -0.2 * ppem.height,
            height: 1.2 * ppem.height,
        }
    }

    fn codepoints(&self) -> Vec<u32> {
        (32..=126).chain(vec![SNOWMAN, SMILE]).collect()
    }

    fn glyph_metrics(&self, codepoint: u32) -> crate::Result<GlyphMetrics> {
        if !Self::covers(codepoint) {
            return Err(Error::Rasterization {
                codepoint,
                reason: String::from("no glyph"),
            });
        }
        let advance = self.pixels_per_em.width * 3. / 5.;
        if codepoint == u32::from(' ') {
            return Ok(GlyphMetrics {
                advance,
                ..GlyphMetrics::default()
            });
        }
        let height = (self.pixels_per_em.height * 7. / 10.).ceil();
        if codepoint == u32::from('/') {
            // Slanted so that it reaches past its advance.
            return Ok(GlyphMetrics {
                advance,
                width: (self.pixels_per_em.width * 3. / 5.).ceil(),
                height,
                bearing_x: (self.pixels_per_em.width / 5.).floor(),
                bearing_y: height,
            });
        }
        Ok(GlyphMetrics {
            advance,
            width: (self.pixels_per_em.width / 2.).ceil(),
            height,
            bearing_x: 0.,
            bearing_y: height,
        })
    }

    fn render_glyph(&self, codepoint: u32, mode: AntiAliasing) -> crate::Result<RenderedGlyph> {
        if codepoint == SNOWMAN {
            return Err(Error::Rasterization {
                codepoint,
                reason: String::from("melted"),
            });
        }
        let metrics = self.glyph_metrics(codepoint)?;
        let width = metrics.width as u32;
        let rows = metrics.height as u32;
        let bitmap = if width == 0 || rows == 0 {
            GlyphBitmap::default()
        } else {
            match mode {
                AntiAliasing::Normal => GlyphBitmap {
                    width,
                    rows,
                    pitch: width as usize,
                    pixel_mode: Some(PixelMode::Gray),
                    buffer: vec![0x80; width as usize * rows as usize],
                },
                AntiAliasing::Mono => {
                    let pitch = (width as usize + 7) / 8;
                    GlyphBitmap {
                        width,
                        rows,
                        pitch,
                        pixel_mode: Some(PixelMode::Mono),
                        buffer: vec![0xFF; pitch * rows as usize],
                    }
                }
            }
        };
        Ok(RenderedGlyph { metrics, bitmap })
    }
}

struct Harness {
    resources: Arc<MemoryResourceProvider>,
    renderer: Arc<ImageRenderer>,
    manager: FontManager,
}

impl Harness {
    fn new() -> Self {
        Self::with_max_texture_size(ImageRenderer::DEFAULT_MAX_TEXTURE_SIZE)
    }

    fn with_max_texture_size(max_texture_size: u32) -> Self {
        let resources = Arc::new(MemoryResourceProvider::default());
        resources.insert("mono.ttf", "", "scalable");
        resources.insert("strikes.fon", "", "strikes");
        resources.insert("symbols.ttf", "", "symbols");
        resources.insert("digits.png", "", png(32));
        resources.insert("digits.atlas", "", DIGITS_ATLAS);
        let renderer = Arc::new(
            ImageRenderer::new(resources.clone()).with_max_texture_size(max_texture_size),
        );
        let manager = FontManager::new(FontContext::new(
            renderer.clone(),
            resources.clone(),
            Arc::new(TestRasterizer),
        ));
        Self {
            resources,
            renderer,
            manager,
        }
    }

    /// Creates a FreeType font named `name` from the scalable test face.
    fn mono(&mut self, name: &str, point_size: f32) -> &mut Font {
        let mut definition = FontDefinition::freetype(name, "mono.ttf");
        definition.point_size = point_size;
        self.manager
            .create(&definition, DuplicatePolicy::Error)
            .unwrap()
    }

    fn digits(&mut self, auto_scaled: bool) -> &mut Font {
        self.manager
            .create(&digits_definition(auto_scaled), DuplicatePolicy::Error)
            .unwrap()
    }
}

const DIGITS_ATLAS: &str = r#"{
    "Name": "Digits",
    "Imagefile": "digits.png",
    "Images": [
        { "Name": "zero", "XPos": 0, "YPos": 0, "Width": 8, "Height": 10, "YOffset": -10 },
        { "Name": "one", "XPos": 8, "YPos": 0, "Width": 6, "Height": 10, "XOffset": 1, "YOffset": -10 },
        { "Name": "comma", "XPos": 14, "YPos": 0, "Width": 3, "Height": 4, "YOffset": -1 }
    ]
}"#;

fn digits_definition(auto_scaled: bool) -> FontDefinition {
    let mut definition = FontDefinition::pixmap("DigitsFont", "digits.atlas");
    definition.auto_scaled = auto_scaled;
    definition.mappings = vec![
        MappingDefinition {
            codepoint: u32::from('0'),
            image: String::from("zero"),
            advance: HorizontalAdvance::Auto,
        },
        MappingDefinition {
            codepoint: u32::from('1'),
            image: String::from("one"),
            advance: HorizontalAdvance::Fixed(9.),
        },
    ];
    definition
}

fn png(size: u32) -> Vec<u8> {
    let mut bytes = Vec::new();
    image::DynamicImage::ImageRgba8(image::RgbaImage::new(size, size))
        .write_to(&mut std::io::Cursor::new(&mut bytes), image::ImageFormat::Png)
        .unwrap();
    bytes
}

fn area(width: f32) -> Rect<f32> {
    Rect::new(Point::new(0., 0.), Point::new(width, 1000.))
}

fn draw(font: &mut Font, text: &str, width: f32, formatting: TextFormatting) -> (usize, Vec<Rect<f32>>) {
    let mut buffer = GeometryBuffer::new();
    let area = area(width);
    let lines = font.draw_text(
        &mut buffer,
        text,
        &area,
        0.,
        &area,
        formatting,
        &ColorRect::default(),
        1.,
        1.,
    );
    (lines, buffer.quad_rects())
}

fn advance(font: &mut Font, c: char) -> f32 {
    font.glyph_data(u32::from(c)).map(|glyph: &FontGlyph| glyph.advance(1.)).unwrap()
}

#[test]
fn extent_is_sum_of_advances() {
    let mut harness = Harness::new();
    let font = harness.mono("Mono-10", 10.);
    // 10pt at 96 dpi is 13 1/3 pixels per em.
    let a = advance(font, 'A');
    let b = advance(font, 'B');
    assert_relative_eq!(a, 8., epsilon = 0.001);
    assert_relative_eq!(font.text_extent("AB", 1.), a + b);
    assert_relative_eq!(font.text_extent("AB", 2.), 2. * (a + b), epsilon = 0.001);
}

#[test]
fn extent_never_shrinks() {
    let mut harness = Harness::new();
    let font = harness.mono("Mono", 12.);
    let text = "Hello, wide world!\tOK";
    let mut previous = 0.;
    for end in 0..=text.len() {
        let extent = font.text_extent(&text[..end], 1.);
        assert!(extent >= previous, "{:?} is narrower", &text[..end]);
        previous = extent;
    }
}

#[test]
fn overhanging_glyphs_widen_the_extent() {
    let mut harness = Harness::new();
    // 12 pixel advances. '/' is 12 pixels wide and starts 4 pixels in.
    let font = harness.mono("Mono", 15.);
    let slash = font.glyph_data(u32::from('/')).unwrap().image().unwrap().resolve().unwrap();
    assert_relative_eq!(slash.width() + slash.offset_x(), 16.);
    assert_relative_eq!(font.text_extent("a/", 1.), 12. + 16., epsilon = 0.001);
    // Only the overhang past the final advance counts.
    assert_relative_eq!(font.text_extent("/a", 1.), 24., epsilon = 0.001);

    let font = harness.digits(false);
    if let FontVariant::Pixmap(mut pixmap) = font.variant_mut() {
        pixmap
            .define_mapping(u32::from('2'), "zero", HorizontalAdvance::Fixed(5.))
            .unwrap();
    } else {
        unreachable!()
    }
    assert_relative_eq!(font.text_extent("12", 1.), 9. + 8.);
    assert_relative_eq!(font.text_extent("21", 1.), 14.);
}

#[test]
fn missing_glyphs_are_ignored() {
    let mut harness = Harness::new();
    let font = harness.mono("Mono", 15.);
    assert_relative_eq!(font.text_extent("a\u{e9}b", 1.), font.text_extent("ab", 1.));
    assert!(font.glyph_data(0xE9).is_none());
}

#[test]
fn char_at_pixel_finds_characters() {
    let mut harness = Harness::new();
    // 12 pixel advances.
    let font = harness.mono("Mono", 15.);
    assert_eq!(font.char_at_pixel("hello", 0, 0., 1.), 0);
    assert_eq!(font.char_at_pixel("hello", 0, 11., 1.), 0);
    assert_eq!(font.char_at_pixel("hello", 0, 12., 1.), 1);
    assert_eq!(font.char_at_pixel("hello", 0, 100., 1.), 5);
    assert_eq!(font.char_at_pixel("hello", 2, 5., 1.), 2);
    assert_eq!(font.char_at_pixel("hello", 2, 13., 1.), 3);
    assert_eq!(font.char_at_pixel("hello", 7, 13., 1.), 7);
}

#[test]
fn line_counts_match_drawing() {
    let mut harness = Harness::new();
    let font = harness.mono("Mono", 15.);
    let texts = [
        "",
        "one line",
        "two\nlines",
        "the quick brown fox jumps over the lazy dog",
        "   ",
        "ab abcdefghijkl ab",
        "trailing\n",
    ];
    let formats = [
        TextFormatting::LeftAligned,
        TextFormatting::RightAligned,
        TextFormatting::Centred,
        TextFormatting::Justified,
        TextFormatting::WordWrapLeftAligned,
        TextFormatting::WordWrapRightAligned,
        TextFormatting::WordWrapCentred,
        TextFormatting::WordWrapJustified,
    ];
    for text in &texts {
        for &formatting in &formats {
            let counted = font.formatted_line_count(text, &area(100.), formatting, 1.);
            let (drawn, _) = draw(font, text, 100., formatting);
            assert!(counted >= 1);
            assert_eq!(counted, drawn, "{:?} as {}", text, formatting);
        }
    }
}

#[test]
fn word_wrap_respects_width() {
    let mut harness = Harness::new();
    let font = harness.mono("Mono", 15.);
    let text = "the quick brown fox jumps over the lazy dog";
    let (lines, quads) = draw(font, text, 100., TextFormatting::WordWrapLeftAligned);
    assert!(lines > 1);
    for quad in quads {
        assert!(quad.x2() <= 100., "{:?} overflows", quad);
    }

    // A single word wider than the area gets a line of its own.
    assert_eq!(
        font.formatted_line_count("ab abcdefghijkl ab", &area(100.), TextFormatting::WordWrapLeftAligned, 1.),
        3
    );
    assert_eq!(
        font.formatted_line_count("abcdefghijkl", &area(100.), TextFormatting::WordWrapCentred, 1.),
        1
    );
}

#[test]
fn justified_spaces_are_stretched() {
    let mut harness = Harness::new();
    let font = harness.mono("Mono", 15.);
    assert_relative_eq!(font.text_extent("a b c", 1.), 60.);

    let (_, natural) = draw(font, "a b c", 100., TextFormatting::LeftAligned);
    let (_, justified) = draw(font, "a b c", 100., TextFormatting::Justified);
    let offsets: Vec<f32> = justified
        .iter()
        .zip(natural.iter())
        .map(|(justified, natural)| justified.x1() - natural.x1())
        .collect();
    assert_eq!(offsets, vec![0., 20., 40.]);

    assert_relative_eq!(
        font.formatted_text_extent("a b c", &area(100.), TextFormatting::Justified, 1.),
        100.
    );
    assert_relative_eq!(
        font.formatted_text_extent("a b c\nab", &area(100.), TextFormatting::LeftAligned, 1.),
        60.
    );
}

#[test]
fn last_wrapped_justified_line_is_left_aligned() {
    let mut harness = Harness::new();
    let font = harness.mono("Mono", 15.);
    // "aa bb" fills 60 of 70 pixels, "cc" wraps onto the last line.
    let (lines, quads) = draw(font, "aa bb cc", 70., TextFormatting::WordWrapJustified);
    assert_eq!(lines, 2);
    let xs: Vec<f32> = quads.iter().map(|quad| quad.x1()).collect();
    assert_eq!(xs, vec![0., 12., 46., 58., 0., 12.]);
}

#[test]
fn alignment_and_baselines() {
    let mut harness = Harness::new();
    let font = harness.mono("Mono", 15.);
    // 20 pixels per em: ascender 16, line spacing 24, glyphs 10x14.
    assert_relative_eq!(font.baseline(1.), 16., epsilon = 0.001);
    assert_relative_eq!(font.line_spacing(1.), 24., epsilon = 0.001);
    assert_relative_eq!(font.descender(1.), -4., epsilon = 0.001);
    assert_relative_eq!(font.font_height(1.), 20., epsilon = 0.001);

    let (_, right) = draw(font, "ab", 100., TextFormatting::RightAligned);
    assert_relative_eq!(right[0].x1(), 76.);
    let (_, centred) = draw(font, "ab", 100., TextFormatting::Centred);
    assert_relative_eq!(centred[0].x1(), 38.);

    let (lines, quads) = draw(font, "a\nb", 100., TextFormatting::LeftAligned);
    assert_eq!(lines, 2);
    assert_relative_eq!(quads[0].y1(), 2.);
    assert_relative_eq!(quads[0].height(), 14.);
    assert_relative_eq!(quads[1].y1(), 26.);
}

#[test]
fn glyphs_are_rasterized_a_page_at_a_time() {
    let mut harness = Harness::new();
    let font = harness.mono("Mono", 10.);
    assert!(!font.glyphs().get(u32::from('A')).unwrap().is_rasterized());
    assert_eq!(font.max_codepoint(), SMILE);

    font.glyph_data(u32::from('A')).unwrap();
    assert!(font.glyphs().get(u32::from('~')).unwrap().is_rasterized());
    // Spare room on the page is filled with the following glyphs.
    assert!(font.glyphs().get(SMILE).unwrap().is_rasterized());

    // Failed glyphs are given an empty image.
    let snowman = font.glyphs().get(SNOWMAN).unwrap().image().unwrap().resolve().unwrap();
    assert_eq!(snowman.size(), Size::new(0., 0.));

    let a = font.glyph_data(u32::from('A')).unwrap().image().unwrap().resolve().unwrap();
    assert_eq!(a.size(), Size::new(7., 10.));
    assert_eq!(a.offset(), Point::new(0., -10.));

    match font.source() {
        GlyphSource::FreeType(source) => {
            assert_eq!(source.pages().len(), 1);
            let page = &source.pages()[0];
            assert!(page.texture_size().width >= crate::pack::MINIMUM_PAGE_SIZE);
            assert!(page.is_image_defined(&u32::from('A').to_string()));
        }
        GlyphSource::Pixmap(_) => unreachable!(),
    }
}

#[test]
fn full_pages_spill_onto_new_pages() {
    let mut harness = Harness::with_max_texture_size(32);
    let font = harness.mono("Mono", 10.);
    font.glyph_data(u32::from('A')).unwrap();

    let pages = match font.source() {
        GlyphSource::FreeType(source) => source.pages().to_vec(),
        GlyphSource::Pixmap(_) => unreachable!(),
    };
    assert!(pages.len() > 1);
    assert!(pages
        .iter()
        .all(|page| page.texture_size() == Size::new(32, 32)));
    for codepoint in u32::from('!')..=u32::from('~') {
        let image = font
            .glyphs()
            .get(codepoint)
            .unwrap()
            .image()
            .unwrap()
            .resolve()
            .unwrap();
        assert!(
            image.width() > 0. && image.height() > 0.,
            "codepoint {} has an empty image",
            codepoint
        );
    }
}

#[test]
fn glyphs_larger_than_any_page_get_empty_images() {
    let mut harness = Harness::with_max_texture_size(16);
    // 20pt at 96 dpi renders 14x19 glyphs, taller than a 16 pixel page.
    let font = harness.mono("Large", 20.);
    let glyph = font.glyph_data(u32::from('A')).unwrap();
    assert_relative_eq!(glyph.advance(1.), 16., epsilon = 0.001);
    let image = glyph.image().unwrap().resolve().unwrap();
    assert_eq!(image.size(), Size::new(0., 0.));

    assert_relative_eq!(font.text_extent("AA", 1.), 32., epsilon = 0.001);
    let (lines, quads) = draw(font, "AA", 100., TextFormatting::LeftAligned);
    assert_eq!(lines, 1);
    assert!(quads.is_empty());
}

#[test]
fn native_resolution_must_be_positive() {
    let mut harness = Harness::new();
    let mut definition = FontDefinition::freetype("Scaled", "mono.ttf");
    definition.auto_scaled = true;
    definition.native_resolution = Size::new(0., 0.);
    assert!(matches!(
        harness.manager.create(&definition, DuplicatePolicy::Error),
        Err(Error::Definition(_))
    ));
    assert!(harness.manager.is_empty());

    definition.native_resolution = Size::new(640., 480.);
    let font = harness
        .manager
        .create(&definition, DuplicatePolicy::Error)
        .unwrap();
    let extent = font.text_extent("A", 1.);
    assert!(matches!(
        font.set_native_resolution(Size::new(0., 480.)),
        Err(Error::InvalidRequest(_))
    ));
    assert_eq!(font.native_resolution(), Size::new(640., 480.));
    assert_relative_eq!(font.text_extent("A", 1.), extent);
}

#[test]
fn anti_aliasing_selects_coverage() {
    let mut harness = Harness::new();
    let font = harness.mono("Mono", 10.);
    font.prepare_glyphs(65..=65).unwrap();
    let alphas = |font: &Font| -> Vec<u8> {
        match font.source() {
            GlyphSource::FreeType(source) => source.pages()[0]
                .rgba_pixels()
                .unwrap()
                .chunks_exact(4)
                .map(|pixel| pixel[3])
                .collect(),
            GlyphSource::Pixmap(_) => unreachable!(),
        }
    };
    assert!(alphas(font).contains(&0x80));

    match font.variant_mut() {
        FontVariant::FreeType(mut freetype) => {
            freetype.set_anti_aliased(false).unwrap();
            assert!(freetype.pages().is_empty());
        }
        FontVariant::Pixmap(_) => unreachable!(),
    }
    font.prepare_glyphs(65..=65).unwrap();
    let alphas = alphas(font);
    assert!(alphas.contains(&0xFF));
    assert!(alphas.iter().all(|alpha| *alpha == 0 || *alpha == 0xFF));
}

#[test]
fn point_size_changes_rebuild_the_font() {
    let mut harness = Harness::new();
    let font = harness.mono("Mono", 10.);
    font.glyph_data(u32::from('A')).unwrap();
    let live = harness.renderer.live_textures();
    assert_eq!(live, 1);

    let font = harness.manager.get_mut("Mono").unwrap();
    if let FontVariant::FreeType(mut freetype) = font.variant_mut() {
        freetype.set_point_size(15.).unwrap();
        assert_relative_eq!(freetype.point_size(), 15.);
    }
    assert_eq!(harness.renderer.live_textures(), 0);
    assert_relative_eq!(advance(font, 'A'), 12.);
    assert_eq!(harness.renderer.live_textures(), 1);
}

#[test]
fn line_spacing_override() {
    let mut harness = Harness::new();
    let mut definition = FontDefinition::freetype("Spaced", "mono.ttf");
    definition.line_spacing = 30.;
    let font = harness
        .manager
        .create(&definition, DuplicatePolicy::Error)
        .unwrap();
    assert_relative_eq!(font.line_spacing(1.), 30.);
    if let FontVariant::FreeType(mut freetype) = font.variant_mut() {
        freetype.set_line_spacing(0.).unwrap();
    }
    // 12pt at 96 dpi: 16 pixels per em.
    assert_relative_eq!(font.line_spacing(1.), 19.2, epsilon = 0.001);
}

#[test]
fn auto_scaled_freetype_fonts_follow_the_display() {
    let mut harness = Harness::new();
    let mut definition = FontDefinition::freetype("Scaled", "mono.ttf");
    definition.point_size = 15.;
    definition.auto_scaled = true;
    harness
        .manager
        .create(&definition, DuplicatePolicy::Error)
        .unwrap();

    harness
        .manager
        .notify_display_size_changed(Size::new(1280., 960.))
        .unwrap();
    let font = harness.manager.get_mut("Scaled").unwrap();
    assert_relative_eq!(font.text_extent("ab", 1.), 48.);
    assert_relative_eq!(font.scale().width, 2.);

    font.set_auto_scaling_enabled(false).unwrap();
    assert_relative_eq!(font.text_extent("ab", 1.), 24.);
}

#[test]
fn bitmap_strikes_use_the_nearest_size() {
    let mut harness = Harness::new();
    let font = harness
        .manager
        .create(&FontDefinition::freetype("Strikes", "strikes.fon"), DuplicatePolicy::Error)
        .unwrap();
    assert_relative_eq!(font.ascender(1.), 8., epsilon = 0.001);
    assert_relative_eq!(font.line_spacing(1.), 12., epsilon = 0.001);
    assert_relative_eq!(advance(font, 'x'), 6.);
}

#[test]
fn construction_failures_register_nothing() {
    let mut harness = Harness::new();
    assert!(matches!(
        harness
            .manager
            .create(&FontDefinition::freetype("Symbols", "symbols.ttf"), DuplicatePolicy::Error),
        Err(Error::NoUnicodeCharmap(_))
    ));
    harness.resources.insert("broken.ttf", "", "garbage");
    assert!(matches!(
        harness
            .manager
            .create(&FontDefinition::freetype("Broken", "broken.ttf"), DuplicatePolicy::Error),
        Err(Error::InvalidFontData(name)) if name == "broken.ttf"
    ));
    assert!(matches!(
        harness
            .manager
            .create(&FontDefinition::freetype("Missing", "missing.ttf"), DuplicatePolicy::Error),
        Err(Error::ResourceNotFound { .. })
    ));
    assert!(harness.manager.is_empty());
    assert!(harness.manager.default_font().is_none());
}

#[test]
fn manager_duplicates_and_defaults() {
    let mut harness = Harness::new();
    harness.mono("First", 10.);
    harness.mono("Second", 15.);
    assert_eq!(harness.manager.default_font().unwrap().name(), "First");

    let duplicate = FontDefinition::freetype("First", "mono.ttf");
    assert!(matches!(
        harness.manager.create(&duplicate, DuplicatePolicy::Error),
        Err(Error::AlreadyExists { .. })
    ));
    // Returning keeps the 10pt font.
    let returned = harness
        .manager
        .create(&duplicate, DuplicatePolicy::Return)
        .unwrap();
    assert_relative_eq!(advance(returned, 'a'), 8., epsilon = 0.001);
    // Replacing creates the default 12pt font.
    let replaced = harness
        .manager
        .create(&duplicate, DuplicatePolicy::Replace)
        .unwrap();
    assert_relative_eq!(advance(replaced, 'a'), 9.6, epsilon = 0.001);
    assert_eq!(harness.manager.len(), 2);

    harness.manager.set_default_font("Second").unwrap();
    assert!(harness.manager.set_default_font("Third").is_err());
    harness.manager.destroy("Second").unwrap();
    assert!(harness.manager.default_font().is_none());
    assert!(matches!(
        harness.manager.destroy("Second"),
        Err(Error::UnknownObject { .. })
    ));
    assert_eq!(harness.manager.font_names().collect::<Vec<_>>(), vec!["First"]);
}

#[test]
fn destroying_fonts_releases_textures() {
    let mut harness = Harness::new();
    harness.mono("Mono", 10.).prepare_glyphs(0..=0x7E).unwrap();
    harness.digits(false);
    assert_eq!(harness.renderer.live_textures(), 2);
    harness.manager.destroy("Mono").unwrap();
    assert_eq!(harness.renderer.live_textures(), 1);
    harness.manager.destroy_all();
    assert_eq!(harness.renderer.live_textures(), 0);
}

#[test]
fn pixmap_mappings() {
    let mut harness = Harness::new();
    let font = harness.digits(false);
    // The zero is 8 wide; the one has a fixed advance of 9.
    assert_relative_eq!(advance(font, '0'), 8.);
    assert_relative_eq!(advance(font, '1'), 9.);
    assert_relative_eq!(font.text_extent("01", 1.), 17.);
    assert_relative_eq!(font.ascender(1.), 10.);
    assert_relative_eq!(font.descender(1.), 0.);
    assert_eq!(font.max_codepoint(), u32::from('1'));

    if let FontVariant::Pixmap(mut pixmap) = font.variant_mut() {
        assert!(matches!(
            pixmap.define_mapping(u32::from('0'), "one", HorizontalAdvance::Auto),
            Err(Error::InvalidRequest(_))
        ));
        assert!(matches!(
            pixmap.define_mapping(u32::from('2'), "two", HorizontalAdvance::Auto),
            Err(Error::UnknownObject { .. })
        ));
        assert!(matches!(
            pixmap.define_mapping_str("x,1,zero"),
            Err(Error::InvalidRequest(_))
        ));
        assert!(matches!(
            pixmap.define_mapping_str("44,2"),
            Err(Error::InvalidRequest(_))
        ));
        pixmap.define_mapping_str("44, -1, comma").unwrap();
    } else {
        unreachable!()
    }
    assert_relative_eq!(advance(font, ','), 3.);
    // The comma hangs 3 pixels below the baseline.
    assert_relative_eq!(font.descender(1.), -3.);
    assert_eq!(font.max_codepoint(), u32::from('1'));
}

#[test]
fn pixmap_fonts_round_trip() {
    let mut harness = Harness::new();
    let extent = harness.digits(false).text_extent("0110", 1.);
    let written = harness.manager.write_font("DigitsFont").unwrap();
    harness.manager.destroy("DigitsFont").unwrap();

    harness.resources.insert("digits.font", "", written.as_str());
    let font = harness
        .manager
        .create_from_file("digits.font", "", DuplicatePolicy::Error)
        .unwrap();
    assert_relative_eq!(font.text_extent("0110", 1.), extent);

    let definition = font.to_definition();
    assert_eq!(definition.kind, FontKind::Pixmap);
    let advances: Vec<HorizontalAdvance> = definition.mappings.iter().map(|m| m.advance).collect();
    assert_eq!(
        advances,
        vec![HorizontalAdvance::Fixed(8.), HorizontalAdvance::Fixed(9.)]
    );
}

#[test]
fn auto_scaling_is_idempotent() {
    let mut harness = Harness::new();
    harness.digits(true);
    let large = Size::new(1280., 960.);

    harness.manager.notify_display_size_changed(large).unwrap();
    let first = harness.manager.get_mut("DigitsFont").unwrap().text_extent("01", 1.);
    harness.manager.notify_display_size_changed(large).unwrap();
    let font = harness.manager.get_mut("DigitsFont").unwrap();
    assert_relative_eq!(font.text_extent("01", 1.), first);
    assert_relative_eq!(first, 34.);
    assert_relative_eq!(font.ascender(1.), 20.);

    harness
        .manager
        .notify_display_size_changed(Size::new(640., 480.))
        .unwrap();
    let font = harness.manager.get_mut("DigitsFont").unwrap();
    assert_relative_eq!(font.text_extent("01", 1.), 17.);
    assert_relative_eq!(font.ascender(1.), 10.);
}

#[test]
fn borrowed_atlases_outlive_fonts() {
    let mut harness = Harness::new();
    let atlas = AtlasDefinition::parse(DIGITS_ATLAS)
        .unwrap()
        .load(harness.renderer.clone(), "")
        .unwrap();
    let atlas = harness.manager.atlases_mut().register(atlas).unwrap();

    let mut definition = digits_definition(false);
    definition.resource_group = String::from(SHARED_ATLAS_GROUP);
    definition.filename = String::from("Digits");
    let font = harness
        .manager
        .create(&definition, DuplicatePolicy::Error)
        .unwrap();
    match font.source() {
        GlyphSource::Pixmap(source) => {
            assert!(!source.owns_atlas());
            assert!(source.atlas().ptr_eq(&atlas));
            assert_eq!(source.image_name_prefix(), "Digits");
        }
        GlyphSource::FreeType(_) => unreachable!(),
    }
    assert_relative_eq!(font.text_extent("01", 1.), 17.);

    harness.manager.destroy("DigitsFont").unwrap();
    assert!(atlas.is_loaded());
    assert_eq!(harness.renderer.live_textures(), 1);

    definition.filename = String::from("Unregistered");
    assert!(matches!(
        harness.manager.create(&definition, DuplicatePolicy::Error),
        Err(Error::UnknownObject { .. })
    ));
}

#[test]
fn shared_atlases_keep_their_scaling() {
    let mut harness = Harness::new();
    let atlas = AtlasDefinition::parse(DIGITS_ATLAS)
        .unwrap()
        .load(harness.renderer.clone(), "")
        .unwrap();
    let atlas = harness.manager.atlases_mut().register(atlas).unwrap();
    let native = atlas.native_resolution();

    let mut definition = digits_definition(true);
    definition.resource_group = String::from(SHARED_ATLAS_GROUP);
    definition.filename = String::from("Digits");
    definition.native_resolution = Size::new(320., 240.);
    harness
        .manager
        .create(&definition, DuplicatePolicy::Error)
        .unwrap();
    assert!(!atlas.is_auto_scaled());
    assert_eq!(atlas.native_resolution(), native);

    harness
        .manager
        .notify_display_size_changed(Size::new(1280., 960.))
        .unwrap();
    assert!(!atlas.is_auto_scaled());
    assert_eq!(atlas.native_resolution(), native);
    assert_eq!(atlas.image("zero").unwrap().size(), Size::new(8., 10.));
}

#[test]
fn pixmap_fonts_can_switch_atlases() {
    let mut harness = Harness::new();
    let shared = AtlasDefinition::parse(DIGITS_ATLAS)
        .unwrap()
        .load(harness.renderer.clone(), "")
        .unwrap();
    harness.manager.atlases_mut().register(shared).unwrap();
    harness.digits(false);
    assert_eq!(harness.renderer.live_textures(), 2);

    let atlases = std::mem::take(harness.manager.atlases_mut());
    let font = harness.manager.get_mut("DigitsFont").unwrap();
    if let FontVariant::Pixmap(mut pixmap) = font.variant_mut() {
        pixmap.set_image_name_prefix(&atlases, "Digits").unwrap();
        assert!(pixmap.atlas().is_loaded());
        pixmap.define_mapping_str("48,-1,zero").unwrap();
    } else {
        unreachable!()
    }
    // The owned atlas was released and the old mappings discarded.
    assert_eq!(harness.renderer.live_textures(), 1);
    assert!(!font.is_codepoint_available(u32::from('1')));
    assert_eq!(font.resource_group(), SHARED_ATLAS_GROUP);
    assert_eq!(font.filename(), "Digits");
    assert_relative_eq!(font.text_extent("0", 1.), 8.);
}

#[test]
fn freetype_fonts_round_trip() {
    let mut harness = Harness::new();
    let mut definition = FontDefinition::freetype("Mono", "mono.ttf");
    definition.point_size = 15.;
    definition.anti_aliased = false;
    definition.native_resolution = Size::new(800., 600.);
    harness
        .manager
        .create(&definition, DuplicatePolicy::Error)
        .unwrap();
    let written = harness.manager.write_font("Mono").unwrap();
    assert_eq!(FontDefinition::parse(&written).unwrap(), definition);
    assert!(matches!(
        harness.manager.write_font("Other"),
        Err(Error::UnknownObject { .. })
    ));
}
