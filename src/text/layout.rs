use crate::{
    atlas::Image,
    color::ColorRect,
    math::{PixelAlignment, Point, Rect, Size},
    renderer::{GeometryBuffer, QuadSplitMode},
    text::{Font, TextFormatting},
};

/// Characters that separate words when wrapping.
pub const WORD_DELIMITERS: &[char] = &[' ', '\n', '\t', '\r'];

/// One line of laid out text.
#[derive(Clone, Copy, Debug, PartialEq)]
struct Line<'t> {
    text: &'t str,
    formatting: TextFormatting,
}

/// A glyph's layout values, detached from the font so the font can be
/// borrowed again.
struct PlacedGlyph {
    advance: f32,
    image: Option<Image>,
}

impl Font {
    fn placed_glyph(&mut self, c: char, x_scale: f32) -> Option<PlacedGlyph> {
        self.glyph_data(u32::from(c)).map(|glyph| PlacedGlyph {
            advance: glyph.advance(x_scale),
            image: glyph.image().and_then(|image| image.resolve()),
        })
    }

    /// Returns the width of `text` drawn on one line. Glyphs that extend
    /// past their advance widen the extent. Characters without a glyph are
    /// ignored.
    pub fn text_extent(&mut self, text: &str, x_scale: f32) -> f32 {
        let mut advance_extent = 0_f32;
        let mut rendered_extent = 0_f32;
        for c in text.chars() {
            if let Some(glyph) = self.placed_glyph(c, x_scale) {
                let rendered = glyph
                    .image
                    .map_or(0., |image| (image.width() + image.offset_x()) * x_scale);
                rendered_extent = rendered_extent.max(advance_extent + rendered);
                advance_extent += glyph.advance;
            }
        }
        advance_extent.max(rendered_extent)
    }

    /// Returns the index, in characters, of the character in `text` at
    /// `pixel` pixels from the start of the character at index `start`.
    ///
    /// Returns `start` if `pixel` is not positive, and the character count of
    /// `text` if `pixel` is beyond its end.
    pub fn char_at_pixel(&mut self, text: &str, start: usize, pixel: f32, x_scale: f32) -> usize {
        let char_count = text.chars().count();
        if pixel <= 0. || char_count <= start {
            return start;
        }

        let mut extent = 0.;
        for (index, c) in text.chars().enumerate().skip(start) {
            if let Some(glyph) = self.placed_glyph(c, x_scale) {
                extent += glyph.advance;
                if pixel < extent {
                    return index;
                }
            }
        }
        char_count
    }

    /// Draws `text` into `area` and returns the number of lines drawn,
    /// which is never less than one.
    ///
    /// Lines are separated by `\n`. The first line's baseline is placed at
    /// the font's baseline below the top of `area`, and each line is
    /// [`Font::line_spacing`] below the previous one. Quads are clipped to
    /// `clip`.
    #[allow(clippy::too_many_arguments)]
    pub fn draw_text(
        &mut self,
        buffer: &mut GeometryBuffer,
        text: &str,
        area: &Rect<f32>,
        z: f32,
        clip: &Rect<f32>,
        formatting: TextFormatting,
        colors: &ColorRect,
        x_scale: f32,
        y_scale: f32,
    ) -> usize {
        let lines = self.break_lines(text, area.width(), formatting, x_scale);
        let line_spacing = self.line_spacing(y_scale);
        let mut top = area.y1();
        for line in &lines {
            let line_area = Rect::new(Point::new(area.x1(), top), Point::new(area.x2(), area.y2()));
            self.draw_line(buffer, line, &line_area, z, clip, colors, x_scale, y_scale);
            top += line_spacing;
        }
        lines.len()
    }

    /// Returns the number of lines [`Font::draw_text`] would draw.
    pub fn formatted_line_count(
        &mut self,
        text: &str,
        area: &Rect<f32>,
        formatting: TextFormatting,
        x_scale: f32,
    ) -> usize {
        self.break_lines(text, area.width(), formatting, x_scale).len()
    }

    /// Returns the width of the widest line [`Font::draw_text`] would draw.
    /// Justified text always fills the width of `area`.
    pub fn formatted_text_extent(
        &mut self,
        text: &str,
        area: &Rect<f32>,
        formatting: TextFormatting,
        x_scale: f32,
    ) -> f32 {
        let lines = self.break_lines(text, area.width(), formatting, x_scale);
        let mut widest = 0_f32;
        for line in lines {
            widest = widest.max(self.text_extent(line.text, x_scale));
        }

        if formatting.is_justified() {
            widest.max(area.width())
        } else {
            widest
        }
    }

    fn break_lines<'t>(
        &mut self,
        text: &'t str,
        width: f32,
        formatting: TextFormatting,
        x_scale: f32,
    ) -> Vec<Line<'t>> {
        let mut lines = Vec::new();
        for paragraph in text.split('\n') {
            if formatting.is_word_wrapped() {
                self.wrap_paragraph(paragraph, width, formatting, x_scale, &mut lines);
            } else {
                lines.push(Line {
                    text: paragraph,
                    formatting,
                });
            }
        }
        lines
    }

    /// Greedily fills lines with whole words. A word that does not fit on
    /// a non-empty line starts the next one, without its leading
    /// whitespace. A word wider than `width` is given a line of its own.
    fn wrap_paragraph<'t>(
        &mut self,
        paragraph: &'t str,
        width: f32,
        formatting: TextFormatting,
        x_scale: f32,
        lines: &mut Vec<Line<'t>>,
    ) {
        let line_formatting = formatting.unwrapped();
        let mut line_start = 0;
        let mut line_end = 0;
        let mut position = 0;
        loop {
            let word_end = next_word(paragraph, position);
            if word_end == position {
                break;
            }
            let word = &paragraph[position..word_end];
            let line = &paragraph[line_start..line_end];
            if !line.is_empty()
                && self.text_extent(line, x_scale) + self.text_extent(word, x_scale) > width
            {
                lines.push(Line {
                    text: line,
                    formatting: line_formatting,
                });
                line_start = word_end - word.trim_start_matches(WORD_DELIMITERS).len();
            }
            line_end = word_end;
            position = word_end;
        }

        // The last line of a justified paragraph is left aligned.
        let last_formatting = if line_formatting == TextFormatting::Justified {
            TextFormatting::LeftAligned
        } else {
            line_formatting
        };
        lines.push(Line {
            text: &paragraph[line_start..line_end],
            formatting: last_formatting,
        });
    }

    #[allow(clippy::too_many_arguments)]
    fn draw_line(
        &mut self,
        buffer: &mut GeometryBuffer,
        line: &Line<'_>,
        area: &Rect<f32>,
        z: f32,
        clip: &Rect<f32>,
        colors: &ColorRect,
        x_scale: f32,
        y_scale: f32,
    ) {
        let mut space_extra = 0.;
        let mut x = match line.formatting {
            TextFormatting::RightAligned => area.x2() - self.text_extent(line.text, x_scale),
            TextFormatting::Centred => {
                let extent = self.text_extent(line.text, x_scale);
                (area.x1() + (area.width() - extent) / 2.).pixel_aligned()
            }
            TextFormatting::Justified => {
                let spaces = line.text.chars().filter(|c| is_stretchable(*c)).count();
                if spaces > 0 {
                    let extent = self.text_extent(line.text, x_scale);
                    space_extra = (area.width().max(extent) - extent) / spaces as f32;
                }
                area.x1()
            }
            _ => area.x1(),
        };

        let base_y = area.y1() + self.baseline(y_scale);
        for c in line.text.chars() {
            if let Some(glyph) = self.placed_glyph(c, x_scale) {
                if let Some(image) = glyph.image {
                    let offset_y = image.offset_y();
                    let y = base_y - (offset_y - offset_y * y_scale);
                    image.draw(
                        buffer,
                        Point::new(x, y),
                        Size::new(image.width() * x_scale, image.height() * y_scale),
                        z,
                        clip,
                        colors,
                        QuadSplitMode::default(),
                    );
                }
                x += glyph.advance;
            }
            if is_stretchable(c) {
                x += space_extra;
            }
        }
    }
}

fn is_stretchable(c: char) -> bool {
    c == ' ' || c == '\t'
}

/// Returns the end of the word starting at byte `start` of `text`. The word
/// includes any delimiters before it. Returns `start` if only delimiters
/// remain.
fn next_word(text: &str, start: usize) -> usize {
    let rest = &text[start..];
    let word_start = match rest.find(|c: char| !WORD_DELIMITERS.contains(&c)) {
        Some(word_start) => word_start,
        None => return start,
    };
    let word_end = rest[word_start..]
        .find(WORD_DELIMITERS)
        .map_or(rest.len(), |end| word_start + end);
    start + word_end
}
