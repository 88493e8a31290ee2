//! Built-in bitmap text.
//!
//! Latin, Greek and box glyphs come from the `font8x8` tables: 8 rows of 8
//! bits, bit 0 being the leftmost pixel. Kana, kanji and full-width
//! punctuation come from GNU Unifont (16x16) through `u8g2-fonts`. Either way
//! a glyph fills the same 8-cell square, so a font of size `s` draws every
//! 8x8 bit as an `s / 10` square and every Unifont bit at half that. One
//! square of padding sits above the glyph, so `y` always names the top of the
//! line box. Characters neither source covers are drawn as hollow boxes of
//! the same advance.

use std::convert::Infallible;

use embedded_graphics::Pixel;
use embedded_graphics::draw_target::DrawTarget;
use embedded_graphics::geometry::{OriginDimensions, Point, Size};
use embedded_graphics::pixelcolor::BinaryColor;
use font8x8::{
    BASIC_FONTS, BLOCK_FONTS, BOX_FONTS, GREEK_FONTS, HIRAGANA_FONTS, LATIN_FONTS, MISC_FONTS,
    UnicodeFonts,
};
use u8g2_fonts::types::{FontColor, VerticalPosition};
use u8g2_fonts::{FontRenderer, fonts};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Font {
    pub size: f32,
    pub bold: bool,
}

impl Font {
    pub const fn regular(size: f32) -> Self {
        Self { size, bold: false }
    }

    pub const fn bold(size: f32) -> Self {
        Self { size, bold: true }
    }

    /// Side of one 8x8 glyph pixel.
    pub fn cell(self) -> f32 {
        self.size / 10.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Glyph {
    /// Advances without drawing.
    Blank,
    Bitmap([u8; 8]),
    /// 16x16 Unifont rows, bit 0 leftmost.
    Fine([u16; 16]),
    /// No table covers it; drawn as a hollow box.
    Missing,
}

pub fn glyph(ch: char) -> Glyph {
    if ch == ' ' || ch.is_control() {
        return Glyph::Blank;
    }
    // Wide text stays in one typeface; hiragana has both.
    if is_wide(ch) {
        return unifont(ch)
            .map(Glyph::Fine)
            .or_else(|| small(ch).map(Glyph::Bitmap))
            .unwrap_or(Glyph::Missing);
    }
    small(ch)
        .map(Glyph::Bitmap)
        .or_else(|| unifont(ch).map(Glyph::Fine))
        .unwrap_or(Glyph::Missing)
}

fn small(ch: char) -> Option<[u8; 8]> {
    BASIC_FONTS
        .get(ch)
        .or_else(|| LATIN_FONTS.get(ch))
        .or_else(|| GREEK_FONTS.get(ch))
        .or_else(|| HIRAGANA_FONTS.get(ch))
        .or_else(|| BOX_FONTS.get(ch))
        .or_else(|| BLOCK_FONTS.get(ch))
        .or_else(|| MISC_FONTS.get(ch))
}

/// One-glyph draw target collecting set pixels into rows.
#[derive(Default)]
struct GlyphMask {
    rows: [u16; 16],
}

impl OriginDimensions for GlyphMask {
    fn size(&self) -> Size {
        Size::new(16, 16)
    }
}

impl DrawTarget for GlyphMask {
    type Color = BinaryColor;
    type Error = Infallible;

    fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Self::Color>>,
    {
        for Pixel(point, color) in pixels {
            if color.is_on() && (0..16).contains(&point.x) && (0..16).contains(&point.y) {
                self.rows[point.y as usize] |= 1 << point.x;
            }
        }
        Ok(())
    }
}

fn unifont(ch: char) -> Option<[u16; 16]> {
    let mut mask = GlyphMask::default();
    FontRenderer::new::<fonts::u8g2_font_unifont_t_japanese3>()
        .render(
            ch,
            Point::new(0, 0),
            VerticalPosition::Top,
            FontColor::Transparent(BinaryColor::On),
            &mut mask,
        )
        .ok()?;
    mask.rows.iter().any(|r| *r != 0).then_some(mask.rows)
}

/// East Asian wide characters take ten cells instead of eight.
pub fn is_wide(ch: char) -> bool {
    matches!(
        ch as u32,
        0x1100..=0x115F
            | 0x2E80..=0x303E
            | 0x3041..=0x33FF
            | 0x3400..=0x4DBF
            | 0x4E00..=0x9FFF
            | 0xA000..=0xA4CF
            | 0xAC00..=0xD7A3
            | 0xF900..=0xFAFF
            | 0xFE30..=0xFE4F
            | 0xFF00..=0xFF60
            | 0xFFE0..=0xFFE6
            | 0x20000..=0x3FFFD
    )
}

pub fn char_advance(ch: char, font: Font) -> f32 {
    if ch.is_control() {
        0.0
    } else if is_wide(ch) {
        font.cell() * 10.0
    } else {
        font.cell() * 8.0
    }
}

pub fn measure(text: &str, font: Font) -> f32 {
    text.chars().map(|ch| char_advance(ch, font)).sum()
}

/// Greedy word wrap. Every newline in `text` starts a new line, blank
/// paragraphs stay as empty lines, and a word wider than `max_width` on its
/// own is broken between characters.
pub fn wrap_preserving_newlines(text: &str, max_width: f32, font: Font) -> Vec<String> {
    let text = text.replace("\r\n", "\n").replace('\r', "\n");
    let mut lines = Vec::new();

    for paragraph in text.split('\n') {
        if paragraph.trim().is_empty() {
            lines.push(String::new());
            continue;
        }
        let mut line = String::new();
        for word in paragraph.split_whitespace() {
            let candidate = if line.is_empty() {
                word.to_string()
            } else {
                format!("{line} {word}")
            };
            if measure(&candidate, font) <= max_width {
                line = candidate;
                continue;
            }
            if !line.is_empty() {
                lines.push(std::mem::take(&mut line));
            }
            if measure(word, font) <= max_width {
                line = word.to_string();
                continue;
            }
            for ch in word.chars() {
                if !line.is_empty() && measure(&line, font) + char_advance(ch, font) > max_width {
                    lines.push(std::mem::take(&mut line));
                }
                line.push(ch);
            }
        }
        if !line.is_empty() {
            lines.push(line);
        }
    }
    lines
}
