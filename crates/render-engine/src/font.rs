//! Fixed 8x8 bitmap text.
//!
//! Tiles carry short labels only, so a built-in bitmap font keeps output
//! byte-identical across machines without shipping a font file.

use font8x8::{UnicodeFonts, BASIC_FONTS, LATIN_FONTS};
use image::{Rgb, RgbImage};

/// Horizontal advance of one glyph in pixels.
pub const GLYPH_ADVANCE: u32 = 8;

/// Height of one glyph in pixels.
pub const GLYPH_HEIGHT: u32 = 8;

const FALLBACK_GLYPH: char = '?';

fn glyph(c: char) -> [u8; 8] {
    BASIC_FONTS
        .get(c)
        .or_else(|| LATIN_FONTS.get(c))
        .or_else(|| BASIC_FONTS.get(FALLBACK_GLYPH))
        .unwrap_or([0; 8])
}

/// Draw `text` with its top-left corner at (`x`, `y`).
///
/// Pixels outside the image are clipped, so callers may pass negative or
/// oversized positions. Tabs become four spaces and other control
/// characters draw nothing.
pub fn draw_text(image: &mut RgbImage, x: i32, y: i32, text: &str, color: Rgb<u8>) {
    let (width, height) = (image.width() as i64, image.height() as i64);
    let mut pen_x = x as i64;

    for c in text.chars() {
        if c == '\t' {
            pen_x += 4 * GLYPH_ADVANCE as i64;
            continue;
        }
        if c.is_control() {
            continue;
        }

        for (row, bits) in glyph(c).iter().enumerate() {
            let py = y as i64 + row as i64;
            if py < 0 || py >= height {
                continue;
            }
            for col in 0..8i64 {
                if bits & (1 << col) == 0 {
                    continue;
                }
                let px = pen_x + col;
                if px >= 0 && px < width {
                    image.put_pixel(px as u32, py as u32, color);
                }
            }
        }
        pen_x += GLYPH_ADVANCE as i64;
    }
}

/// Pixel width of `text` when drawn.
pub fn text_width(text: &str) -> u32 {
    text.chars()
        .map(|c| match c {
            '\t' => 4 * GLYPH_ADVANCE,
            c if c.is_control() => 0,
            _ => GLYPH_ADVANCE,
        })
        .sum()
}

/// How many glyphs fit in `width` pixels.
pub fn chars_that_fit(width: u32) -> usize {
    (width / GLYPH_ADVANCE) as usize
}

/// Cut `text` to at most `max_chars` characters, ending in `...` when cut.
pub fn ellipsize(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let mut out: String = text.chars().take(max_chars.saturating_sub(3)).collect();
    out.push_str("...");
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lit_pixels(image: &RgbImage) -> usize {
        image.pixels().filter(|p| p.0 != [0, 0, 0]).count()
    }

    #[test]
    fn test_draws_inside_bounds() {
        let mut image = RgbImage::new(40, 12);
        draw_text(&mut image, 2, 2, "Hi", Rgb([255, 255, 0]));
        assert!(lit_pixels(&image) > 0);
    }

    #[test]
    fn test_clips_outside_bounds() {
        let mut image = RgbImage::new(10, 10);
        draw_text(&mut image, -100, -100, "clipped", Rgb([255, 255, 255]));
        draw_text(&mut image, 500, 2, "clipped", Rgb([255, 255, 255]));
        assert_eq!(lit_pixels(&image), 0);

        draw_text(&mut image, 6, 6, "W", Rgb([255, 255, 255]));
        assert!(lit_pixels(&image) > 0);
    }

    #[test]
    fn test_unknown_glyph_falls_back() {
        let mut image = RgbImage::new(16, 8);
        draw_text(&mut image, 0, 0, "\u{4e16}", Rgb([255, 255, 255]));
        assert!(lit_pixels(&image) > 0);
    }

    #[test]
    fn test_ellipsize() {
        assert_eq!(ellipsize("short", 10), "short");
        assert_eq!(ellipsize("a long line of text", 10), "a long ...");
        assert_eq!(ellipsize("abcdef", 2), "...");
    }

    #[test]
    fn test_text_width() {
        assert_eq!(text_width("abc"), 24);
        assert_eq!(text_width("a\tb"), 48);
        assert_eq!(chars_that_fit(100), 12);
    }
}
