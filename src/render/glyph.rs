//! Built-in pixel font
//!
//! All text is drawn from a 3x5 bitmap font so rendering never depends on
//! system font libraries. Lowercase letters render as uppercase.

use plotters::coord::Shift;
use plotters::prelude::*;

/// Glyph cell width in font pixels (3 columns plus 1 spacing)
const ADVANCE: i32 = 4;
/// Glyph height in font pixels
const GLYPH_HEIGHT: i32 = 5;

const fn glyph_bits(ch: char) -> [u8; 5] {
    match ch {
        '0' => [0b111, 0b101, 0b101, 0b101, 0b111],
        '1' => [0b010, 0b110, 0b010, 0b010, 0b111],
        '2' => [0b111, 0b001, 0b111, 0b100, 0b111],
        '3' => [0b111, 0b001, 0b111, 0b001, 0b111],
        '4' => [0b101, 0b101, 0b111, 0b001, 0b001],
        '5' => [0b111, 0b100, 0b111, 0b001, 0b111],
        '6' => [0b111, 0b100, 0b111, 0b101, 0b111],
        '7' => [0b111, 0b001, 0b010, 0b010, 0b010],
        '8' => [0b111, 0b101, 0b111, 0b101, 0b111],
        '9' => [0b111, 0b101, 0b111, 0b001, 0b111],
        'A' => [0b010, 0b101, 0b111, 0b101, 0b101],
        'B' => [0b110, 0b101, 0b110, 0b101, 0b110],
        'C' => [0b111, 0b100, 0b100, 0b100, 0b111],
        'D' => [0b110, 0b101, 0b101, 0b101, 0b110],
        'E' => [0b111, 0b100, 0b110, 0b100, 0b111],
        'F' => [0b111, 0b100, 0b110, 0b100, 0b100],
        'G' => [0b111, 0b100, 0b111, 0b101, 0b111],
        'H' => [0b101, 0b101, 0b111, 0b101, 0b101],
        'I' => [0b111, 0b010, 0b010, 0b010, 0b111],
        'J' => [0b111, 0b001, 0b001, 0b101, 0b111],
        'K' => [0b101, 0b101, 0b110, 0b101, 0b101],
        'L' => [0b100, 0b100, 0b100, 0b100, 0b111],
        'M' => [0b101, 0b111, 0b111, 0b101, 0b101],
        'N' => [0b101, 0b111, 0b111, 0b111, 0b101],
        'O' => [0b111, 0b101, 0b101, 0b101, 0b111],
        'P' => [0b111, 0b101, 0b111, 0b100, 0b100],
        'Q' => [0b111, 0b101, 0b101, 0b111, 0b011],
        'R' => [0b111, 0b101, 0b111, 0b110, 0b101],
        'S' => [0b111, 0b100, 0b111, 0b001, 0b111],
        'T' => [0b111, 0b010, 0b010, 0b010, 0b010],
        'U' => [0b101, 0b101, 0b101, 0b101, 0b111],
        'V' => [0b101, 0b101, 0b101, 0b101, 0b010],
        'W' => [0b101, 0b101, 0b111, 0b111, 0b101],
        'X' => [0b101, 0b101, 0b010, 0b101, 0b101],
        'Y' => [0b101, 0b101, 0b010, 0b010, 0b010],
        'Z' => [0b111, 0b001, 0b010, 0b100, 0b111],
        '-' => [0b000, 0b000, 0b111, 0b000, 0b000],
        '>' => [0b100, 0b010, 0b001, 0b010, 0b100],
        '=' => [0b000, 0b111, 0b000, 0b111, 0b000],
        ':' => [0b000, 0b010, 0b000, 0b010, 0b000],
        '.' => [0b000, 0b000, 0b000, 0b010, 0b000],
        ',' => [0b000, 0b000, 0b000, 0b010, 0b100],
        '(' => [0b001, 0b010, 0b010, 0b010, 0b001],
        ')' => [0b100, 0b010, 0b010, 0b010, 0b100],
        '/' => [0b001, 0b001, 0b010, 0b100, 0b100],
        ' ' => [0b000, 0b000, 0b000, 0b000, 0b000],
        _ => [0b111, 0b101, 0b010, 0b010, 0b111],
    }
}

/// Width in pixels of `text` at `scale`
pub fn text_width(text: &str, scale: u32) -> i32 {
    let count = text.chars().count() as i32;
    if count == 0 {
        return 0;
    }
    (count * ADVANCE - 1) * scale as i32
}

/// Height in pixels of a line of text at `scale`
pub fn text_height(scale: u32) -> i32 {
    GLYPH_HEIGHT * scale as i32
}

/// Draw `text` with its top-left corner at `(x, y)` in area pixel coordinates
pub fn draw_text<DB: DrawingBackend>(
    area: &DrawingArea<DB, Shift>,
    (x, y): (i32, i32),
    text: &str,
    scale: u32,
    color: &RGBColor,
) -> Result<(), DrawingAreaErrorKind<DB::ErrorType>> {
    let s = scale.max(1) as i32;
    let style = color.filled();
    let mut cursor = x;

    for ch in text.chars() {
        let glyph = glyph_bits(ch.to_ascii_uppercase());
        for (row, pattern) in glyph.iter().enumerate() {
            for col in 0..3 {
                if (pattern >> (2 - col)) & 1 == 1 {
                    let px = cursor + col * s;
                    let py = y + row as i32 * s;
                    area.draw(&Rectangle::new([(px, py), (px + s - 1, py + s - 1)], style))?;
                }
            }
        }
        cursor += ADVANCE * s;
    }

    Ok(())
}

/// Draw `text` right-aligned so that it ends at `right_x`
pub fn draw_text_right<DB: DrawingBackend>(
    area: &DrawingArea<DB, Shift>,
    (right_x, y): (i32, i32),
    text: &str,
    scale: u32,
    color: &RGBColor,
) -> Result<(), DrawingAreaErrorKind<DB::ErrorType>> {
    draw_text(area, (right_x - text_width(text, scale), y), text, scale, color)
}

/// Draw `text` horizontally centered on `center_x`
pub fn draw_text_centered<DB: DrawingBackend>(
    area: &DrawingArea<DB, Shift>,
    (center_x, y): (i32, i32),
    text: &str,
    scale: u32,
    color: &RGBColor,
) -> Result<(), DrawingAreaErrorKind<DB::ErrorType>> {
    draw_text(
        area,
        (center_x - text_width(text, scale) / 2, y),
        text,
        scale,
        color,
    )
}

/// Draw `text` top to bottom, one character per row, centered on `center_y`
pub fn draw_text_vertical<DB: DrawingBackend>(
    area: &DrawingArea<DB, Shift>,
    (x, center_y): (i32, i32),
    text: &str,
    scale: u32,
    color: &RGBColor,
) -> Result<(), DrawingAreaErrorKind<DB::ErrorType>> {
    let line = text_height(scale) + scale as i32 * 2;
    let count = text.chars().count() as i32;
    let mut y = center_y - count * line / 2;

    let mut buf = [0u8; 4];
    for ch in text.chars() {
        draw_text(area, (x, y), ch.encode_utf8(&mut buf), scale, color)?;
        y += line;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_width() {
        assert_eq!(text_width("", 2), 0);
        assert_eq!(text_width("L", 1), 3);
        assert_eq!(text_width("L3 N0", 1), 19);
        assert_eq!(text_width("L3 N0", 2), 38);
    }

    #[test]
    fn test_label_characters_have_glyphs() {
        let fallback = glyph_bits('\u{1}');
        for ch in "L1 N15 -> L2 N3 VOLTAGE IN MV TIME IN MSEC I=0.451 UA".chars() {
            if ch != ' ' {
                assert_ne!(glyph_bits(ch), fallback, "missing glyph for {:?}", ch);
            }
        }
    }

    #[test]
    fn test_draw_text_sets_pixels() {
        let mut buffer = vec![255u8; 20 * 10 * 3];
        {
            let backend = BitMapBackend::with_buffer(&mut buffer, (20, 10));
            let area = backend.into_drawing_area();
            draw_text(&area, (0, 0), "L", 2, &BLACK).unwrap();
            area.present().unwrap();
        }
        // Top-left pixel of 'L' is set, top-right of its cell is not
        assert_eq!(&buffer[0..3], &[0, 0, 0]);
        assert_eq!(&buffer[4 * 3..4 * 3 + 3], &[255, 255, 255]);
    }
}
