//! Placeholder tile synthesis for offline / no-data situations.
//!
//! Produces a fixed-size 256×256 image with a solid dark background and a
//! centered red label, entirely in memory. Rendering uses a small built-in
//! 5×7 pixel font (uppercase letters, digits, space) so no font files or
//! rasterizer dependencies are needed for a diagnostic label.

use image::{Rgba, RgbaImage};

/// Placeholder tile edge length in pixels.
pub const PLACEHOLDER_SIZE: u32 = 256;

const BACKGROUND: Rgba<u8> = Rgba([0, 0, 0, 255]);
const FOREGROUND: Rgba<u8> = Rgba([220, 40, 40, 255]);

const GLYPH_WIDTH: u32 = 5;
const GLYPH_HEIGHT: u32 = 7;
/// Integer upscale factor applied to the 5×7 glyphs.
const SCALE: u32 = 3;
/// Horizontal gap between glyphs, in font pixels.
const TRACKING: u32 = 1;

/// Synthesizes the fixed-size placeholder image with a centered label.
///
/// Pure and infallible: no I/O, no fonts loaded. Characters outside the
/// built-in set (A-Z, 0-9, space) render as a hollow box.
pub fn no_data_image(text: &str) -> RgbaImage {
    let mut image = RgbaImage::from_pixel(PLACEHOLDER_SIZE, PLACEHOLDER_SIZE, BACKGROUND);

    let advance = (GLYPH_WIDTH + TRACKING) * SCALE;
    let text_width = text.chars().count() as u32 * advance;
    let text_height = GLYPH_HEIGHT * SCALE;

    // Center the label; clamp to the origin if it would overflow
    let origin_x = PLACEHOLDER_SIZE.saturating_sub(text_width) / 2;
    let origin_y = PLACEHOLDER_SIZE.saturating_sub(text_height) / 2;

    for (i, ch) in text.chars().enumerate() {
        let glyph_x = origin_x + i as u32 * advance;
        if glyph_x + GLYPH_WIDTH * SCALE > PLACEHOLDER_SIZE {
            break;
        }
        draw_glyph(&mut image, glyph_x, origin_y, glyph(ch));
    }

    image
}

fn draw_glyph(image: &mut RgbaImage, origin_x: u32, origin_y: u32, rows: [u8; 7]) {
    for (row, bits) in rows.iter().enumerate() {
        for col in 0..GLYPH_WIDTH {
            if bits & (0b1_0000 >> col) == 0 {
                continue;
            }
            for dy in 0..SCALE {
                for dx in 0..SCALE {
                    let px = origin_x + col * SCALE + dx;
                    let py = origin_y + row as u32 * SCALE + dy;
                    if px < PLACEHOLDER_SIZE && py < PLACEHOLDER_SIZE {
                        image.put_pixel(px, py, FOREGROUND);
                    }
                }
            }
        }
    }
}

/// 5×7 bitmap rows for a character, most significant bit = leftmost column.
fn glyph(ch: char) -> [u8; 7] {
    match ch.to_ascii_uppercase() {
        ' ' => [0, 0, 0, 0, 0, 0, 0],
        'A' => [0b01110, 0b10001, 0b10001, 0b11111, 0b10001, 0b10001, 0b10001],
        'B' => [0b11110, 0b10001, 0b10001, 0b11110, 0b10001, 0b10001, 0b11110],
        'C' => [0b01110, 0b10001, 0b10000, 0b10000, 0b10000, 0b10001, 0b01110],
        'D' => [0b11110, 0b10001, 0b10001, 0b10001, 0b10001, 0b10001, 0b11110],
        'E' => [0b11111, 0b10000, 0b10000, 0b11110, 0b10000, 0b10000, 0b11111],
        'F' => [0b11111, 0b10000, 0b10000, 0b11110, 0b10000, 0b10000, 0b10000],
        'G' => [0b01110, 0b10001, 0b10000, 0b10111, 0b10001, 0b10001, 0b01111],
        'H' => [0b10001, 0b10001, 0b10001, 0b11111, 0b10001, 0b10001, 0b10001],
        'I' => [0b01110, 0b00100, 0b00100, 0b00100, 0b00100, 0b00100, 0b01110],
        'J' => [0b00111, 0b00010, 0b00010, 0b00010, 0b00010, 0b10010, 0b01100],
        'K' => [0b10001, 0b10010, 0b10100, 0b11000, 0b10100, 0b10010, 0b10001],
        'L' => [0b10000, 0b10000, 0b10000, 0b10000, 0b10000, 0b10000, 0b11111],
        'M' => [0b10001, 0b11011, 0b10101, 0b10101, 0b10001, 0b10001, 0b10001],
        'N' => [0b10001, 0b11001, 0b10101, 0b10011, 0b10001, 0b10001, 0b10001],
        'O' => [0b01110, 0b10001, 0b10001, 0b10001, 0b10001, 0b10001, 0b01110],
        'P' => [0b11110, 0b10001, 0b10001, 0b11110, 0b10000, 0b10000, 0b10000],
        'Q' => [0b01110, 0b10001, 0b10001, 0b10001, 0b10101, 0b10010, 0b01101],
        'R' => [0b11110, 0b10001, 0b10001, 0b11110, 0b10100, 0b10010, 0b10001],
        'S' => [0b01111, 0b10000, 0b10000, 0b01110, 0b00001, 0b00001, 0b11110],
        'T' => [0b11111, 0b00100, 0b00100, 0b00100, 0b00100, 0b00100, 0b00100],
        'U' => [0b10001, 0b10001, 0b10001, 0b10001, 0b10001, 0b10001, 0b01110],
        'V' => [0b10001, 0b10001, 0b10001, 0b10001, 0b10001, 0b01010, 0b00100],
        'W' => [0b10001, 0b10001, 0b10001, 0b10101, 0b10101, 0b11011, 0b10001],
        'X' => [0b10001, 0b01010, 0b00100, 0b00100, 0b00100, 0b01010, 0b10001],
        'Y' => [0b10001, 0b01010, 0b00100, 0b00100, 0b00100, 0b00100, 0b00100],
        'Z' => [0b11111, 0b00001, 0b00010, 0b00100, 0b01000, 0b10000, 0b11111],
        '0' => [0b01110, 0b10001, 0b10011, 0b10101, 0b11001, 0b10001, 0b01110],
        '1' => [0b00100, 0b01100, 0b00100, 0b00100, 0b00100, 0b00100, 0b01110],
        '2' => [0b01110, 0b10001, 0b00001, 0b00010, 0b00100, 0b01000, 0b11111],
        '3' => [0b01110, 0b10001, 0b00001, 0b00110, 0b00001, 0b10001, 0b01110],
        '4' => [0b00010, 0b00110, 0b01010, 0b10010, 0b11111, 0b00010, 0b00010],
        '5' => [0b11111, 0b10000, 0b11110, 0b00001, 0b00001, 0b10001, 0b01110],
        '6' => [0b01110, 0b10000, 0b10000, 0b11110, 0b10001, 0b10001, 0b01110],
        '7' => [0b11111, 0b00001, 0b00010, 0b00100, 0b01000, 0b01000, 0b01000],
        '8' => [0b01110, 0b10001, 0b10001, 0b01110, 0b10001, 0b10001, 0b01110],
        '9' => [0b01110, 0b10001, 0b10001, 0b01111, 0b00001, 0b00001, 0b01110],
        // Unknown characters render as a hollow box
        _ => [0b11111, 0b10001, 0b10001, 0b10001, 0b10001, 0b10001, 0b11111],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dimensions() {
        let image = no_data_image("NO DATA");
        assert_eq!(image.width(), PLACEHOLDER_SIZE);
        assert_eq!(image.height(), PLACEHOLDER_SIZE);
    }

    #[test]
    fn test_label_pixels_are_drawn() {
        let image = no_data_image("NO DATA");
        let lit = image.pixels().filter(|p| **p == FOREGROUND).count();
        assert!(lit > 0, "label should draw foreground pixels");
    }

    #[test]
    fn test_empty_label_is_solid_background() {
        let image = no_data_image("");
        assert!(image.pixels().all(|p| *p == BACKGROUND));
    }

    #[test]
    fn test_corners_are_background() {
        let image = no_data_image("NO DATA");
        assert_eq!(*image.get_pixel(0, 0), BACKGROUND);
        assert_eq!(*image.get_pixel(255, 255), BACKGROUND);
    }

    #[test]
    fn test_label_is_horizontally_centered() {
        let image = no_data_image("NO DATA");

        let min_x = (0..image.width())
            .find(|x| (0..image.height()).any(|y| *image.get_pixel(*x, y) == FOREGROUND))
            .unwrap();
        let max_x = (0..image.width())
            .rev()
            .find(|x| (0..image.height()).any(|y| *image.get_pixel(*x, y) == FOREGROUND))
            .unwrap();

        let left_margin = min_x;
        let right_margin = PLACEHOLDER_SIZE - 1 - max_x;
        // Centering within one glyph advance of symmetric
        assert!((left_margin as i64 - right_margin as i64).abs() <= (GLYPH_WIDTH * SCALE) as i64);
    }

    #[test]
    fn test_oversized_label_does_not_panic() {
        let text = "A".repeat(100);
        let image = no_data_image(&text);
        assert_eq!(image.width(), PLACEHOLDER_SIZE);
    }
}
