use crate::mode::BlitMode;

/// 8-bit RGB color; the alpha channel of the source pixels is ignored
/// because terminals have no per-cell transparency.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }
}

/// One packed terminal cell: glyph plus foreground/background colors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CellGlyph {
    pub glyph: char,
    pub fg: Rgb,
    pub bg: Rgb,
}

/// Block elements indexed by quadrant bitmap: bit 0 = upper-left,
/// bit 1 = upper-right, bit 2 = lower-left, bit 3 = lower-right.
const QUADRANT_GLYPHS: [char; 16] = [
    ' ', '\u{2598}', '\u{259D}', '\u{2580}', '\u{2596}', '\u{258C}', '\u{259E}', '\u{259B}',
    '\u{2597}', '\u{259A}', '\u{2590}', '\u{259C}', '\u{2584}', '\u{2599}', '\u{259F}', '\u{2588}',
];

/// Braille dot bits by `[column][row]`; rows top to bottom.
const BRAILLE_BITS: [[u8; 4]; 2] = [
    [0x01, 0x02, 0x04, 0x40],
    [0x08, 0x10, 0x20, 0x80],
];

/// Sextant bitmap (bit `x + 2 * y`) to glyph. The U+1FB00 range omits the
/// patterns that already exist as block elements, so those four punch
/// holes in the otherwise linear mapping.
fn sextant_glyph(pattern: u8) -> char {
    match pattern {
        0 => ' ',
        0b010101 => '\u{258C}',
        0b101010 => '\u{2590}',
        0b111111 => '\u{2588}',
        p => {
            let mut index = u32::from(p) - 1;
            if p > 0b010101 {
                index -= 1;
            }
            if p > 0b101010 {
                index -= 1;
            }
            char::from_u32(0x1FB00 + index).unwrap_or(' ')
        }
    }
}

fn luma(pixel: Rgb) -> f32 {
    0.2126 * pixel.r as f32 + 0.7152 * pixel.g as f32 + 0.0722 * pixel.b as f32
}

fn average(pixels: &[Rgb]) -> Rgb {
    if pixels.is_empty() {
        return Rgb::default();
    }
    let mut sum = [0u32; 3];
    for pixel in pixels {
        sum[0] += u32::from(pixel.r);
        sum[1] += u32::from(pixel.g);
        sum[2] += u32::from(pixel.b);
    }
    let count = pixels.len() as u32;
    Rgb::new(
        (sum[0] / count) as u8,
        (sum[1] / count) as u8,
        (sum[2] / count) as u8,
    )
}

/// Splits a block around its mean luminance and returns the bitmap of
/// bright pixels plus the two group colors. A flat block keeps the glyph
/// empty so the cell renders as pure background.
fn split_block(block: &[Rgb]) -> (u32, Rgb, Rgb) {
    let mean = block.iter().copied().map(luma).sum::<f32>() / block.len() as f32;
    let spread = block
        .iter()
        .copied()
        .map(luma)
        .fold((f32::MAX, f32::MIN), |(lo, hi), v| (lo.min(v), hi.max(v)));
    if spread.1 - spread.0 < 1.0 {
        let flat = average(block);
        return (0, flat, flat);
    }

    let mut pattern = 0u32;
    let mut bright = Vec::with_capacity(block.len());
    let mut dark = Vec::with_capacity(block.len());
    for (index, pixel) in block.iter().copied().enumerate() {
        if luma(pixel) >= mean {
            pattern |= 1 << index;
            bright.push(pixel);
        } else {
            dark.push(pixel);
        }
    }

    let fg = average(&bright);
    let bg = if dark.is_empty() { fg } else { average(&dark) };
    (pattern, fg, bg)
}

/// Packs one cell's pixel block into a glyph plus colors.
///
/// `block` is the cell's source pixels in row-major order and must hold
/// exactly `x_mult * y_mult` entries for the mode.
pub fn pack_cell(mode: BlitMode, block: &[Rgb]) -> CellGlyph {
    let (x_mult, y_mult) = mode.cell_pixels();
    debug_assert_eq!(block.len(), (x_mult * y_mult) as usize);

    match mode {
        BlitMode::Single | BlitMode::Pixels => CellGlyph {
            glyph: ' ',
            fg: block[0],
            bg: block[0],
        },
        BlitMode::Halves => CellGlyph {
            glyph: '\u{2580}',
            fg: block[0],
            bg: block[1],
        },
        BlitMode::Quadrants => {
            let (pattern, fg, bg) = split_block(block);
            CellGlyph {
                glyph: QUADRANT_GLYPHS[pattern as usize],
                fg,
                bg,
            }
        }
        BlitMode::Sextants => {
            let (pattern, fg, bg) = split_block(block);
            CellGlyph {
                glyph: sextant_glyph(pattern as u8),
                fg,
                bg,
            }
        }
        BlitMode::Braille => {
            let (pattern, fg, bg) = split_block(block);
            let mut dots = 0u32;
            for row in 0..4 {
                for col in 0..2 {
                    if pattern & (1 << (row * 2 + col)) != 0 {
                        dots |= u32::from(BRAILLE_BITS[col as usize][row as usize]);
                    }
                }
            }
            CellGlyph {
                glyph: char::from_u32(0x2800 + dots).unwrap_or(' '),
                fg,
                bg,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const WHITE: Rgb = Rgb::new(255, 255, 255);
    const BLACK: Rgb = Rgb::new(0, 0, 0);

    #[test]
    fn single_mode_carries_the_pixel_in_the_background() {
        let cell = pack_cell(BlitMode::Single, &[Rgb::new(10, 20, 30)]);
        assert_eq!(cell.glyph, ' ');
        assert_eq!(cell.bg, Rgb::new(10, 20, 30));
    }

    #[test]
    fn halves_mode_is_lossless() {
        let top = Rgb::new(200, 0, 0);
        let bottom = Rgb::new(0, 0, 200);
        let cell = pack_cell(BlitMode::Halves, &[top, bottom]);
        assert_eq!(cell.glyph, '\u{2580}');
        assert_eq!(cell.fg, top);
        assert_eq!(cell.bg, bottom);
    }

    #[test]
    fn quadrant_pattern_selects_the_matching_glyph() {
        // Upper-left bright only.
        let cell = pack_cell(BlitMode::Quadrants, &[WHITE, BLACK, BLACK, BLACK]);
        assert_eq!(cell.glyph, '\u{2598}');
        assert_eq!(cell.fg, WHITE);
        assert_eq!(cell.bg, BLACK);

        // Top row bright.
        let cell = pack_cell(BlitMode::Quadrants, &[WHITE, WHITE, BLACK, BLACK]);
        assert_eq!(cell.glyph, '\u{2580}');
    }

    #[test]
    fn flat_quadrant_block_renders_as_background() {
        let grey = Rgb::new(128, 128, 128);
        let cell = pack_cell(BlitMode::Quadrants, &[grey, grey, grey, grey]);
        assert_eq!(cell.glyph, ' ');
        assert_eq!(cell.bg, grey);
    }

    #[test]
    fn sextant_half_patterns_use_block_elements() {
        // Left column bright in a 2x3 block.
        let cell = pack_cell(
            BlitMode::Sextants,
            &[WHITE, BLACK, WHITE, BLACK, WHITE, BLACK],
        );
        assert_eq!(cell.glyph, '\u{258C}');

        let full = pack_cell(BlitMode::Sextants, &[WHITE; 6]);
        assert_eq!(full.glyph, ' ', "flat block stays background");
    }

    #[test]
    fn sextant_range_mapping_skips_the_holes() {
        assert_eq!(sextant_glyph(0b000001), '\u{1FB00}');
        assert_eq!(sextant_glyph(0b000010), '\u{1FB01}');
        assert_eq!(sextant_glyph(0b010101), '\u{258C}');
        assert_eq!(sextant_glyph(0b010110), '\u{1FB14}');
        assert_eq!(sextant_glyph(0b101010), '\u{2590}');
        assert_eq!(sextant_glyph(0b111110), '\u{1FB3B}');
        assert_eq!(sextant_glyph(0b111111), '\u{2588}');
    }

    #[test]
    fn braille_dots_map_column_major() {
        // Top-left pixel bright: dot 1.
        let mut block = [BLACK; 8];
        block[0] = WHITE;
        let cell = pack_cell(BlitMode::Braille, &block);
        assert_eq!(cell.glyph, '\u{2801}');

        // Bottom-right pixel bright: dot 8.
        let mut block = [BLACK; 8];
        block[7] = WHITE;
        let cell = pack_cell(BlitMode::Braille, &block);
        assert_eq!(cell.glyph, '\u{2880}');
    }

    #[test]
    fn braille_groups_average_their_colors() {
        let mut block = [Rgb::new(10, 10, 10); 8];
        block[0] = Rgb::new(200, 100, 0);
        block[1] = Rgb::new(100, 200, 0);
        let cell = pack_cell(BlitMode::Braille, &block);
        assert_eq!(cell.fg, Rgb::new(150, 150, 0));
        assert_eq!(cell.bg, Rgb::new(10, 10, 10));
    }
}
