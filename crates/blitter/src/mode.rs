use std::fmt;
use std::str::FromStr;

/// Mapping from one terminal character cell to a rectangular block of
/// source pixels, implemented through glyph selection.
///
/// The set is closed: every `match` over it is exhaustive, so adding a
/// mode without updating the resolver or the glyph packer is a compile
/// error rather than a silently corrupted buffer size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlitMode {
    /// One pixel per cell, carried by the background color.
    Single,
    /// Upper/lower half blocks; one cell covers a 1×2 pixel column.
    Halves,
    /// Quadrant glyphs; one cell covers a 2×2 pixel block.
    Quadrants,
    /// Sextant glyphs; one cell covers a 2×3 pixel block.
    Sextants,
    /// Braille patterns; one cell covers a 2×4 pixel block.
    Braille,
    /// Pixel-native graphics protocols. Resolved as a 1×1 mapping and
    /// drawn like [`BlitMode::Single`] until a protocol backend exists.
    Pixels,
}

impl BlitMode {
    pub const ALL: [BlitMode; 6] = [
        BlitMode::Single,
        BlitMode::Halves,
        BlitMode::Quadrants,
        BlitMode::Sextants,
        BlitMode::Braille,
        BlitMode::Pixels,
    ];

    /// Source pixels covered by one cell, as `(x, y)` multipliers applied
    /// to the cell grid when resolving the buffer resolution.
    pub const fn cell_pixels(self) -> (u32, u32) {
        match self {
            BlitMode::Single => (1, 1),
            BlitMode::Halves => (1, 2),
            BlitMode::Quadrants => (2, 2),
            BlitMode::Sextants => (2, 3),
            BlitMode::Braille => (2, 4),
            BlitMode::Pixels => (1, 1),
        }
    }

    /// Component-wise factors converting buffer pixels back into physical
    /// glyph-cell extents. `cell_aspect` is how much taller than wide a
    /// glyph cell is (2.0 for typical terminal fonts).
    ///
    /// Braille pixels come out square under the default aspect, so the
    /// factors are uniform there; coarser modes compensate for their
    /// stretched pixels.
    pub fn aspect_factors(self, cell_aspect: f32) -> [f32; 2] {
        let (x, y) = self.cell_pixels();
        [1.0 / x as f32, cell_aspect / y as f32]
    }

    /// The next mode in cycling order, wrapping at the end.
    pub fn next(self) -> BlitMode {
        let index = Self::ALL
            .iter()
            .position(|mode| *mode == self)
            .unwrap_or(0);
        Self::ALL[(index + 1) % Self::ALL.len()]
    }
}

impl fmt::Display for BlitMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            BlitMode::Single => "single",
            BlitMode::Halves => "halves",
            BlitMode::Quadrants => "quadrants",
            BlitMode::Sextants => "sextants",
            BlitMode::Braille => "braille",
            BlitMode::Pixels => "pixels",
        };
        f.write_str(name)
    }
}

impl FromStr for BlitMode {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "single" | "1x1" => Ok(BlitMode::Single),
            "halves" | "2x1" => Ok(BlitMode::Halves),
            "quadrants" | "2x2" => Ok(BlitMode::Quadrants),
            "sextants" | "3x2" => Ok(BlitMode::Sextants),
            "braille" | "2x4" => Ok(BlitMode::Braille),
            "pixels" | "pixel" => Ok(BlitMode::Pixels),
            other => Err(format!(
                "unknown blit mode '{other}' (expected single, halves, quadrants, sextants, braille, or pixels)"
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn multiplier_table_matches_glyph_geometry() {
        assert_eq!(BlitMode::Single.cell_pixels(), (1, 1));
        assert_eq!(BlitMode::Halves.cell_pixels(), (1, 2));
        assert_eq!(BlitMode::Quadrants.cell_pixels(), (2, 2));
        assert_eq!(BlitMode::Sextants.cell_pixels(), (2, 3));
        assert_eq!(BlitMode::Braille.cell_pixels(), (2, 4));
        assert_eq!(BlitMode::Pixels.cell_pixels(), (1, 1));
    }

    #[test]
    fn braille_pixels_are_square_under_default_cell_aspect() {
        let [x, y] = BlitMode::Braille.aspect_factors(2.0);
        assert!((x - y).abs() < f32::EPSILON);
    }

    #[test]
    fn parses_both_names_and_geometry_aliases() {
        assert_eq!("braille".parse::<BlitMode>().unwrap(), BlitMode::Braille);
        assert_eq!("2x2".parse::<BlitMode>().unwrap(), BlitMode::Quadrants);
        assert_eq!("3x2".parse::<BlitMode>().unwrap(), BlitMode::Sextants);
        assert!("octants".parse::<BlitMode>().is_err());
    }

    #[test]
    fn cycling_visits_every_mode_once() {
        let mut mode = BlitMode::Single;
        let mut seen = Vec::new();
        for _ in 0..BlitMode::ALL.len() {
            seen.push(mode);
            mode = mode.next();
        }
        assert_eq!(mode, BlitMode::Single);
        assert_eq!(seen.len(), BlitMode::ALL.len());
        for expected in BlitMode::ALL {
            assert!(seen.contains(&expected));
        }
    }
}
