use crate::mode::BlitMode;

/// Resolved pixel-buffer geometry for a cell grid and blit mode.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Resolution {
    /// Buffer width in pixels (`cols * x_mult`).
    pub width: u32,
    /// Buffer height in pixels (`rows * y_mult`).
    pub height: u32,
    /// Aspect-correction vector for shader coordinates: the physical
    /// extent of the buffer with the longer axis scaled to 0.5, so both
    /// axes of `uv * 2 * aspect` land inside `[-1, 1]`.
    pub aspect: [f32; 2],
}

/// Translates a terminal cell grid plus a blit mode into the pixel-buffer
/// resolution and aspect correction. Pure: identical inputs always yield
/// identical outputs.
pub fn resolve(cols: u16, rows: u16, mode: BlitMode, cell_aspect: f32) -> Resolution {
    let cols = cols.max(1) as u32;
    let rows = rows.max(1) as u32;
    let (x_mult, y_mult) = mode.cell_pixels();
    let width = cols * x_mult;
    let height = rows * y_mult;

    let factors = mode.aspect_factors(cell_aspect);
    let physical = [width as f32 * factors[0], height as f32 * factors[1]];
    let longest = physical[0].max(physical[1]).max(f32::EPSILON);
    let aspect = [
        physical[0] / longest * 0.5,
        physical[1] / longest * 0.5,
    ];

    Resolution {
        width,
        height,
        aspect,
    }
}

/// Borrowed view of a surface handed to the terminal session for display.
#[derive(Debug, Clone, Copy)]
pub struct FrameView<'a> {
    pub pixels: &'a [u8],
    pub width: u32,
    pub height: u32,
    pub row_stride_bytes: u32,
    pub mode: BlitMode,
}

/// The single mutable entity of the blit path: an owned RGBA pixel buffer
/// kept in sync with the live terminal cell grid.
///
/// The buffer is exactly `width * height * 4` bytes whenever a grid has
/// been observed, and is replaced wholesale (never resized in place) when
/// the resolved dimensions change. Between syncs nothing here touches the
/// pixel contents.
#[derive(Debug)]
pub struct RenderSurface {
    cells: Option<(u16, u16)>,
    resolution: Resolution,
    row_stride_bytes: u32,
    pixels: Vec<u8>,
    mode: BlitMode,
    cell_aspect: f32,
}

impl RenderSurface {
    /// Creates a surface with no observed grid, so the first [`sync`]
    /// always allocates.
    ///
    /// [`sync`]: RenderSurface::sync
    pub fn new(mode: BlitMode, cell_aspect: f32) -> Self {
        Self {
            cells: None,
            resolution: Resolution {
                width: 0,
                height: 0,
                aspect: [0.5, 0.5],
            },
            row_stride_bytes: 0,
            pixels: Vec::new(),
            mode,
            cell_aspect,
        }
    }

    /// Reconciles the surface against the reported cell grid. Returns
    /// `true` when backing storage was replaced, so callers can resize
    /// their render targets to match.
    ///
    /// The change check compares *resolved* buffer dimensions rather than
    /// raw cell dimensions: switching blit mode at a constant grid changes
    /// the resolution and must reallocate, while a no-op sync must not.
    pub fn sync(&mut self, cols: u16, rows: u16) -> bool {
        let resolved = resolve(cols, rows, self.mode, self.cell_aspect);
        let changed = self.cells.is_none()
            || resolved.width != self.resolution.width
            || resolved.height != self.resolution.height;

        self.cells = Some((cols, rows));
        self.resolution = resolved;

        if !changed {
            return false;
        }

        // Stride and aspect are recomputed together with the dimensions,
        // never independently.
        self.row_stride_bytes = resolved.width * 4;
        self.pixels = vec![0; (resolved.width * resolved.height * 4) as usize];
        true
    }

    /// Switches the blit mode. Takes effect at the next [`sync`], which
    /// reallocates if the resolved dimensions differ.
    ///
    /// [`sync`]: RenderSurface::sync
    pub fn set_mode(&mut self, mode: BlitMode) {
        self.mode = mode;
    }

    pub fn mode(&self) -> BlitMode {
        self.mode
    }

    pub fn width(&self) -> u32 {
        self.resolution.width
    }

    pub fn height(&self) -> u32 {
        self.resolution.height
    }

    pub fn row_stride_bytes(&self) -> u32 {
        self.row_stride_bytes
    }

    pub fn aspect(&self) -> [f32; 2] {
        self.resolution.aspect
    }

    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    /// Mutable access for the frame renderer. The slice is exactly
    /// `width * height * 4` bytes, row-major, top-to-bottom.
    pub fn pixels_mut(&mut self) -> &mut [u8] {
        &mut self.pixels
    }

    pub fn view(&self) -> FrameView<'_> {
        FrameView {
            pixels: &self.pixels,
            width: self.resolution.width,
            height: self.resolution.height,
            row_stride_bytes: self.row_stride_bytes,
            mode: self.mode,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolve_applies_the_multiplier_table() {
        for mode in BlitMode::ALL {
            let (x_mult, y_mult) = mode.cell_pixels();
            for (cols, rows) in [(1u16, 1u16), (80, 24), (203, 57)] {
                let resolution = resolve(cols, rows, mode, 2.0);
                assert_eq!(resolution.width, cols as u32 * x_mult, "{mode} width");
                assert_eq!(resolution.height, rows as u32 * y_mult, "{mode} height");
            }
        }
    }

    #[test]
    fn resolve_is_pure() {
        let a = resolve(120, 40, BlitMode::Braille, 2.0);
        let b = resolve(120, 40, BlitMode::Braille, 2.0);
        assert_eq!(a, b);
    }

    #[test]
    fn quadrants_scenario_80x24() {
        let resolution = resolve(80, 24, BlitMode::Quadrants, 2.0);
        assert_eq!(resolution.width, 160);
        assert_eq!(resolution.height, 48);

        let mut surface = RenderSurface::new(BlitMode::Quadrants, 2.0);
        surface.sync(80, 24);
        assert_eq!(surface.row_stride_bytes(), 640);
    }

    #[test]
    fn braille_scenario_80x24() {
        let resolution = resolve(80, 24, BlitMode::Braille, 2.0);
        assert_eq!(resolution.width, 160);
        assert_eq!(resolution.height, 96);
    }

    #[test]
    fn aspect_keeps_the_longer_axis_at_half_scale() {
        let resolution = resolve(80, 24, BlitMode::Halves, 2.0);
        // 80 cells wide vs 24 cells tall at 1:2 glyphs: width dominates.
        assert!((resolution.aspect[0] - 0.5).abs() < 1e-6);
        assert!(resolution.aspect[1] < resolution.aspect[0]);
        assert!(resolution.aspect[1] > 0.0);
    }

    #[test]
    fn first_sync_allocates_exactly() {
        let mut surface = RenderSurface::new(BlitMode::Quadrants, 2.0);
        assert!(surface.sync(80, 24));
        assert_eq!(surface.pixels().len(), 160 * 48 * 4);
    }

    #[test]
    fn unchanged_sync_keeps_the_same_buffer() {
        let mut surface = RenderSurface::new(BlitMode::Braille, 2.0);
        surface.sync(80, 24);
        let before = surface.pixels().as_ptr();
        assert!(!surface.sync(80, 24));
        assert_eq!(surface.pixels().as_ptr(), before);
    }

    #[test]
    fn grid_change_replaces_the_buffer() {
        let mut surface = RenderSurface::new(BlitMode::Halves, 2.0);
        surface.sync(80, 24);
        assert!(surface.sync(100, 30));
        assert_eq!(surface.width(), 100);
        assert_eq!(surface.height(), 60);
        assert_eq!(surface.pixels().len(), 100 * 60 * 4);
    }

    #[test]
    fn mode_change_alone_triggers_reallocation() {
        let mut surface = RenderSurface::new(BlitMode::Single, 2.0);
        surface.sync(40, 20);
        assert_eq!((surface.width(), surface.height()), (40, 20));

        surface.set_mode(BlitMode::Sextants);
        assert!(surface.sync(40, 20), "constant grid, new mode must realloc");
        assert_eq!((surface.width(), surface.height()), (80, 60));
        assert_eq!(surface.pixels().len(), 80 * 60 * 4);
    }

    #[test]
    fn pixels_survive_a_no_op_sync() {
        let mut surface = RenderSurface::new(BlitMode::Quadrants, 2.0);
        surface.sync(10, 10);
        let pattern: Vec<u8> = (0..surface.pixels().len())
            .map(|index| (index % 251) as u8)
            .collect();
        surface.pixels_mut().copy_from_slice(&pattern);
        surface.sync(10, 10);
        assert_eq!(surface.pixels(), pattern.as_slice());
    }
}
