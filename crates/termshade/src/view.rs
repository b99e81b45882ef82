/// Interactive pan/zoom state fed into the frame uniforms.
///
/// Pan steps scale inversely with the current zoom so arrow keys cover
/// the same fraction of the visible scene regardless of magnification.
#[derive(Debug, Clone, Copy)]
pub struct ViewState {
    zoom: f32,
    offset: [f32; 2],
    zoom_step: f32,
    pan_step: f32,
}

impl ViewState {
    pub fn new(zoom_step: f32, pan_step: f32) -> Self {
        Self {
            zoom: 1.0,
            offset: [0.0, 0.0],
            zoom_step: zoom_step.max(1.0 + f32::EPSILON),
            pan_step,
        }
    }

    pub fn zoom(&self) -> f32 {
        self.zoom
    }

    pub fn offset(&self) -> [f32; 2] {
        self.offset
    }

    pub fn pan(&mut self, dx: i32, dy: i32) {
        // The visible extent shrinks as zoom grows, so the step shrinks
        // with it to keep one press covering the same on-screen fraction.
        let step = self.pan_step / self.zoom;
        self.offset[0] += dx as f32 * step;
        self.offset[1] += dy as f32 * step;
    }

    pub fn zoom_in(&mut self) {
        self.zoom *= self.zoom_step;
    }

    pub fn zoom_out(&mut self) {
        self.zoom /= self.zoom_step;
    }
}
