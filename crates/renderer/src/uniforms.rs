use bytemuck::{Pod, Zeroable};

/// Uniform block handed to the shader every frame. The WGSL mirror lives
/// in the prelude injected around every fragment module (see
/// `pipeline::SHADER_PRELUDE`), so field order and padding here are load
/// bearing.
#[repr(C, align(16))]
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FrameUniforms {
    /// Buffer resolution in pixels (`x`, `y`); `z` carries elapsed seconds
    /// and `w` the frame index.
    pub resolution: [f32; 4],
    /// Aspect-correction vector (`x`, `y`) and zoom (`z`); `w` unused.
    pub view: [f32; 4],
    /// Pan offset (`x`, `y`); `zw` unused.
    pub offset: [f32; 4],
}

unsafe impl Zeroable for FrameUniforms {}
unsafe impl Pod for FrameUniforms {}

impl FrameUniforms {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            resolution: [width as f32, height as f32, 0.0, 0.0],
            view: [0.5, 0.5, 1.0, 0.0],
            offset: [0.0; 4],
        }
    }

    pub fn set_resolution(&mut self, width: u32, height: u32) {
        self.resolution[0] = width as f32;
        self.resolution[1] = height as f32;
    }

    pub fn set_time(&mut self, seconds: f32, frame_index: u64) {
        self.resolution[2] = seconds;
        self.resolution[3] = frame_index as f32;
    }

    pub fn set_view(&mut self, aspect: [f32; 2], zoom: f32) {
        self.view[0] = aspect[0];
        self.view[1] = aspect[1];
        self.view[2] = zoom;
    }

    pub fn set_offset(&mut self, x: f32, y: f32) {
        self.offset[0] = x;
        self.offset[1] = y;
    }

    pub fn time(&self) -> f32 {
        self.resolution[2]
    }

    pub fn aspect(&self) -> [f32; 2] {
        [self.view[0], self.view[1]]
    }

    pub fn zoom(&self) -> f32 {
        self.view[2]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn layout_is_three_packed_vec4s() {
        assert_eq!(std::mem::size_of::<FrameUniforms>(), 48);
        assert_eq!(std::mem::align_of::<FrameUniforms>(), 16);
    }

    #[test]
    fn setters_touch_only_their_lanes() {
        let mut uniforms = FrameUniforms::new(160, 48);
        uniforms.set_time(2.5, 7);
        uniforms.set_view([0.5, 0.3], 1.21);
        uniforms.set_offset(-0.1, 0.2);

        assert_eq!(uniforms.resolution, [160.0, 48.0, 2.5, 7.0]);
        assert_eq!(uniforms.aspect(), [0.5, 0.3]);
        assert!((uniforms.zoom() - 1.21).abs() < f32::EPSILON);
        assert_eq!(uniforms.offset[..2], [-0.1, 0.2]);

        uniforms.set_resolution(320, 96);
        assert_eq!(uniforms.resolution, [320.0, 96.0, 2.5, 7.0]);
    }
}
