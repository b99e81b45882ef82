use anyhow::Result;

use crate::uniforms::FrameUniforms;
use crate::FrameRenderer;

/// CPU stand-in for the GPU path: an animated plasma evaluated per pixel.
/// It honors the same aspect/zoom/pan mapping as the built-in shader, so
/// the interactive loop is fully exercisable on machines without a GPU
/// adapter (and in tests).
#[derive(Debug, Default)]
pub struct PatternRenderer {
    width: u32,
    height: u32,
}

impl PatternRenderer {
    pub fn new() -> Self {
        Self::default()
    }
}

impl FrameRenderer for PatternRenderer {
    fn resize_target(&mut self, width: u32, height: u32) -> Result<()> {
        self.width = width;
        self.height = height;
        Ok(())
    }

    fn render(&mut self, uniforms: &FrameUniforms, pixels: &mut [u8]) -> Result<()> {
        let expected = (self.width * self.height * 4) as usize;
        anyhow::ensure!(
            pixels.len() == expected,
            "pattern destination is {} bytes, target needs {expected}",
            pixels.len()
        );

        let aspect = uniforms.aspect();
        let zoom = uniforms.zoom().max(0.001);
        let time = uniforms.time();
        let (width, height) = (self.width as f32, self.height as f32);

        for (index, pixel) in pixels.chunks_exact_mut(4).enumerate() {
            let x = (index as u32 % self.width) as f32;
            let y = (index as u32 / self.width) as f32;
            let u = ((x + 0.5) / width - 0.5) * 2.0 * aspect[0];
            let v = -(((y + 0.5) / height - 0.5) * 2.0 * aspect[1]);
            let px = u / zoom + uniforms.offset[0];
            let py = v / zoom + uniforms.offset[1];

            let wave = (px * 6.0 + time).sin()
                + (py * 6.0 - time * 0.7).sin()
                + ((px + py) * 4.0 + time * 0.3).sin();
            let phase = wave / 3.0;

            pixel[0] = channel(phase, 0.0);
            pixel[1] = channel(phase, 2.0);
            pixel[2] = channel(phase, 4.0);
            pixel[3] = 255;
        }
        Ok(())
    }
}

fn channel(phase: f32, shift: f32) -> u8 {
    let value = ((phase * std::f32::consts::PI + shift).sin() * 0.5 + 0.5) * 255.0;
    value.clamp(0.0, 255.0) as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    fn render(uniforms: &FrameUniforms, width: u32, height: u32) -> Vec<u8> {
        let mut renderer = PatternRenderer::new();
        renderer.resize_target(width, height).unwrap();
        let mut pixels = vec![0; (width * height * 4) as usize];
        renderer.render(uniforms, &mut pixels).unwrap();
        pixels
    }

    #[test]
    fn fills_every_pixel_opaquely() {
        let uniforms = FrameUniforms::new(16, 8);
        let pixels = render(&uniforms, 16, 8);
        assert_eq!(pixels.len(), 16 * 8 * 4);
        assert!(pixels.chunks_exact(4).all(|pixel| pixel[3] == 255));
    }

    #[test]
    fn deterministic_for_identical_uniforms() {
        let uniforms = FrameUniforms::new(16, 8);
        assert_eq!(render(&uniforms, 16, 8), render(&uniforms, 16, 8));
    }

    #[test]
    fn zoom_changes_the_output() {
        let mut near = FrameUniforms::new(32, 16);
        near.set_view([0.5, 0.25], 1.0);
        let mut far = near;
        far.set_view([0.5, 0.25], 2.0);
        assert_ne!(render(&near, 32, 16), render(&far, 32, 16));
    }

    #[test]
    fn mismatched_destination_is_rejected() {
        let mut renderer = PatternRenderer::new();
        renderer.resize_target(8, 8).unwrap();
        let mut too_small = vec![0; 16];
        assert!(renderer
            .render(&FrameUniforms::new(8, 8), &mut too_small)
            .is_err());
    }
}
