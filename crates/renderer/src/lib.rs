//! Offscreen GPU rendering for termshade.
//!
//! Nothing here ever presents to a window. The flow per frame is:
//!
//! ```text
//!   FrameUniforms ──▶ ShaderRenderer::render ──▶ offscreen texture
//!                                                      │ copy + map
//!                                                      ▼
//!                                        caller's RGBA pixel slice
//! ```
//!
//! - `context` owns the headless wgpu instance/device wiring.
//! - `pipeline` compiles WGSL (user file or the embedded ray marcher)
//!   behind a validation error scope so compile failures are `Err`, not
//!   process aborts.
//! - `target` owns the color texture plus the padded-row staging buffer
//!   and the blocking readback.
//! - `pattern` is the CPU fallback implementing the same [`FrameRenderer`]
//!   seam.

mod context;
mod pattern;
mod pipeline;
mod target;
mod uniforms;

use std::fs;
use std::path::Path;

use anyhow::{Context as AnyhowContext, Result};

use context::GpuContext;
use pipeline::ShaderPipeline;
use target::OffscreenTarget;

pub use pattern::PatternRenderer;
pub use uniforms::FrameUniforms;

/// The fragment shader rendered when no shader file is supplied.
pub const DEFAULT_SHADER: &str = include_str!("shaders/raymarch.wgsl");

/// Seam between the frame pump and whatever produces pixels.
///
/// Contract: after `resize_target(w, h)`, `render` fills exactly
/// `w * h * 4` RGBA bytes in row-major, top-to-bottom order. Row order is
/// the renderer's responsibility; wgpu buffer copies are already
/// top-to-bottom, so no flip happens on the GPU path.
pub trait FrameRenderer {
    fn resize_target(&mut self, width: u32, height: u32) -> Result<()>;
    fn render(&mut self, uniforms: &FrameUniforms, pixels: &mut [u8]) -> Result<()>;
}

/// GPU-backed renderer: one fullscreen-triangle pass into an offscreen
/// target, then a blocking readback into the caller's buffer.
pub struct ShaderRenderer {
    context: GpuContext,
    pipeline: ShaderPipeline,
    target: Option<OffscreenTarget>,
}

impl ShaderRenderer {
    /// Builds the device and compiles the shader. `shader` is a path to a
    /// WGSL fragment module defining `fs_main`; `None` uses
    /// [`DEFAULT_SHADER`].
    pub fn new(shader: Option<&Path>) -> Result<Self> {
        let source = match shader {
            Some(path) => fs::read_to_string(path)
                .with_context(|| format!("failed to read shader at {}", path.display()))?,
            None => DEFAULT_SHADER.to_string(),
        };

        let context = GpuContext::new()?;
        let pipeline = ShaderPipeline::new(&context.device, &source)?;
        Ok(Self {
            context,
            pipeline,
            target: None,
        })
    }
}

impl FrameRenderer for ShaderRenderer {
    fn resize_target(&mut self, width: u32, height: u32) -> Result<()> {
        let max = self.context.max_texture_dimension;
        anyhow::ensure!(
            width <= max && height <= max,
            "render target {width}x{height} exceeds GPU texture limit {max}"
        );
        self.target = Some(OffscreenTarget::new(&self.context.device, width, height));
        Ok(())
    }

    fn render(&mut self, uniforms: &FrameUniforms, pixels: &mut [u8]) -> Result<()> {
        let target = self
            .target
            .as_ref()
            .context("render target has not been sized yet")?;

        self.pipeline.write_uniforms(&self.context.queue, uniforms);

        let mut encoder =
            self.context
                .device
                .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                    label: Some("frame encoder"),
                });
        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("frame pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: target.view(),
                    depth_slice: None,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                occlusion_query_set: None,
                timestamp_writes: None,
            });
            render_pass.set_pipeline(&self.pipeline.pipeline);
            render_pass.set_bind_group(0, &self.pipeline.uniform_bind_group, &[]);
            render_pass.draw(0..3, 0..1);
        }
        target.copy_to_staging(&mut encoder);
        self.context.queue.submit(std::iter::once(encoder.finish()));

        target.read_into(&self.context.device, pixels)?;

        tracing::trace!(
            width = target.width(),
            height = target.height(),
            "frame read back"
        );
        Ok(())
    }
}
