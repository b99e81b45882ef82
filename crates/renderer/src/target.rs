use anyhow::{Context, Result};

pub(crate) const TARGET_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba8Unorm;

/// Offscreen color attachment plus the staging buffer used to read it
/// back. Buffer copies require rows padded to `COPY_BYTES_PER_ROW_ALIGNMENT`,
/// so the staging buffer is wider than the texture and `read_into` de-pads.
pub(crate) struct OffscreenTarget {
    texture: wgpu::Texture,
    view: wgpu::TextureView,
    staging: wgpu::Buffer,
    width: u32,
    height: u32,
    padded_bytes_per_row: u32,
}

impl OffscreenTarget {
    pub(crate) fn new(device: &wgpu::Device, width: u32, height: u32) -> Self {
        let extent = wgpu::Extent3d {
            width: width.max(1),
            height: height.max(1),
            depth_or_array_layers: 1,
        };
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("offscreen color target"),
            size: extent,
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: TARGET_FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::COPY_SRC,
            view_formats: &[],
        });
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());

        let unpadded_bytes_per_row = extent.width * 4;
        let align = wgpu::COPY_BYTES_PER_ROW_ALIGNMENT;
        let padded_bytes_per_row = unpadded_bytes_per_row.div_ceil(align) * align;
        let staging = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("readback staging"),
            size: u64::from(padded_bytes_per_row) * u64::from(extent.height),
            usage: wgpu::BufferUsages::COPY_DST | wgpu::BufferUsages::MAP_READ,
            mapped_at_creation: false,
        });

        Self {
            texture,
            view,
            staging,
            width: extent.width,
            height: extent.height,
            padded_bytes_per_row,
        }
    }

    pub(crate) fn view(&self) -> &wgpu::TextureView {
        &self.view
    }

    pub(crate) fn width(&self) -> u32 {
        self.width
    }

    pub(crate) fn height(&self) -> u32 {
        self.height
    }

    /// Appends the texture-to-staging copy to an encoder. Must be recorded
    /// after the render pass that draws into the target.
    pub(crate) fn copy_to_staging(&self, encoder: &mut wgpu::CommandEncoder) {
        encoder.copy_texture_to_buffer(
            wgpu::TexelCopyTextureInfo {
                texture: &self.texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            wgpu::TexelCopyBufferInfo {
                buffer: &self.staging,
                layout: wgpu::TexelCopyBufferLayout {
                    offset: 0,
                    bytes_per_row: Some(self.padded_bytes_per_row),
                    rows_per_image: Some(self.height),
                },
            },
            wgpu::Extent3d {
                width: self.width,
                height: self.height,
                depth_or_array_layers: 1,
            },
        );
    }

    /// Blocks until the staging buffer is mapped, then de-pads its rows
    /// into `pixels`. The slice must hold exactly `width * height * 4`
    /// bytes; rows come out top-to-bottom, matching texture row order.
    pub(crate) fn read_into(&self, device: &wgpu::Device, pixels: &mut [u8]) -> Result<()> {
        let expected = (self.width * self.height * 4) as usize;
        anyhow::ensure!(
            pixels.len() == expected,
            "readback destination is {} bytes, target needs {expected}",
            pixels.len()
        );

        let slice = self.staging.slice(..);
        let (sender, receiver) = std::sync::mpsc::channel();
        slice.map_async(wgpu::MapMode::Read, move |result| {
            let _ = sender.send(result);
        });
        device
            .poll(wgpu::PollType::Wait)
            .context("device poll failed while waiting for readback")?;
        receiver
            .recv()
            .context("readback mapping callback dropped")?
            .context("failed to map readback buffer")?;

        {
            let mapped = slice.get_mapped_range();
            let unpadded = (self.width * 4) as usize;
            for (row, chunk) in pixels.chunks_exact_mut(unpadded).enumerate() {
                let start = row * self.padded_bytes_per_row as usize;
                chunk.copy_from_slice(&mapped[start..start + unpadded]);
            }
        }
        self.staging.unmap();
        Ok(())
    }
}
