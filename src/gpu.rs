//! Optional GPU upload path for skin surfaces, behind the `wgpu` feature.

use std::sync::Arc;

use crate::texture::Surface;

struct GpuTexture {
    texture: wgpu::Texture,
    view: wgpu::TextureView,
    size: wgpu::Extent3d,
}

/// Uploads a skin's CPU surface into a `wgpu` texture.
///
/// The texture is recreated only when the pixel size changes; otherwise the
/// new contents are written in place, matching the skin's own
/// mutate-the-handle contract.
pub struct SurfaceUploader {
    device: Arc<wgpu::Device>,
    queue: Arc<wgpu::Queue>,
    current: Option<GpuTexture>,
}

impl SurfaceUploader {
    pub fn new(device: Arc<wgpu::Device>, queue: Arc<wgpu::Queue>) -> Self {
        Self {
            device,
            queue,
            current: None,
        }
    }

    /// Pushes `surface` to the GPU and returns a view of the texture.
    ///
    /// Returns `None` for an empty surface (zero-sized textures are not
    /// representable).
    pub fn upload(&mut self, surface: &Surface) -> Option<&wgpu::TextureView> {
        let width = surface.width() as u32;
        let height = surface.height() as u32;
        if width == 0 || height == 0 {
            return None;
        }

        let size = wgpu::Extent3d {
            width,
            height,
            depth_or_array_layers: 1,
        };

        let needs_recreate = match &self.current {
            Some(current) => current.size.width != width || current.size.height != height,
            None => true,
        };

        if needs_recreate {
            let texture = self.device.create_texture(&wgpu::TextureDescriptor {
                label: Some("Text Skin Surface"),
                size,
                mip_level_count: 1,
                sample_count: 1,
                dimension: wgpu::TextureDimension::D2,
                format: wgpu::TextureFormat::Rgba8UnormSrgb,
                usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
                view_formats: &[],
            });
            let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
            self.current = Some(GpuTexture {
                texture,
                view,
                size,
            });
        }

        // `current` is always populated past this point.
        let current = self.current.as_ref()?;
        self.queue.write_texture(
            wgpu::TexelCopyTextureInfo {
                texture: &current.texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            surface.pixels(),
            wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(width * 4),
                rows_per_image: Some(height),
            },
            size,
        );

        Some(&current.view)
    }
}
