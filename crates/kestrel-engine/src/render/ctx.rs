use crate::coords::{ColorRgba, PixelSize};

/// Renderer-facing context (device/queue + color format + frame time).
pub struct RenderCtx<'a> {
    pub device: &'a wgpu::Device,
    pub queue: &'a wgpu::Queue,
    /// Format shared by the swapchain and every render surface.
    pub surface_format: wgpu::TextureFormat,
    /// Seconds since startup; exposed to shader passes.
    pub time: f32,
}

impl<'a> RenderCtx<'a> {
    #[inline]
    pub fn new(
        device: &'a wgpu::Device,
        queue: &'a wgpu::Queue,
        surface_format: wgpu::TextureFormat,
        time: f32,
    ) -> Self {
        Self {
            device,
            queue,
            surface_format,
            time,
        }
    }

    /// Largest width/height a texture may have on this device.
    #[inline]
    pub fn max_texture_dimension(&self) -> u32 {
        self.device.limits().max_texture_dimension_2d
    }
}

/// Target for drawing (encoder + color view + its pixel size).
pub struct RenderTarget<'a> {
    pub encoder: &'a mut wgpu::CommandEncoder,
    pub color_view: &'a wgpu::TextureView,
    pub size: PixelSize,
}

impl<'a> RenderTarget<'a> {
    #[inline]
    pub fn new(
        encoder: &'a mut wgpu::CommandEncoder,
        color_view: &'a wgpu::TextureView,
        size: PixelSize,
    ) -> Self {
        Self {
            encoder,
            color_view,
            size,
        }
    }

    /// Clears the whole target to `color`.
    pub fn clear(&mut self, color: ColorRgba) {
        drop(self.encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("kestrel clear"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: self.color_view,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(color.to_wgpu()),
                    store: wgpu::StoreOp::Store,
                },
                depth_slice: None,
            })],
            depth_stencil_attachment: None,
            timestamp_writes: None,
            occlusion_query_set: None,
            multiview_mask: None,
        }));
    }
}
