/// A single acquired swapchain frame.
///
/// Short-lived: holding the surface texture blocks acquisition of the next
/// one, so submit it through [`Gpu::submit`](super::Gpu::submit) promptly.
pub struct GpuFrame {
    pub surface_texture: wgpu::SurfaceTexture,
    pub view: wgpu::TextureView,
    pub encoder: wgpu::CommandEncoder,
}
