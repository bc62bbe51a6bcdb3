/// Initialization parameters for the GPU layer.
#[derive(Debug, Clone)]
pub struct GpuInit {
    /// Prefer an sRGB surface format when available.
    pub prefer_srgb: bool,

    /// Start with vsync on (FIFO presentation).
    pub vsync: bool,

    /// Present mode used while vsync is off.
    ///
    /// `AutoNoVsync` falls back to FIFO on platforms without tearing support.
    pub unsynced_present_mode: wgpu::PresentMode,

    /// Optional alpha mode preference for the surface.
    ///
    /// If provided but unsupported on the current surface, a supported mode is selected.
    pub alpha_mode: Option<wgpu::CompositeAlphaMode>,

    /// Required wgpu features.
    pub required_features: wgpu::Features,

    /// Limits requested from the adapter/device.
    ///
    /// `max_texture_dimension_2d` bounds every render surface the viewport
    /// can allocate.
    pub required_limits: wgpu::Limits,

    /// Desired maximum frame latency for the surface (hint).
    pub desired_maximum_frame_latency: u32,
}

impl GpuInit {
    /// Present mode matching a vsync setting.
    pub fn present_mode(&self, vsync: bool) -> wgpu::PresentMode {
        if vsync { wgpu::PresentMode::Fifo } else { self.unsynced_present_mode }
    }
}

impl Default for GpuInit {
    fn default() -> Self {
        Self {
            prefer_srgb: true,
            vsync: true,
            unsynced_present_mode: wgpu::PresentMode::AutoNoVsync,
            alpha_mode: None,
            required_features: wgpu::Features::empty(),
            required_limits: wgpu::Limits::default(),
            desired_maximum_frame_latency: 2,
        }
    }
}
