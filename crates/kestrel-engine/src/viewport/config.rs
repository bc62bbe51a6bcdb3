use crate::coords::{ColorRgba, PixelSize};

/// Startup configuration of a [`ViewportDevice`](super::ViewportDevice).
#[derive(Debug, Clone)]
pub struct ViewportConfig {
    /// Initial window size in physical pixels.
    pub window_size: PixelSize,
    /// Fixed primary surface size; `None` follows the window.
    pub primary_size: Option<PixelSize>,
    /// Fixed secondary surface size; `None` follows the window.
    pub secondary_size: Option<PixelSize>,
    pub vsync: bool,
    pub frame_rate_limit: Option<u32>,
    pub monitor_index: usize,
    pub fullscreen: bool,
    pub primary_background: ColorRgba,
    pub secondary_background: ColorRgba,
    /// Fill around surfaces whose aspect differs from the window.
    pub letterbox: ColorRgba,
}

impl Default for ViewportConfig {
    fn default() -> Self {
        Self {
            window_size: PixelSize::new(1280, 720),
            primary_size: None,
            secondary_size: None,
            vsync: true,
            frame_rate_limit: None,
            monitor_index: 0,
            fullscreen: false,
            primary_background: ColorRgba::black(),
            secondary_background: ColorRgba::transparent(),
            letterbox: ColorRgba::black(),
        }
    }
}
