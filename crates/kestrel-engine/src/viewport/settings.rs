use crate::coords::PixelSize;

use super::WindowState;

/// Persisted display preferences.
///
/// Read once at startup and handed back whenever they change; storage and
/// schema belong to the caller.
#[derive(Debug, Clone, PartialEq)]
pub struct DisplaySettings {
    pub windowed_size: PixelSize,
    pub position: Option<(i32, i32)>,
    pub monitor_index: usize,
    pub fullscreen: bool,
    pub vsync: bool,
    pub frame_rate_limit: Option<u32>,
}

impl Default for DisplaySettings {
    fn default() -> Self {
        Self {
            windowed_size: PixelSize::new(1280, 720),
            position: None,
            monitor_index: 0,
            fullscreen: false,
            vsync: true,
            frame_rate_limit: None,
        }
    }
}

impl From<&WindowState> for DisplaySettings {
    fn from(w: &WindowState) -> Self {
        Self {
            windowed_size: w.windowed_size,
            position: w.position,
            monitor_index: w.monitor_index,
            fullscreen: w.fullscreen,
            vsync: w.vsync,
            frame_rate_limit: w.frame_rate_limit,
        }
    }
}

impl DisplaySettings {
    /// Window state the settings describe, before any monitor is known.
    ///
    /// Fullscreen is applied later through the viewport so the monitor size
    /// can be looked up.
    pub fn to_window_state(&self) -> WindowState {
        let size = if self.windowed_size.is_empty() {
            DisplaySettings::default().windowed_size
        } else {
            self.windowed_size
        };
        WindowState {
            current_size: size,
            windowed_size: size,
            position: self.position,
            monitor_index: self.monitor_index,
            fullscreen: false,
            vsync: self.vsync,
            frame_rate_limit: self.frame_rate_limit,
        }
    }
}
