use crate::coords::PixelSize;

use super::MonitorInfo;

/// Window geometry and presentation policy.
///
/// `windowed_size` only changes while not fullscreen, so leaving fullscreen
/// always has the last windowed size to return to.
#[derive(Debug, Clone, PartialEq)]
pub struct WindowState {
    pub current_size: PixelSize,
    pub windowed_size: PixelSize,
    pub position: Option<(i32, i32)>,
    pub monitor_index: usize,
    pub fullscreen: bool,
    pub vsync: bool,
    /// Frame cap while vsync is off; `None` is uncapped.
    pub frame_rate_limit: Option<u32>,
}

impl WindowState {
    pub fn new(size: PixelSize) -> Self {
        Self {
            current_size: size,
            windowed_size: size,
            position: None,
            monitor_index: 0,
            fullscreen: false,
            vsync: true,
            frame_rate_limit: None,
        }
    }

    /// Records a size reported by the OS.
    pub fn resized(&mut self, size: PixelSize) {
        self.current_size = size;
        if !self.fullscreen {
            self.windowed_size = size;
        }
    }

    pub fn moved(&mut self, position: (i32, i32)) {
        if !self.fullscreen {
            self.position = Some(position);
        }
    }

    /// Switches to fullscreen on `monitor`; returns the new size.
    pub fn enter_fullscreen(&mut self, monitor: &MonitorInfo) -> PixelSize {
        if !self.fullscreen {
            self.windowed_size = self.current_size;
            self.fullscreen = true;
        }
        self.monitor_index = monitor.index;
        self.current_size = monitor.size;
        self.current_size
    }

    /// Returns to the remembered windowed size, shrunk to fit `monitor`.
    pub fn exit_fullscreen(&mut self, monitor: &MonitorInfo) -> PixelSize {
        self.fullscreen = false;
        self.monitor_index = monitor.index;
        self.windowed_size = self.windowed_size.clamped_to(monitor.size);
        self.current_size = self.windowed_size;
        self.current_size
    }

    /// Target frame rate: the monitor refresh with vsync, the explicit limit
    /// without.
    pub fn frame_rate_target(&self, refresh_rate_hz: Option<f32>) -> Option<f32> {
        if self.vsync {
            refresh_rate_hz
        } else {
            self.frame_rate_limit.map(|l| l as f32)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn monitor(index: usize, w: u32, h: u32) -> MonitorInfo {
        MonitorInfo {
            index,
            size: PixelSize::new(w, h),
            refresh_rate_hz: Some(60.0),
            position: (0, 0),
        }
    }

    #[test]
    fn fullscreen_round_trip_restores_windowed_size() {
        let m = monitor(0, 1920, 1080);
        let mut w = WindowState::new(PixelSize::new(1280, 720));

        assert_eq!(w.enter_fullscreen(&m), PixelSize::new(1920, 1080));
        assert_eq!(w.windowed_size, PixelSize::new(1280, 720));
        assert_eq!(w.exit_fullscreen(&m), PixelSize::new(1280, 720));
        assert!(!w.fullscreen);
    }

    #[test]
    fn os_resize_in_fullscreen_keeps_windowed_size() {
        let m = monitor(0, 1920, 1080);
        let mut w = WindowState::new(PixelSize::new(1280, 720));
        w.enter_fullscreen(&m);
        w.resized(PixelSize::new(1920, 1080));
        assert_eq!(w.windowed_size, PixelSize::new(1280, 720));
    }

    #[test]
    fn exit_clamps_to_smaller_monitor() {
        let mut w = WindowState::new(PixelSize::new(2400, 1300));
        w.enter_fullscreen(&monitor(0, 2560, 1440));
        assert_eq!(w.exit_fullscreen(&monitor(1, 1920, 1080)), PixelSize::new(1920, 1080));
        assert_eq!(w.monitor_index, 1);
    }

    #[test]
    fn frame_rate_target_follows_vsync() {
        let mut w = WindowState::new(PixelSize::new(640, 480));
        w.frame_rate_limit = Some(144);
        assert_eq!(w.frame_rate_target(Some(60.0)), Some(60.0));
        w.vsync = false;
        assert_eq!(w.frame_rate_target(Some(60.0)), Some(144.0));
    }
}
