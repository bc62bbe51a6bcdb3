use crate::coords::PixelSize;

/// One display as reported by the windowing backend.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct MonitorInfo {
    /// Position in the enumeration order.
    pub index: usize,
    pub size: PixelSize,
    pub refresh_rate_hz: Option<f32>,
    /// Top-left corner in desktop coordinates.
    pub position: (i32, i32),
}

impl MonitorInfo {
    /// Top-left corner that centres a window of `size` on this monitor.
    pub fn centered_position(&self, size: PixelSize) -> (i32, i32) {
        let dx = (self.size.width as i64 - size.width as i64) / 2;
        let dy = (self.size.height as i64 - size.height as i64) / 2;
        (
            self.position.0.saturating_add(dx.max(0) as i32),
            self.position.1.saturating_add(dy.max(0) as i32),
        )
    }
}

/// Monitor enumeration and change notification.
pub trait MonitorSource {
    fn monitors(&self) -> Vec<MonitorInfo>;

    fn monitor(&self, index: usize) -> Option<MonitorInfo> {
        self.monitors().into_iter().find(|m| m.index == index)
    }

    /// Whether the set of monitors changed since the previous call.
    fn configuration_changed(&mut self) -> bool;
}

/// A fixed monitor list never reports changes.
impl MonitorSource for Vec<MonitorInfo> {
    fn monitors(&self) -> Vec<MonitorInfo> {
        self.clone()
    }

    fn configuration_changed(&mut self) -> bool {
        false
    }
}
