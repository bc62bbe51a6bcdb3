use winit::monitor::MonitorHandle;
use winit::window::Window;

use crate::coords::PixelSize;
use crate::viewport::{MonitorInfo, MonitorSource};

/// Monitor list read from winit.
///
/// winit has no hotplug event, so the runtime calls [`refresh`](Self::refresh)
/// once per frame and the viewport sees a change when the snapshot differs.
#[derive(Default)]
pub struct WinitMonitors {
    handles: Vec<MonitorHandle>,
    infos: Vec<MonitorInfo>,
    changed: bool,
}

impl WinitMonitors {
    pub fn new() -> Self {
        Self {
            changed: true,
            ..Self::default()
        }
    }

    /// Re-reads the monitors; marks the source changed when they differ.
    pub fn refresh(&mut self, window: &Window) {
        let handles: Vec<MonitorHandle> = window.available_monitors().collect();
        let infos: Vec<MonitorInfo> = handles
            .iter()
            .enumerate()
            .map(|(index, h)| describe(index, h))
            .collect();

        if infos != self.infos {
            log::info!("monitor configuration: {} monitor(s)", infos.len());
            for m in &infos {
                log::debug!("  #{} {:?} at {:?} @ {:?} Hz", m.index, m.size, m.position, m.refresh_rate_hz);
            }
            self.changed = true;
        }
        self.handles = handles;
        self.infos = infos;
    }

    /// winit handle for fullscreen requests.
    pub fn handle(&self, index: usize) -> Option<MonitorHandle> {
        self.handles.get(index).cloned()
    }
}

impl MonitorSource for WinitMonitors {
    fn monitors(&self) -> Vec<MonitorInfo> {
        self.infos.clone()
    }

    fn configuration_changed(&mut self) -> bool {
        std::mem::take(&mut self.changed)
    }
}

fn describe(index: usize, handle: &MonitorHandle) -> MonitorInfo {
    let size = handle.size();
    let position = handle.position();
    MonitorInfo {
        index,
        size: PixelSize::new(size.width, size.height),
        refresh_rate_hz: handle
            .refresh_rate_millihertz()
            .map(|mhz| mhz as f32 / 1000.0),
        position: (position.x, position.y),
    }
}
