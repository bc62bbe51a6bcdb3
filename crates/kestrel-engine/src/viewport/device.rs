use anyhow::Result;

use crate::camera::{Camera, CameraView};
use crate::compositor::{ShaderChainCompositor, ShaderChainSource};
use crate::coords::{PixelSize, Rect, Vec2};
use crate::device::ordering_violation;
use crate::render::{QuadRenderer, RenderCtx, RenderTarget};
use crate::surface::{RenderSurface, SurfaceCapture};

use super::{DisplaySettings, MonitorInfo, MonitorSource, ViewportConfig, WindowState};

/// Where the viewport is in the per-frame lifecycle.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum FramePhase {
    /// Between frames; window changes are accepted.
    Idle,
    /// Both surfaces are open for drawing.
    Capturing,
    /// Captures are closed and waiting for `present`.
    Captured,
}

/// Window change the runtime must carry out on the OS window.
#[derive(Debug, Clone, PartialEq)]
pub enum WindowCommand {
    SetFullscreen { monitor: usize },
    SetWindowed { size: PixelSize, position: Option<(i32, i32)> },
    Resize(PixelSize),
    SetVsync(bool),
}

/// Owns the two frame surfaces, the camera bound to the primary one, and
/// window/monitor/pacing state.
///
/// Per frame: [`begin_frame`](Self::begin_frame) → draws through
/// [`primary`](Self::primary) / [`secondary`](Self::secondary) →
/// [`end_frame`](Self::end_frame) → [`present`](Self::present). Window
/// changes are only accepted between frames; accepted changes resize the
/// surfaces that follow the window, notify the camera and queue a
/// [`WindowCommand`] for the runtime.
pub struct ViewportDevice<C: CameraView = Camera> {
    config: ViewportConfig,
    primary: RenderSurface,
    secondary: RenderSurface,
    camera: C,
    compositor: ShaderChainCompositor,
    quads: QuadRenderer,

    window: WindowState,
    current_monitor: Option<MonitorInfo>,
    pending_fullscreen: bool,
    commands: Vec<WindowCommand>,
    saved: DisplaySettings,

    phase: FramePhase,
}

impl ViewportDevice<Camera> {
    /// Viewport with an advanced camera sized to the primary surface.
    pub fn with_default_camera(config: ViewportConfig) -> Self {
        let size = config.primary_size.unwrap_or(config.window_size);
        Self::new(config, Camera::new(size))
    }
}

impl<C: CameraView> ViewportDevice<C> {
    pub fn new(config: ViewportConfig, mut camera: C) -> Self {
        let mut window = WindowState::new(config.window_size);
        window.vsync = config.vsync;
        window.frame_rate_limit = config.frame_rate_limit.filter(|&l| l > 0);
        window.monitor_index = config.monitor_index;

        let mut primary = RenderSurface::new(
            "kestrel primary",
            config.primary_size.unwrap_or(config.window_size),
        );
        primary.set_background(config.primary_background);

        let mut secondary = RenderSurface::new(
            "kestrel secondary",
            config.secondary_size.unwrap_or(config.window_size),
        );
        secondary.set_background(config.secondary_background);

        camera.on_surface_resized(primary.size());

        let saved = DisplaySettings {
            fullscreen: config.fullscreen,
            ..DisplaySettings::from(&window)
        };

        Self {
            pending_fullscreen: config.fullscreen,
            config,
            primary,
            secondary,
            camera,
            compositor: ShaderChainCompositor::new(),
            quads: QuadRenderer::new(),
            window,
            current_monitor: None,
            commands: Vec::new(),
            saved,
            phase: FramePhase::Idle,
        }
    }

    /// Viewport restored from persisted settings; `config` supplies the rest.
    pub fn from_settings(config: ViewportConfig, settings: &DisplaySettings, camera: C) -> Self {
        let restored = settings.to_window_state();
        let config = ViewportConfig {
            window_size: restored.windowed_size,
            vsync: settings.vsync,
            frame_rate_limit: settings.frame_rate_limit,
            monitor_index: settings.monitor_index,
            fullscreen: settings.fullscreen,
            ..config
        };
        let mut viewport = Self::new(config, camera);
        viewport.window.position = settings.position;
        viewport.saved = settings.clone();
        viewport
    }

    // ── accessors ─────────────────────────────────────────────────────────

    pub fn camera(&self) -> &C {
        &self.camera
    }

    pub fn camera_mut(&mut self) -> &mut C {
        &mut self.camera
    }

    pub fn primary_surface(&self) -> &RenderSurface {
        &self.primary
    }

    pub fn primary_surface_mut(&mut self) -> &mut RenderSurface {
        &mut self.primary
    }

    pub fn secondary_surface(&self) -> &RenderSurface {
        &self.secondary
    }

    pub fn secondary_surface_mut(&mut self) -> &mut RenderSurface {
        &mut self.secondary
    }

    pub fn primary_size(&self) -> PixelSize {
        self.primary.size()
    }

    pub fn secondary_size(&self) -> PixelSize {
        self.secondary.size()
    }

    pub fn window_state(&self) -> &WindowState {
        &self.window
    }

    pub fn current_monitor(&self) -> Option<&MonitorInfo> {
        self.current_monitor.as_ref()
    }

    pub fn phase(&self) -> FramePhase {
        self.phase
    }

    // ── frame lifecycle ───────────────────────────────────────────────────

    /// Opens both surfaces for drawing: primary through the camera,
    /// secondary with the identity mapping.
    ///
    /// Returns `Ok(false)` when a frame is already open. Allocation failures
    /// are fatal for the frame.
    pub fn begin_frame(&mut self, ctx: &RenderCtx<'_>, encoder: &mut wgpu::CommandEncoder) -> Result<bool> {
        if self.phase != FramePhase::Idle {
            ordering_violation("begin_frame before the previous frame was presented");
            return Ok(false);
        }

        let camera: &dyn CameraView = &self.camera;
        let secondary = &mut self.secondary;
        let opened = open_captures(
            encoder,
            &mut self.primary,
            |primary, encoder| primary.begin_capture(ctx, encoder, Some(camera)),
            |encoder| secondary.begin_capture(ctx, encoder, None),
        )?;

        if opened {
            self.phase = FramePhase::Capturing;
        }
        Ok(opened)
    }

    /// Draw handle for the primary surface (world coordinates).
    pub fn primary<'a>(&'a self, encoder: &'a mut wgpu::CommandEncoder) -> Option<SurfaceCapture<'a>> {
        if self.phase != FramePhase::Capturing {
            ordering_violation("primary surface requested outside a frame");
            return None;
        }
        self.primary.capture(encoder)
    }

    /// Draw handle for the secondary surface (surface pixels).
    pub fn secondary<'a>(&'a self, encoder: &'a mut wgpu::CommandEncoder) -> Option<SurfaceCapture<'a>> {
        if self.phase != FramePhase::Capturing {
            ordering_violation("secondary surface requested outside a frame");
            return None;
        }
        self.secondary.capture(encoder)
    }

    /// Closes both captures, drawing their flashes.
    pub fn end_frame(&mut self, ctx: &RenderCtx<'_>, encoder: &mut wgpu::CommandEncoder) -> bool {
        if self.phase != FramePhase::Capturing {
            ordering_violation("end_frame without begin_frame");
            return false;
        }
        self.primary.end_capture(ctx, encoder, &mut self.quads);
        self.secondary.end_capture(ctx, encoder, &mut self.quads);
        self.phase = FramePhase::Captured;
        true
    }

    /// Composites the primary surface through `chain`, then blits the
    /// secondary surface unshaded on top.
    pub fn present<S>(&mut self, ctx: &RenderCtx<'_>, target: &mut RenderTarget<'_>, chain: &S) -> Result<()>
    where
        S: ShaderChainSource + ?Sized,
    {
        if self.phase != FramePhase::Captured {
            ordering_violation("present without end_frame");
            return Ok(());
        }
        self.phase = FramePhase::Idle;

        target.clear(self.config.letterbox);
        let shift = self.camera.screen_shift().window;
        self.compositor.composite(
            ctx,
            &self.primary,
            chain.active_chain(),
            target,
            self.primary.blend(),
            shift,
        )?;
        self.secondary.draw_to(
            ctx,
            self.compositor.blitter_mut(),
            target,
            self.secondary.blend(),
            Vec2::zero(),
        );
        Ok(())
    }

    /// Advances the camera and both surfaces' flashes.
    pub fn update(&mut self, dt: f32) {
        let on_screen = self.primary.fitted_rect(self.window.current_size);
        self.camera
            .update(dt, on_screen.size.x, self.primary.size().width as f32);
        self.primary.update(dt);
        self.secondary.update(dt);
    }

    // ── coordinate spaces ─────────────────────────────────────────────────

    pub fn world_to_screen(&self, p: Vec2) -> Vec2 {
        self.camera.world_to_screen(p)
    }

    pub fn screen_to_world(&self, p: Vec2) -> Vec2 {
        self.camera.screen_to_world(p)
    }

    /// World point → secondary surface pixels.
    pub fn primary_to_secondary(&self, world: Vec2) -> Vec2 {
        self.window_to_secondary(self.primary_to_window(self.camera.world_to_screen(world)))
    }

    /// Secondary surface pixels → world point.
    pub fn secondary_to_primary(&self, p: Vec2) -> Vec2 {
        self.camera
            .screen_to_world(self.window_to_primary(self.secondary_to_window(p)))
    }

    /// Primary surface pixels → window pixels.
    pub fn primary_to_window(&self, p: Vec2) -> Vec2 {
        surface_to_window(self.primary.size(), self.window.current_size, p)
    }

    pub fn window_to_primary(&self, p: Vec2) -> Vec2 {
        window_to_surface(self.primary.size(), self.window.current_size, p)
    }

    pub fn secondary_to_window(&self, p: Vec2) -> Vec2 {
        surface_to_window(self.secondary.size(), self.window.current_size, p)
    }

    pub fn window_to_secondary(&self, p: Vec2) -> Vec2 {
        window_to_surface(self.secondary.size(), self.window.current_size, p)
    }

    /// Window pixels (e.g. a cursor) → world point.
    pub fn window_to_world(&self, p: Vec2) -> Vec2 {
        self.camera.screen_to_world(self.window_to_primary(p))
    }

    // ── window and monitor ────────────────────────────────────────────────

    /// Switches between fullscreen on the current monitor and the last
    /// windowed size. Returns `false` if no monitor is available.
    pub fn toggle_fullscreen(&mut self, monitors: &dyn MonitorSource) -> bool {
        if !self.ensure_idle("toggle_fullscreen during a frame") {
            return false;
        }
        let Some(monitor) = monitors
            .monitor(self.window.monitor_index)
            .or_else(|| monitors.monitors().first().copied())
        else {
            log::warn!("toggle_fullscreen: no monitor available");
            return false;
        };

        let size = if self.window.fullscreen {
            let size = self.window.exit_fullscreen(&monitor);
            let position = Some(self.windowed_position(&monitor, size));
            self.window.position = position;
            self.commands.push(WindowCommand::SetWindowed { size, position });
            size
        } else {
            let size = self.window.enter_fullscreen(&monitor);
            self.commands.push(WindowCommand::SetFullscreen { monitor: monitor.index });
            size
        };
        self.pending_fullscreen = false;
        self.current_monitor = Some(monitor);

        log::info!(
            "{} on monitor {} ({}x{})",
            if self.window.fullscreen { "fullscreen" } else { "windowed" },
            monitor.index,
            size.width,
            size.height
        );
        self.apply_window_size(size);
        true
    }

    /// Moves the window (or the fullscreen display) to monitor `index`.
    ///
    /// Unknown indices are rejected with `false` and change nothing.
    pub fn set_monitor(&mut self, index: usize, monitors: &dyn MonitorSource) -> bool {
        if !self.ensure_idle("set_monitor during a frame") {
            return false;
        }
        let Some(monitor) = monitors.monitor(index) else {
            log::warn!("set_monitor: monitor {index} not available");
            return false;
        };

        self.window.monitor_index = index;
        self.current_monitor = Some(monitor);

        let size = if self.window.fullscreen {
            let size = self.window.enter_fullscreen(&monitor);
            self.commands.push(WindowCommand::SetFullscreen { monitor: index });
            size
        } else {
            let size = self.window.windowed_size.clamped_to(monitor.size);
            let position = monitor.centered_position(size);
            self.window.resized(size);
            self.window.position = Some(position);
            self.commands.push(WindowCommand::SetWindowed {
                size,
                position: Some(position),
            });
            size
        };

        log::info!("moved to monitor {index} ({}x{})", size.width, size.height);
        self.apply_window_size(size);
        true
    }

    /// Requests a new windowed size, clamped to the current monitor.
    ///
    /// Rejected (`false`) for zero-area sizes and while fullscreen.
    pub fn resize_window(&mut self, size: PixelSize) -> bool {
        if !self.ensure_idle("resize_window during a frame") {
            return false;
        }
        if size.is_empty() {
            return false;
        }
        if self.window.fullscreen {
            log::debug!("resize_window ignored while fullscreen");
            return false;
        }

        let size = match self.current_monitor {
            Some(m) => size.clamped_to(m.size),
            None => size,
        };
        self.window.resized(size);
        self.commands.push(WindowCommand::Resize(size));
        self.apply_window_size(size);
        true
    }

    /// Size reported by the OS. Zero sizes (minimized windows) are ignored.
    pub fn on_window_resized(&mut self, size: PixelSize) {
        if size.is_empty() {
            log::debug!("window minimized; keeping surfaces");
            return;
        }
        if !self.ensure_idle("window resized during a frame") {
            return;
        }
        self.window.resized(size);
        self.apply_window_size(size);
    }

    pub fn on_window_moved(&mut self, position: (i32, i32)) {
        self.window.moved(position);
    }

    /// Turns vsync on or off; with vsync the frame-rate target becomes the
    /// current monitor's refresh rate.
    pub fn set_vsync(&mut self, enabled: bool, monitors: &dyn MonitorSource) {
        if let Some(m) = monitors.monitor(self.window.monitor_index) {
            self.current_monitor = Some(m);
        }
        if self.window.vsync == enabled {
            return;
        }
        self.window.vsync = enabled;
        self.commands.push(WindowCommand::SetVsync(enabled));
        log::info!("vsync {}", if enabled { "on" } else { "off" });
    }

    /// Frame cap while vsync is off; `None` or `Some(0)` is uncapped.
    pub fn set_frame_rate_limit(&mut self, limit: Option<u32>) {
        self.window.frame_rate_limit = limit.filter(|&l| l > 0);
    }

    /// Frames per second the loop should aim for; `None` is unpaced.
    pub fn frame_rate_target(&self) -> Option<f32> {
        self.window
            .frame_rate_target(self.current_monitor.and_then(|m| m.refresh_rate_hz))
    }

    /// Refreshes monitor data when the configuration changed (or was never
    /// read). Falls back to the first monitor when the current one is gone.
    ///
    /// Returns whether anything was refreshed.
    pub fn poll_monitors(&mut self, monitors: &mut dyn MonitorSource) -> bool {
        let changed = monitors.configuration_changed();
        if self.current_monitor.is_some() && !changed {
            return false;
        }
        if !self.ensure_idle("poll_monitors during a frame") {
            return false;
        }

        let list = monitors.monitors();
        let Some(monitor) = list
            .iter()
            .find(|m| m.index == self.window.monitor_index)
            .or_else(|| list.first())
            .copied()
        else {
            log::warn!("no monitors reported");
            self.current_monitor = None;
            return false;
        };

        if monitor.index != self.window.monitor_index {
            log::info!(
                "monitor {} unavailable; falling back to monitor {}",
                self.window.monitor_index,
                monitor.index
            );
        }
        self.window.monitor_index = monitor.index;
        self.current_monitor = Some(monitor);

        if self.pending_fullscreen {
            return self.toggle_fullscreen(&list);
        }

        if self.window.fullscreen && self.window.current_size != monitor.size {
            let size = self.window.enter_fullscreen(&monitor);
            self.commands.push(WindowCommand::SetFullscreen { monitor: monitor.index });
            self.apply_window_size(size);
        } else if !self.window.fullscreen && !self.window.current_size.fits_within(monitor.size) {
            let size = self.window.current_size.clamped_to(monitor.size);
            self.window.resized(size);
            self.commands.push(WindowCommand::Resize(size));
            self.apply_window_size(size);
        }
        true
    }

    /// Window changes accepted since the last call, oldest first.
    pub fn drain_window_commands(&mut self) -> Vec<WindowCommand> {
        std::mem::take(&mut self.commands)
    }

    // ── persisted settings ────────────────────────────────────────────────

    pub fn settings(&self) -> DisplaySettings {
        DisplaySettings {
            fullscreen: self.window.fullscreen || self.pending_fullscreen,
            ..DisplaySettings::from(&self.window)
        }
    }

    /// Whether [`settings`](Self::settings) changed since the last save.
    pub fn settings_dirty(&self) -> bool {
        self.settings() != self.saved
    }

    pub fn mark_settings_saved(&mut self) {
        self.saved = self.settings();
    }

    // ── internals ─────────────────────────────────────────────────────────

    fn ensure_idle(&self, what: &str) -> bool {
        if self.phase == FramePhase::Idle {
            return true;
        }
        ordering_violation(what);
        false
    }

    fn windowed_position(&self, monitor: &MonitorInfo, size: PixelSize) -> (i32, i32) {
        match self.window.position {
            Some(p) if monitor_contains(monitor, p) => p,
            _ => monitor.centered_position(size),
        }
    }

    fn apply_window_size(&mut self, size: PixelSize) {
        if size.is_empty() {
            return;
        }
        if self.config.primary_size.is_none() && self.primary.resize(size) {
            self.camera.on_surface_resized(self.primary.size());
        }
        if self.config.secondary_size.is_none() {
            self.secondary.resize(size);
        }
    }
}

/// Opens the primary capture, then the secondary one. When the secondary
/// fails or refuses, the primary capture is closed again so the viewport
/// stays idle.
fn open_captures<E>(
    encoder: &mut E,
    primary: &mut RenderSurface,
    open_primary: impl FnOnce(&mut RenderSurface, &mut E) -> Result<bool>,
    open_secondary: impl FnOnce(&mut E) -> Result<bool>,
) -> Result<bool> {
    if !open_primary(primary, encoder)? {
        return Ok(false);
    }
    match open_secondary(encoder) {
        Ok(true) => Ok(true),
        other => {
            primary.abort_capture();
            other
        }
    }
}

fn monitor_contains(monitor: &MonitorInfo, (x, y): (i32, i32)) -> bool {
    let (mx, my) = monitor.position;
    let dx = x as i64 - mx as i64;
    let dy = y as i64 - my as i64;
    (0..monitor.size.width as i64).contains(&dx) && (0..monitor.size.height as i64).contains(&dy)
}

fn surface_to_window(surface: PixelSize, window: PixelSize, p: Vec2) -> Vec2 {
    let rect = Rect::fit_centered(surface.as_vec2(), window.as_vec2());
    if rect.is_empty() || surface.is_empty() {
        return p;
    }
    let scale = rect.size.x / surface.width as f32;
    rect.origin + p * scale
}

fn window_to_surface(surface: PixelSize, window: PixelSize, p: Vec2) -> Vec2 {
    let rect = Rect::fit_centered(surface.as_vec2(), window.as_vec2());
    if rect.is_empty() || surface.is_empty() {
        return p;
    }
    let scale = rect.size.x / surface.width as f32;
    (p - rect.origin) / scale
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::camera::BasicCamera;

    const HD: PixelSize = PixelSize::new(1920, 1080);

    fn monitor(index: usize, size: PixelSize, hz: f32) -> MonitorInfo {
        MonitorInfo {
            index,
            size,
            refresh_rate_hz: Some(hz),
            position: (index as i32 * 4000, 0),
        }
    }

    fn viewport(window: PixelSize) -> ViewportDevice {
        ViewportDevice::with_default_camera(ViewportConfig {
            window_size: window,
            ..Default::default()
        })
    }

    fn assert_close(a: Vec2, b: Vec2) {
        assert!((a.x - b.x).abs() < 1e-3 && (a.y - b.y).abs() < 1e-3, "{a:?} != {b:?}");
    }

    /// Monitor list whose "changed" flag is set by the test.
    struct Hotplug {
        list: Vec<MonitorInfo>,
        changed: bool,
    }

    impl MonitorSource for Hotplug {
        fn monitors(&self) -> Vec<MonitorInfo> {
            self.list.clone()
        }

        fn configuration_changed(&mut self) -> bool {
            std::mem::take(&mut self.changed)
        }
    }

    // ── frame opening ─────────────────────────────────────────────────────

    fn open_ok(surface: &mut RenderSurface, _: &mut ()) -> Result<bool> {
        surface.open_capture_without_gpu();
        Ok(true)
    }

    #[test]
    fn new_viewport_is_idle() {
        assert_eq!(viewport(HD).phase(), FramePhase::Idle);
    }

    #[test]
    fn secondary_allocation_failure_closes_primary() {
        let mut primary = RenderSurface::new("p", PixelSize::new(1, 1));
        let result = open_captures(&mut (), &mut primary, open_ok, |_| {
            anyhow::bail!("failed to allocate render surface 'secondary'")
        });

        assert!(result.is_err());
        assert!(!primary.is_capturing());
        assert!(primary.resize(PixelSize::new(2, 2)));
    }

    #[test]
    fn secondary_refusal_closes_primary() {
        let mut primary = RenderSurface::new("p", PixelSize::new(4, 4));
        let opened = open_captures(&mut (), &mut primary, open_ok, |_| Ok(false)).unwrap();
        assert!(!opened);
        assert!(!primary.is_capturing());
    }

    #[test]
    fn primary_failure_skips_secondary() {
        let mut primary = RenderSurface::new("p", PixelSize::new(4, 4));
        let mut secondary_called = false;
        let result = open_captures(
            &mut (),
            &mut primary,
            |_, _| anyhow::bail!("failed to allocate render surface 'primary'"),
            |_| {
                secondary_called = true;
                Ok(true)
            },
        );
        assert!(result.is_err());
        assert!(!secondary_called);
        assert!(!primary.is_capturing());
    }

    #[test]
    fn both_open_leaves_primary_capturing() {
        let mut primary = RenderSurface::new("p", PixelSize::new(4, 4));
        assert!(open_captures(&mut (), &mut primary, open_ok, |_| Ok(true)).unwrap());
        assert!(primary.is_capturing());
    }

    // ── vsync / pacing ────────────────────────────────────────────────────

    #[test]
    fn vsync_targets_monitor_refresh_and_limit_without() {
        let monitors = vec![monitor(0, HD, 60.0)];
        let mut vp = viewport(HD);
        vp.set_frame_rate_limit(Some(144));

        vp.set_vsync(true, &monitors);
        assert_eq!(vp.frame_rate_target(), Some(60.0));

        vp.set_vsync(false, &monitors);
        assert_eq!(vp.frame_rate_target(), Some(144.0));
        assert_eq!(vp.drain_window_commands(), vec![WindowCommand::SetVsync(false)]);
    }

    #[test]
    fn zero_frame_rate_limit_is_uncapped() {
        let mut vp = viewport(HD);
        vp.set_frame_rate_limit(Some(0));
        vp.set_vsync(false, &Vec::<MonitorInfo>::new());
        assert_eq!(vp.frame_rate_target(), None);
    }

    // ── fullscreen / monitors ─────────────────────────────────────────────

    #[test]
    fn fullscreen_round_trip_restores_window() {
        let monitors = vec![monitor(0, HD, 60.0)];
        let mut vp = viewport(PixelSize::new(1280, 720));

        assert!(vp.toggle_fullscreen(&monitors));
        assert!(vp.window_state().fullscreen);
        assert_eq!(vp.primary_size(), HD);

        assert!(vp.toggle_fullscreen(&monitors));
        assert_eq!(vp.window_state().current_size, PixelSize::new(1280, 720));
        assert_eq!(vp.primary_size(), PixelSize::new(1280, 720));

        let cmds = vp.drain_window_commands();
        assert_eq!(cmds[0], WindowCommand::SetFullscreen { monitor: 0 });
        assert!(matches!(cmds[1], WindowCommand::SetWindowed { size, .. } if size == PixelSize::new(1280, 720)));
    }

    #[test]
    fn leaving_fullscreen_on_smaller_monitor_clamps() {
        let monitors = vec![
            monitor(0, PixelSize::new(2560, 1440), 144.0),
            monitor(1, HD, 60.0),
        ];
        let mut vp = viewport(PixelSize::new(2400, 1300));
        assert!(vp.toggle_fullscreen(&monitors));
        assert!(vp.set_monitor(1, &monitors));
        assert_eq!(vp.window_state().current_size, HD);

        assert!(vp.toggle_fullscreen(&monitors));
        assert_eq!(vp.window_state().current_size, HD);
    }

    #[test]
    fn unknown_monitor_is_rejected() {
        let monitors = vec![monitor(0, HD, 60.0)];
        let mut vp = viewport(PixelSize::new(1280, 720));
        assert!(!vp.set_monitor(3, &monitors));
        assert_eq!(vp.window_state().monitor_index, 0);
        assert!(vp.drain_window_commands().is_empty());
    }

    #[test]
    fn toggle_without_monitors_fails() {
        let mut vp = viewport(PixelSize::new(1280, 720));
        assert!(!vp.toggle_fullscreen(&Vec::<MonitorInfo>::new()));
        assert!(!vp.window_state().fullscreen);
    }

    #[test]
    fn set_monitor_windowed_centres_window() {
        let monitors = vec![monitor(0, HD, 60.0), monitor(1, HD, 75.0)];
        let mut vp = viewport(PixelSize::new(1280, 720));
        assert!(vp.set_monitor(1, &monitors));
        assert_eq!(vp.window_state().position, Some((4000 + 320, 180)));
        assert_eq!(vp.frame_rate_target(), Some(75.0));
    }

    #[test]
    fn poll_falls_back_when_monitor_disappears() {
        let mut source = Hotplug {
            list: vec![monitor(0, HD, 60.0), monitor(1, HD, 120.0)],
            changed: false,
        };
        let mut vp = viewport(PixelSize::new(1280, 720));
        assert!(vp.set_monitor(1, &source.list));
        assert!(!vp.poll_monitors(&mut source));

        source.list.truncate(1);
        source.changed = true;
        assert!(vp.poll_monitors(&mut source));
        assert_eq!(vp.window_state().monitor_index, 0);
        assert_eq!(vp.current_monitor().map(|m| m.index), Some(0));
        assert_eq!(vp.frame_rate_target(), Some(60.0));
    }

    #[test]
    fn configured_fullscreen_applies_on_first_poll() {
        let mut monitors = vec![monitor(0, HD, 60.0)];
        let mut vp = ViewportDevice::with_default_camera(ViewportConfig {
            window_size: PixelSize::new(800, 600),
            fullscreen: true,
            ..Default::default()
        });
        assert!(vp.poll_monitors(&mut monitors));
        assert!(vp.window_state().fullscreen);
        assert_eq!(vp.window_state().windowed_size, PixelSize::new(800, 600));
        assert!(!vp.settings_dirty());
    }

    // ── resize ────────────────────────────────────────────────────────────

    #[test]
    fn resize_follows_window_and_notifies_camera() {
        let mut vp = viewport(PixelSize::new(1280, 720));
        assert!(vp.resize_window(PixelSize::new(640, 360)));
        assert_eq!(vp.primary_size(), PixelSize::new(640, 360));
        assert_eq!(vp.secondary_size(), PixelSize::new(640, 360));
        assert_eq!(vp.camera().transform().pivot, Vec2::new(320.0, 180.0));
    }

    #[test]
    fn zero_area_resize_is_rejected() {
        let mut vp = viewport(PixelSize::new(1280, 720));
        assert!(!vp.resize_window(PixelSize::new(0, 720)));
        vp.on_window_resized(PixelSize::new(0, 0));
        assert_eq!(vp.primary_size(), PixelSize::new(1280, 720));
    }

    #[test]
    fn fixed_surfaces_ignore_window_size() {
        let mut vp = ViewportDevice::new(
            ViewportConfig {
                window_size: PixelSize::new(1280, 720),
                primary_size: Some(PixelSize::new(320, 180)),
                ..Default::default()
            },
            BasicCamera::new(PixelSize::new(320, 180)),
        );
        vp.on_window_resized(PixelSize::new(1920, 1080));
        assert_eq!(vp.primary_size(), PixelSize::new(320, 180));
        assert_eq!(vp.secondary_size(), HD);
    }

    #[test]
    fn resize_window_is_rejected_in_fullscreen() {
        let monitors = vec![monitor(0, HD, 60.0)];
        let mut vp = viewport(PixelSize::new(1280, 720));
        vp.toggle_fullscreen(&monitors);
        assert!(!vp.resize_window(PixelSize::new(800, 600)));
        assert_eq!(vp.window_state().windowed_size, PixelSize::new(1280, 720));
    }

    #[test]
    #[cfg(debug_assertions)]
    #[should_panic(expected = "ordering violation")]
    fn resize_during_capture_asserts() {
        let mut vp = viewport(PixelSize::new(1280, 720));
        vp.phase = FramePhase::Capturing;
        vp.resize_window(PixelSize::new(640, 360));
    }

    #[test]
    #[cfg(debug_assertions)]
    #[should_panic(expected = "set_monitor during a frame")]
    fn monitor_change_between_end_and_present_asserts() {
        let monitors = vec![monitor(0, HD, 60.0)];
        let mut vp = viewport(PixelSize::new(1280, 720));
        vp.phase = FramePhase::Captured;
        vp.set_monitor(0, &monitors);
    }

    // ── coordinate spaces ─────────────────────────────────────────────────

    #[test]
    fn zoomed_scenario_maps_world_to_both_surfaces() {
        let mut vp = viewport(HD);
        vp.camera_mut().set_zoom(2.0);
        vp.update(0.0);

        assert_close(vp.world_to_screen(Vec2::new(100.0, 0.0)), Vec2::new(200.0, 0.0));
        assert_close(vp.screen_to_world(Vec2::new(200.0, 0.0)), Vec2::new(100.0, 0.0));
        assert_close(vp.primary_to_secondary(Vec2::new(100.0, 0.0)), Vec2::new(200.0, 0.0));
        assert_close(vp.secondary_to_primary(Vec2::new(200.0, 0.0)), Vec2::new(100.0, 0.0));
    }

    #[test]
    fn letterboxed_primary_maps_through_window() {
        let mut vp = ViewportDevice::with_default_camera(ViewportConfig {
            window_size: PixelSize::new(1280, 800),
            primary_size: Some(PixelSize::new(320, 180)),
            ..Default::default()
        });
        vp.update(0.0);

        // 320x180 fits 1280x800 at scale 4 with 40px bars top and bottom.
        assert_close(vp.primary_to_window(Vec2::new(0.0, 0.0)), Vec2::new(0.0, 40.0));
        assert_close(vp.window_to_primary(Vec2::new(640.0, 400.0)), Vec2::new(160.0, 90.0));
        assert_close(vp.window_to_world(Vec2::new(0.0, 40.0)), Vec2::new(0.0, 0.0));
    }

    #[test]
    fn primary_secondary_round_trip_with_different_densities() {
        let mut vp = ViewportDevice::with_default_camera(ViewportConfig {
            window_size: HD,
            primary_size: Some(PixelSize::new(480, 270)),
            secondary_size: Some(HD),
            ..Default::default()
        });
        vp.camera_mut().set_zoom(1.5);
        vp.camera_mut().set_rotation(0.3);
        vp.update(0.0);

        for p in [Vec2::new(0.0, 0.0), Vec2::new(37.5, -12.0), Vec2::new(-100.0, 80.0)] {
            let back = vp.secondary_to_primary(vp.primary_to_secondary(p));
            assert_close(back, p);
        }
        // 480 → 1920 is a 4x density ratio.
        let s = vp.primary_to_secondary(vp.screen_to_world(Vec2::new(10.0, 10.0)));
        assert_close(s, Vec2::new(40.0, 40.0));
    }

    // ── settings ──────────────────────────────────────────────────────────

    #[test]
    fn settings_track_changes_until_saved() {
        let monitors = vec![monitor(0, HD, 60.0)];
        let mut vp = viewport(PixelSize::new(1280, 720));
        assert!(!vp.settings_dirty());

        vp.set_vsync(false, &monitors);
        assert!(vp.settings_dirty());
        vp.mark_settings_saved();
        assert!(!vp.settings_dirty());

        vp.on_window_moved((10, 20));
        assert_eq!(vp.settings().position, Some((10, 20)));
    }

    #[test]
    fn restores_from_settings() {
        let settings = DisplaySettings {
            windowed_size: PixelSize::new(1024, 768),
            position: Some((5, 5)),
            monitor_index: 0,
            fullscreen: false,
            vsync: false,
            frame_rate_limit: Some(90),
        };
        let vp = ViewportDevice::from_settings(
            ViewportConfig::default(),
            &settings,
            Camera::new(PixelSize::new(1024, 768)),
        );
        assert_eq!(vp.primary_size(), PixelSize::new(1024, 768));
        assert_eq!(vp.frame_rate_target(), Some(90.0));
        assert_eq!(vp.settings(), settings);
        assert!(!vp.settings_dirty());
    }
}
