use std::time::Instant;

use anyhow::{Context, Result};
use ouroboros::self_referencing;

use winit::application::ApplicationHandler;
use winit::dpi::{PhysicalPosition, PhysicalSize};
use winit::event::WindowEvent;
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::window::{Fullscreen, Window, WindowId};

use crate::camera::Camera;
use crate::core::{App as CoreApp, AppControl, FrameCtx, WindowCtx};
use crate::coords::PixelSize;
use crate::device::{Gpu, GpuInit};
use crate::time::{FrameClock, FramePacer};
use crate::viewport::{DisplaySettings, ViewportConfig, ViewportDevice, WindowCommand};

use super::WinitMonitors;

/// Window/runtime configuration.
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    pub title: String,
    pub viewport: ViewportConfig,
    /// Persisted display settings; override the matching `viewport` fields.
    pub settings: Option<DisplaySettings>,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            title: "kestrel".to_string(),
            viewport: ViewportConfig::default(),
            settings: None,
        }
    }
}

/// Runtime context passed to the application.
///
/// Commands are buffered and applied after the current callback returns.
#[derive(Default)]
pub struct RuntimeCtx {
    commands: Vec<Command>,
}

impl RuntimeCtx {
    pub fn set_title(&mut self, title: impl Into<String>) {
        self.commands.push(Command::SetTitle(title.into()));
    }

    pub fn exit(&mut self) {
        self.commands.push(Command::Exit);
    }
}

enum Command {
    SetTitle(String),
    Exit,
}

/// Entry point for the runtime.
pub struct Runtime;

impl Runtime {
    pub fn run<A>(config: RuntimeConfig, gpu_init: GpuInit, app: A) -> Result<()>
    where
        A: 'static + CoreApp,
    {
        let event_loop = EventLoop::new().context("failed to create winit EventLoop")?;
        let mut state = AppState::new(config, gpu_init, app);

        event_loop
            .run_app(&mut state)
            .context("winit event loop terminated with error")?;

        if state.viewport.settings_dirty() {
            let settings = state.viewport.settings();
            log::info!("display settings changed: {settings:?}");
            state.app.on_settings_changed(&settings);
            state.viewport.mark_settings_saved();
        }
        Ok(())
    }
}

#[self_referencing]
struct WindowEntry {
    window: Window,

    #[borrows(window)]
    #[covariant]
    gpu: Gpu<'this>,
}

struct AppState<A>
where
    A: CoreApp + 'static,
{
    title: String,
    gpu_init: GpuInit,
    app: A,

    viewport: ViewportDevice,
    monitors: WinitMonitors,
    clock: FrameClock,
    pacer: FramePacer,

    entry: Option<WindowEntry>,
    exit_requested: bool,
}

impl<A> AppState<A>
where
    A: CoreApp + 'static,
{
    fn new(config: RuntimeConfig, gpu_init: GpuInit, app: A) -> Self {
        let viewport = match &config.settings {
            Some(settings) => ViewportDevice::from_settings(
                config.viewport.clone(),
                settings,
                Camera::new(config.viewport.primary_size.unwrap_or(settings.windowed_size)),
            ),
            None => ViewportDevice::with_default_camera(config.viewport),
        };

        Self {
            title: config.title,
            gpu_init,
            app,
            viewport,
            monitors: WinitMonitors::new(),
            clock: FrameClock::new(),
            pacer: FramePacer::default(),
            entry: None,
            exit_requested: false,
        }
    }

    fn request_exit(&mut self) {
        self.exit_requested = true;
    }

    fn create_window_entry(&mut self, event_loop: &ActiveEventLoop) -> Result<()> {
        let state = self.viewport.window_state();
        let size = state.current_size;

        let mut attrs = Window::default_attributes()
            .with_title(self.title.clone())
            .with_inner_size(PhysicalSize::new(size.width, size.height));
        if let Some((x, y)) = state.position {
            attrs = attrs.with_position(PhysicalPosition::new(x, y));
        }

        let window = event_loop
            .create_window(attrs)
            .context("failed to create window")?;

        let gpu_init = GpuInit {
            vsync: state.vsync,
            ..self.gpu_init.clone()
        };

        let entry = WindowEntry::try_new(window, |w| pollster::block_on(Gpu::new(w, gpu_init)))
            .context("GPU initialization failed for window")?;

        let actual = entry.with_gpu(|gpu| gpu.size());
        self.viewport.on_window_resized(actual);
        self.clock.reset();
        self.entry = Some(entry);
        Ok(())
    }

    /// Carries out viewport window changes on the OS window.
    fn apply_window_commands(&mut self) {
        let commands = self.viewport.drain_window_commands();
        let Some(entry) = self.entry.as_mut() else {
            return;
        };
        let (viewport, monitors) = (&mut self.viewport, &self.monitors);

        entry.with_mut(|fields| {
            for cmd in commands {
                log::debug!("window command: {cmd:?}");
                match cmd {
                    WindowCommand::SetFullscreen { monitor } => {
                        fields
                            .window
                            .set_fullscreen(Some(Fullscreen::Borderless(monitors.handle(monitor))));
                    }
                    WindowCommand::SetWindowed { size, position } => {
                        fields.window.set_fullscreen(None);
                        request_size(fields.window, fields.gpu, viewport, size);
                        if let Some((x, y)) = position {
                            fields.window.set_outer_position(PhysicalPosition::new(x, y));
                        }
                    }
                    WindowCommand::Resize(size) => {
                        request_size(fields.window, fields.gpu, viewport, size);
                    }
                    WindowCommand::SetVsync(enabled) => fields.gpu.set_vsync(enabled),
                }
            }
        });
        self.update_pacing();
    }

    /// With vsync the present mode paces frames; otherwise the pacer does.
    fn update_pacing(&mut self) {
        let target = if self.viewport.window_state().vsync {
            None
        } else {
            self.viewport.frame_rate_target()
        };
        self.pacer.set_target(target);
    }

    fn apply_runtime_commands(&mut self, event_loop: &ActiveEventLoop, mut ctx: RuntimeCtx) {
        for cmd in ctx.commands.drain(..) {
            match cmd {
                Command::SetTitle(title) => {
                    if let Some(entry) = self.entry.as_ref() {
                        entry.with_window(|w| w.set_title(&title));
                    }
                    self.title = title;
                }
                Command::Exit => self.request_exit(),
            }
        }

        if self.exit_requested {
            event_loop.exit();
        }
    }

    fn redraw(&mut self, event_loop: &ActiveEventLoop, window_id: WindowId) {
        let now = Instant::now();
        if !self.pacer.should_render(now) {
            return;
        }

        if let Some(entry) = self.entry.as_ref() {
            entry.with_window(|w| self.monitors.refresh(w));
        }
        if self.viewport.poll_monitors(&mut self.monitors) {
            self.apply_window_commands();
        }

        let mut runtime_ctx = RuntimeCtx::default();
        let mut app_control = AppControl::Continue;
        let ft = self.clock.tick_at(now);

        let (app, viewport, monitors) = (&mut self.app, &mut self.viewport, &self.monitors);
        if let Some(entry) = self.entry.as_mut() {
            entry.with_mut(|fields| {
                let mut ctx = FrameCtx {
                    window: WindowCtx {
                        id: window_id,
                        window: fields.window,
                    },
                    gpu: fields.gpu,
                    viewport,
                    monitors,
                    time: ft,
                    runtime: &mut runtime_ctx,
                };
                app_control = app.on_frame(&mut ctx);
            });
        }
        self.pacer.mark_rendered(now);

        if app_control == AppControl::Exit {
            runtime_ctx.exit();
        }

        self.apply_window_commands();
        self.apply_runtime_commands(event_loop, runtime_ctx);
    }
}

/// Asks the OS for a new inner size; applies it at once when the platform
/// resizes synchronously.
fn request_size(window: &Window, gpu: &mut Gpu<'_>, viewport: &mut ViewportDevice, size: PixelSize) {
    if let Some(actual) = window.request_inner_size(PhysicalSize::new(size.width, size.height)) {
        let actual = PixelSize::new(actual.width, actual.height);
        gpu.resize(actual);
        viewport.on_window_resized(actual);
    }
}

impl<A> ApplicationHandler for AppState<A>
where
    A: CoreApp + 'static,
{
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.entry.is_some() {
            return;
        }

        if let Err(e) = self.create_window_entry(event_loop) {
            log::error!("failed to create initial window: {e:#}");
            self.request_exit();
            event_loop.exit();
            return;
        }

        self.update_pacing();
        if let Some(entry) = self.entry.as_ref() {
            entry.with_window(|w| w.request_redraw());
        }
    }

    fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
        if self.exit_requested {
            event_loop.exit();
            return;
        }

        match self.pacer.next_deadline() {
            Some(deadline) if Instant::now() < deadline => {
                event_loop.set_control_flow(ControlFlow::WaitUntil(deadline));
            }
            _ => {
                event_loop.set_control_flow(ControlFlow::Wait);
                if let Some(entry) = self.entry.as_ref() {
                    entry.with_window(|w| w.request_redraw());
                }
            }
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        window_id: WindowId,
        event: WindowEvent,
    ) {
        if self.exit_requested {
            event_loop.exit();
            return;
        }

        if self.app.on_window_event(window_id, &event) == AppControl::Exit {
            self.request_exit();
            event_loop.exit();
            return;
        }

        match &event {
            WindowEvent::CloseRequested => {
                self.entry = None;
                self.request_exit();
                event_loop.exit();
            }

            WindowEvent::Resized(new_size) => {
                let size = PixelSize::new(new_size.width, new_size.height);
                if let Some(entry) = self.entry.as_mut() {
                    entry.with_gpu_mut(|gpu| gpu.resize(size));
                    entry.with_window(|w| w.request_redraw());
                }
                self.viewport.on_window_resized(size);
            }

            WindowEvent::Moved(position) => {
                self.viewport.on_window_moved((position.x, position.y));
            }

            WindowEvent::ScaleFactorChanged { .. } => {
                if let Some(entry) = self.entry.as_mut() {
                    let s = entry.with_window(|w| w.inner_size());
                    let size = PixelSize::new(s.width, s.height);
                    entry.with_gpu_mut(|gpu| gpu.resize(size));
                    self.viewport.on_window_resized(size);
                }
            }

            WindowEvent::RedrawRequested => self.redraw(event_loop, window_id),

            _ => {}
        }

        if self.exit_requested {
            event_loop.exit();
        }
    }
}
