use std::cell::Cell;
use std::rc::Rc;

use anyhow::Result;
use winit::event::{ElementState, WindowEvent};
use winit::keyboard::{KeyCode, PhysicalKey};
use winit::window::WindowId;

use kestrel_engine::camera::{CameraTween, FollowTarget, ShakeParams};
use kestrel_engine::compositor::ShaderPass;
use kestrel_engine::coords::{ColorRgba, PixelSize, Rect, Vec2};
use kestrel_engine::core::{App, AppControl, FrameCtx};
use kestrel_engine::device::GpuInit;
use kestrel_engine::logging::{LoggingConfig, init_logging};
use kestrel_engine::render::{BlendMode, Quad, QuadRenderer};
use kestrel_engine::viewport::{DisplaySettings, ViewportConfig};
use kestrel_engine::window::{Runtime, RuntimeConfig};

const TILE: f32 = 32.0;
const ARENA: i32 = 24;
const PRIMARY: PixelSize = PixelSize::new(640, 360);

/// Moving square the camera keeps centred.
struct Player {
    position: Cell<Vec2>,
}

impl FollowTarget for Player {
    // The camera target is the world point at the surface's top-left corner.
    fn follow_position(&self, _camera_position: Vec2) -> Vec2 {
        self.position.get() - PRIMARY.half()
    }
}

/// Key presses collected between frames.
#[derive(Default)]
struct Pending {
    fullscreen: bool,
    vsync: bool,
    shake: bool,
    flash: bool,
    next_monitor: bool,
    smoothing: bool,
    zoom_pulse: bool,
    chain_len: Option<usize>,
}

struct Demo {
    player: Rc<Player>,
    passes: Vec<ShaderPass>,
    chain_len: usize,
    world_quads: QuadRenderer,
    hud_quads: QuadRenderer,
    pending: Pending,
    started: bool,
}

impl Demo {
    fn new() -> Self {
        Self {
            player: Rc::new(Player { position: Cell::new(Vec2::zero()) }),
            passes: vec![
                ShaderPass::new("vignette", include_str!("shaders/vignette.wgsl")),
                ShaderPass::new("scanlines", include_str!("shaders/scanlines.wgsl")),
                ShaderPass::new("aberration", include_str!("shaders/aberration.wgsl")),
            ],
            chain_len: 1,
            world_quads: QuadRenderer::new(),
            hud_quads: QuadRenderer::new(),
            pending: Pending::default(),
            started: false,
        }
    }

    fn apply_pending(&mut self, ctx: &mut FrameCtx<'_, '_>) {
        let p = std::mem::take(&mut self.pending);
        let viewport = &mut *ctx.viewport;

        if p.fullscreen {
            viewport.toggle_fullscreen(ctx.monitors);
        }
        if p.vsync {
            let enabled = !viewport.window_state().vsync;
            viewport.set_vsync(enabled, ctx.monitors);
        }
        if p.next_monitor {
            let count = ctx.monitors.monitors().len().max(1);
            let next = (viewport.window_state().monitor_index + 1) % count;
            viewport.set_monitor(next, ctx.monitors);
        }
        if p.shake {
            viewport.camera_mut().shake(ShakeParams {
                duration: 0.5,
                strength: Vec2::new(10.0, 10.0),
                zoom_strength: 0.05,
                rotation_strength: 0.03,
                smoothness: 0.4,
            });
        }
        if p.flash {
            viewport
                .primary_surface_mut()
                .flash(0.4, ColorRgba::white(), ColorRgba::transparent());
        }
        if p.smoothing {
            let camera = viewport.camera_mut();
            let enabled = !camera.pixel_smoothing();
            camera.set_pixel_smoothing(enabled);
            log::info!("pixel smoothing {}", if enabled { "on" } else { "off" });
        }
        if p.zoom_pulse {
            let camera = viewport.camera_mut();
            camera.push_tween(CameraTween::new(Vec2::zero(), 1.5, 0.4));
            camera.push_tween(CameraTween::new(Vec2::zero(), 1.0, 0.6));
        }
        if let Some(n) = p.chain_len {
            self.chain_len = n.min(self.passes.len());
            log::info!("shader chain: {} pass(es)", self.chain_len);
        }
    }
}

impl App for Demo {
    fn on_window_event(&mut self, _window_id: WindowId, event: &WindowEvent) -> AppControl {
        let WindowEvent::KeyboardInput { event, .. } = event else {
            return AppControl::Continue;
        };
        if event.state != ElementState::Pressed || event.repeat {
            return AppControl::Continue;
        }
        let PhysicalKey::Code(code) = event.physical_key else {
            return AppControl::Continue;
        };

        let p = &mut self.pending;
        match code {
            KeyCode::Escape => return AppControl::Exit,
            KeyCode::F11 => p.fullscreen = true,
            KeyCode::KeyV => p.vsync = true,
            KeyCode::KeyS => p.shake = true,
            KeyCode::KeyF => p.flash = true,
            KeyCode::KeyM => p.next_monitor = true,
            KeyCode::KeyP => p.smoothing = true,
            KeyCode::KeyZ => p.zoom_pulse = true,
            KeyCode::Digit0 => p.chain_len = Some(0),
            KeyCode::Digit1 => p.chain_len = Some(1),
            KeyCode::Digit2 => p.chain_len = Some(2),
            KeyCode::Digit3 => p.chain_len = Some(3),
            _ => {}
        }
        AppControl::Continue
    }

    fn on_frame(&mut self, ctx: &mut FrameCtx<'_, '_>) -> AppControl {
        if !self.started {
            let camera = ctx.viewport.camera_mut();
            camera.set_target(self.player.clone());
            camera.set_follow_smoothing(0.85);
            camera.set_boundary_radius(24.0);
            self.started = true;
        }
        self.apply_pending(ctx);

        let t = ctx.time.elapsed;
        self.player
            .position
            .set(Vec2::new((t * 0.7).cos() * 220.0, (t * 1.1).sin() * 140.0));

        let world = world_quads(self.player.position.get());
        let hud = hud_quads(self.chain_len, ctx.viewport.window_state().vsync, ctx.viewport.secondary_size());

        let (world_renderer, hud_renderer) = (&mut self.world_quads, &mut self.hud_quads);
        ctx.render(
            &self.passes[..self.chain_len],
            |rctx, capture| {
                world_renderer.draw(rctx, &mut capture.target, &capture.transform, &world, BlendMode::Alpha);
            },
            |rctx, capture| {
                hud_renderer.draw(rctx, &mut capture.target, &capture.transform, &hud, BlendMode::Alpha);
            },
        )
    }

    fn on_settings_changed(&mut self, settings: &DisplaySettings) {
        log::info!(
            "display: {}x{} fullscreen={} vsync={} monitor={}",
            settings.windowed_size.width,
            settings.windowed_size.height,
            settings.fullscreen,
            settings.vsync,
            settings.monitor_index
        );
    }
}

/// Checkerboard arena with the player on top.
fn world_quads(player: Vec2) -> Vec<Quad> {
    let dark = ColorRgba::new(0.10, 0.12, 0.16, 1.0);
    let light = ColorRgba::new(0.16, 0.19, 0.24, 1.0);

    let mut quads = Vec::with_capacity((ARENA * ARENA) as usize * 4 + 1);
    for y in -ARENA..ARENA {
        for x in -ARENA..ARENA {
            let color = if (x + y).rem_euclid(2) == 0 { dark } else { light };
            let rect = Rect::new(x as f32 * TILE, y as f32 * TILE, TILE, TILE);
            quads.push(Quad::from_rect(rect, color));
        }
    }

    let size = 20.0;
    quads.push(Quad::from_rect(
        Rect::new(player.x - size * 0.5, player.y - size * 0.5, size, size),
        ColorRgba::new(0.95, 0.55, 0.20, 1.0),
    ));
    quads
}

/// Chain-length pips and a vsync indicator in the top-left corner.
fn hud_quads(chain_len: usize, vsync: bool, surface: PixelSize) -> Vec<Quad> {
    let mut quads = vec![Quad::from_rect(
        Rect::new(8.0, 8.0, 16.0 * 4.0 + 8.0, 24.0),
        ColorRgba::new(0.0, 0.0, 0.0, 0.5),
    )];
    for i in 0..3 {
        let on = i < chain_len;
        let color = if on {
            ColorRgba::new(0.4, 0.9, 0.5, 1.0)
        } else {
            ColorRgba::new(0.3, 0.3, 0.3, 0.8)
        };
        quads.push(Quad::from_rect(Rect::new(12.0 + i as f32 * 16.0, 12.0, 12.0, 16.0), color));
    }
    let vsync_color = if vsync {
        ColorRgba::new(0.3, 0.6, 1.0, 1.0)
    } else {
        ColorRgba::new(1.0, 0.3, 0.3, 1.0)
    };
    quads.push(Quad::from_rect(Rect::new(12.0 + 3.0 * 16.0, 12.0, 12.0, 16.0), vsync_color));

    // Thin border marking the secondary surface bounds.
    let (w, h) = (surface.width as f32, surface.height as f32);
    let edge = ColorRgba::new(1.0, 1.0, 1.0, 0.15);
    quads.push(Quad::from_rect(Rect::new(0.0, 0.0, w, 2.0), edge));
    quads.push(Quad::from_rect(Rect::new(0.0, h - 2.0, w, 2.0), edge));
    quads
}

fn main() -> Result<()> {
    init_logging(LoggingConfig::default());
    log::info!("F11 fullscreen, V vsync, M monitor, S shake, F flash, Z zoom, P smoothing, 0-3 passes");

    let config = RuntimeConfig {
        title: "kestrel demo".to_string(),
        viewport: ViewportConfig {
            window_size: PixelSize::new(1280, 720),
            primary_size: Some(PRIMARY),
            frame_rate_limit: Some(120),
            ..ViewportConfig::default()
        },
        settings: None,
    };

    Runtime::run(config, GpuInit::default(), Demo::new())
}
