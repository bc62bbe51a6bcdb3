use anyhow::Result;
use winit::window::{Window, WindowId};

use crate::compositor::ShaderChainSource;
use crate::coords::{ColorRgba, PixelSize};
use crate::device::{Gpu, GpuFrame, SurfaceErrorAction};
use crate::render::{RenderCtx, RenderTarget};
use crate::surface::SurfaceCapture;
use crate::time::FrameTime;
use crate::viewport::{MonitorSource, ViewportDevice};
use crate::window::RuntimeCtx;

use super::app::AppControl;

/// Per-window handles and immutable window metadata.
pub struct WindowCtx<'a> {
    pub id: WindowId,
    pub window: &'a Window,
}

impl<'a> WindowCtx<'a> {
    /// Client area in physical pixels.
    pub fn physical_size(&self) -> PixelSize {
        let s = self.window.inner_size();
        PixelSize::new(s.width, s.height)
    }

    pub fn scale_factor(&self) -> f64 {
        self.window.scale_factor()
    }
}

/// Per-frame context passed to `core::App::on_frame`.
///
/// Lifetimes:
/// - `'a` is the duration of the callback invocation
/// - `'w` is the window-borrow lifetime carried by `Gpu<'w>`
pub struct FrameCtx<'a, 'w> {
    pub window: WindowCtx<'a>,
    pub gpu: &'a mut Gpu<'w>,
    pub viewport: &'a mut ViewportDevice,
    pub monitors: &'a dyn MonitorSource,
    pub time: FrameTime,
    pub runtime: &'a mut RuntimeCtx,
}

impl<'a, 'w> FrameCtx<'a, 'w> {
    /// Runs one full viewport frame and presents it.
    ///
    /// Advances the viewport by this frame's `dt`, opens both surfaces,
    /// hands the primary capture (world space) to `draw_world` and the
    /// secondary capture (surface pixels) to `draw_overlay`, then composites
    /// the primary surface through `chain` onto the swapchain.
    ///
    /// Surface errors skip the frame; allocation failures end the app.
    pub fn render<S, W, O>(&mut self, chain: &S, draw_world: W, draw_overlay: O) -> AppControl
    where
        S: ShaderChainSource + ?Sized,
        W: FnOnce(&RenderCtx<'_>, &mut SurfaceCapture<'_>),
        O: FnOnce(&RenderCtx<'_>, &mut SurfaceCapture<'_>),
    {
        self.viewport.update(self.time.dt);

        let mut frame = match self.gpu.begin_frame() {
            Ok(f) => f,
            Err(err) => {
                let action = self.gpu.handle_surface_error(err);
                if action == SurfaceErrorAction::Fatal {
                    return AppControl::Exit;
                }
                return AppControl::Continue;
            }
        };

        let size = self.gpu.size();
        let rctx = RenderCtx::new(
            self.gpu.device(),
            self.gpu.queue(),
            self.gpu.surface_format(),
            self.time.elapsed,
        );

        if let Err(e) = record_frame(self.viewport, &rctx, &mut frame, size, chain, draw_world, draw_overlay) {
            log::error!("frame aborted: {e:#}");
            return AppControl::Exit;
        }

        self.window.window.pre_present_notify();
        self.gpu.submit(frame);

        AppControl::Continue
    }
}

fn record_frame<S, W, O>(
    viewport: &mut ViewportDevice,
    ctx: &RenderCtx<'_>,
    frame: &mut GpuFrame,
    size: PixelSize,
    chain: &S,
    draw_world: W,
    draw_overlay: O,
) -> Result<()>
where
    S: ShaderChainSource + ?Sized,
    W: FnOnce(&RenderCtx<'_>, &mut SurfaceCapture<'_>),
    O: FnOnce(&RenderCtx<'_>, &mut SurfaceCapture<'_>),
{
    let encoder = &mut frame.encoder;

    if !viewport.begin_frame(ctx, encoder)? {
        RenderTarget::new(encoder, &frame.view, size).clear(ColorRgba::black());
        return Ok(());
    }
    if let Some(mut capture) = viewport.primary(encoder) {
        draw_world(ctx, &mut capture);
    }
    if let Some(mut capture) = viewport.secondary(encoder) {
        draw_overlay(ctx, &mut capture);
    }
    viewport.end_frame(ctx, encoder);

    let mut target = RenderTarget::new(encoder, &frame.view, size);
    viewport.present(ctx, &mut target, chain)
}
