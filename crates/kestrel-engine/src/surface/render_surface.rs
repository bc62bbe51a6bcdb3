use anyhow::{Result, bail};

use crate::camera::CameraView;
use crate::coords::{ColorRgba, PixelSize, Rect, Transform2D, Vec2};
use crate::device::ordering_violation;
use crate::render::{BlendMode, BlitJob, BlitRenderer, BlitShader, Quad, QuadRenderer, RenderCtx, RenderTarget};

use super::Flash;

struct SurfaceTexture {
    // Kept alive for the view.
    _texture: wgpu::Texture,
    view: wgpu::TextureView,
    size: PixelSize,
    format: wgpu::TextureFormat,
}

#[derive(Debug, Copy, Clone)]
struct CaptureMode {
    transform: Transform2D,
    camera: bool,
}

/// Handle for drawing into a surface between `begin_capture` and `end_capture`.
pub struct SurfaceCapture<'a> {
    pub target: RenderTarget<'a>,
    /// World → surface pixels when a camera is bound, identity otherwise.
    pub transform: Transform2D,
}

/// Off-screen color buffer of fixed pixel dimensions.
///
/// The GPU texture is created on first capture and recreated whole whenever
/// the recorded size or the target format changes.
pub struct RenderSurface {
    label: String,
    size: PixelSize,
    background: ColorRgba,
    tint: ColorRgba,
    blend: BlendMode,
    flashes: Vec<Flash>,
    capture: Option<CaptureMode>,
    target: Option<SurfaceTexture>,
}

impl RenderSurface {
    /// Creates a surface; each axis is kept at least one pixel wide.
    pub fn new(label: impl Into<String>, size: PixelSize) -> Self {
        Self {
            label: label.into(),
            size: PixelSize::new(size.width.max(1), size.height.max(1)),
            background: ColorRgba::transparent(),
            tint: ColorRgba::white(),
            blend: BlendMode::Alpha,
            flashes: Vec::new(),
            capture: None,
            target: None,
        }
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn size(&self) -> PixelSize {
        self.size
    }

    pub fn background(&self) -> ColorRgba {
        self.background
    }

    pub fn set_background(&mut self, color: ColorRgba) {
        self.background = color;
    }

    pub fn tint(&self) -> ColorRgba {
        self.tint
    }

    pub fn set_tint(&mut self, color: ColorRgba) {
        self.tint = color;
    }

    pub fn blend(&self) -> BlendMode {
        self.blend
    }

    pub fn set_blend(&mut self, blend: BlendMode) {
        self.blend = blend;
    }

    pub fn is_capturing(&self) -> bool {
        self.capture.is_some()
    }

    /// Texture view of the last completed capture, if the buffer exists.
    pub fn view(&self) -> Option<&wgpu::TextureView> {
        self.target.as_ref().map(|t| &t.view)
    }

    // ── flashes ───────────────────────────────────────────────────────────

    /// Starts a flash; non-positive durations are ignored.
    pub fn flash(&mut self, duration: f32, start: ColorRgba, end: ColorRgba) {
        if let Some(f) = Flash::new(duration, start, end) {
            self.flashes.push(f);
        }
    }

    pub fn active_flashes(&self) -> &[Flash] {
        &self.flashes
    }

    pub fn clear_flashes(&mut self) {
        self.flashes.clear();
    }

    /// Advances flashes and drops finished ones.
    pub fn update(&mut self, dt: f32) {
        self.flashes.retain_mut(|f| f.advance(dt));
    }

    // ── size ──────────────────────────────────────────────────────────────

    /// Records a new size; the buffer is rebuilt on next capture.
    ///
    /// Zero-area sizes are ignored. Returns whether the size changed, in
    /// which case any camera bound to this surface must be notified.
    pub fn resize(&mut self, size: PixelSize) -> bool {
        if self.is_capturing() {
            ordering_violation("resize during an open capture");
            return false;
        }
        if size.is_empty() || size == self.size {
            return false;
        }

        log::debug!(
            "surface '{}' resized {}x{} -> {}x{}",
            self.label,
            self.size.width,
            self.size.height,
            size.width,
            size.height
        );
        self.size = size;
        self.target = None;
        true
    }

    /// Makes sure the GPU buffer matches the recorded size and format.
    pub fn ensure_target(&mut self, ctx: &RenderCtx<'_>) -> Result<()> {
        let format = ctx.surface_format;
        if self
            .target
            .as_ref()
            .is_some_and(|t| t.size == self.size && t.format == format)
        {
            return Ok(());
        }

        let max = ctx.max_texture_dimension();
        if self.size.width > max || self.size.height > max {
            bail!(
                "failed to allocate render surface '{}' ({}x{}): device limit is {max}",
                self.label,
                self.size.width,
                self.size.height
            );
        }

        self.target = None;
        let texture = ctx.device.create_texture(&wgpu::TextureDescriptor {
            label: Some(&self.label),
            size: wgpu::Extent3d {
                width: self.size.width,
                height: self.size.height,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::TEXTURE_BINDING,
            view_formats: &[],
        });
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());

        self.target = Some(SurfaceTexture {
            _texture: texture,
            view,
            size: self.size,
            format,
        });
        Ok(())
    }

    // ── capture ───────────────────────────────────────────────────────────

    /// Opens a capture: clears to the background and records the transform
    /// subsequent draws use.
    ///
    /// Returns `Ok(false)` when a capture is already open (contract violation).
    pub fn begin_capture(
        &mut self,
        ctx: &RenderCtx<'_>,
        encoder: &mut wgpu::CommandEncoder,
        camera: Option<&dyn CameraView>,
    ) -> Result<bool> {
        if self.is_capturing() {
            ordering_violation("begin_capture while already capturing");
            return Ok(false);
        }
        self.ensure_target(ctx)?;
        let Some(target) = self.target.as_ref() else {
            return Ok(false);
        };

        RenderTarget::new(encoder, &target.view, target.size).clear(self.background);

        self.capture = Some(match camera {
            Some(cam) => CaptureMode {
                transform: cam.world_transform().to_transform(),
                camera: true,
            },
            None => CaptureMode {
                transform: Transform2D::identity(),
                camera: false,
            },
        });
        Ok(true)
    }

    /// Draw handle for the open capture; `None` outside a capture.
    pub fn capture<'a>(&'a self, encoder: &'a mut wgpu::CommandEncoder) -> Option<SurfaceCapture<'a>> {
        let mode = self.capture?;
        let target = self.target.as_ref()?;
        Some(SurfaceCapture {
            target: RenderTarget::new(encoder, &target.view, target.size),
            transform: mode.transform,
        })
    }

    /// Draws active flashes over the whole surface, then closes the capture.
    ///
    /// Returns `false` when no capture was open (contract violation).
    pub fn end_capture(
        &mut self,
        ctx: &RenderCtx<'_>,
        encoder: &mut wgpu::CommandEncoder,
        quads: &mut QuadRenderer,
    ) -> bool {
        let Some(mode) = self.capture.take() else {
            ordering_violation("end_capture without begin_capture");
            return false;
        };

        if self.flashes.is_empty() {
            return true;
        }
        let Some(target) = self.target.as_ref() else {
            return true;
        };

        let (transform, overlay) = flash_quads(&self.flashes, self.size, mode);
        let mut rt = RenderTarget::new(encoder, &target.view, target.size);
        quads.draw(ctx, &mut rt, &transform, &overlay, BlendMode::Alpha);
        true
    }

    /// Closes an open capture without drawing flashes. Returns whether a
    /// capture was open.
    pub fn abort_capture(&mut self) -> bool {
        self.capture.take().is_some()
    }

    #[cfg(test)]
    pub(crate) fn open_capture_without_gpu(&mut self) {
        self.capture = Some(CaptureMode {
            transform: Transform2D::identity(),
            camera: false,
        });
    }

    // ── presentation ──────────────────────────────────────────────────────

    /// Blits this surface onto `target`, scaled to fit, centred and with
    /// aspect preserved, tinted by the surface tint.
    ///
    /// `shift` moves the result in target pixels (pixel-smoothing residual).
    /// Zero-area targets and surfaces without a buffer draw nothing.
    pub fn draw_to(
        &self,
        ctx: &RenderCtx<'_>,
        blitter: &mut BlitRenderer,
        target: &mut RenderTarget<'_>,
        blend: BlendMode,
        shift: Vec2,
    ) {
        if self.is_capturing() {
            ordering_violation("draw_to while capturing");
            return;
        }
        if target.size.is_empty() {
            return;
        }
        let Some(source) = self.view() else {
            return;
        };

        let rect = self.fitted_rect(target.size).translated(shift);
        blitter.blit(
            ctx,
            target,
            &BlitJob {
                source,
                rect,
                shader: BlitShader::IDENTITY,
                blend,
                tint: self.tint,
                clear: None,
            },
        );
    }

    /// Where this surface lands inside a target of `target_size`.
    #[inline]
    pub fn fitted_rect(&self, target_size: PixelSize) -> Rect {
        Rect::fit_centered(self.size.as_vec2(), target_size.as_vec2())
    }
}

/// Full-surface flash quads plus the transform to draw them with.
///
/// With a camera bound the quads are expressed in world space (the surface
/// corners pulled back through the inverse transform), so they still cover
/// the whole surface under rotation and zoom.
fn flash_quads(flashes: &[Flash], size: PixelSize, mode: CaptureMode) -> (Transform2D, Vec<Quad>) {
    let screen = Rect::from_origin_size(Vec2::zero(), size.as_vec2()).corners();

    let (transform, corners) = match mode.transform.inverse() {
        Some(inv) if mode.camera => (mode.transform, screen.map(|c| inv.apply(c))),
        _ => (Transform2D::identity(), screen),
    };

    let quads = flashes.iter().map(|f| Quad::new(corners, f.color())).collect();
    (transform, quads)
}
