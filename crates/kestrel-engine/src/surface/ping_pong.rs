use anyhow::Result;

use crate::coords::{ColorRgba, PixelSize};
use crate::render::{BlendMode, RenderCtx};

use super::RenderSurface;

/// One of the two scratch buffers.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum PingPongSlot {
    A,
    B,
}

/// Two same-sized scratch surfaces for multi-pass compositing.
///
/// Sized to the composited source, not to the display. Buffers are reused
/// across frames and only rebuilt when the source size changes.
pub struct PingPongBufferPair {
    a: RenderSurface,
    b: RenderSurface,
}

impl PingPongBufferPair {
    pub fn new(size: PixelSize) -> Self {
        let scratch = |label: &str| {
            let mut s = RenderSurface::new(label, size);
            s.set_background(ColorRgba::transparent());
            s.set_blend(BlendMode::Replace);
            s
        };
        Self {
            a: scratch("kestrel ping-pong A"),
            b: scratch("kestrel ping-pong B"),
        }
    }

    pub fn size(&self) -> PixelSize {
        self.a.size()
    }

    /// Matches both buffers to `size` and allocates them if needed.
    pub fn ensure(&mut self, ctx: &RenderCtx<'_>, size: PixelSize) -> Result<()> {
        if self.a.resize(size) | self.b.resize(size) {
            log::debug!("ping-pong buffers now {}x{}", size.width, size.height);
        }
        self.a.ensure_target(ctx)?;
        self.b.ensure_target(ctx)
    }

    pub fn surface(&self, slot: PingPongSlot) -> &RenderSurface {
        match slot {
            PingPongSlot::A => &self.a,
            PingPongSlot::B => &self.b,
        }
    }

    pub fn view(&self, slot: PingPongSlot) -> Option<&wgpu::TextureView> {
        self.surface(slot).view()
    }
}
