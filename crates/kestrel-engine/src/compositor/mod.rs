//! Shader-chain compositing.
//!
//! Applies an ordered list of full-surface passes to a source surface and
//! writes the result onto a destination, bouncing intermediate results
//! between two scratch buffers. [`plan`] is the pure step sequence and
//! [`resolve_step`] decides how each step is drawn; the compositor executes
//! the result on the GPU.

mod pass;
mod plan;

use anyhow::Result;

use crate::coords::Vec2;
use crate::render::{BlendMode, BlitJob, BlitRenderer, BlitShader, RenderCtx, RenderTarget};
use crate::surface::{PingPongBufferPair, RenderSurface};

pub use pass::{ShaderChainSource, ShaderPass, ShaderPassId};
pub use plan::{
    CompositeFrame, CompositeStep, ResolvedStep, Slot, StepInput, StepOutput, plan, resolve_step,
};

/// Runs shader chains and owns the scratch buffers and blit pipelines.
#[derive(Default)]
pub struct ShaderChainCompositor {
    blitter: BlitRenderer,
    ping_pong: Option<PingPongBufferPair>,
    last_plan: Vec<CompositeStep>,
}

impl ShaderChainCompositor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Steps executed by the most recent [`composite`](Self::composite).
    pub fn last_plan(&self) -> &[CompositeStep] {
        &self.last_plan
    }

    /// Blitter shared with unshaded presentation.
    pub fn blitter_mut(&mut self) -> &mut BlitRenderer {
        &mut self.blitter
    }

    /// Resolves the steps for a chain of `chain_len` passes and records them
    /// as the last plan.
    pub fn resolve_plan(&mut self, chain_len: usize, frame: &CompositeFrame) -> Vec<ResolvedStep> {
        self.last_plan = plan(chain_len);
        self.last_plan
            .iter()
            .filter_map(|step| {
                let resolved = resolve_step(step, frame);
                if resolved.is_none() {
                    log::warn!("composite step {step:?} is not drawable; skipping");
                }
                resolved
            })
            .collect()
    }

    /// Draws `source` through `chain` onto `destination`.
    ///
    /// Intermediate steps render at the source size and replace the scratch
    /// buffer. The final step fits the image into the destination (centred,
    /// aspect preserved), moves it by `shift` and blends it with `blend`
    /// using the source tint.
    ///
    /// A source that was never captured draws nothing.
    pub fn composite(
        &mut self,
        ctx: &RenderCtx<'_>,
        source: &RenderSurface,
        chain: &[ShaderPass],
        destination: &mut RenderTarget<'_>,
        blend: BlendMode,
        shift: Vec2,
    ) -> Result<()> {
        let frame = CompositeFrame {
            source_size: source.size(),
            destination_size: destination.size,
            blend,
            tint: source.tint(),
            shift,
        };
        let steps = self.resolve_plan(chain.len(), &frame);
        if destination.size.is_empty() {
            return Ok(());
        }
        let Some(source_view) = source.view() else {
            log::debug!("composite skipped: surface '{}' has no buffer", source.label());
            return Ok(());
        };

        if chain.len() >= 2 {
            self.ping_pong
                .get_or_insert_with(|| PingPongBufferPair::new(frame.source_size))
                .ensure(ctx, frame.source_size)?;
        }

        for step in &steps {
            let shader = step
                .pass
                .and_then(|i| chain.get(i))
                .map_or(BlitShader::IDENTITY, ShaderPass::blit_shader);

            let from = match step.input {
                StepInput::Source => Some(source_view),
                StepInput::Scratch(slot) => self.ping_pong.as_ref().and_then(|p| p.view(slot)),
            };
            let Some(from) = from else {
                log::warn!("composite step {step:?} has no readable input; skipping");
                continue;
            };
            let job = BlitJob {
                source: from,
                rect: step.rect,
                shader,
                blend: step.blend,
                tint: step.tint,
                clear: step.clear,
            };

            match step.output {
                StepOutput::Destination => self.blitter.blit(ctx, destination, &job),
                StepOutput::Scratch(slot) => {
                    let Some(to) = self.ping_pong.as_ref().and_then(|p| p.view(slot)) else {
                        continue;
                    };
                    let mut target = RenderTarget::new(&mut *destination.encoder, to, step.target_size);
                    self.blitter.blit(ctx, &mut target, &job);
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coords::{ColorRgba, PixelSize};
    use crate::surface::PingPongSlot;

    fn frame() -> CompositeFrame {
        CompositeFrame {
            source_size: PixelSize::new(64, 32),
            destination_size: PixelSize::new(128, 64),
            blend: BlendMode::Alpha,
            tint: ColorRgba::white(),
            shift: Vec2::zero(),
        }
    }

    // ── last plan ─────────────────────────────────────────────────────────

    #[test]
    fn fresh_compositor_has_no_plan() {
        assert!(ShaderChainCompositor::new().last_plan().is_empty());
    }

    #[test]
    fn resolving_records_the_plan() {
        let mut c = ShaderChainCompositor::new();
        for n in 0..=6 {
            let steps = c.resolve_plan(n, &frame());
            assert_eq!(c.last_plan(), plan(n).as_slice(), "n = {n}");
            assert_eq!(steps.len(), c.last_plan().len());
        }
    }

    #[test]
    fn shrinking_chain_replaces_previous_plan() {
        let mut c = ShaderChainCompositor::new();
        c.resolve_plan(5, &frame());
        let steps = c.resolve_plan(1, &frame());
        assert_eq!(c.last_plan().len(), 1);
        assert!(steps.iter().all(|s| !matches!(s.input, StepInput::Scratch(PingPongSlot::B))));
    }
}
