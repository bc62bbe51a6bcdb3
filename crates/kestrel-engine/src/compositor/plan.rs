use crate::coords::{ColorRgba, PixelSize, Rect, Vec2};
use crate::render::BlendMode;
use crate::surface::PingPongSlot;

/// Where a compositing step reads from or writes to.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum Slot {
    Source,
    BufferA,
    BufferB,
    Destination,
}

impl Slot {
    fn other_buffer(self) -> Slot {
        match self {
            Slot::BufferA => Slot::BufferB,
            _ => Slot::BufferA,
        }
    }

    /// Scratch buffer backing this slot, if any.
    pub fn scratch(self) -> Option<PingPongSlot> {
        match self {
            Slot::BufferA => Some(PingPongSlot::A),
            Slot::BufferB => Some(PingPongSlot::B),
            Slot::Source | Slot::Destination => None,
        }
    }
}

/// One draw of the compositor: `from` → `to` through chain entry `pass`
/// (`None` is a plain blit).
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct CompositeStep {
    pub from: Slot,
    pub to: Slot,
    pub pass: Option<usize>,
}

impl CompositeStep {
    const fn new(from: Slot, to: Slot, pass: Option<usize>) -> Self {
        Self { from, to, pass }
    }
}

/// Draw sequence for a chain of `n` passes.
///
/// - 0: source → destination.
/// - 1: source → destination through pass 0.
/// - 2: source → A (pass 0), A → destination (pass 1).
/// - n ≥ 3: source → A (pass 0), then each middle pass flips between A and B,
///   then the last written buffer → destination (pass n − 1).
///
/// No step reads and writes the same slot.
pub fn plan(n: usize) -> Vec<CompositeStep> {
    match n {
        0 => vec![CompositeStep::new(Slot::Source, Slot::Destination, None)],
        1 => vec![CompositeStep::new(Slot::Source, Slot::Destination, Some(0))],
        _ => {
            let mut steps = Vec::with_capacity(n);
            steps.push(CompositeStep::new(Slot::Source, Slot::BufferA, Some(0)));

            let mut current = Slot::BufferA;
            for pass in 1..n - 1 {
                let next = current.other_buffer();
                steps.push(CompositeStep::new(current, next, Some(pass)));
                current = next;
            }

            steps.push(CompositeStep::new(current, Slot::Destination, Some(n - 1)));
            steps
        }
    }
}

/// Per-call parameters that decide how a step is drawn.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct CompositeFrame {
    pub source_size: PixelSize,
    pub destination_size: PixelSize,
    pub blend: BlendMode,
    pub tint: ColorRgba,
    pub shift: Vec2,
}

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum StepInput {
    Source,
    Scratch(PingPongSlot),
}

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum StepOutput {
    Scratch(PingPongSlot),
    Destination,
}

/// A step with its views, geometry and blend state decided.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct ResolvedStep {
    pub input: StepInput,
    pub output: StepOutput,
    pub pass: Option<usize>,
    /// Pixel size of the texture written.
    pub target_size: PixelSize,
    pub rect: Rect,
    pub blend: BlendMode,
    pub tint: ColorRgba,
    pub clear: Option<ColorRgba>,
}

/// Decides how `step` is drawn.
///
/// Scratch writes cover the whole buffer at the source size, replace its
/// contents and carry no tint. The destination write fits the source into
/// the destination (centred, aspect preserved), moves it by the shift and
/// uses the frame's blend and tint. Steps that read the destination or
/// write the source resolve to `None`.
pub fn resolve_step(step: &CompositeStep, frame: &CompositeFrame) -> Option<ResolvedStep> {
    let input = match step.from {
        Slot::Source => StepInput::Source,
        Slot::Destination => return None,
        buffer => StepInput::Scratch(buffer.scratch()?),
    };

    match step.to {
        Slot::Source => None,
        Slot::Destination => Some(ResolvedStep {
            input,
            output: StepOutput::Destination,
            pass: step.pass,
            target_size: frame.destination_size,
            rect: Rect::fit_centered(frame.source_size.as_vec2(), frame.destination_size.as_vec2())
                .translated(frame.shift),
            blend: frame.blend,
            tint: frame.tint,
            clear: None,
        }),
        buffer => Some(ResolvedStep {
            input,
            output: StepOutput::Scratch(buffer.scratch()?),
            pass: step.pass,
            target_size: frame.source_size,
            rect: Rect::from_origin_size(Vec2::zero(), frame.source_size.as_vec2()),
            blend: BlendMode::Replace,
            tint: ColorRgba::white(),
            clear: Some(ColorRgba::transparent()),
        }),
    }
}
