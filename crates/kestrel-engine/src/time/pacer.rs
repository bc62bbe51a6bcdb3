use std::time::{Duration, Instant};

/// Turns a frame-rate target into redraw deadlines.
///
/// With no target every frame is due immediately. Falling behind never
/// produces a burst of catch-up frames: the next deadline is rebased on the
/// late frame.
#[derive(Debug, Clone, Default)]
pub struct FramePacer {
    interval: Option<Duration>,
    next: Option<Instant>,
}

impl FramePacer {
    pub fn new(target_fps: Option<f32>) -> Self {
        let mut pacer = Self::default();
        pacer.set_target(target_fps);
        pacer
    }

    /// Sets the target; non-finite, non-positive or vanishingly small rates
    /// disable pacing.
    pub fn set_target(&mut self, target_fps: Option<f32>) {
        let interval = target_fps
            .filter(|f| f.is_finite() && *f > 0.0)
            .and_then(|f| Duration::try_from_secs_f64(1.0 / f as f64).ok());
        if interval != self.interval {
            log::debug!("frame pacing -> {target_fps:?} fps");
            self.interval = interval;
            self.next = None;
        }
    }

    pub fn interval(&self) -> Option<Duration> {
        self.interval
    }

    /// When the next frame is due; `None` while unpaced or before the first frame.
    pub fn next_deadline(&self) -> Option<Instant> {
        self.interval.and(self.next)
    }

    pub fn should_render(&self, now: Instant) -> bool {
        self.next_deadline().is_none_or(|deadline| now >= deadline)
    }

    /// Records that a frame was rendered at `now`.
    pub fn mark_rendered(&mut self, now: Instant) {
        let Some(interval) = self.interval else {
            self.next = None;
            return;
        };
        let next = match self.next {
            Some(prev) if prev + interval > now => prev + interval,
            _ => now + interval,
        };
        self.next = Some(next);
    }
}
