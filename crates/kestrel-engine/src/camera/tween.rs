use std::collections::VecDeque;

use crate::coords::Vec2;

use super::transform::clamp_zoom;

/// Easing curve mapping normalized time to normalized progress.
///
/// Curve evaluation lives with the caller; [`linear`] is the fallback.
pub type Easing = fn(f32) -> f32;

pub fn linear(t: f32) -> f32 {
    t
}

/// One queued camera move: translate to `offset` and scale to `zoom` over `duration`.
#[derive(Debug, Copy, Clone)]
pub struct CameraTween {
    pub offset: Vec2,
    pub zoom: f32,
    pub duration: f32,
    pub ease: Easing,
}

impl CameraTween {
    pub fn new(offset: Vec2, zoom: f32, duration: f32) -> Self {
        Self { offset, zoom, duration, ease: linear }
    }

    pub fn with_ease(mut self, ease: Easing) -> Self {
        self.ease = ease;
        self
    }
}

/// Tweens run one after another; the settled value of each persists.
#[derive(Debug, Clone)]
pub struct TweenQueue {
    queue: VecDeque<CameraTween>,
    from_offset: Vec2,
    from_zoom: f32,
    elapsed: f32,
    offset: Vec2,
    zoom: f32,
}

impl Default for TweenQueue {
    fn default() -> Self {
        Self {
            queue: VecDeque::new(),
            from_offset: Vec2::zero(),
            from_zoom: 1.0,
            elapsed: 0.0,
            offset: Vec2::zero(),
            zoom: 1.0,
        }
    }
}

impl TweenQueue {
    pub fn push(&mut self, mut tween: CameraTween) {
        tween.zoom = clamp_zoom(tween.zoom);
        if !tween.duration.is_finite() {
            tween.duration = 0.0;
        }
        if self.queue.is_empty() {
            self.from_offset = self.offset;
            self.from_zoom = self.zoom;
            self.elapsed = 0.0;
        }
        self.queue.push_back(tween);
    }

    /// Drops queued tweens and returns to the neutral offset and zoom.
    pub fn clear(&mut self) {
        *self = Self::default();
    }

    pub fn is_active(&self) -> bool {
        !self.queue.is_empty()
    }

    pub fn offset(&self) -> Vec2 {
        self.offset
    }

    pub fn zoom(&self) -> f32 {
        self.zoom
    }

    pub fn advance(&mut self, dt: f32) {
        let mut dt = dt.max(0.0);

        while let Some(front) = self.queue.front().copied() {
            let left = front.duration - self.elapsed;
            if left > dt {
                self.elapsed += dt;
                let t = (front.ease)((self.elapsed / front.duration).clamp(0.0, 1.0));
                self.offset = self.from_offset.lerp(front.offset, t);
                self.zoom = clamp_zoom(self.from_zoom + (front.zoom - self.from_zoom) * t);
                return;
            }

            // Settle and carry leftover time into the next tween.
            dt -= left.max(0.0);
            self.offset = front.offset;
            self.zoom = front.zoom;
            self.from_offset = front.offset;
            self.from_zoom = front.zoom;
            self.elapsed = 0.0;
            self.queue.pop_front();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_tween_interpolates_then_settles() {
        let mut q = TweenQueue::default();
        q.push(CameraTween::new(Vec2::new(100.0, 0.0), 2.0, 1.0));

        q.advance(0.5);
        assert!((q.offset().x - 50.0).abs() < 1e-4);
        assert!((q.zoom() - 1.5).abs() < 1e-4);

        q.advance(0.75);
        assert_eq!(q.offset(), Vec2::new(100.0, 0.0));
        assert_eq!(q.zoom(), 2.0);
        assert!(!q.is_active());
    }

    #[test]
    fn leftover_time_flows_into_next_tween() {
        let mut q = TweenQueue::default();
        q.push(CameraTween::new(Vec2::new(10.0, 0.0), 1.0, 0.5));
        q.push(CameraTween::new(Vec2::new(10.0, 20.0), 1.0, 1.0));

        q.advance(1.0);
        assert!((q.offset().x - 10.0).abs() < 1e-4);
        assert!((q.offset().y - 10.0).abs() < 1e-4);
        assert!(q.is_active());
    }

    #[test]
    fn zero_duration_settles_immediately() {
        let mut q = TweenQueue::default();
        q.push(CameraTween::new(Vec2::new(5.0, 5.0), 1.0, 0.0));
        q.advance(0.0);
        assert_eq!(q.offset(), Vec2::new(5.0, 5.0));
    }

    #[test]
    fn custom_ease_is_applied() {
        fn snap_late(t: f32) -> f32 {
            if t < 1.0 { 0.0 } else { 1.0 }
        }
        let mut q = TweenQueue::default();
        q.push(CameraTween::new(Vec2::new(8.0, 0.0), 1.0, 1.0).with_ease(snap_late));
        q.advance(0.9);
        assert_eq!(q.offset(), Vec2::zero());
    }

    #[test]
    fn clear_resets_to_neutral() {
        let mut q = TweenQueue::default();
        q.push(CameraTween::new(Vec2::new(8.0, 0.0), 3.0, 0.0));
        q.advance(0.1);
        q.clear();
        assert_eq!(q.offset(), Vec2::zero());
        assert_eq!(q.zoom(), 1.0);
    }
}
