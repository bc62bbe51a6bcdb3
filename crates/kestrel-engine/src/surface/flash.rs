use crate::coords::ColorRgba;

/// Time-bounded full-surface color overlay, interpolating `start` → `end`.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Flash {
    pub start: ColorRgba,
    pub end: ColorRgba,
    pub duration: f32,
    pub elapsed: f32,
}

impl Flash {
    /// Returns `None` for non-positive or non-finite durations.
    pub fn new(duration: f32, start: ColorRgba, end: ColorRgba) -> Option<Self> {
        if !(duration.is_finite() && duration > 0.0) {
            return None;
        }
        Some(Self {
            start,
            end,
            duration,
            elapsed: 0.0,
        })
    }

    /// Fraction of the duration elapsed, in `[0, 1]`.
    #[inline]
    pub fn progress(&self) -> f32 {
        (self.elapsed / self.duration).clamp(0.0, 1.0)
    }

    #[inline]
    pub fn color(&self) -> ColorRgba {
        self.start.lerp(self.end, self.progress())
    }

    /// Advances by `dt`; returns whether the flash is still running.
    pub fn advance(&mut self, dt: f32) -> bool {
        if dt.is_finite() && dt > 0.0 {
            self.elapsed = (self.elapsed + dt).min(self.duration);
        }
        self.elapsed < self.duration
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn red() -> ColorRgba {
        ColorRgba::new(1.0, 0.0, 0.0, 1.0)
    }

    #[test]
    fn zero_or_negative_duration_is_rejected() {
        assert!(Flash::new(0.0, red(), ColorRgba::transparent()).is_none());
        assert!(Flash::new(-1.0, red(), ColorRgba::transparent()).is_none());
        assert!(Flash::new(f32::NAN, red(), ColorRgba::transparent()).is_none());
    }

    #[test]
    fn color_interpolates_over_duration() {
        let mut f = Flash::new(1.0, red(), red().with_alpha(0.0)).unwrap();
        assert_eq!(f.color(), red());
        assert!(f.advance(0.5));
        assert!((f.color().a - 0.5).abs() < 1e-6);
    }

    #[test]
    fn finishes_at_duration() {
        let mut f = Flash::new(0.3, red(), ColorRgba::transparent()).unwrap();
        assert!(f.advance(0.1));
        assert!(f.advance(0.1));
        assert!(!f.advance(0.2));
        assert_eq!(f.progress(), 1.0);
        assert_eq!(f.color(), ColorRgba::transparent());
    }
}
