use super::Vec2;

/// Axis-aligned rectangle (top-left origin, +Y down).
#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub struct Rect {
    pub origin: Vec2,
    pub size: Vec2,
}

impl Rect {
    #[inline]
    pub const fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self {
            origin: Vec2::new(x, y),
            size: Vec2::new(w, h),
        }
    }

    #[inline]
    pub const fn from_origin_size(origin: Vec2, size: Vec2) -> Self {
        Self { origin, size }
    }

    #[inline]
    pub fn max(self) -> Vec2 {
        self.origin + self.size
    }

    #[inline]
    pub fn is_empty(self) -> bool {
        self.size.x <= 0.0 || self.size.y <= 0.0
    }

    #[inline]
    pub fn translated(self, by: Vec2) -> Rect {
        Rect::from_origin_size(self.origin + by, self.size)
    }

    /// Corners in winding order: top-left, top-right, bottom-right, bottom-left.
    #[inline]
    pub fn corners(self) -> [Vec2; 4] {
        let min = self.origin;
        let max = self.max();
        [
            min,
            Vec2::new(max.x, min.y),
            max,
            Vec2::new(min.x, max.y),
        ]
    }

    /// Largest rectangle with the aspect ratio of `content` that fits inside
    /// a container of size `container`, centred.
    ///
    /// Returns an empty rect at the container centre if either input has no area.
    pub fn fit_centered(content: Vec2, container: Vec2) -> Rect {
        if content.x <= 0.0 || content.y <= 0.0 || container.x <= 0.0 || container.y <= 0.0 {
            return Rect::from_origin_size(container * 0.5, Vec2::zero());
        }

        let scale = (container.x / content.x).min(container.y / content.y);
        let size = content * scale;
        Rect::from_origin_size((container - size) * 0.5, size)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // ── fit_centered ──────────────────────────────────────────────────────

    #[test]
    fn fit_same_aspect_fills_container() {
        let r = Rect::fit_centered(Vec2::new(320.0, 180.0), Vec2::new(1920.0, 1080.0));
        assert_eq!(r, Rect::new(0.0, 0.0, 1920.0, 1080.0));
    }

    #[test]
    fn fit_wider_container_pillarboxes() {
        let r = Rect::fit_centered(Vec2::new(100.0, 100.0), Vec2::new(300.0, 100.0));
        assert_eq!(r, Rect::new(100.0, 0.0, 100.0, 100.0));
    }

    #[test]
    fn fit_taller_container_letterboxes() {
        let r = Rect::fit_centered(Vec2::new(200.0, 100.0), Vec2::new(200.0, 300.0));
        assert_eq!(r, Rect::new(0.0, 100.0, 200.0, 100.0));
    }

    #[test]
    fn fit_zero_container_is_empty() {
        let r = Rect::fit_centered(Vec2::new(200.0, 100.0), Vec2::new(0.0, 300.0));
        assert!(r.is_empty());
    }

    // ── corners ───────────────────────────────────────────────────────────

    #[test]
    fn corners_wind_clockwise_on_screen() {
        let c = Rect::new(1.0, 2.0, 3.0, 4.0).corners();
        assert_eq!(c[0], Vec2::new(1.0, 2.0));
        assert_eq!(c[1], Vec2::new(4.0, 2.0));
        assert_eq!(c[2], Vec2::new(4.0, 6.0));
        assert_eq!(c[3], Vec2::new(1.0, 6.0));
    }
}
