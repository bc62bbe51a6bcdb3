use crate::coords::{Transform2D, Vec2};

/// Smallest zoom any camera will apply.
pub const MIN_ZOOM: f32 = 1e-3;

/// Clamps a requested zoom into the valid range.
///
/// Non-finite values fall back to `1.0`; everything else is kept at or above
/// [`MIN_ZOOM`].
#[inline]
pub fn clamp_zoom(zoom: f32) -> f32 {
    if zoom.is_finite() { zoom.max(MIN_ZOOM) } else { 1.0 }
}

/// Resolved camera parameters for one frame.
///
/// Mapping from world to surface pixels:
///
/// `screen = R(rotation) · ((p − target) · zoom − pivot) + offset`
///
/// `target` is the world point drawn at the surface origin when rotation is
/// zero, `pivot` is the half-surface extent rotation turns around, and
/// `offset` is `pivot` plus every runtime translation (shake, tween, user).
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct CameraTransform {
    pub target: Vec2,
    pub zoom: f32,
    pub rotation: f32,
    pub pivot: Vec2,
    pub offset: Vec2,
}

impl Default for CameraTransform {
    fn default() -> Self {
        Self {
            target: Vec2::zero(),
            zoom: 1.0,
            rotation: 0.0,
            pivot: Vec2::zero(),
            offset: Vec2::zero(),
        }
    }
}

/// Sub-pixel remainder split off a camera transform by pixel smoothing.
#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub struct ScreenShift {
    /// Residual in primary-surface pixels.
    pub surface: Vec2,
    /// The same residual in physical window pixels.
    pub window: Vec2,
}

impl CameraTransform {
    /// Affine form of the mapping (world → surface pixels).
    pub fn to_transform(&self) -> Transform2D {
        let z = clamp_zoom(self.zoom) as f64;
        let mut t = Transform2D::scale_rotate(z, self.rotation as f64);

        // R · (−target·zoom − pivot) + offset
        let (rx, ry) = t.apply_f64(-(self.target.x as f64), -(self.target.y as f64));
        let (sin, cos) = (self.rotation as f64).sin_cos();
        let (px, py) = (self.pivot.x as f64, self.pivot.y as f64);
        t.tx = rx - (cos * px - sin * py) + self.offset.x as f64;
        t.ty = ry - (sin * px + cos * py) + self.offset.y as f64;
        t
    }

    pub fn world_to_screen(&self, p: Vec2) -> Vec2 {
        let z = clamp_zoom(self.zoom) as f64;
        let x = (p.x as f64 - self.target.x as f64) * z - self.pivot.x as f64;
        let y = (p.y as f64 - self.target.y as f64) * z - self.pivot.y as f64;
        let (sin, cos) = (self.rotation as f64).sin_cos();
        Vec2::new(
            (cos * x - sin * y + self.offset.x as f64) as f32,
            (sin * x + cos * y + self.offset.y as f64) as f32,
        )
    }

    pub fn screen_to_world(&self, p: Vec2) -> Vec2 {
        let z = clamp_zoom(self.zoom) as f64;
        let x = p.x as f64 - self.offset.x as f64;
        let y = p.y as f64 - self.offset.y as f64;
        let (sin, cos) = (self.rotation as f64).sin_cos();
        let ux = cos * x + sin * y + self.pivot.x as f64;
        let uy = -sin * x + cos * y + self.pivot.y as f64;
        Vec2::new(
            (self.target.x as f64 + ux / z) as f32,
            (self.target.y as f64 + uy / z) as f32,
        )
    }

    /// Splits into an integer-aligned world transform and the constant
    /// screen-space residual.
    ///
    /// `window_ratio` is physical window width over primary surface width.
    /// Ratios that are non-finite or not positive disable the split.
    ///
    /// The target snaps to whole world units, so at zoom `z` the residual
    /// per axis lies in `(-z, 1)` surface pixels rather than below one pixel.
    pub fn split_for_smoothing(&self, window_ratio: f32) -> (CameraTransform, ScreenShift) {
        if !window_ratio.is_finite() || window_ratio <= 0.0 {
            return (*self, ScreenShift::default());
        }

        let snapped = CameraTransform {
            target: self.target.floor(),
            offset: self.offset.floor(),
            ..*self
        };

        // Both transforms share the linear part, so the residual is the
        // difference of their translations.
        let raw = self.to_transform();
        let world = snapped.to_transform();
        let surface = Vec2::new((raw.tx - world.tx) as f32, (raw.ty - world.ty) as f32);

        (
            snapped,
            ScreenShift {
                surface,
                window: surface * window_ratio,
            },
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_close(a: Vec2, b: Vec2, tol: f32) {
        assert!(
            (a.x - b.x).abs() <= tol && (a.y - b.y).abs() <= tol,
            "{a:?} != {b:?} (tol {tol})"
        );
    }

    fn camera(target: Vec2, zoom: f32, rotation: f32) -> CameraTransform {
        let pivot = Vec2::new(160.0, 90.0);
        CameraTransform { target, zoom, rotation, pivot, offset: pivot }
    }

    // ── conversion ────────────────────────────────────────────────────────

    #[test]
    fn zoom_two_doubles_distance_from_target() {
        let pivot = Vec2::new(960.0, 540.0);
        let t = CameraTransform { zoom: 2.0, pivot, offset: pivot, ..Default::default() };
        assert_close(t.world_to_screen(Vec2::new(100.0, 0.0)), Vec2::new(200.0, 0.0), 1e-4);
        assert_close(t.screen_to_world(Vec2::new(200.0, 0.0)), Vec2::new(100.0, 0.0), 1e-4);
    }

    #[test]
    fn round_trip_across_zoom_and_rotation() {
        let zooms = [0.5, 1.0, 1.5, 2.0, 3.0];
        let rotations = [0.0, 0.3, -1.2, core::f32::consts::PI, 2.5];
        let points = [
            Vec2::new(0.0, 0.0),
            Vec2::new(200.0, -150.0),
            Vec2::new(-173.25, 61.5),
            Vec2::new(12.125, 199.0),
        ];
        for &z in &zooms {
            for &r in &rotations {
                let t = camera(Vec2::new(-37.5, 12.0), z, r);
                for &p in &points {
                    assert_close(t.screen_to_world(t.world_to_screen(p)), p, 1e-4);
                }
            }
        }
    }

    #[test]
    fn affine_form_matches_direct_mapping() {
        let t = camera(Vec2::new(10.0, -20.0), 1.75, 0.4);
        let m = t.to_transform();
        for p in [Vec2::new(0.0, 0.0), Vec2::new(55.0, -3.0), Vec2::new(-80.0, 120.0)] {
            assert_close(m.apply(p), t.world_to_screen(p), 1e-3);
        }
    }

    #[test]
    fn rotation_pivots_around_surface_centre() {
        let t = camera(Vec2::zero(), 1.0, 1.0);
        // World point drawn at the pivot is unaffected by rotation.
        assert_close(t.world_to_screen(Vec2::new(160.0, 90.0)), Vec2::new(160.0, 90.0), 1e-4);
    }

    #[test]
    fn zero_zoom_is_clamped() {
        let t = camera(Vec2::zero(), 0.0, 0.0);
        let p = Vec2::new(1.0, 1.0);
        assert!(t.world_to_screen(p).is_finite());
        assert!(t.screen_to_world(p).is_finite());
    }

    // ── pixel smoothing ───────────────────────────────────────────────────

    fn assert_recombines(t: &CameraTransform, ratio: f32) {
        let (world, shift) = t.split_for_smoothing(ratio);
        for p in [Vec2::new(0.0, 0.0), Vec2::new(31.7, -8.2), Vec2::new(-140.0, 95.5)] {
            let raw = t.world_to_screen(p);
            let via_surface = world.world_to_screen(p) + shift.surface;
            let via_window = world.world_to_screen(p) + shift.window / ratio;
            assert_close(via_surface, raw, 1e-3);
            assert_close(via_window, raw, 1e-3);
        }
    }

    #[test]
    fn smoothing_recombines_at_half_ratio() {
        assert_recombines(&camera(Vec2::new(10.37, -4.81), 1.0, 0.0), 0.5);
    }

    #[test]
    fn smoothing_recombines_at_unit_ratio() {
        assert_recombines(&camera(Vec2::new(10.37, -4.81), 2.0, 0.25), 1.0);
    }

    #[test]
    fn smoothing_recombines_at_double_ratio() {
        assert_recombines(&camera(Vec2::new(-3.5, 7.125), 1.5, -0.6), 2.0);
    }

    #[test]
    fn smoothing_world_target_is_integral() {
        let (world, _) = camera(Vec2::new(10.37, -4.81), 1.0, 0.0).split_for_smoothing(1.0);
        assert_eq!(world.target, Vec2::new(10.0, -5.0));
        assert_eq!(world.offset, world.offset.floor());
    }

    #[test]
    fn smoothing_residual_is_sub_pixel_at_unit_zoom() {
        let (_, shift) = camera(Vec2::new(10.37, -4.81), 1.0, 0.0).split_for_smoothing(2.0);
        assert!(shift.surface.x.abs() < 1.0 && shift.surface.y.abs() < 1.0);
        assert_close(shift.window, shift.surface * 2.0, 1e-6);
    }

    #[test]
    fn smoothing_residual_scales_with_zoom() {
        let t = camera(Vec2::new(10.9, -4.1), 2.0, 0.0);
        let (world, shift) = t.split_for_smoothing(1.0);

        // 0.9 world units of snapped target are 1.8 surface pixels at zoom 2.
        assert_close(shift.surface, Vec2::new(-1.8, -1.8), 1e-4);
        assert!(shift.surface.x > -2.0 && shift.surface.y > -2.0);

        let p = Vec2::new(37.25, -12.5);
        assert_close(world.world_to_screen(p) + shift.surface, t.world_to_screen(p), 1e-3);
    }

    #[test]
    fn smoothing_disabled_for_degenerate_ratio() {
        let t = camera(Vec2::new(10.37, -4.81), 1.0, 0.0);
        for ratio in [0.0, -1.0, f32::NAN, f32::INFINITY] {
            let (world, shift) = t.split_for_smoothing(ratio);
            assert_eq!(world, t);
            assert_eq!(shift, ScreenShift::default());
        }
    }
}
