use std::rc::Rc;

use rand::rngs::SmallRng;
use rand::{RngCore, SeedableRng};

use crate::coords::{PixelSize, Vec2};

use super::follow::{FollowState, FollowTarget};
use super::shake::{ShakeParams, ShakeState};
use super::transform::{clamp_zoom, CameraTransform, ScreenShift};
use super::tween::{CameraTween, TweenQueue};
use super::view::CameraView;

const DEFAULT_SEED: u64 = 0x6b65_7374_7265_6c00;

/// Camera with follow, shake, tween and optional pixel smoothing.
///
/// State is written freely between frames but only resolved in
/// [`CameraView::update`]; effects compose on top of the base values:
///
/// - zoom: `base_zoom · zoom_factor · tween_zoom · (1 + shake_zoom)`
/// - rotation: `base_rotation + rotation_offset + shake_rotation`
/// - offset: `half_surface + translation + shake_offset + tween_offset`
#[derive(Debug)]
pub struct Camera {
    target: Vec2,
    base_offset: Vec2,
    base_zoom: f32,
    base_rotation: f32,

    zoom_factor: f32,
    rotation_offset: f32,
    translation: Vec2,

    shake: Option<ShakeState>,
    follow: FollowState,
    tweens: TweenQueue,

    pixel_smoothing: bool,
    window_ratio: f32,
    rng: SmallRng,

    raw: CameraTransform,
    world: CameraTransform,
    shift: ScreenShift,
}

impl Camera {
    pub fn new(surface: PixelSize) -> Self {
        Self::with_seed(surface, DEFAULT_SEED)
    }

    /// Same as [`Camera::new`] with an explicit seed for shake noise.
    pub fn with_seed(surface: PixelSize, seed: u64) -> Self {
        let mut camera = Self {
            target: Vec2::zero(),
            base_offset: surface.half(),
            base_zoom: 1.0,
            base_rotation: 0.0,
            zoom_factor: 1.0,
            rotation_offset: 0.0,
            translation: Vec2::zero(),
            shake: None,
            follow: FollowState::default(),
            tweens: TweenQueue::default(),
            pixel_smoothing: false,
            window_ratio: 1.0,
            rng: SmallRng::seed_from_u64(seed),
            raw: CameraTransform::default(),
            world: CameraTransform::default(),
            shift: ScreenShift::default(),
        };
        camera.resolve();
        camera
    }

    // ── base state ────────────────────────────────────────────────────────

    pub fn position(&self) -> Vec2 {
        self.target
    }

    /// Moves the camera directly; a followed target will pull it back on update.
    pub fn set_position(&mut self, position: Vec2) {
        self.target = position;
    }

    pub fn set_zoom(&mut self, zoom: f32) {
        self.base_zoom = clamp_zoom(zoom);
    }

    pub fn set_zoom_factor(&mut self, factor: f32) {
        self.zoom_factor = clamp_zoom(factor);
    }

    pub fn set_rotation(&mut self, radians: f32) {
        self.base_rotation = finite_or(radians, 0.0);
    }

    pub fn set_rotation_offset(&mut self, radians: f32) {
        self.rotation_offset = finite_or(radians, 0.0);
    }

    pub fn set_translation(&mut self, translation: Vec2) {
        self.translation = if translation.is_finite() { translation } else { Vec2::zero() };
    }

    pub fn set_pixel_smoothing(&mut self, enabled: bool) {
        self.pixel_smoothing = enabled;
    }

    pub fn pixel_smoothing(&self) -> bool {
        self.pixel_smoothing
    }

    // ── follow ────────────────────────────────────────────────────────────

    /// Follows `target` from now on, dropping any pending handoff.
    pub fn set_target(&mut self, target: Rc<dyn FollowTarget>) {
        self.follow.set(target);
    }

    /// Hands off smoothly to `target`; behaves like [`set_target`](Self::set_target)
    /// when nothing is followed yet.
    pub fn change_target(&mut self, target: Rc<dyn FollowTarget>) {
        self.follow.change(target);
    }

    pub fn clear_target(&mut self) {
        self.follow.clear();
    }

    pub fn set_follow_smoothing(&mut self, smoothing: f32) {
        self.follow.set_smoothing(smoothing);
    }

    pub fn set_boundary_radius(&mut self, radius: f32) {
        self.follow.set_boundary_radius(radius);
    }

    pub fn follow(&self) -> &FollowState {
        &self.follow
    }

    // ── effects ───────────────────────────────────────────────────────────

    /// Starts a shake, replacing any shake in progress.
    ///
    /// A zero duration stops shaking.
    pub fn shake(&mut self, params: ShakeParams) {
        let seed = self.rng.next_u64();
        self.shake = ShakeState::new(params, seed);
    }

    pub fn stop_shake(&mut self) {
        self.shake = None;
    }

    pub fn is_shaking(&self) -> bool {
        self.shake.is_some()
    }

    pub fn push_tween(&mut self, tween: CameraTween) {
        self.tweens.push(tween);
    }

    pub fn clear_tweens(&mut self) {
        self.tweens.clear();
    }

    pub fn is_tweening(&self) -> bool {
        self.tweens.is_active()
    }

    // ── resolution ────────────────────────────────────────────────────────

    fn resolve(&mut self) {
        let sample = self.shake.as_ref().map(ShakeState::sample).unwrap_or_default();

        let zoom = clamp_zoom(
            self.base_zoom * self.zoom_factor * self.tweens.zoom() * (1.0 + sample.zoom),
        );
        let rotation = self.base_rotation + self.rotation_offset + sample.rotation;
        let offset = self.base_offset + self.translation + sample.offset + self.tweens.offset();

        self.raw = CameraTransform {
            target: self.target,
            zoom,
            rotation,
            pivot: self.base_offset,
            offset,
        };

        if self.pixel_smoothing {
            let (world, shift) = self.raw.split_for_smoothing(self.window_ratio);
            self.world = world;
            self.shift = shift;
        } else {
            self.world = self.raw;
            self.shift = ScreenShift::default();
        }
    }
}

impl CameraView for Camera {
    fn transform(&self) -> &CameraTransform {
        &self.raw
    }

    fn world_transform(&self) -> &CameraTransform {
        &self.world
    }

    fn screen_shift(&self) -> ScreenShift {
        self.shift
    }

    fn update(&mut self, dt: f32, window_width: f32, surface_width: f32) {
        let dt = finite_or(dt, 0.0).max(0.0);

        if let Some(shake) = self.shake.as_mut() {
            if !shake.advance(dt) {
                self.shake = None;
            }
        }
        self.tweens.advance(dt);
        self.target = self.follow.advance(self.target, dt);

        self.window_ratio = if surface_width > 0.0 { window_width / surface_width } else { 0.0 };
        self.resolve();
    }

    fn on_surface_resized(&mut self, size: PixelSize) {
        self.base_offset = size.half();
        self.resolve();
    }
}

#[inline]
fn finite_or(v: f32, fallback: f32) -> f32 {
    if v.is_finite() { v } else { fallback }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use super::*;

    const SURFACE: PixelSize = PixelSize::new(1920, 1080);

    fn updated(mut cam: Camera, dt: f32) -> Camera {
        cam.update(dt, 1920.0, 1920.0);
        cam
    }

    fn assert_close(a: Vec2, b: Vec2, tol: f32) {
        assert!(
            (a.x - b.x).abs() <= tol && (a.y - b.y).abs() <= tol,
            "{a:?} != {b:?} (tol {tol})"
        );
    }

    // ── conversion ────────────────────────────────────────────────────────

    #[test]
    fn zoomed_scenario_maps_and_inverts() {
        let mut cam = Camera::new(SURFACE);
        cam.set_zoom(2.0);
        let cam = updated(cam, 0.0);

        let screen = cam.world_to_screen(Vec2::new(100.0, 0.0));
        assert_close(screen, Vec2::new(200.0, 0.0), 1e-4);
        assert_close(cam.screen_to_world(screen), Vec2::new(100.0, 0.0), 1e-4);
    }

    #[test]
    fn zoom_factor_multiplies_base_zoom() {
        let mut cam = Camera::new(SURFACE);
        cam.set_zoom(2.0);
        cam.set_zoom_factor(1.5);
        let cam = updated(cam, 0.0);
        assert!((cam.transform().zoom - 3.0).abs() < 1e-6);
    }

    #[test]
    fn zero_zoom_is_clamped_positive() {
        let mut cam = Camera::new(SURFACE);
        cam.set_zoom(0.0);
        cam.set_zoom_factor(-2.0);
        let cam = updated(cam, 0.0);
        assert!(cam.transform().zoom > 0.0);
    }

    // ── shake ─────────────────────────────────────────────────────────────

    fn shake_params(duration: f32) -> ShakeParams {
        ShakeParams { duration, strength: Vec2::new(12.0, 12.0), ..ShakeParams::default() }
    }

    #[test]
    fn shake_perturbs_offset_immediately() {
        let mut cam = Camera::new(SURFACE);
        cam.shake(shake_params(0.5));
        let cam = updated(cam, 0.0);
        assert_ne!(cam.transform().offset, SURFACE.half());
    }

    #[test]
    fn shake_settles_at_duration() {
        let mut cam = Camera::new(SURFACE);
        cam.shake(shake_params(0.5));
        let cam = updated(cam, 0.5);
        assert!(!cam.is_shaking());
        assert_eq!(cam.transform().offset, SURFACE.half());
    }

    #[test]
    fn restarting_shake_replaces_previous() {
        let mut cam = Camera::new(SURFACE);
        cam.shake(shake_params(10.0));
        cam.shake(shake_params(0.1));
        let cam = updated(cam, 0.1);
        assert!(!cam.is_shaking());
    }

    #[test]
    fn zero_duration_shake_is_ignored() {
        let mut cam = Camera::new(SURFACE);
        cam.shake(shake_params(0.0));
        assert!(!cam.is_shaking());
    }

    // ── follow ────────────────────────────────────────────────────────────

    #[test]
    fn follows_target_on_update() {
        let player = Rc::new(Cell::new(Vec2::new(40.0, 30.0)));
        let mut cam = Camera::new(SURFACE);
        cam.set_target(player.clone());
        let mut cam = updated(cam, 0.016);
        assert_eq!(cam.position(), Vec2::new(40.0, 30.0));

        player.set(Vec2::new(50.0, 30.0));
        cam.update(0.016, 1920.0, 1920.0);
        assert_eq!(cam.position(), Vec2::new(50.0, 30.0));
    }

    #[test]
    fn change_target_promotes_after_handoff() {
        let mut cam = Camera::new(SURFACE);
        cam.set_follow_smoothing(0.5);
        cam.set_target(Rc::new(Vec2::zero()));
        cam.change_target(Rc::new(Vec2::new(100.0, 0.0)));
        for _ in 0..20 {
            cam.update(1.0 / 60.0, 1920.0, 1920.0);
        }
        assert!(!cam.follow().is_handing_off());
        assert_eq!(cam.position(), Vec2::new(100.0, 0.0));
    }

    // ── tween ─────────────────────────────────────────────────────────────

    #[test]
    fn tween_offset_feeds_effective_offset() {
        let mut cam = Camera::new(SURFACE);
        cam.push_tween(CameraTween::new(Vec2::new(20.0, 0.0), 1.0, 1.0));
        let cam = updated(cam, 1.0);
        assert_close(cam.transform().offset, SURFACE.half() + Vec2::new(20.0, 0.0), 1e-4);
    }

    // ── pixel smoothing ───────────────────────────────────────────────────

    #[test]
    fn smoothing_splits_transform() {
        let mut cam = Camera::new(PixelSize::new(320, 180));
        cam.set_pixel_smoothing(true);
        cam.set_position(Vec2::new(10.4, 3.7));
        cam.update(0.0, 1280.0, 320.0);

        assert_eq!(cam.world_transform().target, Vec2::new(10.0, 3.0));
        let shift = cam.screen_shift();
        assert_close(shift.window, shift.surface * 4.0, 1e-5);

        let p = Vec2::new(77.0, -12.0);
        let recombined = cam.world_transform().world_to_screen(p) + shift.surface;
        assert_close(recombined, cam.world_to_screen(p), 1e-3);
    }

    #[test]
    fn smoothing_off_leaves_world_equal_to_raw() {
        let mut cam = Camera::new(PixelSize::new(320, 180));
        cam.set_position(Vec2::new(10.4, 3.7));
        cam.update(0.0, 1280.0, 320.0);
        assert_eq!(cam.world_transform(), cam.transform());
        assert_eq!(cam.screen_shift(), ScreenShift::default());
    }
}
