use crate::coords::{PixelSize, Vec2};

use super::transform::{clamp_zoom, CameraTransform};
use super::view::CameraView;

/// Camera with position, zoom, rotation and a fixed extra offset. No effects.
#[derive(Debug, Clone)]
pub struct BasicCamera {
    target: Vec2,
    zoom: f32,
    rotation: f32,
    pivot: Vec2,
    offset: Vec2,
    resolved: CameraTransform,
}

impl BasicCamera {
    pub fn new(surface: PixelSize) -> Self {
        let pivot = surface.half();
        let mut camera = Self {
            target: Vec2::zero(),
            zoom: 1.0,
            rotation: 0.0,
            pivot,
            offset: Vec2::zero(),
            resolved: CameraTransform::default(),
        };
        camera.resolve();
        camera
    }

    pub fn target(&self) -> Vec2 {
        self.target
    }

    pub fn set_target(&mut self, target: Vec2) {
        self.target = target;
    }

    pub fn set_zoom(&mut self, zoom: f32) {
        self.zoom = clamp_zoom(zoom);
    }

    pub fn set_rotation(&mut self, radians: f32) {
        self.rotation = if radians.is_finite() { radians } else { 0.0 };
    }

    /// Extra surface-space translation added on top of the pivot.
    pub fn set_offset(&mut self, offset: Vec2) {
        self.offset = offset;
    }

    fn resolve(&mut self) {
        self.resolved = CameraTransform {
            target: self.target,
            zoom: self.zoom,
            rotation: self.rotation,
            pivot: self.pivot,
            offset: self.pivot + self.offset,
        };
    }
}

impl CameraView for BasicCamera {
    fn transform(&self) -> &CameraTransform {
        &self.resolved
    }

    fn update(&mut self, _dt: f32, _window_width: f32, _surface_width: f32) {
        self.resolve();
    }

    fn on_surface_resized(&mut self, size: PixelSize) {
        self.pivot = size.half();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn changes_apply_on_update() {
        let mut cam = BasicCamera::new(PixelSize::new(320, 180));
        cam.set_target(Vec2::new(10.0, 0.0));
        assert_eq!(cam.world_to_screen(Vec2::new(10.0, 0.0)), Vec2::new(10.0, 0.0));

        cam.update(0.016, 320.0, 320.0);
        assert_eq!(cam.world_to_screen(Vec2::new(10.0, 0.0)), Vec2::zero());
    }

    #[test]
    fn resize_moves_pivot() {
        let mut cam = BasicCamera::new(PixelSize::new(320, 180));
        cam.on_surface_resized(PixelSize::new(640, 360));
        cam.update(0.0, 640.0, 640.0);
        assert_eq!(cam.transform().pivot, Vec2::new(320.0, 180.0));
    }

    #[test]
    fn negative_zoom_is_clamped() {
        let mut cam = BasicCamera::new(PixelSize::new(320, 180));
        cam.set_zoom(-4.0);
        cam.update(0.0, 320.0, 320.0);
        assert!(cam.transform().zoom > 0.0);
    }
}
