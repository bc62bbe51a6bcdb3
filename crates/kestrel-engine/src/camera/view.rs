use crate::coords::{PixelSize, Vec2};

use super::transform::{CameraTransform, ScreenShift};

/// What the viewport and render surfaces need from a camera.
///
/// Implementations resolve their state into a [`CameraTransform`] once per
/// [`update`](CameraView::update); every query in between reads that cached
/// value so a frame never sees the camera move halfway through.
pub trait CameraView {
    /// Unsplit world → surface mapping used for coordinate conversion.
    fn transform(&self) -> &CameraTransform;

    /// Mapping used while capturing the surface. Differs from
    /// [`transform`](CameraView::transform) only when pixel smoothing is on.
    fn world_transform(&self) -> &CameraTransform {
        self.transform()
    }

    /// Residual to apply when the surface is presented.
    fn screen_shift(&self) -> ScreenShift {
        ScreenShift::default()
    }

    /// Advances time-based state and re-resolves the transform.
    ///
    /// `window_width` is the physical width the primary surface occupies on
    /// screen; `surface_width` is the surface's own pixel width.
    fn update(&mut self, dt: f32, window_width: f32, surface_width: f32);

    /// Called when the bound surface is recreated at a new size.
    fn on_surface_resized(&mut self, size: PixelSize);

    fn world_to_screen(&self, p: Vec2) -> Vec2 {
        self.transform().world_to_screen(p)
    }

    fn screen_to_world(&self, p: Vec2) -> Vec2 {
        self.transform().screen_to_world(p)
    }
}
