use super::Vec2;

/// Size of a GPU buffer or window in physical pixels.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Hash)]
pub struct PixelSize {
    pub width: u32,
    pub height: u32,
}

impl PixelSize {
    #[inline]
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    #[inline]
    pub fn is_empty(self) -> bool {
        self.width == 0 || self.height == 0
    }

    #[inline]
    pub fn as_vec2(self) -> Vec2 {
        Vec2::new(self.width as f32, self.height as f32)
    }

    /// Half extent; the pivot the camera rotates around.
    #[inline]
    pub fn half(self) -> Vec2 {
        self.as_vec2() * 0.5
    }

    /// Whether `self` fits inside `bounds` on both axes.
    #[inline]
    pub fn fits_within(self, bounds: PixelSize) -> bool {
        self.width <= bounds.width && self.height <= bounds.height
    }

    /// Shrinks each axis to at most the matching axis of `bounds`.
    #[inline]
    pub fn clamped_to(self, bounds: PixelSize) -> PixelSize {
        PixelSize::new(self.width.min(bounds.width), self.height.min(bounds.height))
    }
}

impl From<winit::dpi::PhysicalSize<u32>> for PixelSize {
    fn from(s: winit::dpi::PhysicalSize<u32>) -> Self {
        Self::new(s.width, s.height)
    }
}

impl From<PixelSize> for winit::dpi::PhysicalSize<u32> {
    fn from(s: PixelSize) -> Self {
        winit::dpi::PhysicalSize::new(s.width, s.height)
    }
}
