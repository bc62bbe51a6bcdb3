//! Coordinate and geometry types shared across the pipeline.
//!
//! Canonical surface space:
//! - Physical pixels of the surface being drawn
//! - Origin top-left
//! - +X right, +Y down
//!
//! World space is whatever the camera maps onto a surface; renderers convert
//! surface pixels to NDC in shaders.

mod color;
mod rect;
mod size;
mod transform;
mod vec2;

pub use color::ColorRgba;
pub use rect::Rect;
pub use size::PixelSize;
pub use transform::Transform2D;
pub use vec2::Vec2;
