//! GPU rendering primitives used by surfaces and the compositor.
//!
//! Renderers own their GPU resources (pipelines, samplers, layouts) and create
//! them lazily on first use for a given target format.
//!
//! Convention:
//! - Geometry is in target pixels (top-left origin, +Y down).
//! - Vertex shaders convert to NDC using the target size from a uniform.
//! - Every texture and vertex color holds premultiplied alpha.

mod blend;
mod blit;
mod ctx;
mod quad;

pub use blend::BlendMode;
pub use blit::{BlitJob, BlitRenderer, BlitShader};
pub use ctx::{RenderCtx, RenderTarget};
pub use quad::{Quad, QuadRenderer};
