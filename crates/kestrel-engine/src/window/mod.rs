//! Window + runtime loop.
//!
//! Owns the `winit` EventLoop and Window, and wires them to the GPU layer
//! and the viewport.

mod monitors;
mod runtime;

pub use monitors::WinitMonitors;
pub use runtime::{Runtime, RuntimeConfig, RuntimeCtx};
