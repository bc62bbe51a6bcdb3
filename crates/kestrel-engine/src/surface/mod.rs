//! Off-screen render targets.
//!
//! A [`RenderSurface`] owns one GPU color buffer plus the per-surface draw
//! state (background, tint, blend mode, flashes). [`PingPongBufferPair`] is
//! the compositor's scratch storage built from two of them.

mod flash;
mod ping_pong;
mod render_surface;

pub use crate::render::BlendMode;
pub use flash::Flash;
pub use ping_pong::{PingPongBufferPair, PingPongSlot};
pub use render_surface::{RenderSurface, SurfaceCapture};
