//! Time subsystem.
//!
//! Frame timing utilities decoupled from the runtime:
//! - one `FrameClock` per render loop; `tick()` once per presented frame
//! - one `FramePacer` turning a frame-rate target into redraw deadlines

mod frame_clock;
mod pacer;

pub use frame_clock::{FrameClock, FrameTime};
pub use pacer::FramePacer;
