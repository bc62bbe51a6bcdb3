//! Kestrel engine crate.
//!
//! Screen-space rendering pipeline for 2D games: off-screen render surfaces,
//! a camera with follow/shake/tween effects, post-process shader chains and a
//! viewport that maps it all onto a window.

pub mod camera;
pub mod compositor;
pub mod coords;
pub mod core;
pub mod device;
pub mod logging;
pub mod render;
pub mod surface;
pub mod time;
pub mod viewport;
pub mod window;
