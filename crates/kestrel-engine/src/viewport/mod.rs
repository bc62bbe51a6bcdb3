//! Frame root: the primary and secondary surfaces, the camera bound to the
//! primary, window/monitor state and frame pacing policy.
//!
//! Spaces:
//! - world: whatever the camera looks at
//! - primary: primary surface pixels (camera output)
//! - secondary: secondary surface pixels (overlay, no camera)
//! - window: physical window pixels, both surfaces fitted and centred

mod config;
mod device;
mod monitor;
mod settings;
mod window_state;

pub use config::ViewportConfig;
pub use device::{FramePhase, ViewportDevice, WindowCommand};
pub use monitor::{MonitorInfo, MonitorSource};
pub use settings::DisplaySettings;
pub use window_state::WindowState;
