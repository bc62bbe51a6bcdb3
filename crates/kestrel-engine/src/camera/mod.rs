//! Cameras: world ↔ surface transforms plus follow/shake/tween effects.
//!
//! [`CameraView`] is the capability the viewport and render surfaces consume.
//! [`BasicCamera`] covers static views; [`Camera`] layers the effects on top of
//! the same [`CameraTransform`] math.

mod advanced;
mod basic;
mod follow;
mod shake;
mod transform;
mod tween;
mod view;

pub use advanced::Camera;
pub use basic::BasicCamera;
pub use follow::{FollowState, FollowTarget, HANDOFF_EPSILON};
pub use shake::{ShakeParams, ShakeSample, ShakeState};
pub use transform::{clamp_zoom, CameraTransform, ScreenShift, MIN_ZOOM};
pub use tween::{linear, CameraTween, Easing, TweenQueue};
pub use view::CameraView;
