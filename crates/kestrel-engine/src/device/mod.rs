//! GPU device + swapchain management.
//!
//! This module is responsible for:
//! - creating the wgpu Instance/Adapter/Device/Queue
//! - creating & configuring the Surface (swapchain), including the present
//!   mode that backs vsync
//! - acquiring frames and providing encoders/views for rendering
//! - mapping swapchain and call-order failures onto recoverable actions

mod error;
mod frame;
mod gpu;
mod init;
mod surface;

pub use error::SurfaceErrorAction;
pub(crate) use error::ordering_violation;
pub use frame::GpuFrame;
pub use gpu::Gpu;
pub use init::GpuInit;
