//! GPU device + surface management.
//!
//! Creates the wgpu instance/adapter/device/queue, configures the window
//! surface and hands out per-frame encoders.

mod gpu;
mod surface;

pub use gpu::{Gpu, GpuFrame, GpuInit, SurfaceErrorAction};
