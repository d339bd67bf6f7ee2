//! Sensor-frame-to-GPU streaming pipeline.
//!
//! Flow per tick: [`FrameLoop::step`] polls the session, hands a new frame to
//! the configured [`Variant`] for decode + upload, then [`FrameLoop::draw`]
//! issues the variant's fixed draw through a [`RenderSink`].

mod decode;
mod driver;
mod sink;
mod stats;
mod transform;
mod variant;

pub use decode::{decode_depth, decode_root_orientation};
pub use driver::{FrameLoop, StepOutcome, TickOutcome};
pub use sink::{DrawCall, RenderSink};
pub use stats::{LoopStats, Throughput, ThroughputMeter};
pub use transform::{CameraConfig, Rotation, TransformState, TransformUniform};
pub use variant::{BodyVariant, DepthVariant, Variant};
