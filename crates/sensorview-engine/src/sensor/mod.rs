//! Sensor subsystem.
//!
//! Models the depth camera as a chain of owned handles:
//! driver -> device -> frame source -> frame reader -> acquired frame.
//! Every handle releases itself on drop; callers never issue raw release calls.
//!
//! Backends:
//! - `synthetic`: generated depth/body frames at a fixed cadence
//! - `absent`: no device present (startup fails with `DeviceUnavailable`)
//! - `mock`: scripted collaborator with call counters, for tests

mod backend;
mod body;
mod depth;
mod device;
mod session;

pub mod mock;
pub mod synthetic;

pub use backend::SensorBackend;
pub use synthetic::frame_interval;
pub use body::{
    BODY_COUNT, JOINT_COUNT, Joint, JointOrientation, JointType, TrackingState,
};
pub use depth::{DEPTH_BYTES_PER_SAMPLE, DEPTH_HEIGHT, DEPTH_WIDTH, DepthGrid};
pub use device::{
    AcquiredFrame, BodyFrame, DepthFrame, FrameReader, FrameSource, Modality, SensorDevice,
    SensorDriver,
};
pub use session::{FramePoll, SensorSession};
