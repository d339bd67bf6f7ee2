use std::fmt;

use anyhow::Result;

use super::body::{JOINT_COUNT, Joint, JointOrientation};

/// Which data stream a session consumes.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum Modality {
    Depth,
    Body,
}

impl fmt::Display for Modality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Modality::Depth => f.write_str("depth"),
            Modality::Body => f.write_str("body"),
        }
    }
}

/// Entry point of a sensor backend.
pub trait SensorDriver {
    /// Returns the default device, or `None` when no device is attached.
    fn default_sensor(&self) -> Result<Option<Box<dyn SensorDevice>>>;
}

/// A physical (or simulated) sensor.
///
/// `close` is called exactly once by the owning session, after every source
/// derived from the device has been dropped.
pub trait SensorDevice {
    fn name(&self) -> &str;

    fn open(&mut self) -> Result<()>;

    fn close(&mut self);

    /// Derives the frame source for `modality`. Only valid on an open device.
    fn frame_source(&mut self, modality: Modality) -> Result<Box<dyn FrameSource>>;
}

pub trait FrameSource {
    fn open_reader(&mut self) -> Result<Box<dyn FrameReader>>;
}

/// Non-blocking frame reader.
pub trait FrameReader {
    /// Returns the newest frame, or `Ok(None)` when the device has not produced
    /// a frame since the previous call. Must never block.
    fn acquire_latest_frame(&mut self) -> Result<Option<AcquiredFrame>>;
}

/// Single-use handle to the latest frame snapshot.
///
/// Dropping the handle releases the frame back to the device. A frame that is
/// held blocks delivery of subsequent frames.
pub enum AcquiredFrame {
    Depth(Box<dyn DepthFrame>),
    Body(Box<dyn BodyFrame>),
}

impl AcquiredFrame {
    pub fn modality(&self) -> Modality {
        match self {
            AcquiredFrame::Depth(_) => Modality::Depth,
            AcquiredFrame::Body(_) => Modality::Body,
        }
    }
}

impl fmt::Debug for AcquiredFrame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "AcquiredFrame({})", self.modality())
    }
}

pub trait DepthFrame {
    /// Flat raster of depth samples in millimetres, row-major, no padding.
    fn underlying_buffer(&self) -> Result<&[u16]>;
}

pub trait BodyFrame {
    /// Number of body slots reported by the device.
    fn body_count(&self) -> usize;

    fn is_tracked(&self, slot: usize) -> Result<bool>;

    /// Positions and tracking state of every joint of a tracked slot.
    /// Reference skeleton data; the renderer only reads `joint_orientations`.
    fn joints(&self, slot: usize) -> Result<[Joint; JOINT_COUNT]>;

    fn joint_orientations(&self, slot: usize) -> Result<[JointOrientation; JOINT_COUNT]>;
}
