//! Error taxonomy for the sensor-to-GPU pipeline.
//!
//! Every failure carries a stable code (see [`Error::code`]) and diagnostic text.
//! "No frame ready" is not an error and has no variant here; see
//! [`crate::sensor::FramePoll::NoFrameReady`].

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    /// No sensor present, or the sensor refused to open.
    #[error("sensor device unavailable: {0}")]
    DeviceUnavailable(String),

    /// The frame source or its reader could not be derived from the device.
    #[error("frame source unavailable: {0}")]
    SourceUnavailable(String),

    /// An acquired frame did not expose its sample buffer.
    #[error("frame buffer unavailable: {0}")]
    BufferUnavailable(String),

    /// Frame acquisition or frame data queries failed.
    #[error("frame acquisition failed: {0}")]
    AcquisitionFailed(String),

    /// A startup asset (shader file) is missing or empty.
    #[error("asset not found: {0}")]
    AssetNotFound(String),

    /// A graphics API call failed.
    #[error("GPU call failed: {0}")]
    GpuCallFailed(String),
}

impl Error {
    /// Stable failure code, suitable for dialogs and log correlation.
    pub fn code(&self) -> &'static str {
        match self {
            Error::DeviceUnavailable(_) => "DeviceUnavailable",
            Error::SourceUnavailable(_) => "SourceUnavailable",
            Error::BufferUnavailable(_) => "BufferUnavailable",
            Error::AcquisitionFailed(_) => "AcquisitionFailed",
            Error::AssetNotFound(_) => "AssetNotFound",
            Error::GpuCallFailed(_) => "GpuCallFailed",
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
