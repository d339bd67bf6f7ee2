//! Sensorview engine crate.
//!
//! Streams depth-camera frames to the GPU: a non-blocking sensor session,
//! frame decoding, pitched texture and constant-buffer uploads, and the
//! window/GPU runtime that drives one acquire-upload-draw step per idle tick.

pub mod assets;
pub mod core;
pub mod device;
pub mod error;
pub mod logging;
pub mod pipeline;
pub mod render;
pub mod sensor;
pub mod window;

pub use error::{Error, Result};
