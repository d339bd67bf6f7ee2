use anyhow::Result;

use super::device::{SensorDevice, SensorDriver};
use super::synthetic::SyntheticDriver;

/// Selects where the default sensor comes from.
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum SensorBackend {
    /// Generated frames at `frame_rate_hz`.
    Synthetic { frame_rate_hz: f32 },
    /// No device attached.
    Absent,
}

impl Default for SensorBackend {
    fn default() -> Self {
        SensorBackend::Synthetic {
            frame_rate_hz: 30.0,
        }
    }
}

impl SensorBackend {
    pub fn driver(self) -> Result<Box<dyn SensorDriver>> {
        let driver: Box<dyn SensorDriver> = match self {
            SensorBackend::Synthetic { frame_rate_hz } => {
                Box::new(SyntheticDriver::new(frame_rate_hz)?)
            }
            SensorBackend::Absent => Box::new(AbsentDriver),
        };
        Ok(driver)
    }
}

struct AbsentDriver;

impl SensorDriver for AbsentDriver {
    fn default_sensor(&self) -> Result<Option<Box<dyn SensorDevice>>> {
        Ok(None)
    }
}
