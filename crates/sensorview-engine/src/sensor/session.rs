use crate::error::{Error, Result};

use super::device::{AcquiredFrame, FrameReader, FrameSource, Modality, SensorDevice, SensorDriver};

/// Outcome of a non-blocking poll.
#[derive(Debug)]
pub enum FramePoll {
    /// A new frame. Drop it as soon as its data has been consumed.
    Frame(AcquiredFrame),
    /// The device has not produced a frame since the last poll. Not an error.
    NoFrameReady,
}

/// Open connection to one sensor, bound to one modality.
///
/// Handles are released in reverse acquisition order (reader, source, device)
/// by [`close`](Self::close), or on drop if the session was never closed.
pub struct SensorSession {
    modality: Modality,
    reader: Option<Box<dyn FrameReader>>,
    source: Option<Box<dyn FrameSource>>,
    device: Option<Box<dyn SensorDevice>>,
    device_name: String,
}

impl SensorSession {
    /// Opens the driver's default device and a reader for `modality`.
    pub fn open(driver: &dyn SensorDriver, modality: Modality) -> Result<Self> {
        let mut device = driver
            .default_sensor()
            .map_err(|e| Error::DeviceUnavailable(format!("{e:#}")))?
            .ok_or_else(|| Error::DeviceUnavailable("no sensor attached".to_string()))?;

        let device_name = device.name().to_string();

        device
            .open()
            .map_err(|e| Error::DeviceUnavailable(format!("{device_name}: {e:#}")))?;

        // From here on the device is open; a partially built session closes it on drop.
        let mut session = Self {
            modality,
            reader: None,
            source: None,
            device: Some(device),
            device_name,
        };

        let mut source = session
            .device
            .as_mut()
            .map(|d| d.frame_source(modality))
            .transpose()
            .map_err(|e| Error::SourceUnavailable(format!("{modality} source: {e:#}")))?
            .ok_or_else(|| Error::SourceUnavailable(format!("{modality} source: device closed")))?;

        let reader = source
            .open_reader()
            .map_err(|e| Error::SourceUnavailable(format!("{modality} reader: {e:#}")))?;

        session.source = Some(source);
        session.reader = Some(reader);

        log::info!("sensor '{}' opened ({modality} reader)", session.device_name);
        Ok(session)
    }

    pub fn modality(&self) -> Modality {
        self.modality
    }

    pub fn device_name(&self) -> &str {
        &self.device_name
    }

    pub fn is_open(&self) -> bool {
        self.reader.is_some()
    }

    /// Polls for the newest frame without blocking.
    pub fn try_acquire_latest_frame(&mut self) -> Result<FramePoll> {
        let reader = self
            .reader
            .as_mut()
            .ok_or_else(|| Error::AcquisitionFailed("session is closed".to_string()))?;

        match reader.acquire_latest_frame() {
            Ok(Some(frame)) => Ok(FramePoll::Frame(frame)),
            Ok(None) => Ok(FramePoll::NoFrameReady),
            Err(e) => Err(Error::AcquisitionFailed(format!("{e:#}"))),
        }
    }

    /// Releases reader, source and device, in that order. Idempotent.
    pub fn close(&mut self) {
        let was_open = self.device.is_some();

        drop(self.reader.take());
        drop(self.source.take());
        if let Some(mut device) = self.device.take() {
            device.close();
        }

        if was_open {
            log::info!("sensor '{}' closed", self.device_name);
        }
    }
}

impl Drop for SensorSession {
    fn drop(&mut self) {
        self.close();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sensor::mock::{MockDriver, MockEvent, MockPoll};

    #[test]
    fn missing_device_is_device_unavailable() {
        let driver = MockDriver::absent();
        let err = SensorSession::open(&driver, Modality::Depth).err().unwrap();
        assert_eq!(err.code(), "DeviceUnavailable");
    }

    #[test]
    fn open_failure_is_device_unavailable() {
        let driver = MockDriver::new().fail_open("usb link down");
        let err = SensorSession::open(&driver, Modality::Depth).err().unwrap();
        assert_eq!(err.code(), "DeviceUnavailable");
        assert!(err.to_string().contains("usb link down"));
        assert_eq!(driver.log().count(MockEvent::DeviceClosed), 0);
    }

    #[test]
    fn source_failure_is_source_unavailable_and_closes_device() {
        let driver = MockDriver::new().fail_source("no body source");
        let err = SensorSession::open(&driver, Modality::Body).err().unwrap();
        assert_eq!(err.code(), "SourceUnavailable");
        assert_eq!(driver.log().count(MockEvent::DeviceClosed), 1);
    }

    #[test]
    fn reader_failure_is_source_unavailable() {
        let driver = MockDriver::new().fail_reader("reader busy");
        let err = SensorSession::open(&driver, Modality::Depth).err().unwrap();
        assert_eq!(err.code(), "SourceUnavailable");
        assert_eq!(driver.log().count(MockEvent::SourceReleased), 1);
        assert_eq!(driver.log().count(MockEvent::DeviceClosed), 1);
    }

    #[test]
    fn pending_poll_is_no_frame_ready() {
        let driver = MockDriver::new();
        let mut session = SensorSession::open(&driver, Modality::Depth).unwrap();
        assert!(matches!(
            session.try_acquire_latest_frame(),
            Ok(FramePoll::NoFrameReady)
        ));
    }

    #[test]
    fn reader_error_is_acquisition_failed() {
        let driver = MockDriver::new().script([MockPoll::Fail("device hung up".into())]);
        let mut session = SensorSession::open(&driver, Modality::Depth).unwrap();
        let err = session.try_acquire_latest_frame().err().unwrap();
        assert_eq!(err.code(), "AcquisitionFailed");
    }

    #[test]
    fn close_releases_in_reverse_order_once() {
        let driver = MockDriver::new();
        let mut session = SensorSession::open(&driver, Modality::Depth).unwrap();
        assert!(session.is_open());
        session.close();
        assert!(!session.is_open());
        session.close();
        drop(session);

        assert_eq!(
            driver.log().teardown_order(),
            vec![
                MockEvent::ReaderReleased,
                MockEvent::SourceReleased,
                MockEvent::DeviceClosed
            ]
        );
    }

    #[test]
    fn drop_closes_unclosed_session() {
        let driver = MockDriver::new();
        let session = SensorSession::open(&driver, Modality::Body).unwrap();
        drop(session);
        assert_eq!(driver.log().count(MockEvent::DeviceClosed), 1);
    }

    #[test]
    fn acquire_after_close_fails() {
        let driver = MockDriver::new();
        let mut session = SensorSession::open(&driver, Modality::Depth).unwrap();
        session.close();
        assert!(session.try_acquire_latest_frame().is_err());
    }
}
