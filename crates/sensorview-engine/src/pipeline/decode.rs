//! Frame decoders.
//!
//! Decoders borrow the frame; releasing it is the caller's job and happens
//! when the owning `AcquiredFrame` goes out of scope.

use glam::Vec4;

use crate::error::{Error, Result};
use crate::sensor::{BODY_COUNT, BodyFrame, DEPTH_HEIGHT, DEPTH_WIDTH, DepthFrame, DepthGrid, JointType};

/// Extracts the full-resolution depth grid from `frame`.
pub fn decode_depth(frame: &dyn DepthFrame) -> Result<DepthGrid<'_>> {
    let samples = frame
        .underlying_buffer()
        .map_err(|e| Error::BufferUnavailable(format!("{e:#}")))?;

    DepthGrid::new(samples, DEPTH_WIDTH, DEPTH_HEIGHT).ok_or_else(|| {
        Error::AcquisitionFailed(format!(
            "depth frame has {} samples, expected {}x{}",
            samples.len(),
            DEPTH_WIDTH,
            DEPTH_HEIGHT
        ))
    })
}

/// Returns the root (`SpineBase`) orientation of the first tracked body.
///
/// Slots are visited in device order; later bodies are never queried once a
/// tracked one is found. `Ok(None)` means no body is tracked.
pub fn decode_root_orientation(frame: &dyn BodyFrame) -> Result<Option<Vec4>> {
    let slots = frame.body_count().min(BODY_COUNT);

    for slot in 0..slots {
        let tracked = frame
            .is_tracked(slot)
            .map_err(|e| Error::AcquisitionFailed(format!("body {slot}: {e:#}")))?;
        if !tracked {
            continue;
        }

        let joints = frame
            .joint_orientations(slot)
            .map_err(|e| Error::AcquisitionFailed(format!("body {slot} joints: {e:#}")))?;
        return Ok(Some(joints[JointType::SpineBase.index()].orientation));
    }

    Ok(None)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sensor::mock::{MockBody, MockDriver, MockPoll};
    use crate::sensor::{AcquiredFrame, FramePoll, Modality, SensorSession};

    fn acquire(driver: &MockDriver, modality: Modality) -> AcquiredFrame {
        let mut session = SensorSession::open(driver, modality).unwrap();
        match session.try_acquire_latest_frame().unwrap() {
            FramePoll::Frame(frame) => frame,
            FramePoll::NoFrameReady => panic!("script delivers a frame"),
        }
    }

    fn root_of(bodies: Vec<MockBody>) -> Result<Option<Vec4>> {
        let driver = MockDriver::new().script([MockPoll::Body(bodies)]);
        let AcquiredFrame::Body(frame) = acquire(&driver, Modality::Body) else {
            panic!("expected a body frame");
        };
        decode_root_orientation(frame.as_ref())
    }

    #[test]
    fn depth_decodes_full_raster() {
        let driver = MockDriver::new().script([MockPoll::Depth(vec![7; DEPTH_WIDTH * DEPTH_HEIGHT])]);
        let AcquiredFrame::Depth(frame) = acquire(&driver, Modality::Depth) else {
            panic!("expected a depth frame");
        };
        let grid = decode_depth(frame.as_ref()).unwrap();
        assert_eq!(grid.samples().len(), DEPTH_WIDTH * DEPTH_HEIGHT);
        assert_eq!((grid.width(), grid.height()), (DEPTH_WIDTH, DEPTH_HEIGHT));
    }

    #[test]
    fn depth_passes_zero_samples_through() {
        let mut samples = vec![1200; DEPTH_WIDTH * DEPTH_HEIGHT];
        samples[0] = 0;
        let driver = MockDriver::new().script([MockPoll::Depth(samples)]);
        let AcquiredFrame::Depth(frame) = acquire(&driver, Modality::Depth) else {
            panic!("expected a depth frame");
        };
        assert_eq!(decode_depth(frame.as_ref()).unwrap().samples()[0], 0);
    }

    #[test]
    fn inaccessible_buffer_is_buffer_unavailable() {
        let driver = MockDriver::new().script([MockPoll::DepthUnavailable]);
        let AcquiredFrame::Depth(frame) = acquire(&driver, Modality::Depth) else {
            panic!("expected a depth frame");
        };
        assert_eq!(decode_depth(frame.as_ref()).err().unwrap().code(), "BufferUnavailable");
    }

    #[test]
    fn short_buffer_is_acquisition_failed() {
        let driver = MockDriver::new().script([MockPoll::Depth(vec![0; DEPTH_WIDTH * 10])]);
        let AcquiredFrame::Depth(frame) = acquire(&driver, Modality::Depth) else {
            panic!("expected a depth frame");
        };
        assert_eq!(decode_depth(frame.as_ref()).err().unwrap().code(), "AcquisitionFailed");
    }

    #[test]
    fn no_tracked_body_is_none() {
        let bodies = vec![MockBody::untracked(); BODY_COUNT];
        assert_eq!(root_of(bodies).unwrap(), None);
    }

    #[test]
    fn first_tracked_body_wins() {
        let first = Vec4::new(0.1, 0.2, 0.3, 1.0);
        let bodies = vec![
            MockBody::untracked(),
            MockBody::tracked(first),
            MockBody::tracked(Vec4::new(-1.0, -1.0, -1.0, 1.0)),
            MockBody::untracked(),
        ];
        assert_eq!(root_of(bodies).unwrap(), Some(first));
    }

    #[test]
    fn later_slots_are_not_queried() {
        let root = Vec4::new(0.5, 0.0, 0.0, 1.0);
        let bodies = vec![
            MockBody::tracked(root),
            MockBody::untracked().failing_tracked_query(),
        ];
        assert_eq!(root_of(bodies).unwrap(), Some(root));
    }

    #[test]
    fn slots_beyond_device_maximum_are_ignored() {
        let mut bodies = vec![MockBody::untracked(); BODY_COUNT];
        bodies.push(MockBody::tracked(Vec4::ONE));
        assert_eq!(root_of(bodies).unwrap(), None);
    }

    #[test]
    fn query_failure_is_acquisition_failed() {
        let bodies = vec![MockBody::untracked().failing_tracked_query()];
        assert_eq!(root_of(bodies).err().unwrap().code(), "AcquisitionFailed");

        let bodies = vec![MockBody::tracked(Vec4::W).failing_orientations()];
        assert_eq!(root_of(bodies).err().unwrap().code(), "AcquisitionFailed");
    }
}
