//! Scripted sensor collaborator with call accounting.
//!
//! Every handle created by the mock records its lifecycle into a shared
//! [`MockLog`], so tests can check that frames are released exactly once and
//! that the session tears down in reverse order.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

use anyhow::{Result, anyhow, bail};
use glam::Vec4;

use super::body::{JOINT_COUNT, Joint, JointOrientation, JointType};
use super::device::{
    AcquiredFrame, BodyFrame, DepthFrame, FrameReader, FrameSource, Modality, SensorDevice,
    SensorDriver,
};

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum MockEvent {
    DeviceOpened,
    DeviceClosed,
    SourceReleased,
    ReaderReleased,
    Poll,
    FrameAcquired,
    FrameReleased,
}

#[derive(Debug, Default)]
pub struct MockLog {
    events: RefCell<Vec<MockEvent>>,
}

impl MockLog {
    fn record(&self, event: MockEvent) {
        self.events.borrow_mut().push(event);
    }

    pub fn count(&self, event: MockEvent) -> usize {
        self.events.borrow().iter().filter(|e| **e == event).count()
    }

    pub fn frames_acquired(&self) -> usize {
        self.count(MockEvent::FrameAcquired)
    }

    pub fn frames_released(&self) -> usize {
        self.count(MockEvent::FrameReleased)
    }

    pub fn polls(&self) -> usize {
        self.count(MockEvent::Poll)
    }

    /// Handle-release events in the order they happened.
    pub fn teardown_order(&self) -> Vec<MockEvent> {
        self.events
            .borrow()
            .iter()
            .copied()
            .filter(|e| {
                matches!(
                    e,
                    MockEvent::ReaderReleased | MockEvent::SourceReleased | MockEvent::DeviceClosed
                )
            })
            .collect()
    }
}

/// One body slot of a scripted body frame.
#[derive(Debug, Clone)]
pub struct MockBody {
    pub tracked: bool,
    pub root: Vec4,
    pub fail_tracked_query: bool,
    pub fail_orientations: bool,
}

impl MockBody {
    pub fn untracked() -> Self {
        Self {
            tracked: false,
            root: Vec4::W,
            fail_tracked_query: false,
            fail_orientations: false,
        }
    }

    pub fn tracked(root: Vec4) -> Self {
        Self {
            tracked: true,
            root,
            ..Self::untracked()
        }
    }

    pub fn failing_tracked_query(mut self) -> Self {
        self.fail_tracked_query = true;
        self
    }

    pub fn failing_orientations(mut self) -> Self {
        self.fail_orientations = true;
        self
    }
}

/// Scripted result of one `acquire_latest_frame` call.
#[derive(Debug, Clone)]
pub enum MockPoll {
    Pending,
    Depth(Vec<u16>),
    /// A depth frame whose buffer cannot be accessed.
    DepthUnavailable,
    Body(Vec<MockBody>),
    Fail(String),
}

/// Sensor driver whose device replays a poll script.
///
/// Polls past the end of the script return "pending".
#[derive(Default)]
pub struct MockDriver {
    log: Rc<MockLog>,
    absent: bool,
    fail_open: Option<String>,
    fail_source: Option<String>,
    fail_reader: Option<String>,
    script: RefCell<VecDeque<MockPoll>>,
}

impl MockDriver {
    pub fn new() -> Self {
        Self::default()
    }

    /// A driver with no device attached.
    pub fn absent() -> Self {
        Self {
            absent: true,
            ..Self::default()
        }
    }

    pub fn fail_open(mut self, msg: &str) -> Self {
        self.fail_open = Some(msg.to_string());
        self
    }

    pub fn fail_source(mut self, msg: &str) -> Self {
        self.fail_source = Some(msg.to_string());
        self
    }

    pub fn fail_reader(mut self, msg: &str) -> Self {
        self.fail_reader = Some(msg.to_string());
        self
    }

    pub fn script(self, polls: impl IntoIterator<Item = MockPoll>) -> Self {
        self.script.borrow_mut().extend(polls);
        self
    }

    pub fn log(&self) -> Rc<MockLog> {
        self.log.clone()
    }
}

impl SensorDriver for MockDriver {
    fn default_sensor(&self) -> Result<Option<Box<dyn SensorDevice>>> {
        if self.absent {
            return Ok(None);
        }

        Ok(Some(Box::new(MockDevice {
            log: self.log.clone(),
            open: false,
            fail_open: self.fail_open.clone(),
            fail_source: self.fail_source.clone(),
            fail_reader: self.fail_reader.clone(),
            script: std::mem::take(&mut *self.script.borrow_mut()),
        })))
    }
}

struct MockDevice {
    log: Rc<MockLog>,
    open: bool,
    fail_open: Option<String>,
    fail_source: Option<String>,
    fail_reader: Option<String>,
    script: VecDeque<MockPoll>,
}

impl SensorDevice for MockDevice {
    fn name(&self) -> &str {
        "mock"
    }

    fn open(&mut self) -> Result<()> {
        if let Some(msg) = &self.fail_open {
            bail!("{msg}");
        }
        self.open = true;
        self.log.record(MockEvent::DeviceOpened);
        Ok(())
    }

    fn close(&mut self) {
        self.open = false;
        self.log.record(MockEvent::DeviceClosed);
    }

    fn frame_source(&mut self, modality: Modality) -> Result<Box<dyn FrameSource>> {
        if !self.open {
            bail!("device is not open");
        }
        if let Some(msg) = &self.fail_source {
            bail!("{msg}");
        }

        Ok(Box::new(MockSource {
            log: self.log.clone(),
            modality,
            fail_reader: self.fail_reader.clone(),
            script: std::mem::take(&mut self.script),
        }))
    }
}

struct MockSource {
    log: Rc<MockLog>,
    modality: Modality,
    fail_reader: Option<String>,
    script: VecDeque<MockPoll>,
}

impl FrameSource for MockSource {
    fn open_reader(&mut self) -> Result<Box<dyn FrameReader>> {
        if let Some(msg) = &self.fail_reader {
            bail!("{msg}");
        }

        Ok(Box::new(MockReader {
            log: self.log.clone(),
            modality: self.modality,
            script: std::mem::take(&mut self.script),
        }))
    }
}

impl Drop for MockSource {
    fn drop(&mut self) {
        self.log.record(MockEvent::SourceReleased);
    }
}

struct MockReader {
    log: Rc<MockLog>,
    modality: Modality,
    script: VecDeque<MockPoll>,
}

impl FrameReader for MockReader {
    fn acquire_latest_frame(&mut self) -> Result<Option<AcquiredFrame>> {
        self.log.record(MockEvent::Poll);

        let frame = match self.script.pop_front().unwrap_or(MockPoll::Pending) {
            MockPoll::Pending => return Ok(None),
            MockPoll::Fail(msg) => return Err(anyhow!(msg)),
            MockPoll::Depth(samples) => AcquiredFrame::Depth(Box::new(MockDepthFrame {
                log: self.log.clone(),
                samples: Some(samples),
            })),
            MockPoll::DepthUnavailable => AcquiredFrame::Depth(Box::new(MockDepthFrame {
                log: self.log.clone(),
                samples: None,
            })),
            MockPoll::Body(bodies) => AcquiredFrame::Body(Box::new(MockBodyFrame {
                log: self.log.clone(),
                bodies,
            })),
        };

        log::trace!("mock {} reader delivered {frame:?}", self.modality);
        self.log.record(MockEvent::FrameAcquired);
        Ok(Some(frame))
    }
}

impl Drop for MockReader {
    fn drop(&mut self) {
        self.log.record(MockEvent::ReaderReleased);
    }
}

struct MockDepthFrame {
    log: Rc<MockLog>,
    samples: Option<Vec<u16>>,
}

impl DepthFrame for MockDepthFrame {
    fn underlying_buffer(&self) -> Result<&[u16]> {
        self.samples
            .as_deref()
            .ok_or_else(|| anyhow!("underlying buffer is not accessible"))
    }
}

impl Drop for MockDepthFrame {
    fn drop(&mut self) {
        self.log.record(MockEvent::FrameReleased);
    }
}

struct MockBodyFrame {
    log: Rc<MockLog>,
    bodies: Vec<MockBody>,
}

impl MockBodyFrame {
    fn slot(&self, slot: usize) -> Result<&MockBody> {
        self.bodies
            .get(slot)
            .ok_or_else(|| anyhow!("body slot {slot} out of range"))
    }
}

impl BodyFrame for MockBodyFrame {
    fn body_count(&self) -> usize {
        self.bodies.len()
    }

    fn is_tracked(&self, slot: usize) -> Result<bool> {
        let body = self.slot(slot)?;
        if body.fail_tracked_query {
            bail!("tracked query failed for slot {slot}");
        }
        Ok(body.tracked)
    }

    fn joints(&self, slot: usize) -> Result<[Joint; JOINT_COUNT]> {
        self.slot(slot)?;
        Ok(Joint::not_tracked_set())
    }

    fn joint_orientations(&self, slot: usize) -> Result<[JointOrientation; JOINT_COUNT]> {
        let body = self.slot(slot)?;
        if body.fail_orientations {
            bail!("joint orientations unavailable for slot {slot}");
        }

        let mut joints = JointOrientation::identity_set();
        joints[JointType::SpineBase.index()].orientation = body.root;
        // Non-root joints get a recognizable value so consumers that read the
        // wrong joint are caught by tests.
        for joint in joints.iter_mut().skip(1) {
            joint.orientation = Vec4::new(9.0, 9.0, 9.0, 1.0);
        }
        Ok(joints)
    }
}

impl Drop for MockBodyFrame {
    fn drop(&mut self) {
        self.log.record(MockEvent::FrameReleased);
    }
}
