//! Generated sensor backend.
//!
//! Delivers frames at a fixed cadence and answers "no frame" in between,
//! which is the same delivery contract a hardware reader has.

use std::time::{Duration, Instant};

use anyhow::{Result, bail};
use glam::{Vec3, Vec4};

use super::body::{BODY_COUNT, JOINT_COUNT, Joint, JointOrientation, JointType, TrackingState};
use super::depth::{DEPTH_HEIGHT, DEPTH_WIDTH};
use super::device::{
    AcquiredFrame, BodyFrame, DepthFrame, FrameReader, FrameSource, Modality, SensorDevice,
    SensorDriver,
};

/// Slot the simulated body occupies. Deliberately not the first slot.
const TRACKED_SLOT: usize = 2;

/// Nearest and farthest simulated distance, in millimetres.
const NEAR_MM: u16 = 500;
const FAR_MM: u16 = 4500;

pub struct SyntheticDriver {
    frame_interval: Duration,
}

/// Time between generated frames, or `None` when the rate is not positive
/// or too small for its period to fit in a `Duration`.
pub fn frame_interval(frame_rate_hz: f32) -> Option<Duration> {
    if !(frame_rate_hz.is_finite() && frame_rate_hz > 0.0) {
        return None;
    }
    Duration::try_from_secs_f32(1.0 / frame_rate_hz).ok()
}

impl SyntheticDriver {
    pub fn new(frame_rate_hz: f32) -> Result<Self> {
        let Some(frame_interval) = frame_interval(frame_rate_hz) else {
            bail!("synthetic frame rate {frame_rate_hz} Hz is out of range");
        };
        Ok(Self { frame_interval })
    }
}

impl SensorDriver for SyntheticDriver {
    fn default_sensor(&self) -> Result<Option<Box<dyn SensorDevice>>> {
        Ok(Some(Box::new(SyntheticSensor {
            frame_interval: self.frame_interval,
            opened_at: None,
        })))
    }
}

struct SyntheticSensor {
    frame_interval: Duration,
    opened_at: Option<Instant>,
}

impl SensorDevice for SyntheticSensor {
    fn name(&self) -> &str {
        "synthetic"
    }

    fn open(&mut self) -> Result<()> {
        self.opened_at = Some(Instant::now());
        Ok(())
    }

    fn close(&mut self) {
        self.opened_at = None;
    }

    fn frame_source(&mut self, modality: Modality) -> Result<Box<dyn FrameSource>> {
        let Some(epoch) = self.opened_at else {
            bail!("device is not open");
        };

        Ok(Box::new(SyntheticSource {
            modality,
            epoch,
            frame_interval: self.frame_interval,
        }))
    }
}

struct SyntheticSource {
    modality: Modality,
    epoch: Instant,
    frame_interval: Duration,
}

impl FrameSource for SyntheticSource {
    fn open_reader(&mut self) -> Result<Box<dyn FrameReader>> {
        Ok(Box::new(SyntheticReader {
            modality: self.modality,
            epoch: self.epoch,
            frame_interval: self.frame_interval,
            last_delivery: None,
        }))
    }
}

struct SyntheticReader {
    modality: Modality,
    epoch: Instant,
    frame_interval: Duration,
    last_delivery: Option<Instant>,
}

impl FrameReader for SyntheticReader {
    fn acquire_latest_frame(&mut self) -> Result<Option<AcquiredFrame>> {
        let now = Instant::now();
        if let Some(last) = self.last_delivery {
            if now.saturating_duration_since(last) < self.frame_interval {
                return Ok(None);
            }
        }
        self.last_delivery = Some(now);

        let t = now.saturating_duration_since(self.epoch).as_secs_f32();
        let frame = match self.modality {
            Modality::Depth => AcquiredFrame::Depth(Box::new(SyntheticDepthFrame {
                samples: depth_rings(t),
            })),
            Modality::Body => AcquiredFrame::Body(Box::new(SyntheticBodyFrame {
                root: swaying_root(t),
            })),
        };
        Ok(Some(frame))
    }
}

struct SyntheticDepthFrame {
    samples: Vec<u16>,
}

impl DepthFrame for SyntheticDepthFrame {
    fn underlying_buffer(&self) -> Result<&[u16]> {
        Ok(&self.samples)
    }
}

struct SyntheticBodyFrame {
    root: Vec4,
}

impl BodyFrame for SyntheticBodyFrame {
    fn body_count(&self) -> usize {
        BODY_COUNT
    }

    fn is_tracked(&self, slot: usize) -> Result<bool> {
        if slot >= BODY_COUNT {
            bail!("body slot {slot} out of range");
        }
        Ok(slot == TRACKED_SLOT)
    }

    fn joints(&self, slot: usize) -> Result<[Joint; JOINT_COUNT]> {
        if slot != TRACKED_SLOT {
            bail!("body slot {slot} is not tracked");
        }
        Ok(JointType::ALL.map(|joint| Joint {
            joint,
            position: standing_pose(joint),
            tracking_state: match joint {
                JointType::HandTipLeft
                | JointType::ThumbLeft
                | JointType::HandTipRight
                | JointType::ThumbRight => TrackingState::Inferred,
                _ => TrackingState::Tracked,
            },
        }))
    }

    fn joint_orientations(&self, slot: usize) -> Result<[JointOrientation; JOINT_COUNT]> {
        if slot != TRACKED_SLOT {
            bail!("body slot {slot} is not tracked");
        }
        let mut joints = JointOrientation::identity_set();
        joints[JointType::SpineBase.index()].orientation = self.root;
        Ok(joints)
    }
}

/// Concentric rings drifting outward over time.
///
/// The outermost border is left at `0` to mimic pixels with no return.
fn depth_rings(t: f32) -> Vec<u16> {
    let cx = DEPTH_WIDTH as f32 * 0.5;
    let cy = DEPTH_HEIGHT as f32 * 0.5;
    let span = (FAR_MM - NEAR_MM) as f32;
    let phase = t * 400.0;

    let mut samples = Vec::with_capacity(DEPTH_WIDTH * DEPTH_HEIGHT);
    for y in 0..DEPTH_HEIGHT {
        for x in 0..DEPTH_WIDTH {
            if x == 0 || y == 0 || x == DEPTH_WIDTH - 1 || y == DEPTH_HEIGHT - 1 {
                samples.push(0);
                continue;
            }
            let r = ((x as f32 - cx).powi(2) + (y as f32 - cy).powi(2)).sqrt();
            let d = (r * 12.0 + phase).rem_euclid(span);
            samples.push(NEAR_MM + d as u16);
        }
    }
    samples
}

/// Joint positions of a person standing 2 m in front of the sensor.
fn standing_pose(joint: JointType) -> Vec3 {
    use JointType::*;

    let (x, y) = match joint {
        SpineBase => (0.0, -0.1),
        SpineMid => (0.0, 0.2),
        SpineShoulder => (0.0, 0.45),
        Neck => (0.0, 0.5),
        Head => (0.0, 0.65),
        ShoulderLeft => (-0.2, 0.4),
        ElbowLeft => (-0.3, 0.15),
        WristLeft => (-0.35, -0.05),
        HandLeft => (-0.36, -0.12),
        HandTipLeft => (-0.37, -0.2),
        ThumbLeft => (-0.32, -0.12),
        ShoulderRight => (0.2, 0.4),
        ElbowRight => (0.3, 0.15),
        WristRight => (0.35, -0.05),
        HandRight => (0.36, -0.12),
        HandTipRight => (0.37, -0.2),
        ThumbRight => (0.32, -0.12),
        HipLeft => (-0.1, -0.15),
        KneeLeft => (-0.1, -0.55),
        AnkleLeft => (-0.1, -0.9),
        FootLeft => (-0.1, -0.95),
        HipRight => (0.1, -0.15),
        KneeRight => (0.1, -0.55),
        AnkleRight => (0.1, -0.9),
        FootRight => (0.1, -0.95),
    };
    Vec3::new(x, y, 2.0)
}

/// Root orientation components for a body turning slowly in place.
fn swaying_root(t: f32) -> Vec4 {
    Vec4::new((t * 0.9).sin() * 0.35, t * 0.6, (t * 0.5).cos() * 0.15, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn open_reader(modality: Modality, hz: f32) -> Box<dyn FrameReader> {
        let driver = SyntheticDriver::new(hz).unwrap();
        let mut device = driver.default_sensor().unwrap().unwrap();
        device.open().unwrap();
        device.frame_source(modality).unwrap().open_reader().unwrap()
    }

    #[test]
    fn first_poll_delivers_then_pending_until_interval() {
        let mut reader = open_reader(Modality::Depth, 1.0);
        assert!(reader.acquire_latest_frame().unwrap().is_some());
        assert!(reader.acquire_latest_frame().unwrap().is_none());
    }

    #[test]
    fn depth_frame_is_full_raster_with_zero_border() {
        let mut reader = open_reader(Modality::Depth, 30.0);
        let Some(AcquiredFrame::Depth(frame)) = reader.acquire_latest_frame().unwrap() else {
            panic!("expected a depth frame");
        };
        let samples = frame.underlying_buffer().unwrap();
        assert_eq!(samples.len(), DEPTH_WIDTH * DEPTH_HEIGHT);
        assert_eq!(samples[0], 0);
        let centre = samples[(DEPTH_HEIGHT / 2) * DEPTH_WIDTH + DEPTH_WIDTH / 2];
        assert!((NEAR_MM..FAR_MM).contains(&centre));
    }

    #[test]
    fn body_frame_tracks_one_non_first_slot() {
        let mut reader = open_reader(Modality::Body, 30.0);
        let Some(AcquiredFrame::Body(frame)) = reader.acquire_latest_frame().unwrap() else {
            panic!("expected a body frame");
        };
        let tracked: Vec<usize> = (0..frame.body_count())
            .filter(|&slot| frame.is_tracked(slot).unwrap())
            .collect();
        assert_eq!(tracked, vec![TRACKED_SLOT]);

        let joints = frame.joints(TRACKED_SLOT).unwrap();
        assert_eq!(joints[JointType::Head.index()].tracking_state, TrackingState::Tracked);
        assert!(joints[JointType::Head.index()].position.y > joints[JointType::SpineBase.index()].position.y);
        assert!(frame.joints(0).is_err());
    }

    #[test]
    fn source_requires_open_device() {
        let driver = SyntheticDriver::new(30.0).unwrap();
        let mut device = driver.default_sensor().unwrap().unwrap();
        assert!(device.frame_source(Modality::Depth).is_err());
    }

    #[test]
    fn rates_without_a_representable_period_are_rejected() {
        assert!(frame_interval(1e-20).is_none());
        assert!(frame_interval(0.0).is_none());
        assert!(frame_interval(-5.0).is_none());
        assert!(frame_interval(f32::NAN).is_none());
        assert!(SyntheticDriver::new(1e-20).is_err());

        assert_eq!(frame_interval(4.0), Some(Duration::from_millis(250)));
        let mut reader = open_reader(Modality::Depth, 0.001);
        assert!(reader.acquire_latest_frame().unwrap().is_some());
    }
}
