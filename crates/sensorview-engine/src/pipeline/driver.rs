use std::time::Duration;

use crate::error::{Error, Result};
use crate::sensor::{FramePoll, SensorSession};

use super::sink::RenderSink;
use super::stats::{LoopStats, ThroughputMeter};
use super::variant::Variant;

const REPORT_WINDOW: Duration = Duration::from_secs(5);

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum StepOutcome {
    /// A frame was decoded and uploaded.
    Updated,
    /// Nothing new from the sensor; GPU state untouched.
    NoFrameReady,
}

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum TickOutcome {
    Drawn,
    Skipped,
}

/// Drives acquire -> decode -> upload -> draw, once per idle tick.
///
/// Owns the sensor session; GPU access goes through the [`RenderSink`] passed
/// to each call, so the loop itself holds no GPU handles.
pub struct FrameLoop {
    session: SensorSession,
    variant: Box<dyn Variant>,
    stats: LoopStats,
    meter: ThroughputMeter,
}

impl FrameLoop {
    pub fn new(session: SensorSession, variant: Box<dyn Variant>) -> Result<Self> {
        if session.modality() != variant.modality() {
            return Err(Error::SourceUnavailable(format!(
                "session reads {} frames but the {} variant is configured",
                session.modality(),
                variant.modality()
            )));
        }

        Ok(Self {
            session,
            variant,
            stats: LoopStats::default(),
            meter: ThroughputMeter::new(REPORT_WINDOW),
        })
    }

    pub fn stats(&self) -> LoopStats {
        self.stats
    }

    /// Seeds GPU state before the first tick. Polls nothing.
    pub fn begin(&mut self, sink: &mut dyn RenderSink) -> Result<()> {
        self.variant.begin(sink)
    }

    /// Host resize notification. Polls nothing.
    pub fn resized(&mut self, sink: &mut dyn RenderSink) -> Result<()> {
        self.variant.resized(sink)
    }

    /// Acquire, decode, upload.
    pub fn step(&mut self, sink: &mut dyn RenderSink) -> Result<StepOutcome> {
        self.stats.polls += 1;

        match self.session.try_acquire_latest_frame()? {
            FramePoll::NoFrameReady => {
                self.stats.stale_polls += 1;
                Ok(StepOutcome::NoFrameReady)
            }
            FramePoll::Frame(frame) => {
                self.stats.frames += 1;
                self.variant.consume(frame, sink)?;
                Ok(StepOutcome::Updated)
            }
        }
    }

    /// Bind, draw, present.
    pub fn draw(&mut self, sink: &mut dyn RenderSink) -> Result<()> {
        sink.draw(self.variant.draw_call())?;
        self.stats.draws += 1;
        Ok(())
    }

    /// One render tick: `step`, then `draw` unless the variant has nothing new to show.
    pub fn tick(&mut self, sink: &mut dyn RenderSink) -> Result<TickOutcome> {
        let step = self.step(sink)?;

        let outcome = if step == StepOutcome::NoFrameReady && !self.variant.redraw_when_stale() {
            TickOutcome::Skipped
        } else {
            self.draw(sink)?;
            TickOutcome::Drawn
        };

        if let Some(t) = self.meter.sample(&self.stats) {
            log::debug!(
                "{} sensor: {:.1} frames/s, {:.1} draws/s",
                self.session.modality(),
                t.sensor_fps,
                t.draw_fps
            );
        }

        Ok(outcome)
    }

    /// Closes the sensor session and returns the final counters.
    pub fn shutdown(mut self) -> LoopStats {
        self.session.close();
        let s = self.stats;
        log::info!(
            "frame loop stopped: {} polls, {} frames, {} stale, {} draws",
            s.polls,
            s.frames,
            s.stale_polls,
            s.draws
        );
        s
    }
}

#[cfg(test)]
mod tests {
    use glam::Vec4;

    use super::*;
    use crate::pipeline::sink::DrawCall;
    use crate::pipeline::sink::recording::RecordingSink;
    use crate::pipeline::transform::CameraConfig;
    use crate::pipeline::variant::{BodyVariant, DepthVariant};
    use crate::sensor::mock::{MockBody, MockDriver, MockEvent, MockPoll};
    use crate::sensor::{DEPTH_HEIGHT, DEPTH_WIDTH, Modality};

    fn depth_loop(driver: &MockDriver) -> FrameLoop {
        let session = SensorSession::open(driver, Modality::Depth).unwrap();
        FrameLoop::new(session, Box::new(DepthVariant::new())).unwrap()
    }

    fn body_loop(driver: &MockDriver) -> FrameLoop {
        let session = SensorSession::open(driver, Modality::Body).unwrap();
        FrameLoop::new(session, Box::new(BodyVariant::new(CameraConfig::default()))).unwrap()
    }

    fn full_depth(value: u16) -> MockPoll {
        MockPoll::Depth(vec![value; DEPTH_WIDTH * DEPTH_HEIGHT])
    }

    #[test]
    fn idle_polls_never_touch_gpu_or_draw() {
        let driver = MockDriver::new();
        let mut frame_loop = depth_loop(&driver);
        let mut sink = RecordingSink::new();

        for _ in 0..100 {
            assert_eq!(frame_loop.tick(&mut sink).unwrap(), TickOutcome::Skipped);
        }

        assert_eq!(sink.gpu_touches(), 0);
        assert!(sink.draws.is_empty());
        assert_eq!(driver.log().polls(), 100);

        let stats = frame_loop.shutdown();
        assert_eq!(stats.polls, 100);
        assert_eq!(stats.stale_polls, 100);
        assert_eq!(stats.draws, 0);
        assert_eq!(driver.log().count(MockEvent::DeviceClosed), 1);
    }

    #[test]
    fn depth_frame_uploads_then_draws_quad() {
        const V: u16 = 2345;
        let driver = MockDriver::new().script([full_depth(V)]);
        let mut frame_loop = depth_loop(&driver);
        let mut sink = RecordingSink::new();

        assert_eq!(frame_loop.tick(&mut sink).unwrap(), TickOutcome::Drawn);
        assert_eq!(sink.depth_uploads, 1);
        assert_eq!(sink.draws, vec![DrawCall::DepthQuad]);

        for y in [0, 1, DEPTH_HEIGHT - 1] {
            let row = sink.depth.row(y);
            assert_eq!(row.len(), DEPTH_WIDTH * 2);
            assert!(
                row.chunks_exact(2).all(|c| u16::from_ne_bytes([c[0], c[1]]) == V),
                "row {y} does not hold {V}"
            );
        }
    }

    #[test]
    fn body_variant_keeps_drawing_last_transform_when_stale() {
        let root = Vec4::new(0.3, 0.2, 0.1, 1.0);
        let driver = MockDriver::new().script([MockPoll::Body(vec![MockBody::tracked(root)])]);
        let mut frame_loop = body_loop(&driver);
        let mut sink = RecordingSink::new();

        for _ in 0..5 {
            assert_eq!(frame_loop.tick(&mut sink).unwrap(), TickOutcome::Drawn);
        }

        assert_eq!(sink.transforms.len(), 1);
        assert_eq!(sink.draws, vec![DrawCall::BodyPyramid; 5]);
    }

    #[test]
    fn idle_body_ticks_redraw_without_touching_gpu() {
        let driver = MockDriver::new();
        let mut frame_loop = body_loop(&driver);
        let mut sink = RecordingSink::new();

        frame_loop.begin(&mut sink).unwrap();
        assert_eq!(sink.transforms.len(), 1);
        assert_eq!(driver.log().polls(), 0);

        let seeded = sink.gpu_touches();
        for _ in 0..100 {
            assert_eq!(frame_loop.tick(&mut sink).unwrap(), TickOutcome::Drawn);
        }

        assert_eq!(sink.gpu_touches(), seeded);
        assert_eq!(sink.draws.len(), 100);
        assert_eq!(driver.log().polls(), 100);
        assert_eq!(frame_loop.stats().stale_polls, 100);
    }

    #[test]
    fn unseeded_body_loop_uploads_nothing_while_idle() {
        let driver = MockDriver::new();
        let mut frame_loop = body_loop(&driver);
        let mut sink = RecordingSink::new();

        for _ in 0..100 {
            frame_loop.tick(&mut sink).unwrap();
        }

        assert_eq!(sink.gpu_touches(), 0);
        assert_eq!(sink.draws.len(), 100);
    }

    #[test]
    fn resize_refreshes_projection_without_polling() {
        let driver = MockDriver::new();
        let mut frame_loop = body_loop(&driver);
        let mut sink = RecordingSink::new();
        frame_loop.begin(&mut sink).unwrap();

        sink.aspect = 1.0;
        frame_loop.resized(&mut sink).unwrap();

        assert_eq!(sink.transforms.len(), 2);
        assert_eq!(driver.log().polls(), 0);
        assert_eq!(frame_loop.stats().polls, 0);
        assert!(sink.draws.is_empty());
    }

    #[test]
    fn every_acquired_frame_is_released_once() {
        let driver = MockDriver::new().script([
            full_depth(1),
            MockPoll::Pending,
            full_depth(2),
            MockPoll::DepthUnavailable,
        ]);
        let mut frame_loop = depth_loop(&driver);
        let mut sink = RecordingSink::new();

        assert!(frame_loop.tick(&mut sink).is_ok());
        assert!(frame_loop.tick(&mut sink).is_ok());
        assert!(frame_loop.tick(&mut sink).is_ok());
        let err = frame_loop.tick(&mut sink).err().unwrap();
        assert_eq!(err.code(), "BufferUnavailable");

        let log = driver.log();
        assert_eq!(log.frames_acquired(), 3);
        assert_eq!(log.frames_released(), 3);
        assert_eq!(sink.depth_uploads, 2);
    }

    #[test]
    fn acquisition_failure_aborts_tick() {
        let driver = MockDriver::new().script([MockPoll::Fail("sensor unplugged".into())]);
        let mut frame_loop = depth_loop(&driver);
        let mut sink = RecordingSink::new();

        let err = frame_loop.tick(&mut sink).err().unwrap();
        assert_eq!(err.code(), "AcquisitionFailed");
        assert!(sink.draws.is_empty());
    }

    #[test]
    fn draw_failure_propagates() {
        let driver = MockDriver::new().script([full_depth(9)]);
        let mut frame_loop = depth_loop(&driver);
        let mut sink = RecordingSink::new();
        sink.fail_draw = true;

        assert_eq!(frame_loop.tick(&mut sink).err().unwrap().code(), "GpuCallFailed");
        assert_eq!(frame_loop.stats().draws, 0);
    }

    #[test]
    fn mismatched_variant_is_rejected() {
        let driver = MockDriver::new();
        let session = SensorSession::open(&driver, Modality::Body).unwrap();
        let err = FrameLoop::new(session, Box::new(DepthVariant::new())).err().unwrap();
        assert_eq!(err.code(), "SourceUnavailable");
        assert_eq!(driver.log().count(MockEvent::DeviceClosed), 1);
    }
}
