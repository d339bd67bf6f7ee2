use crate::error::{Error, Result};
use crate::sensor::{AcquiredFrame, Modality};

use super::decode::{decode_depth, decode_root_orientation};
use super::sink::{DrawCall, RenderSink};
use super::transform::{CameraConfig, Rotation, TransformState};

/// One way of turning sensor frames into render state.
///
/// The frame loop owns exactly one variant, chosen at startup.
pub trait Variant {
    fn modality(&self) -> Modality;

    /// Decodes `frame` and uploads the result. The frame is released when this
    /// returns, on success and on error alike.
    fn consume(&mut self, frame: AcquiredFrame, sink: &mut dyn RenderSink) -> Result<()>;

    /// Seeds the GPU state the draw reads before any frame has arrived.
    fn begin(&mut self, sink: &mut dyn RenderSink) -> Result<()> {
        let _ = sink;
        Ok(())
    }

    /// Refreshes size-dependent GPU state after the surface changed size.
    fn resized(&mut self, sink: &mut dyn RenderSink) -> Result<()> {
        let _ = sink;
        Ok(())
    }

    fn draw_call(&self) -> DrawCall;

    /// Whether to redraw on ticks where no new frame arrived.
    fn redraw_when_stale(&self) -> bool;
}

fn unexpected(expected: Modality, frame: &AcquiredFrame) -> Error {
    Error::AcquisitionFailed(format!(
        "{expected} reader delivered a {} frame",
        frame.modality()
    ))
}

/// Raw depth map on a full-screen quad.
#[derive(Debug, Default)]
pub struct DepthVariant;

impl DepthVariant {
    pub fn new() -> Self {
        Self
    }
}

impl Variant for DepthVariant {
    fn modality(&self) -> Modality {
        Modality::Depth
    }

    fn consume(&mut self, frame: AcquiredFrame, sink: &mut dyn RenderSink) -> Result<()> {
        let AcquiredFrame::Depth(depth) = &frame else {
            return Err(unexpected(Modality::Depth, &frame));
        };
        let grid = decode_depth(depth.as_ref())?;
        sink.upload_depth(&grid)
    }

    fn draw_call(&self) -> DrawCall {
        DrawCall::DepthQuad
    }

    fn redraw_when_stale(&self) -> bool {
        false
    }
}

/// Pyramid rotated by the first tracked body's root joint.
#[derive(Debug)]
pub struct BodyVariant {
    camera: CameraConfig,
    rotation: Rotation,
    /// Aspect ratio of the last uploaded transform, if any.
    uploaded_aspect: Option<f32>,
}

impl BodyVariant {
    pub fn new(camera: CameraConfig) -> Self {
        Self {
            camera,
            rotation: Rotation::IDENTITY,
            uploaded_aspect: None,
        }
    }

    pub fn rotation(&self) -> Rotation {
        self.rotation
    }

    fn upload(&mut self, sink: &mut dyn RenderSink) -> Result<()> {
        let aspect = sink.aspect_ratio();
        let state = TransformState::compose(self.rotation, &self.camera, aspect);
        sink.upload_transform(&state)?;
        self.uploaded_aspect = Some(aspect);
        Ok(())
    }
}

impl Variant for BodyVariant {
    fn modality(&self) -> Modality {
        Modality::Body
    }

    fn consume(&mut self, frame: AcquiredFrame, sink: &mut dyn RenderSink) -> Result<()> {
        let AcquiredFrame::Body(body) = &frame else {
            return Err(unexpected(Modality::Body, &frame));
        };

        self.rotation = match decode_root_orientation(body.as_ref())? {
            Some(root) => Rotation::from_root_orientation(root),
            None => Rotation::IDENTITY,
        };
        drop(frame);

        self.upload(sink)
    }

    fn begin(&mut self, sink: &mut dyn RenderSink) -> Result<()> {
        self.rotation = Rotation::IDENTITY;
        self.upload(sink)
    }

    fn resized(&mut self, sink: &mut dyn RenderSink) -> Result<()> {
        // Projection only; the rotation stays whatever the last frame set.
        if self.uploaded_aspect == Some(sink.aspect_ratio()) {
            return Ok(());
        }
        self.upload(sink)
    }

    fn draw_call(&self) -> DrawCall {
        DrawCall::BodyPyramid
    }

    fn redraw_when_stale(&self) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use glam::Vec4;

    use super::*;
    use crate::pipeline::sink::recording::RecordingSink;
    use crate::sensor::mock::{MockBody, MockDriver, MockPoll};
    use crate::sensor::{DEPTH_HEIGHT, DEPTH_WIDTH, FramePoll, SensorSession};

    fn frame_from(poll: MockPoll, modality: Modality) -> (MockDriver, AcquiredFrame) {
        let driver = MockDriver::new().script([poll]);
        let mut session = SensorSession::open(&driver, modality).unwrap();
        let FramePoll::Frame(frame) = session.try_acquire_latest_frame().unwrap() else {
            panic!("script delivers a frame");
        };
        (driver, frame)
    }

    #[test]
    fn depth_consume_uploads_once_and_releases() {
        let (driver, frame) = frame_from(
            MockPoll::Depth(vec![3; DEPTH_WIDTH * DEPTH_HEIGHT]),
            Modality::Depth,
        );
        let mut sink = RecordingSink::new();
        DepthVariant::new().consume(frame, &mut sink).unwrap();

        assert_eq!(sink.depth_uploads, 1);
        assert_eq!(driver.log().frames_released(), 1);
    }

    #[test]
    fn depth_variant_rejects_body_frame_and_releases_it() {
        let (driver, frame) = frame_from(MockPoll::Body(vec![]), Modality::Body);
        let mut sink = RecordingSink::new();
        let err = DepthVariant::new().consume(frame, &mut sink).err().unwrap();

        assert_eq!(err.code(), "AcquisitionFailed");
        assert_eq!(sink.gpu_touches(), 0);
        assert_eq!(driver.log().frames_released(), 1);
    }

    #[test]
    fn untracked_frame_resets_to_identity() {
        let mut variant = BodyVariant::new(CameraConfig::default());
        let mut sink = RecordingSink::new();

        let (_d1, frame) = frame_from(
            MockPoll::Body(vec![MockBody::tracked(Vec4::new(0.4, 0.5, 0.6, 1.0))]),
            Modality::Body,
        );
        variant.consume(frame, &mut sink).unwrap();
        assert_ne!(variant.rotation(), Rotation::IDENTITY);

        let (_d2, frame) = frame_from(MockPoll::Body(vec![MockBody::untracked(); 6]), Modality::Body);
        variant.consume(frame, &mut sink).unwrap();
        assert_eq!(variant.rotation(), Rotation::IDENTITY);
        assert_eq!(sink.transforms.last().unwrap().world, glam::Mat4::IDENTITY);
    }

    #[test]
    fn rotation_depends_only_on_first_tracked_root() {
        let root = Vec4::new(0.2, -0.3, 0.1, 1.0);
        let scenarios = [
            vec![MockBody::tracked(root)],
            vec![MockBody::tracked(root), MockBody::tracked(Vec4::ONE)],
            vec![
                MockBody::untracked(),
                MockBody::untracked(),
                MockBody::tracked(root),
                MockBody::tracked(Vec4::new(3.0, 2.0, 1.0, 0.0)),
            ],
        ];

        let mut results = Vec::new();
        for bodies in scenarios {
            let mut variant = BodyVariant::new(CameraConfig::default());
            let mut sink = RecordingSink::new();
            let (_driver, frame) = frame_from(MockPoll::Body(bodies), Modality::Body);
            variant.consume(frame, &mut sink).unwrap();
            results.push(sink.transforms[0]);
        }

        assert!(results.windows(2).all(|w| w[0] == w[1]));
        assert_eq!(results[0].world, Rotation::from_root_orientation(root).matrix());
    }

    #[test]
    fn failed_body_query_releases_frame_without_upload() {
        let (driver, frame) = frame_from(
            MockPoll::Body(vec![MockBody::tracked(Vec4::W).failing_orientations()]),
            Modality::Body,
        );
        let mut variant = BodyVariant::new(CameraConfig::default());
        let mut sink = RecordingSink::new();

        assert!(variant.consume(frame, &mut sink).is_err());
        assert_eq!(sink.gpu_touches(), 0);
        assert_eq!(driver.log().frames_acquired(), 1);
        assert_eq!(driver.log().frames_released(), 1);
    }

    #[test]
    fn begin_seeds_identity_transform() {
        let mut variant = BodyVariant::new(CameraConfig::default());
        let mut sink = RecordingSink::new();

        variant.begin(&mut sink).unwrap();
        assert_eq!(sink.transforms.len(), 1);
        assert_eq!(sink.transforms[0].world, glam::Mat4::IDENTITY);
        assert_eq!(sink.depth_uploads, 0);

        let mut depth_sink = RecordingSink::new();
        DepthVariant::new().begin(&mut depth_sink).unwrap();
        assert_eq!(depth_sink.gpu_touches(), 0);
    }

    #[test]
    fn resize_reuploads_only_on_aspect_change() {
        let mut variant = BodyVariant::new(CameraConfig::default());
        let mut sink = RecordingSink::new();
        variant.begin(&mut sink).unwrap();

        variant.resized(&mut sink).unwrap();
        assert_eq!(sink.transforms.len(), 1);

        let (_driver, frame) = frame_from(
            MockPoll::Body(vec![MockBody::tracked(Vec4::new(0.4, 0.5, 0.6, 1.0))]),
            Modality::Body,
        );
        variant.consume(frame, &mut sink).unwrap();
        let rotated = sink.transforms[1].world;

        sink.aspect = 4.0 / 3.0;
        variant.resized(&mut sink).unwrap();
        assert_eq!(sink.transforms.len(), 3);
        assert_eq!(sink.transforms[2].world, rotated);
        assert_ne!(sink.transforms[2].projection, sink.transforms[1].projection);
    }
}
