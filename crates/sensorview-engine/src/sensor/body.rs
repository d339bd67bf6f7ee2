use glam::{Vec3, Vec4};

/// Maximum number of body slots reported per frame.
pub const BODY_COUNT: usize = 6;

/// Number of joints per tracked body.
pub const JOINT_COUNT: usize = 25;

/// Skeletal joints in device index order.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
#[repr(usize)]
pub enum JointType {
    SpineBase = 0,
    SpineMid,
    Neck,
    Head,
    ShoulderLeft,
    ElbowLeft,
    WristLeft,
    HandLeft,
    ShoulderRight,
    ElbowRight,
    WristRight,
    HandRight,
    HipLeft,
    KneeLeft,
    AnkleLeft,
    FootLeft,
    HipRight,
    KneeRight,
    AnkleRight,
    FootRight,
    SpineShoulder,
    HandTipLeft,
    ThumbLeft,
    HandTipRight,
    ThumbRight,
}

impl JointType {
    pub const ALL: [JointType; JOINT_COUNT] = [
        JointType::SpineBase,
        JointType::SpineMid,
        JointType::Neck,
        JointType::Head,
        JointType::ShoulderLeft,
        JointType::ElbowLeft,
        JointType::WristLeft,
        JointType::HandLeft,
        JointType::ShoulderRight,
        JointType::ElbowRight,
        JointType::WristRight,
        JointType::HandRight,
        JointType::HipLeft,
        JointType::KneeLeft,
        JointType::AnkleLeft,
        JointType::FootLeft,
        JointType::HipRight,
        JointType::KneeRight,
        JointType::AnkleRight,
        JointType::FootRight,
        JointType::SpineShoulder,
        JointType::HandTipLeft,
        JointType::ThumbLeft,
        JointType::HandTipRight,
        JointType::ThumbRight,
    ];

    #[inline]
    pub const fn index(self) -> usize {
        self as usize
    }
}

/// How confidently the device located a joint.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq, Hash)]
pub enum TrackingState {
    #[default]
    NotTracked,
    Inferred,
    Tracked,
}

/// Camera-space position of one joint, in metres.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Joint {
    pub joint: JointType,
    pub position: Vec3,
    pub tracking_state: TrackingState,
}

impl Joint {
    pub const fn not_tracked(joint: JointType) -> Self {
        Self {
            joint,
            position: Vec3::ZERO,
            tracking_state: TrackingState::NotTracked,
        }
    }

    pub fn not_tracked_set() -> [Joint; JOINT_COUNT] {
        JointType::ALL.map(Joint::not_tracked)
    }
}

/// Orientation of one joint, as a 4-component rotation (`x`, `y`, `z`, `w`).
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct JointOrientation {
    pub joint: JointType,
    pub orientation: Vec4,
}

impl JointOrientation {
    pub const fn identity(joint: JointType) -> Self {
        Self {
            joint,
            orientation: Vec4::new(0.0, 0.0, 0.0, 1.0),
        }
    }

    /// A full joint set with every joint at identity orientation.
    pub fn identity_set() -> [JointOrientation; JOINT_COUNT] {
        JointType::ALL.map(JointOrientation::identity)
    }
}
