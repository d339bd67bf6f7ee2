use glam::{EulerRot, Mat4, Vec3, Vec4};

/// Body orientation as Euler angles, in radians.
#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub struct Rotation {
    pub pitch: f32,
    pub yaw: f32,
    pub roll: f32,
}

impl Rotation {
    /// Zero pitch/yaw/roll: the "no body tracked" pose.
    pub const IDENTITY: Rotation = Rotation {
        pitch: 0.0,
        yaw: 0.0,
        roll: 0.0,
    };

    /// Maps a root-joint orientation to pitch/yaw/roll.
    ///
    /// The `x`, `y`, `z` components drive pitch, yaw and roll directly; `w` is
    /// ignored. The indicator reacts to the body turning without needing a
    /// normalized quaternion from the device.
    pub fn from_root_orientation(orientation: Vec4) -> Self {
        Self {
            pitch: orientation.x,
            yaw: orientation.y,
            roll: orientation.z,
        }
    }

    /// Roll about Z, then pitch about X, then yaw about Y.
    pub fn matrix(self) -> Mat4 {
        Mat4::from_euler(EulerRot::YXZ, self.yaw, self.pitch, self.roll)
    }
}

/// Fixed left-handed camera.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct CameraConfig {
    pub eye: Vec3,
    pub target: Vec3,
    pub up: Vec3,
    pub fov_y_degrees: f32,
    pub near: f32,
    pub far: f32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            eye: Vec3::new(0.0, 0.0, -3.0),
            target: Vec3::new(0.0, 0.0, 5.0),
            up: Vec3::Y,
            fov_y_degrees: 50.0,
            near: 0.01,
            far: 1000.0,
        }
    }
}

impl CameraConfig {
    pub fn view(&self) -> Mat4 {
        Mat4::look_at_lh(self.eye, self.target, self.up)
    }

    pub fn projection(&self, aspect_ratio: f32) -> Mat4 {
        Mat4::perspective_lh(
            self.fov_y_degrees.to_radians(),
            aspect_ratio,
            self.near,
            self.far,
        )
    }
}

/// Composed world/view/projection for one frame.
///
/// Matrices are stored in glam's column-vector convention. The row-vector
/// product `world * view * projection` equals the transpose of
/// `projection * view * world` here, so transposing it back for upload yields
/// exactly [`column_major`](Self::column_major).
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct TransformState {
    pub world: Mat4,
    pub view: Mat4,
    pub projection: Mat4,
}

impl TransformState {
    pub fn compose(rotation: Rotation, camera: &CameraConfig, aspect_ratio: f32) -> Self {
        Self {
            world: rotation.matrix(),
            view: camera.view(),
            projection: camera.projection(aspect_ratio),
        }
    }

    /// `world * view * projection` in row-vector convention.
    pub fn world_view_projection(&self) -> Mat4 {
        (self.projection * self.view * self.world).transpose()
    }

    /// The transposed product, as the shader consumes it.
    pub fn column_major(&self) -> Mat4 {
        self.world_view_projection().transpose()
    }

    /// 64-byte constant-buffer payload.
    pub fn to_uniform(&self) -> TransformUniform {
        TransformUniform {
            wvp: self.column_major().to_cols_array_2d(),
        }
    }
}

#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct TransformUniform {
    pub wvp: [[f32; 4]; 4],
}
