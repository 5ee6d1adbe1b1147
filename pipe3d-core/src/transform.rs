/// 3D transformation matrices, camera state and movement commands
use log::{debug, trace};
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::matrix::Matrix;
use crate::projection::DisplayType;
use crate::vector::Vector3D;

/// Translation step for movement commands, in world units
pub const DEFAULT_MOVE_STEP: f64 = 0.05;
/// Rotation step for RotateLeft/RotateRight, in degrees
pub const DEFAULT_ROTATE_STEP_DEGREES: f64 = 2.0;
const MAX_PITCH_DEGREES: f64 = 89.0;

/// How the view matrix is derived
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum CameraType {
    /// Closed form from yaw and pitch
    #[default]
    Orbit,
    /// Look-at a target, inverted with the general LU inverse
    PointAt,
}

/// Caller-issued camera movement, applied between pipeline runs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CameraCommand {
    Up,
    Down,
    Left,
    Right,
    MoveForward,
    MoveBack,
    RotateLeft,
    RotateRight,
    PitchUp,
    PitchDown,
}

/// Orthonormal camera axes in world space
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraBasis {
    pub right: Vector3D,
    pub up: Vector3D,
    pub forward: Vector3D,
}

/// Camera and world transform state.
///
/// Angles are in degrees. The camera frame is left-handed: x right, y up,
/// z forward.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Transform {
    pub position: Vector3D,
    pub target: Vector3D,
    /// Up axis; for `PointAt` this is the hint the basis is built from
    pub up: Vector3D,
    pub right: Vector3D,
    pub forward: Vector3D,
    pub pitch: f64,
    pub yaw: f64,
    pub translation: Vector3D,
    pub rotation: Vector3D,
    pub scale: Vector3D,
    pub camera_type: CameraType,
    pub display_type: DisplayType,
    pub move_step: f64,
    pub rotate_step: f64,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            position: Vector3D::ZERO,
            target: Vector3D::UNIT_Z,
            up: Vector3D::UNIT_Y,
            right: Vector3D::UNIT_X,
            forward: Vector3D::UNIT_Z,
            pitch: 0.0,
            yaw: 0.0,
            translation: Vector3D::ZERO,
            rotation: Vector3D::ZERO,
            scale: Vector3D::new(1.0, 1.0, 1.0),
            camera_type: CameraType::Orbit,
            display_type: DisplayType::Perspective,
            move_step: DEFAULT_MOVE_STEP,
            rotate_step: DEFAULT_ROTATE_STEP_DEGREES,
        }
    }
}

impl Transform {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn rotate_x(degrees: f64) -> Matrix {
        let (s, c) = degrees.to_radians().sin_cos();
        Matrix::from_rows(&[
            [1.0, 0.0, 0.0, 0.0],
            [0.0, c, s, 0.0],
            [0.0, -s, c, 0.0],
            [0.0, 0.0, 0.0, 1.0],
        ])
    }

    pub fn rotate_y(degrees: f64) -> Matrix {
        let (s, c) = degrees.to_radians().sin_cos();
        Matrix::from_rows(&[
            [c, 0.0, -s, 0.0],
            [0.0, 1.0, 0.0, 0.0],
            [s, 0.0, c, 0.0],
            [0.0, 0.0, 0.0, 1.0],
        ])
    }

    pub fn rotate_z(degrees: f64) -> Matrix {
        let (s, c) = degrees.to_radians().sin_cos();
        Matrix::from_rows(&[
            [c, s, 0.0, 0.0],
            [-s, c, 0.0, 0.0],
            [0.0, 0.0, 1.0, 0.0],
            [0.0, 0.0, 0.0, 1.0],
        ])
    }

    /// Create a rotation matrix from per-axis angles in degrees
    pub fn rotation_matrix(rotation: &Vector3D) -> Result<Matrix> {
        let rx = Self::rotate_x(rotation.x);
        let ry = Self::rotate_y(rotation.y);
        let rz = Self::rotate_z(rotation.z);

        // Apply rotations in order: Z, Y, X
        rz.multiply(&ry)?.multiply(&rx)
    }

    pub fn translation_matrix(x: f64, y: f64, z: f64) -> Matrix {
        Matrix::from_rows(&[
            [1.0, 0.0, 0.0, 0.0],
            [0.0, 1.0, 0.0, 0.0],
            [0.0, 0.0, 1.0, 0.0],
            [x, y, z, 1.0],
        ])
    }

    pub fn scale_matrix(sx: f64, sy: f64, sz: f64) -> Matrix {
        Matrix::from_rows(&[
            [sx, 0.0, 0.0, 0.0],
            [0.0, sy, 0.0, 0.0],
            [0.0, 0.0, sz, 0.0],
            [0.0, 0.0, 0.0, 1.0],
        ])
    }

    /// Scale · (RotateZ · RotateY · RotateX) · Translate
    pub fn model_matrix(&self) -> Result<Matrix> {
        let scale = Self::scale_matrix(self.scale.x, self.scale.y, self.scale.z);
        let rotation = Self::rotation_matrix(&self.rotation)?;
        let translation =
            Self::translation_matrix(self.translation.x, self.translation.y, self.translation.z);
        scale.multiply(&rotation)?.multiply(&translation)
    }

    /// Camera axes for a yaw/pitch pair in degrees
    pub fn orbit_basis(yaw: f64, pitch: f64) -> CameraBasis {
        let (sy, cy) = yaw.to_radians().sin_cos();
        let (sp, cp) = pitch.to_radians().sin_cos();
        CameraBasis {
            right: Vector3D::new(cy, 0.0, -sy),
            up: Vector3D::new(sy * sp, cp, cy * sp),
            forward: Vector3D::new(sy * cp, -sp, cp * cy),
        }
    }

    /// Camera axes facing `target`.
    ///
    /// Degenerate when `target == position` or `up` is parallel to the view
    /// direction; the result then contains NaN.
    pub fn point_at_basis(position: Vector3D, target: Vector3D, up: Vector3D) -> CameraBasis {
        let forward = (target - position).normalize();
        let right = up.cross(forward).normalize();
        let up = forward.cross(right);
        CameraBasis { right, up, forward }
    }

    pub fn camera_basis(&self) -> CameraBasis {
        match self.camera_type {
            CameraType::Orbit => Self::orbit_basis(self.yaw, self.pitch),
            CameraType::PointAt => Self::point_at_basis(self.position, self.target, self.up),
        }
    }

    /// Store the active camera's axes on `right`/`up`/`forward`.
    ///
    /// `PointAt` keeps `up` as given, since it is the input hint.
    pub fn refresh_basis(&mut self) {
        let basis = self.camera_basis();
        self.right = basis.right;
        self.forward = basis.forward;
        if self.camera_type == CameraType::Orbit {
            self.up = basis.up;
        }
    }

    /// Rigid inverse of the orbit camera without the general inverse
    pub fn orbit_view_matrix(&self) -> Matrix {
        let CameraBasis { right, up, forward } = Self::orbit_basis(self.yaw, self.pitch);
        let p = self.position;
        Matrix::from_rows(&[
            [right.x, up.x, forward.x, 0.0],
            [right.y, up.y, forward.y, 0.0],
            [right.z, up.z, forward.z, 0.0],
            [-right.dot(p), -up.dot(p), -forward.dot(p), 1.0],
        ])
    }

    /// Camera-to-world matrix of the look-at camera
    pub fn point_at_matrix(&self) -> Matrix {
        let CameraBasis { right, up, forward } =
            Self::point_at_basis(self.position, self.target, self.up);
        let p = self.position;
        Matrix::from_rows(&[
            [right.x, right.y, right.z, 0.0],
            [up.x, up.y, up.z, 0.0],
            [forward.x, forward.y, forward.z, 0.0],
            [p.x, p.y, p.z, 1.0],
        ])
    }

    pub fn point_at_view_matrix(&self) -> Result<Matrix> {
        self.point_at_matrix().inverse()
    }

    /// World-to-camera matrix for the active camera type
    pub fn view_matrix(&self) -> Result<Matrix> {
        debug!("Building {:?} view matrix at {}", self.camera_type, self.position);
        match self.camera_type {
            CameraType::Orbit => Ok(self.orbit_view_matrix()),
            CameraType::PointAt => self.point_at_view_matrix(),
        }
    }

    /// Apply a command with the configured step sizes
    pub fn apply_command(&mut self, command: CameraCommand) {
        let step = match command {
            CameraCommand::RotateLeft
            | CameraCommand::RotateRight
            | CameraCommand::PitchUp
            | CameraCommand::PitchDown => self.rotate_step,
            _ => self.move_step,
        };
        self.apply_command_with_step(command, step);
    }

    /// Apply a command with an explicit step (world units or degrees).
    ///
    /// Orbit cameras move along their own axes and turn by changing yaw or
    /// pitch. Look-at cameras move along world axes and turn by orbiting
    /// the position around the target.
    pub fn apply_command_with_step(&mut self, command: CameraCommand, step: f64) {
        trace!("{:?} camera command {:?} step {}", self.camera_type, command, step);
        match self.camera_type {
            CameraType::Orbit => self.apply_orbit(command, step),
            CameraType::PointAt => self.apply_point_at(command, step),
        }
    }

    fn apply_orbit(&mut self, command: CameraCommand, step: f64) {
        let basis = Self::orbit_basis(self.yaw, self.pitch);
        match command {
            CameraCommand::Up => self.position = self.position + basis.up * step,
            CameraCommand::Down => self.position = self.position - basis.up * step,
            CameraCommand::Left => self.position = self.position - basis.right * step,
            CameraCommand::Right => self.position = self.position + basis.right * step,
            CameraCommand::MoveForward => self.position = self.position + basis.forward * step,
            CameraCommand::MoveBack => self.position = self.position - basis.forward * step,
            CameraCommand::RotateLeft => self.yaw -= step,
            CameraCommand::RotateRight => self.yaw += step,
            // Positive pitch tips the forward axis down
            CameraCommand::PitchUp => {
                self.pitch = (self.pitch - step).clamp(-MAX_PITCH_DEGREES, MAX_PITCH_DEGREES)
            }
            CameraCommand::PitchDown => {
                self.pitch = (self.pitch + step).clamp(-MAX_PITCH_DEGREES, MAX_PITCH_DEGREES)
            }
        }
    }

    fn apply_point_at(&mut self, command: CameraCommand, step: f64) {
        match command {
            CameraCommand::Up => self.position.y += step,
            CameraCommand::Down => self.position.y -= step,
            CameraCommand::Left => self.position.x -= step,
            CameraCommand::Right => self.position.x += step,
            CameraCommand::MoveForward => self.position.z += step,
            CameraCommand::MoveBack => self.position.z -= step,
            CameraCommand::RotateLeft => self.orbit_target(-step),
            CameraCommand::RotateRight => self.orbit_target(step),
            CameraCommand::PitchUp | CameraCommand::PitchDown => {
                trace!("Pitch commands have no effect on a look-at camera");
            }
        }
    }

    /// Swing the position around the target about world Y
    fn orbit_target(&mut self, degrees: f64) {
        let (s, c) = degrees.to_radians().sin_cos();
        let offset = self.position - self.target;
        let swung = Vector3D::new(
            offset.x * c + offset.z * s,
            offset.y,
            -offset.x * s + offset.z * c,
        );
        self.position = self.target + swung;
    }
}
