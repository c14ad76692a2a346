/// Camera system with FPS-style controls
/// Yaw/pitch mouse look and four-way movement along the view basis
use glam::Vec3;

/// World-space up direction used to derive the camera's right vector.
pub const WORLD_UP: Vec3 = Vec3::Y;

/// Discrete movement commands. There is no vertical strafing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CameraMovement {
    Forward,
    Backward,
    Left,
    Right,
}

/// Tunable sensitivities for movement and mouse look.
#[derive(Debug, Clone, Copy)]
pub struct CameraConfig {
    /// Multiplier applied to every `move_along` speed
    pub movement_multiplier: f32,
    /// Degrees of rotation per unit of look delta
    pub mouse_sensitivity: f32,
    /// Pitch limit in degrees when constraining
    pub pitch_limit: f32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            movement_multiplier: 2.0,
            mouse_sensitivity: 0.1,
            pitch_limit: 89.0,
        }
    }
}

/// Perspective camera described by a position and yaw/pitch in degrees.
///
/// The view basis (front, right, up) is derived state. It is private and only
/// refreshed through `update_basis`, which every orientation mutator calls, so
/// the basis can never be observed stale relative to yaw/pitch.
#[derive(Debug, Clone, Copy)]
pub struct Camera {
    pub position: Vec3,
    pub config: CameraConfig,
    yaw: f32,
    pitch: f32,
    front: Vec3,
    right: Vec3,
    up: Vec3,
}

impl Default for Camera {
    /// Startup pose: five units back on +Z, looking down -Z.
    fn default() -> Self {
        Self::new(Vec3::new(0.0, 0.0, 5.0), -90.0, 0.0)
    }
}

impl Camera {
    pub fn new(position: Vec3, yaw: f32, pitch: f32) -> Self {
        Self::with_config(position, yaw, pitch, CameraConfig::default())
    }

    pub fn with_config(position: Vec3, yaw: f32, pitch: f32, config: CameraConfig) -> Self {
        let mut camera = Self {
            position,
            config,
            yaw,
            pitch,
            front: Vec3::NEG_Z,
            right: Vec3::X,
            up: Vec3::Y,
        };
        camera.update_basis();
        camera
    }

    #[inline]
    pub fn yaw(&self) -> f32 {
        self.yaw
    }

    #[inline]
    pub fn pitch(&self) -> f32 {
        self.pitch
    }

    #[inline]
    pub fn front(&self) -> Vec3 {
        self.front
    }

    #[inline]
    pub fn right(&self) -> Vec3 {
        self.right
    }

    #[inline]
    pub fn up(&self) -> Vec3 {
        self.up
    }

    /// Recompute front/right/up from yaw and pitch.
    ///
    /// Zero-length intermediates normalize to the zero vector instead of
    /// producing NaNs (e.g. a front parallel to world up).
    pub fn update_basis(&mut self) {
        let (front, right, up) = basis_from_angles(self.yaw, self.pitch);
        self.front = front;
        self.right = right;
        self.up = up;
    }

    /// Set yaw/pitch explicitly (degrees) and refresh the basis.
    pub fn set_orientation(&mut self, yaw: f32, pitch: f32) {
        self.yaw = yaw;
        self.pitch = pitch;
        self.update_basis();
    }

    /// Translate along the view basis. The speed is scaled by the configured
    /// movement multiplier.
    pub fn move_along(&mut self, direction: CameraMovement, speed: f32) {
        let step = speed * self.config.movement_multiplier;
        let delta = match direction {
            CameraMovement::Forward => self.front * step,
            CameraMovement::Backward => -self.front * step,
            CameraMovement::Left => -self.right * step,
            CameraMovement::Right => self.right * step,
        };
        self.position += delta;
    }

    /// Update orientation from a mouse delta
    pub fn apply_look_delta(&mut self, dx: f32, dy: f32, constrain_pitch: bool) {
        self.yaw += dx * self.config.mouse_sensitivity;
        self.pitch += dy * self.config.mouse_sensitivity;

        // Keep away from the poles so front never becomes parallel to world up
        if constrain_pitch {
            let limit = self.config.pitch_limit;
            self.pitch = self.pitch.clamp(-limit, limit);
        }

        self.update_basis();
    }

    /// Transform a world-space point into camera space (right, up, front).
    #[inline]
    pub fn world_to_camera(&self, point: Vec3) -> Vec3 {
        let offset = point - self.position;
        Vec3::new(
            offset.dot(self.right),
            offset.dot(self.up),
            offset.dot(self.front),
        )
    }
}

/// Spherical-to-Cartesian view basis for yaw/pitch in degrees.
pub fn basis_from_angles(yaw: f32, pitch: f32) -> (Vec3, Vec3, Vec3) {
    let (yaw_sin, yaw_cos) = yaw.to_radians().sin_cos();
    let (pitch_sin, pitch_cos) = pitch.to_radians().sin_cos();

    let front = Vec3::new(yaw_cos * pitch_cos, pitch_sin, yaw_sin * pitch_cos).normalize_or_zero();
    let right = front.cross(WORLD_UP).normalize_or_zero();
    let up = right.cross(front).normalize_or_zero();
    (front, right, up)
}

/// Camera controller - handles input state
#[derive(Debug, Default)]
pub struct CameraController {
    pub forward_pressed: bool,
    pub backward_pressed: bool,
    pub left_pressed: bool,
    pub right_pressed: bool,
}

impl CameraController {
    pub fn new() -> Self {
        Self::default()
    }

    /// Issue one movement step per held key
    pub fn update_camera(&self, camera: &mut Camera, speed: f32) {
        if self.forward_pressed {
            camera.move_along(CameraMovement::Forward, speed);
        }
        if self.backward_pressed {
            camera.move_along(CameraMovement::Backward, speed);
        }
        if self.left_pressed {
            camera.move_along(CameraMovement::Left, speed);
        }
        if self.right_pressed {
            camera.move_along(CameraMovement::Right, speed);
        }
    }
}
