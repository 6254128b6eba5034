use super::camera_utils::{convert_matrix4_to_array, Camera, CameraUniform};
use cgmath::*;
use std::f32::consts::{FRAC_PI_4, TAU};

#[rustfmt::skip]
pub const OPENGL_TO_WGPU_MATRIX: cgmath::Matrix4<f32> = cgmath::Matrix4::new(
    1.0, 0.0, 0.0, 0.0,
    0.0, 1.0, 0.0, 0.0,
    0.0, 0.0, 0.5, 0.5,
    0.0, 0.0, 0.0, 1.0,
);

/// Starting eye position, looking at the origin
pub const DEFAULT_EYE: [f32; 3] = [0.0, 2.0, 25.0];
pub const DEFAULT_FOVY_DEGREES: f32 = 50.0;
/// Auto-rotation speed in orbit-control units (one unit is a turn per 60 s)
pub const AUTO_ROTATE_SPEED: f32 = 0.5;

/// Camera orbiting a target point on a sphere, Y up
///
/// `pitch` is the elevation above the horizontal plane, so the polar angle
/// measured from +Y is `π/2 - pitch`.
#[derive(Debug, Clone, Copy)]
pub struct OrbitCamera {
    pub distance: f32,
    pub pitch: f32,
    pub yaw: f32,
    pub eye: Vector3<f32>,
    pub target: Vector3<f32>,
    pub up: Vector3<f32>,
    pub bounds: OrbitCameraBounds,
    pub aspect: f32,
    pub fovy: Rad<f32>,
    pub znear: f32,
    pub zfar: f32,
    /// Radians per second applied to `yaw` by [`OrbitCamera::auto_rotate`]
    pub auto_rotate_rate: f32,
    pub uniform: CameraUniform,
}

impl Camera for OrbitCamera {
    fn build_view_matrix(&self) -> Matrix4<f32> {
        let eye = Point3::from_vec(self.eye);
        let target = Point3::from_vec(self.target);
        Matrix4::look_at_rh(eye, target, self.up)
    }

    fn build_projection_matrix(&self) -> Matrix4<f32> {
        OPENGL_TO_WGPU_MATRIX * perspective(self.fovy, self.aspect, self.znear, self.zfar)
    }
}

impl OrbitCamera {
    pub fn new(distance: f32, pitch: f32, yaw: f32, target: Vector3<f32>, aspect: f32) -> Self {
        let mut camera = Self {
            distance,
            pitch,
            yaw,
            eye: Vector3::zero(), // Computed in `update()`
            target,
            up: Vector3::unit_y(),
            bounds: OrbitCameraBounds::default(),
            aspect,
            fovy: Deg(DEFAULT_FOVY_DEGREES).into(),
            znear: 0.1,
            zfar: 1000.0,
            auto_rotate_rate: TAU / 60.0 * AUTO_ROTATE_SPEED,
            uniform: CameraUniform::default(),
        };
        camera.set_distance(distance);
        camera.set_pitch(pitch);
        camera
    }

    /// Camera placed at an eye position, looking at `target`
    pub fn looking_at(eye: [f32; 3], target: [f32; 3], aspect: f32) -> Self {
        let offset = Vector3::from(eye) - Vector3::from(target);
        let distance = offset.magnitude();
        let pitch = (offset.y / distance).asin();
        let yaw = offset.x.atan2(offset.z);
        Self::new(distance, pitch, yaw, Vector3::from(target), aspect)
    }

    /// The scene's opening view
    pub fn scene_default(aspect: f32) -> Self {
        Self::looking_at(DEFAULT_EYE, [0.0, 0.0, 0.0], aspect)
    }

    pub fn set_distance(&mut self, distance: f32) {
        self.distance = distance.clamp(self.bounds.min_distance, self.bounds.max_distance);
        self.update();
    }

    /// Dolly by a multiplicative factor; values below 1 move closer
    pub fn scale_distance(&mut self, factor: f32) {
        self.set_distance(self.distance * factor);
    }

    pub fn set_pitch(&mut self, pitch: f32) {
        self.pitch = pitch.clamp(self.bounds.min_pitch, self.bounds.max_pitch);
        self.update();
    }

    pub fn add_pitch(&mut self, delta: f32) {
        self.set_pitch(self.pitch + delta);
    }

    pub fn set_yaw(&mut self, yaw: f32) {
        self.yaw = yaw.rem_euclid(TAU);
        self.update();
    }

    pub fn add_yaw(&mut self, delta: f32) {
        self.set_yaw(self.yaw + delta);
    }

    /// Advances the automatic orbit by `dt` seconds
    pub fn auto_rotate(&mut self, dt: f32) {
        self.add_yaw(-self.auto_rotate_rate * dt);
    }

    /// Polar angle from +Y, in radians
    pub fn polar_angle(&self) -> f32 {
        std::f32::consts::FRAC_PI_2 - self.pitch
    }

    /// Updates the camera after changing `distance`, `pitch` or `yaw`.
    fn update(&mut self) {
        self.eye =
            calculate_cartesian_eye_position(self.pitch, self.yaw, self.distance, self.target);
    }

    pub fn resize_projection(&mut self, width: u32, height: u32) {
        self.aspect = width.max(1) as f32 / height.max(1) as f32;
    }

    pub fn update_view_proj(&mut self) {
        self.uniform.view_position = [self.eye.x, self.eye.y, self.eye.z, 1.0];
        self.uniform.view = convert_matrix4_to_array(self.build_view_matrix());
        self.uniform.proj = convert_matrix4_to_array(self.build_projection_matrix());
    }
}

#[derive(Debug, Clone, Copy)]
pub struct OrbitCameraBounds {
    pub min_distance: f32,
    pub max_distance: f32,
    pub min_pitch: f32,
    pub max_pitch: f32,
}

impl Default for OrbitCameraBounds {
    /// Polar angle in `[π/4, π/2 - 0.05]`: the camera never dips below the
    /// ground or looks straight down.
    fn default() -> Self {
        Self {
            min_distance: 10.0,
            max_distance: 60.0,
            min_pitch: 0.05,
            max_pitch: FRAC_PI_4,
        }
    }
}

fn calculate_cartesian_eye_position(
    pitch: f32,
    yaw: f32,
    distance: f32,
    target: Vector3<f32>,
) -> Vector3<f32> {
    Vector3::new(
        distance * yaw.sin() * pitch.cos(),
        distance * pitch.sin(),
        distance * yaw.cos() * pitch.cos(),
    ) + target
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_view() {
        let camera = OrbitCamera::scene_default(16.0 / 10.0);
        assert!((camera.eye.x).abs() < 1e-4);
        assert!((camera.eye.y - 2.0).abs() < 1e-4);
        assert!((camera.eye.z - 25.0).abs() < 1e-4);
        assert_eq!(camera.yaw, 0.0);
    }

    #[test]
    fn test_polar_clamp() {
        let mut camera = OrbitCamera::scene_default(1.0);

        camera.add_pitch(10.0);
        assert!((camera.polar_angle() - FRAC_PI_4).abs() < 1e-6);

        camera.add_pitch(-10.0);
        assert!((camera.polar_angle() - (std::f32::consts::FRAC_PI_2 - 0.05)).abs() < 1e-6);
        assert!(camera.eye.y > 0.0);
    }

    #[test]
    fn test_auto_rotate_advances_yaw() {
        let mut camera = OrbitCamera::scene_default(1.0);
        camera.set_yaw(1.0);
        let rate = TAU / 60.0 * AUTO_ROTATE_SPEED;

        camera.auto_rotate(0.5);
        assert!((camera.yaw - (1.0 - rate * 0.5)).abs() < 1e-6);

        // Distance and pitch are unaffected
        let distance = camera.distance;
        camera.auto_rotate(2.0);
        assert_eq!(camera.distance, distance);
    }

    #[test]
    fn test_distance_bounds() {
        let mut camera = OrbitCamera::scene_default(1.0);
        camera.scale_distance(0.01);
        assert_eq!(camera.distance, 10.0);
        camera.scale_distance(100.0);
        assert_eq!(camera.distance, 60.0);
    }

    #[test]
    fn test_resize_ignores_zero_height() {
        let mut camera = OrbitCamera::scene_default(1.0);
        camera.resize_projection(800, 0);
        assert!(camera.aspect.is_finite());
    }
}
