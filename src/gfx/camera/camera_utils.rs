use cgmath::{Matrix4, SquareMatrix};
use winit::event::{DeviceEvent, WindowEvent};

use super::{camera_controller::CameraController, orbit_camera::OrbitCamera};

/// Camera plus the controller that drives it from input
pub struct CameraManager {
    pub camera: OrbitCamera,
    pub controller: CameraController,
}

impl CameraManager {
    pub fn new(camera: OrbitCamera, controller: CameraController) -> Self {
        Self { camera, controller }
    }

    /// Mouse buttons and scroll wheel
    pub fn process_window_event(&mut self, event: &WindowEvent) {
        self.controller.process_window_event(event, &mut self.camera);
    }

    /// Raw mouse motion for drag rotation
    pub fn process_device_event(&mut self, event: &DeviceEvent) {
        self.controller.process_device_event(event, &mut self.camera);
    }

    /// Applies time-based camera motion and refreshes the uniform
    pub fn update(&mut self, dt: f32) {
        self.controller.update(&mut self.camera, dt);
        self.camera.update_view_proj();
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        self.camera.resize_projection(width, height);
    }
}

pub trait Camera: Sized {
    fn build_view_matrix(&self) -> Matrix4<f32>;
    fn build_projection_matrix(&self) -> Matrix4<f32>;

    fn build_view_projection_matrix(&self) -> Matrix4<f32> {
        self.build_projection_matrix() * self.build_view_matrix()
    }
}

#[repr(C)]
#[derive(Copy, Clone, bytemuck::Pod, bytemuck::Zeroable, Debug)]
pub struct CameraUniform {
    /// The eye position of the camera in homogenous coordinates.
    ///
    /// Homogenous coordinates are used to fullfill the 16 byte alignment requirement.
    pub view_position: [f32; 4],
    pub view: [[f32; 4]; 4],
    pub proj: [[f32; 4]; 4],
}

impl Default for CameraUniform {
    fn default() -> Self {
        Self {
            view_position: [0.0; 4],
            view: convert_matrix4_to_array(Matrix4::identity()),
            proj: convert_matrix4_to_array(Matrix4::identity()),
        }
    }
}

pub fn convert_matrix4_to_array(matrix4: Matrix4<f32>) -> [[f32; 4]; 4] {
    matrix4.into()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_matrix_conversion_is_column_major() {
        let m = Matrix4::from_translation(cgmath::Vector3::new(1.0, 2.0, 3.0));
        let array = convert_matrix4_to_array(m);
        assert_eq!(array[3], [1.0, 2.0, 3.0, 1.0]);
        assert_eq!(array[0], [1.0, 0.0, 0.0, 0.0]);
    }

    #[test]
    fn test_view_projection_composition() {
        let camera = OrbitCamera::scene_default(1.0);
        let vp = camera.build_view_projection_matrix();
        let origin = vp * cgmath::Vector4::new(0.0, 0.0, 0.0, 1.0);
        // The target is centered on screen and in front of the camera
        assert!((origin.x / origin.w).abs() < 1e-4);
        assert!((origin.y / origin.w).abs() < 1e-4);
        assert!((0.0..1.0).contains(&(origin.z / origin.w)));
    }
}
