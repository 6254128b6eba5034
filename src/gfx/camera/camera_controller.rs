use winit::{
    dpi::PhysicalPosition,
    event::{DeviceEvent, ElementState, MouseButton, MouseScrollDelta, WindowEvent},
};

use super::orbit_camera::OrbitCamera;

/// Zoom factor per unit of zoom speed and wheel step
const ZOOM_BASE: f32 = 0.95;
/// Pixel scroll deltas are scaled to wheel steps by this factor
const PIXELS_PER_STEP: f32 = 100.0;

/// Drag to orbit, wheel to dolly, auto-rotation while idle. Pan is not
/// supported.
pub struct CameraController {
    pub rotate_speed: f32,
    pub zoom_speed: f32,
    pub auto_rotate: bool,
    is_mouse_pressed: bool,
}

impl CameraController {
    pub fn new(rotate_speed: f32, zoom_speed: f32) -> Self {
        Self {
            rotate_speed,
            zoom_speed,
            auto_rotate: true,
            is_mouse_pressed: false,
        }
    }

    pub fn process_window_event(&mut self, event: &WindowEvent, camera: &mut OrbitCamera) {
        match event {
            WindowEvent::MouseInput {
                button: MouseButton::Left,
                state,
                ..
            } => {
                self.is_mouse_pressed = *state == ElementState::Pressed;
            }
            WindowEvent::MouseWheel { delta, .. } => {
                let steps = match delta {
                    MouseScrollDelta::LineDelta(_, scroll) => *scroll,
                    MouseScrollDelta::PixelDelta(PhysicalPosition { y, .. }) => {
                        *y as f32 / PIXELS_PER_STEP
                    }
                };
                camera.scale_distance(self.zoom_factor(steps));
            }
            WindowEvent::Focused(false) => {
                self.is_mouse_pressed = false;
            }
            _ => (),
        }
    }

    pub fn process_device_event(&mut self, event: &DeviceEvent, camera: &mut OrbitCamera) {
        if let DeviceEvent::MouseMotion { delta } = event {
            if self.is_mouse_pressed {
                camera.add_yaw(-delta.0 as f32 * self.rotate_speed);
                camera.add_pitch(delta.1 as f32 * self.rotate_speed);
            }
        }
    }

    /// Distance multiplier for a scroll of `steps`; positive steps zoom in
    pub fn zoom_factor(&self, steps: f32) -> f32 {
        ZOOM_BASE.powf(self.zoom_speed * steps)
    }

    pub fn update(&mut self, camera: &mut OrbitCamera, dt: f32) {
        if self.auto_rotate && !self.is_mouse_pressed {
            camera.auto_rotate(dt);
        }
    }
}

impl Default for CameraController {
    fn default() -> Self {
        Self::new(0.005, 0.5)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zoom_factor_direction() {
        let controller = CameraController::default();
        assert!(controller.zoom_factor(1.0) < 1.0);
        assert!(controller.zoom_factor(-1.0) > 1.0);
        assert_eq!(controller.zoom_factor(0.0), 1.0);
        assert!((controller.zoom_factor(2.0) - 0.95).abs() < 1e-6);
    }

    #[test]
    fn test_auto_rotate_pauses_while_dragging() {
        let mut controller = CameraController::default();
        let mut camera = OrbitCamera::scene_default(1.0);
        camera.set_yaw(1.0);

        controller.is_mouse_pressed = true;
        controller.update(&mut camera, 1.0);
        assert_eq!(camera.yaw, 1.0);

        controller.is_mouse_pressed = false;
        controller.update(&mut camera, 1.0);
        assert!(camera.yaw < 1.0);
    }

    #[test]
    fn test_drag_rotates_only_when_pressed() {
        let mut controller = CameraController::default();
        let mut camera = OrbitCamera::scene_default(1.0);
        camera.set_yaw(1.0);
        let motion = DeviceEvent::MouseMotion { delta: (20.0, 0.0) };

        controller.process_device_event(&motion, &mut camera);
        assert_eq!(camera.yaw, 1.0);

        controller.is_mouse_pressed = true;
        controller.process_device_event(&motion, &mut camera);
        assert!((camera.yaw - 0.9).abs() < 1e-6);
    }
}
