//! Window, event loop and frame driver
//!
//! Each redraw advances the scene clock, moves the camera, renders the scene
//! plus overlay, and then applies whatever the overlay edited.

use std::sync::Arc;
use winit::{
    application::ApplicationHandler,
    dpi::{LogicalSize, PhysicalSize},
    event::{DeviceEvent, DeviceId, ElementState, KeyEvent, WindowEvent},
    event_loop::{ActiveEventLoop, ControlFlow, EventLoop},
    keyboard::{KeyCode, PhysicalKey},
    window::{Window, WindowAttributes, WindowId},
};

use crate::{
    config::{AppConfig, WindowConfig},
    error::{EvergreenError, Result},
    gfx::{
        camera::{CameraController, CameraManager, OrbitCamera},
        RenderEngine,
    },
    scene::Scene,
    ui::{SceneOverlay, UiManager},
};

pub struct EvergreenApp {
    event_loop: EventLoop<()>,
    app_state: AppState,
}

struct AppState {
    window_config: WindowConfig,
    window: Option<Arc<Window>>,
    render_engine: Option<RenderEngine>,
    ui_manager: Option<UiManager>,
    overlay: SceneOverlay,
    scene: Scene,
    camera_manager: CameraManager,
    /// First fatal error; stops the loop
    error: Option<EvergreenError>,
}

impl EvergreenApp {
    /// Generates the scene and creates the event loop. The window and GPU
    /// come up once the loop starts.
    pub fn new(config: AppConfig) -> Result<Self> {
        let event_loop = EventLoop::new().map_err(|e| EvergreenError::EventLoop(e.to_string()))?;

        let scene = Scene::new(config.settings.clone());

        let aspect = config.window.width as f32 / config.window.height.max(1) as f32;
        let camera_manager =
            CameraManager::new(OrbitCamera::scene_default(aspect), CameraController::default());

        Ok(Self {
            event_loop,
            app_state: AppState {
                window_config: config.window,
                window: None,
                render_engine: None,
                ui_manager: None,
                overlay: SceneOverlay::new(scene.settings()),
                scene,
                camera_manager,
                error: None,
            },
        })
    }

    /// Runs until the window closes, Esc is pressed or a fatal error occurs
    pub fn run(mut self) -> Result<()> {
        self.event_loop.set_control_flow(ControlFlow::Poll);
        self.event_loop
            .run_app(&mut self.app_state)
            .map_err(|e| EvergreenError::EventLoop(e.to_string()))?;

        match self.app_state.error.take() {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }
}

impl AppState {
    fn fail(&mut self, event_loop: &ActiveEventLoop, error: EvergreenError) {
        log::error!("{error}");
        self.error.get_or_insert(error);
        event_loop.exit();
    }

    fn init_window(&mut self, event_loop: &ActiveEventLoop) -> Result<()> {
        let attributes = WindowAttributes::default()
            .with_title(self.window_config.title.clone())
            .with_inner_size(LogicalSize::new(
                self.window_config.width,
                self.window_config.height,
            ));
        let window = Arc::new(
            event_loop
                .create_window(attributes)
                .map_err(|e| EvergreenError::Window(e.to_string()))?,
        );

        let PhysicalSize { width, height } = window.inner_size();
        let renderer = pollster::block_on(RenderEngine::new(
            window.clone(),
            width,
            height,
            self.window_config.vsync,
            &self.scene,
        ))?;

        let mut ui_manager = UiManager::new(
            renderer.device(),
            renderer.queue(),
            renderer.surface_format(),
            &window,
        );
        ui_manager.update_display_size(width, height);
        self.camera_manager.resize(width, height);

        log::info!("Window created at {width}x{height}");
        self.ui_manager = Some(ui_manager);
        self.render_engine = Some(renderer);
        self.window = Some(window);
        Ok(())
    }

    fn redraw(&mut self) -> Result<()> {
        let (Some(render_engine), Some(window)) = (self.render_engine.as_mut(), self.window.as_ref())
        else {
            return Ok(());
        };

        let frame = self.scene.advance();
        self.camera_manager.update(self.scene.clock.delta());
        let camera_uniform = self.camera_manager.camera.uniform;

        match self.ui_manager.as_mut() {
            Some(ui_manager) => {
                let overlay = &mut self.overlay;
                render_engine.render_frame(
                    &self.scene,
                    &camera_uniform,
                    &frame,
                    Some(|device: &wgpu::Device,
                          queue: &wgpu::Queue,
                          encoder: &mut wgpu::CommandEncoder,
                          view: &wgpu::TextureView| {
                        ui_manager.draw(device, queue, encoder, window, view, |ui| {
                            overlay.build(ui, frame.time);
                        });
                    }),
                )?;
            }
            None => render_engine.render_frame(
                &self.scene,
                &camera_uniform,
                &frame,
                None::<fn(&wgpu::Device, &wgpu::Queue, &mut wgpu::CommandEncoder, &wgpu::TextureView)>,
            )?,
        }

        if self.overlay.draft() != self.scene.settings() {
            let change = self.scene.apply_settings(self.overlay.draft().clone());
            if change.palette {
                render_engine.sync_scene(&mut self.scene);
            }
        }

        Ok(())
    }
}

impl ApplicationHandler for AppState {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }

        if let Err(e) = self.init_window(event_loop) {
            self.fail(event_loop, e);
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, window_id: WindowId, event: WindowEvent) {
        let Some(window) = self.window.clone() else {
            return;
        };

        // UI gets input first
        if let Some(ui_manager) = self.ui_manager.as_mut() {
            if ui_manager.handle_input(&window, window_id, &event) {
                return;
            }
        }

        match event {
            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        physical_key: PhysicalKey::Code(KeyCode::Escape),
                        state: ElementState::Pressed,
                        ..
                    },
                ..
            } => {
                let typing = self
                    .ui_manager
                    .as_ref()
                    .is_some_and(|ui_manager| ui_manager.wants_keyboard());
                if !typing {
                    event_loop.exit();
                }
            }
            WindowEvent::Resized(PhysicalSize { width, height }) => {
                log::debug!("Resized to {width}x{height}");
                self.camera_manager.resize(width, height);
                if let Some(render_engine) = self.render_engine.as_mut() {
                    render_engine.resize(width, height);
                }
                if let Some(ui_manager) = self.ui_manager.as_mut() {
                    ui_manager.update_display_size(width, height);
                }
            }
            WindowEvent::CloseRequested => {
                event_loop.exit();
            }
            WindowEvent::RedrawRequested => {
                if let Err(e) = self.redraw() {
                    self.fail(event_loop, e);
                }
            }
            other => self.camera_manager.process_window_event(&other),
        }
    }

    fn device_event(&mut self, _event_loop: &ActiveEventLoop, _device_id: DeviceId, event: DeviceEvent) {
        if self
            .ui_manager
            .as_ref()
            .is_some_and(|ui_manager| ui_manager.wants_mouse())
        {
            return;
        }

        self.camera_manager.process_device_event(&event);
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(ref window) = self.window {
            window.request_redraw();
        }
    }
}
