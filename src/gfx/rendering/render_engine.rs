//! WGPU-based rendering engine for the evergreen scene
//!
//! Owns the surface, device and queue plus every renderer. A frame is drawn
//! into an HDR target in three stages (mirrored geometry, the translucent
//! ground, then the direct geometry), post-processed onto the surface and
//! finally overlaid with the UI.

use wgpu::TextureFormat;

use crate::{
    error::{EvergreenError, Result},
    gfx::{
        camera::CameraUniform,
        resources::{
            frame_bindings::{FrameBindings, FrameUniformContent, MirrorBindings},
            TextureResource,
        },
    },
    scene::{
        composer::{FrameState, BACKGROUND_HEX},
        Color, Scene,
    },
};

use super::{
    ground_renderer::GroundRenderer,
    particle_renderer::ParticleRenderer,
    post_process::{PostProcess, PostSettings},
    star_renderer::StarRenderer,
};

/// Brightness of the mirrored geometry before the ground is blended over it
const REFLECTION_BRIGHTNESS: f32 = 1.0;

/// Core rendering engine managing GPU resources and draw calls
pub struct RenderEngine {
    surface: wgpu::Surface<'static>,
    device: wgpu::Device,
    queue: wgpu::Queue,
    config: wgpu::SurfaceConfiguration,
    format: TextureFormat,
    clear_color: wgpu::Color,
    frame_bindings: FrameBindings,
    mirror_bindings: MirrorBindings,
    particles: ParticleRenderer,
    star: StarRenderer,
    ground: GroundRenderer,
    post: PostProcess,
}

impl RenderEngine {
    /// Creates a new render engine for the given window
    ///
    /// GPU buffers for the particle fields, the star and the ground are
    /// created from `scene` here and never reallocated afterwards.
    ///
    /// # Errors
    /// Fails when no surface, adapter or device can be obtained.
    pub async fn new(
        window: impl Into<wgpu::SurfaceTarget<'static>>,
        width: u32,
        height: u32,
        vsync: bool,
        scene: &Scene,
    ) -> Result<RenderEngine> {
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });
        let surface = instance
            .create_surface(window)
            .map_err(|e| EvergreenError::Surface(e.to_string()))?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::default(),
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .map_err(|_| EvergreenError::AdapterUnavailable)?;
        let info = adapter.get_info();
        log::info!("Using adapter {} ({:?})", info.name, info.backend);

        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: Some("WGPU Device"),
                required_features: wgpu::Features::default(),
                required_limits: wgpu::Limits {
                    max_texture_dimension_2d: 4096,
                    ..wgpu::Limits::downlevel_defaults()
                },
                memory_hints: wgpu::MemoryHints::default(),
                trace: wgpu::Trace::Off,
            })
            .await
            .map_err(|e| EvergreenError::Device(e.to_string()))?;

        let surface_capabilities = surface.get_capabilities(&adapter);
        let format = surface_capabilities
            .formats
            .iter()
            .copied()
            .find(|f| !f.is_srgb())
            .or_else(|| surface_capabilities.formats.first().copied())
            .ok_or_else(|| EvergreenError::Surface("surface reports no formats".into()))?;
        log::info!("Surface format: {format:?}");

        let (width, height) = (width.max(1), height.max(1));
        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format,
            width,
            height,
            present_mode: present_mode(vsync),
            alpha_mode: surface_capabilities
                .alpha_modes
                .first()
                .copied()
                .unwrap_or(wgpu::CompositeAlphaMode::Auto),
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);

        let hdr = TextureResource::HDR_FORMAT;
        let frame_bindings = FrameBindings::new(&device);
        let mirror_bindings =
            MirrorBindings::new(&device, scene.ground.height, REFLECTION_BRIGHTNESS);

        let particles = ParticleRenderer::new(
            &device,
            hdr,
            frame_bindings.layout(),
            mirror_bindings.layout(),
            scene,
        );
        let star = StarRenderer::new(
            &device,
            &queue,
            hdr,
            frame_bindings.layout(),
            mirror_bindings.layout(),
            &scene.star,
        );
        let ground = GroundRenderer::new(
            &device,
            hdr,
            frame_bindings.layout(),
            mirror_bindings.layout(),
            &scene.ground,
        );
        let post = PostProcess::new(&device, width, height, format, PostSettings::default());

        let [r, g, b] = Color::from_srgb_hex(BACKGROUND_HEX).to_array();
        let clear_color = wgpu::Color {
            r: r as f64,
            g: g as f64,
            b: b as f64,
            a: 1.0,
        };

        Ok(Self {
            surface,
            device,
            queue,
            config,
            format,
            clear_color,
            frame_bindings,
            mirror_bindings,
            particles,
            star,
            ground,
            post,
        })
    }

    /// Uploads scene data that changed since the last frame
    pub fn sync_scene(&mut self, scene: &mut Scene) {
        self.particles.sync_colors(&self.queue, &mut scene.tree);
    }

    /// Renders a frame with an optional UI overlay
    ///
    /// A lost or outdated surface is reconfigured and the frame skipped.
    ///
    /// # Errors
    /// Returns [`EvergreenError::SurfaceOutOfMemory`] when the surface cannot
    /// be recovered.
    pub fn render_frame<F>(
        &mut self,
        scene: &Scene,
        camera: &CameraUniform,
        frame: &FrameState,
        ui_callback: Option<F>,
    ) -> Result<()>
    where
        F: FnOnce(&wgpu::Device, &wgpu::Queue, &mut wgpu::CommandEncoder, &wgpu::TextureView),
    {
        let surface_texture = match self.surface.get_current_texture() {
            Ok(texture) => texture,
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                log::debug!("Surface lost or outdated, reconfiguring");
                self.surface.configure(&self.device, &self.config);
                return Ok(());
            }
            Err(wgpu::SurfaceError::OutOfMemory) => return Err(EvergreenError::SurfaceOutOfMemory),
            Err(e) => {
                log::warn!("Skipping frame: {e}");
                return Ok(());
            }
        };

        let surface_texture_view = surface_texture
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        self.frame_bindings.update(
            &self.queue,
            FrameUniformContent::new(
                camera,
                frame,
                (self.config.width, self.config.height),
                scene.ground.height,
                &scene.lights,
            ),
        );

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Render Encoder"),
            });

        {
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Scene Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: self.post.hdr_view(),
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(self.clear_color),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: self.post.depth_view(),
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                occlusion_query_set: None,
                timestamp_writes: None,
            });

            pass.set_bind_group(0, self.frame_bindings.bind_group(), &[]);

            // Reflection below the ground plane
            pass.set_bind_group(1, self.mirror_bindings.bind_group(true), &[]);
            self.star.draw_star(&mut pass);
            self.particles.draw_tree(&mut pass);
            self.particles.draw_snow(&mut pass);

            pass.set_bind_group(1, self.mirror_bindings.bind_group(false), &[]);
            self.ground.draw(&mut pass);

            self.star.draw_star(&mut pass);
            self.particles.draw_sky(&mut pass);
            self.particles.draw_tree(&mut pass);
            self.particles.draw_snow(&mut pass);
            self.star.draw_halo(&mut pass);
        }

        self.post.run(&mut encoder, &surface_texture_view);

        if let Some(ui_callback) = ui_callback {
            ui_callback(
                &self.device,
                &self.queue,
                &mut encoder,
                &surface_texture_view,
            );
        }

        self.queue.submit(std::iter::once(encoder.finish()));
        surface_texture.present();
        Ok(())
    }

    /// Resizes the surface and every screen-sized target
    ///
    /// Zero-sized requests (minimized windows) are ignored.
    pub fn resize(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            return;
        }

        self.config.width = width;
        self.config.height = height;
        self.surface.configure(&self.device, &self.config);
        self.post.resize(&self.device, width, height);
    }

    pub fn device(&self) -> &wgpu::Device {
        &self.device
    }

    pub fn queue(&self) -> &wgpu::Queue {
        &self.queue
    }

    /// Returns the surface texture format
    ///
    /// Used for creating compatible render targets and UI systems.
    pub fn surface_format(&self) -> wgpu::TextureFormat {
        self.format
    }
}

fn present_mode(vsync: bool) -> wgpu::PresentMode {
    if vsync {
        wgpu::PresentMode::Fifo
    } else {
        wgpu::PresentMode::AutoNoVsync
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_present_mode() {
        assert_eq!(present_mode(true), wgpu::PresentMode::Fifo);
        assert_eq!(present_mode(false), wgpu::PresentMode::AutoNoVsync);
    }
}
