//! # Post-Processing
//!
//! The scene is rendered into an HDR target. Bright areas are extracted into a
//! half-resolution buffer and blurred with a separable gaussian, ping-ponging
//! between two buffers. The composite pass adds the bloom back, applies the
//! vignette and tone mapping, and writes to the surface.

use crate::{
    gfx::resources::TextureResource,
    wgpu_utils::{
        binding_types, BindGroupBuilder, BindGroupLayoutBuilder, BindGroupLayoutWithDesc,
        UniformBuffer,
    },
};

use super::{
    pipeline_manager::PipelineConfig,
    shaders::{create_shader_module, POST_SHADER},
};

/// Horizontal plus vertical blur passes per frame
const BLUR_ITERATIONS: usize = 2;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BloomSettings {
    /// Luminance above which pixels start to glow
    pub threshold: f32,
    /// Width of the soft knee above the threshold
    pub smoothing: f32,
    pub intensity: f32,
    /// Blur radius in `[0, 1]`
    pub radius: f32,
}

impl Default for BloomSettings {
    fn default() -> Self {
        Self {
            threshold: 0.2,
            smoothing: 0.025,
            intensity: 1.5,
            radius: 0.4,
        }
    }
}

impl BloomSettings {
    /// Distance between blur taps, in half-resolution texels
    pub fn blur_spread(&self) -> f32 {
        1.0 + 4.0 * self.radius.clamp(0.0, 1.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VignetteSettings {
    pub offset: f32,
    pub darkness: f32,
}

impl Default for VignetteSettings {
    fn default() -> Self {
        Self {
            offset: 0.1,
            darkness: 1.1,
        }
    }
}

impl VignetteSettings {
    /// Brightness multiplier at uv distance `d` from the screen center
    pub fn factor(&self, d: f32) -> f32 {
        let edge0 = self.offset * 0.799;
        let x = d * (self.darkness + self.offset);
        1.0 - smoothstep(edge0, 0.8, x)
    }
}

fn smoothstep(edge0: f32, edge1: f32, x: f32) -> f32 {
    let t = ((x - edge0) / (edge1 - edge0)).clamp(0.0, 1.0);
    t * t * (3.0 - 2.0 * t)
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PostSettings {
    pub bloom: BloomSettings,
    pub vignette: VignetteSettings,
}

/// MUST match `Post` in post.wgsl
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct PostUniformContent {
    pub bloom: [f32; 4],
    pub vignette: [f32; 4],
}

impl PostUniformContent {
    pub fn new(settings: &PostSettings, encode_srgb: bool) -> Self {
        let b = settings.bloom;
        let v = settings.vignette;
        Self {
            bloom: [b.threshold, b.smoothing, b.intensity, b.blur_spread()],
            vignette: [v.offset, v.darkness, if encode_srgb { 1.0 } else { 0.0 }, 0.0],
        }
    }
}

/// Screen-sized targets, recreated on resize
struct Targets {
    hdr: TextureResource,
    depth: TextureResource,
    bloom: [TextureResource; 2],
}

impl Targets {
    fn new(device: &wgpu::Device, width: u32, height: u32) -> Self {
        let (half_w, half_h) = ((width / 2).max(1), (height / 2).max(1));
        let bloom_target = |label| {
            TextureResource::create_render_target(
                device,
                half_w,
                half_h,
                TextureResource::HDR_FORMAT,
                label,
            )
        };

        Self {
            hdr: TextureResource::create_render_target(
                device,
                width,
                height,
                TextureResource::HDR_FORMAT,
                "Scene HDR Target",
            ),
            depth: TextureResource::create_depth_texture(device, width, height, "Scene Depth"),
            bloom: [bloom_target("Bloom Target A"), bloom_target("Bloom Target B")],
        }
    }
}

struct BindGroups {
    threshold: wgpu::BindGroup,
    /// Reads bloom A (writes B), then reads B (writes A)
    blur_h: wgpu::BindGroup,
    blur_v: wgpu::BindGroup,
    composite: wgpu::BindGroup,
}

pub struct PostProcess {
    targets: Targets,
    source_layout: BindGroupLayoutWithDesc,
    composite_layout: BindGroupLayoutWithDesc,
    uniform: UniformBuffer<PostUniformContent>,
    bind_groups: BindGroups,
    threshold_pipeline: wgpu::RenderPipeline,
    blur_h_pipeline: wgpu::RenderPipeline,
    blur_v_pipeline: wgpu::RenderPipeline,
    composite_pipeline: wgpu::RenderPipeline,
}

impl PostProcess {
    pub fn new(
        device: &wgpu::Device,
        width: u32,
        height: u32,
        surface_format: wgpu::TextureFormat,
        settings: PostSettings,
    ) -> Self {
        let targets = Targets::new(device, width, height);

        let source_layout = BindGroupLayoutBuilder::new()
            .next_binding_fragment(binding_types::texture_2d())
            .next_binding_fragment(binding_types::sampler(wgpu::SamplerBindingType::Filtering))
            .next_binding_fragment(binding_types::uniform())
            .create(device, "Post Source Layout");
        let composite_layout = BindGroupLayoutBuilder::new()
            .next_binding_fragment(binding_types::texture_2d())
            .next_binding_fragment(binding_types::sampler(wgpu::SamplerBindingType::Filtering))
            .next_binding_fragment(binding_types::uniform())
            .next_binding_fragment(binding_types::texture_2d())
            .create(device, "Post Composite Layout");

        let encode_srgb = !surface_format.is_srgb();
        let uniform =
            UniformBuffer::new_with_data(device, &PostUniformContent::new(&settings, encode_srgb));
        log::debug!("Post-processing: encode to sRGB in shader = {encode_srgb}");

        let shader = create_shader_module(device, "Post Shader", POST_SHADER);
        let hdr_pass = |label, fs_entry| {
            PipelineConfig::new(label, TextureResource::HDR_FORMAT)
                .with_entry_points("vs_fullscreen", fs_entry)
                .with_bind_group_layouts(&[&source_layout.layout])
                .build(device, &shader)
        };
        let threshold_pipeline = hdr_pass("Bloom Threshold Pipeline", "fs_threshold");
        let blur_h_pipeline = hdr_pass("Bloom Blur H Pipeline", "fs_blur_h");
        let blur_v_pipeline = hdr_pass("Bloom Blur V Pipeline", "fs_blur_v");
        let composite_pipeline = PipelineConfig::new("Composite Pipeline", surface_format)
            .with_entry_points("vs_fullscreen", "fs_composite")
            .with_bind_group_layouts(&[&composite_layout.layout])
            .build(device, &shader);

        let bind_groups =
            create_bind_groups(device, &targets, &source_layout, &composite_layout, &uniform);

        Self {
            targets,
            source_layout,
            composite_layout,
            uniform,
            bind_groups,
            threshold_pipeline,
            blur_h_pipeline,
            blur_v_pipeline,
            composite_pipeline,
        }
    }

    pub fn resize(&mut self, device: &wgpu::Device, width: u32, height: u32) {
        self.targets = Targets::new(device, width, height);
        self.bind_groups = create_bind_groups(
            device,
            &self.targets,
            &self.source_layout,
            &self.composite_layout,
            &self.uniform,
        );
    }

    /// Color attachment for the scene pass
    pub fn hdr_view(&self) -> &wgpu::TextureView {
        &self.targets.hdr.view
    }

    /// Depth attachment for the scene pass
    pub fn depth_view(&self) -> &wgpu::TextureView {
        &self.targets.depth.view
    }

    /// Runs bloom and composites the result onto `output`
    pub fn run(&self, encoder: &mut wgpu::CommandEncoder, output: &wgpu::TextureView) {
        let [bloom_a, bloom_b] = &self.targets.bloom;

        fullscreen_pass(
            encoder,
            "Bloom Threshold Pass",
            &bloom_a.view,
            &self.threshold_pipeline,
            &self.bind_groups.threshold,
        );

        for _ in 0..BLUR_ITERATIONS {
            fullscreen_pass(
                encoder,
                "Bloom Blur H Pass",
                &bloom_b.view,
                &self.blur_h_pipeline,
                &self.bind_groups.blur_h,
            );
            fullscreen_pass(
                encoder,
                "Bloom Blur V Pass",
                &bloom_a.view,
                &self.blur_v_pipeline,
                &self.bind_groups.blur_v,
            );
        }

        fullscreen_pass(
            encoder,
            "Composite Pass",
            output,
            &self.composite_pipeline,
            &self.bind_groups.composite,
        );
    }
}

fn create_bind_groups(
    device: &wgpu::Device,
    targets: &Targets,
    source_layout: &BindGroupLayoutWithDesc,
    composite_layout: &BindGroupLayoutWithDesc,
    uniform: &UniformBuffer<PostUniformContent>,
) -> BindGroups {
    let source = |texture: &TextureResource, label| {
        BindGroupBuilder::new(source_layout)
            .texture(&texture.view)
            .sampler(&texture.sampler)
            .resource(uniform.binding_resource())
            .create(device, label)
    };

    BindGroups {
        threshold: source(&targets.hdr, "Bloom Threshold Bind Group"),
        blur_h: source(&targets.bloom[0], "Bloom Blur H Bind Group"),
        blur_v: source(&targets.bloom[1], "Bloom Blur V Bind Group"),
        composite: BindGroupBuilder::new(composite_layout)
            .texture(&targets.hdr.view)
            .sampler(&targets.hdr.sampler)
            .resource(uniform.binding_resource())
            .texture(&targets.bloom[0].view)
            .create(device, "Composite Bind Group"),
    }
}

fn fullscreen_pass(
    encoder: &mut wgpu::CommandEncoder,
    label: &str,
    target: &wgpu::TextureView,
    pipeline: &wgpu::RenderPipeline,
    bind_group: &wgpu::BindGroup,
) {
    let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
        label: Some(label),
        color_attachments: &[Some(wgpu::RenderPassColorAttachment {
            view: target,
            resolve_target: None,
            ops: wgpu::Operations {
                load: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
                store: wgpu::StoreOp::Store,
            },
        })],
        depth_stencil_attachment: None,
        occlusion_query_set: None,
        timestamp_writes: None,
    });
    pass.set_pipeline(pipeline);
    pass.set_bind_group(0, bind_group, &[]);
    pass.draw(0..3, 0..1);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_settings() {
        let settings = PostSettings::default();
        assert_eq!(settings.bloom.threshold, 0.2);
        assert_eq!(settings.bloom.intensity, 1.5);
        assert_eq!(settings.vignette.darkness, 1.1);
        assert!((settings.bloom.blur_spread() - 2.6).abs() < 1e-6);
    }

    #[test]
    fn test_vignette_falloff() {
        let vignette = VignetteSettings::default();
        assert_eq!(vignette.factor(0.0), 1.0);
        let corner = vignette.factor(std::f32::consts::FRAC_1_SQRT_2);
        assert!(corner < vignette.factor(0.3));
        assert!(corner >= 0.0);
    }

    #[test]
    fn test_post_uniform_flags() {
        let settings = PostSettings::default();
        assert_eq!(PostUniformContent::new(&settings, true).vignette[2], 1.0);
        assert_eq!(PostUniformContent::new(&settings, false).vignette[2], 0.0);
    }
}
