//! Instanced sprite rendering for the tree, snow and starfield
//!
//! Particle attributes are uploaded once. Only the tree color buffer is
//! rewritten, and only after a palette switch.

use crate::{
    scene::{ParticleField, ParticleInstance, Scene, TreeParticles},
    wgpu_utils::InstanceBuffer,
};

use super::{
    pipeline_manager::{DepthMode, PipelineConfig, ADDITIVE_BLENDING},
    shaders::{create_shader_module, PARTICLE_SHADER},
};

/// Vertices emitted per sprite (two triangles)
const SPRITE_VERTICES: u32 = 6;

const COLOR_ATTRIBS: [wgpu::VertexAttribute; 1] = wgpu::vertex_attr_array![3 => Float32x3];

fn color_buffer_layout() -> wgpu::VertexBufferLayout<'static> {
    wgpu::VertexBufferLayout {
        array_stride: std::mem::size_of::<[f32; 3]>() as wgpu::BufferAddress,
        step_mode: wgpu::VertexStepMode::Instance,
        attributes: &COLOR_ATTRIBS,
    }
}

pub struct ParticleRenderer {
    tree_pipeline: wgpu::RenderPipeline,
    snow_pipeline: wgpu::RenderPipeline,
    sky_pipeline: wgpu::RenderPipeline,
    tree_instances: InstanceBuffer<ParticleInstance>,
    tree_colors: InstanceBuffer<[f32; 3]>,
    snow_instances: InstanceBuffer<ParticleInstance>,
    sky_instances: InstanceBuffer<ParticleInstance>,
}

impl ParticleRenderer {
    pub fn new(
        device: &wgpu::Device,
        target_format: wgpu::TextureFormat,
        frame_layout: &wgpu::BindGroupLayout,
        mirror_layout: &wgpu::BindGroupLayout,
        scene: &Scene,
    ) -> Self {
        let shader = create_shader_module(device, "Particle Shader", PARTICLE_SHADER);

        let base = PipelineConfig::new("Particle Pipeline", target_format)
            .with_bind_group_layouts(&[frame_layout, mirror_layout])
            .with_blend(Some(ADDITIVE_BLENDING))
            .with_depth(DepthMode::TestOnly);

        let tree_pipeline = PipelineConfig {
            label: "Tree Particle Pipeline",
            ..base.clone()
        }
        .with_entry_points("vs_tree", "fs_tree")
        .with_vertex_buffers(vec![ParticleInstance::desc(), color_buffer_layout()])
        .build(device, &shader);

        let snow_pipeline = PipelineConfig {
            label: "Snow Particle Pipeline",
            ..base.clone()
        }
        .with_entry_points("vs_snow", "fs_snow")
        .with_vertex_buffers(vec![ParticleInstance::desc()])
        .build(device, &shader);

        let sky_pipeline = PipelineConfig {
            label: "Sky Particle Pipeline",
            ..base
        }
        .with_entry_points("vs_sky", "fs_sky")
        .with_vertex_buffers(vec![ParticleInstance::desc()])
        .build(device, &shader);

        Self {
            tree_pipeline,
            snow_pipeline,
            sky_pipeline,
            tree_instances: upload_field(device, "Tree Instances", &scene.tree.field),
            tree_colors: InstanceBuffer::new_with_data(device, "Tree Colors", scene.tree.colors()),
            snow_instances: upload_field(device, "Snow Instances", &scene.snow),
            sky_instances: upload_field(device, "Sky Instances", &scene.sky),
        }
    }

    /// Re-uploads tree colors if the palette changed since the last frame
    pub fn sync_colors(&mut self, queue: &wgpu::Queue, tree: &mut TreeParticles) {
        if let Some(colors) = tree.take_dirty_colors() {
            self.tree_colors.update_data(queue, colors);
            log::debug!("Uploaded {} tree colors", colors.len());
        }
    }

    pub fn draw_tree(&self, pass: &mut wgpu::RenderPass<'_>) {
        pass.set_pipeline(&self.tree_pipeline);
        pass.set_vertex_buffer(0, self.tree_instances.slice());
        pass.set_vertex_buffer(1, self.tree_colors.slice());
        pass.draw(0..SPRITE_VERTICES, 0..self.tree_instances.len() as u32);
    }

    pub fn draw_snow(&self, pass: &mut wgpu::RenderPass<'_>) {
        draw_field(pass, &self.snow_pipeline, &self.snow_instances);
    }

    pub fn draw_sky(&self, pass: &mut wgpu::RenderPass<'_>) {
        draw_field(pass, &self.sky_pipeline, &self.sky_instances);
    }
}

fn upload_field(
    device: &wgpu::Device,
    label: &str,
    field: &ParticleField,
) -> InstanceBuffer<ParticleInstance> {
    InstanceBuffer::new_with_data(device, label, &field.instances())
}

fn draw_field(
    pass: &mut wgpu::RenderPass<'_>,
    pipeline: &wgpu::RenderPipeline,
    instances: &InstanceBuffer<ParticleInstance>,
) {
    pass.set_pipeline(pipeline);
    pass.set_vertex_buffer(0, instances.slice());
    pass.draw(0..SPRITE_VERTICES, 0..instances.len() as u32);
}
