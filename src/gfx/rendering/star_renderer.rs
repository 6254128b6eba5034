//! The star on top of the tree and its glow halo
//!
//! Placement (bob and spin) and the halo pulse are driven from the frame
//! uniform. This renderer only owns the mesh, the material and the glow
//! texture.

use wgpu::util::DeviceExt;

use crate::{
    gfx::{
        geometry::{generate_star, StarBevel},
        resources::TextureResource,
    },
    scene::{composer::StarDesc, glow},
    wgpu_utils::{binding_types, BindGroupBuilder, BindGroupLayoutBuilder, UniformBuffer},
};

use super::{
    pipeline_manager::{DepthMode, PipelineConfig, ADDITIVE_BLENDING},
    shaders::{create_shader_module, HALO_SHADER, STAR_SHADER},
    vertex::Vertex3D,
};

/// Star material. MUST match `StarMaterial` in star.wgsl.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct StarMaterialContent {
    pub color: [f32; 4],
    pub emissive: [f32; 4],
    pub params: [f32; 4],
}

impl StarMaterialContent {
    pub fn from_desc(desc: &StarDesc) -> Self {
        let [r, g, b] = desc.color.to_array();
        let [er, eg, eb] = desc.emissive.to_array();
        Self {
            color: [r, g, b, desc.metalness],
            emissive: [er, eg, eb, desc.emissive_intensity],
            params: [desc.roughness, 0.0, 0.0, 0.0],
        }
    }
}

pub struct StarRenderer {
    star_pipeline: wgpu::RenderPipeline,
    halo_pipeline: wgpu::RenderPipeline,
    vertex_buffer: wgpu::Buffer,
    index_buffer: wgpu::Buffer,
    index_count: u32,
    _material: UniformBuffer<StarMaterialContent>,
    material_bind_group: wgpu::BindGroup,
    _glow_texture: TextureResource,
    glow_bind_group: wgpu::BindGroup,
}

impl StarRenderer {
    pub fn new(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        target_format: wgpu::TextureFormat,
        frame_layout: &wgpu::BindGroupLayout,
        mirror_layout: &wgpu::BindGroupLayout,
        desc: &StarDesc,
    ) -> Self {
        let mesh = generate_star(
            desc.points,
            desc.outer_radius,
            desc.inner_radius,
            desc.depth,
            StarBevel {
                size: desc.bevel_size,
                thickness: desc.bevel_thickness,
                segments: desc.bevel_segments,
            },
        );
        let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Star Vertex Buffer"),
            contents: bytemuck::cast_slice(&mesh.to_vertices()),
            usage: wgpu::BufferUsages::VERTEX,
        });
        let index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Star Index Buffer"),
            contents: bytemuck::cast_slice(&mesh.indices),
            usage: wgpu::BufferUsages::INDEX,
        });

        let material_layout = BindGroupLayoutBuilder::new()
            .next_binding_rendering(binding_types::uniform())
            .create(device, "Star Material Layout");
        let material = UniformBuffer::new_with_data(device, &StarMaterialContent::from_desc(desc));
        let material_bind_group = BindGroupBuilder::new(&material_layout)
            .resource(material.binding_resource())
            .create(device, "Star Material Bind Group");

        let image = glow::rasterize_glow(glow::GLOW_TEXTURE_SIZE);
        let glow_texture = TextureResource::create_from_rgba_data(
            device,
            queue,
            &image.pixels,
            image.width,
            image.height,
            "Glow Texture",
        );
        let glow_layout = BindGroupLayoutBuilder::new()
            .next_binding_fragment(binding_types::texture_2d())
            .next_binding_fragment(binding_types::sampler(wgpu::SamplerBindingType::Filtering))
            .create(device, "Glow Layout");
        let glow_bind_group = BindGroupBuilder::new(&glow_layout)
            .texture(&glow_texture.view)
            .sampler(&glow_texture.sampler)
            .create(device, "Glow Bind Group");

        let star_shader = create_shader_module(device, "Star Shader", STAR_SHADER);
        let star_pipeline = PipelineConfig::new("Star Pipeline", target_format)
            .with_entry_points("vs_star", "fs_star")
            .with_bind_group_layouts(&[frame_layout, mirror_layout, &material_layout.layout])
            .with_vertex_buffers(vec![Vertex3D::desc()])
            .with_depth(DepthMode::ReadWrite)
            .build(device, &star_shader);

        let halo_shader = create_shader_module(device, "Halo Shader", HALO_SHADER);
        let halo_pipeline = PipelineConfig::new("Halo Pipeline", target_format)
            .with_entry_points("vs_halo", "fs_halo")
            .with_bind_group_layouts(&[frame_layout, mirror_layout, &glow_layout.layout])
            .with_blend(Some(ADDITIVE_BLENDING))
            .with_depth(DepthMode::TestOnly)
            .build(device, &halo_shader);

        Self {
            star_pipeline,
            halo_pipeline,
            vertex_buffer,
            index_buffer,
            index_count: mesh.indices.len() as u32,
            _material: material,
            material_bind_group,
            _glow_texture: glow_texture,
            glow_bind_group,
        }
    }

    pub fn draw_star(&self, pass: &mut wgpu::RenderPass<'_>) {
        pass.set_pipeline(&self.star_pipeline);
        pass.set_bind_group(2, &self.material_bind_group, &[]);
        pass.set_vertex_buffer(0, self.vertex_buffer.slice(..));
        pass.set_index_buffer(self.index_buffer.slice(..), wgpu::IndexFormat::Uint32);
        pass.draw_indexed(0..self.index_count, 0, 0..1);
    }

    pub fn draw_halo(&self, pass: &mut wgpu::RenderPass<'_>) {
        pass.set_pipeline(&self.halo_pipeline);
        pass.set_bind_group(2, &self.glow_bind_group, &[]);
        pass.draw(0..6, 0..1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_material_from_desc() {
        let material = StarMaterialContent::from_desc(&StarDesc::default());
        assert_eq!(material.emissive[3], 2.0);
        // #ffdd00: full red, no blue
        assert_eq!(material.color[0], 1.0);
        assert_eq!(material.color[2], 0.0);
        assert_eq!(material.color[3], 0.8);
        assert_eq!(material.params[0], 0.1);
        assert_eq!(std::mem::size_of::<StarMaterialContent>(), 48);
    }
}
