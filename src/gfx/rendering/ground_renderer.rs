//! Reflective ground plane

use wgpu::util::DeviceExt;

use crate::{
    gfx::geometry::generate_plane,
    scene::composer::GroundDesc,
    wgpu_utils::{binding_types, BindGroupBuilder, BindGroupLayoutBuilder, UniformBuffer},
};

use super::{
    pipeline_manager::{DepthMode, PipelineConfig},
    shaders::{create_shader_module, GROUND_SHADER},
    vertex::Vertex3D,
};

/// Ground material. MUST match `GroundMaterial` in ground.wgsl.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct GroundMaterialContent {
    pub color: [f32; 4],
    pub params: [f32; 4],
}

impl GroundMaterialContent {
    /// Opacity over the mirrored geometry: whatever the floor does not cover
    /// is the reflection
    pub fn from_desc(desc: &GroundDesc) -> Self {
        let [r, g, b] = desc.color.to_array();
        Self {
            color: [r, g, b, desc.metalness],
            params: [desc.roughness, 1.0 - desc.reflectivity, desc.height, 0.0],
        }
    }
}

pub struct GroundRenderer {
    pipeline: wgpu::RenderPipeline,
    vertex_buffer: wgpu::Buffer,
    index_buffer: wgpu::Buffer,
    index_count: u32,
    _material: UniformBuffer<GroundMaterialContent>,
    material_bind_group: wgpu::BindGroup,
}

impl GroundRenderer {
    pub fn new(
        device: &wgpu::Device,
        target_format: wgpu::TextureFormat,
        frame_layout: &wgpu::BindGroupLayout,
        mirror_layout: &wgpu::BindGroupLayout,
        desc: &GroundDesc,
    ) -> Self {
        let mesh = generate_plane(desc.size, desc.size, 1, 1);
        let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Ground Vertex Buffer"),
            contents: bytemuck::cast_slice(&mesh.to_vertices()),
            usage: wgpu::BufferUsages::VERTEX,
        });
        let index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Ground Index Buffer"),
            contents: bytemuck::cast_slice(&mesh.indices),
            usage: wgpu::BufferUsages::INDEX,
        });

        let material_layout = BindGroupLayoutBuilder::new()
            .next_binding_rendering(binding_types::uniform())
            .create(device, "Ground Material Layout");
        let material =
            UniformBuffer::new_with_data(device, &GroundMaterialContent::from_desc(desc));
        let material_bind_group = BindGroupBuilder::new(&material_layout)
            .resource(material.binding_resource())
            .create(device, "Ground Material Bind Group");

        let shader = create_shader_module(device, "Ground Shader", GROUND_SHADER);
        let pipeline = PipelineConfig::new("Ground Pipeline", target_format)
            .with_entry_points("vs_ground", "fs_ground")
            .with_bind_group_layouts(&[frame_layout, mirror_layout, &material_layout.layout])
            .with_vertex_buffers(vec![Vertex3D::desc()])
            .with_blend(Some(wgpu::BlendState::ALPHA_BLENDING))
            .with_cull_mode(Some(wgpu::Face::Back))
            .with_depth(DepthMode::ReadWrite)
            .build(device, &shader);

        Self {
            pipeline,
            vertex_buffer,
            index_buffer,
            index_count: mesh.indices.len() as u32,
            _material: material,
            material_bind_group,
        }
    }

    pub fn draw(&self, pass: &mut wgpu::RenderPass<'_>) {
        pass.set_pipeline(&self.pipeline);
        pass.set_bind_group(2, &self.material_bind_group, &[]);
        pass.set_vertex_buffer(0, self.vertex_buffer.slice(..));
        pass.set_index_buffer(self.index_buffer.slice(..), wgpu::IndexFormat::Uint32);
        pass.draw_indexed(0..self.index_count, 0, 0..1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ground_material() {
        let desc = GroundDesc::default();
        let material = GroundMaterialContent::from_desc(&desc);
        assert_eq!(material.color[3], 0.5);
        assert_eq!(material.params[0], 1.0);
        assert_eq!(material.params[2], -6.5);
        assert!(material.params[1] > 0.0 && material.params[1] < 1.0);
    }
}
