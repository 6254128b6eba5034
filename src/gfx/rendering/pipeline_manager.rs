//! Render pipeline construction
//!
//! Every pass in the renderer differs only in a handful of states (entry
//! points, vertex buffers, blending, depth). [`PipelineConfig`] captures those
//! with builder methods and turns them into a `wgpu::RenderPipeline`.

use wgpu::*;

use crate::gfx::resources::TextureResource;

/// `src * alpha + dst`, leaving destination alpha untouched
pub const ADDITIVE_BLENDING: BlendState = BlendState {
    color: BlendComponent {
        src_factor: BlendFactor::SrcAlpha,
        dst_factor: BlendFactor::One,
        operation: BlendOperation::Add,
    },
    alpha: BlendComponent {
        src_factor: BlendFactor::Zero,
        dst_factor: BlendFactor::One,
        operation: BlendOperation::Add,
    },
};

/// Depth testing mode for a pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DepthMode {
    /// No depth attachment in the pass
    None,
    /// Test against the depth buffer without writing it
    TestOnly,
    /// Test and write
    ReadWrite,
}

/// Configuration for creating a render pipeline
#[derive(Clone)]
pub struct PipelineConfig<'a> {
    pub label: &'a str,
    pub vs_entry: &'a str,
    pub fs_entry: &'a str,
    pub bind_group_layouts: Vec<&'a BindGroupLayout>,
    pub vertex_buffers: Vec<VertexBufferLayout<'static>>,
    pub cull_mode: Option<Face>,
    pub blend: Option<BlendState>,
    pub color_format: TextureFormat,
    pub depth: DepthMode,
}

impl<'a> PipelineConfig<'a> {
    pub fn new(label: &'a str, color_format: TextureFormat) -> Self {
        Self {
            label,
            vs_entry: "vs_main",
            fs_entry: "fs_main",
            bind_group_layouts: Vec::new(),
            vertex_buffers: Vec::new(),
            cull_mode: None,
            blend: Some(BlendState::REPLACE),
            color_format,
            depth: DepthMode::None,
        }
    }

    pub fn with_entry_points(mut self, vs_entry: &'a str, fs_entry: &'a str) -> Self {
        self.vs_entry = vs_entry;
        self.fs_entry = fs_entry;
        self
    }

    pub fn with_bind_group_layouts(mut self, layouts: &[&'a BindGroupLayout]) -> Self {
        self.bind_group_layouts = layouts.to_vec();
        self
    }

    pub fn with_vertex_buffers(mut self, buffers: Vec<VertexBufferLayout<'static>>) -> Self {
        self.vertex_buffers = buffers;
        self
    }

    pub fn with_cull_mode(mut self, face: Option<Face>) -> Self {
        self.cull_mode = face;
        self
    }

    pub fn with_blend(mut self, blend: Option<BlendState>) -> Self {
        self.blend = blend;
        self
    }

    pub fn with_depth(mut self, depth: DepthMode) -> Self {
        self.depth = depth;
        self
    }

    fn depth_stencil(&self) -> Option<DepthStencilState> {
        let depth_write_enabled = match self.depth {
            DepthMode::None => return None,
            DepthMode::TestOnly => false,
            DepthMode::ReadWrite => true,
        };
        Some(DepthStencilState {
            format: TextureResource::DEPTH_FORMAT,
            depth_write_enabled,
            depth_compare: CompareFunction::Less,
            stencil: StencilState::default(),
            bias: DepthBiasState::default(),
        })
    }

    pub fn build(&self, device: &Device, shader: &ShaderModule) -> RenderPipeline {
        let layout = device.create_pipeline_layout(&PipelineLayoutDescriptor {
            label: Some(&format!("{} Layout", self.label)),
            bind_group_layouts: &self.bind_group_layouts,
            push_constant_ranges: &[],
        });

        device.create_render_pipeline(&RenderPipelineDescriptor {
            label: Some(self.label),
            layout: Some(&layout),
            vertex: VertexState {
                module: shader,
                entry_point: Some(self.vs_entry),
                buffers: &self.vertex_buffers,
                compilation_options: Default::default(),
            },
            fragment: Some(FragmentState {
                module: shader,
                entry_point: Some(self.fs_entry),
                targets: &[Some(ColorTargetState {
                    format: self.color_format,
                    blend: self.blend,
                    write_mask: ColorWrites::ALL,
                })],
                compilation_options: Default::default(),
            }),
            primitive: PrimitiveState {
                topology: PrimitiveTopology::TriangleList,
                strip_index_format: None,
                front_face: FrontFace::Ccw,
                cull_mode: self.cull_mode,
                unclipped_depth: false,
                polygon_mode: PolygonMode::Fill,
                conservative: false,
            },
            depth_stencil: self.depth_stencil(),
            multisample: MultisampleState::default(),
            multiview: None,
            cache: None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_depth_modes() {
        let config = PipelineConfig::new("test", TextureFormat::Rgba16Float);
        assert!(config.depth_stencil().is_none());

        let test_only = config.clone().with_depth(DepthMode::TestOnly).depth_stencil();
        assert_eq!(test_only.map(|d| d.depth_write_enabled), Some(false));

        let read_write = config.with_depth(DepthMode::ReadWrite).depth_stencil();
        assert_eq!(read_write.map(|d| d.depth_write_enabled), Some(true));
    }
}
