//! Per-frame uniform bindings shared by every pass
//!
//! Group 0 carries camera matrices, the clock, host-animated values for the
//! star and halo, and the light rig. Group 1 selects between the direct and
//! the mirrored (reflected in the ground) rendering of the same geometry.

use crate::{
    gfx::camera::CameraUniform,
    scene::{animation::HALO_HEIGHT, composer::FrameState, LightRig},
    wgpu_utils::{
        binding_builder::{BindGroupBuilder, BindGroupLayoutBuilder, BindGroupLayoutWithDesc},
        binding_types,
        uniform_buffer::UniformBuffer,
    },
};

/// Number of light slots in the frame uniform
pub const MAX_LIGHTS: usize = 4;

/// Marker stored in `direction_cone.w` for lights without a cone
const POINT_LIGHT_CONE: f32 = -2.0;

/// One light as the shaders see it. MUST match `Light` in the WGSL sources.
#[repr(C)]
#[derive(Copy, Clone, Debug, Default, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct GpuLight {
    /// xyz position, w cutoff distance (0 = unbounded)
    pub position_range: [f32; 4],
    /// rgb linear color, w intensity
    pub color_intensity: [f32; 4],
    /// xyz spot direction, w cosine of the outer cone (or -2 for point lights)
    pub direction_cone: [f32; 4],
    /// x decay exponent, y cosine of the inner cone
    pub params: [f32; 4],
}

/// Frame uniform content. MUST match `Frame` in the WGSL sources exactly.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct FrameUniformContent {
    pub view: [[f32; 4]; 4],
    pub proj: [[f32; 4]; 4],
    pub view_position: [f32; 4],
    /// width, height, 1/width, 1/height in physical pixels
    pub viewport: [f32; 4],
    /// elapsed seconds, tree rotation, ground height, halo height
    pub time: [f32; 4],
    /// star height, star rotation, halo scale, halo opacity
    pub star: [f32; 4],
    /// rgb ambient, w number of active lights
    pub ambient: [f32; 4],
    pub lights: [GpuLight; MAX_LIGHTS],
}

impl Default for FrameUniformContent {
    fn default() -> Self {
        bytemuck::Zeroable::zeroed()
    }
}

impl FrameUniformContent {
    pub fn new(
        camera: &CameraUniform,
        frame: &FrameState,
        viewport: (u32, u32),
        ground_height: f32,
        rig: &LightRig,
    ) -> Self {
        let (w, h) = (viewport.0.max(1) as f32, viewport.1.max(1) as f32);
        let (ambient, lights, count) = pack_lights(rig);

        Self {
            view: camera.view,
            proj: camera.proj,
            view_position: camera.view_position,
            viewport: [w, h, 1.0 / w, 1.0 / h],
            time: [frame.time, frame.tree_rotation, ground_height, HALO_HEIGHT],
            star: [
                frame.star.height,
                frame.star.rotation,
                frame.halo.scale,
                frame.halo.opacity,
            ],
            ambient: [ambient, ambient, ambient, count as f32],
            lights,
        }
    }
}

/// Converts the light rig into fixed GPU slots. Lights beyond
/// [`MAX_LIGHTS`] are dropped.
pub fn pack_lights(rig: &LightRig) -> (f32, [GpuLight; MAX_LIGHTS], usize) {
    let mut lights = [GpuLight::default(); MAX_LIGHTS];
    let count = rig.lights.len().min(MAX_LIGHTS);

    for (slot, light) in lights.iter_mut().zip(&rig.lights) {
        let [x, y, z] = light.position;
        let [r, g, b] = light.color.to_array();
        let (direction, cos_outer, cos_inner) = match light.spot {
            Some(cone) => {
                let d = [cone.target[0] - x, cone.target[1] - y, cone.target[2] - z];
                let len = (d[0] * d[0] + d[1] * d[1] + d[2] * d[2]).sqrt().max(f32::EPSILON);
                let (inner, outer) = cone.cos_range();
                ([d[0] / len, d[1] / len, d[2] / len], outer, inner)
            }
            None => ([0.0, -1.0, 0.0], POINT_LIGHT_CONE, 1.0),
        };

        *slot = GpuLight {
            position_range: [x, y, z, light.distance],
            color_intensity: [r, g, b, light.intensity],
            direction_cone: [direction[0], direction[1], direction[2], cos_outer],
            params: [light.decay, cos_inner, 0.0, 0.0],
        };
    }

    (rig.ambient, lights, count)
}

/// Type alias for the frame uniform buffer
pub type FrameUBO = UniformBuffer<FrameUniformContent>;

/// Manages the group 0 layout, its uniform buffer and bind group
pub struct FrameBindings {
    bind_group_layout: BindGroupLayoutWithDesc,
    ubo: FrameUBO,
    bind_group: wgpu::BindGroup,
}

impl FrameBindings {
    pub fn new(device: &wgpu::Device) -> Self {
        let bind_group_layout = BindGroupLayoutBuilder::new()
            .next_binding_rendering(binding_types::uniform())
            .create(device, "Frame Bind Group Layout");

        let ubo = FrameUBO::new_with_data(device, &FrameUniformContent::default());
        let bind_group = BindGroupBuilder::new(&bind_group_layout)
            .resource(ubo.binding_resource())
            .create(device, "Frame Bind Group");

        Self {
            bind_group_layout,
            ubo,
            bind_group,
        }
    }

    pub fn update(&mut self, queue: &wgpu::Queue, content: FrameUniformContent) {
        self.ubo.update_content(queue, content);
    }

    pub fn layout(&self) -> &wgpu::BindGroupLayout {
        &self.bind_group_layout.layout
    }

    pub fn bind_group(&self) -> &wgpu::BindGroup {
        &self.bind_group
    }
}

/// Group 1 content: whether geometry is drawn reflected about the ground
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct MirrorUniformContent {
    /// x: 1 when mirrored, y: plane height, z: brightness factor
    pub mirror: [f32; 4],
}

impl MirrorUniformContent {
    pub fn direct() -> Self {
        Self {
            mirror: [0.0, 0.0, 1.0, 0.0],
        }
    }

    pub fn reflected(plane_y: f32, brightness: f32) -> Self {
        Self {
            mirror: [1.0, plane_y, brightness, 0.0],
        }
    }

    pub fn is_reflected(&self) -> bool {
        self.mirror[0] > 0.5
    }

    /// Where a world point is drawn in this pass, or `None` when it is clipped
    ///
    /// Same rule as `mirror_point` plus `reflection_clip` in `common.wgsl`:
    /// only geometry above the ground plane shows up in the reflection.
    pub fn place(&self, p: [f32; 3]) -> Option<[f32; 3]> {
        if !self.is_reflected() {
            return Some(p);
        }
        let plane_y = self.mirror[1];
        let mirrored = [p[0], 2.0 * plane_y - p[1], p[2]];
        (mirrored[1] <= plane_y).then_some(mirrored)
    }
}

/// Two static bind groups over the same layout: direct and reflected
pub struct MirrorBindings {
    bind_group_layout: BindGroupLayoutWithDesc,
    _direct_ubo: UniformBuffer<MirrorUniformContent>,
    _reflected_ubo: UniformBuffer<MirrorUniformContent>,
    direct: wgpu::BindGroup,
    reflected: wgpu::BindGroup,
}

impl MirrorBindings {
    pub fn new(device: &wgpu::Device, plane_y: f32, brightness: f32) -> Self {
        let bind_group_layout = BindGroupLayoutBuilder::new()
            .next_binding_rendering(binding_types::uniform())
            .create(device, "Mirror Bind Group Layout");

        let direct_ubo = UniformBuffer::new_with_data(device, &MirrorUniformContent::direct());
        let reflected_ubo = UniformBuffer::new_with_data(
            device,
            &MirrorUniformContent::reflected(plane_y, brightness),
        );

        let direct = BindGroupBuilder::new(&bind_group_layout)
            .resource(direct_ubo.binding_resource())
            .create(device, "Mirror Bind Group (direct)");
        let reflected = BindGroupBuilder::new(&bind_group_layout)
            .resource(reflected_ubo.binding_resource())
            .create(device, "Mirror Bind Group (reflected)");

        Self {
            bind_group_layout,
            _direct_ubo: direct_ubo,
            _reflected_ubo: reflected_ubo,
            direct,
            reflected,
        }
    }

    pub fn layout(&self) -> &wgpu::BindGroupLayout {
        &self.bind_group_layout.layout
    }

    pub fn bind_group(&self, reflected: bool) -> &wgpu::BindGroup {
        if reflected {
            &self.reflected
        } else {
            &self.direct
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::animation::snow_position;

    #[test]
    fn test_uniform_layout_is_16_byte_aligned() {
        assert_eq!(std::mem::size_of::<GpuLight>(), 64);
        assert_eq!(std::mem::size_of::<FrameUniformContent>() % 16, 0);
        assert_eq!(
            std::mem::size_of::<FrameUniformContent>(),
            64 * 2 + 16 * 5 + 64 * MAX_LIGHTS
        );
        assert_eq!(std::mem::size_of::<MirrorUniformContent>(), 16);
    }

    #[test]
    fn test_pack_default_rig() {
        let (ambient, lights, count) = pack_lights(&LightRig::default());
        assert_eq!(ambient, 0.2);
        assert_eq!(count, 3);

        // Spot light aims from (10, 10, 10) at the origin
        let spot = lights[0];
        let expected = -1.0 / 3f32.sqrt();
        for axis in 0..3 {
            assert!((spot.direction_cone[axis] - expected).abs() < 1e-6);
        }
        assert!((spot.direction_cone[3] - 0.15f32.cos()).abs() < 1e-6);

        assert_eq!(lights[1].direction_cone[3], POINT_LIGHT_CONE);
        assert_eq!(lights[2].position_range[3], 18.0);
        assert_eq!(lights[3], GpuLight::default());
    }

    #[test]
    fn test_frame_content_viewport() {
        let content = FrameUniformContent::new(
            &CameraUniform::default(),
            &FrameState::at(1.0),
            (800, 400),
            -6.5,
            &LightRig::default(),
        );
        assert_eq!(content.viewport, [800.0, 400.0, 1.0 / 800.0, 1.0 / 400.0]);
        assert_eq!(content.time[0], 1.0);
        assert_eq!(content.time[2], -6.5);
        assert_eq!(content.time[3], HALO_HEIGHT);
        assert_eq!(content.ambient[3], 3.0);
    }

    #[test]
    fn test_reflection_clips_below_ground() {
        let ground = -6.5;
        let reflected = MirrorUniformContent::reflected(ground, 1.0);

        // A flake spawned at y = 10 starts at y = -20, under the floor
        for step in 0..4 {
            let t = step as f32 * 0.5;
            let flake = snow_position([0.0, 10.0, 0.0], 0.5, t);
            assert!(flake[1] < ground);
            assert_eq!(reflected.place(flake), None, "t={t}");
        }

        let above = [1.0, 2.0, -3.0];
        let mirrored = reflected.place(above).unwrap();
        assert_eq!(mirrored, [1.0, -15.0, -3.0]);
        assert!(mirrored[1] <= ground);

        let direct = MirrorUniformContent::direct();
        assert!(!direct.is_reflected());
        assert_eq!(direct.place([0.0, -20.0, 0.0]), Some([0.0, -20.0, 0.0]));
    }
}
