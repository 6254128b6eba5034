//! WGSL sources
//!
//! Scene shaders share the frame/mirror declarations in `common.wgsl`, which
//! is prepended at compile time.

pub const PARTICLE_SHADER: &str = concat!(
    include_str!("shaders/common.wgsl"),
    include_str!("shaders/particles.wgsl")
);

pub const STAR_SHADER: &str = concat!(
    include_str!("shaders/common.wgsl"),
    include_str!("shaders/star.wgsl")
);

pub const HALO_SHADER: &str = concat!(
    include_str!("shaders/common.wgsl"),
    include_str!("shaders/halo.wgsl")
);

pub const GROUND_SHADER: &str = concat!(
    include_str!("shaders/common.wgsl"),
    include_str!("shaders/ground.wgsl")
);

pub const POST_SHADER: &str = include_str!("shaders/post.wgsl");

pub fn create_shader_module(device: &wgpu::Device, label: &str, source: &str) -> wgpu::ShaderModule {
    device.create_shader_module(wgpu::ShaderModuleDescriptor {
        label: Some(label),
        source: wgpu::ShaderSource::Wgsl(source.into()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entry_points_present() {
        for entry in ["vs_tree", "fs_tree", "vs_snow", "fs_snow", "vs_sky", "fs_sky"] {
            assert!(PARTICLE_SHADER.contains(&format!("fn {entry}(")), "{entry}");
        }
        assert!(STAR_SHADER.contains("fn vs_star(") && STAR_SHADER.contains("fn fs_star("));
        assert!(HALO_SHADER.contains("fn vs_halo(") && HALO_SHADER.contains("fn fs_halo("));
        assert!(GROUND_SHADER.contains("fn vs_ground("));
        for entry in ["vs_fullscreen", "fs_threshold", "fs_blur_h", "fs_blur_v", "fs_composite"] {
            assert!(POST_SHADER.contains(&format!("fn {entry}(")), "{entry}");
        }
    }

    #[test]
    fn test_mirrored_fragments_are_clipped() {
        assert!(PARTICLE_SHADER.contains("out.clip_height = reflection_clip(world)"));
        assert_eq!(PARTICLE_SHADER.matches("in.clip_height > 0.0").count(), 2);
        assert!(STAR_SHADER.contains("reflection_clip(in.world_pos) > 0.0"));
    }
}
