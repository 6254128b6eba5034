//! # Particle Fields
//!
//! Generators for the three particle populations of the scene: the spiral
//! tree, the falling snow and the background starfield. Each field is a set of
//! parallel arrays created once at startup. Motion is applied on the GPU from
//! the frame clock, so the arrays here never change afterwards. The only
//! exception is the tree's resolved color channel, which is rewritten wholesale
//! on palette switches.

use std::f32::consts::{PI, TAU};

use rand::Rng;

use super::palette::{resolve_colors, PaletteIndex};

pub const TREE_PARTICLE_COUNT: usize = 4500;
pub const SNOW_PARTICLE_COUNT: usize = 1500;
pub const SKY_STAR_COUNT: usize = 5000;

/// Tree height, base at `TREE_BASE_Y`
pub const TREE_HEIGHT: f32 = 13.0;
pub const TREE_BASE_Y: f32 = -6.5;
pub const TREE_BASE_RADIUS: f32 = 5.0;
/// Total spiral angle swept from base to tip, in radians
pub const TREE_SPIRAL_ANGLE: f32 = PI * 30.0;
/// Half-width of the uniform radial jitter
pub const TREE_RADIUS_JITTER: f32 = 0.5;
/// Color slots are drawn from `0..TREE_COLOR_SLOTS`, independent of palette size
pub const TREE_COLOR_SLOTS: u32 = 100;

/// Half extents of the snow volume
pub const SNOW_HALF_EXTENTS: [f32; 3] = [40.0, 30.0, 40.0];

pub const SKY_INNER_RADIUS: f32 = 100.0;
pub const SKY_DEPTH: f32 = 50.0;
pub const SKY_SIZE_FACTOR: f32 = 4.0;

/// Parallel per-particle attribute arrays shared by every population
///
/// For snow, `phases` holds the per-particle random in `[0, 1)` and `speeds`
/// the derived fall speed.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParticleField {
    pub positions: Vec<[f32; 3]>,
    pub sizes: Vec<f32>,
    pub phases: Vec<f32>,
    pub speeds: Vec<f32>,
}

impl ParticleField {
    fn with_capacity(count: usize) -> Self {
        Self {
            positions: Vec::with_capacity(count),
            sizes: Vec::with_capacity(count),
            phases: Vec::with_capacity(count),
            speeds: Vec::with_capacity(count),
        }
    }

    fn push(&mut self, position: [f32; 3], size: f32, phase: f32, speed: f32) {
        self.positions.push(position);
        self.sizes.push(size);
        self.phases.push(phase);
        self.speeds.push(speed);
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    /// Packs the field into GPU instance records
    pub fn instances(&self) -> Vec<ParticleInstance> {
        self.positions
            .iter()
            .zip(&self.sizes)
            .zip(self.phases.iter().zip(&self.speeds))
            .map(|((position, size), (phase, speed))| ParticleInstance {
                position: *position,
                size: *size,
                phase: *phase,
                speed: *speed,
                _padding: [0.0; 2],
            })
            .collect()
    }
}

/// Per-instance vertex data for every particle field
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct ParticleInstance {
    pub position: [f32; 3],
    pub size: f32,
    pub phase: f32,
    pub speed: f32,
    pub _padding: [f32; 2],
}

impl ParticleInstance {
    const ATTRIBS: [wgpu::VertexAttribute; 3] = wgpu::vertex_attr_array![
        0 => Float32x3,
        1 => Float32,
        2 => Float32x2,
    ];

    pub fn desc() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<ParticleInstance>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Instance,
            attributes: &Self::ATTRIBS,
        }
    }
}

/// Tree particles: geometry plus a stable color slot and its resolved color
#[derive(Debug, Clone)]
pub struct TreeParticles {
    pub field: ParticleField,
    color_slots: Vec<u32>,
    colors: Vec<[f32; 3]>,
    colors_dirty: bool,
}

impl TreeParticles {
    pub fn color_slots(&self) -> &[u32] {
        &self.color_slots
    }

    pub fn colors(&self) -> &[[f32; 3]] {
        &self.colors
    }

    /// Re-resolves every particle's color against `palette` and marks the
    /// color channel dirty. Geometry is left untouched.
    pub fn apply_palette(&mut self, palette: PaletteIndex) {
        resolve_colors(palette.palette(), &self.color_slots, &mut self.colors);
        self.colors_dirty = true;
    }

    /// Returns the colors if they changed since the last call
    pub fn take_dirty_colors(&mut self) -> Option<&[[f32; 3]]> {
        if std::mem::take(&mut self.colors_dirty) {
            Some(&self.colors)
        } else {
            None
        }
    }
}

/// Builds the spiral cone of tree particles
pub fn generate_tree<R: Rng + ?Sized>(rng: &mut R, palette: PaletteIndex) -> TreeParticles {
    let count = TREE_PARTICLE_COUNT;
    let mut field = ParticleField::with_capacity(count);
    let mut color_slots = Vec::with_capacity(count);

    for i in 0..count {
        let t = i as f32 / count as f32;
        let angle = t * TREE_SPIRAL_ANGLE;
        let radius = TREE_BASE_RADIUS * (1.0 - t)
            + rng.random_range(-TREE_RADIUS_JITTER..TREE_RADIUS_JITTER);
        let y = t * TREE_HEIGHT + TREE_BASE_Y;

        field.push(
            [angle.cos() * radius, y, angle.sin() * radius],
            rng.random_range(0.2..0.8),
            rng.random_range(0.0..TAU),
            rng.random_range(0.5..1.5),
        );
        color_slots.push(rng.random_range(0..TREE_COLOR_SLOTS));
    }

    let mut tree = TreeParticles {
        field,
        colors: vec![[0.0; 3]; color_slots.len()],
        color_slots,
        colors_dirty: false,
    };
    tree.apply_palette(palette);
    tree
}

/// Scatters snowflakes uniformly through the snow volume
pub fn generate_snow<R: Rng + ?Sized>(rng: &mut R) -> ParticleField {
    let [hx, hy, hz] = SNOW_HALF_EXTENTS;
    let mut field = ParticleField::with_capacity(SNOW_PARTICLE_COUNT);

    for _ in 0..SNOW_PARTICLE_COUNT {
        let position = [
            rng.random_range(-hx..hx),
            rng.random_range(-hy..hy),
            rng.random_range(-hz..hz),
        ];
        let random: f32 = rng.random();
        field.push(
            position,
            rng.random_range(0.8..2.5),
            random,
            super::animation::snow_fall_speed(random),
        );
    }

    field
}

/// Distributes background stars over a spherical shell around the scene
pub fn generate_sky<R: Rng + ?Sized>(rng: &mut R) -> ParticleField {
    let mut field = ParticleField::with_capacity(SKY_STAR_COUNT);

    for _ in 0..SKY_STAR_COUNT {
        let radius = SKY_INNER_RADIUS + SKY_DEPTH * rng.random::<f32>();
        let polar = (1.0 - 2.0 * rng.random::<f32>()).acos();
        let azimuth = rng.random::<f32>() * TAU;

        let ring = radius * polar.sin();
        let position = [ring * azimuth.sin(), radius * polar.cos(), ring * azimuth.cos()];

        field.push(
            position,
            (0.5 + 0.5 * rng.random::<f32>()) * SKY_SIZE_FACTOR,
            rng.random_range(0.0..TAU),
            1.0,
        );
    }

    field
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn radial(p: &[f32; 3]) -> f32 {
        (p[0] * p[0] + p[2] * p[2]).sqrt()
    }

    #[test]
    fn test_particle_counts() {
        let mut rng = StdRng::seed_from_u64(1);
        let tree = generate_tree(&mut rng, PaletteIndex::default());
        assert_eq!(tree.field.len(), TREE_PARTICLE_COUNT);
        assert_eq!(tree.field.sizes.len(), TREE_PARTICLE_COUNT);
        assert_eq!(tree.color_slots().len(), TREE_PARTICLE_COUNT);
        assert_eq!(tree.colors().len(), TREE_PARTICLE_COUNT);

        let snow = generate_snow(&mut rng);
        assert_eq!(snow.len(), SNOW_PARTICLE_COUNT);
        assert_eq!(snow.phases.len(), SNOW_PARTICLE_COUNT);

        let sky = generate_sky(&mut rng);
        assert_eq!(sky.len(), SKY_STAR_COUNT);
        assert_eq!(sky.instances().len(), SKY_STAR_COUNT);
    }

    #[test]
    fn test_tree_tapers_within_jitter() {
        let mut rng = StdRng::seed_from_u64(7);
        let tree = generate_tree(&mut rng, PaletteIndex::default());

        for (i, p) in tree.field.positions.iter().enumerate() {
            let t = i as f32 / TREE_PARTICLE_COUNT as f32;
            let nominal = TREE_BASE_RADIUS * (1.0 - t);
            // |jitter| may flip the sign of small radii, so compare magnitudes.
            assert!(radial(p) <= nominal + TREE_RADIUS_JITTER + 1e-4);
            assert!(radial(p) >= (nominal - TREE_RADIUS_JITTER).max(0.0) - 1e-4);
            assert!((p[1] - (t * TREE_HEIGHT + TREE_BASE_Y)).abs() < 1e-4);
        }

        // Non-increasing within the jitter bound: later particles never sit
        // further out than earlier ones by more than the full jitter width.
        let radii: Vec<f32> = tree.field.positions.iter().map(radial).collect();
        for pair in radii.windows(2) {
            assert!(pair[1] <= pair[0] + 2.0 * TREE_RADIUS_JITTER + 1e-4);
        }
    }

    #[test]
    fn test_tree_attribute_ranges() {
        let mut rng = StdRng::seed_from_u64(3);
        let tree = generate_tree(&mut rng, PaletteIndex::default());

        assert!(tree.field.sizes.iter().all(|s| (0.2..0.8).contains(s)));
        assert!(tree.field.speeds.iter().all(|s| (0.5..1.5).contains(s)));
        assert!(tree.field.phases.iter().all(|o| (0.0..TAU).contains(o)));
        assert!(tree.color_slots().iter().all(|c| *c < TREE_COLOR_SLOTS));
    }

    #[test]
    fn test_snow_within_volume() {
        let mut rng = StdRng::seed_from_u64(11);
        let snow = generate_snow(&mut rng);

        for p in &snow.positions {
            for axis in 0..3 {
                assert!(p[axis].abs() <= SNOW_HALF_EXTENTS[axis]);
            }
        }
        assert!(snow.sizes.iter().all(|s| (0.8..2.5).contains(s)));
        assert!(snow.phases.iter().all(|r| (0.0..1.0).contains(r)));
    }

    #[test]
    fn test_sky_on_shell() {
        let mut rng = StdRng::seed_from_u64(5);
        let sky = generate_sky(&mut rng);

        for p in &sky.positions {
            let r = (p[0] * p[0] + p[1] * p[1] + p[2] * p[2]).sqrt();
            assert!(r >= SKY_INNER_RADIUS - 1e-2);
            assert!(r <= SKY_INNER_RADIUS + SKY_DEPTH + 1e-2);
        }
        assert!(sky.sizes.iter().all(|s| (2.0..=4.0).contains(s)));
    }

    #[test]
    fn test_seeded_generation_is_reproducible() {
        let a = generate_tree(&mut StdRng::seed_from_u64(42), PaletteIndex::default());
        let b = generate_tree(&mut StdRng::seed_from_u64(42), PaletteIndex::default());
        assert_eq!(a.field, b.field);
        assert_eq!(a.color_slots(), b.color_slots());
    }

    #[test]
    fn test_palette_switch_keeps_geometry() {
        let mut rng = StdRng::seed_from_u64(9);
        let mut tree = generate_tree(&mut rng, PaletteIndex::default());
        assert!(tree.take_dirty_colors().is_some());
        assert!(tree.take_dirty_colors().is_none());

        let before: Vec<u8> = bytemuck::cast_slice(&tree.field.instances()).to_vec();
        let slots_before = tree.color_slots().to_vec();
        let colors_before = tree.colors().to_vec();

        let gold = PaletteIndex::clamped(5);
        tree.apply_palette(gold);

        let after: Vec<u8> = bytemuck::cast_slice(&tree.field.instances()).to_vec();
        assert_eq!(before, after);
        assert_eq!(slots_before, tree.color_slots());
        assert_ne!(colors_before, tree.colors());

        let declared: Vec<[f32; 3]> = gold.palette().colors().iter().map(|c| c.to_array()).collect();
        let dirty = tree.take_dirty_colors().map(<[_]>::to_vec);
        assert!(dirty.is_some_and(|colors| colors.iter().all(|c| declared.contains(c))));
    }
}
