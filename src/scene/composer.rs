//! # Scene Composition
//!
//! Owns everything the renderer draws: the three particle fields, the light
//! rig, the ground and star descriptions, and the scene clock. User input
//! reaches the scene only through [`SceneSettings`] snapshots passed to
//! [`Scene::apply_settings`].

use rand::Rng;

use super::animation::{self, HaloPulse, SceneClock, StarPose};
use super::greeting::Greeting;
use super::palette::{Color, PaletteIndex};
use super::particles::{self, ParticleField, TreeParticles, TREE_BASE_Y};

/// Clear color behind everything (#050505)
pub const BACKGROUND_HEX: u32 = 0x050505;

/// Immutable snapshot of the user-facing scene inputs
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SceneSettings {
    pub palette: PaletteIndex,
    pub greeting: Greeting,
}

/// What changed between two [`SceneSettings`] snapshots
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SettingsChange {
    pub palette: bool,
    pub greeting: bool,
}

impl SettingsChange {
    pub fn any(self) -> bool {
        self.palette || self.greeting
    }
}

/// Cone parameters of a spot light
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpotCone {
    pub target: [f32; 3],
    /// Half-angle of the outer cone, radians
    pub angle: f32,
    /// Fraction of the cone used for the soft edge, in `[0, 1]`
    pub penumbra: f32,
}

impl SpotCone {
    /// Cosines of the inner and outer cone half-angles
    pub fn cos_range(&self) -> (f32, f32) {
        let outer = self.angle.cos();
        let inner = (self.angle * (1.0 - self.penumbra)).cos();
        (inner, outer)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LightSource {
    pub position: [f32; 3],
    pub color: Color,
    pub intensity: f32,
    /// Cutoff distance; zero means unbounded
    pub distance: f32,
    pub decay: f32,
    pub spot: Option<SpotCone>,
}

impl LightSource {
    pub fn point(position: [f32; 3], color: Color, intensity: f32) -> Self {
        Self {
            position,
            color,
            intensity,
            distance: 0.0,
            decay: 2.0,
            spot: None,
        }
    }

    pub fn with_range(mut self, distance: f32, decay: f32) -> Self {
        self.distance = distance;
        self.decay = decay;
        self
    }

    pub fn with_spot(mut self, cone: SpotCone) -> Self {
        self.spot = Some(cone);
        self
    }
}

/// Ambient term plus the dynamic lights of the scene
#[derive(Debug, Clone, PartialEq)]
pub struct LightRig {
    pub ambient: f32,
    pub lights: Vec<LightSource>,
}

impl Default for LightRig {
    fn default() -> Self {
        Self {
            ambient: 0.2,
            lights: vec![
                LightSource::point([10.0, 10.0, 10.0], Color::WHITE, 1.0).with_spot(SpotCone {
                    target: [0.0, 0.0, 0.0],
                    angle: 0.15,
                    penumbra: 1.0,
                }),
                LightSource::point([-10.0, 5.0, -10.0], Color::from_srgb_hex(0x5555ff), 0.5),
                LightSource::point(
                    [0.0, animation::HALO_HEIGHT, 0.0],
                    Color::from_srgb_hex(0xffccaa),
                    5.0,
                )
                .with_range(18.0, 2.0),
            ],
        }
    }
}

/// Reflective floor beneath the tree
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GroundDesc {
    pub size: f32,
    pub height: f32,
    pub color: Color,
    pub metalness: f32,
    pub roughness: f32,
    /// Brightness of mirrored geometry seen through the floor
    pub reflectivity: f32,
}

impl Default for GroundDesc {
    fn default() -> Self {
        Self {
            size: 100.0,
            height: TREE_BASE_Y,
            color: Color::from_srgb_hex(0x050505),
            metalness: 0.5,
            roughness: 1.0,
            reflectivity: 0.35,
        }
    }
}

/// The five-pointed star on top of the tree and its glow halo
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StarDesc {
    pub outer_radius: f32,
    pub inner_radius: f32,
    pub depth: f32,
    pub bevel_size: f32,
    pub bevel_thickness: f32,
    pub bevel_segments: u32,
    pub points: usize,
    pub color: Color,
    pub emissive: Color,
    pub emissive_intensity: f32,
    pub metalness: f32,
    pub roughness: f32,
}

impl Default for StarDesc {
    fn default() -> Self {
        Self {
            outer_radius: 2.0,
            inner_radius: 0.9,
            depth: 0.4,
            bevel_size: 0.15,
            bevel_thickness: 0.15,
            bevel_segments: 2,
            points: 5,
            color: Color::from_srgb_hex(0xffdd00),
            emissive: Color::from_srgb_hex(0xffaa00),
            emissive_intensity: 2.0,
            metalness: 0.8,
            roughness: 0.1,
        }
    }
}

/// Host-side animation values for one frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameState {
    pub time: f32,
    pub tree_rotation: f32,
    pub star: StarPose,
    pub halo: HaloPulse,
}

impl FrameState {
    pub fn at(time: f32) -> Self {
        Self {
            time,
            tree_rotation: animation::tree_rotation(time),
            star: animation::star_pose(time),
            halo: animation::halo_pulse(time),
        }
    }
}

/// The complete scene
pub struct Scene {
    settings: SceneSettings,
    pub tree: TreeParticles,
    pub snow: ParticleField,
    pub sky: ParticleField,
    pub lights: LightRig,
    pub ground: GroundDesc,
    pub star: StarDesc,
    pub clock: SceneClock,
}

impl Scene {
    pub fn new(settings: SceneSettings) -> Self {
        Self::with_rng(settings, &mut rand::rng())
    }

    /// Builds the scene drawing every random attribute from `rng`
    pub fn with_rng<R: Rng + ?Sized>(settings: SceneSettings, rng: &mut R) -> Self {
        let tree = particles::generate_tree(rng, settings.palette);
        let snow = particles::generate_snow(rng);
        let sky = particles::generate_sky(rng);

        log::info!(
            "Scene built: {} tree, {} snow, {} sky particles (palette '{}')",
            tree.field.len(),
            snow.len(),
            sky.len(),
            settings.palette.palette().name
        );

        Self {
            settings,
            tree,
            snow,
            sky,
            lights: LightRig::default(),
            ground: GroundDesc::default(),
            star: StarDesc::default(),
            clock: SceneClock::new(),
        }
    }

    pub fn settings(&self) -> &SceneSettings {
        &self.settings
    }

    /// Applies a new settings snapshot, re-resolving tree colors only when the
    /// palette actually changed
    pub fn apply_settings(&mut self, settings: SceneSettings) -> SettingsChange {
        let change = SettingsChange {
            palette: settings.palette != self.settings.palette,
            greeting: settings.greeting != self.settings.greeting,
        };

        if change.palette {
            self.tree.apply_palette(settings.palette);
            log::info!("Palette switched to '{}'", settings.palette.palette().name);
        }
        if change.greeting {
            log::debug!("Greeting changed to {:?}", settings.greeting.as_str());
        }

        self.settings = settings;
        change
    }

    /// Advances the clock and returns this frame's animation values
    pub fn advance(&mut self) -> FrameState {
        self.clock.tick();
        FrameState::at(self.clock.elapsed())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn seeded_scene() -> Scene {
        Scene::with_rng(SceneSettings::default(), &mut StdRng::seed_from_u64(2024))
    }

    #[test]
    fn test_scene_population() {
        let scene = seeded_scene();
        assert_eq!(scene.tree.field.len(), particles::TREE_PARTICLE_COUNT);
        assert_eq!(scene.snow.len(), particles::SNOW_PARTICLE_COUNT);
        assert_eq!(scene.sky.len(), particles::SKY_STAR_COUNT);
        assert_eq!(scene.settings().greeting.as_str(), "Merry Christmas");
    }

    #[test]
    fn test_apply_settings_reports_changes() {
        let mut scene = seeded_scene();
        let _ = scene.tree.take_dirty_colors();

        let same = scene.apply_settings(SceneSettings::default());
        assert!(!same.any());
        assert!(scene.tree.take_dirty_colors().is_none());

        let mut next = SceneSettings::default();
        next.palette = PaletteIndex::clamped(2);
        let change = scene.apply_settings(next.clone());
        assert!(change.palette);
        assert!(!change.greeting);
        assert!(scene.tree.take_dirty_colors().is_some());

        next.greeting = Greeting::new("Happy New Year");
        let change = scene.apply_settings(next);
        assert_eq!(change, SettingsChange { palette: false, greeting: true });
        assert!(scene.tree.take_dirty_colors().is_none());
    }

    #[test]
    fn test_palette_switch_leaves_other_fields() {
        let mut scene = seeded_scene();
        let snow = scene.snow.clone();
        let sky = scene.sky.clone();
        let tree_field = scene.tree.field.clone();

        scene.apply_settings(SceneSettings {
            palette: PaletteIndex::clamped(6),
            ..SceneSettings::default()
        });

        assert_eq!(scene.snow, snow);
        assert_eq!(scene.sky, sky);
        assert_eq!(scene.tree.field, tree_field);
    }

    #[test]
    fn test_light_rig_defaults() {
        let rig = LightRig::default();
        assert_eq!(rig.ambient, 0.2);
        assert_eq!(rig.lights.len(), 3);

        let spot = rig.lights[0].spot.map(|cone| cone.cos_range());
        let (inner, outer) = spot.unwrap_or_default();
        assert!((outer - 0.15f32.cos()).abs() < 1e-6);
        assert_eq!(inner, 1.0);

        let star_light = rig.lights[2];
        assert_eq!(star_light.distance, 18.0);
        assert_eq!(star_light.intensity, 5.0);
    }

    #[test]
    fn test_frame_state() {
        let frame = FrameState::at(0.0);
        assert_eq!(frame.tree_rotation, 0.0);
        assert_eq!(
            frame.star.height,
            animation::HALO_HEIGHT + animation::STAR_LIFT
        );
        assert_eq!(frame.halo.scale, 7.5);
        assert!((frame.halo.opacity - 0.6).abs() < 1e-6);
    }
}
