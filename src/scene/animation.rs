//! # Per-Frame Animation
//!
//! A single scene clock drives every moving part. The particle displacement
//! functions below are evaluated on the GPU (see `particles.wgsl`); the Rust
//! versions compute the same closed forms for host-side objects such as the
//! star and for tests.

use std::f32::consts::TAU;
use std::time::{Duration, Instant};

/// Vertical span of the snow volume; snow wraps modulo this height
pub const SNOW_WRAP_HEIGHT: f32 = 60.0;
/// Point size numerators for perspective attenuation
pub const TREE_POINT_SCALE: f32 = 350.0;
pub const SNOW_POINT_SCALE: f32 = 450.0;
pub const SKY_POINT_SCALE: f32 = 30.0;

/// Y rotation rate of the tree group, radians per second
pub const TREE_SPIN_RATE: f32 = 0.15;
/// Y rotation rate of the star, radians per second
pub const STAR_SPIN_RATE: f32 = 0.4;
/// Height of the star group; the halo and the star light sit at its origin
pub const HALO_HEIGHT: f32 = 6.8;
/// The star floats this far above its group origin
pub const STAR_LIFT: f32 = 7.0;

const MIN_DELTA: Duration = Duration::from_micros(100);
const MAX_DELTA: Duration = Duration::from_millis(250);

/// Monotonic scene clock
///
/// `elapsed` is the total time since the scene started and is what the shaders
/// see. `delta` is clamped so that long stalls (window drags, breakpoints) do
/// not make the camera jump.
#[derive(Debug, Clone)]
pub struct SceneClock {
    start: Instant,
    last: Instant,
    elapsed: f32,
    delta: f32,
    frame_index: u64,
}

impl SceneClock {
    pub fn new() -> Self {
        Self::starting_at(Instant::now())
    }

    pub fn starting_at(start: Instant) -> Self {
        Self {
            start,
            last: start,
            elapsed: 0.0,
            delta: 0.0,
            frame_index: 0,
        }
    }

    /// Advances the clock to the current instant
    pub fn tick(&mut self) {
        self.tick_at(Instant::now());
    }

    pub fn tick_at(&mut self, now: Instant) {
        let raw = now.saturating_duration_since(self.last);
        self.delta = raw.clamp(MIN_DELTA, MAX_DELTA).as_secs_f32();
        self.elapsed = now.saturating_duration_since(self.start).as_secs_f32();
        self.last = now;
        self.frame_index += 1;
    }

    /// Seconds since scene start
    pub fn elapsed(&self) -> f32 {
        self.elapsed
    }

    /// Clamped seconds since the previous tick
    pub fn delta(&self) -> f32 {
        self.delta
    }

    pub fn frame_index(&self) -> u64 {
        self.frame_index
    }
}

impl Default for SceneClock {
    fn default() -> Self {
        Self::new()
    }
}

/// Mathematical modulo, always in `[0, m)` for positive `m`
pub fn wrap(value: f32, m: f32) -> f32 {
    let r = value.rem_euclid(m);
    // rem_euclid can round up to exactly `m` for tiny negative inputs
    if r >= m {
        0.0
    } else {
        r
    }
}

pub fn snow_fall_speed(random: f32) -> f32 {
    1.0 + random * 1.5
}

/// Animated position of a snowflake spawned at `base` with per-flake random `r`
pub fn snow_position(base: [f32; 3], random: f32, t: f32) -> [f32; 3] {
    let fall = snow_fall_speed(random);
    let sway = 0.5 + random;
    let half = SNOW_WRAP_HEIGHT * 0.5;
    [
        base[0] + (t * 0.5 + random * 15.0).sin() * sway,
        wrap(base[1] - t * fall, SNOW_WRAP_HEIGHT) - half,
        base[2] + (t * 0.3 + random * 15.0).cos() * sway,
    ]
}

/// Flicker opacity of a snowflake, clamped to be non-negative
pub fn snow_alpha(random: f32, t: f32) -> f32 {
    (0.4 + 0.6 * (t * 2.0 + random * 10.0).sin()).max(0.0)
}

/// Breathing offset of a tree particle, in the tree's local frame
pub fn tree_displacement(base: [f32; 3], speed: f32, offset: f32, t: f32) -> [f32; 3] {
    let breathe = (t * speed + offset).sin() * 0.1;
    [
        base[0] + breathe * base[0],
        base[1] + (t * 0.5 + offset).sin() * 0.05,
        base[2] + breathe * base[2],
    ]
}

/// Twinkle multiplier applied to a tree particle's point size
pub fn tree_point_scale(offset: f32, t: f32) -> f32 {
    1.0 + (t * 3.0 + offset).sin() * 0.3
}

/// Screen-space point size for a particle of `size` at view depth `depth`
pub fn attenuated_point_size(size: f32, scale: f32, depth: f32) -> f32 {
    size * (scale / depth.max(1e-3))
}

/// Rotation of the tree group about Y at time `t`
pub fn tree_rotation(t: f32) -> f32 {
    (t * TREE_SPIN_RATE).rem_euclid(TAU)
}

/// Rotates `p` about the Y axis by `angle` radians
pub fn rotate_y(p: [f32; 3], angle: f32) -> [f32; 3] {
    let (s, c) = angle.sin_cos();
    [c * p[0] + s * p[2], p[1], -s * p[0] + c * p[2]]
}

/// Placement of the star at a given time
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StarPose {
    pub height: f32,
    pub rotation: f32,
}

pub fn star_pose(t: f32) -> StarPose {
    StarPose {
        height: HALO_HEIGHT + STAR_LIFT + (t * 1.5).sin() * 0.15,
        rotation: (t * STAR_SPIN_RATE).rem_euclid(TAU),
    }
}

/// Size and opacity of the glow halo behind the star
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HaloPulse {
    pub scale: f32,
    pub opacity: f32,
}

pub fn halo_pulse(t: f32) -> HaloPulse {
    HaloPulse {
        scale: 7.5 + (t * 2.0).sin() * 0.5,
        opacity: 0.6 + (t * 3.0).sin() * 0.1,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn wrapped_distance(a: f32, b: f32) -> f32 {
        let d = wrap(a - b, SNOW_WRAP_HEIGHT);
        d.min(SNOW_WRAP_HEIGHT - d)
    }

    #[test]
    fn test_wrap_is_mathematical_modulo() {
        assert_eq!(wrap(5.0, 60.0), 5.0);
        assert_eq!(wrap(-5.0, 60.0), 55.0);
        assert_eq!(wrap(125.0, 60.0), 5.0);
        assert!((0.0..60.0).contains(&wrap(-1e-9, 60.0)));
    }

    #[test]
    fn test_snow_progression_modulo_height() {
        let base = [3.0, 12.0, -7.0];
        for &random in &[0.0, 0.25, 0.9] {
            let fall = snow_fall_speed(random);
            for &(t1, t2) in &[(0.0, 1.0), (2.5, 40.0), (10.0, 123.4)] {
                let y1 = snow_position(base, random, t1)[1];
                let y2 = snow_position(base, random, t2)[1];
                let expected = -fall * (t2 - t1);
                assert!(
                    wrapped_distance(y2 - y1, expected) < 1e-2,
                    "r={random} t1={t1} t2={t2}"
                );
            }
        }
    }

    #[test]
    fn test_snow_stays_in_volume() {
        for step in 0..200 {
            let t = step as f32 * 0.37;
            let y = snow_position([0.0, 29.9, 0.0], 0.5, t)[1];
            assert!((-30.0..30.0).contains(&y));
        }
    }

    #[test]
    fn test_snow_alpha_non_negative() {
        for step in 0..100 {
            let a = snow_alpha(0.3, step as f32 * 0.1);
            assert!((0.0..=1.001).contains(&a));
        }
    }

    #[test]
    fn test_tree_displacement() {
        let base = [2.0, 1.0, -1.0];
        let p = tree_displacement(base, 1.0, 0.0, 0.0);
        assert_eq!(p, base);

        let t = std::f32::consts::FRAC_PI_2;
        let p = tree_displacement(base, 1.0, 0.0, t);
        assert!((p[0] - 2.2).abs() < 1e-5);
        assert!((p[2] + 1.1).abs() < 1e-5);
        assert!((tree_point_scale(0.0, 0.0) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_point_size_attenuation() {
        assert!((attenuated_point_size(0.5, TREE_POINT_SCALE, 25.0) - 7.0).abs() < 1e-5);
        let near = attenuated_point_size(1.0, SNOW_POINT_SCALE, 10.0);
        let far = attenuated_point_size(1.0, SNOW_POINT_SCALE, 40.0);
        assert!(near > far);
    }

    #[test]
    fn test_rotate_y_quarter_turn() {
        let p = rotate_y([1.0, 2.0, 0.0], std::f32::consts::FRAC_PI_2);
        assert!(p[0].abs() < 1e-6);
        assert_eq!(p[1], 2.0);
        assert!((p[2] + 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_star_and_halo_ranges() {
        for step in 0..100 {
            let t = step as f32 * 0.21;
            let pose = star_pose(t);
            assert!((13.64..=13.96).contains(&pose.height));
            assert!(pose.height > HALO_HEIGHT);
            assert!((0.0..TAU).contains(&pose.rotation));

            let halo = halo_pulse(t);
            assert!((6.99..=8.01).contains(&halo.scale));
            assert!((0.49..=0.71).contains(&halo.opacity));
        }
    }

    #[test]
    fn test_clock_advances() {
        let start = Instant::now();
        let mut clock = SceneClock::starting_at(start);

        clock.tick_at(start + Duration::from_millis(16));
        assert!((clock.elapsed() - 0.016).abs() < 1e-6);
        assert!((clock.delta() - 0.016).abs() < 1e-6);

        // A long stall moves elapsed time but caps the delta.
        clock.tick_at(start + Duration::from_secs(5));
        assert!((clock.elapsed() - 5.0).abs() < 1e-5);
        assert!((clock.delta() - 0.25).abs() < 1e-6);
        assert_eq!(clock.frame_index(), 2);
    }
}
