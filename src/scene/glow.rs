//! Procedural radial gradient used for the star's glow halo

/// Side length of the square glow texture, in pixels
pub const GLOW_TEXTURE_SIZE: u32 = 128;

/// Gradient stops: offset in `[0, 1]` from the center, then RGBA
/// (color in 0..=255, alpha in 0..=1)
pub const GLOW_STOPS: [(f32, [f32; 4]); 4] = [
    (0.0, [255.0, 255.0, 220.0, 1.0]),
    (0.2, [255.0, 220.0, 100.0, 0.8]),
    (0.5, [255.0, 200.0, 0.0, 0.2]),
    (1.0, [0.0, 0.0, 0.0, 0.0]),
];

/// RGBA8 image, rows top to bottom
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GlowImage {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<u8>,
}

impl GlowImage {
    pub fn pixel(&self, x: u32, y: u32) -> [u8; 4] {
        let i = ((y * self.width + x) * 4) as usize;
        [
            self.pixels[i],
            self.pixels[i + 1],
            self.pixels[i + 2],
            self.pixels[i + 3],
        ]
    }
}

/// Samples the gradient at normalized distance `d` from the center.
///
/// Distances past the last stop take the last stop's color.
pub fn glow_color(d: f32) -> [f32; 4] {
    let d = d.clamp(0.0, 1.0);
    for pair in GLOW_STOPS.windows(2) {
        let (t0, c0) = pair[0];
        let (t1, c1) = pair[1];
        if d <= t1 {
            let f = (d - t0) / (t1 - t0);
            return std::array::from_fn(|i| c0[i] + (c1[i] - c0[i]) * f);
        }
    }
    GLOW_STOPS[GLOW_STOPS.len() - 1].1
}

/// Rasterizes the glow gradient into a `size`×`size` RGBA8 image.
///
/// The gradient is centered on the image with radius `size / 2`; each pixel is
/// sampled at its center.
pub fn rasterize_glow(size: u32) -> GlowImage {
    let half = size as f32 * 0.5;
    let mut pixels = Vec::with_capacity((size * size * 4) as usize);

    for y in 0..size {
        for x in 0..size {
            let dx = x as f32 + 0.5 - half;
            let dy = y as f32 + 0.5 - half;
            let d = (dx * dx + dy * dy).sqrt() / half;
            let [r, g, b, a] = glow_color(d);
            pixels.extend_from_slice(&[
                to_byte(r),
                to_byte(g),
                to_byte(b),
                to_byte(a * 255.0),
            ]);
        }
    }

    GlowImage {
        width: size,
        height: size,
        pixels,
    }
}

fn to_byte(v: f32) -> u8 {
    v.round().clamp(0.0, 255.0) as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_glow_dimensions() {
        let image = rasterize_glow(GLOW_TEXTURE_SIZE);
        assert_eq!(image.width, 128);
        assert_eq!(image.height, 128);
        assert_eq!(image.pixels.len(), 128 * 128 * 4);
    }

    #[test]
    fn test_glow_center_is_warm_and_opaque() {
        assert_eq!(glow_color(0.0), [255.0, 255.0, 220.0, 1.0]);

        let image = rasterize_glow(GLOW_TEXTURE_SIZE);
        let [r, g, b, a] = image.pixel(64, 64);
        assert_eq!(r, 255);
        assert!(g >= 250);
        assert!((210..=220).contains(&b));
        assert!(a >= 250);
    }

    #[test]
    fn test_glow_corners_are_transparent() {
        let image = rasterize_glow(GLOW_TEXTURE_SIZE);
        for (x, y) in [(0, 0), (127, 0), (0, 127), (127, 127)] {
            assert_eq!(image.pixel(x, y), [0, 0, 0, 0]);
        }
    }

    #[test]
    fn test_glow_alpha_falls_off() {
        let image = rasterize_glow(GLOW_TEXTURE_SIZE);
        let row: Vec<u8> = (64..128).map(|x| image.pixel(x, 64)[3]).collect();
        assert!(row.windows(2).all(|w| w[1] <= w[0]));

        assert_eq!(glow_color(0.2)[3], 0.8);
        assert!((glow_color(0.35)[3] - 0.5).abs() < 1e-6);
        assert_eq!(glow_color(2.0), [0.0, 0.0, 0.0, 0.0]);
    }
}
