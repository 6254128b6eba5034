//! # Color Palettes
//!
//! Eight built-in themes of four colors each. Tree particles carry a fixed
//! color slot chosen at generation time; the displayed color of a particle is
//! `palette[slot % palette.len()]`. Switching themes therefore only rewrites
//! the color channel of the tree, never its geometry.

use crate::error::{EvergreenError, Result};

/// Number of colors in every palette
pub const PALETTE_SIZE: usize = 4;

/// Number of built-in palettes
pub const PALETTE_COUNT: usize = 8;

/// A linear RGB color
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl Color {
    pub const WHITE: Color = Color::new(1.0, 1.0, 1.0);

    pub const fn new(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b }
    }

    /// Creates a linear color from a packed sRGB value (0xRRGGBB).
    pub fn from_srgb_hex(hex: u32) -> Self {
        Self {
            r: srgb_to_linear(((hex >> 16) & 0xFF) as f32 / 255.0),
            g: srgb_to_linear(((hex >> 8) & 0xFF) as f32 / 255.0),
            b: srgb_to_linear((hex & 0xFF) as f32 / 255.0),
        }
    }

    /// Returns the color encoded back to sRGB, for display in the UI.
    pub fn to_srgb(self) -> [f32; 3] {
        [
            linear_to_srgb(self.r),
            linear_to_srgb(self.g),
            linear_to_srgb(self.b),
        ]
    }

    pub fn to_array(self) -> [f32; 3] {
        [self.r, self.g, self.b]
    }
}

impl From<Color> for [f32; 3] {
    fn from(color: Color) -> Self {
        color.to_array()
    }
}

fn srgb_to_linear(c: f32) -> f32 {
    if c <= 0.04045 {
        c / 12.92
    } else {
        ((c + 0.055) / 1.055).powf(2.4)
    }
}

fn linear_to_srgb(c: f32) -> f32 {
    if c <= 0.0031308 {
        c * 12.92
    } else {
        1.055 * c.powf(1.0 / 2.4) - 0.055
    }
}

/// A named, fixed-size list of colors selectable as a unit
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Palette {
    pub name: &'static str,
    swatches: [u32; PALETTE_SIZE],
}

impl Palette {
    const fn new(name: &'static str, swatches: [u32; PALETTE_SIZE]) -> Self {
        Self { name, swatches }
    }

    /// Packed sRGB swatches as declared
    pub fn swatches(&self) -> &[u32; PALETTE_SIZE] {
        &self.swatches
    }

    /// Linear colors of this palette, in declaration order
    pub fn colors(&self) -> [Color; PALETTE_SIZE] {
        self.swatches.map(Color::from_srgb_hex)
    }

    pub fn len(&self) -> usize {
        self.swatches.len()
    }

    pub fn is_empty(&self) -> bool {
        self.swatches.is_empty()
    }

    /// Resolves a color slot to one of this palette's colors (cyclic)
    pub fn resolve(&self, slot: u32) -> Color {
        Color::from_srgb_hex(self.swatches[slot as usize % self.swatches.len()])
    }
}

/// The built-in themes, in swatch order
pub const PALETTES: [Palette; PALETTE_COUNT] = [
    Palette::new("Classic", [0xff0000, 0x00ff00, 0xffd700, 0xffffff]),
    Palette::new("Frozen", [0xcaf0f8, 0x90e0ef, 0x00b4d8, 0xffffff]),
    Palette::new("Pastel", [0xcdb4db, 0xffc8dd, 0xffafcc, 0xbde0fe]),
    Palette::new("Sunset", [0xffbe0b, 0xfb5607, 0xff006e, 0x8338ec]),
    Palette::new("Royal", [0x7b2cbf, 0x9d4edd, 0xe0aaff, 0xffffff]),
    Palette::new("Gold", [0xffd700, 0xdaa520, 0xeee8aa, 0xfafad2]),
    Palette::new("Candy Cane", [0xff0000, 0xffffff, 0xff4d4d, 0xf0f0f0]),
    Palette::new("Vivid", [0x390099, 0x9e0059, 0xff0054, 0xffbd00]),
];

/// Index of a built-in palette, guaranteed to be in `0..PALETTE_COUNT`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct PaletteIndex(usize);

impl PaletteIndex {
    /// Validates a raw index, rejecting anything outside the palette list
    pub fn new(index: usize) -> Result<Self> {
        if index < PALETTE_COUNT {
            Ok(Self(index))
        } else {
            Err(EvergreenError::PaletteIndexOutOfRange {
                index,
                len: PALETTE_COUNT,
            })
        }
    }

    /// Saturates a raw index into the valid range
    pub fn clamped(index: usize) -> Self {
        Self(index.min(PALETTE_COUNT - 1))
    }

    pub fn get(self) -> usize {
        self.0
    }

    pub fn palette(self) -> &'static Palette {
        &PALETTES[self.0]
    }

    /// All valid indices, in swatch order
    pub fn all() -> impl Iterator<Item = PaletteIndex> {
        (0..PALETTE_COUNT).map(PaletteIndex)
    }
}

/// Resolves every slot against `palette`, writing linear RGB into `out`.
///
/// `slots` and `out` must have the same length.
pub fn resolve_colors(palette: &Palette, slots: &[u32], out: &mut [[f32; 3]]) {
    debug_assert_eq!(slots.len(), out.len());
    let colors = palette.colors();
    for (slot, color) in slots.iter().zip(out.iter_mut()) {
        *color = colors[*slot as usize % colors.len()].to_array();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_palette_index_validation() {
        assert!(PaletteIndex::new(0).is_ok());
        assert_eq!(PaletteIndex::new(7).map(PaletteIndex::get).ok(), Some(7));
        assert!(matches!(
            PaletteIndex::new(8),
            Err(EvergreenError::PaletteIndexOutOfRange { index: 8, len: 8 })
        ));
        assert!(PaletteIndex::new(usize::MAX).is_err());
    }

    #[test]
    fn test_palette_index_clamping() {
        assert_eq!(PaletteIndex::clamped(3).get(), 3);
        assert_eq!(PaletteIndex::clamped(8).get(), 7);
        assert_eq!(PaletteIndex::clamped(1000).get(), 7);
        assert_eq!(PaletteIndex::default().get(), 0);
    }

    #[test]
    fn test_srgb_hex_conversion() {
        let red = Color::from_srgb_hex(0xff0000);
        assert_eq!(red, Color::new(1.0, 0.0, 0.0));

        let mid = Color::from_srgb_hex(0x808080);
        assert!((mid.r - 0.2158605).abs() < 1e-4);

        let back = mid.to_srgb();
        assert!((back[0] - 128.0 / 255.0).abs() < 1e-4);
    }

    #[test]
    fn test_resolve_is_cyclic() {
        let palette = PALETTES[3];
        let colors = palette.colors();
        for slot in 0..100u32 {
            assert_eq!(palette.resolve(slot), colors[slot as usize % PALETTE_SIZE]);
        }
    }

    #[test]
    fn test_resolve_colors_stays_in_palette() {
        let slots: Vec<u32> = (0..100).collect();
        let mut out = vec![[0.0; 3]; slots.len()];

        for index in PaletteIndex::all() {
            let palette = index.palette();
            resolve_colors(palette, &slots, &mut out);
            let declared: Vec<[f32; 3]> = palette.colors().iter().map(|c| c.to_array()).collect();
            assert!(out.iter().all(|c| declared.contains(c)), "{}", palette.name);
        }
    }

    #[test]
    fn test_builtin_palettes() {
        assert_eq!(PALETTES.len(), PALETTE_COUNT);
        assert!(PALETTES.iter().all(|p| p.len() == PALETTE_SIZE));
        assert_eq!(PALETTES[0].name, "Classic");
        assert_eq!(PALETTES[7].swatches()[3], 0xffbd00);
    }
}
