//! # Primitive Shape Generation
//!
//! The two meshes of the scene: the ground plane and the extruded star.
//! Both are generated with flat normals and counter-clockwise winding.

use super::GeometryData;
use std::f32::consts::PI;

/// Generate a flat plane in the XZ plane, centered at the origin, facing +Y
pub fn generate_plane(width: f32, depth: f32, width_segments: u32, depth_segments: u32) -> GeometryData {
    let mut data = GeometryData::new();

    let w_segs = width_segments.max(1);
    let d_segs = depth_segments.max(1);

    for z in 0..=d_segs {
        let v = z as f32 / d_segs as f32;
        let pos_z = (v - 0.5) * depth;

        for x in 0..=w_segs {
            let u = x as f32 / w_segs as f32;
            let pos_x = (u - 0.5) * width;

            data.vertices.push([pos_x, 0.0, pos_z]);
            data.normals.push([0.0, 1.0, 0.0]);
            data.tex_coords.push([u, v]);
        }
    }

    // Counter-clockwise when viewed from above
    for z in 0..d_segs {
        for x in 0..w_segs {
            let i = z * (w_segs + 1) + x;
            let next_row = i + w_segs + 1;

            data.indices.push(i);
            data.indices.push(next_row);
            data.indices.push(i + 1);

            data.indices.push(next_row);
            data.indices.push(next_row + 1);
            data.indices.push(i + 1);
        }
    }

    data
}

/// Outline of a star in the XY plane, first vertex pointing up (+Y).
///
/// Vertices alternate between `outer` and `inner` radius and run clockwise,
/// `2 * points` in total.
pub fn star_outline(points: usize, outer: f32, inner: f32) -> Vec<[f32; 2]> {
    let count = points.max(2) * 2;
    (0..count)
        .map(|k| {
            let angle = k as f32 * PI / points.max(2) as f32;
            let radius = if k % 2 == 0 { outer } else { inner };
            [radius * angle.sin(), radius * angle.cos()]
        })
        .collect()
}

/// Rounded edge between the star's caps and its side walls
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StarBevel {
    /// How far the walls stand out from the outline
    pub size: f32,
    /// How far each cap sits beyond the extruded body
    pub thickness: f32,
    pub segments: u32,
}

impl StarBevel {
    pub const NONE: StarBevel = StarBevel {
        size: 0.0,
        thickness: 0.0,
        segments: 0,
    };
}

/// Longest miter, relative to the bevel size, at sharp corners
const MAX_MITER: f32 = std::f32::consts::SQRT_2;

/// Extrude a star outline along +Z, from `z = 0` to `z = depth`
///
/// With a bevel the caps move out to `-thickness` and `depth + thickness`
/// and quarter-round rings connect them to walls grown by `size`. Caps are
/// fan-triangulated from the center, which is valid because a star polygon
/// is star-shaped about its center. Every wall and bevel quad gets its own
/// flat normal.
pub fn generate_star(points: usize, outer: f32, inner: f32, depth: f32, bevel: StarBevel) -> GeometryData {
    let outline = star_outline(points, outer, inner);
    let miters = outline_miters(&outline);
    let n = outline.len();
    let mut data = GeometryData::new();

    // (z, outward offset, side) per ring, back cap to front cap
    let mut rings: Vec<(f32, f32, f32)> = Vec::new();
    if bevel.segments == 0 {
        rings.push((0.0, 0.0, 0.0));
        rings.push((depth, 0.0, 0.0));
    } else {
        let steps = bevel.segments;
        let quarter = |b: u32| b as f32 / steps as f32 * PI * 0.5;
        for b in 0..=steps {
            let a = quarter(b);
            rings.push((-bevel.thickness * a.cos(), bevel.size * a.sin(), -1.0));
        }
        for b in (0..=steps).rev() {
            let a = quarter(b);
            rings.push((depth + bevel.thickness * a.cos(), bevel.size * a.sin(), 1.0));
        }
    }
    let ring_point = |k: usize, (z, offset, _): (f32, f32, f32)| -> [f32; 3] {
        let p = outline[k % n];
        let m = miters[k % n];
        [p[0] + m[0] * offset, p[1] + m[1] * offset, z]
    };

    // Caps: back faces -Z, front faces +Z
    let caps = [(rings[0], -1.0), (rings[rings.len() - 1], 1.0)];
    for (ring, normal_z) in caps {
        let center = data.vertices.len() as u32;
        data.vertices.push([0.0, 0.0, ring.0]);
        data.normals.push([0.0, 0.0, normal_z]);
        data.tex_coords.push([0.5, 0.5]);

        for k in 0..n {
            let p = ring_point(k, ring);
            data.vertices.push(p);
            data.normals.push([0.0, 0.0, normal_z]);
            data.tex_coords.push([0.5 + p[0] / (2.0 * outer), 0.5 - p[1] / (2.0 * outer)]);
        }

        for k in 0..n as u32 {
            let a = center + 1 + k;
            let b = center + 1 + (k + 1) % n as u32;
            // The outline is clockwise seen from +Z
            if normal_z > 0.0 {
                data.indices.extend_from_slice(&[center, b, a]);
            } else {
                data.indices.extend_from_slice(&[center, a, b]);
            }
        }
    }

    // Bevel rings and side walls
    for pair in rings.windows(2) {
        let (r0, r1) = (pair[0], pair[1]);
        let side = if r0.2 == r1.2 { r0.2 } else { 0.0 };
        for k in 0..n {
            let p0 = outline[k];
            let p1 = outline[(k + 1) % n];
            let (dx, dy) = (p1[0] - p0[0], p1[1] - p0[1]);
            let hint = [-dy, dx, side * (dx * dx + dy * dy).sqrt()];

            let quad = [
                ring_point(k, r0),
                ring_point(k + 1, r0),
                ring_point(k, r1),
                ring_point(k + 1, r1),
            ];
            let mut normal = normalize(cross(sub(quad[1], quad[0]), sub(quad[2], quad[0])));
            let flip = dot3(normal, hint) < 0.0;
            if flip {
                normal = [-normal[0], -normal[1], -normal[2]];
            }

            let base = data.vertices.len() as u32;
            for (p, uv) in quad.into_iter().zip([[0.0, 0.0], [1.0, 0.0], [0.0, 1.0], [1.0, 1.0]]) {
                data.vertices.push(p);
                data.normals.push(normal);
                data.tex_coords.push(uv);
            }

            if flip {
                data.indices.extend_from_slice(&[base, base + 2, base + 1]);
                data.indices.extend_from_slice(&[base + 1, base + 2, base + 3]);
            } else {
                data.indices.extend_from_slice(&[base, base + 1, base + 2]);
                data.indices.extend_from_slice(&[base + 1, base + 3, base + 2]);
            }
        }
    }

    data
}

/// Per-vertex outward miter vectors for a clockwise outline, scaled so an
/// offset of 1 moves each edge out by 1 (capped at sharp tips)
fn outline_miters(outline: &[[f32; 2]]) -> Vec<[f32; 2]> {
    let n = outline.len();
    let edge_normal = |a: [f32; 2], b: [f32; 2]| {
        let (dx, dy) = (b[0] - a[0], b[1] - a[1]);
        let len = (dx * dx + dy * dy).sqrt().max(f32::EPSILON);
        [-dy / len, dx / len]
    };

    (0..n)
        .map(|k| {
            let prev = edge_normal(outline[(k + n - 1) % n], outline[k]);
            let next = edge_normal(outline[k], outline[(k + 1) % n]);
            let sum = [prev[0] + next[0], prev[1] + next[1]];
            let len = (sum[0] * sum[0] + sum[1] * sum[1]).sqrt();
            if len < f32::EPSILON {
                return next;
            }
            let dir = [sum[0] / len, sum[1] / len];
            let cos_half = dir[0] * next[0] + dir[1] * next[1];
            let scale = (1.0 / cos_half.max(f32::EPSILON)).min(MAX_MITER);
            [dir[0] * scale, dir[1] * scale]
        })
        .collect()
}

fn sub(a: [f32; 3], b: [f32; 3]) -> [f32; 3] {
    [a[0] - b[0], a[1] - b[1], a[2] - b[2]]
}

fn cross(u: [f32; 3], v: [f32; 3]) -> [f32; 3] {
    [
        u[1] * v[2] - u[2] * v[1],
        u[2] * v[0] - u[0] * v[2],
        u[0] * v[1] - u[1] * v[0],
    ]
}

fn dot3(a: [f32; 3], b: [f32; 3]) -> f32 {
    a[0] * b[0] + a[1] * b[1] + a[2] * b[2]
}

fn normalize(v: [f32; 3]) -> [f32; 3] {
    let len = dot3(v, v).sqrt().max(f32::EPSILON);
    [v[0] / len, v[1] / len, v[2] / len]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn triangle_normal(data: &GeometryData, tri: usize) -> [f32; 3] {
        let [a, b, c] = [0, 1, 2].map(|k| data.vertices[data.indices[tri * 3 + k] as usize]);
        let u = [b[0] - a[0], b[1] - a[1], b[2] - a[2]];
        let v = [c[0] - a[0], c[1] - a[1], c[2] - a[2]];
        [
            u[1] * v[2] - u[2] * v[1],
            u[2] * v[0] - u[0] * v[2],
            u[0] * v[1] - u[1] * v[0],
        ]
    }

    fn dot(a: [f32; 3], b: [f32; 3]) -> f32 {
        a[0] * b[0] + a[1] * b[1] + a[2] * b[2]
    }

    #[test]
    fn test_plane_generation() {
        let plane = generate_plane(2.0, 2.0, 2, 2);
        assert_eq!(plane.vertices.len(), 9); // 3x3 grid
        assert_eq!(plane.indices.len(), 24); // 4 quads * 2 triangles * 3 indices
        assert!(plane.vertices.iter().all(|v| v[1] == 0.0));
        assert!(triangle_normal(&plane, 0)[1] > 0.0);
    }

    #[test]
    fn test_star_outline() {
        let outline = star_outline(5, 2.0, 0.9);
        assert_eq!(outline.len(), 10);
        assert!(outline[0][0].abs() < 1e-6);
        assert!((outline[0][1] - 2.0).abs() < 1e-6);

        for (k, p) in outline.iter().enumerate() {
            let r = (p[0] * p[0] + p[1] * p[1]).sqrt();
            let expected = if k % 2 == 0 { 2.0 } else { 0.9 };
            assert!((r - expected).abs() < 1e-5, "vertex {k}");
        }
    }

    #[test]
    fn test_star_generation() {
        let star = generate_star(5, 2.0, 0.9, 0.4, StarBevel::NONE);
        assert_eq!(star.vertex_count(), 2 * 11 + 10 * 4);
        assert_eq!(star.triangle_count(), 2 * 10 + 10 * 2);
        assert_eq!(star.vertices.len(), star.normals.len());
        // Extruded from the outline plane towards +Z
        assert!(star.vertices.iter().all(|v| (-1e-6..=0.4 + 1e-6).contains(&v[2])));
    }

    #[test]
    fn test_beveled_star_extent() {
        let bevel = StarBevel {
            size: 0.15,
            thickness: 0.15,
            segments: 2,
        };
        let star = generate_star(5, 2.0, 0.9, 0.4, bevel);

        // Six rings: two caps, three gaps per bevel side plus the wall
        assert_eq!(star.vertex_count(), 2 * 11 + 5 * 10 * 4);
        assert_eq!(star.triangle_count(), 2 * 10 + 5 * 10 * 2);

        let (min_z, max_z) = star
            .vertices
            .iter()
            .fold((f32::MAX, f32::MIN), |(lo, hi), v| (lo.min(v[2]), hi.max(v[2])));
        assert!((min_z + 0.15).abs() < 1e-5);
        assert!((max_z - 0.55).abs() < 1e-5);

        // The walls stand out past the plain outline, caps do not
        let radius = |v: &[f32; 3]| (v[0] * v[0] + v[1] * v[1]).sqrt();
        assert!(star.vertices.iter().any(|v| radius(v) > 2.0 + 0.1));
        let cap_tip = star.vertices[1];
        assert!((radius(&cap_tip) - 2.0).abs() < 1e-5);
    }

    #[test]
    fn test_star_winding_matches_normals() {
        let bevel = StarBevel {
            size: 0.15,
            thickness: 0.15,
            segments: 2,
        };
        for star in [
            generate_star(5, 2.0, 0.9, 0.4, StarBevel::NONE),
            generate_star(5, 2.0, 0.9, 0.4, bevel),
        ] {
            for tri in 0..star.triangle_count() {
                let first = star.indices[tri * 3] as usize;
                let face = triangle_normal(&star, tri);
                assert!(dot(face, star.normals[first]) > 0.0, "triangle {tri}");
            }
        }
    }
}
