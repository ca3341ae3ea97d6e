#![warn(missing_docs)]

//! Triangle-mesh construction for the knobcad kernel.
//!
//! Every solid the generator produces is a closed triangle mesh built by
//! one of the constructors in [`build`] or [`primitives`]: a lathe
//! (revolution of an axis-to-axis loop), a ribbon (stitched station
//! cross-sections), a straight extrusion with fan caps, or one of the
//! small knurling polyhedra.
//!
//! Meshes use the flat `f32` vertex / `u32` index layout shared with the
//! renderer and the STL exporter; all construction math is `f64`.

use knobcad_math::{Point3, Transform};

pub mod build;
pub mod primitives;

/// Minimum squared cross product for a triangle to be kept.
const DEGENERATE_AREA_SQ: f64 = 1e-20;

/// An indexed triangle mesh.
#[derive(Debug, Clone, Default)]
pub struct TriangleMesh {
    /// Flat vertex positions: `[x0, y0, z0, x1, y1, z1, ...]`.
    pub vertices: Vec<f32>,
    /// Flat triangle indices: `[i0, i1, i2, ...]`.
    pub indices: Vec<u32>,
}

impl TriangleMesh {
    /// Create an empty mesh.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of triangles.
    pub fn num_triangles(&self) -> usize {
        self.indices.len() / 3
    }

    /// Number of vertices.
    pub fn num_vertices(&self) -> usize {
        self.vertices.len() / 3
    }

    /// Append a vertex, returning its index.
    pub fn push_vertex(&mut self, p: Point3) -> u32 {
        let idx = self.num_vertices() as u32;
        self.vertices.push(p.x as f32);
        self.vertices.push(p.y as f32);
        self.vertices.push(p.z as f32);
        idx
    }

    /// Vertex position by index.
    pub fn vertex(&self, idx: u32) -> Point3 {
        let i = idx as usize * 3;
        Point3::new(
            self.vertices[i] as f64,
            self.vertices[i + 1] as f64,
            self.vertices[i + 2] as f64,
        )
    }

    /// Corner positions of triangle `t`.
    pub fn triangle(&self, t: usize) -> [Point3; 3] {
        let i = t * 3;
        [
            self.vertex(self.indices[i]),
            self.vertex(self.indices[i + 1]),
            self.vertex(self.indices[i + 2]),
        ]
    }

    /// Append a triangle unconditionally.
    pub fn push_triangle(&mut self, a: u32, b: u32, c: u32) {
        self.indices.push(a);
        self.indices.push(b);
        self.indices.push(c);
    }

    /// Append a triangle unless it is degenerate (near-zero area).
    ///
    /// Collapsed ribbon caps and axis-touching lathe spans produce
    /// sliver triangles that would feed zero-length normals into the
    /// boolean stage; they are dropped here.
    pub fn push_triangle_checked(&mut self, a: u32, b: u32, c: u32) -> bool {
        let pa = self.vertex(a);
        let pb = self.vertex(b);
        let pc = self.vertex(c);
        let cross = (pb - pa).cross(&(pc - pa));
        if cross.norm_squared() < DEGENERATE_AREA_SQ {
            return false;
        }
        self.push_triangle(a, b, c);
        true
    }

    /// Merge another mesh into this one.
    pub fn merge(&mut self, other: &TriangleMesh) {
        let offset = self.num_vertices() as u32;
        self.vertices.extend_from_slice(&other.vertices);
        self.indices.extend(other.indices.iter().map(|&i| i + offset));
    }

    /// A copy with every vertex transformed.
    pub fn transformed(&self, transform: &Transform) -> TriangleMesh {
        let mut out = TriangleMesh {
            vertices: Vec::with_capacity(self.vertices.len()),
            indices: self.indices.clone(),
        };
        for v in self.vertices.chunks(3) {
            let p = transform.apply_point(&Point3::new(v[0] as f64, v[1] as f64, v[2] as f64));
            out.vertices.push(p.x as f32);
            out.vertices.push(p.y as f32);
            out.vertices.push(p.z as f32);
        }
        out
    }

    /// Reverse the winding of every triangle in place.
    pub fn flip(&mut self) {
        for tri in self.indices.chunks_mut(3) {
            tri.swap(1, 2);
        }
    }

    /// Signed enclosed volume (divergence theorem over triangles).
    ///
    /// Positive when triangles wind outward.
    pub fn signed_volume(&self) -> f64 {
        let mut vol = 0.0;
        for t in 0..self.num_triangles() {
            let [v0, v1, v2] = self.triangle(t);
            vol += v0.x * (v1.y * v2.z - v2.y * v1.z) - v1.x * (v0.y * v2.z - v2.y * v0.z)
                + v2.x * (v0.y * v1.z - v1.y * v0.z);
        }
        vol / 6.0
    }

    /// Enclosed volume, orientation-independent.
    pub fn volume(&self) -> f64 {
        self.signed_volume().abs()
    }

    /// Ensure triangles wind outward, flipping the whole mesh if its
    /// signed volume is negative.
    pub fn oriented_outward(mut self) -> Self {
        if self.signed_volume() < 0.0 {
            self.flip();
        }
        self
    }

    /// Axis-aligned bounding box, or `None` for an empty mesh.
    pub fn bounding_box(&self) -> Option<Aabb> {
        if self.vertices.is_empty() {
            return None;
        }
        let mut bbox = Aabb {
            min: Point3::new(f64::MAX, f64::MAX, f64::MAX),
            max: Point3::new(f64::MIN, f64::MIN, f64::MIN),
        };
        for v in self.vertices.chunks(3) {
            bbox.extend(Point3::new(v[0] as f64, v[1] as f64, v[2] as f64));
        }
        Some(bbox)
    }
}

/// Axis-aligned bounding box.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    /// Minimum corner.
    pub min: Point3,
    /// Maximum corner.
    pub max: Point3,
}

impl Aabb {
    /// Grow to contain `p`.
    pub fn extend(&mut self, p: Point3) {
        self.min.x = self.min.x.min(p.x);
        self.min.y = self.min.y.min(p.y);
        self.min.z = self.min.z.min(p.z);
        self.max.x = self.max.x.max(p.x);
        self.max.y = self.max.y.max(p.y);
        self.max.z = self.max.z.max(p.z);
    }

    /// Largest horizontal distance from the vertical axis, i.e. the
    /// silhouette radius of a revolved solid.
    pub fn radial_extent(&self) -> f64 {
        self.min
            .x
            .abs()
            .max(self.max.x.abs())
            .max(self.min.z.abs())
            .max(self.max.z.abs())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use knobcad_math::Point2;

    #[test]
    fn volume_of_lathed_cylinder() {
        // r=10, h=30 cylinder; a 64-gon underestimates πr²h slightly.
        let shape = [
            Point2::new(0.0, 0.0),
            Point2::new(10.0, 0.0),
            Point2::new(10.0, 30.0),
            Point2::new(0.0, 30.0),
        ];
        let mesh = build::lathe(&shape, None);
        let expected = std::f64::consts::PI * 100.0 * 30.0;
        let vol = mesh.volume();
        assert!(
            (vol - expected).abs() / expected < 0.02,
            "expected ~{expected}, got {vol}"
        );
        assert!(mesh.signed_volume() > 0.0, "lathe should wind outward");
    }

    #[test]
    fn faceted_lathe_matches_prism_volume() {
        let shape = [
            Point2::new(0.0, 0.0),
            Point2::new(5.0, 0.0),
            Point2::new(5.0, 4.0),
            Point2::new(0.0, 4.0),
        ];
        let mesh = build::lathe(&shape, Some(6));
        // hexagonal prism: 3√3/2 · r² · h
        let expected = 1.5 * 3.0f64.sqrt() * 25.0 * 4.0;
        assert_relative_eq!(mesh.volume(), expected, max_relative = 1e-4);
    }

    #[test]
    fn oriented_outward_flips_inverted_meshes() {
        let shape = [
            Point2::new(0.0, 0.0),
            Point2::new(3.0, 0.0),
            Point2::new(3.0, 3.0),
            Point2::new(0.0, 3.0),
        ];
        let mut mesh = build::lathe(&shape, Some(8));
        mesh.flip();
        assert!(mesh.signed_volume() < 0.0);
        let fixed = mesh.oriented_outward();
        assert!(fixed.signed_volume() > 0.0);
    }

    #[test]
    fn bounding_box_and_radial_extent() {
        let shape = [
            Point2::new(0.0, 0.0),
            Point2::new(7.0, 0.0),
            Point2::new(7.0, 2.0),
            Point2::new(0.0, 2.0),
        ];
        let bbox = build::lathe(&shape, None).bounding_box().unwrap();
        assert_relative_eq!(bbox.max.y, 2.0, epsilon = 1e-6);
        assert_relative_eq!(bbox.radial_extent(), 7.0, epsilon = 1e-3);
    }

    #[test]
    fn degenerate_triangles_are_dropped() {
        let mut mesh = TriangleMesh::new();
        let a = mesh.push_vertex(Point3::new(0.0, 0.0, 0.0));
        let b = mesh.push_vertex(Point3::new(1.0, 0.0, 0.0));
        let c = mesh.push_vertex(Point3::new(2.0, 0.0, 0.0));
        assert!(!mesh.push_triangle_checked(a, b, c));
        assert_eq!(mesh.num_triangles(), 0);
    }
}
