#![warn(missing_docs)]

//! Boolean subtraction of closed triangle meshes.
//!
//! The generator only ever subtracts: cavities, subtractive knurling and
//! keyways are all cut out of the body in one pass. Both operands are
//! converted to polygon BSP trees, clipped against each other, and the
//! surviving polygons re-triangulated into a mesh.

use knobcad_math::Point3;
use knobcad_mesh::TriangleMesh;

pub mod bsp;

use bsp::{Node, Polygon};

/// Compute `a - b`.
///
/// Both meshes must be closed and wound outward. Disjoint bounding boxes
/// short-circuit to a copy of `a`; an empty subtrahend does the same.
pub fn subtract(a: &TriangleMesh, b: &TriangleMesh) -> TriangleMesh {
    if b.num_triangles() == 0 || a.num_triangles() == 0 || !boxes_touch(a, b) {
        return a.clone();
    }

    let mut tree_a = Node::from_polygons(mesh_to_polygons(a));
    let mut tree_b = Node::from_polygons(mesh_to_polygons(b));

    tree_a.invert();
    tree_a.clip_to(&tree_b);
    tree_b.clip_to(&tree_a);
    tree_b.invert();
    tree_b.clip_to(&tree_a);
    tree_b.invert();
    tree_a.build(tree_b.all_polygons());
    tree_a.invert();

    polygons_to_mesh(&tree_a.all_polygons())
}

fn boxes_touch(a: &TriangleMesh, b: &TriangleMesh) -> bool {
    match (a.bounding_box(), b.bounding_box()) {
        (Some(ba), Some(bb)) => {
            ba.min.x <= bb.max.x
                && bb.min.x <= ba.max.x
                && ba.min.y <= bb.max.y
                && bb.min.y <= ba.max.y
                && ba.min.z <= bb.max.z
                && bb.min.z <= ba.max.z
        }
        _ => false,
    }
}

fn mesh_to_polygons(mesh: &TriangleMesh) -> Vec<Polygon> {
    (0..mesh.num_triangles())
        .filter_map(|t| Polygon::new(mesh.triangle(t).to_vec()))
        .collect()
}

fn polygons_to_mesh(polygons: &[Polygon]) -> TriangleMesh {
    let mut mesh = TriangleMesh::new();
    for poly in polygons {
        let first = mesh.push_vertex(poly.vertices[0]);
        let mut prev = mesh.push_vertex(poly.vertices[1]);
        for v in &poly.vertices[2..] {
            let cur = mesh.push_vertex(*v);
            mesh.push_triangle_checked(first, prev, cur);
            prev = cur;
        }
    }
    mesh
}

/// Test whether `point` lies inside a closed mesh by parity of ray
/// crossings (Möller-Trumbore along a fixed skew direction).
pub fn point_in_mesh(mesh: &TriangleMesh, point: &Point3) -> bool {
    // skew direction with distinct components; equal x/z would put the
    // ray on a ring-boundary meridian of every power-of-two lathe
    let dir = knobcad_math::Vec3::new(0.531, 0.693, 0.487);
    let mut crossings = 0u32;
    for t in 0..mesh.num_triangles() {
        let [v0, v1, v2] = mesh.triangle(t);
        let e1 = v1 - v0;
        let e2 = v2 - v0;
        let p = dir.cross(&e2);
        let det = e1.dot(&p);
        if det.abs() < 1e-12 {
            continue;
        }
        let inv = 1.0 / det;
        let s = point - v0;
        let u = s.dot(&p) * inv;
        // half-open bounds so a hit on a shared edge counts once
        if !(0.0..1.0).contains(&u) {
            continue;
        }
        let q = s.cross(&e1);
        let v = dir.dot(&q) * inv;
        if v < 0.0 || u + v >= 1.0 {
            continue;
        }
        if e2.dot(&q) * inv > 1e-12 {
            crossings += 1;
        }
    }
    crossings % 2 == 1
}
