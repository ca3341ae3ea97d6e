//! Small closed polyhedra used as knurling cells.
//!
//! Every primitive is centered on the x/y origin with its base in the
//! z = 0 plane, extending to `z = depth`. The placement transform rotates
//! z onto the outward surface normal, so "depth" always reads as the
//! height of the bump above the knob surface.

use knobcad_math::{Point2, Point3};

use crate::{build, TriangleMesh};

/// Facet count for round knurl cells.
const ROUND_SEGMENTS: u32 = 16;

/// Rectangular-base pyramid with its apex at `(0, 0, depth)`.
pub fn pyramid(size_x: f64, size_y: f64, depth: f64) -> TriangleMesh {
    let (hx, hy) = (size_x / 2.0, size_y / 2.0);
    let mut mesh = TriangleMesh::new();
    let base = [
        mesh.push_vertex(Point3::new(-hx, -hy, 0.0)),
        mesh.push_vertex(Point3::new(hx, -hy, 0.0)),
        mesh.push_vertex(Point3::new(hx, hy, 0.0)),
        mesh.push_vertex(Point3::new(-hx, hy, 0.0)),
    ];
    let apex = mesh.push_vertex(Point3::new(0.0, 0.0, depth));
    mesh.push_triangle_checked(base[0], base[2], base[1]);
    mesh.push_triangle_checked(base[0], base[3], base[2]);
    for i in 0..4 {
        mesh.push_triangle_checked(base[i], base[(i + 1) % 4], apex);
    }
    mesh.oriented_outward()
}

/// Axis-aligned box.
pub fn box_mesh(size_x: f64, size_y: f64, depth: f64) -> TriangleMesh {
    let (hx, hy) = (size_x / 2.0, size_y / 2.0);
    let mut mesh = TriangleMesh::new();
    let mut v = [0u32; 8];
    for (i, (x, y, z)) in [
        (-hx, -hy, 0.0),
        (hx, -hy, 0.0),
        (hx, hy, 0.0),
        (-hx, hy, 0.0),
        (-hx, -hy, depth),
        (hx, -hy, depth),
        (hx, hy, depth),
        (-hx, hy, depth),
    ]
    .into_iter()
    .enumerate()
    {
        v[i] = mesh.push_vertex(Point3::new(x, y, z));
    }
    for [a, b, c, d] in [
        [0, 3, 2, 1], // bottom, -z
        [4, 5, 6, 7], // top, +z
        [0, 1, 5, 4], // -y
        [2, 3, 7, 6], // +y
        [1, 2, 6, 5], // +x
        [3, 0, 4, 7], // -x
    ] {
        mesh.push_triangle_checked(v[a], v[b], v[c]);
        mesh.push_triangle_checked(v[a], v[c], v[d]);
    }
    mesh.oriented_outward()
}

/// Cylinder, or a cone when `radius_top` is zero.
pub fn cylinder(radius_bottom: f64, radius_top: f64, depth: f64) -> TriangleMesh {
    let n = ROUND_SEGMENTS as usize;
    let step = 2.0 * std::f64::consts::PI / n as f64;
    let mut mesh = TriangleMesh::new();

    let ring = |mesh: &mut TriangleMesh, radius: f64, z: f64| -> Vec<u32> {
        (0..n)
            .map(|i| {
                let (sin, cos) = (i as f64 * step).sin_cos();
                mesh.push_vertex(Point3::new(cos * radius, sin * radius, z))
            })
            .collect()
    };

    let bottom = ring(&mut mesh, radius_bottom, 0.0);
    let center_bottom = mesh.push_vertex(Point3::new(0.0, 0.0, 0.0));
    for i in 0..n {
        mesh.push_triangle_checked(center_bottom, bottom[(i + 1) % n], bottom[i]);
    }

    if radius_top.abs() < f64::EPSILON {
        let apex = mesh.push_vertex(Point3::new(0.0, 0.0, depth));
        for i in 0..n {
            mesh.push_triangle_checked(bottom[i], bottom[(i + 1) % n], apex);
        }
    } else {
        let top = ring(&mut mesh, radius_top, depth);
        for i in 0..n {
            let j = (i + 1) % n;
            mesh.push_triangle_checked(bottom[i], bottom[j], top[j]);
            mesh.push_triangle_checked(bottom[i], top[j], top[i]);
        }
        let center_top = mesh.push_vertex(Point3::new(0.0, 0.0, depth));
        for i in 0..n {
            mesh.push_triangle_checked(center_top, top[i], top[(i + 1) % n]);
        }
    }
    mesh.oriented_outward()
}

/// Triangular prism: a ridge of width `size_x` running along y, rising
/// to a crest line at `z = depth`.
pub fn wedge(size_x: f64, size_y: f64, depth: f64) -> TriangleMesh {
    let (hx, hy) = (size_x / 2.0, size_y / 2.0);
    let shape = [
        Point2::new(-hx, 0.0),
        Point2::new(hx, 0.0),
        Point2::new(0.0, depth),
        Point2::new(-hx, 0.0),
    ];
    // a vertical path maps shape x to world x and shape y to world z
    let path = [Point3::new(0.0, -hy, 0.0), Point3::new(0.0, hy, 0.0)];
    build::extrude_along_path(&shape, &path, true).oriented_outward()
}
