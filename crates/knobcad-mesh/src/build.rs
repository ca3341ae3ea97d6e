//! Swept-solid constructors: lathe, ribbon, straight extrusion.

use knobcad_math::{Point2, Point3, Vec3};

use crate::TriangleMesh;

/// Angular resolution of a smooth lathe.
pub const DEFAULT_LATHE_SEGMENTS: u32 = 64;

/// Revolve a closed axis-to-axis loop around the vertical axis.
///
/// `shape` is the meridian polyline in (radius, height) coordinates,
/// running bottom axis point → side curve → top axis point. `sides`
/// facets the revolution; `None` uses [`DEFAULT_LATHE_SEGMENTS`].
pub fn lathe(shape: &[Point2], sides: Option<u32>) -> TriangleMesh {
    let n = sides.unwrap_or(DEFAULT_LATHE_SEGMENTS).max(3) as usize;
    let m = shape.len();
    let mut mesh = TriangleMesh::new();
    if m < 2 {
        return mesh;
    }

    let step = 2.0 * std::f64::consts::PI / n as f64;
    for i in 0..n {
        let (sin, cos) = (i as f64 * step).sin_cos();
        for p in shape {
            mesh.push_vertex(Point3::new(p.x * sin, p.y, p.x * cos));
        }
    }

    let idx = |ring: usize, point: usize| (ring % n * m + point) as u32;
    for i in 0..n {
        for j in 0..m - 1 {
            let a = idx(i, j);
            let b = idx(i, j + 1);
            let c = idx(i + 1, j + 1);
            let d = idx(i + 1, j);
            mesh.push_triangle_checked(a, d, c);
            mesh.push_triangle_checked(a, c, b);
        }
    }
    mesh
}

/// Stitch a sequence of station cross-sections into one ribbon solid.
///
/// Each row is one cross-section; rows are joined pairwise by quads.
/// A closed solid needs closed rows (first point repeated) and collapsed
/// end rows, which the feature builders supply.
pub fn ribbon(path_array: &[Vec<Point3>]) -> TriangleMesh {
    let mut mesh = TriangleMesh::new();
    if path_array.len() < 2 {
        return mesh;
    }
    let cols = path_array.iter().map(Vec::len).min().unwrap_or(0);
    if cols < 2 {
        return mesh;
    }

    for row in path_array {
        for p in &row[..cols] {
            mesh.push_vertex(*p);
        }
    }

    let idx = |row: usize, col: usize| (row * cols + col) as u32;
    for r in 0..path_array.len() - 1 {
        for c in 0..cols - 1 {
            let a = idx(r, c);
            let b = idx(r, c + 1);
            let c2 = idx(r + 1, c + 1);
            let d = idx(r + 1, c);
            mesh.push_triangle_checked(a, b, c2);
            mesh.push_triangle_checked(a, c2, d);
        }
    }
    mesh
}

/// Extrude a closed 2D shape along a polyline path, with optional fan
/// caps at both ends.
///
/// The shape's x/y axes map onto a frame perpendicular to the local path
/// tangent; a vertical path maps shape x to world x and shape y to
/// world z, matching the placement the pointer wedges expect.
pub fn extrude_along_path(shape: &[Point2], path: &[Point3], capped: bool) -> TriangleMesh {
    let mut mesh = TriangleMesh::new();
    if shape.len() < 3 || path.len() < 2 {
        return mesh;
    }

    let rings = path.len();
    let cols = shape.len();
    for (i, origin) in path.iter().enumerate() {
        let seg = i.min(path.len() - 2);
        let (u, v) = frame_for(path[seg + 1] - path[seg]);
        for p in shape {
            mesh.push_vertex(origin + u * p.x + v * p.y);
        }
    }

    let idx = |ring: usize, col: usize| (ring * cols + col) as u32;
    for r in 0..rings - 1 {
        for c in 0..cols - 1 {
            let a = idx(r, c);
            let b = idx(r, c + 1);
            let c2 = idx(r + 1, c + 1);
            let d = idx(r + 1, c);
            mesh.push_triangle_checked(a, b, c2);
            mesh.push_triangle_checked(a, c2, d);
        }
    }

    if capped {
        for (ring, reversed) in [(0usize, true), (rings - 1, false)] {
            let centroid = ring_centroid(&mesh, ring, cols);
            let center = mesh.push_vertex(centroid);
            for c in 0..cols - 1 {
                let p0 = idx(ring, c);
                let p1 = idx(ring, c + 1);
                if reversed {
                    mesh.push_triangle_checked(center, p1, p0);
                } else {
                    mesh.push_triangle_checked(center, p0, p1);
                }
            }
        }
    }
    mesh
}

/// Barycenter of one extrusion ring.
fn ring_centroid(mesh: &TriangleMesh, ring: usize, cols: usize) -> Point3 {
    let mut sum = Vec3::zeros();
    for c in 0..cols {
        sum += mesh.vertex((ring * cols + c) as u32).coords;
    }
    Point3::from(sum / cols as f64)
}

/// Collapse a cross-section row to its barycenter, closing a ribbon end.
pub fn centered_row(row: &[Point3]) -> Vec<Point3> {
    let mut barycenter = Vec3::zeros();
    for p in row {
        barycenter += p.coords;
    }
    let center = Point3::from(barycenter / row.len().max(1) as f64);
    vec![center; row.len()]
}

fn frame_for(tangent: Vec3) -> (Vec3, Vec3) {
    let t = tangent.normalize();
    if t.y.abs() > 0.999 {
        (Vec3::x(), Vec3::z())
    } else {
        let u = Vec3::y().cross(&t).normalize();
        let v = t.cross(&u);
        (u, v)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn extruded_square_prism_volume() {
        let shape = [
            Point2::new(-1.0, -1.0),
            Point2::new(1.0, -1.0),
            Point2::new(1.0, 1.0),
            Point2::new(-1.0, 1.0),
            Point2::new(-1.0, -1.0),
        ];
        let path = [Point3::new(0.0, 0.0, 0.0), Point3::new(0.0, 0.0, 5.0)];
        let mesh = extrude_along_path(&shape, &path, true).oriented_outward();
        assert_relative_eq!(mesh.volume(), 20.0, max_relative = 1e-9);
    }

    #[test]
    fn vertical_extrusion_maps_shape_y_to_world_z() {
        let shape = [
            Point2::new(0.0, 1.0),
            Point2::new(-1.0, -1.0),
            Point2::new(1.0, -1.0),
            Point2::new(0.0, 1.0),
        ];
        let path = [Point3::new(0.0, 2.0, 0.0), Point3::new(0.0, 4.0, 0.0)];
        let mesh = extrude_along_path(&shape, &path, true);
        let bbox = mesh.bounding_box().unwrap();
        assert_relative_eq!(bbox.min.y, 2.0);
        assert_relative_eq!(bbox.max.y, 4.0);
        assert_relative_eq!(bbox.max.z, 1.0);
        assert_relative_eq!(bbox.min.z, -1.0);
    }

    #[test]
    fn ribbon_with_collapsed_ends_is_closed() {
        // Square tube swept straight up, ends collapsed to centroids.
        let section = |y: f64| -> Vec<Point3> {
            vec![
                Point3::new(-1.0, y, -1.0),
                Point3::new(1.0, y, -1.0),
                Point3::new(1.0, y, 1.0),
                Point3::new(-1.0, y, 1.0),
                Point3::new(-1.0, y, -1.0),
            ]
        };
        let mut rows = vec![section(0.0), section(3.0)];
        rows.insert(0, centered_row(&rows[0]));
        rows.push(centered_row(rows.last().unwrap()));
        let mesh = ribbon(&rows).oriented_outward();
        // prism body plus two pyramidal end caps of zero height: caps are
        // flat fans in the end planes, so the volume is the prism's.
        assert_relative_eq!(mesh.volume(), 12.0, max_relative = 1e-9);
    }

    #[test]
    fn lathe_of_single_point_profile_is_empty_enough() {
        let mesh = lathe(&[Point2::new(0.0, 0.0)], None);
        assert_eq!(mesh.num_triangles(), 0);
    }
}
