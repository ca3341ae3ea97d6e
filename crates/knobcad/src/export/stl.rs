//! ASCII STL emission.
//!
//! The printer-facing convention is Z-up, so the internal Y-up
//! coordinates are emitted with y and z swapped. Winding comes straight
//! from each mesh's index buffer; instanced solids must be expanded to
//! world-space meshes before emission.

use std::fmt::Write;

use knobcad_math::Point3;
use knobcad_mesh::TriangleMesh;
use rayon::prelude::*;

/// Name in the `solid` header, matching common slicer expectations.
const SOLID_NAME: &str = "stlmesh";

/// Serialize a set of world-space meshes as one ASCII STL document.
pub fn to_ascii_stl(meshes: &[TriangleMesh]) -> String {
    let facets: String = meshes
        .par_iter()
        .map(mesh_facets)
        .collect::<Vec<_>>()
        .concat();
    format!("solid {SOLID_NAME}\r\n{facets}endsolid {SOLID_NAME}\r\n")
}

fn mesh_facets(mesh: &TriangleMesh) -> String {
    let mut out = String::new();
    for t in 0..mesh.num_triangles() {
        let [p1, p2, p3] = mesh.triangle(t).map(swap_yz);
        let n = (p3 - p2).cross(&(p1 - p2));
        let n = if n.norm_squared() > 0.0 {
            n.normalize()
        } else {
            n
        };
        let _ = write!(
            out,
            "facet normal {} {} {}\r\n\touter loop\r\n",
            n.x, n.y, n.z
        );
        for p in [p1, p2, p3] {
            let _ = write!(out, "\t\tvertex {} {} {}\r\n", p.x, p.y, p.z);
        }
        out.push_str("\tendloop\r\nendfacet\r\n");
    }
    out
}

fn swap_yz(p: Point3) -> Point3 {
    Point3::new(p.x, p.z, p.y)
}

#[cfg(test)]
mod tests {
    use super::*;
    use knobcad_math::Point2;
    use knobcad_mesh::build;

    #[test]
    fn document_structure() {
        let mesh = build::lathe(
            &[
                Point2::new(0.0, 0.0),
                Point2::new(2.0, 0.0),
                Point2::new(2.0, 5.0),
                Point2::new(0.0, 5.0),
            ],
            Some(6),
        );
        let stl = to_ascii_stl(&[mesh.clone()]);
        assert!(stl.starts_with("solid stlmesh\r\n"));
        assert!(stl.ends_with("endsolid stlmesh\r\n"));
        assert_eq!(stl.matches("facet normal").count(), mesh.num_triangles());
        assert_eq!(stl.matches("vertex").count(), mesh.num_triangles() * 3);
    }

    #[test]
    fn height_lands_on_the_z_axis() {
        let mesh = build::lathe(
            &[
                Point2::new(0.0, 0.0),
                Point2::new(1.0, 0.0),
                Point2::new(1.0, 9.0),
                Point2::new(0.0, 9.0),
            ],
            Some(4),
        );
        let stl = to_ascii_stl(&[mesh]);
        // y-up 9 becomes the third (z) coordinate
        assert!(stl.contains("vertex 0 0 9"));
    }

    #[test]
    fn empty_scene_is_a_valid_document() {
        let stl = to_ascii_stl(&[]);
        assert_eq!(stl, "solid stlmesh\r\nendsolid stlmesh\r\n");
    }
}
