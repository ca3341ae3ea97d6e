#![warn(missing_docs)]

//! The geometry engine seam of the knob generator.
//!
//! Builders never touch meshes directly; they ask a [`GeometryEngine`]
//! for solids and get back opaque [`SolidId`] handles. The production
//! implementation is [`MeshEngine`], an arena of shared triangle meshes
//! with a per-solid transform. Instancing shares the underlying mesh, so
//! a knurling pattern with hundreds of cells stores one cell geometry.

use std::sync::Arc;

use knobcad_math::{Point2, Point3, Transform};
use knobcad_mesh::{build, TriangleMesh};
use slotmap::SlotMap;
use thiserror::Error;

slotmap::new_key_type! {
    /// Handle to a solid owned by a geometry engine.
    pub struct SolidId;
}

/// Engine-level failures. Degenerate geometry is not an error; only
/// misuse of handles is.
#[derive(Debug, Error)]
pub enum EngineError {
    /// A handle referred to a solid that was never created or was
    /// already disposed.
    #[error("unknown or disposed solid {0:?}")]
    UnknownSolid(SolidId),
}

/// Abstract solid-modelling capability consumed by the kernel.
///
/// Creation methods accept geometry and return a fresh handle; they do
/// not fail on degenerate input (an empty shape yields an empty solid,
/// which the callers guard against earlier). Handle-consuming methods
/// return [`EngineError::UnknownSolid`] on stale handles.
pub trait GeometryEngine {
    /// Revolve a closed axis-to-axis loop around the vertical axis.
    /// `sides` of `Some(n >= 3)` facets the lathe, `None` is smooth.
    fn revolve(&mut self, shape: &[Point2], sides: Option<u32>) -> SolidId;

    /// Extrude a closed 2D cross-section along a polyline path.
    fn extrude_along_path(&mut self, shape: &[Point2], path: &[Point3], capped: bool) -> SolidId;

    /// Stitch station cross-sections into a ribbon solid.
    fn build_ribbon(&mut self, path_array: &[Vec<Point3>]) -> SolidId;

    /// Adopt a prebuilt mesh as a solid.
    fn polyhedron(&mut self, mesh: TriangleMesh) -> SolidId;

    /// Create an instance sharing `source`'s geometry with its own
    /// transform (initially the source's transform).
    fn instance(&mut self, source: SolidId) -> Result<SolidId, EngineError>;

    /// Replace a solid's world transform.
    fn set_transform(&mut self, solid: SolidId, transform: Transform) -> Result<(), EngineError>;

    /// Subtract `cutters` from `base` in order, producing a new solid.
    /// Inputs are left alive; disposal stays with the caller.
    fn boolean_subtract(&mut self, base: SolidId, cutters: &[SolidId])
        -> Result<SolidId, EngineError>;

    /// Release a solid. Disposing a stale handle is a no-op.
    fn dispose(&mut self, solid: SolidId);

    /// The solid's mesh with its transform applied.
    fn world_mesh(&self, solid: SolidId) -> Result<TriangleMesh, EngineError>;

    /// Number of live solids (instances included).
    fn live_solids(&self) -> usize;
}

struct SolidRecord {
    mesh: Arc<TriangleMesh>,
    transform: Transform,
}

/// In-process mesh-backed engine.
#[derive(Default)]
pub struct MeshEngine {
    solids: SlotMap<SolidId, SolidRecord>,
    booleans_performed: usize,
}

impl MeshEngine {
    /// Create an empty engine.
    pub fn new() -> Self {
        Self::default()
    }

    /// Total pairwise boolean subtractions performed so far.
    pub fn booleans_performed(&self) -> usize {
        self.booleans_performed
    }

    /// Whether two handles share one underlying geometry allocation.
    pub fn shares_geometry(&self, a: SolidId, b: SolidId) -> Result<bool, EngineError> {
        let ra = self.solids.get(a).ok_or(EngineError::UnknownSolid(a))?;
        let rb = self.solids.get(b).ok_or(EngineError::UnknownSolid(b))?;
        Ok(Arc::ptr_eq(&ra.mesh, &rb.mesh))
    }

    fn adopt(&mut self, mesh: TriangleMesh) -> SolidId {
        self.solids.insert(SolidRecord {
            mesh: Arc::new(mesh),
            transform: Transform::identity(),
        })
    }

    fn record(&self, id: SolidId) -> Result<&SolidRecord, EngineError> {
        self.solids.get(id).ok_or(EngineError::UnknownSolid(id))
    }
}

impl GeometryEngine for MeshEngine {
    fn revolve(&mut self, shape: &[Point2], sides: Option<u32>) -> SolidId {
        self.adopt(build::lathe(shape, sides).oriented_outward())
    }

    fn extrude_along_path(&mut self, shape: &[Point2], path: &[Point3], capped: bool) -> SolidId {
        self.adopt(build::extrude_along_path(shape, path, capped).oriented_outward())
    }

    fn build_ribbon(&mut self, path_array: &[Vec<Point3>]) -> SolidId {
        self.adopt(build::ribbon(path_array).oriented_outward())
    }

    fn polyhedron(&mut self, mesh: TriangleMesh) -> SolidId {
        self.adopt(mesh.oriented_outward())
    }

    fn instance(&mut self, source: SolidId) -> Result<SolidId, EngineError> {
        let rec = self.record(source)?;
        let (mesh, transform) = (Arc::clone(&rec.mesh), rec.transform.clone());
        Ok(self.solids.insert(SolidRecord { mesh, transform }))
    }

    fn set_transform(&mut self, solid: SolidId, transform: Transform) -> Result<(), EngineError> {
        let rec = self
            .solids
            .get_mut(solid)
            .ok_or(EngineError::UnknownSolid(solid))?;
        rec.transform = transform;
        Ok(())
    }

    fn boolean_subtract(
        &mut self,
        base: SolidId,
        cutters: &[SolidId],
    ) -> Result<SolidId, EngineError> {
        let mut result = self.world_mesh(base)?;
        for &cutter in cutters {
            let cutter_mesh = self.world_mesh(cutter)?;
            result = knobcad_booleans::subtract(&result, &cutter_mesh);
            self.booleans_performed += 1;
        }
        Ok(self.adopt(result))
    }

    fn dispose(&mut self, solid: SolidId) {
        self.solids.remove(solid);
    }

    fn world_mesh(&self, solid: SolidId) -> Result<TriangleMesh, EngineError> {
        let rec = self.record(solid)?;
        Ok(rec.mesh.transformed(&rec.transform))
    }

    fn live_solids(&self) -> usize {
        self.solids.len()
    }
}
