//! The boolean compositor: an ordered subtraction set with deferred,
//! single-pass recombination.

use knobcad_engine::{EngineError, GeometryEngine, SolidId};

/// Tracks the solids currently removed from the body and the composite
/// they produce.
///
/// Membership changes only mark the compositor dirty; the actual boolean
/// pass runs once per [`BooleanCompositor::resolve`], so an update batch
/// touching the cavity and three splines still costs one recombination.
#[derive(Debug, Default)]
pub struct BooleanCompositor {
    members: Vec<SolidId>,
    final_solid: Option<SolidId>,
    final_is_body: bool,
    dirty: bool,
}

impl BooleanCompositor {
    /// Empty compositor.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a solid for subtraction. Insertion order is the
    /// subtraction order.
    pub fn add_member(&mut self, id: SolidId) {
        self.members.push(id);
        self.dirty = true;
    }

    /// Drop a member (typically because it is being disposed). A no-op
    /// for solids that never were members.
    pub fn remove_member(&mut self, id: SolidId) {
        if let Some(pos) = self.members.iter().position(|&m| m == id) {
            self.members.remove(pos);
            self.dirty = true;
        }
    }

    /// Force recombination on the next resolve (body replaced).
    pub fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    /// Whether a resolve would actually recombine.
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Number of registered members.
    pub fn member_count(&self) -> usize {
        self.members.len()
    }

    /// The current composite, if one has been resolved.
    pub fn final_solid(&self) -> Option<SolidId> {
        self.final_solid
    }

    /// Release the composite ahead of a body regeneration. When the
    /// composite *is* the body, the body's owner disposes it instead.
    pub fn release_final<E: GeometryEngine>(&mut self, engine: &mut E) {
        if let Some(prev) = self.final_solid.take() {
            if !self.final_is_body {
                engine.dispose(prev);
            }
        }
        self.dirty = true;
    }

    /// Produce the composite for `body`.
    ///
    /// Clean compositors return the cached composite. An empty
    /// subtraction set yields `body` itself, with no boolean performed;
    /// otherwise one pairwise subtraction pass runs in insertion order
    /// and the previous composite is discarded.
    pub fn resolve<E: GeometryEngine>(
        &mut self,
        body: SolidId,
        engine: &mut E,
    ) -> Result<SolidId, EngineError> {
        if !self.dirty {
            if let Some(current) = self.final_solid {
                return Ok(current);
            }
        }
        self.release_final(engine);

        let composite = if self.members.is_empty() {
            self.final_is_body = true;
            body
        } else {
            self.final_is_body = false;
            engine.boolean_subtract(body, &self.members)?
        };
        self.final_solid = Some(composite);
        self.dirty = false;
        Ok(composite)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use knobcad_engine::MeshEngine;
    use knobcad_math::Point2;

    fn cylinder(engine: &mut MeshEngine, radius: f64, height: f64) -> SolidId {
        engine.revolve(
            &[
                Point2::new(0.0, 0.0),
                Point2::new(radius, 0.0),
                Point2::new(radius, height),
                Point2::new(0.0, height),
            ],
            None,
        )
    }

    #[test]
    fn empty_set_reuses_the_body() {
        let mut engine = MeshEngine::new();
        let body = cylinder(&mut engine, 15.0, 30.0);
        let mut compositor = BooleanCompositor::new();
        compositor.mark_dirty();
        let composite = compositor.resolve(body, &mut engine).unwrap();
        assert_eq!(composite, body);
        assert_eq!(engine.booleans_performed(), 0);
    }

    #[test]
    fn resolve_is_cached_until_dirty() {
        let mut engine = MeshEngine::new();
        let body = cylinder(&mut engine, 15.0, 30.0);
        let hole = cylinder(&mut engine, 5.0, 8.0);
        let mut compositor = BooleanCompositor::new();
        compositor.add_member(hole);

        let first = compositor.resolve(body, &mut engine).unwrap();
        let second = compositor.resolve(body, &mut engine).unwrap();
        assert_eq!(first, second);
        assert_eq!(engine.booleans_performed(), 1);
    }

    #[test]
    fn member_removal_marks_dirty_and_restores_identity() {
        let mut engine = MeshEngine::new();
        let body = cylinder(&mut engine, 15.0, 30.0);
        let hole = cylinder(&mut engine, 5.0, 8.0);
        let mut compositor = BooleanCompositor::new();
        compositor.add_member(hole);
        let composite = compositor.resolve(body, &mut engine).unwrap();
        assert_ne!(composite, body);

        compositor.remove_member(hole);
        engine.dispose(hole);
        let restored = compositor.resolve(body, &mut engine).unwrap();
        assert_eq!(restored, body);
        // the stale composite was released
        assert!(engine.world_mesh(composite).is_err());
    }
}
