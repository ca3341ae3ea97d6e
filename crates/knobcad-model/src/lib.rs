#![warn(missing_docs)]

//! The aggregate knob model: configuration snapshot, live solids, and
//! the incremental update protocol.
//!
//! A [`KnobModel`] owns a geometry engine and every solid built from the
//! current configuration. All mutation goes through
//! [`KnobModel::update`], which expands the requested parts into their
//! invalidation cascade, regenerates each scheduled family (disposing
//! stale solids first), and recombines the boolean composite only when
//! the body or the subtraction set actually changed.

use knobcad_config::KnobConfig;
use knobcad_engine::{EngineError, GeometryEngine, SolidId};
use knobcad_features::{
    build_knurling, build_pointer, build_spline, build_thread, FeatureSolid, SplineSite,
};
use knobcad_math::Transform;
use knobcad_profile::Profile;
use thiserror::Error;

pub mod compositor;
pub mod parts;

pub use compositor::BooleanCompositor;
pub use parts::{Part, PartSet};

/// Failures during model construction or update.
#[derive(Debug, Error)]
pub enum ModelError {
    /// The geometry engine rejected an operation.
    #[error(transparent)]
    Engine(#[from] EngineError),
}

/// The aggregate root: one knob, all its live solids, one engine.
pub struct KnobModel<E: GeometryEngine> {
    engine: E,
    config: KnobConfig,
    body_profile: Profile,
    cavity_profile: Option<Profile>,
    body: Option<SolidId>,
    cavity: Option<SolidId>,
    pointer_solids: Vec<Option<SolidId>>,
    knurling: Vec<Option<FeatureSolid>>,
    splines: Vec<Option<FeatureSolid>>,
    threads: Vec<Option<FeatureSolid>>,
    internal_splines: Vec<Option<FeatureSolid>>,
    internal_threads: Vec<Option<FeatureSolid>>,
    compositor: BooleanCompositor,
}

impl<E: GeometryEngine> KnobModel<E> {
    /// Build a model from an initial configuration.
    pub fn new(config: &KnobConfig, engine: E) -> Result<Self, ModelError> {
        let mut model = Self {
            engine,
            config: KnobConfig::default(),
            body_profile: Profile::from_body(&config.body, 0.5),
            cavity_profile: None,
            body: None,
            cavity: None,
            pointer_solids: Vec::new(),
            knurling: Vec::new(),
            splines: Vec::new(),
            threads: Vec::new(),
            internal_splines: Vec::new(),
            internal_threads: Vec::new(),
            compositor: BooleanCompositor::new(),
        };
        model.update(config, None, None)?;
        Ok(model)
    }

    /// Apply a configuration update.
    ///
    /// `parts` limits regeneration to the named parts plus their
    /// dependency closure; `None` regenerates everything. `index`
    /// narrows each scheduled leaf family to a single element: only that
    /// element's config is adopted and only its solid replaced. An index
    /// pointing past either the stored or the supplied array falls back
    /// to a full rebuild of that family.
    pub fn update(
        &mut self,
        config: &KnobConfig,
        parts: Option<&[Part]>,
        index: Option<usize>,
    ) -> Result<(), ModelError> {
        let scheduled = match parts {
            None => PartSet::all(),
            Some(list) => list.iter().copied().collect::<PartSet>().closure(),
        };

        if scheduled.contains(Part::Body) {
            self.rebuild_body(config);
        }
        if scheduled.contains(Part::Pointers) {
            self.rebuild_pointers(config, index);
        }
        if scheduled.contains(Part::Cavity) {
            self.rebuild_cavity(config)?;
        }
        if scheduled.contains(Part::Knurling) {
            self.rebuild_knurling(config, index)?;
        }
        if scheduled.contains(Part::Splines) {
            self.rebuild_splines(config, index)?;
        }
        if scheduled.contains(Part::Threads) {
            self.rebuild_threads(config, index)?;
        }
        if scheduled.contains(Part::InternalSplines) {
            self.rebuild_internal_splines(config, index)?;
        }
        if scheduled.contains(Part::InternalThreads) {
            self.rebuild_internal_threads(config, index)?;
        }

        if self.compositor.is_dirty() {
            if let Some(body) = self.body {
                self.compositor.resolve(body, &mut self.engine)?;
            }
        }
        Ok(())
    }

    fn rebuild_body(&mut self, config: &KnobConfig) {
        self.compositor.release_final(&mut self.engine);
        if let Some(old) = self.body.take() {
            self.engine.dispose(old);
        }
        self.config.body = config.body.clone();
        self.body_profile = Profile::from_body(&self.config.body, 0.5);
        let id = self.engine.revolve(
            &self.body_profile.shape_loop(),
            self.config.body.lathe_sides(),
        );
        self.body = Some(id);
    }

    fn rebuild_cavity(&mut self, config: &KnobConfig) -> Result<(), ModelError> {
        if let Some(old) = self.cavity.take() {
            self.compositor.remove_member(old);
            self.engine.dispose(old);
        }
        self.cavity_profile = None;
        self.config.screw_hole = config.screw_hole.clone();

        if let Some(hole) = &self.config.screw_hole {
            let profile = Profile::from_body(&hole.shape, 1.0);
            if !profile.is_zero_length() {
                let id = self
                    .engine
                    .revolve(&profile.shape_loop(), hole.shape.lathe_sides());
                if hole.angular_offset != 0.0 {
                    self.engine
                        .set_transform(id, Transform::rotation_y(hole.angular_offset))?;
                }
                self.compositor.add_member(id);
                self.cavity = Some(id);
                self.cavity_profile = Some(profile);
            }
        }
        Ok(())
    }

    fn rebuild_pointers(&mut self, config: &KnobConfig, index: Option<usize>) {
        match index {
            Some(i) if i < self.pointer_solids.len() && i < config.pointers.len() => {
                self.config.pointers[i] = config.pointers[i];
                if let Some(old) = self.pointer_solids[i].take() {
                    self.engine.dispose(old);
                }
                self.pointer_solids[i] = build_pointer(
                    &self.config.pointers[i],
                    self.config.body.height,
                    &mut self.engine,
                );
            }
            _ => {
                for slot in std::mem::take(&mut self.pointer_solids).into_iter().flatten() {
                    self.engine.dispose(slot);
                }
                self.config.pointers = config.pointers.clone();
                let height = self.config.body.height;
                let mut rebuilt = Vec::with_capacity(self.config.pointers.len());
                for pointer in &self.config.pointers {
                    rebuilt.push(build_pointer(pointer, height, &mut self.engine));
                }
                self.pointer_solids = rebuilt;
            }
        }
    }

    fn rebuild_knurling(&mut self, config: &KnobConfig, index: Option<usize>) -> Result<(), ModelError> {
        let supplied = &config.surface.knurling;
        match index {
            Some(i) if i < self.knurling.len() && i < supplied.len() => {
                self.config.surface.knurling[i] = supplied[i];
                if let Some(old) = self.knurling[i].take() {
                    dispose_feature(&mut self.engine, &mut self.compositor, old);
                }
                let built =
                    build_knurling(&self.config.surface.knurling[i], &self.body_profile, &mut self.engine)?;
                register_feature(&mut self.compositor, built.as_ref());
                self.knurling[i] = built;
            }
            _ => {
                for old in std::mem::take(&mut self.knurling).into_iter().flatten() {
                    dispose_feature(&mut self.engine, &mut self.compositor, old);
                }
                self.config.surface.knurling = supplied.clone();
                let mut rebuilt = Vec::with_capacity(supplied.len());
                for cfg in &self.config.surface.knurling {
                    let built = build_knurling(cfg, &self.body_profile, &mut self.engine)?;
                    register_feature(&mut self.compositor, built.as_ref());
                    rebuilt.push(built);
                }
                self.knurling = rebuilt;
            }
        }
        Ok(())
    }

    fn rebuild_splines(&mut self, config: &KnobConfig, index: Option<usize>) -> Result<(), ModelError> {
        let balance = self.config.body.balance_or(0.5);
        let supplied = &config.surface.splines;
        match index {
            Some(i) if i < self.splines.len() && i < supplied.len() => {
                self.config.surface.splines[i] = supplied[i];
                if let Some(old) = self.splines[i].take() {
                    dispose_feature(&mut self.engine, &mut self.compositor, old);
                }
                let built = build_spline(
                    &self.config.surface.splines[i],
                    &self.body_profile,
                    SplineSite::Body,
                    balance,
                    &mut self.engine,
                )?;
                register_feature(&mut self.compositor, built.as_ref());
                self.splines[i] = built;
            }
            _ => {
                for old in std::mem::take(&mut self.splines).into_iter().flatten() {
                    dispose_feature(&mut self.engine, &mut self.compositor, old);
                }
                self.config.surface.splines = supplied.clone();
                let mut rebuilt = Vec::with_capacity(supplied.len());
                for cfg in &self.config.surface.splines {
                    let built = build_spline(
                        cfg,
                        &self.body_profile,
                        SplineSite::Body,
                        balance,
                        &mut self.engine,
                    )?;
                    register_feature(&mut self.compositor, built.as_ref());
                    rebuilt.push(built);
                }
                self.splines = rebuilt;
            }
        }
        Ok(())
    }

    fn rebuild_threads(&mut self, config: &KnobConfig, index: Option<usize>) -> Result<(), ModelError> {
        let supplied = &config.surface.threads;
        match index {
            Some(i) if i < self.threads.len() && i < supplied.len() => {
                self.config.surface.threads[i] = supplied[i];
                if let Some(old) = self.threads[i].take() {
                    dispose_feature(&mut self.engine, &mut self.compositor, old);
                }
                let built = build_thread(
                    &self.config.surface.threads[i],
                    &self.body_profile,
                    SplineSite::Body,
                    &mut self.engine,
                )?;
                register_feature(&mut self.compositor, built.as_ref());
                self.threads[i] = built;
            }
            _ => {
                for old in std::mem::take(&mut self.threads).into_iter().flatten() {
                    dispose_feature(&mut self.engine, &mut self.compositor, old);
                }
                self.config.surface.threads = supplied.clone();
                let mut rebuilt = Vec::with_capacity(supplied.len());
                for cfg in &self.config.surface.threads {
                    let built = build_thread(cfg, &self.body_profile, SplineSite::Body, &mut self.engine)?;
                    register_feature(&mut self.compositor, built.as_ref());
                    rebuilt.push(built);
                }
                self.threads = rebuilt;
            }
        }
        Ok(())
    }

    fn rebuild_internal_splines(
        &mut self,
        config: &KnobConfig,
        index: Option<usize>,
    ) -> Result<(), ModelError> {
        let supplied = config
            .screw_hole
            .as_ref()
            .map(|hole| hole.splines.as_slice())
            .unwrap_or(&[]);
        match index {
            Some(i) if i < self.internal_splines.len() && i < supplied.len() => {
                if let Some(hole) = &mut self.config.screw_hole {
                    hole.splines[i] = supplied[i];
                }
                if let Some(old) = self.internal_splines[i].take() {
                    dispose_feature(&mut self.engine, &mut self.compositor, old);
                }
                let (Some(hole), Some(profile)) = (&self.config.screw_hole, &self.cavity_profile)
                else {
                    return Ok(());
                };
                let built =
                    build_spline(&hole.splines[i], profile, SplineSite::Cavity, 0.5, &mut self.engine)?;
                register_feature(&mut self.compositor, built.as_ref());
                self.internal_splines[i] = built;
            }
            _ => {
                for old in std::mem::take(&mut self.internal_splines).into_iter().flatten() {
                    dispose_feature(&mut self.engine, &mut self.compositor, old);
                }
                if let Some(hole) = &mut self.config.screw_hole {
                    if let Some(supplied) = &config.screw_hole {
                        hole.splines = supplied.splines.clone();
                    }
                }
                let (Some(hole), Some(profile)) = (&self.config.screw_hole, &self.cavity_profile)
                else {
                    return Ok(());
                };
                let mut rebuilt = Vec::with_capacity(hole.splines.len());
                for cfg in &hole.splines {
                    let built = build_spline(cfg, profile, SplineSite::Cavity, 0.5, &mut self.engine)?;
                    register_feature(&mut self.compositor, built.as_ref());
                    rebuilt.push(built);
                }
                self.internal_splines = rebuilt;
            }
        }
        Ok(())
    }

    fn rebuild_internal_threads(
        &mut self,
        config: &KnobConfig,
        index: Option<usize>,
    ) -> Result<(), ModelError> {
        let supplied = config
            .screw_hole
            .as_ref()
            .map(|hole| hole.threads.as_slice())
            .unwrap_or(&[]);
        match index {
            Some(i) if i < self.internal_threads.len() && i < supplied.len() => {
                if let Some(hole) = &mut self.config.screw_hole {
                    hole.threads[i] = supplied[i];
                }
                if let Some(old) = self.internal_threads[i].take() {
                    dispose_feature(&mut self.engine, &mut self.compositor, old);
                }
                let (Some(hole), Some(profile)) = (&self.config.screw_hole, &self.cavity_profile)
                else {
                    return Ok(());
                };
                let built =
                    build_thread(&hole.threads[i], profile, SplineSite::Cavity, &mut self.engine)?;
                register_feature(&mut self.compositor, built.as_ref());
                self.internal_threads[i] = built;
            }
            _ => {
                for old in std::mem::take(&mut self.internal_threads).into_iter().flatten() {
                    dispose_feature(&mut self.engine, &mut self.compositor, old);
                }
                if let Some(hole) = &mut self.config.screw_hole {
                    if let Some(supplied) = &config.screw_hole {
                        hole.threads = supplied.threads.clone();
                    }
                }
                let (Some(hole), Some(profile)) = (&self.config.screw_hole, &self.cavity_profile)
                else {
                    return Ok(());
                };
                let mut rebuilt = Vec::with_capacity(hole.threads.len());
                for cfg in &hole.threads {
                    let built = build_thread(cfg, profile, SplineSite::Cavity, &mut self.engine)?;
                    register_feature(&mut self.compositor, built.as_ref());
                    rebuilt.push(built);
                }
                self.internal_threads = rebuilt;
            }
        }
        Ok(())
    }

    /// The current configuration snapshot.
    pub fn config(&self) -> &KnobConfig {
        &self.config
    }

    /// The body profile.
    pub fn body_profile(&self) -> &Profile {
        &self.body_profile
    }

    /// The raw body solid.
    pub fn body_id(&self) -> Option<SolidId> {
        self.body
    }

    /// The cavity solid, when a cavity exists.
    pub fn cavity_id(&self) -> Option<SolidId> {
        self.cavity
    }

    /// The boolean composite: the body with the subtraction set removed,
    /// or the body itself when nothing is subtracted.
    pub fn final_solid(&self) -> Option<SolidId> {
        self.compositor.final_solid()
    }

    /// Number of solids currently registered for subtraction.
    pub fn subtraction_count(&self) -> usize {
        self.compositor.member_count()
    }

    /// Pointer solids, index-aligned with the pointer configs.
    pub fn pointer_ids(&self) -> &[Option<SolidId>] {
        &self.pointer_solids
    }

    /// Knurling features, index-aligned with the config array.
    pub fn knurling_features(&self) -> &[Option<FeatureSolid>] {
        &self.knurling
    }

    /// Surface spline features, index-aligned with the config array.
    pub fn spline_features(&self) -> &[Option<FeatureSolid>] {
        &self.splines
    }

    /// External thread features, index-aligned with the config array.
    pub fn thread_features(&self) -> &[Option<FeatureSolid>] {
        &self.threads
    }

    /// Cavity-wall spline features.
    pub fn internal_spline_features(&self) -> &[Option<FeatureSolid>] {
        &self.internal_splines
    }

    /// Cavity-wall thread features.
    pub fn internal_thread_features(&self) -> &[Option<FeatureSolid>] {
        &self.internal_threads
    }

    /// Every solid the renderer/exporter should see: the composite,
    /// pointers, and additive feature solids.
    pub fn scene_solids(&self) -> Vec<SolidId> {
        let mut out = Vec::new();
        if let Some(composite) = self.final_solid() {
            out.push(composite);
        }
        out.extend(self.pointer_solids.iter().flatten().copied());
        let families = [
            &self.knurling,
            &self.splines,
            &self.threads,
            &self.internal_splines,
            &self.internal_threads,
        ];
        for family in families {
            for feature in family.iter().flatten() {
                if !feature.subtractive {
                    out.extend(feature.all_ids());
                }
            }
        }
        out
    }

    /// Shared access to the engine.
    pub fn engine(&self) -> &E {
        &self.engine
    }

    /// Exclusive access to the engine.
    pub fn engine_mut(&mut self) -> &mut E {
        &mut self.engine
    }

    /// Release every owned solid and return the engine.
    pub fn dispose(mut self) -> E {
        self.compositor.release_final(&mut self.engine);
        if let Some(body) = self.body.take() {
            self.engine.dispose(body);
        }
        if let Some(cavity) = self.cavity.take() {
            self.engine.dispose(cavity);
        }
        for id in std::mem::take(&mut self.pointer_solids).into_iter().flatten() {
            self.engine.dispose(id);
        }
        let families = [
            std::mem::take(&mut self.knurling),
            std::mem::take(&mut self.splines),
            std::mem::take(&mut self.threads),
            std::mem::take(&mut self.internal_splines),
            std::mem::take(&mut self.internal_threads),
        ];
        for family in families {
            for feature in family.into_iter().flatten() {
                dispose_feature(&mut self.engine, &mut self.compositor, feature);
            }
        }
        self.engine
    }
}

fn dispose_feature<E: GeometryEngine>(
    engine: &mut E,
    compositor: &mut BooleanCompositor,
    feature: FeatureSolid,
) {
    for id in feature.all_ids() {
        compositor.remove_member(id);
        engine.dispose(id);
    }
}

fn register_feature(compositor: &mut BooleanCompositor, feature: Option<&FeatureSolid>) {
    if let Some(feature) = feature {
        if feature.subtractive {
            for id in feature.all_ids() {
                compositor.add_member(id);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use knobcad_engine::MeshEngine;

    fn basic_config() -> KnobConfig {
        KnobConfig::from_json(
            r#"{
                "body": {"radius": 15, "height": 30},
                "screwHole": {"radius": 5, "height": 8, "balance": 1}
            }"#,
        )
        .unwrap()
    }

    #[test]
    fn no_cavity_means_final_is_body_without_booleans() {
        let config = KnobConfig::from_json(r#"{"body": {"radius": 15, "height": 30}}"#).unwrap();
        let model = KnobModel::new(&config, MeshEngine::new()).unwrap();
        assert_eq!(model.final_solid(), model.body_id());
        assert_eq!(model.subtraction_count(), 0);
        assert_eq!(model.engine().booleans_performed(), 0);
    }

    #[test]
    fn cavity_joins_the_subtraction_set() {
        let model = KnobModel::new(&basic_config(), MeshEngine::new()).unwrap();
        assert_eq!(model.subtraction_count(), 1);
        assert_ne!(model.final_solid(), model.body_id());
        assert_eq!(model.engine().booleans_performed(), 1);

        let body = model
            .engine()
            .world_mesh(model.body_id().unwrap())
            .unwrap();
        let composite = model
            .engine()
            .world_mesh(model.final_solid().unwrap())
            .unwrap();
        // outer silhouette unchanged, interior removed
        let outer = body.bounding_box().unwrap().radial_extent();
        let composite_outer = composite.bounding_box().unwrap().radial_extent();
        assert!((outer - composite_outer).abs() < 0.1);
        assert!(composite.volume() < body.volume());
    }

    #[test]
    fn partial_update_keeps_unrelated_solids() {
        let mut config = basic_config();
        config.surface.splines = vec![serde_json::from_str(
            r#"{"count": 3, "height": 2.0, "thickness": 0.3}"#,
        )
        .unwrap()];
        let mut model = KnobModel::new(&config, MeshEngine::new()).unwrap();

        let body_before = model.body_id();
        let cavity_before = model.cavity_id();
        let spline_before = model.spline_features()[0].as_ref().unwrap().root;

        let mut next = config.clone();
        next.surface.splines[0].count = 5;
        model.update(&next, Some(&[Part::Splines]), None).unwrap();

        assert_eq!(model.body_id(), body_before);
        assert_eq!(model.cavity_id(), cavity_before);
        let spline_after = model.spline_features()[0].as_ref().unwrap();
        assert_ne!(spline_after.root, spline_before);
        assert_eq!(spline_after.solid_count(), 5);
    }

    #[test]
    fn indexed_update_touches_one_element() {
        let mut config = basic_config();
        let knurl = r#"{"sizeX": 1, "sizeY": 2, "depth": 0.4, "radialCount": 6}"#;
        config.surface.knurling = vec![
            serde_json::from_str(knurl).unwrap(),
            serde_json::from_str(knurl).unwrap(),
        ];
        let mut model = KnobModel::new(&config, MeshEngine::new()).unwrap();

        let first_before = model.knurling_features()[0].as_ref().unwrap().root;
        let second_before = model.knurling_features()[1].as_ref().unwrap().root;

        let mut next = config.clone();
        next.surface.knurling[0].radial_count = 8;
        model
            .update(&next, Some(&[Part::Knurling]), Some(0))
            .unwrap();

        assert_ne!(model.knurling_features()[0].as_ref().unwrap().root, first_before);
        assert_eq!(model.knurling_features()[1].as_ref().unwrap().root, second_before);
        assert_eq!(model.config().surface.knurling[0].radial_count, 8);
    }

    #[test]
    fn indexed_internal_spline_update_touches_one_element() {
        let mut config = basic_config();
        let spline = r#"{"count": 3, "height": 1.0, "thickness": 0.4}"#;
        config.screw_hole.as_mut().unwrap().splines = vec![
            serde_json::from_str(spline).unwrap(),
            serde_json::from_str(spline).unwrap(),
        ];
        let mut model = KnobModel::new(&config, MeshEngine::new()).unwrap();

        let first_before = model.internal_spline_features()[0].as_ref().unwrap().root;
        let second_before = model.internal_spline_features()[1].as_ref().unwrap().root;

        let mut next = config.clone();
        next.screw_hole.as_mut().unwrap().splines[0].count = 5;
        model
            .update(&next, Some(&[Part::InternalSplines]), Some(0))
            .unwrap();

        let first_after = model.internal_spline_features()[0].as_ref().unwrap();
        assert_ne!(first_after.root, first_before);
        assert_eq!(first_after.solid_count(), 5);
        assert_eq!(
            model.internal_spline_features()[1].as_ref().unwrap().root,
            second_before
        );
    }

    #[test]
    fn subtractive_spline_reduces_composite_volume() {
        let mut config = basic_config();
        config.surface.splines = vec![serde_json::from_str(
            r#"{"count": 4, "height": 2.0, "thickness": 0.3, "substractive": true}"#,
        )
        .unwrap()];
        let cut_model = KnobModel::new(&config, MeshEngine::new()).unwrap();
        let cut_volume = cut_model
            .engine()
            .world_mesh(cut_model.final_solid().unwrap())
            .unwrap()
            .volume();

        config.surface.splines[0].substractive = false;
        let plain_model = KnobModel::new(&config, MeshEngine::new()).unwrap();
        let plain_volume = plain_model
            .engine()
            .world_mesh(plain_model.final_solid().unwrap())
            .unwrap()
            .volume();

        assert!(cut_volume < plain_volume - 1.0);
    }

    #[test]
    fn dispose_releases_every_solid() {
        let mut config = basic_config();
        config.pointers = vec![serde_json::from_str(
            r#"{"length": 2, "height": 15, "radialOffset": 10, "position": 0.75}"#,
        )
        .unwrap()];
        config.surface.knurling = vec![serde_json::from_str(
            r#"{"sizeX": 1, "sizeY": 2, "depth": 0.4, "radialCount": 6}"#,
        )
        .unwrap()];
        let model = KnobModel::new(&config, MeshEngine::new()).unwrap();
        assert!(model.engine().live_solids() > 0);
        let engine = model.dispose();
        assert_eq!(engine.live_solids(), 0);
    }

    #[test]
    fn full_update_replaces_without_leaking() {
        let config = basic_config();
        let mut model = KnobModel::new(&config, MeshEngine::new()).unwrap();
        let live_before = model.engine().live_solids();
        model.update(&config, None, None).unwrap();
        assert_eq!(model.engine().live_solids(), live_before);
    }

    #[test]
    fn scene_contains_composite_but_not_raw_body() {
        let model = KnobModel::new(&basic_config(), MeshEngine::new()).unwrap();
        let scene = model.scene_solids();
        assert!(scene.contains(&model.final_solid().unwrap()));
        assert!(!scene.contains(&model.body_id().unwrap()));
    }
}
