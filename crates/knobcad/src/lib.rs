#![warn(missing_docs)]

//! Parametric 3D-printable knob generator.
//!
//! A knob is described by a declarative [`KnobConfig`]: an axisymmetric
//! body profile, an optional screw-hole cavity, surface features
//! (knurling, splines, threads) and pointer wedges. [`Knob`] binds the
//! kernel crates to the in-process [`MeshEngine`] and adds STL export;
//! the lower-level crates are re-exported for callers that bring their
//! own engine.

use knobcad_mesh::TriangleMesh;
use thiserror::Error;

pub mod export;

pub use knobcad_config::{ConfigError, KnobConfig};
pub use knobcad_engine::{EngineError, GeometryEngine, MeshEngine, SolidId};
pub use knobcad_features::FeatureSolid;
pub use knobcad_model::{KnobModel, ModelError, Part};
pub use knobcad_profile::Profile;

/// Anything that can go wrong turning a config document into a knob.
#[derive(Debug, Error)]
pub enum KnobError {
    /// The configuration document failed to parse.
    #[error(transparent)]
    Config(#[from] ConfigError),
    /// Generation failed inside the model.
    #[error(transparent)]
    Model(#[from] ModelError),
}

/// A generated knob bound to the in-process mesh engine.
pub struct Knob {
    model: KnobModel<MeshEngine>,
}

impl Knob {
    /// Generate a knob from a configuration.
    pub fn new(config: &KnobConfig) -> Result<Self, KnobError> {
        Ok(Self {
            model: KnobModel::new(config, MeshEngine::new())?,
        })
    }

    /// Generate a knob from a JSON document.
    pub fn from_json(json: &str) -> Result<Self, KnobError> {
        Ok(Self::new(&KnobConfig::from_json(json)?)?)
    }

    /// Apply a configuration update; see [`KnobModel::update`].
    pub fn update(
        &mut self,
        config: &KnobConfig,
        parts: Option<&[Part]>,
        index: Option<usize>,
    ) -> Result<(), KnobError> {
        Ok(self.model.update(config, parts, index)?)
    }

    /// The underlying model.
    pub fn model(&self) -> &KnobModel<MeshEngine> {
        &self.model
    }

    /// World-space meshes of every visible solid.
    pub fn scene_meshes(&self) -> Result<Vec<TriangleMesh>, KnobError> {
        let engine = self.model.engine();
        let mut meshes = Vec::new();
        for id in self.model.scene_solids() {
            meshes.push(engine.world_mesh(id).map_err(ModelError::from)?);
        }
        Ok(meshes)
    }

    /// Serialize the whole scene as ASCII STL.
    pub fn export_stl(&self) -> Result<String, KnobError> {
        Ok(export::to_ascii_stl(&self.scene_meshes()?))
    }

    /// Release every solid.
    pub fn dispose(self) {
        self.model.dispose();
    }
}
