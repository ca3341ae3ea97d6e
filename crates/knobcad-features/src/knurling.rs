//! Knurling: a staggered grid of small instanced bumps.

use knobcad_config::{KnurlShape, KnurlingConfig};
use knobcad_engine::{EngineError, GeometryEngine, SolidId};
use knobcad_math::Transform;
use knobcad_mesh::{primitives, TriangleMesh};
use knobcad_profile::Profile;

use crate::FeatureSolid;

/// Hard cap on angular columns; beyond this the pattern reads as a
/// texture and only costs memory.
const MAX_RADIAL_COUNT: u32 = 100;

/// Place one knurling patch over a band of the body profile.
///
/// One base solid holds the bump geometry; every cell is an instance
/// with its own placement. Cells near the band edges shrink along the
/// depth axis when `depth_smoothing` is set.
pub fn build_knurling<E: GeometryEngine>(
    config: &KnurlingConfig,
    profile: &Profile,
    engine: &mut E,
) -> Result<Option<FeatureSolid>, EngineError> {
    if config.size_x <= 0.0
        || config.size_y <= 0.0
        || config.depth <= 0.0
        || config.radial_count == 0
        || profile.is_zero_length()
    {
        return Ok(None);
    }

    let d_start = profile.distance_at(config.range[0]);
    let d_end = profile.distance_at(config.range[1]);
    let step = config.size_y + config.vertical_spacing;
    if d_end - d_start <= 0.0 || step <= 0.0 {
        return Ok(None);
    }

    let columns = config.radial_count.min(MAX_RADIAL_COUNT);
    let column_angle = 2.0 * std::f64::consts::PI / columns as f64;
    let taper_distance = config.depth_smoothing * profile.height();

    let mut placements: Vec<Transform> = Vec::new();
    for column in 0..columns {
        let angle = column as f64 * column_angle;
        let stagger = (column as f64 * config.vertical_offset).rem_euclid(step);
        let mut distance = d_start + stagger;
        let mut hint = None;
        while distance + config.size_y <= d_end + 1e-9 {
            let center = distance + config.size_y / 2.0;
            let info = profile.info_at(center, hint);
            hint = Some(info.slot);

            let edge = (center - d_start).min(d_end - center);
            let depth_scale = if taper_distance > 0.0 {
                (edge / taper_distance).min(1.0)
            } else {
                1.0
            };

            placements.push(placement(config, angle, info.x, info.y, info.tangent_angle, depth_scale));
            distance += step;
        }
    }

    if placements.is_empty() {
        return Ok(None);
    }

    let root = engine.polyhedron(base_mesh(config));
    let mut instances: Vec<SolidId> = Vec::with_capacity(placements.len() - 1);
    let mut iter = placements.into_iter();
    if let Some(first) = iter.next() {
        engine.set_transform(root, first)?;
    }
    for transform in iter {
        let id = engine.instance(root)?;
        engine.set_transform(id, transform)?;
        instances.push(id);
    }

    Ok(Some(FeatureSolid {
        root,
        instances,
        subtractive: false,
    }))
}

fn base_mesh(config: &KnurlingConfig) -> TriangleMesh {
    match config.shape {
        KnurlShape::Pyramid => primitives::pyramid(config.size_x, config.size_y, config.depth),
        KnurlShape::Rectangle => primitives::box_mesh(config.size_x, config.size_y, config.depth),
        KnurlShape::Cylinder => {
            primitives::cylinder(config.size_x / 2.0, config.size_x / 2.0, config.depth)
        }
        KnurlShape::Cone => primitives::cylinder(config.size_x / 2.0, 0.0, config.depth),
        KnurlShape::Triangle => primitives::wedge(config.size_x, config.size_y, config.depth),
    }
}

/// World placement of one cell: spin to the column, translate to the
/// surface point, tilt to the local tangent, sink by the unexposed part
/// of the (scaled) depth, then shape-local scale and rotation.
fn placement(
    config: &KnurlingConfig,
    column_angle: f64,
    radius: f64,
    height: f64,
    tangent_angle: f64,
    depth_scale: f64,
) -> Transform {
    // boxes keep a flat face on the surface instead of sinking flush
    let extra = match config.shape {
        KnurlShape::Rectangle => config.depth / 2.0,
        _ => 0.0,
    };
    let sink = extra - (1.0 - config.rise) * config.depth * depth_scale;

    Transform::rotation_y(column_angle)
        .then(&Transform::translation(0.0, height, radius))
        .then(&Transform::rotation_x(tangent_angle))
        .then(&Transform::translation(0.0, 0.0, sink))
        .then(&Transform::scale(1.0, 1.0, depth_scale))
        .then(&Transform::rotation_z(config.shape_rotation))
}
