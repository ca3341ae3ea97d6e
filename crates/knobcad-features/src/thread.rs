//! Helical threads: a trapezoidal ridge swept along the profile as a
//! helix. External threads decorate the body; internal threads ride the
//! cavity wall and are cut out of the body.

use knobcad_config::ThreadConfig;
use knobcad_engine::{EngineError, GeometryEngine};
use knobcad_math::{span_ratio, Point3, Vec2};
use knobcad_mesh::build::centered_row;
use knobcad_profile::{Profile, TESSELLATION_DENSITY};

use crate::{FeatureSolid, SplineSite};

/// Root half-width of the thread cross-section, as a fraction of pitch.
const ROOT_HALF_WIDTH: f64 = 0.45;
/// Crest half-width of the thread cross-section, as a fraction of pitch.
const CREST_HALF_WIDTH: f64 = 0.1;

/// Build one helical thread, or `None` for degenerate parameters.
///
/// The covered band is inset by half a pitch at each end so the ridge
/// never ends in a clipped partial turn. Internal threads (cavity site)
/// are implicitly subtractive.
pub fn build_thread<E: GeometryEngine>(
    config: &ThreadConfig,
    profile: &Profile,
    site: SplineSite,
    engine: &mut E,
) -> Result<Option<FeatureSolid>, EngineError> {
    if config.pitch <= 0.0 || config.depth == 0.0 || profile.is_zero_length() {
        return Ok(None);
    }

    let d_start = profile.distance_at(config.range[0]) + config.pitch / 2.0;
    let d_end = profile.distance_at(config.range[1]) - config.pitch / 2.0;
    if d_end - d_start < config.pitch {
        return Ok(None);
    }

    let handed = if config.left_handed { -1.0 } else { 1.0 };
    let cycles = ((d_end - d_start) / config.pitch).floor() as usize;

    let mut rows: Vec<Vec<Point3>> = Vec::new();
    let mut hint = None;
    for cycle in 0..cycles {
        let cycle_start = d_start + cycle as f64 * config.pitch;
        let mean = profile.info_at(cycle_start + config.pitch / 2.0, hint);
        // facet density tracks the local circumference
        let steps = ((2.0 * std::f64::consts::PI * mean.x * TESSELLATION_DENSITY).round()
            as usize)
            .max(8);

        let last_step = if cycle == cycles - 1 { steps } else { steps - 1 };
        for k in 0..=last_step {
            let d = cycle_start + config.pitch * k as f64 / steps as f64;
            let info = profile.info_at(d, hint);
            hint = Some(info.slot);

            let turn = handed * 2.0 * std::f64::consts::PI * (d - d_start) / config.pitch;
            let ridge = config.depth * end_taper(config, d, d_start, d_end);
            rows.push(section_row(config, &info, turn, ridge));
        }
    }
    if rows.len() < 2 {
        return Ok(None);
    }

    rows.insert(0, centered_row(&rows[0]));
    let last = centered_row(rows.last().map(Vec::as_slice).unwrap_or(&[]));
    rows.push(last);

    let root = engine.build_ribbon(&rows);
    Ok(Some(FeatureSolid {
        root,
        instances: Vec::new(),
        subtractive: site == SplineSite::Cavity,
    }))
}

/// Ridge-depth fade near the band ends.
fn end_taper(config: &ThreadConfig, d: f64, d_start: f64, d_end: f64) -> f64 {
    let span = d_end - d_start;
    let mut factor: f64 = 1.0;
    if config.taper_bottom > 0.0 {
        factor = factor.min(span_ratio(d - d_start, 0.0, config.taper_bottom * span));
    }
    if config.taper_top > 0.0 {
        factor = factor.min(span_ratio(d_end - d, 0.0, config.taper_top * span));
    }
    factor.clamp(0.0, 1.0)
}

/// One closed trapezoidal cross-section at helix angle `turn`.
///
/// The section lives in the meridian plane: along the wall for width,
/// along the outward wall normal for the ridge depth.
fn section_row(
    config: &ThreadConfig,
    info: &knobcad_profile::SurfaceInfo,
    turn: f64,
    ridge: f64,
) -> Vec<Point3> {
    // wall direction and outward normal in (radius, height) coordinates
    let (sin, cos) = info.tangent_angle.sin_cos();
    let along = Vec2::new(-sin, cos);
    let normal = Vec2::new(cos, sin);

    let at = Vec2::new(info.x, info.y);
    let locals = [
        at - along * (ROOT_HALF_WIDTH * config.pitch),
        at - along * (CREST_HALF_WIDTH * config.pitch) + normal * ridge,
        at + along * (CREST_HALF_WIDTH * config.pitch) + normal * ridge,
        at + along * (ROOT_HALF_WIDTH * config.pitch),
        at - along * (ROOT_HALF_WIDTH * config.pitch),
    ];
    locals
        .into_iter()
        .map(|p| Point3::new(turn.sin() * p.x, p.y, turn.cos() * p.x))
        .collect()
}
