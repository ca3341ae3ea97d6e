//! Longitudinal splines, ribs and keys: cross-section templates swept
//! along a profile band as a ribbon, rotationally instanced.

use knobcad_config::SplineConfig;
use knobcad_engine::{EngineError, GeometryEngine, SolidId};
use knobcad_math::{smooth, span_ratio, Point3};
use knobcad_mesh::build::centered_row;
use knobcad_profile::{Profile, TESSELLATION_DENSITY};

use crate::FeatureSolid;

/// Which profile a spline rides on. The site decides which way the
/// cross-section points: decorations grow outward on the body and
/// inward on a cavity wall; cuts go the other way.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SplineSite {
    /// Outer body surface.
    Body,
    /// Cavity (screw-hole) wall.
    Cavity,
}

/// Build one spline family: a base ribbon plus `count - 1` rotated
/// instances.
///
/// `balance` is the height ratio the taper blend pivots around (the
/// body's balance point, or the cavity midpoint).
pub fn build_spline<E: GeometryEngine>(
    config: &SplineConfig,
    profile: &Profile,
    site: SplineSite,
    balance: f64,
    engine: &mut E,
) -> Result<Option<FeatureSolid>, EngineError> {
    if config.count == 0 || config.height <= 0.0 || profile.is_zero_length() {
        return Ok(None);
    }
    let section = match SectionKind::from_config(config) {
        Some(kind) => kind,
        None => return Ok(None),
    };

    let d_start = profile.distance_at(config.range[0]);
    let d_end = profile.distance_at(config.range[1]);
    if d_end - d_start <= 0.0 {
        return Ok(None);
    }

    let outward = (site == SplineSite::Body) != config.substractive;
    let stations = (((d_end - d_start) * TESSELLATION_DENSITY).ceil() as usize).max(2);

    let mut rows: Vec<Vec<Point3>> = Vec::with_capacity(stations + 3);
    let mut hint = None;
    for i in 0..=stations {
        let t = i as f64 / stations as f64;
        let info = profile.info_at(d_start + (d_end - d_start) * t, hint);
        hint = Some(info.slot);

        let scale = taper_scale(t, balance, config);
        let twist = config.angle
            * smooth(t, config.angle_smoothing.abs(), config.angle_smoothing < 0.0);
        rows.push(section.row(config, info.x, info.y, twist, scale, outward));
    }

    // collapse duplicated end rows to their centroids to close the ribbon
    rows.insert(0, centered_row(&rows[0]));
    let last = centered_row(rows.last().map(Vec::as_slice).unwrap_or(&[]));
    rows.push(last);

    let root = engine.build_ribbon(&rows);
    let step = 2.0 * std::f64::consts::PI / config.count as f64;
    let mut instances: Vec<SolidId> = Vec::with_capacity(config.count as usize - 1);
    for k in 1..config.count {
        let id = engine.instance(root)?;
        engine.set_transform(id, knobcad_math::Transform::rotation_y(k as f64 * step))?;
        instances.push(id);
    }

    Ok(Some(FeatureSolid {
        root,
        instances,
        subtractive: config.substractive,
    }))
}

/// Taper scale at band position `t`: `bottom_scale → 1 → top_scale`,
/// pivoting at `balance`, eased by `scale_smoothing`.
fn taper_scale(t: f64, balance: f64, config: &SplineConfig) -> f64 {
    let s = config.scale_smoothing;
    let (target, ratio) = if t < balance {
        (config.bottom_scale, span_ratio(balance - t, 0.0, balance))
    } else {
        (config.top_scale, span_ratio(t - balance, 0.0, 1.0 - balance))
    };
    1.0 + (target - 1.0) * smooth(ratio.clamp(0.0, 1.0), s.abs(), s < 0.0)
}

enum SectionKind {
    /// Trapezoidal tooth: angular root/tip thickness in radians.
    Tooth { tip: f64, root: f64 },
    /// Constant-width key: width in mm.
    Key { width: f64 },
}

impl SectionKind {
    fn from_config(config: &SplineConfig) -> Option<Self> {
        if let Some(width) = config.width {
            if width <= 0.0 {
                return None;
            }
            return Some(Self::Key { width });
        }
        let tip = config.thickness?;
        if tip <= 0.0 {
            return None;
        }
        Some(Self::Tooth {
            tip,
            root: config.root_thickness.unwrap_or(tip),
        })
    }

    /// One closed cross-section row at a station, 18 points plus the
    /// closing duplicate, in world space.
    fn row(
        &self,
        config: &SplineConfig,
        radius: f64,
        height: f64,
        twist: f64,
        scale: f64,
        outward: bool,
    ) -> Vec<Point3> {
        let dir = if outward { 1.0 } else { -1.0 };
        let tip_radius = (radius + dir * config.height * scale).max(0.0);

        // (local angle, radius) pairs, counter-clockwise around the tooth
        let mut polar: Vec<(f64, f64)> = Vec::with_capacity(19);
        match *self {
            SectionKind::Tooth { tip, root } => {
                let half_root = root / 2.0 * scale;
                let half_tip = tip / 2.0 * scale;
                let sm = config.smoothing;
                // left wall, root corner to tip corner
                for i in 0..5 {
                    let t = i as f64 / 4.0;
                    let eased = smooth(t, sm.abs(), sm < 0.0);
                    polar.push((
                        -half_root + (half_root - half_tip) * eased,
                        radius + (tip_radius - radius) * t,
                    ));
                }
                // tip arc
                for i in 1..5 {
                    let t = i as f64 / 5.0;
                    polar.push((-half_tip + tip * scale * t, tip_radius));
                }
                // right wall, tip corner down to root corner
                for i in 0..5 {
                    let t = 1.0 - i as f64 / 4.0;
                    let eased = smooth(t, sm.abs(), sm < 0.0);
                    polar.push((
                        half_root - (half_root - half_tip) * eased,
                        radius + (tip_radius - radius) * t,
                    ));
                }
                // root arc back toward the start
                for i in 1..5 {
                    let t = i as f64 / 5.0;
                    polar.push((half_root - root * scale * t, radius));
                }
            }
            SectionKind::Key { width } => {
                let half_base = width / 2.0 * scale / radius.max(1e-9);
                let half_tip = width / 2.0 * scale / tip_radius.max(1e-9);
                for i in 0..9 {
                    let t = i as f64 / 8.0;
                    polar.push((-half_base + 2.0 * half_base * t, radius));
                }
                for i in 0..9 {
                    let t = i as f64 / 8.0;
                    polar.push((half_tip - 2.0 * half_tip * t, tip_radius));
                }
            }
        }
        if let Some(&first) = polar.first() {
            polar.push(first);
        }

        polar
            .into_iter()
            .map(|(a, r)| {
                let angle = a + twist;
                Point3::new(angle.sin() * r, height, angle.cos() * r)
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use knobcad_config::ProfileSegment;
    use knobcad_engine::MeshEngine;

    fn cylinder_profile(radius: f64, height: f64) -> Profile {
        Profile::new(
            &[
                ProfileSegment::new(radius, 0.0),
                ProfileSegment::new(radius, 1.0),
            ],
            height,
        )
    }

    fn rib() -> SplineConfig {
        serde_json::from_str(
            r#"{"count": 3, "height": 4.0, "thickness": 0.3141,
                "rootThickness": 0.5236, "range": [0.0, 1.0]}"#,
        )
        .unwrap()
    }

    #[test]
    fn rib_family_has_count_solids() {
        let profile = cylinder_profile(10.0, 30.0);
        let mut engine = MeshEngine::new();
        let feature = build_spline(&rib(), &profile, SplineSite::Body, 0.5, &mut engine)
            .unwrap()
            .unwrap();
        assert_eq!(feature.solid_count(), 3);
        assert!(!feature.subtractive);
        for &id in &feature.instances {
            assert!(engine.shares_geometry(feature.root, id).unwrap());
        }
    }

    #[test]
    fn body_rib_extends_outward() {
        let profile = cylinder_profile(10.0, 30.0);
        let mut engine = MeshEngine::new();
        let feature = build_spline(&rib(), &profile, SplineSite::Body, 0.5, &mut engine)
            .unwrap()
            .unwrap();
        let bbox = engine
            .world_mesh(feature.root)
            .unwrap()
            .bounding_box()
            .unwrap();
        assert!(bbox.radial_extent() > 13.5);
        assert!(bbox.radial_extent() < 14.0 + 1e-6);
        assert!(engine.world_mesh(feature.root).unwrap().volume() > 0.0);
    }

    #[test]
    fn cavity_spline_extends_inward() {
        let profile = cylinder_profile(5.0, 8.0);
        let mut engine = MeshEngine::new();
        let mut config = rib();
        config.height = 2.0;
        let feature = build_spline(&config, &profile, SplineSite::Cavity, 1.0, &mut engine)
            .unwrap()
            .unwrap();
        let bbox = engine
            .world_mesh(feature.root)
            .unwrap()
            .bounding_box()
            .unwrap();
        // tooth tip reaches from the r=5 wall down to r=3
        assert!(bbox.radial_extent() < 5.0 + 1e-3);
    }

    #[test]
    fn subtractive_key_on_cavity_cuts_outward() {
        let profile = cylinder_profile(5.0, 8.0);
        let mut engine = MeshEngine::new();
        let config: SplineConfig = serde_json::from_str(
            r#"{"count": 1, "height": 2.0, "width": 3.0, "substractive": true}"#,
        )
        .unwrap();
        let feature = build_spline(&config, &profile, SplineSite::Cavity, 1.0, &mut engine)
            .unwrap()
            .unwrap();
        assert!(feature.subtractive);
        let bbox = engine
            .world_mesh(feature.root)
            .unwrap()
            .bounding_box()
            .unwrap();
        assert!(bbox.radial_extent() > 6.9);
    }

    #[test]
    fn taper_scale_pivots_at_balance() {
        let config: SplineConfig = serde_json::from_str(
            r#"{"count": 1, "height": 1.0, "thickness": 0.2,
                "topScale": 0.5, "bottomScale": 2.0}"#,
        )
        .unwrap();
        assert!((taper_scale(0.5, 0.5, &config) - 1.0).abs() < 1e-12);
        assert!((taper_scale(0.0, 0.5, &config) - 2.0).abs() < 1e-12);
        assert!((taper_scale(1.0, 0.5, &config) - 0.5).abs() < 1e-12);
    }

    #[test]
    fn degenerate_spline_configs_yield_nothing() {
        let profile = cylinder_profile(10.0, 30.0);
        let mut engine = MeshEngine::new();

        let mut no_count = rib();
        no_count.count = 0;
        assert!(
            build_spline(&no_count, &profile, SplineSite::Body, 0.5, &mut engine)
                .unwrap()
                .is_none()
        );

        let mut no_section = rib();
        no_section.thickness = None;
        no_section.root_thickness = None;
        assert!(
            build_spline(&no_section, &profile, SplineSite::Body, 0.5, &mut engine)
                .unwrap()
                .is_none()
        );

        let mut empty_range = rib();
        empty_range.range = [0.3, 0.3];
        assert!(
            build_spline(&empty_range, &profile, SplineSite::Body, 0.5, &mut engine)
                .unwrap()
                .is_none()
        );
        assert_eq!(engine.live_solids(), 0);
    }

    #[test]
    fn twisted_rib_rotates_across_the_band() {
        let profile = cylinder_profile(10.0, 30.0);
        let mut engine = MeshEngine::new();
        let mut config = rib();
        config.count = 1;
        config.angle = std::f64::consts::FRAC_PI_2;
        let feature = build_spline(&config, &profile, SplineSite::Body, 0.5, &mut engine)
            .unwrap()
            .unwrap();
        let bbox = engine
            .world_mesh(feature.root)
            .unwrap()
            .bounding_box()
            .unwrap();
        // starts on the +z meridian, ends on +x after a quarter turn
        assert!(bbox.max.z > 13.5);
        assert!(bbox.max.x > 13.5);
        assert!(bbox.min.x > -5.0);
    }
}
