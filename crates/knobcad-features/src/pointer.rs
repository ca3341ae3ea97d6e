//! Pointer wedges: small indicator solids attached near the body
//! surface, never part of the boolean composite.

use knobcad_config::PointerConfig;
use knobcad_engine::{GeometryEngine, SolidId};
use knobcad_math::{circle_point, Point3};

/// Build one pointer wedge, or `None` when it has no extent.
///
/// The wedge footprint is a quad spanning `width_start` radians at
/// `radial_offset` and `width_end` radians at `radial_offset + length`,
/// extruded vertically over `height` centred on
/// `position * body_height`.
pub fn build_pointer<E: GeometryEngine>(
    config: &PointerConfig,
    body_height: f64,
    engine: &mut E,
) -> Option<SolidId> {
    if config.length <= 0.0 || config.height <= 0.0 {
        return None;
    }

    let inner = config.radial_offset.max(0.0);
    let outer = inner + config.length;
    let shape = [
        circle_point(config.angle - config.width_start / 2.0, inner),
        circle_point(config.angle - config.width_end / 2.0, outer),
        circle_point(config.angle + config.width_end / 2.0, outer),
        circle_point(config.angle + config.width_start / 2.0, inner),
        circle_point(config.angle - config.width_start / 2.0, inner),
    ];

    let center = config.position * body_height;
    let path = [
        Point3::new(0.0, center - config.height / 2.0, 0.0),
        Point3::new(0.0, center + config.height / 2.0, 0.0),
    ];
    Some(engine.extrude_along_path(&shape, &path, true))
}

#[cfg(test)]
mod tests {
    use super::*;
    use knobcad_engine::MeshEngine;

    fn pointer() -> PointerConfig {
        serde_json::from_str(
            r#"{"length": 2.0, "height": 15.0, "radialOffset": 10.0,
                "position": 0.75, "angle": 0.0, "widthStart": 0.25, "widthEnd": 0.02}"#,
        )
        .unwrap()
    }

    #[test]
    fn wedge_spans_the_requested_band() {
        let mut engine = MeshEngine::new();
        let id = build_pointer(&pointer(), 30.0, &mut engine).unwrap();
        let bbox = engine.world_mesh(id).unwrap().bounding_box().unwrap();
        // centred on 0.75 * 30 = 22.5, height 15
        assert!((bbox.min.y - 15.0).abs() < 1e-6);
        assert!((bbox.max.y - 30.0).abs() < 1e-6);
        // reaches from r=10 to r=12 on the +z meridian
        assert!(bbox.max.z > 11.9);
        assert!(bbox.max.z < 12.1);
    }

    #[test]
    fn zero_length_pointer_is_skipped() {
        let mut engine = MeshEngine::new();
        let mut config = pointer();
        config.length = 0.0;
        assert!(build_pointer(&config, 30.0, &mut engine).is_none());
        assert_eq!(engine.live_solids(), 0);
    }
}
