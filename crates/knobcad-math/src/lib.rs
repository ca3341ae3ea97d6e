#![warn(missing_docs)]

//! Math types for the knobcad solid-geometry kernel.
//!
//! Thin wrappers around nalgebra providing domain-specific types for the
//! knob generator: points, vectors, affine transforms, tolerance constants,
//! and the power-law blend every smoothed transition in the kernel uses.
//!
//! Conventions: millimeters, Y-up, revolution axis through the origin along
//! +Y, angle 0 on the +Z meridian.

use nalgebra::{Matrix4, Vector2, Vector3, Vector4};

/// A point in 3D space.
pub type Point3 = nalgebra::Point3<f64>;

/// A vector in 3D space.
pub type Vec3 = Vector3<f64>;

/// A point in a 2D cross-section plane (x = radius, y = height).
pub type Point2 = nalgebra::Point2<f64>;

/// A vector in 2D space.
pub type Vec2 = Vector2<f64>;

/// A 4x4 affine transformation matrix.
#[derive(Debug, Clone, PartialEq)]
pub struct Transform {
    /// The underlying 4x4 matrix.
    pub matrix: Matrix4<f64>,
}

impl Transform {
    /// Identity transform.
    pub fn identity() -> Self {
        Self {
            matrix: Matrix4::identity(),
        }
    }

    /// Translation by `(dx, dy, dz)`.
    pub fn translation(dx: f64, dy: f64, dz: f64) -> Self {
        let mut m = Matrix4::identity();
        m[(0, 3)] = dx;
        m[(1, 3)] = dy;
        m[(2, 3)] = dz;
        Self { matrix: m }
    }

    /// Non-uniform scale by `(sx, sy, sz)`.
    pub fn scale(sx: f64, sy: f64, sz: f64) -> Self {
        let mut m = Matrix4::identity();
        m[(0, 0)] = sx;
        m[(1, 1)] = sy;
        m[(2, 2)] = sz;
        Self { matrix: m }
    }

    /// Rotation about the X axis by `angle` radians.
    pub fn rotation_x(angle: f64) -> Self {
        let (s, c) = angle.sin_cos();
        let mut m = Matrix4::identity();
        m[(1, 1)] = c;
        m[(1, 2)] = -s;
        m[(2, 1)] = s;
        m[(2, 2)] = c;
        Self { matrix: m }
    }

    /// Rotation about the Y axis (the revolution axis) by `angle` radians.
    pub fn rotation_y(angle: f64) -> Self {
        let (s, c) = angle.sin_cos();
        let mut m = Matrix4::identity();
        m[(0, 0)] = c;
        m[(0, 2)] = s;
        m[(2, 0)] = -s;
        m[(2, 2)] = c;
        Self { matrix: m }
    }

    /// Rotation about the Z axis by `angle` radians.
    pub fn rotation_z(angle: f64) -> Self {
        let (s, c) = angle.sin_cos();
        let mut m = Matrix4::identity();
        m[(0, 0)] = c;
        m[(0, 1)] = -s;
        m[(1, 0)] = s;
        m[(1, 1)] = c;
        Self { matrix: m }
    }

    /// Compose: apply `other` first, then `self`.
    pub fn then(&self, other: &Transform) -> Self {
        Self {
            matrix: self.matrix * other.matrix,
        }
    }

    /// Transform a point.
    pub fn apply_point(&self, p: &Point3) -> Point3 {
        let v = self.matrix * Vector4::new(p.x, p.y, p.z, 1.0);
        Point3::new(v.x, v.y, v.z)
    }

    /// Transform a direction vector (ignores translation).
    pub fn apply_vec(&self, v: &Vec3) -> Vec3 {
        let r = self.matrix * Vector4::new(v.x, v.y, v.z, 0.0);
        Vec3::new(r.x, r.y, r.z)
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::identity()
    }
}

/// Tolerance constants for geometric comparisons.
#[derive(Debug, Clone, Copy)]
pub struct Tolerance {
    /// Linear distance tolerance in mm.
    pub linear: f64,
    /// Angular tolerance in radians.
    pub angular: f64,
}

impl Tolerance {
    /// Default tolerances (1e-9 mm linear, 1e-9 rad angular).
    pub const DEFAULT: Self = Self {
        linear: 1e-9,
        angular: 1e-9,
    };

    /// Check if a scalar distance is effectively zero.
    pub fn is_zero(&self, d: f64) -> bool {
        d.abs() < self.linear
    }
}

impl Default for Tolerance {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Power-law blend used by every smoothed transition in the kernel:
/// profile spans, spline side walls, taper scaling and twist easing.
///
/// `value` is the linear blend position in `[0, 1]`. `smoothing = 0` is the
/// identity; larger values bow the curve harder (`factor = 1 + 2·smoothing`).
/// `opposite` flips the easing direction (ease-out instead of ease-in).
pub fn smooth(value: f64, smoothing: f64, opposite: bool) -> f64 {
    let factor = 1.0 + smoothing * 2.0;
    if opposite {
        1.0 - (1.0 - value).powf(factor)
    } else {
        value.powf(factor)
    }
}

/// Point on a circle of `radius` around the vertical axis, in the ground
/// plane: `x = sin(angle)·r`, `y = cos(angle)·r`. Angle 0 is the +Z meridian
/// once the y component is mapped to world z.
pub fn circle_point(angle: f64, radius: f64) -> Point2 {
    Point2::new(angle.sin() * radius, angle.cos() * radius)
}

/// Clamped interpolation ratio `(value - from) / (to - from)`.
///
/// Returns 1.0 when the span is degenerate so zero-length arc spans never
/// propagate NaN into position or tangent math.
pub fn span_ratio(value: f64, from: f64, to: f64) -> f64 {
    let span = to - from;
    if span.abs() < Tolerance::DEFAULT.linear {
        1.0
    } else {
        (value - from) / span
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::f64::consts::PI;

    #[test]
    fn translation_moves_points() {
        let t = Transform::translation(10.0, 20.0, 30.0);
        let p = t.apply_point(&Point3::new(1.0, 2.0, 3.0));
        assert_relative_eq!(p.x, 11.0);
        assert_relative_eq!(p.y, 22.0);
        assert_relative_eq!(p.z, 33.0);
    }

    #[test]
    fn rotation_y_quarter_turn() {
        let t = Transform::rotation_y(PI / 2.0);
        let p = t.apply_point(&Point3::new(0.0, 0.0, 1.0));
        assert_relative_eq!(p.x, 1.0, epsilon = 1e-12);
        assert_relative_eq!(p.z, 0.0, epsilon = 1e-12);
    }

    #[test]
    fn then_applies_right_operand_first() {
        let lift = Transform::translation(0.0, 5.0, 0.0);
        let spin = Transform::rotation_y(PI);
        // spin ∘ lift: lift the point, then rotate it around the axis.
        let p = spin.then(&lift).apply_point(&Point3::new(0.0, 0.0, 2.0));
        assert_relative_eq!(p.y, 5.0, epsilon = 1e-12);
        assert_relative_eq!(p.z, -2.0, epsilon = 1e-12);
    }

    #[test]
    fn smooth_is_linear_at_zero() {
        for v in [0.0, 0.25, 0.5, 1.0] {
            assert_relative_eq!(smooth(v, 0.0, false), v);
            assert_relative_eq!(smooth(v, 0.0, true), v, epsilon = 1e-12);
        }
    }

    #[test]
    fn smooth_bows_toward_endpoints() {
        // Ease-in stays below the diagonal, ease-out above.
        assert!(smooth(0.5, 1.0, false) < 0.5);
        assert!(smooth(0.5, 1.0, true) > 0.5);
        assert_relative_eq!(smooth(1.0, 1.0, false), 1.0);
        assert_relative_eq!(smooth(0.0, 1.0, true), 0.0);
    }

    #[test]
    fn circle_point_zero_angle_is_on_reference_meridian() {
        let p = circle_point(0.0, 5.0);
        assert_relative_eq!(p.x, 0.0);
        assert_relative_eq!(p.y, 5.0);
    }

    #[test]
    fn span_ratio_clamps_degenerate_spans() {
        assert_relative_eq!(span_ratio(3.0, 2.0, 4.0), 0.5);
        assert_relative_eq!(span_ratio(2.0, 2.0, 2.0), 1.0);
    }
}
